use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const ENV_START_DATE: &str = "START_DATE";
pub const ENV_CITY: &str = "CITY";
pub const ENV_BIRTHDAY: &str = "BIRTHDAY";
pub const ENV_APP_ID: &str = "APP_ID";
pub const ENV_APP_SECRET: &str = "APP_SECRET";
pub const ENV_USER_ID: &str = "USER_ID";
pub const ENV_TEMPLATE_ID: &str = "TEMPLATE_ID";
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";

pub const DEFAULT_CITY: &str = "北京";
pub const DEFAULT_BIRTHDAY: &str = "01-01";

/// Everything one run needs. Built once at startup and passed by reference.
///
/// Example TOML:
/// ```toml
/// city = "上海"
/// birthday = "05-20"
/// start_date = "2020-01-01"
/// app_id = "wx..."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `YYYY-MM-DD`; absent means the day counter is not configured.
    pub start_date: Option<String>,
    pub city: String,
    /// `MM-DD`.
    pub birthday: String,
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    /// Recipient of the template message.
    pub user_id: Option<String>,
    pub template_id: Option<String>,
    /// Only needed for the OpenWeather provider.
    pub weather_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_date: None,
            city: DEFAULT_CITY.to_string(),
            birthday: DEFAULT_BIRTHDAY.to_string(),
            app_id: None,
            app_secret: None,
            user_id: None,
            template_id: None,
            weather_api_key: None,
        }
    }
}

/// Blank values count as unset; CI secrets that are not defined expand to "".
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Config file (if any), then `.env`, then process environment.
    ///
    /// `path` overrides the default config file location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            // No home directory (bare CI runners): environment only.
            None => Self::config_file_path().ok(),
        };

        let mut cfg = match path {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };

        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!(path = %env_file.display(), "loaded .env");
        }
        cfg.apply_overrides(|key| std::env::var(key).ok());

        Ok(cfg)
    }

    /// Build from defaults plus whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.apply_overrides(lookup);
        cfg
    }

    /// Overwrite fields with non-blank values returned by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        if let Some(v) = get(ENV_START_DATE) {
            self.start_date = Some(v);
        }
        if let Some(v) = get(ENV_CITY) {
            self.city = v;
        }
        if let Some(v) = get(ENV_BIRTHDAY) {
            self.birthday = v;
        }
        if let Some(v) = get(ENV_APP_ID) {
            self.app_id = Some(v);
        }
        if let Some(v) = get(ENV_APP_SECRET) {
            self.app_secret = Some(v);
        }
        if let Some(v) = get(ENV_USER_ID) {
            self.user_id = Some(v);
        }
        if let Some(v) = get(ENV_TEMPLATE_ID) {
            self.template_id = Some(v);
        }
        if let Some(v) = get(ENV_WEATHER_API_KEY) {
            self.weather_api_key = Some(v);
        }
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Default path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "daily-push", "daily-push")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Names of the messaging credentials that are still unset.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            (ENV_APP_ID, &self.app_id),
            (ENV_APP_SECRET, &self.app_secret),
            (ENV_USER_ID, &self.user_id),
            (ENV_TEMPLATE_ID, &self.template_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.city, "北京");
        assert_eq!(cfg.birthday, "01-01");
        assert!(cfg.start_date.is_none());
        assert_eq!(cfg.missing_credentials().len(), 4);
    }

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("CITY", "上海"),
            ("BIRTHDAY", "05-20"),
            ("START_DATE", "2021-02-14"),
            ("APP_ID", "wx123"),
            ("APP_SECRET", "secret"),
            ("USER_ID", "openid"),
            ("TEMPLATE_ID", "tpl"),
            ("WEATHER_API_KEY", "owm"),
        ]));

        assert_eq!(cfg.city, "上海");
        assert_eq!(cfg.birthday, "05-20");
        assert_eq!(cfg.start_date.as_deref(), Some("2021-02-14"));
        assert_eq!(cfg.weather_api_key.as_deref(), Some("owm"));
        assert!(cfg.missing_credentials().is_empty());
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = Config::from_lookup(lookup_from(&[("CITY", "  "), ("START_DATE", "")]));
        assert_eq!(cfg.city, "北京");
        assert!(cfg.start_date.is_none());
    }

    #[test]
    fn missing_credentials_lists_unset_names() {
        let cfg = Config::from_lookup(lookup_from(&[("APP_ID", "wx"), ("TEMPLATE_ID", "tpl")]));
        assert_eq!(cfg.missing_credentials(), vec!["APP_SECRET", "USER_ID"]);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            city: "广州".into(),
            start_date: Some("2019-09-09".into()),
            app_id: Some("wx".into()),
            ..Config::default()
        };
        cfg.save(&path).unwrap();

        assert_eq!(Config::load_file(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "city = \"成都\"\n").unwrap();

        let cfg = Config::load_file(&path).unwrap();
        assert_eq!(cfg.city, "成都");
        assert_eq!(cfg.birthday, "01-01");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "city = [").unwrap();

        let err = Config::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
