use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use daily_core::{
    Config, DailyReport, HttpClient, ProviderId, QuoteClient, RetryPolicy, WeChatSink,
    WeatherReading, WeatherResolver, deliver, provider::provider_from_config,
};
use inquire::{Password, Text, validator::Validation};
use tracing::error;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "daily-push", version, about = "Daily weather and countdown notifier")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gather today's data and send the template message (default).
    Send,

    /// Gather today's data and print the payload without sending it.
    Preview,

    /// Resolve and print the weather for a city.
    Weather {
        /// City name; defaults to the configured city.
        #[arg(long)]
        city: Option<String>,

        /// Query only this provider, e.g. "openspeech", "wttr" or "openweather".
        #[arg(long)]
        provider: Option<String>,
    },

    /// Write settings and credentials to the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Send) {
            Command::Configure => {
                let path = match self.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                configure(path)?;
            }
            Command::Send => {
                let (config, http) = load(self.config.as_deref())?;
                let report = gather(&config, &http).await;
                match WeChatSink::from_config(&config, http.client().clone()) {
                    // `deliver` logs the outcome; a failed send is not a failed run.
                    Ok(sink) => {
                        if let Ok(receipt) = deliver(&config, &report, &sink).await {
                            println!("Sent: {receipt}");
                        }
                    }
                    Err(err) => error!(error = %err, "notification sink unavailable, message not sent"),
                }
            }
            Command::Preview => {
                let (config, http) = load(self.config.as_deref())?;
                let report = gather(&config, &http).await;
                let json = serde_json::to_string_pretty(&report.to_payload())
                    .context("Failed to render payload")?;
                println!("{json}");
            }
            Command::Weather { city, provider } => {
                let (config, http) = load(self.config.as_deref())?;
                let city = city.unwrap_or_else(|| config.city.clone());
                let reading = match provider {
                    Some(name) => {
                        let id = ProviderId::try_from(name.as_str())?;
                        provider_from_config(id, &config, &http)?
                            .fetch_reading(&city)
                            .await
                            .with_context(|| format!("Provider '{id}' failed for {city}"))?
                    }
                    None => WeatherResolver::from_config(&config, &http).resolve(&city).await,
                };
                println!("{}", format_reading(&city, &reading));
            }
        }

        Ok(())
    }
}

fn load(path: Option<&Path>) -> anyhow::Result<(Config, HttpClient)> {
    let config = Config::load(path)?;
    let http = HttpClient::new(RetryPolicy::default())?;
    Ok((config, http))
}

async fn gather(config: &Config, http: &HttpClient) -> DailyReport {
    let resolver = WeatherResolver::from_config(config, http);
    let quotes = QuoteClient::new(http.client().clone());
    DailyReport::gather(config, &resolver, &quotes, Local::now().naive_local()).await
}

fn format_reading(city: &str, reading: &WeatherReading) -> String {
    format!(
        "{city}: {}, {}°C ({}°C ~ {}°C)",
        reading.description, reading.current_temp, reading.min_temp, reading.max_temp
    )
}

fn is_date(input: &str) -> bool {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok()
}

/// `MM-DD` checked against a leap year so `02-29` is accepted.
fn is_month_day(input: &str) -> bool {
    is_date(&format!("2000-{input}"))
}

/// Prompt for an optional value. Empty input keeps `current`.
fn prompt_text(label: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let mut prompt = Text::new(label);
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }
    let answer = prompt.prompt()?;
    let answer = answer.trim();

    Ok(if answer.is_empty() {
        current.map(str::to_owned)
    } else {
        Some(answer.to_owned())
    })
}

fn prompt_secret(label: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let help = if current.is_some() {
        "Leave empty to keep the stored value"
    } else {
        "Leave empty to skip"
    };
    let answer = Password::new(label)
        .without_confirmation()
        .with_help_message(help)
        .prompt()?;
    let answer = answer.trim();

    Ok(if answer.is_empty() {
        current.map(str::to_owned)
    } else {
        Some(answer.to_owned())
    })
}

fn configure(path: PathBuf) -> anyhow::Result<()> {
    let mut cfg = Config::load_file(&path)?;
    println!("Configuring {}", path.display());

    cfg.city = Text::new("City:").with_default(&cfg.city).prompt()?.trim().to_owned();

    cfg.birthday = Text::new("Birthday (MM-DD):")
        .with_default(&cfg.birthday)
        .with_validator(|input: &str| {
            Ok(if is_month_day(input.trim()) {
                Validation::Valid
            } else {
                Validation::Invalid("expected MM-DD".into())
            })
        })
        .prompt()?
        .trim()
        .to_owned();

    let start_default = cfg.start_date.clone().unwrap_or_default();
    let start = Text::new("Start date (YYYY-MM-DD, empty to disable):")
        .with_default(&start_default)
        .with_validator(|input: &str| {
            let input = input.trim();
            Ok(if input.is_empty() || is_date(input) {
                Validation::Valid
            } else {
                Validation::Invalid("expected YYYY-MM-DD".into())
            })
        })
        .prompt()?;
    cfg.start_date = Some(start.trim().to_owned()).filter(|s| !s.is_empty());

    cfg.app_id = prompt_text("WeChat app id:", cfg.app_id.as_deref())?;
    cfg.app_secret = prompt_secret("WeChat app secret:", cfg.app_secret.as_deref())?;
    cfg.user_id = prompt_text("Recipient open id:", cfg.user_id.as_deref())?;
    cfg.template_id = prompt_text("Template id:", cfg.template_id.as_deref())?;
    cfg.weather_api_key = prompt_secret("OpenWeather API key:", cfg.weather_api_key.as_deref())?;

    cfg.save(&path)?;
    println!("Saved {}", path.display());

    let missing = cfg.missing_credentials();
    if !missing.is_empty() {
        println!("Still missing: {}", missing.join(", "));
    }

    Ok(())
}
