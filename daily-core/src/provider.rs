use crate::{
    config::Config,
    error::ProviderError,
    http::{HttpClient, truncate_body},
    model::WeatherReading,
    provider::{openspeech::OpenSpeechProvider, openweather::OpenWeatherProvider, wttr::WttrProvider},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::{convert::TryFrom, fmt::Debug};
use tracing::{debug, info, warn};

pub mod openspeech;
pub mod openweather;
pub mod wttr;

/// Weather providers, listed in resolution priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenSpeech,
    Wttr,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenSpeech => "openspeech",
            ProviderId::Wttr => "wttr",
            ProviderId::OpenWeather => "openweather",
        }
    }

    /// All providers in priority order.
    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenSpeech, ProviderId::Wttr, ProviderId::OpenWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openspeech" => Ok(ProviderId::OpenSpeech),
            "wttr" => Ok(ProviderId::Wttr),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openspeech, wttr, openweather."
            )),
        }
    }
}

/// One upstream weather API, normalized to [`WeatherReading`].
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch_reading(&self, city: &str) -> Result<WeatherReading, ProviderError>;

    /// Like [`fetch_reading`](Self::fetch_reading), but logs failures and
    /// reports them as `None`.
    async fn try_weather(&self, city: &str) -> Option<WeatherReading> {
        match self.fetch_reading(city).await {
            Ok(reading) => {
                info!(provider = %self.id(), city, ?reading, "weather provider answered");
                Some(reading)
            }
            Err(err) => {
                warn!(provider = %self.id(), city, error = %err, "weather provider failed");
                None
            }
        }
    }
}

/// GET through the retrying client and decode the body as JSON.
pub(crate) async fn fetch_json<F>(http: &HttpClient, build: F) -> Result<Value, ProviderError>
where
    F: Fn(&Client) -> RequestBuilder,
{
    let res = http.send(build).await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            status,
            body: truncate_body(&body),
        });
    }

    debug!(body = %truncate_body(&body), "raw provider response");
    Ok(serde_json::from_str(&body)?)
}

/// Render a JSON scalar as a plain string for error codes and messages.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    http: &HttpClient,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenSpeech => Box::new(OpenSpeechProvider::new(http.clone())),
        ProviderId::Wttr => Box::new(WttrProvider::new(http.clone())),
        ProviderId::OpenWeather => {
            let api_key = config.weather_api_key.as_deref().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: set WEATHER_API_KEY or run `daily-push configure`."
                )
            })?;
            Box::new(OpenWeatherProvider::new(http.clone(), api_key.to_owned()))
        }
    };

    Ok(boxed)
}

/// Every provider the config can support, in priority order.
///
/// Providers that need credentials which are absent are left out.
pub fn default_chain(config: &Config, http: &HttpClient) -> Vec<Box<dyn WeatherProvider>> {
    ProviderId::all()
        .iter()
        .filter_map(|&id| match provider_from_config(id, config, http) {
            Ok(provider) => Some(provider),
            Err(err) => {
                debug!(provider = %id, error = %err, "skipping weather provider");
                None
            }
        })
        .collect()
}
