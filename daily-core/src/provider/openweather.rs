use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::ProviderError,
    http::HttpClient,
    model::WeatherReading,
    normalize::{Schema, extract_reading},
};

use super::{ProviderId, WeatherProvider, fetch_json, scalar_text};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Current-weather payload: `{"weather": [{"description": ...}], "main":
/// {"temp": ..., "temp_min": ..., "temp_max": ...}, "cod": 200}`.
const SCHEMA: Schema = Schema {
    nodes: &[""],
    description: &["weather.0.description", "weather.0.main"],
    current: &["main.temp"],
    min: &["main.temp_min"],
    max: &["main.temp_max"],
    range: &[],
};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: HttpClient,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(http: HttpClient, api_key: String) -> Self {
        Self::with_base_url(http, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: HttpClient, api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http,
            base_url: base_url.into(),
        }
    }
}

/// `cod` comes back as a number on success and often as a string on failure.
fn check_cod(payload: &Value) -> Result<(), ProviderError> {
    let Some(cod) = payload.get("cod") else {
        return Ok(());
    };

    if scalar_text(cod).trim() == "200" {
        return Ok(());
    }

    Err(ProviderError::Api {
        code: scalar_text(cod),
        message: payload
            .get("message")
            .map(scalar_text)
            .unwrap_or_default(),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn fetch_reading(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        let payload = fetch_json(&self.http, |client| {
            client.get(&self.base_url).query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "zh_cn"),
            ])
        })
        .await?;

        check_cod(&payload)?;

        if payload.get("main").is_none() {
            return Err(ProviderError::MissingData);
        }

        extract_reading(&payload, &SCHEMA).ok_or(ProviderError::MissingData)
    }
}
