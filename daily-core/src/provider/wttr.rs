use async_trait::async_trait;
use reqwest::Url;

use crate::{
    error::ProviderError,
    http::HttpClient,
    model::WeatherReading,
    normalize::{Schema, extract_reading, lookup},
};

use super::{ProviderId, WeatherProvider, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://wttr.in";

/// wttr.in `format=j1` output. Current conditions and today's bounds live in
/// separate arrays, so every alias is a path from the root.
const SCHEMA: Schema = Schema {
    nodes: &[""],
    description: &[
        "current_condition.0.lang_zh.0.value",
        "current_condition.0.weatherDesc.0.value",
    ],
    current: &["current_condition.0.temp_C"],
    min: &["weather.0.mintempC"],
    max: &["weather.0.maxtempC"],
    range: &[],
};

/// wttr.in only accepts the location as a path segment, not a query parameter.
#[derive(Debug, Clone)]
pub struct WttrProvider {
    http: HttpClient,
    base_url: String,
}

impl WttrProvider {
    pub fn new(http: HttpClient) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// `{base}/{city}` with the city percent-encoded as a path segment.
    fn city_url(&self, city: &str) -> Result<Url, ProviderError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(city);
        Ok(url)
    }
}

#[async_trait]
impl WeatherProvider for WttrProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Wttr
    }

    async fn fetch_reading(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        let url = self.city_url(city)?;

        let payload = fetch_json(&self.http, |client| {
            client
                .get(url.clone())
                .query(&[("format", "j1"), ("lang", "zh")])
        })
        .await?;

        if lookup(&payload, "current_condition.0").is_none() {
            return Err(ProviderError::MissingData);
        }

        extract_reading(&payload, &SCHEMA).ok_or(ProviderError::MissingData)
    }
}
