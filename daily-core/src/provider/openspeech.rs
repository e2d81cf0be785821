use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::ProviderError,
    http::HttpClient,
    model::WeatherReading,
    normalize::{Schema, extract_reading},
};

use super::{ProviderId, WeatherProvider, fetch_json, scalar_text};

pub const DEFAULT_BASE_URL: &str = "http://autodev.openspeech.cn/csp/api/v2.1/weather";

/// iFlytek's public AIUI weather endpoint. Keyless; answers in Chinese.
///
/// Payload: `{"code": 0, "msg": "...", "data": {"list": [{"weather": "晴",
/// "temp": 12.0, "low": 5.0, "high": 15.0, ...}]}}`.
#[derive(Debug, Clone)]
pub struct OpenSpeechProvider {
    http: HttpClient,
    base_url: String,
}

impl OpenSpeechProvider {
    pub fn new(http: HttpClient) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

/// A missing `code` is accepted; anything other than `0` is an error.
fn check_code(payload: &Value) -> Result<(), ProviderError> {
    let Some(code) = payload.get("code") else {
        return Ok(());
    };

    let ok = match code {
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => s.trim() == "0",
        _ => false,
    };
    if ok {
        return Ok(());
    }

    Err(ProviderError::Api {
        code: scalar_text(code),
        message: payload
            .get("msg")
            .map(scalar_text)
            .unwrap_or_default(),
    })
}

#[async_trait]
impl WeatherProvider for OpenSpeechProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenSpeech
    }

    async fn fetch_reading(&self, city: &str) -> Result<WeatherReading, ProviderError> {
        let payload = fetch_json(&self.http, |client| {
            client.get(&self.base_url).query(&[
                ("openId", "aiuicus"),
                ("clientType", "android"),
                ("sign", "android"),
                ("city", city),
            ])
        })
        .await?;

        check_code(&payload)?;

        extract_reading(&payload, &Schema::COMMON).ok_or(ProviderError::MissingData)
    }
}
