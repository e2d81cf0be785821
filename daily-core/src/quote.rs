use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_QUOTE_URL: &str = "https://api.shadiao.pro/chp";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Default, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    data: QuoteData,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    text: String,
}

/// Fetches one short quote per call.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    http: Client,
    url: String,
    max_attempts: u32,
}

impl QuoteClient {
    pub fn new(http: Client) -> Self {
        Self::with_url(http, DEFAULT_QUOTE_URL)
    }

    pub fn with_url(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Quote text, or an empty string on any failure.
    pub async fn fetch_quote(&self) -> String {
        match self.try_fetch().await {
            Ok(text) => {
                info!(quote = %text, "fetched quote");
                text
            }
            Err(err) => {
                warn!(error = %err, "quote unavailable, sending empty text");
                String::new()
            }
        }
    }

    /// Non-success statuses are retried immediately, up to `max_attempts`.
    /// Transport and decode errors end the call.
    async fn try_fetch(&self) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let res = self
                .http
                .get(&self.url)
                .send()
                .await
                .context("Failed to send quote request")?;

            let status = res.status();
            if !status.is_success() {
                warn!(attempt, max = self.max_attempts, %status, "quote endpoint returned error status");
                continue;
            }

            let parsed: QuoteResponse = res.json().await.context("Failed to parse quote JSON")?;
            return Ok(parsed.data.text);
        }

        Err(anyhow!(
            "quote endpoint failed {} times in a row",
            self.max_attempts
        ))
    }
}
