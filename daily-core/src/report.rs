//! One run: gather every data point, build the payload, hand it to the sink.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{error, info};

use crate::{
    color::random_color,
    config::{Config, ENV_TEMPLATE_ID, ENV_USER_ID},
    dates::{days_since, days_until_birthday},
    error::SinkError,
    model::{NotificationPayload, WeatherReading},
    quote::QuoteClient,
    resolver::WeatherResolver,
    sink::{NotificationSink, SendReceipt},
};

pub const FIELD_WEATHER: &str = "weather";
pub const FIELD_TEMPERATURE: &str = "temperature";
pub const FIELD_MIN_TEMPERATURE: &str = "min_temperature";
pub const FIELD_MAX_TEMPERATURE: &str = "max_temperature";
pub const FIELD_LOVE_DAYS: &str = "love_days";
pub const FIELD_BIRTHDAY_LEFT: &str = "birthday_left";
pub const FIELD_WORDS: &str = "words";

/// Everything gathered for today's message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub city: String,
    pub reading: WeatherReading,
    pub love_days: i64,
    pub birthday_left: i64,
    pub words: String,
    pub words_color: String,
}

impl DailyReport {
    /// Runs each lookup once, in order. Never fails; every step has a fallback.
    pub async fn gather(
        config: &Config,
        resolver: &WeatherResolver,
        quotes: &QuoteClient,
        now: NaiveDateTime,
    ) -> Self {
        let reading = resolver.resolve(&config.city).await;
        let love_days = days_since(config.start_date.as_deref(), now);
        let birthday_left = days_until_birthday(&config.birthday, now);
        let words = quotes.fetch_quote().await;
        let words_color = random_color();

        info!(
            city = %config.city,
            weather = %reading.description,
            temperature = reading.current_temp,
            love_days,
            birthday_left,
            "gathered daily report"
        );

        Self {
            city: config.city.clone(),
            reading,
            love_days,
            birthday_left,
            words,
            words_color,
        }
    }

    pub fn to_payload(&self) -> NotificationPayload {
        let mut payload = NotificationPayload::new();
        payload
            .insert(FIELD_WEATHER, self.reading.description.clone())
            .insert(FIELD_TEMPERATURE, self.reading.current_temp)
            .insert(FIELD_MIN_TEMPERATURE, self.reading.min_temp)
            .insert(FIELD_MAX_TEMPERATURE, self.reading.max_temp)
            .insert(FIELD_LOVE_DAYS, self.love_days)
            .insert(FIELD_BIRTHDAY_LEFT, self.birthday_left)
            .insert_colored(FIELD_WORDS, self.words.clone(), self.words_color.clone());
        payload
    }
}

/// Send `report` to the configured recipient.
///
/// Success and failure are both logged; the caller decides what, if
/// anything, to do with the result.
pub async fn deliver(
    config: &Config,
    report: &DailyReport,
    sink: &dyn NotificationSink,
) -> Result<SendReceipt, SinkError> {
    let result = send(config, report, sink).await;

    match &result {
        Ok(receipt) => info!(%receipt, "template message sent"),
        Err(err) => error!(error = %err, "failed to send template message"),
    }

    result
}

async fn send(
    config: &Config,
    report: &DailyReport,
    sink: &dyn NotificationSink,
) -> Result<SendReceipt, SinkError> {
    let recipient = config
        .user_id
        .as_deref()
        .ok_or(SinkError::MissingCredential(ENV_USER_ID))?;
    let template_id = config
        .template_id
        .as_deref()
        .ok_or(SinkError::MissingCredential(ENV_TEMPLATE_ID))?;

    sink.send_template(recipient, template_id, &report.to_payload())
        .await
}
