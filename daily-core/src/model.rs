use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_DESCRIPTION: &str = "晴";
pub const DEFAULT_TEMPERATURE: i64 = 20;

/// Normalized weather data, in °C.
///
/// `min_temp <= current_temp <= max_temp` is not guaranteed; upstream data
/// can violate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub description: String,
    pub current_temp: i64,
    pub min_temp: i64,
    pub max_temp: i64,
}

impl WeatherReading {
    /// Reading used when every provider fails.
    pub fn fallback() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            current_temp: DEFAULT_TEMPERATURE,
            min_temp: DEFAULT_TEMPERATURE,
            max_temp: DEFAULT_TEMPERATURE,
        }
    }
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self::fallback()
    }
}

/// One template field: `{"value": ..., "color": "#rrggbb"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Template data handed to the notification sink.
///
/// Serializes as a flat object keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl NotificationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(
            key.into(),
            FieldValue {
                value: value.into(),
                color: None,
            },
        );
        self
    }

    pub fn insert_colored(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        color: impl Into<String>,
    ) -> &mut Self {
        self.fields.insert(
            key.into(),
            FieldValue {
                value: value.into(),
                color: Some(color.into()),
            },
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fallback_reading_is_clear_and_twenty() {
        let reading = WeatherReading::fallback();
        assert_eq!(reading.description, "晴");
        assert_eq!(
            (reading.current_temp, reading.min_temp, reading.max_temp),
            (20, 20, 20)
        );
        assert_eq!(WeatherReading::default(), reading);
    }

    #[test]
    fn payload_serializes_as_template_data() {
        let mut payload = NotificationPayload::new();
        payload
            .insert("weather", "多云")
            .insert("temperature", 18)
            .insert_colored("words", "hello", "#00ff7f");

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "weather": {"value": "多云"},
                "temperature": {"value": 18},
                "words": {"value": "hello", "color": "#00ff7f"}
            })
        );
    }

    #[test]
    fn insert_replaces_existing_field() {
        let mut payload = NotificationPayload::new();
        payload.insert("love_days", 1).insert("love_days", 2);

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("love_days").unwrap().value, json!(2));
    }
}
