//! Priority-ordered weather lookup across all configured providers.

use tracing::{info, warn};

use crate::{
    config::Config,
    http::HttpClient,
    model::WeatherReading,
    provider::{ProviderId, WeatherProvider, default_chain},
};

#[derive(Debug)]
pub struct WeatherResolver {
    providers: Vec<Box<dyn WeatherProvider>>,
}

impl WeatherResolver {
    /// Providers are tried in the order given.
    pub fn new(providers: Vec<Box<dyn WeatherProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &Config, http: &HttpClient) -> Self {
        Self::new(default_chain(config, http))
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// First reading any provider produces, or [`WeatherReading::fallback`].
    ///
    /// Never fails; later providers are not called once one answers.
    pub async fn resolve(&self, city: &str) -> WeatherReading {
        for provider in &self.providers {
            if let Some(reading) = provider.try_weather(city).await {
                info!(provider = %provider.id(), city, "weather resolved");
                return reading;
            }
        }

        warn!(city, providers = self.providers.len(), "all weather providers failed, using default reading");
        WeatherReading::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct StubProvider {
        id: ProviderId,
        reading: Option<WeatherReading>,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn boxed(
            id: ProviderId,
            reading: Option<WeatherReading>,
        ) -> (Box<dyn WeatherProvider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stub = StubProvider {
                id,
                reading,
                calls: Arc::clone(&calls),
            };
            (Box::new(stub), calls)
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn fetch_reading(&self, _city: &str) -> Result<WeatherReading, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reading.clone().ok_or(ProviderError::MissingData)
        }
    }

    fn reading(description: &str, temp: i64) -> WeatherReading {
        WeatherReading {
            description: description.to_string(),
            current_temp: temp,
            min_temp: temp - 5,
            max_temp: temp + 5,
        }
    }

    #[tokio::test]
    async fn first_success_short_circuits_the_chain() {
        let (first, first_calls) = StubProvider::boxed(ProviderId::OpenSpeech, Some(reading("雨", 9)));
        let (second, second_calls) = StubProvider::boxed(ProviderId::Wttr, Some(reading("雪", -2)));
        let (third, third_calls) = StubProvider::boxed(ProviderId::OpenWeather, None);

        let resolver = WeatherResolver::new(vec![first, second, third]);
        let result = resolver.resolve("北京").await;

        assert_eq!(result, reading("雨", 9));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_through_to_later_providers() {
        let (first, first_calls) = StubProvider::boxed(ProviderId::OpenSpeech, None);
        let (second, second_calls) = StubProvider::boxed(ProviderId::Wttr, Some(reading("雪", -2)));
        let (third, third_calls) = StubProvider::boxed(ProviderId::OpenWeather, Some(reading("晴", 30)));

        let resolver = WeatherResolver::new(vec![first, second, third]);
        let result = resolver.resolve("哈尔滨").await;

        assert_eq!(result, reading("雪", -2));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn total_failure_returns_default_reading() {
        let (first, first_calls) = StubProvider::boxed(ProviderId::OpenSpeech, None);
        let (second, second_calls) = StubProvider::boxed(ProviderId::Wttr, None);
        let (third, third_calls) = StubProvider::boxed(ProviderId::OpenWeather, None);

        let resolver = WeatherResolver::new(vec![first, second, third]);
        let result = resolver.resolve("北京").await;

        assert_eq!(result.description, "晴");
        assert_eq!((result.current_temp, result.min_temp, result.max_temp), (20, 20, 20));
        for calls in [first_calls, second_calls, third_calls] {
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn empty_chain_returns_default_reading() {
        let resolver = WeatherResolver::new(Vec::new());
        assert_eq!(resolver.resolve("北京").await, WeatherReading::fallback());
    }

    #[test]
    fn from_config_orders_providers_by_priority() {
        let http = HttpClient::new(Default::default()).unwrap();
        let config = Config {
            weather_api_key: Some("KEY".into()),
            ..Config::default()
        };
        let resolver = WeatherResolver::from_config(&config, &http);
        assert_eq!(resolver.provider_ids(), ProviderId::all().to_vec());
    }
}
