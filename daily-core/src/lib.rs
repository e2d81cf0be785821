//! Core library for the `daily-push` notifier.
//!
//! This crate defines:
//! - Configuration loading (file, `.env`, environment)
//! - Weather providers and the priority-ordered resolver
//! - Day counters, quote fetching and color generation
//! - The notification sink and the payload it receives
//!
//! It is used by `daily-cli`, but can also be reused by other binaries.

pub mod color;
pub mod config;
pub mod dates;
pub mod error;
pub mod http;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod quote;
pub mod report;
pub mod resolver;
pub mod sink;

pub use config::Config;
pub use error::{ProviderError, SinkError};
pub use http::{HttpClient, RetryPolicy};
pub use model::{FieldValue, NotificationPayload, WeatherReading};
pub use provider::{ProviderId, WeatherProvider};
pub use quote::QuoteClient;
pub use report::{DailyReport, deliver};
pub use resolver::WeatherResolver;
pub use sink::{NotificationSink, SendReceipt, WeChatSink};
