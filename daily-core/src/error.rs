use reqwest::StatusCode;

/// Errors a single weather provider call can end in.
///
/// The resolver never surfaces these to its caller; they are logged and the
/// next provider in the chain is tried.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// Network layer failed (timeout, connection refused, retries exhausted).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Upstream answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Body was not valid JSON.
    #[error("malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
    /// Provider reported an application-level error inside the payload.
    #[error("provider error {code}: {message}")]
    Api { code: String, message: String },
    /// Payload parsed, but no weather node could be located.
    #[error("no weather data in payload")]
    MissingData,
    /// City could not be turned into a request URL.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a notification sink.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("platform error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
