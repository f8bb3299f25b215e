use crate::core::exchange::Exchange;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A response body did not have the envelope shape its exchange promises.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{exchange} message format error: expected {expected}, observed {observed}")]
pub struct MessageFormatError {
    pub exchange: Exchange,
    pub expected: String,
    pub observed: String,
}

impl MessageFormatError {
    pub fn new(
        exchange: Exchange,
        expected: impl Into<String>,
        observed: impl Into<String>,
    ) -> Self {
        Self {
            exchange,
            expected: expected.into(),
            observed: observed.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// Missing credentials, malformed endpoint composition or an unusable setting.
    /// Always raised before any network I/O.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    MessageFormat(#[from] MessageFormatError),

    /// Raised by a response validator with the exchange's own status code.
    #[error(
        "{exchange} API error (HTTP status {http_status}, API status {}): {message}",
        .code.as_deref().unwrap_or("unknown")
    )]
    Exchange {
        exchange: Exchange,
        http_status: u16,
        code: Option<String>,
        message: String,
        body: String,
    },

    #[error("Rate limit acquisition for {key} timed out after {waited:?}")]
    RateLimitTimeout { key: String, waited: Duration },

    #[error("Rate limit backend unavailable: {0}")]
    RateLimitBackendUnavailable(String),

    #[error("Request aborted by callback: {0}")]
    CallbackAbort(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),
}

impl ClientError {
    /// API status code carried by an exchange error.
    pub fn exchange_code(&self) -> Option<&str> {
        match self {
            Self::Exchange { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Pipeline stage a call was attempting when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Built,
    RateGated,
    Sent,
    Validated,
    Decoded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::RateGated => "rate_gated",
            Self::Sent => "sent",
            Self::Validated => "validated",
            Self::Decoded => "decoded",
        };
        f.write_str(name)
    }
}

/// A failed call, annotated with the stage it reached.
#[derive(Error, Debug)]
#[error("call failed at {stage} stage: {error}")]
pub struct CallError {
    pub stage: Stage,
    #[source]
    pub error: ClientError,
}

impl CallError {
    pub fn new(stage: Stage, error: impl Into<ClientError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    /// Adapter for `map_err` at a given stage.
    pub fn at<E: Into<ClientError>>(stage: Stage) -> impl FnOnce(E) -> Self {
        move |error| Self::new(stage, error)
    }

    pub fn into_inner(self) -> ClientError {
        self.error
    }
}
