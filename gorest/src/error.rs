//! Error types for the GoREST client

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or calling the remote API
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(reqwest::Error),

    /// Upstream answered with a 4xx or 5xx status
    #[error("HTTP {status} for url ({url})")]
    Status {
        /// Status code returned by the API
        status: StatusCode,
        /// URL that was requested, including the query string
        url: String,
    },

    /// Transport failure (connect, timeout, TLS)
    #[error("Request error")]
    Request(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("Failed to decode response from {url}")]
    Decode {
        /// URL that produced the body
        url: String,
        /// Underlying decode failure
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// Status code carried by an upstream HTTP error, if any
    ///
    /// Transport failures that happened after a response arrived also report
    /// the status reqwest attached to them.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) | Self::Client(e) => e.status(),
            Self::Decode { source, .. } => source.status(),
            Self::Config(_) => None,
        }
    }

    /// Whether this error came from a non-success API response
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
