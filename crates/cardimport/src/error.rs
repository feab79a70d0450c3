//! Error types for CardImport

use crate::types::ContentKind;
use thiserror::Error;

/// Message shown when a failure has no better user-facing description
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error. See logs for details.";

/// Errors that can occur while classifying or downloading content
///
/// `Display` is the short message handed back to end users. Upstream
/// status codes and response bodies are logged, never embedded here.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input is empty
    #[error("invalid {0}")]
    InvalidInput(&'static str),

    /// No provider recognizes the input
    #[error("unsupported url")]
    UnsupportedSource,

    /// Provider recognized by host, but its identifier could not be extracted
    #[error("{0}")]
    MalformedIdentifier(&'static str),

    /// Upstream answered with a non-success status or an unusable body
    #[error("Failed to download {0}")]
    UpstreamFailure(ContentKind),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Network-layer failure
    #[error("Unknown error. See logs for details.")]
    RequestError(#[source] reqwest::Error),

    /// Anything else, including panics inside a fetcher
    #[error("Unknown error. See logs for details.")]
    Unknown(String),
}

impl ImportError {
    /// Wrap a reqwest error raised while sending or reading a request
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ImportError::RequestError(err)
    }
}
