// src/error.rs
// =============================================================================
// Error types for the crawl engine.
//
// Only ConfigError is fatal: it is returned before any page is fetched.
// UrlError and FetchError are per-page problems. A bad URL is dropped, a
// failed fetch is recorded in the report, and the crawl keeps going.
// =============================================================================

use thiserror::Error;

/// A URL string that could not be parsed
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid URL '{url}': {source}")]
    Invalid {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout(error)
        } else if error.is_connect() {
            FetchError::Connect(error)
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error)
        } else {
            FetchError::Transport(error)
        }
    }
}

/// Invalid crawl configuration, detected before the run starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target URL must not be empty")]
    EmptyTarget,

    #[error("target URL '{0}' is not a valid URL")]
    InvalidTarget(String),

    #[error("target URL '{0}' has no host")]
    MissingHost(String),

    #[error("max_concurrent must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("at least one keyword is required")]
    NoKeywords,

    #[error("keywords must not be blank")]
    BlankKeyword,

    #[error("keyword '{keyword}' could not be compiled: {reason}")]
    InvalidKeyword { keyword: String, reason: String },
}
