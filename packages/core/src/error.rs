//! Navigation Error Types
//!
//! Loader-level unavailability is not an error: a page that cannot be
//! resolved is reported as `None` / `NavigationOutcome::Unavailable`. The
//! variants below cover collaborator failures that callers must see.

use thiserror::Error;

/// Errors raised by the navigation engine and its API wrappers
#[derive(Error, Debug)]
pub enum NavigationError {
    /// The HTTP collaborator reported a failure
    #[error("Request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    /// A response body could not be decoded
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    /// A page lacks the absolute URL needed for full navigation or content fetch
    #[error("Page {page_id} has no usable URL: {reason}")]
    MissingPageUrl { page_id: String, reason: String },

    /// No handler is registered for the named extra page
    #[error("Unknown extra page: {0}")]
    UnknownExtraPage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NavigationError {
    /// Create a request failed error; the full `anyhow` chain is kept in the message
    pub fn request_failed(url: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::RequestFailed {
            url: url.into(),
            message: format!("{:#}", error),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(url: impl Into<String>, error: &serde_json::Error) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            message: error.to_string(),
        }
    }

    /// Create a missing page URL error
    pub fn missing_page_url(page_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MissingPageUrl {
            page_id: page_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NavigationError>;
