//! HTTP Collaborator Abstraction
//!
//! The engine never talks to the network directly. The host supplies an
//! [`HttpClient`] implementation (browser fetch bridge, `reqwest`, a test
//! fake) and the loader and API wrappers go through it.
//!
//! # Design Decisions
//!
//! 1. **Bodies as text**: responses are returned as raw bodies so the same
//!    client serves JSON endpoints and HTML content fetches
//! 2. **Error Handling**: uses `anyhow::Result` for flexible error context;
//!    callers attach the URL when converting into `NavigationError`
//! 3. **No retry**: retry/backoff is the collaborator's concern, never the
//!    loader's

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Minimal HTTP surface required from the host
///
/// Implementations must be `Send + Sync`; the loader drives fetches from a
/// spawned task.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request and return the response body
    async fn get(&self, url: &str) -> Result<String>;

    /// Issue a POST request with a JSON body and return the response body
    async fn post(&self, url: &str, body: &Value) -> Result<String>;
}
