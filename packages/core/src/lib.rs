//! PageNav Core - page cache and navigation engine
//!
//! This crate keeps the pages of a learning material in memory, fetches
//! missing ones from the site-material REST endpoints, and drives page
//! transitions inside a single-page host.
//!
//! # Architecture
//!
//! - **One fetch at a time**: concurrent requests for uncached pages are
//!   buffered per page and answered from a single network round trip
//! - **Shared pages**: cached pages are `Arc<Page>`; updates are copy-on-write
//! - **Host seams**: history, content rendering, page mappers and HTTP are
//!   traits implemented by the embedding application
//!
//! # Modules
//!
//! - [`models`] - Pages, materials, navigation options and wire formats
//! - [`cache`] - Page store and per-page loading status
//! - [`services`] - Loader, page sources, listeners, renderers, navigator
//! - [`config`] - Navigator configuration
//! - [`endpoints`] - REST endpoint URL builders
//! - [`host`] / [`transport`] - Traits implemented by the embedding application

pub mod cache;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod host;
pub mod models;
pub mod services;
pub mod transport;

// Re-export commonly used types
pub use config::{AnalyticsConfig, NavigatorConfig};
pub use endpoints::FetchVariant;
pub use error::{NavigationError, Result};
pub use host::{BrowserHost, ContentRenderer, ExtraPageHandler, PageMapper};
pub use models::*;
pub use services::*;
pub use transport::HttpClient;
