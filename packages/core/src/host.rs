//! Host integration seams
//!
//! These traits describe what the embedding page provides: browser history
//! and location, content renderers per content type, page mappers that take
//! over navigation for specific pages, and handlers for named extra pages.

use crate::error::Result;
use crate::models::{HistoryState, Page, PageChangeOptions, PageContent, PageRef};
use async_trait::async_trait;

/// Browser history and location access
pub trait BrowserHost: Send + Sync {
    /// Push a new history entry
    fn push_state(&self, state: &HistoryState, title: &str);

    /// Replace the current history entry
    fn replace_state(&self, state: &HistoryState, title: &str);

    /// Load a different document
    fn assign(&self, url: &str);
}

/// Paints page content for one content type
#[async_trait]
pub trait ContentRenderer: Send + Sync {
    async fn render(&self, page: &Page) -> Result<PageContent>;
}

/// Takes over navigation for a specific page id
///
/// When a mapper is registered for a target the navigator delegates the whole
/// request to it: no fetch happens and no listener fires.
#[async_trait]
pub trait PageMapper: Send + Sync {
    async fn navigate(&self, target: &PageRef, options: &PageChangeOptions) -> Result<()>;
}

/// Opens a named non-page view (search, notes, ...)
#[async_trait]
pub trait ExtraPageHandler: Send + Sync {
    async fn open(&self, name: &str) -> Result<()>;
}
