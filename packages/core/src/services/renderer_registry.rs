//! Content renderer registry
//!
//! Maps a page's content type to the [`ContentRenderer`] that paints it.
//! Content types without a registered renderer fall back to fetching the
//! page's URL with a cache-busting query parameter and returning the HTML.

use crate::error::{NavigationError, Result};
use crate::host::ContentRenderer;
use crate::models::{Page, PageContent};
use crate::transport::HttpClient;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

pub struct RendererRegistry {
    renderers: RwLock<HashMap<String, Arc<dyn ContentRenderer>>>,
    http: Arc<dyn HttpClient>,
    cache_bust_param: String,
}

impl RendererRegistry {
    pub fn new(http: Arc<dyn HttpClient>, cache_bust_param: impl Into<String>) -> Self {
        Self {
            renderers: RwLock::new(HashMap::new()),
            http,
            cache_bust_param: cache_bust_param.into(),
        }
    }

    /// Register (or replace) the renderer for a content type
    pub async fn register(&self, content_type: impl Into<String>, renderer: Arc<dyn ContentRenderer>) {
        self.renderers
            .write()
            .await
            .insert(content_type.into(), renderer);
    }

    pub async fn has_renderer(&self, content_type: &str) -> bool {
        self.renderers.read().await.contains_key(content_type)
    }

    pub async fn render(&self, page: &Page) -> Result<PageContent> {
        let renderer = self.renderers.read().await.get(&page.content_type).cloned();
        match renderer {
            Some(renderer) => renderer.render(page).await,
            None => {
                tracing::debug!(
                    "No renderer for content type '{}', fetching page content",
                    page.content_type
                );
                self.fetch_content(page).await
            }
        }
    }

    async fn fetch_content(&self, page: &Page) -> Result<PageContent> {
        let url = self.content_url(page, chrono::Utc::now().timestamp_millis())?;
        let html = self
            .http
            .get(&url)
            .await
            .map_err(|e| NavigationError::request_failed(&url, &e))?;
        Ok(PageContent::Html(html))
    }

    /// Page URL with the cache-busting parameter appended
    pub fn content_url(&self, page: &Page, stamp: i64) -> Result<String> {
        let raw = page
            .url
            .as_deref()
            .ok_or_else(|| NavigationError::missing_page_url(&page.id, "page has no URL"))?;
        let mut url = Url::parse(raw)
            .map_err(|e| NavigationError::missing_page_url(&page.id, e.to_string()))?;
        url.query_pairs_mut()
            .append_pair(&self.cache_bust_param, &stamp.to_string());
        Ok(url.into())
    }
}
