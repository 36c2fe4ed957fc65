//! Material API wrappers
//!
//! Thin typed access to the material-level site-material endpoints used next
//! to the page cache: permissions, material metadata, page search and
//! bookmarks.

use crate::endpoints;
use crate::error::{NavigationError, Result};
use crate::models::{FoundPage, Material, MaterialPermissions};
use crate::transport::HttpClient;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct MaterialApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl MaterialApi {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn permissions(&self, material_id: &str) -> Result<MaterialPermissions> {
        self.get_json(&endpoints::permissions_url(&self.base_url, material_id))
            .await
    }

    pub async fn material_metadata(&self, material_id: &str) -> Result<Material> {
        self.get_json(&endpoints::material_metadata_url(&self.base_url, material_id))
            .await
    }

    /// Full-text page search within a material
    pub async fn find_pages(&self, material_id: &str, query: &str) -> Result<Vec<FoundPage>> {
        let url = endpoints::find_pages_url(&self.base_url, material_id);
        self.post_json(&url, &json!({ "query": query })).await
    }

    /// Replace the user's bookmarked pages in a material
    pub async fn set_bookmarks(&self, material_id: &str, page_ids: &[String]) -> Result<()> {
        let url = endpoints::set_bookmarks_url(&self.base_url, material_id);
        self.http
            .post(&url, &json!({ "bookmarks": page_ids }))
            .await
            .map_err(|e| NavigationError::request_failed(&url, &e))?;
        tracing::debug!("Stored {} bookmark(s) for material '{}'", page_ids.len(), material_id);
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self
            .http
            .get(url)
            .await
            .map_err(|e| NavigationError::request_failed(url, &e))?;
        serde_json::from_str(&body).map_err(|e| NavigationError::malformed_response(url, &e))
    }

    async fn post_json<T: DeserializeOwned>(&self, url: &str, payload: &Value) -> Result<T> {
        let body = self
            .http
            .post(url, payload)
            .await
            .map_err(|e| NavigationError::request_failed(url, &e))?;
        serde_json::from_str(&body).map_err(|e| NavigationError::malformed_response(url, &e))
    }
}
