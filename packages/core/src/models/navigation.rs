//! Navigation request and result types

use crate::models::Page;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Options accepted by `Navigator::change_page`
#[derive(Debug, Clone, PartialEq)]
pub struct PageChangeOptions {
    /// Push a new history entry (otherwise the current entry is replaced)
    pub add_to_history: bool,
    /// Skip any mapper registered for the target page
    pub ignore_page_mappers: bool,
    /// Resolve and run a content renderer for the new page
    pub load_content: bool,
    /// The transition was triggered by a backwards move
    pub back: bool,
    /// Caller-supplied data forwarded to page-changed listeners
    pub metadata: Option<Value>,
    /// Query parameters appended on full (cross-material) navigation
    pub url_params: Vec<(String, String)>,
}

impl Default for PageChangeOptions {
    fn default() -> Self {
        Self {
            add_to_history: true,
            ignore_page_mappers: false,
            load_content: true,
            back: false,
            metadata: None,
            url_params: Vec::new(),
        }
    }
}

impl PageChangeOptions {
    pub fn back(mut self, back: bool) -> Self {
        self.back = back;
        self
    }

    pub fn add_to_history(mut self, add_to_history: bool) -> Self {
        self.add_to_history = add_to_history;
        self
    }

    pub fn ignore_page_mappers(mut self, ignore: bool) -> Self {
        self.ignore_page_mappers = ignore;
        self
    }

    pub fn load_content(mut self, load_content: bool) -> Self {
        self.load_content = load_content;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn url_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.url_params.push((name.into(), value.into()));
        self
    }
}

/// State stored with a browser history entry
///
/// Serialized flat as `{"pageId": ...}` or `{"extraPage": ...}` so entries
/// written by the host page stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryState {
    #[serde(rename_all = "camelCase")]
    Page {
        page_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ExtraPage { extra_page: String },
}

impl HistoryState {
    pub fn page(page: &Page) -> Self {
        HistoryState::Page {
            page_id: page.id.clone(),
            material_id: Some(page.material_id.clone()),
        }
    }
}

/// What a renderer produced for a page
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    /// A registered renderer painted the page itself
    Rendered,
    /// Raw HTML fetched through the fallback content path
    Html(String),
}

/// Payload of the page-changed notification
#[derive(Debug, Clone)]
pub struct PageChangedEvent {
    pub page: Arc<Page>,
    pub previous: Option<Arc<Page>>,
    pub metadata: Option<Value>,
}

/// Result of a navigation request
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    /// A registered page mapper handled the request
    Mapped,
    /// The page was displayed in place
    Displayed {
        page: Arc<Page>,
        content: Option<PageContent>,
    },
    /// The host was asked to load a different document
    FullNavigation { url: String },
    /// A named extra page was opened
    ExtraPage { name: String },
    /// The page source has no page in the requested direction
    Boundary,
    /// The target could not be resolved to a page
    Unavailable { material_id: String, page_id: String },
}

impl NavigationOutcome {
    /// The displayed page, if the transition stayed in place
    pub fn displayed_page(&self) -> Option<&Arc<Page>> {
        match self {
            NavigationOutcome::Displayed { page, .. } => Some(page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let options = PageChangeOptions::default();
        assert!(options.add_to_history);
        assert!(!options.ignore_page_mappers);
        assert!(options.load_content);
        assert!(!options.back);
    }

    #[test]
    fn test_history_state_serialization_contract() {
        let page_state = HistoryState::Page {
            page_id: "p1".to_string(),
            material_id: None,
        };
        assert_eq!(serde_json::to_value(&page_state).unwrap(), json!({ "pageId": "p1" }));

        let extra: HistoryState =
            serde_json::from_value(json!({ "extraPage": "search" })).unwrap();
        assert_eq!(
            extra,
            HistoryState::ExtraPage {
                extra_page: "search".to_string()
            }
        );

        let with_material: HistoryState =
            serde_json::from_value(json!({ "pageId": "p2", "materialId": "m1" })).unwrap();
        assert!(matches!(
            with_material,
            HistoryState::Page { material_id: Some(ref m), .. } if m == "m1"
        ));
    }
}
