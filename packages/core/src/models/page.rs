//! Page Data Structures
//!
//! This module defines the `Page` record cached by the loader and the small
//! reference types used to address pages across materials.
//!
//! # Addressing
//!
//! - [`PageKey`] - fully resolved `(material_id, page_id)` pair, used as cache key
//! - [`PageRef`] - a navigation target; the material is optional and defaults to
//!   the material currently displayed
//!
//! # Examples
//!
//! ```rust
//! use pagenav_core::models::{PageKey, PageRef};
//!
//! let bare = PageRef::from("page-42");
//! assert_eq!(bare.resolve("material-1"), PageKey::new("material-1", "page-42"));
//!
//! let qualified = PageRef::in_material("material-2", "page-7");
//! assert_eq!(qualified.resolve("material-1"), PageKey::new("material-2", "page-7"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access-control tag of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockState {
    #[default]
    Open,
    PreviouslyLocked,
    ShowInNavigationOnly,
    Locked,
}

impl LockState {
    /// Whether a page in this state may be entered through next/previous
    /// traversal or hidden-page redirection.
    pub fn blocks_navigation(self) -> bool {
        matches!(self, LockState::Locked | LockState::ShowInNavigationOnly)
    }
}

/// Score summary carried by every page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageScores {
    pub score: f64,
    pub score_max: f64,
    /// Completion ratio in `[0, 1]`
    pub progress: f64,
    pub visited: bool,
    pub stars: u8,
    pub stars_max: u8,
}

/// Partial score update as returned by the page-scores endpoint
///
/// Only the fields present in the response overwrite the cached values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoresPatch {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub score_max: Option<f64>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub visited: Option<bool>,
    #[serde(default)]
    pub stars: Option<u8>,
    #[serde(default)]
    pub stars_max: Option<u8>,
}

impl ScoresPatch {
    /// Merge the present fields into `scores`
    pub fn apply_to(&self, scores: &mut PageScores) {
        if let Some(score) = self.score {
            scores.score = score;
        }
        if let Some(score_max) = self.score_max {
            scores.score_max = score_max;
        }
        if let Some(progress) = self.progress {
            scores.progress = progress;
        }
        if let Some(visited) = self.visited {
            scores.visited = visited;
        }
        if let Some(stars) = self.stars {
            scores.stars = stars;
        }
        if let Some(stars_max) = self.stars_max {
            scores.stars_max = stars_max;
        }
    }
}

/// One navigable unit of a material.
///
/// # Fields
///
/// - `breadcrumb`: ancestor ids, root first; the last entry is the parent
/// - `children`: child ids in display order
/// - `page_index`: position among siblings
/// - `task_count`: number of tasks the page declares (drives progress averaging)
/// - `url`: absolute URL, used for full navigation and content fetches
///
/// Pages are never evicted during a session. Score and lock updates replace the
/// cached record in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub material_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub breadcrumb: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub page_index: i64,
    #[serde(default)]
    pub lock_state: LockState,
    #[serde(default)]
    pub lock_reasons: Vec<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub hide_from_children: bool,
    #[serde(default)]
    pub hide_from_navigation: bool,
    #[serde(default)]
    pub inactive: bool,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub scores: PageScores,
}

impl Page {
    /// Create a bare page belonging to `material_id`
    pub fn new(material_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            material_id: material_id.into(),
            ..Default::default()
        }
    }

    /// Cache key of this page
    pub fn key(&self) -> PageKey {
        PageKey::new(self.material_id.clone(), self.id.clone())
    }

    /// Id of the direct parent, `None` for a material root
    pub fn parent_id(&self) -> Option<&str> {
        self.breadcrumb.last().map(String::as_str)
    }

    /// A page is navigable unless it is inactive or its lock state blocks entry
    pub fn is_navigable(&self) -> bool {
        !self.inactive && !self.lock_state.blocks_navigation()
    }
}

/// Fully resolved cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageKey {
    pub material_id: String,
    pub page_id: String,
}

impl PageKey {
    pub fn new(material_id: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            material_id: material_id.into(),
            page_id: page_id.into(),
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.material_id, self.page_id)
    }
}

/// Navigation target
///
/// A bare page id (no material) resolves against the material currently
/// displayed. Playlist entries always carry their material and may point at
/// related content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    #[serde(default)]
    pub material_id: Option<String>,
    pub page_id: String,
    #[serde(default)]
    pub related_content_id: Option<String>,
}

impl PageRef {
    pub fn in_material(material_id: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            material_id: Some(material_id.into()),
            page_id: page_id.into(),
            related_content_id: None,
        }
    }

    /// Resolve into a cache key, falling back to `current_material`
    pub fn resolve(&self, current_material: &str) -> PageKey {
        PageKey::new(
            self.material_id
                .clone()
                .unwrap_or_else(|| current_material.to_string()),
            self.page_id.clone(),
        )
    }
}

impl From<&str> for PageRef {
    fn from(page_id: &str) -> Self {
        Self {
            material_id: None,
            page_id: page_id.to_string(),
            related_content_id: None,
        }
    }
}

impl From<String> for PageRef {
    fn from(page_id: String) -> Self {
        Self {
            material_id: None,
            page_id,
            related_content_id: None,
        }
    }
}

impl From<PageKey> for PageRef {
    fn from(key: PageKey) -> Self {
        Self::in_material(key.material_id, key.page_id)
    }
}

/// One entry of a teacher-curated playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub material_id: String,
    pub page_id: String,
    #[serde(default)]
    pub related_content_id: Option<String>,
}

impl PlaylistEntry {
    pub fn new(material_id: impl Into<String>, page_id: impl Into<String>) -> Self {
        Self {
            material_id: material_id.into(),
            page_id: page_id.into(),
            related_content_id: None,
        }
    }

    pub fn matches(&self, key: &PageKey) -> bool {
        self.material_id == key.material_id && self.page_id == key.page_id
    }
}

impl From<&PlaylistEntry> for PageRef {
    fn from(entry: &PlaylistEntry) -> Self {
        Self {
            material_id: Some(entry.material_id.clone()),
            page_id: entry.page_id.clone(),
            related_content_id: entry.related_content_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_deserialization_contract() {
        let json = json!({
            "id": "p1",
            "materialId": "m1",
            "title": "Intro",
            "breadcrumb": ["root", "chapter-1"],
            "children": ["p1-a", "p1-b"],
            "pageIndex": 2,
            "lockState": "SHOW_IN_NAVIGATION_ONLY",
            "hideFromNavigation": true,
            "contentType": "html",
            "taskCount": 3,
            "scores": { "score": 4.0, "scoreMax": 10.0, "starsMax": 3 }
        });

        let page: Page = serde_json::from_value(json).unwrap();
        assert_eq!(page.parent_id(), Some("chapter-1"));
        assert_eq!(page.lock_state, LockState::ShowInNavigationOnly);
        assert!(page.hide_from_navigation);
        assert!(!page.inactive);
        assert_eq!(page.task_count, 3);
        assert_eq!(page.scores.score_max, 10.0);
        assert_eq!(page.scores.stars_max, 3);
        assert!(!page.scores.visited);
        assert!(!page.is_navigable());
    }

    #[test]
    fn test_minimal_page_uses_defaults() {
        let page: Page = serde_json::from_value(json!({ "id": "only-id" })).unwrap();
        assert_eq!(page.lock_state, LockState::Open);
        assert!(page.parent_id().is_none());
        assert!(page.is_navigable());
    }

    #[test]
    fn test_lock_states_blocking_navigation() {
        assert!(!LockState::Open.blocks_navigation());
        assert!(!LockState::PreviouslyLocked.blocks_navigation());
        assert!(LockState::ShowInNavigationOnly.blocks_navigation());
        assert!(LockState::Locked.blocks_navigation());
    }

    #[test]
    fn test_scores_patch_merges_present_fields_only() {
        let mut scores = PageScores {
            score: 1.0,
            score_max: 10.0,
            progress: 0.1,
            visited: false,
            stars: 1,
            stars_max: 3,
        };

        let patch: ScoresPatch =
            serde_json::from_value(json!({ "score": 7.0, "visited": true })).unwrap();
        patch.apply_to(&mut scores);

        assert_eq!(scores.score, 7.0);
        assert!(scores.visited);
        assert_eq!(scores.score_max, 10.0);
        assert_eq!(scores.stars, 1);
    }

    #[test]
    fn test_playlist_entry_to_ref_keeps_related_content() {
        let mut entry = PlaylistEntry::new("m2", "p9");
        entry.related_content_id = Some("video-1".to_string());

        let page_ref = PageRef::from(&entry);
        assert_eq!(page_ref.material_id.as_deref(), Some("m2"));
        assert_eq!(page_ref.related_content_id.as_deref(), Some("video-1"));
        assert!(entry.matches(&PageKey::new("m2", "p9")));
    }
}
