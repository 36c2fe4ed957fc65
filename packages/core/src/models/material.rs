//! Material-level records
//!
//! A material is a content product (course, book) composed of pages. The
//! loader keeps a small [`MaterialInfo`] per material next to the cached pages;
//! the richer [`Material`] record comes from the metadata endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Descriptive metadata of a material
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub isbns: Vec<String>,
}

/// Material record returned by `metadata-for-current-material`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub numeric_id: Option<i64>,
    #[serde(default)]
    pub metadata: MaterialMetadata,
}

/// Per-material data recorded from page fetch responses
///
/// `material_id` and `content_type` are taken from the first response that
/// carries them and never overwritten afterwards. `last_page_id` follows the
/// most recent response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialInfo {
    pub material_id: Option<String>,
    pub content_type: Option<String>,
    pub last_page_id: Option<String>,
}

/// Permission flags of the current user on a material
///
/// The endpoint returns a flat JSON object; unknown keys are preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialPermissions(pub Map<String, Value>);

impl MaterialPermissions {
    /// `true` only when the flag is present and literally `true`
    pub fn allows(&self, permission: &str) -> bool {
        matches!(self.0.get(permission), Some(Value::Bool(true)))
    }
}

/// A single hit of `find-pages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundPage {
    pub page_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: Option<String>,
}
