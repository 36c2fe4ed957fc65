//! Navigator configuration
//!
//! `NavigatorConfig` is read once when the navigator is created. Every field
//! has a default so a host page only needs to supply the material id.
//!
//! ```json
//! {
//!   "baseUrl": "https://school.example.com",
//!   "materialId": "physics-1",
//!   "loadScores": true,
//!   "analytics": { "users": ["student-7"] },
//!   "incrementalLoad": true
//! }
//! ```

use crate::endpoints::FetchVariant;
use crate::error::{NavigationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Analytics integration settings; presence enables the integration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfig {
    /// Users whose task progress is folded into page scores
    #[serde(default)]
    pub users: Vec<String>,
}

/// Configuration for the page loader and navigator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigatorConfig {
    /// Prefix prepended to every endpoint path (empty for same-origin)
    pub base_url: String,

    /// Material currently displayed; bare page ids resolve against it
    pub material_id: String,

    /// Request pages together with their stored scores
    pub load_scores: bool,

    /// Fold analytics task progress into page scores
    pub analytics: Option<AnalyticsConfig>,

    /// Swap pages in place within a material instead of reloading the document
    pub incremental_load: bool,

    /// Hierarchy depth requested with each page fetch
    pub level_depth: Option<u32>,

    /// Query parameter used to bust caches on fallback content fetches
    pub cache_bust_param: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            material_id: String::new(),
            load_scores: true,
            analytics: None,
            incremental_load: true,
            level_depth: None,
            cache_bust_param: "t".to_string(),
        }
    }
}

impl NavigatorConfig {
    /// Default configuration for the given material
    pub fn for_material(material_id: impl Into<String>) -> Self {
        Self {
            material_id: material_id.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NavigationError::config_error(format!("invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        tracing::debug!("Loaded navigator config from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Exactly one fetch variant applies to every page request
    pub fn fetch_variant(&self) -> FetchVariant {
        if self.analytics.is_some() {
            FetchVariant::PagesForAnalytics
        } else if self.load_scores {
            FetchVariant::PagesWithScores
        } else {
            FetchVariant::Pages
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.material_id.is_empty() {
            return Err(NavigationError::config_error("materialId cannot be empty"));
        }

        if self.cache_bust_param.is_empty() {
            return Err(NavigationError::config_error(
                "cacheBustParam cannot be empty",
            ));
        }

        if let Some(analytics) = &self.analytics {
            if analytics.users.is_empty() {
                return Err(NavigationError::config_error(
                    "analytics requires at least one user",
                ));
            }
        }

        if self.level_depth == Some(0) {
            return Err(NavigationError::config_error(
                "levelDepth must be greater than 0 when set",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = NavigatorConfig::default();
        assert!(config.load_scores);
        assert!(config.incremental_load);
        assert!(config.analytics.is_none());
        assert_eq!(config.cache_bust_param, "t");
        // material id is mandatory
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = NavigatorConfig::for_material("m1");
        assert!(config.validate().is_ok());

        config.cache_bust_param = String::new();
        assert!(config.validate().is_err());

        config.cache_bust_param = "t".to_string();
        config.analytics = Some(AnalyticsConfig { users: vec![] });
        assert!(config.validate().is_err());

        config.analytics = Some(AnalyticsConfig {
            users: vec!["u1".to_string()],
        });
        assert!(config.validate().is_ok());

        config.level_depth = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetch_variant_selection() {
        let mut config = NavigatorConfig::for_material("m1");
        assert_eq!(config.fetch_variant(), FetchVariant::PagesWithScores);

        config.load_scores = false;
        assert_eq!(config.fetch_variant(), FetchVariant::Pages);

        // analytics wins regardless of the score flag
        config.analytics = Some(AnalyticsConfig {
            users: vec!["u1".to_string()],
        });
        assert_eq!(config.fetch_variant(), FetchVariant::PagesForAnalytics);
        config.load_scores = true;
        assert_eq!(config.fetch_variant(), FetchVariant::PagesForAnalytics);
    }

    #[test]
    fn test_from_json_str_fills_defaults() {
        let config =
            NavigatorConfig::from_json_str(r#"{ "materialId": "m1", "loadScores": false }"#)
                .unwrap();
        assert_eq!(config.material_id, "m1");
        assert!(!config.load_scores);
        assert!(config.incremental_load);

        assert!(NavigatorConfig::from_json_str("{ not json").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "materialId": "m9", "analytics": {{ "users": ["u1"] }} }}"#
        )
        .unwrap();

        let config = NavigatorConfig::load(file.path()).await.unwrap();
        assert_eq!(config.material_id, "m9");
        assert_eq!(config.fetch_variant(), FetchVariant::PagesForAnalytics);
    }
}
