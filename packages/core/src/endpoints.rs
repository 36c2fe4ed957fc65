//! Consumed REST endpoint paths
//!
//! Paths are kept byte-compatible with the site-material and analytics
//! services. Every builder takes the configured base URL as prefix. Material
//! and page ids are percent-encoded as single path segments.

use crate::models::PageKey;
use percent_encoding::{utf8_percent_encode, AsciiSet, PercentEncode, CONTROLS};

const SITE_MATERIAL_API: &str = "/o/site-material-api";
const PROGRESS_STATUS: &str = "/o/analytics-framework/progress-status";

/// Characters that may not appear raw inside one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn segment(raw: &str) -> PercentEncode<'_> {
    utf8_percent_encode(raw, PATH_SEGMENT)
}

/// Which page listing endpoint a fetch uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchVariant {
    /// Plain page records
    Pages,
    /// Page records with stored scores
    PagesWithScores,
    /// Page records prepared for analytics score folding
    PagesForAnalytics,
}

impl FetchVariant {
    pub fn path_segment(self) -> &'static str {
        match self {
            FetchVariant::Pages => "pages",
            FetchVariant::PagesWithScores => "pages-with-scores",
            FetchVariant::PagesForAnalytics => "pages-for-analytics",
        }
    }
}

/// `GET {variant}/{materialId}/{pageId}[/{level}]`
pub fn pages_url(base: &str, variant: FetchVariant, key: &PageKey, level: Option<u32>) -> String {
    let mut url = format!(
        "{}{}/{}/{}/{}",
        base,
        SITE_MATERIAL_API,
        variant.path_segment(),
        segment(&key.material_id),
        segment(&key.page_id)
    );
    if let Some(level) = level {
        url.push_str(&format!("/{}", level));
    }
    url
}

pub fn page_scores_url(base: &str, key: &PageKey) -> String {
    format!(
        "{}{}/page-scores/{}/{}",
        base,
        SITE_MATERIAL_API,
        segment(&key.material_id),
        segment(&key.page_id)
    )
}

pub fn progress_status_url(base: &str) -> String {
    format!("{}{}", base, PROGRESS_STATUS)
}

pub fn permissions_url(base: &str, material_id: &str) -> String {
    format!(
        "{}{}/permissions/{}",
        base,
        SITE_MATERIAL_API,
        segment(material_id)
    )
}

pub fn material_metadata_url(base: &str, material_id: &str) -> String {
    format!(
        "{}{}/metadata-for-current-material/{}",
        base,
        SITE_MATERIAL_API,
        segment(material_id)
    )
}

pub fn find_pages_url(base: &str, material_id: &str) -> String {
    format!(
        "{}{}/find-pages/{}",
        base,
        SITE_MATERIAL_API,
        segment(material_id)
    )
}

pub fn set_bookmarks_url(base: &str, material_id: &str) -> String {
    format!(
        "{}{}/set-bookmarks/{}",
        base,
        SITE_MATERIAL_API,
        segment(material_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_url_variants() {
        let key = PageKey::new("m1", "p1");
        assert_eq!(
            pages_url("", FetchVariant::Pages, &key, None),
            "/o/site-material-api/pages/m1/p1"
        );
        assert_eq!(
            pages_url("https://x.test", FetchVariant::PagesWithScores, &key, Some(2)),
            "https://x.test/o/site-material-api/pages-with-scores/m1/p1/2"
        );
        assert_eq!(
            pages_url("", FetchVariant::PagesForAnalytics, &key, None),
            "/o/site-material-api/pages-for-analytics/m1/p1"
        );
    }

    #[test]
    fn test_material_endpoints() {
        assert_eq!(
            page_scores_url("", &PageKey::new("m1", "p1")),
            "/o/site-material-api/page-scores/m1/p1"
        );
        assert_eq!(progress_status_url(""), "/o/analytics-framework/progress-status");
        assert_eq!(permissions_url("", "m1"), "/o/site-material-api/permissions/m1");
        assert_eq!(
            material_metadata_url("", "m1"),
            "/o/site-material-api/metadata-for-current-material/m1"
        );
        assert_eq!(find_pages_url("", "m1"), "/o/site-material-api/find-pages/m1");
        assert_eq!(
            set_bookmarks_url("", "m1"),
            "/o/site-material-api/set-bookmarks/m1"
        );
    }

    #[test]
    fn test_ids_are_encoded_as_single_segments() {
        let key = PageKey::new("m 1", "ch/1?draft#top");
        assert_eq!(
            pages_url("", FetchVariant::Pages, &key, Some(1)),
            "/o/site-material-api/pages/m%201/ch%2F1%3Fdraft%23top/1"
        );
        assert_eq!(
            page_scores_url("", &PageKey::new("m1", "100%")),
            "/o/site-material-api/page-scores/m1/100%25"
        );
        assert_eq!(
            permissions_url("", "a/b"),
            "/o/site-material-api/permissions/a%2Fb"
        );
    }
}
