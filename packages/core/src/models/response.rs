//! Wire formats consumed by the page loader

use crate::models::Page;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `GET /o/site-material-api/{pages|pages-with-scores|pages-for-analytics}/...`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesResponse {
    #[serde(default)]
    pub pages: HashMap<String, Page>,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub material_content_type: Option<String>,
    #[serde(default)]
    pub last_page_id: Option<String>,
}

/// One per-task record of `POST /o/analytics-framework/progress-status`
///
/// `score` is in points, `progress` in percent (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub page_id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub progress: f64,
}

/// Request body of the progress-status call
#[derive(Debug, Clone, Serialize)]
pub struct ProgressStatusRequest<'a> {
    pub material: &'a str,
    pub users: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pages_response_keyed_by_page_id() {
        let response: PagesResponse = serde_json::from_value(json!({
            "pages": {
                "p1": { "id": "p1", "title": "One" },
                "p2": { "id": "p2", "title": "Two" }
            },
            "materialId": "m1",
            "materialContentType": "book",
            "lastPageId": "p2"
        }))
        .unwrap();

        assert_eq!(response.pages.len(), 2);
        assert_eq!(response.pages["p2"].title, "Two");
        assert_eq!(response.last_page_id.as_deref(), Some("p2"));
    }

    #[test]
    fn test_task_progress_ignores_unknown_fields() {
        let records: Vec<TaskProgress> = serde_json::from_value(json!([
            { "pageId": "p1", "score": 2.0, "progress": 50.0, "tasks": ["t1"] },
            { "pageId": "p1", "score": 1.0, "progress": 100.0, "tasks": ["t2"] }
        ]))
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].progress, 100.0);
    }

    #[test]
    fn test_progress_request_shape() {
        let users = vec!["u1".to_string()];
        let body = serde_json::to_value(ProgressStatusRequest {
            material: "m1",
            users: &users,
        })
        .unwrap();

        assert_eq!(body, json!({ "material": "m1", "users": ["u1"] }));
    }
}
