//! Shared fixtures for integration tests
//!
//! `FakeSiteMaterialApi` serves the site-material and analytics endpoints
//! from in-memory pages. Responses can be held behind a gate so tests can pile
//! up concurrent requests before the first fetch completes.

#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use pagenav_core::{BrowserHost, HistoryState, HttpClient, LockState, Page, PagesResponse};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const BASE_URL: &str = "https://lms.test";

#[derive(Default)]
pub struct FakeSiteMaterialApi {
    materials: Mutex<HashMap<String, Vec<Page>>>,
    last_page: Mutex<HashMap<String, String>>,
    progress: Mutex<Option<Value>>,
    scores: Mutex<HashMap<String, Value>>,
    gate: Option<Arc<Semaphore>>,
    single_page: bool,
    page_fetches: AtomicUsize,
    gets: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Value)>>,
}

impl FakeSiteMaterialApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page fetches wait for a permit from the returned semaphore
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let api = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (api, gate)
    }

    /// Answer each page fetch with the requested page only
    pub fn serving_single_pages(mut self) -> Self {
        self.single_page = true;
        self
    }

    pub fn with_pages(self, material_id: &str, pages: Vec<Page>) -> Self {
        self.materials
            .lock()
            .unwrap()
            .insert(material_id.to_string(), pages);
        self
    }

    pub fn with_last_page(self, material_id: &str, page_id: &str) -> Self {
        self.last_page
            .lock()
            .unwrap()
            .insert(material_id.to_string(), page_id.to_string());
        self
    }

    /// Progress-status body; without one the endpoint answers with an error
    pub fn with_progress(self, records: Value) -> Self {
        *self.progress.lock().unwrap() = Some(records);
        self
    }

    pub fn with_scores(self, page_id: &str, scores: Value) -> Self {
        self.scores
            .lock()
            .unwrap()
            .insert(page_id.to_string(), scores);
        self
    }

    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap().clone()
    }

    fn pages_body(&self, material_id: &str, page_id: &str) -> Result<String> {
        let materials = self.materials.lock().unwrap();
        let pages = materials
            .get(material_id)
            .ok_or_else(|| anyhow!("404: unknown material {}", material_id))?;
        let response = PagesResponse {
            pages: pages
                .iter()
                .filter(|page| !self.single_page || page.id == page_id)
                .map(|page| (page.id.clone(), page.clone()))
                .collect(),
            material_id: Some(material_id.to_string()),
            material_content_type: Some("book".to_string()),
            last_page_id: self.last_page.lock().unwrap().get(material_id).cloned(),
        };
        Ok(serde_json::to_string(&response)?)
    }
}

#[async_trait]
impl HttpClient for FakeSiteMaterialApi {
    async fn get(&self, url: &str) -> Result<String> {
        self.gets.lock().unwrap().push(url.to_string());

        let Some(path) = url
            .strip_prefix(BASE_URL)
            .and_then(|rest| rest.strip_prefix("/o/site-material-api/"))
        else {
            return Ok(format!("<article>{}</article>", url));
        };
        let segments: Vec<&str> = path.split('/').collect();

        match segments.as_slice() {
            ["pages" | "pages-with-scores" | "pages-for-analytics", material_id, page_id, ..] => {
                self.page_fetches.fetch_add(1, Ordering::SeqCst);
                if let Some(gate) = &self.gate {
                    gate.acquire().await?.forget();
                }
                self.pages_body(material_id, page_id)
            }
            ["page-scores", _material_id, page_id] => self
                .scores
                .lock()
                .unwrap()
                .get(*page_id)
                .map(Value::to_string)
                .ok_or_else(|| anyhow!("404: no scores for {}", page_id)),
            _ => bail!("404: {}", url),
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<String> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        if url.ends_with("/o/analytics-framework/progress-status") {
            return match &*self.progress.lock().unwrap() {
                Some(records) => Ok(records.to_string()),
                None => bail!("503: analytics unavailable"),
            };
        }
        Ok(json!([]).to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCall {
    Push(HistoryState),
    Replace(HistoryState),
    Assign(String),
}

#[derive(Default)]
pub struct RecordingBrowser {
    calls: Mutex<Vec<BrowserCall>>,
}

impl RecordingBrowser {
    pub fn calls(&self) -> Vec<BrowserCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl BrowserHost for RecordingBrowser {
    fn push_state(&self, state: &HistoryState, _title: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(BrowserCall::Push(state.clone()));
    }

    fn replace_state(&self, state: &HistoryState, _title: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(BrowserCall::Replace(state.clone()));
    }

    fn assign(&self, url: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(BrowserCall::Assign(url.to_string()));
    }
}

/// Page with hierarchy links; the parent is the last breadcrumb entry
pub fn page(material_id: &str, id: &str, breadcrumb: &[&str], children: &[&str]) -> Page {
    let mut page = Page::new(material_id, id);
    page.title = format!("Page {}", id);
    page.breadcrumb = breadcrumb.iter().map(|s| s.to_string()).collect();
    page.children = children.iter().map(|s| s.to_string()).collect();
    page.content_type = "html".to_string();
    page.url = Some(format!("https://{}.test/{}", material_id, id));
    page
}

pub fn locked(mut page: Page, lock_state: LockState) -> Page {
    page.lock_state = lock_state;
    page
}

/// Material `m1`: root with chapters a..e
///
/// - `b` is locked
/// - `h` is hidden from navigation; its children are `h1` (inactive) and `h2`
pub fn course_pages() -> Vec<Page> {
    let mut h1 = page("m1", "h1", &["root", "h"], &[]);
    h1.inactive = true;
    let mut h = page("m1", "h", &["root"], &["h1", "h2"]);
    h.hide_from_navigation = true;

    vec![
        page("m1", "root", &[], &["a", "b", "c", "h", "d"]),
        page("m1", "a", &["root"], &[]),
        locked(page("m1", "b", &["root"], &[]), LockState::Locked),
        page("m1", "c", &["root"], &[]),
        h,
        h1,
        page("m1", "h2", &["root", "h"], &[]),
        page("m1", "d", &["root"], &[]),
    ]
}
