//! Page Loader - coalesced page fetching
//!
//! Resolves page keys into cached [`Page`] records while guaranteeing that
//! identical requests never hit the network twice.
//!
//! # Load Cycle
//!
//! 1. A key marked `failed` answers `None` immediately (no retry)
//! 2. The callback joins the key's buffer
//! 3. If a fetch is already in flight the request stops here; the running
//!    cycle drains it later
//! 4. Otherwise a cycle starts: fetch, fold analytics scores, store pages
//! 5. A response that lacks the requested id marks that key `failed`
//! 6. Drain: every buffered key that is now cached (or failed) has its
//!    callbacks invoked in FIFO order; the first unresolved key is fetched next
//!
//! # Serialization
//!
//! The in-flight flag is global, not per key: while any fetch is outstanding
//! every other key only buffers. All page loads of a session are therefore
//! serialized through a single cycle.
//!
//! Cycles run on a spawned task, so dropping a waiting future never cancels a
//! fetch; its result is still written into the store.

use crate::cache::{LoadingStatusTable, PageCallback, PageStore};
use crate::config::NavigatorConfig;
use crate::endpoints::{self, FetchVariant};
use crate::error::{NavigationError, Result};
use crate::models::{
    LockState, MaterialInfo, Page, PageKey, PagesResponse, ProgressStatusRequest, ScoresPatch,
    TaskProgress,
};
use crate::services::score_aggregator::ScoreAggregator;
use crate::transport::HttpClient;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

/// Callbacks ready to run together with the value they receive
type ReadyBatch = Vec<(Vec<PageCallback>, Option<Arc<Page>>)>;

#[derive(Debug, Default)]
struct LoaderState {
    store: PageStore,
    statuses: LoadingStatusTable,
    fetch_in_flight: bool,
}

impl LoaderState {
    /// Collect callbacks for every resolvable buffered key; return the first
    /// key that still needs a fetch
    fn drain(&mut self, ready: &mut ReadyBatch) -> Option<PageKey> {
        let mut next = None;
        for key in self.statuses.waiting_keys() {
            let cached = self.store.get_cached(&key);
            let failed = self.statuses.is_failed(&key);
            if cached.is_some() || failed {
                if let Some(status) = self.statuses.get_mut(&key) {
                    ready.push((status.take_buffer(), cached));
                }
            } else if next.is_none() {
                next = Some(key);
            }
        }
        next
    }
}

enum FetchOutcome {
    /// The response was stored (the requested key may have been marked failed)
    Stored,
    /// Transport or decoding failure; nothing was stored
    Unreachable,
}

/// Coalescing page loader owning the page cache
pub struct PageLoader {
    http: Arc<dyn HttpClient>,
    config: Arc<NavigatorConfig>,
    state: Mutex<LoaderState>,
}

impl PageLoader {
    pub fn new(http: Arc<dyn HttpClient>, config: Arc<NavigatorConfig>) -> Arc<Self> {
        Arc::new(Self {
            http,
            config,
            state: Mutex::new(LoaderState::default()),
        })
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Pure cache lookup
    pub async fn get_cached(&self, key: &PageKey) -> Option<Arc<Page>> {
        self.state.lock().await.store.get_cached(key)
    }

    /// Return the cached page or load it
    ///
    /// Cache hits never touch the network and return the same `Arc` each time.
    pub async fn get_page(self: &Arc<Self>, key: &PageKey) -> Option<Arc<Page>> {
        if let Some(page) = self.get_cached(key).await {
            tracing::debug!("Cache hit for page '{}'", key);
            return Some(page);
        }
        self.load_page(key, self.config.level_depth).await
    }

    /// Load a page, resolving to `None` when it is not available
    pub async fn load_page(
        self: &Arc<Self>,
        key: &PageKey,
        level_depth: Option<u32>,
    ) -> Option<Arc<Page>> {
        let (tx, rx) = oneshot::channel();
        self.load_page_with(key, level_depth, move |page| {
            // receiver gone means the caller stopped waiting
            let _ = tx.send(page);
        })
        .await;
        rx.await.ok().flatten()
    }

    /// Callback form of [`load_page`](Self::load_page)
    ///
    /// The callback runs exactly once: immediately for a failed key, otherwise
    /// when a drain pass finds the key resolved.
    pub async fn load_page_with<F>(self: &Arc<Self>, key: &PageKey, level_depth: Option<u32>, callback: F)
    where
        F: FnOnce(Option<Arc<Page>>) + Send + 'static,
    {
        {
            let mut state = self.state.lock().await;
            let status = state.statuses.get_or_create(key);
            if status.failed {
                drop(state);
                tracing::debug!("Page '{}' previously failed, not fetching", key);
                callback(None);
                return;
            }

            status.push(Box::new(callback));
            if state.fetch_in_flight {
                tracing::debug!("Fetch in flight, buffering request for '{}'", key);
                return;
            }
            state.fetch_in_flight = true;
        }

        let loader = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            loader.run_fetch_cycle(key, level_depth).await;
        });
    }

    /// Fetch, store and drain until no buffered key is left unresolved
    async fn run_fetch_cycle(self: Arc<Self>, mut key: PageKey, mut level_depth: Option<u32>) {
        loop {
            let outcome = self.fetch_and_store(&key, level_depth).await;

            let mut ready = ReadyBatch::new();
            let claimed = {
                let mut state = self.state.lock().await;
                state.fetch_in_flight = false;

                if let FetchOutcome::Unreachable = outcome {
                    // answer current waiters without making the failure sticky
                    if let Some(status) = state.statuses.get_mut(&key) {
                        ready.push((status.take_buffer(), None));
                    }
                }

                let next = state.drain(&mut ready);
                if next.is_some() {
                    state.fetch_in_flight = true;
                }
                next
            };

            for (callbacks, page) in ready {
                for callback in callbacks {
                    callback(page.clone());
                }
            }

            match claimed {
                Some(next) => {
                    tracing::debug!("Drain continues with buffered page '{}'", next);
                    key = next;
                    level_depth = self.config.level_depth;
                }
                None => return,
            }
        }
    }

    async fn fetch_and_store(&self, key: &PageKey, level_depth: Option<u32>) -> FetchOutcome {
        let variant = self.config.fetch_variant();
        let url = endpoints::pages_url(&self.config.base_url, variant, key, level_depth);
        tracing::debug!("Fetching '{}' via {}", key, variant.path_segment());

        let body = match self.http.get(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("{}", NavigationError::request_failed(&url, &e));
                return FetchOutcome::Unreachable;
            }
        };

        let mut response: PagesResponse = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{}", NavigationError::malformed_response(&url, &e));
                return FetchOutcome::Unreachable;
            }
        };

        if variant == FetchVariant::PagesForAnalytics {
            self.merge_analytics_scores(key, &mut response).await;
        }

        let mut state = self.state.lock().await;
        state.store.record_material(
            &key.material_id,
            response.material_id.as_deref(),
            response.material_content_type.as_deref(),
            response.last_page_id.as_deref(),
        );

        let count = response.pages.len();
        for (page_id, mut page) in response.pages {
            // the map key is the addressable id, whatever the record says
            page.id = page_id;
            state.store.insert(&key.material_id, page);
        }

        if !state.store.contains(key) {
            tracing::warn!(
                "Response for '{}' did not contain the requested page, marking it failed",
                key
            );
            state.statuses.mark_failed(key);
        }
        tracing::debug!("Stored {} page(s) from '{}'", count, url);

        FetchOutcome::Stored
    }

    /// Fold analytics task progress into every page of the response
    ///
    /// Failures are logged and swallowed; the pages are delivered unchanged.
    async fn merge_analytics_scores(&self, key: &PageKey, response: &mut PagesResponse) {
        let Some(analytics) = &self.config.analytics else {
            return;
        };

        let material = response
            .material_id
            .clone()
            .unwrap_or_else(|| key.material_id.clone());
        let url = endpoints::progress_status_url(&self.config.base_url);
        let body = match serde_json::to_value(ProgressStatusRequest {
            material: &material,
            users: &analytics.users,
        }) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Could not encode progress request: {}", e);
                return;
            }
        };

        let records: Vec<TaskProgress> = match self.http.post(&url, &body).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("{}", NavigationError::malformed_response(&url, &e));
                    return;
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Analytics scores unavailable: {}",
                    NavigationError::request_failed(&url, &e)
                );
                return;
            }
        };

        let mut by_page: HashMap<&str, Vec<&TaskProgress>> = HashMap::new();
        for record in &records {
            by_page.entry(record.page_id.as_str()).or_default().push(record);
        }

        for (page_id, page) in response.pages.iter_mut() {
            let page_records = by_page.get(page_id.as_str());
            ScoreAggregator::fold(
                &mut page.scores,
                page.task_count,
                page_records.into_iter().flatten().copied(),
            );
        }
    }

    /// Fetch the page's stored scores and merge them into the cached record
    ///
    /// Returns `Ok(None)` when the page is not cached.
    pub async fn refresh_scores(&self, key: &PageKey) -> Result<Option<Arc<Page>>> {
        let url = endpoints::page_scores_url(&self.config.base_url, key);
        let body = self
            .http
            .get(&url)
            .await
            .map_err(|e| NavigationError::request_failed(&url, &e))?;
        let patch: ScoresPatch = serde_json::from_str(&body)
            .map_err(|e| NavigationError::malformed_response(&url, &e))?;

        let mut state = self.state.lock().await;
        Ok(state
            .store
            .update(key, |page| patch.apply_to(&mut page.scores)))
    }

    /// Apply a lock-state change and clear the key's sticky failure
    pub async fn update_lock_state(&self, key: &PageKey, lock_state: LockState) -> Option<Arc<Page>> {
        let mut state = self.state.lock().await;
        if state.statuses.clear_failed(key) {
            tracing::debug!("Cleared failure flag for '{}'", key);
        }
        state.store.update(key, |page| page.lock_state = lock_state)
    }

    pub async fn material_info(&self, material_id: &str) -> Option<MaterialInfo> {
        self.state.lock().await.store.material(material_id).cloned()
    }

    pub async fn is_failed(&self, key: &PageKey) -> bool {
        self.state.lock().await.statuses.is_failed(key)
    }

    pub async fn is_fetch_in_flight(&self) -> bool {
        self.state.lock().await.fetch_in_flight
    }

    pub async fn cached_page_count(&self) -> usize {
        self.state.lock().await.store.page_count()
    }
}
