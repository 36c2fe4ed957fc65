//! Per-key loading status used to coalesce concurrent requests
//!
//! Every `(material_id, page_id)` that has been requested gets a
//! [`LoadingStatus`] holding the callbacks waiting for it and a sticky
//! `failed` flag. Keys are kept ordered so drain passes are deterministic.

use crate::models::{Page, PageKey};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Callback waiting for a page; receives `None` when the page is unavailable
pub type PageCallback = Box<dyn FnOnce(Option<Arc<Page>>) + Send + 'static>;

#[derive(Default)]
pub struct LoadingStatus {
    /// Sticky until explicitly cleared; short-circuits further fetches
    pub failed: bool,
    buffer: Vec<PageCallback>,
}

impl LoadingStatus {
    pub fn push(&mut self, callback: PageCallback) {
        self.buffer.push(callback);
    }

    /// Remove and return every waiting callback in registration order
    pub fn take_buffer(&mut self) -> Vec<PageCallback> {
        std::mem::take(&mut self.buffer)
    }

    pub fn is_waiting(&self) -> bool {
        !self.buffer.is_empty()
    }
}

impl fmt::Debug for LoadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingStatus")
            .field("failed", &self.failed)
            .field("waiting", &self.buffer.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct LoadingStatusTable {
    statuses: BTreeMap<PageKey, LoadingStatus>,
}

impl LoadingStatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `{failed: false, buffer: []}` on first access
    pub fn get_or_create(&mut self, key: &PageKey) -> &mut LoadingStatus {
        self.statuses.entry(key.clone()).or_default()
    }

    pub fn get(&self, key: &PageKey) -> Option<&LoadingStatus> {
        self.statuses.get(key)
    }

    pub fn get_mut(&mut self, key: &PageKey) -> Option<&mut LoadingStatus> {
        self.statuses.get_mut(key)
    }

    pub fn is_failed(&self, key: &PageKey) -> bool {
        self.statuses.get(key).is_some_and(|status| status.failed)
    }

    pub fn mark_failed(&mut self, key: &PageKey) {
        self.get_or_create(key).failed = true;
    }

    /// Clear the sticky failure; returns whether the key had failed
    pub fn clear_failed(&mut self, key: &PageKey) -> bool {
        match self.statuses.get_mut(key) {
            Some(status) => std::mem::replace(&mut status.failed, false),
            None => false,
        }
    }

    /// Keys with at least one waiting callback, in key order
    pub fn waiting_keys(&self) -> Vec<PageKey> {
        self.statuses
            .iter()
            .filter(|(_, status)| status.is_waiting())
            .map(|(key, _)| key.clone())
            .collect()
    }
}
