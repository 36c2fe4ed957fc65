//! Keyed page storage
//!
//! Pages are stored per material and handed out as `Arc<Page>`, so repeated
//! cache hits return the same allocation. There is no eviction: a page lives
//! for the whole session once fetched.

use crate::models::{MaterialInfo, Page, PageKey};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PageStore {
    /// Map: material_id → page_id → page
    pages: HashMap<String, HashMap<String, Arc<Page>>>,

    /// Map: material_id → recorded material data
    materials: HashMap<String, MaterialInfo>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure lookup, no side effects
    pub fn get_cached(&self, key: &PageKey) -> Option<Arc<Page>> {
        self.pages
            .get(&key.material_id)
            .and_then(|pages| pages.get(&key.page_id))
            .cloned()
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.pages
            .get(&key.material_id)
            .is_some_and(|pages| pages.contains_key(&key.page_id))
    }

    /// Store a fetched page under `material_id`
    ///
    /// The page adopts the store's material id, so `page.key()` always
    /// addresses the slot it was stored in.
    pub fn insert(&mut self, material_id: &str, mut page: Page) -> Arc<Page> {
        if page.material_id != material_id {
            page.material_id = material_id.to_string();
        }
        let page = Arc::new(page);
        self.pages
            .entry(material_id.to_string())
            .or_default()
            .insert(page.id.clone(), Arc::clone(&page));
        page
    }

    /// Mutate a cached page in place
    ///
    /// Copy-on-write: holders of the previous `Arc` keep their snapshot, later
    /// lookups see the updated record.
    pub fn update<F>(&mut self, key: &PageKey, update: F) -> Option<Arc<Page>>
    where
        F: FnOnce(&mut Page),
    {
        let slot = self
            .pages
            .get_mut(&key.material_id)?
            .get_mut(&key.page_id)?;
        update(Arc::make_mut(slot));
        Some(Arc::clone(slot))
    }

    /// Record material data carried by a fetch response
    pub fn record_material(
        &mut self,
        material_id: &str,
        response_material_id: Option<&str>,
        content_type: Option<&str>,
        last_page_id: Option<&str>,
    ) {
        let info = self.materials.entry(material_id.to_string()).or_default();
        if info.material_id.is_none() {
            info.material_id = response_material_id.map(str::to_string);
        }
        if info.content_type.is_none() {
            info.content_type = content_type.map(str::to_string);
        }
        if let Some(last_page_id) = last_page_id {
            info.last_page_id = Some(last_page_id.to_string());
        }
    }

    pub fn material(&self, material_id: &str) -> Option<&MaterialInfo> {
        self.materials.get(material_id)
    }

    /// Number of cached pages across all materials
    pub fn page_count(&self) -> usize {
        self.pages.values().map(HashMap::len).sum()
    }
}
