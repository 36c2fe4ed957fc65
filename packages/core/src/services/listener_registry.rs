//! Listener Registry
//!
//! Ordered subscription lists for navigation events:
//!
//! - **before-load**: async; every returned future must settle before a
//!   transition proceeds
//! - **page-changed**: fired after an in-place transition
//! - **page-updated**: fired when a cached page's scores or lock state change
//! - **font-size**: fired when the reading font size changes
//! - **playlist-changed**: fired when the page source is switched
//!
//! Registration order is dispatch order. A subscription registered with
//! [`ListenerLifetime::UntilNextPageChange`] is removed by the pruning pass
//! that follows its list's dispatch round in the next page transition.

use crate::models::{Page, PageChangedEvent, PlaylistEntry};
use futures::future::{join_all, BoxFuture};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type BeforeLoadListener = Arc<dyn Fn(Arc<Page>) -> BoxFuture<'static, ()> + Send + Sync>;
pub type PageChangedListener = Arc<dyn Fn(&PageChangedEvent) + Send + Sync>;
pub type PageUpdatedListener = Arc<dyn Fn(&Page) + Send + Sync>;
pub type FontSizeListener = Arc<dyn Fn(u32) + Send + Sync>;
pub type PlaylistChangedListener = Arc<dyn Fn(Option<&[PlaylistEntry]>) + Send + Sync>;

/// Handle returned on registration, used for explicit removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerLifetime {
    Persistent,
    /// Removed after the next page transition
    UntilNextPageChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    BeforeLoad,
    PageChanged,
    PageUpdated,
    FontSize,
    PlaylistChanged,
}

struct Subscription<F> {
    id: ListenerId,
    callback: F,
    lifetime: ListenerLifetime,
}

struct ListenerList<F> {
    entries: Vec<Subscription<F>>,
}

impl<F: Clone> ListenerList<F> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add(&mut self, id: ListenerId, callback: F, lifetime: ListenerLifetime) {
        self.entries.push(Subscription {
            id,
            callback,
            lifetime,
        });
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Callbacks in registration order; dispatch runs without holding the lock
    fn snapshot(&self) -> Vec<F> {
        self.entries
            .iter()
            .map(|entry| entry.callback.clone())
            .collect()
    }

    fn prune_ephemeral(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.lifetime == ListenerLifetime::Persistent);
        before - self.entries.len()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct ListenerRegistry {
    next_id: AtomicU64,
    before_load: RwLock<ListenerList<BeforeLoadListener>>,
    page_changed: RwLock<ListenerList<PageChangedListener>>,
    page_updated: RwLock<ListenerList<PageUpdatedListener>>,
    font_size: RwLock<ListenerList<FontSizeListener>>,
    playlist_changed: RwLock<ListenerList<PlaylistChangedListener>>,
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            before_load: RwLock::new(ListenerList::new()),
            page_changed: RwLock::new(ListenerList::new()),
            page_updated: RwLock::new(ListenerList::new()),
            font_size: RwLock::new(ListenerList::new()),
            playlist_changed: RwLock::new(ListenerList::new()),
        }
    }

    fn allocate_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn on_before_load<F>(&self, lifetime: ListenerLifetime, listener: F) -> ListenerId
    where
        F: Fn(Arc<Page>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.before_load
            .write()
            .await
            .add(id, Arc::new(listener), lifetime);
        id
    }

    pub async fn on_page_changed<F>(&self, lifetime: ListenerLifetime, listener: F) -> ListenerId
    where
        F: Fn(&PageChangedEvent) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.page_changed
            .write()
            .await
            .add(id, Arc::new(listener), lifetime);
        id
    }

    pub async fn on_page_updated<F>(&self, lifetime: ListenerLifetime, listener: F) -> ListenerId
    where
        F: Fn(&Page) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.page_updated
            .write()
            .await
            .add(id, Arc::new(listener), lifetime);
        id
    }

    pub async fn on_font_size<F>(&self, lifetime: ListenerLifetime, listener: F) -> ListenerId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.font_size
            .write()
            .await
            .add(id, Arc::new(listener), lifetime);
        id
    }

    pub async fn on_playlist_changed<F>(&self, lifetime: ListenerLifetime, listener: F) -> ListenerId
    where
        F: Fn(Option<&[PlaylistEntry]>) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.playlist_changed
            .write()
            .await
            .add(id, Arc::new(listener), lifetime);
        id
    }

    /// Remove a subscription from whichever list holds it
    pub async fn remove(&self, id: ListenerId) -> bool {
        self.before_load.write().await.remove(id)
            || self.page_changed.write().await.remove(id)
            || self.page_updated.write().await.remove(id)
            || self.font_size.write().await.remove(id)
            || self.playlist_changed.write().await.remove(id)
    }

    /// Run every before-load listener and wait until all of them settled,
    /// then prune the list's ephemeral subscriptions
    pub async fn run_before_load(&self, page: &Arc<Page>) {
        let listeners = self.before_load.read().await.snapshot();
        if !listeners.is_empty() {
            tracing::debug!(
                "Waiting for {} before-load listener(s) on '{}'",
                listeners.len(),
                page.id
            );
            join_all(listeners.iter().map(|listener| listener(Arc::clone(page)))).await;
        }
        self.prune_ephemeral(ListenerKind::BeforeLoad).await;
    }

    /// Fire page-changed listeners, then prune the list's ephemeral subscriptions
    pub async fn emit_page_changed(&self, event: &PageChangedEvent) {
        let listeners = self.page_changed.read().await.snapshot();
        for listener in listeners {
            listener(event);
        }
        self.prune_ephemeral(ListenerKind::PageChanged).await;
    }

    pub async fn emit_page_updated(&self, page: &Page) {
        let listeners = self.page_updated.read().await.snapshot();
        for listener in listeners {
            listener(page);
        }
    }

    pub async fn emit_font_size(&self, size: u32) {
        let listeners = self.font_size.read().await.snapshot();
        for listener in listeners {
            listener(size);
        }
    }

    pub async fn emit_playlist_changed(&self, entries: Option<&[PlaylistEntry]>) {
        let listeners = self.playlist_changed.read().await.snapshot();
        for listener in listeners {
            listener(entries);
        }
    }

    /// Remove the ephemeral subscriptions of one list
    pub async fn prune_ephemeral(&self, kind: ListenerKind) -> usize {
        let removed = match kind {
            ListenerKind::BeforeLoad => self.before_load.write().await.prune_ephemeral(),
            ListenerKind::PageChanged => self.page_changed.write().await.prune_ephemeral(),
            ListenerKind::PageUpdated => self.page_updated.write().await.prune_ephemeral(),
            ListenerKind::FontSize => self.font_size.write().await.prune_ephemeral(),
            ListenerKind::PlaylistChanged => self.playlist_changed.write().await.prune_ephemeral(),
        };
        if removed > 0 {
            tracing::debug!("Pruned {} ephemeral {:?} listener(s)", removed, kind);
        }
        removed
    }

    /// Close a page transition: prune the lists that were not dispatched in it
    pub async fn finish_transition(&self) {
        for kind in [
            ListenerKind::PageChanged,
            ListenerKind::PageUpdated,
            ListenerKind::FontSize,
            ListenerKind::PlaylistChanged,
        ] {
            self.prune_ephemeral(kind).await;
        }
    }

    pub async fn count(&self, kind: ListenerKind) -> usize {
        match kind {
            ListenerKind::BeforeLoad => self.before_load.read().await.len(),
            ListenerKind::PageChanged => self.page_changed.read().await.len(),
            ListenerKind::PageUpdated => self.page_updated.read().await.len(),
            ListenerKind::FontSize => self.font_size.read().await.len(),
            ListenerKind::PlaylistChanged => self.playlist_changed.read().await.len(),
        }
    }
}
