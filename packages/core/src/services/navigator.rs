//! Navigator - page transitions
//!
//! Turns "go to this page" requests into displayed pages. One `Navigator`
//! owns the whole navigation context: page loader and cache, current page,
//! active page source, listeners, renderers and host seams.
//!
//! # Decision Tree of `change_page`
//!
//! 1. A mapper registered for the target id takes over (unless
//!    `ignore_page_mappers`); nothing is fetched and no listener fires
//! 2. The page is resolved through the loader; unavailable pages end the
//!    transition with [`NavigationOutcome::Unavailable`]
//! 3. Pages hidden from navigation redirect: to the parent when moving back,
//!    otherwise to the first navigable child
//! 4. Same material with incremental load: before-load barrier, history
//!    entry, content renderer, page-changed listeners, then the page becomes
//!    current
//! 5. Anything else: before-load barrier, then a full navigation to the
//!    page's absolute URL
//!
//! Ephemeral listeners are pruned right after their list's dispatch round and
//! the remaining lists are pruned when the transition completes.

use crate::config::NavigatorConfig;
use crate::error::{NavigationError, Result};
use crate::host::{BrowserHost, ExtraPageHandler, PageMapper};
use crate::models::{
    HistoryState, LockState, NavigationOutcome, Page, PageChangeOptions, PageChangedEvent,
    PageKey, PageRef,
};
use crate::services::listener_registry::ListenerRegistry;
use crate::services::material_api::MaterialApi;
use crate::services::page_loader::PageLoader;
use crate::services::page_source::PageSource;
use crate::services::renderer_registry::RendererRegistry;
use crate::transport::HttpClient;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use url::Url;

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
}

struct NavigatorState {
    current: Option<Arc<Page>>,
    /// Material currently displayed; bare page ids resolve against it
    material_id: String,
    source: PageSource,
    font_size: Option<u32>,
    extra_page: Option<String>,
}

pub struct Navigator {
    config: Arc<NavigatorConfig>,
    loader: Arc<PageLoader>,
    browser: Arc<dyn BrowserHost>,
    listeners: ListenerRegistry,
    renderers: RendererRegistry,
    material_api: MaterialApi,
    mappers: RwLock<HashMap<String, Arc<dyn PageMapper>>>,
    extra_pages: RwLock<HashMap<String, Arc<dyn ExtraPageHandler>>>,
    state: Mutex<NavigatorState>,
}

impl Navigator {
    /// Create a navigator for the configured material
    pub fn new(
        config: NavigatorConfig,
        http: Arc<dyn HttpClient>,
        browser: Arc<dyn BrowserHost>,
    ) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        tracing::info!(
            "Navigator initializing for material '{}' ({} fetches, incremental load: {})",
            config.material_id,
            config.fetch_variant().path_segment(),
            config.incremental_load
        );

        Ok(Self {
            loader: PageLoader::new(Arc::clone(&http), Arc::clone(&config)),
            renderers: RendererRegistry::new(Arc::clone(&http), config.cache_bust_param.clone()),
            material_api: MaterialApi::new(http, config.base_url.clone()),
            listeners: ListenerRegistry::new(),
            browser,
            mappers: RwLock::new(HashMap::new()),
            extra_pages: RwLock::new(HashMap::new()),
            state: Mutex::new(NavigatorState {
                current: None,
                material_id: config.material_id.clone(),
                source: PageSource::default(),
                font_size: None,
                extra_page: None,
            }),
            config,
        })
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn loader(&self) -> &Arc<PageLoader> {
        &self.loader
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    pub fn material_api(&self) -> &MaterialApi {
        &self.material_api
    }

    pub async fn current_page(&self) -> Option<Arc<Page>> {
        self.state.lock().await.current.clone()
    }

    pub async fn current_material_id(&self) -> String {
        self.state.lock().await.material_id.clone()
    }

    pub async fn current_extra_page(&self) -> Option<String> {
        self.state.lock().await.extra_page.clone()
    }

    pub async fn register_mapper(&self, page_id: impl Into<String>, mapper: Arc<dyn PageMapper>) {
        self.mappers.write().await.insert(page_id.into(), mapper);
    }

    pub async fn remove_mapper(&self, page_id: &str) -> bool {
        self.mappers.write().await.remove(page_id).is_some()
    }

    pub async fn register_extra_page(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn ExtraPageHandler>,
    ) {
        self.extra_pages.write().await.insert(name.into(), handler);
    }

    /// Navigate to a page
    pub async fn change_page(
        &self,
        target: impl Into<PageRef>,
        options: PageChangeOptions,
    ) -> Result<NavigationOutcome> {
        self.transition(target.into(), options).await
    }

    fn transition(
        &self,
        target: PageRef,
        options: PageChangeOptions,
    ) -> BoxFuture<'_, Result<NavigationOutcome>> {
        async move {
            if !options.ignore_page_mappers {
                let mapper = self.mappers.read().await.get(&target.page_id).cloned();
                if let Some(mapper) = mapper {
                    tracing::info!("Page '{}' handled by registered mapper", target.page_id);
                    mapper.navigate(&target, &options).await?;
                    return Ok(NavigationOutcome::Mapped);
                }
            }

            let material_id = self.current_material_id().await;
            let key = target.resolve(&material_id);
            let Some(page) = self.loader.get_page(&key).await else {
                tracing::info!("Page '{}' is not available, staying put", key);
                return Ok(NavigationOutcome::Unavailable {
                    material_id: key.material_id,
                    page_id: key.page_id,
                });
            };

            if page.hide_from_navigation {
                return self.redirect_hidden(&page, options).await;
            }

            if key.material_id == material_id && self.config.incremental_load {
                self.display_in_place(page, options).await
            } else {
                self.navigate_away(page, options).await
            }
        }
        .boxed()
    }

    async fn redirect_hidden(
        &self,
        page: &Page,
        options: PageChangeOptions,
    ) -> Result<NavigationOutcome> {
        let target = if options.back {
            page.parent_id()
                .map(|parent| PageKey::new(page.material_id.clone(), parent))
        } else {
            self.first_navigable_child(page).await
        };

        match target {
            Some(target) => {
                tracing::info!(
                    "Page '{}' is hidden from navigation, redirecting to '{}'",
                    page.id,
                    target.page_id
                );
                self.transition(target.into(), options).await
            }
            None => {
                tracing::info!("Hidden page '{}' has no redirect target", page.id);
                Ok(NavigationOutcome::Unavailable {
                    material_id: page.material_id.clone(),
                    page_id: page.id.clone(),
                })
            }
        }
    }

    async fn first_navigable_child(&self, page: &Page) -> Option<PageKey> {
        for child_id in &page.children {
            let key = PageKey::new(page.material_id.clone(), child_id.clone());
            if let Some(child) = self.loader.get_page(&key).await {
                if child.is_navigable() {
                    return Some(key);
                }
            }
        }
        None
    }

    async fn display_in_place(
        &self,
        page: Arc<Page>,
        options: PageChangeOptions,
    ) -> Result<NavigationOutcome> {
        self.listeners.run_before_load(&page).await;

        let history = HistoryState::page(&page);
        if options.add_to_history {
            self.browser.push_state(&history, &page.title);
        } else {
            self.browser.replace_state(&history, &page.title);
        }

        let content = if options.load_content {
            Some(self.renderers.render(&page).await?)
        } else {
            None
        };

        let previous = self.current_page().await;
        let event = PageChangedEvent {
            page: Arc::clone(&page),
            previous,
            metadata: options.metadata.clone(),
        };
        self.listeners.emit_page_changed(&event).await;

        {
            let mut state = self.state.lock().await;
            state.current = Some(Arc::clone(&page));
            state.extra_page = None;
            state.source.sync_to(&page.key());
        }
        self.listeners.finish_transition().await;

        tracing::info!("Displayed page '{}'", page.key());
        Ok(NavigationOutcome::Displayed { page, content })
    }

    async fn navigate_away(
        &self,
        page: Arc<Page>,
        options: PageChangeOptions,
    ) -> Result<NavigationOutcome> {
        self.listeners.run_before_load(&page).await;
        let url = full_page_url(&page, &options.url_params)?;
        self.listeners.finish_transition().await;

        tracing::info!("Full navigation to '{}'", url);
        self.browser.assign(&url);
        Ok(NavigationOutcome::FullNavigation { url })
    }

    /// Navigate to the page source's next page
    pub async fn next_page(&self, options: PageChangeOptions) -> Result<NavigationOutcome> {
        match self.neighbour(Step::Next).await {
            Some(target) => self.change_page(target, options).await,
            None => Ok(NavigationOutcome::Boundary),
        }
    }

    /// Navigate to the page source's previous page; always a backwards move
    pub async fn previous_page(&self, options: PageChangeOptions) -> Result<NavigationOutcome> {
        match self.neighbour(Step::Previous).await {
            Some(target) => self.change_page(target, options.back(true)).await,
            None => Ok(NavigationOutcome::Boundary),
        }
    }

    /// Ask the active page source for a neighbour of the current page
    ///
    /// A playlist steps its cursor under the state lock. The sibling scan
    /// loads pages, so it runs on a copy of the stateless default source
    /// after the lock is released.
    async fn neighbour(&self, step: Step) -> Option<PageRef> {
        let (source, current) = {
            let mut state = self.state.lock().await;
            let current = state.current.clone();
            match &mut state.source {
                PageSource::Playlist(playlist) => {
                    return match step {
                        Step::Next => playlist.next_page_id(),
                        Step::Previous => playlist.previous_page_id(),
                    };
                }
                PageSource::Default(source) => (source.clone(), current),
            }
        };

        match step {
            Step::Next => source.next_page_id(&self.loader, current.as_deref()).await,
            Step::Previous => {
                source
                    .previous_page_id(&self.loader, current.as_deref())
                    .await
            }
        }
    }

    /// Replay a browser back/forward entry without adding history
    pub async fn handle_history_pop(&self, state: HistoryState) -> Result<NavigationOutcome> {
        match state {
            HistoryState::Page {
                page_id,
                material_id,
            } => {
                let target = PageRef {
                    material_id,
                    page_id,
                    related_content_id: None,
                };
                self.change_page(target, PageChangeOptions::default().add_to_history(false))
                    .await
            }
            HistoryState::ExtraPage { extra_page } => {
                self.open_extra_page(&extra_page, false).await
            }
        }
    }

    pub async fn open_extra_page(&self, name: &str, add_to_history: bool) -> Result<NavigationOutcome> {
        let handler = self
            .extra_pages
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| NavigationError::UnknownExtraPage(name.to_string()))?;

        let history = HistoryState::ExtraPage {
            extra_page: name.to_string(),
        };
        if add_to_history {
            self.browser.push_state(&history, name);
        } else {
            self.browser.replace_state(&history, name);
        }

        handler.open(name).await?;
        self.state.lock().await.extra_page = Some(name.to_string());
        tracing::info!("Opened extra page '{}'", name);
        Ok(NavigationOutcome::ExtraPage {
            name: name.to_string(),
        })
    }

    /// Navigate to the last viewed page recorded for the current material
    ///
    /// Returns `Ok(None)` when no fetch response has reported one yet.
    pub async fn open_last_viewed(
        &self,
        options: PageChangeOptions,
    ) -> Result<Option<NavigationOutcome>> {
        let material_id = self.current_material_id().await;
        let last_page_id = self
            .loader
            .material_info(&material_id)
            .await
            .and_then(|info| info.last_page_id);

        match last_page_id {
            Some(page_id) => Ok(Some(
                self.change_page(PageRef::in_material(material_id, page_id), options)
                    .await?,
            )),
            None => Ok(None),
        }
    }

    /// Switch the traversal strategy and notify playlist listeners
    pub async fn set_page_source(&self, source: PageSource) {
        let entries = source.playlist_entries().map(<[_]>::to_vec);
        self.state.lock().await.source = source;
        tracing::debug!(
            "Page source switched ({} playlist entries)",
            entries.as_ref().map_or(0, Vec::len)
        );
        self.listeners
            .emit_playlist_changed(entries.as_deref())
            .await;
    }

    pub async fn page_source(&self) -> PageSource {
        self.state.lock().await.source.clone()
    }

    pub async fn set_font_size(&self, size: u32) {
        self.state.lock().await.font_size = Some(size);
        self.listeners.emit_font_size(size).await;
    }

    pub async fn font_size(&self) -> Option<u32> {
        self.state.lock().await.font_size
    }

    /// Reload a page's scores and notify page-updated listeners
    pub async fn refresh_scores(&self, key: &PageKey) -> Result<Option<Arc<Page>>> {
        let updated = self.loader.refresh_scores(key).await?;
        if let Some(page) = &updated {
            self.publish_update(page).await;
        }
        Ok(updated)
    }

    /// Apply a lock-state change, clearing any sticky load failure of the key
    pub async fn update_lock_state(&self, key: &PageKey, lock_state: LockState) -> Option<Arc<Page>> {
        let updated = self.loader.update_lock_state(key, lock_state).await;
        if let Some(page) = &updated {
            self.publish_update(page).await;
        }
        updated
    }

    async fn publish_update(&self, page: &Arc<Page>) {
        {
            let mut state = self.state.lock().await;
            let is_current = state
                .current
                .as_ref()
                .is_some_and(|current| current.key() == page.key());
            if is_current {
                state.current = Some(Arc::clone(page));
            }
        }
        self.listeners.emit_page_updated(page).await;
    }
}

/// Absolute page URL with extra query parameters appended
fn full_page_url(page: &Page, params: &[(String, String)]) -> Result<String> {
    let raw = page
        .url
        .as_deref()
        .ok_or_else(|| NavigationError::missing_page_url(&page.id, "page has no URL"))?;
    let mut url =
        Url::parse(raw).map_err(|e| NavigationError::missing_page_url(&page.id, e.to_string()))?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url.into())
}
