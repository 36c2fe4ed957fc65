//! Navigation Services
//!
//! This module contains the services that sit between the REST endpoints and
//! the host page:
//!
//! - `PageLoader` - cache-first page access with coalesced fetches
//! - `ScoreAggregator` - folds per-task progress records into page scores
//! - `PageSource` - sibling or playlist traversal for next/previous
//! - `ListenerRegistry` - before-load, page-changed and related subscriptions
//! - `RendererRegistry` - content-type renderers with a fetch fallback
//! - `MaterialApi` - permissions, metadata, search and bookmarks
//! - `Navigator` - the page-transition controller tying everything together

pub mod listener_registry;
pub mod material_api;
pub mod navigator;
pub mod page_loader;
pub mod page_source;
pub mod renderer_registry;
pub mod score_aggregator;

pub use listener_registry::{
    BeforeLoadListener, FontSizeListener, ListenerId, ListenerKind, ListenerLifetime,
    ListenerRegistry, PageChangedListener, PageUpdatedListener, PlaylistChangedListener,
};
pub use material_api::MaterialApi;
pub use navigator::Navigator;
pub use page_loader::PageLoader;
pub use page_source::{DefaultPageSource, PageSource, PlaylistPageSource};
pub use renderer_registry::RendererRegistry;
pub use score_aggregator::{Achievement, ScoreAggregator, STARS_MAX};
