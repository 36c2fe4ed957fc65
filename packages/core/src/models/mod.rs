//! Data Models
//!
//! This module contains the data structures shared by the cache and the
//! navigation layer:
//!
//! - `Page` - one navigable unit of a material, with lock state and scores
//! - `Material` / `MaterialInfo` - per-material metadata
//! - Navigation options, history state and outcomes
//! - Wire formats of the consumed REST endpoints

mod material;
mod navigation;
mod page;
mod response;

pub use material::{FoundPage, Material, MaterialInfo, MaterialMetadata, MaterialPermissions};
pub use navigation::{
    HistoryState, NavigationOutcome, PageChangeOptions, PageChangedEvent, PageContent,
};
pub use page::{LockState, Page, PageKey, PageRef, PageScores, PlaylistEntry, ScoresPatch};
pub use response::{PagesResponse, ProgressStatusRequest, TaskProgress};
