//! Page cache
//!
//! - [`PageStore`] - cached pages and per-material metadata
//! - [`LoadingStatusTable`] - per-key waiters and sticky failure flags

mod loading_status;
mod page_store;

pub use loading_status::{LoadingStatus, LoadingStatusTable, PageCallback};
pub use page_store::PageStore;
