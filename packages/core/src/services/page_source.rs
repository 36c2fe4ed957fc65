//! Page sources - what "next" and "previous" mean
//!
//! - [`DefaultPageSource`] walks the current page's sibling level, skipping
//!   inactive pages and pages whose lock state blocks entry
//! - [`PlaylistPageSource`] steps a cursor through a curated list of pages,
//!   possibly spanning several materials
//!
//! Both answer `None` at a traversal boundary. Boundary calls never move the
//! playlist cursor, so asking again keeps answering `None`.

use crate::models::{Page, PageKey, PageRef, PlaylistEntry};
use crate::services::page_loader::PageLoader;
use futures::future::join_all;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Sequential traversal over the sibling level
#[derive(Debug, Clone, Default)]
pub struct DefaultPageSource;

impl DefaultPageSource {
    pub async fn next_page_id(&self, loader: &Arc<PageLoader>, current: Option<&Page>) -> Option<PageRef> {
        self.scan(loader, current, Direction::Forward).await
    }

    pub async fn previous_page_id(
        &self,
        loader: &Arc<PageLoader>,
        current: Option<&Page>,
    ) -> Option<PageRef> {
        self.scan(loader, current, Direction::Backward).await
    }

    async fn scan(
        &self,
        loader: &Arc<PageLoader>,
        current: Option<&Page>,
        direction: Direction,
    ) -> Option<PageRef> {
        let current = loader.get_page(&current?.key()).await?;
        let parent_id = current.parent_id()?;
        let parent = loader
            .get_page(&PageKey::new(current.material_id.clone(), parent_id))
            .await?;

        let keys: Vec<PageKey> = parent
            .children
            .iter()
            .map(|id| PageKey::new(current.material_id.clone(), id.clone()))
            .collect();
        let siblings: Vec<Option<Arc<Page>>> =
            join_all(keys.iter().map(|key| loader.get_page(key))).await;

        let position = parent.children.iter().position(|id| *id == current.id)?;
        let eligible = |index: &usize| {
            siblings[*index]
                .as_ref()
                .is_some_and(|page| page.is_navigable())
        };

        let found = match direction {
            Direction::Forward => (position + 1..siblings.len()).find(eligible),
            Direction::Backward => (0..position).rev().find(eligible),
        }?;

        tracing::debug!(
            "Sibling traversal from '{}' {:?} resolved to '{}'",
            current.id,
            direction,
            parent.children[found]
        );
        Some(PageRef::in_material(
            current.material_id.clone(),
            parent.children[found].clone(),
        ))
    }
}

/// Cursor over a curated list of pages
///
/// The cursor starts at -1 so the first `next_page_id` yields entry 0.
#[derive(Debug, Clone)]
pub struct PlaylistPageSource {
    entries: Vec<PlaylistEntry>,
    cursor: isize,
}

impl PlaylistPageSource {
    pub fn new(entries: Vec<PlaylistEntry>) -> Self {
        Self { entries, cursor: -1 }
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn next_page_id(&mut self) -> Option<PageRef> {
        if self.cursor >= self.entries.len() as isize - 1 {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor as usize).map(PageRef::from)
    }

    pub fn previous_page_id(&mut self) -> Option<PageRef> {
        if self.cursor <= 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor as usize).map(PageRef::from)
    }

    /// Move the cursor onto `key` if it is part of the playlist
    ///
    /// An entry already under the cursor wins. Otherwise the nearest matching
    /// entry after the cursor is taken, then the nearest one before it, so a
    /// page listed twice never rewinds the playlist.
    pub fn sync_to(&mut self, key: &PageKey) -> bool {
        let at_cursor = usize::try_from(self.cursor)
            .ok()
            .and_then(|index| self.entries.get(index));
        if at_cursor.is_some_and(|entry| entry.matches(key)) {
            return true;
        }

        let after = usize::try_from(self.cursor + 1)
            .unwrap_or(0)
            .min(self.entries.len());
        let found = self.entries[after..]
            .iter()
            .position(|entry| entry.matches(key))
            .map(|offset| after + offset)
            .or_else(|| self.entries[..after].iter().rposition(|entry| entry.matches(key)));

        match found {
            Some(index) => {
                self.cursor = index as isize;
                true
            }
            None => false,
        }
    }
}

/// Active traversal strategy of a navigator
#[derive(Debug, Clone)]
pub enum PageSource {
    Default(DefaultPageSource),
    Playlist(PlaylistPageSource),
}

impl Default for PageSource {
    fn default() -> Self {
        PageSource::Default(DefaultPageSource)
    }
}

impl PageSource {
    pub fn playlist(entries: Vec<PlaylistEntry>) -> Self {
        PageSource::Playlist(PlaylistPageSource::new(entries))
    }

    /// Playlist entries, `None` for the default source
    pub fn playlist_entries(&self) -> Option<&[PlaylistEntry]> {
        match self {
            PageSource::Default(_) => None,
            PageSource::Playlist(source) => Some(source.entries()),
        }
    }

    /// Keep a playlist cursor aligned with direct navigation
    pub fn sync_to(&mut self, key: &PageKey) {
        if let PageSource::Playlist(source) = self {
            source.sync_to(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_entries() -> PlaylistPageSource {
        PlaylistPageSource::new(vec![
            PlaylistEntry::new("m1", "a"),
            PlaylistEntry::new("m2", "b"),
            PlaylistEntry::new("m1", "c"),
        ])
    }

    #[test]
    fn test_playlist_walks_forward_then_stops() {
        let mut source = three_entries();
        assert_eq!(source.cursor(), -1);

        let ids: Vec<String> = (0..3)
            .map(|_| source.next_page_id().unwrap().page_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert!(source.next_page_id().is_none());
        assert!(source.next_page_id().is_none());
        assert_eq!(source.cursor(), 2);

        assert_eq!(source.previous_page_id().unwrap().page_id, "b");
    }

    #[test]
    fn test_playlist_previous_boundary_is_idempotent() {
        let mut source = three_entries();
        assert!(source.previous_page_id().is_none());
        assert_eq!(source.cursor(), -1);

        source.next_page_id();
        assert!(source.previous_page_id().is_none());
        assert!(source.previous_page_id().is_none());
        assert_eq!(source.cursor(), 0);
    }

    #[test]
    fn test_playlist_entries_carry_material() {
        let mut source = three_entries();
        source.next_page_id();
        let second = source.next_page_id().unwrap();
        assert_eq!(second.material_id.as_deref(), Some("m2"));
    }

    #[test]
    fn test_empty_playlist_has_no_pages() {
        let mut source = PlaylistPageSource::new(Vec::new());
        assert!(source.next_page_id().is_none());
        assert!(source.previous_page_id().is_none());
        assert_eq!(source.cursor(), -1);
    }

    #[test]
    fn test_sync_to_moves_cursor_only_for_members() {
        let mut source = three_entries();
        assert!(source.sync_to(&PageKey::new("m2", "b")));
        assert_eq!(source.cursor(), 1);
        assert!(!source.sync_to(&PageKey::new("m9", "b")));
        assert_eq!(source.cursor(), 1);
        assert_eq!(source.next_page_id().unwrap().page_id, "c");
    }

    #[test]
    fn test_sync_to_keeps_position_in_repeated_playlist() {
        let mut source = PlaylistPageSource::new(vec![
            PlaylistEntry::new("m1", "a"),
            PlaylistEntry::new("m1", "c"),
            PlaylistEntry::new("m1", "a"),
            PlaylistEntry::new("m1", "d"),
        ]);
        let a = PageKey::new("m1", "a");

        source.next_page_id();
        source.next_page_id();
        assert_eq!(source.next_page_id().unwrap().page_id, "a");
        assert!(source.sync_to(&a));
        assert_eq!(source.cursor(), 2, "Entry under the cursor is kept");
        assert_eq!(source.next_page_id().unwrap().page_id, "d");

        // from the end, the nearest earlier occurrence is chosen
        assert!(source.sync_to(&a));
        assert_eq!(source.cursor(), 2);
    }

    #[test]
    fn test_sync_to_prefers_entry_after_cursor() {
        let mut source = PlaylistPageSource::new(vec![
            PlaylistEntry::new("m1", "a"),
            PlaylistEntry::new("m1", "c"),
            PlaylistEntry::new("m1", "a"),
        ]);
        source.next_page_id();
        source.next_page_id();

        assert!(source.sync_to(&PageKey::new("m1", "a")));
        assert_eq!(source.cursor(), 2);
    }
}
