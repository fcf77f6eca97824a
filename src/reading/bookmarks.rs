//! Saved content references

use std::cmp::Reverse;

use crate::storage::{BookmarkItem, Storage};

/// Bookmarks keyed by content slug
#[derive(Debug, Clone, Copy)]
pub struct BookmarkStore<'a> {
    storage: &'a Storage,
}

impl<'a> BookmarkStore<'a> {
    pub(crate) fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// All bookmarks, most recently bookmarked first
    pub fn list(&self) -> Vec<BookmarkItem> {
        let mut items: Vec<BookmarkItem> = self.storage.read().bookmark.into_values().collect();
        // Map order is by slug, so equal timestamps stay slug-ordered
        items.sort_by_key(|item| Reverse(item.bookmarked_at));
        items
    }

    /// Whether `slug` is bookmarked
    pub fn is_bookmarked(&self, slug: &str) -> bool {
        self.storage.read().bookmark.contains_key(slug)
    }

    /// Insert or replace the bookmark for `item.slug`
    pub fn add(&self, item: BookmarkItem) {
        self.storage.update(|doc| {
            doc.bookmark.insert(item.slug.clone(), item);
        });
    }

    /// Bookmark `slug` stamped with the current time
    pub fn add_now(&self, slug: &str, title: &str, content_type: &str) -> BookmarkItem {
        let item = BookmarkItem {
            slug: slug.to_string(),
            title: title.to_string(),
            content_type: content_type.to_string(),
            bookmarked_at: self.storage.now(),
        };
        self.add(item.clone());
        item
    }

    /// Remove the bookmark for `slug`; absent slugs are ignored
    pub fn remove(&self, slug: &str) {
        self.storage.update(|doc| {
            doc.bookmark.remove(slug);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::DEFAULT_STORAGE_KEY;
    use crate::storage::tests::BrokenBackend;
    use pretty_assertions::assert_eq;

    fn item(slug: &str, at: i64) -> BookmarkItem {
        BookmarkItem {
            slug: slug.into(),
            title: slug.to_uppercase(),
            content_type: "article".into(),
            bookmarked_at: at,
        }
    }

    #[test]
    fn add_and_check() {
        let storage = Storage::in_memory();
        let bookmarks = storage.bookmarks();

        assert!(!bookmarks.is_bookmarked("x"));
        bookmarks.add(item("x", 1));
        assert!(bookmarks.is_bookmarked("x"));
    }

    #[test]
    fn re_adding_replaces_entry() {
        let storage = Storage::in_memory();
        let bookmarks = storage.bookmarks();

        bookmarks.add(item("x", 1));
        bookmarks.add(BookmarkItem { title: "Renamed".into(), ..item("x", 9) });

        let list = bookmarks.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "Renamed");
        assert_eq!(list[0].bookmarked_at, 9);
    }

    #[test]
    fn list_is_most_recent_first() {
        let storage = Storage::in_memory();
        let bookmarks = storage.bookmarks();

        bookmarks.add(item("old", 10));
        bookmarks.add(item("newest", 30));
        bookmarks.add(item("middle", 20));

        let slugs: Vec<String> = bookmarks.list().into_iter().map(|b| b.slug).collect();
        assert_eq!(slugs, vec!["newest", "middle", "old"]);
    }

    #[test]
    fn equal_timestamps_order_by_slug() {
        let storage = Storage::in_memory();
        let bookmarks = storage.bookmarks();

        bookmarks.add(item("b", 5));
        bookmarks.add(item("a", 5));

        let slugs: Vec<String> = bookmarks.list().into_iter().map(|b| b.slug).collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let storage = Storage::in_memory();
        let bookmarks = storage.bookmarks();

        bookmarks.add(item("x", 1));
        bookmarks.remove("missing");
        assert!(bookmarks.is_bookmarked("x"));
        bookmarks.remove("x");
        assert!(!bookmarks.is_bookmarked("x"));
        assert!(bookmarks.list().is_empty());
    }

    #[test]
    fn add_now_uses_clock() {
        let clock = Arc::new(ManualClock::new(77));
        let storage = Storage::in_memory().with_clock(clock);

        let added = storage.bookmarks().add_now("guide-1", "Guide", "guide");
        assert_eq!(added.bookmarked_at, 77);
        assert_eq!(storage.bookmarks().list(), vec![added]);
    }

    #[test]
    fn broken_backend_lists_nothing() {
        let storage = Storage::new(BrokenBackend, DEFAULT_STORAGE_KEY);
        storage.bookmarks().add(item("x", 1));
        assert!(!storage.bookmarks().is_bookmarked("x"));
        assert!(storage.bookmarks().list().is_empty());
    }
}
