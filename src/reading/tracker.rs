//! Which articles a reader has opened

use std::collections::BTreeMap;

use tracing::debug;

use crate::storage::{ReadingEntry, Storage};

/// Read articles and when they were first read
#[derive(Debug, Clone, Copy)]
pub struct ReadingTracker<'a> {
    storage: &'a Storage,
}

impl<'a> ReadingTracker<'a> {
    pub(crate) fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Whether `slug` has been read
    pub fn is_read(&self, slug: &str) -> bool {
        self.storage.read().reading.contains_key(slug)
    }

    /// Record `slug` as read now
    ///
    /// The first read time is kept; marking again writes nothing.
    pub fn mark_read(&self, slug: &str) {
        if self.is_read(slug) {
            debug!(slug, "Already read, keeping first read time");
            return;
        }

        let read_at = self.storage.now();
        self.storage.update(|doc| {
            doc.reading.entry(slug.to_string()).or_insert(ReadingEntry { read_at });
        });
    }

    /// Number of read articles
    pub fn read_count(&self) -> usize {
        self.storage.read().reading.len()
    }

    /// Every read article with its first read time
    pub fn all_read(&self) -> BTreeMap<String, ReadingEntry> {
        self.storage.read().reading
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

    #[test]
    fn mark_read_records_time() {
        let clock = Arc::new(ManualClock::new(100));
        let storage = Storage::in_memory().with_clock(clock);
        let reading = storage.reading();

        assert!(!reading.is_read("intro-to-llms"));
        reading.mark_read("intro-to-llms");
        assert!(reading.is_read("intro-to-llms"));
        assert_eq!(reading.all_read()["intro-to-llms"], ReadingEntry { read_at: 100 });
    }

    #[test]
    fn first_read_time_is_kept() {
        let clock = Arc::new(ManualClock::new(100));
        let storage = Storage::in_memory().with_clock(clock.clone());
        let reading = storage.reading();

        reading.mark_read("a");
        clock.advance(3_600);
        reading.mark_read("a");

        assert_eq!(reading.all_read()["a"].read_at, 100);
        assert_eq!(reading.read_count(), 1);
    }

    #[test]
    fn counts_distinct_articles() {
        let storage = Storage::in_memory();
        let reading = storage.reading();

        for slug in ["a", "b", "c", "a"] {
            reading.mark_read(slug);
        }
        assert_eq!(reading.read_count(), 3);
        assert_eq!(reading.all_read().keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn broken_backend_reads_nothing() {
        let storage = Storage::new(BrokenBackend, DEFAULT_STORAGE_KEY);
        let reading = storage.reading();

        reading.mark_read("a");
        assert!(!reading.is_read("a"));
        assert_eq!(reading.read_count(), 0);
        assert!(reading.all_read().is_empty());
    }
}
