//! Learner-state persistence
//!
//! [`Storage`] is the only gateway to the persisted [`StorageDocument`].
//! Reads never fail: a missing backend, a missing document, unreadable bytes or
//! an unparsable document all yield the empty default, and old schema versions
//! are migrated on the way out. Writes replace the whole document and swallow
//! backend failures after logging them.
//!
//! The per-feature views ([`ProgressTracker`], [`QuizStore`],
//! [`CertificateStore`], [`BookmarkStore`], [`ReadingTracker`]) borrow a
//! `Storage` and do every mutation as a full read-modify-write through
//! [`Storage::update`].

pub mod backend;
pub mod document;
pub mod error;
pub mod migrate;

use std::sync::Arc;

use tracing::{debug, warn};

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use document::{
    BookmarkItem, CURRENT_VERSION, CertificateInfo, LastVisited, ProgressData, QuizResult,
    ReadingEntry, StorageDocument,
};
pub use error::StorageError;
pub use migrate::migrate;

use crate::clock::{Clock, SystemClock};
use crate::learning::{CertificateStore, ProgressTracker, QuizStore};
use crate::reading::{BookmarkStore, ReadingTracker};

/// Key the document is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "hoshizu-storage";

/// Gateway to the persisted learner-state document
#[derive(Debug)]
pub struct Storage {
    backend: Option<Box<dyn Backend>>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl Storage {
    /// Storage over `backend`, keeping the document under `key`
    pub fn new(backend: impl Backend + 'static, key: impl Into<String>) -> Self {
        Self { backend: Some(Box::new(backend)), key: key.into(), clock: Arc::new(SystemClock) }
    }

    /// Storage with no backend: every read is empty, every write is dropped
    pub fn detached() -> Self {
        Self { backend: None, key: DEFAULT_STORAGE_KEY.to_string(), clock: Arc::new(SystemClock) }
    }

    /// Ephemeral in-process storage
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), DEFAULT_STORAGE_KEY)
    }

    /// Replace the time source used for timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Key the document is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True when no backend is attached
    pub fn is_detached(&self) -> bool {
        self.backend.is_none()
    }

    /// Current time from the configured clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Read the current document, degrading every failure to the default
    pub fn read(&self) -> StorageDocument {
        let Some(backend) = &self.backend else {
            return StorageDocument::default();
        };

        let raw = match backend.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StorageDocument::default(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read storage document");
                return StorageDocument::default();
            }
        };

        let doc: StorageDocument = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unparsable storage document");
                return StorageDocument::default();
            }
        };

        if doc.version == CURRENT_VERSION { doc } else { migrate(doc) }
    }

    /// Persist the whole document, logging and dropping any failure
    pub fn write(&self, doc: &StorageDocument) {
        if self.backend.is_none() {
            debug!("No backend attached, dropping write");
            return;
        }
        if let Err(e) = self.try_write(doc) {
            warn!(key = %self.key, error = %e, "Failed to persist storage document");
        }
    }

    /// Persist the whole document, reporting failure to the caller
    pub fn try_write(&self, doc: &StorageDocument) -> Result<(), StorageError> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        let contents = serde_json::to_string(doc)?;
        backend.set_item(&self.key, &contents)?;
        debug!(key = %self.key, bytes = contents.len(), "Wrote storage document");
        Ok(())
    }

    /// Read, apply `f` to the owned copy, write it back, and return it
    ///
    /// The returned document reflects the intended state even if the write
    /// was dropped.
    pub fn update<F>(&self, f: F) -> StorageDocument
    where
        F: FnOnce(&mut StorageDocument),
    {
        let mut doc = self.read();
        f(&mut doc);
        self.write(&doc);
        doc
    }

    /// Remove the stored document entirely
    pub fn clear(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.remove_item(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to clear storage document");
        }
    }

    /// Lesson completion and last-visited pointer
    pub fn progress(&self) -> ProgressTracker<'_> {
        ProgressTracker::new(self)
    }

    /// Latest quiz result per lesson
    pub fn quizzes(&self) -> QuizStore<'_> {
        QuizStore::new(self)
    }

    /// Course certificates
    pub fn certificates(&self) -> CertificateStore<'_> {
        CertificateStore::new(self)
    }

    /// Saved content references
    pub fn bookmarks(&self) -> BookmarkStore<'_> {
        BookmarkStore::new(self)
    }

    /// Read articles
    pub fn reading(&self) -> ReadingTracker<'_> {
        ReadingTracker::new(self)
    }
}
