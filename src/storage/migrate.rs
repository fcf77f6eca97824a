//! Schema migration for stored documents

use tracing::{debug, warn};

use super::document::{CURRENT_VERSION, StorageDocument};

/// Bring a document from an older schema up to [`CURRENT_VERSION`]
///
/// Version 1 documents only knew about progress and quiz results; the
/// certificate, bookmark and reading sections are started empty. Versions
/// this build does not know (including newer ones) are discarded.
pub fn migrate(old: StorageDocument) -> StorageDocument {
    match old.version {
        CURRENT_VERSION => old,
        1 => {
            debug!("Migrating storage document from version 1");
            StorageDocument {
                version: CURRENT_VERSION,
                progress: old.progress,
                quiz: old.quiz,
                ..StorageDocument::default()
            }
        }
        unknown => {
            warn!(version = unknown, "Unrecognized storage version, starting fresh");
            StorageDocument::default()
        }
    }
}
