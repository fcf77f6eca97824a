//! Lesson completion tracking for courses and books

use tracing::debug;

use crate::storage::document::percent_of;
use crate::storage::{LastVisited, ProgressData, Storage};

/// Completion sets per course and the last-visited pointer
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker<'a> {
    storage: &'a Storage,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Current progress data
    pub fn data(&self) -> ProgressData {
        self.storage.read().progress
    }

    /// Whether `slug` has been completed in `course_id`
    pub fn is_complete(&self, course_id: &str, slug: &str) -> bool {
        self.storage.read().progress.is_complete(course_id, slug)
    }

    /// Add `slug` to the course's completion set
    ///
    /// Marking an already-completed lesson returns the current state without
    /// writing.
    pub fn mark_complete(&self, course_id: &str, slug: &str) -> ProgressData {
        let doc = self.storage.read();
        if doc.progress.is_complete(course_id, slug) {
            return doc.progress;
        }

        debug!(course_id, slug, "Marking lesson complete");
        self.storage
            .update(|doc| {
                let slugs = doc.progress.completed_lessons.entry(course_id.to_string()).or_default();
                if !slugs.iter().any(|s| s == slug) {
                    slugs.push(slug.to_string());
                }
            })
            .progress
    }

    /// Remove `slug` from the course's completion set
    ///
    /// Always persists, even if the lesson was not complete.
    pub fn unmark_complete(&self, course_id: &str, slug: &str) -> ProgressData {
        debug!(course_id, slug, "Unmarking lesson complete");
        self.storage
            .update(|doc| {
                if let Some(slugs) = doc.progress.completed_lessons.get_mut(course_id) {
                    slugs.retain(|s| s != slug);
                }
            })
            .progress
    }

    /// Completed lessons as a rounded percentage of `total_lessons`
    ///
    /// Returns 0 for a course with no lessons.
    pub fn completion_percent(&self, course_id: &str, total_lessons: usize) -> u8 {
        percent_of(self.storage.read().progress.completed_count(course_id), total_lessons)
    }

    /// Completed lesson slugs for a course, in completion order
    pub fn completed_lessons(&self, course_id: &str) -> Vec<String> {
        self.storage.read().progress.completed_lessons.remove(course_id).unwrap_or_default()
    }

    /// Courses with at least one recorded completion entry
    pub fn course_ids(&self) -> Vec<String> {
        self.storage
            .read()
            .progress
            .completed_lessons
            .into_iter()
            .filter(|(_, slugs)| !slugs.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// The lesson most recently visited, if any
    pub fn last_visited(&self) -> Option<LastVisited> {
        self.storage.read().progress.last_visited
    }

    /// Point the last-visited marker at `slug`, stamped with the current time
    pub fn set_last_visited(&self, course_id: &str, slug: &str) {
        let timestamp = self.storage.now();
        self.storage.update(|doc| {
            doc.progress.last_visited = Some(LastVisited {
                course_id: course_id.to_string(),
                lesson_slug: slug.to_string(),
                timestamp,
            });
        });
    }
}
