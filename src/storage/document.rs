//! The persisted learner-state document
//!
//! Everything the portal remembers about a reader lives in one
//! [`StorageDocument`], serialized as a single JSON object under one key.
//! Every field has a serde default, so a document written by an older build
//! (or hand-edited) with missing sections still deserializes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Schema version written by this build
pub const CURRENT_VERSION: u32 = 2;

/// The single persisted unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDocument {
    /// Schema version; 0 when the stored document carried none
    #[serde(default)]
    pub version: u32,

    /// Lesson completion and the last-visited pointer
    #[serde(default)]
    pub progress: ProgressData,

    /// Latest quiz result per `"{course}/{lesson}"`
    #[serde(default)]
    pub quiz: BTreeMap<String, QuizResult>,

    /// Certificate per course
    #[serde(default)]
    pub certificate: BTreeMap<String, CertificateInfo>,

    /// Bookmarks keyed by content slug
    #[serde(default)]
    pub bookmark: BTreeMap<String, BookmarkItem>,

    /// Read articles keyed by slug
    #[serde(default)]
    pub reading: BTreeMap<String, ReadingEntry>,
}

impl Default for StorageDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            progress: ProgressData::default(),
            quiz: BTreeMap::new(),
            certificate: BTreeMap::new(),
            bookmark: BTreeMap::new(),
            reading: BTreeMap::new(),
        }
    }
}

/// Completion sets per course plus the last lesson visited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    /// Completed lesson/chapter slugs per course, in completion order
    #[serde(default)]
    pub completed_lessons: BTreeMap<String, Vec<String>>,

    /// Most recently visited lesson
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visited: Option<LastVisited>,
}

impl ProgressData {
    /// Whether `slug` is in the completion set of `course_id`
    pub fn is_complete(&self, course_id: &str, slug: &str) -> bool {
        self.completed_lessons.get(course_id).is_some_and(|slugs| slugs.iter().any(|s| s == slug))
    }

    /// Number of completed lessons in a course
    pub fn completed_count(&self, course_id: &str) -> usize {
        self.completed_lessons.get(course_id).map_or(0, Vec::len)
    }
}

/// Pointer to the lesson a reader last opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastVisited {
    pub course_id: String,
    pub lesson_slug: String,
    /// Unix seconds
    pub timestamp: i64,
}

/// Outcome of one quiz attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Selected option index per question, in question order
    pub answers: Vec<usize>,
    /// Correct answers
    pub score: u32,
    /// Number of questions
    pub total: u32,
    /// Unix seconds
    pub completed_at: i64,
}

impl QuizResult {
    /// Score as a rounded percentage (0 when the quiz had no questions)
    pub fn percent(&self) -> u8 {
        percent_of(self.score as usize, self.total as usize)
    }
}

/// Completion certificate for a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    /// Name printed on the certificate
    pub user_name: String,
    /// Unix seconds
    pub completed_at: i64,
    pub course_title: String,
}

/// A saved reference to a piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkItem {
    pub slug: String,
    pub title: String,
    /// Kind of content, e.g. "article", "guide", "course"
    pub content_type: String,
    /// Unix seconds
    pub bookmarked_at: i64,
}

/// When an article was first read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEntry {
    /// Unix seconds
    pub read_at: i64,
}

/// `round(part / whole * 100)`, 0 for an empty whole, capped at 100
pub(crate) fn percent_of(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let pct = (part as f64 / whole as f64 * 100.0).round();
    pct.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_document_is_current_and_empty() {
        let doc = StorageDocument::default();
        assert_eq!(doc.version, CURRENT_VERSION);
        assert!(doc.progress.completed_lessons.is_empty());
        assert!(doc.progress.last_visited.is_none());
        assert!(doc.quiz.is_empty());
        assert!(doc.bookmark.is_empty());
    }

    #[test]
    fn document_serializes_camel_case() {
        let mut doc = StorageDocument::default();
        doc.progress.completed_lessons.insert("ai-basics".into(), vec!["lesson-01".into()]);
        doc.reading.insert("intro".into(), ReadingEntry { read_at: 5 });

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"completedLessons\""));
        assert!(json.contains("\"readAt\":5"));
        assert!(!json.contains("lastVisited"));
    }

    #[test]
    fn partial_document_fills_defaults() {
        let json = r#"{"version":2,"progress":{"completedLessons":{"c":["a","b"]}}}"#;
        let doc: StorageDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.progress.completed_count("c"), 2);
        assert!(doc.certificate.is_empty());
        assert!(doc.reading.is_empty());
    }

    #[test]
    fn missing_version_reads_as_zero() {
        let doc: StorageDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn quiz_percent_rounds() {
        let result = QuizResult { answers: vec![0, 1, 2], score: 2, total: 3, completed_at: 0 };
        assert_eq!(result.percent(), 67);

        let empty = QuizResult { answers: vec![], score: 0, total: 0, completed_at: 0 };
        assert_eq!(empty.percent(), 0);
    }

    #[test]
    fn percent_of_caps_at_hundred() {
        assert_eq!(percent_of(2, 8), 25);
        assert_eq!(percent_of(8, 8), 100);
        assert_eq!(percent_of(9, 8), 100);
        assert_eq!(percent_of(1, 0), 0);
    }
}
