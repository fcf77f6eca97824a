//! Content model for courses and books
//!
//! Courses and books share one shape: an ordered list of lessons (chapters,
//! for a book), optionally grouped into parts. Only what learner-state needs
//! is kept: identifiers, titles, ordering and headings.

use serde::{Deserialize, Serialize};

/// A course or book loaded from a content directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Directory name, used as the course identifier in storage
    pub id: String,
    /// Display title
    pub title: String,
    /// Lessons in reading order
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Create an empty course
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), lessons: Vec::new() }
    }

    /// Number of lessons, the denominator for completion percentages
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Find a lesson by slug
    pub fn find_lesson(&self, slug: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.slug == slug)
    }

    /// Lesson following `slug`, if any
    pub fn next_lesson(&self, slug: &str) -> Option<&Lesson> {
        let idx = self.lessons.iter().position(|l| l.slug == slug)?;
        self.lessons.get(idx + 1)
    }

    /// Lesson slugs in order
    pub fn lesson_slugs(&self) -> Vec<&str> {
        self.lessons.iter().map(|l| l.slug.as_str()).collect()
    }

    /// Total estimated reading time in minutes
    pub fn reading_time_minutes(&self) -> u32 {
        self.lessons.iter().map(|l| l.reading_time_minutes).sum()
    }
}

/// A lesson or chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// File stem, used as the lesson identifier in storage
    pub slug: String,
    pub title: String,
    /// Part (sub-directory) this lesson belongs to, for books
    pub part: Option<String>,
    /// Explicit `order:` from frontmatter
    pub order: Option<i64>,
    /// Estimated reading time in minutes (at least 1)
    pub reading_time_minutes: u32,
    /// Level 2 and 3 headings
    pub toc: Vec<TocEntry>,
}

/// A heading in a lesson's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level (2 or 3)
    pub level: u8,
    pub text: String,
    /// Anchor id, unique within the lesson
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(slug: &str, minutes: u32) -> Lesson {
        Lesson {
            slug: slug.into(),
            title: slug.into(),
            part: None,
            order: None,
            reading_time_minutes: minutes,
            toc: Vec::new(),
        }
    }

    #[test]
    fn course_counts_and_lookup() {
        let mut course = Course::new("ai-basics", "AI Basics");
        course.lessons.push(lesson("lesson-01", 3));
        course.lessons.push(lesson("lesson-02", 4));

        assert_eq!(course.lesson_count(), 2);
        assert_eq!(course.reading_time_minutes(), 7);
        assert!(course.find_lesson("lesson-02").is_some());
        assert!(course.find_lesson("lesson-03").is_none());
        assert_eq!(course.lesson_slugs(), vec!["lesson-01", "lesson-02"]);
    }

    #[test]
    fn next_lesson_walks_order() {
        let mut course = Course::new("c", "C");
        course.lessons.push(lesson("a", 1));
        course.lessons.push(lesson("b", 1));

        assert_eq!(course.next_lesson("a").map(|l| l.slug.as_str()), Some("b"));
        assert!(course.next_lesson("b").is_none());
        assert!(course.next_lesson("zzz").is_none());
    }
}
