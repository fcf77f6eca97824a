//! Quiz result persistence

use crate::storage::{QuizResult, Storage};

/// Build the composite key a quiz result is stored under
///
/// Lesson slugs are file stems and never contain `/`, so the key is split
/// back apart at its last `/`. Course ids may contain `/`.
pub fn quiz_key(course_id: &str, lesson_slug: &str) -> String {
    format!("{}/{}", course_id, lesson_slug)
}

/// A lesson whose latest quiz score fell below a threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeakLesson {
    pub course_id: String,
    pub lesson_slug: String,
    pub percent: u8,
}

/// Latest quiz result per lesson; earlier attempts are not kept
#[derive(Debug, Clone, Copy)]
pub struct QuizStore<'a> {
    storage: &'a Storage,
}

impl<'a> QuizStore<'a> {
    pub(crate) fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Latest result for a lesson, `None` if never attempted
    pub fn result(&self, course_id: &str, lesson_slug: &str) -> Option<QuizResult> {
        self.storage.read().quiz.remove(&quiz_key(course_id, lesson_slug))
    }

    /// Store `result`, replacing any earlier attempt
    pub fn save_result(&self, course_id: &str, lesson_slug: &str, result: QuizResult) {
        self.storage.update(|doc| {
            doc.quiz.insert(quiz_key(course_id, lesson_slug), result);
        });
    }

    /// Lessons whose latest score is below `threshold` percent, lowest first
    pub fn weak_lessons(&self, threshold: u8) -> Vec<WeakLesson> {
        let mut weak: Vec<WeakLesson> = self
            .storage
            .read()
            .quiz
            .iter()
            .filter(|(_, result)| result.percent() < threshold)
            .filter_map(|(key, result)| {
                let (course_id, lesson_slug) = key.rsplit_once('/')?;
                Some(WeakLesson {
                    course_id: course_id.to_string(),
                    lesson_slug: lesson_slug.to_string(),
                    percent: result.percent(),
                })
            })
            .collect();

        weak.sort_by_key(|w| w.percent);
        weak
    }
}
