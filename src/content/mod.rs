//! Course and book content loading
//!
//! Supplies the identifiers and lesson totals that learner-state works with.
//! Storage never validates identifiers against content; this module is how
//! callers find out how many lessons a course has.

pub mod markdown;
pub mod model;

pub use markdown::{extract_toc, load_course, load_courses, parse_lesson_content, slugify};
pub use model::{Course, Lesson, TocEntry};
