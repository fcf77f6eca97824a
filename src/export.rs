//! Backups and progress reports
//!
//! A backup is the storage document as pretty-printed JSON, suitable for
//! moving learner state between machines. A report is a Markdown summary of
//! course completion, quiz scores, bookmarks and reading.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::content::Course;
use crate::storage::document::percent_of;
use crate::storage::{CURRENT_VERSION, Storage, StorageDocument, migrate};

/// Write the current document to `path` as pretty JSON
pub fn export_backup(storage: &Storage, path: &Path) -> Result<()> {
    let doc = storage.read();
    let contents =
        serde_json::to_string_pretty(&doc).with_context(|| "Failed to serialize backup")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create backup directory {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write backup to {:?}", path))?;

    info!(path = %path.display(), "Exported learner state");
    Ok(())
}

/// Replace the stored document with the backup at `path`
///
/// Version 1 backups are migrated first. Backups of unknown versions are
/// refused rather than wiping current state, and a failed write is reported.
pub fn import_backup(storage: &Storage, path: &Path) -> Result<StorageDocument> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup from {:?}", path))?;
    let doc: StorageDocument =
        serde_json::from_str(&contents).with_context(|| "Failed to parse backup")?;

    let doc = match doc.version {
        CURRENT_VERSION => doc,
        1 => migrate(doc),
        other => anyhow::bail!("Unsupported backup version {} in {:?}", other, path),
    };
    storage.try_write(&doc).with_context(|| "Failed to store imported backup")?;

    info!(path = %path.display(), "Imported learner state");
    Ok(doc)
}

/// Render a Markdown summary of `doc`
///
/// Courses found in `courses` are listed with their percentages; courses
/// present only in storage are listed with a raw completed count.
pub fn render_report(doc: &StorageDocument, courses: &[Course]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Learning progress\n");

    let _ = writeln!(out, "## Courses\n");
    let mut any_course = false;
    for course in courses {
        let done = doc.progress.completed_count(&course.id);
        if done == 0 {
            continue;
        }
        any_course = true;
        let pct = percent_of(done, course.lesson_count());
        let _ = write!(
            out,
            "- {} ({}): {}/{} lessons, {}%",
            course.title,
            course.id,
            done,
            course.lesson_count(),
            pct
        );
        if doc.certificate.contains_key(&course.id) {
            let _ = write!(out, ", certified");
        }
        let _ = writeln!(out);
    }
    for (course_id, slugs) in &doc.progress.completed_lessons {
        if slugs.is_empty() || courses.iter().any(|c| &c.id == course_id) {
            continue;
        }
        any_course = true;
        let _ = writeln!(out, "- {}: {} lessons completed", course_id, slugs.len());
    }
    if !any_course {
        let _ = writeln!(out, "No lessons completed yet.");
    }

    if let Some(last) = &doc.progress.last_visited {
        let _ = writeln!(out, "\nLast visited: {}/{}", last.course_id, last.lesson_slug);
    }

    if !doc.quiz.is_empty() {
        let _ = writeln!(out, "\n## Quizzes\n");
        for (key, result) in &doc.quiz {
            let _ = writeln!(
                out,
                "- {}: {}/{} ({}%)",
                key,
                result.score,
                result.total,
                result.percent()
            );
        }
    }

    let bookmarks = {
        let mut items: Vec<_> = doc.bookmark.values().collect();
        items.sort_by_key(|b| std::cmp::Reverse(b.bookmarked_at));
        items
    };
    if !bookmarks.is_empty() {
        let _ = writeln!(out, "\n## Bookmarks\n");
        for item in bookmarks {
            let _ = writeln!(out, "- [{}] {} ({})", item.content_type, item.title, item.slug);
        }
    }

    let _ = writeln!(out, "\n## Reading\n");
    let _ = writeln!(out, "{} articles read.", doc.reading.len());

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Lesson;
    use crate::storage::{BookmarkItem, CertificateInfo, MemoryBackend, QuizResult};
    use tempfile::TempDir;

    fn course(id: &str, lessons: usize) -> Course {
        let mut course = Course::new(id, id.to_uppercase());
        for i in 0..lessons {
            course.lessons.push(Lesson {
                slug: format!("lesson-{:02}", i + 1),
                title: format!("Lesson {}", i + 1),
                part: None,
                order: None,
                reading_time_minutes: 1,
                toc: Vec::new(),
            });
        }
        course
    }

    #[test]
    fn backup_round_trip_between_stores() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup").join("hoshizu.json");

        let source = Storage::in_memory();
        source.progress().mark_complete("ai-basics", "lesson-01");
        source.reading().mark_read("intro");
        export_backup(&source, &path).unwrap();

        let target = Storage::in_memory();
        let imported = import_backup(&target, &path).unwrap();
        assert_eq!(imported, source.read());
        assert!(target.progress().is_complete("ai-basics", "lesson-01"));
        assert!(target.reading().is_read("intro"));
    }

    #[test]
    fn import_migrates_old_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("old.json");
        fs::write(&path, r#"{"version":1,"progress":{"completedLessons":{"c":["l1"]}}}"#).unwrap();

        let storage = Storage::in_memory();
        let doc = import_backup(&storage, &path).unwrap();
        assert_eq!(doc.version, CURRENT_VERSION);
        assert!(storage.progress().is_complete("c", "l1"));
    }

    #[test]
    fn import_reports_bad_input_and_failed_writes() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "nope").unwrap();
        assert!(import_backup(&Storage::in_memory(), &bad).is_err());
        assert!(import_backup(&Storage::in_memory(), &temp_dir.path().join("missing.json")).is_err());

        let good = temp_dir.path().join("good.json");
        fs::write(&good, r#"{"version":2}"#).unwrap();
        assert!(import_backup(&Storage::detached(), &good).is_err());

        let tiny = Storage::new(MemoryBackend::with_quota(1), "k");
        assert!(import_backup(&tiny, &good).is_err());
    }

    #[test]
    fn import_refuses_unknown_version_and_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("future.json");
        fs::write(&path, r#"{"version":9}"#).unwrap();

        let storage = Storage::in_memory();
        storage.reading().mark_read("kept");
        assert!(import_backup(&storage, &path).is_err());
        assert!(storage.reading().is_read("kept"));
    }

    #[test]
    fn report_lists_courses_quizzes_and_bookmarks() {
        let storage = Storage::in_memory();
        storage.progress().mark_complete("ai-basics", "lesson-01");
        storage.progress().mark_complete("ai-basics", "lesson-02");
        storage.progress().mark_complete("orphan", "x");
        storage.quizzes().save_result(
            "ai-basics",
            "lesson-01",
            QuizResult { answers: vec![0, 1, 2], score: 2, total: 3, completed_at: 0 },
        );
        storage.bookmarks().add(BookmarkItem {
            slug: "x".into(),
            title: "X".into(),
            content_type: "guide".into(),
            bookmarked_at: 1,
        });
        storage.certificates().save_certificate(
            "ai-basics",
            CertificateInfo { user_name: "Aki".into(), completed_at: 0, course_title: "AI".into() },
        );

        let report = render_report(&storage.read(), &[course("ai-basics", 8), course("empty", 2)]);
        assert!(report.contains("- AI-BASICS (ai-basics): 2/8 lessons, 25%, certified"));
        assert!(report.contains("- orphan: 1 lessons completed"));
        assert!(!report.contains("EMPTY"));
        assert!(report.contains("- ai-basics/lesson-01: 2/3 (67%)"));
        assert!(report.contains("- [guide] X (x)"));
        assert!(report.contains("0 articles read."));
    }

    #[test]
    fn empty_report() {
        let report = render_report(&StorageDocument::default(), &[]);
        assert!(report.contains("No lessons completed yet."));
        assert!(!report.contains("## Quizzes"));
    }
}
