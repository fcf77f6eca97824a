//! Course completion certificates

use tracing::{debug, info};

use crate::content::Course;
use crate::storage::{CertificateInfo, Storage};

/// One certificate per course
#[derive(Debug, Clone, Copy)]
pub struct CertificateStore<'a> {
    storage: &'a Storage,
}

impl<'a> CertificateStore<'a> {
    pub(crate) fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Certificate for a course, if one was issued
    pub fn certificate(&self, course_id: &str) -> Option<CertificateInfo> {
        self.storage.read().certificate.remove(course_id)
    }

    /// Store a certificate, replacing any previous one for the course
    pub fn save_certificate(&self, course_id: &str, info: CertificateInfo) {
        self.storage.update(|doc| {
            doc.certificate.insert(course_id.to_string(), info);
        });
    }

    /// Issue a certificate stamped with the current time if every lesson of
    /// the course is complete
    ///
    /// Compares the completed count against `total_lessons` exactly; a
    /// rounded percentage is never used as the gate. Returns `None` without
    /// writing when the course is unfinished or empty.
    pub fn issue(
        &self,
        course_id: &str,
        user_name: &str,
        course_title: &str,
        total_lessons: usize,
    ) -> Option<CertificateInfo> {
        let completed = self.storage.progress().data().completed_count(course_id);
        if total_lessons == 0 || completed < total_lessons {
            debug!(course_id, completed, total_lessons, "Course not finished, no certificate issued");
            return None;
        }
        Some(self.stamp(course_id, user_name, course_title))
    }

    /// Issue a certificate for a loaded course if each of its lessons is
    /// marked complete
    ///
    /// Completed slugs that are not lessons of `course` do not count.
    pub fn issue_for_course(&self, course: &Course, user_name: &str) -> Option<CertificateInfo> {
        let progress = self.storage.progress().data();
        let missing = course
            .lesson_slugs()
            .into_iter()
            .filter(|slug| !progress.is_complete(&course.id, slug))
            .count();
        if course.lesson_count() == 0 || missing > 0 {
            debug!(course_id = %course.id, missing, "Course not finished, no certificate issued");
            return None;
        }
        Some(self.stamp(&course.id, user_name, &course.title))
    }

    fn stamp(&self, course_id: &str, user_name: &str, course_title: &str) -> CertificateInfo {
        let info = CertificateInfo {
            user_name: user_name.to_string(),
            completed_at: self.storage.now(),
            course_title: course_title.to_string(),
        };
        info!(course_id, user_name, "Issuing course certificate");
        self.save_certificate(course_id, info.clone());
        info
    }
}
