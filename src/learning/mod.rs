//! Course learning state: lesson completion, quizzes and certificates

pub mod certificate;
pub mod progress;
pub mod quiz;

pub use certificate::CertificateStore;
pub use progress::ProgressTracker;
pub use quiz::{QuizStore, WeakLesson, quiz_key};
