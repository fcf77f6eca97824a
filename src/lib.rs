//! Hoshizu - learner-state core for the Hoshizu learning portal
//!
//! Tracks lesson completion, quiz results, course certificates, bookmarks and
//! read articles in a single versioned document. Reads never fail and writes
//! never surface errors: losing this convenience state is preferable to
//! interrupting a reader.

pub mod clock;
pub mod config;
pub mod content;
pub mod export;
pub mod learning;
pub mod reading;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use storage::{Storage, StorageDocument};
