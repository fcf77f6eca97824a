//! Reader-side state for articles and guides: bookmarks and read history

pub mod bookmarks;
pub mod tracker;

pub use bookmarks::BookmarkStore;
pub use tracker::ReadingTracker;
