//! Sensitive content removal

pub mod content_cleaner;
pub mod link_cleaner;
pub mod pattern;

pub use content_cleaner::ContentCleaner;
pub use link_cleaner::{filter_link, LinkCleaner, REDACTED_MAILTO};
pub use pattern::{TokenPattern, MARKER};
