//! PDF document identifier cleaner
//!
//! The trailer /ID pair is derived from the original file and survives edits, so it
//! ties a redacted copy back to its source. It is optional and simply dropped.

use lopdf::Document;
use tracing::debug;

pub struct IdCleaner;

impl IdCleaner {
    pub fn new() -> Self {
        Self
    }

    /// True when an identifier was removed
    pub fn clean(&self, doc: &mut Document) -> bool {
        let removed = doc.trailer.remove(b"ID").is_some();
        if removed {
            debug!("Removed trailer document ID");
        }
        removed
    }
}

impl Default for IdCleaner {
    fn default() -> Self {
        Self::new()
    }
}
