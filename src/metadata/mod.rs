//! Metadata scrubbing for redacted evidence
//! Created: 2025-06-03 15:05:27 UTC
//! Author: kartik4091

use chrono::{DateTime, Utc};
use lopdf::Document;
use tracing::{info, instrument};

pub mod id_cleaner;
pub mod info_cleaner;
pub mod xmp_cleaner;

pub use id_cleaner::IdCleaner;
pub use info_cleaner::{
    format_pdf_date, parse_pdf_date, FieldAction, InfoCleaner, InfoStats, MetadataPolicy,
};
pub use xmp_cleaner::XmpCleaner;

/// What a metadata pass removed or rewrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataStats {
    pub info: InfoStats,
    pub xmp_streams_removed: usize,
    pub document_id_removed: bool,
}

/// Applies the Info policy, drops XMP packets and, when asked, the document ID
#[instrument(skip(doc, policy))]
pub fn scrub_metadata(
    doc: &mut Document,
    policy: &MetadataPolicy,
    strip_document_id: bool,
    now: DateTime<Utc>,
) -> MetadataStats {
    let info = InfoCleaner::new(policy).clean(doc, now);
    let xmp_streams_removed = XmpCleaner::new().clean(doc);
    let document_id_removed = strip_document_id && IdCleaner::new().clean(doc);

    let stats = MetadataStats {
        info,
        xmp_streams_removed,
        document_id_removed,
    };
    info!(
        "Metadata scrubbed: {} info fields cleared, {} XMP streams removed",
        stats.info.cleared, stats.xmp_streams_removed
    );
    stats
}
