//! Output file naming

use chrono::NaiveDate;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::ComplaintRecord;

/// Suffix of every generated complaint file name
pub const OUTPUT_SUFFIX: &str = "pay-transparency-complaint.pdf";

/// Lowercases ASCII alphanumerics and collapses every other run of characters
/// into a single `-`, with none leading or trailing. Accented letters are
/// decomposed first and keep their base letter (`José` → `jose`).
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `<slug of "<name or anonymous>-<company>-<YYYYMMDD>">-pay-transparency-complaint.pdf`
pub fn default_output_name(record: &ComplaintRecord, date: NaiveDate) -> String {
    let who = record.my_info.name().unwrap_or("anonymous");
    let stem = slugify(&format!(
        "{}-{}-{}",
        who,
        record.company_name,
        date.format("%Y%m%d")
    ));
    format!("{}-{}", stem, OUTPUT_SUFFIX)
}
