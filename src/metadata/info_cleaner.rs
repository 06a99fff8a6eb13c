//! Info dictionary cleaner for PDF metadata
//! Author: kartik4091
//! Created: 2025-06-05

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What happens to one Info dictionary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    /// Drop the entry
    Clear,
    /// Set the entry to the processing time, adding it when missing
    ReplaceWithNow,
    /// Keep the entry unchanged
    PassThrough,
}

/// Declarative Info dictionary policy: per-field actions plus a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPolicy {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldAction>,
    #[serde(default = "default_action")]
    pub default: FieldAction,
}

fn default_action() -> FieldAction {
    FieldAction::Clear
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        let fields = BTreeMap::from([
            ("Producer".to_string(), FieldAction::Clear),
            ("CreationDate".to_string(), FieldAction::ReplaceWithNow),
        ]);
        Self {
            fields,
            default: default_action(),
        }
    }
}

impl MetadataPolicy {
    pub fn action_for(&self, key: &str) -> FieldAction {
        self.fields.get(key).copied().unwrap_or(self.default)
    }

    /// Builds the cleaned dictionary for `original` as of `now`
    pub fn apply(&self, original: &Dictionary, now: DateTime<Utc>) -> (Dictionary, InfoStats) {
        let mut cleaned = Dictionary::new();
        let mut stats = InfoStats::default();
        let stamp = pdf_date_object(now);

        for (key, value) in original.iter() {
            let name = String::from_utf8_lossy(key);
            match self.action_for(&name) {
                FieldAction::Clear => stats.cleared += 1,
                FieldAction::PassThrough => {
                    cleaned.set(key.clone(), value.clone());
                    stats.kept += 1;
                }
                FieldAction::ReplaceWithNow => {
                    cleaned.set(key.clone(), stamp.clone());
                    stats.replaced += 1;
                }
            }
        }

        for (key, action) in &self.fields {
            if *action == FieldAction::ReplaceWithNow && !cleaned.has(key.as_bytes()) {
                cleaned.set(key.as_bytes().to_vec(), stamp.clone());
                stats.replaced += 1;
            }
        }

        (cleaned, stats)
    }
}

/// Counts of what the policy did to the Info dictionary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InfoStats {
    pub cleared: usize,
    pub replaced: usize,
    pub kept: usize,
}

/// Cleans PDF Info dictionary metadata
pub struct InfoCleaner<'a> {
    policy: &'a MetadataPolicy,
}

impl<'a> InfoCleaner<'a> {
    pub fn new(policy: &'a MetadataPolicy) -> Self {
        Self { policy }
    }

    /// Rewrites the trailer's Info dictionary, inline or indirect
    pub fn clean(&self, doc: &mut Document, now: DateTime<Utc>) -> InfoStats {
        let (info_id, original) = match doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => (
                Some(*id),
                doc.get_dictionary(*id).cloned().unwrap_or_default(),
            ),
            Ok(Object::Dictionary(dict)) => (None, dict.clone()),
            _ => (None, Dictionary::new()),
        };

        let (cleaned, stats) = self.policy.apply(&original, now);
        debug!("Info dictionary: {:?}", stats);

        if let Some(id) = info_id {
            doc.objects.remove(&id);
        }
        if cleaned.is_empty() {
            doc.trailer.remove(b"Info");
        } else {
            let id = info_id.unwrap_or_else(|| doc.new_object_id());
            doc.objects.insert(id, Object::Dictionary(cleaned));
            doc.trailer.set("Info", id);
        }
        stats
    }
}

/// Formats a timestamp as a PDF date string, `D:YYYYMMDDHHmmSSZ`
pub fn format_pdf_date(now: DateTime<Utc>) -> String {
    format!("D:{}Z", now.format("%Y%m%d%H%M%S"))
}

/// Stamp for `now`, rounded up to the whole second so it never predates `now`
fn pdf_date_object(now: DateTime<Utc>) -> Object {
    Object::String(format_pdf_date(ceil_to_second(now)).into_bytes(), StringFormat::Literal)
}

fn ceil_to_second(time: DateTime<Utc>) -> DateTime<Utc> {
    match time.nanosecond() {
        0 => time,
        nanos => time - Duration::nanoseconds(i64::from(nanos)) + Duration::seconds(1),
    }
}

/// Parses the leading `D:YYYYMMDDHHmmSS` of a PDF date as UTC
pub fn parse_pdf_date(raw: &[u8]) -> Option<DateTime<Utc>> {
    let text = std::str::from_utf8(raw).ok()?;
    let digits = text.strip_prefix("D:").unwrap_or(text).get(..14)?;
    NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}
