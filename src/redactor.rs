//! Evidence redaction
//! Author: kartik4091
//! Created: 2025-06-09
//!
//! One evidence document in, one sanitized copy out: sensitive tokens are replaced
//! in visible text, mailto links naming them are rewritten and identifying metadata
//! is scrubbed. Metadata scrubbing happens even when no words are configured.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lopdf::Document;
use tracing::{info, instrument};

use crate::cleaner::{ContentCleaner, LinkCleaner, TokenPattern};
use crate::error::{RedactionError, Result};
use crate::metadata::{scrub_metadata, MetadataPolicy, MetadataStats};

/// Everything a redaction pass needs, passed in explicitly
#[derive(Debug, Clone, Default)]
pub struct RedactorConfig {
    /// Literal, case-sensitive words
    pub words: BTreeSet<String>,
    pub metadata_policy: MetadataPolicy,
    pub strip_document_id: bool,
}

impl RedactorConfig {
    pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            metadata_policy: MetadataPolicy::default(),
            strip_document_id: true,
        }
    }

    pub fn with_metadata_policy(mut self, policy: MetadataPolicy) -> Self {
        self.metadata_policy = policy;
        self
    }
}

/// Counts from redacting one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedactionCounts {
    pub tokens: usize,
    pub links: usize,
    pub metadata: MetadataStats,
}

/// Result of redacting one evidence file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub counts: RedactionCounts,
}

#[derive(Debug, Clone)]
pub struct Redactor {
    config: RedactorConfig,
    pattern: TokenPattern,
}

impl Redactor {
    pub fn new(config: RedactorConfig) -> Result<Self> {
        let pattern = TokenPattern::new(&config.words)?;
        Ok(Self { config, pattern })
    }

    pub fn config(&self) -> &RedactorConfig {
        &self.config
    }

    /// Redacts an in-memory document. Content failures come back as plain
    /// messages; [`Redactor::redact_file`] attaches the file they belong to.
    pub fn redact_document(
        &self,
        doc: &mut Document,
        now: DateTime<Utc>,
    ) -> std::result::Result<RedactionCounts, String> {
        let tokens = ContentCleaner::new(&self.pattern).clean(doc)?;
        let links = LinkCleaner::new(&self.pattern).clean(doc);
        let metadata = scrub_metadata(
            doc,
            &self.config.metadata_policy,
            self.config.strip_document_id,
            now,
        );
        Ok(RedactionCounts {
            tokens,
            links,
            metadata,
        })
    }

    /// Writes a redacted copy of `input` to `output`
    #[instrument(skip(self))]
    pub fn redact_file(&self, input: &Path, output: &Path) -> Result<RedactionReport> {
        let mut doc = Document::load(input).map_err(|e| RedactionError::Parse {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })?;
        if doc.trailer.has(b"Encrypt") {
            return Err(RedactionError::Encrypted(input.to_path_buf()).into());
        }

        let counts = self
            .redact_document(&mut doc, Utc::now())
            .map_err(|reason| RedactionError::content(input, reason))?;

        doc.save(output).map_err(|e| RedactionError::Save {
            path: input.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            "Redacted {} -> {} ({} tokens, {} links)",
            input.display(),
            output.display(),
            counts.tokens,
            counts.links
        );
        Ok(RedactionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_config_collects_words() {
        let config = RedactorConfig::new(["smkent", "smkent", "acme"]);
        assert_eq!(config.words.len(), 2);
        assert!(config.strip_document_id);
    }

    #[test]
    fn test_unparseable_input_is_a_redaction_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"This is not a valid PDF file").unwrap();

        let redactor = Redactor::new(RedactorConfig::new(["alice"])).unwrap();
        let err = redactor
            .redact_file(&input, &dir.path().join("evidence-0.pdf"))
            .unwrap_err();
        assert!(matches!(err, Error::RedactionError(RedactionError::Parse { .. })));
        assert!(!dir.path().join("evidence-0.pdf").exists());
    }
}
