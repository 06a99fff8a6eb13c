//! Complaint Assembly Pipeline — Stage-by-Stage Execution
//! Author: kartik4091
//! Created: 2025-06-05
//!
//! Init → FieldMapping → FormFilling ∥ AddendumRendering ∥ EvidenceRedaction →
//! Concatenation → Done. Either the complete document reaches the destination or
//! nothing does.

pub mod workspace;

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::config::{AssemblerConfig, MergeBackend, RedactionFailurePolicy};
use crate::content::{render_addendum, AddendumRenderer, TextLayoutRenderer};
use crate::error::{Error, Result};
use crate::form::{
    ensure_template, map_fields, map_fields_today, FieldMap, FormFiller, PdftkFormFiller,
};
use crate::output::{LopdfMerger, Merger, PdftkMerger};
use crate::redactor::Redactor;
use crate::types::ComplaintRecord;

pub use workspace::Workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    Init,
    FieldMapping,
    FormFilling,
    AddendumRendering,
    EvidenceRedaction,
    Concatenation,
    Done,
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyStage::Init => "init",
            AssemblyStage::FieldMapping => "field mapping",
            AssemblyStage::FormFilling => "form filling",
            AssemblyStage::AddendumRendering => "addendum rendering",
            AssemblyStage::EvidenceRedaction => "evidence redaction",
            AssemblyStage::Concatenation => "concatenation",
            AssemblyStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Orchestrates the form filler, addendum renderer, redactor and merger
pub struct Assembler {
    config: AssemblerConfig,
    filler: Arc<dyn FormFiller>,
    renderer: Arc<dyn AddendumRenderer>,
    merger: Arc<dyn Merger>,
    cancel: Arc<AtomicBool>,
    signature_date: Option<NaiveDate>,
}

impl fmt::Debug for Assembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembler")
            .field("config", &self.config)
            .field("cancelled", &self.is_cancelled())
            .field("signature_date", &self.signature_date)
            .finish_non_exhaustive()
    }
}

impl Assembler {
    /// pdftk form filling, native addendum rendering and the configured merge backend
    pub fn new(config: AssemblerConfig) -> Self {
        let merger: Arc<dyn Merger> = match config.merge_backend {
            MergeBackend::Native => Arc::new(LopdfMerger::new()),
            MergeBackend::Pdftk => Arc::new(PdftkMerger::new(config.tools.pdftk.clone())),
        };
        Self {
            filler: Arc::new(PdftkFormFiller::new(config.tools.pdftk.clone())),
            renderer: Arc::new(TextLayoutRenderer::new()),
            merger,
            cancel: Arc::new(AtomicBool::new(false)),
            signature_date: None,
            config,
        }
    }

    pub fn with_form_filler(mut self, filler: impl FormFiller + 'static) -> Self {
        self.filler = Arc::new(filler);
        self
    }

    pub fn with_addendum_renderer(mut self, renderer: impl AddendumRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_merger(mut self, merger: impl Merger + 'static) -> Self {
        self.merger = Arc::new(merger);
        self
    }

    /// Shares a cancellation flag; setting it stops the run at the next stage boundary
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Fixes the date written into the signature block; today otherwise
    pub fn with_signature_date(mut self, date: NaiveDate) -> Self {
        self.signature_date = Some(date);
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    pub fn cancellation(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Stage transition: the one place cancellation is observed
    fn enter(&self, stage: AssemblyStage) -> Result<()> {
        if self.is_cancelled() {
            warn!("Cancelled before {}", stage);
            return Err(Error::Cancelled);
        }
        debug!("Stage: {}", stage);
        Ok(())
    }

    /// Builds the complaint for `record` and publishes it at `destination`
    #[instrument(skip(self, record), fields(company = %record.company_name))]
    pub fn assemble(&self, record: &ComplaintRecord, destination: &Path) -> Result<PathBuf> {
        info!("🚦 Starting complaint assembly");

        self.enter(AssemblyStage::Init)?;
        self.check_preconditions(record, destination)?;
        let workspace = Workspace::create(self.config.workspace_root.as_deref())?;

        self.enter(AssemblyStage::FieldMapping)?;
        let fields = match self.signature_date {
            Some(date) => map_fields(record, date),
            None => map_fields_today(record),
        };
        debug!("Mapped {} form fields", fields.len());

        let ((form, addendum), evidence) = rayon::join(
            || {
                rayon::join(
                    || self.fill_form(&fields, &workspace),
                    || self.render_addendum(record, &workspace),
                )
            },
            || self.redact_evidence(record, &workspace),
        );
        let form = form?;
        let addendum = addendum?;
        let evidence = evidence?;

        self.enter(AssemblyStage::Concatenation)?;
        let parts = concatenation_order(form, addendum, evidence);
        let merged = workspace.merged();
        self.merger.merge(&parts, &merged)?;

        self.enter(AssemblyStage::Done)?;
        let published = publish(&merged, destination, self.config.overwrite)?;

        info!(
            "✅ Complaint assembled from {} parts: {}",
            parts.len(),
            published.display()
        );
        Ok(published)
    }

    /// Everything that can be checked before any artifact is produced
    #[instrument(skip(self, record))]
    fn check_preconditions(&self, record: &ComplaintRecord, destination: &Path) -> Result<()> {
        if destination.exists() && !self.config.overwrite {
            return Err(Error::PreconditionError(format!(
                "{} already exists; pass --overwrite to replace it",
                destination.display()
            )));
        }
        self.config.validate()?;
        record.validate()?;
        ensure_template(&self.config.template_path)?;
        if let Some(missing) = record.evidence_files.iter().find(|p| !p.is_file()) {
            return Err(Error::EvidenceMissing(missing.clone()));
        }
        Ok(())
    }

    #[instrument(skip_all)]
    fn fill_form(&self, fields: &FieldMap, workspace: &Workspace) -> Result<PathBuf> {
        self.enter(AssemblyStage::FormFilling)?;
        let output = workspace.form();
        self.filler.fill(&self.config.template_path, fields, &output)?;
        Ok(output)
    }

    #[instrument(skip_all)]
    fn render_addendum(
        &self,
        record: &ComplaintRecord,
        workspace: &Workspace,
    ) -> Result<Option<PathBuf>> {
        self.enter(AssemblyStage::AddendumRendering)?;
        render_addendum(
            self.renderer.as_ref(),
            record.additional_information(),
            &workspace.addendum(),
        )
    }

    /// Redacted copies in record order, or the originals when there is nothing
    /// to redact. Under the skip policy, files that fail are left out.
    #[instrument(skip_all, fields(files = record.evidence_files.len()))]
    fn redact_evidence(
        &self,
        record: &ComplaintRecord,
        workspace: &Workspace,
    ) -> Result<Vec<PathBuf>> {
        if !record.wants_redaction() {
            return Ok(record.evidence_files.clone());
        }
        self.enter(AssemblyStage::EvidenceRedaction)?;

        let redactor = Redactor::new(self.config.redactor_config(&record.redact_words))?;
        let policy = self.config.redaction_failure_policy;

        let redacted = record
            .evidence_files
            .par_iter()
            .enumerate()
            .map(|(index, input)| {
                if self.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let output = workspace.evidence(index);
                match redactor.redact_file(input, &output) {
                    Ok(_) => Ok(Some(output)),
                    Err(e) if e.is_redaction() && policy == RedactionFailurePolicy::Skip => {
                        warn!("⚠️ Leaving {} out of the complaint: {}", input.display(), e);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(redacted.into_iter().flatten().collect())
    }
}

/// Form, then the addendum when present, then evidence in record order.
/// Artifacts that were never written are dropped.
fn concatenation_order(
    form: PathBuf,
    addendum: Option<PathBuf>,
    evidence: Vec<PathBuf>,
) -> Vec<PathBuf> {
    std::iter::once(form)
        .chain(addendum)
        .chain(evidence)
        .filter(|path| {
            let present = path.is_file();
            if !present {
                debug!("Omitting missing artifact {}", path.display());
            }
            present
        })
        .collect()
}

/// Copies `merged` next to `destination` and renames it into place
fn publish(merged: &Path, destination: &Path, overwrite: bool) -> Result<PathBuf> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(parent)?;
    io::copy(&mut File::open(merged)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;

    if overwrite {
        staged.persist(destination).map_err(|e| e.error)?;
    } else {
        staged.persist_noclobber(destination).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                Error::PreconditionError(format!("{} already exists", destination.display()))
            } else {
                e.error.into()
            }
        })?;
    }
    Ok(destination.to_path_buf())
}
