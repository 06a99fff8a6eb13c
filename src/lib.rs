//! Main Library File for the Pay-Transparency Complaint Assembler
//! Provides a stage-based pipeline that fills the complaint form, renders the
//! addendum, redacts evidence and concatenates everything into one PDF.

// Configuration and Core Pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Stage 1: Field Mapping & Form Filling
pub mod form;

// Stage 2: Addendum Rendering
pub mod content;

// Stage 3: Evidence Redaction
pub mod cleaner;
pub mod metadata;
pub mod redactor;

// Stage 4: Concatenation
pub mod output;

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use config::{AssemblerConfig, MergeBackend, RedactionFailurePolicy, ToolConfig};
pub use content::{AddendumRenderer, TextLayoutRenderer};
pub use error::{Error, ExternalToolError, RedactionError, Result};
pub use form::{map_fields, FieldMap, FormFiller, PdftkFormFiller};
pub use metadata::{FieldAction, MetadataPolicy};
pub use output::{LopdfMerger, Merger, PdftkMerger};
pub use pipeline::{Assembler, AssemblyStage};
pub use redactor::{RedactionReport, Redactor, RedactorConfig};
pub use types::{Address, ComplaintRecord, MyInfo};
