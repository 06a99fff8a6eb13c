//! Final document assembly output
//! Created: 2025-06-03 16:18:02 UTC
//! Author: kartik4091

pub mod merger;

pub use merger::{LopdfMerger, Merger, PdftkMerger};
