//! Utility Module Implementation
//! Author: kartik4091
//! Created: 2025-06-03 09:14:13 UTC
//!
//! Small helpers shared by the form, output and CLI layers.

pub mod naming;
pub mod process;

pub use naming::{default_output_name, slugify};
pub use process::{expect_output, run_tool};
