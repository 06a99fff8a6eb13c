//! Form field mapping and filling

pub mod fdf;
pub mod fields;
pub mod filler;

pub use fdf::to_fdf;
pub use fields::{map_fields, map_fields_today, resolve_identity, FieldMap, IdentityRule};
pub use filler::{ensure_template, FormFiller, PdftkFormFiller};
