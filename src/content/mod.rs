//! Generated document content

pub mod addendum;

pub use addendum::{render_addendum, AddendumRenderer, TextLayoutRenderer, HEADING};
