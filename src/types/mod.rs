// Type definitions for the complaint assembly pipeline

pub mod complaint;

pub use complaint::*;
