//! Rendering of execution results

pub mod formatter;
pub mod human;
pub mod json;

pub use formatter::{format_output, OutputFormat};
