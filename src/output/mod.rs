//! Output formatting module
//!
//! Renders suite results for the console.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
