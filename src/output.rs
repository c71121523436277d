//! User-facing output utilities for clean, colored terminal messages
//!
//! Fatal errors and warnings go through here instead of `log` so users see
//! them without timestamps, log levels, or crate names in the way.

use owo_colors::OwoColorize;

/// Display a warning message to the user in yellow with padding
///
/// # Example
/// ```ignore
/// output::warn("Course has no pages; nothing to process.");
/// ```
pub fn warn(message: &str) {
    eprintln!("\n{}\n", message.yellow());
}

/// Display an error message to the user in red with padding
///
/// # Example
/// ```ignore
/// output::error("Error: Canvas API token not found.");
/// ```
pub fn error(message: &str) {
    eprintln!("\n{}\n", message.red());
}
