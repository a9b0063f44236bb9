//! Output formatting utilities
//!
//! Commands print through [`Formatter`] so `--json`, `--quiet` and
//! `--no-color` behave the same everywhere.

mod formatter;

pub use formatter::Formatter;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
