//! Output formatting
//!
//! Human-readable and JSON output, colors and transfer progress.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub no_color: bool,
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}
