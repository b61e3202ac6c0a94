//! Formatter for human-readable and JSON output
//!
//! In JSON mode every command prints exactly one JSON document on stdout
//! and errors as `{"error": ...}` on stderr.

use console::Style;
use jiff::Timestamp;
use serde::Serialize;

use super::OutputConfig;

/// Styles applied to the parts of human output
#[derive(Debug, Clone)]
struct Theme {
    dir: Style,
    size: Style,
    date: Style,
    key: Style,
    name: Style,
    success: Style,
    error: Style,
    warning: Style,
}

impl Theme {
    fn colored() -> Self {
        Self {
            dir: Style::new().blue().bold(),
            size: Style::new().green(),
            date: Style::new().dim(),
            key: Style::new().cyan(),
            name: Style::new().bold(),
            success: Style::new().green(),
            error: Style::new().red(),
            warning: Style::new().yellow(),
        }
    }

    fn plain() -> Self {
        let none = Style::new();
        Self {
            dir: none.clone(),
            size: none.clone(),
            date: none.clone(),
            key: none.clone(),
            name: none.clone(),
            success: none.clone(),
            error: none.clone(),
            warning: none,
        }
    }
}

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    theme: Theme,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        let theme = if config.no_color || config.json {
            Theme::plain()
        } else {
            Theme::colored()
        };
        Self { config, theme }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn style_dir(&self, text: &str) -> String {
        self.theme.dir.apply_to(text).to_string()
    }

    pub fn style_size(&self, text: &str) -> String {
        self.theme.size.apply_to(text).to_string()
    }

    pub fn style_date(&self, text: &str) -> String {
        self.theme.date.apply_to(text).to_string()
    }

    pub fn style_key(&self, text: &str) -> String {
        self.theme.key.apply_to(text).to_string()
    }

    pub fn style_name(&self, text: &str) -> String {
        self.theme.name.apply_to(text).to_string()
    }

    /// Human-readable size in binary units
    pub fn format_size(&self, bytes: u64) -> String {
        humansize::format_size(bytes, humansize::BINARY)
    }

    /// Fixed-width timestamp column, blank when unknown
    pub fn format_date(&self, timestamp: Option<Timestamp>) -> String {
        match timestamp {
            Some(ts) => ts.strftime("%Y-%m-%d %H:%M:%S").to_string(),
            None => " ".repeat(19),
        }
    }

    /// Print a success message (human mode only)
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        let mark = self.theme.success.apply_to("✓");
        println!("{mark} {message}");
    }

    /// Print an error message
    ///
    /// Errors are printed even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            eprintln!("{}", serde_json::json!({ "error": message }));
        } else {
            let cross = self.theme.error.apply_to("✗");
            eprintln!("{cross} {message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }
        let icon = self.theme.warning.apply_to("⚠");
        eprintln!("{icon} {message}");
    }

    /// Print a value as pretty JSON
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
