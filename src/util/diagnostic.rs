//! User-facing diagnostics.
//!
//! Errors shown to the user carry context lines and numbered suggestions.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

/// Canned suggestions shared by several commands.
pub mod suggestions {
    /// No recipe at the given path.
    pub const NO_RECIPE: &str =
        "help: Pass the recipe path, or run from a directory containing Galley.toml";

    /// `cmake` is not on PATH.
    pub const NO_CMAKE: &str = "help: Install CMake (>= 3.16) and ensure it's in your PATH";

    /// A create run failed.
    pub const CREATE_FAILED: &str = "help: Run `galley create --verbose` for more details";
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A message plus what the user can do about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Lines printed as `= ...` under the message
    pub context: Vec<String>,
    /// Fixes, printed as a numbered list
    pub suggestions: Vec<String>,
    /// File the diagnostic points at
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn new(severity: Severity, message: String) -> Self {
        Diagnostic {
            severity,
            message,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message.into())
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Render for a terminal, with ANSI colors if `color`.
    pub fn format(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", code, text)
            } else {
                text.to_string()
            }
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {}",
            paint(self.severity.ansi(), self.severity.label()),
            self.message
        );

        if let Some(path) = &self.location {
            let _ = writeln!(out, "  --> {}", path.display());
        }
        for line in &self.context {
            let _ = writeln!(out, "  = {}", line);
        }

        if !self.suggestions.is_empty() {
            let _ = writeln!(out, "\n{}: consider:", paint("1;32", "help"));
            for (n, suggestion) in self.suggestions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", n + 1, suggestion);
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
