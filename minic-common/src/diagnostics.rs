//! Diagnostic reporting with source-line echo
//!
//! Every component of the front end publishes its errors through the
//! `DiagnosticReporter`. Messages are printed to stderr in
//! `file:line:col: level: message` form, followed by the offending
//! source line and a caret under the column. The reporter also keeps
//! every diagnostic in memory so tests and summaries can inspect them.

use crate::source_loc::{SourceBuffer, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: String, location: SourceLocation) -> Self {
        Self {
            severity,
            message,
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Reporter that collects diagnostics and prints them as they arrive
///
/// `init` must run before emission so the reporter can echo source
/// lines. Emission itself never fails: an unknown location or a line
/// outside the loaded source simply skips the echo.
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    current_file: String,
    source_lines: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a source file and reset all counts
    pub fn init(&mut self, path: &Path) -> io::Result<()> {
        let buffer = SourceBuffer::from_file(path)?;
        self.init_from_buffer(&buffer);
        Ok(())
    }

    /// Reset the reporter over an already-loaded buffer
    pub fn init_from_buffer(&mut self, buffer: &SourceBuffer) {
        self.current_file = buffer.filename().to_string();
        self.source_lines = (1..=buffer.line_count() as u32)
            .filter_map(|n| buffer.line(n))
            .map(|l| l.to_string())
            .collect();
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }

    /// Reset the reporter over raw source text
    pub fn init_from_source(&mut self, filename: &str, source: &str) {
        self.init_from_buffer(&SourceBuffer::from_source(filename, source));
    }

    pub fn current_file(&self) -> &str {
        &self.current_file
    }

    /// Report an error; increments the error count
    pub fn error(&mut self, location: &SourceLocation, message: impl Into<String>) {
        self.emit(Severity::Error, location, message.into());
    }

    /// Report a warning
    pub fn warning(&mut self, location: &SourceLocation, message: impl Into<String>) {
        self.emit(Severity::Warning, location, message.into());
    }

    /// Report a note
    pub fn note(&mut self, location: &SourceLocation, message: impl Into<String>) {
        self.emit(Severity::Note, location, message.into());
    }

    fn emit(&mut self, severity: Severity, location: &SourceLocation, message: String) {
        let diagnostic = Diagnostic::new(severity, message, location.clone());
        eprint!("{}", self.render(&diagnostic));
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
    }

    /// Format a diagnostic, including the source echo and caret line
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = format!("{}\n", diagnostic);
        let loc = &diagnostic.location;
        if loc.is_known() {
            if let Some(line) = self.source_lines.get(loc.line as usize - 1) {
                out.push_str(line);
                out.push('\n');
                out.push_str(&" ".repeat(loc.column as usize - 1));
                out.push_str("^\n");
            }
        }
        out
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }

    /// Clear all loaded source and recorded diagnostics
    pub fn cleanup(&mut self) {
        self.current_file.clear();
        self.source_lines.clear();
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}
