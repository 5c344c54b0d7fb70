//! Source location tracking for error reporting
//!
//! This module provides the location type attached to every token and
//! diagnostic, plus the in-memory source buffer the front end scans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// A location in a source file (line and column are 1-based)
///
/// Line 0 / column 0 is the "no location" marker used for failures
/// that happen before any source position exists, such as a file that
/// cannot be opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Create a location with filename
    pub fn new(filename: &str, line: u32, column: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
            column,
        }
    }

    /// The "no location" marker for a file
    pub fn none(filename: &str) -> Self {
        Self::new(filename, 0, 0)
    }

    /// Create a location with just line and column (common in tests)
    pub fn new_simple(line: u32, column: u32) -> Self {
        Self {
            filename: "<input>".to_string(),
            line,
            column,
        }
    }

    /// Whether this location points at an actual source position
    pub fn is_known(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// The whole source file, read once and split into lines
///
/// The lexer scans `text()`; the diagnostic reporter echoes individual
/// lines. Both views come from the same single read.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    filename: String,
    text: String,
    lines: Vec<String>,
}

impl SourceBuffer {
    /// Build a buffer from source text already in memory
    pub fn from_source(filename: &str, text: &str) -> Self {
        Self {
            filename: filename.to_string(),
            text: text.to_string(),
            lines: text.lines().map(|l| l.to_string()).collect(),
        }
    }

    /// Read a file in full and build a buffer from it
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_source(&path.display().to_string(), &text))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fetch a source line by 1-based number
    pub fn line(&self, line: u32) -> Option<&str> {
        if line == 0 {
            return None;
        }
        self.lines.get(line as usize - 1).map(|l| l.as_str())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Map a (line, column) pair to a byte offset into `text()`
    ///
    /// Column counts characters, so the offset lands at the start of
    /// the addressed character. Out-of-range positions map to `None`.
    pub fn offset_of(&self, line: u32, column: u32) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let mut offset = 0usize;
        for (idx, text) in self.lines.iter().enumerate() {
            if idx as u32 + 1 == line {
                let col_offset: usize = text
                    .chars()
                    .take(column as usize - 1)
                    .map(|c| c.len_utf8())
                    .sum();
                if column as usize > text.chars().count() + 1 {
                    return None;
                }
                return Some(offset + col_offset);
            }
            offset += text.len() + 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location() {
        let loc = SourceLocation::new("test.c", 42, 10);
        assert_eq!(loc.filename, "test.c");
        assert_eq!(loc.line, 42);
        assert_eq!(loc.column, 10);
        assert_eq!(format!("{}", loc), "test.c:42:10");
        assert!(loc.is_known());
    }

    #[test]
    fn test_no_location_marker() {
        let loc = SourceLocation::none("missing.c");
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 0);
        assert!(!loc.is_known());
    }

    #[test]
    fn test_buffer_lines() {
        let buffer = SourceBuffer::from_source("test.c", "int main() {\n    return 0;\n}\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(1), Some("int main() {"));
        assert_eq!(buffer.line(2), Some("    return 0;"));
        assert_eq!(buffer.line(3), Some("}"));
        assert_eq!(buffer.line(0), None);
        assert_eq!(buffer.line(4), None);
    }

    #[test]
    fn test_offset_mapping() {
        let buffer = SourceBuffer::from_source("test.c", "ab\ncd\n");
        assert_eq!(buffer.offset_of(1, 1), Some(0));
        assert_eq!(buffer.offset_of(1, 2), Some(1));
        assert_eq!(buffer.offset_of(2, 1), Some(3));
        assert_eq!(buffer.offset_of(2, 2), Some(4));
        assert_eq!(buffer.offset_of(0, 1), None);
        assert_eq!(buffer.offset_of(3, 1), None);
    }

    #[test]
    fn test_offset_past_line_end() {
        let buffer = SourceBuffer::from_source("test.c", "ab\n");
        // One past the last character is the newline position
        assert_eq!(buffer.offset_of(1, 3), Some(2));
        assert_eq!(buffer.offset_of(1, 4), None);
    }
}
