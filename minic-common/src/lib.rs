//! Mini-C Compiler - Common Types and Utilities
//!
//! This crate contains the shared types used across the front-end
//! pipeline: source locations, the in-memory source buffer, the
//! diagnostic reporter, and the common error type.

pub mod diagnostics;
pub mod error;
pub mod source_loc;

pub use diagnostics::{Diagnostic, DiagnosticReporter, Severity};
pub use error::CompilerError;
pub use source_loc::{SourceBuffer, SourceLocation};
