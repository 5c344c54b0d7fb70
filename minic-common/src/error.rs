//! Error handling for the Mini-C front end
//!
//! The `CompilerError` type covers the failure modes of the pipeline.
//! Most diagnosable conditions flow through the reporter instead and
//! never surface as `Err`; this type is for the hard failures a caller
//! must handle, such as an unreadable input file.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Front-end error type spanning all phases
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("lexical error at {location}: {message}")]
    Lex {
        location: SourceLocation,
        message: String,
    },

    #[error("syntax error at {location}: {message}")]
    Parse {
        location: SourceLocation,
        message: String,
    },

    #[error("semantic error at {location}: {message}")]
    Semantic {
        location: SourceLocation,
        message: String,
    },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl CompilerError {
    pub fn lex_error(message: String, location: SourceLocation) -> Self {
        CompilerError::Lex { location, message }
    }

    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        CompilerError::Parse { location, message }
    }

    pub fn semantic_error(message: String, location: SourceLocation) -> Self {
        CompilerError::Semantic { location, message }
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::Io {
            message: err.to_string(),
        }
    }
}
