//! Mini-C Compiler - Front End
//!
//! This crate provides the front-end pipeline for the Mini-C subset:
//! - Lexer: tokenizes Mini-C source code
//! - Token stream: sequential cursor with lookahead and recovery
//! - Grammar: declarative productions with FIRST/FOLLOW computation
//! - Parse table: LL(1) cells with a documented conflict policy
//! - Parser: table-driven predictive driver with an explicit stack
//! - Symbol table: scope stack wired into the parser

pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod symbols;
pub mod table;
pub mod token;

pub use grammar::{FirstFollow, Grammar, NonTerminal, Production, Symbol, Terminal};
pub use lexer::Lexer;
pub use parser::Parser;
pub use symbols::{SymbolInfo, SymbolTable, SymbolType, SymbolValue};
pub use table::{Conflict, ParseTable};
pub use token::{
    Keyword, Operator, Punctuation, Token, TokenClass, TokenKind, TokenStream,
};

use minic_common::{CompilerError, DiagnosticReporter, SourceBuffer};
use std::path::Path;

/// High-level front-end interface
pub struct Frontend;

impl Frontend {
    /// Tokenize source text; lexical errors land in the reporter
    pub fn tokenize_source(source: &str, reporter: &mut DiagnosticReporter) -> TokenStream {
        let buffer = SourceBuffer::from_source("<input>", source);
        reporter.init_from_buffer(&buffer);
        Lexer::new(&buffer, reporter).tokenize()
    }

    /// Lex and parse source text; true iff the input is lexically and
    /// syntactically well formed
    pub fn parse_source(source: &str, reporter: &mut DiagnosticReporter) -> bool {
        let tokens = Self::tokenize_source(source, reporter);
        if reporter.has_errors() {
            return false;
        }

        let mut parser = Parser::new(tokens, reporter);
        parser.parse()
    }

    /// Lex and parse a file; `Err` only for I/O failures
    pub fn parse_file(path: &Path, reporter: &mut DiagnosticReporter) -> Result<bool, CompilerError> {
        let buffer = SourceBuffer::from_file(path)?;
        reporter.init_from_buffer(&buffer);
        let tokens = Lexer::new(&buffer, reporter).tokenize();
        if reporter.has_errors() {
            return Ok(false);
        }

        let mut parser = Parser::new(tokens, reporter);
        Ok(parser.parse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_tokenize() {
        let mut reporter = DiagnosticReporter::new();
        let tokens = Frontend::tokenize_source("int x = 42;", &mut reporter);

        // int, x, =, 42, ;, EOF
        assert_eq!(tokens.len(), 6);
        assert!(matches!(tokens.tokens()[0].kind, TokenKind::Keyword(Keyword::Int)));
        assert!(matches!(tokens.tokens()[1].kind, TokenKind::Identifier(_)));
        assert!(matches!(
            tokens.tokens()[2].kind,
            TokenKind::Operator(Operator::Assign)
        ));
        assert!(matches!(tokens.tokens()[3].kind, TokenKind::IntegerLiteral(42)));
        assert!(matches!(tokens.tokens()[5].kind, TokenKind::Eof));
    }

    #[test]
    fn test_frontend_parse_simple_program() {
        let mut reporter = DiagnosticReporter::new();
        let ok = Frontend::parse_source("int main() { return 0; }", &mut reporter);
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
    }

    #[test]
    fn test_frontend_gates_on_lexical_errors() {
        let mut reporter = DiagnosticReporter::new();
        let ok = Frontend::parse_source("int main() { @ return 0; }", &mut reporter);
        assert!(!ok);
        assert_eq!(reporter.error_count(), 1);
        // Only the lexical error is reported; parsing never ran
        assert!(reporter.diagnostics()[0].message.contains("unexpected character"));
    }

    #[test]
    fn test_frontend_parse_missing_file() {
        let mut reporter = DiagnosticReporter::new();
        let result = Frontend::parse_file(Path::new("/no/such/minic-input.c"), &mut reporter);
        assert!(matches!(result, Err(CompilerError::Io { .. })));
    }
}
