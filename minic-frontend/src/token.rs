//! Token model and token stream
//!
//! Tokens are tagged records: the kind enum carries the subkind or the
//! literal payload inline, while the token itself keeps the verbatim
//! lexeme and the location of its first character. The stream is a
//! plain cursor over an Eof-terminated vector.

use minic_common::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keywords recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Auto, Const, Double, Float, Int, Struct, Break, Continue, Else, If,
    For, Short, Unsigned, Long, Signed, Switch, Case, Default, Void,
    Enum, Goto, Register, Sizeof, Typedef, Volatile, Char, Do, Extern,
    Static, Union, While, Return,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Auto => "auto",
            Keyword::Const => "const",
            Keyword::Double => "double",
            Keyword::Float => "float",
            Keyword::Int => "int",
            Keyword::Struct => "struct",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::Else => "else",
            Keyword::If => "if",
            Keyword::For => "for",
            Keyword::Short => "short",
            Keyword::Unsigned => "unsigned",
            Keyword::Long => "long",
            Keyword::Signed => "signed",
            Keyword::Switch => "switch",
            Keyword::Case => "case",
            Keyword::Default => "default",
            Keyword::Void => "void",
            Keyword::Enum => "enum",
            Keyword::Goto => "goto",
            Keyword::Register => "register",
            Keyword::Sizeof => "sizeof",
            Keyword::Typedef => "typedef",
            Keyword::Volatile => "volatile",
            Keyword::Char => "char",
            Keyword::Do => "do",
            Keyword::Extern => "extern",
            Keyword::Static => "static",
            Keyword::Union => "union",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator variants, single- and multi-character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Arrow,          // ->
    Increment,      // ++
    Decrement,      // --
    ShiftLeft,      // <<
    ShiftRight,     // >>
    LessEqual,      // <=
    GreaterEqual,   // >=
    EqualEqual,     // ==
    NotEqual,       // !=
    LogicalAnd,     // &&
    LogicalOr,      // ||
    MulAssign,      // *=
    DivAssign,      // /=
    ModAssign,      // %=
    AddAssign,      // +=
    SubAssign,      // -=
    ShlAssign,      // <<=
    ShrAssign,      // >>=
    AndAssign,      // &=
    XorAssign,      // ^=
    OrAssign,       // |=
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    Percent,        // %
    Less,           // <
    Greater,        // >
    Assign,         // =
    Dot,            // .
    Comma,          // ,
    Semicolon,      // ;
    Colon,          // :
    Bang,           // !
    Question,       // ?
    Tilde,          // ~
    Ampersand,      // &
    Pipe,           // |
    Caret,          // ^
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Arrow => "->",
            Operator::Increment => "++",
            Operator::Decrement => "--",
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::EqualEqual => "==",
            Operator::NotEqual => "!=",
            Operator::LogicalAnd => "&&",
            Operator::LogicalOr => "||",
            Operator::MulAssign => "*=",
            Operator::DivAssign => "/=",
            Operator::ModAssign => "%=",
            Operator::AddAssign => "+=",
            Operator::SubAssign => "-=",
            Operator::ShlAssign => "<<=",
            Operator::ShrAssign => ">>=",
            Operator::AndAssign => "&=",
            Operator::XorAssign => "^=",
            Operator::OrAssign => "|=",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Assign => "=",
            Operator::Dot => ".",
            Operator::Comma => ",",
            Operator::Semicolon => ";",
            Operator::Colon => ":",
            Operator::Bang => "!",
            Operator::Question => "?",
            Operator::Tilde => "~",
            Operator::Ampersand => "&",
            Operator::Pipe => "|",
            Operator::Caret => "^",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bracket punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Punctuation {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
}

impl Punctuation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuation::LeftParen => "(",
            Punctuation::RightParen => ")",
            Punctuation::LeftBrace => "{",
            Punctuation::RightBrace => "}",
            Punctuation::LeftBracket => "[",
            Punctuation::RightBracket => "]",
        }
    }
}

impl fmt::Display for Punctuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token kinds with their subkind or literal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    Operator(Operator),
    Punctuation(Punctuation),
    Eof,
    Error,
}

/// Payload-free discriminant of `TokenKind`
///
/// Class-terminals in the grammar match on this, and the token dump
/// labels tokens with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Keyword,
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    Operator,
    Punctuation,
    Eof,
    Error,
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Keyword(_) => TokenClass::Keyword,
            TokenKind::Identifier(_) => TokenClass::Identifier,
            TokenKind::IntegerLiteral(_) => TokenClass::IntegerLiteral,
            TokenKind::FloatLiteral(_) => TokenClass::FloatLiteral,
            TokenKind::StringLiteral(_) => TokenClass::StringLiteral,
            TokenKind::Operator(_) => TokenClass::Operator,
            TokenKind::Punctuation(_) => TokenClass::Punctuation,
            TokenKind::Eof => TokenClass::Eof,
            TokenKind::Error => TokenClass::Error,
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenClass::Keyword => "Keyword",
            TokenClass::Identifier => "Identifier",
            TokenClass::IntegerLiteral => "IntegerLiteral",
            TokenClass::FloatLiteral => "FloatLiteral",
            TokenClass::StringLiteral => "StringLiteral",
            TokenClass::Operator => "Operator",
            TokenClass::Punctuation => "Punctuation",
            TokenClass::Eof => "EOF",
            TokenClass::Error => "Error",
        };
        write!(f, "{}", name)
    }
}

/// A token: kind, verbatim lexeme, and the location of its first character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "<EOF>", location)
    }

    pub fn class(&self) -> TokenClass {
        self.kind.class()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}) at {}", self.lexeme, self.class(), self.location)
    }
}

/// Sequential cursor over an Eof-terminated token vector
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    /// Build a stream, appending a terminating Eof token if missing
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|t| t.is_eof()) {
            let location = tokens
                .last()
                .map(|t| t.location.clone())
                .unwrap_or_else(|| SourceLocation::none("<input>"));
            tokens.push(Token::eof(location));
        }
        Self { tokens, cursor: 0 }
    }

    /// Non-consuming read of the current token
    pub fn peek(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    /// Non-consuming read one token past the current one
    pub fn peek_next(&self) -> &Token {
        &self.tokens[(self.cursor + 1).min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token
    pub fn advance(&mut self) -> &Token {
        let index = self.cursor.min(self.tokens.len() - 1);
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        &self.tokens[index]
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Rewind the cursor to the first token
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Panic-mode skip: advance past the offending token, then stop at
    /// the next `;` or a keyword that can lead a statement
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            match &self.peek().kind {
                TokenKind::Operator(Operator::Semicolon) => return,
                TokenKind::Keyword(
                    Keyword::Int | Keyword::Float | Keyword::While | Keyword::If | Keyword::Return,
                ) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, SourceLocation::new_simple(1, 1))
    }

    fn sample_stream() -> TokenStream {
        TokenStream::new(vec![
            tok(TokenKind::Keyword(Keyword::Int), "int"),
            tok(TokenKind::Identifier("x".to_string()), "x"),
            tok(TokenKind::Operator(Operator::Assign), "="),
            tok(TokenKind::IntegerLiteral(5), "5"),
            tok(TokenKind::Operator(Operator::Semicolon), ";"),
        ])
    }

    #[test]
    fn test_stream_appends_eof() {
        let stream = sample_stream();
        assert_eq!(stream.len(), 6);
        assert!(stream.tokens().last().unwrap().is_eof());
    }

    #[test]
    fn test_peek_and_advance() {
        let mut stream = sample_stream();
        assert_eq!(stream.peek().lexeme, "int");
        assert_eq!(stream.advance().lexeme, "int");
        assert_eq!(stream.peek().lexeme, "x");
        assert_eq!(stream.peek_next().lexeme, "=");
        assert_eq!(stream.cursor(), 1);
    }

    #[test]
    fn test_peek_past_end_returns_eof() {
        let mut stream = TokenStream::new(vec![tok(TokenKind::IntegerLiteral(1), "1")]);
        stream.advance();
        stream.advance();
        assert!(stream.is_at_end());
        assert!(stream.peek().is_eof());
        assert!(stream.peek_next().is_eof());
    }

    #[test]
    fn test_reset() {
        let mut stream = sample_stream();
        stream.advance();
        stream.advance();
        stream.reset();
        assert_eq!(stream.cursor(), 0);
        assert_eq!(stream.peek().lexeme, "int");
    }

    #[test]
    fn test_synchronize_stops_at_semicolon() {
        let mut stream = TokenStream::new(vec![
            tok(TokenKind::Identifier("a".to_string()), "a"),
            tok(TokenKind::Identifier("b".to_string()), "b"),
            tok(TokenKind::Operator(Operator::Semicolon), ";"),
            tok(TokenKind::Identifier("c".to_string()), "c"),
        ]);

        stream.synchronize();
        assert_eq!(stream.peek().lexeme, ";");
    }

    #[test]
    fn test_synchronize_stops_at_statement_keyword() {
        let mut stream = TokenStream::new(vec![
            tok(TokenKind::Identifier("a".to_string()), "a"),
            tok(TokenKind::IntegerLiteral(2), "2"),
            tok(TokenKind::Keyword(Keyword::While), "while"),
        ]);

        stream.synchronize();
        assert_eq!(stream.peek().lexeme, "while");
    }

    #[test]
    fn test_synchronize_runs_off_the_end() {
        let mut stream = TokenStream::new(vec![
            tok(TokenKind::Identifier("a".to_string()), "a"),
            tok(TokenKind::IntegerLiteral(2), "2"),
        ]);

        stream.synchronize();
        assert!(stream.is_at_end());
    }

    #[test]
    fn test_token_class() {
        assert_eq!(
            TokenKind::Identifier("x".to_string()).class(),
            TokenClass::Identifier
        );
        assert_eq!(TokenKind::IntegerLiteral(1).class(), TokenClass::IntegerLiteral);
        assert_eq!(TokenKind::Eof.class(), TokenClass::Eof);
    }
}
