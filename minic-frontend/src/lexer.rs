//! Mini-C lexer
//!
//! Hand-written scanner that turns a source buffer into a token
//! stream. Handles keywords, identifiers, integer and float literals,
//! string literals with escapes, operators with maximal munch, and
//! both comment forms. Lexical errors are reported through the
//! diagnostic reporter and scanning continues, so downstream passes
//! always see an Eof-terminated stream.

use crate::token::{Keyword, Operator, Punctuation, Token, TokenKind, TokenStream};
use minic_common::{DiagnosticReporter, SourceBuffer, SourceLocation};
use std::collections::HashMap;

/// Mini-C lexer
pub struct Lexer<'a> {
    input: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    filename: String,
    keywords: HashMap<&'static str, Keyword>,
    reporter: &'a mut DiagnosticReporter,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over a loaded source buffer
    pub fn new(buffer: &SourceBuffer, reporter: &'a mut DiagnosticReporter) -> Self {
        Self {
            input: buffer.text().chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            filename: buffer.filename().to_string(),
            keywords: keyword_map(),
            reporter,
        }
    }

    /// Get current character
    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(ch)
        } else {
            None
        }
    }

    /// Get current location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(&self.filename, self.line, self.column)
    }

    /// The verbatim source substring scanned since `start`
    fn lexeme_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Tokenize entire input into a stream
    pub fn tokenize(mut self) -> TokenStream {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.current_char().is_none() {
                break;
            }

            if let Some(token) = self.next_token() {
                tokens.push(token);
            }
        }

        // Eof location is the position just past the last character
        tokens.push(Token::eof(self.current_location()));
        TokenStream::new(tokens)
    }

    /// Scan one token; comments and unrecognized characters yield none
    fn next_token(&mut self) -> Option<Token> {
        let ch = self.current_char()?;

        if ch.is_ascii_alphabetic() || ch == '_' {
            Some(self.tokenize_identifier())
        } else if ch.is_ascii_digit() {
            Some(self.tokenize_number())
        } else if ch == '"' {
            Some(self.tokenize_string_literal())
        } else {
            self.tokenize_operator()
        }
    }

    /// Tokenize an identifier or keyword
    fn tokenize_identifier(&mut self) -> Token {
        let location = self.current_location();
        let start = self.position;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let lexeme = self.lexeme_from(start);
        let kind = match self.keywords.get(lexeme.as_str()) {
            Some(&keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(lexeme.clone()),
        };
        Token::new(kind, lexeme, location)
    }

    /// Tokenize an integer or float literal
    fn tokenize_number(&mut self) -> Token {
        let location = self.current_location();
        let start = self.position;
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        // A '.' belongs to the literal only when a digit follows
        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let lexeme = self.lexeme_from(start);
        let kind = if is_float {
            match lexeme.parse::<f64>() {
                Ok(value) => TokenKind::FloatLiteral(value),
                Err(_) => {
                    self.reporter
                        .error(&location, format!("invalid float literal '{}'", lexeme));
                    TokenKind::Error
                }
            }
        } else {
            match lexeme.parse::<i64>() {
                Ok(value) => TokenKind::IntegerLiteral(value),
                Err(_) => {
                    self.reporter.error(
                        &location,
                        format!("integer literal '{}' out of range", lexeme),
                    );
                    TokenKind::Error
                }
            }
        };
        Token::new(kind, lexeme, location)
    }

    /// Tokenize a string literal, interpreting the supported escapes
    fn tokenize_string_literal(&mut self) -> Token {
        let location = self.current_location();
        let start = self.position;
        self.advance(); // opening quote

        let mut value = String::new();
        let mut malformed = false;
        let mut terminated = false;

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    terminated = true;
                    break;
                }
                '\\' => {
                    let escape_location = self.current_location();
                    self.advance();
                    match self.current_char() {
                        Some('n') => {
                            value.push('\n');
                            self.advance();
                        }
                        Some('t') => {
                            value.push('\t');
                            self.advance();
                        }
                        Some('r') => {
                            value.push('\r');
                            self.advance();
                        }
                        Some('\\') => {
                            value.push('\\');
                            self.advance();
                        }
                        Some('"') => {
                            value.push('"');
                            self.advance();
                        }
                        Some(other) => {
                            self.reporter.error(
                                &escape_location,
                                format!("invalid escape sequence '\\{}'", other),
                            );
                            malformed = true;
                            self.advance();
                        }
                        None => break,
                    }
                }
                _ => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        if !terminated {
            self.reporter
                .error(&location, "unterminated string literal");
            malformed = true;
        }

        let lexeme = self.lexeme_from(start);
        let kind = if malformed {
            TokenKind::Error
        } else {
            TokenKind::StringLiteral(value)
        };
        Token::new(kind, lexeme, location)
    }

    /// Tokenize operators and punctuation with maximal munch; comments
    /// and unrecognized characters produce no token
    fn tokenize_operator(&mut self) -> Option<Token> {
        let location = self.current_location();
        let start = self.position;
        let ch = self.current_char()?;

        let kind = match ch {
            '(' => {
                self.advance();
                TokenKind::Punctuation(Punctuation::LeftParen)
            }
            ')' => {
                self.advance();
                TokenKind::Punctuation(Punctuation::RightParen)
            }
            '{' => {
                self.advance();
                TokenKind::Punctuation(Punctuation::LeftBrace)
            }
            '}' => {
                self.advance();
                TokenKind::Punctuation(Punctuation::RightBrace)
            }
            '[' => {
                self.advance();
                TokenKind::Punctuation(Punctuation::LeftBracket)
            }
            ']' => {
                self.advance();
                TokenKind::Punctuation(Punctuation::RightBracket)
            }
            ';' => {
                self.advance();
                TokenKind::Operator(Operator::Semicolon)
            }
            ',' => {
                self.advance();
                TokenKind::Operator(Operator::Comma)
            }
            '.' => {
                self.advance();
                TokenKind::Operator(Operator::Dot)
            }
            ':' => {
                self.advance();
                TokenKind::Operator(Operator::Colon)
            }
            '?' => {
                self.advance();
                TokenKind::Operator(Operator::Question)
            }
            '~' => {
                self.advance();
                TokenKind::Operator(Operator::Tilde)
            }
            '+' => {
                self.advance();
                if self.current_char() == Some('+') {
                    self.advance();
                    TokenKind::Operator(Operator::Increment)
                } else if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::AddAssign)
                } else {
                    TokenKind::Operator(Operator::Plus)
                }
            }
            '-' => {
                self.advance();
                if self.current_char() == Some('-') {
                    self.advance();
                    TokenKind::Operator(Operator::Decrement)
                } else if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::SubAssign)
                } else if self.current_char() == Some('>') {
                    self.advance();
                    TokenKind::Operator(Operator::Arrow)
                } else {
                    TokenKind::Operator(Operator::Minus)
                }
            }
            '*' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::MulAssign)
                } else {
                    TokenKind::Operator(Operator::Star)
                }
            }
            '/' => {
                if self.peek_char(1) == Some('/') {
                    self.skip_line_comment();
                    return None;
                } else if self.peek_char(1) == Some('*') {
                    self.skip_block_comment(&location);
                    return None;
                }
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::DivAssign)
                } else {
                    TokenKind::Operator(Operator::Slash)
                }
            }
            '%' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::ModAssign)
                } else {
                    TokenKind::Operator(Operator::Percent)
                }
            }
            '<' => {
                self.advance();
                if self.current_char() == Some('<') {
                    self.advance();
                    if self.current_char() == Some('=') {
                        self.advance();
                        TokenKind::Operator(Operator::ShlAssign)
                    } else {
                        TokenKind::Operator(Operator::ShiftLeft)
                    }
                } else if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::LessEqual)
                } else {
                    TokenKind::Operator(Operator::Less)
                }
            }
            '>' => {
                self.advance();
                if self.current_char() == Some('>') {
                    self.advance();
                    if self.current_char() == Some('=') {
                        self.advance();
                        TokenKind::Operator(Operator::ShrAssign)
                    } else {
                        TokenKind::Operator(Operator::ShiftRight)
                    }
                } else if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::GreaterEqual)
                } else {
                    TokenKind::Operator(Operator::Greater)
                }
            }
            '=' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::EqualEqual)
                } else {
                    TokenKind::Operator(Operator::Assign)
                }
            }
            '!' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::NotEqual)
                } else {
                    TokenKind::Operator(Operator::Bang)
                }
            }
            '&' => {
                self.advance();
                if self.current_char() == Some('&') {
                    self.advance();
                    TokenKind::Operator(Operator::LogicalAnd)
                } else if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::AndAssign)
                } else {
                    TokenKind::Operator(Operator::Ampersand)
                }
            }
            '|' => {
                self.advance();
                if self.current_char() == Some('|') {
                    self.advance();
                    TokenKind::Operator(Operator::LogicalOr)
                } else if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::OrAssign)
                } else {
                    TokenKind::Operator(Operator::Pipe)
                }
            }
            '^' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(Operator::XorAssign)
                } else {
                    TokenKind::Operator(Operator::Caret)
                }
            }
            other => {
                self.reporter
                    .error(&location, format!("unexpected character '{}'", other));
                self.advance();
                return None;
            }
        };

        Some(Token::new(kind, self.lexeme_from(start), location))
    }

    fn skip_line_comment(&mut self) {
        self.advance(); // first '/'
        self.advance(); // second '/'
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self, location: &SourceLocation) {
        self.advance(); // '/'
        self.advance(); // '*'

        while let Some(ch) = self.current_char() {
            if ch == '*' && self.peek_char(1) == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }

        self.reporter
            .error(location, "unterminated block comment");
    }
}

fn keyword_map() -> HashMap<&'static str, Keyword> {
    let keywords = [
        ("auto", Keyword::Auto),
        ("const", Keyword::Const),
        ("double", Keyword::Double),
        ("float", Keyword::Float),
        ("int", Keyword::Int),
        ("struct", Keyword::Struct),
        ("break", Keyword::Break),
        ("continue", Keyword::Continue),
        ("else", Keyword::Else),
        ("if", Keyword::If),
        ("for", Keyword::For),
        ("short", Keyword::Short),
        ("unsigned", Keyword::Unsigned),
        ("long", Keyword::Long),
        ("signed", Keyword::Signed),
        ("switch", Keyword::Switch),
        ("case", Keyword::Case),
        ("default", Keyword::Default),
        ("void", Keyword::Void),
        ("enum", Keyword::Enum),
        ("goto", Keyword::Goto),
        ("register", Keyword::Register),
        ("sizeof", Keyword::Sizeof),
        ("typedef", Keyword::Typedef),
        ("volatile", Keyword::Volatile),
        ("char", Keyword::Char),
        ("do", Keyword::Do),
        ("extern", Keyword::Extern),
        ("static", Keyword::Static),
        ("union", Keyword::Union),
        ("while", Keyword::While),
        ("return", Keyword::Return),
    ];

    keywords.into_iter().collect()
}
