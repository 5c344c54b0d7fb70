//! Table-driven predictive parser
//!
//! An explicit-stack LL(1) driver over the Mini-C grammar. The stack
//! is seeded with the end marker and the start symbol; each step pops
//! one symbol and either matches a terminal against the current token
//! or expands a non-terminal through the parse table.
//!
//! Two statement positions are not strictly LL(1); the driver resolves
//! them before consulting the table. `STATEMENT_LIST` decides between
//! recursion and the empty production from the current token alone,
//! and `STATEMENT` picks its alternative from the current token plus
//! one token of pure lookahead (`Identifier '='` starts an assignment,
//! a bare `Identifier` an expression statement).
//!
//! The symbol table is wired into terminal matching: `{`/`}` enter and
//! exit scopes, `int`/`float` open a declaration, the declared name is
//! captured at its identifier, and the closing `;` inserts the binding
//! or reports a redeclaration. Identifiers matched outside a
//! declaration must resolve to a live binding.

use crate::grammar::{FirstFollow, Grammar, NonTerminal, Symbol, Terminal};
use crate::symbols::{SymbolInfo, SymbolTable, SymbolType};
use crate::table::ParseTable;
use crate::token::{Keyword, Operator, Punctuation, Token, TokenClass, TokenKind, TokenStream};
use log::trace;
use minic_common::{DiagnosticReporter, SourceLocation};

/// Hard cap on driver steps, in case of table-construction bugs
const MAX_PARSE_ITERATIONS: usize = 1000;

/// Predictive parser for Mini-C
pub struct Parser<'a> {
    tokens: TokenStream,
    grammar: Grammar,
    sets: FirstFollow,
    table: ParseTable,
    symbols: SymbolTable,
    declared: Vec<SymbolInfo>,
    reporter: &'a mut DiagnosticReporter,
    verbose: bool,
    current_type: SymbolType,
    current_identifier: String,
    current_identifier_loc: SourceLocation,
    processing_declaration: bool,
}

impl<'a> Parser<'a> {
    /// Build the grammar, sets, and table, and wire up the token stream
    pub fn new(tokens: TokenStream, reporter: &'a mut DiagnosticReporter) -> Self {
        let grammar = Grammar::mini_c();
        let sets = FirstFollow::compute(&grammar);
        let table = ParseTable::build(&grammar, &sets);

        let no_location = SourceLocation::none(reporter.current_file());
        let unexpected: Vec<String> = table
            .unexpected_conflicts()
            .iter()
            .map(|c| {
                format!(
                    "unexpected grammar conflict at ({}, {}); keeping production {}",
                    c.non_terminal, c.terminal, c.chosen
                )
            })
            .collect();
        for message in unexpected {
            reporter.warning(&no_location, message);
        }

        Self {
            tokens,
            grammar,
            sets,
            table,
            symbols: SymbolTable::new(),
            declared: Vec::new(),
            reporter,
            verbose: false,
            current_type: SymbolType::Unknown,
            current_identifier: String::new(),
            current_identifier_loc: no_location,
            processing_declaration: false,
        }
    }

    /// Print each driver step to stdout
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn first_follow(&self) -> &FirstFollow {
        &self.sets
    }

    pub fn parse_table(&self) -> &ParseTable {
        &self.table
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Every binding successfully declared while parsing, in order
    pub fn declared_symbols(&self) -> &[SymbolInfo] {
        &self.declared
    }

    /// Run the driver to completion; true iff the input is syntactically
    /// well formed. Semantic diagnostics (redeclaration, undeclared use)
    /// are reported but do not fail the parse.
    pub fn parse(&mut self) -> bool {
        let mut stack = vec![
            Symbol::Terminal(Terminal::End),
            Symbol::NonTerminal(self.grammar.start()),
        ];
        let mut iterations = 0usize;

        while let Some(symbol) = stack.pop() {
            iterations += 1;
            if iterations > MAX_PARSE_ITERATIONS {
                let location = self.tokens.peek().location.clone();
                self.reporter
                    .error(&location, "parser iteration limit exceeded; aborting");
                return false;
            }

            if self.verbose {
                println!(
                    "[step {:>3}] pop {:<18} lookahead {}",
                    iterations,
                    symbol.to_string(),
                    self.tokens.peek()
                );
            }
            trace!("pop {:?}, lookahead {:?}", symbol, self.tokens.peek().kind);

            let ok = match symbol {
                Symbol::Terminal(Terminal::End) => return self.match_end(),
                Symbol::Terminal(Terminal::Epsilon) => true,
                Symbol::Terminal(Terminal::Lexeme(expected)) => self.match_lexeme(&expected),
                Symbol::Terminal(Terminal::Class(class)) => self.match_class(class),
                Symbol::NonTerminal(nt) => self.expand(nt, &mut stack),
            };
            if !ok {
                return false;
            }
        }

        // Unreachable in practice: the end marker sits at the bottom
        true
    }

    /// The stack's end marker: the input must be exhausted too
    fn match_end(&mut self) -> bool {
        let token = self.tokens.peek();
        if token.is_eof() {
            return true;
        }

        let location = token.location.clone();
        let lexeme = token.lexeme.clone();
        self.reporter.error(
            &location,
            format!("unexpected token '{}' after end of program", lexeme),
        );
        self.tokens.advance();
        false
    }

    /// Match a literal terminal and run its side effects
    fn match_lexeme(&mut self, expected: &str) -> bool {
        let token = self.tokens.peek();
        if token.lexeme != expected {
            let location = token.location.clone();
            let lexeme = token.lexeme.clone();
            self.reporter.error(
                &location,
                format!("expected '{}', got '{}'", expected, lexeme),
            );
            self.tokens.advance();
            return false;
        }

        self.tokens.advance();
        match expected {
            "{" => self.symbols.enter_scope(),
            "}" => self.symbols.exit_scope(),
            "int" => {
                self.current_type = SymbolType::Int;
                self.processing_declaration = true;
            }
            "float" => {
                self.current_type = SymbolType::Float;
                self.processing_declaration = true;
            }
            ";" => self.finish_declaration(),
            _ => {}
        }
        true
    }

    /// A `;` closes any open declaration: insert the captured name
    fn finish_declaration(&mut self) {
        if self.processing_declaration && !self.current_identifier.is_empty() {
            let name = self.current_identifier.clone();
            if self.symbols.insert(&name, self.current_type) {
                if let Some(info) = self.symbols.lookup(&name) {
                    self.declared.push(info.clone());
                }
            } else {
                let location = self.current_identifier_loc.clone();
                self.reporter.error(
                    &location,
                    format!("redeclaration of '{}' in the same scope", name),
                );
            }
        }

        self.processing_declaration = false;
        self.current_type = SymbolType::Unknown;
        self.current_identifier.clear();
    }

    /// Match a class terminal; identifiers feed the symbol table
    fn match_class(&mut self, class: TokenClass) -> bool {
        let token = self.tokens.peek();
        if token.class() != class {
            let location = token.location.clone();
            let lexeme = token.lexeme.clone();
            self.reporter
                .error(&location, format!("expected {}, got '{}'", class, lexeme));
            self.tokens.advance();
            return false;
        }

        if class == TokenClass::Identifier {
            let name = token.lexeme.clone();
            let location = token.location.clone();
            if self.processing_declaration {
                // Only the first identifier is the declared name;
                // identifiers inside the initializer are left alone
                if self.current_identifier.is_empty() {
                    self.current_identifier = name;
                    self.current_identifier_loc = location;
                }
            } else if self.symbols.lookup(&name).is_none() {
                self.reporter
                    .error(&location, format!("use of undeclared variable '{}'", name));
            }
        }

        self.tokens.advance();
        true
    }

    /// Expand a non-terminal, applying the documented disambiguations
    /// before consulting the table
    fn expand(&mut self, nt: NonTerminal, stack: &mut Vec<Symbol>) -> bool {
        match nt {
            NonTerminal::StatementList => {
                let token = self.tokens.peek();
                if token.lexeme != "}" && starts_statement(token) {
                    stack.push(Symbol::NonTerminal(NonTerminal::StatementList));
                    stack.push(Symbol::NonTerminal(NonTerminal::Statement));
                }
                return true;
            }
            NonTerminal::Statement => {
                self.expand_statement(stack);
                return true;
            }
            NonTerminal::Declaration => {
                self.processing_declaration = true;
                self.current_type = SymbolType::Unknown;
                self.current_identifier.clear();
                // then expand through the table as usual
            }
            _ => {}
        }

        let token = self.tokens.peek();
        let key = terminal_key(token);
        match self.table.production_for(nt, &key) {
            Some(index) => {
                let production = self.grammar.production(index);
                if self.verbose {
                    println!("           apply P{}: {}", index, production);
                }
                if !production.is_epsilon() {
                    for symbol in production.rhs.iter().rev() {
                        stack.push(symbol.clone());
                    }
                }
                true
            }
            None => {
                let expected: Vec<String> = self
                    .table
                    .expected_terminals(nt)
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                let location = token.location.clone();
                let lexeme = token.lexeme.clone();
                self.reporter.error(
                    &location,
                    format!(
                        "unexpected '{}' while parsing {}; expected one of {}",
                        lexeme,
                        nt,
                        expected.join(", ")
                    ),
                );
                self.tokens.advance();
                false
            }
        }
    }

    /// Pick the statement alternative from one token of lookahead
    fn expand_statement(&mut self, stack: &mut Vec<Symbol>) {
        let token = self.tokens.peek();
        match &token.kind {
            TokenKind::Keyword(Keyword::Int | Keyword::Float) => {
                stack.push(Symbol::NonTerminal(NonTerminal::Declaration));
            }
            TokenKind::Identifier(_) => {
                if matches!(
                    self.tokens.peek_next().kind,
                    TokenKind::Operator(Operator::Assign)
                ) {
                    stack.push(Symbol::NonTerminal(NonTerminal::Assignment));
                } else {
                    stack.push(Symbol::Terminal(Terminal::lexeme(";")));
                    stack.push(Symbol::NonTerminal(NonTerminal::Expression));
                }
            }
            TokenKind::Keyword(Keyword::While) => {
                stack.push(Symbol::NonTerminal(NonTerminal::Loop));
            }
            TokenKind::Keyword(Keyword::Return) => {
                stack.push(Symbol::NonTerminal(NonTerminal::ReturnStmt));
            }
            TokenKind::IntegerLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::Punctuation(Punctuation::LeftParen)
            | TokenKind::Operator(Operator::Increment | Operator::Decrement) => {
                stack.push(Symbol::Terminal(Terminal::lexeme(";")));
                stack.push(Symbol::NonTerminal(NonTerminal::Expression));
            }
            _ => {
                // Nothing that can start a statement: derive ε
            }
        }
    }
}

/// Tokens that may begin a statement, per the driver's lookahead rule
fn starts_statement(token: &Token) -> bool {
    matches!(
        &token.kind,
        TokenKind::Keyword(Keyword::Int | Keyword::Float | Keyword::While | Keyword::Return)
            | TokenKind::Identifier(_)
            | TokenKind::IntegerLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::Punctuation(Punctuation::LeftParen)
            | TokenKind::Operator(Operator::Increment | Operator::Decrement)
    )
}

/// Table lookup key for the current token
fn terminal_key(token: &Token) -> Terminal {
    match &token.kind {
        TokenKind::Keyword(_) | TokenKind::Operator(_) | TokenKind::Punctuation(_) => {
            Terminal::Lexeme(token.lexeme.clone())
        }
        TokenKind::Identifier(_)
        | TokenKind::IntegerLiteral(_)
        | TokenKind::FloatLiteral(_)
        | TokenKind::StringLiteral(_)
        | TokenKind::Error => Terminal::Class(token.class()),
        TokenKind::Eof => Terminal::End,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use minic_common::SourceBuffer;

    fn parse(source: &str) -> (bool, DiagnosticReporter, Vec<SymbolInfo>) {
        let buffer = SourceBuffer::from_source("test.c", source);
        let mut reporter = DiagnosticReporter::new();
        reporter.init_from_buffer(&buffer);
        let stream = Lexer::new(&buffer, &mut reporter).tokenize();

        let mut parser = Parser::new(stream, &mut reporter);
        let ok = parser.parse();
        let declared = parser.declared_symbols().to_vec();
        (ok, reporter, declared)
    }

    #[test]
    fn test_empty_body() {
        let (ok, reporter, _) = parse("int main() { }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
    }

    #[test]
    fn test_declaration_records_symbol() {
        let (ok, reporter, declared) = parse("int main() { float x = 2.5; }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].name, "x");
        assert_eq!(declared[0].ty, SymbolType::Float);
        assert_eq!(declared[0].scope_level, 1);
    }

    #[test]
    fn test_declaration_without_initializer() {
        let (ok, reporter, declared) = parse("int main() { int x; x = 1; }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(declared.len(), 1);
    }

    #[test]
    fn test_expression_statement() {
        let (ok, reporter, _) = parse("int main() { int x = 1; x + 2; x++; }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
    }

    #[test]
    fn test_loop_body_declares_in_inner_scope() {
        let (ok, reporter, declared) =
            parse("int main() { int i = 0; while (i < 3) { int j = 1; i = i + j; } }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[0].name, "i");
        assert_eq!(declared[0].scope_level, 1);
        assert_eq!(declared[1].name, "j");
        assert_eq!(declared[1].scope_level, 2);
    }

    #[test]
    fn test_trailing_tokens_are_an_error() {
        let (ok, reporter, _) = parse("int main() { } 42");
        assert!(!ok);
        assert_eq!(reporter.error_count(), 1);
        assert!(reporter.diagnostics()[0]
            .message
            .contains("after end of program"));
    }

    #[test]
    fn test_missing_main_is_a_mismatch() {
        let (ok, reporter, _) = parse("int start() { }");
        assert!(!ok);
        assert!(reporter.diagnostics()[0].message.contains("expected 'main'"));
    }

    #[test]
    fn test_table_error_lists_expected_terminals() {
        let (ok, reporter, _) = parse("int main() { int x = while; }");
        assert!(!ok);
        assert!(reporter.error_count() >= 1);
        let message = &reporter.diagnostics()[0].message;
        assert!(message.contains("unexpected 'while'"));
        assert!(message.contains("expected one of"));
    }

    #[test]
    fn test_undeclared_in_condition() {
        let (ok, reporter, _) = parse("int main() { int i = 0; while (k < 2) { i = 1; } }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 1);
        assert!(reporter.diagnostics()[0].message.contains("'k'"));
    }

    #[test]
    fn test_shadowing_across_scopes_is_allowed() {
        let (ok, reporter, declared) =
            parse("int main() { int x = 1; while (x < 2) { float x = 0.5; x = 1.5; } }");
        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[1].scope_level, 2);
    }

    #[test]
    fn test_watchdog_trips_on_very_long_input() {
        let mut body = String::new();
        for i in 0..200 {
            body.push_str(&format!("int a{} = {};\n", i, i));
        }
        let source = format!("int main() {{\n{}}}\n", body);

        let (ok, reporter, _) = parse(&source);
        assert!(!ok);
        assert!(reporter
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("iteration limit")));
    }

    #[test]
    fn test_parse_reports_failure_once_and_stops() {
        let (ok, reporter, _) = parse("int main() { int = 5; }");
        assert!(!ok);
        assert_eq!(reporter.error_count(), 1);
    }
}
