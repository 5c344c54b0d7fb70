//! Grammar productions and FIRST/FOLLOW computation
//!
//! The Mini-C grammar is declared as a flat arena of productions. RHS
//! symbols are a sum type: a terminal matched by lexeme, a terminal
//! matched by token class (Identifier and the numeric literals), or a
//! non-terminal. The empty production is a lone epsilon marker.
//!
//! FIRST and FOLLOW are computed by the classical fixed-point
//! algorithms; the epsilon marker appears only in FIRST sets and the
//! end marker `$` only in FOLLOW sets.

use crate::token::TokenClass;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Non-terminal symbols of the Mini-C grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NonTerminal {
    Program,
    MainFunction,
    StatementList,
    Statement,
    Declaration,
    DeclarationTail,
    Type,
    Assignment,
    Loop,
    Condition,
    RelationalOp,
    ReturnStmt,
    Expression,
    ExpressionTail,
    Term,
    TermTail,
    Factor,
    FactorTail,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 18] = [
        NonTerminal::Program,
        NonTerminal::MainFunction,
        NonTerminal::StatementList,
        NonTerminal::Statement,
        NonTerminal::Declaration,
        NonTerminal::DeclarationTail,
        NonTerminal::Type,
        NonTerminal::Assignment,
        NonTerminal::Loop,
        NonTerminal::Condition,
        NonTerminal::RelationalOp,
        NonTerminal::ReturnStmt,
        NonTerminal::Expression,
        NonTerminal::ExpressionTail,
        NonTerminal::Term,
        NonTerminal::TermTail,
        NonTerminal::Factor,
        NonTerminal::FactorTail,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NonTerminal::Program => "PROGRAM",
            NonTerminal::MainFunction => "MAIN_FUNCTION",
            NonTerminal::StatementList => "STATEMENT_LIST",
            NonTerminal::Statement => "STATEMENT",
            NonTerminal::Declaration => "DECLARATION",
            NonTerminal::DeclarationTail => "DECLARATION_TAIL",
            NonTerminal::Type => "TYPE",
            NonTerminal::Assignment => "ASSIGNMENT",
            NonTerminal::Loop => "LOOP",
            NonTerminal::Condition => "CONDITION",
            NonTerminal::RelationalOp => "RELATIONAL_OP",
            NonTerminal::ReturnStmt => "RETURN_STMT",
            NonTerminal::Expression => "EXPRESSION",
            NonTerminal::ExpressionTail => "EXPRESSION_TAIL",
            NonTerminal::Term => "TERM",
            NonTerminal::TermTail => "TERM_TAIL",
            NonTerminal::Factor => "FACTOR",
            NonTerminal::FactorTail => "FACTOR_TAIL",
        }
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Terminal keys: set elements and parse-table columns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terminal {
    /// Matched against the token's exact lexeme
    Lexeme(String),
    /// Matched against the token's class (Identifier and literals)
    Class(TokenClass),
    /// End of input, `$`; appears only in FOLLOW sets
    End,
    /// The empty-string marker; appears only in FIRST sets
    Epsilon,
}

impl Terminal {
    pub fn lexeme(text: &str) -> Self {
        Terminal::Lexeme(text.to_string())
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Lexeme(text) => write!(f, "'{}'", text),
            Terminal::Class(class) => write!(f, "{}", class),
            Terminal::End => write!(f, "$"),
            Terminal::Epsilon => write!(f, "ε"),
        }
    }
}

/// A right-hand-side symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(Terminal::Lexeme(text)) => write!(f, "{}", text),
            Symbol::Terminal(t) => write!(f, "{}", t),
            Symbol::NonTerminal(nt) => write!(f, "{}", nt),
        }
    }
}

/// A production: one non-terminal and its replacement sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
}

impl Production {
    /// True for the empty production (a lone epsilon marker)
    pub fn is_epsilon(&self) -> bool {
        self.rhs.len() == 1 && self.rhs[0] == Symbol::Terminal(Terminal::Epsilon)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// The grammar: an owning arena of productions plus the start symbol
///
/// Everything downstream (parse table, parser stack) refers to
/// productions by index into this arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    productions: Vec<Production>,
    start: NonTerminal,
}

impl Grammar {
    /// The Mini-C reference grammar
    pub fn mini_c() -> Self {
        type N = NonTerminal;

        fn lex(text: &str) -> Symbol {
            Symbol::Terminal(Terminal::lexeme(text))
        }
        fn class(c: TokenClass) -> Symbol {
            Symbol::Terminal(Terminal::Class(c))
        }
        fn nt(n: NonTerminal) -> Symbol {
            Symbol::NonTerminal(n)
        }
        let epsilon = || vec![Symbol::Terminal(Terminal::Epsilon)];

        let ident = || class(TokenClass::Identifier);
        let int_lit = || class(TokenClass::IntegerLiteral);
        let float_lit = || class(TokenClass::FloatLiteral);

        let mut productions = Vec::new();
        let mut rule = |lhs: NonTerminal, rhs: Vec<Symbol>| {
            productions.push(Production { lhs, rhs });
        };

        rule(N::Program, vec![nt(N::MainFunction)]);
        rule(
            N::MainFunction,
            vec![
                lex("int"),
                lex("main"),
                lex("("),
                lex(")"),
                lex("{"),
                nt(N::StatementList),
                lex("}"),
            ],
        );

        // The epsilon alternative must come after the recursive one so
        // the documented (STATEMENT_LIST, '}') conflict resolves to it
        rule(
            N::StatementList,
            vec![nt(N::Statement), nt(N::StatementList)],
        );
        rule(N::StatementList, epsilon());

        rule(N::Statement, vec![nt(N::Declaration)]);
        rule(N::Statement, vec![nt(N::Assignment)]);
        rule(N::Statement, vec![nt(N::Loop)]);
        rule(N::Statement, vec![nt(N::ReturnStmt)]);
        rule(N::Statement, vec![nt(N::Expression), lex(";")]);
        rule(N::Statement, epsilon());

        rule(
            N::Declaration,
            vec![nt(N::Type), ident(), nt(N::DeclarationTail)],
        );
        rule(
            N::DeclarationTail,
            vec![lex("="), nt(N::Expression), lex(";")],
        );
        rule(N::DeclarationTail, vec![lex(";")]);

        rule(N::Type, vec![lex("int")]);
        rule(N::Type, vec![lex("float")]);

        rule(
            N::Assignment,
            vec![ident(), lex("="), nt(N::Expression), lex(";")],
        );

        rule(
            N::Loop,
            vec![
                lex("while"),
                lex("("),
                nt(N::Condition),
                lex(")"),
                lex("{"),
                nt(N::StatementList),
                lex("}"),
            ],
        );
        rule(
            N::Condition,
            vec![nt(N::Expression), nt(N::RelationalOp), nt(N::Expression)],
        );

        rule(N::RelationalOp, vec![lex("<")]);
        rule(N::RelationalOp, vec![lex(">")]);
        rule(N::RelationalOp, vec![lex("<=")]);
        rule(N::RelationalOp, vec![lex(">=")]);
        rule(N::RelationalOp, vec![lex("==")]);
        rule(N::RelationalOp, vec![lex("!=")]);

        rule(N::ReturnStmt, vec![lex("return"), nt(N::Expression), lex(";")]);

        rule(N::Expression, vec![nt(N::Term), nt(N::ExpressionTail)]);
        rule(
            N::ExpressionTail,
            vec![lex("+"), nt(N::Term), nt(N::ExpressionTail)],
        );
        rule(
            N::ExpressionTail,
            vec![lex("-"), nt(N::Term), nt(N::ExpressionTail)],
        );
        rule(N::ExpressionTail, epsilon());

        rule(N::Term, vec![nt(N::Factor), nt(N::TermTail)]);
        rule(
            N::TermTail,
            vec![lex("*"), nt(N::Factor), nt(N::TermTail)],
        );
        rule(
            N::TermTail,
            vec![lex("/"), nt(N::Factor), nt(N::TermTail)],
        );
        rule(N::TermTail, epsilon());

        rule(N::Factor, vec![ident(), nt(N::FactorTail)]);
        rule(N::Factor, vec![int_lit()]);
        rule(N::Factor, vec![float_lit()]);
        rule(N::Factor, vec![lex("("), nt(N::Expression), lex(")")]);

        rule(N::FactorTail, vec![lex("++")]);
        rule(N::FactorTail, vec![lex("--")]);
        rule(N::FactorTail, epsilon());

        Self {
            productions,
            start: N::Program,
        }
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    pub fn start(&self) -> NonTerminal {
        self.start
    }
}

/// FIRST and FOLLOW sets for every non-terminal
#[derive(Debug, Clone, PartialEq)]
pub struct FirstFollow {
    first: HashMap<NonTerminal, HashSet<Terminal>>,
    follow: HashMap<NonTerminal, HashSet<Terminal>>,
}

impl FirstFollow {
    /// Run both fixed-point computations over the grammar
    pub fn compute(grammar: &Grammar) -> Self {
        let first = Self::compute_first(grammar);
        let follow = Self::compute_follow(grammar, &first);
        Self { first, follow }
    }

    pub fn first(&self, nt: NonTerminal) -> &HashSet<Terminal> {
        &self.first[&nt]
    }

    pub fn follow(&self, nt: NonTerminal) -> &HashSet<Terminal> {
        &self.follow[&nt]
    }

    /// FIRST of a symbol sequence; contains ε iff the whole sequence
    /// is nullable (an empty sequence is nullable)
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> HashSet<Terminal> {
        sequence_first(&self.first, symbols)
    }

    fn compute_first(grammar: &Grammar) -> HashMap<NonTerminal, HashSet<Terminal>> {
        let mut first: HashMap<NonTerminal, HashSet<Terminal>> = NonTerminal::ALL
            .iter()
            .map(|nt| (*nt, HashSet::new()))
            .collect();

        loop {
            let mut changed = false;
            for production in grammar.productions() {
                let additions: Vec<Terminal> =
                    sequence_first(&first, &production.rhs).into_iter().collect();
                let set = first.get_mut(&production.lhs).expect("set for every lhs");
                for terminal in additions {
                    if set.insert(terminal) {
                        changed = true;
                    }
                }
            }
            if !changed {
                return first;
            }
        }
    }

    fn compute_follow(
        grammar: &Grammar,
        first: &HashMap<NonTerminal, HashSet<Terminal>>,
    ) -> HashMap<NonTerminal, HashSet<Terminal>> {
        let mut follow: HashMap<NonTerminal, HashSet<Terminal>> = NonTerminal::ALL
            .iter()
            .map(|nt| (*nt, HashSet::new()))
            .collect();
        follow
            .get_mut(&grammar.start())
            .expect("start symbol set")
            .insert(Terminal::End);

        loop {
            let mut changed = false;
            for production in grammar.productions() {
                for (index, symbol) in production.rhs.iter().enumerate() {
                    let Symbol::NonTerminal(target) = symbol else {
                        continue;
                    };

                    let beta = &production.rhs[index + 1..];
                    let beta_first = sequence_first(first, beta);
                    let beta_nullable = beta_first.contains(&Terminal::Epsilon);

                    let mut additions: Vec<Terminal> = beta_first
                        .into_iter()
                        .filter(|t| *t != Terminal::Epsilon)
                        .collect();
                    if beta_nullable {
                        additions.extend(follow[&production.lhs].iter().cloned());
                    }

                    let set = follow.get_mut(target).expect("set for every non-terminal");
                    for terminal in additions {
                        if set.insert(terminal) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                return follow;
            }
        }
    }

    /// Render both set families, sorted for stable output
    pub fn render(&self) -> String {
        let mut out = String::from("FIRST sets:\n");
        for nt in NonTerminal::ALL {
            out.push_str(&format!("  {}: {}\n", nt, render_set(&self.first[&nt])));
        }
        out.push_str("FOLLOW sets:\n");
        for nt in NonTerminal::ALL {
            out.push_str(&format!("  {}: {}\n", nt, render_set(&self.follow[&nt])));
        }
        out
    }
}

fn render_set(set: &HashSet<Terminal>) -> String {
    let mut items: Vec<String> = set.iter().map(|t| t.to_string()).collect();
    items.sort();
    format!("{{ {} }}", items.join(", "))
}

/// FIRST of a symbol sequence against the given FIRST sets
fn sequence_first(
    first: &HashMap<NonTerminal, HashSet<Terminal>>,
    symbols: &[Symbol],
) -> HashSet<Terminal> {
    let mut result = HashSet::new();
    let mut all_nullable = true;

    for symbol in symbols {
        match symbol {
            Symbol::Terminal(Terminal::Epsilon) => {
                // The empty-production marker derives nothing
            }
            Symbol::Terminal(terminal) => {
                result.insert(terminal.clone());
                all_nullable = false;
                break;
            }
            Symbol::NonTerminal(nt) => {
                let sub = &first[nt];
                for terminal in sub {
                    if *terminal != Terminal::Epsilon {
                        result.insert(terminal.clone());
                    }
                }
                if !sub.contains(&Terminal::Epsilon) {
                    all_nullable = false;
                    break;
                }
            }
        }
    }

    if all_nullable {
        result.insert(Terminal::Epsilon);
    }
    result
}
