//! End-to-end parsing scenarios over the full pipeline

use minic_common::{DiagnosticReporter, SourceBuffer};
use minic_frontend::{Lexer, Parser, SymbolType};

struct Outcome {
    ok: bool,
    reporter: DiagnosticReporter,
    declared: Vec<minic_frontend::SymbolInfo>,
    final_level: u32,
}

fn run(source: &str) -> Outcome {
    let buffer = SourceBuffer::from_source("test.c", source);
    let mut reporter = DiagnosticReporter::new();
    reporter.init_from_buffer(&buffer);
    let tokens = Lexer::new(&buffer, &mut reporter).tokenize();

    let mut parser = Parser::new(tokens, &mut reporter);
    let ok = parser.parse();
    let declared = parser.declared_symbols().to_vec();
    let final_level = parser.symbol_table().current_level();
    Outcome {
        ok,
        reporter,
        declared,
        final_level,
    }
}

#[test]
fn scenario_simple_declaration_and_return() {
    let outcome = run("int main() { int x = 5; return 0; }");

    assert!(outcome.ok);
    assert_eq!(outcome.reporter.error_count(), 0);
    assert_eq!(outcome.declared.len(), 1);
    assert_eq!(outcome.declared[0].name, "x");
    assert_eq!(outcome.declared[0].ty, SymbolType::Int);
    assert_eq!(outcome.declared[0].scope_level, 1);
}

#[test]
fn scenario_while_loop_with_counter() {
    let outcome = run(
        "int main() { int i = 0; int sum = 0; \
         while (i < 10) { sum = sum + i; i++; } return 0; }",
    );

    assert!(outcome.ok);
    assert_eq!(outcome.reporter.error_count(), 0);
    assert_eq!(outcome.declared.len(), 2);
    // Every scope opened during the parse was closed again
    assert_eq!(outcome.final_level, 0);
}

#[test]
fn scenario_missing_semicolon() {
    let outcome = run("int main() { int x = 5 return 0; }");

    assert!(!outcome.ok);
    assert!(outcome.reporter.error_count() >= 1);
    assert!(
        outcome
            .reporter
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("';'")),
        "diagnostic should mention the expected ';'"
    );
}

#[test]
fn scenario_redeclaration() {
    let outcome = run("int main() { int x = 5; int x = 6; return 0; }");

    assert_eq!(outcome.reporter.error_count(), 1);
    let message = &outcome.reporter.diagnostics()[0].message;
    assert!(message.contains("redeclaration"));
    assert!(message.contains("'x'"));
    // The error points at the second declaration of x
    assert_eq!(outcome.reporter.diagnostics()[0].location.line, 1);
    assert_eq!(outcome.reporter.diagnostics()[0].location.column, 29);
}

#[test]
fn scenario_use_of_undeclared_variable() {
    let outcome = run("int main() { y = 1; return 0; }");

    assert_eq!(outcome.reporter.error_count(), 1);
    assert!(outcome.reporter.diagnostics()[0]
        .message
        .contains("use of undeclared variable 'y'"));
}

#[test]
fn scenario_operator_precedence_program() {
    let outcome = run(
        "int main() { int a = 5; int b = 10; \
         int r = a + b * (a - b); return 0; }",
    );

    assert!(outcome.ok);
    assert_eq!(outcome.reporter.error_count(), 0);
    let names: Vec<&str> = outcome.declared.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "r"]);
}
