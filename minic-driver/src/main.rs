//! Mini-C front-end driver
//!
//! Command-line entry point: reads a source file (or materializes a
//! sample program), runs the lexer and the LL(1) parser, and prints
//! the requested dumps along the way. Source errors are reported and
//! counted but do not change the exit code; only CLI usage errors
//! exit non-zero.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use log::debug;
use minic_common::{DiagnosticReporter, SourceBuffer, SourceLocation};
use minic_frontend::{Lexer, SymbolInfo, Token, TokenKind, TokenStream};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "minicc",
    version,
    about = "Mini-C front end: lexer, LL(1) parser, and symbol table"
)]
struct Args {
    /// Input Mini-C source file (a sample program is generated when omitted)
    input: Option<PathBuf>,

    /// Display lexical tokens
    #[clap(long)]
    show_tokens: bool,

    /// Display the LL(1) parse table
    #[clap(long)]
    show_parse_table: bool,

    /// Show detailed parsing steps
    #[clap(long)]
    show_parse_steps: bool,

    /// Enable verbose output for all stages
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(mut args: Args) -> Result<()> {
    if args.verbose {
        env_logger::init();
        args.show_tokens = true;
        args.show_parse_table = true;
        args.show_parse_steps = true;
    }

    let path = match &args.input {
        Some(path) => {
            println!("Using file: {}", path.display());
            path.clone()
        }
        None => {
            let path = PathBuf::from("test_program.c");
            write_test_file(&path)?;
            path
        }
    };

    let mut reporter = DiagnosticReporter::new();
    let buffer = match SourceBuffer::from_file(&path) {
        Ok(buffer) => buffer,
        Err(err) => {
            let location = SourceLocation::none(&path.display().to_string());
            reporter.error(
                &location,
                format!("cannot open source file '{}': {}", path.display(), err),
            );
            println!("\nSkipping parsing due to lexical errors.");
            return Ok(());
        }
    };
    reporter.init_from_buffer(&buffer);

    if args.show_tokens {
        println!("\n=== LEXICAL ANALYSIS ===\n");
    }
    let tokens = Lexer::new(&buffer, &mut reporter).tokenize();
    if args.show_tokens {
        dump_tokens(&tokens, &reporter, buffer.filename());
    }

    // Parsing only makes sense on a lexically clean stream
    if reporter.has_errors() {
        println!("\nSkipping parsing due to lexical errors.");
        return Ok(());
    }

    println!("\n=== SYNTAX ANALYSIS ===\n");
    let mut parser = minic_frontend::Parser::new(tokens, &mut reporter);
    parser.set_verbose(args.show_parse_steps);

    if args.verbose {
        println!("Computing FIRST and FOLLOW sets...");
        print!("{}", parser.first_follow().render());
    }

    if args.show_parse_table {
        println!("\nLL(1) Parsing Table:");
        print!("{}", parser.parse_table().render(parser.grammar()));
    }

    println!("\nStarting LL(1) Parsing...");
    let parse_ok = parser.parse();
    let declared: Vec<SymbolInfo> = parser.declared_symbols().to_vec();

    if args.verbose && !declared.is_empty() {
        println!("\nDeclared symbols:");
        for info in &declared {
            println!("  {} ({}) at scope {}", info.name, info.ty, info.scope_level);
        }
    }

    let errors = reporter.error_count();
    debug!("parse finished: ok={}, errors={}", parse_ok, errors);

    if parse_ok && errors == 0 {
        println!("\nParsing completed successfully.");
    } else {
        println!(
            "\nParsing failed with {} error{}.",
            errors,
            if errors == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

/// Print the token stream and its statistics
fn dump_tokens(tokens: &TokenStream, reporter: &DiagnosticReporter, filename: &str) {
    println!("Tokens in {}:", filename);
    println!("----------------------------------------");

    let mut identifiers = 0usize;
    let mut keywords = 0usize;
    for token in tokens.tokens() {
        print_token(token);
        match token.kind {
            TokenKind::Identifier(_) => identifiers += 1,
            TokenKind::Keyword(_) => keywords += 1,
            _ => {}
        }
    }

    println!("----------------------------------------");
    println!("Statistics:");
    println!("Identifiers: {}", identifiers);
    println!("Keywords: {}", keywords);
    println!("Errors: {}", reporter.error_count());
}

fn print_token(token: &Token) {
    let mut line = format!("Token: {} | Type: {}", token.lexeme, token.class());
    match &token.kind {
        TokenKind::IntegerLiteral(value) => line.push_str(&format!(", Value: {}", value)),
        TokenKind::FloatLiteral(value) => line.push_str(&format!(", Value: {}", value)),
        TokenKind::StringLiteral(value) => line.push_str(&format!(", Value: {}", value)),
        _ => {}
    }
    println!(
        "{} | Line: {}, Column: {}",
        line, token.location.line, token.location.column
    );
}

/// Materialize the sample program used when no input file is given
fn write_test_file(path: &Path) -> Result<()> {
    let source = "\
// This is a test program
int main() {
    int i = 0;
    float x = 10.5;

    // Loop example
    while (i < 10) {
        x = x + 1.5;
        i++;
    }

    return 0;
}
";
    fs::write(path, source)?;
    println!("Test file created: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_frontend::Frontend;

    #[test]
    fn test_generated_program_parses_cleanly() {
        let path = std::env::temp_dir().join("minicc_test_program.c");
        write_test_file(&path).unwrap();

        let mut reporter = DiagnosticReporter::new();
        let ok = Frontend::parse_file(&path, &mut reporter).unwrap();
        fs::remove_file(&path).ok();

        assert!(ok);
        assert_eq!(reporter.error_count(), 0);
    }

    #[test]
    fn test_token_dump_counts() {
        let source = "int main() { int x = 1; }";
        let buffer = SourceBuffer::from_source("test.c", source);
        let mut reporter = DiagnosticReporter::new();
        reporter.init_from_buffer(&buffer);
        let tokens = Lexer::new(&buffer, &mut reporter).tokenize();

        let identifiers = tokens
            .tokens()
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Identifier(_)))
            .count();
        let keywords = tokens
            .tokens()
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Keyword(_)))
            .count();

        assert_eq!(identifiers, 2); // main, x
        assert_eq!(keywords, 2); // int, int
    }
}
