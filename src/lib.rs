//! Tree-walking interpreter for Lox, a small dynamically-typed scripting
//! language.
//!
//! The pipeline is [`scanner`] → [`parser`] → [`interpreter`]. [`Lox`] ties
//! the stages together for one source text at a time and keeps global state
//! between runs, which is what a REPL needs.
//!
//! ```rust
//! use loxwalk::{Lox, RunStatus};
//!
//! let mut lox = Lox::with_output(Vec::new());
//! let mut diagnostics: Vec<String> = Vec::new();
//!
//! let status = lox.run("print 1 + 2 * 3;", &mut diagnostics);
//!
//! assert_eq!(status, RunStatus::Success);
//! assert_eq!(lox.output(), b"7\n");
//! ```

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod natives;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::{self, Write};

use log::info;

use crate::error::Reporter;
use crate::interpreter::Interpreter;
use crate::natives::Clock;
use crate::parser::Parser;
use crate::value::Value;

/// Outcome of one run, replacing process-wide error flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,

    /// Lexical or syntax errors; nothing was evaluated.
    StaticError,

    /// A runtime error aborted evaluation.
    RuntimeError,
}

/// Scan, parse and run source texts against one persistent interpreter.
pub struct Lox<W: Write> {
    interpreter: Interpreter<W>,
}

impl Lox<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Lox<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Lox<W> {
    pub fn with_output(out: W) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
        }
    }

    pub fn with_clock(out: W, clock: Clock) -> Self {
        Self {
            interpreter: Interpreter::with_clock(out, clock),
        }
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter<W> {
        &mut self.interpreter
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }

    /// Run a whole program. Every lexical and syntax error is reported; if
    /// there were any, nothing runs. Otherwise the program runs until it
    /// finishes or hits its first runtime error, which is reported too.
    pub fn run(&mut self, source: &str, reporter: &mut dyn Reporter) -> RunStatus {
        let Some(statements) = front_end(source, reporter, |parser| parser.parse()) else {
            return RunStatus::StaticError;
        };

        match self.interpreter.interpret(&statements) {
            Ok(()) => RunStatus::Success,
            Err(e) => {
                info!("Run aborted by runtime error");
                reporter.report(&e);
                RunStatus::RuntimeError
            }
        }
    }

    /// Evaluate a source text holding a single expression and return its
    /// value.
    pub fn evaluate(
        &mut self,
        source: &str,
        reporter: &mut dyn Reporter,
    ) -> std::result::Result<Value, RunStatus> {
        let expr = front_end(source, reporter, |parser| parser.parse_expression())
            .ok_or(RunStatus::StaticError)?;

        self.interpreter.evaluate_expression(&expr).map_err(|e| {
            reporter.report(&e);
            RunStatus::RuntimeError
        })
    }
}

/// Scan and parse with `parse`, reporting every diagnostic. Yields the
/// parse result only if both stages were clean.
fn front_end<T>(
    source: &str,
    reporter: &mut dyn Reporter,
    parse: impl FnOnce(&mut Parser) -> std::result::Result<T, Vec<error::LoxError>>,
) -> Option<T> {
    let (tokens, lex_errors) = scanner::tokenize(source);

    for e in &lex_errors {
        reporter.report(e);
    }

    let parsed = parse(&mut Parser::new(tokens));

    match parsed {
        Ok(tree) if lex_errors.is_empty() => Some(tree),
        Ok(_) => None,
        Err(parse_errors) => {
            for e in &parse_errors {
                reporter.report(e);
            }
            None
        }
    }
}
