//! Centralised error hierarchy for the interpreter.
//!
//! The scanner, parser and interpreter convert their failure modes into one of
//! the [`LoxError`] variants defined here, so the whole crate shares a single
//! `Result<T>` alias. The `Display` form of each variant is the exact
//! diagnostic line a user sees.
//!
//! The module does not print anything itself: diagnostics are handed to a
//! [`Reporter`] supplied by the embedder.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical error: unexpected character or unterminated string.
    #[error("[line {line}] Error: {message}")]
    Lex { message: String, line: usize },

    /// Syntax error. `location` is `" at end"` or `" at '<lexeme>'"`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error; aborts the running program.
    #[error("{message}\n[line {line}]")]
    Runtime { message: String, line: usize },

    /// Failure writing program output.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Source text that is not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl LoxError {
    /// Helper constructor for the scanner.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the parser; derives the location context from
    /// the offending token.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        let location = if token.token_type == TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        debug!(
            "Parse error: line={}, location={}, msg={}",
            token.line, location, message
        );

        LoxError::Parse {
            message,
            location,
            line: token.line,
        }
    }

    /// Helper constructor for the interpreter.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// `true` for lexical and syntax errors, which prevent evaluation.
    pub fn is_static(&self) -> bool {
        matches!(self, LoxError::Lex { .. } | LoxError::Parse { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

/// Diagnostic sink supplied by the embedder.
///
/// Receives every lexical and syntax error of a run, and at most one runtime
/// error, in the order they were found.
pub trait Reporter {
    fn report(&mut self, error: &LoxError);
}

/// Collects rendered diagnostics; handy for tests and for embedders that
/// display errors after the run.
impl Reporter for Vec<String> {
    fn report(&mut self, error: &LoxError) {
        self.push(error.to_string());
    }
}
