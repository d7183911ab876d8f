//! Abstract syntax tree produced by the [`Parser`](crate::parser::Parser).
//!
//! Both node categories are closed enums; every consumer (interpreter, AST
//! printer) matches them exhaustively. Nodes own their tokens so a tree can
//! outlive the token buffer it was parsed from.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// A literal constant that appears directly in the source code.
///
/// The parser copies the value out of the token, so literals carry no token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE-754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,
    False,
    Nil,
}

/// Expression nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(LiteralValue),

    /// Parenthesised sub-expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix operator: `!ready`, `-42`.
    Unary { operator: Token, right: Box<Expr> },

    /// Infix arithmetic, comparison or equality operator.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short-circuiting `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Variable read.
    Variable(Token),

    /// `name = value`
    Assign { name: Token, value: Box<Expr> },

    /// Call expression: `callee(arguments…)`.
    Call {
        callee: Box<Expr>,
        /// The closing `)`; runtime call errors are reported at its line.
        paren: Token,
        arguments: Vec<Expr>,
    },
}

/// A function declaration.
///
/// Held behind an `Rc` in [`Stmt::Function`] so that every closure created
/// from it shares the body instead of cloning the subtree, and so the body
/// stays alive after the program that declared it has been dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// Statement nodes. A program is a `Vec<Stmt>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    /// Expression evaluated for its side effects.
    Expression(Expr),

    Print(Expr),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop; `for` loops are desugared into this.
    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword, for error locations.
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },
}
