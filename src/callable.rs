//! Callable values: functions declared in source, and natives supplied by
//! the host.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Host implementation behind a [`NativeFunction`]. An `Err` becomes a
/// runtime error at the call site.
pub type NativeFn = dyn Fn(&[Value]) -> std::result::Result<Value, String>;

/// A function value. Cloning shares the underlying function.
#[derive(Clone)]
pub enum Callable {
    Declared(Rc<LoxFunction>),
    Native(Rc<NativeFunction>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Declared(function) => function.arity(),
            Callable::Native(native) => native.arity,
        }
    }

    /// Invoke with already-evaluated arguments. `paren` is the call's closing
    /// parenthesis, where arity and native failures are reported.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        if arguments.len() != self.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    self.arity(),
                    arguments.len()
                ),
            ));
        }

        match self {
            Callable::Declared(function) => function.call(interpreter, arguments),

            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);
                (native.func)(&arguments).map_err(|msg| LoxError::runtime(paren, msg))
            }
        }
    }

    /// Identity comparison: two values are the same callable only if they
    /// share one function object.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Declared(a), Callable::Declared(b)) => Rc::ptr_eq(a, b),
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Declared(function) => write!(f, "<fn {}>", function.name()),
            Callable::Native(_) => write!(f, "<native fn>"),
        }
    }
}

impl fmt::Debug for Callable {
    // A closure's environment may contain the function itself, so only the
    // name is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Declared(function) => write!(f, "Declared({})", function.name()),
            Callable::Native(native) => write!(f, "Native({})", native.name),
        }
    }
}

/// A function declared in source, paired with the scope it was declared in.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Rc<RefCell<Environment>>) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Run the body in a fresh activation scope enclosed by the closure, not
    /// by the caller's scope.
    fn call<W: Write>(&self, interpreter: &mut Interpreter<W>, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let flow = interpreter.execute_block(
            &self.declaration.body,
            Rc::new(RefCell::new(environment)),
        )?;

        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

/// A host function with a fixed arity.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: Box<NativeFn>,
}
