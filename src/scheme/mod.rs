// RIVET, a tree-walking interpreter for a small Scheme dialect.

// SPDX-FileCopyrightText: © 2021 Matthew Rothlisberger
// SPDX-License-Identifier: AGPL-3.0-only

// RIVET is licensed under the terms of the GNU Affero General Public
// License version 3. See the top-level LICENSES directory for the
// license text.

// Find full copyright information in the top-level COPYRIGHT file.

// <>

// src/scheme/mod.rs

// Error type, value printer and run loop for the Rivet interpreter.

// <>

//! A small Scheme dialect
//!
//! Source text is tokenized and parsed into cons trees, which are then
//! evaluated one at a time against a single global environment. Every
//! value and frame lives in a `Region` owned by the interpreter and is
//! released in bulk at the end of the run.

use std::fmt;

pub mod core;
pub mod env;
pub mod eval;
pub mod memmgt;
pub mod parser;
pub mod stdenv;
pub mod symtab;
pub mod tokenizer;

use self::core::{list_to_vec, FrameRef, ValRef, Value};
use self::memmgt::Region;

/// Category of a `SchemeErr`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrKind {
    Syntax,
    BindingShape,
    Arity,
    TooManyArgs,
    TooFewArgs,
    Type,
    UnboundSymbol,
    NotCallable,
    InvalidArgument,
    DivisionByZero,
    Application,
}

/// Every failure the interpreter can report
pub enum SchemeErr {
    /// Lexing or parenthesis structure
    Syntax(String),
    /// Malformed binding clause in a let form
    BindingShape(String),
    /// Wrong shape or count for a special form
    Arity(String),
    TooManyArgs { expected: usize, got: usize },
    TooFewArgs { expected: usize, got: usize },
    Type(String),
    /// Name of the missing symbol
    Unbound(String),
    /// Type of the value found in operator position
    NotCallable(&'static str),
    /// Primitive given the wrong count or type of arguments
    InvalidArgument(String),
    DivisionByZero,
    /// Type of a value that cannot be evaluated as an expression
    Application(&'static str),
}

impl SchemeErr {
    pub fn kind(&self) -> ErrKind {
        match self {
            SchemeErr::Syntax(_) => ErrKind::Syntax,
            SchemeErr::BindingShape(_) => ErrKind::BindingShape,
            SchemeErr::Arity(_) => ErrKind::Arity,
            SchemeErr::TooManyArgs { .. } => ErrKind::TooManyArgs,
            SchemeErr::TooFewArgs { .. } => ErrKind::TooFewArgs,
            SchemeErr::Type(_) => ErrKind::Type,
            SchemeErr::Unbound(_) => ErrKind::UnboundSymbol,
            SchemeErr::NotCallable(_) => ErrKind::NotCallable,
            SchemeErr::InvalidArgument(_) => ErrKind::InvalidArgument,
            SchemeErr::DivisionByZero => ErrKind::DivisionByZero,
            SchemeErr::Application(_) => ErrKind::Application,
        }
    }

    fn detail(&self) -> String {
        match self {
            SchemeErr::Syntax(msg)
            | SchemeErr::BindingShape(msg)
            | SchemeErr::Arity(msg)
            | SchemeErr::Type(msg)
            | SchemeErr::InvalidArgument(msg) => msg.clone(),
            SchemeErr::TooManyArgs { expected, got } => {
                format!("too many arguments: expected {}, got {}", expected, got)
            }
            SchemeErr::TooFewArgs { expected, got } => {
                format!("too few arguments: expected {}, got {}", expected, got)
            }
            SchemeErr::Unbound(name) => format!("unbound symbol '{}'", name),
            SchemeErr::NotCallable(ty) => format!("cannot call non-procedure {}", ty),
            SchemeErr::DivisionByZero => "division by zero".to_string(),
            SchemeErr::Application(ty) => format!("cannot evaluate {}", ty),
        }
    }
}

impl fmt::Display for SchemeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ErrKind::Syntax => write!(f, "Syntax error: {}", self.detail()),
            _ => write!(f, "Evaluation error: {}", self.detail()),
        }
    }
}

impl fmt::Debug for SchemeErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind(), self.detail())
    }
}

/// A value paired with the region that holds it, for printing
pub struct SchemeCtx<'a> {
    reg: &'a Region,
    val: ValRef,
}

pub fn context(reg: &Region, val: ValRef) -> SchemeCtx<'_> {
    SchemeCtx { reg, val }
}

impl fmt::Display for SchemeCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.reg;

        match reg.get(self.val) {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Value::Symbol(id) => write!(f, "{}", reg.sym_name(*id)),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::Empty => write!(f, "()"),
            Value::Pair { car, cdr } => {
                write!(f, "(")?;
                write_elt(f, reg, *car)?;

                let mut rest = *cdr;
                loop {
                    match reg.get(rest) {
                        Value::Pair { car, cdr } => {
                            write!(f, " ")?;
                            write_elt(f, reg, *car)?;
                            rest = *cdr;
                        }
                        Value::Empty => break,
                        _ => {
                            write!(f, " . ")?;
                            write_elt(f, reg, rest)?;
                            break;
                        }
                    }
                }

                write!(f, ")")
            }
            Value::Closure { .. } | Value::Primitive { .. } => write!(f, "#<procedure>"),
            Value::Void => Ok(()),
        }
    }
}

/// Writes a value held inside a list, where Void must stay visible
fn write_elt(f: &mut fmt::Formatter<'_>, reg: &Region, val: ValRef) -> fmt::Result {
    match reg.get(val) {
        Value::Void => write!(f, "#<void>"),
        _ => write!(f, "{}", context(reg, val)),
    }
}

/// Shortest text that reads back as the same float, always with a point
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        write!(f, "+nan.0")
    } else if x.is_infinite() {
        write!(f, "{}inf.0", if x > 0.0 { "+" } else { "-" })
    } else {
        let text = x.to_string();
        if text.contains('.') {
            write!(f, "{}", text)
        } else {
            write!(f, "{}.0", text)
        }
    }
}

/// An interpreter session: one region and the global frame within it
pub struct Interpreter {
    region: Region,
    global: FrameRef,
}

impl Interpreter {
    /// Sets up a fresh region with every primitive bound globally
    pub fn new() -> Self {
        let mut region = Region::new();
        let global = env::env_create(&mut region);
        stdenv::install(&mut region, global);

        Self { region, global }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Reads a whole program, returning its top level expressions
    pub fn load(&mut self, code: &str) -> Result<Vec<ValRef>, SchemeErr> {
        let exprs = parser::read(&mut self.region, code)?;
        list_to_vec(&self.region, exprs)
    }

    /// Evaluates one top level expression against the global frame,
    /// returning its printed form unless it produced nothing
    pub fn eval_top(&mut self, expr: ValRef) -> Result<Option<String>, SchemeErr> {
        let result = eval::eval(&mut self.region, self.global, expr)?;

        match self.region.get(result) {
            Value::Void => Ok(None),
            _ => Ok(Some(context(&self.region, result).to_string())),
        }
    }

    /// Runs a whole program, handing each printed result to `emit` as
    /// soon as it is produced
    ///
    /// Nothing is evaluated if the program does not parse. Evaluation
    /// stops at the first error.
    pub fn run_source<F>(&mut self, code: &str, mut emit: F) -> Result<(), SchemeErr>
    where
        F: FnMut(&str),
    {
        let exprs = self.load(code)?;
        log::debug!("evaluating {} top level expressions", exprs.len());

        for expr in exprs {
            if let Some(out) = self.eval_top(expr)? {
                emit(&out);
            }
        }

        Ok(())
    }

    /// Releases everything and terminates the process
    pub fn exit_with(&mut self, status: i32) -> ! {
        self.region.exit_with(status)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a program in a fresh interpreter, collecting the printed form of
/// each top level result
pub fn interpret(code: &str) -> Result<Vec<String>, SchemeErr> {
    let mut out = Vec::new();
    Interpreter::new().run_source(code, |line| out.push(line.to_owned()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(code: &str) -> String {
        interpret(code).unwrap().pop().unwrap_or_default()
    }

    fn kind_of(code: &str) -> ErrKind {
        interpret(code).unwrap_err().kind()
    }

    #[test]
    fn addition_yields_float() {
        assert_eq!(last("(+ 1 2)"), "3.0");
        assert_eq!(last("(+)"), "0.0");
        assert_eq!(last("(+ 0.1 0.2)"), "0.30000000000000004");
    }

    #[test]
    fn let_scoping() {
        assert_eq!(last("(let ((x 1) (y 2)) (+ x y))"), "3.0");
        assert_eq!(last("(let* ((x 1) (y (+ x 1))) y)"), "2.0");
        assert_eq!(kind_of("(let ((x 1) (y (+ x 1))) y)"), ErrKind::UnboundSymbol);
    }

    #[test]
    fn closures() {
        assert_eq!(last("((lambda (x) (+ x 1)) 5)"), "6.0");
        assert_eq!(last("(define f (lambda (x) x)) (f 10)"), "10");
        assert_eq!(kind_of("((lambda (a b) a) 1)"), ErrKind::TooFewArgs);
        assert_eq!(kind_of("((lambda (a) a) 1 2)"), ErrKind::TooManyArgs);
        assert_eq!(kind_of("(5 1)"), ErrKind::NotCallable);
    }

    #[test]
    fn list_operations() {
        assert_eq!(kind_of("(car '())"), ErrKind::Type);
        assert_eq!(kind_of("(cdr '())"), ErrKind::Type);
        assert_eq!(last("(null? \"\")"), "#f");
        assert_eq!(last("(null? '())"), "#t");
        assert_eq!(last("(cons 1 (cons 2 '()))"), "(1 2)");
        assert_eq!(last("(cons 1 2)"), "(1 . 2)");
        assert_eq!(last("(cons 1 (cons 2 3))"), "(1 2 . 3)");
        assert_eq!(last("(car (cdr '(a b c)))"), "b");
    }

    #[test]
    fn prints_each_result() {
        let out = interpret("1 (define x 2) x \"s\" #t car (lambda () 1) 'sym").unwrap();
        assert_eq!(out, vec!["1", "2", "\"s\"", "#t", "#<procedure>", "#<procedure>", "sym"]);
    }

    #[test]
    fn float_printing() {
        assert_eq!(last("2.5"), "2.5");
        assert_eq!(last("(* 1 4)"), "4.0");
        assert_eq!(last("(- 0.5)"), "0.5");
        assert_eq!(last("(/ 1.0 3)"), "0.3333333333333333");
        assert_eq!(last("-0.0"), "-0.0");
    }

    #[test]
    fn non_finite_floats() {
        let mut reg = Region::new();

        let inf = self::core::float_init(&mut reg, f64::INFINITY);
        let ninf = self::core::float_init(&mut reg, f64::NEG_INFINITY);
        let nan = self::core::float_init(&mut reg, f64::NAN);

        assert_eq!(context(&reg, inf).to_string(), "+inf.0");
        assert_eq!(context(&reg, ninf).to_string(), "-inf.0");
        assert_eq!(context(&reg, nan).to_string(), "+nan.0");
    }

    #[test]
    fn nested_void_is_visible() {
        assert_eq!(interpret("(cons (define x 1) '())").unwrap(), vec!["(#<void>)"]);
        assert_eq!(interpret("(cons 1 (define y 2))").unwrap(), vec!["(1 . #<void>)"]);
        // top level void still prints nothing
        assert!(interpret("(define z 3)").unwrap().is_empty());
    }

    #[test]
    fn string_escapes() {
        assert_eq!(last(r#""a\"b\\c\nd""#), r#""a\"b\\c\nd""#);
    }

    #[test]
    fn definitions_persist() {
        let src = "
            (define square (lambda (n) (* n n)))
            (define sum-sq (lambda (a b) (+ (square a) (square b))))
            (sum-sq 3 4)";
        assert_eq!(interpret(src).unwrap(), vec!["25.0"]);
    }

    #[test]
    fn recursion() {
        let src = "
            (define fib (lambda (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2))))))
            (fib 10)";
        assert_eq!(last(src), "55.0");
    }

    #[test]
    fn syntax_errors_stop_everything() {
        let mut printed = Vec::new();
        let res = Interpreter::new().run_source("(+ 1 2) (car", |l| printed.push(l.to_owned()));

        assert_eq!(res.unwrap_err().kind(), ErrKind::Syntax);
        assert!(printed.is_empty());
    }

    #[test]
    fn evaluation_stops_at_first_error() {
        let mut printed = Vec::new();
        let res = Interpreter::new().run_source("1 (car 5) 2", |l| printed.push(l.to_owned()));

        assert_eq!(res.unwrap_err().kind(), ErrKind::Type);
        assert_eq!(printed, vec!["1"]);
    }

    #[test]
    fn diagnostics() {
        let err = interpret("(").unwrap_err();
        assert!(err.to_string().starts_with("Syntax error: "));

        let err = interpret("nope").unwrap_err();
        assert_eq!(err.to_string(), "Evaluation error: unbound symbol 'nope'");

        let err = interpret("(/ 1 0)").unwrap_err();
        assert_eq!(err.kind(), ErrKind::DivisionByZero);
        assert_eq!(err.to_string(), "Evaluation error: division by zero");

        let err = interpret("(if 1 2 3)").unwrap_err();
        assert_eq!(err.to_string(), "Evaluation error: if test not boolean");
    }

    #[test]
    fn sessions_are_independent() {
        let mut first = Interpreter::new();
        first.run_source("(define x 1)", |_| ()).unwrap();

        assert_eq!(kind_of("x"), ErrKind::UnboundSymbol);

        let mut out = Vec::new();
        first.run_source("x", |l| out.push(l.to_owned())).unwrap();
        assert_eq!(out, vec!["1"]);
    }

    #[test]
    fn empty_program() {
        assert!(interpret("").unwrap().is_empty());
        assert!(interpret("; only a comment\n").unwrap().is_empty());
    }
}
