//! Error and warning types produced by the evaluator.

use std::fmt;

use crate::ast::ParseNode;

/// A fatal evaluation error, as enumerated in spec §7.
///
/// These unwind the current `build` and propagate to the top-level
/// evaluator, which releases the process-wide current-environment slot (see
/// [`crate::eval::current`]) and re-raises. They never originate from the
/// external parser itself -- `Parse` exists so a caller driving the parser
/// can fold its own error into the same type the rest of the pipeline uses.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EvalAltError {
    /// The external parser failed; `message` is whatever it reported.
    Parse(String),
    /// No static or dynamic rule is registered for this parse-node kind.
    UnknownNode(String),
    /// A parse node had the wrong number of children for its kind.
    ArityError { kind: String, expected: String, found: usize },
    /// A variable, function, or module name could not be resolved.
    UndefinedName { what: &'static str, name: String },
    /// A variable's evaluation re-entered itself while still `InProgress`.
    RecursiveVariable(String),
    /// A binary/unary operator was applied to incompatible values.
    TypeError { op: String, lhs: String, rhs: Option<String> },
    /// A user `assert()` call failed.
    Assertion(String),
    /// The geometry kernel refused an operation; surfaced unchanged.
    Kernel(String),
    /// The call stack exceeded the configured recursion-depth guard.
    CallStackOverflow(usize),
}

impl fmt::Display for EvalAltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::UnknownNode(kind) => write!(f, "no evaluation rule for node kind {kind:?}"),
            Self::ArityError { kind, expected, found } => write!(
                f,
                "node {kind:?} expected {expected} children, found {found}"
            ),
            Self::UndefinedName { what, name } => write!(f, "undefined {what}: {name:?}"),
            Self::RecursiveVariable(name) => {
                write!(f, "variable {name:?} is involved in a recursive definition")
            }
            Self::TypeError { op, lhs, rhs: Some(rhs) } => {
                write!(f, "cannot apply `{op}` to {lhs} and {rhs}")
            }
            Self::TypeError { op, lhs, rhs: None } => write!(f, "cannot apply `{op}` to {lhs}"),
            Self::Assertion(msg) => write!(f, "assertion failed: {msg}"),
            Self::Kernel(msg) => write!(f, "kernel error: {msg}"),
            Self::CallStackOverflow(depth) => {
                write!(f, "call stack exceeded depth limit of {depth}")
            }
        }
    }
}

impl std::error::Error for EvalAltError {}

impl EvalAltError {
    pub(crate) fn arity(node: &ParseNode, expected: impl Into<String>) -> Self {
        Self::ArityError {
            kind: node.kind.to_string(),
            expected: expected.into(),
            found: node.children.len(),
        }
    }
}

/// Result alias used throughout the evaluator.
pub type EvalResult<T> = Result<T, EvalAltError>;

/// A non-fatal event delivered through [`crate::Interpreter::on_warning`].
///
/// Never aborts evaluation (spec §7: "Warnings never interrupt evaluation").
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Warning {
    /// A name was redeclared within the same scope; the first binding wins.
    DuplicateDeclaration { kind: &'static str, name: String },
    /// A parameter had no argument and no default; bound to `Undef`.
    MissingArgument { callee: String, param: String },
    /// More positional arguments were supplied than parameters exist.
    ExtraArguments { callee: String, extra: usize },
    /// A `#`/`%`/`!` modifier was used; highlighting/transparency/isolation
    /// are no-ops in this interpreter.
    UnsupportedModifier(char),
    /// `linear_extrude` was asked for both `twist != 0` and `scale != 1`;
    /// `scale` was silently ignored.
    TwistAndScaleCombined,
    /// A text parameter this interpreter does not model (e.g. `spacing`,
    /// `language`, `script`) was supplied and ignored.
    UnsupportedTextParameter(&'static str),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDeclaration { kind, name } => {
                write!(f, "duplicate {kind} declaration {name:?}; keeping the first")
            }
            Self::MissingArgument { callee, param } => {
                write!(f, "{callee}: missing argument for parameter {param:?}, using undef")
            }
            Self::ExtraArguments { callee, extra } => {
                write!(f, "{callee}: {extra} extra positional argument(s) dropped")
            }
            Self::UnsupportedModifier(c) => {
                write!(f, "modifier `{c}` is not supported; statement kept as-is")
            }
            Self::TwistAndScaleCombined => {
                write!(f, "linear_extrude: twist and scale cannot combine, ignoring scale")
            }
            Self::UnsupportedTextParameter(name) => {
                write!(f, "text: parameter {name:?} is not supported and was ignored")
            }
        }
    }
}
