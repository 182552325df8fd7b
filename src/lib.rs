//! Two-phase interpreter for a solid-description modeling language (SDL),
//! lowering a parse tree into a constructive-solid-geometry (CSG) tree.
//!
//! A [`Kernel`] implementation supplies the geometry primitives and boolean
//! operators; this crate owns everything upstream of that boundary: static
//! lowering (parse tree → [`static_env::StaticScope`]), dynamic evaluation
//! (lazy variable binding, `$`-scoping, module calls and `children()`), the
//! built-in function/module registry, and the [`Interpreter`] entry point
//! that ties them together.

pub mod ast;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod eval;
pub mod func;
mod interpreter;
pub mod kernel;
pub mod module;
pub mod packages;
pub mod static_env;
pub mod trace;
pub mod value;

pub use ast::{FunctionDef, ModifierFlags, ModuleDef, NodeKind, ParseNode, Params};
pub use config::Options;
pub use dynamic::DynamicScope;
pub use error::{EvalAltError, EvalResult, Warning};
pub use interpreter::{Interpreter, NamedResults};
pub use kernel::{Kernel, LinearExtrudeSpec, RotateSpec, Vec3};
pub use module::BuiltinRegistry;
pub use static_env::{lower_program, IncludeResolver, StaticScope, WorkItem};
pub use trace::TraceEvent;
pub use value::{Range, ShapeHandle, Value};
