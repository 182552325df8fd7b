//! The static lowering pass (spec §3, §4.1): parse tree -> `StaticScope` tree.

mod lower;
mod scope;

pub use lower::{lower_program, IncludeResolver};
pub use scope::{ChildBlock, StaticScope, WorkItem};
