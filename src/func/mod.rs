//! Function/module call machinery: argument binding and the builtin calling
//! convention.

pub mod call;
pub mod native;

pub use call::{bind_args, CallArgs};
pub use native::{BuiltinSignature, NativeCallContext, NativeFunc, NativeModule};
