//! Built-in function/module registrations (spec §5 "Built-in registry",
//! §6's function/module surfaces). One file per related group of builtins,
//! each exporting a `register` that populates a [`crate::module::BuiltinRegistry`]
//! by hand rather than through code generation (this crate's builtin
//! surface is fixed, see `crate::module`'s module doc).

pub mod geometry;
pub mod lang_core;
pub mod math;

use crate::kernel::Kernel;
use crate::module::BuiltinRegistry;

/// Populate a fresh registry with every builtin this crate ships (spec §6).
/// `children`/`for`/`intersection_for`/`echo` and `str`/`min`/`max` are not
/// registered here -- their argument shapes don't fit the fixed
/// declared-parameter-name calling convention every other builtin uses, so
/// they're dispatched directly in `eval::stmt::eval_mod_call` and
/// `eval::expr::call_named` respectively.
pub fn register_all<K: Kernel>(registry: &mut BuiltinRegistry<K>) {
    math::register(registry);
    lang_core::register(registry);
    geometry::register(registry);
}
