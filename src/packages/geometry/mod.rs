//! Geometry/CSG built-in modules (spec §6 "Built-in module surface").
//!
//! Every module here is registered as a [`crate::func::native::NativeModule`]
//! rather than a plain function: each can carry a child block (`color(...)
//! { ... }`) and several (the three boolean ops, plus `color`/`translate`/
//! etc. when used as a wrapper) combine their children's shapes rather than
//! building one of their own.

pub mod csg;
pub mod extrude;
pub mod primitives;
pub mod transform;

use std::rc::Rc;

use crate::error::{EvalAltError, EvalResult};
use crate::eval::expr::read_dollar_var;
use crate::func::native::NativeCallContext;
use crate::kernel::Kernel;
use crate::module::BuiltinRegistry;
use crate::trace::TraceEvent;
use crate::value::{ShapeHandle, Value};

pub fn register<K: Kernel>(registry: &mut BuiltinRegistry<K>) {
    primitives::register(registry);
    transform::register(registry);
    extrude::register(registry);
    csg::register(registry);
}

fn type_err<S>(op: &str, v: &Value<S>) -> EvalAltError {
    EvalAltError::TypeError { op: op.to_string(), lhs: v.type_name().to_string(), rhs: None }
}

/// `$fn`, consulted directly as a keyword argument first (`sphere(r=5,
/// $fn=30)` binds `$fn` into the call's own argument map since `bind_args`
/// keeps every keyword, declared or not), then the caller's dynamic `$fn`.
fn resolve_fn<K: Kernel>(call: &mut NativeCallContext<'_, '_, '_, K>) -> EvalResult<u32> {
    if let Some(v) = call.get("$fn") {
        if !matches!(v, Value::Undef) {
            let n = v.as_f64().ok_or_else(|| type_err("$fn", v))?;
            return Ok(n.max(0.0) as u32);
        }
    }
    let n = match call.scope {
        Some(scope) => {
            let scope = Rc::clone(scope);
            read_dollar_var(&mut call.ctx, &scope, "$fn")?.as_f64().unwrap_or(0.0)
        }
        None => call.ctx.global.options.default_fn,
    };
    Ok(n.max(0.0) as u32)
}

/// Resolve a radius from an `r`/`d` pair (`d` wins when both are given,
/// matching the reference language), defaulting to `default_r` when
/// neither is supplied.
fn resolve_radius<K: Kernel>(
    call: &NativeCallContext<'_, '_, '_, K>,
    r_name: &str,
    d_name: &str,
    default_r: f64,
) -> EvalResult<f64> {
    match call.get(d_name) {
        Some(v) if !matches!(v, Value::Undef) => {
            return Ok(v.as_f64().ok_or_else(|| type_err(d_name, v))? / 2.0);
        }
        _ => {}
    }
    match call.get(r_name) {
        Some(v) if !matches!(v, Value::Undef) => Ok(v.as_f64().ok_or_else(|| type_err(r_name, v))?),
        _ => Ok(default_r),
    }
}

fn vec2_arg<K: Kernel>(
    call: &NativeCallContext<'_, '_, '_, K>,
    name: &str,
    default: [f64; 2],
) -> EvalResult<[f64; 2]> {
    match call.get(name) {
        None | Some(Value::Undef) => Ok(default),
        Some(Value::Vector(items)) => {
            let mut out = default;
            for (i, slot) in out.iter_mut().enumerate() {
                if let Some(v) = items.get(i) {
                    *slot = v.as_f64().ok_or_else(|| type_err(name, v))?;
                }
            }
            Ok(out)
        }
        Some(v) => {
            let n = v.as_f64().ok_or_else(|| type_err(name, v))?;
            Ok([n, n])
        }
    }
}

/// Emit a [`TraceEvent`] for one kernel operation when the dynamically
/// scoped `$trace` variable is truthy (spec §6). `$trace` is read from the
/// call's own dynamic scope rather than its bound arguments -- it is never a
/// declared parameter of any builtin.
fn trace_op<K: Kernel>(
    call: &mut NativeCallContext<'_, '_, '_, K>,
    op: &str,
    operands: &[&ShapeHandle<K::Shape>],
    result: &ShapeHandle<K::Shape>,
) -> EvalResult<()> {
    let Some(scope) = call.scope else { return Ok(()) };
    let scope = Rc::clone(scope);
    if !read_dollar_var(&mut call.ctx, &scope, "$trace")?.is_truthy() {
        return Ok(());
    }
    let operands = operands.iter().map(|h| call.ctx.global.interner.name_for(&h.0)).collect();
    let result = call.ctx.global.interner.name_for(&result.0);
    call.ctx.global.trace(TraceEvent { result, op: op.to_string(), operands });
    Ok(())
}

/// Union two optional shape values, combining through the kernel when both
/// carry geometry (mirrors `eval::stmt`'s private `union_shapes`, duplicated
/// here since builtins in this module have no access to that crate-private
/// helper).
fn combine_union<K: Kernel>(
    call: &mut NativeCallContext<'_, '_, '_, K>,
    a: Option<Value<K::Shape>>,
    b: Option<Value<K::Shape>>,
) -> EvalResult<Option<Value<K::Shape>>> {
    match (a, b) {
        (None, x) | (x, None) => Ok(x),
        (Some(Value::Shape(x)), Some(Value::Shape(y))) => {
            let s = call.ctx.interp.kernel.union(&x.0, &y.0);
            let handle = ShapeHandle::new(s);
            trace_op(call, "union", &[&x, &y], &handle)?;
            Ok(Some(Value::Shape(handle)))
        }
        (Some(x), _) => Ok(Some(x)),
    }
}

fn combine_intersection<K: Kernel>(
    call: &mut NativeCallContext<'_, '_, '_, K>,
    a: Option<Value<K::Shape>>,
    b: Option<Value<K::Shape>>,
) -> EvalResult<Option<Value<K::Shape>>> {
    match (a, b) {
        (None, _) | (_, None) => Ok(None),
        (Some(Value::Shape(x)), Some(Value::Shape(y))) => {
            let s = call.ctx.interp.kernel.intersection(&x.0, &y.0);
            let handle = ShapeHandle::new(s);
            trace_op(call, "intersection", &[&x, &y], &handle)?;
            Ok(Some(Value::Shape(handle)))
        }
        (Some(x), _) => Ok(Some(x)),
    }
}
