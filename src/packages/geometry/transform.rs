//! `translate`/`rotate`/`scale`/`mirror`/`color` (spec §6). Each applies its
//! operation to the union of its child block -- a transform wrapping
//! several sibling children transforms their composite, matching the
//! reference language's "multiple children act as an implicit union"
//! convention also used by the three boolean ops.

use std::rc::Rc;

use super::trace_op;
use crate::error::EvalAltError;
use crate::eval::stmt::child_union;
use crate::func::native::{BuiltinSignature, NativeCallContext};
use crate::kernel::{Kernel, RotateSpec};
use crate::module::BuiltinRegistry;
use crate::value::{ShapeHandle, Value};

fn children_shape<K: Kernel>(
    call: &mut NativeCallContext<'_, '_, '_, K>,
) -> crate::error::EvalResult<Option<ShapeHandle<K::Shape>>> {
    let Some(scope) = call.scope else { return Ok(None) };
    let scope = Rc::clone(scope);
    match child_union(&mut call.ctx, &scope)? {
        Some(Value::Shape(h)) => Ok(Some(h)),
        _ => Ok(None),
    }
}

pub fn register<K: Kernel>(registry: &mut BuiltinRegistry<K>) {
    registry.register_mod(
        "translate",
        BuiltinSignature::new(&["v"]),
        Rc::new(|call| {
            let v = call.vec3_arg("v", [0.0, 0.0, 0.0])?;
            let Some(shape) = children_shape(call)? else { return Ok(None) };
            let s = call.ctx.interp.kernel.translate(&shape.0, v);
            let out = ShapeHandle::new(s);
            trace_op(call, "translate", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );

    registry.register_mod(
        "scale",
        BuiltinSignature::new(&["v"]),
        Rc::new(|call| {
            let v = call.vec3_arg("v", [1.0, 1.0, 1.0])?;
            let Some(shape) = children_shape(call)? else { return Ok(None) };
            let s = call.ctx.interp.kernel.scale(&shape.0, v);
            let out = ShapeHandle::new(s);
            trace_op(call, "scale", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );

    registry.register_mod(
        "mirror",
        BuiltinSignature::new(&["v"]),
        Rc::new(|call| {
            let v = call.vec3_arg("v", [1.0, 0.0, 0.0])?;
            let Some(shape) = children_shape(call)? else { return Ok(None) };
            let s = call.ctx.interp.kernel.mirror(&shape.0, v);
            let out = ShapeHandle::new(s);
            trace_op(call, "mirror", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );

    registry.register_mod(
        "rotate",
        BuiltinSignature::new(&["a", "v"]),
        Rc::new(|call| {
            let spec = match (call.get("a"), call.get("v")) {
                (Some(Value::Vector(items)), None) | (Some(Value::Vector(items)), Some(Value::Undef)) => {
                    let mut euler = [0.0; 3];
                    for (i, slot) in euler.iter_mut().enumerate() {
                        if let Some(v) = items.get(i) {
                            *slot = v.as_f64().unwrap_or(0.0);
                        }
                    }
                    RotateSpec::Euler(euler)
                }
                (a, Some(v)) if !matches!(v, Value::Undef) => {
                    let degrees = a.and_then(Value::as_f64).unwrap_or(0.0);
                    let axis = call.vec3_arg("v", [0.0, 0.0, 1.0])?;
                    RotateSpec::AxisAngle { axis, degrees }
                }
                (a, _) => RotateSpec::ScalarZ(a.and_then(Value::as_f64).unwrap_or(0.0)),
            };
            let Some(shape) = children_shape(call)? else { return Ok(None) };
            let s = call.ctx.interp.kernel.rotate(&shape.0, spec);
            let out = ShapeHandle::new(s);
            trace_op(call, "rotate", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );

    registry.register_mod(
        "color",
        BuiltinSignature::new(&["c", "alpha"]),
        Rc::new(|call| {
            let rgba = match call.get("c") {
                Some(Value::Vector(items)) => {
                    let mut out = [1.0, 1.0, 1.0, 1.0];
                    for (i, slot) in out.iter_mut().enumerate() {
                        if let Some(v) = items.get(i) {
                            *slot = v.as_f64().ok_or_else(|| EvalAltError::TypeError {
                                op: "color".to_string(),
                                lhs: v.type_name().to_string(),
                                rhs: None,
                            })?;
                        }
                    }
                    out
                }
                _ => [1.0, 1.0, 1.0, 1.0],
            };
            let alpha = call.f64_arg("alpha", rgba[3])?;
            let rgba = [rgba[0], rgba[1], rgba[2], alpha];
            let Some(shape) = children_shape(call)? else { return Ok(None) };
            let s = call.ctx.interp.kernel.color(&shape.0, rgba);
            let out = ShapeHandle::new(s);
            trace_op(call, "color", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );
}
