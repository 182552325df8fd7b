//! `linear_extrude`/`rotate_extrude` (spec §6). Both extrude the union of
//! their child block, which must be a 2D sketch -- the kernel trusts the
//! interpreter never to mix 2D/3D (spec's non-goal: "no 2D/3D type
//! checking beyond what's needed to dispatch the right kernel call").

use std::rc::Rc;

use super::trace_op;
use crate::error::Warning;
use crate::eval::stmt::child_union;
use crate::func::native::{BuiltinSignature, NativeCallContext};
use crate::kernel::{Kernel, LinearExtrudeSpec};
use crate::module::BuiltinRegistry;
use crate::value::{ShapeHandle, Value};

fn sketch<K: Kernel>(
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
        "linear_extrude",
        BuiltinSignature::new(&["height", "center", "twist", "slices", "scale"]),
        Rc::new(|call| {
            let height = call.f64_arg("height", 1.0)?;
            let center = call.bool_arg("center", false);
            let twist = call.f64_arg("twist", 0.0)?;
            let mut scale = call.f64_arg("scale", 1.0)?;
            if twist != 0.0 && scale != 1.0 {
                call.ctx.global.warn(Warning::TwistAndScaleCombined);
                scale = 1.0;
            }
            let default_slices = if twist != 0.0 { (twist.abs() / 22.5).ceil().max(1.0) } else { 1.0 };
            let slices = call.f64_arg("slices", default_slices)?.max(1.0) as u32;
            let Some(shape) = sketch(call)? else { return Ok(None) };
            let spec = LinearExtrudeSpec { height, center, twist, slices, scale };
            let s = call.ctx.interp.kernel.linear_extrude(&shape.0, spec);
            let out = ShapeHandle::new(s);
            trace_op(call, "linear_extrude", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );

    registry.register_mod(
        "rotate_extrude",
        BuiltinSignature::new(&["angle"]),
        Rc::new(|call| {
            let angle = call.f64_arg("angle", 360.0)?;
            let Some(shape) = sketch(call)? else { return Ok(None) };
            let s = call.ctx.interp.kernel.rotate_extrude(&shape.0, angle);
            let out = ShapeHandle::new(s);
            trace_op(call, "rotate_extrude", &[&shape], &out)?;
            Ok(Some(Value::Shape(out)))
        }),
    );
}
