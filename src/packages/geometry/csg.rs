//! `union`/`difference`/`intersection` (spec §6, §4.3 "child accessor" for
//! how a module reaches its own child block).

use std::rc::Rc;

use super::{combine_intersection, combine_union, trace_op};
use crate::error::{EvalAltError, EvalResult};
use crate::eval::stmt::eval_child;
use crate::func::native::{BuiltinSignature, NativeCallContext};
use crate::kernel::Kernel;
use crate::module::BuiltinRegistry;
use crate::value::{ShapeHandle, Value};

fn call_scope<K: Kernel>(
    call: &NativeCallContext<'_, '_, '_, K>,
    name: &str,
) -> EvalResult<Rc<crate::dynamic::DynamicScope<K::Shape>>> {
    call.scope
        .cloned()
        .ok_or_else(|| EvalAltError::UndefinedName { what: "module", name: name.to_string() })
}

pub fn register<K: Kernel>(registry: &mut BuiltinRegistry<K>) {
    registry.register_mod(
        "union",
        BuiltinSignature::new(&[]),
        Rc::new(|call| {
            let scope = call_scope(call, "union")?;
            crate::eval::stmt::child_union(&mut call.ctx, &scope)
        }),
    );

    registry.register_mod(
        "difference",
        BuiltinSignature::new(&[]),
        Rc::new(|call| {
            let scope = call_scope(call, "difference")?;
            let n = scope.children_len();
            if n == 0 {
                return Ok(None);
            }
            let first = eval_child(&mut call.ctx, &scope, 0)?;
            let mut rest = None;
            for i in 1..n {
                let v = eval_child(&mut call.ctx, &scope, i)?;
                rest = combine_union(call, rest, v)?;
            }
            match (first, rest) {
                (Some(Value::Shape(a)), Some(Value::Shape(b))) => {
                    let s = call.ctx.interp.kernel.difference(&a.0, &b.0);
                    let handle = ShapeHandle::new(s);
                    trace_op(call, "difference", &[&a, &b], &handle)?;
                    Ok(Some(Value::Shape(handle)))
                }
                (Some(a), _) => Ok(Some(a)),
                (None, _) => Ok(None),
            }
        }),
    );

    registry.register_mod(
        "intersection",
        BuiltinSignature::new(&[]),
        Rc::new(|call| {
            let scope = call_scope(call, "intersection")?;
            let n = scope.children_len();
            if n == 0 {
                return Ok(None);
            }
            let mut acc = eval_child(&mut call.ctx, &scope, 0)?;
            for i in 1..n {
                let v = eval_child(&mut call.ctx, &scope, i)?;
                acc = combine_intersection(call, acc, v)?;
            }
            Ok(acc)
        }),
    );
}
