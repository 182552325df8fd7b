//! Type predicates, `len`, `chr`/`ord`, `assert`, and `version` (spec §6,
//! SPEC_FULL.md §4). `echo(...)` is not registered here -- it is variadic
//! and always called at module-call position, so it is dispatched directly
//! in `eval::stmt::eval_mod_call` alongside `children`/`for`.

use std::rc::Rc;

use crate::error::EvalAltError;
use crate::func::native::{BuiltinSignature, NativeCallContext};
use crate::kernel::Kernel;
use crate::module::BuiltinRegistry;
use crate::value::Value;

fn type_err<S>(op: &str, v: &Value<S>) -> EvalAltError {
    EvalAltError::TypeError { op: op.to_string(), lhs: v.type_name().to_string(), rhs: None }
}

pub fn register<K: Kernel>(registry: &mut BuiltinRegistry<K>) {
    registry.register_fn(
        "len",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| match call.get("x") {
            Some(Value::Str(s)) => Ok(Value::Int(s.chars().count() as i64)),
            Some(Value::Vector(v)) => Ok(Value::Int(v.len() as i64)),
            Some(Value::Undef) | None => Ok(Value::Undef),
            Some(other) => Err(type_err("len", other)),
        }),
    );

    registry.register_fn(
        "chr",
        BuiltinSignature::new(&["code"]),
        Rc::new(|call| {
            let code = call.f64_arg("code", 0.0)? as u32;
            let c = char::from_u32(code).unwrap_or('\u{FFFD}');
            Ok(Value::Str(Rc::from(c.to_string().as_str())))
        }),
    );

    registry.register_fn(
        "ord",
        BuiltinSignature::new(&["s"]),
        Rc::new(|call| match call.get("s") {
            Some(Value::Str(s)) => {
                Ok(s.chars().next().map(|c| Value::Int(c as i64)).unwrap_or(Value::Undef))
            }
            Some(Value::Undef) | None => Ok(Value::Undef),
            Some(other) => Err(type_err("ord", other)),
        }),
    );

    registry.register_fn(
        "is_undef",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| Ok(Value::Bool(matches!(call.get("x"), None | Some(Value::Undef))))),
    );
    registry.register_fn(
        "is_bool",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| Ok(Value::Bool(matches!(call.get("x"), Some(Value::Bool(_)))))),
    );
    registry.register_fn(
        "is_num",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| {
            Ok(Value::Bool(matches!(call.get("x"), Some(Value::Number(_)) | Some(Value::Int(_)))))
        }),
    );
    registry.register_fn(
        "is_string",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| Ok(Value::Bool(matches!(call.get("x"), Some(Value::Str(_)))))),
    );
    registry.register_fn(
        "is_list",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| Ok(Value::Bool(matches!(call.get("x"), Some(Value::Vector(_)))))),
    );
    registry.register_fn(
        "is_function",
        BuiltinSignature::new(&["x"]),
        Rc::new(|call| Ok(Value::Bool(matches!(call.get("x"), Some(Value::FunctionRef(_)))))),
    );

    registry.register_fn(
        "assert",
        BuiltinSignature::new(&["condition", "message"]),
        Rc::new(|call: &mut NativeCallContext<'_, '_, '_, K>| {
            let cond = call.get("condition").map(Value::is_truthy).unwrap_or(false);
            if cond {
                return Ok(Value::Undef);
            }
            let msg = match call.get("message") {
                Some(Value::Str(s)) => s.to_string(),
                Some(Value::Undef) | None => "assertion failed".to_string(),
                Some(other) => other.to_string(),
            };
            Err(EvalAltError::Assertion(msg))
        }),
    );

    registry.register_fn(
        "version",
        BuiltinSignature::new(&[]),
        Rc::new(|_call| Ok(Value::Str(Rc::from(env!("CARGO_PKG_VERSION"))))),
    );
}
