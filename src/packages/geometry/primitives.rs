//! `cube`/`sphere`/`cylinder`/`square`/`circle`/`polygon`/`polyhedron`/
//! `text`/`import` (spec §6). None of these consult their child block --
//! each is a leaf primitive.

use std::rc::Rc;

use super::{resolve_fn, resolve_radius, vec2_arg};
use crate::error::{EvalAltError, EvalResult, Warning};
use crate::func::native::{BuiltinSignature, NativeCallContext};
use crate::kernel::Kernel;
use crate::module::BuiltinRegistry;
use crate::value::{ShapeHandle, Value};

fn type_err<S>(op: &str, v: &Value<S>) -> EvalAltError {
    EvalAltError::TypeError { op: op.to_string(), lhs: v.type_name().to_string(), rhs: None }
}

fn points2<K: Kernel>(call: &NativeCallContext<'_, '_, '_, K>, name: &str) -> EvalResult<Vec<[f64; 2]>> {
    match call.get(name) {
        Some(Value::Vector(rows)) => rows
            .iter()
            .map(|row| match row {
                Value::Vector(xy) => {
                    let x = xy.first().and_then(Value::as_f64).ok_or_else(|| type_err(name, row))?;
                    let y = xy.get(1).and_then(Value::as_f64).ok_or_else(|| type_err(name, row))?;
                    Ok([x, y])
                }
                other => Err(type_err(name, other)),
            })
            .collect(),
        Some(Value::Undef) | None => Ok(Vec::new()),
        Some(other) => Err(type_err(name, other)),
    }
}

fn points3<K: Kernel>(call: &NativeCallContext<'_, '_, '_, K>, name: &str) -> EvalResult<Vec<[f64; 3]>> {
    match call.get(name) {
        Some(Value::Vector(rows)) => rows
            .iter()
            .map(|row| match row {
                Value::Vector(xyz) => {
                    let mut out = [0.0; 3];
                    for (i, slot) in out.iter_mut().enumerate() {
                        *slot = xyz.get(i).and_then(Value::as_f64).ok_or_else(|| type_err(name, row))?;
                    }
                    Ok(out)
                }
                other => Err(type_err(name, other)),
            })
            .collect(),
        Some(Value::Undef) | None => Ok(Vec::new()),
        Some(other) => Err(type_err(name, other)),
    }
}

fn index_paths<K: Kernel>(
    call: &NativeCallContext<'_, '_, '_, K>,
    name: &str,
) -> EvalResult<Option<Vec<Vec<usize>>>> {
    match call.get(name) {
        None | Some(Value::Undef) => Ok(None),
        Some(Value::Vector(rows)) => {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows.iter() {
                match row {
                    Value::Vector(idx) => {
                        let mut path = Vec::with_capacity(idx.len());
                        for v in idx.iter() {
                            let n = v.as_f64().ok_or_else(|| type_err(name, v))?;
                            path.push(n as usize);
                        }
                        out.push(path);
                    }
                    other => return Err(type_err(name, other)),
                }
            }
            Ok(Some(out))
        }
        Some(other) => Err(type_err(name, other)),
    }
}

pub fn register<K: Kernel>(registry: &mut BuiltinRegistry<K>) {
    registry.register_mod(
        "cube",
        BuiltinSignature::new(&["size", "center"]),
        Rc::new(|call| {
            let size = call.vec3_arg("size", [1.0, 1.0, 1.0])?;
            let center = call.bool_arg("center", false);
            Ok(Some(Value::Shape(ShapeHandle::new(call.ctx.interp.kernel.cube(size, center)))))
        }),
    );

    registry.register_mod(
        "sphere",
        BuiltinSignature::new(&["r", "d", "$fn"]),
        Rc::new(|call| {
            let r = resolve_radius(call, "r", "d", 1.0)?;
            let fn_ = resolve_fn(call)?;
            Ok(Some(Value::Shape(ShapeHandle::new(call.ctx.interp.kernel.sphere(r, fn_)))))
        }),
    );

    registry.register_mod(
        "cylinder",
        BuiltinSignature::new(&["h", "r", "d", "r1", "r2", "d1", "d2", "center", "$fn"]),
        Rc::new(|call| {
            let h = call.f64_arg("h", 1.0)?;
            let base = resolve_radius(call, "r", "d", 1.0)?;
            let r1 = if call.get("r1").is_some() || call.get("d1").is_some() {
                resolve_radius(call, "r1", "d1", base)?
            } else {
                base
            };
            let r2 = if call.get("r2").is_some() || call.get("d2").is_some() {
                resolve_radius(call, "r2", "d2", base)?
            } else {
                base
            };
            let center = call.bool_arg("center", false);
            let fn_ = resolve_fn(call)?;
            Ok(Some(Value::Shape(ShapeHandle::new(
                call.ctx.interp.kernel.cylinder(h, r1, r2, center, fn_),
            ))))
        }),
    );

    registry.register_mod(
        "square",
        BuiltinSignature::new(&["size", "center"]),
        Rc::new(|call| {
            let size = vec2_arg(call, "size", [1.0, 1.0])?;
            let center = call.bool_arg("center", false);
            Ok(Some(Value::Shape(ShapeHandle::new(call.ctx.interp.kernel.square(size, center)))))
        }),
    );

    registry.register_mod(
        "circle",
        BuiltinSignature::new(&["r", "d", "$fn"]),
        Rc::new(|call| {
            let r = resolve_radius(call, "r", "d", 1.0)?;
            let fn_ = resolve_fn(call)?;
            Ok(Some(Value::Shape(ShapeHandle::new(call.ctx.interp.kernel.circle(r, fn_)))))
        }),
    );

    registry.register_mod(
        "polygon",
        BuiltinSignature::new(&["points", "paths"]),
        Rc::new(|call| {
            let points = points2(call, "points")?;
            let paths = index_paths(call, "paths")?;
            let shape = call.ctx.interp.kernel.polygon(&points, paths.as_deref());
            Ok(Some(Value::Shape(ShapeHandle::new(shape))))
        }),
    );

    registry.register_mod(
        "polyhedron",
        BuiltinSignature::new(&["points", "faces"]),
        Rc::new(|call| {
            let points = points3(call, "points")?;
            let faces = index_paths(call, "faces")?.unwrap_or_default();
            let shape = call.ctx.interp.kernel.polyhedron(&points, &faces);
            Ok(Some(Value::Shape(ShapeHandle::new(shape))))
        }),
    );

    registry.register_mod(
        "text",
        BuiltinSignature::new(&[
            "text", "size", "font", "halign", "valign", "spacing", "direction", "language", "script",
        ]),
        Rc::new(|call| {
            let text = call.str_arg("text").unwrap_or_else(|| Rc::from(""));
            let size = call.f64_arg("size", 10.0)?;
            for (param, unsupported) in [
                ("font", "font"),
                ("halign", "halign"),
                ("valign", "valign"),
                ("spacing", "spacing"),
                ("direction", "direction"),
                ("language", "language"),
                ("script", "script"),
            ] {
                if call.get(param).is_some_and(|v| !matches!(v, Value::Undef)) {
                    call.ctx.global.warn(Warning::UnsupportedTextParameter(unsupported));
                }
            }
            let shape = call.ctx.interp.kernel.text(&text, size);
            Ok(Some(Value::Shape(ShapeHandle::new(shape))))
        }),
    );

    registry.register_mod(
        "import",
        BuiltinSignature::new(&["file"]),
        Rc::new(|call| {
            let path = call.str_arg("file").ok_or_else(|| EvalAltError::TypeError {
                op: "import".to_string(),
                lhs: "undef".to_string(),
                rhs: Some("a file path string".to_string()),
            })?;
            let shape = call.ctx.interp.kernel.import_mesh(&path).map_err(EvalAltError::Kernel)?;
            Ok(Some(Value::Shape(ShapeHandle::new(shape))))
        }),
    );
}
