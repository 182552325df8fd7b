//! Builtin function/module signatures and the call context handed to them,
//! narrowed to this crate's two callee shapes (function vs. module) rather
//! than one unified function-pointer surface.

use std::rc::Rc;

use crate::ast::Params;
use crate::config::FxHashMap;
use crate::dynamic::DynamicScope;
use crate::error::{EvalAltError, EvalResult};
use crate::eval::context::EvalContext;
use crate::kernel::Kernel;
use crate::value::Value;

/// A pure value -> value builtin (`sin`, `len`, `str`, ...).
pub type NativeFunc<K> = Rc<
    dyn Fn(&mut NativeCallContext<'_, '_, '_, K>) -> EvalResult<Value<<K as Kernel>::Shape>>,
>;

/// A geometry/control builtin (`cube`, `translate`, `for`, ...). Returns
/// `None` when it produced no geometry (an empty `union`, a `for` over an
/// empty range).
pub type NativeModule<K> = Rc<
    dyn Fn(
        &mut NativeCallContext<'_, '_, '_, K>,
    ) -> EvalResult<Option<Value<<K as Kernel>::Shape>>>,
>;

/// One registered builtin's declared signature, used by the same
/// argument-binding algorithm (spec §4.4) that binds user function/module
/// calls.
#[derive(Clone)]
pub struct BuiltinSignature {
    pub params: Rc<Params>,
}

impl BuiltinSignature {
    pub fn new(positional: &[&str]) -> Self {
        Self {
            params: Rc::new(Params {
                positional: positional.iter().map(|s| s.to_string()).collect(),
                defaults: FxHashMap::default(),
            }),
        }
    }
}

/// What a builtin sees when called: the bound arguments (by declared
/// parameter name), the evaluator/global state, and -- for modules -- the
/// calling dynamic scope, so `children()` can be answered.
pub struct NativeCallContext<'a, 'e, 'g, K: Kernel> {
    pub ctx: EvalContext<'e, 'g, K>,
    pub args: &'a FxHashMap<String, Value<K::Shape>>,
    pub scope: Option<&'a Rc<DynamicScope<K::Shape>>>,
}

impl<'a, 'e, 'g, K: Kernel> NativeCallContext<'a, 'e, 'g, K> {
    pub fn get(&self, name: &str) -> Option<&Value<K::Shape>> {
        self.args.get(name)
    }

    pub fn f64_arg(&self, name: &str, default: f64) -> EvalResult<f64> {
        match self.args.get(name) {
            None | Some(Value::Undef) => Ok(default),
            Some(v) => v.as_f64().ok_or_else(|| EvalAltError::TypeError {
                op: name.to_string(),
                lhs: v.type_name().to_string(),
                rhs: None,
            }),
        }
    }

    pub fn bool_arg(&self, name: &str, default: bool) -> bool {
        match self.args.get(name) {
            None | Some(Value::Undef) => default,
            Some(v) => v.is_truthy(),
        }
    }

    pub fn str_arg(&self, name: &str) -> Option<Rc<str>> {
        match self.args.get(name) {
            Some(Value::Str(s)) => Some(Rc::clone(s)),
            _ => None,
        }
    }

    /// A `[x, y, z]` (or shorter, zero-padded) vector argument.
    pub fn vec3_arg(&self, name: &str, default: [f64; 3]) -> EvalResult<[f64; 3]> {
        match self.args.get(name) {
            None | Some(Value::Undef) => Ok(default),
            Some(Value::Vector(items)) => {
                let mut out = default;
                for (i, slot) in out.iter_mut().enumerate() {
                    if let Some(v) = items.get(i) {
                        *slot = v.as_f64().ok_or_else(|| EvalAltError::TypeError {
                            op: name.to_string(),
                            lhs: v.type_name().to_string(),
                            rhs: None,
                        })?;
                    }
                }
                Ok(out)
            }
            Some(v) => {
                let n = v.as_f64().ok_or_else(|| EvalAltError::TypeError {
                    op: name.to_string(),
                    lhs: v.type_name().to_string(),
                    rhs: None,
                })?;
                Ok([n, n, n])
            }
        }
    }
}
