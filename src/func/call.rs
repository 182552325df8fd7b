//! Argument binding (spec §4.4).

use std::rc::Rc;

use crate::ast::Params;
use crate::config::FxHashMap;
use crate::dynamic::DynamicScope;
use crate::error::Warning;
use crate::eval::context::EvalContext;
use crate::eval::expr::read_dollar_var;
use crate::kernel::Kernel;
use crate::value::Value;

/// Already-evaluated call arguments (positional, then keyword) -- evaluated
/// in the *caller's* dynamic scope before this function ever sees them
/// (spec §4.4: "arguments ... evaluated in the caller's dynamic scope before
/// binding").
pub struct CallArgs<S> {
    pub positional: Vec<Value<S>>,
    pub keyword: Vec<(String, Value<S>)>,
}

/// Bind one call's arguments against a callee's declared `(positional,
/// defaults)`.
///
/// Returns only the bindings this call resolved explicitly or via `$`
/// fallback/warn-to-undef; a parameter with an unconsumed default is left
/// absent so the callee's `DynamicScope::defining_expr` falls through to it
/// lazily, still unevaluated, exactly as step 1 of the algorithm specifies.
pub fn bind_args<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    params: &Params,
    args: CallArgs<K::Shape>,
    caller: &Rc<DynamicScope<K::Shape>>,
    callee_name: &str,
) -> FxHashMap<String, Value<K::Shape>> {
    let mut bindings: FxHashMap<String, Value<K::Shape>> = FxHashMap::default();

    // Step 2: keyword arguments.
    for (name, value) in args.keyword {
        bindings.insert(name, value);
    }

    // Step 3: positional arguments fill declaration-order slots not already
    // taken by a keyword argument.
    let mut next = 0;
    for pname in &params.positional {
        if bindings.contains_key(pname) {
            continue;
        }
        if next < args.positional.len() {
            bindings.insert(pname.clone(), args.positional[next].clone());
            next += 1;
        }
    }
    if next < args.positional.len() {
        ctx.global.warn(Warning::ExtraArguments {
            callee: callee_name.to_string(),
            extra: args.positional.len() - next,
        });
    }

    // Step 4: unbound `$`-prefixed parameters fall back to the caller's
    // dynamic `$`-chain.
    for pname in &params.positional {
        if bindings.contains_key(pname) || !pname.starts_with('$') {
            continue;
        }
        if let Ok(v) = read_dollar_var(ctx, caller, pname) {
            bindings.insert(pname.clone(), v);
        }
    }

    // Step 5: anything still unbound with no default warns and becomes
    // `Undef`; anything with a default is left absent for lazy lookup.
    for pname in &params.positional {
        if bindings.contains_key(pname) || params.defaults.contains_key(pname) {
            continue;
        }
        ctx.global.warn(Warning::MissingArgument {
            callee: callee_name.to_string(),
            param: pname.clone(),
        });
        bindings.insert(pname.clone(), Value::Undef);
    }

    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ParseNode;
    use crate::interpreter::Interpreter;
    use crate::kernel::{Kernel, LinearExtrudeSpec, RotateSpec, Vec3};
    use crate::static_env::StaticScope;

    #[derive(Clone)]
    struct UnitShape;

    struct NoopKernel;

    impl Kernel for NoopKernel {
        type Shape = UnitShape;
        fn cube(&self, _: Vec3, _: bool) -> Self::Shape { UnitShape }
        fn sphere(&self, _: f64, _: u32) -> Self::Shape { UnitShape }
        fn cylinder(&self, _: f64, _: f64, _: f64, _: bool, _: u32) -> Self::Shape { UnitShape }
        fn square(&self, _: [f64; 2], _: bool) -> Self::Shape { UnitShape }
        fn circle(&self, _: f64, _: u32) -> Self::Shape { UnitShape }
        fn polygon(&self, _: &[[f64; 2]], _: Option<&[Vec<usize>]>) -> Self::Shape { UnitShape }
        fn polyhedron(&self, _: &[Vec3], _: &[Vec<usize>]) -> Self::Shape { UnitShape }
        fn text(&self, _: &str, _: f64) -> Self::Shape { UnitShape }
        fn import_mesh(&self, path: &str) -> Result<Self::Shape, String> {
            Err(path.to_string())
        }
        fn translate(&self, s: &Self::Shape, _: Vec3) -> Self::Shape { s.clone() }
        fn rotate(&self, s: &Self::Shape, _: RotateSpec) -> Self::Shape { s.clone() }
        fn scale(&self, s: &Self::Shape, _: Vec3) -> Self::Shape { s.clone() }
        fn mirror(&self, s: &Self::Shape, _: Vec3) -> Self::Shape { s.clone() }
        fn color(&self, s: &Self::Shape, _: [f64; 4]) -> Self::Shape { s.clone() }
        fn union(&self, a: &Self::Shape, _: &Self::Shape) -> Self::Shape { a.clone() }
        fn difference(&self, a: &Self::Shape, _: &Self::Shape) -> Self::Shape { a.clone() }
        fn intersection(&self, a: &Self::Shape, _: &Self::Shape) -> Self::Shape { a.clone() }
        fn linear_extrude(&self, s: &Self::Shape, _: LinearExtrudeSpec) -> Self::Shape { s.clone() }
        fn rotate_extrude(&self, s: &Self::Shape, _: f64) -> Self::Shape { s.clone() }
    }

    fn root_scope() -> Rc<StaticScope> {
        StaticScope::new(None)
    }

    fn num_node(n: i64) -> Rc<ParseNode> {
        Rc::new(ParseNode::leaf("pr_Num", n.to_string()))
    }

    fn params(names: &[&str]) -> Params {
        Params { positional: names.iter().map(|s| s.to_string()).collect(), defaults: FxHashMap::default() }
    }

    struct Harness {
        interp: Interpreter<NoopKernel>,
        warnings: Rc<RefCell<Vec<String>>>,
    }

    fn harness() -> Harness {
        Harness { interp: Interpreter::new(NoopKernel), warnings: Rc::new(RefCell::new(Vec::new())) }
    }

    use std::cell::RefCell;

    fn with_ctx<R>(h: &Harness, f: impl FnOnce(&mut EvalContext<'_, '_, NoopKernel>) -> R) -> R {
        let mut global = GlobalState::new(crate::config::Options::default());
        let sink = Rc::clone(&h.warnings);
        global.set_warning_sink(move |w| sink.borrow_mut().push(format!("{w:?}")));
        let mut ctx = EvalContext::new(&h.interp, &mut global);
        f(&mut ctx)
    }

    use crate::eval::global_state::GlobalState;

    #[test]
    fn keyword_argument_wins_over_positional_slot() {
        let h = harness();
        let scope = root_scope();
        let caller = DynamicScope::new(Rc::clone(&scope), None, None, None);
        let bound = with_ctx(&h, |ctx| {
            bind_args::<NoopKernel>(
                ctx,
                &params(&["a", "b"]),
                CallArgs {
                    positional: vec![Value::Int(1)],
                    keyword: vec![("a".to_string(), Value::Int(99))],
                },
                &caller,
                "f",
            )
        });
        // The positional `1` falls through to the next unclaimed slot, `b`,
        // since `a` was already taken by the keyword argument.
        assert!(matches!(bound.get("a"), Some(Value::Int(99))));
        assert!(matches!(bound.get("b"), Some(Value::Int(1))));
    }

    #[test]
    fn extra_positional_arguments_warn_but_do_not_panic() {
        let h = harness();
        let scope = root_scope();
        let caller = DynamicScope::new(Rc::clone(&scope), None, None, None);
        let _ = with_ctx(&h, |ctx| {
            bind_args::<NoopKernel>(
                ctx,
                &params(&["a"]),
                CallArgs { positional: vec![Value::Int(1), Value::Int(2)], keyword: vec![] },
                &caller,
                "f",
            )
        });
        assert!(h.warnings.borrow().iter().any(|w| w.contains("ExtraArguments")));
    }

    #[test]
    fn missing_argument_without_default_warns_and_binds_undef() {
        let h = harness();
        let scope = root_scope();
        let caller = DynamicScope::new(Rc::clone(&scope), None, None, None);
        let bound = with_ctx(&h, |ctx| {
            bind_args::<NoopKernel>(ctx, &params(&["a"]), CallArgs { positional: vec![], keyword: vec![] }, &caller, "f")
        });
        assert!(matches!(bound.get("a"), Some(Value::Undef)));
        assert!(h.warnings.borrow().iter().any(|w| w.contains("MissingArgument")));
    }

    #[test]
    fn missing_argument_with_default_is_left_unbound_for_lazy_lookup() {
        let h = harness();
        let scope = root_scope();
        let caller = DynamicScope::new(Rc::clone(&scope), None, None, None);
        let mut p = params(&["a"]);
        p.defaults.insert("a".to_string(), num_node(7));
        let bound =
            with_ctx(&h, |ctx| bind_args::<NoopKernel>(ctx, &p, CallArgs { positional: vec![], keyword: vec![] }, &caller, "f"));
        assert!(!bound.contains_key("a"));
        assert!(h.warnings.borrow().is_empty());
    }

    #[test]
    fn dollar_param_falls_back_to_callers_dollar_chain() {
        let h = harness();
        let scope = root_scope();
        scope.vars.borrow_mut().insert("$x".to_string(), num_node(42));
        let caller = DynamicScope::new(Rc::clone(&scope), None, None, None);
        let bound = with_ctx(&h, |ctx| {
            bind_args::<NoopKernel>(
                ctx,
                &params(&["$x"]),
                CallArgs { positional: vec![], keyword: vec![] },
                &caller,
                "f",
            )
        });
        assert!(matches!(bound.get("$x"), Some(Value::Int(42))));
    }
}
