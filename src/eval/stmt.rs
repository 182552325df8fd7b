//! Dynamic evaluation of work items: `build`, module-call dispatch,
//! `children()`, `for`/`intersection_for`, conditionals (spec §4.3).

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::ast::NodeKind;
use crate::ast::ParseNode;
use crate::dynamic::DynamicScope;
use crate::error::{EvalAltError, EvalResult};
use crate::eval::context::EvalContext;
use crate::eval::expr::{eval_arguments_node, eval_expr};
use crate::func::bind_args;
use crate::kernel::Kernel;
use crate::static_env::{ChildBlock, StaticScope, WorkItem};
use crate::value::Value;

type V<K> = Value<<K as Kernel>::Shape>;

fn arity_err(node: &ParseNode) -> EvalAltError {
    EvalAltError::arity(node, "a shape matching this crate's parse-tree contract")
}

fn child<'a>(node: &'a ParseNode, i: usize) -> EvalResult<&'a ParseNode> {
    node.child(i).ok_or_else(|| arity_err(node))
}

/// The outcome of building one scope: the union of its renderable work
/// items, plus any top-level `name = <module_instantiation>;` results
/// encountered anywhere underneath it (SPEC_FULL.md §4).
pub struct BuildResult<S> {
    pub union: Option<Value<S>>,
    pub named: BTreeMap<String, Value<S>>,
}

/// The canonical "lexical identity" dynamic scope for a static scope: built
/// once per run and cached so repeat closures over the same declaration
/// site (e.g. two different calls to the same module) share memoized
/// variable reads rather than re-evaluating sibling globals each time.
///
/// This is distinct from a *call frame* (built fresh per invocation, see
/// `call_function_def`/`eval_mod_call`) and from a plain brace-block scope
/// (built fresh per visit, see `build`'s `WorkItem::Scope` arm) -- it exists
/// only to answer "what does an ordinary name declared outside this
/// function/module resolve to".
pub fn lexical_scope_for<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    static_scope: &Rc<StaticScope>,
) -> Rc<DynamicScope<K::Shape>> {
    if let Some(existing) = ctx.global.cached_lexical_env(static_scope) {
        return existing;
    }
    let parent_dyn = static_scope
        .parent
        .as_ref()
        .and_then(|w| w.upgrade())
        .map(|p| lexical_scope_for(ctx, &p));
    let scope = DynamicScope::new(Rc::clone(static_scope), parent_dyn, None, None);
    ctx.global.cache_lexical_env(static_scope, Rc::clone(&scope));
    scope
}

/// Evaluate every work item of `scope`'s static scope in source order,
/// unioning non-null shapes (spec §4.3 `build`).
pub fn build<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<BuildResult<K::Shape>> {
    let items: Vec<WorkItem> = scope.static_scope.work.borrow().clone();
    let mut union: Option<V<K>> = None;
    let mut named = BTreeMap::new();
    for item in &items {
        match item {
            WorkItem::Statement(node) => {
                let v = eval_statement_node(ctx, node, scope)?;
                union = union_shapes(ctx, union, v);
            }
            WorkItem::ParentStatement(call_node, block) => {
                let v = eval_mod_call(ctx, call_node, Some(block.clone()), scope)?;
                union = union_shapes(ctx, union, v);
            }
            WorkItem::Scope(nested) => {
                let nested_scope =
                    DynamicScope::new(Rc::clone(nested), Some(Rc::clone(scope)), Some(Rc::clone(scope)), None);
                let r = build(ctx, &nested_scope)?;
                union = union_shapes(ctx, union, r.union);
                named.extend(r.named);
            }
            WorkItem::Named(name, modinst) => {
                let v = eval_module_instantiation(ctx, modinst, scope)?;
                if let Some(val) = &v {
                    named.insert(name.clone(), val.clone());
                }
                union = union_shapes(ctx, union, v);
            }
            WorkItem::Conditional(guard, then_branch, else_branch) => {
                let cond = eval_expr(ctx, guard, scope)?;
                let branch = if cond.is_truthy() { Some(then_branch) } else { else_branch.as_ref() };
                if let Some(b) = branch {
                    let nested_scope =
                        DynamicScope::new(Rc::clone(b), Some(Rc::clone(scope)), Some(Rc::clone(scope)), None);
                    let r = build(ctx, &nested_scope)?;
                    union = union_shapes(ctx, union, r.union);
                    named.extend(r.named);
                }
            }
        }
    }
    Ok(BuildResult { union, named })
}

fn union_shapes<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    a: Option<V<K>>,
    b: Option<V<K>>,
) -> Option<V<K>> {
    match (a, b) {
        (None, x) | (x, None) => x,
        (Some(Value::Shape(x)), Some(Value::Shape(y))) => {
            let s = ctx.interp.kernel.union(&x.0, &y.0);
            Some(Value::Shape(crate::value::ShapeHandle::new(s)))
        }
        (Some(x), _) => Some(x),
    }
}

fn eval_statement_node<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &Rc<ParseNode>,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<Option<V<K>>> {
    match node.kind() {
        Some(NodeKind::ModCall) => eval_mod_call(ctx, node, None, scope),
        _ => Err(arity_err(node)),
    }
}

/// `module_instantiation` (named top-level result's RHS): descend through
/// modifiers to the underlying `mod_inst_child`, then behave like the
/// statement-level dispatch for a call without a captured child block.
fn eval_module_instantiation<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &Rc<ParseNode>,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<Option<V<K>>> {
    let mut n: &ParseNode = node;
    loop {
        match n.kind() {
            Some(
                NodeKind::ModInstBang | NodeKind::ModInstHash | NodeKind::ModInstPerc | NodeKind::ModInstStar,
            ) => n = child(n, 0)?,
            Some(NodeKind::ModInstChild) => {
                let call = child(n, 0)?;
                return eval_mod_call(ctx, call, None, scope);
            }
            Some(NodeKind::ModCall) => return eval_mod_call(ctx, n, None, scope),
            _ => return Err(arity_err(n)),
        }
    }
}

/// `mod_call`: `[ident, arguments?]`. Resolve the callee (user `ModuleDef`
/// first, then the builtin registry), bind arguments eagerly in `caller`'s
/// scope, and run the body.
pub fn eval_mod_call<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    child_block: Option<ChildBlock>,
    caller: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<Option<V<K>>> {
    let name = child(node, 0)?.value.clone();
    let args = eval_arguments_node(ctx, node.child(1), caller)?;

    // `children`/`for`/`intersection_for`/`echo` are not fixed-arity data
    // builtins: an index, arbitrary user-chosen loop-variable names, or a
    // fully variadic argument list don't fit the fixed-parameter-name
    // calling convention every other builtin uses, so they're dispatched
    // here rather than through `ctx.interp.registry`.
    match name.as_str() {
        "children" => {
            let index = args.positional.first().and_then(|v| v.as_f64()).map(|f| f as usize);
            return eval_children(ctx, caller, index);
        }
        "for" | "intersection_for" => {
            let loop_scope = DynamicScope::new(
                Rc::clone(&caller.static_scope),
                Some(Rc::clone(caller)),
                Some(Rc::clone(caller)),
                child_block,
            );
            return eval_loop(ctx, &args.keyword, &loop_scope, name == "intersection_for");
        }
        "echo" => {
            let msg: Vec<String> = args.positional.iter().map(|v| v.to_string()).collect();
            ctx.global.echo(&msg.join(", "));
            return Ok(None);
        }
        _ => {}
    }

    if let Some(def) = caller.static_scope.lookup_mod(&name) {
        if ctx.global.call_depth >= ctx.global.options.max_call_depth {
            return Err(EvalAltError::CallStackOverflow(ctx.global.options.max_call_depth));
        }
        let bound = bind_args(ctx, &def.params, args, caller, &name);
        let lexical_env = lexical_scope_for(ctx, &def.defining_scope.upgrade().ok_or_else(|| {
            EvalAltError::UndefinedName { what: "module", name: name.clone() }
        })?);
        let call_scope = DynamicScope::with_params(
            Rc::clone(&def.body),
            Some(lexical_env),
            Some(Rc::clone(caller)),
            child_block,
            Some(Rc::new(clone_params(&def.params))),
        );
        for (k, v) in bound {
            call_scope.finish_local(&k, v);
        }
        ctx.global.call_depth += 1;
        let result = build(ctx, &call_scope);
        ctx.global.call_depth -= 1;
        return result.map(|r| r.union);
    }

    if let Some((sig, f)) = ctx.interp.registry.lookup_mod(&name) {
        let sig = sig.clone();
        let f = Rc::clone(f);
        let bound = bind_args(ctx, &sig.params, args, caller, &name);
        let call_scope = DynamicScope::new(
            Rc::clone(&caller.static_scope),
            Some(Rc::clone(caller)),
            Some(Rc::clone(caller)),
            child_block,
        );
        let mut call_ctx = crate::func::NativeCallContext {
            ctx: ctx.reborrow(),
            args: &bound,
            scope: Some(&call_scope),
        };
        return f(&mut call_ctx);
    }

    Err(EvalAltError::UndefinedName { what: "module", name })
}

fn clone_params(p: &crate::ast::Params) -> crate::ast::Params {
    crate::ast::Params { positional: p.positional.clone(), defaults: p.defaults.clone() }
}

/// `children(i?)` -- spec §4.3 "child accessor". `call_scope` is the
/// dynamic scope of the user module currently executing (the scope that
/// received `child_block` at its own call site).
pub fn eval_children<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    call_scope: &Rc<DynamicScope<K::Shape>>,
    index: Option<usize>,
) -> EvalResult<Option<V<K>>> {
    match index {
        Some(i) => eval_child(ctx, call_scope, i),
        None => child_union(ctx, call_scope),
    }
}

fn child_dynamic_scope<K: Kernel>(
    static_scope: Rc<StaticScope>,
    call_scope: &Rc<DynamicScope<K::Shape>>,
) -> Rc<DynamicScope<K::Shape>> {
    DynamicScope::new(static_scope, call_scope.lexical_parent.clone(), Some(Rc::clone(call_scope)), None)
}

pub fn eval_child<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    call_scope: &Rc<DynamicScope<K::Shape>>,
    index: usize,
) -> EvalResult<Option<V<K>>> {
    if let Some(v) = call_scope.cached_child(index) {
        return Ok(v);
    }
    let Some(child_block) = &call_scope.child else {
        call_scope.cache_child(index, None);
        return Ok(None);
    };
    if index >= child_block.len() {
        call_scope.cache_child(index, None);
        return Ok(None);
    }
    let value = match child_block {
        ChildBlock::Scope(s) => {
            let item = s.work.borrow()[index].clone();
            eval_one_child_item(ctx, &item, call_scope)?
        }
        ChildBlock::Statement(item) => eval_one_child_item(ctx, item, call_scope)?,
    };
    call_scope.cache_child(index, value.clone());
    Ok(value)
}

fn eval_one_child_item<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    item: &WorkItem,
    call_scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<Option<V<K>>> {
    match item {
        WorkItem::Statement(node) => eval_mod_call(ctx, node, None, &parent_for_child(call_scope)),
        WorkItem::ParentStatement(node, block) => {
            eval_mod_call(ctx, node, Some(block.clone()), &parent_for_child(call_scope))
        }
        WorkItem::Scope(nested) => {
            let scope = child_dynamic_scope(Rc::clone(nested), call_scope);
            build(ctx, &scope).map(|r| r.union)
        }
        WorkItem::Named(_, modinst) => eval_module_instantiation(ctx, modinst, &parent_for_child(call_scope)),
        WorkItem::Conditional(guard, then_b, else_b) => {
            let anchor = parent_for_child(call_scope);
            let cond = eval_expr(ctx, guard, &anchor)?;
            let branch = if cond.is_truthy() { Some(then_b) } else { else_b.as_ref() };
            match branch {
                Some(b) => {
                    let scope = child_dynamic_scope(Rc::clone(b), call_scope);
                    build(ctx, &scope).map(|r| r.union)
                }
                None => Ok(None),
            }
        }
    }
}

/// The dynamic scope that the child content's own call/mod-call evaluation
/// should run in: the module's lexical anchor (the scope active at the
/// call site), carrying the module's own frame as caller so `$`-variables
/// the module declared stay visible.
fn parent_for_child<K: Kernel>(call_scope: &Rc<DynamicScope<K::Shape>>) -> Rc<DynamicScope<K::Shape>> {
    child_dynamic_scope_anchor(call_scope)
}

fn child_dynamic_scope_anchor<K: Kernel>(call_scope: &Rc<DynamicScope<K::Shape>>) -> Rc<DynamicScope<K::Shape>> {
    // A single-statement (non-brace) child is evaluated directly against a
    // scope anchored the same way a brace child's scope would be.
    DynamicScope::new(
        Rc::clone(&call_scope.static_scope),
        call_scope.lexical_parent.clone(),
        Some(Rc::clone(call_scope)),
        None,
    )
}

pub fn child_union<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    call_scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<Option<V<K>>> {
    let n = call_scope.children_len();
    let mut union = None;
    for i in 0..n {
        let v = eval_child(ctx, call_scope, i)?;
        union = union_shapes(ctx, union, v);
    }
    Ok(union)
}

/// `for`/`intersection_for`: iterate the Cartesian product of the bound
/// loop variables (each a `Vector` or `Range`), building the captured child
/// once per tuple and combining with `union` or `intersection`.
pub fn eval_loop<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    bindings: &[(String, V<K>)],
    call_scope: &Rc<DynamicScope<K::Shape>>,
    intersect: bool,
) -> EvalResult<Option<V<K>>> {
    let axes: Vec<Vec<V<K>>> = bindings
        .iter()
        .map(|(_, v)| match v {
            Value::Range(r) => r.iter().map(Value::Number).collect(),
            Value::Vector(items) => items.as_ref().clone(),
            other => vec![other.clone()],
        })
        .collect();

    let mut combo: Option<V<K>> = None;
    let mut indices = vec![0usize; axes.len()];
    if axes.iter().any(Vec::is_empty) {
        return Ok(None);
    }
    loop {
        let iter_scope = DynamicScope::new(
            Rc::clone(&call_scope.static_scope),
            call_scope.lexical_parent.clone(),
            call_scope.caller.clone(),
            call_scope.child.clone(),
        );
        for (i, (name, _)) in bindings.iter().enumerate() {
            iter_scope.finish_local(name, axes[i][indices[i]].clone());
        }
        let v = child_union(ctx, &iter_scope)?;
        combo = if intersect {
            intersect_shapes(ctx, combo, v)
        } else {
            union_shapes(ctx, combo, v)
        };

        let mut carry = axes.len();
        while carry > 0 {
            carry -= 1;
            indices[carry] += 1;
            if indices[carry] < axes[carry].len() {
                break;
            }
            indices[carry] = 0;
            if carry == 0 {
                return Ok(combo);
            }
        }
        if axes.is_empty() {
            return Ok(combo);
        }
    }
}

fn intersect_shapes<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    a: Option<V<K>>,
    b: Option<V<K>>,
) -> Option<V<K>> {
    match (a, b) {
        (None, _) | (_, None) => None,
        (Some(Value::Shape(x)), Some(Value::Shape(y))) => {
            Some(Value::Shape(crate::value::ShapeHandle::new(ctx.interp.kernel.intersection(&x.0, &y.0))))
        }
        (Some(x), _) => Some(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::global_state::GlobalState;
    use crate::interpreter::Interpreter;
    use crate::kernel::{Kernel, LinearExtrudeSpec, RotateSpec, Vec3};
    use crate::value::ShapeHandle;

    #[derive(Clone, Debug, PartialEq)]
    struct Measure(f64);

    struct AddKernel;

    impl Kernel for AddKernel {
        type Shape = Measure;
        fn cube(&self, _: Vec3, _: bool) -> Self::Shape { Measure(0.0) }
        fn sphere(&self, _: f64, _: u32) -> Self::Shape { Measure(0.0) }
        fn cylinder(&self, _: f64, _: f64, _: f64, _: bool, _: u32) -> Self::Shape { Measure(0.0) }
        fn square(&self, _: [f64; 2], _: bool) -> Self::Shape { Measure(0.0) }
        fn circle(&self, _: f64, _: u32) -> Self::Shape { Measure(0.0) }
        fn polygon(&self, _: &[[f64; 2]], _: Option<&[Vec<usize>]>) -> Self::Shape { Measure(0.0) }
        fn polyhedron(&self, _: &[Vec3], _: &[Vec<usize>]) -> Self::Shape { Measure(0.0) }
        fn text(&self, _: &str, _: f64) -> Self::Shape { Measure(0.0) }
        fn import_mesh(&self, path: &str) -> Result<Self::Shape, String> { Err(path.to_string()) }
        fn translate(&self, s: &Self::Shape, _: Vec3) -> Self::Shape { s.clone() }
        fn rotate(&self, s: &Self::Shape, _: RotateSpec) -> Self::Shape { s.clone() }
        fn scale(&self, s: &Self::Shape, _: Vec3) -> Self::Shape { s.clone() }
        fn mirror(&self, s: &Self::Shape, _: Vec3) -> Self::Shape { s.clone() }
        fn color(&self, s: &Self::Shape, _: [f64; 4]) -> Self::Shape { s.clone() }
        fn union(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape { Measure(a.0 + b.0) }
        fn difference(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape { Measure((a.0 - b.0).max(0.0)) }
        fn intersection(&self, a: &Self::Shape, b: &Self::Shape) -> Self::Shape { Measure(a.0.min(b.0)) }
        fn linear_extrude(&self, s: &Self::Shape, _: LinearExtrudeSpec) -> Self::Shape { s.clone() }
        fn rotate_extrude(&self, s: &Self::Shape, _: f64) -> Self::Shape { s.clone() }
    }

    fn shape(n: f64) -> Value<Measure> {
        Value::Shape(ShapeHandle::new(Measure(n)))
    }

    fn with_ctx<R>(interp: &Interpreter<AddKernel>, f: impl FnOnce(&mut EvalContext<'_, '_, AddKernel>) -> R) -> R {
        let mut global = GlobalState::new(crate::config::Options::default());
        let mut ctx = EvalContext::new(interp, &mut global);
        f(&mut ctx)
    }

    #[test]
    fn union_shapes_passes_through_when_either_side_is_absent() {
        let interp = Interpreter::new(AddKernel);
        with_ctx(&interp, |ctx| {
            assert!(matches!(union_shapes(ctx, None, None), None));
            assert_eq!(union_shapes(ctx, Some(shape(2.0)), None).map(|v| measure_of(&v)), Some(2.0));
            assert_eq!(union_shapes(ctx, None, Some(shape(3.0))).map(|v| measure_of(&v)), Some(3.0));
        });
    }

    #[test]
    fn union_shapes_combines_two_shapes_via_the_kernel() {
        let interp = Interpreter::new(AddKernel);
        with_ctx(&interp, |ctx| {
            let combined = union_shapes(ctx, Some(shape(2.0)), Some(shape(3.0)));
            assert_eq!(combined.map(|v| measure_of(&v)), Some(5.0));
        });
    }

    #[test]
    fn intersect_shapes_is_none_if_either_side_is_absent() {
        let interp = Interpreter::new(AddKernel);
        with_ctx(&interp, |ctx| {
            assert!(intersect_shapes(ctx, Some(shape(2.0)), None).is_none());
            assert!(intersect_shapes(ctx, None, Some(shape(2.0))).is_none());
        });
    }

    #[test]
    fn intersect_shapes_combines_two_shapes_via_the_kernel() {
        let interp = Interpreter::new(AddKernel);
        with_ctx(&interp, |ctx| {
            let combined = intersect_shapes(ctx, Some(shape(5.0)), Some(shape(2.0)));
            assert_eq!(combined.map(|v| measure_of(&v)), Some(2.0));
        });
    }

    fn measure_of(v: &Value<Measure>) -> f64 {
        match v {
            Value::Shape(h) => h.0.0,
            _ => panic!("expected a shape"),
        }
    }
}
