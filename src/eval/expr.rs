//! Expression evaluation (spec §4.2).
//!
//! `logic_or`/`logic_and`/.../`exponent` each fold a left-to-right chain of
//! same-precedence operators. `call` is the one special case: a bare name
//! applied to arguments resolves through the function namespace rather than
//! through a variable read.

use std::rc::Rc;

use crate::ast::{NodeKind, ParseNode, Params};
use crate::dynamic::DynamicScope;
use crate::error::EvalAltError;
use crate::error::EvalResult;
use crate::eval::context::EvalContext;
use crate::func::{bind_args, CallArgs};
use crate::kernel::Kernel;
use crate::value::{Range, Value};

type V<K> = Value<<K as Kernel>::Shape>;

fn arity_err(node: &ParseNode) -> EvalAltError {
    EvalAltError::arity(node, "a shape matching this crate's parse-tree contract")
}

fn child<'a>(node: &'a ParseNode, i: usize) -> EvalResult<&'a ParseNode> {
    node.child(i).ok_or_else(|| arity_err(node))
}

/// Evaluate one expression node against a dynamic scope.
pub fn eval_expr<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    match node.kind() {
        Some(NodeKind::Expr | NodeKind::Primary | NodeKind::VectorElement) => {
            eval_expr(ctx, child(node, 0)?, scope)
        }
        Some(NodeKind::ExprCase) => eval_expr_case(ctx, node, scope),
        Some(
            NodeKind::LogicOr
            | NodeKind::LogicAnd
            | NodeKind::Equality
            | NodeKind::Comparison
            | NodeKind::Addition
            | NodeKind::Multiplication
            | NodeKind::Exponent,
        ) => eval_chain(ctx, node, scope),
        Some(NodeKind::Unary) => eval_unary(ctx, node, scope),
        Some(NodeKind::Call) => eval_call(ctx, node, scope),
        Some(NodeKind::PrNum) => Ok(parse_number(&node.value)),
        Some(NodeKind::PrSym) => read_var(ctx, scope, &node.value),
        Some(NodeKind::PrStr) => Ok(Value::Str(Rc::from(node.value.as_str()))),
        Some(NodeKind::PrTrue) => Ok(Value::Bool(true)),
        Some(NodeKind::PrFalse) => Ok(Value::Bool(false)),
        Some(NodeKind::PrUndef) => Ok(Value::Undef),
        Some(NodeKind::PrParen) => eval_expr(ctx, child(node, 0)?, scope),
        Some(NodeKind::PrVecEmpty) => Ok(Value::Vector(Rc::new(Vec::new()))),
        Some(NodeKind::PrVecElems) => {
            let elems = child(node, 0)?;
            let mut out = Vec::with_capacity(elems.children.len());
            for e in &elems.children {
                out.push(eval_expr(ctx, e, scope)?);
            }
            Ok(Value::Vector(Rc::new(out)))
        }
        Some(NodeKind::PrFor2) => {
            let start = eval_f64(ctx, child(node, 0)?, scope)?;
            let end = eval_f64(ctx, child(node, 1)?, scope)?;
            Ok(Value::Range(Range { start, step: 1.0, end }))
        }
        Some(NodeKind::PrFor3) => {
            let start = eval_f64(ctx, child(node, 0)?, scope)?;
            let step = eval_f64(ctx, child(node, 1)?, scope)?;
            let end = eval_f64(ctx, child(node, 2)?, scope)?;
            Ok(Value::Range(Range { start, step, end }))
        }
        Some(NodeKind::ExprFn) => {
            let (params, body) = match node.children.len() {
                1 => (Params::default(), child(node, 0)?),
                2 => (Params::from_node(child(node, 0)?)?, child(node, 1)?),
                _ => return Err(arity_err(node)),
            };
            Ok(Value::FunctionRef(Rc::new(crate::ast::FunctionDef {
                name: "<anonymous>".to_string(),
                params,
                body: Rc::new(body.clone()),
                defining_scope: Rc::downgrade(&scope.static_scope),
            })))
        }
        _ => Err(arity_err(node)),
    }
}

fn eval_f64<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<f64> {
    let v = eval_expr(ctx, node, scope)?;
    v.as_f64().ok_or_else(|| EvalAltError::TypeError {
        op: "numeric context".to_string(),
        lhs: v.type_name().to_string(),
        rhs: None,
    })
}

fn parse_number<S>(text: &str) -> Value<S> {
    if let Ok(i) = text.parse::<i64>() {
        Value::Int(i)
    } else {
        Value::Number(text.parse::<f64>().unwrap_or(f64::NAN))
    }
}

fn eval_expr_case<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    let cond = eval_expr(ctx, child(node, 0)?, scope)?;
    if node.children.len() == 1 {
        return Ok(cond);
    }
    if cond.is_truthy() {
        eval_expr(ctx, child(node, 1)?, scope)
    } else {
        eval_expr(ctx, child(node, 2)?, scope)
    }
}

fn eval_chain<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    let mut res = eval_expr(ctx, child(node, 0)?, scope)?;
    if node.children.len() == 1 {
        return Ok(res);
    }
    let mut i = 1;
    while i < node.children.len() {
        let op = node.children[i].value.as_str();
        let rhs_node = child(node, i + 1)?;
        match node.kind() {
            Some(NodeKind::LogicOr) => {
                if res.is_truthy() {
                    return Ok(res);
                }
                res = eval_expr(ctx, rhs_node, scope)?;
            }
            Some(NodeKind::LogicAnd) => {
                if !res.is_truthy() {
                    return Ok(res);
                }
                res = eval_expr(ctx, rhs_node, scope)?;
            }
            Some(NodeKind::Equality) => {
                let rhs = eval_expr(ctx, rhs_node, scope)?;
                let eq = values_equal(&res, &rhs);
                res = Value::Bool(if op == "==" { eq } else { !eq });
            }
            Some(NodeKind::Comparison) => {
                let a = numeric(&res, op)?;
                let rhs = eval_expr(ctx, rhs_node, scope)?;
                let b = numeric(&rhs, op)?;
                let ok = match op {
                    "<" => a < b,
                    "<=" => a <= b,
                    ">" => a > b,
                    ">=" => a >= b,
                    _ => return Err(arity_err(node)),
                };
                res = Value::Bool(ok);
                if !ok {
                    return Ok(Value::Bool(false));
                }
            }
            Some(NodeKind::Addition) => {
                let rhs = eval_expr(ctx, rhs_node, scope)?;
                res = apply_addition(&res, &rhs, op)?;
            }
            Some(NodeKind::Multiplication) => {
                let rhs = eval_expr(ctx, rhs_node, scope)?;
                res = apply_multiplication(&res, &rhs, op)?;
            }
            Some(NodeKind::Exponent) => {
                let a = numeric(&res, op)?;
                let rhs = eval_expr(ctx, rhs_node, scope)?;
                let b = numeric(&rhs, op)?;
                res = Value::Number(a.powf(b));
            }
            _ => return Err(arity_err(node)),
        }
        i += 2;
    }
    Ok(res)
}

fn numeric<S>(v: &Value<S>, op: &str) -> EvalResult<f64> {
    v.as_f64().ok_or_else(|| EvalAltError::TypeError {
        op: op.to_string(),
        lhs: v.type_name().to_string(),
        rhs: None,
    })
}

fn values_equal<S>(a: &Value<S>, b: &Value<S>) -> bool {
    match (a, b) {
        (Value::Undef, Value::Undef) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

fn apply_addition<S>(a: &Value<S>, b: &Value<S>, op: &str) -> EvalResult<Value<S>> {
    match (a, b) {
        (Value::Vector(x), Value::Vector(y)) if op == "+" => {
            let len = x.len().max(y.len());
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                let xi = x.get(i).cloned().unwrap_or(Value::Int(0));
                let yi = y.get(i).cloned().unwrap_or(Value::Int(0));
                out.push(apply_addition(&xi, &yi, "+")?);
            }
            Ok(Value::Vector(Rc::new(out)))
        }
        (Value::Int(x), Value::Int(y)) => {
            Ok(Value::Int(if op == "+" { x + y } else { x - y }))
        }
        _ => {
            let x = numeric(a, op)?;
            let y = numeric(b, op)?;
            Ok(Value::Number(if op == "+" { x + y } else { x - y }))
        }
    }
}

fn apply_multiplication<S>(a: &Value<S>, b: &Value<S>, op: &str) -> EvalResult<Value<S>> {
    if op == "*" {
        if let (Value::Vector(x), Value::Vector(y)) = (a, b) {
            // dot product
            let mut sum = 0.0;
            for (xi, yi) in x.iter().zip(y.iter()) {
                sum += numeric(xi, "*")? * numeric(yi, "*")?;
            }
            return Ok(Value::Number(sum));
        }
        if let Value::Vector(x) = a {
            let s = numeric(b, "*")?;
            let out: EvalResult<Vec<_>> =
                x.iter().map(|e| apply_multiplication(e, &Value::Number(s), "*")).collect();
            return Ok(Value::Vector(Rc::new(out?)));
        }
        if let Value::Vector(y) = b {
            let s = numeric(a, "*")?;
            let out: EvalResult<Vec<_>> =
                y.iter().map(|e| apply_multiplication(&Value::Number(s), e, "*")).collect();
            return Ok(Value::Vector(Rc::new(out?)));
        }
    }
    let x = numeric(a, op)?;
    let y = numeric(b, op)?;
    match op {
        "*" => Ok(Value::Number(x * y)),
        "/" => Ok(Value::Number(x / y)),
        "%" => Ok(Value::Number(x % y)),
        _ => Err(EvalAltError::TypeError { op: op.to_string(), lhs: "number".to_string(), rhs: None }),
    }
}

fn eval_unary<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    if node.children.len() == 1 {
        return eval_expr(ctx, child(node, 0)?, scope);
    }
    let op = child(node, 0)?.value.as_str();
    let v = eval_expr(ctx, child(node, 1)?, scope)?;
    match op {
        "+" => Ok(v),
        "-" => match v {
            Value::Int(i) => Ok(Value::Int(-i)),
            other => Ok(Value::Number(-numeric(&other, "-")?)),
        },
        "!" => Ok(Value::Bool(!v.is_truthy())),
        _ => Err(arity_err(node)),
    }
}

/// Resolve an ordinary (non-`$`) name: own bindings, then own static vars /
/// parameter defaults (lazily forced), then the lexical parent chain.
/// Unresolved ordinary names are `Undef`, matching the reference language.
pub fn read_var<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    scope: &Rc<DynamicScope<K::Shape>>,
    name: &str,
) -> EvalResult<V<K>> {
    if name.starts_with('$') {
        return read_dollar_var(ctx, scope, name);
    }
    let mut cur = Rc::clone(scope);
    loop {
        if let Some(r) = cur.peek_local(name) {
            return r;
        }
        if let Some(expr) = cur.defining_expr(name) {
            return force_local(ctx, &cur, name, &expr);
        }
        match cur.lexical_parent.clone() {
            Some(p) => cur = p,
            None => return Ok(Value::Undef),
        }
    }
}

/// Resolve a `$`-prefixed name: the caller chain first, then the lexical
/// chain, then this crate's built-in `$fn`/`$fa`/`$fs` defaults.
pub fn read_dollar_var<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    scope: &Rc<DynamicScope<K::Shape>>,
    name: &str,
) -> EvalResult<V<K>> {
    let mut cur = Some(Rc::clone(scope));
    while let Some(s) = cur {
        if let Some(r) = s.peek_local(name) {
            return r;
        }
        if let Some(expr) = s.defining_expr(name) {
            return force_local(ctx, &s, name, &expr);
        }
        cur = s.caller.clone();
    }
    let mut cur = Some(Rc::clone(scope));
    while let Some(s) = cur {
        if let Some(r) = s.peek_local(name) {
            return r;
        }
        if let Some(expr) = s.defining_expr(name) {
            return force_local(ctx, &s, name, &expr);
        }
        cur = s.lexical_parent.clone();
    }
    Ok(match name {
        "$fn" => Value::Number(ctx.global.options.default_fn),
        "$fa" => Value::Number(ctx.global.options.default_fa),
        "$fs" => Value::Number(ctx.global.options.default_fs),
        "$t" => Value::Number(ctx.global.options.default_t),
        "$preview" => Value::Bool(ctx.global.options.default_preview),
        "$trace" => Value::Bool(ctx.global.options.default_trace),
        "$children" => Value::Int(scope.children_len() as i64),
        _ => Value::Undef,
    })
}

fn force_local<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    scope: &Rc<DynamicScope<K::Shape>>,
    name: &str,
    expr: &Rc<ParseNode>,
) -> EvalResult<V<K>> {
    scope.begin_local(name);
    let result = eval_expr(ctx, expr, scope);
    match &result {
        Ok(v) => scope.finish_local(name, v.clone()),
        Err(_) => scope.clear_local(name),
    }
    result
}

/// `call` node: either a bare `name(args)` resolving through the
/// function/module namespace, or a value (possibly a `FunctionRef`) with
/// postfix application/indexing.
fn eval_call<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    let primary = child(node, 0)?;
    let postfixes = &node.children[1..];

    if let Some(name) = bare_symbol(primary) {
        if let Some(first) = postfixes.first() {
            if first.kind() == Some(NodeKind::AddArgs) {
                let args = eval_arguments(ctx, first, scope)?;
                let mut result = call_named(ctx, &name, args, scope)?;
                for p in &postfixes[1..] {
                    result = apply_postfix(ctx, result, p, scope)?;
                }
                return Ok(result);
            }
        }
    }

    let mut result = eval_expr(ctx, primary, scope)?;
    for p in postfixes {
        result = apply_postfix(ctx, result, p, scope)?;
    }
    Ok(result)
}

fn bare_symbol(primary: &ParseNode) -> Option<String> {
    let mut n = primary;
    loop {
        match n.kind() {
            Some(NodeKind::Primary) if n.children.len() == 1 => n = &n.children[0],
            Some(NodeKind::PrSym) => return Some(n.value.clone()),
            _ => return None,
        }
    }
}

fn apply_postfix<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    base: V<K>,
    node: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    match node.kind() {
        Some(NodeKind::AddArgs) => match base {
            Value::FunctionRef(fd) => {
                let args = eval_arguments(ctx, node, scope)?;
                call_function_def(ctx, &fd, args, scope)
            }
            other => Err(EvalAltError::TypeError {
                op: "call".to_string(),
                lhs: other.type_name().to_string(),
                rhs: None,
            }),
        },
        Some(NodeKind::AddIndex) => {
            let idx = eval_expr(ctx, child(node, 0)?, scope)?;
            Ok(index_value(&base, &idx))
        }
        _ => Err(arity_err(node)),
    }
}

fn index_value<S>(base: &Value<S>, idx: &Value<S>) -> Value<S>
where
    S: Clone,
{
    let Some(i) = idx.as_f64() else { return Value::Undef };
    if i < 0.0 {
        return Value::Undef;
    }
    let i = i as usize;
    match base {
        Value::Vector(v) => v.get(i).cloned().unwrap_or(Value::Undef),
        Value::Str(s) => s.chars().nth(i).map(|c| Value::Str(Rc::from(c.to_string().as_str()))).unwrap_or(Value::Undef),
        _ => Value::Undef,
    }
}

/// `add_args`: `[arguments?]` -- descend one level, then delegate to
/// [`eval_arguments_node`].
fn eval_arguments<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    add_args: &ParseNode,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<CallArgs<K::Shape>> {
    eval_arguments_node(ctx, add_args.child(0), scope)
}

/// `arguments` -> `argument_list` -> `argument*`, or no node at all for a
/// call with no parenthesized arguments. Shared by `add_args` postfixes
/// (one level removed, see [`eval_arguments`]) and `mod_call`'s direct
/// `arguments?` child.
pub(crate) fn eval_arguments_node<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    arguments: Option<&ParseNode>,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<CallArgs<K::Shape>> {
    let mut out = CallArgs { positional: Vec::new(), keyword: Vec::new() };
    let Some(arguments) = arguments else {
        return Ok(out);
    };
    let Some(list) = arguments.child(0) else {
        return Ok(out);
    };
    for arg in &list.children {
        match arg.children.len() {
            1 => out.positional.push(eval_expr(ctx, &arg.children[0], scope)?),
            2 => {
                let name = arg.children[0].value.clone();
                let value = eval_expr(ctx, &arg.children[1], scope)?;
                out.keyword.push((name, value));
            }
            _ => return Err(arity_err(arg)),
        }
    }
    Ok(out)
}

/// `str`/`min`/`max` take an arbitrary number of arguments (or a single
/// vector standing in for the list), which doesn't fit the fixed
/// declared-parameter-name convention every other builtin binds through
/// (`func::bind_args`) -- they're dispatched here, against the raw
/// (already-evaluated) call arguments, rather than through
/// `ctx.interp.registry`.
fn call_named<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    name: &str,
    args: CallArgs<K::Shape>,
    scope: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    match name {
        "str" => return Ok(Value::Str(Rc::from(str_concat(&args.positional).as_str()))),
        "min" | "max" => return min_max(&args.positional, name == "max"),
        _ => {}
    }
    if let Some(fd) = scope.static_scope.lookup_func(name) {
        return call_function_def(ctx, &fd, args, scope);
    }
    if let Some((sig, f)) = ctx.interp.registry.lookup_fn(name) {
        let sig = sig.clone();
        let f = Rc::clone(f);
        let bound = bind_args(ctx, &sig.params, args, scope, name);
        let mut call_ctx =
            crate::func::NativeCallContext { ctx: ctx.reborrow(), args: &bound, scope: None };
        return f(&mut call_ctx);
    }
    if let Ok(Value::FunctionRef(fd)) = read_var(ctx, scope, name) {
        return call_function_def(ctx, &fd, args, scope);
    }
    Err(EvalAltError::UndefinedName { what: "function", name: name.to_string() })
}

fn call_function_def<K: Kernel>(
    ctx: &mut EvalContext<'_, '_, K>,
    fd: &Rc<crate::ast::FunctionDef>,
    args: CallArgs<K::Shape>,
    caller: &Rc<DynamicScope<K::Shape>>,
) -> EvalResult<V<K>> {
    if ctx.global.call_depth >= ctx.global.options.max_call_depth {
        return Err(EvalAltError::CallStackOverflow(ctx.global.options.max_call_depth));
    }
    let Some(defining_static) = fd.defining_scope.upgrade() else {
        return Err(EvalAltError::UndefinedName { what: "function", name: fd.name.clone() });
    };
    let bound = bind_args(ctx, &fd.params, args, caller, &fd.name);
    let lexical_env = crate::eval::stmt::lexical_scope_for(ctx, &defining_static);
    let call_scope = DynamicScope::with_params(
        defining_static,
        Some(lexical_env),
        Some(Rc::clone(caller)),
        None,
        Some(Rc::new(clone_params_shell(&fd.params))),
    );
    for (k, v) in bound {
        call_scope.finish_local(&k, v);
    }
    ctx.global.call_depth += 1;
    let result = eval_expr(ctx, &fd.body, &call_scope);
    ctx.global.call_depth -= 1;
    result
}

fn clone_params_shell(p: &Params) -> Params {
    Params { positional: p.positional.clone(), defaults: p.defaults.clone() }
}

/// `str(...)`'s piece formatting: unlike `Value`'s `Display` impl (used for
/// diagnostics, which quotes strings), a string argument contributes its raw
/// contents.
fn str_piece<S>(v: &Value<S>) -> String {
    match v {
        Value::Str(s) => s.to_string(),
        Value::Vector(items) => {
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&str_piece(item));
            }
            out.push(']');
            out
        }
        other => other.to_string(),
    }
}

fn str_concat<S>(args: &[Value<S>]) -> String {
    args.iter().map(str_piece).collect()
}

fn min_max<S: Clone>(args: &[Value<S>], want_max: bool) -> EvalResult<Value<S>> {
    let items: Vec<Value<S>> = match args {
        [Value::Vector(v)] => v.as_ref().clone(),
        other => other.to_vec(),
    };
    let mut best: Option<f64> = None;
    for item in &items {
        let n = numeric(item, if want_max { "max" } else { "min" })?;
        best = Some(match best {
            None => n,
            Some(b) if want_max => b.max(n),
            Some(b) => b.min(n),
        });
    }
    Ok(best.map(Value::Number).unwrap_or(Value::Undef))
}
