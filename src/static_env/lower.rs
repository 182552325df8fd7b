//! Lowering rules: parse tree -> `StaticScope`/`WorkItem` tree (spec §4.1).
//!
//! This pass walks the parse tree once, collecting `vars`/`funcs`/`mods` and
//! a work list without evaluating anything. `mod_inst_child`'s "avoid
//! wrapping twice" special case for `module foo() { ... }` bodies is handled
//! in `lower_mod_decl`.

use std::rc::Rc;

use crate::ast::{FunctionDef, ModifierFlags, ModuleDef, NodeKind, ParseNode, Params};
use crate::error::{EvalAltError, EvalResult, Warning};

use super::scope::{ChildBlock, StaticScope, WorkItem};

/// Resolves an `include`/`use` path to the already-parsed tree of the
/// referenced file. Parsing and file I/O are external-collaborator concerns
/// (spec's explicit non-goal); this crate only implements the splicing rule
/// once a tree is in hand.
pub trait IncludeResolver {
    fn resolve(&self, path: &str) -> EvalResult<Rc<ParseNode>>;
}

impl<F: Fn(&str) -> EvalResult<Rc<ParseNode>>> IncludeResolver for F {
    fn resolve(&self, path: &str) -> EvalResult<Rc<ParseNode>> {
        self(path)
    }
}

struct LowerCtx<'a> {
    resolver: &'a dyn IncludeResolver,
    warnings: std::cell::RefCell<Vec<Warning>>,
}

/// Lower an `Input` parse tree into a root `StaticScope`.
///
/// Returns the scope plus any warnings collected along the way (unsupported
/// modifiers, redefinitions) -- the static pass never evaluates a condition
/// or an expression, so these are the only diagnostics it can produce.
pub fn lower_program(
    root: &ParseNode,
    resolver: &dyn IncludeResolver,
) -> EvalResult<(Rc<StaticScope>, Vec<Warning>)> {
    let ctx = LowerCtx { resolver, warnings: std::cell::RefCell::new(Vec::new()) };
    let scope = StaticScope::new(None);
    lower_block(&scope, &root.children, &ctx)?;
    Ok((scope, ctx.warnings.into_inner()))
}

fn arity_err(node: &ParseNode) -> EvalAltError {
    match node.kind() {
        Some(_) => EvalAltError::arity(node, "a shape matching this crate's parse-tree contract"),
        None => EvalAltError::UnknownNode(node.kind.clone()),
    }
}

fn child<'a>(node: &'a ParseNode, i: usize) -> EvalResult<&'a ParseNode> {
    node.child(i).ok_or_else(|| arity_err(node))
}

fn lower_block(scope: &Rc<StaticScope>, stmts: &[ParseNode], ctx: &LowerCtx) -> EvalResult<()> {
    for stmt in stmts {
        if stmt.kind() == Some(NodeKind::Eof) {
            continue;
        }
        lower_statement(scope, stmt, ctx)?;
    }
    Ok(())
}

fn lower_statement(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let inner = match node.kind() {
        Some(NodeKind::Statement) => child(node, 0)?,
        _ => node,
    };
    match inner.kind() {
        Some(NodeKind::Assignment) => lower_assignment(scope, inner),
        Some(NodeKind::NamedResult) => lower_named_result(scope, inner, ctx),
        Some(NodeKind::StmtDeclFn) => lower_fn_decl(scope, inner, ctx),
        Some(NodeKind::StmtDeclMod) => lower_mod_decl(scope, inner, ctx),
        Some(NodeKind::Include) => lower_include(scope, inner, ctx),
        Some(NodeKind::Use) => lower_use(scope, inner, ctx),
        Some(NodeKind::IfElseStatement) => lower_ifelse(scope, inner, ctx),
        Some(NodeKind::StmtObj) => lower_stmt_obj(scope, inner, ctx),
        Some(NodeKind::StmtList) => {
            let nested = StaticScope::new(Some(Rc::downgrade(scope)));
            lower_block(&nested, &inner.children, ctx)?;
            scope.work.borrow_mut().push(WorkItem::Scope(nested));
            Ok(())
        }
        _ => Err(arity_err(inner)),
    }
}

fn lower_ifelse(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let guard = child(node, 0)?;
    let then_branch = StaticScope::new(Some(Rc::downgrade(scope)));
    lower_statement(&then_branch, child(node, 1)?, ctx)?;
    let else_branch = match node.children.len() {
        3 => {
            let b = StaticScope::new(Some(Rc::downgrade(scope)));
            lower_statement(&b, child(node, 2)?, ctx)?;
            Some(b)
        }
        2 => None,
        _ => return Err(arity_err(node)),
    };
    scope.work.borrow_mut().push(WorkItem::Conditional(Rc::new(guard.clone()), then_branch, else_branch));
    Ok(())
}

fn lower_assignment(scope: &Rc<StaticScope>, node: &ParseNode) -> EvalResult<()> {
    let name = child(node, 0)?.value.clone();
    let expr = child(node, 1)?;
    // Later assignments of the same name win (spec: order-independent
    // binding means the *last lexical* assignment to a name is the one
    // `lookup_var` should see once the whole scope has been lowered).
    scope.vars.borrow_mut().insert(name, Rc::new(expr.clone()));
    Ok(())
}

fn lower_named_result(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let name = child(node, 0)?.value.clone();
    let modinst = child(node, 1)?;
    scope.work.borrow_mut().push(WorkItem::Named(name, Rc::new(modinst.clone())));
    let _ = ctx;
    Ok(())
}

fn lower_fn_decl(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let name = child(node, 0)?.value.clone();
    if scope.funcs.borrow().contains_key(&name) {
        ctx.warnings.borrow_mut().push(Warning::DuplicateDeclaration { kind: "function", name });
        return Ok(());
    }
    let (params, body) = match node.children.len() {
        2 => (Params::default(), child(node, 1)?),
        3 => (Params::from_node(child(node, 1)?)?, child(node, 2)?),
        _ => return Err(arity_err(node)),
    };
    let def = FunctionDef {
        name: name.clone(),
        params,
        body: Rc::new(body.clone()),
        defining_scope: Rc::downgrade(scope),
    };
    scope.funcs.borrow_mut().insert(name, Rc::new(def));
    Ok(())
}

fn lower_mod_decl(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let name = child(node, 0)?.value.clone();
    if scope.mods.borrow().contains_key(&name) {
        ctx.warnings.borrow_mut().push(Warning::DuplicateDeclaration { kind: "module", name });
        return Ok(());
    }
    let (params, body_stmt) = match node.children.len() {
        2 => (Params::default(), child(node, 1)?),
        3 => (Params::from_node(child(node, 1)?)?, child(node, 2)?),
        _ => return Err(arity_err(node)),
    };

    // `module foo() { a(); b(); }` -- don't wrap the brace block in an extra
    // scope on top of the one the module call itself creates.
    let inner = match body_stmt.kind() {
        Some(NodeKind::Statement) => child(body_stmt, 0)?,
        _ => body_stmt,
    };
    let body = StaticScope::new(Some(Rc::downgrade(scope)));
    match inner.kind() {
        Some(NodeKind::StmtObj) => {
            let stmt_inner = child(inner, 0)?;
            if stmt_inner.kind() == Some(NodeKind::StmtList) {
                lower_block(&body, &stmt_inner.children, ctx)?;
            } else {
                lower_statement(&body, stmt_inner, ctx)?;
            }
        }
        Some(NodeKind::StmtList) => lower_block(&body, &inner.children, ctx)?,
        _ => lower_statement(&body, inner, ctx)?,
    }

    let def = ModuleDef { name: name.clone(), params, body, defining_scope: Rc::downgrade(scope) };
    scope.mods.borrow_mut().insert(name, Rc::new(def));
    Ok(())
}

fn lower_include(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let path = &node.value;
    let tree = ctx.resolver.resolve(path)?;
    // `include`: the included file's vars/funcs/mods/work are spliced
    // directly into this scope, as if textually inlined.
    lower_block(scope, &tree.children, ctx)
}

fn lower_use(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let path = &node.value;
    let tree = ctx.resolver.resolve(path)?;
    // `use`: only the used file's own funcs/mods/vars are imported (not
    // anything *it* `use`s), and it contributes no work items.
    let used = StaticScope::new(None);
    lower_block(&used, &tree.children, ctx)?;
    for (k, v) in used.vars.borrow().iter() {
        scope.vars.borrow_mut().entry(k.clone()).or_insert_with(|| Rc::clone(v));
    }
    for (k, v) in used.funcs.borrow().iter() {
        scope.funcs.borrow_mut().entry(k.clone()).or_insert_with(|| Rc::clone(v));
    }
    for (k, v) in used.mods.borrow().iter() {
        scope.mods.borrow_mut().entry(k.clone()).or_insert_with(|| Rc::clone(v));
    }
    Ok(())
}

fn lower_stmt_obj(scope: &Rc<StaticScope>, node: &ParseNode, ctx: &LowerCtx) -> EvalResult<()> {
    let inner = child(node, 0)?;
    match inner.kind() {
        Some(NodeKind::StmtList) => {
            let nested = StaticScope::new(Some(Rc::downgrade(scope)));
            lower_block(&nested, &inner.children, ctx)?;
            scope.work.borrow_mut().push(WorkItem::Scope(nested));
            Ok(())
        }
        Some(NodeKind::ModuleInstantiation) => {
            if let Some(item) = lower_module_instantiation(scope, inner, ctx)? {
                scope.work.borrow_mut().push(item);
            }
            Ok(())
        }
        _ => Err(arity_err(inner)),
    }
}

fn peel_modifiers<'a>(
    node: &'a ParseNode,
    mut acc: ModifierFlags,
) -> EvalResult<(ModifierFlags, &'a ParseNode)> {
    match node.kind() {
        Some(NodeKind::ModInstBang) => peel_modifiers(child(node, 0)?, acc | ModifierFlags::ROOT),
        Some(NodeKind::ModInstHash) => {
            peel_modifiers(child(node, 0)?, acc | ModifierFlags::HIGHLIGHT)
        }
        Some(NodeKind::ModInstPerc) => {
            peel_modifiers(child(node, 0)?, acc | ModifierFlags::BACKGROUND)
        }
        Some(NodeKind::ModInstStar) => {
            acc |= ModifierFlags::DISABLE;
            peel_modifiers(child(node, 0)?, acc)
        }
        Some(NodeKind::ModInstChild) => Ok((acc, node)),
        _ => Err(arity_err(node)),
    }
}

fn lower_module_instantiation(
    scope: &Rc<StaticScope>,
    node: &ParseNode,
    ctx: &LowerCtx,
) -> EvalResult<Option<WorkItem>> {
    let single = child(node, 0)?;
    let (flags, base) = peel_modifiers(single, ModifierFlags::NONE)?;
    if flags.contains(ModifierFlags::DISABLE) {
        return Ok(None);
    }
    if let Some(ch) = flags.warn_char() {
        ctx.warnings.borrow_mut().push(Warning::UnsupportedModifier(ch));
    }
    lower_mod_inst_child(scope, base, ctx).map(Some)
}

fn lower_mod_inst_child(
    scope: &Rc<StaticScope>,
    node: &ParseNode,
    ctx: &LowerCtx,
) -> EvalResult<WorkItem> {
    let call = child(node, 0)?;
    if node.children.len() == 1 {
        return Ok(WorkItem::Statement(Rc::new(call.clone())));
    }
    let child_stmt = child(node, 1)?;
    let inner = match child_stmt.kind() {
        Some(NodeKind::ChildStatement) => child(child_stmt, 0)?,
        _ => child_stmt,
    };
    let block = match inner.kind() {
        Some(NodeKind::NoChild) => return Ok(WorkItem::Statement(Rc::new(call.clone()))),
        Some(NodeKind::ExplicitChild) => {
            let statements_node = child(inner, 0)?;
            let nested = StaticScope::new(Some(Rc::downgrade(scope)));
            lower_block(&nested, &statements_node.children, ctx)?;
            if nested.work.borrow().is_empty() {
                return Ok(WorkItem::Statement(Rc::new(call.clone())));
            }
            ChildBlock::Scope(nested)
        }
        Some(NodeKind::ModuleInstantiation) => {
            // Chained call without braces: `translate(v) rotate(a) cube();`
            match lower_module_instantiation(scope, inner, ctx)? {
                Some(item) => ChildBlock::Statement(Rc::new(item)),
                // The chained target was `*`-disabled: this call gets no
                // child at all.
                None => return Ok(WorkItem::Statement(Rc::new(call.clone()))),
            }
        }
        _ => return Err(arity_err(inner)),
    };
    Ok(WorkItem::ParentStatement(Rc::new(call.clone()), block))
}
