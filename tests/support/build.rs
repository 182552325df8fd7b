//! Hand-authored [`ParseNode`] construction, matching the shape contract
//! documented on `sdl_csg::ast::node` (`NodeKind`'s "Shape, by kind" list).
//! There is no parser in this crate to drive integration tests through, so
//! every scenario test builds its tree directly with these helpers.
#![allow(dead_code)]

use sdl_csg::ParseNode;

/// A call's child content: none (`name(args);`), a braced block of one or
/// more statements, or a chained call with no braces (`name(args) next();`).
pub enum Child {
    None,
    Block(Vec<ParseNode>),
    Chain(ParseNode),
}

pub fn input(stmts: Vec<ParseNode>) -> ParseNode {
    ParseNode::branch("Input", stmts)
}

/// An identifier-holding leaf: used both where the grammar calls for `ident`
/// (module/function/variable names, parameter names) and as a bare-symbol
/// expression (a variable read) -- both only ever consult `.value`.
pub fn ident(name: &str) -> ParseNode {
    ParseNode::leaf("pr_Sym", name)
}

pub fn num(n: f64) -> ParseNode {
    ParseNode::leaf("pr_Num", format!("{n}"))
}

pub fn int(n: i64) -> ParseNode {
    ParseNode::leaf("pr_Num", n.to_string())
}

pub fn boolean(b: bool) -> ParseNode {
    ParseNode::leaf(if b { "pr_true" } else { "pr_false" }, "")
}

pub fn strlit(s: &str) -> ParseNode {
    ParseNode::leaf("pr_Str", s)
}

pub fn vector(items: Vec<ParseNode>) -> ParseNode {
    if items.is_empty() {
        return ParseNode::leaf("pr_vec_empty", "");
    }
    let elems: Vec<ParseNode> =
        items.into_iter().map(|e| ParseNode::branch("vector_element", vec![e])).collect();
    ParseNode::branch("pr_vec_elems", vec![ParseNode::branch("vector_elements", elems)])
}

pub fn range2(start: ParseNode, end: ParseNode) -> ParseNode {
    ParseNode::branch("pr_for2", vec![start, end])
}

pub fn range3(start: ParseNode, step: ParseNode, end: ParseNode) -> ParseNode {
    ParseNode::branch("pr_for3", vec![start, step, end])
}

fn op(text: &str) -> ParseNode {
    ParseNode::leaf("op", text)
}

pub fn addition(lhs: ParseNode, op_text: &str, rhs: ParseNode) -> ParseNode {
    ParseNode::branch("addition", vec![lhs, op(op_text), rhs])
}

pub fn multiplication(lhs: ParseNode, op_text: &str, rhs: ParseNode) -> ParseNode {
    ParseNode::branch("multiplication", vec![lhs, op(op_text), rhs])
}

/// A positional `argument`: `[expr]`.
pub fn pos_arg(expr: ParseNode) -> ParseNode {
    ParseNode::branch("argument", vec![expr])
}

/// A keyword `argument`: `[ident, expr]`.
pub fn kw_arg(name: &str, expr: ParseNode) -> ParseNode {
    ParseNode::branch("argument", vec![ident(name), expr])
}

fn arguments(args: Vec<ParseNode>) -> ParseNode {
    ParseNode::branch("arguments", vec![ParseNode::branch("argument_list", args)])
}

fn parameters(names: &[&str]) -> ParseNode {
    let params: Vec<ParseNode> =
        names.iter().map(|n| ParseNode::branch("parameter", vec![ident(n)])).collect();
    ParseNode::branch("parameters", vec![ParseNode::branch("parameter_list", params)])
}

/// `mod_call`: `[ident, arguments?]`.
fn mod_call(name: &str, args: Vec<ParseNode>) -> ParseNode {
    ParseNode::branch("mod_call", vec![ident(name), arguments(args)])
}

/// `module_instantiation` wrapping a bare `mod_call` plus whatever child
/// content follows it -- the one building block every statement-position and
/// chained-call-position call in these trees is made of.
pub fn modinst(name: &str, args: Vec<ParseNode>, child: Child) -> ParseNode {
    let call = mod_call(name, args);
    let inst_child = match child {
        Child::None => ParseNode::branch("mod_inst_child", vec![call]),
        Child::Block(stmts) if stmts.is_empty() => {
            ParseNode::branch("mod_inst_child", vec![call, ParseNode::leaf("no_child", "")])
        }
        Child::Block(stmts) => {
            let explicit = ParseNode::branch(
                "explicit_child",
                vec![ParseNode::branch("child_statements", stmts)],
            );
            ParseNode::branch("mod_inst_child", vec![call, explicit])
        }
        Child::Chain(next) => ParseNode::branch("mod_inst_child", vec![call, next]),
    };
    ParseNode::branch("module_instantiation", vec![inst_child])
}

/// A module-call statement: `stmt_obj` wrapping [`modinst`].
pub fn call_stmt(name: &str, args: Vec<ParseNode>, child: Child) -> ParseNode {
    ParseNode::branch("stmt_obj", vec![modinst(name, args, child)])
}

/// `assignment`: `[ident, expr]`.
pub fn assignment(name: &str, expr: ParseNode) -> ParseNode {
    ParseNode::branch("assignment", vec![ident(name), expr])
}

/// `named_result`: `[ident, module_instantiation]`.
pub fn named_result(name: &str, call: &str, args: Vec<ParseNode>) -> ParseNode {
    ParseNode::branch("named_result", vec![ident(name), modinst(call, args, Child::None)])
}

/// `stmt_decl_mod`: `[ident, parameters?, stmt_list]`.
pub fn mod_decl(name: &str, params: &[&str], body: Vec<ParseNode>) -> ParseNode {
    let stmt_list = ParseNode::branch("stmt_list", body);
    if params.is_empty() {
        ParseNode::branch("stmt_decl_mod", vec![ident(name), stmt_list])
    } else {
        ParseNode::branch("stmt_decl_mod", vec![ident(name), parameters(params), stmt_list])
    }
}

/// `stmt_decl_fn`: `[ident, parameters?, expr]`.
pub fn fn_decl(name: &str, params: &[&str], body: ParseNode) -> ParseNode {
    if params.is_empty() {
        ParseNode::branch("stmt_decl_fn", vec![ident(name), body])
    } else {
        ParseNode::branch("stmt_decl_fn", vec![ident(name), parameters(params), body])
    }
}

/// A bare-name function-call expression: `call` -> `[primary(ident), add_args([arguments?])]`.
pub fn fn_call_expr(name: &str, args: Vec<ParseNode>) -> ParseNode {
    let primary = ParseNode::branch("primary", vec![ident(name)]);
    let add_args = ParseNode::branch("add_args", vec![arguments(args)]);
    ParseNode::branch("call", vec![primary, add_args])
}
