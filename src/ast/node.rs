//! The parse-tree contract (spec §3, §6).
//!
//! `ParseNode` is the opaque product the external PEG parser hands to this
//! crate. `NodeKind` is the tagged-variant view of its `kind` string the
//! design notes call for: dispatch on `NodeKind` is an exhaustive match, and
//! an unrecognized `kind` string becomes a single, explicit conversion
//! failure at the boundary rather than a `match` arm repeated in every rule
//! table.
//!
//! Shape, by kind (punctuation tokens are not represented as children --
//! only semantically meaningful nodes are):
//!
//! - `Input`: children = `statement*`, `Eof`.
//! - `statement`: exactly one child, one of the statement-level kinds.
//! - `assignment` / `named_result`: `[ident, expr]` (`named_result` takes
//!   a `module_instantiation` in place of `expr`; it's the one kind this
//!   crate adds beyond the parser contract it was handed, see SPEC_FULL.md).
//! - `stmt_decl_fn`: `[ident, parameters?, expr]` (2 or 3 children).
//! - `stmt_decl_mod`: `[ident, parameters?, statement]` (2 or 3 children).
//! - `stmt_obj`: one child (`module_instantiation` or `stmt_list`).
//! - `stmt_list`: children = `statement*` (a bare `{ }` block).
//! - `Include` / `Use`: leaf, `value` = the referenced path.
//! - `ifelse_statement`: `[expr, statement, statement?]`.
//! - `module_instantiation`: one child, one of `mod_inst_bang/hash/perc/star`
//!   or `mod_inst_child`.
//! - `mod_inst_bang/hash/perc/star`: one child, a nested `module_instantiation`
//!   (modifiers can stack, e.g. `#!foo();`).
//! - `mod_inst_child`: `[mod_call, child_statement?]`.
//! - `mod_call`: `[ident, arguments?]`.
//! - `child_statement`: one child, one of `no_child`, `explicit_child`, or a
//!   nested `module_instantiation` (chained call with no braces).
//! - `no_child`: leaf, no children (statement ended with `;`).
//! - `explicit_child`: one child, `child_statements`.
//! - `child_statements`: children = `child_statement*`.
//! - `parameters`: one child, `parameter_list`; `parameter_list`: children =
//!   `parameter*`; `parameter`: `[ident]` or `[ident, expr]` (default).
//! - `arguments`/`argument_list`/`argument` mirror the parameter shapes,
//!   with `argument` being `[expr]` (positional) or `[ident, expr]` (named).
//! - Binary operator chains (`logic_or`, `logic_and`, `equality`,
//!   `comparison`, `addition`, `multiplication`, `exponent`): children
//!   alternate `operand, op, operand, op, operand, ...` where `op` is a leaf
//!   whose `value` is the operator text; a lone operand with no `op`
//!   children is just that operand.
//! - `unary`: `[op?, operand]`.
//! - `call`: `[primary, postfix*]` where each postfix is `add_args` (call,
//!   `[arguments?]`) or `add_index` (indexing, `[expr]`).
//! - `primary`/`expr`/`vector_element`: single-child descend wrappers.
//! - `pr_Num`/`pr_Sym`/`pr_Str`: leaves.
//! - `pr_true`/`pr_false`/`pr_undef`: leaves, no value needed.
//! - `pr_paren`: one child, the parenthesized `expr`.
//! - `pr_vec_empty`: leaf. `pr_vec_elems`: one child, `vector_elements`;
//!   `vector_elements`: children = `vector_element*`.
//! - `pr_for2`: `[start, end]`. `pr_for3`: `[start, step, end]`.
//! - `expr_fn`: `[parameters?, expr]` (an anonymous `function` literal).
//! - `fn_call`: like `call` but where `primary` is statically known to name
//!   a user/builtin function rather than a variable holding a `FunctionRef`.

use std::fmt;

/// A single node of the external parser's output tree.
///
/// Leaves carry `value`; non-leaves carry `children`. Both fields are always
/// present on the struct (a leaf simply has an empty `children`) because the
/// external grammar does not distinguish the two at the type level either.
#[derive(Debug, Clone)]
pub struct ParseNode {
    pub kind: String,
    pub value: String,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn leaf(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self { kind: kind.into(), value: value.into(), children: Vec::new() }
    }

    pub fn branch(kind: impl Into<String>, children: Vec<ParseNode>) -> Self {
        Self { kind: kind.into(), value: String::new(), children }
    }

    /// Resolve this node's `kind` string to the closed [`NodeKind`] enum.
    pub fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_str(&self.kind)
    }

    pub fn child(&self, i: usize) -> Option<&ParseNode> {
        self.children.get(i)
    }
}

/// The closed set of parse-node kinds this crate's static and dynamic rule
/// tables handle (spec §6's "non-exhaustive list of kinds whose handlers are
/// required" -- closed here because this crate targets exactly that list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NodeKind {
    Input,
    Statement,
    StmtObj,
    StmtList,
    StmtDeclFn,
    StmtDeclMod,
    Assignment,
    /// `name = <module_instantiation>;` -- this crate's supplemented named
    /// top-level result marker (SPEC_FULL.md §4 "Named top-level results").
    NamedResult,
    ModuleInstantiation,
    ModCall,
    ModInstChild,
    ModInstBang,
    ModInstHash,
    ModInstPerc,
    ModInstStar,
    NoChild,
    ExplicitChild,
    ChildStatement,
    ChildStatements,
    IfElseStatement,
    Include,
    Use,
    Expr,
    ExprCase,
    LogicOr,
    LogicAnd,
    Equality,
    Comparison,
    Addition,
    Multiplication,
    Unary,
    Exponent,
    Call,
    AddArgs,
    AddIndex,
    Arguments,
    ArgumentList,
    Argument,
    Parameters,
    ParameterList,
    Parameter,
    Primary,
    PrNum,
    PrSym,
    PrStr,
    PrTrue,
    PrFalse,
    PrUndef,
    PrParen,
    PrVecEmpty,
    PrVecElems,
    VectorElements,
    VectorElement,
    PrFor2,
    PrFor3,
    ExprFn,
    FnCall,
    Eof,
}

impl NodeKind {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "Input" => Self::Input,
            "statement" => Self::Statement,
            "stmt_obj" => Self::StmtObj,
            "stmt_list" => Self::StmtList,
            "stmt_decl_fn" => Self::StmtDeclFn,
            "stmt_decl_mod" => Self::StmtDeclMod,
            "assignment" => Self::Assignment,
            "named_result" => Self::NamedResult,
            "module_instantiation" => Self::ModuleInstantiation,
            "mod_call" => Self::ModCall,
            "mod_inst_child" => Self::ModInstChild,
            "mod_inst_bang" => Self::ModInstBang,
            "mod_inst_hash" => Self::ModInstHash,
            "mod_inst_perc" => Self::ModInstPerc,
            "mod_inst_star" => Self::ModInstStar,
            "no_child" => Self::NoChild,
            "explicit_child" => Self::ExplicitChild,
            "child_statement" => Self::ChildStatement,
            "child_statements" => Self::ChildStatements,
            "ifelse_statement" => Self::IfElseStatement,
            "Include" => Self::Include,
            "Use" => Self::Use,
            "expr" => Self::Expr,
            "expr_case" => Self::ExprCase,
            "logic_or" => Self::LogicOr,
            "logic_and" => Self::LogicAnd,
            "equality" => Self::Equality,
            "comparison" => Self::Comparison,
            "addition" => Self::Addition,
            "multiplication" => Self::Multiplication,
            "unary" => Self::Unary,
            "exponent" => Self::Exponent,
            "call" => Self::Call,
            "add_args" => Self::AddArgs,
            "add_index" => Self::AddIndex,
            "arguments" => Self::Arguments,
            "argument_list" => Self::ArgumentList,
            "argument" => Self::Argument,
            "parameters" => Self::Parameters,
            "parameter_list" => Self::ParameterList,
            "parameter" => Self::Parameter,
            "primary" => Self::Primary,
            "pr_Num" => Self::PrNum,
            "pr_Sym" => Self::PrSym,
            "pr_Str" => Self::PrStr,
            "pr_true" => Self::PrTrue,
            "pr_false" => Self::PrFalse,
            "pr_undef" => Self::PrUndef,
            "pr_paren" => Self::PrParen,
            "pr_vec_empty" => Self::PrVecEmpty,
            "pr_vec_elems" => Self::PrVecElems,
            "vector_elements" => Self::VectorElements,
            "vector_element" => Self::VectorElement,
            "pr_for2" => Self::PrFor2,
            "pr_for3" => Self::PrFor3,
            "expr_fn" => Self::ExprFn,
            "fn_call" => Self::FnCall,
            "EOF" => Self::Eof,
            _ => return None,
        })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
