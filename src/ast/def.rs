//! Function and module definitions (spec §3 "FunctionDef / ModuleDef").

use std::rc::{Rc, Weak};

use crate::ast::ParseNode;
use crate::config::FxHashMap;
use crate::error::{EvalAltError, EvalResult};
use crate::static_env::StaticScope;

/// Positional parameter names plus default-value expressions, shared by
/// functions and modules (spec §4.4 argument binding walks this).
#[derive(Debug, Default)]
pub struct Params {
    pub positional: Vec<String>,
    pub defaults: FxHashMap<String, Rc<ParseNode>>,
}

impl Params {
    /// Parse a `parameters` node (`parameters -> parameter_list ->
    /// parameter*`, see `ast::node`'s module doc for the exact shape).
    ///
    /// Shared by static `function`/`module` declarations and the dynamic
    /// `expr_fn` (anonymous function literal) rule -- both hand it the same
    /// node shape.
    pub fn from_node(node: &ParseNode) -> EvalResult<Self> {
        let list = node.child(0).ok_or_else(|| {
            EvalAltError::arity(node, "a parameter_list child")
        })?;
        let mut params = Self::default();
        for p in &list.children {
            let name_node = p.child(0).ok_or_else(|| {
                EvalAltError::arity(p, "at least an identifier child")
            })?;
            let name = name_node.value.clone();
            if p.children.len() >= 2 {
                params.defaults.insert(name.clone(), Rc::new(p.children[1].clone()));
            }
            params.positional.push(name);
        }
        Ok(params)
    }
}

/// `function name(params) = expr;`
#[derive(Debug)]
pub struct FunctionDef {
    pub name: String,
    pub params: Params,
    pub body: Rc<ParseNode>,
    /// The scope functions/variables referenced by the body resolve
    /// against -- the scope the `function` was declared in, not the
    /// caller's.
    pub defining_scope: Weak<StaticScope>,
}

/// `module name(params) <body>`
#[derive(Debug)]
pub struct ModuleDef {
    pub name: String,
    pub params: Params,
    pub body: Rc<StaticScope>,
    pub defining_scope: Weak<StaticScope>,
}
