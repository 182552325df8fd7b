//! `StaticScope` and the work-item list (spec §3).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::ast::{FunctionDef, ModuleDef, ParseNode};
use crate::config::FxHashMap;

/// The child block captured by a `ParentStatement` -- either a brace-block
/// lowered into its own scope (so `children(i)` can address individual
/// sub-items) or a single sub-invocation (itself possibly a chain, e.g.
/// `translate(v) rotate(a) cube();` chains three module calls through
/// nested single-statement child blocks).
#[derive(Debug, Clone)]
pub enum ChildBlock {
    Scope(Rc<StaticScope>),
    Statement(Rc<WorkItem>),
}

impl ChildBlock {
    /// Number of addressable children (spec §4.3: `$children`).
    pub fn len(&self) -> usize {
        match self {
            Self::Scope(s) => s.work.borrow().len(),
            Self::Statement(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A renderable unit in a static scope: a module invocation (with or
/// without a captured child block) or a brace-delimited block inlined into
/// the parent's work list.
#[derive(Debug, Clone)]
pub enum WorkItem {
    /// A module invocation without a child block.
    Statement(Rc<ParseNode>),
    /// A module invocation with a child block.
    ParentStatement(Rc<ParseNode>, ChildBlock),
    /// A brace-delimited block, inlined.
    Scope(Rc<StaticScope>),
    /// A top-level `name = <module_instantiation>;` marker (SPEC_FULL.md §4,
    /// "named top-level results").
    Named(String, Rc<ParseNode>),
    /// `if (guard) then_branch else else_branch?` -- both branches are
    /// lowered eagerly into their own scopes; which one runs is deferred to
    /// the dynamic pass (spec §4.1).
    Conditional(Rc<ParseNode>, Rc<StaticScope>, Option<Rc<StaticScope>>),
}

/// A lexically-scoped node mirroring the source's block structure.
///
/// Built incrementally during the static pass (the `RefCell`s are the
/// "builder" half of the lifecycle); once lowering for this scope completes
/// it is never mutated again, matching spec §3's "immutable after lowering
/// completes".
#[derive(Debug)]
pub struct StaticScope {
    pub parent: Option<Weak<StaticScope>>,
    pub vars: RefCell<FxHashMap<String, Rc<ParseNode>>>,
    pub funcs: RefCell<FxHashMap<String, Rc<FunctionDef>>>,
    pub mods: RefCell<FxHashMap<String, Rc<ModuleDef>>>,
    pub work: RefCell<Vec<WorkItem>>,
}

impl StaticScope {
    pub fn new(parent: Option<Weak<StaticScope>>) -> Rc<Self> {
        Rc::new(Self {
            parent,
            vars: RefCell::new(FxHashMap::default()),
            funcs: RefCell::new(FxHashMap::default()),
            mods: RefCell::new(FxHashMap::default()),
            work: RefCell::new(Vec::new()),
        })
    }

    /// Walk the `parent` chain looking up a variable's unevaluated
    /// expression node.
    pub fn lookup_var(self: &Rc<Self>, name: &str) -> Option<Rc<ParseNode>> {
        if let Some(v) = self.vars.borrow().get(name) {
            return Some(Rc::clone(v));
        }
        self.parent.as_ref()?.upgrade()?.lookup_var(name)
    }

    pub fn lookup_func(self: &Rc<Self>, name: &str) -> Option<Rc<FunctionDef>> {
        if let Some(v) = self.funcs.borrow().get(name) {
            return Some(Rc::clone(v));
        }
        self.parent.as_ref()?.upgrade()?.lookup_func(name)
    }

    pub fn lookup_mod(self: &Rc<Self>, name: &str) -> Option<Rc<ModuleDef>> {
        if let Some(v) = self.mods.borrow().get(name) {
            return Some(Rc::clone(v));
        }
        self.parent.as_ref()?.upgrade()?.lookup_mod(name)
    }
}
