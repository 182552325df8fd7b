//! `DynamicScope`: one live instance per lexical `StaticScope` entered during
//! evaluation, plus one per module/function call frame.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Params;
use crate::config::FxHashMap;
use crate::error::{EvalAltError, EvalResult};
use crate::static_env::{ChildBlock, StaticScope};
use crate::value::Value;

/// Lazy-binding state for a single name in a scope's `values` map.
///
/// Absence from the map means "unevaluated" (spec's third `EvalState`
/// member): the static expression has not been demanded yet. `InProgress`
/// is written before recursing into the defining expression so a
/// self-referential read is caught rather than looping forever.
#[derive(Debug, Clone)]
pub enum EvalState<S> {
    InProgress,
    Evaluated(Value<S>),
}

/// Memoization slot for one `children(i)` index.
///
/// `None` means "not built yet"; `Some(None)` means "built, and evaluates to
/// nothing" (e.g. a `*`-disabled child) -- the two must stay distinguishable
/// or repeated `children(i)` calls would rebuild a legitimately-empty child
/// every time.
pub type ChildCacheSlot<S> = Option<Option<Value<S>>>;

/// A node of the runtime scope tree.
///
/// Two parent pointers, matching the two resolution rules the source
/// language needs (spec §4.2):
/// - `lexical_parent` walks the *static* nesting -- ordinary (non-`$`)
///   names resolve only along this chain.
/// - `caller` walks the *call* chain -- `$`-prefixed names and `children()`
///   resolve along this chain first, falling back to the lexical chain only
///   if no caller binds the name.
pub struct DynamicScope<S> {
    pub static_scope: Rc<StaticScope>,
    pub lexical_parent: Option<Rc<DynamicScope<S>>>,
    pub caller: Option<Rc<DynamicScope<S>>>,
    values: RefCell<FxHashMap<String, EvalState<S>>>,
    /// Declared parameter defaults for this call frame, consulted (lazily,
    /// like any other var) when a bound parameter has no explicit value
    /// (spec §4.4 step 1: defaults stay unevaluated until first read). Only
    /// set on the `DynamicScope` created for a function/module call.
    pub param_defaults: Option<Rc<Params>>,
    /// The child block captured at this scope's invocation site, if any
    /// (absent for the top-level root and for childless module calls).
    pub child: Option<ChildBlock>,
    child_cache: RefCell<Vec<ChildCacheSlot<S>>>,
}

impl<S> DynamicScope<S> {
    pub fn new(
        static_scope: Rc<StaticScope>,
        lexical_parent: Option<Rc<DynamicScope<S>>>,
        caller: Option<Rc<DynamicScope<S>>>,
        child: Option<ChildBlock>,
    ) -> Rc<Self> {
        Self::with_params(static_scope, lexical_parent, caller, child, None)
    }

    pub fn with_params(
        static_scope: Rc<StaticScope>,
        lexical_parent: Option<Rc<DynamicScope<S>>>,
        caller: Option<Rc<DynamicScope<S>>>,
        child: Option<ChildBlock>,
        param_defaults: Option<Rc<Params>>,
    ) -> Rc<Self> {
        let n = child.as_ref().map_or(0, ChildBlock::len);
        Rc::new(Self {
            static_scope,
            lexical_parent,
            caller,
            values: RefCell::new(FxHashMap::default()),
            param_defaults,
            child,
            child_cache: RefCell::new(vec![None; n]),
        })
    }

    /// Look at (without starting) the current binding state for a name
    /// declared *in this scope's own `values` map* (callers walk the chain
    /// themselves; this never looks at `lexical_parent`).
    pub fn peek_local(&self, name: &str) -> Option<EvalResult<Value<S>>>
    where
        S: Clone,
    {
        match self.values.borrow().get(name) {
            Some(EvalState::Evaluated(v)) => Some(Ok(v.clone())),
            Some(EvalState::InProgress) => {
                Some(Err(EvalAltError::RecursiveVariable(name.to_string())))
            }
            None => None,
        }
    }

    /// Mark `name` as being evaluated, to catch direct or indirect
    /// self-reference in its defining expression.
    pub fn begin_local(&self, name: &str) {
        self.values.borrow_mut().insert(name.to_string(), EvalState::InProgress);
    }

    pub fn finish_local(&self, name: &str, value: Value<S>) {
        self.values.borrow_mut().insert(name.to_string(), EvalState::Evaluated(value));
    }

    /// Remove a stale `InProgress` marker after its defining expression
    /// failed, so the name is free to be retried rather than permanently
    /// reporting a recursive-variable error for an unrelated later read.
    pub fn clear_local(&self, name: &str) {
        self.values.borrow_mut().remove(name);
    }

    /// True if this scope's own static vars declare `name` (i.e. this is
    /// where resolution should stop descending the lexical chain, whether
    /// or not the value has been forced yet).
    pub fn declares(&self, name: &str) -> bool {
        self.static_scope.vars.borrow().contains_key(name)
    }

    /// The expression that produces `name`'s value when read for the first
    /// time in this scope: its own assignment if the static scope declares
    /// one, else its parameter default.
    pub fn defining_expr(&self, name: &str) -> Option<std::rc::Rc<crate::ast::ParseNode>> {
        if let Some(e) = self.static_scope.vars.borrow().get(name) {
            return Some(Rc::clone(e));
        }
        self.param_defaults.as_ref()?.defaults.get(name).cloned()
    }

    pub fn children_len(&self) -> usize {
        self.child.as_ref().map_or(0, ChildBlock::len)
    }

    pub fn cached_child(&self, index: usize) -> ChildCacheSlot<S>
    where
        S: Clone,
    {
        match self.child_cache.borrow().get(index) {
            Some(slot) => slot.clone(),
            None => None,
        }
    }

    pub fn cache_child(&self, index: usize, value: Option<Value<S>>) {
        if let Some(slot) = self.child_cache.borrow_mut().get_mut(index) {
            *slot = Some(value);
        }
    }
}
