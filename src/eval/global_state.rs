//! State threaded by `&mut` through every `eval`/`build` call, rather than
//! kept in a thread-local: the call-nesting counter lives here rather than
//! on `Interpreter` since it's unique to one evaluation run, not the
//! long-lived interpreter instance.

use std::rc::Rc;

use crate::config::{FxHashMap, Options};
use crate::dynamic::DynamicScope;
use crate::error::Warning;
use crate::static_env::StaticScope;
use crate::trace::{HandleInterner, TraceEvent};

/// Per-evaluation-run state: the call-depth guard, the sinks builtins use to
/// report non-fatal events (spec §7 warnings, `echo()`, §6 `$trace`), and the
/// cache of "lexical identity" dynamic scopes described in
/// [`crate::eval::stmt::lexical_scope_for`].
///
/// Generic over the kernel's `Shape` (rather than over the whole `Kernel`)
/// so the lexical-scope cache can hold `DynamicScope<Shape>` without pulling
/// `EvalContext`'s `Kernel` bound in here too.
pub struct GlobalState<'a, S> {
    pub options: Options,
    pub call_depth: usize,
    pub interner: HandleInterner,
    pub(crate) lexical_envs: std::cell::RefCell<FxHashMap<usize, Rc<DynamicScope<S>>>>,
    on_warning: Option<Box<dyn FnMut(Warning) + 'a>>,
    on_echo: Option<Box<dyn FnMut(&str) + 'a>>,
    on_trace: Option<Box<dyn FnMut(TraceEvent) + 'a>>,
}

impl<'a, S> GlobalState<'a, S> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            call_depth: 0,
            interner: HandleInterner::default(),
            lexical_envs: std::cell::RefCell::new(FxHashMap::default()),
            on_warning: None,
            on_echo: None,
            on_trace: None,
        }
    }

    pub fn set_warning_sink(&mut self, f: impl FnMut(Warning) + 'a) {
        self.on_warning = Some(Box::new(f));
    }

    pub fn set_echo_sink(&mut self, f: impl FnMut(&str) + 'a) {
        self.on_echo = Some(Box::new(f));
    }

    pub fn set_trace_sink(&mut self, f: impl FnMut(TraceEvent) + 'a) {
        self.on_trace = Some(Box::new(f));
    }

    pub fn warn(&mut self, w: Warning) {
        if let Some(sink) = self.on_warning.as_mut() {
            sink(w);
        }
    }

    pub fn echo(&mut self, msg: &str) {
        if let Some(sink) = self.on_echo.as_mut() {
            sink(msg);
        }
    }

    pub fn trace(&mut self, event: TraceEvent) {
        if let Some(sink) = self.on_trace.as_mut() {
            sink(event);
        }
    }

    /// The cached lexical-identity scope for `static_scope`, if one has been
    /// built already during this run.
    pub(crate) fn cached_lexical_env(&self, static_scope: &Rc<StaticScope>) -> Option<Rc<DynamicScope<S>>> {
        let key = Rc::as_ptr(static_scope) as usize;
        self.lexical_envs.borrow().get(&key).cloned()
    }

    pub(crate) fn cache_lexical_env(&self, static_scope: &Rc<StaticScope>, scope: Rc<DynamicScope<S>>) {
        let key = Rc::as_ptr(static_scope) as usize;
        self.lexical_envs.borrow_mut().insert(key, scope);
    }
}
