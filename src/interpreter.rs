//! The public entry point (spec §2 item 6, SPEC_FULL.md §1): an
//! `Interpreter` owning the built-in registry and exposing the preload and
//! event-callback hooks that let an embedder customize a run without
//! touching the core.

use crate::ast::ParseNode;
use crate::config::Options;
use crate::dynamic::DynamicScope;
use crate::error::{EvalResult, Warning};
use crate::eval::context::EvalContext;
use crate::eval::global_state::GlobalState;
use crate::eval::stmt::{build, BuildResult};
use crate::func::native::{BuiltinSignature, NativeFunc, NativeModule};
use crate::kernel::Kernel;
use crate::module::BuiltinRegistry;
use crate::static_env::{lower_program, IncludeResolver};
use crate::trace::TraceEvent;
use crate::value::Value;

/// The outcome of [`Interpreter::eval_source_named`]: the plain composite
/// union plus every top-level `name = <module_instantiation>;` result
/// (SPEC_FULL.md §4 "named top-level results").
pub type NamedResults<S> = BuildResult<S>;

/// The two-phase interpreter's entry point.
///
/// Generic over the geometry [`Kernel`] so the core never depends on a
/// concrete CSG/B-Rep crate (spec §1's explicit non-goal).
pub struct Interpreter<K: Kernel> {
    pub(crate) kernel: K,
    pub(crate) registry: BuiltinRegistry<K>,
    options: Options,
    on_warning: Option<Box<dyn Fn(Warning)>>,
    on_echo: Option<Box<dyn Fn(&str)>>,
    on_trace: Option<Box<dyn Fn(TraceEvent)>>,
}

impl<K: Kernel> Interpreter<K> {
    pub fn new(kernel: K) -> Self {
        Self::with_options(kernel, Options::default())
    }

    pub fn with_options(kernel: K, options: Options) -> Self {
        let mut registry = BuiltinRegistry::new();
        crate::packages::register_all(&mut registry);
        Self { kernel, registry, options, on_warning: None, on_echo: None, on_trace: None }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Register (or override) a built-in module (spec §6 "Preload hook").
    /// A same-named `module` declared in the evaluated source still wins --
    /// `eval_mod_call` only consults the registry once the static scope has
    /// no user definition for the name.
    pub fn preload_module(&mut self, name: &str, sig: BuiltinSignature, f: NativeModule<K>) -> &mut Self {
        self.registry.register_mod(name, sig, f);
        self
    }

    /// Register (or override) a built-in function; same precedence note as
    /// [`Self::preload_module`].
    pub fn preload_function(&mut self, name: &str, sig: BuiltinSignature, f: NativeFunc<K>) -> &mut Self {
        self.registry.register_fn(name, sig, f);
        self
    }

    /// Receive every non-fatal [`Warning`] raised during a run (spec §7).
    /// Unset by default: a no-op until registered.
    pub fn on_warning(&mut self, f: impl Fn(Warning) + 'static) -> &mut Self {
        self.on_warning = Some(Box::new(f));
        self
    }

    /// The target of the built-in `echo(...)` function (spec §6). This
    /// crate never prints directly; an embedder wires this to stdout or a
    /// log sink.
    pub fn on_echo(&mut self, f: impl Fn(&str) + 'static) -> &mut Self {
        self.on_echo = Some(Box::new(f));
        self
    }

    /// Receive a [`TraceEvent`] for every kernel operation performed while
    /// the dynamically-scoped `$trace` variable is truthy (spec §6).
    pub fn on_trace(&mut self, f: impl Fn(TraceEvent) + 'static) -> &mut Self {
        self.on_trace = Some(Box::new(f));
        self
    }

    fn new_global_state(&self) -> GlobalState<'_, K::Shape> {
        let mut global = GlobalState::new(self.options.clone());
        if let Some(f) = &self.on_warning {
            global.set_warning_sink(move |w| f(w));
        }
        if let Some(f) = &self.on_echo {
            global.set_echo_sink(move |s| f(s));
        }
        if let Some(f) = &self.on_trace {
            global.set_trace_sink(move |e| f(e));
        }
        global
    }

    fn run(&self, root: &ParseNode, resolver: &dyn IncludeResolver) -> EvalResult<BuildResult<K::Shape>> {
        let (root_scope, warnings) = lower_program(root, resolver)?;
        let mut global = self.new_global_state();
        for w in warnings {
            global.warn(w);
        }
        let dyn_scope = DynamicScope::new(root_scope, None, None, None);
        let mut ctx = EvalContext::new(self, &mut global);
        build(&mut ctx, &dyn_scope)
    }

    /// Lower `root` and evaluate it to the single composite solid: the union
    /// of every top-level renderable statement (spec §1/§4.3 `build`).
    pub fn eval_source(
        &self,
        root: &ParseNode,
        resolver: &dyn IncludeResolver,
    ) -> EvalResult<Option<Value<K::Shape>>> {
        Ok(self.run(root, resolver)?.union)
    }

    /// As [`Self::eval_source`], but also returns every top-level `name =
    /// <module_instantiation>;` result.
    pub fn eval_source_named(
        &self,
        root: &ParseNode,
        resolver: &dyn IncludeResolver,
    ) -> EvalResult<NamedResults<K::Shape>> {
        self.run(root, resolver)
    }
}
