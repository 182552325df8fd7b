//! `EvalContext`: what a running evaluation needs at every call site --
//! the kernel/registry (read-only, lives as long as the `Interpreter`) and
//! the per-run [`GlobalState`] (mutable, unique to one `build`/`eval_source`
//! call). Threaded explicitly through `eval::expr`/`eval::stmt` rather than
//! hung off a thread-local.

use crate::eval::global_state::GlobalState;
use crate::interpreter::Interpreter;
use crate::kernel::Kernel;

pub struct EvalContext<'a, 'g, K: Kernel> {
    pub interp: &'a Interpreter<K>,
    pub global: &'a mut GlobalState<'g, K::Shape>,
}

impl<'a, 'g, K: Kernel> EvalContext<'a, 'g, K> {
    pub fn new(interp: &'a Interpreter<K>, global: &'a mut GlobalState<'g, K::Shape>) -> Self {
        Self { interp, global }
    }

    pub fn reborrow(&mut self) -> EvalContext<'_, 'g, K> {
        EvalContext { interp: self.interp, global: self.global }
    }
}
