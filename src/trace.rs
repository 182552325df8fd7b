//! Kernel-operation tracing (spec §6: "when `$trace` is truthy, every
//! kernel operation is echoed to the trace sink as a labeled assignment;
//! handle ids are interned so repeated appearances share a name").

use std::cell::RefCell;
use std::rc::Rc;

/// One kernel operation, as reported to [`crate::eval::GlobalState::trace`].
#[derive(Debug, Clone)]
pub struct TraceEvent {
    /// The interned name assigned to the shape this operation produced.
    pub result: String,
    /// The kernel method invoked (`"cube"`, `"union"`, `"translate"`, ...).
    pub op: String,
    /// Interned names of the shapes consumed, in argument order.
    pub operands: Vec<String>,
}

/// Assigns a stable, reused name to each shape handle the kernel produces,
/// keyed by the handle's `Rc` allocation identity.
///
/// Grounded on spec §6's "handle ids are interned so repeated appearances
/// share a name": a `Shape` that reappears as an argument to a later
/// operation (e.g. a child reused by both `union` and `translate`) must
/// trace under the same name both times.
pub struct HandleInterner {
    next: RefCell<usize>,
    seen: RefCell<Vec<(usize, String)>>,
}

impl Default for HandleInterner {
    fn default() -> Self {
        Self { next: RefCell::new(0), seen: RefCell::new(Vec::new()) }
    }
}

impl HandleInterner {
    pub fn name_for<S>(&self, handle: &Rc<S>) -> String {
        let addr = Rc::as_ptr(handle) as usize;
        if let Some((_, name)) = self.seen.borrow().iter().find(|(a, _)| *a == addr) {
            return name.clone();
        }
        let mut next = self.next.borrow_mut();
        let name = format!("s{next}");
        *next += 1;
        self.seen.borrow_mut().push((addr, name.clone()));
        name
    }
}
