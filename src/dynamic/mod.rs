//! Dynamic (runtime) scopes -- the second pass over the work produced by
//! [`crate::static_env`] (spec §3 "DynamicScope", §4.2/§4.3).

mod scope;

pub use scope::{ChildCacheSlot, DynamicScope, EvalState};
