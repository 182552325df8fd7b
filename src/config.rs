//! Crate-wide configuration knobs.
//!
//! Swap the default hasher for `ahash` everywhere a symbol table is keyed by
//! name, since every lookup in the static/dynamic scope chains is on the hot
//! path of evaluation.

use std::collections::HashMap;

/// Hash map keyed by identifier, using `ahash` instead of `SipHash`.
pub type FxHashMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Runtime options for an [`crate::Interpreter`].
///
/// Grounded on the `MainEnv` defaults in `openscadq/work.py` and spec §6's
/// "Default `$`-variables" table.
#[derive(Debug, Clone)]
pub struct Options {
    pub default_fn: f64,
    pub default_fa: f64,
    pub default_fs: f64,
    pub default_t: f64,
    pub default_preview: bool,
    pub default_trace: bool,
    /// Recursion-depth guard for function/module calls (ambient safety
    /// limit, not an SDL-level feature -- see SPEC_FULL.md §2.3/§4).
    pub max_call_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_fn: 999.0,
            default_fa: 0.001,
            default_fs: 0.001,
            default_t: 0.0,
            default_preview: false,
            default_trace: false,
            max_call_depth: 512,
        }
    }
}
