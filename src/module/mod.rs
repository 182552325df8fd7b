//! `BuiltinRegistry`: the function/module tables a [`crate::Interpreter`]
//! consults once the static chain has no user-defined name. This crate's
//! builtin surface is fixed and registered by hand in `crate::packages`
//! rather than generated from annotated functions.

use crate::config::FxHashMap;
use crate::func::native::{BuiltinSignature, NativeFunc, NativeModule};
use crate::kernel::Kernel;

pub struct BuiltinRegistry<K: Kernel> {
    funcs: FxHashMap<String, (BuiltinSignature, NativeFunc<K>)>,
    mods: FxHashMap<String, (BuiltinSignature, NativeModule<K>)>,
}

impl<K: Kernel> Default for BuiltinRegistry<K> {
    fn default() -> Self {
        Self { funcs: FxHashMap::default(), mods: FxHashMap::default() }
    }
}

impl<K: Kernel> BuiltinRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_fn(&mut self, name: &str, sig: BuiltinSignature, f: NativeFunc<K>) {
        self.funcs.insert(name.to_string(), (sig, f));
    }

    pub fn register_mod(&mut self, name: &str, sig: BuiltinSignature, f: NativeModule<K>) {
        self.mods.insert(name.to_string(), (sig, f));
    }

    pub fn lookup_fn(&self, name: &str) -> Option<(&BuiltinSignature, &NativeFunc<K>)> {
        self.funcs.get(name).map(|(s, f)| (s, f))
    }

    pub fn lookup_mod(&self, name: &str) -> Option<(&BuiltinSignature, &NativeModule<K>)> {
        self.mods.get(name).map(|(s, f)| (s, f))
    }

    pub fn has_mod(&self, name: &str) -> bool {
        self.mods.contains_key(name)
    }

    pub fn has_fn(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }
}
