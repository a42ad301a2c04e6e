//! Session-wide cache of module command sets, keyed by step name.
//!
//! Append-only: a module's command set is assumed immutable for the life of
//! the panel, so entries are never replaced, evicted or refreshed.

use std::collections::HashMap;

use crate::scenario::Module;

#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: HashMap<String, Module>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Store `module` under `name` unless an entry already exists, and
    /// return the cached entry.
    pub fn insert(&mut self, name: String, module: Module) -> &Module {
        self.modules.entry(name).or_insert(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
