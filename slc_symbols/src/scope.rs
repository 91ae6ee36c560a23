//! The scope tree built by the symbol collector and walked by every
//! later phase. Scopes are created once during collection and never
//! mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::symbol::SymbolEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(u32);

#[derive(Debug, Clone, Default)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, SymbolEntry>,
}

/// Tree of scopes rooted at a single global scope, plus a lookup that
/// walks the parent chain the way nested block/function scoping
/// requires.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    global: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        let scopes = vec![Scope::default()];
        Self {
            scopes,
            global: ScopeId(0),
        }
    }

    pub fn global(&self) -> ScopeId {
        self.global
    }

    /// Creates a new child scope of `parent` and returns its id.
    pub fn push_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            symbols: HashMap::new(),
        });
        id
    }

    /// Binds `entry` in `scope`. Returns the entry already bound under
    /// that name in `scope` (not any ancestor) if one exists, leaving
    /// the table unchanged so the caller can report a duplicate.
    pub fn declare(&mut self, scope: ScopeId, entry: SymbolEntry) -> Result<(), SymbolEntry> {
        let s = &mut self.scopes[scope.0 as usize];
        if let Some(existing) = s.symbols.get(&entry.name) {
            return Err(existing.clone());
        }
        s.symbols.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Looks up `name` starting at `scope` and walking up the parent
    /// chain to the global scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if let Some(entry) = s.symbols.get(name) {
                return Some(entry);
            }
            current = s.parent;
        }
        None
    }

    /// Looks up `name` in `scope` only, ignoring ancestors. Used by
    /// duplicate-declaration checks.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        self.scopes[scope.0 as usize].symbols.get(name)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
