//! Lexical scope tree.
//!
//! Scopes live in a flat arena and point at their parents by id, so the
//! tree carries no ownership cycles. Symbol tables are insertion-ordered;
//! within one scope identifier names are unique, while shadowing across
//! parent scopes is permitted and resolved at lookup time.

use indexmap::IndexMap;

use super::symbol::Symbol;

/// Handle to a scope in the [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Class,
    Function,
    Block,
}

#[derive(Debug, Clone)]
pub struct ScopeData {
    pub name: String,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    symbols: IndexMap<String, Symbol>,
}

impl ScopeData {
    pub fn symbols(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Flat storage for the whole scope tree; index 0 is the global scope.
#[derive(Debug, Clone)]
pub struct ScopeArena {
    scopes: Vec<ScopeData>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                name: "::global::".into(),
                kind: ScopeKind::Global,
                parent: None,
                symbols: IndexMap::new(),
            }],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn alloc(
        &mut self,
        name: impl Into<String>,
        kind: ScopeKind,
        parent: ScopeId,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            name: name.into(),
            kind,
            parent: Some(parent),
            symbols: IndexMap::new(),
        });
        id
    }

    pub fn get(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.index()]
    }

    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.get(id).kind
    }

    /// Used by the type checker when a pre-collected function scope is
    /// re-entered under the block scope that lexically contains it.
    pub fn set_parent(&mut self, id: ScopeId, parent: ScopeId) {
        self.scopes[id.index()].parent = Some(parent);
    }

    /// Declares locally. Returns `false` if the name already exists in this
    /// scope (the existing symbol wins).
    pub fn declare(&mut self, id: ScopeId, symbol: Symbol) -> bool {
        let table = &mut self.scopes[id.index()].symbols;
        if table.contains_key(symbol.name()) {
            return false;
        }
        table.insert(symbol.name().to_string(), symbol);
        true
    }

    pub fn resolve_local(&self, id: ScopeId, name: &str) -> Option<&Symbol> {
        self.get(id).symbols.get(name)
    }

    /// Walks the scope chain outward; shadowing resolves to the innermost hit.
    pub fn resolve(&self, id: ScopeId, name: &str) -> Option<&Symbol> {
        self.resolve_with_scope(id, name).map(|(symbol, _)| symbol)
    }

    /// Like [`Self::resolve`], also reporting the scope that held the hit.
    pub fn resolve_with_scope(&self, id: ScopeId, name: &str) -> Option<(&Symbol, ScopeId)> {
        let mut current = Some(id);
        while let Some(scope) = current {
            if let Some(symbol) = self.get(scope).symbols.get(name) {
                return Some((symbol, scope));
            }
            current = self.get(scope).parent;
        }
        None
    }

    /// Mutable access to a locally declared symbol.
    pub fn symbol_mut(&mut self, id: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes[id.index()].symbols.get_mut(name)
    }

    /// Mutable access through the scope chain.
    pub fn resolve_mut(&mut self, id: ScopeId, name: &str) -> Option<&mut Symbol> {
        let (_, scope) = self.resolve_with_scope(id, name)?;
        self.symbol_mut(scope, name)
    }
}
