//! Per-unit semantic tables.

use std::sync::Arc;

use pullc_common::Diagnostic;
use pullc_syntax::{NodeArena, NodeIndex};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::decl::DeclId;
use crate::symbols::SymbolId;

/// Index of a unit inside the semantic info chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub const NONE: UnitId = UnitId(u32::MAX);
}

/// AST ↔ Decl ↔ Symbol tables and binder diagnostics for one source unit.
#[derive(Debug)]
pub struct SemanticUnit {
    pub id: UnitId,
    pub path: String,
    pub arena: Arc<NodeArena>,
    pub root: NodeIndex,
    /// Root `Script` decl of the current collection of this unit.
    pub script_decl: DeclId,
    node_decls: FxHashMap<NodeIndex, DeclId>,
    node_symbols: FxHashMap<NodeIndex, SymbolId>,
    diagnostics: Vec<Diagnostic>,
}

impl SemanticUnit {
    pub fn new(id: UnitId, path: &str, arena: Arc<NodeArena>, root: NodeIndex) -> Self {
        Self {
            id,
            path: path.to_string(),
            arena,
            root,
            script_decl: DeclId::NONE,
            node_decls: FxHashMap::default(),
            node_symbols: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Replace the unit's AST, dropping every table derived from the old one.
    pub fn reset(&mut self, arena: Arc<NodeArena>, root: NodeIndex) {
        self.arena = arena;
        self.root = root;
        self.script_decl = DeclId::NONE;
        self.node_decls.clear();
        self.node_symbols.clear();
        self.diagnostics.clear();
    }

    pub fn set_decl_for_node(&mut self, node: NodeIndex, decl: DeclId) {
        self.node_decls.insert(node, decl);
    }

    pub fn decl_for_node(&self, node: NodeIndex) -> DeclId {
        self.node_decls.get(&node).copied().unwrap_or(DeclId::NONE)
    }

    /// Attach a resolved symbol to an AST node.
    pub fn set_symbol_for_node(&mut self, node: NodeIndex, symbol: SymbolId) {
        self.node_symbols.insert(node, symbol);
    }

    pub fn symbol_for_node(&self, node: NodeIndex) -> SymbolId {
        self.node_symbols.get(&node).copied().unwrap_or(SymbolId::NONE)
    }

    pub fn clear_node_symbols(&mut self) {
        self.node_symbols.clear();
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }
}
