//! Type resolver over the binder's symbol graph.
//!
//! `PullTypeResolver` answers "what type is this node / symbol" lazily and
//! memoizes the answers: expression and type-node results per AST node,
//! value-symbol types on the symbols themselves (guarded by their
//! `ResolutionState`). It also implements the solver's `TypeResolver`, so
//! relation queries run directly against the same caches.
//!
//! Resolution diagnostics (unknown names, bad type arguments, call
//! mismatches) are posted to the resolver's `DiagnosticSink`; the sink's
//! dedup is what keeps a node that is resolved from several call sites
//! from reporting twice.
//!
//! Submodules:
//! - `names` - lexical name lookup and entity names
//! - `symbol_types` - types of value symbols, signatures and heritage
//! - `type_nodes` - type annotations and type references
//! - `expressions` - expression typing and contextual typing
//! - `calls` - overload resolution and type-argument inference
//! - `type_queries` - the `TypeResolver` implementation

mod calls;
mod expressions;
mod names;
mod symbol_types;
mod type_nodes;
mod type_queries;

pub(crate) use symbol_types::{annotation_of, collect_return_expressions, initializer_of};

use std::sync::Arc;

use pullc_binder::{
    Decl, DeclId, DeclKind, Primitives, SemanticInfoChain, Symbol, SymbolId, SymbolKind, UnitId,
};
use pullc_common::diagnostics::Diagnostic;
use pullc_solver::{RecursionGuard, RecursionProfile, RecursionResult, type_to_string};
use pullc_syntax::{NodeArena, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error_reporter::DiagnosticSink;

/// Member walks that follow base types and can therefore cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Walk {
    Properties,
    CallSignatures,
    ConstructSignatures,
    Index,
}

pub struct PullTypeResolver<'c> {
    pub(crate) chain: &'c mut SemanticInfoChain,
    pub(crate) sink: DiagnosticSink,
    pub(crate) primitives: Primitives,
    expression_types: FxHashMap<(UnitId, NodeIndex), SymbolId>,
    type_node_types: FxHashMap<(UnitId, NodeIndex), SymbolId>,
    /// Parameters whose type came from a contextual signature.
    contextually_typed: FxHashSet<SymbolId>,
    /// Return types expected of function expressions by their context.
    contextual_returns: FxHashMap<SymbolId, SymbolId>,
    walks: RecursionGuard<(SymbolId, Walk)>,
}

impl<'c> PullTypeResolver<'c> {
    pub fn new(chain: &'c mut SemanticInfoChain) -> Self {
        let primitives = chain.primitives;
        Self {
            chain,
            sink: DiagnosticSink::new(),
            primitives,
            expression_types: FxHashMap::default(),
            type_node_types: FxHashMap::default(),
            contextually_typed: FxHashSet::default(),
            contextual_returns: FxHashMap::default(),
            walks: RecursionGuard::with_profile(RecursionProfile::Instantiation),
        }
    }

    pub fn chain(&self) -> &SemanticInfoChain {
        self.chain
    }

    pub fn chain_mut(&mut self) -> &mut SemanticInfoChain {
        self.chain
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    pub fn into_diagnostics(self) -> Vec<(UnitId, Diagnostic)> {
        self.sink.into_diagnostics()
    }

    /// Whether a parameter's type was taken from a contextual signature.
    pub fn is_contextually_typed(&self, parameter: SymbolId) -> bool {
        self.contextually_typed.contains(&parameter)
    }

    // =========================================================================
    // Graph access
    // =========================================================================

    pub(crate) fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.chain.symbols.get(id)
    }

    pub(crate) fn decl(&self, id: DeclId) -> Option<&Decl> {
        self.chain.decls.get(id)
    }

    pub(crate) fn decl_kind(&self, id: DeclId) -> Option<DeclKind> {
        self.chain.decls.kind(id)
    }

    pub(crate) fn arena(&self, unit: UnitId) -> Option<Arc<NodeArena>> {
        self.chain.unit(unit).map(|u| Arc::clone(&u.arena))
    }

    pub(crate) fn decl_for_node(&self, unit: UnitId, node: NodeIndex) -> DeclId {
        self.chain.unit(unit).map_or(DeclId::NONE, |u| u.decl_for_node(node))
    }

    pub(crate) fn note_symbol(&mut self, unit: UnitId, node: NodeIndex, symbol: SymbolId) {
        if let Some(u) = self.chain.unit_mut(unit) {
            u.set_symbol_for_node(node, symbol);
        }
    }

    /// Innermost decl whose node encloses `node` (or is `node`); the unit's
    /// script decl when none does.
    pub fn enclosing_scope(&self, unit: UnitId, node: NodeIndex) -> DeclId {
        let Some(u) = self.chain.unit(unit) else {
            return DeclId::NONE;
        };
        let mut current = node;
        while current.is_some() {
            let decl = u.decl_for_node(current);
            if decl.is_some() {
                return decl;
            }
            current = u.arena.parent(current);
        }
        u.script_decl
    }

    /// The class decl a decl sits in, looking through its ancestors.
    pub fn enclosing_class_decl(&self, decl: DeclId) -> DeclId {
        self.chain.decls.find_ancestor(decl, |d| d.kind == DeclKind::Class)
    }

    pub(crate) fn is_kind(&self, symbol: SymbolId, pred: impl Fn(&SymbolKind) -> bool) -> bool {
        self.symbol(symbol).is_some_and(|s| pred(&s.kind))
    }

    pub(crate) fn is_error_or_any(&self, ty: SymbolId) -> bool {
        ty.is_none() || ty == self.primitives.any || ty == self.primitives.error
    }

    pub fn type_display(&mut self, ty: SymbolId) -> String {
        type_to_string(self, ty)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn report(&mut self, unit: UnitId, node: NodeIndex, code: u32, args: &[&str]) {
        if let Some(diagnostic) = self.diagnostic_at(unit, node, code, args) {
            self.sink.post(unit, diagnostic);
        }
    }

    pub(crate) fn report_elaborated(
        &mut self,
        unit: UnitId,
        node: NodeIndex,
        code: u32,
        args: &[&str],
        elaboration: &str,
    ) {
        if let Some(diagnostic) = self.diagnostic_at(unit, node, code, args) {
            let diagnostic = if elaboration.is_empty() {
                diagnostic
            } else {
                diagnostic.with_elaboration(elaboration)
            };
            self.sink.post(unit, diagnostic);
        }
    }

    /// Report against a decl's name, or its node when it has none.
    pub(crate) fn report_at_decl(&mut self, decl: DeclId, code: u32, args: &[&str]) {
        let Some(d) = self.decl(decl) else {
            return;
        };
        let node = if d.name_node.is_some() { d.name_node } else { d.node };
        let unit = d.unit;
        self.report(unit, node, code, args);
    }

    fn diagnostic_at(&self, unit: UnitId, node: NodeIndex, code: u32, args: &[&str]) -> Option<Diagnostic> {
        let u = self.chain.unit(unit)?;
        let (start, length) = u.arena.span(node);
        Some(Diagnostic::from_code(u.path.clone(), start, length, code, args))
    }

    // =========================================================================
    // Walk guard
    // =========================================================================

    pub(crate) fn enter_walk(&mut self, ty: SymbolId, walk: Walk) -> bool {
        matches!(self.walks.enter((ty, walk)), RecursionResult::Entered)
    }

    pub(crate) fn leave_walk(&mut self, ty: SymbolId, walk: Walk) {
        self.walks.leave((ty, walk));
        if self.walks.depth() == 0 {
            self.walks.reset();
        }
    }
}
