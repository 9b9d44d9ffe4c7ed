//! Binder state: one binding pass over the decl trees of a chain.

use pullc_common::diagnostics::diagnostic_codes;
use smallvec::SmallVec;
use tracing::{debug, instrument};

use crate::decl::{DeclId, DeclKind, DeclSpace};
use crate::semantic_info::{RebindWatermark, SemanticInfoChain};
use crate::semantic_unit::UnitId;
use crate::symbols::{SymbolFlags, SymbolId, SymbolKind};

/// Binder configuration.
#[derive(Clone, Debug)]
pub struct BinderOptions {
    /// Allow a class, function or enum to merge with a type-only module of
    /// the same name. When false such pairs are duplicate identifiers.
    pub merge_modules_with_values: bool,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            merge_modules_with_values: true,
        }
    }
}

/// Incremental mode: decls of the rebound `units` below `watermark.decl`
/// and signatures below `watermark.symbol` are stale.
#[derive(Clone, Debug)]
pub struct RebindContext {
    pub units: SmallVec<[UnitId; 2]>,
    pub watermark: RebindWatermark,
}

impl RebindContext {
    pub fn covers(&self, unit: UnitId) -> bool {
        self.units.contains(&unit)
    }
}

/// How a new decl relates to a symbol found under the same name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MergeAction {
    /// Attach the decl to the existing symbol.
    Reuse,
    /// Create a new symbol linked to the existing one through `merged`.
    Augment,
    /// Report a duplicate identifier and bind to a fresh symbol.
    Duplicate,
}

/// A single binding pass.
pub struct BinderState<'c> {
    pub(crate) chain: &'c mut SemanticInfoChain,
    pub(crate) options: BinderOptions,
    pub(crate) rebind: Option<RebindContext>,
    pub(crate) phase: u32,
}

impl<'c> BinderState<'c> {
    pub fn new(chain: &'c mut SemanticInfoChain, options: BinderOptions) -> Self {
        let phase = chain.next_binding_phase();
        Self {
            chain,
            options,
            rebind: None,
            phase,
        }
    }

    /// A binder that re-binds `units` after their decls were re-collected.
    /// `watermark` must be the chain watermark captured before collection.
    pub fn for_rebind(
        chain: &'c mut SemanticInfoChain,
        options: BinderOptions,
        units: impl IntoIterator<Item = UnitId>,
        watermark: RebindWatermark,
    ) -> Self {
        let mut binder = Self::new(chain, options);
        binder.rebind = Some(RebindContext {
            units: units.into_iter().collect(),
            watermark,
        });
        binder
    }

    pub fn chain(&self) -> &SemanticInfoChain {
        &*self.chain
    }

    /// Bind every top-level decl of every unit.
    pub fn bind_all(&mut self) {
        for unit in self.chain.unit_ids() {
            self.bind_unit(unit);
        }
        if self.rebind.is_some() {
            self.sweep_after_rebind();
        }
    }

    #[instrument(level = "debug", skip(self), fields(unit = unit.0))]
    pub fn bind_unit(&mut self, unit: UnitId) {
        let Some(script) = self.chain.unit(unit).map(|u| u.script_decl) else {
            return;
        };
        if let Some(decl) = self.chain.decls.get_mut(script) {
            decl.is_bound = true;
        }
        for child in self.chain.decls.children(script).to_vec() {
            self.bind_decl(child);
        }
        debug!(unit = unit.0, symbols = self.chain.symbols.len(), "unit bound");
    }

    // =========================================================================
    // Shared helpers for the kind-specific binders
    // =========================================================================

    pub(crate) fn decl_name(&self, decl: DeclId) -> String {
        self.chain.decls.get(decl).map(|d| d.name.clone()).unwrap_or_default()
    }

    pub(crate) fn decl_kind(&self, decl: DeclId) -> Option<DeclKind> {
        self.chain.decls.kind(decl)
    }

    /// Parent decl of `decl`, or `NONE` when the parent is the unit script.
    pub(crate) fn parent_decl(&self, decl: DeclId) -> DeclId {
        let parent = self.chain.decls.parent(decl);
        match self.chain.decls.kind(parent) {
            Some(DeclKind::Script) | None => DeclId::NONE,
            Some(_) => parent,
        }
    }

    /// Shaped symbol holding the member tables `decl` registers into, binding
    /// the parent first if needed. `NONE` for top-level decls.
    pub(crate) fn parent_scope(&mut self, decl: DeclId) -> SymbolId {
        let parent = self.parent_decl(decl);
        if parent.is_none() {
            return SymbolId::NONE;
        }
        if !self.chain.decls.get(parent).is_some_and(|p| p.is_bound) {
            self.bind_decl(parent);
        }
        self.chain.decls.get(parent).map_or(SymbolId::NONE, |p| p.scope)
    }

    /// Find the symbol a new decl named `name` would merge with.
    ///
    /// Nested decls look in the parent scope's member table (`members` for
    /// exported or type members, `enclosed` otherwise); top-level decls use
    /// the declaration path search of the chain.
    pub(crate) fn find_existing(&mut self, decl: DeclId, scope: SymbolId, use_members: bool, space: DeclSpace) -> Option<SymbolId> {
        let name = self.decl_name(decl);
        if name.is_empty() {
            return None;
        }
        if scope.is_some() {
            let shape = self.chain.symbols.shape(scope)?;
            let table = if use_members { &shape.members } else { &shape.enclosed };
            return table.get(&name, space);
        }
        if self.parent_decl(decl).is_some() {
            // Parent without a scope (e.g. a variable's initializer).
            return None;
        }
        let script = self.chain.decls.parent(decl);
        let found = self.chain.find_symbol_in_context(&name, space, script)?;
        // Only symbols declared at the top level of some unit merge here.
        let first = self.chain.symbols.get(found)?.first_declaration();
        let top_level = first.is_none()
            || self.chain.decls.kind(self.chain.decls.parent(first)) == Some(DeclKind::Script);
        top_level.then_some(found)
    }

    /// Register `symbol` under the decl's name in the given spaces.
    pub(crate) fn register(&mut self, decl: DeclId, symbol: SymbolId, scope: SymbolId, use_members: bool, spaces: &[DeclSpace]) {
        let name = self.decl_name(decl);
        if name.is_empty() {
            return;
        }
        if scope.is_some() {
            if let Some(shape) = self.chain.symbols.shape_mut(scope) {
                let table = if use_members { &mut shape.members } else { &mut shape.enclosed };
                for &space in spaces {
                    table.insert(&name, space, symbol);
                }
            }
            if let Some(sym) = self.chain.symbols.get_mut(symbol) {
                sym.container = scope;
            }
        } else if self.parent_decl(decl).is_none() {
            for &space in spaces {
                self.chain.cache_symbol(std::slice::from_ref(&name), space, symbol);
            }
        }
    }

    /// Allocate a symbol for `decl` and attach the decl to it.
    pub(crate) fn create_symbol(&mut self, decl: DeclId, kind: SymbolKind, flags: SymbolFlags) -> SymbolId {
        let name = self.decl_name(decl);
        let symbol = self.chain.symbols.alloc(&name, kind, flags);
        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            sym.binding_phase = self.phase;
        }
        self.attach(decl, symbol);
        symbol
    }

    /// Attach `decl` to `symbol` and record the symbol on the decl.
    pub(crate) fn attach(&mut self, decl: DeclId, symbol: SymbolId) {
        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            sym.add_declaration(decl);
            sym.binding_phase = self.phase;
        }
        if let Some(d) = self.chain.decls.get_mut(decl) {
            d.symbol = symbol;
        }
    }

    pub(crate) fn set_scope(&mut self, decl: DeclId, scope: SymbolId) {
        if let Some(d) = self.chain.decls.get_mut(decl) {
            d.scope = scope;
        }
    }

    pub(crate) fn set_signature(&mut self, decl: DeclId, signature: SymbolId) {
        if let Some(d) = self.chain.decls.get_mut(decl) {
            d.signature_symbol = signature;
        }
    }

    /// Post a duplicate-identifier diagnostic and mint an unregistered
    /// symbol for the offending decl.
    pub(crate) fn bind_duplicate(&mut self, decl: DeclId, kind: SymbolKind, flags: SymbolFlags) -> SymbolId {
        let name = self.decl_name(decl);
        debug!(name = %name, decl = decl.0, "duplicate identifier");
        self.chain
            .post_decl_diagnostic(decl, diagnostic_codes::DUPLICATE_IDENTIFIER, &[&name]);
        self.create_symbol(decl, kind, flags | SymbolFlags::DUPLICATE)
    }

    /// Prepare an existing symbol for reuse by `decl`: prune stale
    /// declarations when rebinding, then report whether any live
    /// declaration is left.
    pub(crate) fn prepare_reuse(&mut self, symbol: SymbolId) -> bool {
        self.prune_stale(symbol);
        self.chain
            .symbols
            .get(symbol)
            .is_some_and(|s| !s.declarations.is_empty())
    }
}
