//! Incremental rebinding.
//!
//! After a unit is re-collected its old decls are still in the arena but no
//! longer reachable from its script decl. A decl is stale when it belongs to
//! a rebound unit and predates the rebind watermark. Symbols found by the
//! new decls are pruned of stale declarations on reuse; a final sweep prunes
//! the rest and unlinks symbols left with no declaration at all.
//!
//! Which declaration owns a name depends on binding order, so an edit also
//! rebinds the units whose binding could come out differently: units holding
//! binder diagnostics and later units sharing a top-level name with the
//! edited one. They are bound in one pass, in unit order.

use std::sync::Arc;

use pullc_syntax::{NodeArena, NodeIndex};
use rustc_hash::FxHashSet;
use smallvec::{SmallVec, smallvec};
use tracing::{debug, instrument, trace};

use crate::decl::DeclId;
use crate::decl_collector::collect_unit_decls;
use crate::semantic_info::SemanticInfoChain;
use crate::semantic_unit::UnitId;
use crate::symbols::{SymbolFlags, SymbolId, SymbolKind};

use super::state::{BinderOptions, BinderState, RebindContext};

/// Replace `unit`'s tree, re-collect its decls and rebind it together with
/// every unit whose binding depends on it.
#[instrument(level = "debug", skip(chain, options, arena))]
pub fn rebind_unit(
    chain: &mut SemanticInfoChain,
    options: &BinderOptions,
    unit: UnitId,
    arena: Arc<NodeArena>,
    root: NodeIndex,
) {
    let watermark = chain.watermark();
    recollect(chain, unit, arena, root);

    let names = top_level_names(chain, unit);
    let affected: Vec<UnitId> = chain
        .units()
        .iter()
        .filter(|u| u.id != unit)
        .filter(|u| {
            !u.diagnostics().is_empty()
                || (u.id > unit && top_level_names(chain, u.id).iter().any(|n| names.contains(n)))
        })
        .map(|u| u.id)
        .collect();

    let mut units: SmallVec<[UnitId; 2]> = smallvec![unit];
    for other in affected {
        let Some((arena, root)) = chain.unit(other).map(|u| (Arc::clone(&u.arena), u.root)) else {
            continue;
        };
        debug!(unit = other.0, "rebinding dependent unit");
        recollect(chain, other, arena, root);
        units.push(other);
    }
    BinderState::for_rebind(chain, options.clone(), units, watermark).bind_all();
}

fn recollect(chain: &mut SemanticInfoChain, unit: UnitId, arena: Arc<NodeArena>, root: NodeIndex) {
    if let Some(semantic_unit) = chain.unit_mut(unit) {
        semantic_unit.reset(arena, root);
    }
    collect_unit_decls(chain, unit);
}

fn top_level_names(chain: &SemanticInfoChain, unit: UnitId) -> FxHashSet<&str> {
    let Some(script) = chain.unit(unit).map(|u| u.script_decl) else {
        return FxHashSet::default();
    };
    chain
        .decls
        .children(script)
        .iter()
        .filter_map(|&child| chain.decls.get(child))
        .map(|d| d.name.as_str())
        .filter(|name| !name.is_empty())
        .collect()
}

impl BinderState<'_> {
    fn is_stale(&self, ctx: &RebindContext, decl: DeclId) -> bool {
        decl.0 < ctx.watermark.decl.0 && self.chain.decls.get(decl).is_some_and(|d| ctx.covers(d.unit))
    }

    /// Drop stale declarations from `symbol` and from the symbols whose
    /// lifetime is tied to it (function types, constructor types, accessor
    /// halves and pre-existing signatures). No-op outside a rebind.
    pub(crate) fn prune_stale(&mut self, symbol: SymbolId) {
        let Some(ctx) = self.rebind.clone() else {
            return;
        };
        self.prune_declarations(&ctx, symbol);

        let linked: Vec<SymbolId> = match self.chain.symbols.get(symbol) {
            Some(sym) => match &sym.kind {
                SymbolKind::Function | SymbolKind::Method { .. } => vec![sym.type_id],
                SymbolKind::Class(shape) => vec![shape.associated],
                SymbolKind::Accessor { getter, setter } => vec![*getter, *setter],
                _ => Vec::new(),
            },
            None => Vec::new(),
        };
        for linked in linked.into_iter().filter(|s| s.is_some()) {
            self.prune_declarations(&ctx, linked);
        }

        if let Some(sym) = self.chain.symbols.get(symbol)
            && let SymbolKind::Accessor { getter, setter } = sym.kind
        {
            let getter_live = self.chain.is_live(getter);
            let setter_live = self.chain.is_live(setter);
            if let Some(sym) = self.chain.symbols.get_mut(symbol)
                && let SymbolKind::Accessor { getter, setter } = &mut sym.kind
            {
                if !getter_live {
                    *getter = SymbolId::NONE;
                }
                if !setter_live {
                    *setter = SymbolId::NONE;
                }
            }
        }
    }

    /// Remove stale decls from one symbol and drop its pre-existing
    /// signatures that lost every declaration. Returns whether anything
    /// changed; changed symbols are invalidated.
    fn prune_declarations(&mut self, ctx: &RebindContext, symbol: SymbolId) -> bool {
        let Some(sym) = self.chain.symbols.get(symbol) else {
            return false;
        };
        let keep: Vec<DeclId> = sym
            .declarations
            .iter()
            .copied()
            .filter(|&d| !self.is_stale(ctx, d))
            .collect();
        let mut changed = keep.len() != sym.declarations.len();

        let signatures: Vec<SymbolId> = sym
            .shape()
            .map(|shape| {
                shape
                    .call_signatures
                    .iter()
                    .chain(&shape.construct_signatures)
                    .chain(&shape.index_signatures)
                    .copied()
                    .filter(|s| s.0 < ctx.watermark.symbol.0)
                    .collect()
            })
            .unwrap_or_default();
        let mut dead_signatures = FxHashSet::default();
        for signature in signatures {
            self.prune_declarations(ctx, signature);
            if !self.chain.is_live(signature) {
                dead_signatures.insert(signature);
            }
        }

        let Some(sym) = self.chain.symbols.get_mut(symbol) else {
            return false;
        };
        if changed {
            sym.declarations = keep.into_iter().collect();
        }
        if !dead_signatures.is_empty()
            && let Some(shape) = sym.shape_mut()
        {
            shape.call_signatures.retain(|s| !dead_signatures.contains(s));
            shape.construct_signatures.retain(|s| !dead_signatures.contains(s));
            shape.index_signatures.retain(|s| !dead_signatures.contains(s));
            changed = true;
        }
        if changed {
            sym.invalidate();
            trace!(symbol = symbol.0, name = %sym.name, "pruned stale declarations");
        }
        changed
    }

    /// Prune every pre-existing symbol, then unlink those left without a
    /// declaration from member tables, signature lists, merge links and the
    /// global cache.
    #[instrument(level = "debug", skip(self))]
    pub(crate) fn sweep_after_rebind(&mut self) {
        let Some(ctx) = self.rebind.clone() else {
            return;
        };
        let end = ctx.watermark.symbol.0.min(self.chain.symbols.len() as u32);
        for id in 0..end {
            self.prune_declarations(&ctx, SymbolId(id));
        }

        let dead: FxHashSet<SymbolId> = self
            .chain
            .symbols
            .iter()
            .filter(|s| s.id.0 < end && s.declarations.is_empty() && !s.flags.contains(SymbolFlags::SYNTHESIZED))
            .map(|s| s.id)
            .collect();
        if dead.is_empty() {
            return;
        }
        debug!(units = ctx.units.len(), dead = dead.len(), "sweeping symbols left without declarations");

        let is_dead = |s: &SymbolId| dead.contains(s);
        for sym in self.chain.symbols.iter_mut() {
            if is_dead(&sym.merged) {
                sym.merged = SymbolId::NONE;
            }
            match &mut sym.kind {
                SymbolKind::Accessor { getter, setter } => {
                    if is_dead(getter) {
                        *getter = SymbolId::NONE;
                    }
                    if is_dead(setter) {
                        *setter = SymbolId::NONE;
                    }
                }
                SymbolKind::Signature(data) => {
                    data.parameters.retain(|p| !is_dead(p));
                    data.type_parameters.retain(|p| !is_dead(p));
                }
                kind => {
                    if let Some(shape) = kind.shape_mut() {
                        shape.members.retain(|s| !is_dead(&s));
                        shape.enclosed.retain(|s| !is_dead(&s));
                        shape.call_signatures.retain(|s| !is_dead(s));
                        shape.construct_signatures.retain(|s| !is_dead(s));
                        shape.index_signatures.retain(|s| !is_dead(s));
                        shape.type_parameters.retain(|s| !is_dead(s));
                        if is_dead(&shape.associated) {
                            shape.associated = SymbolId::NONE;
                        }
                    }
                }
            }
        }
        self.chain.retain_cache(|s| !dead.contains(&s));
        self.chain.retain_instantiations(|s| !dead.contains(&s));
    }
}
