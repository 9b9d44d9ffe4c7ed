//! The semantic info chain: process-wide registry spanning all units.
//!
//! Owns the decl arena, the symbol arena, the global symbol cache and the
//! well-known primitive types, plus the generation counters (binding phase,
//! type-check phase) that a session threads through every pass.

use std::sync::Arc;

use pullc_common::Diagnostic;
use pullc_syntax::{NodeArena, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::decl::{DeclArena, DeclId, DeclKind, DeclSpace};
use crate::semantic_unit::{SemanticUnit, UnitId};
use crate::symbols::{PrimitiveKind, SymbolArena, SymbolFlags, SymbolId, SymbolKind, TypeShape};

/// Well-known type symbols created with the chain.
#[derive(Clone, Copy, Debug)]
pub struct Primitives {
    pub any: SymbolId,
    pub number: SymbolId,
    pub string: SymbolId,
    pub boolean: SymbolId,
    pub void: SymbolId,
    pub null: SymbolId,
    pub undefined: SymbolId,
    pub error: SymbolId,
    /// The empty object type `{}`.
    pub empty_object: SymbolId,
}

/// Decl and symbol id boundary separating state created before a rebind
/// from state created by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebindWatermark {
    pub decl: DeclId,
    pub symbol: SymbolId,
}

pub struct SemanticInfoChain {
    units: Vec<SemanticUnit>,
    pub decls: DeclArena,
    pub symbols: SymbolArena,
    symbol_cache: FxHashMap<(String, DeclSpace), SymbolId>,
    array_types: FxHashMap<SymbolId, SymbolId>,
    instantiations: FxHashMap<(SymbolId, Vec<(SymbolId, SymbolId)>), SymbolId>,
    pub primitives: Primitives,
    binding_phase: u32,
    type_check_phase: u32,
}

impl Default for SemanticInfoChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticInfoChain {
    pub fn new() -> Self {
        let mut symbols = SymbolArena::new();
        let mut primitive = |kind: PrimitiveKind| {
            symbols.alloc(kind.name(), SymbolKind::Primitive(kind), SymbolFlags::SYNTHESIZED)
        };
        let any = primitive(PrimitiveKind::Any);
        let number = primitive(PrimitiveKind::Number);
        let string = primitive(PrimitiveKind::String);
        let boolean = primitive(PrimitiveKind::Boolean);
        let void = primitive(PrimitiveKind::Void);
        let null = primitive(PrimitiveKind::Null);
        let undefined = primitive(PrimitiveKind::Undefined);
        let error = primitive(PrimitiveKind::Error);
        let empty_object = symbols.alloc(
            "{}",
            SymbolKind::ObjectType(TypeShape::default()),
            SymbolFlags::SYNTHESIZED,
        );
        Self {
            units: Vec::new(),
            decls: DeclArena::new(),
            symbols,
            symbol_cache: FxHashMap::default(),
            array_types: FxHashMap::default(),
            instantiations: FxHashMap::default(),
            primitives: Primitives {
                any,
                number,
                string,
                boolean,
                void,
                null,
                undefined,
                error,
                empty_object,
            },
            binding_phase: 0,
            type_check_phase: 0,
        }
    }

    // =========================================================================
    // Units
    // =========================================================================

    pub fn add_unit(&mut self, path: &str, arena: Arc<NodeArena>, root: NodeIndex) -> UnitId {
        let id = UnitId(self.units.len() as u32);
        self.units.push(SemanticUnit::new(id, path, arena, root));
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&SemanticUnit> {
        self.units.get(id.0 as usize)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut SemanticUnit> {
        self.units.get_mut(id.0 as usize)
    }

    pub fn unit_by_path(&self, path: &str) -> Option<UnitId> {
        self.units.iter().find(|u| u.path == path).map(|u| u.id)
    }

    pub fn units(&self) -> &[SemanticUnit] {
        &self.units
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.iter().map(|u| u.id).collect()
    }

    /// Post a diagnostic against a decl's name (or the decl node when unnamed).
    pub fn post_decl_diagnostic(&mut self, decl: DeclId, code: u32, args: &[&str]) {
        let Some(d) = self.decls.get(decl) else {
            return;
        };
        let node = if d.name_node.is_some() { d.name_node } else { d.node };
        let unit_id = d.unit;
        let Some(unit) = self.unit_mut(unit_id) else {
            return;
        };
        let (start, length) = unit.arena.span(node);
        let diagnostic = Diagnostic::from_code(unit.path.clone(), start, length, code, args);
        unit.add_diagnostic(diagnostic);
    }

    /// Binder diagnostics of every unit, in unit order.
    pub fn binder_diagnostics(&self) -> Vec<Diagnostic> {
        self.units.iter().flat_map(|u| u.diagnostics().iter().cloned()).collect()
    }

    // =========================================================================
    // Phases and watermarks
    // =========================================================================

    pub fn binding_phase(&self) -> u32 {
        self.binding_phase
    }

    pub fn next_binding_phase(&mut self) -> u32 {
        self.binding_phase += 1;
        self.binding_phase
    }

    pub fn type_check_phase(&self) -> u32 {
        self.type_check_phase
    }

    pub fn next_type_check_phase(&mut self) -> u32 {
        self.type_check_phase += 1;
        self.type_check_phase
    }

    /// Current end of the decl and symbol arenas.
    pub fn watermark(&self) -> RebindWatermark {
        RebindWatermark {
            decl: self.decls.next_id(),
            symbol: self.symbols.next_id(),
        }
    }

    /// Reset the lazily resolved state of every symbol and the per-node
    /// symbol annotations, so the next check pass re-resolves from scratch.
    pub fn invalidate_resolutions(&mut self) {
        for symbol in self.symbols.iter_mut() {
            if !symbol.flags.contains(SymbolFlags::SYNTHESIZED) {
                symbol.invalidate();
            }
        }
        for unit in &mut self.units {
            unit.clear_node_symbols();
        }
    }

    // =========================================================================
    // Symbol liveness
    // =========================================================================

    /// Whether a symbol is still backed by a declaration (or is synthesized).
    pub fn is_live(&self, symbol: SymbolId) -> bool {
        self.symbols.get(symbol).is_some_and(|s| {
            !s.declarations.is_empty() || s.flags.contains(SymbolFlags::SYNTHESIZED)
        })
    }

    // =========================================================================
    // Global symbol cache and declaration path search
    // =========================================================================

    fn cache_key(path: &[String]) -> String {
        path.join(".")
    }

    pub fn cache_symbol(&mut self, path: &[String], space: DeclSpace, symbol: SymbolId) {
        self.symbol_cache.insert((Self::cache_key(path), space), symbol);
    }

    pub fn uncache(&mut self, path: &[String], space: DeclSpace) {
        self.symbol_cache.remove(&(Self::cache_key(path), space));
    }

    pub fn retain_cache(&mut self, mut keep: impl FnMut(SymbolId) -> bool) {
        self.symbol_cache.retain(|_, s| keep(*s));
    }

    /// Drop cached instantiations of generics that no longer exist.
    pub fn retain_instantiations(&mut self, mut keep: impl FnMut(SymbolId) -> bool) {
        self.instantiations.retain(|(target, _), _| keep(*target));
    }

    /// Decls reachable by walking each unit's decl tree along `path`.
    ///
    /// The last segment is filtered by name space; intermediate segments
    /// may be any named decl.
    pub fn find_decls(&self, path: &[String], space: DeclSpace) -> Vec<DeclId> {
        let mut found = Vec::new();
        let Some((last, prefix)) = path.split_last() else {
            return found;
        };
        for unit in &self.units {
            let mut scopes = vec![unit.script_decl];
            for segment in prefix {
                let mut next = Vec::new();
                for &scope in &scopes {
                    for &child in self.decls.children(scope) {
                        if self.decls.get(child).is_some_and(|c| &c.name == segment) {
                            next.push(child);
                        }
                    }
                }
                scopes = next;
                if scopes.is_empty() {
                    break;
                }
            }
            for &scope in &scopes {
                for &child in self.decls.children(scope) {
                    if let Some(c) = self.decls.get(child)
                        && &c.name == last
                        && c.occupies(space)
                    {
                        found.push(child);
                    }
                }
            }
        }
        found
    }

    /// Look up a fully qualified path in the global cache, falling back to a
    /// walk of every unit's decl tree. Hits from the walk are cached.
    pub fn find_symbol(&mut self, path: &[String], space: DeclSpace) -> Option<SymbolId> {
        let key = (Self::cache_key(path), space);
        if let Some(&symbol) = self.symbol_cache.get(&key) {
            if self.is_live(symbol) {
                return Some(symbol);
            }
            self.symbol_cache.remove(&key);
        }
        let symbol = self
            .find_decls(path, space)
            .into_iter()
            .map(|d| self.decls.symbol(d))
            .find(|s| s.is_some())?;
        // A class or enum merged with a module owns the shared name.
        let symbol = match self.symbols.get(symbol) {
            Some(s) if matches!(s.kind, SymbolKind::Container(_)) => match self.symbols.get(s.merged) {
                Some(partner) if matches!(partner.kind, SymbolKind::Class(_) | SymbolKind::Enum(_)) => partner.id,
                _ => symbol,
            },
            _ => symbol,
        };
        trace!(path = %key.0, ?space, symbol = symbol.0, "symbol cache fill");
        self.symbol_cache.insert(key, symbol);
        Some(symbol)
    }

    /// Lexical container-name path of a scope decl, including the scope
    /// itself and excluding the unit-root script.
    pub fn scope_path(&mut self, scope: DeclId) -> Vec<String> {
        match self.decls.get(scope) {
            None => Vec::new(),
            Some(d) if d.kind == DeclKind::Script => Vec::new(),
            Some(d) => {
                let name = d.name.clone();
                let mut path = self.decls.parent_path(scope);
                path.push(name);
                path
            }
        }
    }

    /// Resolve `name` as seen from inside `scope`: search the qualified path
    /// at decreasing depths so the nearest enclosing declaration wins, then
    /// the bare top-level name.
    pub fn find_symbol_in_context(&mut self, name: &str, space: DeclSpace, scope: DeclId) -> Option<SymbolId> {
        let path = self.scope_path(scope);
        for depth in (0..=path.len()).rev() {
            let mut candidate: Vec<String> = path[..depth].to_vec();
            candidate.push(name.to_string());
            if let Some(symbol) = self.find_symbol(&candidate, space) {
                return Some(symbol);
            }
        }
        None
    }

    // =========================================================================
    // Synthesized types
    // =========================================================================

    pub fn primitive_of(&self, symbol: SymbolId) -> Option<PrimitiveKind> {
        match self.symbols.get(symbol)?.kind {
            SymbolKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// `element[]`, created on first use.
    pub fn array_type(&mut self, element: SymbolId) -> SymbolId {
        if let Some(&array) = self.array_types.get(&element) {
            return array;
        }
        let array = self.symbols.alloc(
            "Array",
            SymbolKind::Array { element },
            SymbolFlags::SYNTHESIZED,
        );
        self.array_types.insert(element, array);
        array
    }

    /// Instantiation of `target` under `mapping`, created on first use and
    /// reused by later check passes. Named generics keep the cache on their
    /// own shape.
    pub fn instantiation(&mut self, target: SymbolId, mapping: Vec<(SymbolId, SymbolId)>) -> SymbolId {
        if let Some(&existing) = self
            .symbols
            .shape(target)
            .and_then(|shape| shape.specializations.get(&mapping))
        {
            return existing;
        }
        if let Some(&existing) = self.instantiations.get(&(target, mapping.clone())) {
            return existing;
        }
        let name = self.symbols.name(target).to_string();
        let id = self.symbols.alloc(
            &name,
            SymbolKind::Instantiation {
                target,
                mapping: mapping.clone(),
            },
            SymbolFlags::SYNTHESIZED,
        );
        match self.symbols.shape_mut(target) {
            Some(shape) => {
                shape.specializations.insert(mapping, id);
            }
            None => {
                self.instantiations.insert((target, mapping), id);
            }
        }
        id
    }
}
