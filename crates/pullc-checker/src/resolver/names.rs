//! Lexical name lookup, entity names and import aliases.

use pullc_binder::{DeclId, DeclKind, DeclSpace, ResolutionState, SymbolId, SymbolKind, UnitId};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_syntax::{NodeData, NodeIndex};
use tracing::{debug, trace};

use super::PullTypeResolver;

impl PullTypeResolver<'_> {
    /// Resolve `name` in `space` as seen from inside `scope`, walking the
    /// enclosing decls outward and finishing at the chain's top level.
    pub fn lookup_name(&mut self, name: &str, space: DeclSpace, scope: DeclId) -> Option<SymbolId> {
        let mut current = scope;
        while current.is_some() {
            if let Some(found) = self.lookup_in_decl(current, name, space)
                && self.chain.is_live(found)
            {
                trace!(name, ?space, decl = current.0, symbol = found.0, "name resolved");
                return Some(found);
            }
            current = self.chain.decls.parent(current);
        }
        None
    }

    fn lookup_in_decl(&mut self, decl: DeclId, name: &str, space: DeclSpace) -> Option<SymbolId> {
        let d = self.decl(decl)?;
        let kind = d.kind;
        let scope = d.scope;
        let symbol = d.symbol;
        let signature = d.signature_symbol;
        let own_name = d.name == name;

        match kind {
            DeclKind::Script => self.chain.find_symbol(&[name.to_string()], space),
            _ if kind.is_function_like()
                || kind.is_signature()
                || matches!(kind, DeclKind::FunctionType | DeclKind::ConstructorType) =>
            {
                match space {
                    DeclSpace::Type => self.signature_type_parameter(signature, name),
                    DeclSpace::Value => {
                        let local = self
                            .chain
                            .symbols
                            .shape(scope)
                            .and_then(|s| s.enclosed.get(name, DeclSpace::Value));
                        let local = local.or_else(|| self.signature_parameter(signature, name));
                        match local {
                            Some(found) => Some(found),
                            // A named function expression sees itself.
                            None if kind == DeclKind::FunctionExpression && own_name => Some(symbol),
                            None => None,
                        }
                    }
                }
            }
            DeclKind::Class | DeclKind::Interface => match space {
                DeclSpace::Type => self
                    .chain
                    .symbols
                    .shape(symbol)
                    .and_then(|s| s.type_parameters.iter().copied().find(|&tp| self.chain.symbols.name(tp) == name)),
                DeclSpace::Value => None,
            },
            DeclKind::Container => {
                let shape = self.chain.symbols.shape(scope)?;
                shape.members.get(name, space).or_else(|| shape.enclosed.get(name, space))
            }
            DeclKind::Enum if space == DeclSpace::Value => {
                self.chain.symbols.shape(scope).and_then(|s| s.members.get(name, space))
            }
            DeclKind::CatchBlock | DeclKind::WithBlock => {
                self.chain.symbols.shape(scope).and_then(|s| s.enclosed.get(name, space))
            }
            _ => None,
        }
    }

    fn signature_type_parameter(&self, signature: SymbolId, name: &str) -> Option<SymbolId> {
        self.chain
            .symbols
            .signature(signature)?
            .type_parameters
            .iter()
            .copied()
            .find(|&tp| self.chain.symbols.name(tp) == name)
    }

    fn signature_parameter(&self, signature: SymbolId, name: &str) -> Option<SymbolId> {
        self.chain
            .symbols
            .signature(signature)?
            .parameters
            .iter()
            .copied()
            .find(|&p| self.chain.symbols.name(p) == name)
    }

    /// Value-space lookup of an identifier at `node`.
    pub fn lookup_value_at(&mut self, unit: UnitId, node: NodeIndex, name: &str) -> Option<SymbolId> {
        let scope = self.enclosing_scope(unit, node);
        let found = self.lookup_name(name, DeclSpace::Value, scope)?;
        Some(self.resolve_alias(found))
    }

    // =========================================================================
    // Import aliases
    // =========================================================================

    /// Follow an import alias to its target; other symbols are returned
    /// unchanged. `NONE` for an unresolvable or circular alias.
    pub fn resolve_alias(&mut self, symbol: SymbolId) -> SymbolId {
        let Some(sym) = self.symbol(symbol) else {
            return SymbolId::NONE;
        };
        let SymbolKind::Alias { target } = sym.kind else {
            return symbol;
        };
        if target.is_some() {
            return target;
        }
        let (decl, resolution) = (sym.first_declaration(), sym.resolution);
        match resolution {
            ResolutionState::Resolving => {
                let name = self.chain.symbols.name(symbol).to_string();
                debug!(alias = symbol.0, name = %name, "import alias cycle");
                self.report_at_decl(decl, diagnostic_codes::CIRCULAR_IMPORT_ALIAS, &[&name]);
                self.set_resolution(symbol, ResolutionState::Error);
                return SymbolId::NONE;
            }
            ResolutionState::Error => return SymbolId::NONE,
            _ => {}
        }
        let Some((unit, node)) = self.decl(decl).map(|d| (d.unit, d.node)) else {
            return SymbolId::NONE;
        };
        self.set_resolution(symbol, ResolutionState::Resolving);

        let reference = self.arena(unit).and_then(|arena| {
            let n = arena.get(node)?;
            arena.get_import_equals(n).map(|i| i.module_reference)
        });
        let resolved = match reference {
            Some(reference) => {
                let found = self.resolve_namespace(unit, reference);
                if found.is_some() { self.resolve_alias(found) } else { found }
            }
            None => SymbolId::NONE,
        };

        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            if let SymbolKind::Alias { target } = &mut sym.kind {
                *target = resolved;
            }
            sym.resolution = if resolved.is_some() {
                ResolutionState::Resolved
            } else {
                ResolutionState::Error
            };
        }
        resolved
    }

    pub(crate) fn set_resolution(&mut self, symbol: SymbolId, state: ResolutionState) {
        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            sym.resolution = state;
        }
    }

    // =========================================================================
    // Entity names
    // =========================================================================

    /// Resolve an identifier or qualified name in `space`, reporting what
    /// cannot be found. `NONE` on failure.
    pub fn resolve_entity_name(&mut self, unit: UnitId, node: NodeIndex, space: DeclSpace) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return SymbolId::NONE;
        };
        let Some(n) = arena.get(node) else {
            return SymbolId::NONE;
        };
        let resolved = match &n.data {
            NodeData::Identifier(ident) => {
                let name = ident.text.clone();
                let scope = self.enclosing_scope(unit, node);
                match self.lookup_name(&name, space, scope) {
                    Some(found) => self.resolve_alias(found),
                    None => {
                        let other_space = match space {
                            DeclSpace::Type => DeclSpace::Value,
                            DeclSpace::Value => DeclSpace::Type,
                        };
                        let in_other = self.lookup_name(&name, other_space, scope).is_some();
                        let code = match space {
                            DeclSpace::Type if in_other => diagnostic_codes::VALUE_USED_AS_TYPE,
                            _ => diagnostic_codes::CANNOT_FIND_NAME,
                        };
                        self.report(unit, node, code, &[&name]);
                        SymbolId::NONE
                    }
                }
            }
            NodeData::QualifiedName(qn) => {
                let (left, right) = (qn.left, qn.right);
                let namespace = self.resolve_namespace(unit, left);
                if namespace.is_none() {
                    return SymbolId::NONE;
                }
                let member_name = arena.identifier_text(right).unwrap_or_default().to_string();
                match self.namespace_member(namespace, &member_name, space) {
                    Some(found) => {
                        let found = self.resolve_alias(found);
                        self.note_symbol(unit, right, found);
                        found
                    }
                    None => {
                        let module_name = arena.entity_name_text(left).unwrap_or_default();
                        self.report(
                            unit,
                            right,
                            diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
                            &[&module_name, &member_name],
                        );
                        SymbolId::NONE
                    }
                }
            }
            _ => SymbolId::NONE,
        };
        if resolved.is_some() {
            self.note_symbol(unit, node, resolved);
        }
        resolved
    }

    /// The left side of a qualified name: type space first (modules,
    /// classes, enums), then value space.
    fn resolve_namespace(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return SymbolId::NONE;
        };
        let Some(n) = arena.get(node) else {
            return SymbolId::NONE;
        };
        let resolved = match &n.data {
            NodeData::Identifier(ident) => {
                let name = ident.text.clone();
                let scope = self.enclosing_scope(unit, node);
                let found = self
                    .lookup_name(&name, DeclSpace::Type, scope)
                    .or_else(|| self.lookup_name(&name, DeclSpace::Value, scope));
                match found {
                    Some(found) => self.resolve_alias(found),
                    None => {
                        self.report(unit, node, diagnostic_codes::CANNOT_FIND_NAME, &[&name]);
                        SymbolId::NONE
                    }
                }
            }
            NodeData::QualifiedName(qn) => {
                let (left, right) = (qn.left, qn.right);
                let outer = self.resolve_namespace(unit, left);
                if outer.is_none() {
                    return SymbolId::NONE;
                }
                let name = arena.identifier_text(right).unwrap_or_default().to_string();
                let found = self
                    .namespace_member(outer, &name, DeclSpace::Type)
                    .or_else(|| self.namespace_member(outer, &name, DeclSpace::Value));
                match found {
                    Some(found) => self.resolve_alias(found),
                    None => {
                        let module_name = arena.entity_name_text(left).unwrap_or_default();
                        self.report(
                            unit,
                            right,
                            diagnostic_codes::MODULE_HAS_NO_EXPORTED_MEMBER,
                            &[&module_name, &name],
                        );
                        SymbolId::NONE
                    }
                }
            }
            _ => SymbolId::NONE,
        };
        if resolved.is_some() {
            self.note_symbol(unit, node, resolved);
        }
        resolved
    }

    /// Exported member `name` of a module-like symbol. Classes, enums and
    /// functions answer through the module merged into them.
    pub(crate) fn namespace_member(&self, namespace: SymbolId, name: &str, space: DeclSpace) -> Option<SymbolId> {
        let sym = self.symbol(namespace)?;
        let found = match &sym.kind {
            SymbolKind::Container(shape) => shape.members.get(name, space),
            SymbolKind::ContainerInstance { container } => {
                return self.namespace_member(*container, name, space);
            }
            SymbolKind::Enum(shape) if space == DeclSpace::Value => shape.members.get(name, space),
            _ => None,
        };
        let found = found.or_else(|| {
            let merged = sym.merged;
            match self.symbol(merged).map(|m| &m.kind) {
                Some(SymbolKind::Container(shape)) if merged != namespace => shape.members.get(name, space),
                _ => None,
            }
        });
        found.filter(|&s| self.chain.is_live(s))
    }
}
