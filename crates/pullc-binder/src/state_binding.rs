//! Binder dispatch and the steps shared by every kind-specific binder:
//! locating the scope a decl registers into, classifying a found symbol,
//! and binding type parameters and parameters.

use pullc_common::diagnostics::diagnostic_codes;
use rustc_hash::FxHashSet;
use tracing::{instrument, trace};

use crate::decl::{DeclFlags, DeclId, DeclKind, DeclSpace};
use crate::symbols::{SignatureData, SymbolFlags, SymbolId, SymbolKind};

use super::state::BinderState;

/// A symbol found under a new decl's name, after stale pruning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Existing {
    None,
    /// Still declared by at least one live decl.
    Live(SymbolId),
    /// Lost every declaration to rebind pruning; reusable when kinds agree.
    Stale(SymbolId),
}

impl BinderState<'_> {
    /// Bind one decl. Idempotent: an already bound decl returns immediately.
    ///
    /// # Panics
    ///
    /// Panics on decl kinds that are only ever bound by their owner
    /// (script, parameter, type parameter). Reaching that arm means the
    /// decl tree is malformed.
    #[instrument(level = "trace", skip(self), fields(decl = decl.0))]
    pub fn bind_decl(&mut self, decl: DeclId) {
        let Some(d) = self.chain.decls.get_mut(decl) else {
            return;
        };
        if d.is_bound {
            return;
        }
        d.is_bound = true;
        let kind = d.kind;
        trace!(?kind, name = %d.name, "bind decl");

        match kind {
            DeclKind::Container => self.bind_container(decl),
            DeclKind::Enum => self.bind_enum(decl),
            DeclKind::EnumMember => self.bind_enum_member(decl),
            DeclKind::Class => self.bind_class(decl),
            DeclKind::Interface => self.bind_interface(decl),
            DeclKind::Function => self.bind_function(decl),
            DeclKind::Variable => self.bind_variable(decl),
            DeclKind::Property => self.bind_property(decl),
            DeclKind::Method => self.bind_method(decl),
            DeclKind::Constructor => self.bind_constructor(decl),
            DeclKind::GetAccessor => self.bind_accessor(decl, true),
            DeclKind::SetAccessor => self.bind_accessor(decl, false),
            DeclKind::CallSignature | DeclKind::ConstructSignature | DeclKind::IndexSignature => {
                self.bind_signature_decl(decl)
            }
            DeclKind::ObjectType | DeclKind::ObjectLiteral => self.bind_object_type(decl),
            DeclKind::FunctionType => self.bind_function_type(decl, false),
            DeclKind::ConstructorType => self.bind_function_type(decl, true),
            DeclKind::FunctionExpression => self.bind_function_expression(decl),
            DeclKind::TypeAlias => self.bind_import(decl),
            DeclKind::CatchBlock | DeclKind::WithBlock => self.bind_block_scope(decl),
            DeclKind::Script | DeclKind::Parameter | DeclKind::TypeParameter => {
                panic!("unrecognized decl kind {kind:?} passed to the binder dispatcher")
            }
        }

        self.bind_children(decl);
    }

    /// Bind every child not owned by a signature.
    pub(crate) fn bind_children(&mut self, decl: DeclId) {
        for child in self.chain.decls.children(decl).to_vec() {
            let Some(c) = self.chain.decls.get(child) else {
                continue;
            };
            if c.is_bound || c.kind.is_owned_by_signature() {
                continue;
            }
            self.bind_decl(child);
        }
    }

    pub(crate) fn mark_bound(&mut self, decl: DeclId) {
        if let Some(d) = self.chain.decls.get_mut(decl) {
            d.is_bound = true;
        }
    }

    pub(crate) fn symbol_flags(&self, decl: DeclId) -> SymbolFlags {
        let Some(d) = self.chain.decls.get(decl) else {
            return SymbolFlags::empty();
        };
        let mut flags = SymbolFlags::empty();
        if d.flags.contains(DeclFlags::EXPORTED) {
            flags |= SymbolFlags::EXPORTED;
        }
        if d.flags.contains(DeclFlags::AMBIENT) {
            flags |= SymbolFlags::AMBIENT;
        }
        if d.flags.contains(DeclFlags::PRIVATE) {
            flags |= SymbolFlags::PRIVATE;
        }
        if d.flags.contains(DeclFlags::PUBLIC) {
            flags |= SymbolFlags::PUBLIC;
        }
        if d.flags.contains(DeclFlags::STATIC) {
            flags |= SymbolFlags::STATIC;
        }
        if d.flags.contains(DeclFlags::OPTIONAL) {
            flags |= SymbolFlags::OPTIONAL;
        }
        flags
    }

    pub(crate) fn has_flag(&self, decl: DeclId, flag: DeclFlags) -> bool {
        self.chain.decls.get(decl).is_some_and(|d| d.flags.contains(flag))
    }

    /// Scope symbol and table a decl registers into.
    ///
    /// Returns `(NONE, true)` for top-level decls, which go to the global
    /// cache instead. Class statics register on the constructor type.
    pub(crate) fn registration_target(&mut self, decl: DeclId) -> (SymbolId, bool) {
        let scope = self.parent_scope(decl);
        if scope.is_none() {
            return (SymbolId::NONE, true);
        }
        let parent_kind = self.decl_kind(self.parent_decl(decl));
        match parent_kind {
            Some(DeclKind::Class) => {
                if self.has_flag(decl, DeclFlags::STATIC) {
                    let ctor = self.chain.symbols.shape(scope).map_or(SymbolId::NONE, |s| s.associated);
                    (ctor, true)
                } else {
                    (scope, true)
                }
            }
            Some(DeclKind::Interface | DeclKind::ObjectType | DeclKind::ObjectLiteral | DeclKind::Enum) => (scope, true),
            Some(DeclKind::Container) => (scope, self.has_flag(decl, DeclFlags::EXPORTED)),
            _ => (scope, false),
        }
    }

    /// Look up and classify the symbol a decl would merge with.
    pub(crate) fn lookup(&mut self, decl: DeclId, scope: SymbolId, use_members: bool, space: DeclSpace) -> Existing {
        match self.find_existing(decl, scope, use_members, space) {
            None => Existing::None,
            Some(symbol) => {
                if self.prepare_reuse(symbol) {
                    Existing::Live(symbol)
                } else {
                    Existing::Stale(symbol)
                }
            }
        }
    }

    /// Value-space lookup first, then type space.
    pub(crate) fn lookup_either(&mut self, decl: DeclId, scope: SymbolId, use_members: bool) -> Existing {
        match self.lookup(decl, scope, use_members, DeclSpace::Value) {
            Existing::None => self.lookup(decl, scope, use_members, DeclSpace::Type),
            found => found,
        }
    }

    /// A module declared with no value members that has not yet been
    /// merged with a value.
    pub(crate) fn is_augmentable_module(&self, symbol: SymbolId) -> bool {
        if !self.options.merge_modules_with_values {
            return false;
        }
        let Some(sym) = self.chain.symbols.get(symbol) else {
            return false;
        };
        matches!(sym.kind, SymbolKind::Container(_))
            && sym.merged.is_none()
            && sym
                .declarations
                .iter()
                .all(|&d| !self.has_flag(d, DeclFlags::INSTANTIATED))
    }

    pub(crate) fn link_merged(&mut self, a: SymbolId, b: SymbolId) {
        if let Some(sym) = self.chain.symbols.get_mut(a) {
            sym.merged = b;
        }
        if let Some(sym) = self.chain.symbols.get_mut(b) {
            sym.merged = a;
        }
    }

    // =========================================================================
    // Type parameters and parameters
    // =========================================================================

    /// Bind the type-parameter children of `decl`, reusing symbols from
    /// `existing` by name (split interface/class declarations share them).
    /// Duplicate names within one decl are reported.
    pub(crate) fn bind_type_parameters(&mut self, decl: DeclId, existing: &[SymbolId]) -> Vec<SymbolId> {
        let mut seen = FxHashSet::default();
        let mut bound = Vec::new();
        let children: Vec<DeclId> = self
            .chain
            .decls
            .children(decl)
            .iter()
            .copied()
            .filter(|&c| self.decl_kind(c) == Some(DeclKind::TypeParameter))
            .collect();

        for child in children {
            self.mark_bound(child);
            let name = self.decl_name(child);
            if !seen.insert(name.clone()) {
                self.bind_duplicate(child, SymbolKind::TypeParameter { constraint: SymbolId::NONE }, SymbolFlags::empty());
                self.bind_children(child);
                continue;
            }
            let reused = existing
                .iter()
                .copied()
                .find(|&s| self.chain.symbols.name(s) == name);
            let symbol = match reused {
                Some(symbol) => {
                    self.prepare_reuse(symbol);
                    self.attach(child, symbol);
                    symbol
                }
                None => self.create_symbol(
                    child,
                    SymbolKind::TypeParameter {
                        constraint: SymbolId::NONE,
                    },
                    SymbolFlags::empty(),
                ),
            };
            self.bind_children(child);
            bound.push(symbol);
        }
        bound
    }

    /// Merge freshly bound type parameters into a shape's list.
    pub(crate) fn merge_type_parameters(&mut self, owner: SymbolId, bound: &[SymbolId]) {
        if let Some(shape) = self.chain.symbols.shape_mut(owner) {
            for &tp in bound {
                if !shape.type_parameters.contains(&tp) {
                    shape.type_parameters.push(tp);
                }
            }
        }
    }

    /// Bind the parameter children of `decl` into `signature`. When
    /// `locals` is set (a body exists), parameters are registered as locals
    /// of that scope so body `var`s of the same name merge into them.
    pub(crate) fn bind_parameters(&mut self, decl: DeclId, signature: &mut SignatureData, locals: SymbolId) {
        let mut seen = FxHashSet::default();
        let children: Vec<DeclId> = self
            .chain
            .decls
            .children(decl)
            .iter()
            .copied()
            .filter(|&c| self.decl_kind(c) == Some(DeclKind::Parameter))
            .collect();

        for child in children {
            self.mark_bound(child);
            let optional = self.has_flag(child, DeclFlags::OPTIONAL) || self.has_flag(child, DeclFlags::HAS_INITIALIZER);
            let rest = self.has_flag(child, DeclFlags::REST);
            let kind = SymbolKind::Parameter { optional, rest };
            let name = self.decl_name(child);
            let symbol = if seen.insert(name.clone()) {
                let symbol = self.create_symbol(child, kind, SymbolFlags::empty());
                if locals.is_some() {
                    self.register(child, symbol, locals, false, &[DeclSpace::Value]);
                }
                symbol
            } else {
                self.chain
                    .post_decl_diagnostic(child, diagnostic_codes::DUPLICATE_IDENTIFIER, &[&name]);
                self.create_symbol(child, kind, SymbolFlags::DUPLICATE)
            };
            self.bind_children(child);
            signature.has_var_args |= rest;
            signature.parameters.push(symbol);
        }
    }

    /// Allocate a signature symbol owned by `decl`.
    pub(crate) fn create_signature(&mut self, decl: DeclId, data: SignatureData) -> SymbolId {
        let symbol = self.chain.symbols.alloc("", SymbolKind::Signature(data), SymbolFlags::empty());
        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            sym.add_declaration(decl);
            sym.binding_phase = self.phase;
        }
        self.set_signature(decl, symbol);
        symbol
    }
}
