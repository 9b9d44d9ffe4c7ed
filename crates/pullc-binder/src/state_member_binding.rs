//! Binders for value declarations and members: variables, properties,
//! functions and methods (with overload merging), constructors, accessors
//! and call/construct/index signature members.

use pullc_common::diagnostics::diagnostic_codes;
use tracing::trace;

use crate::decl::{DeclFlags, DeclId, DeclKind, DeclSpace};
use crate::symbols::{SignatureData, SignatureKind, SymbolFlags, SymbolId, SymbolKind, TypeShape};

use super::state::BinderState;
use super::state_binding::Existing;

impl BinderState<'_> {
    fn kind_matches(&self, symbol: SymbolId, pred: impl Fn(&SymbolKind) -> bool) -> bool {
        self.chain.symbols.get(symbol).is_some_and(|s| pred(&s.kind))
    }

    // =========================================================================
    // Variables and properties
    // =========================================================================

    pub(crate) fn bind_variable(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);
        match self.lookup(decl, scope, use_members, DeclSpace::Value) {
            // `var` redeclarations (and a `var` redeclaring a parameter) merge;
            // type agreement is checked later.
            Existing::Live(found)
                if self.kind_matches(found, |k| matches!(k, SymbolKind::Variable | SymbolKind::Parameter { .. })) =>
            {
                self.attach(decl, found);
            }
            Existing::Live(_) => {
                self.bind_duplicate(decl, SymbolKind::Variable, flags);
            }
            Existing::Stale(found) if self.kind_matches(found, |k| matches!(k, SymbolKind::Variable)) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Value]);
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, SymbolKind::Variable, flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Value]);
            }
        }
    }

    pub(crate) fn bind_property(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);
        let kind = SymbolKind::Property {
            optional: self.has_flag(decl, DeclFlags::OPTIONAL),
        };
        match self.lookup(decl, scope, use_members, DeclSpace::Value) {
            Existing::Live(_) => {
                self.bind_duplicate(decl, kind, flags);
            }
            Existing::Stale(found) if self.kind_matches(found, |k| matches!(k, SymbolKind::Property { .. })) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Value]);
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, kind, flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Value]);
            }
        }
    }

    // =========================================================================
    // Functions and methods
    // =========================================================================

    pub(crate) fn bind_function(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let existing = self.lookup(decl, scope, use_members, DeclSpace::Value);
        let mut augments = SymbolId::NONE;
        if existing == Existing::None
            && let Existing::Live(module) = self.lookup(decl, scope, use_members, DeclSpace::Type)
            && self.is_augmentable_module(module)
        {
            augments = module;
        }
        let function = self.bind_overloadable(decl, scope, use_members, existing, |k| matches!(k, SymbolKind::Function), SymbolKind::Function);
        if augments.is_some() {
            self.link_merged(function, augments);
        }
    }

    pub(crate) fn bind_method(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let existing = self.lookup(decl, scope, use_members, DeclSpace::Value);
        let optional = self.has_flag(decl, DeclFlags::OPTIONAL);
        self.bind_overloadable(
            decl,
            scope,
            use_members,
            existing,
            |k| matches!(k, SymbolKind::Method { .. }),
            SymbolKind::Method { optional },
        );
    }

    /// Shared body of function and method binding: overload declarations of
    /// one name share a value symbol whose function type collects one call
    /// signature per declaration.
    fn bind_overloadable(
        &mut self,
        decl: DeclId,
        scope: SymbolId,
        use_members: bool,
        existing: Existing,
        same_kind: impl Fn(&SymbolKind) -> bool,
        kind: SymbolKind,
    ) -> SymbolId {
        let flags = self.symbol_flags(decl);
        let value = match existing {
            Existing::Live(found) if self.kind_matches(found, &same_kind) => {
                trace!(name = %self.decl_name(decl), "overload merge");
                self.attach(decl, found);
                found
            }
            Existing::Live(_) => self.bind_duplicate(decl, kind, flags),
            Existing::Stale(found) if self.kind_matches(found, &same_kind) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Value]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, kind, flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Value]);
                symbol
            }
        };

        let function_type = self.ensure_function_type(decl, value);
        let has_body = !self.has_flag(decl, DeclFlags::SIGNATURE);
        if has_body && self.has_definition(function_type, SignatureKind::Call) {
            self.chain
                .post_decl_diagnostic(decl, diagnostic_codes::DUPLICATE_FUNCTION_IMPLEMENTATION, &[]);
        }

        let mut data = SignatureData::new(SignatureKind::Call);
        data.is_definition = has_body;
        data.type_parameters = self.bind_type_parameters(decl, &[]);
        let locals = if has_body { function_type } else { SymbolId::NONE };
        self.bind_parameters(decl, &mut data, locals);
        let signature = self.create_signature(decl, data);
        if let Some(shape) = self.chain.symbols.shape_mut(function_type) {
            shape.call_signatures.push(signature);
        }
        self.set_scope(decl, function_type);
        value
    }

    /// The function type of a function/method symbol, created on first use.
    fn ensure_function_type(&mut self, decl: DeclId, value: SymbolId) -> SymbolId {
        let current = self.chain.symbols.get(value).map_or(SymbolId::NONE, |s| s.type_id);
        let function_type = if self.kind_matches(current, |k| matches!(k, SymbolKind::FunctionType(_))) {
            current
        } else {
            let name = self.decl_name(decl);
            let ft = self
                .chain
                .symbols
                .alloc(&name, SymbolKind::FunctionType(TypeShape::default()), SymbolFlags::empty());
            if let Some(sym) = self.chain.symbols.get_mut(value) {
                sym.type_id = ft;
            }
            ft
        };
        if let Some(sym) = self.chain.symbols.get_mut(function_type) {
            sym.add_declaration(decl);
            sym.container = value;
        }
        function_type
    }

    /// Whether a live implementation signature of `kind` already exists.
    fn has_definition(&self, owner: SymbolId, kind: SignatureKind) -> bool {
        let Some(shape) = self.chain.symbols.shape(owner) else {
            return false;
        };
        let list = match kind {
            SignatureKind::Call => &shape.call_signatures,
            SignatureKind::Construct => &shape.construct_signatures,
            SignatureKind::Index => &shape.index_signatures,
        };
        list.iter().any(|&sig| {
            self.chain
                .symbols
                .get(sig)
                .is_some_and(|s| !s.declarations.is_empty() && s.signature().is_some_and(|d| d.is_definition))
        })
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub(crate) fn bind_constructor(&mut self, decl: DeclId) {
        let class_decl = self.parent_decl(decl);
        let class = self.parent_scope(decl);
        let ctor = self.chain.symbols.shape(class).map_or(SymbolId::NONE, |s| s.associated);
        if ctor.is_none() {
            // Constructor outside a class body: nothing to attach to.
            let symbol = self.create_symbol(decl, SymbolKind::FunctionType(TypeShape::default()), SymbolFlags::empty());
            self.set_scope(decl, symbol);
            return;
        }
        self.attach(decl, ctor);

        let has_body = !self.has_flag(decl, DeclFlags::SIGNATURE);
        if has_body && self.has_definition(ctor, SignatureKind::Construct) {
            self.chain
                .post_decl_diagnostic(decl, diagnostic_codes::DUPLICATE_FUNCTION_IMPLEMENTATION, &[]);
        }

        let mut data = SignatureData::new(SignatureKind::Construct);
        data.is_definition = has_body;
        data.return_type = class;
        data.type_parameters = self
            .chain
            .symbols
            .shape(class)
            .map(|s| s.type_parameters.clone())
            .unwrap_or_default();
        let locals = if has_body { ctor } else { SymbolId::NONE };
        self.bind_parameters(decl, &mut data, locals);
        let signature = self.create_signature(decl, data);
        if let Some(shape) = self.chain.symbols.shape_mut(ctor) {
            shape.construct_signatures.push(signature);
            shape.has_default_constructor = false;
        }
        trace!(class_decl = class_decl.0, "constructor bound");
        self.set_scope(decl, ctor);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub(crate) fn bind_accessor(&mut self, decl: DeclId, is_getter: bool) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);
        let empty = SymbolKind::Accessor {
            getter: SymbolId::NONE,
            setter: SymbolId::NONE,
        };
        let slot_free = |kind: &SymbolKind| match kind {
            SymbolKind::Accessor { getter, setter } => {
                if is_getter {
                    getter.is_none()
                } else {
                    setter.is_none()
                }
            }
            _ => false,
        };
        let accessor = match self.lookup(decl, scope, use_members, DeclSpace::Value) {
            Existing::Live(found) if self.kind_matches(found, slot_free) => {
                self.attach(decl, found);
                found
            }
            Existing::Live(_) => self.bind_duplicate(decl, empty, flags),
            Existing::Stale(found) if self.kind_matches(found, |k| matches!(k, SymbolKind::Accessor { .. })) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Value]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, empty, flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Value]);
                symbol
            }
        };

        let name = self.decl_name(decl);
        let function_type = self
            .chain
            .symbols
            .alloc(&name, SymbolKind::FunctionType(TypeShape::default()), SymbolFlags::empty());
        if let Some(sym) = self.chain.symbols.get_mut(function_type) {
            sym.add_declaration(decl);
            sym.container = accessor;
        }
        let mut data = SignatureData::new(SignatureKind::Call);
        data.is_definition = true;
        self.bind_parameters(decl, &mut data, function_type);
        let signature = self.create_signature(decl, data);
        if let Some(shape) = self.chain.symbols.shape_mut(function_type) {
            shape.call_signatures.push(signature);
        }
        if let Some(sym) = self.chain.symbols.get_mut(accessor)
            && let SymbolKind::Accessor { getter, setter } = &mut sym.kind
        {
            if is_getter {
                *getter = function_type;
            } else {
                *setter = function_type;
            }
        }
        self.set_scope(decl, function_type);
    }

    // =========================================================================
    // Signature members
    // =========================================================================

    pub(crate) fn bind_signature_decl(&mut self, decl: DeclId) {
        let (scope, _) = self.registration_target(decl);
        let kind = match self.decl_kind(decl) {
            Some(DeclKind::ConstructSignature) => SignatureKind::Construct,
            Some(DeclKind::IndexSignature) => SignatureKind::Index,
            _ => SignatureKind::Call,
        };
        let mut data = SignatureData::new(kind);
        data.type_parameters = self.bind_type_parameters(decl, &[]);
        self.bind_parameters(decl, &mut data, SymbolId::NONE);
        let signature = self.create_signature(decl, data);
        self.attach(decl, signature);
        if let Some(shape) = self.chain.symbols.shape_mut(scope) {
            match kind {
                SignatureKind::Call => shape.call_signatures.push(signature),
                SignatureKind::Construct => shape.construct_signatures.push(signature),
                SignatureKind::Index => shape.index_signatures.push(signature),
            }
        }
    }
}
