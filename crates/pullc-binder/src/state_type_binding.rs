//! Binders for type-introducing declarations: modules, enums, classes,
//! interfaces, anonymous object/function types, imports and block scopes.

use pullc_common::diagnostics::diagnostic_codes;
use tracing::debug;

use crate::decl::{DeclFlags, DeclId, DeclKind, DeclSpace};
use crate::symbols::{SignatureData, SignatureKind, SymbolFlags, SymbolId, SymbolKind, TypeShape};

use super::state::{BinderState, MergeAction};
use super::state_binding::Existing;

fn shaped(kind: fn(TypeShape) -> SymbolKind) -> SymbolKind {
    kind(TypeShape::default())
}

impl BinderState<'_> {
    fn is_kind(&self, symbol: SymbolId, pred: impl Fn(&SymbolKind) -> bool) -> bool {
        self.chain.symbols.get(symbol).is_some_and(|s| pred(&s.kind))
    }

    fn merged_of(&self, symbol: SymbolId) -> SymbolId {
        self.chain.symbols.get(symbol).map_or(SymbolId::NONE, |s| s.merged)
    }

    /// Instance type of a module or enum, created on first use.
    fn ensure_instance(&mut self, container: SymbolId) -> SymbolId {
        let existing = self.chain.symbols.shape(container).map_or(SymbolId::NONE, |s| s.associated);
        if existing.is_some() {
            return existing;
        }
        let name = self.chain.symbols.name(container).to_string();
        let instance = self.chain.symbols.alloc(
            &name,
            SymbolKind::ContainerInstance { container },
            SymbolFlags::SYNTHESIZED,
        );
        if let Some(shape) = self.chain.symbols.shape_mut(container) {
            shape.associated = instance;
        }
        instance
    }

    // =========================================================================
    // Modules
    // =========================================================================

    pub(crate) fn bind_container(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);
        let instantiated = self.has_flag(decl, DeclFlags::INSTANTIATED);

        let mut existing = self.lookup(decl, scope, use_members, DeclSpace::Type);
        if existing == Existing::None {
            // A function occupies only the value space.
            if let Existing::Live(found) = self.lookup(decl, scope, use_members, DeclSpace::Value)
                && self.is_kind(found, |k| matches!(k, SymbolKind::Function))
            {
                existing = Existing::Live(found);
            }
        }

        let container = match existing {
            Existing::Live(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Container(_))) => {
                self.attach(decl, found);
                found
            }
            Existing::Live(found)
                if self.is_kind(found, |k| {
                    matches!(k, SymbolKind::Class(_) | SymbolKind::Enum(_) | SymbolKind::Function)
                }) =>
            {
                let partner = self.merged_of(found);
                match self.module_merge_action(partner, instantiated) {
                    MergeAction::Reuse => {
                        self.prepare_reuse(partner);
                        self.attach(decl, partner);
                        partner
                    }
                    MergeAction::Augment => {
                        let container = self.create_symbol(decl, shaped(SymbolKind::Container), flags);
                        self.link_merged(found, container);
                        debug!(name = %self.decl_name(decl), "module merged into value declaration");
                        container
                    }
                    MergeAction::Duplicate => self.bind_duplicate(decl, shaped(SymbolKind::Container), flags),
                }
            }
            Existing::Live(_) => self.bind_duplicate(decl, shaped(SymbolKind::Container), flags),
            Existing::Stale(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Container(_))) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Type]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let container = self.create_symbol(decl, shaped(SymbolKind::Container), flags);
                self.register(decl, container, scope, use_members, &[DeclSpace::Type]);
                container
            }
        };

        if instantiated && self.merged_of(container).is_none() {
            self.register(decl, container, scope, use_members, &[DeclSpace::Value]);
            self.ensure_instance(container);
        }
        self.set_scope(decl, container);
    }

    /// How a module relates to a class/function/enum already bound under
    /// its name. `partner` is the module previously merged into it, if any.
    fn module_merge_action(&self, partner: SymbolId, instantiated: bool) -> MergeAction {
        if partner.is_some() && self.is_kind(partner, |k| matches!(k, SymbolKind::Container(_))) {
            return MergeAction::Reuse;
        }
        if self.options.merge_modules_with_values && !instantiated {
            MergeAction::Augment
        } else {
            MergeAction::Duplicate
        }
    }

    // =========================================================================
    // Enums
    // =========================================================================

    pub(crate) fn bind_enum(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);

        let enum_symbol = match self.lookup(decl, scope, use_members, DeclSpace::Type) {
            Existing::Live(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Enum(_))) => {
                self.check_enum_first_member(decl, found);
                self.attach(decl, found);
                found
            }
            Existing::Live(found) if self.is_augmentable_module(found) => {
                let symbol = self.create_symbol(decl, shaped(SymbolKind::Enum), flags);
                self.link_merged(symbol, found);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Type, DeclSpace::Value]);
                symbol
            }
            Existing::Live(_) => self.bind_duplicate(decl, shaped(SymbolKind::Enum), flags),
            Existing::Stale(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Enum(_))) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Type, DeclSpace::Value]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, shaped(SymbolKind::Enum), flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Type, DeclSpace::Value]);
                symbol
            }
        };
        self.ensure_instance(enum_symbol);
        self.set_scope(decl, enum_symbol);
    }

    /// Of the pieces of a multi-declaration enum, at most one may leave its
    /// first member without an initializer.
    fn check_enum_first_member(&mut self, decl: DeclId, existing: SymbolId) {
        if !self.has_flag(decl, DeclFlags::IMPLICIT_FIRST_MEMBER) {
            return;
        }
        let clash = self.chain.symbols.get(existing).is_some_and(|s| {
            s.declarations
                .iter()
                .any(|&d| d != decl && self.has_flag(d, DeclFlags::IMPLICIT_FIRST_MEMBER))
        });
        if clash {
            self.chain
                .post_decl_diagnostic(decl, diagnostic_codes::ENUM_MULTIPLE_FIRST_MEMBERS, &[]);
        }
    }

    pub(crate) fn bind_enum_member(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = SymbolFlags::EXPORTED;
        let member = match self.lookup(decl, scope, use_members, DeclSpace::Value) {
            Existing::Live(_) => self.bind_duplicate(decl, SymbolKind::EnumMember, flags),
            Existing::Stale(found) if self.is_kind(found, |k| matches!(k, SymbolKind::EnumMember)) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Value]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, SymbolKind::EnumMember, flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Value]);
                symbol
            }
        };
        if let Some(sym) = self.chain.symbols.get_mut(member) {
            sym.container = scope;
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn bind_class(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);

        let existing = match self.lookup(decl, scope, use_members, DeclSpace::Type) {
            Existing::None => self.lookup(decl, scope, use_members, DeclSpace::Value),
            found => found,
        };
        let class = match existing {
            Existing::Live(found) if self.is_augmentable_module(found) => {
                let class = self.create_symbol(decl, shaped(SymbolKind::Class), flags);
                self.link_merged(class, found);
                self.register(decl, class, scope, use_members, &[DeclSpace::Type, DeclSpace::Value]);
                class
            }
            Existing::Live(_) => self.bind_duplicate(decl, shaped(SymbolKind::Class), flags),
            Existing::Stale(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Class(_))) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Type, DeclSpace::Value]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let class = self.create_symbol(decl, shaped(SymbolKind::Class), flags);
                self.register(decl, class, scope, use_members, &[DeclSpace::Type, DeclSpace::Value]);
                class
            }
        };

        // The constructor type shares the class decl so both are pruned together.
        let mut ctor = self.chain.symbols.shape(class).map_or(SymbolId::NONE, |s| s.associated);
        if ctor.is_none() {
            let name = self.decl_name(decl);
            ctor = self
                .chain
                .symbols
                .alloc(&name, shaped(SymbolKind::ConstructorType), flags);
            if let Some(shape) = self.chain.symbols.shape_mut(class) {
                shape.associated = ctor;
            }
            if let Some(shape) = self.chain.symbols.shape_mut(ctor) {
                shape.associated = class;
            }
        }
        self.prepare_reuse(ctor);
        if let Some(sym) = self.chain.symbols.get_mut(ctor) {
            sym.add_declaration(decl);
            sym.container = scope;
        }

        let existing_params = self
            .chain
            .symbols
            .shape(class)
            .map(|s| s.type_parameters.clone())
            .unwrap_or_default();
        let type_params = self.bind_type_parameters(decl, &existing_params);
        self.merge_type_parameters(class, &type_params);
        self.set_scope(decl, class);

        self.bind_children(decl);
        self.bind_default_constructor(decl, class, ctor);
    }

    /// Synthesize a parameterless construct signature when the class body
    /// declares no constructor.
    fn bind_default_constructor(&mut self, decl: DeclId, class: SymbolId, ctor: SymbolId) {
        let declares_constructor = self
            .chain
            .decls
            .children(decl)
            .iter()
            .any(|&c| self.decl_kind(c) == Some(DeclKind::Constructor));
        let has_signatures = self
            .chain
            .symbols
            .shape(ctor)
            .is_some_and(|s| !s.construct_signatures.is_empty());
        if declares_constructor {
            if let Some(shape) = self.chain.symbols.shape_mut(ctor) {
                shape.has_default_constructor = false;
            }
            return;
        }
        if has_signatures {
            return;
        }
        let type_parameters = self
            .chain
            .symbols
            .shape(class)
            .map(|s| s.type_parameters.clone())
            .unwrap_or_default();
        let signature = self.chain.symbols.alloc(
            "",
            SymbolKind::Signature(SignatureData {
                kind: SignatureKind::Construct,
                parameters: Vec::new(),
                return_type: class,
                type_parameters,
                is_definition: true,
                has_var_args: false,
            }),
            SymbolFlags::empty(),
        );
        if let Some(sym) = self.chain.symbols.get_mut(signature) {
            sym.add_declaration(decl);
            sym.binding_phase = self.phase;
        }
        if let Some(shape) = self.chain.symbols.shape_mut(ctor) {
            shape.construct_signatures.push(signature);
            shape.has_default_constructor = true;
        }
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    pub(crate) fn bind_interface(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);

        let iface = match self.lookup(decl, scope, use_members, DeclSpace::Type) {
            Existing::Live(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Interface(_))) => {
                self.attach(decl, found);
                found
            }
            Existing::Live(_) => self.bind_duplicate(decl, shaped(SymbolKind::Interface), flags),
            Existing::Stale(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Interface(_))) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Type]);
                found
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, shaped(SymbolKind::Interface), flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Type]);
                symbol
            }
        };

        let existing_params = self
            .chain
            .symbols
            .shape(iface)
            .map(|s| s.type_parameters.clone())
            .unwrap_or_default();
        let type_params = self.bind_type_parameters(decl, &existing_params);
        self.merge_type_parameters(iface, &type_params);
        self.set_scope(decl, iface);
    }

    // =========================================================================
    // Anonymous types
    // =========================================================================

    /// Type literals and object literal expressions.
    pub(crate) fn bind_object_type(&mut self, decl: DeclId) {
        let symbol = self.create_symbol(decl, shaped(SymbolKind::ObjectType), SymbolFlags::empty());
        self.set_scope(decl, symbol);
    }

    /// Function and constructor type literals.
    pub(crate) fn bind_function_type(&mut self, decl: DeclId, is_constructor: bool) {
        let (kind, sig_kind) = if is_constructor {
            (shaped(SymbolKind::ConstructorType), SignatureKind::Construct)
        } else {
            (shaped(SymbolKind::FunctionType), SignatureKind::Call)
        };
        let symbol = self.create_symbol(decl, kind, SymbolFlags::empty());
        let mut data = SignatureData::new(sig_kind);
        data.type_parameters = self.bind_type_parameters(decl, &[]);
        self.bind_parameters(decl, &mut data, SymbolId::NONE);
        let signature = self.create_signature(decl, data);
        if let Some(shape) = self.chain.symbols.shape_mut(symbol) {
            if is_constructor {
                shape.construct_signatures.push(signature);
            } else {
                shape.call_signatures.push(signature);
            }
        }
        self.set_scope(decl, symbol);
    }

    pub(crate) fn bind_function_expression(&mut self, decl: DeclId) {
        let symbol = self.create_symbol(decl, shaped(SymbolKind::FunctionType), SymbolFlags::empty());
        let mut data = SignatureData::new(SignatureKind::Call);
        data.is_definition = true;
        data.type_parameters = self.bind_type_parameters(decl, &[]);
        self.bind_parameters(decl, &mut data, symbol);
        let signature = self.create_signature(decl, data);
        if let Some(shape) = self.chain.symbols.shape_mut(symbol) {
            shape.call_signatures.push(signature);
        }
        self.set_scope(decl, symbol);
    }

    // =========================================================================
    // Imports and block scopes
    // =========================================================================

    pub(crate) fn bind_import(&mut self, decl: DeclId) {
        let (scope, use_members) = self.registration_target(decl);
        let flags = self.symbol_flags(decl);
        let kind = SymbolKind::Alias {
            target: SymbolId::NONE,
        };
        match self.lookup_either(decl, scope, use_members) {
            Existing::Live(_) => {
                self.bind_duplicate(decl, kind, flags);
            }
            Existing::Stale(found) if self.is_kind(found, |k| matches!(k, SymbolKind::Alias { .. })) => {
                self.attach(decl, found);
                self.register(decl, found, scope, use_members, &[DeclSpace::Value, DeclSpace::Type]);
            }
            Existing::Stale(_) | Existing::None => {
                let symbol = self.create_symbol(decl, kind, flags);
                self.register(decl, symbol, scope, use_members, &[DeclSpace::Value, DeclSpace::Type]);
            }
        }
    }

    /// Catch clauses and `with` blocks only introduce a scope for their locals.
    pub(crate) fn bind_block_scope(&mut self, decl: DeclId) {
        let symbol = self.create_symbol(decl, shaped(SymbolKind::ObjectType), SymbolFlags::empty());
        self.set_scope(decl, symbol);
    }
}
