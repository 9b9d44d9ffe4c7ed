//! Declaration checks: variables, parameters, properties, function-like
//! declarations and their overload groups, accessors, modules, enums,
//! imports and index signatures.

use std::sync::Arc;

use pullc_binder::{DeclFlags, DeclId, DeclKind, SymbolId, SymbolKind};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{
    TypeClass, TypeResolver, are_identical, is_numeric_name, is_signature_assignable_to, is_subtype_of, widen,
};
use pullc_syntax::{NodeIndex, SyntaxKind};
use tracing::trace;

use crate::resolver::{annotation_of, collect_return_expressions, initializer_of};
use crate::state::CheckerState;

impl CheckerState<'_> {
    // =========================================================================
    // Variables
    // =========================================================================

    pub(crate) fn check_variable_declaration(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let Some(data) = arena.get(node).and_then(|n| arena.get_variable_declaration(n)) else {
            return;
        };
        let (annotation, initializer) = (data.type_annotation, data.initializer);
        let decl = self.decl_of(node);
        let symbol = self.symbol_of_decl(decl);

        let declared = self.check_type_node(annotation);
        let symbol_type = self.resolver.type_of_symbol(symbol);
        if initializer.is_some() {
            let contextual = declared.is_some().then_some(declared);
            let initializer_type = self.check_expression(initializer, contextual);
            if declared.is_some() {
                self.check_type_assignable(initializer_type, declared, node);
            }
        }

        self.check_variable_redeclaration(decl, symbol, symbol_type);
        if self.options.no_implicit_any
            && annotation.is_none()
            && symbol_type == self.resolver.primitives.any
            && self.is_implicitly_any(initializer)
        {
            let name = self.decl_name(decl);
            self.error_at_decl(decl, diagnostic_codes::VARIABLE_IMPLICITLY_HAS_ANY, &[&name, "any"]);
        }
        if self.options.check_privacy {
            self.check_variable_privacy(decl, symbol_type);
        }
    }

    /// Every declaration after the first must agree with the symbol's type.
    fn check_variable_redeclaration(&mut self, decl: DeclId, symbol: SymbolId, symbol_type: SymbolId) {
        let Some(first) = self.resolver.symbol(symbol).map(|s| s.first_declaration()) else {
            return;
        };
        if first.is_none() || first == decl {
            return;
        }
        let own = self.declaration_type(decl);
        if self.resolver.is_error_or_any(own) && self.resolver.is_error_or_any(symbol_type) {
            return;
        }
        if are_identical(&mut self.resolver, own, symbol_type) {
            return;
        }
        let name = self.decl_name(decl);
        let expected = self.resolver.type_display(symbol_type);
        let actual = self.resolver.type_display(own);
        self.error_at_decl(
            decl,
            diagnostic_codes::SUBSEQUENT_VARIABLE_DECLARATIONS_TYPE,
            &[&name, &expected, &actual],
        );
    }

    /// Type a single variable declaration contributes on its own.
    fn declaration_type(&mut self, decl: DeclId) -> SymbolId {
        let Some(node) = self.resolver.decl(decl).map(|d| d.node) else {
            return self.resolver.primitives.any;
        };
        let annotation = annotation_of(&self.arena, node);
        if annotation.is_some() {
            let unit = self.unit;
            return self.resolver.resolve_type_node(unit, annotation);
        }
        let initializer = initializer_of(&self.arena, node);
        if initializer.is_some() {
            let ty = self.check_expression(initializer, None);
            return widen(&mut self.resolver, ty);
        }
        self.resolver.primitives.any
    }

    /// No initializer, or one whose `null`/`undefined` type widens to `any`.
    fn is_implicitly_any(&mut self, initializer: NodeIndex) -> bool {
        if initializer.is_none() {
            return true;
        }
        let unit = self.unit;
        let Some(ty) = self.resolver.resolved_expression(unit, initializer) else {
            return false;
        };
        matches!(self.resolver.classify(ty), TypeClass::Null | TypeClass::Undefined)
    }

    // =========================================================================
    // Parameters and type parameters
    // =========================================================================

    pub(crate) fn check_parameter(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let Some(data) = arena.get(node).and_then(|n| arena.get_parameter(n)) else {
            return;
        };
        let (annotation, initializer, rest) = (data.type_annotation, data.initializer, data.dot_dot_dot_token);
        let decl = self.decl_of(node);
        let symbol = self.symbol_of_decl(decl);

        let declared = self.check_type_node(annotation);
        let parameter_type = self.resolver.type_of_symbol(symbol);
        if initializer.is_some() {
            let contextual = Some(parameter_type).filter(|t| t.is_some());
            let initializer_type = self.check_expression(initializer, contextual);
            self.check_type_assignable(initializer_type, parameter_type, node);
        }

        if self.options.no_implicit_any
            && declared.is_none()
            && !self.resolver.is_contextually_typed(symbol)
            && self.is_implicitly_any(initializer)
            && !self.in_type_position(decl)
        {
            let name = self.decl_name(decl);
            let shown = if rest { "any[]" } else { "any" };
            self.error_at_decl(decl, diagnostic_codes::PARAMETER_IMPLICITLY_HAS_ANY, &[&name, shown]);
        }
    }

    /// Whether a parameter belongs to a signature that has no body to infer
    /// from but is itself contextually typed, such as a setter.
    fn in_type_position(&self, parameter: DeclId) -> bool {
        let owner = self.resolver.chain().decls.parent(parameter);
        matches!(self.resolver.decl_kind(owner), Some(DeclKind::SetAccessor))
            && self.setter_has_getter_type(owner)
    }

    fn setter_has_getter_type(&self, setter: DeclId) -> bool {
        let symbol = self.symbol_of_decl(setter);
        matches!(
            self.resolver.symbol(symbol).map(|s| &s.kind),
            Some(SymbolKind::Accessor { getter, .. }) if getter.is_some()
        )
    }

    pub(crate) fn check_type_parameter(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        if let Some(constraint) = arena.get(node).and_then(|n| arena.get_type_parameter(n)).map(|t| t.constraint) {
            self.check_type_node(constraint);
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub(crate) fn check_property_declaration(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let Some(data) = arena.get(node).and_then(|n| arena.get_property(n)) else {
            return;
        };
        let (annotation, initializer) = (data.type_annotation, data.initializer);
        let decl = self.decl_of(node);
        let symbol = self.symbol_of_decl(decl);
        let is_static = self.resolver.decl(decl).is_some_and(|d| d.is_static());

        let declared = self.check_type_node(annotation);
        let property_type = self.resolver.type_of_symbol(symbol);
        if initializer.is_some() {
            let saved = self.ctx.in_static_initializer;
            self.ctx.in_static_initializer = is_static;
            self.ctx.push_decl(decl);
            let contextual = declared.is_some().then_some(declared);
            let initializer_type = self.check_expression(initializer, contextual);
            self.ctx.pop_decl();
            self.ctx.in_static_initializer = saved;
            if declared.is_some() {
                self.check_type_assignable(initializer_type, declared, node);
            }
        }

        if self.options.no_implicit_any
            && annotation.is_none()
            && property_type == self.resolver.primitives.any
            && self.is_implicitly_any(initializer)
        {
            let name = self.decl_name(decl);
            self.error_at_decl(decl, diagnostic_codes::MEMBER_IMPLICITLY_HAS_ANY, &[&name, "any"]);
        }
        if self.options.check_privacy {
            self.check_property_privacy(decl, property_type);
        }
    }

    // =========================================================================
    // Function-like declarations
    // =========================================================================

    /// Check a function, method, constructor, accessor, signature or
    /// function expression together with the rules of its declaration group.
    pub(crate) fn check_function_like(&mut self, node: NodeIndex) {
        let decl = self.decl_of(node);
        let has_return_value = self.check_function_like_body(node);
        let Some(kind) = self.resolver.decl_kind(decl) else {
            return;
        };
        match kind {
            DeclKind::GetAccessor => self.check_getter(decl, node, has_return_value),
            DeclKind::Constructor => self.check_constructor(decl, node),
            _ => {}
        }
        if matches!(kind, DeclKind::Function | DeclKind::Method | DeclKind::Constructor) && !self.is_type_member(decl) {
            self.check_overload_group(decl, kind);
        }
        if matches!(kind, DeclKind::Function | DeclKind::Method | DeclKind::FunctionExpression) {
            self.check_function_returns_value(decl, node, has_return_value);
        }
        if self.options.no_implicit_any {
            self.check_implicit_any_return(decl, kind, node);
        }
        if self.options.check_privacy {
            self.check_signature_privacy(decl);
        }
    }

    /// Walk type parameters, parameters, return annotation and body.
    /// Returns whether the body returns a value.
    pub(crate) fn check_function_like_body(&mut self, node: NodeIndex) -> bool {
        let arena = Arc::clone(&self.arena);
        let Some(function) = arena.get(node).and_then(|n| arena.get_function(n)) else {
            return false;
        };
        let type_parameters: Vec<NodeIndex> = function.type_parameters.iter().collect();
        let parameters: Vec<NodeIndex> = function.parameters.iter().collect();
        let (annotation, body) = (function.type_annotation, function.body);
        let decl = self.decl_of(node);
        let kind = self.resolver.decl_kind(decl);
        let is_arrow = self
            .resolver
            .decl(decl)
            .is_some_and(|d| d.flags.contains(DeclFlags::ARROW));

        // `this` and `super` restrictions stop at a non-arrow function.
        let saved = (
            self.ctx.in_super_call_arguments,
            self.ctx.in_constructor_parameters,
            self.ctx.in_static_initializer,
        );
        if !is_arrow {
            self.ctx.in_super_call_arguments = false;
            self.ctx.in_static_initializer = false;
        }

        self.ctx.push_decl(decl);
        for type_parameter in type_parameters {
            self.check_node(type_parameter);
        }
        self.ctx.in_constructor_parameters = kind == Some(DeclKind::Constructor) || (is_arrow && saved.1);
        for parameter in parameters {
            self.check_node(parameter);
        }
        self.ctx.in_constructor_parameters = is_arrow && saved.1;
        self.check_type_node(annotation);

        self.ctx.push_return_frame();
        if body.is_some() {
            if arena.kind(body) == Some(SyntaxKind::Block) {
                self.check_node(body);
            } else {
                let expected = self.declared_return_type(decl);
                let ty = self.check_expression(body, expected);
                self.ctx.mark_return_with_value();
                if let Some(expected) = expected {
                    self.check_type_assignable(ty, expected, body);
                }
            }
        }
        let has_return_value = self.ctx.pop_return_frame();
        self.ctx.pop_decl();

        (
            self.ctx.in_super_call_arguments,
            self.ctx.in_constructor_parameters,
            self.ctx.in_static_initializer,
        ) = saved;
        has_return_value
    }

    /// Annotated return type of a function-like decl.
    pub(crate) fn declared_return_type(&mut self, decl: DeclId) -> Option<SymbolId> {
        let signature = self.resolver.decl(decl).map(|d| d.signature_symbol)?;
        if signature.is_none() || !self.resolver.signature_has_annotation(signature) {
            return None;
        }
        if self.resolver.decl_kind(decl) == Some(DeclKind::Constructor) {
            return None;
        }
        Some(self.resolver.return_type_of(signature))
    }

    /// Members of interfaces and object types are plain signatures.
    fn is_type_member(&self, decl: DeclId) -> bool {
        let parent = self.resolver.chain().decls.parent(decl);
        matches!(
            self.resolver.decl_kind(parent),
            Some(DeclKind::Interface | DeclKind::ObjectType)
        )
    }

    fn function_body(&self, node: NodeIndex) -> NodeIndex {
        self.arena
            .get(node)
            .and_then(|n| self.arena.get_function(n))
            .map_or(NodeIndex::NONE, |f| f.body)
    }

    /// A block body consisting of a single `throw` statement.
    fn is_single_throw(&self, body: NodeIndex) -> bool {
        let Some(block) = self.arena.get(body).and_then(|n| self.arena.get_block(n)) else {
            return false;
        };
        let statements: Vec<NodeIndex> = block.statements.iter().collect();
        statements.len() == 1 && self.arena.kind(statements[0]) == Some(SyntaxKind::ThrowStatement)
    }

    fn check_function_returns_value(&mut self, decl: DeclId, node: NodeIndex, has_return_value: bool) {
        let body = self.function_body(node);
        if has_return_value || self.arena.kind(body) != Some(SyntaxKind::Block) || self.is_single_throw(body) {
            return;
        }
        let Some(declared) = self.declared_return_type(decl) else {
            return;
        };
        if matches!(
            self.resolver.classify(declared),
            TypeClass::Void | TypeClass::Any | TypeClass::Error
        ) {
            return;
        }
        let annotation = annotation_of(&self.arena, node);
        self.error_at_node(annotation, diagnostic_codes::FUNCTION_MUST_RETURN_VALUE, &[]);
    }

    /// 7010: no annotation and every returned expression is `null` or
    /// `undefined`, so the inferred type widened to `any`.
    fn check_implicit_any_return(&mut self, decl: DeclId, kind: DeclKind, node: NodeIndex) {
        if !matches!(
            kind,
            DeclKind::Function | DeclKind::Method | DeclKind::FunctionExpression | DeclKind::GetAccessor
        ) {
            return;
        }
        if annotation_of(&self.arena, node).is_some() {
            return;
        }
        let body = self.function_body(node);
        if body.is_none() {
            return;
        }
        let mut expressions = Vec::new();
        if self.arena.kind(body) == Some(SyntaxKind::Block) {
            collect_return_expressions(&self.arena, body, &mut expressions);
        } else {
            expressions.push(body);
        }
        if expressions.is_empty() {
            return;
        }
        let unit = self.unit;
        for expression in expressions {
            let ty = self
                .resolver
                .resolved_expression(unit, expression)
                .unwrap_or(self.resolver.primitives.any);
            if !matches!(self.resolver.classify(ty), TypeClass::Null | TypeClass::Undefined) {
                return;
            }
        }
        let name = match self.decl_name(decl) {
            name if name.is_empty() => "(Anonymous function)".to_string(),
            name => name,
        };
        self.error_at_decl(decl, diagnostic_codes::RETURN_TYPE_IMPLICITLY_ANY, &[&name, "any"]);
    }

    // =========================================================================
    // Overload groups
    // =========================================================================

    /// Overload rules checked from the point of view of one member of the
    /// group: flag agreement, a missing implementation and compatibility
    /// with the implementation.
    fn check_overload_group(&mut self, decl: DeclId, kind: DeclKind) {
        let symbol = self.symbol_of_decl(decl);
        let group: Vec<DeclId> = self
            .resolver
            .symbol(symbol)
            .map(|s| {
                s.declarations
                    .iter()
                    .copied()
                    .filter(|&d| self.resolver.decl_kind(d) == Some(kind))
                    .collect()
            })
            .unwrap_or_default();
        let Some(this) = self.resolver.decl(decl) else {
            return;
        };
        if !this.is_signature_only() {
            return;
        }
        let (flags, ambient) = (this.flags, this.is_ambient());
        let definition = group
            .iter()
            .copied()
            .find(|&d| self.resolver.decl(d).is_some_and(|d| !d.is_signature_only()));
        let reference = definition.or_else(|| group.first().copied()).unwrap_or(decl);
        trace!(decl = decl.0, group = group.len(), "overload group");

        if reference != decl {
            let reference_flags = self.resolver.decl(reference).map(|d| d.flags).unwrap_or(flags);
            for (flag, code) in [
                (DeclFlags::EXPORTED, diagnostic_codes::OVERLOADS_EXPORTED_MISMATCH),
                (DeclFlags::AMBIENT, diagnostic_codes::OVERLOADS_AMBIENT_MISMATCH),
                (DeclFlags::PRIVATE, diagnostic_codes::OVERLOADS_VISIBILITY_MISMATCH),
                (DeclFlags::OPTIONAL, diagnostic_codes::OVERLOADS_OPTIONAL_MISMATCH),
            ] {
                if flags.contains(flag) != reference_flags.contains(flag) {
                    self.error_at_decl(decl, code, &[]);
                }
            }
        }

        match definition {
            None => {
                if !ambient && group.last() == Some(&decl) {
                    self.error_at_decl(decl, diagnostic_codes::FUNCTION_IMPLEMENTATION_MISSING, &[]);
                }
            }
            Some(definition) => {
                let overload = self.resolver.decl(decl).map(|d| d.signature_symbol);
                let implementation = self.resolver.decl(definition).map(|d| d.signature_symbol);
                let (Some(overload), Some(implementation)) = (overload, implementation) else {
                    return;
                };
                let Some(overload) = self.resolver.signature_info(overload) else {
                    return;
                };
                let Some(implementation) = self.resolver.signature_info(implementation) else {
                    return;
                };
                if !is_signature_assignable_to(&mut self.resolver, &implementation, &overload) {
                    self.error_at_decl(decl, diagnostic_codes::OVERLOAD_NOT_COMPATIBLE_WITH_IMPLEMENTATION, &[]);
                }
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Getter body and the getter/setter pair rules, checked once from the
    /// getter.
    fn check_getter(&mut self, decl: DeclId, node: NodeIndex, has_return_value: bool) {
        let body = self.function_body(node);
        if !has_return_value && self.arena.kind(body) == Some(SyntaxKind::Block) && !self.is_single_throw(body) {
            self.error_at_decl(decl, diagnostic_codes::GETTER_MUST_RETURN_VALUE, &[]);
        }

        let symbol = self.symbol_of_decl(decl);
        let setter = match self.resolver.symbol(symbol).map(|s| &s.kind) {
            Some(SymbolKind::Accessor { setter, .. }) => *setter,
            _ => return,
        };
        let Some(setter_decl) = self.resolver.symbol(setter).map(|s| s.first_declaration()) else {
            return;
        };
        let getter_private = self.resolver.decl(decl).is_some_and(|d| d.is_private());
        let setter_private = self.resolver.decl(setter_decl).is_some_and(|d| d.is_private());
        if getter_private != setter_private {
            self.error_at_decl(decl, diagnostic_codes::ACCESSOR_VISIBILITY_MISMATCH, &[]);
        }

        let getter_signature = self.resolver.decl(decl).map_or(SymbolId::NONE, |d| d.signature_symbol);
        let setter_signature = self
            .resolver
            .decl(setter_decl)
            .map_or(SymbolId::NONE, |d| d.signature_symbol);
        if !self.resolver.signature_has_annotation(getter_signature) {
            return;
        }
        let Some(parameter) = self
            .resolver
            .chain()
            .symbols
            .signature(setter_signature)
            .and_then(|s| s.parameters.first().copied())
        else {
            return;
        };
        let parameter_annotated = self
            .resolver
            .symbol(parameter)
            .map(|p| p.first_declaration())
            .and_then(|d| self.resolver.decl(d).map(|d| d.node))
            .is_some_and(|n| annotation_of(&self.arena, n).is_some());
        if !parameter_annotated {
            return;
        }
        let getter_type = self.resolver.return_type_of(getter_signature);
        let setter_type = self.resolver.type_of_symbol(parameter);
        if !are_identical(&mut self.resolver, getter_type, setter_type) {
            self.error_at_decl(decl, diagnostic_codes::ACCESSOR_TYPE_MISMATCH, &[]);
        }
    }

    // =========================================================================
    // Modules, enums and imports
    // =========================================================================

    pub(crate) fn check_module_declaration(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let statements: Vec<NodeIndex> = arena
            .get(node)
            .and_then(|n| arena.get_module(n))
            .map(|m| m.statements.iter().collect())
            .unwrap_or_default();
        let decl = self.decl_of(node);
        self.ctx.push_decl(decl);
        for statement in statements {
            self.check_node(statement);
        }
        self.ctx.pop_decl();
    }

    pub(crate) fn check_enum_declaration(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let members: Vec<NodeIndex> = arena
            .get(node)
            .and_then(|n| arena.get_enum(n))
            .map(|e| e.members.iter().collect())
            .unwrap_or_default();
        let decl = self.decl_of(node);
        self.ctx.push_decl(decl);
        for member in members {
            if !self.mark_checked(member) {
                continue;
            }
            let initializer = initializer_of(&arena, member);
            if initializer.is_none() {
                continue;
            }
            let ty = self.check_expression(initializer, None);
            let class = self.resolver.classify(ty);
            if !class.is_numeric() && !class.is_any_or_error() {
                self.error_at_node(initializer, diagnostic_codes::ENUM_INITIALIZER_MUST_BE_NUMBER, &[]);
            }
        }
        self.ctx.pop_decl();
    }

    /// Resolve the alias so an unknown name (2304), a missing module member
    /// (2305) or a cycle (2303) is reported in the importing unit.
    pub(crate) fn check_import_declaration(&mut self, node: NodeIndex) {
        let decl = self.decl_of(node);
        let symbol = self.symbol_of_decl(decl);
        self.ctx.in_import_declaration = true;
        let target = self.resolver.resolve_alias(symbol);
        self.ctx.in_import_declaration = false;
        trace!(import = symbol.0, target = target.0, "import resolved");
    }

    // =========================================================================
    // Index signatures
    // =========================================================================

    /// Index signature rules of a class, interface or object type literal:
    /// one signature per kind, numeric within string, and every member
    /// within the applicable index type.
    pub(crate) fn check_index_signatures_of(&mut self, decl: DeclId, members: &[NodeIndex]) {
        let ty = self.symbol_of_decl(decl);
        if ty.is_none() {
            return;
        }
        for (numeric, label) in [(false, "string"), (true, "number")] {
            let signatures = self.resolver.own_index_signatures(ty, numeric);
            for &duplicate in signatures.iter().skip(1) {
                if let Some(site) = self.resolver.symbol(duplicate).map(|s| s.first_declaration()) {
                    self.error_at_decl(site, diagnostic_codes::DUPLICATE_INDEX_SIGNATURE, &[label]);
                }
            }
        }

        let string_index = self.resolver.index_type_of(ty, false);
        let numeric_index = self.resolver.index_type_of(ty, true);
        if let (Some(string_type), Some(numeric_type)) = (string_index, numeric_index)
            && !is_subtype_of(&mut self.resolver, numeric_type, string_type)
        {
            let site = self
                .resolver
                .own_index_signatures(ty, true)
                .first()
                .and_then(|&s| self.resolver.symbol(s).map(|s| s.first_declaration()))
                .unwrap_or(decl);
            let numeric_text = self.resolver.type_display(numeric_type);
            let string_text = self.resolver.type_display(string_type);
            self.error_at_decl(
                site,
                diagnostic_codes::NUMERIC_INDEX_NOT_SUBTYPE_OF_STRING_INDEX,
                &[&numeric_text, &string_text],
            );
        }
        if string_index.is_none() && numeric_index.is_none() {
            return;
        }

        for &member in members {
            let member_decl = self.decl_of(member);
            let Some(d) = self.resolver.decl(member_decl) else {
                continue;
            };
            if d.is_static()
                || !matches!(
                    d.kind,
                    DeclKind::Property | DeclKind::Method | DeclKind::GetAccessor | DeclKind::SetAccessor
                )
            {
                continue;
            }
            let name = d.name.clone();
            let member_symbol = d.symbol;
            let member_type = self.resolver.value_type_of(member_symbol);
            if self.resolver.is_error_or_any(member_type) {
                continue;
            }
            if let Some(string_type) = string_index
                && !is_subtype_of(&mut self.resolver, member_type, string_type)
            {
                let member_text = self.resolver.type_display(member_type);
                let index_text = self.resolver.type_display(string_type);
                self.error_at_decl(
                    member_decl,
                    diagnostic_codes::PROPERTY_NOT_ASSIGNABLE_TO_STRING_INDEX,
                    &[&name, &member_text, &index_text],
                );
                continue;
            }
            if let Some(numeric_type) = numeric_index
                && is_numeric_name(&name)
                && !is_subtype_of(&mut self.resolver, member_type, numeric_type)
            {
                let member_text = self.resolver.type_display(member_type);
                let index_text = self.resolver.type_display(numeric_type);
                self.error_at_decl(
                    member_decl,
                    diagnostic_codes::PROPERTY_NOT_ASSIGNABLE_TO_NUMERIC_INDEX,
                    &[&name, &member_text, &index_text],
                );
            }
        }
    }
}
