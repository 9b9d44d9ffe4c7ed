//! Expression typing.
//!
//! An expression's type is computed once, under the contextual type of the
//! first request, and cached per node. Contextual types flow into array
//! and object literals, conditional and `||` operands and function
//! expressions; a function expression adopts the parameter types of a
//! contextual signature for parameters it leaves unannotated.

use pullc_binder::{DeclFlags, DeclKind, DeclSpace, SignatureKind, SymbolId, SymbolKind, UnitId};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{TypeClass, TypeResolver, best_common_type, is_assignable_to, widen};
use pullc_syntax::{BinaryOperator, NodeData, NodeIndex, SyntaxKind, UnaryOperator};
use tracing::trace;

use super::PullTypeResolver;
use super::symbol_types::annotation_of;

impl PullTypeResolver<'_> {
    /// Type of an expression, resolved under `contextual` the first time
    /// the node is asked about.
    pub fn resolve_expression(&mut self, unit: UnitId, node: NodeIndex, contextual: Option<SymbolId>) -> SymbolId {
        if node.is_none() {
            return self.primitives.any;
        }
        if let Some(&cached) = self.expression_types.get(&(unit, node)) {
            return cached;
        }
        let contextual = contextual.filter(|c| c.is_some() && !self.is_error_or_any(*c));
        let ty = self.compute_expression_type(unit, node, contextual);
        let ty = if ty.is_none() { self.primitives.any } else { ty };
        trace!(unit = unit.0, node = node.0, ty = ty.0, "expression resolved");
        self.expression_types.insert((unit, node), ty);
        ty
    }

    /// Cached type of an already resolved expression.
    pub fn resolved_expression(&self, unit: UnitId, node: NodeIndex) -> Option<SymbolId> {
        self.expression_types.get(&(unit, node)).copied()
    }

    /// Symbol recorded for a node by name or member resolution.
    pub fn symbol_at(&self, unit: UnitId, node: NodeIndex) -> SymbolId {
        self.chain.unit(unit).map_or(SymbolId::NONE, |u| u.symbol_for_node(node))
    }

    /// The type whose members an expression of type `ty` exposes.
    pub fn apparent_type(&mut self, ty: SymbolId) -> SymbolId {
        match self.classify(ty) {
            TypeClass::TypeParameter { constraint } => {
                if constraint.is_some() {
                    self.apparent_type(constraint)
                } else {
                    self.primitives.empty_object
                }
            }
            _ => ty,
        }
    }

    fn compute_expression_type(&mut self, unit: UnitId, node: NodeIndex, contextual: Option<SymbolId>) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(n) = arena.get(node) else {
            return self.primitives.error;
        };
        match n.kind {
            SyntaxKind::NumericLiteral => self.primitives.number,
            SyntaxKind::StringLiteral => self.primitives.string,
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => self.primitives.boolean,
            SyntaxKind::NullKeyword => self.primitives.null,
            SyntaxKind::RegularExpressionLiteral | SyntaxKind::OmittedExpression => self.primitives.any,
            SyntaxKind::Identifier => self.resolve_identifier_expression(unit, node),
            SyntaxKind::ThisKeyword => self.this_type(unit, node),
            SyntaxKind::SuperKeyword => self.super_type(unit, node),
            SyntaxKind::ParenthesizedExpression => {
                let inner = arena.get_wrapped_expr(n).map_or(NodeIndex::NONE, |w| w.expression);
                self.resolve_expression(unit, inner, contextual)
            }
            SyntaxKind::ArrayLiteralExpression => {
                let elements: Vec<NodeIndex> = arena.get_literal_expr(n).map(|l| l.elements.iter().collect()).unwrap_or_default();
                self.array_literal_type(unit, &elements, contextual)
            }
            SyntaxKind::ObjectLiteralExpression => self.object_literal_type(unit, node, contextual),
            SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction => {
                self.function_expression_type(unit, node, contextual)
            }
            SyntaxKind::PropertyAccessExpression => self.property_access_type(unit, node),
            SyntaxKind::ElementAccessExpression => self.element_access_type(unit, node),
            SyntaxKind::CallExpression => self.resolve_call(unit, node, false),
            SyntaxKind::NewExpression => self.resolve_call(unit, node, true),
            SyntaxKind::TypeAssertionExpression => {
                let Some(assertion) = arena.get_type_assertion(n) else {
                    return self.primitives.error;
                };
                let (type_node, expression) = (assertion.type_node, assertion.expression);
                let asserted = self.resolve_type_node(unit, type_node);
                self.resolve_expression(unit, expression, Some(asserted));
                asserted
            }
            SyntaxKind::PrefixUnaryExpression | SyntaxKind::PostfixUnaryExpression => {
                let Some(unary) = arena.get_unary_expr(n) else {
                    return self.primitives.error;
                };
                let (operator, operand) = (unary.operator, unary.operand);
                self.resolve_expression(unit, operand, None);
                match operator {
                    UnaryOperator::Exclamation => self.primitives.boolean,
                    _ => self.primitives.number,
                }
            }
            SyntaxKind::TypeOfExpression | SyntaxKind::DeleteExpression | SyntaxKind::VoidExpression => {
                let operand = arena.get_wrapped_expr(n).map_or(NodeIndex::NONE, |w| w.expression);
                self.resolve_expression(unit, operand, None);
                match n.kind {
                    SyntaxKind::TypeOfExpression => self.primitives.string,
                    SyntaxKind::DeleteExpression => self.primitives.boolean,
                    _ => self.primitives.undefined,
                }
            }
            SyntaxKind::BinaryExpression => self.binary_type(unit, node, contextual),
            SyntaxKind::ConditionalExpression => {
                let Some(conditional) = arena.get_conditional_expr(n) else {
                    return self.primitives.error;
                };
                let (condition, when_true, when_false) =
                    (conditional.condition, conditional.when_true, conditional.when_false);
                self.resolve_expression(unit, condition, None);
                let t = self.resolve_expression(unit, when_true, contextual);
                let f = self.resolve_expression(unit, when_false, contextual);
                self.union_like(&[t, f], contextual)
            }
            _ => self.primitives.any,
        }
    }

    /// Best common type of `candidates`, else the contextual type when
    /// every candidate fits it, else `{}`.
    fn union_like(&mut self, candidates: &[SymbolId], contextual: Option<SymbolId>) -> SymbolId {
        if let Some(common) = best_common_type(self, candidates) {
            return common;
        }
        if let Some(contextual) = contextual
            && candidates.iter().all(|&c| is_assignable_to(self, c, contextual))
        {
            return contextual;
        }
        self.primitives.empty_object
    }

    // =========================================================================
    // Names, this and super
    // =========================================================================

    fn resolve_identifier_expression(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let name = arena.identifier_text(node).unwrap_or_default().to_string();
        let scope = self.enclosing_scope(unit, node);
        let Some(found) = self.lookup_name(&name, DeclSpace::Value, scope) else {
            if name == "undefined" {
                return self.primitives.undefined;
            }
            match self.lookup_name(&name, DeclSpace::Type, scope) {
                Some(ty) => {
                    let target = self.resolve_alias(ty);
                    let code = if self.is_kind(target, |k| matches!(k, SymbolKind::Container(_))) {
                        diagnostic_codes::MODULE_USED_AS_VALUE
                    } else {
                        diagnostic_codes::ONLY_REFERS_TO_A_TYPE
                    };
                    self.report(unit, node, code, &[&name]);
                }
                None => self.report(unit, node, diagnostic_codes::CANNOT_FIND_NAME, &[&name]),
            }
            return self.primitives.error;
        };
        let symbol = self.resolve_alias(found);
        if symbol.is_none() {
            return self.primitives.error;
        }
        self.note_symbol(unit, node, symbol);
        let ty = self.value_type_of(symbol);
        if ty.is_some() {
            return ty;
        }
        let code = if self.is_kind(symbol, |k| matches!(k, SymbolKind::Container(_))) {
            diagnostic_codes::MODULE_USED_AS_VALUE
        } else {
            diagnostic_codes::ONLY_REFERS_TO_A_TYPE
        };
        self.report(unit, node, code, &[&name]);
        self.primitives.error
    }

    /// Innermost decl that gives `this` its meaning: arrow functions are
    /// transparent.
    pub fn this_binding_decl(&self, unit: UnitId, node: NodeIndex) -> pullc_binder::DeclId {
        let mut decl = self.enclosing_scope(unit, node);
        while let Some(d) = self.decl(decl) {
            let transparent = d.kind == DeclKind::FunctionExpression && d.flags.contains(DeclFlags::ARROW)
                || matches!(d.kind, DeclKind::CatchBlock | DeclKind::WithBlock | DeclKind::ObjectLiteral);
            if !transparent {
                return decl;
            }
            decl = d.parent;
        }
        decl
    }

    fn this_type(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let decl = self.this_binding_decl(unit, node);
        let Some(d) = self.decl(decl) else {
            return self.primitives.any;
        };
        let is_static = d.is_static();
        let member = matches!(
            d.kind,
            DeclKind::Method | DeclKind::Constructor | DeclKind::GetAccessor | DeclKind::SetAccessor | DeclKind::Property
        );
        if !member {
            return self.primitives.any;
        }
        let class_decl = d.parent;
        if self.decl_kind(class_decl) != Some(DeclKind::Class) {
            return self.primitives.any;
        }
        let class = self.chain.decls.symbol(class_decl);
        if is_static { self.value_type_of(class) } else { class }
    }

    /// Base class of the class enclosing `node`, if it extends one.
    pub fn enclosing_base_class(&mut self, unit: UnitId, node: NodeIndex) -> Option<SymbolId> {
        let scope = self.enclosing_scope(unit, node);
        let class_decl = self.enclosing_class_decl(scope);
        let class = self.chain.decls.symbol(class_decl);
        if class.is_none() {
            return None;
        }
        self.inheritable_bases(class).first().copied()
    }

    fn super_type(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let Some(base) = self.enclosing_base_class(unit, node) else {
            return self.primitives.error;
        };
        let decl = self.this_binding_decl(unit, node);
        if self.decl(decl).is_some_and(|d| d.is_static()) {
            let target = self.generic_target(base);
            return self.value_type_of(target);
        }
        base
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn array_literal_type(&mut self, unit: UnitId, elements: &[NodeIndex], contextual: Option<SymbolId>) -> SymbolId {
        let contextual_element = match contextual.map(|c| (c, self.classify(c))) {
            Some((_, TypeClass::Array(element))) => Some(element),
            Some((c, TypeClass::Object)) => self.index_type_of(c, true),
            _ => None,
        };
        let mut types = Vec::with_capacity(elements.len());
        for &element in elements {
            types.push(self.resolve_expression(unit, element, contextual_element));
        }
        let element = if types.is_empty() {
            contextual_element.unwrap_or(self.primitives.any)
        } else {
            self.union_like(&types, contextual_element)
        };
        self.chain.array_type(element)
    }

    fn object_literal_type(&mut self, unit: UnitId, node: NodeIndex, contextual: Option<SymbolId>) -> SymbolId {
        let decl = self.decl_for_node(unit, node);
        let Some(literal) = self.decl(decl).map(|d| d.symbol).filter(|s| s.is_some()) else {
            return self.primitives.error;
        };
        let Some(arena) = self.arena(unit) else {
            return literal;
        };
        let members: Vec<NodeIndex> = arena
            .get(node)
            .and_then(|n| arena.get_literal_expr(n))
            .map(|l| l.elements.iter().collect())
            .unwrap_or_default();
        for member in members {
            let Some(NodeData::PropertyAssignment(assignment)) = arena.get(member).map(|n| &n.data) else {
                continue;
            };
            let name = arena.name_text(assignment.name).unwrap_or_default().to_string();
            let initializer = assignment.initializer;
            let member_decl = self.decl_for_node(unit, member);
            let symbol = self.chain.decls.symbol(member_decl);
            let contextual_member = match contextual {
                Some(c) => {
                    let apparent = self.apparent_type(c);
                    self.property_of(apparent, &name).map(|p| p.type_id)
                }
                None => None,
            };
            let ty = self.resolve_expression(unit, initializer, contextual_member);
            let ty = widen(self, ty);
            if symbol.is_some() && !self.is_symbol_resolved(symbol) {
                self.assign_symbol_type(symbol, ty);
            }
        }
        literal
    }

    /// A function expression's type is its function type symbol; the first
    /// contextual signature seen fixes its unannotated parameter types and
    /// the expected type of its returned expressions.
    fn function_expression_type(&mut self, unit: UnitId, node: NodeIndex, contextual: Option<SymbolId>) -> SymbolId {
        let decl = self.decl_for_node(unit, node);
        let Some((function_type, signature)) = self.decl(decl).map(|d| (d.symbol, d.signature_symbol)) else {
            return self.primitives.error;
        };
        if function_type.is_none() {
            return self.primitives.error;
        }
        let Some(contextual) = contextual else {
            return function_type;
        };
        let apparent = self.apparent_type(contextual);
        let contextual_signatures = self.signatures_of(apparent, SignatureKind::Call);
        let [contextual_signature] = contextual_signatures.as_slice() else {
            return function_type;
        };
        let parameters = self
            .chain
            .symbols
            .signature(signature)
            .map(|d| d.parameters.clone())
            .unwrap_or_default();
        let Some(arena) = self.arena(unit) else {
            return function_type;
        };
        for (index, &param) in parameters.iter().enumerate() {
            if self.is_symbol_resolved(param) {
                continue;
            }
            let Some((param_unit, param_node, rest)) = self.symbol(param).and_then(|p| {
                let rest = matches!(p.kind, SymbolKind::Parameter { rest: true, .. });
                self.decl(p.first_declaration()).map(|d| (d.unit, d.node, rest))
            }) else {
                continue;
            };
            if param_unit != unit || annotation_of(&arena, param_node).is_some() {
                continue;
            }
            let ty = if rest {
                let element = contextual_signature
                    .parameter_type_at(index)
                    .unwrap_or(self.primitives.any);
                self.chain.array_type(element)
            } else {
                contextual_signature.parameter_type_at(index).unwrap_or(self.primitives.any)
            };
            self.assign_symbol_type(param, ty);
            self.contextually_typed.insert(param);
        }
        if !self.signature_has_annotation(signature) {
            self.contextual_returns.insert(signature, contextual_signature.return_type);
        }
        function_type
    }

    // =========================================================================
    // Member access
    // =========================================================================

    fn property_access_type(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(access) = arena.get(node).and_then(|n| arena.get_access_expr(n)) else {
            return self.primitives.error;
        };
        let (object, name_node) = (access.expression, access.name_or_argument);
        let name = arena.identifier_text(name_node).unwrap_or_default().to_string();
        let object_type = self.resolve_expression(unit, object, None);
        if object_type == self.primitives.error {
            return self.primitives.error;
        }
        if self.is_error_or_any(object_type) {
            return self.primitives.any;
        }
        let apparent = self.apparent_type(object_type);
        if let Some(property) = self.property_of(apparent, &name) {
            if property.origin.is_some() {
                self.note_symbol(unit, name_node, property.origin);
            }
            return property.type_id;
        }
        // A static reached through an instance: typed here, reported by
        // the checker.
        if let Some(static_member) = self.static_member_of_instance(apparent, &name) {
            self.note_symbol(unit, name_node, static_member);
            return self.value_type_of(static_member);
        }
        let display = self.type_display(object_type);
        self.report(unit, name_node, diagnostic_codes::PROPERTY_DOES_NOT_EXIST_ON_TYPE, &[&name, &display]);
        self.primitives.error
    }

    /// Static member `name` of the class whose instance type is `ty`.
    pub fn static_member_of_instance(&mut self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        let class = self.generic_target(ty);
        if !self.is_kind(class, |k| matches!(k, SymbolKind::Class(_))) {
            return None;
        }
        let ctor = self.value_type_of(class);
        let member = self.chain.symbols.shape(ctor)?.members.get(name, DeclSpace::Value)?;
        self.chain.is_live(member).then_some(member)
    }

    fn element_access_type(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(access) = arena.get(node).and_then(|n| arena.get_access_expr(n)) else {
            return self.primitives.error;
        };
        let (object, argument) = (access.expression, access.name_or_argument);
        let object_type = self.resolve_expression(unit, object, None);
        let index_type = self.resolve_expression(unit, argument, None);
        if self.is_error_or_any(object_type) {
            return self.primitives.any;
        }
        let apparent = self.apparent_type(object_type);
        if arena.kind(argument) == Some(SyntaxKind::StringLiteral)
            && let Some(text) = arena.get(argument).and_then(|n| arena.get_literal(n)).map(|l| l.text.clone())
            && let Some(property) = self.property_of(apparent, &text)
        {
            return property.type_id;
        }
        let index_class = self.classify(index_type);
        let found = if index_class.is_numeric() {
            self.index_type_of(apparent, true).or_else(|| self.index_type_of(apparent, false))
        } else if matches!(index_class, TypeClass::String | TypeClass::Any | TypeClass::Error) {
            self.index_type_of(apparent, false)
        } else {
            None
        };
        found.unwrap_or(self.primitives.any)
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn binary_type(&mut self, unit: UnitId, node: NodeIndex, contextual: Option<SymbolId>) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(binary) = arena.get(node).and_then(|n| arena.get_binary_expr(n)) else {
            return self.primitives.error;
        };
        let (left, operator, right) = (binary.left, binary.operator, binary.right);
        match operator {
            BinaryOperator::Equals => {
                let l = self.resolve_expression(unit, left, None);
                self.resolve_expression(unit, right, Some(l))
            }
            BinaryOperator::AmpersandAmpersand => {
                self.resolve_expression(unit, left, None);
                self.resolve_expression(unit, right, contextual)
            }
            BinaryOperator::BarBar => {
                let l = self.resolve_expression(unit, left, contextual);
                let r = self.resolve_expression(unit, right, contextual.or(Some(l)));
                self.union_like(&[l, r], contextual)
            }
            BinaryOperator::Comma => {
                self.resolve_expression(unit, left, None);
                self.resolve_expression(unit, right, contextual)
            }
            BinaryOperator::Plus | BinaryOperator::PlusEquals => {
                let l = self.resolve_expression(unit, left, None);
                let r = self.resolve_expression(unit, right, None);
                self.plus_type(l, r)
            }
            op => {
                self.resolve_expression(unit, left, None);
                self.resolve_expression(unit, right, None);
                if op.is_numeric_arithmetic() {
                    self.primitives.number
                } else {
                    self.primitives.boolean
                }
            }
        }
    }

    /// Result of `+`: string when either side is a string, number when
    /// both are numeric, otherwise `any`. `null` and `undefined` take the
    /// other operand's type.
    pub fn plus_type(&mut self, left: SymbolId, right: SymbolId) -> SymbolId {
        let mut l = self.classify(left);
        let mut r = self.classify(right);
        if matches!(l, TypeClass::Null | TypeClass::Undefined) {
            l = r;
        }
        if matches!(r, TypeClass::Null | TypeClass::Undefined) {
            r = l;
        }
        if l == TypeClass::String || r == TypeClass::String {
            return self.primitives.string;
        }
        if l.is_numeric() && r.is_numeric() {
            return self.primitives.number;
        }
        self.primitives.any
    }
}
