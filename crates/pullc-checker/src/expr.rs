//! Expression checks.
//!
//! Types come from the resolver; this module applies the operator, `this`
//! and `super` rules on top and walks into sub-expressions so that nested
//! function expressions and object literals get their declaration checks.

use std::sync::Arc;

use pullc_binder::{DeclKind, SignatureKind, SymbolId, SymbolKind};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{TypeClass, TypeResolver, is_assignable_to};
use pullc_syntax::{BinaryOperator, NodeData, NodeIndex, SyntaxKind};
use tracing::trace;

use crate::state::CheckerState;

impl CheckerState<'_> {
    /// Resolve `node` under `contextual` and check it once per pass.
    pub(crate) fn check_expression(&mut self, node: NodeIndex, contextual: Option<SymbolId>) -> SymbolId {
        if node.is_none() {
            return self.resolver.primitives.any;
        }
        let unit = self.unit;
        self.ctx.push_contextual_type(contextual);
        let ty = self.resolver.resolve_expression(unit, node, contextual);
        if self.mark_checked(node) {
            self.check_expression_rules(node, ty);
        }
        self.ctx.pop_contextual_type();
        ty
    }

    fn check_expression_rules(&mut self, node: NodeIndex, ty: SymbolId) {
        let arena = Arc::clone(&self.arena);
        let Some(n) = arena.get(node) else {
            return;
        };
        match (n.kind, &n.data) {
            (SyntaxKind::ThisKeyword, _) => self.check_this_expression(node),
            (SyntaxKind::SuperKeyword, _) => self.check_super_expression(node),
            (SyntaxKind::ParenthesizedExpression, NodeData::Wrapped(wrapped)) => {
                let contextual = self.ctx.contextual_type();
                self.check_expression(wrapped.expression, contextual);
            }
            (SyntaxKind::TypeOfExpression | SyntaxKind::DeleteExpression | SyntaxKind::VoidExpression, NodeData::Wrapped(wrapped)) => {
                self.check_expression(wrapped.expression, None);
            }
            (SyntaxKind::ArrayLiteralExpression, NodeData::LiteralExpr(literal)) => {
                for element in literal.elements.iter() {
                    self.check_expression(element, None);
                }
            }
            (SyntaxKind::ObjectLiteralExpression, NodeData::LiteralExpr(literal)) => {
                let decl = self.decl_of(node);
                self.ctx.push_decl(decl);
                for member in literal.elements.iter() {
                    if self.mark_checked(member)
                        && let Some(assignment) = arena.get(member).and_then(|m| arena.get_property_assignment(m))
                    {
                        self.check_expression(assignment.initializer, None);
                    }
                }
                self.ctx.pop_decl();
            }
            (SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction, _) => self.check_function_like(node),
            (SyntaxKind::PropertyAccessExpression, NodeData::Access(access)) => {
                self.check_expression(access.expression, None);
                self.check_member_access(node);
            }
            (SyntaxKind::ElementAccessExpression, NodeData::Access(access)) => {
                self.check_expression(access.expression, None);
                self.check_expression(access.name_or_argument, None);
            }
            (SyntaxKind::CallExpression | SyntaxKind::NewExpression, NodeData::Call(call)) => {
                let is_super_call =
                    n.kind == SyntaxKind::CallExpression && arena.kind(call.expression) == Some(SyntaxKind::SuperKeyword);
                for type_argument in call.type_arguments.iter() {
                    self.check_type_node(type_argument);
                }
                let saved_target = self.ctx.in_super_call_target;
                self.ctx.in_super_call_target = is_super_call;
                self.check_expression(call.expression, None);
                self.ctx.in_super_call_target = saved_target;

                let saved_arguments = self.ctx.in_super_call_arguments;
                self.ctx.in_super_call_arguments = saved_arguments || is_super_call;
                for argument in call.arguments.iter() {
                    self.check_expression(argument, None);
                }
                self.ctx.in_super_call_arguments = saved_arguments;
            }
            (SyntaxKind::TypeAssertionExpression, NodeData::TypeAssertion(assertion)) => {
                let target = self.check_type_node(assertion.type_node);
                let source = self.check_expression(assertion.expression, Some(target));
                self.check_type_assertion(node, source, target);
            }
            (SyntaxKind::PrefixUnaryExpression | SyntaxKind::PostfixUnaryExpression, NodeData::Unary(unary)) => {
                let operand_type = self.check_expression(unary.operand, None);
                if unary.operator.is_increment_or_decrement() {
                    self.check_increment_operand(unary.operand, operand_type);
                }
            }
            (SyntaxKind::BinaryExpression, NodeData::Binary(binary)) => {
                self.check_binary_expression(node, binary.left, binary.operator, binary.right, ty);
            }
            (SyntaxKind::ConditionalExpression, NodeData::Conditional(conditional)) => {
                let contextual = self.ctx.contextual_type();
                self.check_expression(conditional.condition, None);
                self.check_expression(conditional.when_true, contextual);
                self.check_expression(conditional.when_false, contextual);
            }
            _ => {}
        }
    }

    // =========================================================================
    // this and super
    // =========================================================================

    fn check_this_expression(&mut self, node: NodeIndex) {
        if self.ctx.in_super_call_arguments || self.ctx.in_constructor_parameters {
            self.error_at_node(node, diagnostic_codes::THIS_IN_CONSTRUCTOR_ARGUMENTS, &[]);
            return;
        }
        let unit = self.unit;
        let binding = self.resolver.this_binding_decl(unit, node);
        let Some((kind, is_static)) = self.resolver.decl(binding).map(|d| (d.kind, d.is_static())) else {
            return;
        };
        match kind {
            DeclKind::Container => {
                self.error_at_node(node, diagnostic_codes::THIS_IN_MODULE_BODY, &[]);
            }
            DeclKind::Property if is_static || self.ctx.in_static_initializer => {
                self.error_at_node(node, diagnostic_codes::THIS_IN_STATIC_PROPERTY_INITIALIZER, &[]);
            }
            DeclKind::Enum | DeclKind::EnumMember => {
                self.error_at_node(node, diagnostic_codes::THIS_IN_CURRENT_LOCATION, &[]);
            }
            _ => {}
        }
    }

    fn check_super_expression(&mut self, node: NodeIndex) {
        let unit = self.unit;
        let parent = self.arena.parent(node);
        let parent_kind = self.arena.kind(parent);
        let is_call = self.ctx.in_super_call_target && parent_kind == Some(SyntaxKind::CallExpression);
        let is_access = parent_kind == Some(SyntaxKind::PropertyAccessExpression)
            && self
                .arena
                .get(parent)
                .and_then(|p| self.arena.get_access_expr(p))
                .is_some_and(|a| a.expression == node);

        if is_call {
            let scope = self.resolver.enclosing_scope(unit, node);
            if self.resolver.decl_kind(scope) != Some(DeclKind::Constructor) {
                self.error_at_node(node, diagnostic_codes::SUPER_CALL_OUTSIDE_CONSTRUCTOR, &[]);
                return;
            }
        } else if is_access {
            let binding = self.resolver.this_binding_decl(unit, node);
            let in_member = self.resolver.decl(binding).is_some_and(|d| {
                matches!(
                    d.kind,
                    DeclKind::Method | DeclKind::Constructor | DeclKind::GetAccessor | DeclKind::SetAccessor
                )
            }) && self.resolver.decl_kind(self.resolver.chain().decls.parent(binding)) == Some(DeclKind::Class);
            if !in_member {
                self.error_at_node(node, diagnostic_codes::SUPER_PROPERTY_ACCESS_OUTSIDE_MEMBER, &[]);
                return;
            }
        }
        if self.resolver.enclosing_base_class(unit, node).is_none() {
            self.error_at_node(node, diagnostic_codes::SUPER_ONLY_IN_DERIVED_CLASS, &[]);
        }
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn check_type_assertion(&mut self, node: NodeIndex, source: SymbolId, target: SymbolId) {
        if self.resolver.is_error_or_any(source) || self.resolver.is_error_or_any(target) {
            return;
        }
        if is_assignable_to(&mut self.resolver, source, target) || is_assignable_to(&mut self.resolver, target, source) {
            return;
        }
        let source_text = self.resolver.type_display(source);
        let target_text = self.resolver.type_display(target);
        self.error_at_node(node, diagnostic_codes::CANNOT_CONVERT_TYPE, &[&source_text, &target_text]);
    }

    fn check_increment_operand(&mut self, operand: NodeIndex, operand_type: SymbolId) {
        let class = self.resolver.classify(operand_type);
        if !class.is_numeric() && !class.is_any_or_error() {
            self.error_at_node(operand, diagnostic_codes::ARITHMETIC_OPERAND_MUST_BE_NUMBER, &[]);
        }
        if !self.is_reference(operand) {
            self.error_at_node(operand, diagnostic_codes::INCREMENT_OPERAND_MUST_BE_VARIABLE, &[]);
        }
    }

    /// A variable, parameter, property or element reference.
    fn is_reference(&self, node: NodeIndex) -> bool {
        let target = self.arena.skip_parentheses(node);
        match self.arena.kind(target) {
            Some(SyntaxKind::Identifier) => {
                let symbol = self.resolver.symbol_at(self.unit, target);
                symbol.is_none() || self.is_assignable_symbol(symbol)
            }
            Some(SyntaxKind::PropertyAccessExpression) => {
                let name = self
                    .arena
                    .get(target)
                    .and_then(|n| self.arena.get_access_expr(n))
                    .map_or(NodeIndex::NONE, |a| a.name_or_argument);
                let symbol = self.resolver.symbol_at(self.unit, name);
                symbol.is_none() || self.is_assignable_symbol(symbol)
            }
            Some(SyntaxKind::ElementAccessExpression) => true,
            _ => false,
        }
    }

    /// Types and enum members cannot be assigned to.
    fn is_assignable_symbol(&self, symbol: SymbolId) -> bool {
        match self.resolver.symbol(symbol) {
            Some(sym) => !sym.is_type() && !matches!(sym.kind, SymbolKind::EnumMember),
            None => true,
        }
    }

    fn check_binary_expression(
        &mut self,
        node: NodeIndex,
        left: NodeIndex,
        operator: BinaryOperator,
        right: NodeIndex,
        result: SymbolId,
    ) {
        trace!(node = node.0, ?operator, "check binary");
        if operator == BinaryOperator::Equals {
            let left_type = self.check_expression(left, None);
            let right_type = self.check_expression(right, Some(left_type));
            if self.check_assignment_target(left) {
                self.check_type_assignable(right_type, left_type, node);
            }
            return;
        }
        let contextual = self.ctx.contextual_type();
        let (left_type, right_type) = match operator {
            BinaryOperator::BarBar | BinaryOperator::AmpersandAmpersand | BinaryOperator::Comma => {
                let l = self.check_expression(left, None);
                (l, self.check_expression(right, contextual))
            }
            _ => (self.check_expression(left, None), self.check_expression(right, None)),
        };

        if operator.is_assignment() && !self.check_assignment_target(left) {
            return;
        }
        match operator {
            BinaryOperator::Plus | BinaryOperator::PlusEquals => {
                if result == self.resolver.primitives.any
                    && !self.resolver.is_error_or_any(left_type)
                    && !self.resolver.is_error_or_any(right_type)
                {
                    self.report_operator(node, operator, left_type, right_type);
                } else if operator == BinaryOperator::PlusEquals {
                    self.check_type_assignable(result, left_type, node);
                }
            }
            op if op.is_numeric_arithmetic() => {
                let left_ok = self.check_arithmetic_operand(left, left_type, diagnostic_codes::ARITHMETIC_LEFT_OPERAND);
                let right_ok =
                    self.check_arithmetic_operand(right, right_type, diagnostic_codes::ARITHMETIC_RIGHT_OPERAND);
                if op.is_assignment() && left_ok && right_ok {
                    let number = self.resolver.primitives.number;
                    self.check_type_assignable(number, left_type, node);
                }
            }
            op if op.is_comparison() => {
                if !self.are_comparable(left_type, right_type) {
                    self.report_operator(node, operator, left_type, right_type);
                }
            }
            BinaryOperator::InstanceOf => {
                let left_class = self.resolver.classify(left_type);
                if !matches!(left_class, TypeClass::Any | TypeClass::Error | TypeClass::Object | TypeClass::TypeParameter { .. } | TypeClass::Array(_)) {
                    self.error_at_node(left, diagnostic_codes::INSTANCEOF_LEFT_OPERAND, &[]);
                }
                if !self.is_constructor_like(right_type) {
                    self.error_at_node(right, diagnostic_codes::INSTANCEOF_RIGHT_OPERAND, &[]);
                }
            }
            BinaryOperator::In => {
                let left_class = self.resolver.classify(left_type);
                if !matches!(left_class, TypeClass::Any | TypeClass::Error | TypeClass::String | TypeClass::Number) {
                    self.error_at_node(left, diagnostic_codes::IN_LEFT_OPERAND, &[]);
                }
                let right_class = self.resolver.classify(right_type);
                if !matches!(right_class, TypeClass::Any | TypeClass::Error | TypeClass::Object | TypeClass::TypeParameter { .. } | TypeClass::Array(_)) {
                    self.error_at_node(right, diagnostic_codes::IN_RIGHT_OPERAND, &[]);
                }
            }
            _ => {}
        }
    }

    /// `null` and `undefined` stand in for any operand type.
    fn check_arithmetic_operand(&mut self, operand: NodeIndex, ty: SymbolId, code: u32) -> bool {
        let class = self.resolver.classify(ty);
        let ok = class.is_numeric()
            || class.is_any_or_error()
            || matches!(class, TypeClass::Null | TypeClass::Undefined);
        if !ok {
            self.error_at_node(operand, code, &[]);
        }
        ok
    }

    fn are_comparable(&mut self, left: SymbolId, right: SymbolId) -> bool {
        for ty in [left, right] {
            let class = self.resolver.classify(ty);
            if class.is_any_or_error() || matches!(class, TypeClass::Null | TypeClass::Undefined) {
                return true;
            }
        }
        is_assignable_to(&mut self.resolver, left, right) || is_assignable_to(&mut self.resolver, right, left)
    }

    /// `any`, or an object type with call or construct signatures.
    fn is_constructor_like(&mut self, ty: SymbolId) -> bool {
        match self.resolver.classify(ty) {
            TypeClass::Any | TypeClass::Error => true,
            TypeClass::Object => {
                let apparent = self.resolver.apparent_type(ty);
                !self.resolver.signatures_of(apparent, SignatureKind::Construct).is_empty()
                    || !self.resolver.signatures_of(apparent, SignatureKind::Call).is_empty()
            }
            _ => false,
        }
    }

    fn report_operator(&mut self, node: NodeIndex, operator: BinaryOperator, left: SymbolId, right: SymbolId) {
        let left_text = self.resolver.type_display(left);
        let right_text = self.resolver.type_display(right);
        self.error_at_node(
            node,
            diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED,
            &[operator.text(), &left_text, &right_text],
        );
    }

    /// Report 2364 unless `target` can be assigned to.
    fn check_assignment_target(&mut self, target: NodeIndex) -> bool {
        if self.is_reference(target) {
            return true;
        }
        self.error_at_node(target, diagnostic_codes::INVALID_ASSIGNMENT_TARGET, &[]);
        false
    }
}
