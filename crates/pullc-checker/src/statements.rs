//! Statement checks.

use std::sync::Arc;

use pullc_binder::{DeclId, DeclKind, SymbolId};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{TypeClass, TypeResolver};
use pullc_syntax::{NodeData, NodeIndex, SyntaxKind};
use tracing::trace;

use crate::state::CheckerState;

impl CheckerState<'_> {
    pub(crate) fn check_statement(&mut self, node: NodeIndex, kind: SyntaxKind) {
        let arena = Arc::clone(&self.arena);
        let Some(n) = arena.get(node) else {
            return;
        };
        match (kind, &n.data) {
            (_, NodeData::Block(block)) => {
                for statement in block.statements.iter() {
                    self.check_node(statement);
                }
            }
            (SyntaxKind::ExpressionStatement, NodeData::Wrapped(wrapped)) => {
                self.check_expression(wrapped.expression, None);
            }
            (SyntaxKind::ReturnStatement, NodeData::Wrapped(wrapped)) => {
                self.check_return_statement(node, wrapped.expression);
            }
            (SyntaxKind::ThrowStatement, NodeData::Wrapped(wrapped)) => {
                self.check_expression(wrapped.expression, None);
            }
            (_, NodeData::If(statement)) => {
                self.check_expression(statement.expression, None);
                self.check_node(statement.then_statement);
                self.check_node(statement.else_statement);
            }
            (_, NodeData::Loop(statement)) => {
                self.check_node(statement.initializer);
                self.check_expression(statement.condition, None);
                self.check_expression(statement.incrementor, None);
                self.check_node(statement.statement);
            }
            (_, NodeData::ForIn(statement)) => {
                self.check_for_in(statement.initializer, statement.expression);
                self.check_node(statement.statement);
            }
            (_, NodeData::Switch(statement)) => {
                self.check_expression(statement.expression, None);
                for clause in statement.clauses.iter() {
                    self.check_node(clause);
                }
            }
            (_, NodeData::CaseClause(clause)) => {
                self.check_expression(clause.expression, None);
                for statement in clause.statements.iter() {
                    self.check_node(statement);
                }
            }
            (_, NodeData::Labeled(statement)) => self.check_node(statement.statement),
            (_, NodeData::With(statement)) => {
                // Names inside a `with` body are not statically resolvable.
                self.check_expression(statement.expression, None);
                trace!(node = node.0, "with body skipped");
            }
            (_, NodeData::Try(statement)) => {
                self.check_node(statement.try_block);
                self.check_node(statement.catch_clause);
                self.check_node(statement.finally_block);
            }
            (_, NodeData::CatchClause(clause)) => {
                let decl = self.decl_of(node);
                self.ctx.push_decl(decl);
                self.check_node(clause.block);
                self.ctx.pop_decl();
            }
            _ => {}
        }
    }

    fn check_return_statement(&mut self, node: NodeIndex, expression: NodeIndex) {
        if !self.ctx.in_function_body() {
            self.error_at_node(node, diagnostic_codes::RETURN_STATEMENT_OUTSIDE_FUNCTION, &[]);
            self.check_expression(expression, None);
            return;
        }
        if expression.is_none() {
            return;
        }
        self.ctx.mark_return_with_value();
        let function = self.enclosing_function_decl();
        if self.resolver.decl_kind(function) == Some(DeclKind::SetAccessor) {
            self.error_at_node(node, diagnostic_codes::SETTER_CANNOT_RETURN_VALUE, &[]);
            self.check_expression(expression, None);
            return;
        }
        let expected = self.declared_return_type(function);
        let ty = self.check_expression(expression, expected);
        if let Some(expected) = expected {
            self.check_type_assignable(ty, expected, expression);
        }
    }

    /// Innermost function-like decl on the walk stack.
    fn enclosing_function_decl(&self) -> DeclId {
        self.ctx
            .enclosing_decls()
            .find(|&d| self.resolver.decl_kind(d).is_some_and(|k| k.is_function_like()))
            .unwrap_or(DeclId::NONE)
    }

    fn check_for_in(&mut self, initializer: NodeIndex, expression: NodeIndex) {
        let left_type = if self.arena.kind(initializer) == Some(SyntaxKind::VariableStatement) {
            self.check_node(initializer);
            let declaration = self
                .arena
                .get(initializer)
                .and_then(|n| self.arena.get_variable_statement(n))
                .and_then(|s| s.declarations.iter().next())
                .unwrap_or(NodeIndex::NONE);
            let decl = self.decl_of(declaration);
            let symbol = self.symbol_of_decl(decl);
            if symbol.is_some() { self.resolver.type_of_symbol(symbol) } else { SymbolId::NONE }
        } else {
            self.check_expression(initializer, None)
        };
        if left_type.is_some()
            && !matches!(
                self.resolver.classify(left_type),
                TypeClass::String | TypeClass::Any | TypeClass::Error
            )
        {
            self.error_at_node(initializer, diagnostic_codes::FOR_IN_LEFT_OPERAND, &[]);
        }

        let right_type = self.check_expression(expression, None);
        if !matches!(
            self.resolver.classify(right_type),
            TypeClass::Any | TypeClass::Error | TypeClass::Object | TypeClass::TypeParameter { .. } | TypeClass::Array(_)
        ) {
            self.error_at_node(expression, diagnostic_codes::FOR_IN_RIGHT_OPERAND, &[]);
        }
    }
}
