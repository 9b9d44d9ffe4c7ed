//! Type annotations and type references.

use pullc_binder::{DeclSpace, SymbolId, SymbolKind, UnitId};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{TypeSubstitution, instantiate_type, is_assignable_to};
use pullc_syntax::{NodeData, NodeIndex, SyntaxKind};
use tracing::trace;

use super::PullTypeResolver;

impl PullTypeResolver<'_> {
    /// Resolve a type node to its type symbol. Failures report once and
    /// yield the error type.
    pub fn resolve_type_node(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        if node.is_none() {
            return self.primitives.any;
        }
        if let Some(&cached) = self.type_node_types.get(&(unit, node)) {
            return cached;
        }
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(n) = arena.get(node) else {
            return self.primitives.error;
        };
        let ty = match n.kind {
            SyntaxKind::AnyKeyword => self.primitives.any,
            SyntaxKind::NumberKeyword => self.primitives.number,
            SyntaxKind::StringKeyword => self.primitives.string,
            SyntaxKind::BooleanKeyword => self.primitives.boolean,
            SyntaxKind::VoidKeyword => self.primitives.void,
            SyntaxKind::ArrayType => {
                let element = arena.get_array_type(n).map_or(NodeIndex::NONE, |a| a.element_type);
                let element = self.resolve_type_node(unit, element);
                self.chain.array_type(element)
            }
            SyntaxKind::TypeLiteral | SyntaxKind::FunctionType | SyntaxKind::ConstructorType => {
                let decl = self.decl_for_node(unit, node);
                self.decl(decl)
                    .map(|d| d.symbol)
                    .filter(|s| s.is_some())
                    .unwrap_or(self.primitives.error)
            }
            SyntaxKind::TypeQuery => {
                let name = arena.get_type_query(n).map_or(NodeIndex::NONE, |q| q.expr_name);
                let symbol = self.resolve_entity_name(unit, name, DeclSpace::Value);
                let value = if symbol.is_some() { self.value_type_of(symbol) } else { SymbolId::NONE };
                if value.is_some() { value } else { self.primitives.error }
            }
            SyntaxKind::TypeReference => self.resolve_type_reference(unit, node),
            _ => self.primitives.error,
        };
        trace!(unit = unit.0, node = node.0, ty = ty.0, "type node resolved");
        self.type_node_types.insert((unit, node), ty);
        self.note_symbol(unit, node, ty);
        ty
    }

    fn resolve_type_reference(&mut self, unit: UnitId, node: NodeIndex) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(NodeData::TypeRef(reference)) = arena.get(node).map(|n| &n.data) else {
            return self.primitives.error;
        };
        let argument_nodes: Vec<NodeIndex> = reference.type_arguments.iter().collect();
        let target = self.resolve_entity_name(unit, reference.type_name, DeclSpace::Type);
        if target.is_none() {
            return self.primitives.error;
        }
        let Some(sym) = self.symbol(target) else {
            return self.primitives.error;
        };
        if !sym.is_type() {
            return self.primitives.error;
        }
        let type_parameters = match &sym.kind {
            SymbolKind::Class(shape) | SymbolKind::Interface(shape) => shape.type_parameters.clone(),
            _ => Vec::new(),
        };
        let name = arena.entity_name_text(reference.type_name).unwrap_or_else(|| sym.name.clone());

        if argument_nodes.is_empty() {
            if !type_parameters.is_empty() {
                let count = type_parameters.len().to_string();
                self.report(unit, node, diagnostic_codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS, &[&name, &count]);
            }
            return target;
        }
        if type_parameters.is_empty() {
            self.report(unit, node, diagnostic_codes::TYPE_IS_NOT_GENERIC, &[&name]);
            return target;
        }
        if type_parameters.len() != argument_nodes.len() {
            let count = type_parameters.len().to_string();
            self.report(unit, node, diagnostic_codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS, &[&name, &count]);
            return target;
        }

        let arguments: Vec<SymbolId> = argument_nodes
            .iter()
            .map(|&argument| self.resolve_type_node(unit, argument))
            .collect();
        let substitution = TypeSubstitution::from_args(&type_parameters, &arguments, self.primitives.any);
        for (index, &type_parameter) in type_parameters.iter().enumerate() {
            let constraint = self.constraint_of(type_parameter);
            if constraint.is_none() {
                continue;
            }
            let constraint = instantiate_type(self, constraint, &substitution);
            let argument = arguments[index];
            if !is_assignable_to(self, argument, constraint) {
                let argument_text = self.type_display(argument);
                let constraint_text = self.type_display(constraint);
                self.report(
                    unit,
                    argument_nodes[index],
                    diagnostic_codes::TYPE_DOES_NOT_SATISFY_CONSTRAINT,
                    &[&argument_text, &constraint_text],
                );
            }
        }
        let mapping: Vec<(SymbolId, SymbolId)> = type_parameters.into_iter().zip(arguments).collect();
        self.chain.instantiation(target, mapping)
    }

    /// Cached result of an earlier `resolve_type_node`, without resolving.
    pub fn resolved_type_node(&self, unit: UnitId, node: NodeIndex) -> Option<SymbolId> {
        self.type_node_types.get(&(unit, node)).copied()
    }
}
