//! Class and interface checks: heritage targets and cycles, compatibility
//! with bases and implemented interfaces, constructor `super` rules and
//! member access visibility.

use std::sync::Arc;

use pullc_binder::{DeclFlags, DeclId, DeclKind, SymbolId, SymbolKind};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{MemberKind, RelationKind, TypeResolver, check_relation};
use pullc_syntax::{NodeData, NodeIndex, SyntaxKind};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::state::CheckerState;

impl CheckerState<'_> {
    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn check_class_declaration(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let Some(class) = arena.get(node).and_then(|n| arena.get_class(n)) else {
            return;
        };
        let type_parameters: Vec<NodeIndex> = class.type_parameters.iter().collect();
        let implements: Vec<NodeIndex> = class.implements.iter().collect();
        let members: Vec<NodeIndex> = class.members.iter().collect();
        let extends = class.extends;
        let decl = self.decl_of(node);
        let class_type = self.symbol_of_decl(decl);

        self.ctx.push_decl(decl);
        for type_parameter in type_parameters {
            self.check_node(type_parameter);
        }
        let base = self.check_type_node(extends);
        let implemented: Vec<(NodeIndex, SymbolId)> =
            implements.into_iter().map(|n| (n, self.check_type_node(n))).collect();
        for &member in &members {
            self.check_node(member);
        }
        self.ctx.pop_decl();

        let cyclic = self.check_base_cycle(decl, class_type);
        if extends.is_some() && !self.resolver.is_error_or_any(base) {
            let target = self.resolver.generic_target(base);
            if !self.resolver.is_kind(target, |k| matches!(k, SymbolKind::Class(_))) {
                self.error_at_node(extends, diagnostic_codes::CLASS_MAY_ONLY_EXTEND_CLASS, &[]);
            } else if !cyclic {
                self.check_class_extends(decl, class_type, base);
            }
        }
        for (heritage, implemented_type) in implemented {
            if self.resolver.is_error_or_any(implemented_type) {
                continue;
            }
            let target = self.resolver.generic_target(implemented_type);
            if !self
                .resolver
                .is_kind(target, |k| matches!(k, SymbolKind::Class(_) | SymbolKind::Interface(_)))
            {
                self.error_at_node(heritage, diagnostic_codes::CLASS_MAY_ONLY_IMPLEMENT, &[]);
            } else if !cyclic {
                self.check_heritage_compatibility(
                    decl,
                    class_type,
                    implemented_type,
                    diagnostic_codes::CLASS_INCORRECTLY_IMPLEMENTS,
                );
            }
        }

        self.check_index_signatures_of(decl, &members);
        if self.options.check_privacy {
            self.check_heritage_privacy(decl, extends, &class.implements.iter().collect::<Vec<_>>());
        }
    }

    /// Overriding members must keep the member kind, then the instance type
    /// must be assignable to the base.
    fn check_class_extends(&mut self, decl: DeclId, class_type: SymbolId, base: SymbolId) {
        let class_name = self.decl_name(decl);
        let base_name = self.resolver.type_display(base);
        let members: Vec<DeclId> = self.resolver.chain().decls.children(decl).to_vec();
        let mut kind_mismatch = false;
        for member in members {
            let Some((kind, name, is_static)) = self
                .resolver
                .decl(member)
                .map(|d| (d.kind, d.name.clone(), d.is_static()))
            else {
                continue;
            };
            let derived_kind = match kind {
                DeclKind::Property => MemberKind::Property,
                DeclKind::Method => MemberKind::Method,
                DeclKind::GetAccessor | DeclKind::SetAccessor => MemberKind::Accessor,
                _ => continue,
            };
            if is_static {
                continue;
            }
            let Some(inherited) = self.resolver.property_of(base, &name) else {
                continue;
            };
            let is_method = |k: MemberKind| k == MemberKind::Method;
            if is_method(derived_kind) != is_method(inherited.kind) {
                kind_mismatch = true;
                self.error_at_decl(
                    member,
                    diagnostic_codes::CLASS_MEMBER_KIND_MISMATCH,
                    &[
                        &class_name,
                        derived_kind.describe(),
                        &name,
                        &base_name,
                        inherited.kind.describe(),
                    ],
                );
            }
        }
        if !kind_mismatch {
            self.check_heritage_compatibility(decl, class_type, base, diagnostic_codes::CLASS_INCORRECTLY_EXTENDS);
        }
    }

    /// Report `code` at the declaration's name when `derived` is not
    /// assignable to `base`, with the relation's explanation.
    fn check_heritage_compatibility(&mut self, decl: DeclId, derived: SymbolId, base: SymbolId, code: u32) {
        let (related, info) = check_relation(&mut self.resolver, derived, base, RelationKind::Assignable);
        if related {
            return;
        }
        let elaboration = info.elaboration(&mut self.resolver);
        let name = self.decl_name(decl);
        let base_name = self.resolver.type_display(base);
        let site = self
            .resolver
            .decl(decl)
            .map(|d| if d.name_node.is_some() { d.name_node } else { d.node })
            .unwrap_or(NodeIndex::NONE);
        self.error_elaborated(site, code, &[&name, &base_name], &elaboration);
    }

    /// 2310 when `ty` reaches itself through its `extends` chain.
    fn check_base_cycle(&mut self, decl: DeclId, ty: SymbolId) -> bool {
        let mut visited = FxHashSet::default();
        if !self.reaches_through_bases(ty, ty, &mut visited) {
            return false;
        }
        debug!(ty = ty.0, "base type cycle");
        let name = self.resolver.type_display(ty);
        self.error_at_decl(decl, diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE, &[&name]);
        true
    }

    fn reaches_through_bases(&mut self, from: SymbolId, target: SymbolId, visited: &mut FxHashSet<SymbolId>) -> bool {
        for base in self.resolver.base_types(from) {
            let base = self.resolver.generic_target(base);
            if base == target {
                return true;
            }
            if visited.insert(base) && self.reaches_through_bases(base, target, visited) {
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    pub(crate) fn check_interface_declaration(&mut self, node: NodeIndex) {
        let arena = Arc::clone(&self.arena);
        let Some(interface) = arena.get(node).and_then(|n| arena.get_interface(n)) else {
            return;
        };
        let type_parameters: Vec<NodeIndex> = interface.type_parameters.iter().collect();
        let extends: Vec<NodeIndex> = interface.extends.iter().collect();
        let members: Vec<NodeIndex> = interface.members.iter().collect();
        let decl = self.decl_of(node);
        let interface_type = self.symbol_of_decl(decl);

        self.ctx.push_decl(decl);
        for &type_parameter in &type_parameters {
            self.check_node(type_parameter);
        }
        let bases: Vec<(NodeIndex, SymbolId)> = extends.iter().map(|&n| (n, self.check_type_node(n))).collect();
        for &member in &members {
            self.check_node(member);
        }
        self.ctx.pop_decl();

        self.check_merged_type_parameters(decl, interface_type);
        let cyclic = self.check_base_cycle(decl, interface_type);
        for (heritage, base) in bases {
            if self.resolver.is_error_or_any(base) {
                continue;
            }
            let target = self.resolver.generic_target(base);
            if !self
                .resolver
                .is_kind(target, |k| matches!(k, SymbolKind::Class(_) | SymbolKind::Interface(_)))
            {
                self.error_at_node(heritage, diagnostic_codes::INTERFACE_MAY_ONLY_EXTEND_CLASS_OR_INTERFACE, &[]);
            } else if !cyclic {
                self.check_heritage_compatibility(
                    decl,
                    interface_type,
                    base,
                    diagnostic_codes::INTERFACE_INCORRECTLY_EXTENDS,
                );
            }
        }

        self.check_index_signatures_of(decl, &members);
        if self.options.check_privacy {
            self.check_heritage_privacy(decl, NodeIndex::NONE, &extends);
        }
    }

    /// Every declaration of a merged interface names the same type
    /// parameters in the same order.
    fn check_merged_type_parameters(&mut self, decl: DeclId, interface_type: SymbolId) {
        let Some(first) = self.resolver.symbol(interface_type).map(|s| s.first_declaration()) else {
            return;
        };
        if first.is_none() || first == decl {
            return;
        }
        if self.type_parameter_names(first) != self.type_parameter_names(decl) {
            let name = self.decl_name(decl);
            self.error_at_decl(decl, diagnostic_codes::TYPE_PARAMETERS_MUST_BE_IDENTICAL, &[&name]);
        }
    }

    fn type_parameter_names(&self, decl: DeclId) -> Vec<String> {
        let decls = &self.resolver.chain().decls;
        decls
            .children(decl)
            .iter()
            .filter_map(|&c| decls.get(c))
            .filter(|c| c.kind == DeclKind::TypeParameter)
            .map(|c| c.name.clone())
            .collect()
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// A derived class constructor calls `super`, first thing when the
    /// class initializes properties.
    pub(crate) fn check_constructor(&mut self, decl: DeclId, node: NodeIndex) {
        let Some(body) = self
            .arena
            .get(node)
            .and_then(|n| self.arena.get_function(n))
            .map(|f| f.body)
            .filter(|b| b.is_some())
        else {
            return;
        };
        let class_decl = self.resolver.chain().decls.parent(decl);
        let class_type = self.symbol_of_decl(class_decl);
        if self.resolver.inheritable_bases(class_type).is_empty() {
            return;
        }
        let statements: Vec<NodeIndex> = self
            .arena
            .get(body)
            .and_then(|n| self.arena.get_block(n))
            .map(|b| b.statements.iter().collect())
            .unwrap_or_default();
        if !self.contains_super_call(body) {
            self.error_at_decl(decl, diagnostic_codes::DERIVED_CONSTRUCTOR_MUST_CALL_SUPER, &[]);
            return;
        }
        let first_is_super = statements.first().is_some_and(|&s| self.is_super_call_statement(s));
        if !first_is_super && self.requires_leading_super_call(class_decl) {
            self.error_at_decl(decl, diagnostic_codes::SUPER_CALL_MUST_BE_FIRST_STATEMENT, &[]);
        }
    }

    fn is_super_call_statement(&self, statement: NodeIndex) -> bool {
        let Some(expression) = self
            .arena
            .get(statement)
            .filter(|n| n.kind == SyntaxKind::ExpressionStatement)
            .and_then(|n| self.arena.get_wrapped_expr(n))
            .map(|w| w.expression)
        else {
            return false;
        };
        self.is_super_call(expression)
    }

    fn is_super_call(&self, expression: NodeIndex) -> bool {
        self.arena
            .get(expression)
            .filter(|n| n.kind == SyntaxKind::CallExpression)
            .and_then(|n| self.arena.get_call_expr(n))
            .is_some_and(|c| self.arena.kind(c.expression) == Some(SyntaxKind::SuperKeyword))
    }

    /// A `super(...)` call statement anywhere in the constructor's
    /// statement tree. Nested functions and classes are not entered.
    fn contains_super_call(&self, node: NodeIndex) -> bool {
        let Some(n) = self.arena.get(node) else {
            return false;
        };
        let any = |list: &pullc_syntax::NodeList| list.iter().any(|s| self.contains_super_call(s));
        match &n.data {
            NodeData::Wrapped(_) if n.kind == SyntaxKind::ExpressionStatement => self.is_super_call_statement(node),
            NodeData::Block(block) => any(&block.statements),
            NodeData::If(s) => self.contains_super_call(s.then_statement) || self.contains_super_call(s.else_statement),
            NodeData::Loop(s) => self.contains_super_call(s.statement),
            NodeData::ForIn(s) => self.contains_super_call(s.statement),
            NodeData::Labeled(s) => self.contains_super_call(s.statement),
            NodeData::Switch(s) => any(&s.clauses),
            NodeData::CaseClause(c) => any(&c.statements),
            NodeData::Try(t) => {
                self.contains_super_call(t.try_block)
                    || self.contains_super_call(t.catch_clause)
                    || self.contains_super_call(t.finally_block)
            }
            NodeData::CatchClause(c) => self.contains_super_call(c.block),
            _ => false,
        }
    }

    /// Initialized instance properties or parameter properties.
    fn requires_leading_super_call(&self, class_decl: DeclId) -> bool {
        let decls = &self.resolver.chain().decls;
        decls.children(class_decl).iter().filter_map(|&c| decls.get(c)).any(|member| {
            member.kind == DeclKind::Property
                && !member.is_static()
                && (member.flags.contains(DeclFlags::HAS_INITIALIZER)
                    || member.flags.contains(DeclFlags::PROPERTY_PARAMETER))
        })
    }

    // =========================================================================
    // Member access
    // =========================================================================

    /// Visibility rules of `object.name`: `super` reaches only methods,
    /// private members only from their class, statics never through an
    /// instance.
    pub(crate) fn check_member_access(&mut self, node: NodeIndex) {
        let Some((object, name_node)) = self
            .arena
            .get(node)
            .and_then(|n| self.arena.get_access_expr(n))
            .map(|a| (a.expression, a.name_or_argument))
        else {
            return;
        };
        let unit = self.unit;
        let member = self.resolver.symbol_at(unit, name_node);
        let Some((name, is_method, is_private, is_static, member_decl)) = self.resolver.symbol(member).map(|s| {
            (
                s.name.clone(),
                matches!(s.kind, SymbolKind::Method { .. } | SymbolKind::Function),
                s.is_private(),
                s.is_static(),
                s.first_declaration(),
            )
        }) else {
            return;
        };

        if self.arena.kind(object) == Some(SyntaxKind::SuperKeyword) {
            if !is_method {
                self.error_at_node(name_node, diagnostic_codes::SUPER_ACCESS_ONLY_METHODS, &[]);
            }
            return;
        }

        if is_private {
            let declaring = self.resolver.enclosing_class_decl(member_decl);
            let scope = self.resolver.enclosing_scope(unit, node);
            let accessing = self.resolver.enclosing_class_decl(scope);
            let declaring_class = self.symbol_of_decl(declaring);
            if declaring.is_some() && self.symbol_of_decl(accessing) != declaring_class {
                let class_name = self.symbol_name(declaring_class);
                self.error_at_node(name_node, diagnostic_codes::PROPERTY_IS_PRIVATE, &[&name, &class_name]);
                return;
            }
        }

        if is_static {
            let object_type = self.resolver.resolved_expression(unit, object).unwrap_or(SymbolId::NONE);
            let target = self.resolver.generic_target(object_type);
            if self.resolver.is_kind(target, |k| matches!(k, SymbolKind::Class(_))) {
                let class_name = self.symbol_name(target);
                self.error_at_node(name_node, diagnostic_codes::STATIC_MEMBER_VIA_INSTANCE, &[&name, &class_name]);
            }
        }
    }
}
