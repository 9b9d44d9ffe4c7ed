//! AST → declaration tree.
//!
//! Walks one unit's AST and creates a `Decl` for every declaration site,
//! recording the node ↔ decl mapping in the unit. `var` declarations are
//! function scoped: decls found in nested blocks attach to the nearest
//! function, module or script decl. Catch clauses and `with` statements get
//! their own block decls.

use std::sync::Arc;

use pullc_syntax::{ModifierFlags, Node, NodeArena, NodeData, NodeIndex, NodeList, SyntaxKind};
use tracing::debug;

use crate::decl::{DeclArena, DeclFlags, DeclId, DeclKind};
use crate::semantic_info::SemanticInfoChain;
use crate::semantic_unit::UnitId;

/// Collect the decl tree of `unit` from its current AST and install it as
/// the unit's script decl. Returns the new script decl.
pub fn collect_unit_decls(chain: &mut SemanticInfoChain, unit: UnitId) -> DeclId {
    let Some(semantic_unit) = chain.unit(unit) else {
        return DeclId::NONE;
    };
    let arena = Arc::clone(&semantic_unit.arena);
    let root = semantic_unit.root;
    let script_name = semantic_unit.path.clone();

    let mut collector = DeclCollector {
        decls: &mut chain.decls,
        arena: &arena,
        unit,
        script_name: &script_name,
        node_decls: Vec::new(),
    };
    let script = collector.collect_source_file(root);
    let node_decls = std::mem::take(&mut collector.node_decls);
    debug!(unit = unit.0, decls = node_decls.len(), "collected decls");

    if let Some(semantic_unit) = chain.unit_mut(unit) {
        semantic_unit.script_decl = script;
        for (node, decl) in node_decls {
            semantic_unit.set_decl_for_node(node, decl);
        }
    }
    script
}

fn modifier_flags(node: &Node) -> DeclFlags {
    let mut flags = DeclFlags::empty();
    if node.has_modifier(ModifierFlags::EXPORT) {
        flags |= DeclFlags::EXPORTED;
    }
    if node.has_modifier(ModifierFlags::DECLARE) {
        flags |= DeclFlags::AMBIENT;
    }
    if node.has_modifier(ModifierFlags::STATIC) {
        flags |= DeclFlags::STATIC;
    }
    if node.has_modifier(ModifierFlags::PRIVATE) {
        flags |= DeclFlags::PRIVATE;
    }
    if node.has_modifier(ModifierFlags::PUBLIC) {
        flags |= DeclFlags::PUBLIC;
    }
    flags
}

/// A module is instantiated when any of its statements produces a value.
pub fn is_instantiated_module(arena: &NodeArena, statements: &NodeList) -> bool {
    statements.iter().any(|stmt| {
        let Some(node) = arena.get(stmt) else {
            return false;
        };
        match node.kind {
            SyntaxKind::InterfaceDeclaration | SyntaxKind::ImportEqualsDeclaration => false,
            SyntaxKind::ModuleDeclaration => arena
                .get_module(node)
                .is_some_and(|m| is_instantiated_module(arena, &m.statements)),
            _ => true,
        }
    })
}

struct DeclCollector<'a> {
    decls: &'a mut DeclArena,
    arena: &'a NodeArena,
    unit: UnitId,
    script_name: &'a str,
    node_decls: Vec<(NodeIndex, DeclId)>,
}

impl DeclCollector<'_> {
    fn add_decl(
        &mut self,
        kind: DeclKind,
        mut flags: DeclFlags,
        parent: DeclId,
        node: NodeIndex,
        name_node: NodeIndex,
    ) -> DeclId {
        if self
            .decls
            .get(parent)
            .is_some_and(|p| p.flags.contains(DeclFlags::AMBIENT))
        {
            flags |= DeclFlags::AMBIENT;
        }
        let name = self.arena.name_text(name_node).unwrap_or_default().to_string();
        let id = self.decls.alloc(
            kind,
            flags,
            name,
            self.unit,
            self.script_name,
            parent,
            node,
            name_node,
        );
        self.node_decls.push((node, id));
        id
    }

    fn collect_source_file(&mut self, root: NodeIndex) -> DeclId {
        let script = self.decls.alloc(
            DeclKind::Script,
            DeclFlags::empty(),
            self.script_name.to_string(),
            self.unit,
            self.script_name,
            DeclId::NONE,
            root,
            NodeIndex::NONE,
        );
        self.node_decls.push((root, script));
        let arena = self.arena;
        if let Some(file) = arena.get(root).and_then(|n| arena.get_source_file(n)) {
            for stmt in file.statements.iter() {
                self.collect_statement(stmt, script);
            }
        }
        script
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn collect_statements(&mut self, statements: &NodeList, parent: DeclId) {
        for stmt in statements.iter() {
            self.collect_statement(stmt, parent);
        }
    }

    fn collect_statement(&mut self, idx: NodeIndex, parent: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match &node.data {
            NodeData::VariableStatement(stmt) => {
                let flags = modifier_flags(node);
                for decl in stmt.declarations.iter() {
                    self.collect_variable(decl, flags, parent);
                }
            }
            NodeData::Function(_) if node.kind == SyntaxKind::FunctionDeclaration => {
                self.collect_function_like(idx, DeclKind::Function, modifier_flags(node), parent);
            }
            NodeData::Class(_) => self.collect_class(idx, parent),
            NodeData::Interface(_) => self.collect_interface(idx, parent),
            NodeData::Module(module) => {
                let mut flags = modifier_flags(node);
                if is_instantiated_module(arena, &module.statements) {
                    flags |= DeclFlags::INSTANTIATED;
                }
                let decl = self.add_decl(DeclKind::Container, flags, parent, idx, module.name);
                self.collect_statements(&module.statements, decl);
            }
            NodeData::Enum(data) => {
                let mut flags = modifier_flags(node);
                let first_implicit = data
                    .members
                    .iter()
                    .next()
                    .and_then(|m| arena.get(m))
                    .and_then(|m| arena.get_enum_member(m))
                    .is_some_and(|m| m.initializer.is_none());
                if first_implicit {
                    flags |= DeclFlags::IMPLICIT_FIRST_MEMBER;
                }
                let decl = self.add_decl(DeclKind::Enum, flags, parent, idx, data.name);
                for member in data.members.iter() {
                    let Some(member_data) = arena.get(member).and_then(|m| arena.get_enum_member(m))
                    else {
                        continue;
                    };
                    let mut member_flags = DeclFlags::EXPORTED;
                    if member_data.initializer.is_some() {
                        member_flags |= DeclFlags::HAS_INITIALIZER;
                    }
                    let member_decl =
                        self.add_decl(DeclKind::EnumMember, member_flags, decl, member, member_data.name);
                    self.collect_expression(member_data.initializer, member_decl);
                }
            }
            NodeData::ImportEquals(import) => {
                self.add_decl(DeclKind::TypeAlias, modifier_flags(node), parent, idx, import.name);
            }
            NodeData::Block(block) => self.collect_statements(&block.statements, parent),
            NodeData::Wrapped(wrapped) => self.collect_expression(wrapped.expression, parent),
            NodeData::If(stmt) => {
                self.collect_expression(stmt.expression, parent);
                self.collect_statement(stmt.then_statement, parent);
                self.collect_statement(stmt.else_statement, parent);
            }
            NodeData::Loop(stmt) => {
                self.collect_for_initializer(stmt.initializer, parent);
                self.collect_expression(stmt.condition, parent);
                self.collect_expression(stmt.incrementor, parent);
                self.collect_statement(stmt.statement, parent);
            }
            NodeData::ForIn(stmt) => {
                self.collect_for_initializer(stmt.initializer, parent);
                self.collect_expression(stmt.expression, parent);
                self.collect_statement(stmt.statement, parent);
            }
            NodeData::Switch(stmt) => {
                self.collect_expression(stmt.expression, parent);
                for clause in stmt.clauses.iter() {
                    if let Some(data) = arena.get(clause).and_then(|c| arena.get_case_clause(c)) {
                        self.collect_expression(data.expression, parent);
                        self.collect_statements(&data.statements, parent);
                    }
                }
            }
            NodeData::Labeled(stmt) => self.collect_statement(stmt.statement, parent),
            NodeData::With(stmt) => {
                self.collect_expression(stmt.expression, parent);
                let block = self.add_decl(DeclKind::WithBlock, DeclFlags::empty(), parent, idx, NodeIndex::NONE);
                self.collect_statement(stmt.statement, block);
            }
            NodeData::Try(stmt) => {
                self.collect_statement(stmt.try_block, parent);
                if let Some(catch) = arena.get(stmt.catch_clause).and_then(|c| arena.get_catch_clause(c)) {
                    let block = self.add_decl(
                        DeclKind::CatchBlock,
                        DeclFlags::empty(),
                        parent,
                        stmt.catch_clause,
                        NodeIndex::NONE,
                    );
                    self.add_decl(DeclKind::Variable, DeclFlags::empty(), block, catch.variable, catch.variable);
                    self.collect_statement(catch.block, block);
                }
                self.collect_statement(stmt.finally_block, parent);
            }
            _ => {}
        }
    }

    fn collect_for_initializer(&mut self, idx: NodeIndex, parent: DeclId) {
        if self.arena.kind(idx) == Some(SyntaxKind::VariableStatement) {
            self.collect_statement(idx, parent);
        } else {
            self.collect_expression(idx, parent);
        }
    }

    fn collect_variable(&mut self, idx: NodeIndex, statement_flags: DeclFlags, parent: DeclId) {
        let arena = self.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_variable_declaration(n)) else {
            return;
        };
        let mut flags = statement_flags;
        if data.initializer.is_some() {
            flags |= DeclFlags::HAS_INITIALIZER;
        }
        let decl = self.add_decl(DeclKind::Variable, flags, parent, idx, data.name);
        self.collect_type(data.type_annotation, decl);
        self.collect_expression(data.initializer, decl);
    }

    // =========================================================================
    // Functions and signatures
    // =========================================================================

    /// Function declarations, methods, constructors, accessors, function
    /// expressions and signature-like members all share this shape.
    fn collect_function_like(&mut self, idx: NodeIndex, kind: DeclKind, mut flags: DeclFlags, parent: DeclId) -> DeclId {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return DeclId::NONE;
        };
        let Some(func) = arena.get_function(node) else {
            return DeclId::NONE;
        };
        let has_body = func.body.is_some();
        if !has_body && kind.is_function_like() {
            flags |= DeclFlags::SIGNATURE;
        }
        if func.question_token {
            flags |= DeclFlags::OPTIONAL;
        }
        if node.kind == SyntaxKind::ArrowFunction {
            flags |= DeclFlags::ARROW;
        }
        let decl = self.add_decl(kind, flags, parent, idx, func.name);

        for tp in func.type_parameters.iter() {
            self.collect_type_parameter(tp, decl);
        }
        let class_decl = if kind == DeclKind::Constructor { parent } else { DeclId::NONE };
        for param in func.parameters.iter() {
            self.collect_parameter(param, decl, class_decl);
        }
        self.collect_type(func.type_annotation, decl);

        match arena.get(func.body) {
            Some(body) if body.kind == SyntaxKind::Block => {
                if let Some(block) = arena.get_block(body) {
                    self.collect_statements(&block.statements, decl);
                }
            }
            Some(_) => self.collect_expression(func.body, decl),
            None => {}
        }
        decl
    }

    fn collect_type_parameter(&mut self, idx: NodeIndex, parent: DeclId) {
        let arena = self.arena;
        let Some(data) = arena.get(idx).and_then(|n| arena.get_type_parameter(n)) else {
            return;
        };
        let decl = self.add_decl(DeclKind::TypeParameter, DeclFlags::empty(), parent, idx, data.name);
        self.collect_type(data.constraint, decl);
    }

    /// Parameters of `owner`. When `class_decl` is set (constructor
    /// parameters), accessibility-modified parameters also declare a
    /// property on the class.
    fn collect_parameter(&mut self, idx: NodeIndex, owner: DeclId, class_decl: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        let Some(data) = arena.get_parameter(node) else {
            return;
        };
        let accessibility = modifier_flags(node) & (DeclFlags::PUBLIC | DeclFlags::PRIVATE);
        let mut flags = DeclFlags::empty();
        if data.question_token {
            flags |= DeclFlags::OPTIONAL;
        }
        if data.dot_dot_dot_token {
            flags |= DeclFlags::REST;
        }
        if data.initializer.is_some() {
            flags |= DeclFlags::HAS_INITIALIZER;
        }
        let is_property = class_decl.is_some() && !accessibility.is_empty();
        if is_property {
            flags |= DeclFlags::PROPERTY_PARAMETER;
        }
        let decl = self.add_decl(DeclKind::Parameter, flags | accessibility, owner, idx, data.name);

        if is_property {
            let name = arena.name_text(data.name).unwrap_or_default().to_string();
            let property = self.decls.alloc(
                DeclKind::Property,
                accessibility | DeclFlags::PROPERTY_PARAMETER,
                name,
                self.unit,
                self.script_name,
                class_decl,
                idx,
                data.name,
            );
            if let Some(param) = self.decls.get_mut(decl) {
                param.value_decl = property;
            }
            if let Some(prop) = self.decls.get_mut(property) {
                prop.value_decl = decl;
            }
        }

        self.collect_type(data.type_annotation, decl);
        self.collect_expression(data.initializer, decl);
    }

    // =========================================================================
    // Classes, interfaces and type members
    // =========================================================================

    fn collect_class(&mut self, idx: NodeIndex, parent: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        let Some(class) = arena.get_class(node) else {
            return;
        };
        let decl = self.add_decl(DeclKind::Class, modifier_flags(node), parent, idx, class.name);
        for tp in class.type_parameters.iter() {
            self.collect_type_parameter(tp, decl);
        }
        self.collect_type(class.extends, decl);
        for implemented in class.implements.iter() {
            self.collect_type(implemented, decl);
        }
        for member in class.members.iter() {
            self.collect_class_member(member, decl);
        }
    }

    fn collect_class_member(&mut self, idx: NodeIndex, class_decl: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        let flags = modifier_flags(node);
        match node.kind {
            SyntaxKind::PropertyDeclaration => {
                let Some(prop) = arena.get_property(node) else {
                    return;
                };
                let mut flags = flags;
                if prop.initializer.is_some() {
                    flags |= DeclFlags::HAS_INITIALIZER;
                }
                let decl = self.add_decl(DeclKind::Property, flags, class_decl, idx, prop.name);
                self.collect_type(prop.type_annotation, decl);
                self.collect_expression(prop.initializer, decl);
            }
            SyntaxKind::MethodDeclaration => {
                self.collect_function_like(idx, DeclKind::Method, flags, class_decl);
            }
            SyntaxKind::Constructor => {
                self.collect_function_like(idx, DeclKind::Constructor, flags, class_decl);
            }
            SyntaxKind::GetAccessor => {
                self.collect_function_like(idx, DeclKind::GetAccessor, flags, class_decl);
            }
            SyntaxKind::SetAccessor => {
                self.collect_function_like(idx, DeclKind::SetAccessor, flags, class_decl);
            }
            SyntaxKind::IndexSignature => {
                self.collect_function_like(idx, DeclKind::IndexSignature, flags, class_decl);
            }
            _ => {}
        }
    }

    fn collect_interface(&mut self, idx: NodeIndex, parent: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        let Some(iface) = arena.get_interface(node) else {
            return;
        };
        let decl = self.add_decl(DeclKind::Interface, modifier_flags(node), parent, idx, iface.name);
        for tp in iface.type_parameters.iter() {
            self.collect_type_parameter(tp, decl);
        }
        for base in iface.extends.iter() {
            self.collect_type(base, decl);
        }
        for member in iface.members.iter() {
            self.collect_type_member(member, decl);
        }
    }

    fn collect_type_member(&mut self, idx: NodeIndex, owner: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            SyntaxKind::PropertySignature => {
                let Some(prop) = arena.get_property(node) else {
                    return;
                };
                let flags = if prop.question_token {
                    DeclFlags::OPTIONAL
                } else {
                    DeclFlags::empty()
                };
                let decl = self.add_decl(DeclKind::Property, flags, owner, idx, prop.name);
                self.collect_type(prop.type_annotation, decl);
            }
            SyntaxKind::MethodSignature => {
                self.collect_function_like(idx, DeclKind::Method, DeclFlags::SIGNATURE, owner);
            }
            SyntaxKind::CallSignature => {
                self.collect_function_like(idx, DeclKind::CallSignature, DeclFlags::empty(), owner);
            }
            SyntaxKind::ConstructSignature => {
                self.collect_function_like(idx, DeclKind::ConstructSignature, DeclFlags::empty(), owner);
            }
            SyntaxKind::IndexSignature => {
                self.collect_function_like(idx, DeclKind::IndexSignature, DeclFlags::empty(), owner);
            }
            _ => {}
        }
    }

    // =========================================================================
    // Type nodes
    // =========================================================================

    fn collect_type(&mut self, idx: NodeIndex, parent: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match node.kind {
            SyntaxKind::TypeLiteral => {
                let Some(literal) = arena.get_type_literal(node) else {
                    return;
                };
                let decl = self.add_decl(DeclKind::ObjectType, DeclFlags::empty(), parent, idx, NodeIndex::NONE);
                for member in literal.members.iter() {
                    self.collect_type_member(member, decl);
                }
            }
            SyntaxKind::FunctionType => {
                self.collect_function_like(idx, DeclKind::FunctionType, DeclFlags::empty(), parent);
            }
            SyntaxKind::ConstructorType => {
                self.collect_function_like(idx, DeclKind::ConstructorType, DeclFlags::empty(), parent);
            }
            SyntaxKind::ArrayType => {
                if let Some(array) = arena.get_array_type(node) {
                    self.collect_type(array.element_type, parent);
                }
            }
            SyntaxKind::TypeReference => {
                if let Some(reference) = arena.get_type_ref(node) {
                    for arg in reference.type_arguments.iter() {
                        self.collect_type(arg, parent);
                    }
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn collect_expression(&mut self, idx: NodeIndex, parent: DeclId) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };
        match &node.data {
            NodeData::Function(_) => {
                self.collect_function_like(idx, DeclKind::FunctionExpression, DeclFlags::empty(), parent);
            }
            NodeData::LiteralExpr(literal) if node.kind == SyntaxKind::ObjectLiteralExpression => {
                let decl = self.add_decl(DeclKind::ObjectLiteral, DeclFlags::empty(), parent, idx, NodeIndex::NONE);
                for property in literal.elements.iter() {
                    let Some(assignment) = arena.get(property).and_then(|p| arena.get_property_assignment(p))
                    else {
                        continue;
                    };
                    let prop = self.add_decl(
                        DeclKind::Property,
                        DeclFlags::HAS_INITIALIZER,
                        decl,
                        property,
                        assignment.name,
                    );
                    self.collect_expression(assignment.initializer, prop);
                }
            }
            NodeData::LiteralExpr(literal) => {
                for element in literal.elements.iter() {
                    self.collect_expression(element, parent);
                }
            }
            NodeData::Access(access) => {
                self.collect_expression(access.expression, parent);
                if node.kind == SyntaxKind::ElementAccessExpression {
                    self.collect_expression(access.name_or_argument, parent);
                }
            }
            NodeData::Call(call) => {
                self.collect_expression(call.expression, parent);
                for arg in call.type_arguments.iter() {
                    self.collect_type(arg, parent);
                }
                for arg in call.arguments.iter() {
                    self.collect_expression(arg, parent);
                }
            }
            NodeData::TypeAssertion(assertion) => {
                self.collect_type(assertion.type_node, parent);
                self.collect_expression(assertion.expression, parent);
            }
            NodeData::Wrapped(wrapped) => self.collect_expression(wrapped.expression, parent),
            NodeData::Unary(unary) => self.collect_expression(unary.operand, parent),
            NodeData::Binary(binary) => {
                self.collect_expression(binary.left, parent);
                self.collect_expression(binary.right, parent);
            }
            NodeData::Conditional(cond) => {
                self.collect_expression(cond.condition, parent);
                self.collect_expression(cond.when_true, parent);
                self.collect_expression(cond.when_false, parent);
            }
            _ => {}
        }
    }
}
