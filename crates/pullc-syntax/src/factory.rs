//! Programmatic AST construction.
//!
//! The semantic core receives its trees from an upstream parser. `NodeFactory`
//! builds the same trees directly, which is how drivers without a parser
//! (and the test suites) produce input. Leaf nodes are laid out left to right
//! on a virtual source line, so every node gets a distinct, stable
//! `(pos, end)` span; compound nodes span their children.

use crate::node::*;
use crate::syntax_kind::{BinaryOperator, ModifierFlags, SyntaxKind, UnaryOperator};

fn opt(index: Option<NodeIndex>) -> NodeIndex {
    index.unwrap_or(NodeIndex::NONE)
}

/// Builder for a single source unit's `NodeArena`.
#[derive(Debug, Default)]
pub struct NodeFactory {
    arena: NodeArena,
    cursor: u32,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Wrap the top-level statements in a `SourceFile` and hand back the arena.
    pub fn finish(mut self, file_name: &str, statements: Vec<NodeIndex>) -> (NodeArena, NodeIndex) {
        let root = self.compound(
            SyntaxKind::SourceFile,
            ModifierFlags::empty(),
            NodeData::SourceFile(SourceFileData {
                file_name: file_name.to_string(),
                statements: NodeList::new(statements.clone()),
            }),
            &statements,
        );
        if let Some(node) = self.arena.get_mut(root) {
            node.pos = 0;
        }
        (self.arena, root)
    }

    // =========================================================================
    // Layout helpers
    // =========================================================================

    fn leaf(&mut self, kind: SyntaxKind, data: NodeData, text_len: usize) -> NodeIndex {
        let pos = self.cursor;
        let end = pos + (text_len.max(1) as u32);
        self.cursor = end + 1;
        self.arena.add(Node {
            kind,
            pos,
            end,
            modifiers: ModifierFlags::empty(),
            parent: NodeIndex::NONE,
            data,
        })
    }

    fn compound(
        &mut self,
        kind: SyntaxKind,
        modifiers: ModifierFlags,
        data: NodeData,
        children: &[NodeIndex],
    ) -> NodeIndex {
        let mut pos = u32::MAX;
        let mut end = 0;
        for &child in children {
            if let Some(node) = self.arena.get(child) {
                pos = pos.min(node.pos);
                end = end.max(node.end);
            }
        }
        if pos == u32::MAX {
            pos = self.cursor;
            end = pos + 1;
            self.cursor = end + 1;
        }
        let idx = self.arena.add(Node {
            kind,
            pos,
            end,
            modifiers,
            parent: NodeIndex::NONE,
            data,
        });
        for &child in children {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = idx;
            }
        }
        idx
    }

    fn block_of(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.block(statements)
    }

    fn function_like(
        &mut self,
        kind: SyntaxKind,
        modifiers: ModifierFlags,
        name: NodeIndex,
        question_token: bool,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        type_annotation: NodeIndex,
        body: NodeIndex,
    ) -> NodeIndex {
        let mut children = vec![name];
        children.extend(&type_parameters);
        children.extend(&parameters);
        children.push(type_annotation);
        children.push(body);
        self.compound(
            kind,
            modifiers,
            NodeData::Function(FunctionData {
                name,
                question_token,
                type_parameters: NodeList::new(type_parameters),
                parameters: NodeList::new(parameters),
                type_annotation,
                body,
            }),
            &children,
        )
    }

    // =========================================================================
    // Names and literals
    // =========================================================================

    pub fn ident(&mut self, text: &str) -> NodeIndex {
        self.leaf(
            SyntaxKind::Identifier,
            NodeData::Identifier(IdentifierData {
                text: text.to_string(),
            }),
            text.len(),
        )
    }

    /// An identifier for simple names, or a left-nested `QualifiedName` for dotted ones.
    pub fn entity_name(&mut self, dotted: &str) -> NodeIndex {
        let mut parts = dotted.split('.');
        let first = parts.next().unwrap_or_default();
        let mut left = self.ident(first);
        for part in parts {
            let right = self.ident(part);
            left = self.compound(
                SyntaxKind::QualifiedName,
                ModifierFlags::empty(),
                NodeData::QualifiedName(QualifiedNameData { left, right }),
                &[left, right],
            );
        }
        left
    }

    pub fn num(&mut self, value: f64) -> NodeIndex {
        let text = value.to_string();
        let len = text.len();
        self.leaf(
            SyntaxKind::NumericLiteral,
            NodeData::Literal(LiteralData {
                text,
                value: Some(value),
            }),
            len,
        )
    }

    pub fn str_lit(&mut self, text: &str) -> NodeIndex {
        self.leaf(
            SyntaxKind::StringLiteral,
            NodeData::Literal(LiteralData {
                text: text.to_string(),
                value: None,
            }),
            text.len() + 2,
        )
    }

    pub fn regex(&mut self, text: &str) -> NodeIndex {
        self.leaf(
            SyntaxKind::RegularExpressionLiteral,
            NodeData::Literal(LiteralData {
                text: text.to_string(),
                value: None,
            }),
            text.len(),
        )
    }

    pub fn true_lit(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::TrueKeyword, NodeData::None, 4)
    }

    pub fn false_lit(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::FalseKeyword, NodeData::None, 5)
    }

    pub fn null_lit(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::NullKeyword, NodeData::None, 4)
    }

    pub fn this_expr(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::ThisKeyword, NodeData::None, 4)
    }

    pub fn super_expr(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::SuperKeyword, NodeData::None, 5)
    }

    pub fn omitted(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::OmittedExpression, NodeData::None, 0)
    }

    // =========================================================================
    // Type nodes
    // =========================================================================

    pub fn keyword_type(&mut self, kind: SyntaxKind) -> NodeIndex {
        let len = match kind {
            SyntaxKind::AnyKeyword => 3,
            SyntaxKind::VoidKeyword => 4,
            SyntaxKind::BooleanKeyword => 7,
            _ => 6,
        };
        self.leaf(kind, NodeData::None, len)
    }

    pub fn number_type(&mut self) -> NodeIndex {
        self.keyword_type(SyntaxKind::NumberKeyword)
    }

    pub fn string_type(&mut self) -> NodeIndex {
        self.keyword_type(SyntaxKind::StringKeyword)
    }

    pub fn boolean_type(&mut self) -> NodeIndex {
        self.keyword_type(SyntaxKind::BooleanKeyword)
    }

    pub fn any_type(&mut self) -> NodeIndex {
        self.keyword_type(SyntaxKind::AnyKeyword)
    }

    pub fn void_type(&mut self) -> NodeIndex {
        self.keyword_type(SyntaxKind::VoidKeyword)
    }

    pub fn type_ref(&mut self, name: &str, type_arguments: Vec<NodeIndex>) -> NodeIndex {
        let type_name = self.entity_name(name);
        let mut children = vec![type_name];
        children.extend(&type_arguments);
        self.compound(
            SyntaxKind::TypeReference,
            ModifierFlags::empty(),
            NodeData::TypeRef(TypeRefData {
                type_name,
                type_arguments: NodeList::new(type_arguments),
            }),
            &children,
        )
    }

    pub fn array_type(&mut self, element_type: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::ArrayType,
            ModifierFlags::empty(),
            NodeData::ArrayType(ArrayTypeData { element_type }),
            &[element_type],
        )
    }

    pub fn type_literal(&mut self, members: Vec<NodeIndex>) -> NodeIndex {
        self.compound(
            SyntaxKind::TypeLiteral,
            ModifierFlags::empty(),
            NodeData::TypeLiteral(TypeLiteralData {
                members: NodeList::new(members.clone()),
            }),
            &members,
        )
    }

    pub fn function_type(
        &mut self,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: NodeIndex,
    ) -> NodeIndex {
        self.function_like(
            SyntaxKind::FunctionType,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            type_parameters,
            parameters,
            return_type,
            NodeIndex::NONE,
        )
    }

    pub fn constructor_type(
        &mut self,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: NodeIndex,
    ) -> NodeIndex {
        self.function_like(
            SyntaxKind::ConstructorType,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            type_parameters,
            parameters,
            return_type,
            NodeIndex::NONE,
        )
    }

    pub fn type_query(&mut self, dotted: &str) -> NodeIndex {
        let expr_name = self.entity_name(dotted);
        self.compound(
            SyntaxKind::TypeQuery,
            ModifierFlags::empty(),
            NodeData::TypeQuery(TypeQueryData { expr_name }),
            &[expr_name],
        )
    }

    pub fn type_param(&mut self, name: &str, constraint: Option<NodeIndex>) -> NodeIndex {
        let name = self.ident(name);
        let constraint = opt(constraint);
        self.compound(
            SyntaxKind::TypeParameter,
            ModifierFlags::empty(),
            NodeData::TypeParameter(TypeParameterData { name, constraint }),
            &[name, constraint],
        )
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn parameter(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_annotation: Option<NodeIndex>,
        question_token: bool,
        dot_dot_dot_token: bool,
        initializer: Option<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let type_annotation = opt(type_annotation);
        let initializer = opt(initializer);
        self.compound(
            SyntaxKind::Parameter,
            modifiers,
            NodeData::Parameter(ParameterData {
                name,
                question_token,
                dot_dot_dot_token,
                type_annotation,
                initializer,
            }),
            &[name, type_annotation, initializer],
        )
    }

    pub fn param(&mut self, name: &str, type_annotation: Option<NodeIndex>) -> NodeIndex {
        self.parameter(ModifierFlags::empty(), name, type_annotation, false, false, None)
    }

    pub fn optional_param(&mut self, name: &str, type_annotation: Option<NodeIndex>) -> NodeIndex {
        self.parameter(ModifierFlags::empty(), name, type_annotation, true, false, None)
    }

    pub fn rest_param(&mut self, name: &str, type_annotation: Option<NodeIndex>) -> NodeIndex {
        self.parameter(ModifierFlags::empty(), name, type_annotation, false, true, None)
    }

    /// A constructor parameter property (`public x: T` / `private x: T`).
    pub fn property_param(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_annotation: Option<NodeIndex>,
    ) -> NodeIndex {
        self.parameter(modifiers, name, type_annotation, false, false, None)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub fn var_decl(
        &mut self,
        name: &str,
        type_annotation: Option<NodeIndex>,
        initializer: Option<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let type_annotation = opt(type_annotation);
        let initializer = opt(initializer);
        self.compound(
            SyntaxKind::VariableDeclaration,
            ModifierFlags::empty(),
            NodeData::VariableDeclaration(VariableDeclarationData {
                name,
                type_annotation,
                initializer,
            }),
            &[name, type_annotation, initializer],
        )
    }

    pub fn var_stmt_list(&mut self, modifiers: ModifierFlags, declarations: Vec<NodeIndex>) -> NodeIndex {
        self.compound(
            SyntaxKind::VariableStatement,
            modifiers,
            NodeData::VariableStatement(VariableStatementData {
                declarations: NodeList::new(declarations.clone()),
            }),
            &declarations,
        )
    }

    /// `var name: type = initializer;` with a single declarator.
    pub fn var_stmt(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_annotation: Option<NodeIndex>,
        initializer: Option<NodeIndex>,
    ) -> NodeIndex {
        let decl = self.var_decl(name, type_annotation, initializer);
        self.var_stmt_list(modifiers, vec![decl])
    }

    /// A function declaration; `body: None` produces an overload signature
    /// (or an ambient declaration when `DECLARE` is set).
    pub fn function_decl(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
        body: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let body = match body {
            Some(statements) => self.block_of(statements),
            None => NodeIndex::NONE,
        };
        self.function_like(
            SyntaxKind::FunctionDeclaration,
            modifiers,
            name,
            false,
            type_parameters,
            parameters,
            opt(return_type),
            body,
        )
    }

    pub fn class_decl(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_parameters: Vec<NodeIndex>,
        extends: Option<NodeIndex>,
        implements: Vec<NodeIndex>,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let extends = opt(extends);
        let mut children = vec![name];
        children.extend(&type_parameters);
        children.push(extends);
        children.extend(&implements);
        children.extend(&members);
        self.compound(
            SyntaxKind::ClassDeclaration,
            modifiers,
            NodeData::Class(ClassData {
                name,
                type_parameters: NodeList::new(type_parameters),
                extends,
                implements: NodeList::new(implements),
                members: NodeList::new(members),
            }),
            &children,
        )
    }

    pub fn interface_decl(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_parameters: Vec<NodeIndex>,
        extends: Vec<NodeIndex>,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let mut children = vec![name];
        children.extend(&type_parameters);
        children.extend(&extends);
        children.extend(&members);
        self.compound(
            SyntaxKind::InterfaceDeclaration,
            modifiers,
            NodeData::Interface(InterfaceData {
                name,
                type_parameters: NodeList::new(type_parameters),
                extends: NodeList::new(extends),
                members: NodeList::new(members),
            }),
            &children,
        )
    }

    pub fn module_decl(&mut self, modifiers: ModifierFlags, name: &str, statements: Vec<NodeIndex>) -> NodeIndex {
        let name = self.ident(name);
        let mut children = vec![name];
        children.extend(&statements);
        self.compound(
            SyntaxKind::ModuleDeclaration,
            modifiers,
            NodeData::Module(ModuleData {
                name,
                statements: NodeList::new(statements),
            }),
            &children,
        )
    }

    pub fn enum_member(&mut self, name: &str, initializer: Option<NodeIndex>) -> NodeIndex {
        let name = self.ident(name);
        let initializer = opt(initializer);
        self.compound(
            SyntaxKind::EnumMember,
            ModifierFlags::empty(),
            NodeData::EnumMember(EnumMemberData { name, initializer }),
            &[name, initializer],
        )
    }

    pub fn enum_decl(&mut self, modifiers: ModifierFlags, name: &str, members: Vec<NodeIndex>) -> NodeIndex {
        let name = self.ident(name);
        let mut children = vec![name];
        children.extend(&members);
        self.compound(
            SyntaxKind::EnumDeclaration,
            modifiers,
            NodeData::Enum(EnumData {
                name,
                members: NodeList::new(members),
            }),
            &children,
        )
    }

    /// `import name = A.B.C;`
    pub fn import_equals(&mut self, modifiers: ModifierFlags, name: &str, reference: &str) -> NodeIndex {
        let name = self.ident(name);
        let module_reference = self.entity_name(reference);
        self.compound(
            SyntaxKind::ImportEqualsDeclaration,
            modifiers,
            NodeData::ImportEquals(ImportEqualsData {
                name,
                module_reference,
            }),
            &[name, module_reference],
        )
    }

    // =========================================================================
    // Class members
    // =========================================================================

    pub fn property_decl(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_annotation: Option<NodeIndex>,
        initializer: Option<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let type_annotation = opt(type_annotation);
        let initializer = opt(initializer);
        self.compound(
            SyntaxKind::PropertyDeclaration,
            modifiers,
            NodeData::Property(PropertyData {
                name,
                question_token: false,
                type_annotation,
                initializer,
            }),
            &[name, type_annotation, initializer],
        )
    }

    pub fn method_decl(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
        body: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let body = match body {
            Some(statements) => self.block_of(statements),
            None => NodeIndex::NONE,
        };
        self.function_like(
            SyntaxKind::MethodDeclaration,
            modifiers,
            name,
            false,
            type_parameters,
            parameters,
            opt(return_type),
            body,
        )
    }

    pub fn constructor(
        &mut self,
        modifiers: ModifierFlags,
        parameters: Vec<NodeIndex>,
        body: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let body = match body {
            Some(statements) => self.block_of(statements),
            None => NodeIndex::NONE,
        };
        self.function_like(
            SyntaxKind::Constructor,
            modifiers,
            NodeIndex::NONE,
            false,
            Vec::new(),
            parameters,
            NodeIndex::NONE,
            body,
        )
    }

    pub fn get_accessor(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        return_type: Option<NodeIndex>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let body = self.block_of(body);
        self.function_like(
            SyntaxKind::GetAccessor,
            modifiers,
            name,
            false,
            Vec::new(),
            Vec::new(),
            opt(return_type),
            body,
        )
    }

    pub fn set_accessor(
        &mut self,
        modifiers: ModifierFlags,
        name: &str,
        parameter: NodeIndex,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        let body = self.block_of(body);
        self.function_like(
            SyntaxKind::SetAccessor,
            modifiers,
            name,
            false,
            Vec::new(),
            vec![parameter],
            NodeIndex::NONE,
            body,
        )
    }

    // =========================================================================
    // Type members
    // =========================================================================

    pub fn property_sig(&mut self, name: &str, question_token: bool, type_annotation: Option<NodeIndex>) -> NodeIndex {
        let name = self.ident(name);
        let type_annotation = opt(type_annotation);
        self.compound(
            SyntaxKind::PropertySignature,
            ModifierFlags::empty(),
            NodeData::Property(PropertyData {
                name,
                question_token,
                type_annotation,
                initializer: NodeIndex::NONE,
            }),
            &[name, type_annotation],
        )
    }

    pub fn method_sig(
        &mut self,
        name: &str,
        question_token: bool,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
    ) -> NodeIndex {
        let name = self.ident(name);
        self.function_like(
            SyntaxKind::MethodSignature,
            ModifierFlags::empty(),
            name,
            question_token,
            type_parameters,
            parameters,
            opt(return_type),
            NodeIndex::NONE,
        )
    }

    pub fn call_sig(
        &mut self,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
    ) -> NodeIndex {
        self.function_like(
            SyntaxKind::CallSignature,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            type_parameters,
            parameters,
            opt(return_type),
            NodeIndex::NONE,
        )
    }

    pub fn construct_sig(
        &mut self,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
    ) -> NodeIndex {
        self.function_like(
            SyntaxKind::ConstructSignature,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            type_parameters,
            parameters,
            opt(return_type),
            NodeIndex::NONE,
        )
    }

    /// `[name: key_type]: return_type`
    pub fn index_sig(&mut self, name: &str, key_type: NodeIndex, return_type: NodeIndex) -> NodeIndex {
        let parameter = self.param(name, Some(key_type));
        self.function_like(
            SyntaxKind::IndexSignature,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            Vec::new(),
            vec![parameter],
            return_type,
            NodeIndex::NONE,
        )
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn array_lit(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.compound(
            SyntaxKind::ArrayLiteralExpression,
            ModifierFlags::empty(),
            NodeData::LiteralExpr(LiteralExprData {
                elements: NodeList::new(elements.clone()),
            }),
            &elements,
        )
    }

    pub fn property_assignment(&mut self, name: &str, initializer: NodeIndex) -> NodeIndex {
        let name = self.ident(name);
        self.compound(
            SyntaxKind::PropertyAssignment,
            ModifierFlags::empty(),
            NodeData::PropertyAssignment(PropertyAssignmentData { name, initializer }),
            &[name, initializer],
        )
    }

    /// Object literal from `(name, initializer)` pairs.
    pub fn object_lit(&mut self, properties: Vec<(&str, NodeIndex)>) -> NodeIndex {
        let properties: Vec<NodeIndex> = properties
            .into_iter()
            .map(|(name, init)| self.property_assignment(name, init))
            .collect();
        self.compound(
            SyntaxKind::ObjectLiteralExpression,
            ModifierFlags::empty(),
            NodeData::LiteralExpr(LiteralExprData {
                elements: NodeList::new(properties.clone()),
            }),
            &properties,
        )
    }

    pub fn prop_access(&mut self, expression: NodeIndex, name: &str) -> NodeIndex {
        let name = self.ident(name);
        self.compound(
            SyntaxKind::PropertyAccessExpression,
            ModifierFlags::empty(),
            NodeData::Access(AccessExprData {
                expression,
                name_or_argument: name,
            }),
            &[expression, name],
        )
    }

    pub fn elem_access(&mut self, expression: NodeIndex, argument: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::ElementAccessExpression,
            ModifierFlags::empty(),
            NodeData::Access(AccessExprData {
                expression,
                name_or_argument: argument,
            }),
            &[expression, argument],
        )
    }

    fn call_like(
        &mut self,
        kind: SyntaxKind,
        expression: NodeIndex,
        type_arguments: Vec<NodeIndex>,
        arguments: Vec<NodeIndex>,
    ) -> NodeIndex {
        let mut children = vec![expression];
        children.extend(&type_arguments);
        children.extend(&arguments);
        self.compound(
            kind,
            ModifierFlags::empty(),
            NodeData::Call(CallExprData {
                expression,
                type_arguments: NodeList::new(type_arguments),
                arguments: NodeList::new(arguments),
            }),
            &children,
        )
    }

    pub fn call(&mut self, expression: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.call_like(SyntaxKind::CallExpression, expression, Vec::new(), arguments)
    }

    pub fn call_generic(
        &mut self,
        expression: NodeIndex,
        type_arguments: Vec<NodeIndex>,
        arguments: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.call_like(SyntaxKind::CallExpression, expression, type_arguments, arguments)
    }

    pub fn new_expr(&mut self, expression: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.call_like(SyntaxKind::NewExpression, expression, Vec::new(), arguments)
    }

    /// `super(args)` as an expression statement, the usual constructor prologue.
    pub fn super_call_stmt(&mut self, arguments: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.super_expr();
        let call = self.call(callee, arguments);
        self.expr_stmt(call)
    }

    pub fn assertion(&mut self, type_node: NodeIndex, expression: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::TypeAssertionExpression,
            ModifierFlags::empty(),
            NodeData::TypeAssertion(TypeAssertionData {
                type_node,
                expression,
            }),
            &[type_node, expression],
        )
    }

    fn wrapped(&mut self, kind: SyntaxKind, expression: NodeIndex) -> NodeIndex {
        self.compound(
            kind,
            ModifierFlags::empty(),
            NodeData::Wrapped(WrappedExprData { expression }),
            &[expression],
        )
    }

    pub fn paren(&mut self, expression: NodeIndex) -> NodeIndex {
        self.wrapped(SyntaxKind::ParenthesizedExpression, expression)
    }

    pub fn typeof_expr(&mut self, expression: NodeIndex) -> NodeIndex {
        self.wrapped(SyntaxKind::TypeOfExpression, expression)
    }

    pub fn delete_expr(&mut self, expression: NodeIndex) -> NodeIndex {
        self.wrapped(SyntaxKind::DeleteExpression, expression)
    }

    pub fn void_expr(&mut self, expression: NodeIndex) -> NodeIndex {
        self.wrapped(SyntaxKind::VoidExpression, expression)
    }

    pub fn func_expr(
        &mut self,
        name: Option<&str>,
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let name = match name {
            Some(name) => self.ident(name),
            None => NodeIndex::NONE,
        };
        let body = self.block_of(body);
        self.function_like(
            SyntaxKind::FunctionExpression,
            ModifierFlags::empty(),
            name,
            false,
            type_parameters,
            parameters,
            opt(return_type),
            body,
        )
    }

    /// Arrow function with a block body.
    pub fn arrow(
        &mut self,
        parameters: Vec<NodeIndex>,
        return_type: Option<NodeIndex>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        let body = self.block_of(body);
        self.function_like(
            SyntaxKind::ArrowFunction,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            Vec::new(),
            parameters,
            opt(return_type),
            body,
        )
    }

    /// Arrow function with a concise expression body.
    pub fn arrow_expr(&mut self, parameters: Vec<NodeIndex>, body: NodeIndex) -> NodeIndex {
        self.function_like(
            SyntaxKind::ArrowFunction,
            ModifierFlags::empty(),
            NodeIndex::NONE,
            false,
            Vec::new(),
            parameters,
            NodeIndex::NONE,
            body,
        )
    }

    pub fn prefix(&mut self, operator: UnaryOperator, operand: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::PrefixUnaryExpression,
            ModifierFlags::empty(),
            NodeData::Unary(UnaryExprData { operator, operand }),
            &[operand],
        )
    }

    pub fn postfix(&mut self, operand: NodeIndex, operator: UnaryOperator) -> NodeIndex {
        self.compound(
            SyntaxKind::PostfixUnaryExpression,
            ModifierFlags::empty(),
            NodeData::Unary(UnaryExprData { operator, operand }),
            &[operand],
        )
    }

    pub fn binary(&mut self, left: NodeIndex, operator: BinaryOperator, right: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::BinaryExpression,
            ModifierFlags::empty(),
            NodeData::Binary(BinaryExprData {
                left,
                operator,
                right,
            }),
            &[left, right],
        )
    }

    pub fn assign(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.binary(left, BinaryOperator::Equals, right)
    }

    pub fn conditional(&mut self, condition: NodeIndex, when_true: NodeIndex, when_false: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::ConditionalExpression,
            ModifierFlags::empty(),
            NodeData::Conditional(ConditionalExprData {
                condition,
                when_true,
                when_false,
            }),
            &[condition, when_true, when_false],
        )
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.compound(
            SyntaxKind::Block,
            ModifierFlags::empty(),
            NodeData::Block(BlockData {
                statements: NodeList::new(statements.clone()),
            }),
            &statements,
        )
    }

    pub fn empty_stmt(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::EmptyStatement, NodeData::None, 1)
    }

    pub fn debugger_stmt(&mut self) -> NodeIndex {
        self.leaf(SyntaxKind::DebuggerStatement, NodeData::None, 8)
    }

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.wrapped(SyntaxKind::ExpressionStatement, expression)
    }

    pub fn return_stmt(&mut self, expression: Option<NodeIndex>) -> NodeIndex {
        match expression {
            Some(expression) => self.wrapped(SyntaxKind::ReturnStatement, expression),
            None => self.leaf(
                SyntaxKind::ReturnStatement,
                NodeData::Wrapped(WrappedExprData {
                    expression: NodeIndex::NONE,
                }),
                6,
            ),
        }
    }

    pub fn throw_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.wrapped(SyntaxKind::ThrowStatement, expression)
    }

    pub fn if_stmt(&mut self, expression: NodeIndex, then_statement: NodeIndex, else_statement: Option<NodeIndex>) -> NodeIndex {
        let else_statement = opt(else_statement);
        self.compound(
            SyntaxKind::IfStatement,
            ModifierFlags::empty(),
            NodeData::If(IfStatementData {
                expression,
                then_statement,
                else_statement,
            }),
            &[expression, then_statement, else_statement],
        )
    }

    fn loop_stmt(
        &mut self,
        kind: SyntaxKind,
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    ) -> NodeIndex {
        self.compound(
            kind,
            ModifierFlags::empty(),
            NodeData::Loop(LoopData {
                initializer,
                condition,
                incrementor,
                statement,
            }),
            &[initializer, condition, incrementor, statement],
        )
    }

    pub fn while_stmt(&mut self, condition: NodeIndex, statement: NodeIndex) -> NodeIndex {
        self.loop_stmt(SyntaxKind::WhileStatement, NodeIndex::NONE, condition, NodeIndex::NONE, statement)
    }

    pub fn do_stmt(&mut self, statement: NodeIndex, condition: NodeIndex) -> NodeIndex {
        self.loop_stmt(SyntaxKind::DoStatement, NodeIndex::NONE, condition, NodeIndex::NONE, statement)
    }

    pub fn for_stmt(
        &mut self,
        initializer: Option<NodeIndex>,
        condition: Option<NodeIndex>,
        incrementor: Option<NodeIndex>,
        statement: NodeIndex,
    ) -> NodeIndex {
        self.loop_stmt(
            SyntaxKind::ForStatement,
            opt(initializer),
            opt(condition),
            opt(incrementor),
            statement,
        )
    }

    /// `for (initializer in expression) statement`; the initializer is a
    /// `VariableStatement` or an expression.
    pub fn for_in_stmt(&mut self, initializer: NodeIndex, expression: NodeIndex, statement: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::ForInStatement,
            ModifierFlags::empty(),
            NodeData::ForIn(ForInData {
                initializer,
                expression,
                statement,
            }),
            &[initializer, expression, statement],
        )
    }

    fn jump(&mut self, kind: SyntaxKind, label: Option<&str>) -> NodeIndex {
        let label = match label {
            Some(label) => self.ident(label),
            None => NodeIndex::NONE,
        };
        self.compound(kind, ModifierFlags::empty(), NodeData::Jump(JumpData { label }), &[label])
    }

    pub fn break_stmt(&mut self, label: Option<&str>) -> NodeIndex {
        self.jump(SyntaxKind::BreakStatement, label)
    }

    pub fn continue_stmt(&mut self, label: Option<&str>) -> NodeIndex {
        self.jump(SyntaxKind::ContinueStatement, label)
    }

    pub fn labeled_stmt(&mut self, label: &str, statement: NodeIndex) -> NodeIndex {
        let label = self.ident(label);
        self.compound(
            SyntaxKind::LabeledStatement,
            ModifierFlags::empty(),
            NodeData::Labeled(LabeledData { label, statement }),
            &[label, statement],
        )
    }

    pub fn with_stmt(&mut self, expression: NodeIndex, statement: NodeIndex) -> NodeIndex {
        self.compound(
            SyntaxKind::WithStatement,
            ModifierFlags::empty(),
            NodeData::With(WithData {
                expression,
                statement,
            }),
            &[expression, statement],
        )
    }

    /// A `case` clause, or `default` when `expression` is `None`.
    pub fn case_clause(&mut self, expression: Option<NodeIndex>, statements: Vec<NodeIndex>) -> NodeIndex {
        let kind = if expression.is_some() {
            SyntaxKind::CaseClause
        } else {
            SyntaxKind::DefaultClause
        };
        let expression = opt(expression);
        let mut children = vec![expression];
        children.extend(&statements);
        self.compound(
            kind,
            ModifierFlags::empty(),
            NodeData::CaseClause(CaseClauseData {
                expression,
                statements: NodeList::new(statements),
            }),
            &children,
        )
    }

    pub fn switch_stmt(&mut self, expression: NodeIndex, clauses: Vec<NodeIndex>) -> NodeIndex {
        let mut children = vec![expression];
        children.extend(&clauses);
        self.compound(
            SyntaxKind::SwitchStatement,
            ModifierFlags::empty(),
            NodeData::Switch(SwitchData {
                expression,
                clauses: NodeList::new(clauses),
            }),
            &children,
        )
    }

    /// `try { .. } catch (variable) { .. } finally { .. }`
    pub fn try_stmt(
        &mut self,
        try_statements: Vec<NodeIndex>,
        catch_clause: Option<(&str, Vec<NodeIndex>)>,
        finally_statements: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let try_block = self.block_of(try_statements);
        let catch_clause = match catch_clause {
            Some((variable, statements)) => {
                let variable = self.ident(variable);
                let block = self.block_of(statements);
                self.compound(
                    SyntaxKind::CatchClause,
                    ModifierFlags::empty(),
                    NodeData::CatchClause(CatchClauseData { variable, block }),
                    &[variable, block],
                )
            }
            None => NodeIndex::NONE,
        };
        let finally_block = match finally_statements {
            Some(statements) => self.block_of(statements),
            None => NodeIndex::NONE,
        };
        self.compound(
            SyntaxKind::TryStatement,
            ModifierFlags::empty(),
            NodeData::Try(TryData {
                try_block,
                catch_clause,
                finally_block,
            }),
            &[try_block, catch_clause, finally_block],
        )
    }
}
