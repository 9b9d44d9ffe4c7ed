//! Node storage.
//!
//! Nodes are stored contiguously in a `NodeArena` and referenced by
//! `NodeIndex`. Kind-specific payloads live in `NodeData`; use the
//! `get_*` accessors on the arena to reach them.

use crate::syntax_kind::{BinaryOperator, ModifierFlags, SyntaxKind, UnaryOperator};
use serde::Serialize;

/// Index of a node inside its `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::NONE
    }
}

/// An ordered list of child nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
}

impl NodeList {
    pub fn new(nodes: Vec<NodeIndex>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }
}

/// A single AST node.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    pub kind: SyntaxKind,
    pub pos: u32,
    pub end: u32,
    pub modifiers: ModifierFlags,
    pub parent: NodeIndex,
    pub data: NodeData,
}

impl Node {
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_modifier(&self, flag: ModifierFlags) -> bool {
        self.modifiers.contains(flag)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct IdentifierData {
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LiteralData {
    pub text: String,
    /// Numeric value for numeric literals.
    pub value: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QualifiedNameData {
    pub left: NodeIndex,
    pub right: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct SourceFileData {
    pub file_name: String,
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariableStatementData {
    pub declarations: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariableDeclarationData {
    pub name: NodeIndex,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Shared shape of every function-like or signature-like node: function
/// declarations and expressions, arrows, methods, constructors, accessors,
/// method/call/construct/index signatures and function/constructor types.
#[derive(Clone, Debug, Serialize)]
pub struct FunctionData {
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_parameters: NodeList,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
    /// Block body, a concise arrow body expression, or `NONE` for signatures.
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassData {
    pub name: NodeIndex,
    pub type_parameters: NodeList,
    pub extends: NodeIndex,
    pub implements: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct InterfaceData {
    pub name: NodeIndex,
    pub type_parameters: NodeList,
    pub extends: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct ModuleData {
    pub name: NodeIndex,
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumData {
    pub name: NodeIndex,
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnumMemberData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportEqualsData {
    pub name: NodeIndex,
    pub module_reference: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ParameterData {
    pub name: NodeIndex,
    pub question_token: bool,
    pub dot_dot_dot_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeParameterData {
    pub name: NodeIndex,
    pub constraint: NodeIndex,
}

/// Property declarations (class members) and property signatures.
#[derive(Clone, Debug, Serialize)]
pub struct PropertyData {
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeRefData {
    pub type_name: NodeIndex,
    pub type_arguments: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArrayTypeData {
    pub element_type: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeLiteralData {
    pub members: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeQueryData {
    pub expr_name: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct LiteralExprData {
    pub elements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct PropertyAssignmentData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

/// Property access (`name_or_argument` is an identifier) and element
/// access (`name_or_argument` is an arbitrary expression).
#[derive(Clone, Debug, Serialize)]
pub struct AccessExprData {
    pub expression: NodeIndex,
    pub name_or_argument: NodeIndex,
}

/// Call and `new` expressions.
#[derive(Clone, Debug, Serialize)]
pub struct CallExprData {
    pub expression: NodeIndex,
    pub type_arguments: NodeList,
    pub arguments: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct TypeAssertionData {
    pub type_node: NodeIndex,
    pub expression: NodeIndex,
}

/// Parenthesized, `typeof`, `delete`, `void`, expression statements,
/// `return` and `throw`.
#[derive(Clone, Debug, Serialize)]
pub struct WrappedExprData {
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnaryExprData {
    pub operator: UnaryOperator,
    pub operand: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct BinaryExprData {
    pub left: NodeIndex,
    pub operator: BinaryOperator,
    pub right: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConditionalExprData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlockData {
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct IfStatementData {
    pub expression: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

/// `do`, `while` and `for` loops. Unused parts are `NONE`.
#[derive(Clone, Debug, Serialize)]
pub struct LoopData {
    pub initializer: NodeIndex,
    pub condition: NodeIndex,
    pub incrementor: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForInData {
    pub initializer: NodeIndex,
    pub expression: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct JumpData {
    pub label: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct SwitchData {
    pub expression: NodeIndex,
    pub clauses: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct CaseClauseData {
    pub expression: NodeIndex,
    pub statements: NodeList,
}

#[derive(Clone, Debug, Serialize)]
pub struct LabeledData {
    pub label: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct WithData {
    pub expression: NodeIndex,
    pub statement: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct TryData {
    pub try_block: NodeIndex,
    pub catch_clause: NodeIndex,
    pub finally_block: NodeIndex,
}

#[derive(Clone, Debug, Serialize)]
pub struct CatchClauseData {
    pub variable: NodeIndex,
    pub block: NodeIndex,
}

/// Kind-specific payload of a node.
#[derive(Clone, Debug, Serialize)]
pub enum NodeData {
    None,
    Identifier(IdentifierData),
    Literal(LiteralData),
    QualifiedName(QualifiedNameData),
    SourceFile(SourceFileData),
    VariableStatement(VariableStatementData),
    VariableDeclaration(VariableDeclarationData),
    Function(FunctionData),
    Class(ClassData),
    Interface(InterfaceData),
    Module(ModuleData),
    Enum(EnumData),
    EnumMember(EnumMemberData),
    ImportEquals(ImportEqualsData),
    Parameter(ParameterData),
    TypeParameter(TypeParameterData),
    Property(PropertyData),
    TypeRef(TypeRefData),
    ArrayType(ArrayTypeData),
    TypeLiteral(TypeLiteralData),
    TypeQuery(TypeQueryData),
    LiteralExpr(LiteralExprData),
    PropertyAssignment(PropertyAssignmentData),
    Access(AccessExprData),
    Call(CallExprData),
    TypeAssertion(TypeAssertionData),
    Wrapped(WrappedExprData),
    Unary(UnaryExprData),
    Binary(BinaryExprData),
    Conditional(ConditionalExprData),
    Block(BlockData),
    If(IfStatementData),
    Loop(LoopData),
    ForIn(ForInData),
    Jump(JumpData),
    Switch(SwitchData),
    CaseClause(CaseClauseData),
    Labeled(LabeledData),
    With(WithData),
    Try(TryData),
    CatchClause(CatchClauseData),
}

/// Arena-based storage for AST nodes.
#[derive(Debug, Default, Serialize)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
}

macro_rules! data_accessors {
    ($($fn_name:ident => $variant:ident($ty:ty);)*) => {
        impl NodeArena {
            $(
                pub fn $fn_name<'a>(&'a self, node: &'a Node) -> Option<&'a $ty> {
                    match &node.data {
                        NodeData::$variant(data) => Some(data),
                        _ => None,
                    }
                }
            )*
        }
    };
}

data_accessors! {
    get_identifier => Identifier(IdentifierData);
    get_literal => Literal(LiteralData);
    get_qualified_name => QualifiedName(QualifiedNameData);
    get_source_file => SourceFile(SourceFileData);
    get_variable_statement => VariableStatement(VariableStatementData);
    get_variable_declaration => VariableDeclaration(VariableDeclarationData);
    get_function => Function(FunctionData);
    get_class => Class(ClassData);
    get_interface => Interface(InterfaceData);
    get_module => Module(ModuleData);
    get_enum => Enum(EnumData);
    get_enum_member => EnumMember(EnumMemberData);
    get_import_equals => ImportEquals(ImportEqualsData);
    get_parameter => Parameter(ParameterData);
    get_type_parameter => TypeParameter(TypeParameterData);
    get_property => Property(PropertyData);
    get_type_ref => TypeRef(TypeRefData);
    get_array_type => ArrayType(ArrayTypeData);
    get_type_literal => TypeLiteral(TypeLiteralData);
    get_type_query => TypeQuery(TypeQueryData);
    get_literal_expr => LiteralExpr(LiteralExprData);
    get_property_assignment => PropertyAssignment(PropertyAssignmentData);
    get_access_expr => Access(AccessExprData);
    get_call_expr => Call(CallExprData);
    get_type_assertion => TypeAssertion(TypeAssertionData);
    get_wrapped_expr => Wrapped(WrappedExprData);
    get_unary_expr => Unary(UnaryExprData);
    get_binary_expr => Binary(BinaryExprData);
    get_conditional_expr => Conditional(ConditionalExprData);
    get_block => Block(BlockData);
    get_if_statement => If(IfStatementData);
    get_loop => Loop(LoopData);
    get_for_in => ForIn(ForInData);
    get_jump => Jump(JumpData);
    get_switch => Switch(SwitchData);
    get_case_clause => CaseClause(CaseClauseData);
    get_labeled => Labeled(LabeledData);
    get_with => With(WithData);
    get_try => Try(TryData);
    get_catch_clause => CatchClause(CatchClauseData);
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    /// Add a node to the arena and return its index
    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes.push(node);
        NodeIndex(index)
    }

    /// Get a node by index
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable node by index
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    pub fn kind(&self, index: NodeIndex) -> Option<SyntaxKind> {
        self.get(index).map(|n| n.kind)
    }

    pub fn parent(&self, index: NodeIndex) -> NodeIndex {
        self.get(index).map_or(NodeIndex::NONE, |n| n.parent)
    }

    /// Text of an identifier node.
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        self.get_identifier(node).map(|ident| ident.text.as_str())
    }

    /// Text usable as a declaration name: identifiers, string and numeric
    /// literals (property names may be either).
    pub fn name_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        match &node.data {
            NodeData::Identifier(ident) => Some(ident.text.as_str()),
            NodeData::Literal(lit) => Some(lit.text.as_str()),
            _ => None,
        }
    }

    /// Dotted text of an entity name (`A.B.C`), if the node is one.
    pub fn entity_name_text(&self, index: NodeIndex) -> Option<String> {
        let node = self.get(index)?;
        match &node.data {
            NodeData::Identifier(ident) => Some(ident.text.clone()),
            NodeData::QualifiedName(qn) => {
                let left = self.entity_name_text(qn.left)?;
                let right = self.identifier_text(qn.right)?;
                Some(format!("{left}.{right}"))
            }
            NodeData::Access(access) if node.kind == SyntaxKind::PropertyAccessExpression => {
                let left = self.entity_name_text(access.expression)?;
                let right = self.identifier_text(access.name_or_argument)?;
                Some(format!("{left}.{right}"))
            }
            _ => None,
        }
    }

    /// (pos, length) of a node, used for diagnostics.
    pub fn span(&self, index: NodeIndex) -> (u32, u32) {
        self.get(index).map_or((0, 0), |n| (n.pos, n.len()))
    }

    /// Skip any number of parentheses around an expression.
    pub fn skip_parentheses(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(node) = self.get(index) {
            if node.kind != SyntaxKind::ParenthesizedExpression {
                break;
            }
            match self.get_wrapped_expr(node) {
                Some(inner) => index = inner.expression,
                None => break,
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

