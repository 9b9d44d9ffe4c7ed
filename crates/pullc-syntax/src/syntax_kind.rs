//! Syntax kinds, operators and modifier flags.

use bitflags::bitflags;
use serde::Serialize;

/// Kind tag of every AST node the semantic core understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u16)]
pub enum SyntaxKind {
    // Names and literals
    Identifier,
    QualifiedName,
    NumericLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
    ThisKeyword,
    SuperKeyword,

    // Predefined type keywords
    AnyKeyword,
    NumberKeyword,
    StringKeyword,
    BooleanKeyword,
    VoidKeyword,

    // Declarations
    SourceFile,
    VariableStatement,
    VariableDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    ModuleDeclaration,
    EnumDeclaration,
    EnumMember,
    ImportEqualsDeclaration,
    Parameter,
    TypeParameter,

    // Class and type members
    PropertyDeclaration,
    MethodDeclaration,
    Constructor,
    GetAccessor,
    SetAccessor,
    PropertySignature,
    MethodSignature,
    CallSignature,
    ConstructSignature,
    IndexSignature,

    // Type nodes
    TypeReference,
    ArrayType,
    TypeLiteral,
    FunctionType,
    ConstructorType,
    TypeQuery,

    // Expressions
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    PropertyAccessExpression,
    ElementAccessExpression,
    CallExpression,
    NewExpression,
    TypeAssertionExpression,
    ParenthesizedExpression,
    FunctionExpression,
    ArrowFunction,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    TypeOfExpression,
    DeleteExpression,
    VoidExpression,
    BinaryExpression,
    ConditionalExpression,
    OmittedExpression,

    // Statements
    Block,
    EmptyStatement,
    ExpressionStatement,
    IfStatement,
    DoStatement,
    WhileStatement,
    ForStatement,
    ForInStatement,
    ContinueStatement,
    BreakStatement,
    ReturnStatement,
    WithStatement,
    SwitchStatement,
    CaseClause,
    DefaultClause,
    LabeledStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    DebuggerStatement,
}

impl SyntaxKind {
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::Constructor
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
        )
    }

    pub fn is_type_node(self) -> bool {
        matches!(
            self,
            SyntaxKind::AnyKeyword
                | SyntaxKind::NumberKeyword
                | SyntaxKind::StringKeyword
                | SyntaxKind::BooleanKeyword
                | SyntaxKind::VoidKeyword
                | SyntaxKind::TypeReference
                | SyntaxKind::ArrayType
                | SyntaxKind::TypeLiteral
                | SyntaxKind::FunctionType
                | SyntaxKind::ConstructorType
                | SyntaxKind::TypeQuery
        )
    }
}

bitflags! {
    /// Declaration modifiers written on a node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct ModifierFlags: u16 {
        const EXPORT = 1 << 0;
        const DECLARE = 1 << 1;
        const STATIC = 1 << 2;
        const PUBLIC = 1 << 3;
        const PRIVATE = 1 << 4;
    }
}

/// Binary operators, including the assignment family and comma.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    LessThanLessThan,
    GreaterThanGreaterThan,
    GreaterThanGreaterThanGreaterThan,
    Ampersand,
    Bar,
    Caret,
    AmpersandAmpersand,
    BarBar,
    LessThan,
    GreaterThan,
    LessThanEquals,
    GreaterThanEquals,
    EqualsEquals,
    ExclamationEquals,
    EqualsEqualsEquals,
    ExclamationEqualsEquals,
    InstanceOf,
    In,
    Comma,
    Equals,
    PlusEquals,
    MinusEquals,
    AsteriskEquals,
    SlashEquals,
    PercentEquals,
    LessThanLessThanEquals,
    GreaterThanGreaterThanEquals,
    GreaterThanGreaterThanGreaterThanEquals,
    AmpersandEquals,
    BarEquals,
    CaretEquals,
}

impl BinaryOperator {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::PlusEquals
                | BinaryOperator::MinusEquals
                | BinaryOperator::AsteriskEquals
                | BinaryOperator::SlashEquals
                | BinaryOperator::PercentEquals
                | BinaryOperator::LessThanLessThanEquals
                | BinaryOperator::GreaterThanGreaterThanEquals
                | BinaryOperator::GreaterThanGreaterThanGreaterThanEquals
                | BinaryOperator::AmpersandEquals
                | BinaryOperator::BarEquals
                | BinaryOperator::CaretEquals
        )
    }

    /// Arithmetic and bitwise operators (plain or compound) that require
    /// numeric operands. `+` and `+=` are excluded: they also concatenate.
    pub fn is_numeric_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Minus
                | BinaryOperator::Asterisk
                | BinaryOperator::Slash
                | BinaryOperator::Percent
                | BinaryOperator::LessThanLessThan
                | BinaryOperator::GreaterThanGreaterThan
                | BinaryOperator::GreaterThanGreaterThanGreaterThan
                | BinaryOperator::Ampersand
                | BinaryOperator::Bar
                | BinaryOperator::Caret
                | BinaryOperator::MinusEquals
                | BinaryOperator::AsteriskEquals
                | BinaryOperator::SlashEquals
                | BinaryOperator::PercentEquals
                | BinaryOperator::LessThanLessThanEquals
                | BinaryOperator::GreaterThanGreaterThanEquals
                | BinaryOperator::GreaterThanGreaterThanGreaterThanEquals
                | BinaryOperator::AmpersandEquals
                | BinaryOperator::BarEquals
                | BinaryOperator::CaretEquals
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::LessThan
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessThanEquals
                | BinaryOperator::GreaterThanEquals
                | BinaryOperator::EqualsEquals
                | BinaryOperator::ExclamationEquals
                | BinaryOperator::EqualsEqualsEquals
                | BinaryOperator::ExclamationEqualsEquals
        )
    }

    pub fn text(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Asterisk => "*",
            BinaryOperator::Slash => "/",
            BinaryOperator::Percent => "%",
            BinaryOperator::LessThanLessThan => "<<",
            BinaryOperator::GreaterThanGreaterThan => ">>",
            BinaryOperator::GreaterThanGreaterThanGreaterThan => ">>>",
            BinaryOperator::Ampersand => "&",
            BinaryOperator::Bar => "|",
            BinaryOperator::Caret => "^",
            BinaryOperator::AmpersandAmpersand => "&&",
            BinaryOperator::BarBar => "||",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanEquals => "<=",
            BinaryOperator::GreaterThanEquals => ">=",
            BinaryOperator::EqualsEquals => "==",
            BinaryOperator::ExclamationEquals => "!=",
            BinaryOperator::EqualsEqualsEquals => "===",
            BinaryOperator::ExclamationEqualsEquals => "!==",
            BinaryOperator::InstanceOf => "instanceof",
            BinaryOperator::In => "in",
            BinaryOperator::Comma => ",",
            BinaryOperator::Equals => "=",
            BinaryOperator::PlusEquals => "+=",
            BinaryOperator::MinusEquals => "-=",
            BinaryOperator::AsteriskEquals => "*=",
            BinaryOperator::SlashEquals => "/=",
            BinaryOperator::PercentEquals => "%=",
            BinaryOperator::LessThanLessThanEquals => "<<=",
            BinaryOperator::GreaterThanGreaterThanEquals => ">>=",
            BinaryOperator::GreaterThanGreaterThanGreaterThanEquals => ">>>=",
            BinaryOperator::AmpersandEquals => "&=",
            BinaryOperator::BarEquals => "|=",
            BinaryOperator::CaretEquals => "^=",
        }
    }
}

/// Prefix and postfix unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Tilde,
    Exclamation,
    PlusPlus,
    MinusMinus,
}

impl UnaryOperator {
    pub fn is_increment_or_decrement(self) -> bool {
        matches!(self, UnaryOperator::PlusPlus | UnaryOperator::MinusMinus)
    }
}
