//! Arena-based AST for the pullc semantic core.
//!
//! Lexing and parsing happen upstream; this crate only defines the tree
//! shape the binder and checker consume:
//! - `node` - `Node`, `NodeIndex`, `NodeList`, per-kind data and `NodeArena`
//! - `syntax_kind` - `SyntaxKind`, operators and modifier flags
//! - `factory` - `NodeFactory` for building trees programmatically

pub mod factory;
pub mod node;
pub mod syntax_kind;

pub use factory::NodeFactory;
pub use node::{Node, NodeArena, NodeData, NodeIndex, NodeList};
pub use syntax_kind::{BinaryOperator, ModifierFlags, SyntaxKind, UnaryOperator};
