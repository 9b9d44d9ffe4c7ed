//! pullc: the semantic core of a pull-model compiler for a structurally
//! typed language with classes, interfaces, modules and enums.
//!
//! The pipeline is split across the workspace crates and re-exported here:
//! - `syntax` - arena AST and the `NodeFactory` that builds it
//! - `binder` - decls, symbols, the semantic info chain and the binder
//! - `solver` - assignability, subtyping, inference and widening
//! - `checker` - the pull type resolver and the type checker
//! - `common` - diagnostics and the message catalog
//!
//! `Program` drives them: add units, bind, check, update a unit and rebind
//! it incrementally.

pub mod program;
pub mod tracing_config;

pub use program::{Program, ProgramError, ProgramOptions};
pub use tracing_config::init_tracing;

pub use pullc_binder as binder;
pub use pullc_checker as checker;
pub use pullc_common as common;
pub use pullc_solver as solver;
pub use pullc_syntax as syntax;

pub use pullc_common::{Diagnostic, DiagnosticCategory};
