//! Type resolution and type checking for pullc.
//!
//! This crate is organized into several modules:
//! - `resolver` - `PullTypeResolver`: lazy resolution of names, type
//!   annotations, symbol types and expression types over the binder's
//!   symbol graph, and the `TypeResolver` impl the solver runs against
//! - `state` - `CheckerState`, the per-pass entry points and the node
//!   dispatcher with per-phase memoization
//! - `context` - `TypeCheckContext`: enclosing decls, return tracking,
//!   region flags and contextual types
//! - `declarations`, `class_checker`, `statements`, `expr`, `privacy` -
//!   the checks themselves, as `CheckerState` impl blocks
//! - `error_reporter` - `DiagnosticSink` and the `error_*` helpers
//! - `options` - `CheckerOptions`

pub mod class_checker;
pub mod context;
pub mod declarations;
pub mod error_reporter;
pub mod expr;
pub mod options;
pub mod privacy;
pub mod resolver;
pub mod state;
pub mod statements;

pub use context::TypeCheckContext;
pub use error_reporter::DiagnosticSink;
pub use options::CheckerOptions;
pub use resolver::PullTypeResolver;
pub use state::{CheckerState, check_program};
