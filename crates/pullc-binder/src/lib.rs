//! Declaration collection and symbol binding for pullc.
//!
//! This crate is organized into several modules:
//! - `decl` - `Decl`, `DeclKind`, `DeclFlags` and the chain-owned `DeclArena`
//! - `decl_collector` - builds a unit's decl tree from its syntax tree
//! - `symbols` - `Symbol`, `SymbolKind`, `TypeShape` and `SymbolArena`
//! - `semantic_unit` - per-file state (`SemanticUnit`)
//! - `semantic_info` - the cross-unit registry (`SemanticInfoChain`) and
//!   declaration path resolution
//! - `state` - `BinderState`, with its kind-specific binders split across the
//!   `state_*` modules

pub mod decl;
pub mod decl_collector;
pub mod semantic_info;
pub mod semantic_unit;
pub mod state;
mod state_binding;
mod state_member_binding;
mod state_rebind;
mod state_type_binding;
pub mod symbols;

pub use decl::{Decl, DeclArena, DeclFlags, DeclId, DeclKind, DeclSpace};
pub use decl_collector::{collect_unit_decls, is_instantiated_module};
pub use semantic_info::{Primitives, RebindWatermark, SemanticInfoChain};
pub use semantic_unit::{SemanticUnit, UnitId};
pub use state::{BinderOptions, BinderState, RebindContext};
pub use state_rebind::rebind_unit;
pub use symbols::{
    MemberTable, PrimitiveKind, ResolutionState, SignatureData, SignatureKind, Symbol, SymbolArena,
    SymbolFlags, SymbolId, SymbolKind, TypeShape,
};
