//! Type relations for pullc.
//!
//! The solver answers questions about types without owning them: every
//! query goes through the `TypeResolver` trait, implemented by the checker
//! over the binder's symbol graph.
//!
//! - `type_resolver` - the query trait and the resolved member/signature views
//! - `relations` - assignability, subtyping and identity (`RelationChecker`)
//! - `diagnostics` - failure reasons, tracers and `TypeComparisonInfo`
//! - `instantiate` - type-parameter substitution
//! - `infer` - type-argument inference and best common type
//! - `widening` - `widen`
//! - `format` - type display
//! - `recursion` - cycle and depth guard shared by the walks above

pub mod diagnostics;
pub mod format;
pub mod infer;
pub mod instantiate;
pub mod recursion;
pub mod relations;
pub mod type_resolver;
pub mod widening;

pub use diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer, TypeComparisonInfo};
pub use format::{TypeFormatter, signature_to_string, type_to_string};
pub use infer::{InferenceContext, best_common_type};
pub use instantiate::{TypeSubstitution, erase_signature, instantiate_signature, instantiate_type};
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
pub use relations::{
    RelationChecker, RelationKind, RelationResult, are_identical, check_relation, is_assignable_to,
    is_numeric_name, is_signature_assignable_to, is_subtype_of,
};
pub use type_resolver::{MemberKind, ParamInfo, PropertyInfo, SignatureInfo, TypeClass, TypeResolver};
pub use widening::{is_widenable, widen};
