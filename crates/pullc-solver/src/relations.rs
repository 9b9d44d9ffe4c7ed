//! Assignability, subtyping and identity.
//!
//! All three relations share one structural walk over members, call and
//! construct signatures and index signatures. They differ in a handful of
//! rules:
//!
//! - `any` is assignable to everything but a subtype only of `any`.
//! - `number` is assignable to an enum type but not a subtype of it.
//! - A target without an indexer of the source's kind is satisfied, under
//!   assignment only, by the source's members.
//! - Identity compares named types nominally (same declaration, identical
//!   type arguments) and anonymous types member by member.
//!
//! Pairs already on the comparison stack are assumed related, so recursive
//! types terminate.

use pullc_binder::{Primitives, SignatureKind, SymbolId};
use tracing::debug;

use crate::diagnostics::{DiagnosticTracer, FastTracer, SubtypeFailureReason, SubtypeTracer, TypeComparisonInfo};
use crate::instantiate::erase_signature;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::type_resolver::{SignatureInfo, TypeClass, TypeResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Assignable,
    Subtype,
    Identical,
}

/// Result of a relation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationResult {
    pub kind: RelationKind,
    pub related: bool,
    pub depth_exceeded: bool,
}

pub struct RelationChecker<'r, R: TypeResolver> {
    resolver: &'r mut R,
    kind: RelationKind,
    primitives: Primitives,
    guard: RecursionGuard<(SymbolId, SymbolId)>,
}

impl<'r, R: TypeResolver> RelationChecker<'r, R> {
    pub fn new(resolver: &'r mut R, kind: RelationKind) -> Self {
        let primitives = resolver.primitives();
        Self {
            resolver,
            kind,
            primitives,
            guard: RecursionGuard::with_profile(RecursionProfile::Relation),
        }
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn query(&mut self, source: SymbolId, target: SymbolId) -> RelationResult {
        self.guard.reset();
        let related = self.check(source, target, &mut FastTracer);
        RelationResult {
            kind: self.kind,
            related,
            depth_exceeded: self.guard.is_exceeded(),
        }
    }

    pub fn is_related(&mut self, source: SymbolId, target: SymbolId) -> bool {
        self.query(source, target).related
    }

    /// Re-run a failed comparison collecting the reason. Empty when related.
    pub fn explain(&mut self, source: SymbolId, target: SymbolId) -> TypeComparisonInfo {
        self.guard.reset();
        let mut tracer = DiagnosticTracer::new();
        if self.check(source, target, &mut tracer) {
            return TypeComparisonInfo::default();
        }
        let reason = tracer.take_failure().unwrap_or(SubtypeFailureReason::TypeMismatch {
            source_type: source,
            target_type: target,
        });
        TypeComparisonInfo::new(Some(reason))
    }

    pub fn is_signature_related(&mut self, source: &SignatureInfo, target: &SignatureInfo) -> bool {
        self.guard.reset();
        self.check_signature(source, target, &mut FastTracer)
    }

    pub fn explain_signature(&mut self, source: &SignatureInfo, target: &SignatureInfo) -> TypeComparisonInfo {
        self.guard.reset();
        let mut tracer = DiagnosticTracer::new();
        if self.check_signature(source, target, &mut tracer) {
            return TypeComparisonInfo::default();
        }
        TypeComparisonInfo::new(tracer.take_failure())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn check<T: SubtypeTracer>(&mut self, source: SymbolId, target: SymbolId, tracer: &mut T) -> bool {
        if source == target || source.is_none() || target.is_none() {
            return true;
        }
        let source_class = self.resolver.classify(source);
        let target_class = self.resolver.classify(target);
        if source_class == TypeClass::Error || target_class == TypeClass::Error {
            return true;
        }
        if self.kind == RelationKind::Identical {
            let identical = self.check_identical(source, target, source_class, target_class, tracer);
            if !identical {
                tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                });
            }
            return identical;
        }
        if let Some(related) = self.check_intrinsic(source_class, target_class) {
            if !related {
                tracer.on_mismatch(|| SubtypeFailureReason::TypeMismatch {
                    source_type: source,
                    target_type: target,
                });
            }
            return related;
        }
        if let TypeClass::TypeParameter { constraint } = source_class {
            let apparent = if constraint.is_some() {
                constraint
            } else {
                self.primitives.empty_object
            };
            return self.check(apparent, target, tracer);
        }
        if let (TypeClass::Array(source_element), TypeClass::Array(target_element)) = (source_class, target_class) {
            return self.check_nested(source_element, target_element, tracer, |nested_reason| {
                SubtypeFailureReason::ArrayElementMismatch { nested_reason }
            });
        }
        self.with_guard(source, target, tracer, |this, tracer| this.check_structural(source, target, tracer))
    }

    /// Rules that do not need the members of either side.
    fn check_intrinsic(&self, source: TypeClass, target: TypeClass) -> Option<bool> {
        let assignable = self.kind == RelationKind::Assignable;
        let related = match (source, target) {
            (_, TypeClass::Any) => true,
            (TypeClass::Any, _) => assignable,
            (TypeClass::Undefined, _) => true,
            (TypeClass::Null, TypeClass::Undefined) => false,
            (TypeClass::Null, _) => true,
            (TypeClass::Void, _) | (_, TypeClass::Void) => false,
            (TypeClass::Enum, TypeClass::Number) => true,
            (TypeClass::Number, TypeClass::Enum) => assignable,
            (_, TypeClass::Number | TypeClass::String | TypeClass::Boolean | TypeClass::Enum) => {
                source == target && source != TypeClass::Enum
            }
            (_, TypeClass::Null | TypeClass::Undefined | TypeClass::TypeParameter { .. }) => false,
            _ => return None,
        };
        Some(related)
    }

    fn with_guard<T: SubtypeTracer>(
        &mut self,
        source: SymbolId,
        target: SymbolId,
        tracer: &mut T,
        f: impl FnOnce(&mut Self, &mut T) -> bool,
    ) -> bool {
        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {
                let related = f(self, tracer);
                self.guard.leave((source, target));
                related
            }
            RecursionResult::Cycle => true,
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                debug!(source = source.0, target = target.0, "relation depth exceeded");
                tracer.on_mismatch(|| SubtypeFailureReason::RecursionLimitExceeded);
                false
            }
        }
    }

    /// Relate `source` to `target`, wrapping a nested failure reason when
    /// the tracer wants detail.
    fn check_nested<T: SubtypeTracer>(
        &mut self,
        source: SymbolId,
        target: SymbolId,
        tracer: &mut T,
        wrap: impl FnOnce(Option<Box<SubtypeFailureReason>>) -> SubtypeFailureReason,
    ) -> bool {
        if !tracer.wants_detail() {
            return self.check(source, target, tracer);
        }
        let mut inner = DiagnosticTracer::new();
        if self.check(source, target, &mut inner) {
            return true;
        }
        let nested = inner.take_failure().map(Box::new);
        tracer.on_mismatch(|| wrap(nested));
        false
    }

    // =========================================================================
    // Structural comparison
    // =========================================================================

    fn check_structural<T: SubtypeTracer>(&mut self, source: SymbolId, target: SymbolId, tracer: &mut T) -> bool {
        for target_prop in self.resolver.properties_of(target) {
            let Some(source_prop) = self.resolver.property_of(source, &target_prop.name) else {
                if target_prop.optional {
                    continue;
                }
                tracer.on_mismatch(|| SubtypeFailureReason::MissingProperty {
                    name: target_prop.name.clone(),
                    source_type: source,
                });
                return false;
            };
            if (source_prop.private || target_prop.private) && source_prop.origin != target_prop.origin {
                tracer.on_mismatch(|| SubtypeFailureReason::PrivatePropertyMismatch {
                    name: target_prop.name.clone(),
                });
                return false;
            }
            if source_prop.optional && !target_prop.optional {
                tracer.on_mismatch(|| SubtypeFailureReason::OptionalPropertyRequired {
                    name: target_prop.name.clone(),
                    source_type: source,
                    target_type: target,
                });
                return false;
            }
            let name = target_prop.name;
            if !self.check_nested(source_prop.type_id, target_prop.type_id, tracer, |nested_reason| {
                SubtypeFailureReason::PropertyTypeMismatch { name, nested_reason }
            }) {
                return false;
            }
        }
        self.check_signature_lists(source, target, SignatureKind::Call, tracer)
            && self.check_signature_lists(source, target, SignatureKind::Construct, tracer)
            && self.check_index(source, target, false, tracer)
            && self.check_index(source, target, true, tracer)
    }

    /// Every target signature must be matched by some source signature.
    fn check_signature_lists<T: SubtypeTracer>(
        &mut self,
        source: SymbolId,
        target: SymbolId,
        kind: SignatureKind,
        tracer: &mut T,
    ) -> bool {
        let target_signatures = self.resolver.signatures_of(target, kind);
        if target_signatures.is_empty() {
            return true;
        }
        let source_signatures = self.resolver.signatures_of(source, kind);
        if source_signatures.is_empty() {
            tracer.on_mismatch(|| SubtypeFailureReason::MissingSignature {
                kind,
                source_type: source,
                target_type: target,
            });
            return false;
        }
        for target_signature in &target_signatures {
            let matched = source_signatures
                .iter()
                .any(|s| self.check_signature(s, target_signature, &mut FastTracer));
            if matched {
                continue;
            }
            let nested_reason = if tracer.wants_detail() {
                let mut inner = DiagnosticTracer::new();
                self.check_signature(&source_signatures[0], target_signature, &mut inner);
                inner.take_failure().map(Box::new)
            } else {
                None
            };
            tracer.on_mismatch(|| SubtypeFailureReason::SignatureMismatch {
                kind,
                source_type: source,
                target_type: target,
                nested_reason,
            });
            return false;
        }
        true
    }

    fn check_signature<T: SubtypeTracer>(&mut self, source: &SignatureInfo, target: &SignatureInfo, tracer: &mut T) -> bool {
        if self.kind == RelationKind::Identical {
            return self.signatures_identical(source, target, tracer);
        }
        let source = erase_signature(&mut *self.resolver, source);
        let target = erase_signature(&mut *self.resolver, target);

        let target_capacity = if target.has_rest() {
            usize::MAX
        } else {
            target.parameters.len()
        };
        if source.min_argument_count() > target_capacity {
            tracer.on_mismatch(|| SubtypeFailureReason::TooManyParameters {
                source_count: source.min_argument_count(),
                target_count: target.parameters.len(),
            });
            return false;
        }

        let count = source.parameters.len().max(target.parameters.len());
        for index in 0..count {
            let (Some(source_param), Some(target_param)) =
                (source.parameter_type_at(index), target.parameter_type_at(index))
            else {
                continue;
            };
            // Parameters compare bivariantly.
            if self.check(target_param, source_param, &mut FastTracer)
                || self.check(source_param, target_param, &mut FastTracer)
            {
                continue;
            }
            let name = source
                .parameters
                .get(index)
                .or_else(|| source.parameters.last())
                .map(|p| p.name.clone())
                .unwrap_or_default();
            if tracer.wants_detail() {
                let mut inner = DiagnosticTracer::new();
                self.check(target_param, source_param, &mut inner);
                let nested_reason = inner.take_failure().map(Box::new);
                tracer.on_mismatch(|| SubtypeFailureReason::ParameterTypeMismatch { name, nested_reason });
            } else {
                tracer.on_mismatch(|| SubtypeFailureReason::ParameterTypeMismatch {
                    name,
                    nested_reason: None,
                });
            }
            return false;
        }

        if target.return_type == self.primitives.void || target.return_type.is_none() {
            return true;
        }
        self.check_nested(source.return_type, target.return_type, tracer, |nested_reason| {
            SubtypeFailureReason::ReturnTypeMismatch { nested_reason }
        })
    }

    fn check_index<T: SubtypeTracer>(&mut self, source: SymbolId, target: SymbolId, numeric: bool, tracer: &mut T) -> bool {
        let Some(target_index) = self.resolver.index_type_of(target, numeric) else {
            return true;
        };
        let source_index = match self.resolver.index_type_of(source, numeric) {
            Some(index) => Some(index),
            None if numeric => self.resolver.index_type_of(source, false),
            None => None,
        };
        if let Some(source_index) = source_index {
            return self.check_nested(source_index, target_index, tracer, |nested_reason| {
                SubtypeFailureReason::IndexSignatureMismatch { numeric, nested_reason }
            });
        }
        if self.kind == RelationKind::Subtype {
            tracer.on_mismatch(|| SubtypeFailureReason::MissingIndexSignature {
                numeric,
                source_type: source,
            });
            return false;
        }
        // Without an indexer of its own, the source's members stand in for it.
        for prop in self.resolver.properties_of(source) {
            if numeric && !is_numeric_name(&prop.name) {
                continue;
            }
            let name = prop.name;
            if !self.check_nested(prop.type_id, target_index, tracer, |nested_reason| {
                SubtypeFailureReason::PropertyTypeMismatch { name, nested_reason }
            }) {
                return false;
            }
        }
        true
    }

    // =========================================================================
    // Identity
    // =========================================================================

    fn check_identical<T: SubtypeTracer>(
        &mut self,
        source: SymbolId,
        target: SymbolId,
        source_class: TypeClass,
        target_class: TypeClass,
        tracer: &mut T,
    ) -> bool {
        match (source_class, target_class) {
            (TypeClass::Array(a), TypeClass::Array(b)) => self.check(a, b, tracer),
            (TypeClass::Object, TypeClass::Object) => {
                if self.resolver.is_named(source) || self.resolver.is_named(target) {
                    return match (self.resolver.reference_parts(source), self.resolver.reference_parts(target)) {
                        (Some((source_target, source_args)), Some((target_target, target_args))) => {
                            source_target == target_target
                                && source_args.len() == target_args.len()
                                && source_args
                                    .iter()
                                    .zip(&target_args)
                                    .all(|(&a, &b)| self.check(a, b, &mut FastTracer))
                        }
                        _ => false,
                    };
                }
                self.with_guard(source, target, tracer, |this, tracer| {
                    this.structurally_identical(source, target, tracer)
                })
            }
            _ => false,
        }
    }

    fn structurally_identical<T: SubtypeTracer>(&mut self, source: SymbolId, target: SymbolId, tracer: &mut T) -> bool {
        let source_props = self.resolver.properties_of(source);
        let target_props = self.resolver.properties_of(target);
        if source_props.len() != target_props.len() {
            return false;
        }
        for target_prop in &target_props {
            let Some(source_prop) = source_props.iter().find(|p| p.name == target_prop.name) else {
                tracer.on_mismatch(|| SubtypeFailureReason::MissingProperty {
                    name: target_prop.name.clone(),
                    source_type: source,
                });
                return false;
            };
            if source_prop.optional != target_prop.optional || source_prop.private != target_prop.private {
                return false;
            }
            if !self.check(source_prop.type_id, target_prop.type_id, &mut FastTracer) {
                return false;
            }
        }
        for kind in [SignatureKind::Call, SignatureKind::Construct] {
            let source_signatures = self.resolver.signatures_of(source, kind);
            let target_signatures = self.resolver.signatures_of(target, kind);
            if source_signatures.len() != target_signatures.len() {
                return false;
            }
            for (s, t) in source_signatures.iter().zip(&target_signatures) {
                if !self.signatures_identical(s, t, &mut FastTracer) {
                    return false;
                }
            }
        }
        for numeric in [false, true] {
            match (
                self.resolver.index_type_of(source, numeric),
                self.resolver.index_type_of(target, numeric),
            ) {
                (None, None) => {}
                (Some(a), Some(b)) if self.check(a, b, &mut FastTracer) => {}
                _ => return false,
            }
        }
        true
    }

    fn signatures_identical<T: SubtypeTracer>(&mut self, source: &SignatureInfo, target: &SignatureInfo, tracer: &mut T) -> bool {
        if source.parameters.len() != target.parameters.len()
            || source.type_parameters.len() != target.type_parameters.len()
            || source.min_argument_count() != target.min_argument_count()
        {
            return false;
        }
        let source = erase_signature(&mut *self.resolver, source);
        let target = erase_signature(&mut *self.resolver, target);
        for (s, t) in source.parameters.iter().zip(&target.parameters) {
            if s.rest != t.rest || !self.check(s.type_id, t.type_id, &mut FastTracer) {
                return false;
            }
        }
        self.check(source.return_type, target.return_type, tracer)
    }
}

/// Member names that address a numeric indexer.
pub fn is_numeric_name(name: &str) -> bool {
    !name.is_empty() && name.parse::<f64>().is_ok_and(|n| n.is_finite())
}

// =============================================================================
// Convenience entry points
// =============================================================================

pub fn is_assignable_to<R: TypeResolver>(resolver: &mut R, source: SymbolId, target: SymbolId) -> bool {
    RelationChecker::new(resolver, RelationKind::Assignable).is_related(source, target)
}

pub fn is_subtype_of<R: TypeResolver>(resolver: &mut R, source: SymbolId, target: SymbolId) -> bool {
    RelationChecker::new(resolver, RelationKind::Subtype).is_related(source, target)
}

pub fn are_identical<R: TypeResolver>(resolver: &mut R, a: SymbolId, b: SymbolId) -> bool {
    RelationChecker::new(resolver, RelationKind::Identical).is_related(a, b)
}

/// `(related, explanation)`; the explanation is only computed on failure.
pub fn check_relation<R: TypeResolver>(
    resolver: &mut R,
    source: SymbolId,
    target: SymbolId,
    kind: RelationKind,
) -> (bool, TypeComparisonInfo) {
    let mut checker = RelationChecker::new(resolver, kind);
    if checker.is_related(source, target) {
        return (true, TypeComparisonInfo::default());
    }
    let info = checker.explain(source, target);
    (false, info)
}

pub fn is_signature_assignable_to<R: TypeResolver>(
    resolver: &mut R,
    source: &SignatureInfo,
    target: &SignatureInfo,
) -> bool {
    RelationChecker::new(resolver, RelationKind::Assignable).is_signature_related(source, target)
}
