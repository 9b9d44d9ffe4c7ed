//! Type-argument inference and best common type.
//!
//! Inference walks each (argument type, parameter type) pair in parallel and
//! records a candidate whenever the parameter side reaches one of the type
//! parameters being inferred. Each parameter is then fixed to the best
//! common supertype of its widened candidates, or `{}` when the candidates
//! have none.

use pullc_binder::{SignatureKind, SymbolId};
use tracing::trace;

use crate::instantiate::TypeSubstitution;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::relations::{RelationChecker, RelationKind};
use crate::type_resolver::{SignatureInfo, TypeClass, TypeResolver};
use crate::widening::widen;

pub struct InferenceContext {
    type_parameters: Vec<SymbolId>,
    candidates: Vec<Vec<SymbolId>>,
    guard: RecursionGuard<(SymbolId, SymbolId)>,
}

impl InferenceContext {
    pub fn new(type_parameters: &[SymbolId]) -> Self {
        Self {
            type_parameters: type_parameters.to_vec(),
            candidates: vec![Vec::new(); type_parameters.len()],
            guard: RecursionGuard::with_profile(RecursionProfile::Inference),
        }
    }

    pub fn type_parameters(&self) -> &[SymbolId] {
        &self.type_parameters
    }

    pub fn candidates_for(&self, parameter: SymbolId) -> &[SymbolId] {
        self.type_parameters
            .iter()
            .position(|&p| p == parameter)
            .map_or(&[][..], |i| self.candidates[i].as_slice())
    }

    fn add_candidate(&mut self, parameter: SymbolId, candidate: SymbolId) -> bool {
        let Some(index) = self.type_parameters.iter().position(|&p| p == parameter) else {
            return false;
        };
        if candidate.is_some() && !self.candidates[index].contains(&candidate) {
            self.candidates[index].push(candidate);
        }
        true
    }

    /// Collect candidates from `source` (an argument type) flowing into
    /// `target` (a parameter type mentioning the inferred parameters).
    pub fn infer_from_types<R: TypeResolver>(&mut self, resolver: &mut R, source: SymbolId, target: SymbolId) {
        if source.is_none() || target.is_none() || self.add_candidate(target, source) {
            return;
        }
        let source_class = resolver.classify(source);
        let target_class = resolver.classify(target);
        if source_class.is_any_or_error() && !matches!(target_class, TypeClass::Object | TypeClass::Array(_)) {
            return;
        }
        match (source_class, target_class) {
            (TypeClass::Array(source_element), TypeClass::Array(target_element)) => {
                self.infer_from_types(resolver, source_element, target_element);
            }
            (TypeClass::Object | TypeClass::Array(_) | TypeClass::Any, TypeClass::Object) => {
                match self.guard.enter((source, target)) {
                    RecursionResult::Entered => {
                        self.infer_from_object(resolver, source, target);
                        self.guard.leave((source, target));
                    }
                    denied => trace!(?denied, source = source.0, target = target.0, "inference walk stopped"),
                }
            }
            _ => {}
        }
    }

    fn infer_from_object<R: TypeResolver>(&mut self, resolver: &mut R, source: SymbolId, target: SymbolId) {
        if let (Some((source_generic, source_args)), Some((target_generic, target_args))) =
            (resolver.reference_parts(source), resolver.reference_parts(target))
            && source_generic == target_generic
        {
            for (&s, &t) in source_args.iter().zip(&target_args) {
                self.infer_from_types(resolver, s, t);
            }
            return;
        }
        for target_prop in resolver.properties_of(target) {
            if let Some(source_prop) = resolver.property_of(source, &target_prop.name) {
                self.infer_from_types(resolver, source_prop.type_id, target_prop.type_id);
            }
        }
        for kind in [SignatureKind::Call, SignatureKind::Construct] {
            let source_signatures = resolver.signatures_of(source, kind);
            let target_signatures = resolver.signatures_of(target, kind);
            if let (Some(s), Some(t)) = (source_signatures.last(), target_signatures.last()) {
                self.infer_from_signatures(resolver, s, t);
            }
        }
        for numeric in [false, true] {
            if let (Some(s), Some(t)) = (resolver.index_type_of(source, numeric), resolver.index_type_of(target, numeric)) {
                self.infer_from_types(resolver, s, t);
            }
        }
    }

    pub fn infer_from_signatures<R: TypeResolver>(&mut self, resolver: &mut R, source: &SignatureInfo, target: &SignatureInfo) {
        let count = source.parameters.len().min(target.parameters.len());
        for index in 0..count {
            if let (Some(s), Some(t)) = (source.parameter_type_at(index), target.parameter_type_at(index)) {
                self.infer_from_types(resolver, s, t);
            }
        }
        self.infer_from_types(resolver, source.return_type, target.return_type);
    }

    /// Fix every parameter to a type.
    pub fn resolve<R: TypeResolver>(&self, resolver: &mut R) -> TypeSubstitution {
        let fallback = resolver.primitives().empty_object;
        let mut substitution = TypeSubstitution::new();
        for (index, &parameter) in self.type_parameters.iter().enumerate() {
            let widened: Vec<SymbolId> = self.candidates[index].iter().map(|&c| widen(resolver, c)).collect();
            let inferred = best_common_type(resolver, &widened).unwrap_or(fallback);
            trace!(parameter = parameter.0, inferred = inferred.0, candidates = widened.len(), "inferred type argument");
            substitution.insert(parameter, inferred);
        }
        substitution
    }
}

/// The candidate every other candidate is a subtype of, if any.
pub fn best_common_type<R: TypeResolver>(resolver: &mut R, candidates: &[SymbolId]) -> Option<SymbolId> {
    let candidates: Vec<SymbolId> = candidates.iter().copied().filter(|c| c.is_some()).collect();
    match candidates.as_slice() {
        [] => return None,
        [only] => return Some(*only),
        _ => {}
    }
    let mut checker = RelationChecker::new(resolver, RelationKind::Subtype);
    candidates
        .iter()
        .copied()
        .find(|&candidate| candidates.iter().all(|&other| checker.is_related(other, candidate)))
}
