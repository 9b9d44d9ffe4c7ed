//! Type-parameter substitution.

use pullc_binder::SymbolId;
use smallvec::SmallVec;
use tracing::trace;

use crate::type_resolver::{ParamInfo, SignatureInfo, TypeClass, TypeResolver};

/// Ordered type-parameter → type-argument mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeSubstitution {
    pairs: SmallVec<[(SymbolId, SymbolId); 4]>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `parameters` with `arguments`; missing arguments map to `fallback`.
    pub fn from_args(parameters: &[SymbolId], arguments: &[SymbolId], fallback: SymbolId) -> Self {
        let pairs = parameters
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, arguments.get(i).copied().unwrap_or(fallback)))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs(pairs: &[(SymbolId, SymbolId)]) -> Self {
        Self {
            pairs: pairs.iter().copied().collect(),
        }
    }

    pub fn insert(&mut self, parameter: SymbolId, argument: SymbolId) {
        match self.pairs.iter_mut().find(|(p, _)| *p == parameter) {
            Some(pair) => pair.1 = argument,
            None => self.pairs.push((parameter, argument)),
        }
    }

    pub fn get(&self, parameter: SymbolId) -> Option<SymbolId> {
        self.pairs.iter().find(|(p, _)| *p == parameter).map(|(_, a)| *a)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(SymbolId, SymbolId)] {
        &self.pairs
    }

    /// Every parameter maps to itself.
    pub fn is_identity(&self) -> bool {
        self.pairs.iter().all(|(p, a)| p == a)
    }

    /// `self` followed by `outer`: each argument is itself substituted.
    pub fn compose<R: TypeResolver>(&self, resolver: &mut R, outer: &TypeSubstitution) -> TypeSubstitution {
        let mut pairs = SmallVec::new();
        for &(p, a) in &self.pairs {
            pairs.push((p, instantiate_type(resolver, a, outer)));
        }
        for &(p, a) in &outer.pairs {
            if !pairs.iter().any(|(q, _): &(SymbolId, SymbolId)| *q == p) {
                pairs.push((p, a));
            }
        }
        TypeSubstitution { pairs }
    }
}

/// Substitute type parameters in `ty`.
pub fn instantiate_type<R: TypeResolver>(resolver: &mut R, ty: SymbolId, substitution: &TypeSubstitution) -> SymbolId {
    if substitution.is_empty() || ty.is_none() {
        return ty;
    }
    match resolver.classify(ty) {
        TypeClass::TypeParameter { .. } => substitution.get(ty).unwrap_or(ty),
        TypeClass::Array(element) => {
            let instantiated = instantiate_type(resolver, element, substitution);
            if instantiated == element {
                ty
            } else {
                resolver.array_of(instantiated)
            }
        }
        TypeClass::Object => {
            let specialized = resolver.specialize(ty, substitution);
            if specialized != ty {
                trace!(from = ty.0, to = specialized.0, "specialized object type");
            }
            specialized
        }
        _ => ty,
    }
}

/// Substitute through every parameter and the return type of a signature.
/// The signature's own type parameters are left alone unless mapped.
pub fn instantiate_signature<R: TypeResolver>(
    resolver: &mut R,
    signature: &SignatureInfo,
    substitution: &TypeSubstitution,
) -> SignatureInfo {
    if substitution.is_empty() {
        return signature.clone();
    }
    let parameters = signature
        .parameters
        .iter()
        .map(|p| ParamInfo {
            name: p.name.clone(),
            type_id: instantiate_type(resolver, p.type_id, substitution),
            optional: p.optional,
            rest: p.rest,
        })
        .collect();
    let rest_element = signature
        .rest_element
        .map(|e| instantiate_type(resolver, e, substitution));
    let type_parameters = signature
        .type_parameters
        .iter()
        .copied()
        .filter(|tp| substitution.get(*tp).is_none())
        .collect();
    SignatureInfo {
        symbol: signature.symbol,
        kind: signature.kind,
        type_parameters,
        parameters,
        return_type: instantiate_type(resolver, signature.return_type, substitution),
        rest_element,
        is_definition: signature.is_definition,
    }
}

/// Replace a generic signature's own type parameters with `any`.
pub fn erase_signature<R: TypeResolver>(resolver: &mut R, signature: &SignatureInfo) -> SignatureInfo {
    if signature.type_parameters.is_empty() {
        return signature.clone();
    }
    let any = resolver.primitives().any;
    let substitution = TypeSubstitution::from_args(&signature.type_parameters, &[], any);
    instantiate_signature(resolver, signature, &substitution)
}
