//! Widening of inferred types.
//!
//! `null` and `undefined` carry no useful information once a declaration's
//! type is inferred from them, so they widen to `any`, including inside
//! array element types.

use pullc_binder::SymbolId;

use crate::type_resolver::{TypeClass, TypeResolver};

pub fn widen<R: TypeResolver>(resolver: &mut R, ty: SymbolId) -> SymbolId {
    if ty.is_none() {
        return ty;
    }
    match resolver.classify(ty) {
        TypeClass::Null | TypeClass::Undefined => resolver.primitives().any,
        TypeClass::Array(element) => {
            let widened = widen(resolver, element);
            if widened == element {
                ty
            } else {
                resolver.array_of(widened)
            }
        }
        _ => ty,
    }
}

/// Whether widening `ty` would change it.
pub fn is_widenable<R: TypeResolver>(resolver: &mut R, ty: SymbolId) -> bool {
    widen(resolver, ty) != ty
}
