//! Substitution and type-argument inference.

mod support;

use pullc_binder::SymbolId;
use pullc_solver::{
    InferenceContext, TypeResolver, TypeSubstitution, erase_signature, instantiate_signature, instantiate_type,
    is_assignable_to, type_to_string,
};
use support::MockResolver;

#[test]
fn test_substitution_reaches_parameters_arrays_and_members() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let ts = r.array(t);
    let boxed = r.anonymous(&[("value", t), ("all", ts)]);

    let mut substitution = TypeSubstitution::new();
    substitution.insert(t, p.number);

    assert_eq!(instantiate_type(&mut r, t, &substitution), p.number);
    let numbers = r.array(p.number);
    assert_eq!(instantiate_type(&mut r, ts, &substitution), numbers);
    assert_eq!(instantiate_type(&mut r, p.string, &substitution), p.string);

    let boxed_number = instantiate_type(&mut r, boxed, &substitution);
    assert_ne!(boxed_number, boxed);
    assert_eq!(type_to_string(&mut r, boxed_number), "{ value: number; all: number[]; }");
    // Specializations are cached per substitution.
    assert_eq!(instantiate_type(&mut r, boxed, &substitution), boxed_number);
}

#[test]
fn test_composed_substitution() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let u = r.type_parameter("U", SymbolId::NONE);
    let us = r.array(u);
    let inner = TypeSubstitution::from_pairs(&[(t, us)]);
    let outer = TypeSubstitution::from_pairs(&[(u, p.string)]);
    let composed = inner.compose(&mut r, &outer);
    let strings = r.array(p.string);
    assert_eq!(composed.get(t), Some(strings));
    assert_eq!(composed.get(u), Some(p.string));
    assert!(!composed.is_identity());
    assert!(TypeSubstitution::from_pairs(&[(t, t)]).is_identity());
}

#[test]
fn test_signature_instantiation_and_erasure() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let mut identity = r.signature(&[("x", t)], t);
    identity.type_parameters = vec![t];

    let substitution = TypeSubstitution::from_args(&[t], &[p.string], p.any);
    let for_strings = instantiate_signature(&mut r, &identity, &substitution);
    assert_eq!(for_strings.parameters[0].type_id, p.string);
    assert_eq!(for_strings.return_type, p.string);
    assert!(for_strings.type_parameters.is_empty());

    let erased = erase_signature(&mut r, &identity);
    assert_eq!(erased.parameters[0].type_id, p.any);
    assert_eq!(erased.return_type, p.any);

    // A generic function is assignable to a concrete one through erasure.
    let generic = r.function_with(identity);
    let concrete = r.function(&[("x", p.number)], p.number);
    assert!(is_assignable_to(&mut r, generic, concrete));
}

#[test]
fn test_missing_type_arguments_use_fallback() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let u = r.type_parameter("U", SymbolId::NONE);
    let substitution = TypeSubstitution::from_args(&[t, u], &[p.number], p.any);
    assert_eq!(substitution.get(t), Some(p.number));
    assert_eq!(substitution.get(u), Some(p.any));
}

#[test]
fn test_infer_from_direct_and_array_positions() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let ts = r.array(t);
    let strings = r.array(p.string);

    let mut context = InferenceContext::new(&[t]);
    context.infer_from_types(&mut r, strings, ts);
    assert_eq!(context.candidates_for(t), &[p.string]);
    let substitution = context.resolve(&mut r);
    assert_eq!(substitution.get(t), Some(p.string));
}

#[test]
fn test_infer_through_members_and_signatures() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let u = r.type_parameter("U", SymbolId::NONE);
    let holder = r.anonymous(&[("item", t)]);
    let callback = r.function(&[("value", t)], u);

    let source_holder = r.anonymous(&[("item", p.number), ("extra", p.boolean)]);
    let source_callback = r.function(&[("value", p.number)], p.string);

    let mut context = InferenceContext::new(&[t, u]);
    context.infer_from_types(&mut r, source_holder, holder);
    context.infer_from_types(&mut r, source_callback, callback);
    let substitution = context.resolve(&mut r);
    assert_eq!(substitution.get(t), Some(p.number));
    assert_eq!(substitution.get(u), Some(p.string));
}

#[test]
fn test_inference_picks_common_supertype() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let animal = r.named("Animal", &[("name", p.string)]);
    let dog = r.named("Dog", &[("name", p.string), ("bark", p.void)]);

    let mut context = InferenceContext::new(&[t]);
    context.infer_from_types(&mut r, dog, t);
    context.infer_from_types(&mut r, animal, t);
    assert_eq!(context.resolve(&mut r).get(t), Some(animal));

    let mut unrelated = InferenceContext::new(&[t]);
    unrelated.infer_from_types(&mut r, p.number, t);
    unrelated.infer_from_types(&mut r, p.string, t);
    assert_eq!(unrelated.resolve(&mut r).get(t), Some(p.empty_object));
}

#[test]
fn test_inference_widens_and_defaults() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);

    let mut from_null = InferenceContext::new(&[t]);
    from_null.infer_from_types(&mut r, p.null, t);
    assert_eq!(from_null.resolve(&mut r).get(t), Some(p.any));

    let nothing = InferenceContext::new(&[t]);
    assert_eq!(nothing.resolve(&mut r).get(t), Some(p.empty_object));
}

#[test]
fn test_inference_through_generic_references() {
    let mut r = MockResolver::new();
    let p = r.p();
    let t = r.type_parameter("T", SymbolId::NONE);
    let list = r.named("List", &[]);
    let list_of_t = r.reference(list, &[t], &[("head", t)]);
    let list_of_number = r.reference(list, &[p.number], &[("head", p.number)]);

    let mut context = InferenceContext::new(&[t]);
    context.infer_from_types(&mut r, list_of_number, list_of_t);
    assert_eq!(context.resolve(&mut r).get(t), Some(p.number));
    assert_eq!(r.classify(list_of_t), pullc_solver::TypeClass::Object);
}
