//! Resolver tests: symbol types, inference and name resolution.

mod support;

use pullc_binder::{DeclSpace, SemanticInfoChain, SymbolId};
use pullc_checker::PullTypeResolver;
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::TypeResolver;
use pullc_syntax::{NodeFactory, NodeIndex};

use support::*;

fn chain_with(build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>) -> SemanticInfoChain {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "test.ts", build);
    bind(&mut chain);
    chain
}

fn type_text(chain: &mut SemanticInfoChain, name: &str) -> String {
    let symbol = lookup(chain, name, DeclSpace::Value).expect("symbol is bound");
    let mut resolver = PullTypeResolver::new(chain);
    let ty = resolver.type_of_symbol(symbol);
    resolver.type_display(ty)
}

#[test]
fn test_variable_type_comes_from_initializer() {
    let mut chain = chain_with(|f| {
        let one = f.num(1.0);
        let text = f.str_lit("a");
        vec![f.var_stmt(none(), "n", None, Some(one)), f.var_stmt(none(), "s", None, Some(text))]
    });
    assert_eq!(type_text(&mut chain, "n"), "number");
    assert_eq!(type_text(&mut chain, "s"), "string");
}

#[test]
fn test_annotation_wins_over_initializer() {
    let mut chain = chain_with(|f| {
        let any = f.any_type();
        let one = f.num(1.0);
        vec![f.var_stmt(none(), "x", Some(any), Some(one))]
    });
    assert_eq!(type_text(&mut chain, "x"), "any");
}

#[test]
fn test_array_literal_takes_best_common_type() {
    let mut chain = chain_with(|f| {
        let one = f.num(1.0);
        let two = f.num(2.0);
        let array = f.array_lit(vec![one, two]);
        vec![f.var_stmt(none(), "a", None, Some(array))]
    });
    assert_eq!(type_text(&mut chain, "a"), "number[]");
}

#[test]
fn test_null_initializer_widens_to_any() {
    let mut chain = chain_with(|f| {
        let null = f.null_lit();
        vec![f.var_stmt(none(), "x", None, Some(null))]
    });
    assert_eq!(type_text(&mut chain, "x"), "any");
}

#[test]
fn test_object_literal_members_are_widened() {
    let mut chain = chain_with(|f| {
        let null = f.null_lit();
        let one = f.num(1.0);
        let literal = f.object_lit(vec![("a", null), ("b", one)]);
        vec![f.var_stmt(none(), "o", None, Some(literal))]
    });
    let o = lookup(&mut chain, "o", DeclSpace::Value).unwrap();
    let mut resolver = PullTypeResolver::new(&mut chain);
    let ty = resolver.type_of_symbol(o);
    let primitives = resolver.chain().primitives;
    let a = resolver.property_of(ty, "a").expect("a exists");
    let b = resolver.property_of(ty, "b").expect("b exists");
    assert_eq!(a.type_id, primitives.any);
    assert_eq!(b.type_id, primitives.number);
}

#[test]
fn test_generic_call_infers_type_argument() {
    let mut chain = chain_with(|f| {
        let t = f.type_param("T", None);
        let t_ref = f.type_ref("T", vec![]);
        let x = f.param("x", Some(t_ref));
        let ret = f.type_ref("T", vec![]);
        let x_ref = f.ident("x");
        let body = vec![f.return_stmt(Some(x_ref))];
        let id = f.function_decl(none(), "id", vec![t], vec![x], Some(ret), Some(body));
        let callee = f.ident("id");
        let three = f.num(3.0);
        let call = f.call(callee, vec![three]);
        vec![id, f.var_stmt(none(), "n", None, Some(call))]
    });
    assert_eq!(type_text(&mut chain, "n"), "number");
}

#[test]
fn test_first_applicable_overload_is_chosen() {
    let mut chain = chain_with(|f| {
        let s = f.string_type();
        let xs = f.param("x", Some(s));
        let rs = f.string_type();
        let o1 = f.function_decl(none(), "f", vec![], vec![xs], Some(rs), None);
        let n = f.number_type();
        let xn = f.param("x", Some(n));
        let rn = f.number_type();
        let o2 = f.function_decl(none(), "f", vec![], vec![xn], Some(rn), None);
        let a = f.any_type();
        let xa = f.param("x", Some(a));
        let ra = f.any_type();
        let x_ref = f.ident("x");
        let body = vec![f.return_stmt(Some(x_ref))];
        let def = f.function_decl(none(), "f", vec![], vec![xa], Some(ra), Some(body));
        let callee = f.ident("f");
        let one = f.num(1.0);
        let call = f.call(callee, vec![one]);
        vec![o1, o2, def, f.var_stmt(none(), "r", None, Some(call))]
    });
    assert_eq!(type_text(&mut chain, "r"), "number");
}

#[test]
fn test_contextual_signature_types_function_expression_parameters() {
    let mut function_node = NodeIndex::NONE;
    let mut chain = chain_with(|f| {
        let n = f.number_type();
        let p = f.param("n", Some(n));
        let r = f.number_type();
        let fn_type = f.function_type(vec![], vec![p], r);
        let param = f.param("v", None);
        let v_ref = f.ident("v");
        let body = vec![f.return_stmt(Some(v_ref))];
        let expression = f.func_expr(None, vec![], vec![param], None, body);
        function_node = expression;
        vec![f.var_stmt(none(), "g", Some(fn_type), Some(expression))]
    });
    let unit = chain.unit_ids()[0];
    let g = lookup(&mut chain, "g", DeclSpace::Value).unwrap();
    let mut resolver = PullTypeResolver::new(&mut chain);
    let declared = resolver.type_of_symbol(g);
    let ty = resolver.resolve_expression(unit, function_node, Some(declared));
    let signature = resolver.signatures_of(ty, pullc_binder::SignatureKind::Call);
    let number = resolver.chain().primitives.number;
    assert_eq!(signature[0].parameters[0].type_id, number);
    assert_eq!(signature[0].return_type, number);
}

#[test]
fn test_circular_initializers_resolve_to_any() {
    let mut chain = chain_with(|f| {
        let b = f.ident("b");
        let a = f.ident("a");
        vec![f.var_stmt(none(), "a", None, Some(b)), f.var_stmt(none(), "b", None, Some(a))]
    });
    assert_eq!(type_text(&mut chain, "a"), "any");
}

#[test]
fn test_qualified_names_resolve_through_modules() {
    let mut chain = chain_with(|f| {
        let c = f.class_decl(export(), "C", vec![], None, vec![], vec![]);
        let m = f.module_decl(none(), "M", vec![c]);
        let c_ref = f.type_ref("M.C", vec![]);
        vec![m, f.var_stmt(none(), "x", Some(c_ref), None)]
    });
    assert_eq!(type_text(&mut chain, "x"), "C");
}

#[test]
fn test_unresolved_name_is_reported_once() {
    let diagnostics = check_file(|f| {
        let missing = f.ident("missing");
        let again = f.ident("missing");
        vec![f.var_stmt(none(), "x", None, Some(missing)), f.expr_stmt(again)]
    });
    assert_eq!(count(&diagnostics, diagnostic_codes::CANNOT_FIND_NAME), 2);
    assert_eq!(diagnostics.len(), 2);
}

#[test]
fn test_type_used_as_value_is_reported() {
    let diagnostics = check_file(|f| {
        let interface = f.interface_decl(none(), "I", vec![], vec![], vec![]);
        let i = f.ident("I");
        vec![interface, f.var_stmt(none(), "x", None, Some(i))]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::ONLY_REFERS_TO_A_TYPE]);
}

#[test]
fn test_generic_type_without_arguments_is_reported() {
    let diagnostics = check_file(|f| {
        let t = f.type_param("T", None);
        let g = f.interface_decl(none(), "G", vec![t], vec![], vec![]);
        let g_ref = f.type_ref("G", vec![]);
        vec![g, f.var_stmt(none(), "x", Some(g_ref), None)]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS]);
}

#[test]
fn test_instantiated_member_types_are_substituted() {
    let mut chain = chain_with(|f| {
        let t = f.type_param("T", None);
        let t_ref = f.type_ref("T", vec![]);
        let value = f.property_sig("value", false, Some(t_ref));
        let boxed = f.interface_decl(none(), "Box", vec![t], vec![], vec![value]);
        let s = f.string_type();
        let box_ref = f.type_ref("Box", vec![s]);
        vec![boxed, f.var_stmt(none(), "b", Some(box_ref), None)]
    });
    let b = lookup(&mut chain, "b", DeclSpace::Value).unwrap();
    let mut resolver = PullTypeResolver::new(&mut chain);
    let ty = resolver.type_of_symbol(b);
    let value = resolver.property_of(ty, "value").expect("value exists");
    assert_eq!(value.type_id, resolver.chain().primitives.string);
    assert_ne!(ty, SymbolId::NONE);
}
