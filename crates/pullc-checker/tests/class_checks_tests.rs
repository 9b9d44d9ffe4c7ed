//! Class and interface checks: heritage, constructors and member access.

mod support;

use pullc_common::diagnostics::diagnostic_codes;
use pullc_syntax::{NodeFactory, NodeIndex};

use support::*;

fn class_with(f: &mut NodeFactory, name: &str, extends: Option<&str>, members: Vec<NodeIndex>) -> NodeIndex {
    let extends = extends.map(|base| f.type_ref(base, vec![]));
    f.class_decl(none(), name, vec![], extends, vec![], members)
}

// =============================================================================
// Heritage
// =============================================================================

#[test]
fn test_interface_base_cycle() {
    let diagnostics = check_file(|f| {
        let j = f.type_ref("J", vec![]);
        let i = f.interface_decl(none(), "I", vec![], vec![j], vec![]);
        let i_ref = f.type_ref("I", vec![]);
        let j_decl = f.interface_decl(none(), "J", vec![], vec![i_ref], vec![]);
        vec![i, j_decl]
    });
    assert!(count(&diagnostics, diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE) >= 1);
    assert_eq!(count(&diagnostics, diagnostic_codes::INTERFACE_INCORRECTLY_EXTENDS), 0);
}

#[test]
fn test_class_base_cycle_reported_once_on_each_class() {
    let diagnostics = check_file(|f| {
        let a = class_with(f, "A", Some("B"), vec![]);
        let b = class_with(f, "B", Some("A"), vec![]);
        vec![a, b]
    });
    assert_eq!(
        codes(&diagnostics),
        vec![
            diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE,
            diagnostic_codes::TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_BASE,
        ],
        "{diagnostics:?}"
    );
    let mut named: Vec<&str> = diagnostics.iter().map(|d| d.arguments[0].as_str()).collect();
    named.sort_unstable();
    assert_eq!(named, vec!["A", "B"]);
    assert_ne!(diagnostics[0].start, diagnostics[1].start);
    assert_eq!(count(&diagnostics, diagnostic_codes::CLASS_INCORRECTLY_EXTENDS), 0);
}

#[test]
fn test_class_may_only_extend_class() {
    let diagnostics = check_file(|f| {
        let interface = f.interface_decl(none(), "I", vec![], vec![], vec![]);
        let class = class_with(f, "C", Some("I"), vec![]);
        vec![interface, class]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CLASS_MAY_ONLY_EXTEND_CLASS]);
}

#[test]
fn test_class_may_only_implement_class_or_interface() {
    let diagnostics = check_file(|f| {
        let a = f.enum_member("A", None);
        let e = f.enum_decl(none(), "E", vec![a]);
        let e_ref = f.type_ref("E", vec![]);
        let class = f.class_decl(none(), "C", vec![], None, vec![e_ref], vec![]);
        vec![e, class]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CLASS_MAY_ONLY_IMPLEMENT]);
}

#[test]
fn test_class_incorrectly_extends_base() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let base_p = f.property_decl(none(), "p", Some(n), None);
        let base = class_with(f, "B", None, vec![base_p]);
        let s = f.string_type();
        let derived_p = f.property_decl(none(), "p", Some(s), None);
        let derived = class_with(f, "D", Some("B"), vec![derived_p]);
        vec![base, derived]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CLASS_INCORRECTLY_EXTENDS]);
    assert_eq!(diagnostics[0].arguments[..2], ["D", "B"]);
}

#[test]
fn test_compatible_subclass_is_accepted() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let base_p = f.property_decl(none(), "p", Some(n), None);
        let base_m = f.method_decl(none(), "m", vec![], vec![], None, Some(vec![]));
        let base = class_with(f, "B", None, vec![base_p, base_m]);
        let derived_m = f.method_decl(none(), "m", vec![], vec![], None, Some(vec![]));
        let s = f.string_type();
        let extra = f.property_decl(none(), "q", Some(s), None);
        let derived = class_with(f, "D", Some("B"), vec![derived_m, extra]);
        vec![base, derived]
    });
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_property_overriding_method_is_a_kind_mismatch() {
    let diagnostics = check_file(|f| {
        let base_m = f.method_decl(none(), "m", vec![], vec![], None, Some(vec![]));
        let base = class_with(f, "B", None, vec![base_m]);
        let n = f.number_type();
        let derived_m = f.property_decl(none(), "m", Some(n), None);
        let derived = class_with(f, "D", Some("B"), vec![derived_m]);
        vec![base, derived]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CLASS_MEMBER_KIND_MISMATCH]);
    assert_eq!(diagnostics[0].arguments, vec!["D", "property", "m", "B", "function"]);
}

#[test]
fn test_class_incorrectly_implements_interface() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let x = f.property_sig("x", false, Some(n));
        let interface = f.interface_decl(none(), "I", vec![], vec![], vec![x]);
        let i_ref = f.type_ref("I", vec![]);
        let class = f.class_decl(none(), "C", vec![], None, vec![i_ref], vec![]);
        vec![interface, class]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::CLASS_INCORRECTLY_IMPLEMENTS]);
}

#[test]
fn test_interface_incorrectly_extends_interface() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let base_x = f.property_sig("x", false, Some(n));
        let base = f.interface_decl(none(), "A", vec![], vec![], vec![base_x]);
        let s = f.string_type();
        let derived_x = f.property_sig("x", false, Some(s));
        let a_ref = f.type_ref("A", vec![]);
        let derived = f.interface_decl(none(), "B", vec![], vec![a_ref], vec![derived_x]);
        vec![base, derived]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::INTERFACE_INCORRECTLY_EXTENDS]);
}

#[test]
fn test_interface_may_only_extend_class_or_interface() {
    let diagnostics = check_file(|f| {
        let a = f.enum_member("A", None);
        let e = f.enum_decl(none(), "E", vec![a]);
        let e_ref = f.type_ref("E", vec![]);
        let interface = f.interface_decl(none(), "I", vec![], vec![e_ref], vec![]);
        vec![e, interface]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::INTERFACE_MAY_ONLY_EXTEND_CLASS_OR_INTERFACE]);
}

#[test]
fn test_merged_interfaces_need_identical_type_parameters() {
    let diagnostics = check_file(|f| {
        let t = f.type_param("T", None);
        let first = f.interface_decl(none(), "G", vec![t], vec![], vec![]);
        let u = f.type_param("U", None);
        let second = f.interface_decl(none(), "G", vec![u], vec![], vec![]);
        vec![first, second]
    });
    assert!(count(&diagnostics, diagnostic_codes::TYPE_PARAMETERS_MUST_BE_IDENTICAL) >= 1);
}

// =============================================================================
// Constructors
// =============================================================================

#[test]
fn test_derived_constructor_must_call_super() {
    let diagnostics = check_file(|f| {
        let base = class_with(f, "B", None, vec![]);
        let ctor = f.constructor(none(), vec![], Some(vec![]));
        let derived = class_with(f, "D", Some("B"), vec![ctor]);
        vec![base, derived]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::DERIVED_CONSTRUCTOR_MUST_CALL_SUPER]);
}

#[test]
fn test_super_call_must_lead_when_properties_are_initialized() {
    let diagnostics = check_file(|f| {
        let base = class_with(f, "B", None, vec![]);
        let one = f.num(1.0);
        let property = f.property_decl(none(), "x", None, Some(one));
        let two = f.num(2.0);
        let local = f.var_stmt(none(), "a", None, Some(two));
        let super_call = f.super_call_stmt(vec![]);
        let ctor = f.constructor(none(), vec![], Some(vec![local, super_call]));
        let derived = class_with(f, "D", Some("B"), vec![property, ctor]);
        vec![base, derived]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::SUPER_CALL_MUST_BE_FIRST_STATEMENT]);
}

#[test]
fn test_late_super_call_without_initialized_properties() {
    let diagnostics = check_file(|f| {
        let base = class_with(f, "B", None, vec![]);
        let two = f.num(2.0);
        let local = f.var_stmt(none(), "a", None, Some(two));
        let super_call = f.super_call_stmt(vec![]);
        let ctor = f.constructor(none(), vec![], Some(vec![local, super_call]));
        let derived = class_with(f, "D", Some("B"), vec![ctor]);
        vec![base, derived]
    });
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_super_call_inside_nested_block_counts() {
    let diagnostics = check_file(|f| {
        let base = class_with(f, "B", None, vec![]);
        let super_call = f.super_call_stmt(vec![]);
        let condition = f.true_lit();
        let then = f.block(vec![super_call]);
        let branch = f.if_stmt(condition, then, None);
        let ctor = f.constructor(none(), vec![], Some(vec![branch]));
        let derived = class_with(f, "D", Some("B"), vec![ctor]);
        vec![base, derived]
    });
    assert_eq!(count(&diagnostics, diagnostic_codes::DERIVED_CONSTRUCTOR_MUST_CALL_SUPER), 0);
}

// =============================================================================
// Member access
// =============================================================================

#[test]
fn test_private_member_outside_class() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let p = f.property_decl(private(), "p", Some(n), None);
        let class = class_with(f, "C", None, vec![p]);
        let c_type = f.type_ref("C", vec![]);
        let declaration = f.var_stmt(none(), "c", Some(c_type), None);
        let c = f.ident("c");
        let access = f.prop_access(c, "p");
        vec![class, declaration, f.expr_stmt(access)]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::PROPERTY_IS_PRIVATE]);
    assert_eq!(diagnostics[0].arguments, vec!["p", "C"]);
}

#[test]
fn test_private_member_inside_class() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let p = f.property_decl(private(), "p", Some(n), None);
        let this = f.this_expr();
        let access = f.prop_access(this, "p");
        let ret = f.return_stmt(Some(access));
        let method = f.method_decl(none(), "get", vec![], vec![], None, Some(vec![ret]));
        vec![class_with(f, "C", None, vec![p, method])]
    });
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_static_member_through_instance() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let s = f.property_decl(static_(), "s", Some(n), None);
        let class = class_with(f, "C", None, vec![s]);
        let c_type = f.type_ref("C", vec![]);
        let declaration = f.var_stmt(none(), "c", Some(c_type), None);
        let c = f.ident("c");
        let through_instance = f.prop_access(c, "s");
        let class_ref = f.ident("C");
        let through_class = f.prop_access(class_ref, "s");
        vec![class, declaration, f.expr_stmt(through_instance), f.expr_stmt(through_class)]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::STATIC_MEMBER_VIA_INSTANCE]);
    assert_eq!(diagnostics[0].arguments, vec!["s", "C"]);
}

#[test]
fn test_super_property_access_must_name_a_method() {
    let diagnostics = check_file(|f| {
        let n = f.number_type();
        let p = f.property_decl(none(), "p", Some(n), None);
        let base = class_with(f, "B", None, vec![p]);
        let sup = f.super_expr();
        let access = f.prop_access(sup, "p");
        let ret = f.return_stmt(Some(access));
        let method = f.method_decl(none(), "m", vec![], vec![], None, Some(vec![ret]));
        let derived = class_with(f, "D", Some("B"), vec![method]);
        vec![base, derived]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::SUPER_ACCESS_ONLY_METHODS]);
}
