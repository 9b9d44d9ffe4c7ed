//! Binder tests: symbol creation, merging, duplicates and rebinding.

use std::sync::Arc;

use pullc_binder::{
    BinderOptions, BinderState, DeclSpace, SemanticInfoChain, SignatureKind, SymbolFlags, SymbolId,
    SymbolKind, UnitId, collect_unit_decls, rebind_unit,
};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_syntax::{ModifierFlags, NodeFactory, NodeIndex};

fn add_file(
    chain: &mut SemanticInfoChain,
    path: &str,
    build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>,
) -> UnitId {
    let mut f = NodeFactory::new();
    let statements = build(&mut f);
    let (arena, root) = f.finish(path, statements);
    let unit = chain.add_unit(path, Arc::new(arena), root);
    collect_unit_decls(chain, unit);
    unit
}

fn bind(chain: &mut SemanticInfoChain) {
    BinderState::new(chain, BinderOptions::default()).bind_all();
}

fn replace_file(
    chain: &mut SemanticInfoChain,
    unit: UnitId,
    build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>,
) {
    let path = chain.unit(unit).unwrap().path.clone();
    let mut f = NodeFactory::new();
    let statements = build(&mut f);
    let (arena, root) = f.finish(&path, statements);
    rebind_unit(chain, &BinderOptions::default(), unit, Arc::new(arena), root);
}

fn error_codes(chain: &SemanticInfoChain) -> Vec<u32> {
    chain.binder_diagnostics().iter().map(|d| d.code).collect()
}

fn lookup(chain: &mut SemanticInfoChain, dotted: &str, space: DeclSpace) -> Option<SymbolId> {
    let path: Vec<String> = dotted.split('.').map(str::to_string).collect();
    chain.find_symbol(&path, space)
}

fn none() -> ModifierFlags {
    ModifierFlags::empty()
}

// =============================================================================
// Single declarations
// =============================================================================

#[test]
fn test_variable_binds_to_one_symbol() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let ty = f.number_type();
        vec![f.var_stmt(none(), "x", Some(ty), None)]
    });
    bind(&mut chain);

    let x = lookup(&mut chain, "x", DeclSpace::Value).expect("x is bound");
    let sym = chain.symbols.get(x).unwrap();
    assert!(matches!(sym.kind, SymbolKind::Variable));
    assert_eq!(sym.declarations.len(), 1);
    assert!(lookup(&mut chain, "x", DeclSpace::Type).is_none());
    assert!(error_codes(&chain).is_empty());
}

#[test]
fn test_every_collected_decl_gets_a_symbol() {
    let mut chain = SemanticInfoChain::new();
    let unit = add_file(&mut chain, "a.ts", |f| {
        let p = f.property_decl(none(), "p", None, None);
        let m = f.method_decl(none(), "m", vec![], vec![], None, Some(vec![]));
        let class = f.class_decl(none(), "C", vec![], None, vec![], vec![p, m]);
        let member = f.enum_member("A", None);
        let e = f.enum_decl(none(), "E", vec![member]);
        vec![class, e]
    });
    bind(&mut chain);

    let script = chain.unit(unit).unwrap().script_decl;
    let mut stack = chain.decls.children(script).to_vec();
    while let Some(decl) = stack.pop() {
        assert!(chain.decls.get(decl).unwrap().is_bound);
        assert!(chain.decls.symbol(decl).is_some(), "decl {decl:?} has no symbol");
        stack.extend_from_slice(chain.decls.children(decl));
    }
}

// =============================================================================
// Merging
// =============================================================================

#[test]
fn test_var_redeclaration_across_units_merges() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| vec![f.var_stmt(none(), "x", None, None)]);
    add_file(&mut chain, "b.ts", |f| vec![f.var_stmt(none(), "x", None, None)]);
    bind(&mut chain);

    let x = lookup(&mut chain, "x", DeclSpace::Value).unwrap();
    assert_eq!(chain.symbols.get(x).unwrap().declarations.len(), 2);
    assert!(error_codes(&chain).is_empty());
}

#[test]
fn test_interface_pieces_share_members() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let a = f.property_sig("a", false, None);
        vec![f.interface_decl(none(), "I", vec![], vec![], vec![a])]
    });
    add_file(&mut chain, "b.ts", |f| {
        let b = f.property_sig("b", false, None);
        vec![f.interface_decl(none(), "I", vec![], vec![], vec![b])]
    });
    bind(&mut chain);

    let iface = lookup(&mut chain, "I", DeclSpace::Type).unwrap();
    let shape = chain.symbols.shape(iface).unwrap();
    assert!(shape.members.get("a", DeclSpace::Value).is_some());
    assert!(shape.members.get("b", DeclSpace::Value).is_some());
    assert_eq!(chain.symbols.get(iface).unwrap().declarations.len(), 2);
}

#[test]
fn test_interface_pieces_reuse_type_parameters_by_name() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let t1 = f.type_param("T", None);
        let t2 = f.type_param("T", None);
        vec![
            f.interface_decl(none(), "I", vec![t1], vec![], vec![]),
            f.interface_decl(none(), "I", vec![t2], vec![], vec![]),
        ]
    });
    bind(&mut chain);

    let iface = lookup(&mut chain, "I", DeclSpace::Type).unwrap();
    assert_eq!(chain.symbols.shape(iface).unwrap().type_parameters.len(), 1);
}

#[test]
fn test_instantiated_module_pieces_merge_in_both_spaces() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let a = f.var_stmt(ModifierFlags::EXPORT, "a", None, None);
        vec![f.module_decl(none(), "M", vec![a])]
    });
    add_file(&mut chain, "b.ts", |f| {
        let b = f.var_stmt(ModifierFlags::EXPORT, "b", None, None);
        let hidden = f.var_stmt(none(), "hidden", None, None);
        vec![f.module_decl(none(), "M", vec![b, hidden])]
    });
    bind(&mut chain);

    let module = lookup(&mut chain, "M", DeclSpace::Type).unwrap();
    assert_eq!(lookup(&mut chain, "M", DeclSpace::Value), Some(module));
    let shape = chain.symbols.shape(module).unwrap();
    assert!(shape.members.get("a", DeclSpace::Value).is_some());
    assert!(shape.members.get("b", DeclSpace::Value).is_some());
    assert!(shape.members.get("hidden", DeclSpace::Value).is_none());
    assert!(shape.enclosed.get("hidden", DeclSpace::Value).is_some());
    assert!(matches!(
        chain.symbols.get(shape.associated).unwrap().kind,
        SymbolKind::ContainerInstance { container } if container == module
    ));
}

#[test]
fn test_type_only_module_has_no_value() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let i = f.interface_decl(ModifierFlags::EXPORT, "I", vec![], vec![], vec![]);
        vec![f.module_decl(none(), "M", vec![i])]
    });
    bind(&mut chain);

    assert!(lookup(&mut chain, "M", DeclSpace::Type).is_some());
    assert!(lookup(&mut chain, "M", DeclSpace::Value).is_none());
    assert!(lookup(&mut chain, "M.I", DeclSpace::Type).is_some());
}

#[test]
fn test_class_merges_with_type_only_module() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let class = f.class_decl(none(), "C", vec![], None, vec![], vec![]);
        let i = f.interface_decl(ModifierFlags::EXPORT, "I", vec![], vec![], vec![]);
        let module = f.module_decl(none(), "C", vec![i]);
        vec![class, module]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
    let class = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    let sym = chain.symbols.get(class).unwrap();
    assert!(matches!(sym.kind, SymbolKind::Class(_)));
    let module = sym.merged;
    assert!(matches!(chain.symbols.get(module).unwrap().kind, SymbolKind::Container(_)));
    assert_eq!(chain.symbols.get(module).unwrap().merged, class);
    assert!(chain.symbols.shape(module).unwrap().members.get("I", DeclSpace::Type).is_some());
}

#[test]
fn test_module_before_class_is_augmented() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let i = f.interface_decl(ModifierFlags::EXPORT, "I", vec![], vec![], vec![]);
        let module = f.module_decl(none(), "C", vec![i]);
        let class = f.class_decl(none(), "C", vec![], None, vec![], vec![]);
        vec![module, class]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
    let class = lookup(&mut chain, "C", DeclSpace::Value).unwrap();
    assert!(matches!(chain.symbols.get(class).unwrap().kind, SymbolKind::Class(_)));
    assert!(chain.symbols.get(class).unwrap().merged.is_some());
}

#[test]
fn test_value_module_merge_disabled_reports_duplicate() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let class = f.class_decl(none(), "C", vec![], None, vec![], vec![]);
        let i = f.interface_decl(ModifierFlags::EXPORT, "I", vec![], vec![], vec![]);
        let module = f.module_decl(none(), "C", vec![i]);
        vec![class, module]
    });
    let options = BinderOptions {
        merge_modules_with_values: false,
    };
    BinderState::new(&mut chain, options).bind_all();

    assert_eq!(error_codes(&chain), vec![diagnostic_codes::DUPLICATE_IDENTIFIER]);
}

#[test]
fn test_function_overloads_share_a_function_type() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let n = f.number_type();
        let p1 = f.param("x", Some(n));
        let s = f.string_type();
        let p2 = f.param("x", Some(s));
        let p3 = f.param("x", None);
        vec![
            f.function_decl(none(), "f", vec![], vec![p1], None, None),
            f.function_decl(none(), "f", vec![], vec![p2], None, None),
            f.function_decl(none(), "f", vec![], vec![p3], None, Some(vec![])),
        ]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
    let func = lookup(&mut chain, "f", DeclSpace::Value).unwrap();
    let sym = chain.symbols.get(func).unwrap();
    assert!(matches!(sym.kind, SymbolKind::Function));
    assert_eq!(sym.declarations.len(), 3);
    let shape = chain.symbols.shape(sym.type_id).unwrap();
    assert_eq!(shape.call_signatures.len(), 3);
    let definitions = shape
        .call_signatures
        .iter()
        .filter(|&&s| chain.symbols.signature(s).unwrap().is_definition)
        .count();
    assert_eq!(definitions, 1);
}

#[test]
fn test_two_function_bodies_report_duplicate_implementation() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        vec![
            f.function_decl(none(), "f", vec![], vec![], None, Some(vec![])),
            f.function_decl(none(), "f", vec![], vec![], None, Some(vec![])),
        ]
    });
    bind(&mut chain);

    assert_eq!(error_codes(&chain), vec![diagnostic_codes::DUPLICATE_FUNCTION_IMPLEMENTATION]);
}

#[test]
fn test_getter_and_setter_share_an_accessor() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let get = f.get_accessor(none(), "v", None, vec![]);
        let p = f.param("value", None);
        let set = f.set_accessor(none(), "v", p, vec![]);
        vec![f.class_decl(none(), "C", vec![], None, vec![], vec![get, set])]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
    let class = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    let v = chain.symbols.shape(class).unwrap().members.get("v", DeclSpace::Value).unwrap();
    match chain.symbols.get(v).unwrap().kind {
        SymbolKind::Accessor { getter, setter } => {
            assert!(getter.is_some());
            assert!(setter.is_some());
        }
        ref other => panic!("expected accessor, got {other:?}"),
    }
}

#[test]
fn test_parameter_and_body_var_share_a_symbol() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let p = f.param("a", None);
        let body_var = f.var_stmt(none(), "a", None, None);
        vec![f.function_decl(none(), "f", vec![], vec![p], None, Some(vec![body_var]))]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_pieces_with_implicit_first_member_conflict() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let a = f.enum_member("A", None);
        vec![f.enum_decl(none(), "E", vec![a])]
    });
    add_file(&mut chain, "b.ts", |f| {
        let b = f.enum_member("B", None);
        vec![f.enum_decl(none(), "E", vec![b])]
    });
    bind(&mut chain);

    assert_eq!(error_codes(&chain), vec![diagnostic_codes::ENUM_MULTIPLE_FIRST_MEMBERS]);
    let e = lookup(&mut chain, "E", DeclSpace::Type).unwrap();
    assert_eq!(lookup(&mut chain, "E", DeclSpace::Value), Some(e));
    let shape = chain.symbols.shape(e).unwrap();
    assert!(shape.members.get("A", DeclSpace::Value).is_some());
    assert!(shape.members.get("B", DeclSpace::Value).is_some());
}

#[test]
fn test_enum_pieces_with_initializers_merge_cleanly() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let a = f.enum_member("A", None);
        let one = f.num(1.0);
        let b = f.enum_member("B", Some(one));
        vec![f.enum_decl(none(), "E", vec![a]), f.enum_decl(none(), "E", vec![b])]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
}

// =============================================================================
// Duplicates
// =============================================================================

#[test]
fn test_duplicate_class_reports_and_mints_fresh_symbol() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| vec![f.class_decl(none(), "C", vec![], None, vec![], vec![])]);
    add_file(&mut chain, "b.ts", |f| vec![f.class_decl(none(), "C", vec![], None, vec![], vec![])]);
    bind(&mut chain);

    let diagnostics = chain.binder_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::DUPLICATE_IDENTIFIER);
    assert_eq!(diagnostics[0].file, "b.ts");
    assert_eq!(diagnostics[0].length, 1);

    let registered = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    assert_eq!(chain.symbols.get(registered).unwrap().declarations.len(), 1);
    let duplicates = chain
        .symbols
        .iter()
        .filter(|s| s.flags.contains(pullc_binder::SymbolFlags::DUPLICATE))
        .count();
    assert_eq!(duplicates, 1);
}

#[test]
fn test_variable_conflicting_with_function_is_duplicate() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        vec![
            f.function_decl(none(), "f", vec![], vec![], None, Some(vec![])),
            f.var_stmt(none(), "f", None, None),
        ]
    });
    bind(&mut chain);

    assert_eq!(error_codes(&chain), vec![diagnostic_codes::DUPLICATE_IDENTIFIER]);
}

#[test]
fn test_duplicate_property_and_parameter() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let p1 = f.property_decl(none(), "p", None, None);
        let p2 = f.property_decl(none(), "p", None, None);
        let a1 = f.param("a", None);
        let a2 = f.param("a", None);
        let m = f.method_decl(none(), "m", vec![], vec![a1, a2], None, Some(vec![]));
        vec![f.class_decl(none(), "C", vec![], None, vec![], vec![p1, p2, m])]
    });
    bind(&mut chain);

    assert_eq!(
        error_codes(&chain),
        vec![diagnostic_codes::DUPLICATE_IDENTIFIER, diagnostic_codes::DUPLICATE_IDENTIFIER]
    );
}

#[test]
fn test_static_and_instance_members_live_in_different_tables() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let instance = f.property_decl(none(), "p", None, None);
        let stat = f.property_decl(ModifierFlags::STATIC, "p", None, None);
        vec![f.class_decl(none(), "C", vec![], None, vec![], vec![instance, stat])]
    });
    bind(&mut chain);

    assert!(error_codes(&chain).is_empty());
    let class = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    let shape = chain.symbols.shape(class).unwrap();
    assert!(shape.members.get("p", DeclSpace::Value).is_some());
    let ctor = shape.associated;
    assert!(chain.symbols.shape(ctor).unwrap().members.get("p", DeclSpace::Value).is_some());
}

// =============================================================================
// Constructors
// =============================================================================

#[test]
fn test_class_without_constructor_gets_default_construct_signature() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let t = f.type_param("T", None);
        vec![f.class_decl(none(), "C", vec![t], None, vec![], vec![])]
    });
    bind(&mut chain);

    let class = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    let class_shape = chain.symbols.shape(class).unwrap();
    let ctor = class_shape.associated;
    let class_type_params = class_shape.type_parameters.clone();
    let ctor_shape = chain.symbols.shape(ctor).unwrap();
    assert!(ctor_shape.has_default_constructor);
    assert_eq!(ctor_shape.associated, class);
    assert_eq!(ctor_shape.construct_signatures.len(), 1);
    let sig = chain.symbols.signature(ctor_shape.construct_signatures[0]).unwrap();
    assert_eq!(sig.kind, SignatureKind::Construct);
    assert_eq!(sig.return_type, class);
    assert!(sig.parameters.is_empty());
    assert_eq!(sig.type_parameters, class_type_params);
}

#[test]
fn test_declared_constructor_replaces_default() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let n = f.number_type();
        let x = f.param("x", Some(n));
        let ctor = f.constructor(none(), vec![x], Some(vec![]));
        vec![f.class_decl(none(), "C", vec![], None, vec![], vec![ctor])]
    });
    bind(&mut chain);

    let class = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    let ctor = chain.symbols.shape(class).unwrap().associated;
    let ctor_shape = chain.symbols.shape(ctor).unwrap();
    assert!(!ctor_shape.has_default_constructor);
    assert_eq!(ctor_shape.construct_signatures.len(), 1);
    let sig = chain.symbols.signature(ctor_shape.construct_signatures[0]).unwrap();
    assert_eq!(sig.parameters.len(), 1);
    assert!(sig.is_definition);
}

// =============================================================================
// Idempotence and dispatch
// =============================================================================

#[test]
fn test_binding_twice_is_a_no_op() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let member = f.property_sig("a", false, None);
        let i = f.interface_decl(none(), "I", vec![], vec![], vec![member]);
        let c = f.class_decl(none(), "C", vec![], None, vec![], vec![]);
        vec![i, c, f.class_decl(none(), "C", vec![], None, vec![], vec![])]
    });
    bind(&mut chain);
    let symbols = chain.symbols.len();
    let diagnostics = error_codes(&chain);

    bind(&mut chain);
    assert_eq!(chain.symbols.len(), symbols);
    assert_eq!(error_codes(&chain), diagnostics);
}

#[test]
#[should_panic(expected = "unrecognized decl kind")]
fn test_dispatcher_rejects_parameter_decls() {
    let mut chain = SemanticInfoChain::new();
    let unit = add_file(&mut chain, "a.ts", |f| {
        let p = f.param("a", None);
        vec![f.function_decl(none(), "f", vec![], vec![p], None, Some(vec![]))]
    });
    let script = chain.unit(unit).unwrap().script_decl;
    let function = chain.decls.children(script)[0];
    let parameter = chain.decls.children(function)[0];
    BinderState::new(&mut chain, BinderOptions::default()).bind_decl(parameter);
}

// =============================================================================
// Rebinding
// =============================================================================

#[test]
fn test_rebind_removes_deleted_declarations() {
    let mut chain = SemanticInfoChain::new();
    let unit = add_file(&mut chain, "a.ts", |f| {
        vec![f.var_stmt(none(), "x", None, None), f.var_stmt(none(), "y", None, None)]
    });
    bind(&mut chain);
    assert!(lookup(&mut chain, "y", DeclSpace::Value).is_some());

    replace_file(&mut chain, unit, |f| vec![f.var_stmt(none(), "x", None, None)]);
    assert!(lookup(&mut chain, "x", DeclSpace::Value).is_some());
    assert!(lookup(&mut chain, "y", DeclSpace::Value).is_none());
}

#[test]
fn test_rebind_keeps_symbol_identity_for_surviving_names() {
    let mut chain = SemanticInfoChain::new();
    let unit = add_file(&mut chain, "a.ts", |f| {
        vec![f.class_decl(none(), "C", vec![], None, vec![], vec![])]
    });
    bind(&mut chain);
    let before = lookup(&mut chain, "C", DeclSpace::Type).unwrap();

    replace_file(&mut chain, unit, |f| {
        let p = f.property_decl(none(), "p", None, None);
        vec![f.class_decl(none(), "C", vec![], None, vec![], vec![p])]
    });
    let after = lookup(&mut chain, "C", DeclSpace::Type).unwrap();
    assert_eq!(before, after);
    let sym = chain.symbols.get(after).unwrap();
    assert_eq!(sym.declarations.len(), 1);
    assert!(sym.shape().unwrap().members.get("p", DeclSpace::Value).is_some());
    let ctor = sym.shape().unwrap().associated;
    assert_eq!(chain.symbols.shape(ctor).unwrap().construct_signatures.len(), 1);
}

#[test]
fn test_rebind_drops_cross_unit_declaration_only_from_edited_unit() {
    let mut chain = SemanticInfoChain::new();
    let a = add_file(&mut chain, "a.ts", |f| {
        let m = f.property_sig("fromA", false, None);
        vec![f.interface_decl(none(), "I", vec![], vec![], vec![m])]
    });
    add_file(&mut chain, "b.ts", |f| {
        let m = f.property_sig("fromB", false, None);
        vec![f.interface_decl(none(), "I", vec![], vec![], vec![m])]
    });
    bind(&mut chain);

    replace_file(&mut chain, a, |_| vec![]);
    let iface = lookup(&mut chain, "I", DeclSpace::Type).unwrap();
    let sym = chain.symbols.get(iface).unwrap();
    assert_eq!(sym.declarations.len(), 1);
    let members = &sym.shape().unwrap().members;
    assert!(members.get("fromA", DeclSpace::Value).is_none());
    assert!(members.get("fromB", DeclSpace::Value).is_some());
}

#[test]
fn test_rebind_changing_kind_creates_new_symbol() {
    let mut chain = SemanticInfoChain::new();
    let unit = add_file(&mut chain, "a.ts", |f| vec![f.var_stmt(none(), "x", None, None)]);
    bind(&mut chain);
    let before = lookup(&mut chain, "x", DeclSpace::Value).unwrap();

    replace_file(&mut chain, unit, |f| {
        vec![f.function_decl(none(), "x", vec![], vec![], None, Some(vec![]))]
    });
    let after = lookup(&mut chain, "x", DeclSpace::Value).unwrap();
    assert_ne!(before, after);
    assert!(matches!(chain.symbols.get(after).unwrap().kind, SymbolKind::Function));
    assert!(error_codes(&chain).is_empty());
}

#[test]
fn test_rebind_promotes_duplicate_whose_partner_was_removed() {
    let mut chain = SemanticInfoChain::new();
    let a = add_file(&mut chain, "a.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])]);
    let b = add_file(&mut chain, "b.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])]);
    bind(&mut chain);
    assert_eq!(error_codes(&chain), vec![diagnostic_codes::DUPLICATE_IDENTIFIER]);
    assert_eq!(chain.unit(b).unwrap().diagnostics().len(), 1);

    replace_file(&mut chain, a, |f| vec![f.class_decl(none(), "Z", vec![], None, vec![], vec![])]);
    assert!(error_codes(&chain).is_empty());
    let class = lookup(&mut chain, "A", DeclSpace::Type).unwrap();
    let sym = chain.symbols.get(class).unwrap();
    assert!(!sym.flags.contains(SymbolFlags::DUPLICATE));
    assert_eq!(sym.declarations.len(), 1);
    assert_eq!(chain.decls.get(sym.declarations[0]).unwrap().unit, b);
    assert_eq!(lookup(&mut chain, "A", DeclSpace::Value), Some(class));
}

#[test]
fn test_rebind_keeps_duplicate_of_surviving_declaration() {
    let mut chain = SemanticInfoChain::new();
    let a = add_file(&mut chain, "a.ts", |f| {
        let first = f.function_decl(none(), "f", vec![], vec![], None, Some(vec![]));
        vec![first, f.var_stmt(none(), "extra", None, None)]
    });
    let b = add_file(&mut chain, "b.ts", |f| {
        vec![f.function_decl(none(), "f", vec![], vec![], None, Some(vec![]))]
    });
    bind(&mut chain);
    assert_eq!(error_codes(&chain), vec![diagnostic_codes::DUPLICATE_FUNCTION_IMPLEMENTATION]);

    replace_file(&mut chain, a, |f| {
        vec![f.function_decl(none(), "f", vec![], vec![], None, Some(vec![]))]
    });
    assert!(chain.unit(a).unwrap().diagnostics().is_empty());
    let codes: Vec<u32> = chain.unit(b).unwrap().diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::DUPLICATE_FUNCTION_IMPLEMENTATION]);
}

#[test]
fn test_instantiations_survive_resolution_reset() {
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "a.ts", |f| {
        let t = f.type_param("T", None);
        vec![f.class_decl(none(), "Box", vec![t], None, vec![], vec![])]
    });
    bind(&mut chain);
    let class = lookup(&mut chain, "Box", DeclSpace::Type).unwrap();
    let t = chain.symbols.shape(class).unwrap().type_parameters[0];
    let string = chain.primitives.string;

    let first = chain.instantiation(class, vec![(t, string)]);
    let allocated = chain.symbols.len();
    chain.invalidate_resolutions();
    let second = chain.instantiation(class, vec![(t, string)]);
    assert_eq!(first, second);
    assert_eq!(chain.symbols.len(), allocated);

    let number = chain.primitives.number;
    assert_ne!(chain.instantiation(class, vec![(t, number)]), first);
}
