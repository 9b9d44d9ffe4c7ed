//! Incremental updates: `Program::update_unit` rebinds one unit against the
//! existing chain and the next check sees the new declarations.

use pullc::binder::{DeclSpace, SymbolFlags};
use pullc::common::diagnostics::diagnostic_codes;
use pullc::syntax::{ModifierFlags, NodeFactory, NodeIndex};
use pullc::{Diagnostic, Program};

fn none() -> ModifierFlags {
    ModifierFlags::empty()
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

/// `interface Point { x: number; <extra>: number }`
fn point(f: &mut NodeFactory, extra: &str) -> Vec<NodeIndex> {
    let n = f.number_type();
    let x = f.property_sig("x", false, Some(n));
    let n = f.number_type();
    let other = f.property_sig(extra, false, Some(n));
    vec![f.interface_decl(none(), "Point", vec![], vec![], vec![x, other])]
}

/// `var p: Point; var v = p.y;`
fn reader(f: &mut NodeFactory) -> Vec<NodeIndex> {
    let point = f.type_ref("Point", vec![]);
    let p = f.var_stmt(none(), "p", Some(point), None);
    let target = f.ident("p");
    let access = f.prop_access(target, "y");
    let v = f.var_stmt(none(), "v", None, Some(access));
    vec![p, v]
}

#[test]
fn test_fixing_a_unit_clears_its_diagnostics() {
    pullc::init_tracing();
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let n = f.number_type();
            let text = f.str_lit("s");
            vec![f.var_stmt(none(), "x", Some(n), Some(text))]
        })
        .unwrap();
    assert_eq!(codes(&program.bind_and_check()), vec![diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE]);

    program
        .update_unit_with("a.ts", |f| {
            let n = f.number_type();
            let one = f.num(1.0);
            vec![f.var_stmt(none(), "x", Some(n), Some(one))]
        })
        .unwrap();
    let diagnostics = program.check().unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_binder_diagnostics_are_replaced_on_update() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            vec![
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
            ]
        })
        .unwrap();
    assert_eq!(codes(&program.bind_and_check()), vec![diagnostic_codes::DUPLICATE_IDENTIFIER]);

    program
        .update_unit_with("a.ts", |f| {
            vec![
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
                f.class_decl(none(), "B", vec![], None, vec![], vec![]),
            ]
        })
        .unwrap();
    let diagnostics = program.check().unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_removing_first_declaration_clears_duplicate_in_other_unit() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    program
        .add_unit_with("b.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    program.bind_and_check();
    assert!(program.unit_diagnostics("a.ts").unwrap().is_empty());
    assert_eq!(
        codes(&program.unit_diagnostics("b.ts").unwrap()),
        vec![diagnostic_codes::DUPLICATE_IDENTIFIER]
    );

    program
        .update_unit_with("a.ts", |f| vec![f.class_decl(none(), "Z", vec![], None, vec![], vec![])])
        .unwrap();
    let diagnostics = program.check().unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert!(program.unit_diagnostics("b.ts").unwrap().is_empty());

    let chain = program.chain_mut();
    let a = chain.find_symbol(&["A".to_string()], DeclSpace::Type).unwrap();
    let a = chain.symbols.get(a).unwrap();
    assert!(!a.flags.contains(SymbolFlags::DUPLICATE));
    assert_eq!(a.declarations.len(), 1);
    assert_eq!(program.type_of_value("A").unwrap().as_deref(), Some("typeof A"));
}

#[test]
fn test_duplicate_in_other_unit_survives_unrelated_edit() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            vec![
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
                f.class_decl(none(), "B", vec![], None, vec![], vec![]),
            ]
        })
        .unwrap();
    program
        .add_unit_with("b.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    program.bind_and_check();

    program
        .update_unit_with("a.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    program.check().unwrap();
    assert!(program.unit_diagnostics("a.ts").unwrap().is_empty());
    let b = program.unit_diagnostics("b.ts").unwrap();
    assert_eq!(codes(&b), vec![diagnostic_codes::DUPLICATE_IDENTIFIER]);
    assert_eq!(b[0].arguments, vec!["A"]);
}

#[test]
fn test_new_conflict_is_reported_on_the_later_unit() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| vec![f.class_decl(none(), "Z", vec![], None, vec![], vec![])])
        .unwrap();
    program
        .add_unit_with("b.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    assert!(program.bind_and_check().is_empty());

    program
        .update_unit_with("a.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    program.check().unwrap();
    assert!(program.unit_diagnostics("a.ts").unwrap().is_empty());
    assert_eq!(
        codes(&program.unit_diagnostics("b.ts").unwrap()),
        vec![diagnostic_codes::DUPLICATE_IDENTIFIER]
    );
}

#[test]
fn test_editing_a_declaration_unit_reaches_its_users() {
    let mut program = Program::default();
    program.add_unit_with("point.ts", |f| point(f, "y")).unwrap();
    program.add_unit_with("reader.ts", reader).unwrap();
    assert!(program.bind_and_check().is_empty());
    assert_eq!(program.type_of_value("v").unwrap().as_deref(), Some("number"));

    program.update_unit_with("point.ts", |f| point(f, "z")).unwrap();
    program.check().unwrap();
    assert!(program.unit_diagnostics("point.ts").unwrap().is_empty());
    let reader = program.unit_diagnostics("reader.ts").unwrap();
    assert_eq!(codes(&reader), vec![diagnostic_codes::PROPERTY_DOES_NOT_EXIST_ON_TYPE]);
    assert_eq!(reader[0].arguments, vec!["y", "Point"]);

    program.update_unit_with("point.ts", |f| point(f, "y")).unwrap();
    assert!(program.check().unwrap().is_empty());
}

#[test]
fn test_type_of_value_follows_update() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let one = f.num(1.0);
            vec![f.var_stmt(none(), "x", None, Some(one))]
        })
        .unwrap();
    program.bind();
    assert_eq!(program.type_of_value("x").unwrap().as_deref(), Some("number"));

    program
        .update_unit_with("a.ts", |f| {
            let text = f.str_lit("s");
            vec![f.var_stmt(none(), "x", None, Some(text))]
        })
        .unwrap();
    assert_eq!(program.type_of_value("x").unwrap().as_deref(), Some("string"));
}

#[test]
fn test_update_keeps_symbols_of_surviving_declarations() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| vec![f.class_decl(none(), "C", vec![], None, vec![], vec![])])
        .unwrap();
    program.bind();
    let before = program.chain_mut().find_symbol(&["C".to_string()], DeclSpace::Type);

    program
        .update_unit_with("a.ts", |f| {
            let s = f.string_type();
            let name = f.property_decl(none(), "name", Some(s), None);
            vec![f.class_decl(none(), "C", vec![], None, vec![], vec![name])]
        })
        .unwrap();
    let after = program.chain_mut().find_symbol(&["C".to_string()], DeclSpace::Type);
    assert!(before.is_some());
    assert_eq!(before, after);
    assert_eq!(program.type_of_value("C").unwrap().as_deref(), Some("typeof C"));
}

#[test]
fn test_removed_declaration_is_no_longer_found() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let n = f.number_type();
            vec![f.var_stmt(none(), "gone", Some(n), None)]
        })
        .unwrap();
    program
        .add_unit_with("b.ts", |f| {
            let target = f.ident("gone");
            let one = f.num(1.0);
            let assignment = f.assign(target, one);
            vec![f.expr_stmt(assignment)]
        })
        .unwrap();
    assert!(program.bind_and_check().is_empty());

    program.update_unit_with("a.ts", |_| vec![]).unwrap();
    program.check().unwrap();
    let b = program.unit_diagnostics("b.ts").unwrap();
    assert_eq!(codes(&b), vec![diagnostic_codes::CANNOT_FIND_NAME]);
    assert_eq!(program.type_of_value("gone").unwrap(), None);
}

#[test]
fn test_update_before_bind_only_recollects() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| vec![f.var_stmt(none(), "x", None, None)])
        .unwrap();
    program.update_unit_with("a.ts", |f| vec![f.var_stmt(none(), "y", None, None)]).unwrap();
    program.bind();
    assert_eq!(program.type_of_value("x").unwrap(), None);
    assert_eq!(program.type_of_value("y").unwrap().as_deref(), Some("any"));
}
