//! End-to-end tests of the `Program` pipeline: collect, bind, resolve and
//! check units built with `NodeFactory`.

use pullc::binder::{DeclSpace, SymbolKind};
use pullc::common::diagnostics::diagnostic_codes;
use pullc::syntax::{ModifierFlags, NodeFactory, NodeIndex, SyntaxKind};
use pullc::{Diagnostic, Program, ProgramOptions};

fn none() -> ModifierFlags {
    ModifierFlags::empty()
}

fn check_one(build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>) -> Vec<Diagnostic> {
    pullc::init_tracing();
    let mut program = Program::default();
    program.add_unit_with("test.ts", build).unwrap();
    program.bind_and_check()
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_single_declaration_binds_one_symbol() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| vec![f.class_decl(none(), "A", vec![], None, vec![], vec![])])
        .unwrap();
    program.bind();

    let chain = program.chain_mut();
    let symbol = chain.find_symbol(&["A".to_string()], DeclSpace::Type).unwrap();
    let sym = chain.symbols.get(symbol).unwrap();
    assert_eq!(sym.declarations.len(), 1);
    let decl = chain.decls.get(sym.declarations[0]).unwrap();
    assert_eq!(decl.symbol, symbol);
}

#[test]
fn test_overloads_merge_into_one_symbol() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let n = f.number_type();
            let x = f.param("x", Some(n));
            let a = f.any_type();
            let y = f.param("x", Some(a));
            vec![
                f.function_decl(none(), "f", vec![], vec![x], None, None),
                f.function_decl(none(), "f", vec![], vec![y], None, Some(vec![])),
            ]
        })
        .unwrap();
    let diagnostics = program.bind_and_check();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let chain = program.chain_mut();
    let f = chain.find_symbol(&["f".to_string()], DeclSpace::Value).unwrap();
    let sym = chain.symbols.get(f).unwrap();
    assert!(matches!(sym.kind, SymbolKind::Function));
    let signatures = &chain.symbols.shape(sym.type_id).unwrap().call_signatures;
    assert_eq!(signatures.len(), 2);
}

#[test]
fn test_duplicate_class_is_reported_on_second_declaration() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            vec![
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
            ]
        })
        .unwrap();
    let diagnostics = program.bind_and_check();
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::DUPLICATE_IDENTIFIER]);
    assert_eq!(diagnostics[0].arguments, vec!["A"]);

    let first_name_start = {
        let chain = program.chain();
        let unit = chain.unit(program.unit_id("a.ts").unwrap()).unwrap();
        let script = chain.decls.get(unit.script_decl).unwrap();
        let first = chain.decls.get(script.children[0]).unwrap();
        unit.arena.span(first.name_node).0
    };
    assert!(diagnostics[0].start > first_name_start);
}

#[test]
fn test_assignability_of_variable_initializer() {
    let diagnostics = check_one(|f| {
        let n = f.number_type();
        let s = f.str_lit("s");
        vec![f.var_stmt(none(), "x", Some(n), Some(s))]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE]);
    assert_eq!(diagnostics[0].message_text, "Type 'string' is not assignable to type 'number'.");

    let diagnostics = check_one(|f| {
        let n = f.number_type();
        let one = f.num(1.0);
        vec![f.var_stmt(none(), "x", Some(n), Some(one))]
    });
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_inner_declaration_shadows_module_declaration() {
    let diagnostics = check_one(|f| {
        let text = f.str_lit("outer");
        let outer = f.var_stmt(none(), "x", None, Some(text));
        let one = f.num(1.0);
        let inner = f.var_stmt(none(), "x", None, Some(one));
        let x = f.ident("x");
        let ret = f.return_stmt(Some(x));
        let s = f.string_type();
        let function = f.function_decl(ModifierFlags::EXPORT, "f", vec![], vec![], Some(s), Some(vec![inner, ret]));
        vec![f.module_decl(none(), "M", vec![outer, function])]
    });
    // The inner `x` is a number, so returning it from a string function fails.
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE]);
}

#[test]
fn test_binding_twice_is_idempotent() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            vec![
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
                f.class_decl(none(), "A", vec![], None, vec![], vec![]),
            ]
        })
        .unwrap();
    program.bind();
    let symbols = program.chain().symbols.len();
    let first = program.check().unwrap();

    program.bind();
    let second = program.check().unwrap();
    assert_eq!(program.chain().symbols.len(), symbols);
    assert_eq!(first, second);
}

#[test]
fn test_super_call_must_come_first_until_moved() {
    fn unit(f: &mut NodeFactory, super_first: bool) -> Vec<NodeIndex> {
        let base = f.class_decl(none(), "B", vec![], None, vec![], vec![]);
        let one = f.num(1.0);
        let property = f.property_decl(none(), "x", None, Some(one));
        let two = f.num(2.0);
        let local = f.var_stmt(none(), "a", None, Some(two));
        let super_call = f.super_call_stmt(vec![]);
        let body = if super_first { vec![super_call, local] } else { vec![local, super_call] };
        let ctor = f.constructor(none(), vec![], Some(body));
        let extends = f.type_ref("B", vec![]);
        let derived = f.class_decl(none(), "D", vec![], Some(extends), vec![], vec![property, ctor]);
        vec![base, derived]
    }

    let mut program = Program::default();
    program.add_unit_with("a.ts", |f| unit(f, false)).unwrap();
    let diagnostics = program.bind_and_check();
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::SUPER_CALL_MUST_BE_FIRST_STATEMENT]);

    program.update_unit_with("a.ts", |f| unit(f, true)).unwrap();
    let diagnostics = program.check().unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_numeric_indexer_must_be_subtype_of_string_indexer() {
    let diagnostics = check_one(|f| {
        let s = f.string_type();
        let name = f.property_sig("name", false, Some(s));
        let animal = f.interface_decl(none(), "Animal", vec![], vec![], vec![name]);
        let s = f.string_type();
        let breed = f.property_sig("breed", false, Some(s));
        let animal_ref = f.type_ref("Animal", vec![]);
        let dog = f.interface_decl(none(), "Dog", vec![], vec![animal_ref], vec![breed]);
        let number_key = f.keyword_type(SyntaxKind::NumberKeyword);
        let animal_value = f.type_ref("Animal", vec![]);
        let numeric = f.index_sig("n", number_key, animal_value);
        let string_key = f.keyword_type(SyntaxKind::StringKeyword);
        let dog_value = f.type_ref("Dog", vec![]);
        let string = f.index_sig("s", string_key, dog_value);
        let indexed = f.interface_decl(none(), "Zoo", vec![], vec![], vec![numeric, string]);
        vec![animal, dog, indexed]
    });
    assert_eq!(codes(&diagnostics), vec![diagnostic_codes::NUMERIC_INDEX_NOT_SUBTYPE_OF_STRING_INDEX]);
    assert_eq!(diagnostics[0].arguments, vec!["Animal", "Dog"]);
}

#[test]
fn test_declarations_are_visible_across_units() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let n = f.number_type();
            vec![f.var_stmt(none(), "shared", Some(n), None)]
        })
        .unwrap();
    program
        .add_unit_with("b.ts", |f| {
            let target = f.ident("shared");
            let text = f.str_lit("s");
            let assignment = f.assign(target, text);
            vec![f.expr_stmt(assignment)]
        })
        .unwrap();
    program.bind_and_check();

    assert!(program.unit_diagnostics("a.ts").unwrap().is_empty());
    let b = program.unit_diagnostics("b.ts").unwrap();
    assert_eq!(codes(&b), vec![diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE]);
    assert_eq!(b[0].file, "b.ts");
}

#[test]
fn test_type_of_value_reports_inferred_types() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let one = f.num(1.0);
            let two = f.num(2.0);
            let array = f.array_lit(vec![one, two]);
            let xs = f.var_stmt(ModifierFlags::EXPORT, "xs", None, Some(array));
            vec![f.module_decl(none(), "M", vec![xs])]
        })
        .unwrap();
    program.bind();
    assert_eq!(program.type_of_value("M.xs").unwrap().as_deref(), Some("number[]"));
    assert_eq!(program.type_of_value("M.missing").unwrap(), None);
}

#[test]
fn test_implicit_any_follows_program_options() {
    let build = |f: &mut NodeFactory| vec![f.var_stmt(none(), "x", None, None)];

    let mut lenient = Program::default();
    lenient.add_unit_with("a.ts", build).unwrap();
    assert!(lenient.bind_and_check().is_empty());

    let mut options = ProgramOptions::default();
    options.checker.no_implicit_any = true;
    let mut strict = Program::new(options);
    strict.add_unit_with("a.ts", build).unwrap();
    assert_eq!(codes(&strict.bind_and_check()), vec![diagnostic_codes::VARIABLE_IMPLICITLY_HAS_ANY]);
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let diagnostics = check_one(|f| {
        let n = f.number_type();
        let s = f.str_lit("s");
        vec![f.var_stmt(none(), "x", Some(n), Some(s))]
    });
    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json[0]["code"], 2322);
    assert_eq!(json[0]["file"], "test.ts");
    assert_eq!(json[0]["arguments"], serde_json::json!(["string", "number"]));
}
