use pullc::common::diagnostics::diagnostic_codes;
use pullc::syntax::ModifierFlags;
use pullc::Program;

fn none() -> ModifierFlags {
    ModifierFlags::empty()
}

#[test]
fn test_variable_redeclaration_incompatible() {
    let mut program = Program::default();
    program
        .add_unit_with("test.ts", |f| {
            let n = f.number_type();
            let first = f.var_stmt(none(), "x", Some(n), None);
            let s = f.string_type();
            let second = f.var_stmt(none(), "x", Some(s), None);
            vec![first, second]
        })
        .unwrap();
    let diagnostics = program.bind_and_check();

    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert_eq!(diagnostics[0].code, diagnostic_codes::SUBSEQUENT_VARIABLE_DECLARATIONS_TYPE);
    assert_eq!(diagnostics[0].arguments, vec!["x", "number", "string"]);
    assert_eq!(
        diagnostics[0].message_text,
        "Subsequent variable declarations must have the same type. Variable 'x' must be of type 'number', but here has type 'string'."
    );
}

#[test]
fn test_variable_redeclaration_compatible() {
    let mut program = Program::default();
    program
        .add_unit_with("test.ts", |f| {
            let n = f.number_type();
            let first = f.var_stmt(none(), "x", Some(n), None);
            let one = f.num(1.0);
            let second = f.var_stmt(none(), "x", None, Some(one));
            vec![first, second]
        })
        .unwrap();
    let diagnostics = program.bind_and_check();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_variable_redeclaration_uses_widened_initializer() {
    let mut program = Program::default();
    program
        .add_unit_with("test.ts", |f| {
            let n = f.number_type();
            let first = f.var_stmt(none(), "x", Some(n), None);
            let text = f.str_lit("s");
            let second = f.var_stmt(none(), "x", None, Some(text));
            vec![first, second]
        })
        .unwrap();
    let diagnostics = program.bind_and_check();
    let codes: Vec<u32> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::SUBSEQUENT_VARIABLE_DECLARATIONS_TYPE]);
    assert_eq!(diagnostics[0].arguments, vec!["x", "number", "string"]);
}

#[test]
fn test_variable_redeclaration_across_units() {
    let mut program = Program::default();
    program
        .add_unit_with("a.ts", |f| {
            let n = f.number_type();
            vec![f.var_stmt(none(), "x", Some(n), None)]
        })
        .unwrap();
    program
        .add_unit_with("b.ts", |f| {
            let s = f.string_type();
            vec![f.var_stmt(none(), "x", Some(s), None)]
        })
        .unwrap();
    program.bind_and_check();

    assert!(program.unit_diagnostics("a.ts").unwrap().is_empty());
    let b = program.unit_diagnostics("b.ts").unwrap();
    assert_eq!(b.len(), 1, "{b:?}");
    assert_eq!(b[0].code, diagnostic_codes::SUBSEQUENT_VARIABLE_DECLARATIONS_TYPE);
    assert_eq!(b[0].file, "b.ts");
}

#[test]
fn test_variable_redeclaration_inside_module() {
    let mut program = Program::default();
    program
        .add_unit_with("test.ts", |f| {
            let b = f.boolean_type();
            let first = f.var_stmt(none(), "flag", Some(b), None);
            let b = f.boolean_type();
            let second = f.var_stmt(none(), "flag", Some(b), None);
            let n = f.number_type();
            let third = f.var_stmt(none(), "flag", Some(n), None);
            vec![f.module_decl(none(), "M", vec![first, second, third])]
        })
        .unwrap();
    let diagnostics = program.bind_and_check();
    let codes: Vec<u32> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![diagnostic_codes::SUBSEQUENT_VARIABLE_DECLARATIONS_TYPE]);
    assert_eq!(diagnostics[0].arguments, vec!["flag", "boolean", "number"]);
}
