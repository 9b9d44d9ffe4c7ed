//! Tests for NodeFactory layout and parent links.

use pullc_syntax::{BinaryOperator, ModifierFlags, NodeFactory, NodeIndex, SyntaxKind};

#[test]
fn leaves_get_distinct_non_overlapping_spans() {
    let mut f = NodeFactory::new();
    let a = f.ident("alpha");
    let b = f.ident("b");
    let arena = f.arena();
    let (a_pos, a_len) = arena.span(a);
    let (b_pos, _) = arena.span(b);
    assert_eq!(a_len, 5);
    assert!(b_pos > a_pos + a_len, "spans overlap: {a_pos}+{a_len} vs {b_pos}");
}

#[test]
fn compound_nodes_cover_their_children() {
    let mut f = NodeFactory::new();
    let left = f.num(1.0);
    let right = f.str_lit("x");
    let bin = f.binary(left, BinaryOperator::Plus, right);
    let arena = f.arena();
    let bin_node = arena.get(bin).unwrap();
    let left_node = arena.get(left).unwrap();
    let right_node = arena.get(right).unwrap();
    assert_eq!(bin_node.pos, left_node.pos);
    assert_eq!(bin_node.end, right_node.end);
    assert_eq!(left_node.parent, bin);
    assert_eq!(right_node.parent, bin);
}

#[test]
fn finish_wraps_statements_in_source_file() {
    let mut f = NodeFactory::new();
    let ty = f.number_type();
    let var = f.var_stmt(ModifierFlags::EXPORT, "x", Some(ty), None);
    let (arena, root) = f.finish("a.ts", vec![var]);
    let root_node = arena.get(root).unwrap();
    assert_eq!(root_node.kind, SyntaxKind::SourceFile);
    let file = arena.get_source_file(root_node).unwrap();
    assert_eq!(file.file_name, "a.ts");
    assert_eq!(file.statements.len(), 1);
    assert_eq!(arena.parent(var), root);
    assert!(arena.get(var).unwrap().has_modifier(ModifierFlags::EXPORT));
}

#[test]
fn dotted_type_reference_builds_qualified_name() {
    let mut f = NodeFactory::new();
    let r = f.type_ref("A.B.C", vec![]);
    let arena = f.arena();
    let data = arena.get_type_ref(arena.get(r).unwrap()).unwrap();
    assert_eq!(arena.kind(data.type_name), Some(SyntaxKind::QualifiedName));
    assert_eq!(arena.entity_name_text(data.type_name).as_deref(), Some("A.B.C"));
}

#[test]
fn overload_signature_has_no_body() {
    let mut f = NodeFactory::new();
    let p = f.param("x", None);
    let sig = f.function_decl(ModifierFlags::empty(), "foo", vec![], vec![p], None, None);
    let ret = f.return_stmt(None);
    let imp = f.function_decl(ModifierFlags::empty(), "foo", vec![], vec![], None, Some(vec![ret]));
    let arena = f.arena();
    let sig_data = arena.get_function(arena.get(sig).unwrap()).unwrap();
    let imp_data = arena.get_function(arena.get(imp).unwrap()).unwrap();
    assert!(sig_data.body.is_none());
    assert_eq!(arena.kind(imp_data.body), Some(SyntaxKind::Block));
    assert_eq!(arena.parent(ret), imp_data.body);
}

#[test]
fn property_access_exposes_entity_name_text() {
    let mut f = NodeFactory::new();
    let m = f.ident("M");
    let access = f.prop_access(m, "x");
    let paren = f.paren(access);
    let arena = f.arena();
    assert_eq!(arena.entity_name_text(access).as_deref(), Some("M.x"));
    assert_eq!(arena.skip_parentheses(paren), access);
}

#[test]
fn default_clause_and_missing_pieces_use_none() {
    let mut f = NodeFactory::new();
    let clause = f.case_clause(None, vec![]);
    let decl = f.var_decl("v", None, None);
    let arena = f.arena();
    assert_eq!(arena.kind(clause), Some(SyntaxKind::DefaultClause));
    let data = arena.get_variable_declaration(arena.get(decl).unwrap()).unwrap();
    assert_eq!(data.type_annotation, NodeIndex::NONE);
    assert_eq!(data.initializer, NodeIndex::NONE);
}
