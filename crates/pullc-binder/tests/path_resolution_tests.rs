//! Declaration path resolution: lexical paths, depth-ordered search and
//! cross-unit lookups.

use std::sync::Arc;

use pullc_binder::{
    BinderOptions, BinderState, DeclId, DeclKind, DeclSpace, SemanticInfoChain, SymbolKind, UnitId,
    collect_unit_decls,
};
use pullc_syntax::{ModifierFlags, NodeArena, NodeFactory, NodeIndex};

struct File {
    path: &'static str,
    arena: NodeArena,
    root: NodeIndex,
}

fn file(path: &'static str, build: fn(&mut NodeFactory) -> Vec<NodeIndex>) -> File {
    let mut f = NodeFactory::new();
    let statements = build(&mut f);
    let (arena, root) = f.finish(path, statements);
    File { path, arena, root }
}

fn bound_chain(files: Vec<File>) -> (SemanticInfoChain, Vec<UnitId>) {
    let mut chain = SemanticInfoChain::new();
    let mut units = Vec::new();
    for file in files {
        let unit = chain.add_unit(file.path, Arc::new(file.arena), file.root);
        collect_unit_decls(&mut chain, unit);
        units.push(unit);
    }
    BinderState::new(&mut chain, BinderOptions::default()).bind_all();
    (chain, units)
}

/// First decl named `name` of kind `kind` in a depth-first walk of `unit`.
fn find_decl(chain: &SemanticInfoChain, unit: UnitId, kind: DeclKind, name: &str) -> DeclId {
    let mut stack = vec![chain.unit(unit).unwrap().script_decl];
    while let Some(decl) = stack.pop() {
        let d = chain.decls.get(decl).unwrap();
        if d.kind == kind && d.name == name {
            return decl;
        }
        stack.extend(d.children.iter().rev().copied());
    }
    panic!("no {kind:?} decl named {name}");
}

fn path(dotted: &str) -> Vec<String> {
    dotted.split('.').map(str::to_string).collect()
}

fn shadowing_program(f: &mut NodeFactory) -> Vec<NodeIndex> {
    let top_x = f.var_stmt(ModifierFlags::empty(), "x", None, None);
    let module_x = f.var_stmt(ModifierFlags::empty(), "x", None, None);
    let inner_x = f.var_stmt(ModifierFlags::empty(), "x", None, None);
    let func = f.function_decl(ModifierFlags::empty(), "f", vec![], vec![], None, Some(vec![inner_x]));
    let module = f.module_decl(ModifierFlags::empty(), "M", vec![module_x, func]);
    vec![top_x, module]
}

#[test]
fn test_parent_path_skips_script_and_self() {
    let (mut chain, units) = bound_chain(vec![file("a.ts", shadowing_program)]);
    let func = find_decl(&chain, units[0], DeclKind::Function, "f");
    assert_eq!(chain.decls.parent_path(func), path("M"));
    let inner = chain.decls.children(func)[0];
    assert_eq!(chain.decls.parent_path(inner), path("M.f"));
    assert_eq!(chain.scope_path(func), path("M.f"));
}

#[test]
fn test_innermost_declaration_wins() {
    let (mut chain, units) = bound_chain(vec![file("a.ts", shadowing_program)]);
    let script = chain.unit(units[0]).unwrap().script_decl;
    let module = find_decl(&chain, units[0], DeclKind::Container, "M");
    let func = find_decl(&chain, units[0], DeclKind::Function, "f");

    let from_function = chain.find_symbol_in_context("x", DeclSpace::Value, func).unwrap();
    let from_module = chain.find_symbol_in_context("x", DeclSpace::Value, module).unwrap();
    let from_script = chain.find_symbol_in_context("x", DeclSpace::Value, script).unwrap();

    assert_ne!(from_function, from_module);
    assert_ne!(from_module, from_script);
    assert_ne!(from_function, from_script);

    let inner_decl = chain.decls.children(func)[0];
    assert_eq!(chain.decls.symbol(inner_decl), from_function);
    let owner = chain.symbols.get(from_module).unwrap().first_declaration();
    assert_eq!(chain.decls.parent(owner), module);
}

#[test]
fn test_missing_inner_name_falls_back_outward() {
    let (mut chain, units) = bound_chain(vec![file("a.ts", |f| {
        let top = f.var_stmt(ModifierFlags::empty(), "onlyTop", None, None);
        let func = f.function_decl(ModifierFlags::empty(), "f", vec![], vec![], None, Some(vec![]));
        let module = f.module_decl(ModifierFlags::empty(), "M", vec![func]);
        vec![top, module]
    })]);
    let func = find_decl(&chain, units[0], DeclKind::Function, "f");
    let found = chain.find_symbol_in_context("onlyTop", DeclSpace::Value, func).unwrap();
    assert_eq!(chain.find_symbol(&path("onlyTop"), DeclSpace::Value), Some(found));
    assert!(chain.find_symbol_in_context("absent", DeclSpace::Value, func).is_none());
}

#[test]
fn test_qualified_search_spans_module_pieces_in_other_units() {
    let (mut chain, units) = bound_chain(vec![
        file("a.ts", |f| {
            let a = f.var_stmt(ModifierFlags::EXPORT, "a", None, None);
            vec![f.module_decl(ModifierFlags::empty(), "M", vec![a])]
        }),
        file("b.ts", |f| {
            let b = f.var_stmt(ModifierFlags::EXPORT, "b", None, None);
            vec![f.module_decl(ModifierFlags::empty(), "M", vec![b])]
        }),
    ]);

    let decls = chain.find_decls(&path("M.a"), DeclSpace::Value);
    assert_eq!(decls.len(), 1);
    assert_eq!(chain.decls.get(decls[0]).unwrap().unit, units[0]);

    // Seen from the second piece, `a` resolves through the shared path.
    let module_b = find_decl(&chain, units[1], DeclKind::Container, "M");
    let a = chain.find_symbol_in_context("a", DeclSpace::Value, module_b).unwrap();
    assert_eq!(chain.decls.symbol(decls[0]), a);
}

#[test]
fn test_space_filter_separates_types_from_values() {
    let (mut chain, _) = bound_chain(vec![file("a.ts", |f| {
        let i = f.interface_decl(ModifierFlags::EXPORT, "I", vec![], vec![], vec![]);
        vec![f.module_decl(ModifierFlags::empty(), "M", vec![i])]
    })]);
    assert!(chain.find_symbol(&path("M.I"), DeclSpace::Type).is_some());
    assert!(chain.find_symbol(&path("M.I"), DeclSpace::Value).is_none());
}

#[test]
fn test_class_wins_over_merged_module_on_path_walk() {
    let (mut chain, _) = bound_chain(vec![file("a.ts", |f| {
        let i = f.interface_decl(ModifierFlags::EXPORT, "I", vec![], vec![], vec![]);
        let inner_module = f.module_decl(ModifierFlags::EXPORT, "C", vec![i]);
        let class = f.class_decl(ModifierFlags::EXPORT, "C", vec![], None, vec![], vec![]);
        vec![f.module_decl(ModifierFlags::empty(), "N", vec![inner_module, class])]
    })]);
    let found = chain.find_symbol(&path("N.C"), DeclSpace::Type).unwrap();
    assert!(matches!(chain.symbols.get(found).unwrap().kind, SymbolKind::Class(_)));
    let partner = chain.symbols.get(found).unwrap().merged;
    assert!(matches!(chain.symbols.get(partner).unwrap().kind, SymbolKind::Container(_)));
}
