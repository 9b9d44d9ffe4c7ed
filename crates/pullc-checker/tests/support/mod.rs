//! Fixtures shared by the checker test suites: build units with
//! `NodeFactory`, bind them and run a check pass.

#![allow(dead_code)]

use std::sync::Arc;

use pullc_binder::{BinderOptions, BinderState, DeclSpace, SemanticInfoChain, SymbolId, UnitId, collect_unit_decls};
use pullc_checker::{CheckerOptions, check_program};
use pullc_common::diagnostics::Diagnostic;
use pullc_syntax::{ModifierFlags, NodeFactory, NodeIndex};

pub fn add_file(
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

pub fn bind(chain: &mut SemanticInfoChain) {
    BinderState::new(chain, BinderOptions::default()).bind_all();
}

/// Bind and check a single file; returns the checker's diagnostics.
pub fn check_file(build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>) -> Vec<Diagnostic> {
    check_file_with(CheckerOptions::default(), build)
}

pub fn check_file_with(
    options: CheckerOptions,
    build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>,
) -> Vec<Diagnostic> {
    init_tracing();
    let mut chain = SemanticInfoChain::new();
    add_file(&mut chain, "test.ts", build);
    bind(&mut chain);
    check_program(&mut chain, &options).into_iter().map(|(_, d)| d).collect()
}

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

pub fn count(diagnostics: &[Diagnostic], code: u32) -> usize {
    diagnostics.iter().filter(|d| d.code == code).count()
}

pub fn lookup(chain: &mut SemanticInfoChain, dotted: &str, space: DeclSpace) -> Option<SymbolId> {
    let path: Vec<String> = dotted.split('.').map(str::to_string).collect();
    chain.find_symbol(&path, space)
}

pub fn none() -> ModifierFlags {
    ModifierFlags::empty()
}

pub fn export() -> ModifierFlags {
    ModifierFlags::EXPORT
}

pub fn declare() -> ModifierFlags {
    ModifierFlags::DECLARE
}

pub fn private() -> ModifierFlags {
    ModifierFlags::PRIVATE
}

pub fn public() -> ModifierFlags {
    ModifierFlags::PUBLIC
}

pub fn static_() -> ModifierFlags {
    ModifierFlags::STATIC
}

/// Route `tracing` output through the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
