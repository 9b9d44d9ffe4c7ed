//! `Program`: the driver that owns a semantic info chain and runs the
//! collect → bind → check pipeline over it, including incremental updates
//! of a single unit.

use std::sync::Arc;

use pullc_binder::{
    BinderOptions, BinderState, DeclSpace, SemanticInfoChain, UnitId, collect_unit_decls, rebind_unit,
};
use pullc_checker::{CheckerOptions, PullTypeResolver, check_program};
use pullc_common::Diagnostic;
use pullc_syntax::{NodeArena, NodeFactory, NodeIndex};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Misuse of the driver. Problems in the program being checked are
/// diagnostics, never errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("unit '{0}' is already part of the program")]
    DuplicateUnit(String),
    #[error("unit '{0}' is not part of the program")]
    UnknownUnit(String),
    #[error("program must be bound before it is checked")]
    NotBound,
}

pub type Result<T> = std::result::Result<T, ProgramError>;

/// Binder and checker configuration.
#[derive(Clone, Debug, Default)]
pub struct ProgramOptions {
    pub binder: BinderOptions,
    pub checker: CheckerOptions,
}

pub struct Program {
    chain: SemanticInfoChain,
    options: ProgramOptions,
    /// Every collected unit has been bound.
    bound: bool,
    /// Checker diagnostics of the last check pass.
    check_diagnostics: Vec<(UnitId, Diagnostic)>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new(ProgramOptions::default())
    }
}

impl Program {
    pub fn new(options: ProgramOptions) -> Self {
        Self {
            chain: SemanticInfoChain::new(),
            options,
            bound: false,
            check_diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    pub fn chain(&self) -> &SemanticInfoChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut SemanticInfoChain {
        &mut self.chain
    }

    pub fn unit_id(&self, path: &str) -> Result<UnitId> {
        self.chain
            .unit_by_path(path)
            .ok_or_else(|| ProgramError::UnknownUnit(path.to_string()))
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Add a unit and collect its decls. Binding is deferred to `bind`.
    #[instrument(level = "debug", skip(self, arena))]
    pub fn add_unit(&mut self, path: &str, arena: NodeArena, root: NodeIndex) -> Result<UnitId> {
        if self.chain.unit_by_path(path).is_some() {
            return Err(ProgramError::DuplicateUnit(path.to_string()));
        }
        let unit = self.chain.add_unit(path, Arc::new(arena), root);
        collect_unit_decls(&mut self.chain, unit);
        self.bound = false;
        self.check_diagnostics.clear();
        Ok(unit)
    }

    /// `add_unit` over a tree produced by `build`.
    pub fn add_unit_with(
        &mut self,
        path: &str,
        build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>,
    ) -> Result<UnitId> {
        let (arena, root) = build_tree(path, build);
        self.add_unit(path, arena, root)
    }

    /// Replace the tree of an existing unit. When the program is bound, the
    /// unit is rebound against the pre-edit watermark and every resolution
    /// is invalidated. Units holding binder diagnostics and later units
    /// sharing a top-level name with the edited one are rebound in the same
    /// pass; the rest keep their decls and symbols.
    #[instrument(level = "debug", skip(self, arena))]
    pub fn update_unit(&mut self, path: &str, arena: NodeArena, root: NodeIndex) -> Result<UnitId> {
        let unit = self.unit_id(path)?;
        self.check_diagnostics.clear();
        if self.bound {
            rebind_unit(&mut self.chain, &self.options.binder, unit, Arc::new(arena), root);
            self.chain.invalidate_resolutions();
            debug!(unit = unit.0, "unit rebound");
        } else {
            if let Some(semantic_unit) = self.chain.unit_mut(unit) {
                semantic_unit.reset(Arc::new(arena), root);
            }
            collect_unit_decls(&mut self.chain, unit);
        }
        Ok(unit)
    }

    /// `update_unit` over a tree produced by `build`.
    pub fn update_unit_with(
        &mut self,
        path: &str,
        build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>,
    ) -> Result<UnitId> {
        let (arena, root) = build_tree(path, build);
        self.update_unit(path, arena, root)
    }

    // =========================================================================
    // Passes
    // =========================================================================

    /// Bind every unit. Decls bound by an earlier pass are skipped.
    #[instrument(level = "debug", skip(self))]
    pub fn bind(&mut self) {
        BinderState::new(&mut self.chain, self.options.binder.clone()).bind_all();
        self.bound = true;
        info!(
            units = self.chain.units().len(),
            symbols = self.chain.symbols.len(),
            "program bound"
        );
    }

    /// Run a fresh check pass over every unit and return all diagnostics,
    /// binder diagnostics first.
    #[instrument(level = "debug", skip(self))]
    pub fn check(&mut self) -> Result<Vec<Diagnostic>> {
        if !self.bound {
            return Err(ProgramError::NotBound);
        }
        self.chain.invalidate_resolutions();
        self.check_diagnostics = check_program(&mut self.chain, &self.options.checker);
        info!(diagnostics = self.check_diagnostics.len(), "program checked");
        Ok(self.diagnostics())
    }

    /// Bind when needed, then check.
    pub fn bind_and_check(&mut self) -> Vec<Diagnostic> {
        if !self.bound {
            self.bind();
        }
        self.check().unwrap_or_default()
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Binder diagnostics of every unit followed by the last check pass.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.chain.binder_diagnostics();
        all.extend(self.check_diagnostics.iter().map(|(_, d)| d.clone()));
        all
    }

    /// Binder and checker diagnostics posted to one unit.
    pub fn unit_diagnostics(&self, path: &str) -> Result<Vec<Diagnostic>> {
        let unit = self.unit_id(path)?;
        let mut diagnostics: Vec<Diagnostic> = self
            .chain
            .unit(unit)
            .map(|u| u.diagnostics().to_vec())
            .unwrap_or_default();
        diagnostics.extend(
            self.check_diagnostics
                .iter()
                .filter(|(owner, _)| *owner == unit)
                .map(|(_, d)| d.clone()),
        );
        Ok(diagnostics)
    }

    /// Display text of the type of the value named by a dotted path, e.g.
    /// `M.x`.
    pub fn type_of_value(&mut self, dotted: &str) -> Result<Option<String>> {
        if !self.bound {
            return Err(ProgramError::NotBound);
        }
        let path: Vec<String> = dotted.split('.').map(str::to_string).collect();
        let Some(symbol) = self.chain.find_symbol(&path, DeclSpace::Value) else {
            return Ok(None);
        };
        let mut resolver = PullTypeResolver::new(&mut self.chain);
        let ty = resolver.type_of_symbol(symbol);
        Ok(Some(resolver.type_display(ty)))
    }
}

fn build_tree(path: &str, build: impl FnOnce(&mut NodeFactory) -> Vec<NodeIndex>) -> (NodeArena, NodeIndex) {
    let mut factory = NodeFactory::new();
    let statements = build(&mut factory);
    factory.finish(path, statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_unit_is_rejected() {
        let mut program = Program::default();
        program.add_unit_with("a.ts", |_| vec![]).unwrap();
        let err = program.add_unit_with("a.ts", |_| vec![]).unwrap_err();
        assert_eq!(err, ProgramError::DuplicateUnit("a.ts".to_string()));
        assert_eq!(err.to_string(), "unit 'a.ts' is already part of the program");
    }

    #[test]
    fn test_update_of_unknown_unit_is_rejected() {
        let mut program = Program::default();
        let err = program.update_unit_with("missing.ts", |_| vec![]).unwrap_err();
        assert_eq!(err, ProgramError::UnknownUnit("missing.ts".to_string()));
    }

    #[test]
    fn test_check_requires_bind() {
        let mut program = Program::default();
        program.add_unit_with("a.ts", |_| vec![]).unwrap();
        assert_eq!(program.check().unwrap_err(), ProgramError::NotBound);
        program.bind();
        assert!(program.check().unwrap().is_empty());
    }

    #[test]
    fn test_adding_a_unit_requires_another_bind() {
        let mut program = Program::default();
        program.add_unit_with("a.ts", |_| vec![]).unwrap();
        program.bind();
        program.add_unit_with("b.ts", |_| vec![]).unwrap();
        assert_eq!(program.check().unwrap_err(), ProgramError::NotBound);
    }
}
