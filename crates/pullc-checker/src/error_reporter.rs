//! Diagnostic collection for resolution and checking.
//!
//! Every diagnostic of a pass goes through one `DiagnosticSink`, which keeps
//! the first report for each (unit, span, code) and drops the rest. The
//! resolver may be asked about the same node many times; the sink is what
//! makes its diagnostics appear exactly once.

use pullc_binder::{DeclId, SymbolId, UnitId};
use pullc_common::diagnostics::{Diagnostic, diagnostic_codes};
use pullc_solver::{RelationKind, check_relation};
use pullc_syntax::NodeIndex;
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::state::CheckerState;

#[derive(Debug, Default)]
pub struct DiagnosticSink {
    seen: FxHashSet<(UnitId, u32, u32, u32)>,
    diagnostics: Vec<(UnitId, Diagnostic)>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `diagnostic` unless an equal-span report with the same code
    /// was already posted for `unit`. Returns whether it was recorded.
    pub fn post(&mut self, unit: UnitId, diagnostic: Diagnostic) -> bool {
        let key = (unit, diagnostic.start, diagnostic.length, diagnostic.code);
        if !self.seen.insert(key) {
            trace!(code = diagnostic.code, start = diagnostic.start, "duplicate diagnostic dropped");
            return false;
        }
        self.diagnostics.push((unit, diagnostic));
        true
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn for_unit(&self, unit: UnitId) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |(u, _)| *u == unit)
            .map(|(_, d)| d)
    }

    pub fn into_diagnostics(self) -> Vec<(UnitId, Diagnostic)> {
        self.diagnostics
    }
}

// =============================================================================
// Checker error helpers
// =============================================================================

impl CheckerState<'_> {
    pub(crate) fn error_at_node(&mut self, node: NodeIndex, code: u32, args: &[&str]) {
        let unit = self.unit;
        self.resolver.report(unit, node, code, args);
    }

    pub(crate) fn error_at_decl(&mut self, decl: DeclId, code: u32, args: &[&str]) {
        self.resolver.report_at_decl(decl, code, args);
    }

    pub(crate) fn error_elaborated(&mut self, node: NodeIndex, code: u32, args: &[&str], elaboration: &str) {
        let unit = self.unit;
        self.resolver.report_elaborated(unit, node, code, args, elaboration);
    }

    /// Check `source` against `target` for assignment and report 2322 at
    /// `node` with the relation's explanation. Returns whether it fits.
    pub(crate) fn check_type_assignable(&mut self, source: SymbolId, target: SymbolId, node: NodeIndex) -> bool {
        if self.resolver.is_error_or_any(source) || self.resolver.is_error_or_any(target) {
            return true;
        }
        let (related, info) = check_relation(&mut self.resolver, source, target, RelationKind::Assignable);
        if related {
            return true;
        }
        let elaboration = info.elaboration(&mut self.resolver);
        let source_text = self.resolver.type_display(source);
        let target_text = self.resolver.type_display(target);
        self.error_elaborated(
            node,
            diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
            &[&source_text, &target_text],
            &elaboration,
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullc_common::diagnostics::diagnostic_codes;

    #[test]
    fn same_span_and_code_is_reported_once() {
        let mut sink = DiagnosticSink::new();
        let unit = UnitId(0);
        let first = Diagnostic::from_code("a.ts", 4, 2, diagnostic_codes::CANNOT_FIND_NAME, &["x"]);
        assert!(sink.post(unit, first.clone()));
        assert!(!sink.post(unit, first.clone()));
        assert!(sink.post(UnitId(1), first));
        let other = Diagnostic::from_code("a.ts", 4, 2, diagnostic_codes::TYPE_IS_NOT_GENERIC, &["x"]);
        assert!(sink.post(unit, other));
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.for_unit(unit).count(), 2);
    }
}
