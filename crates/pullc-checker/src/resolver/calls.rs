//! Call and `new` resolution: overload selection and type-argument
//! inference.
//!
//! Arguments that are not function expressions are typed first and drive
//! inference; function expression arguments are then contextually typed by
//! the instantiated parameter types and take part in a second inference
//! round. The first applicable overload in declaration order wins.

use pullc_binder::{SignatureKind, SymbolId, SymbolKind, UnitId};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_solver::{
    InferenceContext, RelationKind, SignatureInfo, TypeResolver, TypeSubstitution, check_relation,
    instantiate_signature, instantiate_type, is_assignable_to,
};
use pullc_syntax::{NodeIndex, SyntaxKind};
use tracing::{debug, trace};

use super::PullTypeResolver;

/// Outcome of matching the arguments against one candidate signature.
enum Applicability {
    Applicable(SignatureInfo),
    /// First argument that does not fit, with its type and the parameter's.
    ArgumentMismatch { index: usize, argument: SymbolId, parameter: SymbolId },
}

impl PullTypeResolver<'_> {
    /// Type of a call (`is_new == false`) or `new` expression.
    pub(crate) fn resolve_call(&mut self, unit: UnitId, node: NodeIndex, is_new: bool) -> SymbolId {
        let Some(arena) = self.arena(unit) else {
            return self.primitives.error;
        };
        let Some(call) = arena.get(node).and_then(|n| arena.get_call_expr(n)) else {
            return self.primitives.error;
        };
        let callee = call.expression;
        let arguments: Vec<NodeIndex> = call.arguments.iter().collect();
        let type_argument_nodes: Vec<NodeIndex> = call.type_arguments.iter().collect();
        let type_arguments: Vec<SymbolId> = type_argument_nodes
            .iter()
            .map(|&t| self.resolve_type_node(unit, t))
            .collect();

        if !is_new && arena.kind(callee) == Some(SyntaxKind::SuperKeyword) {
            let signatures = self.super_constructor_signatures(unit, callee);
            if !signatures.is_empty() {
                self.choose_overload(unit, node, &signatures, &arguments, &type_arguments);
            } else {
                self.resolve_arguments_without_context(unit, &arguments);
            }
            return self.primitives.void;
        }

        let callee_type = self.resolve_expression(unit, callee, None);
        if self.is_error_or_any(callee_type) {
            self.resolve_arguments_without_context(unit, &arguments);
            return if callee_type == self.primitives.error { self.primitives.error } else { self.primitives.any };
        }
        let apparent = self.apparent_type(callee_type);
        let kind = if is_new { SignatureKind::Construct } else { SignatureKind::Call };
        let signatures = self.signatures_of(apparent, kind);
        if signatures.is_empty() {
            if is_new && !self.signatures_of(apparent, SignatureKind::Call).is_empty() {
                // `new` on a plain function produces `any`.
                let calls = self.signatures_of(apparent, SignatureKind::Call);
                self.choose_overload(unit, node, &calls, &arguments, &type_arguments);
                return self.primitives.any;
            }
            let code = if is_new {
                diagnostic_codes::EXPRESSION_NOT_CONSTRUCTABLE
            } else {
                diagnostic_codes::EXPRESSION_NOT_CALLABLE
            };
            self.report(unit, node, code, &[]);
            self.resolve_arguments_without_context(unit, &arguments);
            return self.primitives.error;
        }
        match self.choose_overload(unit, node, &signatures, &arguments, &type_arguments) {
            Some(signature) => signature.return_type,
            None => self.primitives.error,
        }
    }

    /// Construct signatures of the base class, as seen through `super`.
    pub(crate) fn super_constructor_signatures(&mut self, unit: UnitId, node: NodeIndex) -> Vec<SignatureInfo> {
        let Some(base) = self.enclosing_base_class(unit, node) else {
            return Vec::new();
        };
        let target = self.generic_target(base);
        let base_ctor = self.value_type_of(target);
        if base_ctor.is_none() {
            return Vec::new();
        }
        let mapping = match self.symbol(base).map(|s| &s.kind) {
            Some(SymbolKind::Instantiation { mapping, .. }) => mapping.clone(),
            _ => Vec::new(),
        };
        let substitution = TypeSubstitution::from_pairs(&mapping);
        let signatures = self.signatures_of(base_ctor, SignatureKind::Construct);
        signatures
            .iter()
            .map(|s| {
                let mut signature = instantiate_signature(self, s, &substitution);
                // Base type parameters are fixed by the extends clause.
                signature.type_parameters.clear();
                signature
            })
            .collect()
    }

    fn resolve_arguments_without_context(&mut self, unit: UnitId, arguments: &[NodeIndex]) {
        for &argument in arguments {
            self.resolve_expression(unit, argument, None);
        }
    }

    fn is_function_argument(&self, unit: UnitId, argument: NodeIndex) -> bool {
        self.arena(unit).is_some_and(|arena| {
            let inner = arena.skip_parentheses(argument);
            matches!(
                arena.kind(inner),
                Some(SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction)
            )
        })
    }

    /// Pick the first applicable signature, reporting why none applies
    /// otherwise.
    fn choose_overload(
        &mut self,
        unit: UnitId,
        node: NodeIndex,
        signatures: &[SignatureInfo],
        arguments: &[NodeIndex],
        type_arguments: &[SymbolId],
    ) -> Option<SignatureInfo> {
        let candidates: Vec<&SignatureInfo> = signatures
            .iter()
            .filter(|s| s.accepts_argument_count(arguments.len()))
            .filter(|s| type_arguments.is_empty() || s.type_parameters.len() == type_arguments.len())
            .collect();
        if candidates.is_empty() {
            self.resolve_arguments_without_context(unit, arguments);
            self.report(unit, node, diagnostic_codes::SUPPLIED_PARAMETERS_DO_NOT_MATCH, &[]);
            return None;
        }

        // Non-function arguments see the parameter type only when there is
        // a single candidate to take it from.
        let single = (candidates.len() == 1).then(|| candidates[0].clone());
        for (index, &argument) in arguments.iter().enumerate() {
            if self.is_function_argument(unit, argument) {
                continue;
            }
            let contextual = single
                .as_ref()
                .filter(|s| s.type_parameters.is_empty())
                .and_then(|s| s.parameter_type_at(index));
            self.resolve_expression(unit, argument, contextual);
        }

        let mut first_mismatch = None;
        for candidate in &candidates {
            match self.applicability(unit, candidate, arguments, type_arguments) {
                Applicability::Applicable(signature) => {
                    trace!(signature = signature.symbol.0, "overload selected");
                    return Some(signature);
                }
                mismatch @ Applicability::ArgumentMismatch { .. } => {
                    if first_mismatch.is_none() {
                        first_mismatch = Some(mismatch);
                    }
                }
            }
        }

        debug!(candidates = candidates.len(), "no applicable overload");
        match first_mismatch {
            Some(Applicability::ArgumentMismatch { index, argument, parameter }) if candidates.len() == 1 => {
                let (_, info) = check_relation(self, argument, parameter, RelationKind::Assignable);
                let elaboration = info.elaboration(self);
                let argument_text = self.type_display(argument);
                let parameter_text = self.type_display(parameter);
                self.report_elaborated(
                    unit,
                    arguments[index],
                    diagnostic_codes::ARGUMENT_NOT_ASSIGNABLE_TO_PARAMETER,
                    &[&argument_text, &parameter_text],
                    &elaboration,
                );
            }
            _ => self.report(unit, node, diagnostic_codes::SUPPLIED_PARAMETERS_DO_NOT_MATCH, &[]),
        }
        None
    }

    fn applicability(
        &mut self,
        unit: UnitId,
        candidate: &SignatureInfo,
        arguments: &[NodeIndex],
        type_arguments: &[SymbolId],
    ) -> Applicability {
        let signature = if candidate.type_parameters.is_empty() {
            candidate.clone()
        } else if !type_arguments.is_empty() {
            let substitution =
                TypeSubstitution::from_args(&candidate.type_parameters, type_arguments, self.primitives.any);
            instantiate_signature(self, candidate, &substitution)
        } else {
            self.infer_signature(unit, candidate, arguments)
        };

        for (index, &argument) in arguments.iter().enumerate() {
            let Some(parameter) = signature.parameter_type_at(index) else {
                continue;
            };
            let argument_type = self.resolve_expression(unit, argument, Some(parameter));
            if !is_assignable_to(self, argument_type, parameter) {
                return Applicability::ArgumentMismatch {
                    index,
                    argument: argument_type,
                    parameter,
                };
            }
        }
        Applicability::Applicable(signature)
    }

    /// Instantiate a generic signature with type arguments inferred from
    /// the call's arguments.
    fn infer_signature(&mut self, unit: UnitId, candidate: &SignatureInfo, arguments: &[NodeIndex]) -> SignatureInfo {
        let mut context = InferenceContext::new(&candidate.type_parameters);
        let mut deferred = Vec::new();
        for (index, &argument) in arguments.iter().enumerate() {
            let Some(parameter) = candidate.parameter_type_at(index) else {
                continue;
            };
            if self.is_function_argument(unit, argument) {
                deferred.push((argument, parameter));
                continue;
            }
            let argument_type = self.resolve_expression(unit, argument, None);
            context.infer_from_types(self, argument_type, parameter);
        }
        let mut substitution = self.fix_inferences(&context, candidate);
        if !deferred.is_empty() {
            for &(argument, parameter) in &deferred {
                let contextual = instantiate_type(self, parameter, &substitution);
                let argument_type = self.resolve_expression(unit, argument, Some(contextual));
                context.infer_from_types(self, argument_type, parameter);
            }
            substitution = self.fix_inferences(&context, candidate);
        }
        instantiate_signature(self, candidate, &substitution)
    }

    /// Resolve inference candidates; a type argument that misses its
    /// constraint falls back to the constraint.
    fn fix_inferences(&mut self, context: &InferenceContext, candidate: &SignatureInfo) -> TypeSubstitution {
        let mut substitution = context.resolve(self);
        for &type_parameter in &candidate.type_parameters {
            let constraint = self.constraint_of(type_parameter);
            if constraint.is_none() {
                continue;
            }
            let constraint = instantiate_type(self, constraint, &substitution);
            let inferred = substitution.get(type_parameter).unwrap_or(self.primitives.empty_object);
            if !is_assignable_to(self, inferred, constraint) {
                substitution.insert(type_parameter, constraint);
            }
        }
        substitution
    }
}
