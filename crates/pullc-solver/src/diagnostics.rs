//! Relation failure reasons and the tracers that collect them.
//!
//! Relation checks run on a fast path that only answers yes/no. When the
//! checker needs to explain a failure it re-runs the check with a
//! `DiagnosticTracer`, which records a `SubtypeFailureReason` tree that
//! `TypeComparisonInfo` turns into elaboration text.

use pullc_binder::{SignatureKind, SymbolId};

use crate::format::type_to_string;
use crate::type_resolver::TypeResolver;

/// Why a relation between two types failed.
#[derive(Clone, Debug, PartialEq)]
pub enum SubtypeFailureReason {
    MissingProperty {
        name: String,
        source_type: SymbolId,
    },
    PropertyTypeMismatch {
        name: String,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    OptionalPropertyRequired {
        name: String,
        source_type: SymbolId,
        target_type: SymbolId,
    },
    /// Private members match only when both come from the same declaration.
    PrivatePropertyMismatch {
        name: String,
    },
    MissingSignature {
        kind: SignatureKind,
        source_type: SymbolId,
        target_type: SymbolId,
    },
    SignatureMismatch {
        kind: SignatureKind,
        source_type: SymbolId,
        target_type: SymbolId,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    TooManyParameters {
        source_count: usize,
        target_count: usize,
    },
    ParameterTypeMismatch {
        name: String,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    ReturnTypeMismatch {
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    ArrayElementMismatch {
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    MissingIndexSignature {
        numeric: bool,
        source_type: SymbolId,
    },
    IndexSignatureMismatch {
        numeric: bool,
        nested_reason: Option<Box<SubtypeFailureReason>>,
    },
    TypeMismatch {
        source_type: SymbolId,
        target_type: SymbolId,
    },
    RecursionLimitExceeded,
}

/// Observer of relation failures.
pub trait SubtypeTracer {
    /// Called once per failed relation step. The closure is only invoked
    /// by tracers that keep the reason.
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason);

    /// Whether nested failures should be captured and wrapped.
    fn wants_detail(&self) -> bool {
        false
    }
}

/// Tracer for the yes/no path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastTracer;

impl SubtypeTracer for FastTracer {
    #[inline(always)]
    fn on_mismatch(&mut self, _reason: impl FnOnce() -> SubtypeFailureReason) {}
}

/// Keeps the first reason reported to it.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticTracer {
    failure: Option<SubtypeFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        Self { failure: None }
    }

    pub fn take_failure(&mut self) -> Option<SubtypeFailureReason> {
        self.failure.take()
    }

    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl SubtypeTracer for DiagnosticTracer {
    fn on_mismatch(&mut self, reason: impl FnOnce() -> SubtypeFailureReason) {
        if self.failure.is_none() {
            self.failure = Some(reason());
        }
    }

    fn wants_detail(&self) -> bool {
        true
    }
}

/// Human-readable explanation of a failed comparison.
#[derive(Clone, Debug, Default)]
pub struct TypeComparisonInfo {
    pub reason: Option<SubtypeFailureReason>,
}

impl TypeComparisonInfo {
    pub fn new(reason: Option<SubtypeFailureReason>) -> Self {
        Self { reason }
    }

    pub fn is_empty(&self) -> bool {
        self.reason.is_none()
    }

    /// Elaboration lines, outermost first, joined for a diagnostic body.
    pub fn message<R: TypeResolver>(&self, resolver: &mut R) -> String {
        let mut lines = Vec::new();
        let mut current = self.reason.as_ref();
        while let Some(reason) = current {
            lines.push(describe(resolver, reason));
            current = nested(reason);
        }
        lines.join("\n    ")
    }

    /// Body text for a diagnostic whose head already names both types.
    /// Empty when the failure is a bare type mismatch, which would only
    /// repeat the head.
    pub fn elaboration<R: TypeResolver>(&self, resolver: &mut R) -> String {
        match self.reason {
            None | Some(SubtypeFailureReason::TypeMismatch { .. }) => String::new(),
            Some(_) => self.message(resolver),
        }
    }
}

fn nested(reason: &SubtypeFailureReason) -> Option<&SubtypeFailureReason> {
    match reason {
        SubtypeFailureReason::PropertyTypeMismatch { nested_reason, .. }
        | SubtypeFailureReason::SignatureMismatch { nested_reason, .. }
        | SubtypeFailureReason::ParameterTypeMismatch { nested_reason, .. }
        | SubtypeFailureReason::ReturnTypeMismatch { nested_reason }
        | SubtypeFailureReason::ArrayElementMismatch { nested_reason }
        | SubtypeFailureReason::IndexSignatureMismatch { nested_reason, .. } => nested_reason.as_deref(),
        _ => None,
    }
}

fn signature_word(kind: SignatureKind) -> &'static str {
    match kind {
        SignatureKind::Call => "call",
        SignatureKind::Construct => "construct",
        SignatureKind::Index => "index",
    }
}

fn index_word(numeric: bool) -> &'static str {
    if numeric { "numeric" } else { "string" }
}

fn describe<R: TypeResolver>(resolver: &mut R, reason: &SubtypeFailureReason) -> String {
    match reason {
        SubtypeFailureReason::MissingProperty { name, source_type } => {
            format!("Property '{name}' is missing in type '{}'.", type_to_string(resolver, *source_type))
        }
        SubtypeFailureReason::PropertyTypeMismatch { name, .. } => {
            format!("Types of property '{name}' are incompatible.")
        }
        SubtypeFailureReason::OptionalPropertyRequired {
            name,
            source_type,
            target_type,
        } => format!(
            "Property '{name}' is optional in type '{}' but required in type '{}'.",
            type_to_string(resolver, *source_type),
            type_to_string(resolver, *target_type)
        ),
        SubtypeFailureReason::PrivatePropertyMismatch { name } => {
            format!("Types have separate declarations of a private property '{name}'.")
        }
        SubtypeFailureReason::MissingSignature {
            kind,
            source_type,
            target_type,
        } => format!(
            "Type '{}' requires a {} signature, but type '{}' lacks one.",
            type_to_string(resolver, *target_type),
            signature_word(*kind),
            type_to_string(resolver, *source_type)
        ),
        SubtypeFailureReason::SignatureMismatch {
            kind,
            source_type,
            target_type,
            ..
        } => format!(
            "{} signatures of types '{}' and '{}' are incompatible.",
            capitalize(signature_word(*kind)),
            type_to_string(resolver, *source_type),
            type_to_string(resolver, *target_type)
        ),
        SubtypeFailureReason::TooManyParameters {
            source_count,
            target_count,
        } => format!("Call signature expects {target_count} or fewer parameters but requires {source_count}."),
        SubtypeFailureReason::ParameterTypeMismatch { name, .. } => {
            format!("Types of parameters '{name}' are incompatible.")
        }
        SubtypeFailureReason::ReturnTypeMismatch { .. } => "Return types are incompatible.".to_string(),
        SubtypeFailureReason::ArrayElementMismatch { .. } => "Array element types are incompatible.".to_string(),
        SubtypeFailureReason::MissingIndexSignature { numeric, source_type } => format!(
            "Index signature is missing in type '{}' ({} index expected).",
            type_to_string(resolver, *source_type),
            index_word(*numeric)
        ),
        SubtypeFailureReason::IndexSignatureMismatch { numeric, .. } => {
            format!("{} index signatures are incompatible.", capitalize(index_word(*numeric)))
        }
        SubtypeFailureReason::TypeMismatch {
            source_type,
            target_type,
        } => format!(
            "Type '{}' is not assignable to type '{}'.",
            type_to_string(resolver, *source_type),
            type_to_string(resolver, *target_type)
        ),
        SubtypeFailureReason::RecursionLimitExceeded => {
            "Type comparison is excessively deep.".to_string()
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
