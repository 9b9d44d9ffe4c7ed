//! Diagnostic types and message lookup for the binder and checker.
//!
//! Message data lives in `data.rs`. The core only selects a code and its
//! arguments; `Diagnostic::from_code` fills in the message text.

use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A binder or checker diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Arguments substituted into the message template, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    /// Related information spans (e.g., where a type was declared)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic with an already formatted message.
    #[must_use]
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
            arguments: Vec::new(),
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic from a catalog code, formatting the template with `args`.
    ///
    /// Unknown codes keep the arguments but produce an empty message.
    #[must_use]
    pub fn from_code(file: impl Into<String>, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        let (message, category) = match get_diagnostic_message(code) {
            Some(m) => (format_message(m.message, args), m.category),
            None => (String::new(), DiagnosticCategory::Error),
        };
        Self {
            file: file.into(),
            start,
            length,
            message_text: message,
            category,
            code,
            arguments: args.iter().map(|a| (*a).to_string()).collect(),
            related_information: Vec::new(),
        }
    }

    /// Append an elaboration line (e.g. a structural mismatch explanation).
    #[must_use]
    pub fn with_elaboration(mut self, text: &str) -> Self {
        if !text.is_empty() {
            self.message_text.push_str("\n  ");
            self.message_text.push_str(text);
        }
        self
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_formats_arguments() {
        let diag = Diagnostic::from_code(
            "a.ts",
            4,
            3,
            diagnostic_codes::DUPLICATE_IDENTIFIER,
            &["Foo"],
        );
        assert_eq!(diag.message_text, "Duplicate identifier 'Foo'.");
        assert_eq!(diag.arguments, vec!["Foo".to_string()]);
        assert!(diag.is_error());
    }

    #[test]
    fn elaboration_is_appended_on_its_own_line() {
        let diag = Diagnostic::from_code(
            "a.ts",
            0,
            1,
            diagnostic_codes::TYPE_IS_NOT_ASSIGNABLE_TO_TYPE,
            &["string", "number"],
        )
        .with_elaboration("Types of property 'x' are incompatible.");
        assert!(diag.message_text.ends_with("\n  Types of property 'x' are incompatible."));
    }

    #[test]
    fn catalog_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for m in DIAGNOSTIC_MESSAGES {
            assert!(seen.insert(m.code), "duplicate catalog code {}", m.code);
        }
    }

    #[test]
    fn serializes_without_empty_lists() {
        let diag = Diagnostic::error("a.ts", 0, 1, "boom", 1);
        let json = serde_json::to_string(&diag).unwrap();
        assert!(!json.contains("related_information"));
        assert!(!json.contains("arguments"));
    }
}
