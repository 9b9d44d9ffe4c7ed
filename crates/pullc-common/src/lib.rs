//! Common types shared by every pullc crate.
//!
//! - Diagnostic records, categories and the code/message catalog
//!   (`Diagnostic`, `DiagnosticCategory`, `diagnostic_codes`, `diagnostic_messages`)

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, format_message};
