//! Checker configuration.

/// Switches for the optional check families.
#[derive(Clone, Debug)]
pub struct CheckerOptions {
    /// Report declarations whose type silently became `any`.
    pub no_implicit_any: bool,
    /// Report exported declarations whose types use non-exported names.
    pub check_privacy: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            no_implicit_any: false,
            check_privacy: true,
        }
    }
}
