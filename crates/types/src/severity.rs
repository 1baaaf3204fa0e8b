//! Severity types for diagnostics.

/// Diagnostic severity level.
///
/// Only errors fail a compilation unit; warnings are reported alongside
/// generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// A problem that prevents generation for the affected unit
    Error,
    /// A potential problem that does not block generation
    Warning,
}

impl DiagnosticSeverity {
    /// Returns true if this severity indicates an error.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}
