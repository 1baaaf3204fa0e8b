//! Exit codes for the GraphQL CLI.
//!
//! This module defines distinct exit codes for different error types,
//! allowing scripts and CI systems to distinguish between different
//! failure modes.

use graphql_analysis::DiagnosticKind;
use graphql_codegen::UnitReport;

/// Exit codes used by the CLI.
///
/// These follow standard Unix conventions where 0 indicates success
/// and non-zero values indicate different types of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - every unit passed
    Success = 0,
    /// At least one unit failed validation or generation
    ValidationError = 1,
    /// Configuration error (missing or invalid config file, unknown variant)
    ConfigError = 2,
    /// I/O error (source set unreadable, output not writable)
    IoError = 4,
}

impl ExitCode {
    /// Exit the process with this exit code.
    pub fn exit(self) -> ! {
        tracing::debug!(exit_code = %self, "Exiting");
        std::process::exit(self as i32)
    }

    /// Exit code summarizing a run. I/O failures take precedence over
    /// validation failures.
    #[must_use]
    pub fn for_reports(reports: &[UnitReport]) -> Self {
        let diagnostics = || reports.iter().flat_map(UnitReport::diagnostics);
        if diagnostics().any(|d| d.kind == DiagnosticKind::Io) {
            Self::IoError
        } else if reports.iter().any(|r| !r.is_success()) {
            Self::ValidationError
        } else {
            Self::Success
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::ValidationError => write!(f, "validation error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_analysis::Diagnostic;
    use graphql_codegen::UnitOutcome;
    use std::sync::Arc;

    fn report(outcome: UnitOutcome) -> UnitReport {
        UnitReport {
            variant: Arc::from("debug"),
            service: Arc::from("service0"),
            outcome,
        }
    }

    fn failed(kind: DiagnosticKind) -> UnitReport {
        report(UnitOutcome::Failed {
            diagnostics: vec![Diagnostic::error(kind, "boom")],
        })
    }

    #[test]
    fn test_success_when_nothing_failed() {
        let ok = report(UnitOutcome::Validated {
            operations: 1,
            fragments: 0,
        });
        assert_eq!(ExitCode::for_reports(&[ok]), ExitCode::Success);
        assert_eq!(ExitCode::for_reports(&[]), ExitCode::Success);
    }

    #[test]
    fn test_validation_failure() {
        let reports = [failed(DiagnosticKind::SchemaParse)];
        assert_eq!(ExitCode::for_reports(&reports), ExitCode::ValidationError);
    }

    #[test]
    fn test_io_failure_wins() {
        let reports = [failed(DiagnosticKind::UnknownSymbol), failed(DiagnosticKind::Io)];
        assert_eq!(ExitCode::for_reports(&reports), ExitCode::IoError);
        assert_eq!(ExitCode::IoError as i32, 4);
    }
}
