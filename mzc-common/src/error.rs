//! Error handling for the MinZ C backend
//!
//! `CompilerError` covers every generation-time failure. Errors abort the
//! emission of the offending unit; non-fatal findings are collected as
//! diagnostics by the `ErrorReporter`.

use crate::source_loc::SourceLocation;
use crate::types::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main backend error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("mangled symbol '{symbol}' is produced by both {first} and {second}")]
    MangleCollision {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("in {function}: local '{local}' is read before it is assigned on every path")]
    UnboundLocal { function: String, local: String },

    #[error("in {function}: literal {value} does not fit in {ty}")]
    WidthOverflow {
        function: String,
        value: i64,
        ty: ScalarType,
    },

    #[error("in {function}: unknown local '{local}'")]
    UnknownLocal { function: String, local: String },

    #[error("in {function}: local '{local}' is declared more than once")]
    DuplicateLocal { function: String, local: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("symbol '{symbol}' is not in sanitized form")]
    UnsanitizedSymbol { symbol: String },

    #[error("in {function}: unknown constant '{name}'")]
    UnknownConstant { function: String, name: String },

    #[error("in {function}: call to {callee} passes {found} arguments, expected {expected}")]
    ArityMismatch {
        function: String,
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("function {function} can reach its end without returning a value")]
    MissingReturn { function: String },

    #[error("in {function}: no runtime support function prints {ty}")]
    NoRuntimeSupport { function: String, ty: ScalarType },

    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("invalid entry point: {message}")]
    InvalidEntryPoint { message: String },

    #[error("invalid option: {message}")]
    InvalidOption { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_severity(severity: Severity, message: String, location: Option<SourceLocation>) -> Self {
        Self {
            severity,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn error(message: String, location: Option<SourceLocation>) -> Self {
        Self::with_severity(Severity::Error, message, location)
    }

    pub fn warning(message: String, location: Option<SourceLocation>) -> Self {
        Self::with_severity(Severity::Warning, message, location)
    }

    pub fn note(message: String, location: Option<SourceLocation>) -> Self {
        Self::with_severity(Severity::Note, message, location)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{}: {}", self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Collects diagnostics produced while generating one unit
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an already built diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, location: Option<SourceLocation>) -> &mut Diagnostic {
        self.report(Diagnostic::error(message, location))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, location: Option<SourceLocation>) -> &mut Diagnostic {
        self.report(Diagnostic::warning(message, location))
    }

    /// Report a note diagnostic
    pub fn note(&mut self, message: String, location: Option<SourceLocation>) -> &mut Diagnostic {
        self.report(Diagnostic::note(message, location))
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        fn plural(n: usize) -> &'static str {
            if n == 1 {
                ""
            } else {
                "s"
            }
        }
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, plural(w)),
            (e, 0) => format!("{} error{}", e, plural(e)),
            (e, w) => format!("{} error{} and {} warning{}", e, plural(e), w, plural(w)),
        }
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<fmt::Error> for CompilerError {
    fn from(_: fmt::Error) -> Self {
        CompilerError::InternalError {
            message: "failed to format generated code".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning(
            "literal 300 does not fit in u8".to_string(),
            Some(SourceLocation::new("simple_add.minz", 4, 9)),
        )
        .with_note("the value wraps to 44".to_string());

        assert_eq!(
            diag.to_string(),
            "simple_add.minz:4:9: warning: literal 300 does not fit in u8\n  note: the value wraps to 44"
        );
    }

    #[test]
    fn test_error_reporter_counts() {
        let mut reporter = ErrorReporter::new();
        assert!(!reporter.has_errors());
        assert_eq!(reporter.summary(), "No errors or warnings");

        reporter.warning("w".to_string(), None);
        assert_eq!(reporter.summary(), "1 warning");

        reporter.error("e1".to_string(), None);
        reporter.error("e2".to_string(), None).notes.push("n".to_string());
        reporter.note("n".to_string(), None);

        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(reporter.warning_count(), 1);
        assert_eq!(reporter.diagnostics().len(), 4);
        assert_eq!(reporter.diagnostics()[2].notes, vec!["n".to_string()]);
        assert_eq!(reporter.summary(), "2 errors and 1 warning");
    }

    #[test]
    fn test_report_prebuilt_diagnostic() {
        let mut reporter = ErrorReporter::new();
        reporter.report(Diagnostic::warning("in m::f: literal 300 does not fit in u8".to_string(), None));
        reporter.report(Diagnostic::note("see here".to_string(), None));
        assert_eq!(reporter.warning_count(), 1);
        assert_eq!(reporter.error_count(), 0);
        assert_eq!(reporter.into_diagnostics().len(), 2);
    }

    #[test]
    fn test_error_messages() {
        let err = CompilerError::WidthOverflow {
            function: "main".to_string(),
            value: 300,
            ty: ScalarType::U8,
        };
        assert_eq!(err.to_string(), "in main: literal 300 does not fit in u8");

        let err = CompilerError::MangleCollision {
            symbol: "a_b_f".to_string(),
            first: "a-b::f".to_string(),
            second: "a_b::f".to_string(),
        };
        assert!(err.to_string().contains("a_b_f"));
    }
}
