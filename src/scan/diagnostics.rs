//! Diagnostics reported while scanning a unit.
//!
//! Scanning never fails on bad input; syntax errors, duplicate declarations
//! and malformed reference names are collected here instead.

use std::sync::Arc;

use crate::base::FileId;
use crate::graph::UnitId;
use crate::syntax::SyntaxError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    /// 1-indexed.
    pub line: u32,
    /// 0-indexed.
    pub column: u32,
    pub severity: Severity,
    /// E.g. "E0002".
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// The earlier declaration for a duplicate.
    pub related: Option<UnitId>,
}

impl Diagnostic {
    pub fn error(file: FileId, line: u32, column: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            line,
            column,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: None,
        }
    }

    pub fn warning(file: FileId, line: u32, column: u32, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(file, line, column, message)
        }
    }

    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_related(mut self, unit: UnitId) -> Self {
        self.related = Some(unit);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

pub mod codes {
    /// The parser could not make sense of part of the file.
    pub const SYNTAX_ERROR: &str = "E0001";
    /// A type with this name is already declared in the universe.
    pub const DUPLICATE_DECLARATION: &str = "E0002";
    /// A referenced name is not a valid qualified name.
    pub const MALFORMED_NAME: &str = "E0003";

    /// A dependency lookup failed and the name was recorded as unresolved.
    pub const LOOKUP_FALLBACK: &str = "W0001";
    /// The file is not valid UTF-8 and was decoded lossily.
    pub const INVALID_ENCODING: &str = "W0002";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects the diagnostics of one file.
#[derive(Clone, Debug)]
pub struct DiagnosticCollector {
    file: FileId,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn syntax_error(&mut self, error: &SyntaxError) {
        self.add(
            Diagnostic::error(self.file, error.line, error.column, error.message.clone())
                .with_code(codes::SYNTAX_ERROR),
        );
    }

    pub fn duplicate_declaration(&mut self, line: u32, column: u32, name: &str, existing: UnitId) {
        self.add(
            Diagnostic::error(
                self.file,
                line,
                column,
                format!("duplicate declaration: `{name}` is already declared"),
            )
            .with_code(codes::DUPLICATE_DECLARATION)
            .with_related(existing),
        );
    }

    pub fn malformed_name(&mut self, line: u32, column: u32, name: &str) {
        self.add(
            Diagnostic::error(self.file, line, column, format!("malformed type name `{name}`"))
                .with_code(codes::MALFORMED_NAME),
        );
    }

    pub fn lookup_fallback(&mut self, line: u32, column: u32, name: &str) {
        self.add(
            Diagnostic::warning(
                self.file,
                line,
                column,
                format!("dependency lookup for `{name}` failed; recorded as unresolved"),
            )
            .with_code(codes::LOOKUP_FALLBACK),
        );
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_declaration_carries_code_and_related_unit() {
        let mut collector = DiagnosticCollector::new(FileId::new(3));
        collector.duplicate_declaration(5, 13, "example.one.Test1", UnitId::new(0));

        let diag = &collector.diagnostics()[0];
        assert_eq!(diag.file, FileId::new(3));
        assert_eq!(diag.code.as_deref(), Some(codes::DUPLICATE_DECLARATION));
        assert_eq!(diag.related, Some(UnitId::new(0)));
        assert!(diag.message.contains("example.one.Test1"));
    }

    #[test]
    fn test_counts() {
        let mut collector = DiagnosticCollector::new(FileId::new(0));
        collector.malformed_name(1, 0, "a..b");
        collector.lookup_fallback(2, 0, "lib.Lib");

        assert_eq!(collector.error_count(), 1);
        assert!(collector.has_errors());
        assert_eq!(collector.finish().len(), 2);
    }
}
