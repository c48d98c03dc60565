//! Validation results and reports.
//!
//! One validation call checks an ordered list of documents and produces one
//! `DocumentResult` per document. The aggregate `ValidationReport` is what
//! callers inspect; `ValidationFailure` is the same information as an error
//! for callers that want a `Result`.

use crate::{Value, Violation};
use thiserror::Error;

/// A data tree paired with the label of its source (usually a file path).
#[derive(Debug, Clone)]
pub struct Document {
    /// The parsed data tree
    pub data: Value,
    /// Where the tree came from, used to label its result
    pub label: String,
}

impl Document {
    /// Creates a document with a source label.
    pub fn new(data: Value, label: impl Into<String>) -> Self {
        Self {
            data,
            label: label.into(),
        }
    }
}

/// The full set of violations found in one document.
#[derive(Debug, Clone)]
pub struct DocumentResult {
    /// Label of the source document
    pub label: String,
    /// Every violation found, in traversal order
    pub violations: Vec<Violation>,
}

impl DocumentResult {
    /// Returns true if the document had no violations.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violations rendered as `"<path>: <message>"` strings.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(Violation::to_string).collect()
    }
}

/// Statistics about one validation call.
#[derive(Debug, Clone, Default)]
pub struct ValidationStats {
    /// Number of documents checked
    pub documents_validated: usize,
    /// Total violations across all documents
    pub violations: usize,
    /// Wall-clock duration of the call in milliseconds
    pub duration_ms: u64,
}

/// Aggregate outcome of validating a list of documents against one schema.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// One result per input document, in input order
    pub results: Vec<DocumentResult>,
    /// Execution statistics
    pub stats: ValidationStats,
}

impl ValidationReport {
    /// Returns true if every document passed.
    pub fn passed(&self) -> bool {
        self.results.iter().all(DocumentResult::passed)
    }

    /// Total number of violations across all documents.
    pub fn error_count(&self) -> usize {
        self.results.iter().map(|r| r.violations.len()).sum()
    }

    /// Converts the report into a `Result`, keeping only failing documents
    /// in the error.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.passed() {
            Ok(())
        } else {
            let failures = self
                .results
                .into_iter()
                .filter(|r| !r.passed())
                .collect::<Vec<_>>();
            Err(ValidationFailure { failures })
        }
    }
}

/// Error carrying every failing document's full result.
#[derive(Debug, Clone, Error)]
#[error("validation failed for {} document(s)", failures.len())]
pub struct ValidationFailure {
    /// The failing documents, in input order
    pub failures: Vec<DocumentResult>,
}
