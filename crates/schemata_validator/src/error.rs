//! Schema errors.
//!
//! These are the fatal taxonomy: problems with the schema itself, detected at
//! construction or include-registration time. Validation never starts when
//! one of these is raised. Data problems are collected as
//! `schemata_core::Violation` instead and never abort a run.

use thiserror::Error;

/// Result type for schema construction operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while building or resolving a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A schema expression names a validator the registry does not know
    #[error("unknown validator tag '{0}'")]
    UnknownTag(String),

    /// A schema expression could not be parsed
    #[error("syntax error in '{expression}': {reason}")]
    Syntax { expression: String, reason: String },

    /// A validator was given arguments it cannot accept
    #[error("invalid arguments for '{tag}': {reason}")]
    Arguments { tag: String, reason: String },

    /// A constraint keyword is not applicable to the validator it was bound to
    #[error("constraint '{constraint}' cannot be applied to '{tag}'")]
    IncompatibleConstraint { tag: String, constraint: String },

    /// A regex pattern failed to compile
    #[error("invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// An include validator references a name that was never registered
    #[error("include '{0}' is not defined")]
    MissingInclude(String),

    /// An include document was not a mapping of name to sub-schema
    #[error("include document must be a mapping, found {0}")]
    BadIncludeDocument(String),

    /// A schema node is not a validator expression
    #[error("schema node at '{path}' is not a validator expression: {found}")]
    NotAnExpression { path: String, found: String },

    /// The schema document list was empty
    #[error("schema document is empty")]
    EmptySchema,
}

impl SchemaError {
    /// Creates a syntax error for an expression.
    pub fn syntax(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Syntax {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid-arguments error for a validator tag.
    pub fn arguments(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Arguments {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}
