//! Path-qualified data errors.
//!
//! A `Violation` is one collected validation failure. Violations are never
//! fatal: the engine walks the whole tree and reports the complete set for a
//! document. Schema problems (unknown tag, bad constraint arguments and so
//! on) are a different taxonomy and live with the validator crate.

use crate::{Path, Value};
use thiserror::Error;

/// The kind of a single validation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViolationKind {
    /// A required key is absent from the data
    #[error("is required")]
    Required,

    /// The value does not satisfy the validator's type predicate
    #[error("'{value}' is not a {tag}.")]
    TypeMismatch { value: String, tag: String },

    /// The value is not a member of a closed set
    #[error("'{value}' not in ({allowed})")]
    NotIn { value: String, allowed: String },

    /// A constraint bound to the validator rejected the value
    #[error("{0}")]
    Constraint(String),

    /// Strict mode found a mapping key the schema does not declare
    #[error("unexpected key")]
    UnexpectedKey,

    /// Strict mode found a sequence element past the declared positions
    #[error("unexpected element")]
    UnexpectedElement,

    /// A custom validator rejected the value with its own message
    #[error("{0}")]
    Custom(String),
}

/// One validation failure at a specific location in a data tree.
///
/// Renders as `"<path>: <message>"`; a violation at the document root renders
/// the message alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Where in the data tree the failure occurred
    pub path: Path,
    /// What went wrong
    pub kind: ViolationKind,
}

impl Violation {
    /// Creates a required-key-missing violation.
    pub fn required(path: Path) -> Self {
        Self {
            path,
            kind: ViolationKind::Required,
        }
    }

    /// Creates a type-predicate violation with the validator's tag.
    pub fn type_mismatch(path: Path, value: &Value, tag: impl Into<String>) -> Self {
        Self {
            path,
            kind: ViolationKind::TypeMismatch {
                value: value.to_string(),
                tag: tag.into(),
            },
        }
    }

    /// Creates a not-in-set violation listing the accepted values.
    pub fn not_in(path: Path, value: &Value, allowed: impl Into<String>) -> Self {
        Self {
            path,
            kind: ViolationKind::NotIn {
                value: value.to_string(),
                allowed: allowed.into(),
            },
        }
    }

    /// Creates a constraint violation with a preformatted message.
    pub fn constraint(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            kind: ViolationKind::Constraint(message.into()),
        }
    }

    /// Creates an unexpected-key violation (strict mode).
    pub fn unexpected_key(path: Path) -> Self {
        Self {
            path,
            kind: ViolationKind::UnexpectedKey,
        }
    }

    /// Creates an unexpected-element violation (strict mode).
    pub fn unexpected_element(path: Path) -> Self {
        Self {
            path,
            kind: ViolationKind::UnexpectedElement,
        }
    }

    /// Creates a violation carrying a custom validator's failure message.
    pub fn custom(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            kind: ViolationKind::Custom(message.into()),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_message() {
        let v = Violation::required(Path::root().key("age"));
        assert_eq!(v.to_string(), "age: is required");
    }

    #[test]
    fn test_type_mismatch_message() {
        let v = Violation::type_mismatch(
            Path::root().key("users").index(2).key("email"),
            &Value::Int(5),
            "str",
        );
        assert_eq!(v.to_string(), "users[2].email: '5' is not a str.");
    }

    #[test]
    fn test_not_in_message() {
        let v = Violation::not_in(Path::root().key("kind"), &Value::Str("c".into()), "'a', 'b'");
        assert_eq!(v.to_string(), "kind: 'c' not in ('a', 'b')");
    }

    #[test]
    fn test_root_violation_has_no_path_prefix() {
        let v = Violation::type_mismatch(Path::root(), &Value::Int(5), "map");
        assert_eq!(v.to_string(), "'5' is not a map.");
    }
}
