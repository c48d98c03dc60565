//! # Schemata Core
//!
//! Core data structures for the schemata validation engine.
//!
//! This crate provides the fundamental building blocks shared by the reader,
//! the validator and the CLI:
//!
//! - **Value**: the generic data tree a parsed document is turned into
//! - **Path**: the location of a node inside a data tree, used in messages
//! - **Violation**: a single path-qualified validation error
//! - **ValidationReport**: the per-document results of one validation call
//!
//! ## Example
//!
//! ```rust
//! use schemata_core::{Path, Value, Violation};
//!
//! let path = Path::root().key("users").index(2).key("email");
//! let violation = Violation::type_mismatch(path, &Value::Int(5), "str");
//!
//! assert_eq!(violation.to_string(), "users[2].email: '5' is not a str.");
//! ```

pub mod path;
pub mod report;
pub mod value;
pub mod violation;

pub use path::*;
pub use report::*;
pub use value::*;
pub use violation::*;
