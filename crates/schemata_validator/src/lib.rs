//! # Schemata Validator
//!
//! Validation engine for structured data documents. This crate provides the
//! core matching logic for checking a data tree against a declarative
//! schema, including:
//!
//! - Typed validators (`str`, `int`, `num`, `bool`, `enum`, `day`,
//!   `timestamp`, `map`, `list`, `include`, `any`, `null`, `regex`, `ip`,
//!   `mac`, `redshift_datatype`)
//! - Pluggable constraints (length, range, value and character restrictions)
//! - A registry resolving schema syntax to validator instances, with
//!   user-supplied validators merged over the built-in set
//! - Recursive matching with named include resolution, any-of semantics and
//!   strict-key policy, accumulating path-qualified violations
//!
//! ## Example
//!
//! ```rust
//! use schemata_core::{Mapping, Value};
//! use schemata_validator::{Registry, Schema};
//!
//! let mut doc = Mapping::new();
//! doc.insert("name".to_string(), Value::Str("str()".into()));
//! doc.insert("age".to_string(), Value::Str("int(min=0)".into()));
//! let schema = Schema::new(&Value::Map(doc), Registry::built_in()).unwrap();
//!
//! let mut data = Mapping::new();
//! data.insert("name".to_string(), Value::Str("Al".into()));
//! data.insert("age".to_string(), Value::Int(-1));
//!
//! let violations = schema.validate(&Value::Map(data), false).unwrap();
//! assert_eq!(violations[0].to_string(), "age: -1 is less than 0");
//! ```

mod constraints;
mod datatype;
mod engine;
mod error;
mod registry;
mod schema;
mod syntax;
mod validators;

pub use constraints::{Bound, Constraint};
pub use datatype::{DatatypeGrammar, canonical_alias, keyword_of};
pub use engine::validate;
pub use error::{Result, SchemaError};
pub use registry::{Registry, ValidatorFactory};
pub use schema::{Schema, SchemaNode, make_schema};
pub use syntax::{Arg, CallExpr, parse_expression};
pub use validators::{CustomValidator, Validator};
