//! Schema construction.
//!
//! A schema document is a generic `Value` tree whose leaves are validator
//! expressions. Construction resolves every leaf through the registry once,
//! producing an immutable `Schema` that can be reused across any number of
//! validation calls, concurrently if desired.
//!
//! Multi-document schema files register every document after the first as
//! include definitions: each top-level key of such a document names one
//! reusable sub-schema. Include cycles are not defended against and are a
//! configuration error by contract.

use crate::error::SchemaError;
use crate::registry::Registry;
use crate::syntax::parse_expression;
use crate::validators::Validator;
use indexmap::IndexMap;
use schemata_core::{Path, Value};
use std::collections::HashMap;

/// One entry of a schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// A leaf: the value must satisfy any one of the candidate validators
    Field {
        /// Whether the key/position must be present in the data
        required: bool,
        /// Candidate validators, tried in declaration order
        candidates: Vec<Validator>,
    },
    /// A fixed mapping: each named child is checked against its own node
    Map { entries: IndexMap<String, SchemaNode> },
    /// A fixed sequence: each position is checked against its own node
    Seq { entries: Vec<SchemaNode> },
}

/// A compiled schema: the root node plus named include definitions.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) root: SchemaNode,
    pub(crate) includes: HashMap<String, SchemaNode>,
    registry: Registry,
}

impl Schema {
    /// Builds a schema from one parsed document.
    pub fn new(doc: &Value, registry: Registry) -> Result<Self, SchemaError> {
        let root = build_node(doc, &registry, &Path::root())?;
        Ok(Self {
            root,
            includes: HashMap::new(),
            registry,
        })
    }

    /// Registers the contents of an include document.
    ///
    /// Every top-level key becomes one named include. Later registrations
    /// replace earlier ones with the same name.
    pub fn add_include(&mut self, doc: &Value) -> Result<(), SchemaError> {
        let entries = doc
            .as_map()
            .ok_or_else(|| SchemaError::BadIncludeDocument(doc.type_name().to_string()))?;
        for (name, body) in entries {
            let node = build_node(body, &self.registry, &Path::root().key(name))?;
            self.includes.insert(name.clone(), node);
        }
        Ok(())
    }

    /// The root schema node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Looks up a named include.
    pub fn include(&self, name: &str) -> Option<&SchemaNode> {
        self.includes.get(name)
    }

    /// The names of every registered include, unordered.
    pub fn include_names(&self) -> Vec<&str> {
        self.includes.keys().map(String::as_str).collect()
    }

    /// Verifies that every include referenced anywhere is registered.
    ///
    /// Called before any data is examined; a missing name is a configuration
    /// error, not a data error.
    pub fn check_includes(&self) -> Result<(), SchemaError> {
        let mut referenced = Vec::new();
        collect_include_names(&self.root, &mut referenced);
        for node in self.includes.values() {
            collect_include_names(node, &mut referenced);
        }
        for name in referenced {
            if !self.includes.contains_key(&name) {
                return Err(SchemaError::MissingInclude(name));
            }
        }
        Ok(())
    }
}

/// Builds a schema from a list of parsed documents.
///
/// The first document is the root schema; every later document contributes
/// include definitions.
pub fn make_schema(docs: &[Value], registry: Registry) -> Result<Schema, SchemaError> {
    let (first, rest) = docs.split_first().ok_or(SchemaError::EmptySchema)?;
    let mut schema = Schema::new(first, registry)?;
    for doc in rest {
        schema.add_include(doc)?;
    }
    Ok(schema)
}

fn build_node(value: &Value, registry: &Registry, path: &Path) -> Result<SchemaNode, SchemaError> {
    match value {
        Value::Str(expr) => {
            let call = parse_expression(expr)?;
            let required = call.bool_kwarg("required", true)?;
            let built = registry.build(&call)?;
            // A top-level `any(...)` spreads into the node's candidate list
            // so the node itself carries the any-of contract.
            let candidates = match built {
                Validator::Any { validators } if !validators.is_empty() => validators,
                other => vec![other],
            };
            Ok(SchemaNode::Field {
                required,
                candidates,
            })
        }
        Value::Map(entries) => {
            let mut out = IndexMap::with_capacity(entries.len());
            for (key, child) in entries {
                out.insert(key.clone(), build_node(child, registry, &path.key(key))?);
            }
            Ok(SchemaNode::Map { entries: out })
        }
        Value::Seq(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, child) in items.iter().enumerate() {
                out.push(build_node(child, registry, &path.index(index))?);
            }
            Ok(SchemaNode::Seq { entries: out })
        }
        other => Err(SchemaError::NotAnExpression {
            path: path.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn collect_include_names(node: &SchemaNode, out: &mut Vec<String>) {
    match node {
        SchemaNode::Field { candidates, .. } => {
            for validator in candidates {
                collect_from_validator(validator, out);
            }
        }
        SchemaNode::Map { entries } => {
            for child in entries.values() {
                collect_include_names(child, out);
            }
        }
        SchemaNode::Seq { entries } => {
            for child in entries {
                collect_include_names(child, out);
            }
        }
    }
}

fn collect_from_validator(validator: &Validator, out: &mut Vec<String>) {
    match validator {
        Validator::Include { name, .. } => out.push(name.clone()),
        Validator::Map { validators }
        | Validator::List { validators, .. }
        | Validator::Any { validators } => {
            for child in validators {
                collect_from_validator(child, out);
            }
        }
        _ => {}
    }
}
