//! Validator registry.
//!
//! Maps tag names (and type names, so both `str` and `String` resolve) to
//! validator factories. The built-in set is assembled as an explicit list at
//! construction time; callers can merge their own entries over it, and a
//! caller entry wins on tag collision.
//!
//! Each factory also enforces the compatibility table for its tag: a keyword
//! argument that does not belong to the tag is rejected here, at schema
//! construction time.

use crate::constraints;
use crate::datatype::DatatypeGrammar;
use crate::error::SchemaError;
use crate::syntax::{Arg, CallExpr};
use crate::validators::{CustomValidator, Validator, compile_anchored, mac_patterns};
use schemata_core::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A constructor turning a parsed expression into a validator instance.
///
/// Factories for container tags receive the registry so nested expressions
/// resolve against the same validator set.
pub type ValidatorFactory =
    Arc<dyn Fn(&CallExpr, &Registry) -> Result<Validator, SchemaError> + Send + Sync>;

/// The tag-to-constructor table used during schema construction.
#[derive(Clone)]
pub struct Registry {
    factories: HashMap<String, ValidatorFactory>,
}

impl Registry {
    /// A registry with no entries. Useful for fully custom validator sets.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// The built-in validator set.
    pub fn built_in() -> Self {
        let mut registry = Self::empty();
        let entries: &[(&str, &str, ValidatorFactory)] = &[
            ("str", "String", Arc::new(build_str)),
            ("num", "Number", Arc::new(build_num)),
            ("int", "Integer", Arc::new(build_int)),
            ("bool", "Boolean", Arc::new(build_bool)),
            ("enum", "Enum", Arc::new(build_enum)),
            ("day", "Day", Arc::new(build_day)),
            ("timestamp", "Timestamp", Arc::new(build_timestamp)),
            ("map", "Map", Arc::new(build_map)),
            ("list", "List", Arc::new(build_list)),
            ("include", "Include", Arc::new(build_include)),
            ("any", "Any", Arc::new(build_any)),
            ("null", "Null", Arc::new(build_null)),
            ("regex", "Regex", Arc::new(build_regex)),
            ("ip", "Ip", Arc::new(build_ip)),
            ("mac", "Mac", Arc::new(build_mac)),
            (
                "redshift_datatype",
                "RedshiftDatatype",
                Arc::new(build_datatype),
            ),
        ];
        for (tag, name, factory) in entries {
            registry.register(*tag, factory.clone());
            registry.register(*name, factory.clone());
        }
        registry
    }

    /// Registers a factory under a name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: ValidatorFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Registers a custom validator under its own tag.
    pub fn register_custom(&mut self, custom: Arc<dyn CustomValidator>) {
        let tag = custom.tag().to_string();
        self.register(
            tag,
            Arc::new(move |call: &CallExpr, _: &Registry| {
                call.check_kwargs(&[])?;
                Ok(Validator::Custom(custom.clone()))
            }),
        );
    }

    /// Returns true if a name resolves to a factory.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds a validator from a parsed expression.
    pub fn build(&self, call: &CallExpr) -> Result<Validator, SchemaError> {
        match self.factories.get(&call.name) {
            Some(factory) => factory(call, self),
            None => Err(SchemaError::UnknownTag(call.name.clone())),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::built_in()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("tags", &names).finish()
    }
}

/// Collects positional arguments as scalars, rejecting nested calls.
fn scalar_args(call: &CallExpr) -> Result<Vec<Value>, SchemaError> {
    call.args
        .iter()
        .map(|arg| match arg {
            Arg::Scalar(v) => Ok(v.clone()),
            Arg::Call(c) => Err(SchemaError::arguments(
                &call.name,
                format!("'{}' is not a literal value", c.name),
            )),
        })
        .collect()
}

/// Builds positional arguments as nested validators, rejecting literals.
fn validator_args(call: &CallExpr, registry: &Registry) -> Result<Vec<Validator>, SchemaError> {
    call.args
        .iter()
        .map(|arg| match arg {
            Arg::Call(c) => registry.build(c),
            Arg::Scalar(v) => Err(SchemaError::arguments(
                &call.name,
                format!("'{}' is not a validator", v),
            )),
        })
        .collect()
}

fn no_positional_args(call: &CallExpr) -> Result<(), SchemaError> {
    if call.args.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::arguments(
            &call.name,
            "takes no positional arguments",
        ))
    }
}

fn build_str(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[
        "min",
        "max",
        "exclude",
        "equals",
        "starts_with",
        "ends_with",
        "matches",
        "ignore_case",
    ])?;
    no_positional_args(call)?;
    let mut cs = constraints::length_bounds(call)?;
    cs.extend(constraints::string_rules(call)?);
    Ok(Validator::Str { constraints: cs })
}

fn build_num(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["min", "max"])?;
    no_positional_args(call)?;
    Ok(Validator::Num {
        constraints: constraints::numeric_bounds(call)?,
    })
}

fn build_int(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["min", "max"])?;
    no_positional_args(call)?;
    Ok(Validator::Int {
        constraints: constraints::numeric_bounds(call)?,
    })
}

fn build_bool(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[])?;
    no_positional_args(call)?;
    Ok(Validator::Bool)
}

fn build_enum(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[])?;
    Ok(Validator::Enum {
        values: scalar_args(call)?,
    })
}

fn build_day(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["min", "max"])?;
    no_positional_args(call)?;
    Ok(Validator::Day {
        constraints: constraints::date_bounds(call)?,
    })
}

fn build_timestamp(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["min", "max"])?;
    no_positional_args(call)?;
    Ok(Validator::Timestamp {
        constraints: constraints::timestamp_bounds(call)?,
    })
}

fn build_map(call: &CallExpr, registry: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[])?;
    Ok(Validator::Map {
        validators: validator_args(call, registry)?,
    })
}

fn build_list(call: &CallExpr, registry: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["min", "max"])?;
    Ok(Validator::List {
        validators: validator_args(call, registry)?,
        constraints: constraints::length_bounds(call)?,
    })
}

fn build_include(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["strict"])?;
    let name = match call.args.as_slice() {
        [Arg::Scalar(Value::Str(name))] => name.clone(),
        _ => {
            return Err(SchemaError::arguments(
                &call.name,
                "expects exactly one include name",
            ));
        }
    };
    let strict = match call.kwarg("strict") {
        None => None,
        Some(_) => Some(call.bool_kwarg("strict", false)?),
    };
    Ok(Validator::Include { name, strict })
}

fn build_any(call: &CallExpr, registry: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[])?;
    Ok(Validator::Any {
        validators: validator_args(call, registry)?,
    })
}

fn build_null(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[])?;
    no_positional_args(call)?;
    Ok(Validator::Null)
}

fn build_regex(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["name", "ignore_case", "multiline", "dotall"])?;
    let ignore_case = call.bool_kwarg("ignore_case", false)?;
    let multiline = call.bool_kwarg("multiline", false)?;
    let dotall = call.bool_kwarg("dotall", false)?;
    let mut patterns = Vec::with_capacity(call.args.len());
    for value in scalar_args(call)? {
        match value {
            Value::Str(pattern) => {
                patterns.push(compile_anchored(&pattern, ignore_case, multiline, dotall)?);
            }
            other => {
                return Err(SchemaError::arguments(
                    &call.name,
                    format!("'{}' is not a pattern string", other),
                ));
            }
        }
    }
    Ok(Validator::Regex {
        patterns,
        name: call.str_kwarg("name")?,
    })
}

fn build_ip(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["version"])?;
    no_positional_args(call)?;
    Ok(Validator::Ip {
        constraints: constraints::ip_rules(call)?,
    })
}

fn build_mac(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&[])?;
    no_positional_args(call)?;
    Ok(Validator::Mac {
        patterns: mac_patterns(),
    })
}

fn build_datatype(call: &CallExpr, _: &Registry) -> Result<Validator, SchemaError> {
    call.check_kwargs(&["datatypes"])?;
    no_positional_args(call)?;
    Ok(Validator::Datatype {
        grammar: DatatypeGrammar::new(),
        constraints: constraints::datatype_rules(call)?,
    })
}
