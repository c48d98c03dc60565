//! Typed validators.
//!
//! A validator is a tagged unit pairing a type-membership predicate with the
//! constraints bound to it and, for the container kinds, a list of child
//! validators. Built-ins are a closed enum so the engine can match
//! exhaustively; user-defined validators plug in through the
//! [`CustomValidator`] capability trait and the registry.
//!
//! Validators are constructed once when a schema is parsed, are immutable,
//! and are reused for every value checked against them.

use crate::constraints::{self, Constraint};
use crate::datatype::DatatypeGrammar;
use crate::error::SchemaError;
use regex::{Regex, RegexBuilder};
use schemata_core::{Path, Value, Violation};
use std::fmt;
use std::sync::Arc;

/// Capability interface for user-supplied validators.
///
/// A custom validator supplies a type predicate and a failure message; it is
/// registered in a `Registry` under its tag and participates in matching
/// exactly like a built-in.
pub trait CustomValidator: fmt::Debug + Send + Sync {
    /// The tag this validator is known by.
    fn tag(&self) -> &str;

    /// The type-membership predicate.
    fn is_valid(&self, value: &Value) -> bool;

    /// The failure message for a rejected value.
    fn fail(&self, value: &Value) -> String {
        format!("'{}' is not a {}.", value, self.tag())
    }
}

/// One validator instance, as referenced from a schema node.
#[derive(Debug, Clone)]
pub enum Validator {
    /// `str`: string values
    Str { constraints: Vec<Constraint> },
    /// `num`: integer or float values
    Num { constraints: Vec<Constraint> },
    /// `int`: integer values
    Int { constraints: Vec<Constraint> },
    /// `bool`: boolean values
    Bool,
    /// `enum`: one of a closed set of scalar values
    Enum { values: Vec<Value> },
    /// `day`: calendar dates
    Day { constraints: Vec<Constraint> },
    /// `timestamp`: date-and-time values
    Timestamp { constraints: Vec<Constraint> },
    /// `map`: any mapping, each value matching one of the children
    Map { validators: Vec<Validator> },
    /// `list`: any sequence, each element matching one of the children
    List {
        validators: Vec<Validator>,
        constraints: Vec<Constraint>,
    },
    /// `include`: defer to a named sub-schema
    Include { name: String, strict: Option<bool> },
    /// `any`: one of the children must accept the value
    Any { validators: Vec<Validator> },
    /// `null`: only the null value
    Null,
    /// `regex`: string matching one of the patterns
    Regex {
        patterns: Vec<Regex>,
        name: Option<String>,
    },
    /// `ip`: IPv4/IPv6 address or interface
    Ip { constraints: Vec<Constraint> },
    /// `mac`: MAC address
    Mac { patterns: Vec<Regex> },
    /// `redshift_datatype`: column datatype declaration
    Datatype {
        grammar: DatatypeGrammar,
        constraints: Vec<Constraint>,
    },
    /// A user-supplied validator
    Custom(Arc<dyn CustomValidator>),
}

impl Validator {
    /// The tag this validator answers to in schema syntax.
    pub fn tag(&self) -> &str {
        match self {
            Validator::Str { .. } => "str",
            Validator::Num { .. } => "num",
            Validator::Int { .. } => "int",
            Validator::Bool => "bool",
            Validator::Enum { .. } => "enum",
            Validator::Day { .. } => "day",
            Validator::Timestamp { .. } => "timestamp",
            Validator::Map { .. } => "map",
            Validator::List { .. } => "list",
            Validator::Include { .. } => "include",
            Validator::Any { .. } => "any",
            Validator::Null => "null",
            Validator::Regex { .. } => "regex",
            Validator::Ip { .. } => "ip",
            Validator::Mac { .. } => "mac",
            Validator::Datatype { .. } => "redshift_datatype",
            Validator::Custom(custom) => custom.tag(),
        }
    }

    /// The type-membership predicate.
    ///
    /// `any` and `include` always succeed here; their semantics live in the
    /// matching engine. A timestamp satisfies `day`, since a point in time
    /// identifies a day.
    pub fn is_valid(&self, value: &Value) -> bool {
        match self {
            Validator::Str { .. } => matches!(value, Value::Str(_)),
            Validator::Num { .. } => matches!(value, Value::Int(_) | Value::Float(_)),
            Validator::Int { .. } => matches!(value, Value::Int(_)),
            Validator::Bool => matches!(value, Value::Bool(_)),
            Validator::Enum { values } => values.contains(value),
            Validator::Day { .. } => matches!(value, Value::Date(_) | Value::Timestamp(_)),
            Validator::Timestamp { .. } => matches!(value, Value::Timestamp(_)),
            Validator::Map { .. } => matches!(value, Value::Map(_)),
            Validator::List { .. } => matches!(value, Value::Seq(_)),
            Validator::Include { .. } => true,
            Validator::Any { .. } => true,
            Validator::Null => value.is_null(),
            Validator::Regex { patterns, .. } => match value.as_str() {
                Some(s) => patterns.iter().any(|p| p.is_match(s)),
                None => false,
            },
            Validator::Ip { .. } => match value.as_str() {
                Some(s) => constraints::parse_ip(s).is_some(),
                None => false,
            },
            Validator::Mac { patterns } => match value.as_str() {
                Some(s) => patterns.iter().any(|p| p.is_match(s)),
                None => false,
            },
            Validator::Datatype { grammar, .. } => match value.as_str() {
                Some(s) => grammar.check(s),
                None => false,
            },
            Validator::Custom(custom) => custom.is_valid(value),
        }
    }

    /// The constraints bound to this validator, in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        match self {
            Validator::Str { constraints }
            | Validator::Num { constraints }
            | Validator::Int { constraints }
            | Validator::Day { constraints }
            | Validator::Timestamp { constraints }
            | Validator::List { constraints, .. }
            | Validator::Ip { constraints }
            | Validator::Datatype { constraints, .. } => constraints,
            _ => &[],
        }
    }

    /// Builds the violation reported when the type predicate rejects a value.
    pub fn fail(&self, path: Path, value: &Value) -> Violation {
        match self {
            Validator::Enum { values } => {
                let allowed = values
                    .iter()
                    .map(render_enum_member)
                    .collect::<Vec<_>>()
                    .join(", ");
                Violation::not_in(path, value, allowed)
            }
            Validator::Regex { name, .. } => {
                let shown = name.as_deref().unwrap_or("regex match");
                Violation::type_mismatch(path, value, shown)
            }
            Validator::Custom(custom) => Violation::custom(path, custom.fail(value)),
            _ => Violation::type_mismatch(path, value, self.tag()),
        }
    }
}

fn render_enum_member(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}

/// Compiles a user pattern anchored at the start of the haystack, with the
/// per-instance flags OR'd in. Anchoring mirrors the original's match
/// semantics: the pattern must match from the first character, while the end
/// is only bounded when the pattern says so.
pub(crate) fn compile_anchored(
    pattern: &str,
    ignore_case: bool,
    multiline: bool,
    dotall: bool,
) -> Result<Regex, SchemaError> {
    RegexBuilder::new(&format!(r"\A(?:{})", pattern))
        .case_insensitive(ignore_case)
        .multi_line(multiline)
        .dot_matches_new_line(dotall)
        .build()
        .map_err(|e| SchemaError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// The fixed patterns accepted by the `mac` validator: six pairs or three
/// quads of hex digits with a consistent `:` or `-` separator, or the bare
/// twelve-digit form.
pub(crate) fn mac_patterns() -> Vec<Regex> {
    [
        r"^([0-9a-fA-F]{2}:){5}[0-9a-fA-F]{2}$",
        r"^([0-9a-fA-F]{2}-){5}[0-9a-fA-F]{2}$",
        r"^([0-9a-fA-F]{4}:){2}[0-9a-fA-F]{4}$",
        r"^([0-9a-fA-F]{4}-){2}[0-9a-fA-F]{4}$",
        r"^[0-9a-fA-F]{12}$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::Mapping;

    #[test]
    fn test_scalar_predicates() {
        let str_v = Validator::Str {
            constraints: vec![],
        };
        assert!(str_v.is_valid(&Value::Str("x".into())));
        assert!(!str_v.is_valid(&Value::Int(5)));
        assert!(!str_v.is_valid(&Value::Null));

        let int_v = Validator::Int {
            constraints: vec![],
        };
        assert!(int_v.is_valid(&Value::Int(5)));
        assert!(!int_v.is_valid(&Value::Float(5.0)));
        assert!(!int_v.is_valid(&Value::Bool(true)));

        let num_v = Validator::Num {
            constraints: vec![],
        };
        assert!(num_v.is_valid(&Value::Int(5)));
        assert!(num_v.is_valid(&Value::Float(5.5)));
        assert!(!num_v.is_valid(&Value::Str("5".into())));
    }

    #[test]
    fn test_container_predicates() {
        let map_v = Validator::Map { validators: vec![] };
        assert!(map_v.is_valid(&Value::Map(Mapping::new())));
        assert!(!map_v.is_valid(&Value::Seq(vec![])));

        let list_v = Validator::List {
            validators: vec![],
            constraints: vec![],
        };
        assert!(list_v.is_valid(&Value::Seq(vec![])));
        assert!(!list_v.is_valid(&Value::Str("not a list".into())));
    }

    #[test]
    fn test_day_accepts_timestamp() {
        let day = Validator::Day {
            constraints: vec![],
        };
        let ts = chrono::NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert!(day.is_valid(&Value::Timestamp(ts)));

        let timestamp = Validator::Timestamp {
            constraints: vec![],
        };
        let date = chrono::NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert!(!timestamp.is_valid(&Value::Date(date)));
    }

    #[test]
    fn test_enum_membership_and_message() {
        let v = Validator::Enum {
            values: vec![Value::Str("a".into()), Value::Str("b".into()), Value::Int(3)],
        };
        assert!(v.is_valid(&Value::Str("a".into())));
        assert!(v.is_valid(&Value::Int(3)));
        assert!(!v.is_valid(&Value::Str("c".into())));

        let violation = v.fail(Path::root().key("kind"), &Value::Str("c".into()));
        assert_eq!(violation.to_string(), "kind: 'c' not in ('a', 'b', 3)");
    }

    #[test]
    fn test_regex_is_start_anchored() {
        let v = Validator::Regex {
            patterns: vec![compile_anchored("abc", false, false, false).unwrap()],
            name: None,
        };
        assert!(v.is_valid(&Value::Str("abcdef".into())));
        assert!(!v.is_valid(&Value::Str("xabc".into())));
    }

    #[test]
    fn test_regex_any_pattern_matches() {
        let v = Validator::Regex {
            patterns: vec![
                compile_anchored("^cat$", false, false, false).unwrap(),
                compile_anchored("^dog$", false, false, false).unwrap(),
            ],
            name: Some("pet".into()),
        };
        assert!(v.is_valid(&Value::Str("dog".into())));
        assert!(!v.is_valid(&Value::Str("fish".into())));

        let violation = v.fail(Path::root().key("pet"), &Value::Str("fish".into()));
        assert_eq!(violation.to_string(), "pet: 'fish' is not a pet.");
    }

    #[test]
    fn test_ignore_case_flag() {
        let v = Validator::Regex {
            patterns: vec![compile_anchored("^ok$", true, false, false).unwrap()],
            name: None,
        };
        assert!(v.is_valid(&Value::Str("OK".into())));
    }

    #[test]
    fn test_ip_predicate() {
        let v = Validator::Ip {
            constraints: vec![],
        };
        assert!(v.is_valid(&Value::Str("192.168.1.1".into())));
        assert!(v.is_valid(&Value::Str("192.168.1.0/24".into())));
        assert!(v.is_valid(&Value::Str("2001:db8::1".into())));
        assert!(!v.is_valid(&Value::Str("999.1.1.1".into())));
        assert!(!v.is_valid(&Value::Int(5)));
    }

    #[test]
    fn test_mac_predicate() {
        let v = Validator::Mac {
            patterns: mac_patterns(),
        };
        assert!(v.is_valid(&Value::Str("01:23:45:67:89:ab".into())));
        assert!(v.is_valid(&Value::Str("01-23-45-67-89-AB".into())));
        assert!(!v.is_valid(&Value::Str("0123.456789ab".into())));
        assert!(v.is_valid(&Value::Str("0123:4567:89ab".into())));
        assert!(v.is_valid(&Value::Str("0123456789ab".into())));
        assert!(!v.is_valid(&Value::Str("01:23:45:67:89".into())));
        assert!(!v.is_valid(&Value::Str("01:23-45:67-89:ab".into())));
    }

    #[test]
    fn test_null_predicate() {
        assert!(Validator::Null.is_valid(&Value::Null));
        assert!(!Validator::Null.is_valid(&Value::Str("null".into())));
    }

    #[test]
    fn test_custom_validator_plugs_in() {
        #[derive(Debug)]
        struct EvenInt;

        impl CustomValidator for EvenInt {
            fn tag(&self) -> &str {
                "even_int"
            }
            fn is_valid(&self, value: &Value) -> bool {
                matches!(value, Value::Int(i) if i % 2 == 0)
            }
        }

        let v = Validator::Custom(Arc::new(EvenInt));
        assert_eq!(v.tag(), "even_int");
        assert!(v.is_valid(&Value::Int(4)));
        assert!(!v.is_valid(&Value::Int(3)));

        let violation = v.fail(Path::root().key("n"), &Value::Int(3));
        assert_eq!(violation.to_string(), "n: '3' is not a even_int.");
    }
}
