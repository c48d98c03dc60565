//! Pluggable constraints.
//!
//! A constraint refines a validator's acceptance criteria: numeric or date
//! bounds, length bounds, character and value restrictions, IP version. Each
//! constraint is bound to one validator instance at schema construction time
//! and is only ever invoked on a value that already passed that validator's
//! type predicate. All constraints on a validator run; there is no
//! short-circuit between them.
//!
//! Which constraint keywords are legal on which validator tag is decided by
//! the static compatibility table in the registry. Binding an incompatible
//! keyword is a construction-time `SchemaError`, never a runtime error.

use crate::error::SchemaError;
use crate::syntax::{Arg, CallExpr};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use schemata_core::Value;
use std::net::IpAddr;

/// An ordering bound for `min`/`max` constraints.
#[derive(Debug, Clone, Copy)]
pub enum Bound {
    Num(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Num(n) => write!(f, "{}", n),
            Bound::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Bound::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Bound {
    /// Compares a type-confirmed value against the bound.
    /// Returns `None` when the value kind cannot be ordered against it.
    fn compare(&self, value: &Value) -> Option<std::cmp::Ordering> {
        match self {
            Bound::Num(n) => value.as_float()?.partial_cmp(n),
            Bound::Date(d) => value.as_date()?.partial_cmp(d),
            Bound::Timestamp(t) => value.as_timestamp()?.partial_cmp(t),
        }
    }
}

/// A single rule bound to one validator instance.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must not be below the bound
    Min(Bound),
    /// Value must not be above the bound
    Max(Bound),
    /// String or list length must not be below the bound
    LengthMin(usize),
    /// String or list length must not be above the bound
    LengthMax(usize),
    /// String must not contain any of the excluded characters
    CharacterExclude { exclude: String, ignore_case: bool },
    /// String must equal the given literal
    StringEquals { equals: String, ignore_case: bool },
    /// String must start with the given prefix
    StringStartsWith(String),
    /// String must end with the given suffix
    StringEndsWith(String),
    /// String must match the given pattern
    StringMatches(Regex),
    /// IP address must belong to the given family (4 or 6)
    IpVersion(u8),
    /// Datatype keyword must be one of the given set
    AllowedDatatypes(Vec<String>),
}

impl Constraint {
    /// Checks a type-confirmed value, returning a failure message on breach.
    pub fn check(&self, value: &Value) -> Option<String> {
        match self {
            Constraint::Min(bound) => match bound.compare(value) {
                Some(std::cmp::Ordering::Less) => {
                    Some(format!("{} is less than {}", value, bound))
                }
                _ => None,
            },
            Constraint::Max(bound) => match bound.compare(value) {
                Some(std::cmp::Ordering::Greater) => {
                    Some(format!("{} is greater than {}", value, bound))
                }
                _ => None,
            },
            Constraint::LengthMin(min) => {
                let len = value_len(value)?;
                if len < *min {
                    Some(format!("Length of {} is less than {}", value, min))
                } else {
                    None
                }
            }
            Constraint::LengthMax(max) => {
                let len = value_len(value)?;
                if len > *max {
                    Some(format!("Length of {} is greater than {}", value, max))
                } else {
                    None
                }
            }
            Constraint::CharacterExclude {
                exclude,
                ignore_case,
            } => {
                let s = value.as_str()?;
                let haystack = fold_case(s, *ignore_case);
                for c in exclude.chars() {
                    let needle = fold_case(&c.to_string(), *ignore_case);
                    if haystack.contains(&needle) {
                        return Some(format!("'{}' is in {}", c, value));
                    }
                }
                None
            }
            Constraint::StringEquals {
                equals,
                ignore_case,
            } => {
                let s = value.as_str()?;
                if fold_case(s, *ignore_case) == fold_case(equals, *ignore_case) {
                    None
                } else {
                    Some(format!("{} does not equal {}", value, equals))
                }
            }
            Constraint::StringStartsWith(prefix) => {
                let s = value.as_str()?;
                if s.starts_with(prefix) {
                    None
                } else {
                    Some(format!("{} does not start with {}", value, prefix))
                }
            }
            Constraint::StringEndsWith(suffix) => {
                let s = value.as_str()?;
                if s.ends_with(suffix) {
                    None
                } else {
                    Some(format!("{} does not end with {}", value, suffix))
                }
            }
            Constraint::StringMatches(pattern) => {
                let s = value.as_str()?;
                if pattern.is_match(s) {
                    None
                } else {
                    Some(format!("{} does not match regex '{}'", value, pattern))
                }
            }
            Constraint::IpVersion(version) => {
                let s = value.as_str()?;
                let (addr, _) = parse_ip(s)?;
                let actual: u8 = match addr {
                    IpAddr::V4(_) => 4,
                    IpAddr::V6(_) => 6,
                };
                if actual == *version {
                    None
                } else {
                    Some(format!("IP version of {} is not {}", value, version))
                }
            }
            Constraint::AllowedDatatypes(allowed) => {
                let s = value.as_str()?;
                let keyword = crate::datatype::keyword_of(s)?;
                let canonical = crate::datatype::canonical_alias(&keyword);
                if allowed.iter().any(|a| *a == keyword || *a == canonical) {
                    None
                } else {
                    Some(format!(
                        "'{}' is not in allowed datatypes ({})",
                        value,
                        allowed.join(", ")
                    ))
                }
            }
        }
    }
}

fn fold_case(s: &str, ignore_case: bool) -> String {
    if ignore_case {
        s.to_lowercase()
    } else {
        s.to_string()
    }
}

/// Length of a string (in characters) or a sequence.
fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::Str(s) => Some(s.chars().count()),
        Value::Seq(items) => Some(items.len()),
        _ => None,
    }
}

/// Parses a plain address or interface notation (`10.0.0.0/8`).
pub(crate) fn parse_ip(s: &str) -> Option<(IpAddr, Option<u8>)> {
    let (addr_part, prefix_part) = match s.split_once('/') {
        Some((a, p)) => (a, Some(p)),
        None => (s, None),
    };
    let addr: IpAddr = addr_part.parse().ok()?;
    let prefix = match prefix_part {
        None => None,
        Some(p) => {
            let bits: u8 = p.parse().ok()?;
            let max = match addr {
                IpAddr::V4(_) => 32,
                IpAddr::V6(_) => 128,
            };
            if bits > max {
                return None;
            }
            Some(bits)
        }
    };
    Some((addr, prefix))
}

// Factory helpers below turn keyword arguments into constraints. The
// registry has already verified, against the compatibility table, that every
// keyword present is legal for the tag being built.

/// Builds numeric `Min`/`Max` constraints (`int`, `num`).
pub(crate) fn numeric_bounds(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    let mut out = Vec::new();
    if let Some(n) = num_kwarg(call, "min")? {
        out.push(Constraint::Min(Bound::Num(n)));
    }
    if let Some(n) = num_kwarg(call, "max")? {
        out.push(Constraint::Max(Bound::Num(n)));
    }
    Ok(out)
}

/// Builds `LengthMin`/`LengthMax` constraints (`str`, `list`).
pub(crate) fn length_bounds(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    let mut out = Vec::new();
    if let Some(n) = len_kwarg(call, "min")? {
        out.push(Constraint::LengthMin(n));
    }
    if let Some(n) = len_kwarg(call, "max")? {
        out.push(Constraint::LengthMax(n));
    }
    Ok(out)
}

/// Builds date `Min`/`Max` constraints (`day`).
pub(crate) fn date_bounds(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    let mut out = Vec::new();
    if let Some(d) = date_kwarg(call, "min")? {
        out.push(Constraint::Min(Bound::Date(d)));
    }
    if let Some(d) = date_kwarg(call, "max")? {
        out.push(Constraint::Max(Bound::Date(d)));
    }
    Ok(out)
}

/// Builds timestamp `Min`/`Max` constraints (`timestamp`).
pub(crate) fn timestamp_bounds(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    let mut out = Vec::new();
    if let Some(t) = timestamp_kwarg(call, "min")? {
        out.push(Constraint::Min(Bound::Timestamp(t)));
    }
    if let Some(t) = timestamp_kwarg(call, "max")? {
        out.push(Constraint::Max(Bound::Timestamp(t)));
    }
    Ok(out)
}

/// Builds the string refinement constraints (`str`).
pub(crate) fn string_rules(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    let ignore_case = call.bool_kwarg("ignore_case", false)?;
    let mut out = Vec::new();
    if let Some(exclude) = call.str_kwarg("exclude")? {
        out.push(Constraint::CharacterExclude {
            exclude,
            ignore_case,
        });
    }
    if let Some(equals) = call.str_kwarg("equals")? {
        out.push(Constraint::StringEquals {
            equals,
            ignore_case,
        });
    }
    if let Some(prefix) = call.str_kwarg("starts_with")? {
        out.push(Constraint::StringStartsWith(prefix));
    }
    if let Some(suffix) = call.str_kwarg("ends_with")? {
        out.push(Constraint::StringEndsWith(suffix));
    }
    if let Some(pattern) = call.str_kwarg("matches")? {
        let compiled = Regex::new(&pattern).map_err(|e| SchemaError::Pattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        out.push(Constraint::StringMatches(compiled));
    }
    Ok(out)
}

/// Builds the `version` constraint (`ip`).
pub(crate) fn ip_rules(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    match call.kwarg("version").and_then(Arg::as_scalar) {
        None => Ok(Vec::new()),
        Some(Value::Int(4)) => Ok(vec![Constraint::IpVersion(4)]),
        Some(Value::Int(6)) => Ok(vec![Constraint::IpVersion(6)]),
        Some(other) => Err(SchemaError::arguments(
            &call.name,
            format!("'version' must be 4 or 6, got '{}'", other),
        )),
    }
}

/// Builds the `datatypes` subset constraint (`redshift_datatype`).
pub(crate) fn datatype_rules(call: &CallExpr) -> Result<Vec<Constraint>, SchemaError> {
    let arg = match call.kwarg("datatypes") {
        None => return Ok(Vec::new()),
        Some(arg) => arg,
    };
    let items = arg
        .as_scalar()
        .and_then(Value::as_seq)
        .ok_or_else(|| SchemaError::arguments(&call.name, "'datatypes' expects a list"))?;
    let mut allowed = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => allowed.push(s.to_uppercase()),
            None => {
                return Err(SchemaError::arguments(
                    &call.name,
                    "'datatypes' expects a list of strings",
                ));
            }
        }
    }
    Ok(vec![Constraint::AllowedDatatypes(allowed)])
}

fn num_kwarg(call: &CallExpr, name: &str) -> Result<Option<f64>, SchemaError> {
    match call.kwarg(name).and_then(Arg::as_scalar) {
        None => match call.kwarg(name) {
            None => Ok(None),
            Some(_) => Err(bad_kwarg(call, name, "a number")),
        },
        Some(Value::Int(i)) => Ok(Some(*i as f64)),
        Some(Value::Float(f)) => Ok(Some(*f)),
        Some(_) => Err(bad_kwarg(call, name, "a number")),
    }
}

fn len_kwarg(call: &CallExpr, name: &str) -> Result<Option<usize>, SchemaError> {
    match call.kwarg(name).and_then(Arg::as_scalar) {
        None => match call.kwarg(name) {
            None => Ok(None),
            Some(_) => Err(bad_kwarg(call, name, "a non-negative integer")),
        },
        Some(Value::Int(i)) if *i >= 0 => Ok(Some(*i as usize)),
        Some(_) => Err(bad_kwarg(call, name, "a non-negative integer")),
    }
}

fn date_kwarg(call: &CallExpr, name: &str) -> Result<Option<NaiveDate>, SchemaError> {
    match call.kwarg(name).and_then(Arg::as_scalar) {
        None => match call.kwarg(name) {
            None => Ok(None),
            Some(_) => Err(bad_kwarg(call, name, "a date")),
        },
        Some(Value::Date(d)) => Ok(Some(*d)),
        Some(Value::Str(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| bad_kwarg(call, name, "a date")),
        Some(_) => Err(bad_kwarg(call, name, "a date")),
    }
}

fn timestamp_kwarg(call: &CallExpr, name: &str) -> Result<Option<NaiveDateTime>, SchemaError> {
    match call.kwarg(name).and_then(Arg::as_scalar) {
        None => match call.kwarg(name) {
            None => Ok(None),
            Some(_) => Err(bad_kwarg(call, name, "a timestamp")),
        },
        Some(Value::Timestamp(t)) => Ok(Some(*t)),
        Some(Value::Date(d)) => Ok(d.and_hms_opt(0, 0, 0)),
        Some(Value::Str(s)) => parse_timestamp_literal(s)
            .map(Some)
            .ok_or_else(|| bad_kwarg(call, name, "a timestamp")),
        Some(_) => Err(bad_kwarg(call, name, "a timestamp")),
    }
}

fn parse_timestamp_literal(s: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn bad_kwarg(call: &CallExpr, name: &str, expected: &str) -> SchemaError {
    SchemaError::arguments(&call.name, format!("'{}' expects {}", name, expected))
}
