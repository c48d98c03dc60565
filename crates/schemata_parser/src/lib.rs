//! Reader for schemata documents (YAML and JSON).
//!
//! This crate turns raw schema and data sources into the generic
//! `schemata_core::Value` trees the engine consumes. YAML sources may hold
//! multiple documents; JSON sources always hold exactly one.
//!
//! Unquoted YAML scalars that look like dates (`2018-01-01`) or timestamps
//! (`2018-01-01 09:00:00`, RFC 3339) resolve to date/timestamp values, the
//! way the usual YAML loaders resolve them. JSON strings are left untouched,
//! since JSON has no date scalar.
//!
//! # Example
//!
//! ```rust
//! use schemata_parser::parse_yaml;
//!
//! let docs = parse_yaml("name: str()\nage: int(min=0)").unwrap();
//! assert_eq!(docs.len(), 1);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemata_core::{Document, Mapping, Value};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading documents.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// YAML format (.yml, .yaml), possibly multi-document
    Yaml,
    /// JSON format (.json), single document
    Json,
}

/// Parse every document in a YAML string.
///
/// An empty string yields an empty list; see [`load_data`] for the
/// empty-file-as-empty-mapping convention used for data sources.
pub fn parse_yaml(content: &str) -> Result<Vec<Value>> {
    let mut docs = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(content) {
        let value = serde_yaml_ng::Value::deserialize(document)?;
        docs.push(from_yaml(value));
    }
    Ok(docs)
}

/// Parse a JSON string into a single-document list.
pub fn parse_json(content: &str) -> Result<Vec<Value>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(vec![from_json(value)])
}

/// Detect the source format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `SourceFormat::Yaml`
/// * `.json` → `SourceFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not
/// recognized.
pub fn detect_format(path: &Path) -> Result<SourceFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(SourceFormat::Yaml),
        "json" => Ok(SourceFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse every document in a file, with automatic format detection.
pub fn parse_file(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)?;
    match detect_format(path)? {
        SourceFormat::Yaml => parse_yaml(&content),
        SourceFormat::Json => parse_json(&content),
    }
}

/// Load a data file as labeled documents for validation.
///
/// A file with zero documents is treated as a single empty-mapping document
/// rather than an error, so an empty data file validates against the
/// schema's required keys.
pub fn load_data(path: &Path) -> Result<Vec<Document>> {
    let docs = parse_file(path)?;
    Ok(label_documents(docs, &path.display().to_string()))
}

/// Pairs parsed documents with a source label, applying the empty-source
/// convention.
pub fn label_documents(docs: Vec<Value>, label: &str) -> Vec<Document> {
    if docs.is_empty() {
        return vec![Document::new(Value::Map(Mapping::new()), label)];
    }
    docs.into_iter()
        .map(|data| Document::new(data, label))
        .collect()
}

fn from_yaml(value: serde_yaml_ng::Value) -> Value {
    match value {
        serde_yaml_ng::Value::Null => Value::Null,
        serde_yaml_ng::Value::Bool(b) => Value::Bool(b),
        serde_yaml_ng::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        serde_yaml_ng::Value::String(s) => resolve_scalar(s),
        serde_yaml_ng::Value::Sequence(items) => {
            Value::Seq(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml_ng::Value::Mapping(entries) => {
            let mut out = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(key_to_string(key), from_yaml(value));
            }
            Value::Map(out)
        }
        serde_yaml_ng::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

/// Mapping keys are stringified; non-string scalar keys (ints, bools) keep
/// their scalar rendering so paths stay readable.
fn key_to_string(key: serde_yaml_ng::Value) -> String {
    match key {
        serde_yaml_ng::Value::String(s) => s,
        other => from_yaml(other).to_string(),
    }
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::Seq(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(entries) => {
            let mut out = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(key, from_json(value));
            }
            Value::Map(out)
        }
    }
}

/// Resolves a YAML string scalar into a date or timestamp when it has one of
/// the recognized shapes, leaving everything else as a plain string.
fn resolve_scalar(s: String) -> Value {
    // Cheap shape gate: every recognized form starts with a 4-digit year.
    if s.len() < 10 || !s.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return Value::Str(s);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Value::Date(d);
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(t) = NaiveDateTime::parse_from_str(&s, format) {
            return Value::Timestamp(t);
        }
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(&s) {
        return Value::Timestamp(t.naive_utc());
    }
    Value::Str(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_single_document() {
        let docs = parse_yaml("name: str()\nage: int(min=0)").unwrap();
        assert_eq!(docs.len(), 1);
        let root = docs[0].as_map().expect("root should be a mapping");
        assert_eq!(root.get("name"), Some(&Value::Str("str()".into())));
        assert_eq!(root.get("age"), Some(&Value::Str("int(min=0)".into())));
    }

    #[test]
    fn test_parse_multi_document() {
        let yaml = "person: include('person')\n---\nperson:\n  name: str()\n";
        let docs = parse_yaml(yaml).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[1].as_map().unwrap().contains_key("person"));
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(parse_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_scalar_types() {
        let docs = parse_yaml("i: 3\nf: 3.5\nb: true\nn: null\ns: hello").unwrap();
        let root = docs[0].as_map().unwrap();
        assert_eq!(root.get("i"), Some(&Value::Int(3)));
        assert_eq!(root.get("f"), Some(&Value::Float(3.5)));
        assert_eq!(root.get("b"), Some(&Value::Bool(true)));
        assert_eq!(root.get("n"), Some(&Value::Null));
        assert_eq!(root.get("s"), Some(&Value::Str("hello".into())));
    }

    #[test]
    fn test_date_resolution() {
        let docs = parse_yaml("d: 2018-01-01\nt: 2018-01-01 09:30:00").unwrap();
        let root = docs[0].as_map().unwrap();
        assert_eq!(
            root.get("d"),
            Some(&Value::Date(
                chrono::NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
            ))
        );
        assert!(matches!(root.get("t"), Some(Value::Timestamp(_))));
    }

    #[test]
    fn test_rfc3339_resolution() {
        let docs = parse_yaml("t: 2018-01-01T09:30:00+00:00").unwrap();
        let root = docs[0].as_map().unwrap();
        assert!(matches!(root.get("t"), Some(Value::Timestamp(_))));
    }

    #[test]
    fn test_date_like_prefix_stays_string() {
        let docs = parse_yaml("s: 2018-01-01 was a Monday").unwrap();
        let root = docs[0].as_map().unwrap();
        assert_eq!(
            root.get("s"),
            Some(&Value::Str("2018-01-01 was a Monday".into()))
        );
    }

    #[test]
    fn test_expression_strings_stay_strings() {
        let docs = parse_yaml("v: str(min=1)").unwrap();
        let root = docs[0].as_map().unwrap();
        assert_eq!(root.get("v"), Some(&Value::Str("str(min=1)".into())));
    }

    #[test]
    fn test_mapping_preserves_document_order() {
        let docs = parse_yaml("z: 1\na: 2\nm: 3").unwrap();
        let keys: Vec<&str> = docs[0]
            .as_map()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let docs = parse_yaml("1: one\ntrue: yes").unwrap();
        let root = docs[0].as_map().unwrap();
        assert!(root.contains_key("1"));
        assert!(root.contains_key("true"));
    }

    #[test]
    fn test_parse_json() {
        let docs = parse_json(r#"{"name": "Al", "age": 30, "date": "2018-01-01"}"#).unwrap();
        assert_eq!(docs.len(), 1);
        let root = docs[0].as_map().unwrap();
        assert_eq!(root.get("age"), Some(&Value::Int(30)));
        // JSON has no date scalar, so the string is left alone.
        assert_eq!(root.get("date"), Some(&Value::Str("2018-01-01".into())));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_yaml("a: [unclosed");
        assert!(matches!(result.unwrap_err(), ParserError::YamlError(_)));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("schema.yaml")).unwrap(),
            SourceFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("schema.yml")).unwrap(),
            SourceFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("data.json")).unwrap(),
            SourceFormat::Json
        );
        assert!(matches!(
            detect_format(Path::new("schema.toml")).unwrap_err(),
            ParserError::UnsupportedFormat(_)
        ));
        assert!(matches!(
            detect_format(Path::new("schema")).unwrap_err(),
            ParserError::InvalidExtension
        ));
    }

    #[test]
    fn test_empty_source_becomes_empty_mapping_document() {
        let documents = label_documents(vec![], "empty.yaml");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].label, "empty.yaml");
        assert_eq!(documents[0].data, Value::Map(Mapping::new()));
    }

    #[test]
    fn test_multi_document_labels() {
        let docs = parse_yaml("a: 1\n---\nb: 2\n").unwrap();
        let documents = label_documents(docs, "data.yaml");
        assert_eq!(documents.len(), 2);
        assert!(documents.iter().all(|d| d.label == "data.yaml"));
    }
}
