//! Column-datatype grammar.
//!
//! Validates Redshift column type declarations such as `VARCHAR(256)`,
//! `DECIMAL(10, 5)` or `TIMESTAMP WITHOUT TIME ZONE`. A value is classified
//! into one of three forms, then checked against the form's keyword table and
//! numeric bounds:
//!
//! 1. bare keyword, no argument
//! 2. one bracketed argument: a size or `MAX`, bounded per canonical alias
//! 3. two bracketed arguments: precision and scale, each bounded, with
//!    precision strictly greater than scale
//!
//! New domain grammars follow the same three phases: structural match, alias
//! resolution, bound check.

use regex::Regex;

const ONE_ARG: &[&str] = &[
    "CHAR",
    "CHARACTER",
    "NCHAR",
    "BPCHAR",
    "VARCHAR",
    "CHARACTER VARYING",
    "NVARCHAR",
];

const TWO_ARG: &[&str] = &["DECIMAL", "NUMERIC"];

const NO_ARG: &[&str] = &[
    "SMALLINT",
    "INT2",
    "INTEGER",
    "INT",
    "INT4",
    "BIGINT",
    "INT8",
    "REAL",
    "FLOAT4",
    "DATE",
    "DOUBLE PRECISION",
    "FLOAT8",
    "FLOAT",
    "BOOLEAN",
    "BOOL",
    "TIMESTAMP",
    "TIMESTAMPTZ",
    "TIMESTAMP WITHOUT TIME ZONE",
    "TIMESTAMP WITH TIME ZONE",
    "GEOMETRY",
    "TEXT",
];

const CHAR_RANGE: (u64, u64) = (1, 4096);
const VARCHAR_RANGE: (u64, u64) = (1, 65535);
const PRECISION_RANGE: (u64, u64) = (1, 38);
const SCALE_RANGE: (u64, u64) = (0, 37);

/// Resolves a keyword to its canonical alias (`CHARACTER` to `CHAR`,
/// `NVARCHAR` to `VARCHAR`, anything else to itself).
pub fn canonical_alias(keyword: &str) -> String {
    match keyword {
        "CHAR" | "CHARACTER" | "BPCHAR" | "NCHAR" => "CHAR".to_string(),
        "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" => "VARCHAR".to_string(),
        other => other.to_string(),
    }
}

/// Extracts the uppercased keyword portion of a datatype declaration.
pub fn keyword_of(value: &str) -> Option<String> {
    let head = match value.split_once('(') {
        Some((head, _)) => head,
        None => value,
    };
    let keyword = head.trim().to_uppercase();
    if keyword.is_empty() { None } else { Some(keyword) }
}

/// The compiled three-form classifier.
#[derive(Debug, Clone)]
pub struct DatatypeGrammar {
    single_arg: Regex,
    double_arg: Regex,
}

impl DatatypeGrammar {
    pub fn new() -> Self {
        // Patterns run against the trimmed, uppercased value.
        Self {
            single_arg: Regex::new(r"^([A-Z][A-Z ]*?)\s*\(\s*(\d+|MAX)\s*\)$").unwrap(),
            double_arg: Regex::new(r"^([A-Z][A-Z ]*?)\s*\(\s*(\d+)\s*,\s*(\d+)\s*\)$").unwrap(),
        }
    }

    /// Returns true if the declaration matches one of the three valid forms.
    pub fn check(&self, value: &str) -> bool {
        let upper = value.trim().to_uppercase();

        if NO_ARG.contains(&upper.as_str())
            || ONE_ARG.contains(&upper.as_str())
            || TWO_ARG.contains(&upper.as_str())
        {
            return true;
        }

        if let Some(captures) = self.single_arg.captures(&upper) {
            let keyword = captures[1].trim().to_string();
            if !ONE_ARG.contains(&keyword.as_str()) {
                return false;
            }
            let arg = &captures[2];
            if arg == "MAX" {
                return true;
            }
            let range = match canonical_alias(&keyword).as_str() {
                "CHAR" => CHAR_RANGE,
                _ => VARCHAR_RANGE,
            };
            return matches!(arg.parse::<u64>(), Ok(n) if range.0 <= n && n <= range.1);
        }

        if let Some(captures) = self.double_arg.captures(&upper) {
            let keyword = captures[1].trim().to_string();
            if !TWO_ARG.contains(&keyword.as_str()) {
                return false;
            }
            let (precision, scale) = match (captures[2].parse::<u64>(), captures[3].parse::<u64>())
            {
                (Ok(p), Ok(s)) => (p, s),
                _ => return false,
            };
            return PRECISION_RANGE.0 <= precision
                && precision <= PRECISION_RANGE.1
                && SCALE_RANGE.0 <= scale
                && scale <= SCALE_RANGE.1
                && precision > scale;
        }

        false
    }
}

impl Default for DatatypeGrammar {
    fn default() -> Self {
        Self::new()
    }
}
