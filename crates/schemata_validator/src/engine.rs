//! The recursive matching engine.
//!
//! Traversal is driven by the schema tree, not the data tree, so that
//! missing-but-required keys are still detected. Every mismatch becomes a
//! collected `Violation`; the engine itself only fails fatally for schema
//! problems (currently: an include referencing an unregistered name), and it
//! does so before any data is examined.
//!
//! Any-of evaluation order is part of the observable contract: candidates are
//! tried in declaration order and, when all of them fail, the first
//! candidate's violations are the ones surfaced.

use crate::error::SchemaError;
use crate::schema::{Schema, SchemaNode};
use crate::validators::Validator;
use schemata_core::{
    Document, DocumentResult, Path, ValidationReport, ValidationStats, Value, Violation,
};
use std::time::Instant;
use tracing::debug;

impl Schema {
    /// Validates a single data tree, returning every violation found.
    ///
    /// An empty list signifies success. Fails fatally only when the schema
    /// references an unregistered include.
    pub fn validate(&self, data: &Value, strict: bool) -> Result<Vec<Violation>, SchemaError> {
        self.check_includes()?;
        let matcher = Matcher { schema: self };
        Ok(matcher.check_node(self.root(), Some(data), &Path::root(), strict))
    }
}

/// Validates an ordered list of documents against one schema.
///
/// Each document gets its own labeled result; the report aggregates them in
/// input order. Use [`ValidationReport::into_result`] to turn a failed report
/// into an error.
pub fn validate(
    schema: &Schema,
    documents: &[Document],
    strict: bool,
) -> Result<ValidationReport, SchemaError> {
    schema.check_includes()?;
    let start = Instant::now();
    let matcher = Matcher { schema };

    let mut results = Vec::with_capacity(documents.len());
    for document in documents {
        let violations =
            matcher.check_node(schema.root(), Some(&document.data), &Path::root(), strict);
        debug!(
            label = %document.label,
            violations = violations.len(),
            "validated document"
        );
        results.push(DocumentResult {
            label: document.label.clone(),
            violations,
        });
    }

    let stats = ValidationStats {
        documents_validated: results.len(),
        violations: results.iter().map(|r| r.violations.len()).sum(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Ok(ValidationReport { results, stats })
}

struct Matcher<'a> {
    schema: &'a Schema,
}

impl Matcher<'_> {
    fn check_node(
        &self,
        node: &SchemaNode,
        value: Option<&Value>,
        path: &Path,
        strict: bool,
    ) -> Vec<Violation> {
        match node {
            SchemaNode::Field {
                required,
                candidates,
            } => match value {
                None => {
                    if *required {
                        vec![Violation::required(path.clone())]
                    } else {
                        Vec::new()
                    }
                }
                Some(v) => self.check_any_of(candidates, v, path, strict),
            },

            SchemaNode::Map { entries } => match value {
                Some(Value::Map(data)) => {
                    let mut out = Vec::new();
                    for (key, child) in entries {
                        out.extend(self.check_node(child, data.get(key), &path.key(key), strict));
                    }
                    if strict {
                        for key in data.keys() {
                            if !entries.contains_key(key) {
                                out.push(Violation::unexpected_key(path.key(key)));
                            }
                        }
                    }
                    out
                }
                Some(other) => vec![Violation::type_mismatch(path.clone(), other, "map")],
                // Absent subtree: every required leaf below it is reported.
                None => entries
                    .iter()
                    .flat_map(|(key, child)| self.check_node(child, None, &path.key(key), strict))
                    .collect(),
            },

            SchemaNode::Seq { entries } => match value {
                Some(Value::Seq(items)) => {
                    let mut out = Vec::new();
                    for (index, child) in entries.iter().enumerate() {
                        out.extend(self.check_node(
                            child,
                            items.get(index),
                            &path.index(index),
                            strict,
                        ));
                    }
                    if strict {
                        for index in entries.len()..items.len() {
                            out.push(Violation::unexpected_element(path.index(index)));
                        }
                    }
                    out
                }
                Some(other) => vec![Violation::type_mismatch(path.clone(), other, "list")],
                None => entries
                    .iter()
                    .enumerate()
                    .flat_map(|(index, child)| {
                        self.check_node(child, None, &path.index(index), strict)
                    })
                    .collect(),
            },
        }
    }

    /// Tries candidates in order; the node is satisfied by the first clean
    /// one, and the first candidate's violations are surfaced when none is.
    fn check_any_of(
        &self,
        candidates: &[Validator],
        value: &Value,
        path: &Path,
        strict: bool,
    ) -> Vec<Violation> {
        let mut first_failure: Option<Vec<Violation>> = None;
        for candidate in candidates {
            let violations = self.check_validator(candidate, value, path, strict);
            if violations.is_empty() {
                return Vec::new();
            }
            if first_failure.is_none() {
                first_failure = Some(violations);
            }
        }
        first_failure.unwrap_or_default()
    }

    fn check_validator(
        &self,
        validator: &Validator,
        value: &Value,
        path: &Path,
        strict: bool,
    ) -> Vec<Violation> {
        match validator {
            Validator::Include {
                name,
                strict: strict_override,
            } => {
                // Presence is guaranteed: check_includes ran before any data.
                let node = self
                    .schema
                    .include(name)
                    .expect("include resolved before validation");
                self.check_node(node, Some(value), path, strict_override.unwrap_or(strict))
            }

            Validator::Any { validators } => {
                if validators.is_empty() {
                    Vec::new()
                } else {
                    self.check_any_of(validators, value, path, strict)
                }
            }

            _ => {
                // Type mismatch short-circuits: constraints assume a
                // well-typed value.
                if !validator.is_valid(value) {
                    return vec![validator.fail(path.clone(), value)];
                }

                let mut out = Vec::new();
                for constraint in validator.constraints() {
                    if let Some(message) = constraint.check(value) {
                        out.push(Violation::constraint(path.clone(), message));
                    }
                }

                match validator {
                    Validator::Map { validators } if !validators.is_empty() => {
                        if let Some(entries) = value.as_map() {
                            for (key, child_value) in entries {
                                out.extend(self.check_any_of(
                                    validators,
                                    child_value,
                                    &path.key(key),
                                    strict,
                                ));
                            }
                        }
                    }
                    Validator::List { validators, .. } if !validators.is_empty() => {
                        if let Some(items) = value.as_seq() {
                            for (index, item) in items.iter().enumerate() {
                                out.extend(self.check_any_of(
                                    validators,
                                    item,
                                    &path.index(index),
                                    strict,
                                ));
                            }
                        }
                    }
                    _ => {}
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use schemata_core::Mapping;

    fn map(pairs: &[(&str, Value)]) -> Value {
        let mut m = Mapping::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        Value::Map(m)
    }

    fn schema_of(doc: &Value) -> Schema {
        Schema::new(doc, Registry::built_in()).unwrap()
    }

    fn messages(violations: &[Violation]) -> Vec<String> {
        violations.iter().map(|v| v.to_string()).collect()
    }

    fn person_schema() -> Schema {
        schema_of(&map(&[
            ("name", Value::Str("str()".into())),
            ("age", Value::Str("int(min=0)".into())),
        ]))
    }

    #[test]
    fn test_valid_document() {
        let data = map(&[
            ("name", Value::Str("Al".into())),
            ("age", Value::Int(30)),
        ]);
        let violations = person_schema().validate(&data, false).unwrap();
        assert!(violations.is_empty(), "unexpected: {:?}", violations);
    }

    #[test]
    fn test_constraint_violation_at_path() {
        let data = map(&[
            ("name", Value::Str("Al".into())),
            ("age", Value::Int(-1)),
        ]);
        let violations = person_schema().validate(&data, false).unwrap();
        assert_eq!(messages(&violations), vec!["age: -1 is less than 0"]);
    }

    #[test]
    fn test_type_mismatch_and_required_together() {
        let data = map(&[("name", Value::Int(5))]);
        let violations = person_schema().validate(&data, false).unwrap();
        assert_eq!(
            messages(&violations),
            vec!["name: '5' is not a str.", "age: is required"]
        );
    }

    #[test]
    fn test_required_suppresses_constraint_checks() {
        let data = map(&[("name", Value::Str("Al".into()))]);
        let violations = person_schema().validate(&data, false).unwrap();
        assert_eq!(messages(&violations), vec!["age: is required"]);
    }

    #[test]
    fn test_optional_key_may_be_absent() {
        let schema = schema_of(&map(&[("nick", Value::Str("str(required=False)".into()))]));
        let violations = schema.validate(&map(&[]), false).unwrap();
        assert!(violations.is_empty());
    }

    #[test]
    fn test_root_type_mismatch() {
        let violations = person_schema().validate(&Value::Int(5), false).unwrap();
        assert_eq!(messages(&violations), vec!["'5' is not a map."]);
    }

    #[test]
    fn test_strict_flags_undeclared_keys() {
        let data = map(&[
            ("name", Value::Str("Al".into())),
            ("age", Value::Int(1)),
            ("extra", Value::Int(1)),
        ]);
        let schema = person_schema();
        assert!(schema.validate(&data, false).unwrap().is_empty());

        let violations = schema.validate(&data, true).unwrap();
        assert_eq!(messages(&violations), vec!["extra: unexpected key"]);
    }

    #[test]
    fn test_any_of_surfaces_first_candidate_errors() {
        let forward = schema_of(&map(&[("v", Value::Str("any(int(), day())".into()))]));
        let data = map(&[("v", Value::Str("x".into()))]);
        assert_eq!(
            messages(&forward.validate(&data, false).unwrap()),
            vec!["v: 'x' is not a int."]
        );

        let reversed = schema_of(&map(&[("v", Value::Str("any(day(), int())".into()))]));
        assert_eq!(
            messages(&reversed.validate(&data, false).unwrap()),
            vec!["v: 'x' is not a day."]
        );
    }

    #[test]
    fn test_any_of_passes_on_any_candidate() {
        let schema = schema_of(&map(&[("v", Value::Str("any(int(), str())".into()))]));
        assert!(
            schema
                .validate(&map(&[("v", Value::Str("x".into()))]), false)
                .unwrap()
                .is_empty()
        );
        assert!(
            schema
                .validate(&map(&[("v", Value::Int(1))]), false)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_empty_any_accepts_everything() {
        let schema = schema_of(&map(&[("v", Value::Str("any()".into()))]));
        assert!(
            schema
                .validate(&map(&[("v", Value::Null)]), false)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_list_elements_and_length_checked_independently() {
        let schema = schema_of(&map(&[("xs", Value::Str("list(int(), min=1)".into()))]));

        let data = map(&[(
            "xs",
            Value::Seq(vec![
                Value::Int(1),
                Value::Str("x".into()),
                Value::Int(3),
            ]),
        )]);
        assert_eq!(
            messages(&schema.validate(&data, false).unwrap()),
            vec!["xs[1]: 'x' is not a int."]
        );

        let empty = map(&[("xs", Value::Seq(vec![]))]);
        assert_eq!(
            messages(&schema.validate(&empty, false).unwrap()),
            vec!["xs: Length of [] is less than 1"]
        );
    }

    #[test]
    fn test_dynamic_map_checks_every_value() {
        let schema = schema_of(&map(&[("scores", Value::Str("map(int())".into()))]));
        let data = map(&[(
            "scores",
            map(&[("a", Value::Int(1)), ("b", Value::Str("x".into()))]),
        )]);
        assert_eq!(
            messages(&schema.validate(&data, false).unwrap()),
            vec!["scores.b: 'x' is not a int."]
        );
    }

    #[test]
    fn test_strict_does_not_flag_dynamic_map_keys() {
        let schema = schema_of(&map(&[("scores", Value::Str("map(int())".into()))]));
        let data = map(&[("scores", map(&[("anything", Value::Int(1))]))]);
        assert!(schema.validate(&data, true).unwrap().is_empty());
    }

    #[test]
    fn test_static_sequence_positions() {
        let doc = map(&[(
            "pair",
            Value::Seq(vec![
                Value::Str("str()".into()),
                Value::Str("int()".into()),
            ]),
        )]);
        let schema = schema_of(&doc);

        let short = map(&[("pair", Value::Seq(vec![Value::Str("a".into())]))]);
        assert_eq!(
            messages(&schema.validate(&short, false).unwrap()),
            vec!["pair[1]: is required"]
        );

        let long = map(&[(
            "pair",
            Value::Seq(vec![Value::Str("a".into()), Value::Int(1), Value::Int(2)]),
        )]);
        assert!(schema.validate(&long, false).unwrap().is_empty());
        assert_eq!(
            messages(&schema.validate(&long, true).unwrap()),
            vec!["pair[2]: unexpected element"]
        );
    }

    #[test]
    fn test_missing_nested_map_reports_each_required_leaf() {
        let doc = map(&[(
            "address",
            map(&[
                ("street", Value::Str("str()".into())),
                ("city", Value::Str("str()".into())),
            ]),
        )]);
        let schema = schema_of(&doc);
        let violations = schema.validate(&map(&[]), false).unwrap();
        assert_eq!(
            messages(&violations),
            vec!["address.street: is required", "address.city: is required"]
        );
    }

    fn user_list_schema() -> Schema {
        let root = map(&[("users", Value::Str("list(include('user'))".into()))]);
        let mut schema = schema_of(&root);
        schema
            .add_include(&map(&[(
                "user",
                map(&[("email", Value::Str("str(matches='.+@.+')".into()))]),
            )]))
            .unwrap();
        schema
    }

    #[test]
    fn test_include_paths_compose() {
        let schema = user_list_schema();
        let data = map(&[(
            "users",
            Value::Seq(vec![
                map(&[("email", Value::Str("a@b".into()))]),
                map(&[("email", Value::Str("c@d".into()))]),
                map(&[("email", Value::Str("nope".into()))]),
            ]),
        )]);
        assert_eq!(
            messages(&schema.validate(&data, false).unwrap()),
            vec!["users[2].email: nope does not match regex '.+@.+'"]
        );
    }

    #[test]
    fn test_include_inherits_strict_flag() {
        let schema = user_list_schema();
        let data = map(&[(
            "users",
            Value::Seq(vec![map(&[
                ("email", Value::Str("a@b".into())),
                ("extra", Value::Int(1)),
            ])]),
        )]);
        assert!(schema.validate(&data, false).unwrap().is_empty());
        assert_eq!(
            messages(&schema.validate(&data, true).unwrap()),
            vec!["users[0].extra: unexpected key"]
        );
    }

    #[test]
    fn test_include_strict_override() {
        let root = map(&[("user", Value::Str("include('user', strict=True)".into()))]);
        let mut schema = schema_of(&root);
        schema
            .add_include(&map(&[(
                "user",
                map(&[("name", Value::Str("str()".into()))]),
            )]))
            .unwrap();

        let data = map(&[(
            "user",
            map(&[("name", Value::Str("Al".into())), ("extra", Value::Int(1))]),
        )]);
        // The include forces strict inside its subtree even when the call
        // itself is lax.
        assert_eq!(
            messages(&schema.validate(&data, false).unwrap()),
            vec!["user.extra: unexpected key"]
        );
    }

    #[test]
    fn test_missing_include_is_fatal_before_data() {
        let schema = schema_of(&map(&[("a", Value::Str("include('gone')".into()))]));
        let err = schema.validate(&map(&[]), false).unwrap_err();
        assert!(matches!(err, SchemaError::MissingInclude(ref name) if name == "gone"));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let schema = person_schema();
        let data = map(&[("name", Value::Int(5)), ("age", Value::Str("x".into()))]);
        let first = messages(&schema.validate(&data, true).unwrap());
        let second = messages(&schema.validate(&data, true).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_documents_labels_results() {
        let schema = person_schema();
        let good = map(&[
            ("name", Value::Str("Al".into())),
            ("age", Value::Int(1)),
        ]);
        let bad = map(&[("name", Value::Str("Bo".into()))]);
        let documents = vec![
            Document::new(good, "good.yaml"),
            Document::new(bad, "bad.yaml"),
        ];

        let report = validate(&schema, &documents, false).unwrap();
        assert!(!report.passed());
        assert_eq!(report.stats.documents_validated, 2);
        assert_eq!(report.error_count(), 1);
        assert!(report.results[0].passed());
        assert_eq!(report.results[1].label, "bad.yaml");

        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.failures.len(), 1);
        assert_eq!(failure.failures[0].messages(), vec!["age: is required"]);
    }
}
