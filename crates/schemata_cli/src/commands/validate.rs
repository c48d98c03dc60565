use anyhow::{Context, Result};
use schemata_core::Document;
use schemata_parser::{load_data, parse_file};
use schemata_validator::{Registry, make_schema, validate};
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(schema_path: &str, data_paths: &[String], strict: bool, format: &str) -> Result<()> {
    info!("Validating against schema: {}", schema_path);
    info!("Strict mode: {}", strict);

    // Build the schema once; every data file reuses it.
    let schema_docs = parse_file(Path::new(schema_path))
        .with_context(|| format!("Failed to read schema file: {}", schema_path))?;
    let schema = make_schema(&schema_docs, Registry::built_in())
        .with_context(|| format!("Invalid schema: {}", schema_path))?;

    output::print_info(&format!(
        "Schema loaded: {} ({} document(s))",
        schema_path,
        schema_docs.len()
    ));

    let mut documents: Vec<Document> = Vec::new();
    for path in data_paths {
        let loaded =
            load_data(Path::new(path)).with_context(|| format!("Failed to read data file: {}", path))?;
        documents.extend(loaded);
    }

    let report = validate(&schema, &documents, strict)
        .with_context(|| format!("Invalid schema: {}", schema_path))?;

    output::print_validation_report(&report, format);

    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}
