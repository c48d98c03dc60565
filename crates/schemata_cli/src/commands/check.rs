use anyhow::{Context, Result};
use schemata_parser::parse_file;
use schemata_validator::{Registry, SchemaNode, make_schema};
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(schema_path: &str, format: &str) -> Result<()> {
    info!("Checking schema: {}", schema_path);

    let docs = parse_file(Path::new(schema_path))
        .with_context(|| format!("Failed to read schema file: {}", schema_path))?;
    let schema = make_schema(&docs, Registry::built_in())
        .with_context(|| format!("Invalid schema: {}", schema_path))?;
    schema
        .check_includes()
        .with_context(|| format!("Invalid schema: {}", schema_path))?;

    let fields = match schema.root() {
        SchemaNode::Map { entries } => entries.len(),
        SchemaNode::Seq { entries } => entries.len(),
        SchemaNode::Field { .. } => 1,
    };
    let mut includes: Vec<String> = schema
        .include_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    includes.sort();

    output::print_schema_summary(schema_path, fields, &includes, format);
    Ok(())
}
