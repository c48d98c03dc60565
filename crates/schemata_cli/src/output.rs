use colored::*;
use schemata_core::ValidationReport;
use serde_json::json;

pub fn print_validation_report(report: &ValidationReport, format: &str) {
    match format {
        "json" => print_json_report(report),
        _ => print_text_report(report),
    }
}

fn print_text_report(report: &ValidationReport) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    if report.passed() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    for result in &report.results {
        if result.passed() {
            println!("\n{} {}", "✓".green(), result.label.green());
            continue;
        }
        println!("\n{} {}", "✗".red(), result.label.red().bold());
        for (i, violation) in result.violations.iter().enumerate() {
            println!("  {}. {}", i + 1, violation.to_string().red());
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Documents checked: {}", report.stats.documents_validated);
    println!("  Total errors:      {}", report.error_count());
    println!("  Duration:          {} ms", report.stats.duration_ms);
    println!("{}", "═".repeat(60));
}

fn print_json_report(report: &ValidationReport) {
    let output = json!({
        "passed": report.passed(),
        "documents": report.results.iter().map(|r| json!({
            "label": r.label,
            "passed": r.passed(),
            "errors": r.messages(),
        })).collect::<Vec<_>>(),
        "summary": {
            "document_count": report.stats.documents_validated,
            "error_count": report.error_count(),
            "duration_ms": report.stats.duration_ms,
        }
    });

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

pub fn print_schema_summary(path: &str, fields: usize, includes: &[String], format: &str) {
    if format == "json" {
        let output = json!({
            "schema": path,
            "valid": true,
            "root_entries": fields,
            "includes": includes,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return;
    }

    print_success(&format!("Schema OK: {}", path));
    println!("  Root entries: {}", fields);
    if includes.is_empty() {
        println!("  Includes:     none");
    } else {
        println!("  Includes:     {}", includes.join(", "));
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

#[allow(dead_code)]
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
