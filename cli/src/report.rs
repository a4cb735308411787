//! Diagnostic rendering in three forms: the default human form,
//! `--format json`, and `--format ci` (GitHub Actions-style `::severity
//! file=…,line=…,col=…::…` annotations).

use clap::ValueEnum;
use moxie_core::diagnostics::Diagnostics;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Format {
    Human,
    Json,
    Ci,
}

#[derive(Serialize)]
struct JsonIssue {
    file: String,
    line: usize,
    column: usize,
    severity: String,
    category: String,
    message: String,
    help: Option<String>,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    info: usize,
}

#[derive(Serialize)]
struct JsonReport {
    issues: Vec<JsonIssue>,
    summary: JsonSummary,
}

pub fn print(diagnostics: &Diagnostics, format: Format) {
    match format {
        Format::Human => print_human(diagnostics),
        Format::Json => print_json(diagnostics),
        Format::Ci => print_ci(diagnostics),
    }
}

fn print_human(diagnostics: &Diagnostics) {
    for d in diagnostics.all() {
        println!("{d}");
    }
}

fn print_json(diagnostics: &Diagnostics) {
    let (errors, warnings, info) = diagnostics.counts();
    let report = JsonReport {
        issues: diagnostics
            .all()
            .iter()
            .map(|d| JsonIssue {
                file: d.position.file.to_string(),
                line: d.position.line,
                column: d.position.column,
                severity: d.severity.to_string(),
                category: d.category.to_string(),
                message: d.message.clone(),
                help: d.help.clone(),
            })
            .collect(),
        summary: JsonSummary {
            errors,
            warnings,
            info,
        },
    };
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{text}"),
        Err(error) => log::error!("failed to serialize diagnostics report: {error}"),
    }
}

fn print_ci(diagnostics: &Diagnostics) {
    for d in diagnostics.all() {
        println!(
            "::{} file={},line={},col={}::{}",
            d.severity, d.position.file, d.position.line, d.position.column, d.message
        );
    }
}
