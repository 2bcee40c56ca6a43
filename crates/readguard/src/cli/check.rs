//! `readguard check` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use readguard::{CheckReport, FileReport, Readguard};
use serde::Serialize;

use super::OutputFormat;
use super::display::{print_errors, print_finding, print_skipped_directories};

/// JSON view of a check run.
#[derive(Serialize)]
struct JsonReport<'a> {
    files_checked: usize,
    finding_count: usize,
    files: &'a [FileReport],
    errors: Vec<JsonError<'a>>,
}

#[derive(Serialize)]
struct JsonError<'a> {
    path: &'a Path,
    kind: String,
    message: &'a str,
}

/// Run the check command. Returns `true` when findings were reported.
pub fn run(workspace: &Path, paths: &[PathBuf], format: OutputFormat) -> Result<bool, readguard::Error> {
    let readguard = Readguard::new(workspace)?;
    let report = readguard.check(paths)?;

    match format {
        OutputFormat::Human => print_human(&report),
        OutputFormat::Json => print_json(&report)?,
    }

    Ok(report.finding_count() > 0)
}

fn print_human(report: &CheckReport) {
    for file in &report.files {
        for finding in &file.findings {
            print_finding(&file.path, finding);
        }
    }

    println!();
    let count = report.finding_count();
    let summary = format!(
        "{count} finding{} in {} file{}",
        if count == 1 { "" } else { "s" },
        report.files_checked,
        if report.files_checked == 1 { "" } else { "s" },
    );
    if count == 0 {
        println!("{} {summary}", "Clean:".green().bold());
    } else {
        println!("{} {summary}", "Found".yellow().bold());
    }
    println!("{}: {:.2?}", "Duration".dimmed(), report.duration);

    print_skipped_directories(&report.directories_skipped);
    print_errors(&report.errors);
}

fn print_json(report: &CheckReport) -> Result<(), readguard::Error> {
    let view = JsonReport {
        files_checked: report.files_checked,
        finding_count: report.finding_count(),
        files: &report.files,
        errors: report
            .errors
            .iter()
            .map(|e| JsonError {
                path: &e.path,
                kind: e.kind.to_string(),
                message: &e.message,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
