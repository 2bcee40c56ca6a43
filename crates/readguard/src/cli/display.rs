//! Common display utilities for CLI commands.

use std::path::{Path, PathBuf};

use colored::Colorize;
use readguard::{FileError, Finding, Severity};

const MAX_DISPLAY_ITEMS: usize = 10;

/// Print one finding as `path:line:col: severity[rule]: message`.
pub fn print_finding(path: &Path, finding: &Finding) {
    let severity = match finding.severity {
        Severity::Error => finding.severity.as_str().red().bold(),
        Severity::Warning => finding.severity.as_str().yellow().bold(),
        Severity::Info => finding.severity.as_str().cyan().bold(),
    };
    println!(
        "{}:{}: {}[{}]: {}",
        path.display().to_string().white().bold(),
        finding.span,
        severity,
        finding.rule_id.dimmed(),
        finding.message
    );
}

/// Print per-file errors, truncated after `MAX_DISPLAY_ITEMS`.
pub fn print_errors(errors: &[FileError]) {
    if errors.is_empty() {
        return;
    }

    println!();
    println!("{} ({}):", "Errors".red().bold(), errors.len());
    for err in errors.iter().take(MAX_DISPLAY_ITEMS) {
        println!(
            "  {} {}: {} ({})",
            "•".red(),
            err.path.display(),
            err.message,
            err.kind
        );
    }
    if errors.len() > MAX_DISPLAY_ITEMS {
        println!("  ... and {} more", errors.len() - MAX_DISPLAY_ITEMS);
    }
}

/// Print directories that could not be read.
pub fn print_skipped_directories(skipped: &[(PathBuf, String)]) {
    if skipped.is_empty() {
        return;
    }
    println!(
        "{}: {} directories (unreadable)",
        "Skipped".yellow(),
        skipped.len()
    );
    for (dir, reason) in skipped.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {}: {}", "•".dimmed(), dir.display(), reason.dimmed());
    }
}
