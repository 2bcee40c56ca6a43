//! `readguard fix` command implementation.

use std::path::{Path, PathBuf};

use colored::Colorize;
use readguard::Readguard;
use readguard::rule::FIX_TITLE;

use super::display::print_errors;

/// Run the fix command. Returns `true` when something could not be fixed.
pub fn run(workspace: &Path, paths: &[PathBuf], dry_run: bool) -> Result<bool, readguard::Error> {
    let readguard = Readguard::new(workspace)?;
    let report = readguard.fix_workspace(paths, dry_run)?;

    for file in &report.files {
        if dry_run {
            println!("{} {}", "---".dimmed(), file.path.display().to_string().white().bold());
            print!("{}", file.text);
            if !file.text.ends_with('\n') {
                println!();
            }
        } else {
            println!(
                "{} {} ({} applied)",
                FIX_TITLE.green().bold(),
                file.path.display(),
                file.applied
            );
        }
        if file.skipped > 0 {
            println!(
                "  {}: {} finding{} could not be fixed",
                "Skipped".yellow(),
                file.skipped,
                if file.skipped == 1 { "" } else { "s" }
            );
        }
    }

    println!();
    let verb = if dry_run { "Would apply" } else { "Applied" };
    println!(
        "{} {} fix{} across {} file{} ({} checked)",
        verb.green().bold(),
        report.applied_count(),
        if report.applied_count() == 1 { "" } else { "es" },
        report.files.len(),
        if report.files.len() == 1 { "" } else { "s" },
        report.files_checked
    );

    print_errors(&report.errors);

    let unfixed = report.files.iter().any(|f| f.skipped > 0);
    Ok(unfixed || !report.errors.is_empty())
}
