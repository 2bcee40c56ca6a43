//! Readguard CLI - discarded `Stream.Read` detection from the command line.
//!
//! Checks C# sources for `Stream.Read` calls whose byte count is thrown away,
//! and rewrites them to capture it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::OutputFormat;

/// Exit code when the run succeeded but found something to report.
const EXIT_FINDINGS: u8 = 1;

/// Exit code when the run itself failed.
const EXIT_ERROR: u8 = 2;

/// Readguard: flags discarded Stream.Read results in C# code.
#[derive(Parser)]
#[command(name = "readguard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Workspace root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report discarded Stream.Read results
    Check {
        /// Files or directories to check (defaults to the whole workspace)
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// Rewrite flagged calls to capture the number of bytes read
    Fix {
        /// Files or directories to fix (defaults to the whole workspace)
        paths: Vec<PathBuf>,

        /// Print the rewritten files instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Determine workspace root
    let workspace = match cli.workspace {
        Some(w) => w,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };

    let result = match cli.command {
        Commands::Check { paths, format } => cli::check::run(&workspace, &paths, format),
        Commands::Fix { paths, dry_run } => cli::fix::run(&workspace, &paths, dry_run),
    };

    match result {
        Ok(true) => ExitCode::from(EXIT_FINDINGS),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}
