//! # Readguard: discarded `Stream.Read` detection for C#
//!
//! `Stream.Read` returns how many bytes it actually read, which may be fewer
//! than requested. Readguard finds C# calls that throw that count away and
//! rewrites them to keep it:
//!
//! ```text
//! ms.Read(buffer, 0, buffer.Length);                  // flagged
//! var readCount = ms.Read(buffer, 0, buffer.Length);  // after the fix
//! ```
//!
//! ## Design Philosophy
//!
//! - **Precise over noisy** - A call is flagged only when name, return type,
//!   declaring type and discarded result all check out; any doubt means silence
//! - **Lossless rewrites** - Trees keep every byte of source, so a fix touches
//!   only the statement it replaces
//! - **Injected resolution** - The rule asks a `Resolver` about symbols and
//!   never embeds a type system of its own
//! - **Library first, CLI second**
//!
//! ## Quick Start
//!
//! ```no_run
//! use readguard::Readguard;
//! use std::path::Path;
//!
//! let readguard = Readguard::new(Path::new("/path/to/solution"))?;
//!
//! let report = readguard.check(&[])?;
//! for file in &report.files {
//!     for finding in &file.findings {
//!         println!("{}:{finding}", file.path.display());
//!     }
//! }
//!
//! // Rewrite every flagged call in place
//! let fixed = readguard.fix_workspace(&[], false)?;
//! println!("Applied {} fixes", fixed.applied_count());
//! # Ok::<(), readguard::Error>(())
//! ```
//!
//! Single sources can be checked without a workspace:
//!
//! ```
//! let analysis = readguard::analysis::analyze_source(
//!     "using System.IO;\nclass A { void M(Stream s, byte[] b) { s.Read(b, 0, 1); } }",
//! )?;
//! assert_eq!(analysis.findings.len(), 1);
//! # Ok::<(), readguard::Error>(())
//! ```

pub mod analysis;
pub mod batch;
pub mod config;
mod error;
pub mod languages;
pub mod rule;
pub mod semantics;
pub mod syntax;
mod types;

pub use config::Config;
pub use error::{Error, FileError, FileErrorKind, FixError, Result};
pub use types::{
    CheckReport, FileFix, FileReport, Finding, FixReport, Severity, Span, TextRange,
};

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use analysis::{SourceAnalysis, analyze_source};
use batch::fix_all;
use languages::is_source_file;

/// Workspace-level checking and fixing.
///
/// `Readguard` owns a workspace root and its configuration. Files are
/// discovered under the root, analyzed in parallel, and reported relative to
/// the root.
#[derive(Debug, Clone)]
pub struct Readguard {
    workspace_root: PathBuf,
    config: Config,
}

/// One analyzed file, before it is turned into a report entry.
struct AnalyzedFile {
    path: PathBuf,
    absolute: PathBuf,
    analysis: SourceAnalysis,
}

impl Readguard {
    /// Open a workspace, reading `.readguard.yaml` from its root if present.
    ///
    /// Uses convention-based defaults:
    /// - Excludes hidden directories (starting with `.`)
    /// - Excludes common build directories (`bin/`, `obj/`, `target/`, `packages/`, ...)
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or the config file is malformed.
    pub fn new(workspace_root: &Path) -> Result<Self> {
        let workspace_root = canonical_root(workspace_root)?;
        let config = Config::load_or_default(&workspace_root)?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    /// Open a workspace with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist.
    pub fn with_config(workspace_root: &Path, config: Config) -> Result<Self> {
        Ok(Self {
            workspace_root: canonical_root(workspace_root)?,
            config,
        })
    }

    /// The canonical workspace root.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    // === Checking ===

    /// Check source files and report findings.
    ///
    /// `targets` may name files or directories, absolute or relative to the
    /// workspace root. An empty slice checks the whole workspace.
    ///
    /// # Errors
    ///
    /// Per-file problems are collected in the report. This only fails for
    /// problems with the workspace itself.
    pub fn check(&self, targets: &[PathBuf]) -> Result<CheckReport> {
        let start = Instant::now();
        let mut report = CheckReport::default();
        let files = self.collect_targets(targets, &mut report.directories_skipped, &mut report.errors);

        let results: Vec<_> = files.par_iter().map(|path| self.analyze_file(path)).collect();
        for result in results {
            match result {
                Ok(file) => {
                    report.files_checked += 1;
                    if file.analysis.findings.is_empty() {
                        continue;
                    }
                    let findings = file
                        .analysis
                        .findings
                        .into_iter()
                        .map(|f| f.with_severity(self.config.severity))
                        .collect();
                    report.files.push(FileReport {
                        path: file.path,
                        findings,
                    });
                }
                Err(err) => report.errors.push(err),
            }
        }

        report.files.sort_by(|a, b| a.path.cmp(&b.path));
        report.errors.sort_by(|a, b| a.path.cmp(&b.path));
        report.duration = start.elapsed();
        debug!(
            files_checked = report.files_checked,
            findings = report.finding_count(),
            errors = report.errors.len(),
            "Check complete"
        );
        Ok(report)
    }

    /// Check a single source text, applying the configured severity.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser cannot be initialized.
    pub fn check_source(&self, source: &str) -> Result<Vec<Finding>> {
        let analysis = analyze_source(source)?;
        Ok(analysis
            .findings
            .into_iter()
            .map(|f| f.with_severity(self.config.severity))
            .collect())
    }

    // === Fixing ===

    /// Apply every available fix, file by file.
    ///
    /// With `dry_run`, rewritten text is returned but nothing is written.
    ///
    /// # Errors
    ///
    /// Per-file problems, write failures included, are collected in the
    /// report. This only fails for problems with the workspace itself.
    pub fn fix_workspace(&self, targets: &[PathBuf], dry_run: bool) -> Result<FixReport> {
        let mut directories_skipped = Vec::new();
        let mut report = FixReport {
            written: !dry_run,
            ..FixReport::default()
        };
        let files = self.collect_targets(targets, &mut directories_skipped, &mut report.errors);

        let results: Vec<_> = files
            .par_iter()
            .map(|path| self.fix_file(path, dry_run))
            .collect();
        for result in results {
            match result {
                Ok(Some(fix)) => {
                    report.files_checked += 1;
                    report.files.push(fix);
                }
                Ok(None) => report.files_checked += 1,
                Err(err) => report.errors.push(err),
            }
        }

        report.files.sort_by(|a, b| a.path.cmp(&b.path));
        report.errors.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(
            files_checked = report.files_checked,
            applied = report.applied_count(),
            written = report.written,
            "Fix complete"
        );
        Ok(report)
    }

    /// Fix one file. `Ok(None)` when the file has no findings.
    fn fix_file(&self, path: &Path, dry_run: bool) -> std::result::Result<Option<FileFix>, FileError> {
        let file = self.analyze_file(path)?;
        if file.analysis.findings.is_empty() {
            return Ok(None);
        }

        let fixed = fix_all(&file.analysis.tree, &file.analysis.findings)
            .map_err(|e| FileError::parse_failed(file.path.clone(), e.to_string()))?;
        for skipped in &fixed.skipped {
            warn!(
                file = %file.path.display(),
                range = ?skipped.finding.range,
                reason = %skipped.reason,
                "Fix not applied"
            );
        }

        if !dry_run && fixed.changed() {
            std::fs::write(&file.absolute, &fixed.text)
                .map_err(|e| FileError::io_error(file.path.clone(), &e))?;
            debug!(file = %file.path.display(), applied = fixed.applied.len(), "Wrote fixes");
        }

        Ok(Some(FileFix {
            path: file.path,
            applied: fixed.applied.len(),
            skipped: fixed.skipped.len(),
            text: fixed.text,
        }))
    }

    // === Files ===

    fn analyze_file(&self, path: &Path) -> std::result::Result<AnalyzedFile, FileError> {
        let relative = self.relative_path(path).to_path_buf();
        let bytes = std::fs::read(path).map_err(|e| FileError::io_error(relative.clone(), &e))?;
        let source =
            String::from_utf8(bytes).map_err(|_| FileError::encoding_error(relative.clone()))?;
        let analysis = analyze_source(&source)
            .map_err(|e| FileError::parse_failed(relative.clone(), e.to_string()))?;
        debug!(
            file = %relative.display(),
            findings = analysis.findings.len(),
            "Analyzed file"
        );
        Ok(AnalyzedFile {
            path: relative,
            absolute: path.to_path_buf(),
            analysis,
        })
    }

    /// Resolve targets into a sorted, de-duplicated list of source files.
    fn collect_targets(
        &self,
        targets: &[PathBuf],
        directories_skipped: &mut Vec<(PathBuf, String)>,
        errors: &mut Vec<FileError>,
    ) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if targets.is_empty() {
            self.walk_dir(&self.workspace_root, &mut files, directories_skipped);
        }
        for target in targets {
            let path = if target.is_absolute() {
                target.clone()
            } else {
                self.workspace_root.join(target)
            };
            if path.is_dir() {
                self.walk_dir(&path, &mut files, directories_skipped);
            } else if path.is_file() {
                if is_source_file(&path) {
                    files.push(path);
                } else {
                    errors.push(FileError::unsupported_language(target.clone()));
                }
            } else {
                let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory");
                errors.push(FileError::io_error(target.clone(), &err));
            }
        }
        files.sort();
        files.dedup();
        files
    }

    /// Recursively walk a directory, collecting source files.
    ///
    /// Symlinks are skipped. Directories that cannot be read (e.g., due to
    /// permissions) are tracked in `directories_skipped` for reporting.
    fn walk_dir(
        &self,
        dir: &Path,
        files: &mut Vec<PathBuf>,
        directories_skipped: &mut Vec<(PathBuf, String)>,
    ) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    directory = %dir.display(),
                    error = %e,
                    "Cannot read directory, skipping"
                );
                directories_skipped.push((dir.to_path_buf(), e.to_string()));
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        directory = %dir.display(),
                        error = %e,
                        "Failed to read directory entry, skipping"
                    );
                    continue;
                }
            };

            let path = entry.path();
            // Links are not followed during discovery; a linked directory can
            // point back at one of its ancestors.
            if entry.file_type().is_ok_and(|ty| ty.is_symlink()) {
                debug!(path = %path.display(), "Skipping symlink");
                continue;
            }
            if path.is_dir() {
                if self.config.is_excluded_dir(self.relative_path(&path)) {
                    debug!(directory = %path.display(), "Skipping excluded directory");
                    continue;
                }
                self.walk_dir(&path, files, directories_skipped);
            } else if path.is_file() && is_source_file(&path) {
                files.push(path);
            }
        }
    }

    /// Get the path relative to the workspace root.
    ///
    /// Returns the original path if it's not under the workspace root.
    fn relative_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.workspace_root).unwrap_or(path)
    }
}

fn canonical_root(workspace_root: &Path) -> Result<PathBuf> {
    workspace_root.canonicalize().map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("workspace root not found: {}", workspace_root.display()),
        ))
    })
}
