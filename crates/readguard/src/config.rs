//! Workspace configuration.
//!
//! Read from `.readguard.yaml` at the workspace root. Every key is optional:
//!
//! ```yaml
//! severity: error
//! exclude:
//!   - Generated
//!   - src/Legacy
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Severity;

/// Name of the configuration file at the workspace root
pub const CONFIG_FILE_NAME: &str = ".readguard.yaml";

/// Directories never searched for source files.
pub const BUILTIN_EXCLUDES: &[&str] = &[
    "target",
    "node_modules",
    "vendor",
    "bin",
    "obj",
    "build",
    "dist",
    "packages",
];

/// Configuration file structure for readguard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Severity reported for findings
    pub severity: Severity,

    /// Extra paths to skip. A bare name matches a directory anywhere; a path
    /// with separators matches relative to the workspace root.
    pub exclude: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load `.readguard.yaml` from `root`, or defaults when it does not exist.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!(root = %root.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(&path)?;
        debug!(
            path = %path.display(),
            severity = %config.severity,
            excludes = config.exclude.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether a directory, given relative to the workspace root, is skipped.
    #[must_use]
    pub fn is_excluded_dir(&self, relative: &Path) -> bool {
        let Some(name) = relative.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') || BUILTIN_EXCLUDES.contains(&name) {
            return true;
        }
        self.exclude.iter().any(|pattern| {
            let pattern = pattern.trim_end_matches('/');
            if pattern.contains('/') {
                normalized(relative) == pattern
            } else {
                pattern == name
            }
        })
    }
}

/// `relative` joined with `/`, whatever the platform separator.
fn normalized(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
