//! Parser configuration loaded from YAML
//!
//! Looked up at `.github/ghwf.yaml`, then `.ghwf.yaml`, relative to the
//! project directory. Every key is optional.
//!
//! ```yaml
//! fail_fast: false
//! max_errors: 50
//! extra_webhook_events: [merge_group]
//! allow_unknown_keys: false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Candidate config locations, in lookup order
pub const CONFIG_FILES: &[&str] = &[".github/ghwf.yaml", ".ghwf.yaml"];

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    /// Stop at the first construction error
    pub fail_fast: bool,
    /// Stop collecting after this many errors
    pub max_errors: Option<usize>,
    /// Webhook trigger names accepted in addition to the built-in table
    pub extra_webhook_events: Vec<String>,
    /// Ignore keys that are not part of the workflow syntax
    pub allow_unknown_keys: bool,
}

impl ParseConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load from a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::from_yaml(&yaml).with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Find the config file for a project directory
    pub fn locate(project_dir: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| project_dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load the project's config, or defaults when there is none
    pub fn discover(project_dir: &Path) -> Result<Self> {
        match Self::locate(project_dir) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Whether another error may still be recorded after `count` errors
    ///
    /// A failed parse always keeps at least one error, so `max_errors: 0`
    /// behaves like 1.
    pub fn accepts_more_errors(&self, count: usize) -> bool {
        if self.fail_fast && count > 0 {
            return false;
        }
        self.max_errors.map_or(true, |max| count < max.max(1))
    }
}
