//! Build context containing configuration and workspace identity for a run.

use crate::config::SiteConfig;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Build context for one pipeline run.
///
/// Owns the project root, the loaded configuration, and the run timestamp.
/// The timestamp is fixed at construction so the build directory and the
/// archive produced from it share one identifier. Steps receive the context
/// by reference and never mutate it.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: SiteConfig,
    /// Project root directory (where site.toml would live)
    project_root: PathBuf,
    /// Run timestamp, `YYYYmmdd_HHMMSS` in local time
    timestamp: String,
    /// Whether to run in verbose mode
    verbose: bool,
}

impl BuildContext {
    /// Create a new build context.
    ///
    /// # Arguments
    /// - `config` - The loaded configuration
    /// - `project_root` - The project root directory
    pub fn new(config: SiteConfig, project_root: PathBuf) -> Self {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self { config, project_root, timestamp, verbose: false }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the build output directory (always inside the project root).
    pub fn dist_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.project.out)
    }

    /// Get the archive path for this run, a sibling of the build directory.
    pub fn archive_path(&self) -> PathBuf {
        self.project_root
            .join(format!("{}_{}.zip", self.config.build.archive_prefix, self.timestamp))
    }

    /// Get the run timestamp.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Directory names excluded from collection.
    pub fn excluded_dirs(&self) -> &[String] {
        &self.config.build.exclude
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replace the run timestamp (primarily for deterministic tests).
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}
