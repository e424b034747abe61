//! Build report generation.
//!
//! Recounts the build directory from disk after all other steps, so the
//! numbers reflect what actually landed there rather than what the
//! collector believed it copied.

use glob::glob;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bytes per binary megabyte.
const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// Error while generating the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid glob pattern
    #[error("invalid search pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// Failed to stat a file in the build directory
    #[error("failed to inspect {}: {source}", .path.display())]
    Inspect {
        /// The file that could not be inspected
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Summary of one build run: file counts by kind, total size, and the run
/// timestamp. Derived and read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    /// Number of `.html` files in the build directory
    pub html_files: usize,
    /// Number of `.css` files in the build directory
    pub css_files: usize,
    /// Number of `.js` files in the build directory
    pub js_files: usize,
    /// Total size of every regular file, in bytes
    pub total_bytes: u64,
    /// Run timestamp
    pub timestamp: String,
}

impl BuildReport {
    /// Walk the build directory and produce a report. Pure read.
    pub fn generate(dist: &Path, timestamp: &str) -> Result<Self, ReportError> {
        let pattern = format!("{}/**/*", dist.display());
        let paths =
            glob(&pattern).map_err(|e| ReportError::InvalidPattern(pattern.clone(), e))?;

        let mut report = Self {
            html_files: 0,
            css_files: 0,
            js_files: 0,
            total_bytes: 0,
            timestamp: timestamp.to_string(),
        };

        for entry in paths {
            let path = entry.map_err(|e| ReportError::Inspect {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }

            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name.ends_with(".html") {
                report.html_files += 1;
            }
            if name.ends_with(".css") {
                report.css_files += 1;
            }
            if name.ends_with(".js") {
                report.js_files += 1;
            }

            let metadata = fs::metadata(&path)
                .map_err(|source| ReportError::Inspect { path: path.clone(), source })?;
            report.total_bytes += metadata.len();
        }

        Ok(report)
    }

    /// Total size in binary megabytes.
    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_MEGABYTE
    }

    /// Format the human-readable summary.
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let mut lines = Vec::new();
        lines.push("Build report".to_string());
        lines.push(rule.clone());
        lines.push(format!("  HTML files: {}", self.html_files));
        lines.push(format!("  CSS files: {}", self.css_files));
        lines.push(format!("  JavaScript files: {}", self.js_files));
        lines.push(format!("  Total size: {:.2} MB", self.total_megabytes()));
        lines.push(format!("  Build time: {}", self.timestamp));
        lines.push(rule);
        lines.join("\n")
    }
}
