//! Source file collection.
//!
//! Mirrors eligible source files into the build directory, preserving
//! relative paths and modification times.

use crate::build::context::BuildContext;
use crate::build::progress::{ProgressEvent, ProgressReporter};
use glob::glob;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File-name suffixes eligible for collection.
///
/// Matching is a plain suffix match, one glob pass per entry; a file whose
/// name happens to satisfy several entries is copied once per match rather
/// than classified exclusively.
pub const COLLECT_EXTENSIONS: [&str; 7] =
    [".html", ".css", ".js", ".json", ".xml", ".ico", ".txt"];

/// Error during source collection. Fatal to the pipeline run.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Invalid glob pattern
    #[error("invalid search pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// Failed to copy a source file into the build directory
    #[error("failed to copy {}: {source}", .path.display())]
    Copy {
        /// Source file that could not be copied
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Check whether a path contains one of the excluded directory names as a
/// segment (dependency caches like `node_modules`).
pub fn is_excluded(path: &Path, excluded: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => excluded.iter().any(|e| name == e.as_str()),
        _ => false,
    })
}

/// Copy every eligible source file under the project root into the build
/// directory, mirroring relative paths.
///
/// Files under the build directory itself and under excluded directory
/// names are skipped. One [`ProgressEvent::FileCopied`] is emitted per
/// copied file. Returns the number of copies performed.
pub fn collect_sources(
    ctx: &BuildContext,
    progress: &dyn ProgressReporter,
) -> Result<usize, CollectError> {
    let root = ctx.project_root();
    let dist = ctx.dist_dir();
    let excluded = ctx.excluded_dirs();
    let mut copied = 0;

    for ext in COLLECT_EXTENSIONS {
        let pattern = format!("{}/**/*{}", root.display(), ext);
        let paths =
            glob(&pattern).map_err(|e| CollectError::InvalidPattern(pattern.clone(), e))?;

        let mut files = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    // Log but continue on unreadable paths
                    progress.report(ProgressEvent::Warning {
                        message: format!("skipping unreadable path: {}", e),
                    });
                }
            }
        }
        files.sort();

        for path in files {
            if path.starts_with(&dist) || is_excluded(&path, excluded) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let dest = dist.join(relative);
            copy_file(&path, &dest)
                .map_err(|source| CollectError::Copy { path: path.clone(), source })?;
            progress.report(ProgressEvent::FileCopied { path: relative.to_path_buf() });
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy a file, creating parent directories and carrying the source
/// modification time over to the destination.
fn copy_file(src: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)?;

    // Best effort: not every filesystem reports or accepts mtimes
    if let Ok(modified) = fs::metadata(src).and_then(|m| m.modified()) {
        if let Ok(file) = fs::OpenOptions::new().write(true).open(dest) {
            let _ = file.set_modified(modified);
        }
    }
    Ok(())
}
