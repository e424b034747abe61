//! Line-based minification for stylesheet and script files.
//!
//! This is a best-effort, line-oriented transform, not a real lexer: it
//! strips comments it can recognize on a single line and collapses
//! whitespace, then joins everything into one flat line. Known limitations,
//! kept deliberately:
//!
//! - Block comments spanning multiple lines are not recognized and are left
//!   intact; only a `/* ... */` pair opening and closing on the same line is
//!   removed.
//! - Script lines are truncated at the first `//` with no awareness of
//!   strings or regex literals, so content embedding the token (a URL like
//!   `http://example.com`) is corrupted.
//! - Output is never validated for syntactic correctness.

use crate::build::progress::{ProgressEvent, ProgressReporter};
use glob::glob;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// How a rule set treats its line-comment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCommentMode {
    /// Drop the whole line when it starts with the token after collapsing
    DropLine,
    /// Cut the line at the first occurrence of the token
    Truncate,
}

/// Comment-syntax rules for one file kind. Static configuration, never
/// mutated at runtime.
#[derive(Debug, Clone, Copy)]
pub struct MinifyRules {
    /// Block comment delimiters, removed only when both fall on one line
    block: Option<(&'static str, &'static str)>,
    /// Line comment token
    line_comment: Option<&'static str>,
    /// Treatment of the line comment token
    line_mode: LineCommentMode,
}

impl MinifyRules {
    /// Rules for stylesheet files: same-line `/* ... */` removal, plus
    /// dropping lines that begin with `//` after whitespace collapse (CSS
    /// has no line comments; the drop mirrors how hand-written sheets use
    /// them anyway).
    pub const fn stylesheet() -> Self {
        Self {
            block: Some(("/*", "*/")),
            line_comment: Some("//"),
            line_mode: LineCommentMode::DropLine,
        }
    }

    /// Rules for script files: truncate each line at the first `//`.
    pub const fn script() -> Self {
        Self { block: None, line_comment: Some("//"), line_mode: LineCommentMode::Truncate }
    }
}

/// Error while locating files to minify. Per-file IO failures are handled
/// inside [`minify_tree`] and never surface here.
#[derive(Debug, Error)]
pub enum MinifyError {
    /// Invalid glob pattern
    #[error("invalid search pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
}

/// Counters for one minification pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MinifyStats {
    /// Files rewritten in place
    pub minified: usize,
    /// Files skipped because of a read/write error
    pub failed: usize,
}

/// Apply the transform to a whole text, returning the flattened result.
///
/// Lines surviving the per-line transform are joined with a single space.
pub fn minify_text(text: &str, rules: &MinifyRules) -> String {
    let mut kept = Vec::new();

    for line in text.split('\n') {
        let mut line = line.to_string();

        // Remove a block comment only when it opens and closes on this line
        if let Some((start, end)) = rules.block {
            if let (Some(s), Some(e)) = (line.find(start), line.find(end)) {
                line = format!("{}{}", &line[..s], &line[e + end.len()..]);
            }
        }

        if rules.line_mode == LineCommentMode::Truncate {
            if let Some(token) = rules.line_comment {
                if let Some(i) = line.find(token) {
                    line.truncate(i);
                }
            }
        }

        // Collapse internal whitespace runs to single spaces and trim
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }

        if rules.line_mode == LineCommentMode::DropLine {
            if let Some(token) = rules.line_comment {
                if collapsed.starts_with(token) {
                    continue;
                }
            }
        }

        kept.push(collapsed);
    }

    kept.join(" ")
}

/// Minify a single file in place.
pub fn minify_file(path: &Path, rules: &MinifyRules) -> io::Result<()> {
    let content = fs::read_to_string(path)?;
    fs::write(path, minify_text(&content, rules))
}

/// Minify every file under `dist` whose name ends with `extension`.
///
/// Read/write failures on individual files are reported through `progress`
/// and skipped; they never abort the pass.
pub fn minify_tree(
    dist: &Path,
    extension: &str,
    rules: &MinifyRules,
    progress: &dyn ProgressReporter,
) -> Result<MinifyStats, MinifyError> {
    let pattern = format!("{}/**/*{}", dist.display(), extension);
    let paths = glob(&pattern).map_err(|e| MinifyError::InvalidPattern(pattern.clone(), e))?;

    let mut files: Vec<_> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
    files.sort();

    let mut stats = MinifyStats::default();
    for path in files {
        let shown = path.strip_prefix(dist).unwrap_or(&path).to_path_buf();
        match minify_file(&path, rules) {
            Ok(()) => {
                progress.report(ProgressEvent::FileMinified { path: shown });
                stats.minified += 1;
            }
            Err(err) => {
                progress.report(ProgressEvent::Error {
                    path: Some(shown),
                    message: format!("minification skipped: {}", err),
                });
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
