//! Build directory reset.

use std::fs;
use std::io;
use std::path::Path;

/// Delete and recreate a build directory.
///
/// Removes the directory and all of its contents if it exists, then creates
/// it again including any missing parents. Idempotent: calling twice in a
/// row leaves an empty existing directory both times.
///
/// Errors (permission denied, the path occupied by a regular file) are
/// returned to the caller; they are fatal to a pipeline run and never
/// retried here.
pub fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}
