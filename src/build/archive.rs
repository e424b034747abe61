//! Deployment archive creation.
//!
//! Packages the build directory into a single timestamped zip file placed
//! next to it in the project root.

use crate::build::context::BuildContext;
use glob::glob;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Error during archive creation. Non-fatal to the pipeline: the run
/// continues to the report step without an artifact.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Invalid glob pattern
    #[error("invalid search pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// IO error while reading sources or writing the archive
    #[error("IO error while archiving: {0}")]
    Io(#[from] std::io::Error),
    /// Zip encoding error
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// A discovered file fell outside the build directory
    #[error("entry escapes the build directory: {}", .0.display())]
    EntryOutsideBuildDir(PathBuf),
}

/// Write every regular file under the build directory into a new
/// deflate-compressed zip at [`BuildContext::archive_path`].
///
/// Entry names are paths relative to the build directory, with `/`
/// separators. Directories get no explicit entries. Returns the archive
/// path on success.
pub fn create_archive(ctx: &BuildContext) -> Result<PathBuf, ArchiveError> {
    let dist = ctx.dist_dir();
    let archive_path = ctx.archive_path();

    let pattern = format!("{}/**/*", dist.display());
    let paths = glob(&pattern).map_err(|e| ArchiveError::InvalidPattern(pattern.clone(), e))?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => return Err(ArchiveError::Io(e.into_error())),
        }
    }
    files.sort();

    let file = File::create(&archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let relative = path
            .strip_prefix(&dist)
            .map_err(|_| ArchiveError::EntryOutsideBuildDir(path.clone()))?;
        writer.start_file(entry_name(relative), options)?;
        writer.write_all(&fs::read(path)?)?;
    }

    writer.finish()?;
    Ok(archive_path)
}

/// Zip entry names always use forward slashes, regardless of the host
/// separator.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::collections::HashSet;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn create_test_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }

    fn context_for(temp: &TempDir) -> BuildContext {
        BuildContext::new(SiteConfig::default(), temp.path().to_path_buf())
            .with_timestamp("20250101_120000")
    }

    fn entry_names(archive_path: &Path) -> HashSet<String> {
        let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        (0..archive.len()).map(|i| archive.by_index(i).unwrap().name().to_string()).collect()
    }

    #[test]
    fn test_archive_contains_every_file() {
        let temp = TempDir::new().unwrap();
        let ctx = context_for(&temp);
        create_test_file(&ctx.dist_dir(), "index.html", "<html></html>");
        create_test_file(&ctx.dist_dir(), "assets/css/style.css", "body {}");
        create_test_file(&ctx.dist_dir(), "assets/js/main.js", "let x = 1;");

        let archive_path = create_archive(&ctx).unwrap();
        assert_eq!(archive_path, temp.path().join("website_20250101_120000.zip"));

        let names = entry_names(&archive_path);
        let expected: HashSet<String> = [
            "index.html".to_string(),
            "assets/css/style.css".to_string(),
            "assets/js/main.js".to_string(),
        ]
        .into();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_archive_entry_content_roundtrips() {
        let temp = TempDir::new().unwrap();
        let ctx = context_for(&temp);
        create_test_file(&ctx.dist_dir(), "index.html", "<html>hello</html>");

        let archive_path = create_archive(&ctx).unwrap();
        let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        let mut entry = archive.by_name("index.html").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();

        assert_eq!(content, "<html>hello</html>");
    }

    #[test]
    fn test_archive_of_empty_dist() {
        let temp = TempDir::new().unwrap();
        let ctx = context_for(&temp);
        fs::create_dir_all(ctx.dist_dir()).unwrap();

        let archive_path = create_archive(&ctx).unwrap();
        assert!(archive_path.is_file());
        assert!(entry_names(&archive_path).is_empty());
    }

    #[test]
    fn test_archive_sits_next_to_dist_not_inside() {
        let temp = TempDir::new().unwrap();
        let ctx = context_for(&temp);
        create_test_file(&ctx.dist_dir(), "index.html", "<html></html>");

        let archive_path = create_archive(&ctx).unwrap();
        assert_eq!(archive_path.parent().unwrap(), temp.path());
        assert!(!archive_path.starts_with(ctx.dist_dir()));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let relative = Path::new("assets").join("css").join("style.css");
        assert_eq!(entry_name(&relative), "assets/css/style.css");
    }

    #[test]
    fn test_archive_fails_when_target_unwritable() {
        let temp = TempDir::new().unwrap();
        let ctx = context_for(&temp);
        fs::create_dir_all(ctx.dist_dir()).unwrap();
        // Occupy the archive path with a directory so File::create fails
        fs::create_dir(ctx.archive_path()).unwrap();

        assert!(create_archive(&ctx).is_err());
    }
}
