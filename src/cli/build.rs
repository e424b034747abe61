//! Build command implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Run the build command
pub fn run_build(
    path: Option<&Path>,
    out: Option<&Path>,
    config_path: Option<&Path>,
    no_archive: bool,
    json: bool,
    verbose: bool,
) -> ExitCode {
    use crate::build::{BuildContext, BuildPipeline, ConsoleProgress};
    use crate::config::{load_config, merge_cli_overrides, CliOverrides};

    let project_root = match resolve_project_root(path) {
        Ok(root) => root,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut config = match load_config(config_path, &project_root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let overrides = CliOverrides { out: out.map(|p| p.to_path_buf()), ..Default::default() };
    merge_cli_overrides(&mut config, &overrides);

    let context = BuildContext::new(config, project_root).with_verbose(verbose);
    if verbose {
        println!("Project: {}", context.project_root().display());
        println!("Build directory: {}", context.dist_dir().display());
    }

    let progress = ConsoleProgress::new().with_verbose(verbose);
    let pipeline = BuildPipeline::new(context)
        .with_progress(Box::new(progress))
        .with_skip_archive(no_archive);

    let result = pipeline.run();

    if result.is_success() {
        match (&result.report, json) {
            (Some(report), true) => match serde_json::to_string_pretty(report) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => eprintln!("Error rendering report: {}", e),
            },
            (Some(report), false) => {
                println!("{}", report.summary());
                println!("{}", result.summary());
            }
            (None, _) => println!("{}", result.summary()),
        }
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!("{}", result.summary());
        ExitCode::from(EXIT_ERROR)
    }
}

/// Resolve the project root from the optional CLI path argument.
///
/// Defaults to the current working directory and canonicalizes the result
/// so relative paths in progress output stay unambiguous.
pub(crate) fn resolve_project_root(path: Option<&Path>) -> Result<PathBuf, String> {
    let raw = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| format!("cannot determine current directory: {}", e))?,
    };

    if !raw.is_dir() {
        return Err(format!("project root not found: {}", raw.display()));
    }

    fs::canonicalize(&raw).map_err(|e| format!("cannot resolve {}: {}", raw.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_project_root_existing_dir() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_project_root(Some(temp.path())).unwrap();
        assert!(resolved.is_dir());
    }

    #[test]
    fn test_resolve_project_root_missing_dir() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(resolve_project_root(Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_project_root_defaults_to_cwd() {
        let resolved = resolve_project_root(None).unwrap();
        assert!(resolved.is_dir());
    }
}
