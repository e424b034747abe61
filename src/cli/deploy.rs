//! Deploy command implementation

use std::path::Path;
use std::process::ExitCode;

use clap::ValueEnum;

use super::{build::resolve_project_root, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::deploy::{DeployError, DeployPlatform, Deployer};

/// Run the deploy command
pub fn run_deploy(
    platform: Option<DeployPlatform>,
    path: Option<&Path>,
    port: Option<u16>,
    no_build: bool,
) -> ExitCode {
    use crate::build::{BuildContext, BuildPipeline, ConsoleProgress};
    use crate::config::load_config;

    let project_root = match resolve_project_root(path) {
        Ok(root) => root,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let config = match load_config(None, &project_root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    // CLI argument wins; site.toml supplies the fallback
    let platform = match platform.or_else(|| {
        config
            .deploy
            .platform
            .as_deref()
            .and_then(|name| DeployPlatform::from_str(name, true).ok())
    }) {
        Some(platform) => platform,
        None => {
            eprintln!("Error: no deploy platform given");
            eprintln!("Choose one of: github, netlify, vercel, preview");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let port = port.unwrap_or(config.deploy.preview_port);
    let context = BuildContext::new(config, project_root.clone());
    let dist_dir = context.dist_dir();

    if no_build {
        if !dist_dir.is_dir() {
            eprintln!(
                "Error: build directory not found: {} (run 'sitepack build' first)",
                dist_dir.display()
            );
            return ExitCode::from(EXIT_ERROR);
        }
    } else {
        let pipeline =
            BuildPipeline::new(context).with_progress(Box::new(ConsoleProgress::new()));
        let result = pipeline.run();
        if !result.is_success() {
            eprintln!("{}", result.summary());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let deployer = Deployer::new(project_root, dist_dir);
    match deployer.deploy(platform, port) {
        Ok(()) => {
            if platform != DeployPlatform::Preview {
                println!("Deployed to {}", platform);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(err @ DeployError::MissingCli { .. }) => {
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_ERROR)
        }
        Err(err) => {
            eprintln!("Deployment failed: {}", err);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
