//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod deploy;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::deploy::DeployPlatform;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Sitepack - build, package, and deploy static websites
#[derive(Parser)]
#[command(name = "sitepack")]
#[command(about = "Sitepack - build, package, and deploy static websites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the site into a deployable dist directory and archive
    Build {
        /// Project root (default: current directory)
        path: Option<PathBuf>,

        /// Override the output directory name
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Use a specific config file instead of discovering site.toml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip creating the deployment archive
        #[arg(long)]
        no_archive: bool,

        /// Print the build report as JSON instead of the text summary
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Deploy the built site to a hosting platform
    Deploy {
        /// Target platform (falls back to deploy.platform in site.toml)
        #[arg(value_enum)]
        platform: Option<DeployPlatform>,

        /// Project root (default: current directory)
        path: Option<PathBuf>,

        /// Port for the local preview server
        #[arg(long)]
        port: Option<u16>,

        /// Deploy the existing dist directory without rebuilding
        #[arg(long)]
        no_build: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { path, out, config, no_archive, json, verbose } => build::run_build(
            path.as_deref(),
            out.as_deref(),
            config.as_deref(),
            no_archive,
            json,
            verbose,
        ),
        Commands::Deploy { platform, path, port, no_build } => {
            deploy::run_deploy(platform, path.as_deref(), port, no_build)
        }
    }
}
