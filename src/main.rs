//! Sitepack - command-line tool for building and deploying static websites

use std::process::ExitCode;

use sitepack::cli;

fn main() -> ExitCode {
    cli::run()
}
