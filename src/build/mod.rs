//! Build pipeline module for sitepack
//!
//! Provides the core build system that turns a website source tree into a
//! deployable `dist` directory and a timestamped zip artifact.
//!
//! # Overview
//!
//! The build pipeline consists of:
//! - **Clean**: Delete and recreate the build directory
//! - **Collect**: Mirror eligible source files into the build directory
//! - **Minify**: Strip comments and collapse whitespace in CSS/JS copies
//! - **Archive**: Package the build directory into `website_<timestamp>.zip`
//! - **Report**: Count files and bytes and summarize the run
//!
//! # Example
//!
//! ```ignore
//! use sitepack::build::{BuildContext, BuildPipeline};
//! use sitepack::config::default_config;
//!
//! let context = BuildContext::new(default_config(), project_root);
//! let result = BuildPipeline::new(context).run();
//! println!("{}", result.summary());
//! ```

pub mod archive;
pub mod clean;
pub mod collect;
pub mod context;
pub mod minify;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod result;

pub use archive::*;
pub use clean::*;
pub use collect::*;
pub use context::*;
pub use minify::*;
pub use pipeline::*;
pub use progress::*;
pub use report::*;
pub use result::*;
