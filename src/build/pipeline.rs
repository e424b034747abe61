//! Build pipeline orchestration.
//!
//! Runs the fixed step sequence in order and aggregates per-step outcomes.
//! Steps never overlap: each one completes before its successor starts, and
//! the whole run is synchronous and single-threaded. Two processes must not
//! run against the same build directory at once; the clean step performs a
//! destructive recursive delete and nothing enforces a lock.

use crate::build::archive;
use crate::build::clean;
use crate::build::collect;
use crate::build::context::BuildContext;
use crate::build::minify::{self, MinifyRules};
use crate::build::progress::{NullProgress, ProgressEvent, ProgressReporter};
use crate::build::report::{BuildReport, ReportError};
use crate::build::result::{PipelineResult, StepResult, StepStatus};
use std::time::Instant;
use thiserror::Error;

/// A single stage of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// Delete and recreate the build directory
    Clean,
    /// Mirror eligible sources into the build directory
    Collect,
    /// Minify stylesheet copies in place
    MinifyCss,
    /// Minify script copies in place
    MinifyJs,
    /// Placeholder: image optimization needs external tooling
    OptimizeImages,
    /// Package the build directory into the deployment archive
    Archive,
    /// Count files and bytes and produce the report
    Report,
}

impl BuildStep {
    /// The fixed execution order. No step starts before its predecessor
    /// completes, and a failed run restarts from the beginning.
    pub const SEQUENCE: [BuildStep; 7] = [
        BuildStep::Clean,
        BuildStep::Collect,
        BuildStep::MinifyCss,
        BuildStep::MinifyJs,
        BuildStep::OptimizeImages,
        BuildStep::Archive,
        BuildStep::Report,
    ];
}

impl std::fmt::Display for BuildStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BuildStep::Clean => "clean",
            BuildStep::Collect => "collect",
            BuildStep::MinifyCss => "minify-css",
            BuildStep::MinifyJs => "minify-js",
            BuildStep::OptimizeImages => "optimize-images",
            BuildStep::Archive => "archive",
            BuildStep::Report => "report",
        };
        write!(f, "{}", name)
    }
}

/// Fatal error raised by a step; aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The build directory could not be reset
    #[error("failed to reset build directory: {0}")]
    Clean(std::io::Error),
    /// Source collection failed
    #[error(transparent)]
    Collect(#[from] collect::CollectError),
    /// Minification pass could not enumerate its files
    #[error(transparent)]
    Minify(#[from] minify::MinifyError),
    /// Report generation failed
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Build pipeline for executing runs.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Progress sink for step and per-file events
    progress: Box<dyn ProgressReporter>,
    /// Whether to skip the archive step
    skip_archive: bool,
}

impl BuildPipeline {
    /// Create a new build pipeline with a silent progress reporter.
    pub fn new(context: BuildContext) -> Self {
        Self { context, progress: Box::new(NullProgress), skip_archive: false }
    }

    /// Set the progress reporter.
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Skip the archive step (the build directory is still produced).
    pub fn with_skip_archive(mut self, skip_archive: bool) -> Self {
        self.skip_archive = skip_archive;
        self
    }

    /// Get the build context.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Run the whole pipeline.
    ///
    /// Clean and collect failures are fatal and short-circuit the remaining
    /// steps; minification and archiving degrade gracefully, with failures
    /// visible in the result and the progress stream. The caller turns
    /// [`PipelineResult::is_success`] into a process exit code.
    pub fn run(&self) -> PipelineResult {
        let start = Instant::now();
        let mut result = PipelineResult::new(self.context.timestamp().to_string());

        self.progress.report(ProgressEvent::PipelineStarted {
            project: self.context.project_root().to_path_buf(),
            dist: self.context.dist_dir(),
            total_steps: BuildStep::SEQUENCE.len(),
        });

        for step in BuildStep::SEQUENCE {
            self.progress.report(ProgressEvent::StepStarted { step });
            let step_start = Instant::now();

            match self.execute_step(step, &mut result) {
                Ok((status, detail)) => {
                    let duration = step_start.elapsed();
                    self.progress.report(ProgressEvent::StepCompleted {
                        step,
                        status: status.clone(),
                        duration_ms: duration.as_millis() as u64,
                    });
                    result.add_step(StepResult { step, status, duration, detail });
                }
                Err(err) => {
                    let duration = step_start.elapsed();
                    let status = StepStatus::Failed(err.to_string());
                    self.progress
                        .report(ProgressEvent::Error { path: None, message: err.to_string() });
                    self.progress.report(ProgressEvent::StepCompleted {
                        step,
                        status: status.clone(),
                        duration_ms: duration.as_millis() as u64,
                    });
                    result.add_step(StepResult { step, status, duration, detail: None });
                    result.mark_fatal();
                    break;
                }
            }
        }

        result.total_duration = start.elapsed();
        self.progress.report(ProgressEvent::PipelineCompleted {
            success: result.is_success(),
            duration_ms: result.total_duration.as_millis() as u64,
        });
        result
    }

    /// Execute a single step.
    ///
    /// `Err` means a fatal failure; a returned `StepStatus::Failed` records
    /// a graceful degradation that lets the run continue.
    fn execute_step(
        &self,
        step: BuildStep,
        result: &mut PipelineResult,
    ) -> Result<(StepStatus, Option<String>), PipelineError> {
        match step {
            BuildStep::Clean => {
                clean::reset_dir(&self.context.dist_dir()).map_err(PipelineError::Clean)?;
                Ok((StepStatus::Success, None))
            }
            BuildStep::Collect => {
                let copied = collect::collect_sources(&self.context, self.progress.as_ref())?;
                Ok((StepStatus::Success, Some(format!("{} files copied", copied))))
            }
            BuildStep::MinifyCss => self.minify_step(".css", &MinifyRules::stylesheet()),
            BuildStep::MinifyJs => self.minify_step(".js", &MinifyRules::script()),
            BuildStep::OptimizeImages => {
                self.progress.report(ProgressEvent::Warning {
                    message: "image optimization requires external tooling; skipping".to_string(),
                });
                Ok((StepStatus::Skipped, None))
            }
            BuildStep::Archive => {
                if self.skip_archive {
                    return Ok((StepStatus::Skipped, None));
                }
                match archive::create_archive(&self.context) {
                    Ok(path) => {
                        let detail = path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned());
                        result.archive = Some(path);
                        Ok((StepStatus::Success, detail))
                    }
                    Err(err) => {
                        self.progress.report(ProgressEvent::Error {
                            path: None,
                            message: format!("failed to create archive: {}", err),
                        });
                        Ok((StepStatus::Failed(err.to_string()), None))
                    }
                }
            }
            BuildStep::Report => {
                let report =
                    BuildReport::generate(&self.context.dist_dir(), self.context.timestamp())?;
                result.report = Some(report);
                Ok((StepStatus::Success, None))
            }
        }
    }

    /// Shared body of the two minification steps.
    fn minify_step(
        &self,
        extension: &str,
        rules: &MinifyRules,
    ) -> Result<(StepStatus, Option<String>), PipelineError> {
        let stats = minify::minify_tree(
            &self.context.dist_dir(),
            extension,
            rules,
            self.progress.as_ref(),
        )?;
        let detail = if stats.failed > 0 {
            format!("{} files minified, {} skipped on error", stats.minified, stats.failed)
        } else {
            format!("{} files minified", stats.minified)
        };
        Ok((StepStatus::Success, Some(detail)))
    }
}
