//! Pipeline result types.
//!
//! Contains types for representing the outcome of a build run.

use crate::build::pipeline::BuildStep;
use crate::build::report::BuildReport;
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Step succeeded
    Success,
    /// Step was skipped (no-op or disabled)
    Skipped,
    /// Step failed with error
    Failed(String),
}

impl StepStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Skipped)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed(_))
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Success => write!(f, "success"),
            StepStatus::Skipped => write!(f, "skipped"),
            StepStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of running a single pipeline step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Which step ran
    pub step: BuildStep,
    /// Outcome of the step
    pub status: StepStatus,
    /// Step duration
    pub duration: Duration,
    /// Optional human-readable detail ("42 files copied")
    pub detail: Option<String>,
}

impl StepResult {
    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Results for each executed step, in execution order
    pub steps: Vec<StepResult>,
    /// Build report, when the report step ran
    pub report: Option<BuildReport>,
    /// Path of the produced archive, when archiving succeeded
    pub archive: Option<PathBuf>,
    /// Timestamp shared by the build directory and the archive name
    pub timestamp: String,
    /// Total run duration
    pub total_duration: Duration,
    /// Whether a fatal step error aborted the run
    fatal: bool,
}

impl PipelineResult {
    /// Create a new empty result for a run identified by `timestamp`.
    pub fn new(timestamp: String) -> Self {
        Self { timestamp, ..Self::default() }
    }

    /// Record a step outcome.
    pub fn add_step(&mut self, result: StepResult) {
        self.steps.push(result);
    }

    /// Mark the run as fatally failed.
    pub(crate) fn mark_fatal(&mut self) {
        self.fatal = true;
    }

    /// Whether the run completed without a fatal error.
    ///
    /// Graceful degradations (a failed archive step) do not clear this;
    /// they are visible in [`PipelineResult::steps`] and the summary.
    pub fn is_success(&self) -> bool {
        !self.fatal
    }

    /// The step that fatally aborted the run, if any.
    pub fn failed_step(&self) -> Option<&StepResult> {
        if self.fatal {
            self.steps.iter().rev().find(|s| s.status.is_failure())
        } else {
            None
        }
    }

    /// Number of steps that completed successfully.
    pub fn success_count(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s.status, StepStatus::Success)).count()
    }

    /// Number of steps that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s.status, StepStatus::Skipped)).count()
    }

    /// Number of steps that failed, fatally or not.
    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_failure()).count()
    }

    /// Format a summary of the run.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(failed) = self.failed_step() {
            lines.push(format!("Build failed at {}: {}", failed.step, failed.status));
        } else {
            lines.push(format!(
                "Build succeeded: {} steps, {} skipped in {:?}",
                self.success_count(),
                self.skipped_count(),
                self.total_duration
            ));
            match &self.archive {
                Some(path) => lines.push(format!("  artifact: {}", path.display())),
                None => {
                    if let Some(step) = self.steps.iter().find(|s| s.status.is_failure()) {
                        lines.push(format!("  no artifact: {}", step.status));
                    }
                }
            }
        }

        for step in &self.steps {
            if let Some(detail) = &step.detail {
                lines.push(format!("  {}: {}", step.step, detail));
            }
        }

        lines.join("\n")
    }
}
