//! Build progress reporting.
//!
//! Provides a flexible progress reporting system for pipeline runs.
//! Supports multiple output formats including console (with colors) and JSON.
//!
//! # Example
//!
//! ```ignore
//! use sitepack::build::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::StepStarted { step: BuildStep::Collect });
//! reporter.report(ProgressEvent::FileCopied { path: "index.html".into() });
//! ```

use crate::build::pipeline::BuildStep;
use crate::build::result::StepStatus;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Events that can be reported during a pipeline run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Pipeline run started
    PipelineStarted {
        /// Project root being built
        project: PathBuf,
        /// Build output directory
        dist: PathBuf,
        /// Number of steps in the sequence
        total_steps: usize,
    },
    /// A pipeline step started
    StepStarted {
        /// The step
        step: BuildStep,
    },
    /// A pipeline step completed
    StepCompleted {
        /// The step
        step: BuildStep,
        /// Outcome
        status: StepStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// A source file was copied into the build directory
    FileCopied {
        /// Path relative to the project root
        path: PathBuf,
    },
    /// A file in the build directory was minified in place
    FileMinified {
        /// Path relative to the build directory
        path: PathBuf,
    },
    /// A warning was generated
    Warning {
        /// Warning message
        message: String,
    },
    /// A non-fatal error occurred
    Error {
        /// File the error relates to (if applicable)
        path: Option<PathBuf>,
        /// Error message
        message: String,
    },
    /// Pipeline run completed
    PipelineCompleted {
        /// Whether the run succeeded
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {
        // Discard all events
    }
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
    /// Current step count
    current: AtomicUsize,
    /// Total step count
    total: AtomicUsize,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("current", &self.current)
            .field("total", &self.total)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stderr.
    ///
    /// Colors are enabled only when stderr is a terminal.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false, // Disable colors for custom output
            verbose: false,
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Format a colored string.
    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Green color code.
    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    /// Yellow color code.
    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    /// Red color code.
    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    /// Cyan color code.
    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    /// Write a line to output.
    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::PipelineStarted { project, dist, total_steps } => {
                self.total.store(total_steps, Ordering::SeqCst);
                self.current.store(0, Ordering::SeqCst);
                self.writeln(&format!(
                    "{} {} -> {}",
                    self.cyan("[build]"),
                    project.display(),
                    dist.display()
                ));
            }
            ProgressEvent::StepStarted { step } => {
                if self.verbose {
                    let current = self.current.load(Ordering::SeqCst) + 1;
                    let total = self.total.load(Ordering::SeqCst);
                    self.writeln(&format!(
                        "{} [{}/{}] {}...",
                        self.cyan("[build]"),
                        current,
                        total,
                        step
                    ));
                }
            }
            ProgressEvent::StepCompleted { step, status, duration_ms } => {
                self.current.fetch_add(1, Ordering::SeqCst);
                let current = self.current.load(Ordering::SeqCst);
                let total = self.total.load(Ordering::SeqCst);

                let status_str = match &status {
                    StepStatus::Success => self.green("ok"),
                    StepStatus::Skipped => self.yellow("skipped"),
                    StepStatus::Failed(_) => self.red("FAILED"),
                };

                self.writeln(&format!(
                    "{} [{}/{}] {} {} ({}ms)",
                    self.cyan("[build]"),
                    current,
                    total,
                    status_str,
                    step,
                    duration_ms
                ));

                if let StepStatus::Failed(err) = status {
                    self.writeln(&format!("        {}", self.red(&err)));
                }
            }
            ProgressEvent::FileCopied { path } => {
                self.writeln(&format!("{} {}", self.cyan("[copy]"), path.display()));
            }
            ProgressEvent::FileMinified { path } => {
                self.writeln(&format!("{} {}", self.cyan("[minify]"), path.display()));
            }
            ProgressEvent::Warning { message } => {
                self.writeln(&format!("{} {}", self.yellow("[warn]"), message));
            }
            ProgressEvent::Error { path, message } => {
                let prefix = match path {
                    Some(p) => format!("{}: ", p.display()),
                    None => String::new(),
                };
                self.writeln(&format!("{} {}{}", self.red("[error]"), prefix, message));
            }
            ProgressEvent::PipelineCompleted { success, duration_ms } => {
                if success {
                    self.writeln(&format!(
                        "\n{} build completed in {}ms",
                        self.green("[done]"),
                        duration_ms
                    ));
                } else {
                    self.writeln(&format!(
                        "\n{} build failed after {}ms",
                        self.red("[error]"),
                        duration_ms
                    ));
                }
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// JSON progress reporter for machine-readable output.
pub struct JsonProgress {
    /// Output writer
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stderr.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stderr())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }

    /// Write a JSON line to output.
    fn write_json(&self, json: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", json);
        }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let json = match event {
            ProgressEvent::PipelineStarted { project, dist, total_steps } => format!(
                r#"{{"event":"pipeline_started","project":"{}","dist":"{}","total_steps":{}}}"#,
                escape_json(&project.display().to_string()),
                escape_json(&dist.display().to_string()),
                total_steps
            ),
            ProgressEvent::StepStarted { step } => {
                format!(r#"{{"event":"step_started","step":"{}"}}"#, step)
            }
            ProgressEvent::StepCompleted { step, status, duration_ms } => {
                let status_str = match &status {
                    StepStatus::Success => "success",
                    StepStatus::Skipped => "skipped",
                    StepStatus::Failed(_) => "failed",
                };
                let error = match &status {
                    StepStatus::Failed(e) => format!(r#","error":"{}""#, escape_json(e)),
                    _ => String::new(),
                };
                format!(
                    r#"{{"event":"step_completed","step":"{}","status":"{}","duration_ms":{}{}}}"#,
                    step, status_str, duration_ms, error
                )
            }
            ProgressEvent::FileCopied { path } => format!(
                r#"{{"event":"file_copied","path":"{}"}}"#,
                escape_json(&path.display().to_string())
            ),
            ProgressEvent::FileMinified { path } => format!(
                r#"{{"event":"file_minified","path":"{}"}}"#,
                escape_json(&path.display().to_string())
            ),
            ProgressEvent::Warning { message } => {
                format!(r#"{{"event":"warning","message":"{}"}}"#, escape_json(&message))
            }
            ProgressEvent::Error { path, message } => {
                let path_field = match path {
                    Some(p) => {
                        format!(r#","path":"{}""#, escape_json(&p.display().to_string()))
                    }
                    None => String::new(),
                };
                format!(
                    r#"{{"event":"error","message":"{}"{}}}"#,
                    escape_json(&message),
                    path_field
                )
            }
            ProgressEvent::PipelineCompleted { success, duration_ms } => format!(
                r#"{{"event":"pipeline_completed","success":{},"duration_ms":{}}}"#,
                success, duration_ms
            ),
        };
        self.write_json(&json);
    }
}

/// Escape a string for JSON output.
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Helper for testing output
    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (Arc<Mutex<Vec<u8>>>, ConsoleProgress) {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = ConsoleProgress::with_output(TestWriter(Arc::clone(&output)));
        (output, reporter)
    }

    fn text(output: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&output.lock().unwrap()).to_string()
    }

    #[test]
    fn test_null_progress() {
        let reporter = NullProgress::new();
        // Should not panic
        reporter.report(ProgressEvent::Warning { message: "ignored".to_string() });
        assert!(!reporter.is_verbose());
    }

    #[test]
    fn test_console_progress_file_copied() {
        let (output, reporter) = capture();
        reporter.report(ProgressEvent::FileCopied { path: PathBuf::from("css/style.css") });

        let text = text(&output);
        assert!(text.contains("[copy]"));
        assert!(text.contains("css/style.css"));
    }

    #[test]
    fn test_console_progress_step_completed_failed() {
        let (output, reporter) = capture();
        reporter.report(ProgressEvent::PipelineStarted {
            project: PathBuf::from("/site"),
            dist: PathBuf::from("/site/dist"),
            total_steps: 7,
        });
        reporter.report(ProgressEvent::StepCompleted {
            step: BuildStep::Archive,
            status: StepStatus::Failed("disk full".to_string()),
            duration_ms: 12,
        });

        let text = text(&output);
        assert!(text.contains("FAILED"));
        assert!(text.contains("archive"));
        assert!(text.contains("disk full"));
    }

    #[test]
    fn test_console_progress_completion() {
        let (output, reporter) = capture();
        reporter.report(ProgressEvent::PipelineCompleted { success: true, duration_ms: 1500 });

        let text = text(&output);
        assert!(text.contains("done"));
        assert!(text.contains("1500ms"));
    }

    #[test]
    fn test_console_progress_step_started_verbose_only() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = ConsoleProgress::with_output(TestWriter(Arc::clone(&output)));
        reporter.report(ProgressEvent::StepStarted { step: BuildStep::Clean });
        assert!(text(&output).is_empty());

        let verbose = Arc::new(Mutex::new(Vec::new()));
        let reporter =
            ConsoleProgress::with_output(TestWriter(Arc::clone(&verbose))).with_verbose(true);
        reporter.report(ProgressEvent::StepStarted { step: BuildStep::Clean });
        assert!(text(&verbose).contains("clean"));
    }

    #[test]
    fn test_json_progress_step_completed() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = JsonProgress::with_output(TestWriter(Arc::clone(&output)));
        reporter.report(ProgressEvent::StepCompleted {
            step: BuildStep::MinifyCss,
            status: StepStatus::Failed("not utf-8".to_string()),
            duration_ms: 3,
        });

        let text = String::from_utf8_lossy(&output.lock().unwrap()).to_string();
        assert!(text.contains(r#""event":"step_completed""#));
        assert!(text.contains(r#""step":"minify-css""#));
        assert!(text.contains(r#""status":"failed""#));
        assert!(text.contains(r#""error":"not utf-8""#));
    }

    #[test]
    fn test_json_progress_file_copied() {
        let output = Arc::new(Mutex::new(Vec::new()));
        let reporter = JsonProgress::with_output(TestWriter(Arc::clone(&output)));
        reporter.report(ProgressEvent::FileCopied { path: PathBuf::from("index.html") });

        let text = String::from_utf8_lossy(&output.lock().unwrap()).to_string();
        assert!(text.contains(r#""event":"file_copied""#));
        assert!(text.contains(r#""path":"index.html""#));
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("hello\\world"), "hello\\\\world");
        assert_eq!(escape_json("hello\nworld"), "hello\\nworld");
        assert_eq!(escape_json("hello\tworld"), "hello\\tworld");
    }
}
