//! Interactive user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for an operator sitting at the terminal
//! - [`NonInteractiveUI`] for unattended runs
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use b1assist::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Business partner registration");
//! ui.success("Done");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

use std::time::Duration;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_user;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, AssistTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a prompt and return the typed answer.
    fn prompt(&mut self, prompt: &Prompt) -> Result<String>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show the end-of-run step summary.
    fn show_summary(&mut self, summary: &RunSummary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// A free-text question to the operator.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for lookup and env overrides).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

/// Final status of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step returned a value.
    Completed,
    /// The operator chose to skip it.
    Skipped,
    /// The operator aborted the run at this step.
    Aborted,
}

impl StepStatus {
    /// Icon rendered in the summary.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Completed => "✓",
            Self::Skipped => "○",
            Self::Aborted => "✗",
        }
    }
}

/// One row of the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSummary {
    /// Step label as shown to the operator.
    pub label: String,
    /// How the step ended.
    pub status: StepStatus,
    /// Total automatic attempts, across operator retries.
    pub attempts: u32,
    /// Wall time spent in the step, prompts included.
    pub duration: Duration,
}

/// Summary of a whole automation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Steps in execution order.
    pub steps: Vec<StepSummary>,
    /// Wall time of the run.
    pub total_duration: Duration,
    /// Whether the operator aborted.
    pub aborted: bool,
}

impl RunSummary {
    /// Count steps with the given status.
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_status() {
        let step = |status| StepSummary {
            label: "x".to_string(),
            status,
            attempts: 1,
            duration: Duration::ZERO,
        };
        let summary = RunSummary {
            steps: vec![
                step(StepStatus::Completed),
                step(StepStatus::Skipped),
                step(StepStatus::Completed),
            ],
            ..Default::default()
        };

        assert_eq!(summary.count(StepStatus::Completed), 2);
        assert_eq!(summary.count(StepStatus::Skipped), 1);
        assert_eq!(summary.count(StepStatus::Aborted), 0);
    }

    #[test]
    fn format_duration_units() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn step_status_icons() {
        assert_eq!(StepStatus::Completed.icon(), "✓");
        assert_eq!(StepStatus::Skipped.icon(), "○");
        assert_eq!(StepStatus::Aborted.icon(), "✗");
    }
}
