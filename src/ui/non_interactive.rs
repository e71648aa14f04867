//! Non-interactive UI for unattended runs.

use std::collections::HashMap;

use crate::config::process_env;
use crate::error::{AssistError, Result};

use super::theme::AssistTheme;
use super::{
    format_duration, OutputMode, Prompt, RunSummary, SpinnerHandle, StepStatus, UserInterface,
};

const PROMPT_ENV_PREFIX: &str = "B1ASSIST_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `B1ASSIST_PROMPT_<KEY>` environment variables,
/// then from the prompt default. Anything else fails the prompt.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = process_env()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        self.env_overrides
            .get(&env_key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| AssistError::ConfigValidationError {
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (set {})",
                    prompt.key, env_key
                ),
            })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(NoopSpinner {
            quiet: !self.mode.shows_spinners(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_status() {
            return;
        }
        println!();
        for step in &summary.steps {
            println!(
                "  {} {} ({})",
                step.status.icon(),
                step.label,
                format_duration(step.duration)
            );
        }
        println!(
            "  Total: {} · {} done · {} skipped",
            format_duration(summary.total_duration),
            summary.count(StepStatus::Completed),
            summary.count(StepStatus::Skipped)
        );
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only its final line.
struct NoopSpinner {
    quiet: bool,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if !self.quiet {
            println!("{}", AssistTheme::plain().format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        if !self.quiet {
            println!("{}", AssistTheme::plain().format_error(msg));
        }
    }

    fn finish_skipped(&mut self, msg: &str) {
        if !self.quiet {
            println!("{}", AssistTheme::plain().format_skipped(msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_prompt(key: &str, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "?".to_string(),
            default: default.map(String::from),
        }
    }

    #[test]
    fn non_interactive_is_not_interactive() {
        let ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        assert!(!ui.is_interactive());
    }

    #[test]
    fn prompt_uses_env_override() {
        let mut overrides = HashMap::new();
        overrides.insert("B1ASSIST_PROMPT_FAILURE_CHOICE".to_string(), "2".to_string());
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, overrides);

        let result = ui.prompt(&input_prompt("failure_choice", None)).unwrap();
        assert_eq!(result, "2");
    }

    #[test]
    fn prompt_falls_back_to_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui.prompt(&input_prompt("name", Some("abc"))).unwrap();
        assert_eq!(result, "abc");
    }

    #[test]
    fn prompt_without_answer_fails() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let err = ui.prompt(&input_prompt("failure_choice", None)).unwrap_err();
        assert!(err.to_string().contains("B1ASSIST_PROMPT_FAILURE_CHOICE"));
    }
}
