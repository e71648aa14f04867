//! Interactive decision point after a step exhausts its automatic attempts.
//!
//! The operator sees the step label and the last error, then chooses to
//! retry the step from scratch, skip it, or abort the whole automation.

use std::fmt;
use std::str::FromStr;

use crate::error::{AssistError, Result};
use crate::ui::{Prompt, UserInterface};

/// Prompt key used for the decision, also the suffix of the
/// `B1ASSIST_PROMPT_FAILURE_CHOICE` override in non-interactive mode.
pub const FAILURE_PROMPT_KEY: &str = "failure_choice";

/// Choice made by the operator after a step failed every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureChoice {
    /// Restart the attempt cycle for the same step.
    Retry,
    /// Give up on the step and continue the run.
    Skip,
    /// Stop the whole automation.
    Abort,
}

impl FromStr for FailureChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_choice(s).ok_or_else(|| format!("invalid choice: {}", s.trim()))
    }
}

impl fmt::Display for FailureChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Retry => "retry",
            Self::Skip => "skip",
            Self::Abort => "abort",
        };
        f.write_str(label)
    }
}

/// Normalize a typed answer into a choice.
///
/// Accepts the menu numbers and the option words, ignoring case and
/// surrounding whitespace.
pub fn parse_choice(input: &str) -> Option<FailureChoice> {
    match input.trim().to_lowercase().as_str() {
        "1" | "retry" => Some(FailureChoice::Retry),
        "2" | "skip" => Some(FailureChoice::Skip),
        "3" | "abort" => Some(FailureChoice::Abort),
        _ => None,
    }
}

/// Show the failure menu and block until a valid choice is entered.
///
/// Invalid answers print a warning and ask again when someone is at the
/// keyboard. A non-interactive UI gives the same answer every time, so an
/// invalid one is returned as [`AssistError::InvalidInput`]. Errors from
/// the prompt itself (closed stdin, no answer in non-interactive mode) are
/// returned as well.
pub fn prompt_failure_choice(
    ui: &mut dyn UserInterface,
    label: &str,
    attempts: u32,
    error: &AssistError,
) -> Result<FailureChoice> {
    ui.error(&format!(
        "Could not execute '{}' after {} attempts.",
        label, attempts
    ));
    ui.message(&format!("  Reason: {}", error));
    ui.message("  1) Retry this step");
    ui.message("  2) Skip and continue");
    ui.message("  3) Abort the automation");

    let prompt = Prompt {
        key: FAILURE_PROMPT_KEY.to_string(),
        question: "Choose an option (1, 2 or 3)".to_string(),
        default: None,
    };

    loop {
        let answer = ui.prompt(&prompt)?;
        match parse_choice(&answer) {
            Some(choice) => return Ok(choice),
            None if !ui.is_interactive() => {
                return Err(AssistError::InvalidInput {
                    message: format!("'{}' is not a failure choice (use 1, 2 or 3)", answer.trim()),
                });
            }
            None => ui.warning("Invalid option. Enter 1, 2 or 3."),
        }
    }
}
