//! Interactive prompts backed by dialoguer.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use crate::error::{AssistError, Result};

use super::Prompt;

/// Convert dialoguer errors to AssistError.
fn map_dialoguer_err(e: dialoguer::Error) -> AssistError {
    AssistError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask the operator for a line of text.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<String> {
    let theme = prompt_theme();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(&prompt.question)
        .allow_empty(true);
    if let Some(default) = &prompt.default {
        input = input.default(default.clone());
    }

    input.interact_text_on(term).map_err(map_dialoguer_err)
}
