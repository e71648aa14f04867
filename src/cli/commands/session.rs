//! Session command implementations.
//!
//! `b1assist session show` prints the session file and
//! `b1assist session reset` restores the empty template.

use crate::error::Result;
use crate::session::SessionStore;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

fn open_store(context: &CommandContext) -> Result<SessionStore> {
    let settings = context.settings()?;
    Ok(SessionStore::new(settings.session_path()))
}

/// Prints the session document.
pub struct SessionShowCommand {
    context: CommandContext,
}

impl SessionShowCommand {
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }
}

impl Command for SessionShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = open_store(&self.context)?;
        let document = store.read_document()?;
        let text = serde_json::to_string_pretty(&document).map_err(anyhow::Error::from)?;
        ui.message(&text);
        Ok(CommandResult::success())
    }
}

/// Resets the session to the empty template.
pub struct SessionResetCommand {
    context: CommandContext,
}

impl SessionResetCommand {
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }
}

impl Command for SessionResetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = open_store(&self.context)?;
        store.reset()?;
        ui.success(&format!("Session reset ({}).", store.path().display()));
        Ok(CommandResult::success())
    }
}
