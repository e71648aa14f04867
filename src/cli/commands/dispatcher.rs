//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs, SessionAction};
use crate::config::Settings;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }
}

/// Where a command finds its settings.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root holding the manifest, images and `.env`.
    pub project_root: PathBuf,
    /// Explicit `--config` file.
    pub config: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(project_root: impl Into<PathBuf>, config: Option<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            config,
        }
    }

    /// Load configuration and secrets for this project.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.project_root, self.config.as_deref())
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            context: CommandContext::new(project_root, None),
        }
    }

    /// Use an explicit configuration file.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.context.config = config;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.context.project_root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let context = self.context.clone();
        match &cli.command {
            Some(Commands::Run(args)) => {
                super::run::RunCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Sync) => super::sync::SyncCommand::new(context).execute(ui),
            Some(Commands::Lookup(args)) => {
                super::lookup::LookupCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Geocode(args)) => {
                super::geocode::GeocodeCommand::new(context, args.clone()).execute(ui)
            }
            Some(Commands::Session(args)) => match args.action {
                SessionAction::Show => super::session::SessionShowCommand::new(context).execute(ui),
                SessionAction::Reset => {
                    super::session::SessionResetCommand::new(context).execute(ui)
                }
            },
            None => {
                // Default to run command with default args
                super::run::RunCommand::new(context, RunArgs::default()).execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(std::path::PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), std::path::Path::new("/test"));
    }

    #[test]
    fn dispatches_session_reset() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["b1assist", "session", "reset"]).unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();

        assert!(result.success);
        assert!(temp.path().join("temp/dados_sessao.json").exists());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["b1assist", "sync"]).unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf())
            .with_config(Some(temp.path().join("nope.yml")));
        let mut ui = MockUI::new();

        assert!(dispatcher.dispatch(&cli, &mut ui).is_err());
    }
}
