//! Sync command implementation.
//!
//! The `b1assist sync` command reconciles the anchor manifest with the
//! template images on disk.

use crate::anchors::sync_manifest;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The sync command implementation.
pub struct SyncCommand {
    context: CommandContext,
}

impl SyncCommand {
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }
}

impl Command for SyncCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.context.settings()?;
        let report = sync_manifest(
            &settings.project_root,
            &settings.manifest_path(),
            &settings.images_dir(),
        )?;

        for key in &report.added {
            ui.message(&format!("  + {}", key));
        }
        for key in &report.removed {
            ui.message(&format!("  - {}", key));
        }

        if report.changed() {
            ui.success(&format!(
                "Manifest updated: {} added, {} removed, {} anchors.",
                report.added.len(),
                report.removed.len(),
                report.total
            ));
        } else {
            ui.success(&format!("Manifest up to date ({} anchors).", report.total));
        }
        Ok(CommandResult::success())
    }
}
