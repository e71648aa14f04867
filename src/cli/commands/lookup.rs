//! Lookup command implementation.
//!
//! The `b1assist lookup <CNPJ>` command queries the company registry
//! and prints the normalized record, without touching the desktop.

use crate::cli::args::LookupArgs;
use crate::document::{Document, DocumentKind};
use crate::error::{AssistError, Result};
use crate::services::{CompanyLookup, RegistryClient, RegistryLookup};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The lookup command implementation.
pub struct LookupCommand {
    context: CommandContext,
    args: LookupArgs,
}

impl LookupCommand {
    pub fn new(context: CommandContext, args: LookupArgs) -> Self {
        Self { context, args }
    }
}

impl Command for LookupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.context.settings()?;
        let key = settings.require_registry_key()?;

        let document = Document::parse(&self.args.tax_id);
        if document.kind != DocumentKind::Cnpj {
            return Err(AssistError::InvalidInput {
                message: format!("'{}' is not a CNPJ", self.args.tax_id),
            });
        }

        let services = &settings.config.services;
        let client = RegistryClient::new(
            &services.registry_url,
            key,
            services.registry_timeout(),
            services.tier_pause(),
        )?;
        let mut lookup = RegistryLookup::new(client);

        let mut spinner = ui.start_spinner(&format!("Looking up {}...", document.digits));
        let record = match lookup.lookup(&document.digits) {
            Ok(record) => {
                spinner.finish_success("Found");
                record
            }
            Err(e) => {
                spinner.finish_error("Lookup failed");
                return Err(e);
            }
        };

        let text = serde_json::to_string_pretty(&record).map_err(anyhow::Error::from)?;
        ui.message(&text);
        Ok(CommandResult::success())
    }
}
