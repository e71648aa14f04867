//! Geocode command implementation.
//!
//! The `b1assist geocode <ADDRESS>` command resolves an address the way
//! the billing stage does and prints the coordinates in both notations.

use crate::cli::args::GeocodeArgs;
use crate::error::Result;
use crate::services::{GeocodeClient, Geocoder};
use crate::tabular::format_coordinate;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The geocode command implementation.
pub struct GeocodeCommand {
    context: CommandContext,
    args: GeocodeArgs,
}

impl GeocodeCommand {
    pub fn new(context: CommandContext, args: GeocodeArgs) -> Self {
        Self { context, args }
    }
}

impl Command for GeocodeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.context.settings()?;
        let key = settings.require_geocode_key()?;
        let services = &settings.config.services;
        let mut client = GeocodeClient::new(&services.geocode_url, key, services.geocode_timeout())?;

        let address = self.args.address();
        let point = client.geocode(&address)?;

        ui.message(&format!("Latitude:  {}", point.lat));
        ui.message(&format!("Longitude: {}", point.lng));
        ui.message(&format!(
            "Grid:      {}\t{}",
            format_coordinate(point.lat),
            format_coordinate(point.lng)
        ));
        Ok(CommandResult::success())
    }
}
