//! Run command implementation.
//!
//! The `b1assist run` command drives the full registration on the live
//! desktop.

use std::thread;
use std::time::Duration;

use tracing::info;

use crate::anchors::AnchorResolver;
use crate::cli::args::RunArgs;
use crate::config::Settings;
use crate::desktop::{native_screen, DesktopActions};
use crate::error::Result;
use crate::runner::AssistedExecutor;
use crate::sellers::SellerRoster;
use crate::services::{GeocodeClient, RegistryClient, RegistryLookup};
use crate::session::{SessionGuard, SessionStore};
use crate::ui::UserInterface;
use crate::workflow::{AnchorPaths, Automation, Services};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    context: CommandContext,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(context: CommandContext, args: RunArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.context.settings()?;
        let config = &settings.config;
        let geocode_key = settings.require_geocode_key()?;
        let registry_key = settings.require_registry_key()?;

        let resolver = AnchorResolver::open(
            &settings.project_root,
            settings.manifest_path(),
            native_screen()?,
            config.image_confidence,
        );
        let desktop = DesktopActions::native(Box::new(resolver), config.timing.action_timing())?;

        let services = Services {
            registry: Box::new(RegistryLookup::new(RegistryClient::new(
                &config.services.registry_url,
                registry_key,
                config.services.registry_timeout(),
                config.services.tier_pause(),
            )?)),
            geocoder: Box::new(GeocodeClient::new(
                &config.services.geocode_url,
                geocode_key,
                config.services.geocode_timeout(),
            )?),
        };
        let sellers = SellerRoster::load(&settings.sellers_path())?;

        run_registration(ui, &settings, desktop, services, sellers, self.args.delay)
    }
}

/// Run the registration over already-built desktop actions and services.
///
/// The session file is reset before the first stage and again when the run
/// ends, whether it finished or the operator stopped it. An operator abort
/// is still a successful command.
pub fn run_registration(
    ui: &mut dyn UserInterface,
    settings: &Settings,
    desktop: DesktopActions,
    services: Services,
    sellers: SellerRoster,
    delay: u64,
) -> Result<CommandResult> {
    let store = SessionStore::new(settings.session_path());
    let _guard = SessionGuard::start(&store)?;

    if delay > 0 {
        ui.message(&format!(
            "Starting in {}s. Bring the SAP Business One window to the front.",
            delay
        ));
        thread::sleep(Duration::from_secs(delay));
    }
    ui.show_header("Business partner registration");
    info!(sellers = sellers.len(), "starting registration run");

    let executor = AssistedExecutor::new(&mut *ui, settings.config.retry.policy());
    let mut automation = Automation::new(executor, desktop, store, services)
        .with_sellers(sellers)
        .with_anchor_paths(AnchorPaths {
            project_root: settings.project_root.clone(),
            manifest: settings.manifest_path(),
            images: settings.images_dir(),
        });

    let outcome = automation.run_all();
    automation.report();
    drop(automation);

    if outcome.is_err() {
        info!("run aborted by operator");
        ui.warning("Automation stopped by the user.");
    }
    Ok(CommandResult::success())
}
