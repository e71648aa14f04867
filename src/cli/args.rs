//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// b1assist - Assisted business partner registration for SAP Business One.
#[derive(Debug, Parser)]
#[command(name = "b1assist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default b1assist.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Never prompt; failure decisions come from B1ASSIST_PROMPT_* variables
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the registration automation (default if no command specified)
    Run(RunArgs),

    /// Synchronize the anchor manifest with the template images
    Sync,

    /// Look up a CNPJ in the company registry
    Lookup(LookupArgs),

    /// Geocode an address
    Geocode(GeocodeArgs),

    /// Inspect or clear the session file
    Session(SessionArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Seconds to wait before the first action, to bring the ERP window to the front
    #[arg(long, default_value_t = 0, value_name = "SECONDS")]
    pub delay: u64,
}

/// Arguments for the `lookup` command.
#[derive(Debug, Clone, clap::Args)]
pub struct LookupArgs {
    /// CNPJ to look up, with or without punctuation
    pub tax_id: String,
}

/// Arguments for the `geocode` command.
#[derive(Debug, Clone, clap::Args)]
pub struct GeocodeArgs {
    /// Address to geocode
    #[arg(required = true, num_args = 1..)]
    pub address: Vec<String>,
}

impl GeocodeArgs {
    /// The address words joined with spaces.
    pub fn address(&self) -> String {
        self.address.join(" ")
    }
}

/// Arguments for the `session` command.
#[derive(Debug, Clone, clap::Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Session subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SessionAction {
    /// Print the session document
    Show,
    /// Reset the session to the empty template
    Reset,
}
