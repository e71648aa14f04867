//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command loads its
//! settings through the shared [`CommandContext`], so `--config` and
//! `--project` apply the same way everywhere.

pub mod dispatcher;
pub mod geocode;
pub mod lookup;
pub mod run;
pub mod session;
pub mod sync;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
