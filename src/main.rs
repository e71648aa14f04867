//! b1assist CLI entry point.

use std::io::IsTerminal;
use std::process::ExitCode;

use b1assist::cli::{Cli, CommandDispatcher};
use b1assist::ui::{create_ui, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `RUST_LOG` environment variable (if set and valid)
/// 2. `--debug` flag sets level to DEBUG
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(log_filter(rust_log.as_deref(), debug))
        .init();
}

fn log_filter(rust_log: Option<&str>, debug: bool) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            EnvFilter::new(if debug { "b1assist=debug" } else { "b1assist=info" })
        })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("b1assist starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let project_root = cli
        .project
        .as_ref()
        .cloned()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    // Failure decisions need a person at the keyboard
    let is_interactive = !cli.non_interactive && std::io::stdin().is_terminal();

    let mut ui = create_ui(is_interactive, output_mode);

    let dispatcher = CommandDispatcher::new(project_root).with_config(cli.config.clone());

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_wins_over_debug_flag() {
        assert_eq!(log_filter(Some("b1assist=trace"), true).to_string(), "b1assist=trace");
    }

    #[test]
    fn debug_flag_without_rust_log() {
        assert_eq!(log_filter(None, true).to_string(), "b1assist=debug");
        assert_eq!(log_filter(None, false).to_string(), "b1assist=info");
    }

    #[test]
    fn invalid_rust_log_falls_back() {
        assert_eq!(log_filter(Some("b1assist=loud"), false).to_string(), "b1assist=info");
    }
}
