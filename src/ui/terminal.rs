//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{
    format_duration, prompt_user, should_use_colors, AssistTheme, NonInteractiveUI, OutputMode,
    ProgressSpinner, Prompt, RunSummary, SpinnerHandle, StepStatus, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: AssistTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            AssistTheme::new()
        } else {
            AssistTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        prompt_user(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_status() {
            return;
        }

        let b = &self.theme.border;
        writeln!(self.term).ok();
        writeln!(
            self.term,
            "  {} {}",
            b.apply_to("┌─"),
            b.apply_to("Summary ──────────────────────────")
        )
        .ok();

        for step in &summary.steps {
            let icon = match step.status {
                StepStatus::Completed => self.theme.success.apply_to(step.status.icon()),
                StepStatus::Skipped => self.theme.dim.apply_to(step.status.icon()),
                StepStatus::Aborted => self.theme.error.apply_to(step.status.icon()),
            };
            let attempts = if step.attempts > 1 {
                format!(" ({} attempts)", step.attempts)
            } else {
                String::new()
            };
            writeln!(
                self.term,
                "  {} {} {:<44} {}{}",
                b.apply_to("│"),
                icon,
                step.label,
                self.theme.duration.apply_to(format_duration(step.duration)),
                self.theme.dim.apply_to(attempts),
            )
            .ok();
        }

        writeln!(
            self.term,
            "  {}",
            b.apply_to("├────────────────────────────────────")
        )
        .ok();
        writeln!(
            self.term,
            "  {} Total: {} {} {} done {} {} skipped",
            b.apply_to("│"),
            self.theme
                .duration
                .apply_to(format_duration(summary.total_duration)),
            self.theme.dim.apply_to("·"),
            summary.count(StepStatus::Completed),
            self.theme.dim.apply_to("·"),
            summary.count(StepStatus::Skipped),
        )
        .ok();
        writeln!(
            self.term,
            "  {}",
            b.apply_to("└────────────────────────────────────")
        )
        .ok();
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI based on context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn create_ui_non_interactive() {
        let ui = create_ui(false, OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(false, OutputMode::Silent);
        assert_eq!(ui.output_mode(), OutputMode::Silent);
    }
}
