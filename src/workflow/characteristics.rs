//! Characteristics tab: sales division from the change log.

use tracing::info;

use crate::anchors::Offsets;
use crate::desktop::Key;
use crate::runner::Flow;
use crate::sellers::Division;
use crate::tabular::last_updated_by;

use super::Automation;

impl Automation<'_> {
    /// Copy the change log, find who last updated the partner and tick
    /// the matching division.
    pub fn characteristics(&mut self) -> Flow<Division> {
        self.stage("Characteristics tab");
        self.go_to_tab("caracteristicas")?;

        self.act("Press Alt+F", |d| d.hotkey(&[Key::Alt, Key::char('f')]))?;
        self.settle();
        self.act("Press 'L' to open the change log", |d| d.press(Key::char('l')))?;
        self.settle();

        self.act("Open the change log context menu", |d| {
            d.right_click("caracteristicas_logmodif", Offsets::xy(-50, 30))
        })?;
        self.settle();
        self.act("Press 'T' to copy the whole log", |d| d.press(Key::char('t')))?;
        self.settle();
        self.act("Press Esc to close the log", |d| d.press(Key::Escape))?;
        self.settle();

        let user = self
            .act("Read the change log from the clipboard", |d| {
                last_updated_by(&d.read_table()?)
            })?
            .unwrap_or_default();

        let division = self.sellers.division_for(&user);
        info!(user = %user, division = division.code(), "division selected");

        let (key, name) = match division {
            Division::Pet7 => ("caracteristicas_pet7", "PET7"),
            Division::Serilon => ("caracteristicas_serilon", "SERILON"),
        };
        let label = format!("Set division to {} (user: {})", name, user);
        self.act(&label, |d| d.click(key, Offsets::none()))?;
        self.settle();

        Ok(division)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::testing::*;
    use super::*;
    use crate::desktop::{FixedLocator, InputEvent, MouseButton, Point};
    use crate::runner::{AssistedExecutor, RetryPolicy, FAILURE_PROMPT_KEY};
    use crate::sellers::SellerRoster;
    use crate::ui::MockUI;

    fn locator() -> FixedLocator {
        FixedLocator::new()
            .with("aba_caracteristicas", Point::new(10, 10))
            .with("caracteristicas_logmodif", Point::new(300, 200))
            .with("caracteristicas_pet7", Point::new(50, 400))
            .with("caracteristicas_serilon", Point::new(50, 420))
    }

    fn run(log: Option<&str>, roster: SellerRoster) -> (Flow<Division>, Vec<InputEvent>) {
        let temp = TempDir::new().unwrap();
        let (desktop, input, _) = desktop(locator());
        if let Some(log) = log {
            input.on_keys(&[Key::char('t')], log);
        }
        let (services, _) = services(None, Vec::new());

        let mut ui = MockUI::new();
        ui.set_prompt_response(FAILURE_PROMPT_KEY, "skip");
        let executor = AssistedExecutor::new(&mut ui, RetryPolicy::immediate());
        let mut automation =
            Automation::new(executor, desktop, session(&temp), services).with_sellers(roster);
        let result = automation.characteristics();
        (result, input.events())
    }

    #[test]
    fn pet7_seller_selects_pet7() {
        let log = "Instância\tAtualizado por - Código do usuário\n1\tmanager\n2\tjonathan.freitas\n";
        let (result, events) = run(Some(log), SellerRoster::new(["JONATHAN.FREITAS"]));

        assert_eq!(result, Ok(Division::Pet7));
        assert!(events.contains(&InputEvent::Click(Point::new(250, 230), MouseButton::Right)));
        assert_eq!(
            events.last(),
            Some(&InputEvent::Click(Point::new(50, 400), MouseButton::Left))
        );
    }

    #[test]
    fn other_users_select_serilon() {
        let log = "Instância\tAtualizado por - Código do usuário\n1\tana.lima\n";
        let (result, events) = run(Some(log), SellerRoster::new(["JONATHAN.FREITAS"]));

        assert_eq!(result, Ok(Division::Serilon));
        assert_eq!(
            events.last(),
            Some(&InputEvent::Click(Point::new(50, 420), MouseButton::Left))
        );
    }

    #[test]
    fn unreadable_log_defaults_to_serilon() {
        let (result, _) = run(None, SellerRoster::new(["JONATHAN.FREITAS"]));
        assert_eq!(result, Ok(Division::Serilon));
    }
}
