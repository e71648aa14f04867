//! High-level ERP actions built on anchors, input and clipboard.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::anchors::{AnchorLocator, Offsets};
use crate::error::Result;
use crate::tabular::Table;

use super::{ClipboardAccess, InputDriver, Key, MouseButton, Point, ScrollDirection};

/// Fixed pauses between UI interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTiming {
    /// After a click and after typing or pasting.
    pub settle: Duration,
    /// For a dropdown to open.
    pub dropdown: Duration,
    /// Around clipboard reads and writes, and between scroll notches.
    pub clipboard: Duration,
    /// After switching tabs.
    pub tab: Duration,
    /// Between typed characters.
    pub type_interval: Duration,
}

impl Default for ActionTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            dropdown: Duration::from_millis(800),
            clipboard: Duration::from_millis(300),
            tab: Duration::from_millis(1000),
            type_interval: Duration::from_millis(50),
        }
    }
}

impl ActionTiming {
    /// No pauses at all.
    pub fn instant() -> Self {
        Self {
            settle: Duration::ZERO,
            dropdown: Duration::ZERO,
            clipboard: Duration::ZERO,
            tab: Duration::ZERO,
            type_interval: Duration::ZERO,
        }
    }
}

/// The actions the workflow performs on the ERP window.
///
/// Every targeted action resolves its anchor through the locator and then
/// applies offsets with the precedence: per-call override, then manifest
/// default, then zero.
pub struct DesktopActions {
    locator: Box<dyn AnchorLocator>,
    input: Box<dyn InputDriver>,
    clipboard: Box<dyn ClipboardAccess>,
    timing: ActionTiming,
}

impl DesktopActions {
    pub fn new(
        locator: Box<dyn AnchorLocator>,
        input: Box<dyn InputDriver>,
        clipboard: Box<dyn ClipboardAccess>,
        timing: ActionTiming,
    ) -> Self {
        Self {
            locator,
            input,
            clipboard,
            timing,
        }
    }

    /// Actions backed by the native input and clipboard backends.
    #[cfg(feature = "desktop")]
    pub fn native(locator: Box<dyn AnchorLocator>, timing: ActionTiming) -> Result<Self> {
        Ok(Self::new(
            locator,
            Box::new(super::native::RdevInput::new()),
            Box::new(super::SystemClipboard::new()?),
            timing,
        ))
    }

    /// Actions backed by the native input and clipboard backends.
    #[cfg(not(feature = "desktop"))]
    pub fn native(_locator: Box<dyn AnchorLocator>, _timing: ActionTiming) -> Result<Self> {
        Err(super::desktop_unavailable())
    }

    pub fn timing(&self) -> &ActionTiming {
        &self.timing
    }

    /// Sleep for `duration`.
    pub fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    /// Resolve `key` to its final target point.
    pub fn target(&mut self, key: &str, offsets: Offsets, confidence: Option<f32>) -> Result<Point> {
        let (anchor, entry) = self.locator.locate(key, confidence)?;
        let (dx, dy) = offsets.resolve(&entry);
        let target = anchor.offset(dx, dy);
        debug!(key, x = target.x, y = target.y, dx, dy, "target resolved");
        Ok(target)
    }

    /// Left click the anchor.
    pub fn click(&mut self, key: &str, offsets: Offsets) -> Result<()> {
        let at = self.target(key, offsets, None)?;
        self.input.click(at, MouseButton::Left)
    }

    /// Right click the anchor.
    pub fn right_click(&mut self, key: &str, offsets: Offsets) -> Result<()> {
        let at = self.target(key, offsets, None)?;
        self.input.click(at, MouseButton::Right)
    }

    /// Clear the field at the anchor and paste `text` into it, then tab out.
    pub fn paste_text(&mut self, key: &str, text: &str, offsets: Offsets) -> Result<()> {
        let at = self.target(key, offsets, None)?;
        self.input.click(at, MouseButton::Left)?;
        self.wait(self.timing.settle);
        self.input.press(Key::Backspace)?;
        self.clipboard.set_text(text)?;
        self.input.hotkey(&[Key::Ctrl, Key::Char('v')])?;
        self.wait(self.timing.settle);
        self.input.press(Key::Tab)
    }

    /// Type `text` into the field at the anchor, then tab out.
    pub fn type_text(&mut self, key: &str, text: &str, offsets: Offsets) -> Result<()> {
        let at = self.target(key, offsets, None)?;
        self.input.click(at, MouseButton::Left)?;
        self.wait(self.timing.settle);
        self.input.type_text(text, self.timing.type_interval)?;
        self.wait(self.timing.settle);
        self.input.press(Key::Tab)
    }

    /// Copy the contents of the field at the anchor. The result is trimmed.
    pub fn copy_text(&mut self, key: &str, offsets: Offsets) -> Result<String> {
        let at = self.target(key, offsets, None)?;
        self.clipboard.set_text("")?;
        self.input.click(at, MouseButton::Left)?;
        self.wait(self.timing.clipboard);
        self.input.hotkey(&[Key::Ctrl, Key::Char('c')])?;
        self.wait(self.timing.clipboard);
        Ok(self.clipboard.get_text()?.trim().to_string())
    }

    /// Open the dropdown at the anchor, type `value` and confirm with enter.
    pub fn select_dropdown(&mut self, key: &str, value: &str, offsets: Offsets) -> Result<()> {
        let at = self.target(key, offsets, None)?;
        self.input.click(at, MouseButton::Left)?;
        self.wait(self.timing.dropdown);
        self.input.type_text(value, self.timing.type_interval)?;
        self.wait(self.timing.settle);
        self.input.press(Key::Enter)
    }

    pub fn press(&mut self, key: Key) -> Result<()> {
        self.input.press(key)
    }

    pub fn hotkey(&mut self, keys: &[Key]) -> Result<()> {
        self.input.hotkey(keys)
    }

    /// Scroll `lines` wheel notches in `direction`.
    pub fn scroll(&mut self, lines: u32, direction: ScrollDirection) -> Result<()> {
        for _ in 0..lines {
            self.input.scroll(direction)?;
            self.wait(self.timing.clipboard);
        }
        Ok(())
    }

    /// Parse the clipboard as a tab-separated table.
    pub fn read_table(&mut self) -> Result<Table> {
        let text = self.clipboard.get_text()?;
        Table::parse_tsv(&text)
    }

    /// Replace the clipboard contents.
    pub fn put_clipboard(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::{FixedLocator, InputEvent, MemoryClipboard, MockInput};
    use crate::error::AssistError;

    fn actions_with(locator: FixedLocator) -> (DesktopActions, MockInput, MemoryClipboard) {
        let clipboard = MemoryClipboard::new();
        let input = MockInput::with_clipboard(clipboard.clone());
        let actions = DesktopActions::new(
            Box::new(locator),
            Box::new(input.clone()),
            Box::new(clipboard.clone()),
            ActionTiming::instant(),
        );
        (actions, input, clipboard)
    }

    #[test]
    fn offsets_override_manifest_defaults() {
        let locator = FixedLocator::new().with_offsets("campo", Point::new(100, 100), Some(20), Some(5));
        let (mut actions, input, _) = actions_with(locator);

        actions.click("campo", Offsets::none()).unwrap();
        actions.click("campo", Offsets::x(150)).unwrap();
        actions.click("campo", Offsets::xy(-50, 30)).unwrap();

        assert_eq!(
            input.clicks(MouseButton::Left),
            vec![Point::new(120, 105), Point::new(250, 105), Point::new(50, 130)]
        );
    }

    #[test]
    fn blank_manifest_offsets_default_to_zero() {
        let locator = FixedLocator::new().with("campo", Point::new(10, 10));
        let (mut actions, input, _) = actions_with(locator);

        actions.right_click("campo", Offsets::none()).unwrap();

        assert_eq!(input.clicks(MouseButton::Right), vec![Point::new(10, 10)]);
    }

    #[test]
    fn paste_text_clears_pastes_and_tabs() {
        let locator = FixedLocator::new().with("geral2_data_abertura", Point::new(1, 1));
        let (mut actions, input, clipboard) = actions_with(locator);

        actions
            .paste_text("geral2_data_abertura", "15/03/2010", Offsets::none())
            .unwrap();

        assert_eq!(clipboard.contents(), "15/03/2010");
        assert_eq!(
            input.events(),
            vec![
                InputEvent::Click(Point::new(1, 1), MouseButton::Left),
                InputEvent::Press(Key::Backspace),
                InputEvent::Hotkey(vec![Key::Ctrl, Key::Char('v')]),
                InputEvent::Press(Key::Tab),
            ]
        );
    }

    #[test]
    fn select_dropdown_types_and_confirms() {
        let locator = FixedLocator::new().with("geral1_tipopn", Point::new(1, 1));
        let (mut actions, input, _) = actions_with(locator);

        actions
            .select_dropdown("geral1_tipopn", "Cliente", Offsets::none())
            .unwrap();

        let events = input.events();
        assert_eq!(events[1], InputEvent::Type("Cliente".to_string()));
        assert_eq!(events[2], InputEvent::Press(Key::Enter));
    }

    #[test]
    fn copy_text_reads_trimmed_clipboard() {
        let locator = FixedLocator::new().with("endereco_idfiscais_cnpj", Point::new(1, 1));
        let (mut actions, input, clipboard) = actions_with(locator);
        clipboard.replace("stale");
        input.on_copy("  12.345.678/0001-99 \r\n");

        let text = actions
            .copy_text("endereco_idfiscais_cnpj", Offsets::none())
            .unwrap();

        assert_eq!(text, "12.345.678/0001-99");
    }

    #[test]
    fn copy_text_clears_stale_clipboard_when_nothing_is_copied() {
        let locator = FixedLocator::new().with("campo", Point::new(1, 1));
        let (mut actions, _, clipboard) = actions_with(locator);
        clipboard.replace("stale");

        assert_eq!(actions.copy_text("campo", Offsets::none()).unwrap(), "");
    }

    #[test]
    fn scroll_sends_one_notch_per_line() {
        let (mut actions, input, _) = actions_with(FixedLocator::new());

        actions.scroll(3, ScrollDirection::Down).unwrap();

        assert_eq!(input.events(), vec![InputEvent::Scroll(ScrollDirection::Down); 3]);
    }

    #[test]
    fn read_table_parses_clipboard() {
        let (mut actions, _, clipboard) = actions_with(FixedLocator::new());
        clipboard.replace("A\tB\n1\t2\n");

        let table = actions.read_table().unwrap();

        assert_eq!(table.get(0, "B"), Some("2"));
    }

    #[test]
    fn read_table_on_empty_clipboard_fails() {
        let (mut actions, _, _) = actions_with(FixedLocator::new());
        assert!(matches!(actions.read_table(), Err(AssistError::ClipboardEmpty)));
    }

    #[test]
    fn missing_anchor_propagates() {
        let (mut actions, input, _) = actions_with(FixedLocator::new());

        let err = actions.click("aba_socio", Offsets::none()).unwrap_err();

        assert!(matches!(err, AssistError::AnchorNotVisible { .. }));
        assert!(input.events().is_empty());
    }
}
