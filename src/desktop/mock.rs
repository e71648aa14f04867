//! In-memory desktop doubles for testing.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::anchors::{AnchorEntry, AnchorLocator};
use crate::error::{AssistError, Result};

use super::{InputDriver, Key, MemoryClipboard, MouseButton, Point, ScrollDirection};

/// One recorded input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Click(Point, MouseButton),
    Press(Key),
    Hotkey(Vec<Key>),
    Type(String),
    Scroll(ScrollDirection),
}

/// Clipboard contents the mock produces when specific keys are sent.
#[derive(Debug, Clone)]
struct CopyReaction {
    keys: Vec<Key>,
    text: String,
}

/// Recording [`InputDriver`].
///
/// Clones share the same event log, so a test can hand one clone to
/// [`super::DesktopActions`] and inspect the other. Queued copy reactions
/// emulate the host application filling the clipboard in response to a
/// key (for example ctrl+c on a field or `t` in a grid context menu).
#[derive(Debug, Clone, Default)]
pub struct MockInput {
    events: Rc<RefCell<Vec<InputEvent>>>,
    reactions: Rc<RefCell<VecDeque<CopyReaction>>>,
    clipboard: Option<MemoryClipboard>,
    failures: Rc<RefCell<u32>>,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that writes copy reactions into `clipboard`.
    pub fn with_clipboard(clipboard: MemoryClipboard) -> Self {
        Self {
            clipboard: Some(clipboard),
            ..Self::default()
        }
    }

    /// When `keys` are next sent (as a press or hotkey), put `text` on the clipboard.
    ///
    /// Reactions fire in the order queued.
    pub fn on_keys(&self, keys: &[Key], text: &str) {
        self.reactions.borrow_mut().push_back(CopyReaction {
            keys: keys.to_vec(),
            text: text.to_string(),
        });
    }

    /// Shorthand for a ctrl+c reaction.
    pub fn on_copy(&self, text: &str) {
        self.on_keys(&[Key::Ctrl, Key::Char('c')], text);
    }

    /// Make the next `count` clicks fail.
    pub fn fail_clicks(&self, count: u32) {
        *self.failures.borrow_mut() = count;
    }

    /// Every event recorded so far.
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.borrow().clone()
    }

    /// Points clicked with `button`, in order.
    pub fn clicks(&self, button: MouseButton) -> Vec<Point> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                InputEvent::Click(p, b) if *b == button => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Text typed, in order.
    pub fn typed(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                InputEvent::Type(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of reactions that have not fired yet.
    pub fn pending_reactions(&self) -> usize {
        self.reactions.borrow().len()
    }

    fn record(&self, event: InputEvent) {
        self.events.borrow_mut().push(event);
    }

    fn react(&self, keys: &[Key]) {
        let mut reactions = self.reactions.borrow_mut();
        if reactions.front().is_some_and(|r| r.keys == keys) {
            if let Some(reaction) = reactions.pop_front() {
                if let Some(clipboard) = &self.clipboard {
                    clipboard.replace(&reaction.text);
                }
            }
        }
    }
}

impl InputDriver for MockInput {
    fn click(&mut self, at: Point, button: MouseButton) -> Result<()> {
        {
            let mut failures = self.failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(AssistError::InputFailed {
                    message: format!("click at {} rejected", at),
                });
            }
        }
        self.record(InputEvent::Click(at, button));
        Ok(())
    }

    fn press(&mut self, key: Key) -> Result<()> {
        self.record(InputEvent::Press(key));
        self.react(&[key]);
        Ok(())
    }

    fn hotkey(&mut self, keys: &[Key]) -> Result<()> {
        self.record(InputEvent::Hotkey(keys.to_vec()));
        self.react(keys);
        Ok(())
    }

    fn type_text(&mut self, text: &str, _interval: Duration) -> Result<()> {
        self.record(InputEvent::Type(text.to_string()));
        Ok(())
    }

    fn scroll(&mut self, direction: ScrollDirection) -> Result<()> {
        self.record(InputEvent::Scroll(direction));
        Ok(())
    }
}

/// [`AnchorLocator`] answering from a fixed table.
///
/// Keys that were never registered fail with
/// [`AssistError::AnchorNotVisible`], like a control that is not on screen.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    anchors: HashMap<String, (Point, AnchorEntry)>,
    lookups: Rc<RefCell<Vec<String>>>,
}

impl FixedLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` at `at` with blank offsets.
    pub fn with(mut self, key: &str, at: Point) -> Self {
        self.anchors
            .insert(key.to_string(), (at, AnchorEntry::default()));
        self
    }

    /// Register `key` at `at` with manifest offsets.
    pub fn with_offsets(mut self, key: &str, at: Point, offset_x: Option<i32>, offset_y: Option<i32>) -> Self {
        let entry = AnchorEntry {
            path: Some(format!("imagens/{}.png", key)),
            offset_x,
            offset_y,
        };
        self.anchors.insert(key.to_string(), (at, entry));
        self
    }

    /// Register every key at a distinct point.
    pub fn with_all(mut self, keys: &[&str]) -> Self {
        for (i, key) in keys.iter().enumerate() {
            let at = Point::new(100 + 10 * i as i32, 100 + 10 * i as i32);
            self = self.with(key, at);
        }
        self
    }

    /// Keys looked up so far, in order. Shared between clones.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl AnchorLocator for FixedLocator {
    fn locate(&mut self, key: &str, confidence: Option<f32>) -> Result<(Point, AnchorEntry)> {
        self.lookups.borrow_mut().push(key.to_string());
        self.anchors
            .get(key)
            .cloned()
            .ok_or_else(|| AssistError::AnchorNotVisible {
                key: key.to_string(),
                confidence: confidence.unwrap_or(0.9),
            })
    }
}
