//! Native desktop backends: `rdev` for input, `xcap` for screen capture.

use std::thread;
use std::time::Duration;

use rdev::{simulate, Button, EventType};
use tracing::debug;

use crate::anchors::{ScreenSource, Screenshot};
use crate::error::{AssistError, Result};

use super::{InputDriver, Key, MouseButton, Point, ScrollDirection};

/// Pause between synthetic events so the target application sees each one.
const EVENT_GAP: Duration = Duration::from_millis(20);

/// Input simulation through `rdev::simulate`.
#[derive(Debug, Default)]
pub struct RdevInput;

impl RdevInput {
    pub fn new() -> Self {
        Self
    }

    fn send(&self, event: &EventType) -> Result<()> {
        simulate(event).map_err(|e| AssistError::InputFailed {
            message: format!("{:?} rejected: {:?}", event, e),
        })?;
        thread::sleep(EVENT_GAP);
        Ok(())
    }

    fn tap(&self, key: rdev::Key) -> Result<()> {
        self.send(&EventType::KeyPress(key))?;
        self.send(&EventType::KeyRelease(key))
    }

    fn type_char(&self, c: char) -> Result<()> {
        let (key, shifted) = char_key(c)?;
        if shifted {
            self.send(&EventType::KeyPress(rdev::Key::ShiftLeft))?;
            let typed = self.tap(key);
            self.send(&EventType::KeyRelease(rdev::Key::ShiftLeft))?;
            typed
        } else {
            self.tap(key)
        }
    }
}

impl InputDriver for RdevInput {
    fn click(&mut self, at: Point, button: MouseButton) -> Result<()> {
        debug!(x = at.x, y = at.y, ?button, "click");
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        };
        self.send(&EventType::MouseMove {
            x: f64::from(at.x),
            y: f64::from(at.y),
        })?;
        self.send(&EventType::ButtonPress(button))?;
        self.send(&EventType::ButtonRelease(button))
    }

    fn press(&mut self, key: Key) -> Result<()> {
        match key {
            Key::Char(c) => self.type_char(c),
            named => self.tap(native_key(named)?),
        }
    }

    fn hotkey(&mut self, keys: &[Key]) -> Result<()> {
        let native = keys.iter().map(|k| native_key(*k)).collect::<Result<Vec<_>>>()?;
        for key in &native {
            self.send(&EventType::KeyPress(*key))?;
        }
        for key in native.iter().rev() {
            self.send(&EventType::KeyRelease(*key))?;
        }
        Ok(())
    }

    fn type_text(&mut self, text: &str, interval: Duration) -> Result<()> {
        for c in text.chars() {
            self.type_char(c)?;
            thread::sleep(interval);
        }
        Ok(())
    }

    fn scroll(&mut self, direction: ScrollDirection) -> Result<()> {
        let delta_y = match direction {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        };
        self.send(&EventType::Wheel { delta_x: 0, delta_y })
    }
}

fn native_key(key: Key) -> Result<rdev::Key> {
    Ok(match key {
        Key::Tab => rdev::Key::Tab,
        Key::Enter => rdev::Key::Return,
        Key::Escape => rdev::Key::Escape,
        Key::Backspace => rdev::Key::Backspace,
        Key::Ctrl => rdev::Key::ControlLeft,
        Key::Shift => rdev::Key::ShiftLeft,
        Key::Alt => rdev::Key::Alt,
        Key::Space => rdev::Key::Space,
        Key::Char(c) => {
            let (key, shifted) = char_key(c)?;
            if shifted {
                return Err(AssistError::UnsupportedKey {
                    key: c.to_string(),
                });
            }
            key
        }
    })
}

/// Physical key for a character, and whether shift is needed (US layout).
fn char_key(c: char) -> Result<(rdev::Key, bool)> {
    use rdev::Key as K;

    const LETTERS: [rdev::Key; 26] = [
        K::KeyA, K::KeyB, K::KeyC, K::KeyD, K::KeyE, K::KeyF, K::KeyG, K::KeyH, K::KeyI,
        K::KeyJ, K::KeyK, K::KeyL, K::KeyM, K::KeyN, K::KeyO, K::KeyP, K::KeyQ, K::KeyR,
        K::KeyS, K::KeyT, K::KeyU, K::KeyV, K::KeyW, K::KeyX, K::KeyY, K::KeyZ,
    ];
    const DIGITS: [rdev::Key; 10] = [
        K::Num0, K::Num1, K::Num2, K::Num3, K::Num4, K::Num5, K::Num6, K::Num7, K::Num8, K::Num9,
    ];

    let found = match c {
        'a'..='z' => Some((LETTERS[(c as u8 - b'a') as usize], false)),
        'A'..='Z' => Some((LETTERS[(c as u8 - b'A') as usize], true)),
        '0'..='9' => Some((DIGITS[(c as u8 - b'0') as usize], false)),
        ' ' => Some((K::Space, false)),
        '-' => Some((K::Minus, false)),
        '_' => Some((K::Minus, true)),
        '.' => Some((K::Dot, false)),
        ',' => Some((K::Comma, false)),
        '/' => Some((K::Slash, false)),
        ';' => Some((K::SemiColon, false)),
        ':' => Some((K::SemiColon, true)),
        _ => None,
    };
    found.ok_or_else(|| AssistError::UnsupportedKey {
        key: c.to_string(),
    })
}

/// Captures the primary monitor with `xcap`.
#[derive(Debug, Default)]
pub struct XcapScreen;

impl XcapScreen {
    pub fn new() -> Self {
        Self
    }
}

fn capture_err(context: &str, e: impl std::fmt::Display) -> AssistError {
    AssistError::ScreenCapture {
        message: format!("{}: {}", context, e),
    }
}

impl ScreenSource for XcapScreen {
    fn capture(&mut self) -> Result<Screenshot> {
        let monitors = xcap::Monitor::all().map_err(|e| capture_err("failed to list monitors", e))?;
        let mut primary = None;
        for monitor in monitors {
            if monitor
                .is_primary()
                .map_err(|e| capture_err("failed to query monitor", e))?
            {
                primary = Some(monitor);
                break;
            }
        }
        let monitor = primary.ok_or_else(|| AssistError::ScreenCapture {
            message: "no primary monitor".to_string(),
        })?;

        let origin = Point::new(
            monitor.x().map_err(|e| capture_err("failed to read monitor origin", e))?,
            monitor.y().map_err(|e| capture_err("failed to read monitor origin", e))?,
        );
        let frame = monitor
            .capture_image()
            .map_err(|e| capture_err("failed to capture screen", e))?;

        Ok(Screenshot {
            image: image::imageops::grayscale(&frame),
            origin,
        })
    }
}
