//! Desktop interaction: mouse, keyboard, clipboard and screen capture.
//!
//! High-level ERP actions live in [`DesktopActions`]. They are written
//! against the [`InputDriver`] and [`ClipboardAccess`] traits so the
//! workflow can run against in-memory doubles ([`MockInput`],
//! [`MemoryClipboard`]) as well as the native backends.

pub mod actions;
pub mod clipboard;
pub mod keys;
pub mod mock;
#[cfg(feature = "desktop")]
pub mod native;

use std::str::FromStr;
use std::time::Duration;

pub use actions::{ActionTiming, DesktopActions};
pub use clipboard::{MemoryClipboard, SystemClipboard};
pub use keys::Key;
pub use mock::{FixedLocator, InputEvent, MockInput};

use crate::error::{AssistError, Result};

/// A desktop coordinate in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This point moved by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Mouse button for clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Direction of a wheel scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl FromStr for ScrollDirection {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(AssistError::InvalidInput {
                message: format!("invalid scroll direction '{}', use 'up' or 'down'", other),
            }),
        }
    }
}

fn desktop_unavailable() -> AssistError {
    AssistError::DesktopUnavailable {
        message: "b1assist was built without the `desktop` feature".to_string(),
    }
}

/// Screen capture of the primary monitor.
#[cfg(feature = "desktop")]
pub fn native_screen() -> Result<Box<dyn crate::anchors::ScreenSource>> {
    Ok(Box::new(native::XcapScreen::new()))
}

/// Screen capture of the primary monitor.
#[cfg(not(feature = "desktop"))]
pub fn native_screen() -> Result<Box<dyn crate::anchors::ScreenSource>> {
    Err(desktop_unavailable())
}

/// Simulated mouse and keyboard input.
pub trait InputDriver {
    /// Move to `at` and click `button`.
    fn click(&mut self, at: Point, button: MouseButton) -> Result<()>;

    /// Press and release a single key.
    fn press(&mut self, key: Key) -> Result<()>;

    /// Hold every key in order, then release them in reverse.
    fn hotkey(&mut self, keys: &[Key]) -> Result<()>;

    /// Type `text` one character at a time, waiting `interval` between characters.
    fn type_text(&mut self, text: &str, interval: Duration) -> Result<()>;

    /// One wheel notch.
    fn scroll(&mut self, direction: ScrollDirection) -> Result<()>;
}

/// Read and write clipboard text.
pub trait ClipboardAccess {
    /// Current clipboard text. An empty clipboard reads as an empty string.
    fn get_text(&mut self) -> Result<String>;

    /// Replace the clipboard contents.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_offset_moves_both_axes() {
        assert_eq!(Point::new(100, 200).offset(-50, 30), Point::new(50, 230));
        assert_eq!(Point::default().offset(0, 0), Point::new(0, 0));
    }

    #[test]
    fn scroll_direction_parses_case_insensitively() {
        assert_eq!("down".parse::<ScrollDirection>().unwrap(), ScrollDirection::Down);
        assert_eq!(" UP ".parse::<ScrollDirection>().unwrap(), ScrollDirection::Up);
    }

    #[cfg(not(feature = "desktop"))]
    #[test]
    fn native_screen_requires_feature() {
        assert!(matches!(
            native_screen(),
            Err(AssistError::DesktopUnavailable { .. })
        ));
    }

    #[test]
    fn scroll_direction_rejects_unknown() {
        let err = "sideways".parse::<ScrollDirection>().unwrap_err();
        assert!(matches!(err, AssistError::InvalidInput { .. }));
        assert!(err.to_string().contains("sideways"));
    }
}
