//! Key names used by the workflow.

use std::fmt;
use std::str::FromStr;

use crate::error::{AssistError, Result};

/// A keyboard key.
///
/// Named keys cover what the ERP forms need. Everything else is a
/// printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Backspace,
    Ctrl,
    Shift,
    Alt,
    Space,
    Char(char),
}

impl Key {
    /// Shorthand for a lowercase character key.
    pub fn char(c: char) -> Self {
        Self::Char(c.to_ascii_lowercase())
    }
}

impl FromStr for Key {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        let key = match name.as_str() {
            "tab" => Self::Tab,
            "enter" | "return" => Self::Enter,
            "esc" | "escape" => Self::Escape,
            "backspace" => Self::Backspace,
            "ctrl" | "control" => Self::Ctrl,
            "shift" => Self::Shift,
            "alt" => Self::Alt,
            "space" => Self::Space,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => {
                        return Err(AssistError::UnsupportedKey {
                            key: s.to_string(),
                        })
                    }
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tab => write!(f, "tab"),
            Self::Enter => write!(f, "enter"),
            Self::Escape => write!(f, "esc"),
            Self::Backspace => write!(f, "backspace"),
            Self::Ctrl => write!(f, "ctrl"),
            Self::Shift => write!(f, "shift"),
            Self::Alt => write!(f, "alt"),
            Self::Space => write!(f, "space"),
            Self::Char(c) => write!(f, "{}", c),
        }
    }
}
