//! Clipboard backends.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{AssistError, Result};

use super::ClipboardAccess;

/// The operating system clipboard, through `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| AssistError::Clipboard {
            message: e.to_string(),
        })?;
        Ok(Self { inner })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn get_text(&mut self) -> Result<String> {
        match self.inner.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(AssistError::Clipboard {
                message: e.to_string(),
            }),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| AssistError::Clipboard {
                message: e.to_string(),
            })
    }
}

/// In-memory clipboard. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard preloaded with `text`.
    pub fn with_text(text: &str) -> Self {
        let clipboard = Self::new();
        clipboard.replace(text);
        clipboard
    }

    /// Current contents.
    pub fn contents(&self) -> String {
        self.contents.borrow().clone()
    }

    /// Replace the contents without going through the trait.
    pub fn replace(&self, text: &str) {
        *self.contents.borrow_mut() = text.to_string();
    }
}

impl ClipboardAccess for MemoryClipboard {
    fn get_text(&mut self) -> Result<String> {
        Ok(self.contents())
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.replace(text);
        Ok(())
    }
}
