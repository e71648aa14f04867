//! Session storage.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;

use super::SessionData;

/// JSON file holding the data shared between steps of one run.
///
/// Single writer, single reader: steps run one at a time, so no locking.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the document with the empty template.
    pub fn reset(&self) -> Result<()> {
        debug!(path = %self.path.display(), "resetting session");
        let template = SessionData::template().to_document().context("Failed to serialize session template")?;
        self.persist(&template)
    }

    /// Read the raw document, recreating it from the template when missing.
    pub fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            self.reset()?;
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {:?}", self.path))?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "session file unreadable, restoring template");
                self.reset()?;
                Ok(SessionData::template()
                    .to_document()
                    .context("Failed to serialize session template")?)
            }
        }
    }

    /// Read the typed session data.
    pub fn read(&self) -> Result<SessionData> {
        let document = self.read_document()?;
        let data = serde_json::from_value(Value::Object(document))
            .with_context(|| format!("Session file {:?} has invalid values", self.path))?;
        Ok(data)
    }

    /// Shallow-merge `partial` over the current document and persist it.
    ///
    /// Top-level keys in `partial` replace existing ones wholesale.
    pub fn write(&self, partial: Map<String, Value>) -> Result<SessionData> {
        let mut document = self.read_document()?;
        for (key, value) in partial {
            document.insert(key, value);
        }
        let data: SessionData = serde_json::from_value(Value::Object(document.clone()))
            .context("Session update produced invalid values")?;
        self.persist(&document)?;
        Ok(data)
    }

    /// Typed read-modify-write.
    pub fn update(&self, f: impl FnOnce(&mut SessionData)) -> Result<SessionData> {
        let mut data = self.read()?;
        f(&mut data);
        let document = data.to_document().context("Failed to serialize session")?;
        self.persist(&document)?;
        Ok(data)
    }

    /// Write atomically: temp file, then rename.
    fn persist(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create session directory {:?}", dir))?;
        }

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        document
            .serialize(&mut serializer)
            .context("Failed to serialize session")?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &buffer)
            .with_context(|| format!("Failed to write session to {:?}", temp_path))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace session file {:?}", self.path))?;
        Ok(())
    }
}

/// Resets the session when created and again when dropped.
///
/// Held for the duration of a run so the file is cleared on success,
/// error and abort alike.
pub struct SessionGuard {
    store: SessionStore,
}

impl SessionGuard {
    /// Reset the store and start guarding it.
    pub fn start(store: &SessionStore) -> Result<Self> {
        store.reset()?;
        Ok(Self {
            store: store.clone(),
        })
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.store.reset() {
            warn!(error = %e, "failed to reset session at end of run");
        }
    }
}
