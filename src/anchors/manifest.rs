//! Anchor manifest: symbolic key to template image plus default offsets.
//!
//! The manifest is a JSON object such as
//!
//! ```json
//! {
//!   "geral1_moeda": { "path": "imagens/geral1/moeda.png", "ajuste_x": 150, "ajuste_y": "" }
//! }
//! ```
//!
//! Blank offsets are stored as `""`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AssistError, Result};

/// Metadata for one anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEntry {
    /// Template image path, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Default horizontal offset in pixels.
    #[serde(rename = "ajuste_x", default, with = "offset_field")]
    pub offset_x: Option<i32>,
    /// Default vertical offset in pixels.
    #[serde(rename = "ajuste_y", default, with = "offset_field")]
    pub offset_y: Option<i32>,
}

impl AnchorEntry {
    /// Entry for a newly discovered image, with blank offsets.
    pub fn for_image(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            offset_x: None,
            offset_y: None,
        }
    }
}

/// Offsets may be written as integers, numeric strings, `""` or `null`.
mod offset_field {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<i32>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_i32(*v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .and_then(|v| i32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("offset out of range: {}", n))),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<i32>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid offset: {:?}", s))),
            other => Err(D::Error::custom(format!("invalid offset: {}", other))),
        }
    }
}

/// All anchors, keyed by symbolic name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorManifest {
    entries: BTreeMap<String, AnchorEntry>,
}

impl AnchorManifest {
    /// Load a manifest that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AssistError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read anchor manifest {:?}", path))?;
        serde_json::from_str(&content).map_err(|e| AssistError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a manifest, starting empty when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the manifest as pretty JSON (2-space indent).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut json = serde_json::to_string_pretty(self).context("Failed to serialize anchor manifest")?;
        json.push('\n');
        fs::write(path, json).with_context(|| format!("Failed to write anchor manifest {:?}", path))?;
        Ok(())
    }

    /// Look up an anchor.
    pub fn get(&self, key: &str) -> Option<&AnchorEntry> {
        self.entries.get(key)
    }

    /// Add or replace an anchor.
    pub fn insert(&mut self, key: impl Into<String>, entry: AnchorEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Remove an anchor.
    pub fn remove(&mut self, key: &str) -> Option<AnchorEntry> {
        self.entries.remove(key)
    }

    /// Anchor keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of anchors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the manifest has no anchors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Changes made by [`sync_manifest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Keys added for new images.
    pub added: Vec<String>,
    /// Keys removed because their image is gone.
    pub removed: Vec<String>,
    /// Anchors in the manifest after the sync.
    pub total: usize,
}

impl SyncReport {
    /// Check if the manifest file was rewritten.
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Reconcile the manifest with the template images on disk.
///
/// Entries whose image is gone are removed. Images without an entry are
/// added under their file stem with blank offsets. The file is written only
/// when something changed, so running twice in a row is a no-op.
pub fn sync_manifest(project_root: &Path, manifest_path: &Path, images_dir: &Path) -> Result<SyncReport> {
    let mut manifest = AnchorManifest::load_or_default(manifest_path)?;
    let images = scan_images(project_root, images_dir)?;
    debug!(images = images.len(), anchors = manifest.len(), "syncing anchor manifest");

    let mut report = SyncReport::default();

    let stale: Vec<String> = manifest
        .entries
        .iter()
        .filter(|(_, entry)| !entry.path.as_ref().is_some_and(|p| images.contains(p)))
        .map(|(key, _)| key.clone())
        .collect();
    for key in stale {
        manifest.remove(&key);
        report.removed.push(key);
    }

    let known: BTreeSet<String> = manifest
        .entries
        .values()
        .filter_map(|entry| entry.path.clone())
        .collect();
    for image in images.iter().filter(|p| !known.contains(*p)) {
        let key = anchor_key(&manifest, image);
        manifest.insert(key.clone(), AnchorEntry::for_image(image.clone()));
        report.added.push(key);
    }

    report.total = manifest.len();
    if report.changed() {
        manifest.save(manifest_path)?;
        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            "anchor manifest updated"
        );
    }
    Ok(report)
}

/// Key for a new image: its file stem, or its path when the stem is taken.
fn anchor_key(manifest: &AnchorManifest, image: &str) -> String {
    let stem = Path::new(image)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| image.to_string());
    if manifest.get(&stem).is_none() {
        return stem;
    }
    let fallback = image
        .strip_suffix(".png")
        .or_else(|| image.strip_suffix(".PNG"))
        .unwrap_or(image)
        .replace('/', "_");
    warn!(image, key = %fallback, "anchor name already taken, using path-based key");
    fallback
}

/// All `*.png` files under `images_dir`, as forward-slash paths relative to the project.
pub fn scan_images(project_root: &Path, images_dir: &Path) -> Result<BTreeSet<String>> {
    let mut found = BTreeSet::new();
    if images_dir.is_dir() {
        let mut files = Vec::new();
        collect_png(images_dir, &mut files)?;
        for file in files {
            found.insert(relative_slash_path(project_root, &file));
        }
    }
    Ok(found)
}

fn collect_png(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read images directory {:?}", dir))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_png(&path, out)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
