//! Resolve anchor keys to screen coordinates.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::GrayImage;
use tracing::debug;

use crate::desktop::Point;
use crate::error::{AssistError, Result};

use super::manifest::{AnchorEntry, AnchorManifest};
use super::matcher::{locate_template, ScreenSource};

/// Per-call offset overrides.
///
/// Each axis resolves as: override, then manifest default, then zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offsets {
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl Offsets {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Override the horizontal offset only.
    pub fn x(x: i32) -> Self {
        Self {
            x: Some(x),
            y: None,
        }
    }

    /// Override both offsets.
    pub fn xy(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Final `(dx, dy)` for an anchor entry.
    pub fn resolve(&self, entry: &AnchorEntry) -> (i32, i32) {
        (
            self.x.or(entry.offset_x).unwrap_or(0),
            self.y.or(entry.offset_y).unwrap_or(0),
        )
    }
}

/// Finds anchors on screen.
pub trait AnchorLocator {
    /// Locate `key`, returning the center of the match and its manifest entry.
    ///
    /// `confidence` overrides the default matching threshold.
    fn locate(&mut self, key: &str, confidence: Option<f32>) -> Result<(Point, AnchorEntry)>;
}

/// [`AnchorLocator`] backed by the manifest and template matching.
pub struct AnchorResolver {
    project_root: PathBuf,
    manifest: AnchorManifest,
    /// Manifest file still to be read on first lookup.
    pending: Option<PathBuf>,
    screen: Box<dyn ScreenSource>,
    default_confidence: f32,
    templates: HashMap<String, GrayImage>,
}

impl AnchorResolver {
    /// Create a resolver. Image paths in the manifest are relative to `project_root`.
    pub fn new(
        project_root: impl Into<PathBuf>,
        manifest: AnchorManifest,
        screen: Box<dyn ScreenSource>,
        default_confidence: f32,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            manifest,
            pending: None,
            screen,
            default_confidence,
            templates: HashMap::new(),
        }
    }

    /// Create a resolver that reads the manifest at `manifest_path` on the
    /// first lookup, so the file can still be synchronized after construction.
    pub fn open(
        project_root: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
        screen: Box<dyn ScreenSource>,
        default_confidence: f32,
    ) -> Self {
        Self {
            pending: Some(manifest_path.into()),
            ..Self::new(project_root, AnchorManifest::default(), screen, default_confidence)
        }
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if let Some(path) = &self.pending {
            self.manifest = AnchorManifest::load(path)?;
            debug!(path = %path.display(), anchors = self.manifest.len(), "anchor manifest loaded");
            self.pending = None;
        }
        Ok(())
    }

    /// Manifest entry for `key`, with its image path checked.
    pub fn entry(&self, key: &str) -> Result<(&AnchorEntry, PathBuf)> {
        let entry = self
            .manifest
            .get(key)
            .ok_or_else(|| AssistError::AnchorNotDefined {
                key: key.to_string(),
            })?;
        let relative = entry
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AssistError::AnchorPathMissing {
                key: key.to_string(),
            })?;
        let path = self.project_root.join(relative);
        if !path.is_file() {
            return Err(AssistError::AnchorImageMissing {
                key: key.to_string(),
                path,
            });
        }
        Ok((entry, path))
    }

    fn template(&mut self, key: &str, path: &Path) -> Result<GrayImage> {
        if let Some(template) = self.templates.get(key) {
            return Ok(template.clone());
        }
        let template = image::open(path)
            .map_err(|e| AssistError::InvalidInput {
                message: format!("cannot decode image {:?} for anchor '{}': {}", path, key, e),
            })?
            .to_luma8();
        self.templates.insert(key.to_string(), template.clone());
        Ok(template)
    }
}

impl AnchorLocator for AnchorResolver {
    fn locate(&mut self, key: &str, confidence: Option<f32>) -> Result<(Point, AnchorEntry)> {
        self.ensure_loaded()?;
        let (entry, path) = self.entry(key)?;
        let entry = entry.clone();
        let template = self.template(key, &path)?;
        let confidence = confidence.unwrap_or(self.default_confidence);

        let shot = self.screen.capture()?;
        let found = locate_template(&shot, &template, confidence).ok_or_else(|| {
            AssistError::AnchorNotVisible {
                key: key.to_string(),
                confidence,
            }
        })?;

        debug!(key, x = found.center.x, y = found.center.y, score = found.score, "anchor located");
        Ok((found.center, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::matcher::fixtures::{pattern, screen_with};
    use crate::anchors::matcher::StaticScreen;
    use tempfile::TempDir;

    fn resolver(temp: &TempDir) -> AnchorResolver {
        let template = pattern(12, 10);
        std::fs::create_dir_all(temp.path().join("imagens")).unwrap();
        template.save(temp.path().join("imagens/aba_socio.png")).unwrap();

        let mut manifest = AnchorManifest::default();
        manifest.insert(
            "aba_socio",
            AnchorEntry {
                path: Some("imagens/aba_socio.png".to_string()),
                offset_x: Some(150),
                offset_y: None,
            },
        );
        manifest.insert("sem_imagem", AnchorEntry::for_image("imagens/nada.png"));
        manifest.insert("sem_caminho", AnchorEntry::default());

        let screen = StaticScreen::new(screen_with(&template, 30, 20));
        AnchorResolver::new(temp.path(), manifest, Box::new(screen), 0.9)
    }

    #[test]
    fn offsets_follow_precedence() {
        let entry = AnchorEntry {
            path: None,
            offset_x: Some(150),
            offset_y: None,
        };

        assert_eq!(Offsets::none().resolve(&entry), (150, 0));
        assert_eq!(Offsets::x(-50).resolve(&entry), (-50, 0));
        assert_eq!(Offsets::xy(0, 30).resolve(&entry), (0, 30));
    }

    #[test]
    fn locates_anchor_with_entry() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(&temp);

        let (point, entry) = resolver.locate("aba_socio", None).unwrap();

        assert_eq!(point, Point::new(36, 25));
        assert_eq!(entry.offset_x, Some(150));
    }

    #[test]
    fn failure_modes_are_distinct() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(&temp);

        assert!(matches!(
            resolver.locate("desconhecido", None),
            Err(AssistError::AnchorNotDefined { .. })
        ));
        assert!(matches!(
            resolver.locate("sem_caminho", None),
            Err(AssistError::AnchorPathMissing { .. })
        ));
        assert!(matches!(
            resolver.locate("sem_imagem", None),
            Err(AssistError::AnchorImageMissing { .. })
        ));
    }

    #[test]
    fn not_visible_when_screen_differs() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(&temp);
        resolver.screen = Box::new(StaticScreen::new(GrayImage::from_pixel(
            80,
            60,
            image::Luma([40]),
        )));

        let err = resolver.locate("aba_socio", Some(0.95)).unwrap_err();
        assert!(matches!(err, AssistError::AnchorNotVisible { confidence, .. } if confidence == 0.95));
    }

    #[test]
    fn open_reads_manifest_on_first_lookup() {
        let temp = TempDir::new().unwrap();
        let template = pattern(12, 10);
        let screen = StaticScreen::new(screen_with(&template, 5, 5));
        let manifest_path = temp.path().join("parametros.json");
        let mut resolver = AnchorResolver::open(temp.path(), &manifest_path, Box::new(screen), 0.9);

        // Written after the resolver exists.
        std::fs::create_dir_all(temp.path().join("imagens")).unwrap();
        template.save(temp.path().join("imagens/aba_geral.png")).unwrap();
        let mut manifest = AnchorManifest::default();
        manifest.insert("aba_geral", AnchorEntry::for_image("imagens/aba_geral.png"));
        manifest.save(&manifest_path).unwrap();

        let (point, _) = resolver.locate("aba_geral", None).unwrap();
        assert_eq!(point, Point::new(11, 10));
    }

    #[test]
    fn open_without_manifest_fails_lookups() {
        let temp = TempDir::new().unwrap();
        let screen = StaticScreen::new(GrayImage::new(10, 10));
        let mut resolver =
            AnchorResolver::open(temp.path(), temp.path().join("parametros.json"), Box::new(screen), 0.9);

        assert!(matches!(
            resolver.locate("aba_geral", None),
            Err(AssistError::ManifestNotFound { .. })
        ));
    }
}
