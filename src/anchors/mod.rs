//! Screen anchors: template images that locate ERP controls.

pub mod manifest;
pub mod matcher;
pub mod resolver;

pub use manifest::{scan_images, sync_manifest, AnchorEntry, AnchorManifest, SyncReport};
pub use matcher::{best_match, locate_template, ScreenSource, Screenshot, StaticScreen, TemplateMatch};
pub use resolver::{AnchorLocator, AnchorResolver, Offsets};
