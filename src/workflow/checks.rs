//! Readiness checks run before touching the ERP.

use crate::anchors::sync_manifest;
use crate::error::Result;
use crate::runner::{described, Flow};

use super::Automation;

/// Address geocoded to prove the service and key work.
pub const GEOCODE_CHECK_ADDRESS: &str = "Avenida Paulista, 1578, São Paulo, SP";

impl Automation<'_> {
    /// Synchronize the anchor manifest and check the geocoding service.
    pub fn readiness_checks(&mut self) -> Flow {
        self.stage("Readiness checks");

        let anchors = self.anchors.clone();
        let geocoder = &mut self.services.geocoder;
        let check = described(
            "Check the environment\nSynchronize the anchor manifest and geocode a known address.",
            || -> Result<_> {
                let report = match &anchors {
                    Some(paths) => {
                        Some(sync_manifest(&paths.project_root, &paths.manifest, &paths.images)?)
                    }
                    None => None,
                };
                geocoder.geocode(GEOCODE_CHECK_ADDRESS)?;
                Ok(report)
            },
        );
        let outcome = self.executor.execute_step(None, check);

        if let Some(Some(report)) = outcome.into_result()? {
            let ui = self.executor.ui();
            for key in &report.added {
                ui.message(&format!("  + anchor '{}'", key));
            }
            for key in &report.removed {
                ui.message(&format!("  - anchor '{}'", key));
            }
        }

        self.executor.ui().success("Environment ready.");
        Ok(())
    }
}
