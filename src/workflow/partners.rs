//! Contact persons tab: company partners.

use tracing::debug;

use crate::anchors::Offsets;
use crate::desktop::Key;
use crate::runner::Flow;

use super::Automation;

const NEW_PARTNER_FIELD: &str = "pessoascontato_novosocio";
/// Alternate look of the new contact row once the list has entries.
const NEW_PARTNER_FIELD_ALT: &str = "pessoascontato_novosocio2";

impl Automation<'_> {
    /// Add every partner stored in the session as a contact person.
    pub fn partners(&mut self) -> Flow {
        self.stage("Contact persons: partners");

        let store = &self.session;
        let partners = self
            .executor
            .execute(Some("Read partners from session"), || {
                store.read().map(|data| data.partners)
            })
            .into_result()?
            .unwrap_or_default();

        if partners.is_empty() {
            self.executor.ui().message("No partners to fill.");
            return Ok(());
        }

        self.go_to_tab("socio")?;
        self.executor
            .ui()
            .message(&format!("Filling {} partner(s)...", partners.len()));

        for partner in &partners {
            let label = format!("Add partner '{}'", partner);
            self.act(&label, |d| {
                d.paste_text(NEW_PARTNER_FIELD, partner, Offsets::none())
                    .or_else(|e| {
                        debug!(error = %e, "new partner field not found, trying alternate");
                        d.paste_text(NEW_PARTNER_FIELD_ALT, partner, Offsets::none())
                    })
            })?;
            self.settle();

            self.act("Leave the field (Shift+Tab+Tab)", |d| {
                d.hotkey(&[Key::Shift, Key::Tab, Key::Tab])
            })?;
            self.settle();
            self.act("Mark as partner ('Y')", |d| d.press(Key::char('y')))?;
            self.settle();
        }

        self.executor.ui().success("Partners filled.");
        Ok(())
    }
}
