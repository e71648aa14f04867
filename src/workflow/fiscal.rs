//! Addresses tab: fiscal ids and the registry lookup.

use tracing::{debug, info, warn};

use crate::anchors::Offsets;
use crate::document::{Document, DocumentKind};
use crate::runner::Flow;
use crate::session::EXEMPT_REGISTRATION;

use super::Automation;

/// Rounds of CNPJ-then-CPF copy attempts before giving up on the document.
pub const DOCUMENT_ATTEMPTS: u32 = 3;

const DOCUMENT_FIELDS: [(&str, &str); 2] = [
    ("endereco_idfiscais_cnpj", "CNPJ"),
    ("endereco_idfiscais_cpf", "CPF"),
];

impl Automation<'_> {
    /// Read the partner's document, store the person type and type the
    /// state registration into the fiscal ids dialog.
    pub fn fiscal_ids(&mut self) -> Flow {
        self.stage("Addresses: fiscal ids");
        self.go_to_tab("enderecos")?;
        self.click_step("Open fiscal ids", "enderecos_idfiscais")?;

        let document = self.read_document()?;
        let person_type = document.kind.person_type();
        let store = &self.session;
        self.executor
            .execute(Some("Store person type"), || {
                store.update(|data| data.person_type = person_type)
            })
            .into_result()?;

        let mut registration = EXEMPT_REGISTRATION.to_string();
        match document.kind {
            DocumentKind::Cnpj => {
                let label = format!("Look up company {}", document.digits);
                let registry = &mut self.services.registry;
                let store = &self.session;
                let record = self
                    .executor
                    .execute(Some(&label), || {
                        let record = registry.lookup(&document.digits)?;
                        store.update(|data| record.apply_to(data))?;
                        Ok(record)
                    })
                    .into_result()?;

                if let Some(record) = record {
                    info!(
                        company = %record.company_name,
                        status = %record.status,
                        partners = record.partners.len(),
                        "company data stored in session"
                    );
                    registration = record.state_registration;
                }
            }
            DocumentKind::Cpf => debug!("individual, state registration stays exempt"),
            DocumentKind::Undetermined => {
                self.executor.ui().message(&format!(
                    "Document not recognized. State registration set to '{}'.",
                    EXEMPT_REGISTRATION
                ));
            }
        }

        self.executor
            .ui()
            .message(&format!("State registration: {}", registration));
        let label = format!("Type state registration '{}'", registration);
        self.act(&label, |d| {
            d.type_text("endereco_idfiscais_ie", &registration, Offsets::none())
        })?;
        self.settle();

        self.click_step("Click 'Update'", "endereco_idfiscais_atualizar")?;
        self.click_step("Click 'OK'", "endereco_idfiscais_ok")?;
        Ok(())
    }

    /// Copy the CNPJ field, falling back to the CPF field, for a few rounds.
    ///
    /// Each copy is its own assisted step, so a skipped copy moves on to
    /// the next field. Nothing found after every round yields an
    /// undetermined document and a warning.
    fn read_document(&mut self) -> Flow<Document> {
        for round in 1..=DOCUMENT_ATTEMPTS {
            for (key, name) in DOCUMENT_FIELDS {
                let label = format!("[Round {}] Copy {}", round, name);
                let copied = self.act(&label, |d| d.copy_text(key, Offsets::none()))?;

                if let Some(text) = copied.filter(|t| !t.is_empty()) {
                    let document = Document::parse(&text);
                    self.executor
                        .ui()
                        .message(&format!("Document read from screen: {}", text));
                    debug!(kind = %document.kind, round, "document copied");
                    return Ok(document);
                }
            }

            self.executor
                .ui()
                .message(&format!("No document found in round {}.", round));
            if round < DOCUMENT_ATTEMPTS {
                self.desktop.wait(self.desktop.timing().tab);
            }
        }

        warn!(rounds = DOCUMENT_ATTEMPTS, "no document found on screen");
        self.executor.ui().warning(&format!(
            "Could not read a CNPJ or CPF after {} rounds. Continuing without a document.",
            DOCUMENT_ATTEMPTS
        ));
        Ok(Document::undetermined())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::testing::*;
    use super::super::Automation;
    use super::*;
    use crate::desktop::{FixedLocator, InputEvent, Key};
    use crate::runner::{AssistedExecutor, RetryPolicy, FAILURE_PROMPT_KEY};
    use crate::session::PersonType;
    use crate::ui::MockUI;

    fn fiscal_anchors() -> FixedLocator {
        FixedLocator::new().with_all(&[
            "aba_enderecos",
            "enderecos_idfiscais",
            "endereco_idfiscais_cnpj",
            "endereco_idfiscais_cpf",
            "endereco_idfiscais_ie",
            "endereco_idfiscais_atualizar",
            "endereco_idfiscais_ok",
        ])
    }

    #[test]
    fn company_document_triggers_lookup() {
        let temp = TempDir::new().unwrap();
        let store = session(&temp);
        let (desktop, input, _) = desktop(fiscal_anchors());
        input.on_copy("12.345.678/0001-95");
        let (services, calls) = services(Some(company()), Vec::new());

        let mut ui = MockUI::new();
        {
            let executor = AssistedExecutor::new(&mut ui, RetryPolicy::immediate());
            let mut automation = Automation::new(executor, desktop, store.clone(), services);
            assert_eq!(automation.fiscal_ids(), Ok(()));
        }

        assert_eq!(*calls.lookups.borrow(), vec!["12345678000195".to_string()]);
        let data = store.read().unwrap();
        assert_eq!(data.person_type, PersonType::Company);
        assert_eq!(data.company_name, "ACME PET LTDA");
        assert_eq!(data.partners.len(), 2);
        assert_eq!(input.typed(), vec!["123456789".to_string()]);
    }

    #[test]
    fn individual_falls_back_to_cpf_field() {
        let temp = TempDir::new().unwrap();
        let store = session(&temp);
        let (desktop, input, _) = desktop(fiscal_anchors());
        // The CNPJ copy comes back empty, the CPF copy has the number.
        input.on_copy("");
        input.on_copy("123.456.789-09");
        let (services, calls) = services(Some(company()), Vec::new());

        let mut ui = MockUI::new();
        {
            let executor = AssistedExecutor::new(&mut ui, RetryPolicy::immediate());
            let mut automation = Automation::new(executor, desktop, store.clone(), services);
            assert_eq!(automation.fiscal_ids(), Ok(()));
        }

        assert!(calls.lookups.borrow().is_empty());
        assert_eq!(store.read().unwrap().person_type, PersonType::Individual);
        assert_eq!(input.typed(), vec![EXEMPT_REGISTRATION.to_string()]);
    }

    #[test]
    fn missing_document_continues_as_undetermined() {
        let temp = TempDir::new().unwrap();
        let store = session(&temp);
        let (desktop, input, _) = desktop(fiscal_anchors());
        let (services, _) = services(None, Vec::new());

        let mut ui = MockUI::new();
        {
            let executor = AssistedExecutor::new(&mut ui, RetryPolicy::immediate());
            let mut automation = Automation::new(executor, desktop, store.clone(), services);
            assert_eq!(automation.fiscal_ids(), Ok(()));
        }

        let copies = input
            .events()
            .iter()
            .filter(|e| **e == InputEvent::Hotkey(vec![Key::Ctrl, Key::char('c')]))
            .count();
        assert_eq!(copies, 2 * DOCUMENT_ATTEMPTS as usize);
        assert!(ui.warnings().iter().any(|w| w.contains("CNPJ or CPF")));
        assert_eq!(store.read().unwrap().person_type, PersonType::Unknown);
        assert_eq!(input.typed(), vec![EXEMPT_REGISTRATION.to_string()]);
    }

    #[test]
    fn skipped_lookup_keeps_registration_exempt() {
        let temp = TempDir::new().unwrap();
        let store = session(&temp);
        let (desktop, input, _) = desktop(fiscal_anchors());
        input.on_copy("12345678000195");
        let (services, calls) = services(None, Vec::new());

        let mut ui = MockUI::new();
        ui.set_prompt_response(FAILURE_PROMPT_KEY, "2");
        {
            let executor = AssistedExecutor::new(&mut ui, RetryPolicy::immediate());
            let mut automation = Automation::new(executor, desktop, store.clone(), services);
            assert_eq!(automation.fiscal_ids(), Ok(()));
        }

        assert_eq!(calls.lookups.borrow().len(), 3);
        assert_eq!(input.typed(), vec![EXEMPT_REGISTRATION.to_string()]);
        assert_eq!(store.read().unwrap().person_type, PersonType::Company);
    }
}
