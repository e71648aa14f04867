//! The business partner registration run.
//!
//! [`Automation`] owns everything a run touches: the assisted executor,
//! the desktop actions, the session store and the external services. Each
//! stage lives in its own submodule as an `impl Automation` block and
//! returns a [`Flow`], so an operator abort anywhere unwinds through `?`
//! to [`Automation::run_all`].
//!
//! Every screen interaction goes through the executor. Stages never touch
//! the input backends directly.

mod billing;
mod characteristics;
mod checks;
mod fiscal;
mod general;
mod partners;
mod payments;

use std::path::PathBuf;

use crate::anchors::Offsets;
use crate::desktop::DesktopActions;
use crate::error::Result;
use crate::runner::{AssistedExecutor, Flow};
use crate::sellers::SellerRoster;
use crate::services::{CompanyLookup, Geocoder};
use crate::session::SessionStore;
use crate::ui::RunSummary;

pub use checks::GEOCODE_CHECK_ADDRESS;
pub use fiscal::DOCUMENT_ATTEMPTS;

/// External services used during a run.
pub struct Services {
    pub registry: Box<dyn CompanyLookup>,
    pub geocoder: Box<dyn Geocoder>,
}

/// Where the anchor manifest and its template images live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorPaths {
    pub project_root: PathBuf,
    pub manifest: PathBuf,
    pub images: PathBuf,
}

/// Context of one automation run.
pub struct Automation<'a> {
    executor: AssistedExecutor<'a>,
    desktop: DesktopActions,
    session: SessionStore,
    services: Services,
    sellers: SellerRoster,
    anchors: Option<AnchorPaths>,
}

impl<'a> Automation<'a> {
    pub fn new(
        executor: AssistedExecutor<'a>,
        desktop: DesktopActions,
        session: SessionStore,
        services: Services,
    ) -> Self {
        Self {
            executor,
            desktop,
            session,
            services,
            sellers: SellerRoster::default(),
            anchors: None,
        }
    }

    /// Use `sellers` to pick the sales division.
    pub fn with_sellers(mut self, sellers: SellerRoster) -> Self {
        self.sellers = sellers;
        self
    }

    /// Synchronize the anchor manifest during the readiness checks.
    pub fn with_anchor_paths(mut self, paths: AnchorPaths) -> Self {
        self.anchors = Some(paths);
        self
    }

    /// Run every stage in order.
    pub fn run_all(&mut self) -> Flow {
        self.readiness_checks()?;
        self.fiscal_ids()?;
        self.general_part1()?;
        self.general_part2()?;
        let division = self.characteristics()?;
        self.payment_terms()?;
        self.payment_execution(division)?;
        self.partners()?;
        self.billing_address()?;

        self.executor
            .ui()
            .success("Business partner registration finished.");
        Ok(())
    }

    /// Summary of every step executed so far.
    pub fn summary(&self) -> RunSummary {
        self.executor.summary()
    }

    /// Show the run summary through the UI.
    pub fn report(&mut self) {
        let summary = self.executor.summary();
        self.executor.ui().show_summary(&summary);
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Run a desktop action as an assisted step.
    fn act<T>(
        &mut self,
        label: &str,
        mut action: impl FnMut(&mut DesktopActions) -> Result<T>,
    ) -> Flow<Option<T>> {
        let desktop = &mut self.desktop;
        self.executor
            .execute(Some(label), || action(desktop))
            .into_result()
    }

    /// Click an anchor as an assisted step, then settle.
    fn click_step(&mut self, label: &str, key: &str) -> Flow {
        self.act(label, |d| d.click(key, Offsets::none()))?;
        self.settle();
        Ok(())
    }

    /// Switch to the ERP tab whose anchor is `aba_<name>`.
    fn go_to_tab(&mut self, name: &str) -> Flow {
        let key = format!("aba_{}", name);
        let label = format!("Go to the '{}' tab", name);
        self.act(&label, |d| d.click(&key, Offsets::none()))?;
        self.desktop.wait(self.desktop.timing().tab);
        Ok(())
    }

    fn settle(&self) {
        self.desktop.wait(self.desktop.timing().settle);
    }

    fn stage(&mut self, title: &str) {
        self.executor.ui().show_header(title);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for the stage tests.

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::Services;
    use crate::desktop::{ActionTiming, DesktopActions, FixedLocator, MemoryClipboard, MockInput};
    use crate::error::{AssistError, Result};
    use crate::services::{CompanyLookup, CompanyRecord, Coordinates, Geocoder};
    use crate::session::{Address, SessionStore};

    /// Every anchor the full run touches.
    pub const ALL_ANCHORS: &[&str] = &[
        "aba_enderecos",
        "aba_geral",
        "aba_caracteristicas",
        "aba_condicoespgto",
        "aba_exepgto",
        "aba_socio",
        "enderecos_idfiscais",
        "endereco_idfiscais_cnpj",
        "endereco_idfiscais_cpf",
        "endereco_idfiscais_ie",
        "endereco_idfiscais_atualizar",
        "endereco_idfiscais_ok",
        "geral1_tipopn",
        "geral1_moeda",
        "geral1_tipoenvio",
        "geral1_datainicio",
        "geral1_usoprincipal",
        "geral1_enviarrevisao",
        "geral2_data_abertura",
        "geral2_tipo_pessoa",
        "geral2_indicador_ie",
        "geral2_op_consumidor",
        "caracteristicas_logmodif",
        "caracteristicas_pet7",
        "caracteristicas_serilon",
        "condicoespgto_entregparcial",
        "exepgto_abrirformas",
        "exepgto_bonif",
        "exepgto_cred",
        "exepgto_deposito",
        "exepgto_misto",
        "exepgto_fecharformas",
        "pessoascontato_novosocio",
        "enderecos_tabela",
        "enderecos_idfaturamento",
    ];

    pub struct FakeRegistry {
        record: Option<CompanyRecord>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl CompanyLookup for FakeRegistry {
        fn lookup(&mut self, tax_id: &str) -> Result<CompanyRecord> {
            self.calls.borrow_mut().push(tax_id.to_string());
            self.record.clone().ok_or_else(|| AssistError::RegistryNotFound {
                tax_id: tax_id.to_string(),
            })
        }
    }

    pub struct FakeGeocoder {
        answers: VecDeque<Result<Coordinates>>,
        queries: Rc<RefCell<Vec<String>>>,
    }

    impl Geocoder for FakeGeocoder {
        fn geocode(&mut self, address: &str) -> Result<Coordinates> {
            self.queries.borrow_mut().push(address.to_string());
            self.answers.pop_front().unwrap_or(Ok(Coordinates {
                lat: -23.561414,
                lng: -46.655881,
            }))
        }
    }

    /// What the fake services were asked.
    #[derive(Default)]
    pub struct Calls {
        pub lookups: Rc<RefCell<Vec<String>>>,
        pub geocodes: Rc<RefCell<Vec<String>>>,
    }

    /// Fake services. Queued geocode answers are used first, then a fixed point.
    pub fn services(record: Option<CompanyRecord>, answers: Vec<Result<Coordinates>>) -> (Services, Calls) {
        let calls = Calls::default();
        let services = Services {
            registry: Box::new(FakeRegistry {
                record,
                calls: calls.lookups.clone(),
            }),
            geocoder: Box::new(FakeGeocoder {
                answers: answers.into(),
                queries: calls.geocodes.clone(),
            }),
        };
        (services, calls)
    }

    pub fn company() -> CompanyRecord {
        CompanyRecord {
            status: "Ativa".into(),
            company_name: "ACME PET LTDA".into(),
            founded: "2010-03-15".into(),
            state_registration: "123456789".into(),
            simples_optant: Some(true),
            suframa_valid: false,
            suframa_number: String::new(),
            partners: vec!["JOAO DA SILVA".into(), "MARIA SOUZA".into()],
            address: Address {
                street_type: "Avenida".into(),
                street: "Paulista".into(),
                number: "1578".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
                ..Address::default()
            },
        }
    }

    /// Desktop actions over in-memory doubles with no pauses.
    pub fn desktop(locator: FixedLocator) -> (DesktopActions, MockInput, MemoryClipboard) {
        let clipboard = MemoryClipboard::new();
        let input = MockInput::with_clipboard(clipboard.clone());
        let actions = DesktopActions::new(
            Box::new(locator),
            Box::new(input.clone()),
            Box::new(clipboard.clone()),
            ActionTiming::instant(),
        );
        (actions, input, clipboard)
    }

    pub fn session(temp: &TempDir) -> SessionStore {
        SessionStore::new(temp.path().join("temp").join("dados_sessao.json"))
    }
}
