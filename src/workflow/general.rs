//! General tab, in two passes.

use chrono::NaiveDate;
use tracing::debug;

use crate::anchors::Offsets;
use crate::runner::Flow;
use crate::session::{PersonType, SessionData};

use super::Automation;

/// Fixed values of the first pass: anchor, value, offset override and label.
const PART1_FIELDS: [(&str, &str, Offsets, &str); 5] = [
    ("geral1_tipopn", "Cliente", Offsets { x: None, y: None }, "Set partner type to 'Cliente'"),
    ("geral1_moeda", "Real", Offsets { x: Some(150), y: None }, "Set currency to 'Real'"),
    ("geral1_tipoenvio", "sem", Offsets { x: Some(150), y: None }, "Set shipping type to 'Sem frete'"),
    ("geral1_usoprincipal", "s-venda", Offsets { x: Some(120), y: None }, "Set main usage to 'S-Venda'"),
    ("geral1_enviarrevisao", "N", Offsets { x: Some(120), y: None }, "Set 'Send for review' to 'No'"),
];

/// Dropdown values for the state registration indicator and the final
/// consumer flag.
pub fn registration_indicators(data: &SessionData) -> (&'static str, &'static str) {
    if data.is_exempt() {
        ("9", "1")
    } else {
        ("1", "0")
    }
}

/// `YYYY-MM-DD` to `DD/MM/YYYY`.
pub fn founding_date_for_erp(founded: &str) -> Option<String> {
    NaiveDate::parse_from_str(founded.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%d/%m/%Y").to_string())
}

impl Automation<'_> {
    /// Partner type, currency, shipping, start date, usage and review flag.
    pub fn general_part1(&mut self) -> Flow {
        self.stage("General tab (part 1)");
        self.go_to_tab("geral")?;

        let (first, rest) = PART1_FIELDS.split_at(3);
        for &(key, value, offsets, label) in first {
            self.act(label, |d| d.select_dropdown(key, value, offsets))?;
            self.settle();
        }

        // `H` makes the ERP fill in today's date.
        let today = chrono::Local::now().format("%d/%m/%Y");
        let label = format!("Set start date to today ({})", today);
        self.act(&label, |d| d.type_text("geral1_datainicio", "H", Offsets::x(150)))?;
        self.settle();

        for &(key, value, offsets, label) in rest {
            self.act(label, |d| d.select_dropdown(key, value, offsets))?;
            self.settle();
        }
        Ok(())
    }

    /// Founding date, person type and the state registration rule, all
    /// taken from the session.
    pub fn general_part2(&mut self) -> Flow {
        self.stage("General tab (part 2)");
        self.go_to_tab("geral")?;

        let store = &self.session;
        let data = match self
            .executor
            .execute(Some("Read session data"), || store.read())
            .into_result()?
        {
            Some(data) => data,
            None => SessionData::template(),
        };

        if data.founded.trim().is_empty() {
            self.executor
                .ui()
                .warning("Founding date not in session. Skipping.");
        } else if let Some(date) = founding_date_for_erp(&data.founded) {
            let label = format!("Fill founding date ({})", date);
            self.act(&label, |d| d.paste_text("geral2_data_abertura", &date, Offsets::none()))?;
            self.settle();
        } else {
            self.executor.ui().warning(&format!(
                "Founding date '{}' is not in YYYY-MM-DD format. Skipping.",
                data.founded
            ));
        }

        if data.person_type == PersonType::Unknown {
            self.executor
                .ui()
                .warning("Person type not in session. Skipping.");
        } else {
            let code = data.person_type.code().to_string();
            let label = format!("Select person type ({})", code);
            self.act(&label, |d| d.select_dropdown("geral2_tipo_pessoa", &code, Offsets::none()))?;
            self.settle();
        }

        let (indicator, final_consumer) = registration_indicators(&data);
        debug!(indicator, final_consumer, exempt = data.is_exempt(), "registration rule");

        let label = format!("Select state registration indicator ({})", indicator);
        self.act(&label, |d| d.select_dropdown("geral2_indicador_ie", indicator, Offsets::none()))?;
        self.settle();

        let label = format!("Select final consumer indicator ({})", final_consumer);
        self.act(&label, |d| {
            d.select_dropdown("geral2_op_consumidor", final_consumer, Offsets::none())
        })?;
        self.settle();
        Ok(())
    }
}
