//! Payment terms and payment execution tabs.

use crate::desktop::ScrollDirection;
use crate::runner::Flow;
use crate::sellers::Division;

use super::Automation;

/// Wheel notches from the top of the payment methods list to "Misto".
const METHODS_SCROLL: u32 = 11;

impl Automation<'_> {
    /// Toggle partial delivery.
    pub fn payment_terms(&mut self) -> Flow {
        self.stage("Payment terms tab");
        self.go_to_tab("condicoespgto")?;
        self.click_step("Toggle 'Allow partial delivery'", "condicoespgto_entregparcial")
    }

    /// Tick the payment methods allowed for `division`.
    ///
    /// Pet7 partners never get the credit method.
    pub fn payment_execution(&mut self, division: Division) -> Flow {
        self.stage("Payment execution tab");
        self.go_to_tab("exepgto")?;

        self.click_step("Open payment methods", "exepgto_abrirformas")?;
        self.click_step("Select 'Bonificação'", "exepgto_bonif")?;
        if division != Division::Pet7 {
            self.click_step("Select 'Crédito'", "exepgto_cred")?;
        }
        self.click_step("Select 'Depósito'", "exepgto_deposito")?;

        let label = format!("Scroll {} lines down the methods list", METHODS_SCROLL);
        self.act(&label, |d| d.scroll(METHODS_SCROLL, ScrollDirection::Down))?;
        self.settle();

        self.click_step("Select 'Misto'", "exepgto_misto")?;
        self.click_step("Close payment methods", "exepgto_fecharformas")
    }
}
