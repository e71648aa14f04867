//! Billing address: geocode the address grid and paste it back.

use tracing::{info, warn};

use crate::anchors::Offsets;
use crate::desktop::Key;
use crate::error::Result;
use crate::runner::Flow;
use crate::tabular::{
    format_for_geocoding, set_coordinates, validate_address_table, Table, LATITUDE_COLUMN,
    LONGITUDE_COLUMN,
};

use super::Automation;

impl Automation<'_> {
    /// Copy the address grid, fill in its coordinates and paste it into
    /// the billing address.
    ///
    /// A geocoding failure the operator skips is not fatal: the grid is
    /// pasted back with blank coordinates.
    pub fn billing_address(&mut self) -> Flow {
        self.stage("Addresses: billing address");
        self.go_to_tab("enderecos")?;

        self.act("Open the address grid context menu", |d| {
            d.right_click("enderecos_tabela", Offsets::none())
        })?;
        self.settle();
        self.act("Press 'T' to copy the address grid", |d| d.press(Key::char('t')))?;
        self.settle();

        let grid = self.act("Read the address grid", |d| -> Result<Table> {
            let table = d.read_table()?;
            validate_address_table(&table)?;
            Ok(table)
        })?;
        let Some(mut grid) = grid else {
            self.executor
                .ui()
                .warning("Address grid skipped. Billing address left untouched.");
            return Ok(());
        };

        let address = format_for_geocoding(&grid, 0);
        let label = format!("Geocode '{}'", address);
        let geocoder = &mut self.services.geocoder;
        let coordinates = self
            .executor
            .execute(Some(&label), || geocoder.geocode(&address))
            .into_result()?;

        let updated = match coordinates {
            Some(point) => {
                info!(lat = point.lat, lng = point.lng, "coordinates found");
                set_coordinates(&mut grid, 0, point.lat, point.lng)
            }
            None => {
                warn!(address = %address, "no coordinates, leaving them blank");
                self.executor
                    .ui()
                    .warning("Could not get coordinates. They will be left blank.");
                grid.set(0, LATITUDE_COLUMN, "")
                    .and_then(|_| grid.set(0, LONGITUDE_COLUMN, ""))
            }
        };
        if let Err(e) = updated {
            warn!(error = %e, "could not write coordinates into the grid");
        }

        self.act("Put the updated grid on the clipboard", |d| {
            let text = grid.to_tsv()?;
            d.put_clipboard(&text)
        })?;
        self.desktop.wait(self.desktop.timing().clipboard);

        self.click_step("Click the billing address grid", "enderecos_idfaturamento")?;
        self.act("Paste the grid (Ctrl+V)", |d| d.hotkey(&[Key::Ctrl, Key::char('v')]))?;
        self.settle();
        self.act("Confirm (Enter)", |d| d.press(Key::Enter))?;
        self.settle();
        Ok(())
    }
}
