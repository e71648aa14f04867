//! Change-log grid of a business partner.

use crate::error::Result;

use super::Table;

/// Column holding the user code of whoever last updated the record.
pub const UPDATED_BY_COLUMN: &str = "Atualizado por - Código do usuário";

/// User code from the most recent change-log entry, trimmed.
pub fn last_updated_by(table: &Table) -> Result<String> {
    Ok(table.last_value(UPDATED_BY_COLUMN)?.trim().to_string())
}
