//! Address grid validation and geocoding helpers.

use crate::error::{AssistError, Result};

use super::Table;

/// Columns that must be present and filled in the first address row.
pub const ESSENTIAL_COLUMNS: [&str; 10] = [
    "ID do endereço",
    "Tipo de logradouro",
    "Rua",
    "Rua nº",
    "CEP",
    "Bairro",
    "Cidade",
    "País/região",
    "Estado",
    "Município",
];

/// Column receiving the truncated latitude.
pub const LATITUDE_COLUMN: &str = "Latitude";

/// Column receiving the truncated longitude.
pub const LONGITUDE_COLUMN: &str = "Longitude";

/// Check the first row of an address grid.
///
/// Every problem is collected and reported together.
pub fn validate_address_table(table: &Table) -> Result<()> {
    if table.is_empty() {
        return Err(AssistError::TableEmpty);
    }

    let problems: Vec<String> = ESSENTIAL_COLUMNS
        .iter()
        .filter_map(|column| match table.get(0, column) {
            None => Some(format!("missing column '{}'", column)),
            Some(value) if value.trim().is_empty() => Some(format!("column '{}' is empty", column)),
            Some(_) => None,
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AssistError::AddressValidation {
            problems: problems.join("; "),
        })
    }
}

/// Build the geocoding query for one address row.
///
/// `"<type> <street>, <number>, <district>, <city> - <state>, <zip>, <country>"`,
/// leaving out blank parts.
pub fn format_for_geocoding(table: &Table, row: usize) -> String {
    let cell = |column: &str| table.get(row, column).map(str::trim).unwrap_or("");

    let street = join_non_empty(&[cell("Tipo de logradouro"), cell("Rua")], " ");
    let city = join_non_empty(&[cell("Cidade"), cell("Estado")], " - ");

    join_non_empty(
        &[
            &street,
            cell("Rua nº"),
            cell("Bairro"),
            &city,
            cell("CEP"),
            cell("País/região"),
        ],
        ", ",
    )
}

fn join_non_empty(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Truncate toward zero to five decimal places.
pub fn truncate_coordinate(value: f64) -> f64 {
    (value * 100_000.0).trunc() / 100_000.0
}

/// Render a truncated coordinate with a comma decimal separator.
pub fn format_coordinate(value: f64) -> String {
    format!("{:.5}", truncate_coordinate(value)).replace('.', ",")
}

/// Write both coordinates into a row.
pub fn set_coordinates(table: &mut Table, row: usize, latitude: f64, longitude: f64) -> Result<()> {
    table.set(row, LATITUDE_COLUMN, format_coordinate(latitude))?;
    table.set(row, LONGITUDE_COLUMN, format_coordinate(longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_grid() -> Table {
        let headers: Vec<String> = ESSENTIAL_COLUMNS.iter().map(|c| c.to_string()).collect();
        let row = vec![
            "Faturamento",
            "Avenida",
            "Paulista",
            "1578",
            "01310-200",
            "Bela Vista",
            "São Paulo",
            "Brasil",
            "SP",
            "São Paulo",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        Table::new(headers, vec![row])
    }

    #[test]
    fn complete_grid_is_valid() {
        assert!(validate_address_table(&address_grid()).is_ok());
    }

    #[test]
    fn problems_are_aggregated() {
        let mut table = address_grid();
        table.set(0, "Rua", "  ").unwrap();
        table.set(0, "CEP", "").unwrap();
        let table = Table::new(
            table.headers().iter().filter(|h| *h != "Bairro").cloned().collect(),
            vec![table
                .rows()[0]
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != 5)
                .map(|(_, v)| v.clone())
                .collect()],
        );

        let err = validate_address_table(&table).unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("column 'Rua' is empty; column 'CEP' is empty; missing column 'Bairro'"));
    }

    #[test]
    fn formats_geocoding_query() {
        assert_eq!(
            format_for_geocoding(&address_grid(), 0),
            "Avenida Paulista, 1578, Bela Vista, São Paulo - SP, 01310-200, Brasil"
        );
    }

    #[test]
    fn formatting_skips_blank_parts() {
        let mut table = address_grid();
        table.set(0, "Bairro", "").unwrap();
        table.set(0, "Tipo de logradouro", "").unwrap();

        assert_eq!(
            format_for_geocoding(&table, 0),
            "Paulista, 1578, São Paulo - SP, 01310-200, Brasil"
        );
    }

    #[test]
    fn coordinates_truncate_instead_of_rounding() {
        assert_eq!(truncate_coordinate(-23.5613999), -23.56139);
        assert_eq!(truncate_coordinate(-46.6565712), -46.65657);
        assert_eq!(format_coordinate(-23.5613999), "-23,56139");
        assert_eq!(format_coordinate(10.0), "10,00000");
    }

    #[test]
    fn set_coordinates_adds_columns() {
        let mut table = address_grid();

        set_coordinates(&mut table, 0, -23.5613999, -46.6565712).unwrap();

        assert_eq!(table.get(0, LATITUDE_COLUMN), Some("-23,56139"));
        assert_eq!(table.get(0, LONGITUDE_COLUMN), Some("-46,65657"));
    }
}
