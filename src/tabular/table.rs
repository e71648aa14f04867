//! Tab-separated grids exchanged with the ERP through the clipboard.

use crate::error::{AssistError, Result};

/// A header row plus data rows, every row as wide as the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn table_error(e: impl std::fmt::Display) -> AssistError {
    AssistError::Table {
        message: e.to_string(),
    }
}

impl Table {
    /// Build a table, padding or truncating rows to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Parse clipboard text copied from an ERP grid.
    ///
    /// Fails with [`AssistError::ClipboardEmpty`] for blank text and
    /// [`AssistError::TableEmpty`] when only a header row is present.
    pub fn parse_tsv(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(AssistError::ClipboardEmpty);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(table_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| AssistError::Table {
                message: format!("row {}: {}", idx + 1, e),
            })?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(AssistError::TableEmpty);
        }
        Ok(Self::new(headers, rows))
    }

    /// Serialize with tab separators, the header row and `\n` line endings.
    pub fn to_tsv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(&self.headers).map_err(table_error)?;
        for row in &self.rows {
            writer.write_record(row).map_err(table_error)?;
        }

        let bytes = writer.into_inner().map_err(table_error)?;
        String::from_utf8(bytes).map_err(table_error)
    }

    /// Header names in order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header name.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Cell value, if both row and column exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Set a cell, appending the column when it does not exist yet.
    pub fn set(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<()> {
        if row >= self.rows.len() {
            return Err(AssistError::Table {
                message: format!("row {} out of range ({} rows)", row, self.rows.len()),
            });
        }

        let idx = match self.column_index(column) {
            Some(idx) => idx,
            None => {
                self.headers.push(column.to_string());
                for r in &mut self.rows {
                    r.push(String::new());
                }
                self.headers.len() - 1
            }
        };
        self.rows[row][idx] = value.into();
        Ok(())
    }

    /// Value of `column` in the last row.
    pub fn last_value(&self, column: &str) -> Result<&str> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| AssistError::MissingColumn {
                column: column.to_string(),
            })?;
        self.rows
            .last()
            .and_then(|row| row.get(idx))
            .map(String::as_str)
            .ok_or(AssistError::TableEmpty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = "Código\tNome\tCidade\n1\tMatriz\tCampinas\n2\tFilial\tSantos\n";

    #[test]
    fn parses_header_and_rows() {
        let table = Table::parse_tsv(GRID).unwrap();

        assert_eq!(table.headers(), &["Código", "Nome", "Cidade"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "Cidade"), Some("Santos"));
        assert_eq!(table.get(0, "Missing"), None);
    }

    #[test]
    fn blank_text_is_empty_clipboard() {
        assert!(matches!(
            Table::parse_tsv("  \n"),
            Err(AssistError::ClipboardEmpty)
        ));
    }

    #[test]
    fn header_only_is_empty_table() {
        assert!(matches!(
            Table::parse_tsv("A\tB\n"),
            Err(AssistError::TableEmpty)
        ));
    }

    #[test]
    fn short_rows_are_padded() {
        let table = Table::parse_tsv("A\tB\tC\n1\t2\n").unwrap();
        assert_eq!(table.get(0, "C"), Some(""));
    }

    #[test]
    fn set_appends_unknown_column() {
        let mut table = Table::parse_tsv(GRID).unwrap();

        table.set(0, "Latitude", "-22,90556").unwrap();

        assert_eq!(table.headers().last().map(String::as_str), Some("Latitude"));
        assert_eq!(table.get(0, "Latitude"), Some("-22,90556"));
        assert_eq!(table.get(1, "Latitude"), Some(""));
        assert!(table.set(5, "Nome", "x").is_err());
    }

    #[test]
    fn serializes_with_tabs_and_newlines() {
        let table = Table::new(
            vec!["A".into(), "B".into()],
            vec![vec!["1".into(), "x y".into()]],
        );

        assert_eq!(table.to_tsv().unwrap(), "A\tB\n1\tx y\n");
    }

    #[test]
    fn last_value_reads_final_row() {
        let table = Table::parse_tsv(GRID).unwrap();

        assert_eq!(table.last_value("Nome").unwrap(), "Filial");
        assert!(matches!(
            table.last_value("Usuário"),
            Err(AssistError::MissingColumn { .. })
        ));
    }
}
