//! Seller roster and sales division selection.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::warn;

use crate::error::{AssistError, Result};

/// Sales division assigned to a business partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    /// Partners handled by the Pet7 sellers.
    Pet7,
    /// Everyone else.
    Serilon,
}

impl Division {
    /// Division code in the ERP.
    pub fn code(self) -> u8 {
        match self {
            Self::Pet7 => 4,
            Self::Serilon => 2,
        }
    }
}

/// Users whose partners belong to the Pet7 division.
#[derive(Debug, Clone, Default)]
pub struct SellerRoster {
    members: HashSet<String>,
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

impl SellerRoster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            members: names
                .into_iter()
                .map(|n| normalize(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Load a JSON array of names. A missing file is an empty roster.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "seller roster not found, every user maps to Serilon");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read seller roster {}", path.display()))?;
        let names: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| AssistError::ConfigParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(Self::new(names.iter().map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })))
    }

    pub fn contains(&self, user: &str) -> bool {
        self.members.contains(&normalize(user))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Division for the user who last touched the record.
    pub fn division_for(&self, user: &str) -> Division {
        if !user.trim().is_empty() && self.contains(user) {
            Division::Pet7
        } else {
            Division::Serilon
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn membership_ignores_case_and_whitespace() {
        let roster = SellerRoster::new(["jonathan.freitas", "  MARIA.SOUZA "]);

        assert!(roster.contains("JONATHAN.FREITAS"));
        assert!(roster.contains(" maria.souza"));
        assert!(!roster.contains("usuario.comum"));
    }

    #[test]
    fn division_codes() {
        let roster = SellerRoster::new(["JONATHAN.FREITAS"]);

        assert_eq!(roster.division_for("jonathan.freitas"), Division::Pet7);
        assert_eq!(roster.division_for("USUARIO.COMUM"), Division::Serilon);
        assert_eq!(roster.division_for("   "), Division::Serilon);
        assert_eq!(Division::Pet7.code(), 4);
        assert_eq!(Division::Serilon.code(), 2);
    }

    #[test]
    fn loads_json_array() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vendedores_pet7.json");
        fs::write(&path, r#"["JONATHAN.FREITAS", "ana.lima"]"#).unwrap();

        let roster = SellerRoster::load(&path).unwrap();

        assert_eq!(roster.len(), 2);
        assert!(roster.contains("ANA.LIMA"));
    }

    #[test]
    fn missing_file_is_empty_roster() {
        let temp = TempDir::new().unwrap();
        let roster = SellerRoster::load(&temp.path().join("nope.json")).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vendedores_pet7.json");
        fs::write(&path, "{not json").unwrap();

        let err = SellerRoster::load(&path).unwrap_err();
        assert!(matches!(err, AssistError::ConfigParseError { .. }));
    }
}
