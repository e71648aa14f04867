//! Typed view of the session document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State registration value used when a company has none for its state.
pub const EXEMPT_REGISTRATION: &str = "Isento";

/// Kind of taxpayer behind the document being registered.
///
/// Stored as `0`, `1` or `2` in the session file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PersonType {
    /// Not determined yet.
    #[default]
    Unknown,
    /// Individual (CPF).
    Individual,
    /// Company (CNPJ).
    Company,
}

impl PersonType {
    /// Code used on disk and typed into the ERP dropdown.
    pub fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Individual => 1,
            Self::Company => 2,
        }
    }
}

impl From<PersonType> for u8 {
    fn from(value: PersonType) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for PersonType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Individual),
            2 => Ok(Self::Company),
            other => Err(format!("invalid person type code: {}", other)),
        }
    }
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Address block of the session document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(rename = "tipo_logradouro")]
    pub street_type: String,
    #[serde(rename = "logradouro")]
    pub street: String,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "bairro")]
    pub district: String,
    #[serde(rename = "cep")]
    pub zip: String,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
}

/// Data shared between steps of one run.
///
/// Known keys are typed. Anything else written by a step is kept in
/// `extra` and survives read-modify-write cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "tipo_pessoa", default)]
    pub person_type: PersonType,
    #[serde(rename = "status_cnpj", default)]
    pub registry_status: String,
    #[serde(rename = "razao_social", default)]
    pub company_name: String,
    /// Founding date as `YYYY-MM-DD`, blank when unknown.
    #[serde(rename = "data_abertura", default)]
    pub founded: String,
    #[serde(rename = "inscricao_estadual", default = "exempt")]
    pub state_registration: String,
    #[serde(rename = "simples_nacional", default)]
    pub simples_optant: Option<bool>,
    #[serde(rename = "socios", default)]
    pub partners: Vec<String>,
    #[serde(rename = "endereco", default)]
    pub address: Address,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn exempt() -> String {
    EXEMPT_REGISTRATION.to_string()
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            person_type: PersonType::Unknown,
            registry_status: String::new(),
            company_name: String::new(),
            founded: String::new(),
            state_registration: exempt(),
            simples_optant: None,
            partners: Vec::new(),
            address: Address::default(),
            extra: Map::new(),
        }
    }
}

impl SessionData {
    /// The empty template the store is reset to.
    pub fn template() -> Self {
        Self::default()
    }

    /// Check if the state registration is the exempt marker.
    pub fn is_exempt(&self) -> bool {
        self.state_registration.trim().eq_ignore_ascii_case(EXEMPT_REGISTRATION)
    }

    /// Serialize into a JSON object.
    pub fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
