//! Brazilian taxpayer document handling.

use std::fmt;

use crate::session::PersonType;

/// Number of digits in a CNPJ (company registry id).
pub const CNPJ_LEN: usize = 14;

/// Number of digits in a CPF (individual taxpayer id).
pub const CPF_LEN: usize = 11;

/// Strip everything except ASCII digits.
///
/// `"12.345.678/0001-99"` becomes `"12345678000199"`.
pub fn clean_document(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Kind of document, decided by digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// 14 digits.
    Cnpj,
    /// 11 digits.
    Cpf,
    /// Anything else.
    Undetermined,
}

impl DocumentKind {
    /// Classify an already cleaned document.
    pub fn classify(digits: &str) -> Self {
        match digits.len() {
            CNPJ_LEN => Self::Cnpj,
            CPF_LEN => Self::Cpf,
            _ => Self::Undetermined,
        }
    }

    /// Person type recorded in the session for this document.
    pub fn person_type(self) -> PersonType {
        match self {
            Self::Cnpj => PersonType::Company,
            Self::Cpf => PersonType::Individual,
            Self::Undetermined => PersonType::Unknown,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cnpj => "CNPJ",
            Self::Cpf => "CPF",
            Self::Undetermined => "undetermined",
        };
        f.write_str(label)
    }
}

/// A cleaned document with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Digits only.
    pub digits: String,
    /// Classification by length.
    pub kind: DocumentKind,
}

impl Document {
    /// Clean and classify raw text.
    pub fn parse(raw: &str) -> Self {
        let digits = clean_document(raw);
        let kind = DocumentKind::classify(&digits);
        Self { digits, kind }
    }

    /// A document that could not be read at all.
    pub fn undetermined() -> Self {
        Self {
            digits: String::new(),
            kind: DocumentKind::Undetermined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cnpj_is_cleaned_and_classified() {
        let doc = Document::parse("12.345.678/0001-99");
        assert_eq!(doc.digits, "12345678000199");
        assert_eq!(doc.kind, DocumentKind::Cnpj);
        assert_eq!(doc.kind.person_type(), PersonType::Company);
    }

    #[test]
    fn cpf_is_cleaned_and_classified() {
        let doc = Document::parse("123.456.789-00");
        assert_eq!(doc.digits, "12345678900");
        assert_eq!(doc.kind, DocumentKind::Cpf);
        assert_eq!(doc.kind.person_type(), PersonType::Individual);
    }

    #[test]
    fn other_lengths_are_undetermined() {
        assert_eq!(Document::parse("123-45").kind, DocumentKind::Undetermined);
        assert_eq!(Document::parse("").kind, DocumentKind::Undetermined);
        assert_eq!(
            Document::parse("12.345.678/0001-991").kind,
            DocumentKind::Undetermined
        );
        assert_eq!(
            DocumentKind::Undetermined.person_type(),
            PersonType::Unknown
        );
    }

    #[test]
    fn clean_ignores_non_ascii_digits() {
        assert_eq!(clean_document(" CNPJ: ١٢ 34 "), "34");
    }
}
