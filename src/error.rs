//! Error types for b1assist operations.
//!
//! This module defines [`AssistError`], the error type shared by every
//! component, and a [`Result`] alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `AssistError` for failures that a step or command reports to the user
//! - Use `anyhow::Error` (via `AssistError::Other`) for unexpected I/O context
//! - A user abort is not an error; see [`crate::runner::Aborted`]

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for b1assist operations.
#[derive(Debug, Error)]
pub enum AssistError {
    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid or missing configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The anchor manifest file does not exist.
    #[error("Anchor manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// The anchor manifest exists but is not valid JSON.
    #[error("Failed to parse anchor manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// The requested anchor key has no manifest entry.
    #[error("Anchor '{key}' is not defined in the manifest")]
    AnchorNotDefined { key: String },

    /// The manifest entry carries no image path.
    #[error("Anchor '{key}' has no image path in the manifest")]
    AnchorPathMissing { key: String },

    /// The manifest entry points at an image that is not on disk.
    #[error("Image for anchor '{key}' not found: {path}")]
    AnchorImageMissing { key: String, path: PathBuf },

    /// The template was not found on screen at the required confidence.
    #[error("Anchor '{key}' not visible on screen (confidence {confidence:.2})")]
    AnchorNotVisible { key: String, confidence: f32 },

    /// Screen capture failed.
    #[error("Screen capture failed: {message}")]
    ScreenCapture { message: String },

    /// Native input backend failure.
    #[error("Input simulation failed: {message}")]
    InputFailed { message: String },

    /// A key name or character cannot be produced by the input backend.
    #[error("Unsupported key: {key}")]
    UnsupportedKey { key: String },

    /// The binary was built without native desktop support.
    #[error("Desktop backend unavailable: {message}")]
    DesktopUnavailable { message: String },

    /// Clipboard held no text when text was expected.
    #[error("Clipboard is empty")]
    ClipboardEmpty,

    /// Clipboard backend failure.
    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    /// Tabular data could not be parsed or written.
    #[error("Malformed table: {message}")]
    Table { message: String },

    /// A table had a header row but no data.
    #[error("Table has no data rows")]
    TableEmpty,

    /// A required column is absent.
    #[error("Column '{column}' not found in table")]
    MissingColumn { column: String },

    /// The address grid failed validation.
    #[error("Invalid address data: {problems}")]
    AddressValidation { problems: String },

    /// No CNPJ or CPF could be read from the screen.
    #[error("No document number could be read from the screen")]
    DocumentNotFound,

    /// Generic invalid input to an action.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Registry lookup returned 404 on every cache tier.
    #[error("Tax id {tax_id} not found in the registry")]
    RegistryNotFound { tax_id: String },

    /// Registry responded 429.
    #[error("Registry rate limit reached or credits exhausted")]
    RegistryRateLimited,

    /// Registry responded 401.
    #[error("Registry rejected the API key")]
    RegistryUnauthorized,

    /// Registry responded with any other status.
    #[error("Unexpected registry response (status {status}): {body}")]
    RegistryUnexpected { status: u16, body: String },

    /// Request timed out.
    #[error("{service} did not respond within {seconds}s")]
    ServiceTimeout { service: String, seconds: u64 },

    /// Request could not reach the service.
    #[error("Could not connect to {service}: {message}")]
    ServiceConnection { service: String, message: String },

    /// Response body did not have the expected shape.
    #[error("Invalid response from {service}: {message}")]
    ServiceResponse { service: String, message: String },

    /// Geocoding returned no results for the address.
    #[error("No coordinates found for address: {address}")]
    GeocodeZeroResults { address: String },

    /// Geocoding returned a non-OK status.
    #[error("Geocoding failed with status {status}: {message}")]
    Geocode { status: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for b1assist operations.
pub type Result<T> = std::result::Result<T, AssistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = AssistError::ConfigNotFound {
            path: PathBuf::from("/foo/b1assist.yml"),
        };
        assert!(err.to_string().contains("/foo/b1assist.yml"));
    }

    #[test]
    fn anchor_errors_are_distinct() {
        let missing = AssistError::AnchorNotDefined { key: "aba_socio".into() };
        let image = AssistError::AnchorImageMissing {
            key: "aba_socio".into(),
            path: PathBuf::from("imagens/aba_socio.png"),
        };
        let visible = AssistError::AnchorNotVisible {
            key: "aba_socio".into(),
            confidence: 0.9,
        };

        assert!(missing.to_string().contains("not defined"));
        assert!(image.to_string().contains("imagens/aba_socio.png"));
        assert!(visible.to_string().contains("0.90"));
    }

    #[test]
    fn registry_unexpected_displays_status_and_body() {
        let err = AssistError::RegistryUnexpected {
            status: 500,
            body: "internal".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("internal"));
    }

    #[test]
    fn service_timeout_names_service() {
        let err = AssistError::ServiceTimeout {
            service: "registry".into(),
            seconds: 15,
        };
        assert_eq!(err.to_string(), "registry did not respond within 15s");
    }

    #[test]
    fn missing_column_displays_column() {
        let err = AssistError::MissingColumn {
            column: "Rua".into(),
        };
        assert!(err.to_string().contains("'Rua'"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AssistError = io_err.into();
        assert!(matches!(err, AssistError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(AssistError::ClipboardEmpty)
        }
        assert!(returns_error().is_err());
    }
}
