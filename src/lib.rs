//! b1assist - Assisted business partner registration for SAP Business One.
//!
//! b1assist drives the Business Partner Master Data screen of the SAP
//! Business One desktop client. It finds controls by matching template
//! images against screenshots, fills the fiscal, general, payment and
//! address tabs from the company registry and a geocoding service, and
//! asks the operator what to do whenever a step keeps failing.
//!
//! # Modules
//!
//! - [`anchors`] - Anchor manifest, template matching and screen lookup
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, `.env` overlay and validation
//! - [`desktop`] - Mouse, keyboard and clipboard actions
//! - [`document`] - CNPJ and CPF cleaning and classification
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Assisted step execution with retries and recovery prompts
//! - [`sellers`] - Pet7 seller roster and division choice
//! - [`services`] - Company registry and geocoding clients
//! - [`session`] - Session file shared between stages
//! - [`tabular`] - Tab-separated grids copied from the ERP
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`workflow`] - The registration stages
//!
//! # Example
//!
//! ```
//! use b1assist::document::{Document, DocumentKind};
//!
//! let doc = Document::parse("12.345.678/0001-99");
//! assert_eq!(doc.digits, "12345678000199");
//! assert_eq!(doc.kind, DocumentKind::Cnpj);
//! ```
//!
//! For driving a whole run against a scripted desktop, see the
//! integration tests.

pub mod anchors;
pub mod cli;
pub mod config;
pub mod desktop;
pub mod document;
pub mod error;
pub mod runner;
pub mod sellers;
pub mod services;
pub mod session;
pub mod tabular;
pub mod ui;
pub mod workflow;

pub use error::{AssistError, Result};
