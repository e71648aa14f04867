//! Session state shared between the steps of one run.
//!
//! The session is a single JSON file, reset to an empty template at the
//! start and end of every run.

pub mod data;
pub mod store;

pub use data::{Address, PersonType, SessionData, EXEMPT_REGISTRATION};
pub use store::{SessionGuard, SessionStore};
