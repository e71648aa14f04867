//! Configuration loading for b1assist.
//!
//! - Schema definitions in [`schema`]
//! - Discovery, `.env` overlay and validation in [`loader`]
//!
//! # Example
//!
//! ```
//! use b1assist::config::Settings;
//! use std::collections::HashMap;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("b1assist.yml"), "image_confidence: 0.85").unwrap();
//!
//! let settings = Settings::load_with_env(temp.path(), None, &HashMap::new()).unwrap();
//! assert_eq!(settings.config.image_confidence, 0.85);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{
    apply_env, load_config, load_config_file, load_env, load_env_file_optional, parse_config,
    process_env, validate, Secrets, Settings, CONFIG_FILE, ENV_FILE, ENV_GEOCODE_KEY,
    ENV_IMAGE_CONFIDENCE, ENV_REGISTRY_KEY, ENV_REGISTRY_PROVIDER, ENV_REGISTRY_URL,
};
pub use schema::{AssistConfig, PathsConfig, RetryConfig, ServicesConfig, TimingConfig};
