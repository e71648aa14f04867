//! Configuration schema for `b1assist.yml`.
//!
//! Every field has a default, so an absent file and an empty file both
//! produce [`AssistConfig::default`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::desktop::ActionTiming;
use crate::runner::RetryPolicy;

/// Root of `b1assist.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Template match threshold used when a call does not override it.
    pub image_confidence: f32,

    /// Project-relative file locations.
    pub paths: PathsConfig,

    /// Automatic retry policy of the execution engine.
    pub retry: RetryConfig,

    /// Pauses between UI interactions.
    pub timing: TimingConfig,

    /// External service endpoints and timeouts.
    pub services: ServicesConfig,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            image_confidence: 0.9,
            paths: PathsConfig::default(),
            retry: RetryConfig::default(),
            timing: TimingConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Anchor manifest.
    pub manifest: PathBuf,
    /// Directory of anchor template images.
    pub images: PathBuf,
    /// Session state file.
    pub session: PathBuf,
    /// Pet7 seller roster.
    pub sellers: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("parametros.json"),
            images: PathBuf::from("imagens"),
            session: PathBuf::from("temp/dados_sessao.json"),
            sellers: PathBuf::from("vendedores_pet7.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 500,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub settle_ms: u64,
    pub dropdown_ms: u64,
    pub clipboard_ms: u64,
    pub tab_ms: u64,
    pub type_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            dropdown_ms: 800,
            clipboard_ms: 300,
            tab_ms: 1000,
            type_interval_ms: 50,
        }
    }
}

impl TimingConfig {
    pub fn action_timing(&self) -> ActionTiming {
        ActionTiming {
            settle: Duration::from_millis(self.settle_ms),
            dropdown: Duration::from_millis(self.dropdown_ms),
            clipboard: Duration::from_millis(self.clipboard_ms),
            tab: Duration::from_millis(self.tab_ms),
            type_interval: Duration::from_millis(self.type_interval_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Registry endpoint. The tax id digits are appended to it.
    pub registry_url: String,
    pub geocode_url: String,
    pub registry_timeout_secs: u64,
    pub geocode_timeout_secs: u64,
    /// Pause before falling through to the next registry cache tier.
    pub tier_pause_ms: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            registry_url: "https://api.cnpja.com/office/".to_string(),
            geocode_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            registry_timeout_secs: 15,
            geocode_timeout_secs: 10,
            tier_pause_ms: 5000,
        }
    }
}

impl ServicesConfig {
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_secs)
    }

    pub fn tier_pause(&self) -> Duration {
        Duration::from_millis(self.tier_pause_ms)
    }
}
