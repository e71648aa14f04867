//! Configuration discovery, environment overlay and validation.
//!
//! Settings are assembled in this order (later wins):
//! 1. Built-in defaults
//! 2. `b1assist.yml` in the project root, or the `--config` file
//! 3. `.env` in the project root
//! 4. Process environment variables

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::schema::AssistConfig;
use crate::error::{AssistError, Result};

/// Config file name looked up in the project root.
pub const CONFIG_FILE: &str = "b1assist.yml";

/// Dotenv file looked up in the project root.
pub const ENV_FILE: &str = ".env";

pub const ENV_IMAGE_CONFIDENCE: &str = "DEFAULT_IMAGE_CONFIDENCE";
pub const ENV_GEOCODE_KEY: &str = "GOOGLE_GEOCODE_API_KEY";
pub const ENV_REGISTRY_KEY: &str = "CNPJA_API_KEY_COMERCIAL";
pub const ENV_REGISTRY_URL: &str = "CNPJA_API_URL_COMERCIAL_IE_SIMPLES";
pub const ENV_REGISTRY_PROVIDER: &str = "API_CNPJ_SELECIONADA";

/// Registry providers this build can talk to.
pub const SUPPORTED_PROVIDERS: &[u32] = &[1];

/// Load and parse a config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<AssistConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssistError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            AssistError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content. Blank content yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<AssistConfig> {
    if content.trim().is_empty() {
        return Ok(AssistConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| AssistError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the project config, or the explicit override.
///
/// Without an override a missing `b1assist.yml` means defaults. An
/// explicit path must exist.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<AssistConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => {
            let path = project_root.join(CONFIG_FILE);
            if path.exists() {
                load_config_file(&path)
            } else {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(AssistConfig::default())
            }
        }
    }
}

/// Variables from the project `.env`, overlaid with the process environment.
pub fn load_env(project_root: &Path) -> Result<HashMap<String, String>> {
    let mut vars = load_env_file_optional(&project_root.join(ENV_FILE))?;
    vars.extend(process_env());
    Ok(vars)
}

/// Process environment variables whose name and value are valid UTF-8.
pub fn process_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}

/// Parse a dotenv file, returning an empty map if it doesn't exist.
pub fn load_env_file_optional(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let parse_err = |e: dotenvy::Error| AssistError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(parse_err)? {
        let (key, value) = item.map_err(parse_err)?;
        vars.insert(key, value);
    }
    debug!(path = %path.display(), count = vars.len(), "loaded env file");
    Ok(vars)
}

/// API keys, checked only by the commands that need them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub geocode_api_key: Option<String>,
    pub registry_api_key: Option<String>,
}

/// Everything a command needs to know about the project.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub config: AssistConfig,
    pub secrets: Secrets,
}

impl Settings {
    /// Load config and environment for `project_root`.
    pub fn load(project_root: &Path, config_override: Option<&Path>) -> Result<Self> {
        let env = load_env(project_root)?;
        Self::load_with_env(project_root, config_override, &env)
    }

    /// Like [`Settings::load`] with an explicit environment.
    pub fn load_with_env(
        project_root: &Path,
        config_override: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut config = load_config(project_root, config_override)?;
        let secrets = apply_env(&mut config, env)?;
        validate(&config)?;

        Ok(Self {
            project_root: project_root.to_path_buf(),
            config,
            secrets,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.project_root.join(path)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.config.paths.manifest)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.resolve(&self.config.paths.images)
    }

    pub fn session_path(&self) -> PathBuf {
        self.resolve(&self.config.paths.session)
    }

    pub fn sellers_path(&self) -> PathBuf {
        self.resolve(&self.config.paths.sellers)
    }

    /// The geocoding key, or a validation error naming the variable.
    pub fn require_geocode_key(&self) -> Result<&str> {
        require(&self.secrets.geocode_api_key, ENV_GEOCODE_KEY)
    }

    /// The registry key, or a validation error naming the variable.
    pub fn require_registry_key(&self) -> Result<&str> {
        require(&self.secrets.registry_api_key, ENV_REGISTRY_KEY)
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| AssistError::ConfigValidationError {
            message: format!("{} is not set (add it to .env or the environment)", name),
        })
}

fn non_blank<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Apply environment overrides and collect secrets.
///
/// Present but malformed values fail here. Missing secrets do not.
pub fn apply_env(config: &mut AssistConfig, env: &HashMap<String, String>) -> Result<Secrets> {
    if let Some(raw) = non_blank(env, ENV_IMAGE_CONFIDENCE) {
        config.image_confidence = raw.parse().map_err(|_| AssistError::ConfigValidationError {
            message: format!("{} must be a number, got '{}'", ENV_IMAGE_CONFIDENCE, raw),
        })?;
    }

    if let Some(url) = non_blank(env, ENV_REGISTRY_URL) {
        config.services.registry_url = url.to_string();
    }

    if let Some(raw) = non_blank(env, ENV_REGISTRY_PROVIDER) {
        let provider: u32 = raw.parse().map_err(|_| AssistError::ConfigValidationError {
            message: format!("{} must be an integer, got '{}'", ENV_REGISTRY_PROVIDER, raw),
        })?;
        if !SUPPORTED_PROVIDERS.contains(&provider) {
            return Err(AssistError::ConfigValidationError {
                message: format!(
                    "{} ({}) is not supported. Supported providers: {:?}",
                    ENV_REGISTRY_PROVIDER, provider, SUPPORTED_PROVIDERS
                ),
            });
        }
    }

    Ok(Secrets {
        geocode_api_key: non_blank(env, ENV_GEOCODE_KEY).map(str::to_string),
        registry_api_key: non_blank(env, ENV_REGISTRY_KEY).map(str::to_string),
    })
}

/// Check value ranges. All problems are reported together.
pub fn validate(config: &AssistConfig) -> Result<()> {
    let mut problems = Vec::new();

    if !(config.image_confidence > 0.0 && config.image_confidence <= 1.0) {
        problems.push(format!(
            "image_confidence must be in (0, 1], got {}",
            config.image_confidence
        ));
    }
    if config.retry.attempts == 0 {
        problems.push("retry.attempts must be at least 1".to_string());
    }
    if config.services.registry_url.trim().is_empty() {
        problems.push("services.registry_url must not be empty".to_string());
    }
    if config.services.geocode_url.trim().is_empty() {
        problems.push("services.geocode_url must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AssistError::ConfigValidationError {
            message: problems.join("; "),
        })
    }
}
