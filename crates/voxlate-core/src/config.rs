use crate::error::ConfigError;
use crate::types::RecognizerConfig;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/translate";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub recognizer: RecognizerSection,

    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognizerSection {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default)]
    pub interim_results: bool,

    #[serde(default = "default_true")]
    pub continuous: bool,

    #[serde(default)]
    pub language: Option<String>,
}

impl Default for RecognizerSection {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            interim_results: false,
            continuous: default_true(),
            language: None,
        }
    }
}

impl RecognizerSection {
    pub fn to_recognizer_config(&self) -> RecognizerConfig {
        RecognizerConfig {
            interim_results: self.interim_results,
            continuous: self.continuous,
            language: self.language.clone().filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Applied by callers around each request; the client itself never times out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_engine() -> String {
    "stdin".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_true() -> bool {
    true
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid");
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val =
            std::env::var(var_name).map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}
