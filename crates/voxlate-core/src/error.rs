use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Errors reported by a recognition engine when asked to start or stop a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine is in an invalid state: {0}")]
    InvalidState(String),

    #[error("engine failed to start: {0}")]
    StartFailed(String),

    #[error("engine failed to stop: {0}")]
    StopFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    #[error("speech recognition capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum TranslationError {
    /// The translation service answered with an `error` field.
    #[error("{0}")]
    Service(String),

    #[error("translation request failed: {0}")]
    Transport(String),

    #[error("failed to decode translation response: {0}")]
    Decode(String),
}
