pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DEFAULT_ENDPOINT};
pub use error::{ConfigError, EngineError, RecognizerError, TranslationError};
pub use types::{
    Alternative, EngineErrorDescriptor, EngineErrorKind, EngineEvent, RecognitionEvent,
    RecognizerConfig, ResultSlot, TranslationResult,
};
