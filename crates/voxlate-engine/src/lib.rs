pub mod engine_trait;
pub mod recognizer;
pub mod registry;
pub mod scripted_engine;
pub mod stdin_engine;

pub use engine_trait::RecognitionEngine;
pub use recognizer::{create_recognizer, Recognizer, RecognizerCallbacks};
pub use registry::EngineRegistry;
pub use scripted_engine::{ScriptStep, ScriptedEngine};
pub use stdin_engine::StdinEngine;
