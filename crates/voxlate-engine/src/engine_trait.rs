use async_trait::async_trait;
use tokio::sync::mpsc;
use voxlate_core::{EngineError, EngineEvent, RecognizerConfig};

/// A streaming speech-recognition engine.
///
/// Engines push [`EngineEvent`]s into the sender installed with
/// [`set_event_sender`](Self::set_event_sender). `start` and `stop` are
/// requests: the engine confirms them later with `Start` and `End` events.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Returns the engine's registry name (e.g. `"stdin"`).
    fn name(&self) -> &str;
    /// Whether the host can actually run this engine. Checked once, when a
    /// recognizer is created.
    fn is_available(&self) -> bool {
        true
    }
    /// Apply recognizer options. Called once before the first session.
    fn configure(&mut self, config: &RecognizerConfig);
    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<EngineEvent>);
    /// Begin a session. Must fail with [`EngineError::InvalidState`] while a
    /// session is already live.
    async fn start(&self) -> Result<(), EngineError>;
    /// Request the end of the current session. Does nothing while idle.
    async fn stop(&self) -> Result<(), EngineError>;
}
