use crate::engine_trait::RecognitionEngine;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use voxlate_core::{
    EngineError, EngineErrorDescriptor, EngineEvent, RecognitionEvent, RecognizerConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Batch(RecognitionEvent),
    Error(EngineErrorDescriptor),
}

/// Engine that replays a fixed script on every session.
///
/// `start` emits `Start` followed by each step in order. A non-continuous
/// engine then ends the session by itself; a continuous one waits for `stop`.
pub struct ScriptedEngine {
    script: Vec<ScriptStep>,
    continuous: bool,
    active: AtomicBool,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
    event_sender: Mutex<Option<mpsc::UnboundedSender<EngineEvent>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<ScriptStep>) -> Self {
        Self {
            script,
            continuous: true,
            active: AtomicBool::new(false),
            start_count: AtomicUsize::new(0),
            stop_count: AtomicUsize::new(0),
            event_sender: Mutex::new(None),
        }
    }

    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::Relaxed)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn emit(&self, event: EngineEvent) {
        if let Ok(sender) = self.event_sender.lock() {
            if let Some(tx) = sender.as_ref() {
                let _ = tx.send(event);
            }
        }
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn configure(&mut self, config: &RecognizerConfig) {
        self.continuous = config.continuous;
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<EngineEvent>) {
        if let Ok(mut guard) = self.event_sender.lock() {
            *guard = Some(sender);
        }
    }

    async fn start(&self) -> Result<(), EngineError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(EngineError::InvalidState(
                "recognition has already started".to_string(),
            ));
        }
        let session = self.start_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("ScriptedEngine session #{session}, {} steps", self.script.len());

        self.emit(EngineEvent::Start);
        for step in &self.script {
            match step {
                ScriptStep::Batch(batch) => self.emit(EngineEvent::Result(batch.clone())),
                ScriptStep::Error(err) => self.emit(EngineEvent::Error(err.clone())),
            }
        }

        if !self.continuous && self.active.swap(false, Ordering::SeqCst) {
            self.emit(EngineEvent::End);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.stop_count.fetch_add(1, Ordering::Relaxed);
        if self.active.swap(false, Ordering::SeqCst) {
            self.emit(EngineEvent::End);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxlate_core::{EngineErrorKind, ResultSlot};

    fn drain(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_scripted_engine_name() {
        let engine = ScriptedEngine::new();
        assert_eq!(engine.name(), "scripted");
        assert!(engine.is_available());
    }

    #[tokio::test]
    async fn test_scripted_engine_start_without_sender() {
        let engine = ScriptedEngine::new();
        // Should not panic without a sender
        assert!(engine.start().await.is_ok());
        assert_eq!(engine.start_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_engine_replays_script_in_order() {
        let batch = RecognitionEvent::new(0, vec![ResultSlot::finalized("hello")]);
        let err = EngineErrorDescriptor::new(EngineErrorKind::NoSpeech, "");
        let mut engine = ScriptedEngine::with_script(vec![
            ScriptStep::Batch(batch.clone()),
            ScriptStep::Error(err.clone()),
        ]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_event_sender(tx);

        engine.start().await.unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                EngineEvent::Start,
                EngineEvent::Result(batch),
                EngineEvent::Error(err),
            ]
        );
        assert!(engine.is_active());
    }

    #[tokio::test]
    async fn test_scripted_engine_second_start_is_rejected() {
        let engine = ScriptedEngine::new();
        engine.start().await.unwrap();
        match engine.start().await {
            Err(EngineError::InvalidState(_)) => {}
            other => panic!("expected InvalidState, got {other:?}"),
        }
        assert_eq!(engine.start_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_engine_stop_emits_end_once() {
        let mut engine = ScriptedEngine::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_event_sender(tx);

        engine.start().await.unwrap();
        engine.stop().await.unwrap();
        engine.stop().await.unwrap();

        assert_eq!(drain(&mut rx), vec![EngineEvent::Start, EngineEvent::End]);
        assert_eq!(engine.stop_count(), 2);
    }

    #[tokio::test]
    async fn test_scripted_engine_stop_when_idle_emits_nothing() {
        let mut engine = ScriptedEngine::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_event_sender(tx);

        engine.stop().await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_scripted_engine_non_continuous_ends_itself() {
        let batch = RecognitionEvent::new(0, vec![ResultSlot::finalized("once")]);
        let mut engine = ScriptedEngine::with_script(vec![ScriptStep::Batch(batch.clone())]);
        engine.configure(&RecognizerConfig {
            continuous: false,
            ..Default::default()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.set_event_sender(tx);

        engine.start().await.unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![EngineEvent::Start, EngineEvent::Result(batch), EngineEvent::End]
        );
        assert!(!engine.is_active());
        // A new session can be started afterwards
        assert!(engine.start().await.is_ok());
    }

    #[test]
    fn test_scripted_engine_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScriptedEngine>();
    }
}
