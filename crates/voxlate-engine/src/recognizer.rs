use crate::engine_trait::RecognitionEngine;
use crate::registry::EngineRegistry;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use voxlate_core::{
    EngineErrorDescriptor, EngineEvent, RecognitionEvent, RecognizerConfig, RecognizerError,
};

type TextCallback = Arc<dyn Fn(&str) + Send + Sync>;
type LifecycleCallback = Arc<dyn Fn() + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&EngineErrorDescriptor) + Send + Sync>;

/// The callbacks a [`Recognizer`] reports through. Every entry is optional.
#[derive(Clone, Default)]
pub struct RecognizerCallbacks {
    on_interim: Option<TextCallback>,
    on_final: Option<TextCallback>,
    on_start: Option<LifecycleCallback>,
    on_end: Option<LifecycleCallback>,
    on_error: Option<ErrorCallback>,
}

impl RecognizerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_interim(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_interim = Some(Arc::new(f));
        self
    }

    pub fn on_final(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_final = Some(Arc::new(f));
        self
    }

    pub fn on_start(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_end(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&EngineErrorDescriptor) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Replace the entries that `other` sets; keep the rest.
    fn merge(&mut self, other: RecognizerCallbacks) {
        if other.on_interim.is_some() {
            self.on_interim = other.on_interim;
        }
        if other.on_final.is_some() {
            self.on_final = other.on_final;
        }
        if other.on_start.is_some() {
            self.on_start = other.on_start;
        }
        if other.on_end.is_some() {
            self.on_end = other.on_end;
        }
        if other.on_error.is_some() {
            self.on_error = other.on_error;
        }
    }
}

impl fmt::Debug for RecognizerCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognizerCallbacks")
            .field("on_interim", &self.on_interim.is_some())
            .field("on_final", &self.on_final.is_some())
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// A panicking callback is logged and skipped so the pump keeps dispatching.
fn run_callback(which: &str, f: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::error!(callback = which, "recognizer callback panicked");
    }
}

/// State shared between the handle and its event pump. `listening` is only
/// written by the pump.
struct Shared {
    listening: AtomicBool,
    callbacks: Mutex<RecognizerCallbacks>,
}

impl Shared {
    fn with_callbacks(callbacks: RecognizerCallbacks) -> Arc<Self> {
        Arc::new(Self {
            listening: AtomicBool::new(false),
            callbacks: Mutex::new(callbacks),
        })
    }

    /// Clone a callback out of the set so it runs without the lock held.
    fn pick<T>(&self, select: impl FnOnce(&RecognizerCallbacks) -> Option<T>) -> Option<T> {
        self.callbacks.lock().ok().and_then(|cbs| select(&cbs))
    }

    fn dispatch(&self, event: EngineEvent) {
        match event {
            EngineEvent::Start => {
                self.listening.store(true, Ordering::SeqCst);
                tracing::info!("recognition session started");
                if let Some(cb) = self.pick(|c| c.on_start.clone()) {
                    run_callback("on_start", || cb());
                }
            }
            EngineEvent::End => {
                self.listening.store(false, Ordering::SeqCst);
                tracing::info!("recognition session ended");
                if let Some(cb) = self.pick(|c| c.on_end.clone()) {
                    run_callback("on_end", || cb());
                }
            }
            EngineEvent::Error(err) => {
                tracing::warn!(kind = %err.kind, "recognition engine error: {}", err.message);
                if let Some(cb) = self.pick(|c| c.on_error.clone()) {
                    run_callback("on_error", || cb(&err));
                }
            }
            EngineEvent::Result(batch) => self.classify(&batch),
        }
    }

    /// Finals are reported one by one as they are reached; interims of the
    /// batch are joined and reported once at the end.
    fn classify(&self, batch: &RecognitionEvent) {
        let mut interim = String::new();
        for slot in batch.pending_slots() {
            if slot.is_final {
                let text = slot.transcript().trim();
                tracing::debug!(text = %text, "final result");
                if let Some(cb) = self.pick(|c| c.on_final.clone()) {
                    run_callback("on_final", || cb(text));
                }
            } else {
                interim.push_str(slot.transcript());
            }
        }

        if !interim.is_empty() {
            tracing::trace!(text = %interim, "interim result");
            if let Some(cb) = self.pick(|c| c.on_interim.clone()) {
                run_callback("on_interim", || cb(&interim));
            }
        }
    }
}

/// Start/stop/callback front for a [`RecognitionEngine`].
///
/// A recognizer created without a usable engine is disabled for good:
/// `start` returns [`RecognizerError::CapabilityUnavailable`] and everything
/// else does nothing.
pub struct Recognizer {
    engine: Option<Box<dyn RecognitionEngine>>,
    unavailable: Option<String>,
    config: RecognizerConfig,
    shared: Arc<Shared>,
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
    pump: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Recognizer {
    pub fn new(
        engine: Option<Box<dyn RecognitionEngine>>,
        config: RecognizerConfig,
        callbacks: RecognizerCallbacks,
    ) -> Self {
        let mut engine = match engine {
            Some(engine) if engine.is_available() => engine,
            Some(engine) => {
                let reason = format!("engine '{}' is not available on this host", engine.name());
                return Self::disabled(reason, config, callbacks);
            }
            None => return Self::disabled("no recognition engine", config, callbacks),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        engine.configure(&config);
        engine.set_event_sender(tx);
        tracing::info!(
            engine = %engine.name(),
            continuous = config.continuous,
            interim_results = config.interim_results,
            "recognizer created"
        );

        Self {
            engine: Some(engine),
            unavailable: None,
            config,
            shared: Shared::with_callbacks(callbacks),
            event_rx: Mutex::new(Some(rx)),
            pump: Mutex::new(None),
        }
    }

    /// A recognizer that can never listen.
    pub fn disabled(
        reason: impl Into<String>,
        config: RecognizerConfig,
        callbacks: RecognizerCallbacks,
    ) -> Self {
        let reason = reason.into();
        tracing::warn!("recognizer disabled: {reason}");
        Self {
            engine: None,
            unavailable: Some(reason),
            config,
            shared: Shared::with_callbacks(callbacks),
            event_rx: Mutex::new(None),
            pump: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// `false` for a disabled recognizer.
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// True between the engine's `Start` and `End` events.
    pub fn is_listening(&self) -> bool {
        self.shared.listening.load(Ordering::SeqCst)
    }

    /// Merge `callbacks` into the current set.
    pub fn set_callbacks(&self, callbacks: RecognizerCallbacks) {
        if let Ok(mut current) = self.shared.callbacks.lock() {
            current.merge(callbacks);
        }
    }

    pub async fn start(&self) -> Result<(), RecognizerError> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            RecognizerError::CapabilityUnavailable(self.unavailable.clone().unwrap_or_default())
        })?;

        self.ensure_pump();
        engine.start().await.map_err(|e| {
            tracing::warn!(engine = %engine.name(), "start failed: {e}");
            RecognizerError::from(e)
        })
    }

    /// Ask the engine to end the session. Engines ignore a stop while idle.
    pub async fn stop(&self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        if let Err(e) = engine.stop().await {
            tracing::warn!(engine = %engine.name(), "stop failed: {e}");
        }
    }

    /// Best-effort stop for teardown. Never fails.
    pub async fn destroy(&self) {
        if let Some(engine) = self.engine.as_ref() {
            if let Err(e) = engine.stop().await {
                tracing::debug!(engine = %engine.name(), "stop during destroy failed: {e}");
            }
        }
    }

    fn ensure_pump(&self) {
        let Ok(mut pump) = self.pump.lock() else {
            return;
        };
        if pump.is_some() {
            return;
        }
        let Some(mut rx) = self.event_rx.lock().ok().and_then(|mut rx| rx.take()) else {
            return;
        };

        let shared = Arc::clone(&self.shared);
        *pump = Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                shared.dispatch(event);
            }
            tracing::debug!("engine event stream closed");
        }));
    }
}

impl Drop for Recognizer {
    fn drop(&mut self) {
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
    }
}

/// Look up `engine_name` in `registry` and wrap it. An unknown name yields a
/// disabled recognizer rather than an error.
pub fn create_recognizer(
    registry: &EngineRegistry,
    engine_name: &str,
    config: RecognizerConfig,
    callbacks: RecognizerCallbacks,
) -> Recognizer {
    match registry.create(engine_name) {
        Some(engine) => Recognizer::new(Some(engine), config, callbacks),
        None => Recognizer::disabled(
            format!("no recognition engine named '{engine_name}'"),
            config,
            callbacks,
        ),
    }
}
