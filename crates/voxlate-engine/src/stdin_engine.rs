use crate::engine_trait::RecognitionEngine;
use async_trait::async_trait;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use voxlate_core::{
    EngineError, EngineErrorDescriptor, EngineErrorKind, EngineEvent, RecognitionEvent,
    RecognizerConfig, ResultSlot,
};

type LineSource = mpsc::UnboundedReceiver<io::Result<String>>;

/// Engine that recognizes typed lines instead of audio.
///
/// Each line is one utterance. With interim results enabled the words of a
/// line are first streamed as a growing interim slot. A blank line reports
/// `no-speech`, and end of input ends the session.
pub struct StdinEngine {
    lines: Arc<tokio::sync::Mutex<LineSource>>,
    config: RecognizerConfig,
    active: Arc<AtomicBool>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
    event_sender: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl StdinEngine {
    pub fn new() -> Self {
        Self::from_reader(io::BufReader::new(io::stdin()))
    }

    /// Lines are read on a dedicated thread, so a read that never returns
    /// does not hold up runtime shutdown.
    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            lines: Arc::new(tokio::sync::Mutex::new(spawn_line_reader(reader))),
            config: RecognizerConfig::default(),
            active: Arc::new(AtomicBool::new(false)),
            stop_tx: Mutex::new(None),
            event_sender: None,
        }
    }
}

impl Default for StdinEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_line_reader(reader: impl BufRead + Send + 'static) -> LineSource {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("voxlate-stdin".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        // The sender is gone with the closure, so sessions see end of input
        tracing::error!("failed to spawn stdin reader thread: {e}");
    }
    rx
}

/// Builds the batches one typed line produces. `finals` holds the slots
/// already finalized in this session; they are carried in every batch but
/// sit before `result_index`.
fn utterance_batches(
    line: &str,
    finals: &[ResultSlot],
    interim_results: bool,
) -> Vec<RecognitionEvent> {
    let mut batches = Vec::new();
    let result_index = finals.len();

    if interim_results {
        let words: Vec<&str> = line.split_whitespace().collect();
        for end in 1..words.len() {
            let mut results = finals.to_vec();
            results.push(ResultSlot::interim(&words[..end].join(" ")));
            batches.push(RecognitionEvent::new(result_index, results));
        }
    }

    let mut results = finals.to_vec();
    results.push(ResultSlot::finalized(line));
    batches.push(RecognitionEvent::new(result_index, results));
    batches
}

async fn run_session(
    lines: Arc<tokio::sync::Mutex<LineSource>>,
    config: RecognizerConfig,
    active: Arc<AtomicBool>,
    mut stop_rx: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    let mut lines = lines.lock().await;
    let mut finals: Vec<ResultSlot> = Vec::new();

    loop {
        tokio::select! {
            _ = &mut stop_rx => {
                tracing::debug!("stdin session stopped on request");
                break;
            }
            line = lines.recv() => match line {
                Some(Ok(line)) => {
                    let line = line.trim_end_matches('\r');
                    if line.trim().is_empty() {
                        let _ = events.send(EngineEvent::Error(EngineErrorDescriptor::new(
                            EngineErrorKind::NoSpeech,
                            "no speech was detected",
                        )));
                        continue;
                    }
                    for batch in utterance_batches(line, &finals, config.interim_results) {
                        let _ = events.send(EngineEvent::Result(batch));
                    }
                    finals.push(ResultSlot::finalized(line));
                    if !config.continuous {
                        break;
                    }
                }
                None => {
                    tracing::debug!("stdin closed, ending session");
                    break;
                }
                Some(Err(e)) => {
                    let _ = events.send(EngineEvent::Error(EngineErrorDescriptor::new(
                        EngineErrorKind::AudioCapture,
                        e.to_string(),
                    )));
                    break;
                }
            }
        }
    }

    active.store(false, Ordering::SeqCst);
    let _ = events.send(EngineEvent::End);
}

#[async_trait]
impl RecognitionEngine for StdinEngine {
    fn name(&self) -> &str {
        "stdin"
    }

    fn configure(&mut self, config: &RecognizerConfig) {
        self.config = config.clone();
        tracing::debug!(
            continuous = config.continuous,
            interim_results = config.interim_results,
            language = ?config.language,
            "StdinEngine configured"
        );
    }

    fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<EngineEvent>) {
        self.event_sender = Some(sender);
    }

    async fn start(&self) -> Result<(), EngineError> {
        let events = self
            .event_sender
            .clone()
            .ok_or_else(|| EngineError::StartFailed("no event sender installed".to_string()))?;
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(EngineError::InvalidState(
                "recognition has already started".to_string(),
            ));
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        if let Ok(mut guard) = self.stop_tx.lock() {
            *guard = Some(stop_tx);
        }

        let _ = events.send(EngineEvent::Start);
        tokio::spawn(run_session(
            Arc::clone(&self.lines),
            self.config.clone(),
            Arc::clone(&self.active),
            stop_rx,
            events,
        ));
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        let stop_tx = self
            .stop_tx
            .lock()
            .map_err(|_| EngineError::StopFailed("stop handle poisoned".to_string()))?
            .take();
        if let Some(tx) = stop_tx {
            // The session may already have ended on its own
            let _ = tx.send(());
        }
        Ok(())
    }
}
