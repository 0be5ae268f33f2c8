use crate::error::TranslationError;
use std::fmt;

/// Options handed to a recognition engine when a recognizer is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    /// Emit partial transcripts before they are finalized.
    pub interim_results: bool,
    /// Keep listening after a final result instead of ending the session.
    pub continuous: bool,
    /// Language hint passed through to the engine (e.g. `"ja-JP"`).
    pub language: Option<String>,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            interim_results: false,
            continuous: true,
            language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
}

/// One result slot of a recognition batch. Interim slots may be revised by a
/// later batch; final slots never change again.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSlot {
    pub alternatives: Vec<Alternative>,
    pub is_final: bool,
}

impl ResultSlot {
    pub fn interim(transcript: &str) -> Self {
        Self::with_transcript(transcript, false)
    }

    pub fn finalized(transcript: &str) -> Self {
        Self::with_transcript(transcript, true)
    }

    fn with_transcript(transcript: &str, is_final: bool) -> Self {
        Self {
            alternatives: vec![Alternative {
                transcript: transcript.to_string(),
            }],
            is_final,
        }
    }

    /// Transcript of the best alternative, or `""` if the engine sent none.
    pub fn transcript(&self) -> &str {
        self.alternatives
            .first()
            .map(|a| a.transcript.as_str())
            .unwrap_or("")
    }
}

/// A single delivery of results from the engine. Slots before
/// `result_index` were already reported in an earlier batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<ResultSlot>,
}

impl RecognitionEvent {
    pub fn new(result_index: usize, results: Vec<ResultSlot>) -> Self {
        Self {
            result_index,
            results,
        }
    }

    /// Slots from `result_index` to the end. Empty when the index is past the end.
    pub fn pending_slots(&self) -> &[ResultSlot] {
        self.results.get(self.result_index..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineErrorKind {
    NotAllowed,
    NoSpeech,
    AudioCapture,
    Network,
    Aborted,
    Other(String),
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineErrorKind::NotAllowed => f.write_str("not-allowed"),
            EngineErrorKind::NoSpeech => f.write_str("no-speech"),
            EngineErrorKind::AudioCapture => f.write_str("audio-capture"),
            EngineErrorKind::Network => f.write_str("network"),
            EngineErrorKind::Aborted => f.write_str("aborted"),
            EngineErrorKind::Other(kind) => f.write_str(kind),
        }
    }
}

/// Engine-defined description of a recognition failure, passed to
/// `on_error` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineErrorDescriptor {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineErrorDescriptor {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// Everything an engine pushes to the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Start,
    End,
    Error(EngineErrorDescriptor),
    Result(RecognitionEvent),
}

/// Outcome of one translation request. Transport failures and errors
/// reported by the service both end up in `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationResult {
    Translated {
        original: String,
        translated: String,
        raw: serde_json::Value,
    },
    Failed {
        error: String,
    },
}

impl TranslationResult {
    pub fn failed(error: impl Into<String>) -> Self {
        TranslationResult::Failed {
            error: error.into(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TranslationResult::Failed { error } => Some(error),
            TranslationResult::Translated { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

impl From<TranslationError> for TranslationResult {
    fn from(err: TranslationError) -> Self {
        TranslationResult::failed(err.to_string())
    }
}
