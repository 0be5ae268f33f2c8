use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use voxlate_core::TranslationResult;
use voxlate_translate::Translator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Translator,
    Status,
}

impl Sender {
    fn prefix(self) -> &'static str {
        match self {
            Sender::User => "you> ",
            Sender::Translator => "translator> ",
            Sender::Status => "-- ",
        }
    }
}

/// Line-oriented chat transcript.
pub struct Chat {
    out: Mutex<Box<dyn Write + Send>>,
}

impl Chat {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Continuation lines are indented under the first one.
    pub fn append(&self, sender: Sender, text: &str) {
        let prefix = sender.prefix();
        let indent = " ".repeat(prefix.len());
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if text.is_empty() {
            let _ = writeln!(out, "{}", prefix.trim_end());
            let _ = out.flush();
            return;
        }
        for (i, line) in text.lines().enumerate() {
            let lead = if i == 0 { prefix } else { indent.as_str() };
            if let Err(e) = writeln!(out, "{lead}{line}") {
                tracing::debug!("failed to write chat line: {e}");
                return;
            }
        }
        let _ = out.flush();
    }

    pub fn status(&self, text: &str) {
        self.append(Sender::Status, text);
    }
}

/// Turns final transcripts into user messages and translator replies.
pub struct ChatSession {
    chat: Arc<Chat>,
    translator: Arc<dyn Translator>,
    timeout: Option<Duration>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ChatSession {
    pub fn new(chat: Arc<Chat>, translator: Arc<dyn Translator>, timeout: Option<Duration>) -> Self {
        Self {
            chat,
            translator,
            timeout,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Blank transcripts are dropped here rather than in the recognizer.
    pub fn handle_final(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("ignoring empty final transcript");
            return;
        }
        self.chat.append(Sender::User, text);

        let chat = Arc::clone(&self.chat);
        let translator = Arc::clone(&self.translator);
        let timeout = self.timeout;
        let text = text.to_string();
        let handle = tokio::spawn(async move {
            let result = translate_with_timeout(translator.as_ref(), &text, timeout).await;
            chat.append(Sender::Translator, &render_result(&result));
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    /// Wait for every translation still in flight.
    pub async fn drain(&self) {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn translate_with_timeout(
    translator: &dyn Translator,
    text: &str,
    timeout: Option<Duration>,
) -> TranslationResult {
    let Some(limit) = timeout else {
        return translator.get_translation(text).await;
    };
    match tokio::time::timeout(limit, translator.get_translation(text)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(endpoint = %translator.endpoint(), "translation timed out");
            TranslationResult::failed(format!(
                "translation timed out after {}s",
                limit.as_secs_f32()
            ))
        }
    }
}

pub fn render_result(result: &TranslationResult) -> String {
    match result {
        TranslationResult::Failed { error } => format!("Error: {error}"),
        TranslationResult::Translated {
            original,
            translated,
            ..
        } => {
            if translated.is_empty() {
                original.clone()
            } else {
                translated.clone()
            }
        }
    }
}
