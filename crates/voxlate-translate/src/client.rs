use crate::response::parse_response;
use crate::translator_trait::Translator;
use async_trait::async_trait;
use serde::Serialize;
use voxlate_core::{TranslationError, TranslationResult, DEFAULT_ENDPOINT};

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
}

/// HTTP client for the translation service.
///
/// Each call is a single `POST {"text": ..}`. There is no retry, caching or
/// timeout here; wrap the future if you need one.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TranslationClient {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn get_translation(&self, text: &str) -> TranslationResult {
        match self.request(text).await {
            Ok(result) => result,
            Err(e) => {
                match &e {
                    TranslationError::Service(msg) => {
                        tracing::warn!(endpoint = %self.endpoint, "translation service error: {msg}")
                    }
                    _ => tracing::error!(endpoint = %self.endpoint, "{e}"),
                }
                e.into()
            }
        }
    }

    /// Run the request in the background and hand the result to `callback`.
    /// The returned handle resolves to the same result.
    pub fn spawn_translation<F>(
        &self,
        text: impl Into<String>,
        callback: F,
    ) -> tokio::task::JoinHandle<TranslationResult>
    where
        F: FnOnce(&TranslationResult) + Send + 'static,
    {
        let client = self.clone();
        let text = text.into();
        tokio::spawn(async move {
            let result = client.get_translation(&text).await;
            callback(&result);
            result
        })
    }

    async fn request(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        tracing::debug!(endpoint = %self.endpoint, chars = text.chars().count(), "requesting translation");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&TranslateRequest { text })
            .send()
            .await
            .map_err(|e| TranslationError::Transport(e.to_string()))?;

        // The service reports failures as a JSON body on non-2xx statuses too
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Decode(format!("{e} (HTTP {status})")))?;

        parse_response(body)
    }
}

impl Default for TranslationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for TranslationClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_translation(&self, text: &str) -> TranslationResult {
        TranslationClient::get_translation(self, text).await
    }
}

/// One-off translation request. `endpoint` defaults to [`DEFAULT_ENDPOINT`].
pub async fn get_translation(text: &str, endpoint: Option<&str>) -> TranslationResult {
    TranslationClient::with_endpoint(endpoint.unwrap_or(DEFAULT_ENDPOINT))
        .get_translation(text)
        .await
}
