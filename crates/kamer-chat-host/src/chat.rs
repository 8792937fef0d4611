use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use chat_core::{Catalogue, CultureEntry, render, resolve};
use futures::FutureExt;
use kamer_i18n::I18nText;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, error, info_span};

use crate::chat_metrics::ChatMetrics;
use crate::translator::Translator;

/// Culture label reported when no catalogue entry was resolved.
pub const GENERAL_CULTURE_LABEL: &str = "General";

/// Incoming chat payload. Fields of the wrong JSON type are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub selected_culture: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            selected_culture: None,
        }
    }

    pub fn with_selected_culture(mut self, culture: impl Into<String>) -> Self {
        self.selected_culture = Some(culture.into());
        self
    }

    /// Decode a request body. An empty body reads as `{}`; anything that is
    /// not a JSON object is rejected.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ChatError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(bytes).map_err(|_| ChatError::InvalidBody)?;
        if !value.is_object() {
            return Err(ChatError::InvalidBody);
        }
        serde_json::from_value(value).map_err(|_| ChatError::InvalidBody)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub response_html: String,
    pub translation: String,
    pub detected_culture: String,
    pub original_question: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("missing message in request body")]
    MissingMessage,
    #[error("request body is not a JSON object")]
    InvalidBody,
    #[error("internal failure while answering")]
    Internal,
}

impl ChatError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChatError::MissingMessage | ChatError::InvalidBody)
    }

    /// Caller-facing text; never carries internal details.
    pub fn i18n_text(&self) -> I18nText {
        match self {
            ChatError::MissingMessage => I18nText::new(
                "chat.request.missing_message",
                "Missing message in request body",
            ),
            ChatError::InvalidBody => I18nText::new(
                "chat.request.invalid_body",
                "Request body must be a JSON object",
            ),
            ChatError::Internal => I18nText::new(
                "chat.request.processing_failed",
                "Failed to process your question",
            ),
        }
    }
}

/// Request orchestrator: validate, resolve, render, translate, assemble.
#[derive(Clone)]
pub struct ChatService {
    catalogue: Arc<Catalogue>,
    translator: Arc<dyn Translator>,
    metrics: Arc<ChatMetrics>,
}

impl ChatService {
    pub fn new(catalogue: Arc<Catalogue>, translator: Arc<dyn Translator>) -> Self {
        Self {
            catalogue,
            translator,
            metrics: Arc::new(ChatMetrics::default()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ChatMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn metrics(&self) -> &Arc<ChatMetrics> {
        &self.metrics
    }

    pub async fn handle_json(&self, body: &[u8]) -> Result<ChatResponse, ChatError> {
        self.metrics.requests.fetch_add(1, Ordering::Relaxed);
        match ChatRequest::from_json_slice(body) {
            Ok(request) => self.process(request).await,
            Err(err) => {
                self.metrics.bad_requests.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        self.metrics.requests.fetch_add(1, Ordering::Relaxed);
        self.process(request).await
    }

    async fn process(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty());
        let Some(message) = message else {
            self.metrics.bad_requests.fetch_add(1, Ordering::Relaxed);
            return Err(ChatError::MissingMessage);
        };

        let span = info_span!(
            "chat.request",
            message_len = message.len(),
            selected_culture = request.selected_culture.as_deref().unwrap_or(""),
            culture = tracing::field::Empty,
        );
        let answer = AssertUnwindSafe(self.answer(message, request.selected_culture.as_deref()))
            .catch_unwind()
            .instrument(span)
            .await;
        match answer {
            Ok(response) => Ok(response),
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|text| (*text).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(%reason, "chat request failed");
                self.metrics.internal_errors.fetch_add(1, Ordering::Relaxed);
                Err(ChatError::Internal)
            }
        }
    }

    async fn answer(&self, message: &str, selected_culture: Option<&str>) -> ChatResponse {
        let entry = resolve(&self.catalogue, selected_culture, message);
        let rendered = render(&self.catalogue, entry);
        tracing::Span::current().record(
            "culture",
            entry.map(|entry| entry.key.as_str()).unwrap_or(""),
        );

        let translation = match entry {
            Some(entry) => self.translate_for(entry, &rendered.plain_text).await,
            None => {
                self.metrics.general_fallbacks.fetch_add(1, Ordering::Relaxed);
                String::new()
            }
        };

        ChatResponse {
            response: rendered.plain_text,
            response_html: rendered.markup_text,
            translation,
            detected_culture: entry
                .map(|entry| entry.display_name.clone())
                .unwrap_or_else(|| GENERAL_CULTURE_LABEL.to_string()),
            original_question: message.to_string(),
        }
    }

    async fn translate_for(&self, entry: &CultureEntry, text: &str) -> String {
        self.metrics.cultures_detected.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .translation_attempts
            .fetch_add(1, Ordering::Relaxed);
        self.translator.translate(text, &entry.source_language).await
    }
}
