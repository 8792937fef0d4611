use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use kamer_i18n::LanguageCodes;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::chat_metrics::ChatMetrics;
use crate::config::{DEFAULT_SOURCE_LANGUAGE, TranslationConfig};

const TEXT_FORMAT: &str = "text";

/// Placeholder returned whenever the translation service cannot be used.
pub fn unavailable_translation(text: &str, source_language: &str) -> String {
    format!("[Translation unavailable for {source_language}] {text}")
}

/// Turns an English answer into the culture's traditional language.
///
/// Implementations never fail: any problem reaching the backing service is
/// absorbed and replaced by [`unavailable_translation`].
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_language: &str) -> String;
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request timed out after {0:?}")]
    Timeout(Duration),
    #[error("translation service answered with status {0}")]
    Status(StatusCode),
    #[error("translation request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("translation response was malformed: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    #[serde(rename = "q")]
    source_text: &'a str,
    #[serde(rename = "source")]
    source_lang: &'a str,
    #[serde(rename = "target")]
    target_lang: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    #[serde(default)]
    translated_text: Option<String>,
}

/// LibreTranslate-compatible HTTP client with a hard per-call deadline.
#[derive(Clone, Debug)]
pub struct HttpTranslator {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    source_language: String,
    api_key: Option<String>,
    language_codes: LanguageCodes,
    metrics: Option<Arc<ChatMetrics>>,
}

impl HttpTranslator {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("failed to build translation HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            timeout,
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            api_key: None,
            language_codes: LanguageCodes::default(),
            metrics: None,
        })
    }

    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let translator = Self::new(config.endpoint.clone(), config.timeout)?
            .with_source_language(config.source_language.clone())
            .with_language_codes(
                LanguageCodes::default().with_overrides(config.language_codes.clone()),
            );
        Ok(match config.api_key.clone() {
            Some(key) => translator.with_api_key(key),
            None => translator,
        })
    }

    pub fn with_source_language(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_language_codes(mut self, language_codes: LanguageCodes) -> Self {
        self.language_codes = language_codes;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ChatMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Single attempt against the service; no retries.
    pub async fn try_translate(
        &self,
        text: &str,
        source_language: &str,
    ) -> Result<String, TranslationError> {
        let call = self.call_service(text, source_language);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TranslationError::Timeout(self.timeout)),
        }
    }

    async fn call_service(
        &self,
        text: &str,
        source_language: &str,
    ) -> Result<String, TranslationError> {
        let target_lang = self.language_codes.code_for(source_language);
        let body = TranslateRequest {
            source_text: text,
            source_lang: &self.source_language,
            target_lang,
            format: TEXT_FORMAT,
            api_key: self.api_key.as_deref(),
        };
        debug!(endpoint = %self.endpoint, target_lang, "requesting translation");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status));
        }

        let payload: TranslateResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                TranslationError::Timeout(self.timeout)
            } else {
                TranslationError::MalformedBody(err.to_string())
            }
        })?;
        match payload.translated_text {
            Some(translated) if !translated.trim().is_empty() => Ok(translated),
            Some(_) => Err(TranslationError::MalformedBody(
                "`translatedText` is empty".to_string(),
            )),
            None => Err(TranslationError::MalformedBody(
                "`translatedText` is missing".to_string(),
            )),
        }
    }

    fn classify(&self, err: reqwest::Error) -> TranslationError {
        if err.is_timeout() {
            TranslationError::Timeout(self.timeout)
        } else {
            TranslationError::Transport(err)
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source_language: &str) -> String {
        match self.try_translate(text, source_language).await {
            Ok(translated) => translated,
            Err(err) => {
                warn!(error = %err, source_language, "translation unavailable, using fallback");
                if let Some(metrics) = &self.metrics {
                    metrics.translation_failures.fetch_add(1, Ordering::Relaxed);
                }
                unavailable_translation(text, source_language)
            }
        }
    }
}

/// Used when translation is switched off; never touches the network.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineTranslator;

#[async_trait]
impl Translator for OfflineTranslator {
    async fn translate(&self, text: &str, source_language: &str) -> String {
        debug!(source_language, "translation disabled");
        unavailable_translation(text, source_language)
    }
}

/// Pick the translator described by `config`.
pub fn translator_from_config(
    config: &TranslationConfig,
    metrics: Arc<ChatMetrics>,
) -> Result<Arc<dyn Translator>> {
    if !config.enabled {
        return Ok(Arc::new(OfflineTranslator));
    }
    let translator = HttpTranslator::from_config(config)?.with_metrics(metrics);
    Ok(Arc::new(translator))
}
