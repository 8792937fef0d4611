use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Code sent to the translation service when a language label has no row.
pub const DEFAULT_LANGUAGE_CODE: &str = "fr";

// The service has no models for the traditional languages yet, so every row
// points at French until real codes exist.
const BUILTIN_LANGUAGE_CODES: &[(&str, &str)] = &[
    ("Medumba", "fr"),
    ("Bassa", "fr"),
    ("Mokpwe", "fr"),
    ("Fulfulde", "fr"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I18nText {
    pub message_key: String,
    pub fallback: String,
}

impl I18nText {
    pub fn new(message_key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            message_key: message_key.into(),
            fallback: fallback.into(),
        }
    }
}

/// Maps a culture's traditional language label onto a translation service code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCodes {
    codes: BTreeMap<String, String>,
    default_code: String,
}

impl Default for LanguageCodes {
    fn default() -> Self {
        Self {
            codes: BUILTIN_LANGUAGE_CODES
                .iter()
                .map(|(label, code)| ((*label).to_string(), (*code).to_string()))
                .collect(),
            default_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }
}

impl LanguageCodes {
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (label, code) in overrides {
            self.codes.insert(label.into(), code.into());
        }
        self
    }

    pub fn code_for(&self, label: &str) -> &str {
        self.codes
            .get(label)
            .map(String::as_str)
            .unwrap_or(self.default_code.as_str())
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }
}

pub fn normalize_locale(value: &str) -> String {
    let lower = value.replace('_', "-").to_ascii_lowercase();
    match lower.split('-').next() {
        Some("en") => "en".to_string(),
        Some(primary) if !primary.is_empty() => primary.to_string(),
        _ => "en".to_string(),
    }
}

pub fn select_locale_with_sources(
    explicit: Option<&str>,
    env_locale: Option<&str>,
    system_locale: Option<&str>,
) -> String {
    [explicit, env_locale, system_locale]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(normalize_locale)
        .unwrap_or_else(|| "en".to_string())
}

pub fn resolve_text(text: &I18nText, locale: &str) -> String {
    resolve_message(&text.message_key, &text.fallback, locale)
}

pub fn resolve_message(key: &str, fallback: &str, locale: &str) -> String {
    let normalized = normalize_locale(locale);
    match normalized.as_str() {
        "en" => english_message(key).unwrap_or(fallback).to_string(),
        _ => fallback.to_string(),
    }
}

fn english_message(key: &str) -> Option<&'static str> {
    match key {
        "chat.request.missing_message" => Some("Missing message in request body"),
        "chat.request.invalid_body" => Some("Request body must be a JSON object"),
        "chat.request.processing_failed" => Some("Failed to process your question"),
        _ => None,
    }
}
