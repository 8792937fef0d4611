use std::env;

use axum::http::{HeaderMap, header::ACCEPT_LANGUAGE};
use kamer_i18n as shared;
pub use kamer_i18n::I18nText;

/// Locale for caller-facing messages: the request's `Accept-Language`, then
/// `KAMER_LOCALE`, then the process locale.
pub fn select_locale(headers: &HeaderMap) -> String {
    let requested = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .and_then(first_language_tag);
    let env_locale = env::var("KAMER_LOCALE").ok();
    let system = system_locale();
    shared::select_locale_with_sources(requested, env_locale.as_deref(), system.as_deref())
}

pub fn resolve_text(text: &I18nText, locale: &str) -> String {
    shared::resolve_text(text, locale)
}

fn first_language_tag(header: &str) -> Option<&str> {
    header
        .split(',')
        .map(|part| part.split(';').next().unwrap_or(part).trim())
        .find(|tag| !tag.is_empty() && *tag != "*")
}

fn system_locale() -> Option<String> {
    for key in ["LC_ALL", "LANG", "LC_MESSAGES"] {
        if let Ok(value) = env::var(key) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            let stripped = trimmed.split('.').next().unwrap_or(trimmed);
            if !stripped.is_empty() && stripped != "C" && stripped != "POSIX" {
                return Some(shared::normalize_locale(stripped));
            }
        }
    }
    None
}
