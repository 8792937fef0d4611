use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "*";
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://libretranslate.com/translate";
pub const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_millis(4000);
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// Fully resolved service configuration.
#[derive(Clone, Debug, Serialize)]
pub struct ChatConfig {
    pub server: ServerConfig,
    pub translation: TranslationConfig,
    /// Alternative catalogue document; the built-in catalogue is used when unset.
    pub catalogue_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allow_origin: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub endpoint: Url,
    #[serde(serialize_with = "serialize_duration")]
    pub timeout: Duration,
    pub source_language: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub language_codes: BTreeMap<String, String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::resolve([ConfigLayer::default()]).expect("built-in defaults are valid")
    }
}

impl ChatConfig {
    /// Merge layers in order (later layers win) on top of the built-in defaults.
    pub fn resolve(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<Self> {
        let merged = layers
            .into_iter()
            .fold(ConfigLayer::default(), ConfigLayer::merge);

        let raw_endpoint = merged
            .translation
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_TRANSLATE_ENDPOINT);
        let endpoint = Url::parse(raw_endpoint)
            .with_context(|| format!("translation endpoint `{raw_endpoint}` is not a valid URL"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("translation endpoint `{endpoint}` must use http or https");
        }

        let timeout = match merged.translation.timeout.as_deref() {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("translation timeout `{raw}` is not a duration"))?,
            None => DEFAULT_TRANSLATE_TIMEOUT,
        };
        if timeout.is_zero() {
            bail!("translation timeout must be greater than zero");
        }

        Ok(Self {
            server: ServerConfig {
                host: merged.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: merged.server.port.unwrap_or(DEFAULT_PORT),
                cors_allow_origin: merged
                    .server
                    .cors_allow_origin
                    .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            },
            translation: TranslationConfig {
                enabled: merged.translation.enabled.unwrap_or(true),
                endpoint,
                timeout,
                source_language: merged
                    .translation
                    .source_language
                    .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string()),
                api_key: merged.translation.api_key.filter(|key| !key.trim().is_empty()),
                language_codes: merged.translation.language_codes,
            },
            catalogue_path: merged.catalogue.path,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Partial configuration as read from one source (file, environment, CLI).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub server: ServerLayer,
    pub translation: TranslationLayer,
    pub catalogue: CatalogueLayer,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerLayer {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_allow_origin: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationLayer {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    /// Human readable duration such as `4s` or `1500ms`.
    pub timeout: Option<String>,
    pub source_language: Option<String>,
    pub api_key: Option<String>,
    pub language_codes: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogueLayer {
    pub path: Option<PathBuf>,
}

impl ConfigLayer {
    /// Read a config file; `.json` is parsed as JSON, anything else as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut layer: ConfigLayer = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("invalid JSON config {}", path.display()))?,
            _ => toml::from_str(&contents)
                .with_context(|| format!("invalid TOML config {}", path.display()))?,
        };
        // catalogue paths in a config file are relative to that file
        if let (Some(catalogue), Some(parent)) = (layer.catalogue.path.as_mut(), path.parent())
            && catalogue.is_relative()
        {
            *catalogue = parent.join(&*catalogue);
        }
        Ok(layer)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let port = var("PORT")
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT `{raw}` is not a valid port number"))
            })
            .transpose()?;
        let disabled = var("KAMER_TRANSLATE_DISABLED").is_some_and(|value| flag_set(&value));
        Ok(Self {
            server: ServerLayer {
                host: var("KAMER_HOST"),
                port,
                cors_allow_origin: var("KAMER_CORS_ORIGIN"),
            },
            translation: TranslationLayer {
                enabled: disabled.then_some(false),
                endpoint: var("KAMER_TRANSLATE_URL"),
                timeout: var("KAMER_TRANSLATE_TIMEOUT"),
                source_language: None,
                api_key: var("KAMER_TRANSLATE_API_KEY"),
                language_codes: BTreeMap::new(),
            },
            catalogue: CatalogueLayer {
                path: var("KAMER_CATALOGUE").map(PathBuf::from),
            },
        })
    }

    /// Overlay `other` on `self`; values set in `other` win.
    pub fn merge(mut self, other: ConfigLayer) -> ConfigLayer {
        let ConfigLayer {
            server,
            translation,
            catalogue,
        } = other;
        overlay(&mut self.server.host, server.host);
        overlay(&mut self.server.port, server.port);
        overlay(&mut self.server.cors_allow_origin, server.cors_allow_origin);
        overlay(&mut self.translation.enabled, translation.enabled);
        overlay(&mut self.translation.endpoint, translation.endpoint);
        overlay(&mut self.translation.timeout, translation.timeout);
        overlay(&mut self.translation.source_language, translation.source_language);
        overlay(&mut self.translation.api_key, translation.api_key);
        self.translation
            .language_codes
            .extend(translation.language_codes);
        overlay(&mut self.catalogue.path, catalogue.path);
        self
    }
}

fn overlay<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

fn flag_set(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}
