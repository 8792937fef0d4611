use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use kamer_chat_host::config::{CatalogueLayer, ServerLayer, TranslationLayer};
use kamer_chat_host::{ChatConfig, ConfigLayer};

#[derive(Debug, Parser)]
#[command(name = "kamer-chat", version, about)]
pub struct Cli {
    /// Optional config file (toml/json).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the resolved config as JSON and exit.
    #[arg(long = "config-explain")]
    pub config_explain: bool,

    /// Address to bind (default 0.0.0.0)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to serve the HTTP server on (default 3000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Never call the translation service.
    #[arg(long)]
    pub offline: bool,

    /// Culture catalogue to load instead of the built-in one (toml/json).
    #[arg(long, value_name = "PATH")]
    pub catalogue: Option<PathBuf>,
}

impl Cli {
    /// Flags given on the command line, as the highest precedence layer.
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            server: ServerLayer {
                host: self.host.clone(),
                port: self.port,
                cors_allow_origin: None,
            },
            translation: TranslationLayer {
                enabled: self.offline.then_some(false),
                ..TranslationLayer::default()
            },
            catalogue: CatalogueLayer {
                path: self.catalogue.clone(),
            },
        }
    }

    /// Defaults < config file < environment < CLI.
    pub fn resolve_config(&self) -> Result<ChatConfig> {
        let file = match self.config.as_deref() {
            Some(path) => ConfigLayer::from_path(path)?,
            None => ConfigLayer::default(),
        };
        let env = ConfigLayer::from_env()?;
        ChatConfig::resolve([file, env, self.overrides()])
    }
}

pub fn explain(config: &ChatConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
