#![forbid(unsafe_code)]

//! Host runtime for the Kamer chat service.
//!
//! Wires the culture catalogue, the translation gateway and the request
//! orchestrator behind an axum router, and owns the serve loop.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use chat_core::Catalogue;
use tokio::net::TcpListener;
use tracing::info;

pub mod boot;
pub mod chat;
pub mod chat_metrics;
pub mod config;
pub mod http;
pub mod i18n;
pub mod translator;

pub use chat::{ChatError, ChatRequest, ChatResponse, ChatService, GENERAL_CULTURE_LABEL};
pub use chat_metrics::{ChatMetrics, ChatMetricsSnapshot};
pub use config::{ChatConfig, ConfigLayer};
pub use http::health::HealthState;
pub use http::{AppState, CorsPolicy};
pub use translator::{
    HttpTranslator, OfflineTranslator, TranslationError, Translator, unavailable_translation,
};

/// A fully wired service, ready to be booted and served.
pub struct ChatApp {
    config: ChatConfig,
    state: AppState,
}

impl ChatApp {
    /// Build the app from resolved configuration, loading the catalogue and
    /// choosing the translator it describes.
    pub fn from_config(config: ChatConfig) -> Result<Self> {
        let catalogue = load_catalogue(&config)?;
        let metrics = Arc::new(ChatMetrics::default());
        let translator = translator::translator_from_config(&config.translation, metrics.clone())?;
        Self::assemble(config, catalogue, translator, metrics)
    }

    /// Same as [`ChatApp::from_config`] but with a caller supplied translator.
    pub fn with_translator(
        config: ChatConfig,
        catalogue: Catalogue,
        translator: Arc<dyn Translator>,
    ) -> Result<Self> {
        Self::assemble(config, catalogue, translator, Arc::new(ChatMetrics::default()))
    }

    fn assemble(
        config: ChatConfig,
        catalogue: Catalogue,
        translator: Arc<dyn Translator>,
        metrics: Arc<ChatMetrics>,
    ) -> Result<Self> {
        let cors = CorsPolicy::new(&config.server.cors_allow_origin)?;
        let service = ChatService::new(Arc::new(catalogue), translator).with_metrics(metrics);
        Ok(Self {
            config,
            state: AppState {
                service,
                health: HealthState::default(),
                cors: Arc::new(cors),
            },
        })
    }

    /// Log the catalogue summary and flip readiness.
    pub fn boot(&self) {
        boot::init(&self.state.health, self.state.service.catalogue());
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        http::router(self.state.clone())
    }
}

fn load_catalogue(config: &ChatConfig) -> Result<Catalogue> {
    match &config.catalogue_path {
        Some(path) => Catalogue::from_path(path)
            .with_context(|| format!("failed to load culture catalogue {}", path.display())),
        None => Ok(Catalogue::builtin()),
    }
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: &ChatApp, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    app.boot();
    info!(%addr, "kamer chat listening");
    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(config: ChatConfig) -> Result<()> {
    let app = ChatApp::from_config(config)?;
    let bind_addr = app.config().bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    serve(listener, &app, shutdown_signal()).await?;
    info!("kamer chat stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c; shutting down");
    }
}
