//! Harness for end-to-end tests: a real bound chat server and a stub
//! translation endpoint, both on ephemeral local ports.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use kamer_chat_host::config::{ServerLayer, TranslationLayer};
use kamer_chat_host::{ChatApp, ChatConfig, ConfigLayer};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

/// How the stub translation endpoint answers.
#[derive(Clone, Copy, Debug)]
pub enum StubMode {
    /// `{"translatedText": "[<target>] <q>"}`
    Echo,
    /// 503 with a plain body.
    Unavailable,
    /// Sleeps past any reasonable client timeout.
    Hang(Duration),
}

#[derive(Clone)]
struct StubState {
    mode: StubMode,
    requests: Arc<Mutex<Vec<Value>>>,
}

pub struct TranslationStub {
    pub url: Url,
    requests: Arc<Mutex<Vec<Value>>>,
    _shutdown: oneshot::Sender<()>,
}

impl TranslationStub {
    pub async fn start(mode: StubMode) -> Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/translate", post(translate))
            .with_state(StubState {
                mode,
                requests: requests.clone(),
            });
        let (addr, shutdown) = spawn(app).await?;
        Ok(Self {
            url: Url::parse(&format!("http://{addr}/translate"))?,
            requests,
            _shutdown: shutdown,
        })
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }
}

async fn translate(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.requests.lock().push(body.clone());
    match state.mode {
        StubMode::Echo => {
            let target = body["target"].as_str().unwrap_or("?");
            let text = body["q"].as_str().unwrap_or("");
            Json(json!({ "translatedText": format!("[{target}] {text}") })).into_response()
        }
        StubMode::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response(),
        StubMode::Hang(delay) => {
            tokio::time::sleep(delay).await;
            Json(json!({ "translatedText": "late" })).into_response()
        }
    }
}

/// A running chat server; stops when dropped.
pub struct ChatServer {
    pub base_url: String,
    _shutdown: oneshot::Sender<()>,
}

impl ChatServer {
    /// Serve the full stack with its HTTP translator pointed at `translate_url`.
    pub async fn start(translate_url: &Url, timeout: &str, extra: ConfigLayer) -> Result<Self> {
        let layer = ConfigLayer {
            server: ServerLayer {
                host: Some("127.0.0.1".to_string()),
                port: Some(0),
                cors_allow_origin: None,
            },
            translation: TranslationLayer {
                endpoint: Some(translate_url.to_string()),
                timeout: Some(timeout.to_string()),
                ..TranslationLayer::default()
            },
            ..ConfigLayer::default()
        };
        let config = ChatConfig::resolve([layer, extra])?;
        let listener = TcpListener::bind(config.bind_addr())
            .await
            .context("bind chat server")?;
        let addr = listener.local_addr()?;
        let app = ChatApp::from_config(config)?;
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.await;
            };
            if let Err(err) = kamer_chat_host::serve(listener, &app, shutdown).await {
                eprintln!("chat server failed: {err:#}");
            }
        });
        Ok(Self {
            base_url: format!("http://{addr}"),
            _shutdown: tx,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn spawn(app: Router) -> Result<(SocketAddr, oneshot::Sender<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });
    Ok((addr, tx))
}
