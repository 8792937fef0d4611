use std::path::PathBuf;
use std::time::{Duration, Instant};

use kamer_chat_host::ConfigLayer;
use kamer_chat_host::config::CatalogueLayer;
use kamer_chat_tests::{ChatServer, StubMode, TranslationStub};
use serde_json::{Value, json};

async fn ask(server: &ChatServer, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn fulani_question_is_answered_and_translated() {
    let stub = TranslationStub::start(StubMode::Echo).await.unwrap();
    let server = ChatServer::start(&stub.url, "2s", ConfigLayer::default())
        .await
        .unwrap();

    let (status, body) = ask(&server, json!({"message": "How does Fulani marriage work?"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["detectedCulture"], "Fulani");
    let response = body["response"].as_str().unwrap();
    let first_step = response
        .lines()
        .find(|line| line.starts_with(" 1. "))
        .unwrap();
    assert_eq!(first_step, " 1. Sharo (flogging ritual)");
    assert_eq!(
        body["translation"].as_str().unwrap(),
        format!("[fr] {response}")
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["source"], "en");
    assert_eq!(requests[0]["format"], "text");
}

#[tokio::test]
async fn unknown_topic_gets_general_answer_and_no_outbound_call() {
    let stub = TranslationStub::start(StubMode::Echo).await.unwrap();
    let server = ChatServer::start(&stub.url, "2s", ConfigLayer::default())
        .await
        .unwrap();

    let (status, body) = ask(&server, json!({"message": "hello"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["detectedCulture"], "General");
    assert_eq!(body["translation"], "");
    assert!(body["responseHtml"].as_str().unwrap().contains("<ul>"));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let stub = TranslationStub::start(StubMode::Echo).await.unwrap();
    let server = ChatServer::start(&stub.url, "2s", ConfigLayer::default())
        .await
        .unwrap();

    let (status, body) = ask(&server, json!({"message": ""})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing message in request body");
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn selected_culture_wins_over_text() {
    let stub = TranslationStub::start(StubMode::Echo).await.unwrap();
    let server = ChatServer::start(&stub.url, "2s", ConfigLayer::default())
        .await
        .unwrap();

    let (_, body) = ask(
        &server,
        json!({"message": "wedding", "selectedCulture": "Bakweri"}),
    )
    .await;
    assert_eq!(body["detectedCulture"], "Bakweri");
    assert_eq!(body["originalQuestion"], "wedding");
}

#[tokio::test]
async fn hung_translation_service_still_yields_an_answer() {
    let stub = TranslationStub::start(StubMode::Hang(Duration::from_secs(10)))
        .await
        .unwrap();
    let server = ChatServer::start(&stub.url, "300ms", ConfigLayer::default())
        .await
        .unwrap();

    let started = Instant::now();
    let (status, body) = ask(&server, json!({"message": "bassa"})).await;
    assert_eq!(status, 200);
    assert!(started.elapsed() < Duration::from_secs(5));
    let translation = body["translation"].as_str().unwrap();
    assert!(translation.starts_with("[Translation unavailable for Bassa] "));
    assert!(translation.contains(body["response"].as_str().unwrap()));
}

#[tokio::test]
async fn failing_translation_service_is_counted() {
    let stub = TranslationStub::start(StubMode::Unavailable).await.unwrap();
    let server = ChatServer::start(&stub.url, "2s", ConfigLayer::default())
        .await
        .unwrap();

    let (status, body) = ask(&server, json!({"message": "Bamileke dowry?"})).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["translation"].as_str().unwrap(),
        format!(
            "[Translation unavailable for Medumba] {}",
            body["response"].as_str().unwrap()
        )
    );

    let metrics: Value = reqwest::get(server.url("/metrics"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["translation_failures"], 1);
    assert_eq!(metrics["translation_attempts"], 1);
}

#[tokio::test]
async fn catalogue_file_replaces_builtin_cultures() {
    let stub = TranslationStub::start(StubMode::Echo).await.unwrap();
    let catalogue = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/cultures.toml");
    let extra = ConfigLayer {
        catalogue: CatalogueLayer {
            path: Some(catalogue),
        },
        ..ConfigLayer::default()
    };
    let server = ChatServer::start(&stub.url, "2s", extra).await.unwrap();

    let (_, body) = ask(&server, json!({"message": "Tell me about Duala weddings"})).await;
    assert_eq!(body["detectedCulture"], "Duala");
    let html = body["responseHtml"].as_str().unwrap();
    assert!(html.contains(" 2. Dowry &amp; gifts<br>"));
    assert!(html.contains(" 3. Wedding &lt;feast&gt;<br>"));

    let (_, body) = ask(&server, json!({"message": "ewondo"})).await;
    let response = body["response"].as_str().unwrap();
    assert!(response.contains(" no steps available"));
    assert!(response.contains(" no traditions available"));

    let (_, body) = ask(&server, json!({"message": "fulani"})).await;
    assert_eq!(body["detectedCulture"], "General");
}

#[tokio::test]
async fn health_and_cors_on_live_server() {
    let stub = TranslationStub::start(StubMode::Echo).await.unwrap();
    let server = ChatServer::start(&stub.url, "2s", ConfigLayer::default())
        .await
        .unwrap();

    let response = reqwest::get(server.url("/healthz")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );

    let preflight = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, server.url("/api/chat"))
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status().as_u16(), 204);
}
