use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Response, StatusCode, header::CONTENT_TYPE};
use serde_json::json;
use tracing::warn;

use super::AppState;
use crate::chat::ChatError;
use crate::i18n::{resolve_text, select_locale};

const CONTENT_TYPE_JSON: &str = "application/json";

/// Handler for `POST /api/chat`.
pub async fn chat(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response<Body> {
    match state.service.handle_json(&body).await {
        Ok(response) => match serde_json::to_vec(&response) {
            Ok(bytes) => json_response(StatusCode::OK, bytes),
            Err(err) => {
                warn!(error = %err, "failed to encode chat response");
                error_response(&headers, &ChatError::Internal)
            }
        },
        Err(err) => error_response(&headers, &err),
    }
}

fn error_response(headers: &HeaderMap, err: &ChatError) -> Response<Body> {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let locale = select_locale(headers);
    let payload = json!({ "error": resolve_text(&err.i18n_text(), &locale) });
    json_response(status, payload.to_string().into_bytes())
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response<Body> {
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    response
}
