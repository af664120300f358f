use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use shared::{
    error::RelayError,
    protocol::{is_truthy, ApiResponse, ENVELOPE_KEY},
};
use tracing::{error, info, warn};

use crate::AppState;

/// Forwards `{ "certidao": ... }` to the downstream script and hands its status and body back.
///
/// Exactly one downstream call is made per inbound request.
pub(crate) async fn relay_certidao(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method != Method::POST {
        return reject(RelayError::MethodNotAllowed);
    }

    let body = match body {
        Ok(body) => parse_inbound_body(&body),
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "unreadable certidao payload");
            return reject(unreadable_body(&rejection));
        }
    };
    info!(%body, "certidao payload received");

    let certidao = body
        .get(ENVELOPE_KEY)
        .filter(|payload| is_truthy(payload))
        .cloned();
    let Some(certidao) = certidao else {
        warn!("rejecting payload without certidao");
        return reject(RelayError::MissingCertidao { body });
    };

    match forward(&state, certidao).await {
        Ok((status, reply)) => (status, Json(reply)).into_response(),
        Err(err) => {
            error!(error = %err, downstream = %state.downstream_url, "forwarding certidao failed");
            reject(RelayError::Upstream(err.to_string()))
        }
    }
}

async fn forward(state: &AppState, certidao: Value) -> Result<(StatusCode, Value), reqwest::Error> {
    let mut envelope = Map::new();
    envelope.insert(ENVELOPE_KEY.to_string(), certidao);

    let response = state
        .http
        .post(&state.downstream_url)
        .json(&Value::Object(envelope))
        .send()
        .await?;
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let text = response.text().await?;
    info!(status = status.as_u16(), body = %text, "downstream response");

    let reply = serde_json::from_str::<Value>(&text)
        .unwrap_or_else(|_| ApiResponse::raw(text).into_value());
    Ok((status, reply))
}

/// Falsy JSON bodies count as `{}`; bodies that are not JSON are kept as a string for the echo.
fn parse_inbound_body(raw: &[u8]) -> Value {
    if raw.is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_slice::<Value>(raw) {
        Ok(value) if is_truthy(&value) => value,
        Ok(_) => Value::Object(Map::new()),
        Err(_) => Value::String(String::from_utf8_lossy(raw).into_owned()),
    }
}

fn unreadable_body(rejection: &BytesRejection) -> RelayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge
    } else {
        RelayError::UnreadableBody(rejection.body_text())
    }
}

fn reject(err: RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::from(err))).into_response()
}

#[cfg(test)]
#[path = "tests/relay_tests.rs"]
mod tests;
