//! Ingest handler for Access Controller deliveries.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use doorbridge_app::ports::{ControllerApi, HubApi};
use doorbridge_domain::event::{ControllerEnvelope, ControllerEvent};

use crate::signature::validate_payload;
use crate::state::AppState;

/// Handle `POST /webhook/controller`.
///
/// Requires both an exact shared-token match on the `Authorization` header
/// and a valid HMAC signature of the body. On success the parsed event is
/// dispatched to a tracked task and the response returns immediately.
pub async fn receive<C, H>(
    State(state): State<AppState<C, H>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    C: ControllerApi + Send + Sync + 'static,
    H: HubApi + Send + Sync + 'static,
{
    let auth = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if auth != state.auth_token.as_ref() {
        tracing::warn!("controller webhook rejected: invalid auth token");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let signature = headers
        .get("Signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Err(err) = validate_payload(&body, signature, &state.signing_secret) {
        tracing::warn!(error = %err, "controller webhook rejected: signature validation failed");
        return (
            StatusCode::UNAUTHORIZED,
            format!("Signature validation failed: {err}"),
        )
            .into_response();
    }

    let envelope: ControllerEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(error = %err, "controller webhook rejected: invalid event JSON");
            return (StatusCode::BAD_REQUEST, "Invalid event JSON").into_response();
        }
    };
    let event = match ControllerEvent::from_envelope(envelope) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "controller webhook rejected: invalid event payload");
            return (StatusCode::BAD_REQUEST, "Invalid event JSON").into_response();
        }
    };

    let router = Arc::clone(&state.router);
    state.tasks.spawn(async move {
        router.handle_controller_event(event).await;
    });

    (StatusCode::OK, "OK").into_response()
}
