//! Ingest handler for Home Automation Hub deliveries.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use doorbridge_app::ports::{ControllerApi, HubApi};
use doorbridge_domain::event::HubEvent;

use crate::state::AppState;

/// Query parameters of a hub delivery; the hub cannot set headers, so the
/// shared token travels as a query parameter instead.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    /// Shared token.
    #[serde(default)]
    pub authorization: String,
}

/// Handle `POST /webhook/hub`.
///
/// Requires an exact shared-token match on the `authorization` query
/// parameter; there is no signature layer on this origin.
pub async fn receive<C, H>(
    State(state): State<AppState<C, H>>,
    Query(query): Query<AuthQuery>,
    body: Bytes,
) -> Response
where
    C: ControllerApi + Send + Sync + 'static,
    H: HubApi + Send + Sync + 'static,
{
    if query.authorization != state.auth_token.as_ref() {
        tracing::warn!("hub webhook rejected: invalid auth token");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let event: HubEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "hub webhook rejected: invalid event JSON");
            return (StatusCode::BAD_REQUEST, "Invalid event JSON").into_response();
        }
    };

    let router = Arc::clone(&state.router);
    state.tasks.spawn(async move {
        router.handle_hub_event(event).await;
    });

    (StatusCode::OK, "OK").into_response()
}
