//! Axum router assembly.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use doorbridge_app::ports::{ControllerApi, HubApi};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Exposes the two webhook ingest routes and a health check. Includes a
/// [`TraceLayer`] that logs each HTTP request/response at the `DEBUG` level
/// using the `tracing` ecosystem.
pub fn build<C, H>(state: AppState<C, H>) -> Router
where
    C: ControllerApi + Send + Sync + 'static,
    H: HubApi + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/webhook/controller",
            post(crate::webhooks::controller::receive::<C, H>),
        )
        .route("/webhook/hub", post(crate::webhooks::hub::receive::<C, H>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
