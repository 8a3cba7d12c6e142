//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use doorbridge_app::ports::{ControllerApi, HubApi};
use doorbridge_app::services::event_router::EventRouter;

/// Listener state shared across the webhook handlers.
///
/// Generic over the two port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the port implementations themselves
/// do not need to be `Clone`; only the `Arc` wrappers and the tracker
/// handle are cloned.
pub struct AppState<C, H> {
    /// Translates parsed events into convergence actions.
    pub router: Arc<EventRouter<C, H>>,
    /// Shared token expected on inbound requests from both origins.
    pub auth_token: Arc<str>,
    /// Signing secret installed from the webhook registration assertion.
    pub signing_secret: Arc<str>,
    /// Tracks spawned per-event tasks for graceful drain during shutdown.
    pub tasks: TaskTracker,
}

impl<C, H> Clone for AppState<C, H> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            auth_token: Arc::clone(&self.auth_token),
            signing_secret: Arc::clone(&self.signing_secret),
            tasks: self.tasks.clone(),
        }
    }
}

impl<C, H> AppState<C, H>
where
    C: ControllerApi + Send + Sync + 'static,
    H: HubApi + Send + Sync + 'static,
{
    /// Create listener state from a wired event router and the two shared
    /// secrets.
    pub fn new(
        router: Arc<EventRouter<C, H>>,
        auth_token: &str,
        signing_secret: &str,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            router,
            auth_token: Arc::from(auth_token),
            signing_secret: Arc::from(signing_secret),
            tasks,
        }
    }
}
