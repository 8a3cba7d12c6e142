//! # doorbridged — doorbridge daemon
//!
//! Composition root that wires the upstream clients and services together
//! and starts the webhook listener.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env var overrides)
//! - Build the door registry and the two upstream REST clients
//! - Assert this deployment's webhook registration on the controller and
//!   install the returned signing secret
//! - Spawn the polling reconciler
//! - Build the axum router, bind to a TCP port, and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), draining in-flight tasks
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use doorbridge_adapter_controller::ControllerClient;
use doorbridge_adapter_http_axum::router;
use doorbridge_adapter_http_axum::state::AppState;
use doorbridge_adapter_hub::HubClient;
use doorbridge_app::services::device_assert::DeviceAssert;
use doorbridge_app::services::door_control::DoorControl;
use doorbridge_app::services::event_router::EventRouter;
use doorbridge_app::services::reconciler::Reconciler;
use doorbridge_app::services::registration;
use doorbridge_domain::door::DoorRegistry;

use crate::config::Config;

/// How long to wait for in-flight event tasks after the listener stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let registry = Arc::new(DoorRegistry::new(
        config.doors.iter().map(config::DoorConfig::to_door).collect(),
    )?);
    let controller = Arc::new(ControllerClient::new(
        &config.controller.base_url,
        &config.controller.api_key,
    )?);
    let hub = Arc::new(HubClient::new(&config.hub.base_url, &config.hub.access_token)?);

    // the webhook subscription must exist before we accept deliveries; the
    // resulting registration carries the secret every delivery is signed with
    let spec = registration::desired_webhook(&config.server.base_url, &config.server.auth_token);
    let webhook = registration::assert_webhook_registration(controller.as_ref(), &spec).await?;
    let secret = webhook
        .secret
        .context("webhook registration carries no signing secret")?;

    let event_router = Arc::new(EventRouter::new(
        Arc::clone(&registry),
        DoorControl::new(Arc::clone(&controller)),
        DeviceAssert::new(Arc::clone(&hub)),
    ));

    let cancel = CancellationToken::new();
    let tracker = TaskTracker::new();

    let reconciler = Reconciler::new(registry, Arc::clone(&controller), DeviceAssert::new(hub));
    tracker.spawn(reconciler.run(cancel.clone()));

    let state = AppState::new(
        event_router,
        &config.server.auth_token,
        &secret,
        tracker.clone(),
    );
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "doorbridged listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // stop the reconciler and drain in-flight event tasks
    cancel.cancel();
    tracker.close();
    if tokio::time::timeout(SHUTDOWN_GRACE, tracker.wait())
        .await
        .is_err()
    {
        tracing::warn!("background tasks did not drain in time, exiting anyway");
    }

    Ok(())
}

/// Resolve once a shutdown signal (SIGINT or SIGTERM) arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
