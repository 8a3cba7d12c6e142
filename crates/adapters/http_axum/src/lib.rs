//! # doorbridge-adapter-http-axum
//!
//! Inbound HTTP adapter — the webhook listener for both origin systems.
//!
//! ## Responsibilities
//! - Verify HMAC signatures on Access Controller deliveries
//! - Authenticate both webhook origins (shared header token / shared query
//!   token)
//! - Decode events at the boundary and hand them to an independently
//!   running task, so the HTTP response never waits for downstream
//!   processing
//! - Track spawned per-event tasks for graceful drain during shutdown
//!
//! ## Dependency rule
//! Depends on `doorbridge-app` (router service, port traits) and
//! `doorbridge-domain`. Never the reverse.

pub mod router;
pub mod signature;
pub mod state;
pub mod webhooks;
