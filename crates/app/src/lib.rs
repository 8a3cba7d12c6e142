//! # doorbridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports):
//!   - [`ports::ControllerApi`] — Access Controller REST surface
//!   - [`ports::HubApi`] — Home Automation Hub REST surface
//! - Provide the convergence services built on those ports:
//!   - [`services::device_assert::DeviceAssert`] — idempotent "ensure hub
//!     attribute equals X" primitive
//!   - [`services::door_control::DoorControl`] — idempotent controller-side
//!     mutations
//!   - [`services::event_router::EventRouter`] — translates inbound events
//!     into zero or one convergence action on the opposite system
//!   - [`services::registration`] — startup reconciliation of our own
//!     webhook subscription
//!   - [`services::reconciler::Reconciler`] — startup snapshot plus
//!     periodic lock-rule drift detection
//!
//! ## Dependency rule
//! Depends on `doorbridge-domain` only (plus `tokio::time`/`tokio-util` for
//! delays and cancellation). Never imports adapter crates; adapters depend
//! on *this* crate, not the reverse.

pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;
