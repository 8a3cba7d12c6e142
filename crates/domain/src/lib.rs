//! # doorbridge-domain
//!
//! Pure domain model for the doorbridge access-control middleware.
//!
//! ## Responsibilities
//! - Define the **Door** mapping between one Access Controller door and up
//!   to three Home Automation Hub devices (contact, lock, switch)
//! - Enforce registry invariants: unique controller ids, each hub device
//!   used by at most one door
//! - Define the **inbound events** of both origin systems as tagged
//!   variants, decoded and validated at the system boundary
//! - Define the **lock-rule observation** state used by the reconciler
//! - Define the error taxonomy shared across the workspace
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod door;
pub mod error;
pub mod event;
pub mod lock_rule;

/// Name under which this middleware identifies itself to the Access
/// Controller — used both as the registered webhook name and to recognise
/// (and drop) events triggered by our own API calls.
pub const SERVICE_NAME: &str = "doorbridge";
