//! Webhook ingest handlers, one per origin system.
//!
//! Both handlers follow the same shape: authenticate, parse at the
//! boundary, respond immediately, and hand the event to a tracked task so
//! the HTTP response never waits for downstream processing.

pub mod controller;
pub mod hub;
