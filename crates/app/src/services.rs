//! Application services — the convergence use-cases built on the ports.

pub mod device_assert;
pub mod door_control;
pub mod event_router;
pub mod reconciler;
pub mod registration;
