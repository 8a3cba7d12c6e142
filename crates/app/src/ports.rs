//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the two
//! external systems. They are defined here so that the use-case layer and
//! the adapter layer can depend on them without creating circular
//! dependencies.

pub mod controller;
pub mod hub;

pub use controller::{ControllerApi, DoorSnapshot, LockRule, WebhookEndpoint, WebhookSpec};
pub use hub::{DeviceAttribute, DeviceInfo, HubApi};
