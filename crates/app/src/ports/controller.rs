//! Access Controller port — the outbound REST surface this middleware
//! drives: door listing/fetch, door unlock, lock-rule get/set, and webhook
//! endpoint management.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use doorbridge_domain::error::UpstreamError;

/// A door as reported by the controller.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorSnapshot {
    /// Controller-side door id.
    pub id: String,
    /// Short door name.
    #[serde(default)]
    pub name: String,
    /// Fully-qualified door name including floor.
    #[serde(default)]
    pub full_name: String,
    /// Reported physical position, `open` or `close`; absent when the door
    /// has no position sensor.
    #[serde(default)]
    pub door_position_status: Option<String>,
    /// Reported relay state, `lock` or `unlock`.
    #[serde(default)]
    pub door_lock_relay_status: Option<String>,
}

/// Lock rule currently applied to a door.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockRule {
    /// Rule type; empty for the default rule, `keep_unlock` to hold the
    /// door open.
    #[serde(rename = "type", default)]
    pub rule_type: String,
    /// Unix timestamp at which a temporary rule ends.
    #[serde(default)]
    pub ended_time: f64,
}

/// A webhook endpoint registered on the controller.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEndpoint {
    /// Remote registration id.
    #[serde(default)]
    pub id: Option<String>,
    /// Registration name.
    pub name: String,
    /// Delivery URL.
    pub endpoint: String,
    /// Shared secret used to sign deliveries.
    #[serde(default)]
    pub secret: Option<String>,
    /// Subscribed event kinds.
    #[serde(default)]
    pub events: Vec<String>,
    /// Headers attached to every delivery.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Desired webhook registration, as sent on create/update.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebhookSpec {
    /// Registration name.
    pub name: String,
    /// Delivery URL.
    pub endpoint: String,
    /// Event kinds to subscribe to.
    pub events: Vec<String>,
    /// Headers to attach to every delivery.
    pub headers: HashMap<String, String>,
}

/// Outbound REST surface of the Access Controller.
///
/// Every response is wrapped `{code, msg, data}` by the controller; any
/// code other than the success sentinel is an application-level error
/// regardless of transport status. Implementations surface both kinds as
/// [`UpstreamError`].
pub trait ControllerApi: Send + Sync {
    /// Fetch all doors known to the controller.
    fn fetch_all_doors(
        &self,
    ) -> impl Future<Output = Result<Vec<DoorSnapshot>, UpstreamError>> + Send;

    /// Fetch a single door by id.
    fn fetch_door(
        &self,
        door_id: &str,
    ) -> impl Future<Output = Result<DoorSnapshot, UpstreamError>> + Send;

    /// Trigger a momentary unlock of a door.
    fn unlock_door(&self, door_id: &str) -> impl Future<Output = Result<(), UpstreamError>> + Send;

    /// Fetch the lock rule currently applied to a door.
    fn get_lock_rule(
        &self,
        door_id: &str,
    ) -> impl Future<Output = Result<LockRule, UpstreamError>> + Send;

    /// Apply a lock rule to a door (`keep_unlock`, `reset`, …).
    fn set_lock_rule(
        &self,
        door_id: &str,
        rule_type: &str,
    ) -> impl Future<Output = Result<(), UpstreamError>> + Send;

    /// List all registered webhook endpoints.
    fn list_webhooks(
        &self,
    ) -> impl Future<Output = Result<Vec<WebhookEndpoint>, UpstreamError>> + Send;

    /// Register a new webhook endpoint.
    fn create_webhook(
        &self,
        spec: &WebhookSpec,
    ) -> impl Future<Output = Result<WebhookEndpoint, UpstreamError>> + Send;

    /// Update an existing webhook endpoint in place.
    fn update_webhook(
        &self,
        webhook_id: &str,
        spec: &WebhookSpec,
    ) -> impl Future<Output = Result<WebhookEndpoint, UpstreamError>> + Send;

    /// Remove a webhook endpoint.
    fn delete_webhook(
        &self,
        webhook_id: &str,
    ) -> impl Future<Output = Result<(), UpstreamError>> + Send;
}
