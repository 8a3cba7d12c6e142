//! Webhook registration assertion — startup-time reconciliation of this
//! middleware's own webhook subscription against the controller.
//!
//! The returned registration carries the shared signing secret; it must be
//! installed into the signature verifier before the inbound listener is
//! considered ready, otherwise events arriving during a cold start could
//! not be verified correctly.

use std::collections::HashMap;

use doorbridge_domain::SERVICE_NAME;
use doorbridge_domain::error::{BridgeError, ConfigurationError};

use crate::ports::{ControllerApi, WebhookEndpoint, WebhookSpec};

/// Path under the public base URL where controller events are delivered.
pub const CONTROLLER_WEBHOOK_PATH: &str = "/webhook/controller";

/// Event kinds this middleware subscribes to.
pub const SUBSCRIBED_EVENTS: [&str; 2] = ["access.device.dps_status", "access.door.unlock"];

/// Build the desired webhook registration for this deployment.
#[must_use]
pub fn desired_webhook(public_base_url: &str, auth_token: &str) -> WebhookSpec {
    WebhookSpec {
        name: SERVICE_NAME.to_string(),
        endpoint: format!(
            "{}{CONTROLLER_WEBHOOK_PATH}",
            public_base_url.trim_end_matches('/')
        ),
        events: SUBSCRIBED_EVENTS.iter().map(ToString::to_string).collect(),
        headers: HashMap::from([("Authorization".to_string(), auth_token.to_string())]),
    }
}

/// Ensure a registration matching `spec` exists on the controller.
///
/// Three-way outcome: no registration with our name → create one; a
/// registration with our name whose endpoint, event list, or headers differ
/// → update it in place; a fully matching registration → no-op.
///
/// # Errors
///
/// Returns an upstream error when any controller call fails, or a
/// configuration error when the resulting registration carries no signing
/// secret.
pub async fn assert_webhook_registration<C: ControllerApi>(
    controller: &C,
    spec: &WebhookSpec,
) -> Result<WebhookEndpoint, BridgeError> {
    let existing = controller.list_webhooks().await?;

    let registration = match existing.into_iter().find(|hook| hook.name == spec.name) {
        Some(hook) if matches(&hook, spec) => {
            tracing::info!(webhook_id = ?hook.id, "webhook registration already matches");
            hook
        }
        Some(hook) => {
            let Some(id) = hook.id else {
                return Err(ConfigurationError::MissingWebhookId { name: hook.name }.into());
            };
            tracing::info!(webhook_id = %id, "webhook registration differs, updating");
            controller.update_webhook(&id, spec).await?
        }
        None => {
            tracing::info!("no webhook registration found, creating");
            controller.create_webhook(spec).await?
        }
    };

    if registration.secret.is_none() {
        return Err(ConfigurationError::MissingWebhookSecret {
            webhook_id: registration.id.unwrap_or_default(),
        }
        .into());
    }
    Ok(registration)
}

/// Whether an existing registration fully matches the desired spec.
fn matches(hook: &WebhookEndpoint, spec: &WebhookSpec) -> bool {
    hook.endpoint == spec.endpoint
        && events_equal(&hook.events, &spec.events)
        && hook.headers == spec.headers
}

/// Order-independent multiset equality of two event lists.
fn events_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut counts: HashMap<&str, i64> = HashMap::new();
    for event in a {
        *counts.entry(event.as_str()).or_default() += 1;
    }
    for event in b {
        let count = counts.entry(event.as_str()).or_default();
        *count -= 1;
        if *count < 0 {
            return false;
        }
    }
    true
}
