//! Event router — maps a parsed inbound event to zero or one idempotent
//! convergence action on the opposite system.
//!
//! Per-event failures are caught here, logged with the event context, and
//! never propagate beyond the single event: one bad event cannot affect
//! another in-flight event or the reconciliation loop.

use std::sync::Arc;
use std::time::Duration;

use doorbridge_domain::SERVICE_NAME;
use doorbridge_domain::door::{DeviceRole, DoorRegistry};
use doorbridge_domain::error::BridgeError;
use doorbridge_domain::event::{ControllerEvent, DoorPositionStatus, DoorUnlock, HubEvent};

use crate::ports::{ControllerApi, HubApi};
use crate::services::device_assert::DeviceAssert;
use crate::services::door_control::DoorControl;

/// Actor kind the controller reports for API-triggered events.
const ACTOR_KIND_API: &str = "open-api";
/// Result string of a successful unlock.
const RESULT_GRANTED: &str = "Access Granted";
/// Sub-event type of a genuine door-position change.
const DPS_CHANGE: &str = "dps_change";

/// Delay between a granted unlock event and the switch assertion, giving
/// the physical latch time to actually release.
pub const UNLOCK_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Translates inbound events into convergence actions.
pub struct EventRouter<C, H> {
    registry: Arc<DoorRegistry>,
    doors: DoorControl<C>,
    devices: DeviceAssert<H>,
}

impl<C, H> EventRouter<C, H>
where
    C: ControllerApi,
    H: HubApi,
{
    /// Create a router over the given registry and convergence services.
    pub fn new(registry: Arc<DoorRegistry>, doors: DoorControl<C>, devices: DeviceAssert<H>) -> Self {
        Self {
            registry,
            doors,
            devices,
        }
    }

    /// Handle one controller event; all failures are logged and swallowed.
    pub async fn handle_controller_event(&self, event: ControllerEvent) {
        let kind = event.kind().to_string();
        tracing::info!(event = %kind, "received controller event");

        let result = match event {
            ControllerEvent::DoorUnlock(unlock) => self.route_door_unlock(unlock).await,
            ControllerEvent::DoorPositionStatus(dps) => self.route_position_status(dps).await,
            ControllerEvent::Unknown { event } => {
                tracing::warn!(event = %event, "unknown controller event kind, dropping");
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::error!(event = %kind, error = %format_chain(&err), "failed to handle controller event");
        }
    }

    /// Handle one hub event; all failures are logged and swallowed.
    pub async fn handle_hub_event(&self, event: HubEvent) {
        let content = &event.content;
        tracing::info!(
            device_id = %content.device_id,
            name = %content.name,
            value = %content.value,
            "received hub event"
        );

        if let Err(err) = self.route_hub_event(&event).await {
            tracing::error!(
                device_id = %event.content.device_id,
                value = %event.content.value,
                error = %format_chain(&err),
                "failed to handle hub event"
            );
        }
    }

    async fn route_door_unlock(&self, unlock: DoorUnlock) -> Result<(), BridgeError> {
        if unlock.actor.kind == ACTOR_KIND_API && unlock.actor.name == SERVICE_NAME {
            // our own unlock call echoing back; acting on it would loop
            tracing::info!(door_id = %unlock.location.id, "unlock triggered by this middleware, ignoring");
            return Ok(());
        }
        if unlock.object.result != RESULT_GRANTED {
            tracing::info!(
                door_id = %unlock.location.id,
                result = %unlock.object.result,
                "unlock not granted, ignoring"
            );
            return Ok(());
        }

        let Some(door) = self.registry.by_controller_id(&unlock.location.id) else {
            tracing::warn!(controller_id = %unlock.location.id, "no door mapping for unlock event");
            return Ok(());
        };

        // give the physical latch time to release before mirroring the state
        tokio::time::sleep(UNLOCK_SETTLE_DELAY).await;
        self.devices.switch_on(&door.switch_id).await
    }

    async fn route_position_status(&self, dps: DoorPositionStatus) -> Result<(), BridgeError> {
        if dps.object.event_type != DPS_CHANGE {
            tracing::warn!(
                event_type = %dps.object.event_type,
                "device event is not a dps_change, ignoring"
            );
            return Ok(());
        }

        let Some(door) = self.registry.by_controller_id(&dps.location.id) else {
            tracing::warn!(controller_id = %dps.location.id, "no door mapping for dps event");
            return Ok(());
        };

        match dps.object.status.as_str() {
            "open" => self.devices.contact_open(&door.contact_id).await,
            "close" => self.devices.contact_closed(&door.contact_id).await,
            other => {
                tracing::error!(status = %other, "unknown door position status, ignoring");
                Ok(())
            }
        }
    }

    async fn route_hub_event(&self, event: &HubEvent) -> Result<(), BridgeError> {
        let content = &event.content;
        let Some((door, role)) = self.registry.by_hub_device(&content.device_id) else {
            tracing::warn!(device_id = %content.device_id, "no door mapping for hub device");
            return Ok(());
        };

        match role {
            DeviceRole::Switch => {
                if content.value == "on" {
                    self.doors.toggle_unlock(&door.controller_id).await
                } else {
                    Ok(())
                }
            }
            DeviceRole::Lock => match content.value.as_str() {
                "unlocked" => self.doors.hold_unlocked(&door.controller_id).await,
                "locked" => self.doors.restore_default(&door.controller_id).await,
                other => {
                    tracing::error!(device_id = %content.device_id, value = %other, "unknown lock value");
                    Ok(())
                }
            },
            // the contact sensor mirrors controller state and must never
            // drive it
            DeviceRole::Contact => Ok(()),
        }
    }
}

/// Render an error with its source chain for log output.
fn format_chain(err: &BridgeError) -> String {
    use std::error::Error;

    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
