//! Inbound events from both origin systems.
//!
//! Controller events arrive as an opaque envelope `{event, event_object_id,
//! data}` and are decoded into one tagged variant per recognised kind at the
//! system boundary, before they reach the router. Unrecognised kinds are
//! preserved as [`ControllerEvent::Unknown`] so the router can log and drop
//! them without a response-level error.

use serde::Deserialize;

use crate::error::ValidationError;

/// Controller event kind for door-position changes.
pub const EVENT_DPS_STATUS: &str = "access.device.dps_status";
/// Controller event kind for door-unlock results.
pub const EVENT_DOOR_UNLOCK: &str = "access.door.unlock";

/// Wire envelope of an Access Controller webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerEnvelope {
    /// Event kind, e.g. `access.door.unlock`.
    pub event: String,
    /// Identifier of the object the event refers to.
    #[serde(default)]
    pub event_object_id: Option<String>,
    /// Kind-specific payload, decoded per variant.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A decoded Access Controller event.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// Someone (or something) attempted to unlock a door.
    DoorUnlock(DoorUnlock),
    /// A door-position sensor reported a change.
    DoorPositionStatus(DoorPositionStatus),
    /// An event kind this middleware does not handle.
    Unknown {
        /// The unrecognised event kind.
        event: String,
    },
}

/// Payload of an `access.door.unlock` event.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorUnlock {
    /// Door location the unlock applies to.
    pub location: Location,
    /// Who triggered the unlock.
    pub actor: Actor,
    /// Result object carrying the access decision.
    pub object: UnlockResult,
}

/// Payload of an `access.device.dps_status` event.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorPositionStatus {
    /// Door location the status applies to.
    pub location: Location,
    /// Sub-event type and reported position.
    pub object: PositionObject,
}

/// Door location reference inside a controller event.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    /// Controller-side door id.
    pub id: String,
}

/// Actor that triggered a controller event.
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    /// Display name of the actor.
    #[serde(default)]
    pub name: String,
    /// Actor category, e.g. `user` or `open-api`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Access decision carried by an unlock event.
#[derive(Debug, Clone, Deserialize)]
pub struct UnlockResult {
    /// Decision string, `Access Granted` on success.
    #[serde(default)]
    pub result: String,
}

/// Sub-event type and position reported by a dps event.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionObject {
    /// Sub-event discriminator; only `dps_change` is acted on.
    #[serde(default)]
    pub event_type: String,
    /// Reported position, `open` or `close`.
    #[serde(default)]
    pub status: String,
}

impl ControllerEvent {
    /// Decode an envelope into a tagged event.
    ///
    /// Unrecognised kinds become [`ControllerEvent::Unknown`]; a recognised
    /// kind whose payload does not deserialize is a validation error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedPayload`] when `data` does not
    /// match the schema of a recognised event kind.
    pub fn from_envelope(envelope: ControllerEnvelope) -> Result<Self, ValidationError> {
        match envelope.event.as_str() {
            EVENT_DOOR_UNLOCK => serde_json::from_value(envelope.data)
                .map(Self::DoorUnlock)
                .map_err(|source| ValidationError::MalformedPayload {
                    event: envelope.event,
                    source,
                }),
            EVENT_DPS_STATUS => serde_json::from_value(envelope.data)
                .map(Self::DoorPositionStatus)
                .map_err(|source| ValidationError::MalformedPayload {
                    event: envelope.event,
                    source,
                }),
            _ => Ok(Self::Unknown {
                event: envelope.event,
            }),
        }
    }

    /// The event kind as reported on the wire.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::DoorUnlock(_) => EVENT_DOOR_UNLOCK,
            Self::DoorPositionStatus(_) => EVENT_DPS_STATUS,
            Self::Unknown { event } => event,
        }
    }
}

/// A Home Automation Hub webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct HubEvent {
    /// The single event record the hub posts per state change.
    pub content: HubEventContent,
}

/// Body of a hub event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubEventContent {
    /// Attribute name, e.g. `switch` or `lock`.
    #[serde(default)]
    pub name: String,
    /// New attribute value, e.g. `on` or `locked`.
    #[serde(default)]
    pub value: String,
    /// Human-readable device label.
    #[serde(default)]
    pub display_name: String,
    /// Hub device id the event belongs to.
    pub device_id: String,
    /// Free-form description of the change.
    #[serde(default)]
    pub description_text: String,
    /// Unit of the value, when numeric.
    #[serde(default)]
    pub unit: serde_json::Value,
    /// Event source type as reported by the hub.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Extra payload, unused by this middleware.
    #[serde(default)]
    pub data: serde_json::Value,
}
