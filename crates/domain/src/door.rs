//! Door mappings — the static correspondence between one Access Controller
//! door and up to three Home Automation Hub devices.
//!
//! The registry is built once at startup and never mutated afterwards, so
//! concurrent reads from the listener, per-event tasks, and the reconciler
//! need no synchronisation.

use crate::error::ConfigurationError;

/// One configured door mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    /// Door identifier on the Access Controller.
    pub controller_id: String,
    /// Hub contact-sensor device mirroring the physical door position.
    pub contact_id: String,
    /// Hub lock device mirroring the door's lock rule, if configured.
    pub lock_id: Option<String>,
    /// Hub switch device that triggers a momentary unlock.
    pub switch_id: String,
}

/// Which of a door's hub device slots a device id matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    /// Contact sensor — mirrors controller state, never drives it.
    Contact,
    /// Lock — drives the controller's lock rule.
    Lock,
    /// Switch — drives a momentary unlock.
    Switch,
}

impl std::fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contact => f.write_str("contact"),
            Self::Lock => f.write_str("lock"),
            Self::Switch => f.write_str("switch"),
        }
    }
}

/// Read-only collection of all configured door mappings.
#[derive(Debug, Clone)]
pub struct DoorRegistry {
    doors: Vec<Door>,
}

impl DoorRegistry {
    /// Build a registry, enforcing the mapping invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateControllerId`] when two doors
    /// share a controller id, or [`ConfigurationError::DuplicateHubDevice`]
    /// when one hub device id appears in more than one slot.
    pub fn new(doors: Vec<Door>) -> Result<Self, ConfigurationError> {
        let mut controller_ids = std::collections::HashSet::new();
        let mut hub_ids = std::collections::HashSet::new();

        for door in &doors {
            if !controller_ids.insert(door.controller_id.as_str()) {
                return Err(ConfigurationError::DuplicateControllerId {
                    controller_id: door.controller_id.clone(),
                });
            }

            let mut slots = vec![door.contact_id.as_str(), door.switch_id.as_str()];
            if let Some(lock_id) = &door.lock_id {
                slots.push(lock_id.as_str());
            }
            for id in slots {
                if !hub_ids.insert(id) {
                    return Err(ConfigurationError::DuplicateHubDevice {
                        device_id: id.to_string(),
                    });
                }
            }
        }

        Ok(Self { doors })
    }

    /// Look up a door by its controller-side id.
    #[must_use]
    pub fn by_controller_id(&self, controller_id: &str) -> Option<&Door> {
        self.doors
            .iter()
            .find(|door| door.controller_id == controller_id)
    }

    /// Look up a door and the slot role by a hub device id.
    #[must_use]
    pub fn by_hub_device(&self, device_id: &str) -> Option<(&Door, DeviceRole)> {
        for door in &self.doors {
            if door.contact_id == device_id {
                return Some((door, DeviceRole::Contact));
            }
            if door.lock_id.as_deref() == Some(device_id) {
                return Some((door, DeviceRole::Lock));
            }
            if door.switch_id == device_id {
                return Some((door, DeviceRole::Switch));
            }
        }
        None
    }

    /// All configured doors, in configuration order.
    #[must_use]
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// Number of configured doors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.doors.len()
    }

    /// Whether no doors are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }
}
