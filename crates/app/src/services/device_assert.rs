//! Device state assertion — the idempotent convergence primitive for the
//! hub side.
//!
//! Every hub-side mutation goes through [`DeviceAssert::assert`]: fetch the
//! device's current state, short-circuit when the attribute already holds
//! the desired value, and only then issue the command. Skipping the command
//! on equality is the idempotence guarantee that prevents duplicate
//! physical actuation (redundant relay clicks).

use std::sync::Arc;

use doorbridge_domain::error::{BridgeError, ConfigurationError};

use crate::ports::HubApi;

/// Idempotent "ensure hub attribute equals X" service.
pub struct DeviceAssert<H> {
    hub: Arc<H>,
}

impl<H> Clone for DeviceAssert<H> {
    fn clone(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
        }
    }
}

impl<H: HubApi> DeviceAssert<H> {
    /// Create a new service backed by the given hub client.
    pub fn new(hub: Arc<H>) -> Self {
        Self { hub }
    }

    /// Ensure `attribute` of `device_id` equals `desired`, issuing `command`
    /// at most once.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the device lacks `capability` or
    /// `command` (a mapping mistake, not retried), or an upstream error when
    /// the fetch or the command fails.
    pub async fn assert(
        &self,
        device_id: &str,
        capability: &str,
        command: &str,
        attribute: &str,
        desired: &str,
    ) -> Result<(), BridgeError> {
        let info = self.hub.device_info(device_id).await?;

        if !info.has_capability(capability) {
            return Err(ConfigurationError::MissingCapability {
                device_id: device_id.to_string(),
                capability: capability.to_string(),
            }
            .into());
        }
        if !info.has_command(command) {
            return Err(ConfigurationError::MissingCommand {
                device_id: device_id.to_string(),
                command: command.to_string(),
            }
            .into());
        }

        if info.attribute_value(attribute) == Some(desired) {
            tracing::debug!(device_id, attribute, desired, "already in desired state");
            return Ok(());
        }

        self.hub.send_command(device_id, command, None).await?;
        Ok(())
    }

    /// Ensure a contact sensor reports `open`.
    ///
    /// # Errors
    ///
    /// See [`DeviceAssert::assert`].
    pub async fn contact_open(&self, device_id: &str) -> Result<(), BridgeError> {
        self.assert(device_id, "ContactSensor", "open", "contact", "open")
            .await
    }

    /// Ensure a contact sensor reports `close`.
    ///
    /// # Errors
    ///
    /// See [`DeviceAssert::assert`].
    pub async fn contact_closed(&self, device_id: &str) -> Result<(), BridgeError> {
        self.assert(device_id, "ContactSensor", "close", "contact", "close")
            .await
    }

    /// Ensure a lock device reports `unlocked`.
    ///
    /// # Errors
    ///
    /// See [`DeviceAssert::assert`].
    pub async fn lock_unlocked(&self, device_id: &str) -> Result<(), BridgeError> {
        self.assert(device_id, "Lock", "unlock", "lock", "unlocked")
            .await
    }

    /// Ensure a lock device reports `locked`.
    ///
    /// # Errors
    ///
    /// See [`DeviceAssert::assert`].
    pub async fn lock_locked(&self, device_id: &str) -> Result<(), BridgeError> {
        self.assert(device_id, "Lock", "lock", "lock", "locked").await
    }

    /// Ensure a switch device reports `on`.
    ///
    /// # Errors
    ///
    /// See [`DeviceAssert::assert`].
    pub async fn switch_on(&self, device_id: &str) -> Result<(), BridgeError> {
        self.assert(device_id, "Switch", "on", "switch", "on").await
    }

    /// Ensure a switch device reports `off`.
    ///
    /// # Errors
    ///
    /// See [`DeviceAssert::assert`].
    pub async fn switch_off(&self, device_id: &str) -> Result<(), BridgeError> {
        self.assert(device_id, "Switch", "off", "switch", "off").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubHub, switch_device};

    fn service(hub: &Arc<StubHub>) -> DeviceAssert<StubHub> {
        DeviceAssert::new(Arc::clone(hub))
    }

    #[tokio::test]
    async fn should_issue_no_command_when_attribute_already_matches() {
        let hub = Arc::new(StubHub::default());
        hub.insert(switch_device("s1", "on"));

        service(&hub).switch_on("s1").await.unwrap();

        assert!(hub.commands().is_empty());
    }

    #[tokio::test]
    async fn should_issue_exactly_one_command_when_state_differs() {
        let hub = Arc::new(StubHub::default());
        hub.insert(switch_device("s1", "off"));

        service(&hub).switch_on("s1").await.unwrap();

        assert_eq!(
            hub.commands(),
            vec![("s1".to_string(), "on".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn should_fail_with_configuration_error_when_capability_missing() {
        let hub = Arc::new(StubHub::default());
        hub.insert(switch_device("s1", "off"));

        let result = service(&hub).lock_locked("s1").await;

        assert!(matches!(
            result,
            Err(BridgeError::Configuration(
                ConfigurationError::MissingCapability { .. }
            ))
        ));
        assert!(hub.commands().is_empty());
    }

    #[tokio::test]
    async fn should_fail_with_configuration_error_when_command_missing() {
        let hub = Arc::new(StubHub::default());
        let mut device = switch_device("s1", "off");
        device.commands.retain(|cmd| cmd != "on");
        hub.insert(device);

        let result = service(&hub).switch_on("s1").await;

        assert!(matches!(
            result,
            Err(BridgeError::Configuration(
                ConfigurationError::MissingCommand { .. }
            ))
        ));
        assert!(hub.commands().is_empty());
    }

    #[tokio::test]
    async fn should_propagate_upstream_error_when_device_unknown() {
        let hub = Arc::new(StubHub::default());

        let result = service(&hub).switch_on("missing").await;

        assert!(matches!(result, Err(BridgeError::Upstream(_))));
    }
}
