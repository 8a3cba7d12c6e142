//! Controller-side door control — idempotent mutations of the physical
//! door.
//!
//! Mirrors the hub-side assertion pattern: fetch the current relay status
//! or lock rule first, compare, and only issue the mutating call when the
//! state actually differs from the target.

use std::sync::Arc;

use doorbridge_domain::error::BridgeError;

use crate::ports::ControllerApi;

/// Rule type that holds a door unlocked.
pub const RULE_KEEP_UNLOCK: &str = "keep_unlock";
/// Rule type that clears any override and restores default behaviour.
pub const RULE_RESET: &str = "reset";

/// Idempotent controller-side door mutations.
pub struct DoorControl<C> {
    controller: Arc<C>,
}

impl<C> Clone for DoorControl<C> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
        }
    }
}

impl<C: ControllerApi> DoorControl<C> {
    /// Create a new service backed by the given controller client.
    pub fn new(controller: Arc<C>) -> Self {
        Self { controller }
    }

    /// Trigger a momentary unlock unless the relay is already released.
    ///
    /// # Errors
    ///
    /// Returns an upstream error when the fetch or the unlock call fails.
    pub async fn toggle_unlock(&self, door_id: &str) -> Result<(), BridgeError> {
        let door = self.controller.fetch_door(door_id).await?;
        if door.door_lock_relay_status.as_deref() == Some("unlock") {
            tracing::debug!(door_id, "relay already released, skipping unlock");
            return Ok(());
        }
        self.controller.unlock_door(door_id).await?;
        Ok(())
    }

    /// Apply the `keep_unlock` rule unless it is already in effect.
    ///
    /// # Errors
    ///
    /// Returns an upstream error when the rule fetch or update fails.
    pub async fn hold_unlocked(&self, door_id: &str) -> Result<(), BridgeError> {
        let rule = self.controller.get_lock_rule(door_id).await?;
        if rule.rule_type == RULE_KEEP_UNLOCK {
            tracing::debug!(door_id, "keep_unlock rule already applied");
            return Ok(());
        }
        self.controller
            .set_lock_rule(door_id, RULE_KEEP_UNLOCK)
            .await?;
        Ok(())
    }

    /// Clear any rule override unless the default rule already applies.
    ///
    /// # Errors
    ///
    /// Returns an upstream error when the rule fetch or update fails.
    pub async fn restore_default(&self, door_id: &str) -> Result<(), BridgeError> {
        let rule = self.controller.get_lock_rule(door_id).await?;
        if rule.rule_type.is_empty() {
            tracing::debug!(door_id, "default rule already applied");
            return Ok(());
        }
        self.controller.set_lock_rule(door_id, RULE_RESET).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::LockRule;
    use crate::test_support::{StubController, door_snapshot};

    fn service(controller: &Arc<StubController>) -> DoorControl<StubController> {
        DoorControl::new(Arc::clone(controller))
    }

    #[tokio::test]
    async fn should_skip_unlock_when_relay_already_released() {
        let controller = Arc::new(StubController::default());
        controller.insert_door(door_snapshot("d1", Some("close"), Some("unlock")));

        service(&controller).toggle_unlock("d1").await.unwrap();

        assert!(controller.unlocks().is_empty());
    }

    #[tokio::test]
    async fn should_unlock_when_relay_engaged() {
        let controller = Arc::new(StubController::default());
        controller.insert_door(door_snapshot("d1", Some("close"), Some("lock")));

        service(&controller).toggle_unlock("d1").await.unwrap();

        assert_eq!(controller.unlocks(), vec!["d1".to_string()]);
    }

    #[tokio::test]
    async fn should_apply_keep_unlock_only_when_not_in_effect() {
        let controller = Arc::new(StubController::default());
        controller.set_rule("d1", LockRule::default());

        let svc = service(&controller);
        svc.hold_unlocked("d1").await.unwrap();
        assert_eq!(
            controller.rule_sets(),
            vec![("d1".to_string(), RULE_KEEP_UNLOCK.to_string())]
        );

        // second call sees the rule applied and does nothing
        svc.hold_unlocked("d1").await.unwrap();
        assert_eq!(controller.rule_sets().len(), 1);
    }

    #[tokio::test]
    async fn should_reset_rule_only_when_override_active() {
        let controller = Arc::new(StubController::default());
        controller.set_rule(
            "d1",
            LockRule {
                rule_type: RULE_KEEP_UNLOCK.to_string(),
                ended_time: 0.0,
            },
        );

        let svc = service(&controller);
        svc.restore_default("d1").await.unwrap();
        assert_eq!(
            controller.rule_sets(),
            vec![("d1".to_string(), RULE_RESET.to_string())]
        );

        svc.restore_default("d1").await.unwrap();
        assert_eq!(controller.rule_sets().len(), 1);
    }

    #[tokio::test]
    async fn should_propagate_upstream_error_for_unknown_door() {
        let controller = Arc::new(StubController::default());

        let result = service(&controller).toggle_unlock("missing").await;

        assert!(matches!(result, Err(BridgeError::Upstream(_))));
    }
}
