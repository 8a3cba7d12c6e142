//! Polling reconciler — startup snapshot plus periodic lock-rule drift
//! detection.
//!
//! The controller does not yet deliver lock-rule changes as webhook events,
//! so a single periodic task polls each door's rule and mirrors changes to
//! the hub lock device. This is a temporary workaround for that protocol
//! gap.
// TODO: drop the lock-rule polling once the controller includes rule
// changes in its webhook event stream.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use doorbridge_domain::door::DoorRegistry;
use doorbridge_domain::lock_rule::LockRuleState;

use crate::ports::{ControllerApi, HubApi};
use crate::services::device_assert::DeviceAssert;

/// Interval between drift-detection passes.
pub const POLL_PERIOD: Duration = Duration::from_secs(5);

/// Single-task reconciler for controller-side state.
///
/// The observation table is owned and mutated exclusively by this task, so
/// it needs no locking; entries start absent, which makes the first
/// observation after startup always count as a change.
pub struct Reconciler<C, H> {
    registry: Arc<DoorRegistry>,
    controller: Arc<C>,
    devices: DeviceAssert<H>,
    observations: HashMap<String, LockRuleState>,
}

impl<C, H> Reconciler<C, H>
where
    C: ControllerApi,
    H: HubApi,
{
    /// Create a reconciler over the given registry and clients.
    pub fn new(registry: Arc<DoorRegistry>, controller: Arc<C>, devices: DeviceAssert<H>) -> Self {
        Self {
            registry,
            controller,
            devices,
            observations: HashMap::new(),
        }
    }

    /// Run the reconciliation loop until `cancel` fires.
    ///
    /// Performs the startup snapshot once, then reconciles lock rules every
    /// [`POLL_PERIOD`]. Cancellation is observed at the tick boundary; an
    /// in-flight pass always completes.
    pub async fn run(mut self, cancel: CancellationToken) {
        self.snapshot_positions().await;

        let mut ticker = tokio::time::interval(POLL_PERIOD);
        // consume the immediately-ready first tick so the first drift pass
        // happens one full period after the snapshot
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("reconciler cancelled, exiting");
                    return;
                }
                _ = ticker.tick() => {
                    self.reconcile_lock_rules().await;
                }
            }
        }
    }

    /// Startup snapshot: mirror every door's reported physical position to
    /// its hub contact device, establishing known-good state before any
    /// webhook-driven updates.
    pub async fn snapshot_positions(&self) {
        let doors = match self.controller.fetch_all_doors().await {
            Ok(doors) => doors,
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch doors for startup snapshot");
                return;
            }
        };

        for snapshot in doors {
            let Some(door) = self.registry.by_controller_id(&snapshot.id) else {
                tracing::warn!(door_id = %snapshot.id, "controller door has no mapping, skipping");
                continue;
            };

            let result = match snapshot.door_position_status.as_deref() {
                Some("open") => self.devices.contact_open(&door.contact_id).await,
                Some("close") => self.devices.contact_closed(&door.contact_id).await,
                _ => continue,
            };

            if let Err(err) = result {
                tracing::error!(
                    door_id = %snapshot.id,
                    contact_id = %door.contact_id,
                    error = %err,
                    "failed to assert door contact from snapshot"
                );
            }
        }
    }

    /// One drift-detection pass over every door with a configured lock.
    pub async fn reconcile_lock_rules(&mut self) {
        for door in self.registry.doors() {
            let Some(lock_id) = &door.lock_id else {
                continue;
            };

            let rule = match self.controller.get_lock_rule(&door.controller_id).await {
                Ok(rule) => rule,
                Err(err) => {
                    tracing::error!(
                        door_id = %door.controller_id,
                        error = %err,
                        "failed to get door lock rule"
                    );
                    continue;
                }
            };

            let Some(observed) = LockRuleState::from_rule_type(&rule.rule_type) else {
                tracing::warn!(
                    door_id = %door.controller_id,
                    rule_type = %rule.rule_type,
                    "unknown door lock rule type, skipping"
                );
                continue;
            };

            if self.observations.get(&door.controller_id) == Some(&observed) {
                continue;
            }

            let result = match observed {
                LockRuleState::Locked => self.devices.lock_locked(lock_id).await,
                LockRuleState::Unlocked => self.devices.lock_unlocked(lock_id).await,
            };

            if let Err(err) = result {
                tracing::error!(
                    door_id = %door.controller_id,
                    lock_id = %lock_id,
                    state = %observed,
                    error = %err,
                    "failed to assert hub lock state"
                );
            }

            // recorded even when the assertion failed: failed actions are
            // dropped, not retried
            self.observations.insert(door.controller_id.clone(), observed);
        }
    }
}
