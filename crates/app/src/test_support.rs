//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use doorbridge_domain::door::{Door, DoorRegistry};
use doorbridge_domain::error::{UpstreamError, UpstreamSystem};

use crate::ports::{
    ControllerApi, DeviceInfo, DoorSnapshot, HubApi, LockRule, WebhookEndpoint, WebhookSpec,
};

/// Registry with two doors: `d1` (contact `c1`, lock `l1`, switch `s1`) and
/// `d2` (contact `c2`, no lock, switch `s2`).
pub(crate) fn registry() -> DoorRegistry {
    DoorRegistry::new(vec![
        Door {
            controller_id: "d1".to_string(),
            contact_id: "c1".to_string(),
            lock_id: Some("l1".to_string()),
            switch_id: "s1".to_string(),
        },
        Door {
            controller_id: "d2".to_string(),
            contact_id: "c2".to_string(),
            lock_id: None,
            switch_id: "s2".to_string(),
        },
    ])
    .unwrap()
}

pub(crate) fn switch_device(id: &str, current: &str) -> DeviceInfo {
    hub_device(id, "Switch", &["on", "off"], "switch", current)
}

pub(crate) fn contact_device(id: &str, current: &str) -> DeviceInfo {
    hub_device(id, "ContactSensor", &["open", "close"], "contact", current)
}

pub(crate) fn lock_device(id: &str, current: &str) -> DeviceInfo {
    hub_device(id, "Lock", &["lock", "unlock"], "lock", current)
}

fn hub_device(
    id: &str,
    capability: &str,
    commands: &[&str],
    attribute: &str,
    current: &str,
) -> DeviceInfo {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "attributes": [{"name": attribute, "currentValue": current}],
        "capabilities": [capability],
        "commands": commands,
    }))
    .unwrap()
}

pub(crate) fn door_snapshot(
    id: &str,
    position: Option<&str>,
    relay: Option<&str>,
) -> DoorSnapshot {
    DoorSnapshot {
        id: id.to_string(),
        name: id.to_string(),
        full_name: format!("Floor - {id}"),
        door_position_status: position.map(ToString::to_string),
        door_lock_relay_status: relay.map(ToString::to_string),
    }
}

fn not_found(system: UpstreamSystem) -> UpstreamError {
    UpstreamError::Status {
        system,
        status: 404,
    }
}

/// Recording hub stub; unknown devices yield an upstream 404.
#[derive(Default)]
pub(crate) struct StubHub {
    devices: Mutex<HashMap<String, DeviceInfo>>,
    fetches: Mutex<Vec<String>>,
    commands: Mutex<Vec<(String, String, Option<String>)>>,
}

impl StubHub {
    pub(crate) fn insert(&self, info: DeviceInfo) {
        self.devices.lock().unwrap().insert(info.id.clone(), info);
    }

    pub(crate) fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub(crate) fn commands(&self) -> Vec<(String, String, Option<String>)> {
        self.commands.lock().unwrap().clone()
    }
}

impl HubApi for StubHub {
    async fn device_info(&self, device_id: &str) -> Result<DeviceInfo, UpstreamError> {
        self.fetches.lock().unwrap().push(device_id.to_string());
        self.devices
            .lock()
            .unwrap()
            .get(device_id)
            .cloned()
            .ok_or_else(|| not_found(UpstreamSystem::Hub))
    }

    async fn send_command(
        &self,
        device_id: &str,
        command: &str,
        secondary: Option<&str>,
    ) -> Result<(), UpstreamError> {
        self.commands.lock().unwrap().push((
            device_id.to_string(),
            command.to_string(),
            secondary.map(ToString::to_string),
        ));
        Ok(())
    }
}

/// Recording controller stub backed by in-memory doors, rules, and
/// webhooks. Applying a rule updates the stored rule so idempotence
/// round-trips behave like the real API.
#[derive(Default)]
pub(crate) struct StubController {
    doors: Mutex<HashMap<String, DoorSnapshot>>,
    rules: Mutex<HashMap<String, LockRule>>,
    webhooks: Mutex<Vec<WebhookEndpoint>>,
    door_fetches: Mutex<Vec<String>>,
    unlocks: Mutex<Vec<String>>,
    rule_gets: Mutex<Vec<String>>,
    rule_sets: Mutex<Vec<(String, String)>>,
    created: Mutex<Vec<WebhookSpec>>,
    updated: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl StubController {
    pub(crate) fn insert_door(&self, snapshot: DoorSnapshot) {
        self.doors
            .lock()
            .unwrap()
            .insert(snapshot.id.clone(), snapshot);
    }

    pub(crate) fn set_rule(&self, door_id: &str, rule: LockRule) {
        self.rules.lock().unwrap().insert(door_id.to_string(), rule);
    }

    pub(crate) fn insert_webhook(&self, hook: WebhookEndpoint) {
        self.webhooks.lock().unwrap().push(hook);
    }

    pub(crate) fn door_fetches(&self) -> Vec<String> {
        self.door_fetches.lock().unwrap().clone()
    }

    pub(crate) fn unlocks(&self) -> Vec<String> {
        self.unlocks.lock().unwrap().clone()
    }

    pub(crate) fn rule_gets(&self) -> Vec<String> {
        self.rule_gets.lock().unwrap().clone()
    }

    pub(crate) fn rule_sets(&self) -> Vec<(String, String)> {
        self.rule_sets.lock().unwrap().clone()
    }

    pub(crate) fn created_webhooks(&self) -> Vec<WebhookSpec> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn updated_webhooks(&self) -> Vec<String> {
        self.updated.lock().unwrap().clone()
    }

    fn endpoint_from(spec: &WebhookSpec, id: &str) -> WebhookEndpoint {
        WebhookEndpoint {
            id: Some(id.to_string()),
            name: spec.name.clone(),
            endpoint: spec.endpoint.clone(),
            secret: Some("stub-secret".to_string()),
            events: spec.events.clone(),
            headers: spec.headers.clone(),
        }
    }
}

impl ControllerApi for StubController {
    async fn fetch_all_doors(&self) -> Result<Vec<DoorSnapshot>, UpstreamError> {
        let mut doors: Vec<DoorSnapshot> = self.doors.lock().unwrap().values().cloned().collect();
        doors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(doors)
    }

    async fn fetch_door(&self, door_id: &str) -> Result<DoorSnapshot, UpstreamError> {
        self.door_fetches.lock().unwrap().push(door_id.to_string());
        self.doors
            .lock()
            .unwrap()
            .get(door_id)
            .cloned()
            .ok_or_else(|| not_found(UpstreamSystem::Controller))
    }

    async fn unlock_door(&self, door_id: &str) -> Result<(), UpstreamError> {
        self.unlocks.lock().unwrap().push(door_id.to_string());
        Ok(())
    }

    async fn get_lock_rule(&self, door_id: &str) -> Result<LockRule, UpstreamError> {
        self.rule_gets.lock().unwrap().push(door_id.to_string());
        self.rules
            .lock()
            .unwrap()
            .get(door_id)
            .cloned()
            .ok_or_else(|| not_found(UpstreamSystem::Controller))
    }

    async fn set_lock_rule(&self, door_id: &str, rule_type: &str) -> Result<(), UpstreamError> {
        self.rule_sets
            .lock()
            .unwrap()
            .push((door_id.to_string(), rule_type.to_string()));
        let applied = if rule_type == "reset" { "" } else { rule_type };
        self.rules.lock().unwrap().insert(
            door_id.to_string(),
            LockRule {
                rule_type: applied.to_string(),
                ended_time: 0.0,
            },
        );
        Ok(())
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookEndpoint>, UpstreamError> {
        Ok(self.webhooks.lock().unwrap().clone())
    }

    async fn create_webhook(&self, spec: &WebhookSpec) -> Result<WebhookEndpoint, UpstreamError> {
        self.created.lock().unwrap().push(spec.clone());
        let hook = Self::endpoint_from(spec, "wh-created");
        self.webhooks.lock().unwrap().push(hook.clone());
        Ok(hook)
    }

    async fn update_webhook(
        &self,
        webhook_id: &str,
        spec: &WebhookSpec,
    ) -> Result<WebhookEndpoint, UpstreamError> {
        self.updated.lock().unwrap().push(webhook_id.to_string());
        Ok(Self::endpoint_from(spec, webhook_id))
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<(), UpstreamError> {
        self.deleted.lock().unwrap().push(webhook_id.to_string());
        self.webhooks
            .lock()
            .unwrap()
            .retain(|hook| hook.id.as_deref() != Some(webhook_id));
        Ok(())
    }
}
