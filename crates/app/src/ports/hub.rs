//! Home Automation Hub port — device info fetch and command issuance.

use std::future::Future;

use serde::Deserialize;

use doorbridge_domain::error::UpstreamError;

/// One attribute of a hub device.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAttribute {
    /// Attribute name, e.g. `switch`, `contact`, `lock`.
    pub name: String,
    /// Current value; the hub reports strings for the attributes this
    /// middleware drives but numbers for others, hence the loose type.
    #[serde(rename = "currentValue", default)]
    pub current_value: serde_json::Value,
}

/// Capabilities, supported commands, and attribute values of a hub device.
///
/// Always fetched fresh before an assertion — never cached — so that the
/// idempotence check acts on current state.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    /// Hub device id.
    pub id: String,
    /// Current attribute values.
    #[serde(default)]
    pub attributes: Vec<DeviceAttribute>,
    /// Capability set; the hub mixes plain strings with structured entries,
    /// only the strings are meaningful here.
    #[serde(default)]
    pub capabilities: Vec<serde_json::Value>,
    /// Supported command names.
    #[serde(default)]
    pub commands: Vec<String>,
}

impl DeviceInfo {
    /// Whether the device advertises the given capability.
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities
            .iter()
            .any(|cap| cap.as_str() == Some(capability))
    }

    /// Whether the device supports the given command.
    #[must_use]
    pub fn has_command(&self, command: &str) -> bool {
        self.commands.iter().any(|cmd| cmd == command)
    }

    /// Current string value of the named attribute, if any.
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .and_then(|attr| attr.current_value.as_str())
    }
}

/// Outbound REST surface of the Home Automation Hub.
pub trait HubApi: Send + Sync {
    /// Fetch capabilities, commands, and attribute values of a device.
    fn device_info(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<DeviceInfo, UpstreamError>> + Send;

    /// Issue a command to a device, with an optional secondary value
    /// appended to the command path.
    fn send_command(
        &self,
        device_id: &str,
        command: &str,
        secondary: Option<&str>,
    ) -> impl Future<Output = Result<(), UpstreamError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_device_info_with_mixed_capabilities() {
        let info: DeviceInfo = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "attributes": [
                {"name": "switch", "currentValue": "off", "dataType": "ENUM"},
                {"name": "level", "currentValue": 42, "dataType": "NUMBER"}
            ],
            "capabilities": ["Switch", {"attributes": [{"name": "switch"}]}],
            "commands": ["on", "off"]
        }))
        .unwrap();

        assert!(info.has_capability("Switch"));
        assert!(!info.has_capability("Lock"));
        assert!(info.has_command("on"));
        assert!(!info.has_command("lock"));
        assert_eq!(info.attribute_value("switch"), Some("off"));
        // non-string values are not comparable to desired string states
        assert_eq!(info.attribute_value("level"), None);
        assert_eq!(info.attribute_value("missing"), None);
    }
}
