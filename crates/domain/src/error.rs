//! Error taxonomy shared across the workspace.
//!
//! Each layer produces one of the four top-level kinds:
//! - [`AuthenticationError`] — request rejected, no side effect
//! - [`ValidationError`] — event logged and dropped, no outbound call
//! - [`UpstreamError`] — external API failure, operation aborted, not retried
//! - [`ConfigurationError`] — fatal at startup
//!
//! There is no structured retry/backoff anywhere: a failed action is logged
//! with context and dropped.

/// Top-level error type, composed from the typed kinds below via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Bad token or signature on an inbound request.
    #[error("authentication failed")]
    Authentication(#[from] AuthenticationError),
    /// Malformed payload, unknown event kind, or unknown door/device.
    #[error("validation failed")]
    Validation(#[from] ValidationError),
    /// Non-success response or transport failure from an external API.
    #[error("upstream call failed")]
    Upstream(#[from] UpstreamError),
    /// Invalid configuration or missing remote capability.
    #[error("invalid configuration")]
    Configuration(#[from] ConfigurationError),
}

/// Inbound request could not be authenticated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The shared token did not match.
    #[error("invalid auth token")]
    InvalidToken,
    /// The signed payload could not be verified.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Outcome of verifying a signed webhook payload.
///
/// The four kinds are deliberately distinct: a missing header, an
/// unparseable header, a header carrying no signature of a known version,
/// and a digest that simply does not match are different failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The request carried no `Signature` header at all.
    #[error("webhook has no signature header")]
    Missing,
    /// The header could not be parsed into `key=value` pairs.
    #[error("webhook has an invalid signature header")]
    InvalidHeader,
    /// No signature of a known version was present in the header.
    #[error("webhook had no valid signature")]
    NoValidSignature,
    /// A signature was present but the computed digest differs.
    #[error("webhook signature does not match payload")]
    Mismatch,
}

/// An inbound event could not be validated; it is logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The event payload for a recognised kind did not deserialize.
    #[error("malformed payload for event `{event}`")]
    MalformedPayload {
        /// Event kind as reported by the origin system.
        event: String,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },
    /// No configured door matches the controller door id.
    #[error("no door mapping for controller door `{controller_id}`")]
    UnknownDoor {
        /// Controller-side door identifier.
        controller_id: String,
    },
    /// No configured door slot matches the hub device id.
    #[error("no door mapping for hub device `{device_id}`")]
    UnknownDevice {
        /// Hub-side device identifier.
        device_id: String,
    },
    /// A recognised event carried a value outside its expected set.
    #[error("unexpected {field} value `{value}`")]
    UnexpectedValue {
        /// Which field carried the value.
        field: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Which external system an upstream failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamSystem {
    /// The physical access-control platform.
    Controller,
    /// The home-automation hub.
    Hub,
}

impl std::fmt::Display for UpstreamSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controller => f.write_str("controller"),
            Self::Hub => f.write_str("hub"),
        }
    }
}

/// A call to one of the external APIs failed.
///
/// These are never retried; the owning operation aborts and the process
/// continues.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Application-level error: the wrapped response carried a non-success
    /// code even though the transport succeeded.
    #[error("{system} API returned code `{code}`: {msg}")]
    Api {
        /// Origin of the failure.
        system: UpstreamSystem,
        /// Application-level response code.
        code: String,
        /// Human-readable message from the response.
        msg: String,
    },
    /// Unexpected HTTP status from the external API.
    #[error("{system} returned unexpected HTTP status {status}")]
    Status {
        /// Origin of the failure.
        system: UpstreamSystem,
        /// HTTP status code received.
        status: u16,
    },
    /// The response body could not be decoded.
    #[error("{system} response could not be decoded")]
    Decode {
        /// Origin of the failure.
        system: UpstreamSystem,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The request never produced a usable response.
    #[error("{system} request failed")]
    Transport {
        /// Origin of the failure.
        system: UpstreamSystem,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Fatal startup or capability error; the process exits with status 1 when
/// one of these surfaces during startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Two doors share the same controller door id.
    #[error("duplicate controller door id `{controller_id}` in door mappings")]
    DuplicateControllerId {
        /// The duplicated id.
        controller_id: String,
    },
    /// One hub device id appears in more than one door slot.
    #[error("hub device `{device_id}` is mapped to more than one door slot")]
    DuplicateHubDevice {
        /// The duplicated id.
        device_id: String,
    },
    /// A hub device does not expose the capability an assertion requires.
    #[error("device `{device_id}` does not have the `{capability}` capability")]
    MissingCapability {
        /// Hub device id.
        device_id: String,
        /// Required capability name.
        capability: String,
    },
    /// A hub device does not support the command an assertion requires.
    #[error("device `{device_id}` does not support the `{command}` command")]
    MissingCommand {
        /// Hub device id.
        device_id: String,
        /// Required command name.
        command: String,
    },
    /// An existing webhook registration matched by name but carried no id,
    /// so it cannot be updated in place.
    #[error("webhook registration `{name}` carries no id")]
    MissingWebhookId {
        /// Registration name as reported by the controller.
        name: String,
    },
    /// The webhook registration returned by the controller carried no
    /// signing secret, so inbound events could never be verified.
    #[error("webhook registration `{webhook_id}` carries no signing secret")]
    MissingWebhookSecret {
        /// Remote registration id.
        webhook_id: String,
    },
    /// An HTTP client could not be constructed.
    #[error("failed to construct HTTP client")]
    HttpClient(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_upstream_api_error_with_system_and_code() {
        let err = UpstreamError::Api {
            system: UpstreamSystem::Controller,
            code: "CODE_UNAUTHORIZED".to_string(),
            msg: "invalid token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "controller API returned code `CODE_UNAUTHORIZED`: invalid token"
        );
    }

    #[test]
    fn should_convert_signature_error_into_authentication_error() {
        let err: AuthenticationError = SignatureError::Mismatch.into();
        assert_eq!(
            err,
            AuthenticationError::Signature(SignatureError::Mismatch)
        );
    }

    #[test]
    fn should_wrap_validation_error_in_bridge_error() {
        let err: BridgeError = ValidationError::UnknownDoor {
            controller_id: "d1".to_string(),
        }
        .into();
        assert!(matches!(err, BridgeError::Validation(_)));
    }
}
