//! Outbound REST client for the Access Controller.
//!
//! The controller wraps every response body as `{code, msg, data}` and
//! signals application-level failure through `code`, independently of the
//! HTTP status. This client unwraps that envelope once, in one place, and
//! surfaces both failure kinds as [`UpstreamError`].
//!
//! The controller terminates TLS with a self-signed certificate on the
//! local network, so certificate verification is disabled for this client
//! only.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use doorbridge_app::ports::{ControllerApi, DoorSnapshot, LockRule, WebhookEndpoint, WebhookSpec};
use doorbridge_domain::error::{ConfigurationError, UpstreamError, UpstreamSystem};

/// Path prefix of the controller's developer API.
const API_PREFIX: &str = "/api/v1/developer";
/// Application-level code of a successful response.
const CODE_SUCCESS: &str = "SUCCESS";
/// Requests that take longer than this are aborted.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wrapped response body returned by every controller endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl Envelope {
    /// Extract the payload, turning a non-success code into an
    /// [`UpstreamError::Api`].
    fn into_data<T: DeserializeOwned>(self) -> Result<T, UpstreamError> {
        if self.code != CODE_SUCCESS {
            return Err(UpstreamError::Api {
                system: UpstreamSystem::Controller,
                code: self.code,
                msg: self.msg,
            });
        }
        serde_json::from_value(self.data).map_err(|err| UpstreamError::Decode {
            system: UpstreamSystem::Controller,
            source: Box::new(err),
        })
    }
}

/// REST client implementing [`ControllerApi`].
pub struct ControllerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ControllerClient {
    /// Build a client for the controller at `base_url`, authenticating
    /// every request with `api_key` as a bearer token.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| ConfigurationError::HttpClient(Box::new(err)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Send a prepared request and unwrap the controller envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, UpstreamError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| UpstreamError::Transport {
                system: UpstreamSystem::Controller,
                source: Box::new(err),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                system: UpstreamSystem::Controller,
                status: status.as_u16(),
            });
        }

        let envelope: Envelope =
            response
                .json()
                .await
                .map_err(|err| UpstreamError::Decode {
                    system: UpstreamSystem::Controller,
                    source: Box::new(err),
                })?;
        envelope.into_data()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        self.execute(self.client.get(self.url(path))).await
    }

    async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, UpstreamError> {
        let mut request = self.client.put(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute(request).await
    }
}

impl ControllerApi for ControllerClient {
    async fn fetch_all_doors(&self) -> Result<Vec<DoorSnapshot>, UpstreamError> {
        self.get("/doors").await
    }

    async fn fetch_door(&self, door_id: &str) -> Result<DoorSnapshot, UpstreamError> {
        self.get(&format!("/doors/{door_id}")).await
    }

    async fn unlock_door(&self, door_id: &str) -> Result<(), UpstreamError> {
        tracing::debug!(door_id, "requesting remote door unlock");
        self.put::<serde_json::Value>(&format!("/doors/{door_id}/unlock"), None)
            .await?;
        Ok(())
    }

    async fn get_lock_rule(&self, door_id: &str) -> Result<LockRule, UpstreamError> {
        self.get(&format!("/doors/{door_id}/lock_rule")).await
    }

    async fn set_lock_rule(&self, door_id: &str, rule_type: &str) -> Result<(), UpstreamError> {
        tracing::debug!(door_id, rule_type, "setting remote lock rule");
        let body = serde_json::json!({ "type": rule_type });
        self.put::<serde_json::Value>(&format!("/doors/{door_id}/lock_rule"), Some(&body))
            .await?;
        Ok(())
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookEndpoint>, UpstreamError> {
        self.get("/webhooks/endpoints").await
    }

    async fn create_webhook(&self, spec: &WebhookSpec) -> Result<WebhookEndpoint, UpstreamError> {
        self.execute(
            self.client
                .post(self.url("/webhooks/endpoints"))
                .json(spec),
        )
        .await
    }

    async fn update_webhook(
        &self,
        webhook_id: &str,
        spec: &WebhookSpec,
    ) -> Result<WebhookEndpoint, UpstreamError> {
        self.execute(
            self.client
                .put(self.url(&format!("/webhooks/endpoints/{webhook_id}")))
                .json(spec),
        )
        .await
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<(), UpstreamError> {
        self.execute::<serde_json::Value>(
            self.client
                .delete(self.url(&format!("/webhooks/endpoints/{webhook_id}"))),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_unwrap_success_envelope_into_typed_data() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "code": "SUCCESS",
            "msg": "success",
            "data": [
                {
                    "id": "d1",
                    "name": "Front",
                    "full_name": "1F Front",
                    "door_position_status": "close",
                    "door_lock_relay_status": "lock"
                }
            ]
        }))
        .unwrap();

        let doors: Vec<DoorSnapshot> = envelope.into_data().unwrap();
        assert_eq!(doors.len(), 1);
        assert_eq!(doors[0].id, "d1");
        assert_eq!(doors[0].door_position_status.as_deref(), Some("close"));
    }

    #[test]
    fn should_surface_non_success_code_as_api_error() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "code": "CODE_UNAUTHORIZED",
            "msg": "invalid token",
            "data": null
        }))
        .unwrap();

        let err = envelope.into_data::<serde_json::Value>().unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Api { system: UpstreamSystem::Controller, ref code, .. }
                if code == "CODE_UNAUTHORIZED"
        ));
    }

    #[test]
    fn should_surface_mismatched_data_as_decode_error() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "code": "SUCCESS",
            "data": {"id": "d1"}
        }))
        .unwrap();

        let err = envelope.into_data::<Vec<DoorSnapshot>>().unwrap_err();
        assert!(matches!(err, UpstreamError::Decode { .. }));
    }

    #[test]
    fn should_tolerate_envelope_without_msg_or_data() {
        let envelope: Envelope =
            serde_json::from_value(serde_json::json!({"code": "SUCCESS"})).unwrap();

        let value: serde_json::Value = envelope.into_data().unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn should_decode_lock_rule_from_envelope_data() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({
            "code": "SUCCESS",
            "data": {"type": "keep_unlock", "ended_time": 1700000000.0}
        }))
        .unwrap();

        let rule: LockRule = envelope.into_data().unwrap();
        assert_eq!(rule.rule_type, "keep_unlock");
    }

    #[test]
    fn should_join_urls_under_the_developer_prefix() {
        let client = ControllerClient::new("https://controller.local/", "key").unwrap();
        assert_eq!(
            client.url("/doors/d1/unlock"),
            "https://controller.local/api/v1/developer/doors/d1/unlock"
        );
    }
}
