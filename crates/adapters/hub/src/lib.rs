//! Outbound REST client for the Home Automation Hub.
//!
//! The hub's maker API authenticates with an `access_token` query
//! parameter and returns plain JSON bodies, no envelope. Commands are
//! issued as `POST /devices/{id}/{command}[/{secondary}]` with an empty
//! body; only the HTTP status signals the outcome.
//!
//! The hub terminates TLS with a self-signed certificate on the local
//! network, so certificate verification is disabled for this client only.

use std::time::Duration;

use doorbridge_app::ports::{DeviceInfo, HubApi};
use doorbridge_domain::error::{ConfigurationError, UpstreamError, UpstreamSystem};

/// Requests that take longer than this are aborted.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client implementing [`HubApi`].
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl HubClient {
    /// Build a client for the hub's maker API at `base_url`.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| ConfigurationError::HttpClient(Box::new(err)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn device_url(&self, device_id: &str, command: Option<(&str, Option<&str>)>) -> String {
        let mut url = format!("{}/devices/{device_id}", self.base_url);
        if let Some((command, secondary)) = command {
            url.push('/');
            url.push_str(command);
            if let Some(secondary) = secondary {
                url.push('/');
                url.push_str(secondary);
            }
        }
        url
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(UpstreamError::Status {
                system: UpstreamSystem::Hub,
                status: status.as_u16(),
            })
        }
    }
}

impl HubApi for HubClient {
    async fn device_info(&self, device_id: &str) -> Result<DeviceInfo, UpstreamError> {
        let response = self
            .client
            .get(self.device_url(device_id, None))
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|err| UpstreamError::Transport {
                system: UpstreamSystem::Hub,
                source: Box::new(err),
            })?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|err| UpstreamError::Decode {
                system: UpstreamSystem::Hub,
                source: Box::new(err),
            })
    }

    async fn send_command(
        &self,
        device_id: &str,
        command: &str,
        secondary: Option<&str>,
    ) -> Result<(), UpstreamError> {
        tracing::debug!(device_id, command, "sending hub device command");
        let response = self
            .client
            .post(self.device_url(device_id, Some((command, secondary))))
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|err| UpstreamError::Transport {
                system: UpstreamSystem::Hub,
                source: Box::new(err),
            })?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_device_info_url_without_command_segment() {
        let client = HubClient::new("http://hub.local/apps/api/42/", "tok").unwrap();
        assert_eq!(
            client.device_url("12", None),
            "http://hub.local/apps/api/42/devices/12"
        );
    }

    #[test]
    fn should_build_command_url_with_optional_secondary_value() {
        let client = HubClient::new("http://hub.local/apps/api/42", "tok").unwrap();
        assert_eq!(
            client.device_url("12", Some(("on", None))),
            "http://hub.local/apps/api/42/devices/12/on"
        );
        assert_eq!(
            client.device_url("12", Some(("setLevel", Some("50")))),
            "http://hub.local/apps/api/42/devices/12/setLevel/50"
        );
    }
}
