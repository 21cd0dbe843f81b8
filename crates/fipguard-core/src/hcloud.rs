use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::{Config, DEFAULT_API_URL};
use crate::error::ProviderError;
use crate::types::{
    Action, ActionResponse, ActionStatus, ApiErrorResponse, FloatingIp, FloatingIpResponse, Server,
    ServerResponse,
};

/// Thin facade over the hcloud resource API.
///
/// Every method is a single network call (plus, for [`await_action`], an
/// internal status poll) bounded by the configured per-operation timeout.
/// No caching and no retry: failures are surfaced to the caller, which owns
/// recovery policy.
///
/// [`await_action`]: HcloudClient::await_action
#[derive(Debug)]
pub struct HcloudClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    api_timeout: Duration,
    action_poll_interval: Duration,
}

impl HcloudClient {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        Self::with_base_url(config, DEFAULT_API_URL)
    }

    /// Like [`new`], with an explicit API endpoint. Tests point this at a
    /// local mock server.
    ///
    /// [`new`]: HcloudClient::new
    pub fn with_base_url(
        config: &Config,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;
        Ok(HcloudClient {
            http,
            base_url: base_url.into(),
            token: config.token.clone(),
            api_timeout: config.api_timeout,
            action_poll_interval: config.action_poll_interval,
        })
    }

    // ─── Resource lookups ─────────────────────────────────────────────────

    pub async fn floating_ip(&self, id: i64) -> Result<FloatingIp, ProviderError> {
        let resp: FloatingIpResponse = self.get(&format!("/floating_ips/{id}")).await?;
        Ok(resp.floating_ip)
    }

    pub async fn server(&self, id: i64) -> Result<Server, ProviderError> {
        let resp: ServerResponse = self.get(&format!("/servers/{id}")).await?;
        Ok(resp.server)
    }

    // ─── Assignment ───────────────────────────────────────────────────────

    /// Request assignment of a floating IP to a server.
    ///
    /// Returns the provider's action handle; the remote state may already
    /// have changed even if a later step fails, so callers must re-verify
    /// on the next tick rather than assume atomicity.
    pub async fn assign(
        &self,
        floating_ip_id: i64,
        server_id: i64,
    ) -> Result<Action, ProviderError> {
        let url = format!(
            "{}/floating_ips/{}/actions/assign",
            self.base_url, floating_ip_id
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "server": server_id }))
            .send()
            .await?;
        let resp: ActionResponse = Self::decode(resp).await?;
        Ok(resp.action)
    }

    /// Wait for an action to reach a terminal status.
    ///
    /// Polls `GET /actions/{id}` until the provider reports success or
    /// error. The entire wait shares the per-operation timeout; callers see
    /// only the terminal result, never the polling cadence.
    pub async fn await_action(&self, action: &Action) -> Result<(), ProviderError> {
        // The assign response may already carry a terminal status.
        match action.status {
            ActionStatus::Success => return Ok(()),
            ActionStatus::Error => return Err(Self::action_failure(action)),
            ActionStatus::Running => {}
        }

        timeout(self.api_timeout, self.poll_until_terminal(action.id))
            .await
            .map_err(|_| ProviderError::Timeout(self.api_timeout))?
    }

    async fn poll_until_terminal(&self, action_id: i64) -> Result<(), ProviderError> {
        loop {
            let resp: ActionResponse = self.get(&format!("/actions/{action_id}")).await?;
            match resp.action.status {
                ActionStatus::Success => return Ok(()),
                ActionStatus::Error => return Err(Self::action_failure(&resp.action)),
                ActionStatus::Running => sleep(self.action_poll_interval).await,
            }
        }
    }

    fn action_failure(action: &Action) -> ProviderError {
        ProviderError::ActionFailed {
            id: action.id,
            message: action
                .error
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "no error detail reported".into()),
        }
    }

    // ─── Transport ────────────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;
        Self::decode(resp).await
    }

    /// Decode a success body, or map the hcloud error envelope to
    /// [`ProviderError::Api`].
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ProviderError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }
        let message = match resp.json::<ApiErrorResponse>().await {
            Ok(envelope) => envelope.error.message,
            Err(_) => "unrecognized error response".into(),
        };
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::new("test-token".into(), 4711);
        config.api_timeout = Duration::from_millis(500);
        config.action_poll_interval = Duration::from_millis(20);
        config
    }

    fn client(server: &mockito::ServerGuard) -> HcloudClient {
        HcloudClient::with_base_url(&test_config(), server.url()).unwrap()
    }

    #[tokio::test]
    async fn floating_ip_lookup_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/floating_ips/4711")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"floating_ip":{"id":4711,"ip":"203.0.113.7","server":42}}"#)
            .create_async()
            .await;

        let fip = client(&server).floating_ip(4711).await.unwrap();
        assert_eq!(fip.server, Some(42));
        assert_eq!(fip.ip, "203.0.113.7");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_envelope_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/servers/42")
            .with_status(404)
            .with_body(r#"{"error":{"code":"not_found","message":"server not found"}}"#)
            .create_async()
            .await;

        let err = client(&server).server(42).await.unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "server not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn assign_posts_target_server_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/floating_ips/4711/actions/assign")
            .match_body(mockito::Matcher::JsonString(r#"{"server":42}"#.into()))
            .with_status(201)
            .with_body(r#"{"action":{"id":13,"status":"running","error":null}}"#)
            .create_async()
            .await;

        let action = client(&server).assign(4711, 42).await.unwrap();
        assert_eq!(action.id, 13);
        assert_eq!(action.status, ActionStatus::Running);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn await_action_polls_until_success() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut server = mockito::Server::new_async().await;
        // Still running on the first poll, terminal on the second.
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polls);
        server
            .mock("GET", "/actions/13")
            .with_status(200)
            .with_body_from_request(move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    r#"{"action":{"id":13,"status":"running","error":null}}"#.into()
                } else {
                    r#"{"action":{"id":13,"status":"success","error":null}}"#.into()
                }
            })
            .expect(2)
            .create_async()
            .await;

        let action = Action {
            id: 13,
            status: ActionStatus::Running,
            error: None,
        };
        client(&server).await_action(&action).await.unwrap();
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn await_action_surfaces_terminal_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/actions/13")
            .with_status(200)
            .with_body(
                r#"{"action":{"id":13,"status":"error","error":{"code":"server_locked","message":"server is locked"}}}"#,
            )
            .create_async()
            .await;

        let action = Action {
            id: 13,
            status: ActionStatus::Running,
            error: None,
        };
        let err = client(&server).await_action(&action).await.unwrap_err();
        match err {
            ProviderError::ActionFailed { id, message } => {
                assert_eq!(id, 13);
                assert_eq!(message, "server is locked");
            }
            other => panic!("expected ActionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn await_action_short_circuits_on_terminal_input() {
        // No mock registered: a poll would fail, so success proves no
        // request was made.
        let server = mockito::Server::new_async().await;
        let action = Action {
            id: 13,
            status: ActionStatus::Success,
            error: None,
        };
        client(&server).await_action(&action).await.unwrap();
    }

    #[tokio::test]
    async fn await_action_enforces_the_deadline() {
        let mut server = mockito::Server::new_async().await;
        // Never leaves running; the bounded wait must cut it off.
        server
            .mock("GET", "/actions/13")
            .with_status(200)
            .with_body(r#"{"action":{"id":13,"status":"running","error":null}}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let action = Action {
            id: 13,
            status: ActionStatus::Running,
            error: None,
        };
        let err = client(&server).await_action(&action).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn hung_connection_is_classified_as_timeout() {
        // A listener that accepts and then never responds.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = test_config();
        config.api_timeout = Duration::from_millis(200);
        let client = HcloudClient::with_base_url(&config, format!("http://{addr}")).unwrap();

        let err = client.floating_ip(4711).await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }
}
