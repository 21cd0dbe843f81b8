use std::time::Duration;

/// Well-known hcloud API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.hetzner.cloud/v1";

/// Well-known instance metadata endpoint (link-local, instance-only).
pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/2009-04-04";

/// Immutable daemon configuration, captured once at startup and passed
/// explicitly into the client and driver.
#[derive(Debug, Clone)]
pub struct Config {
    /// hcloud API token.
    pub token: String,
    /// Id of the floating IP this daemon keeps attached.
    pub floating_ip_id: i64,
    /// Deadline for each individual API operation, including the whole
    /// wait for an assignment action to complete.
    pub api_timeout: Duration,
    /// Sleep between ticks after a successful (or no-op) reconciliation.
    pub check_interval: Duration,
    /// Sleep before the next tick after a failed one. Fixed, not escalating.
    pub retry_interval: Duration,
    /// Cadence of the internal action-status poll inside `await_action`.
    pub action_poll_interval: Duration,
}

impl Config {
    pub fn new(token: String, floating_ip_id: i64) -> Self {
        Config {
            token,
            floating_ip_id,
            api_timeout: Duration::from_secs(10),
            check_interval: Duration::from_secs(60),
            retry_interval: Duration::from_secs(10),
            action_poll_interval: Duration::from_secs(1),
        }
    }
}
