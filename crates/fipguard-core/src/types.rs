use serde::Deserialize;

// ─── Resources ────────────────────────────────────────────────────────────

/// A floating IP as reported by `GET /floating_ips/{id}`.
///
/// `server` is the id of the currently-owning server, `None` when the IP is
/// unassigned. The provider is the source of truth: this value is re-fetched
/// every tick and never cached across ticks.
#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: i64,
    pub ip: String,
    pub server: Option<i64>,
}

/// The server this daemon runs on, fetched once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: i64,
    pub name: String,
}

// ─── Actions ──────────────────────────────────────────────────────────────

/// An asynchronous provider-side operation, returned by the assign call and
/// polled via `GET /actions/{id}` until it reaches a terminal status.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub id: i64,
    pub status: ActionStatus,
    pub error: Option<ActionError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Running,
    Success,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionError {
    pub code: String,
    pub message: String,
}

// ─── Response envelopes ───────────────────────────────────────────────────
// The hcloud API wraps every resource in a single-key object named after
// the resource kind.

#[derive(Debug, Deserialize)]
pub(crate) struct FloatingIpResponse {
    pub floating_ip: FloatingIp,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerResponse {
    pub server: Server,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionResponse {
    pub action: Action,
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[allow(dead_code)]
    pub code: String,
    pub message: String,
}
