use std::time::Duration;

use thiserror::Error;

/// Failures talking to the instance metadata service.
///
/// All of these are fatal: identity resolution happens exactly once at
/// startup and there is no recovery path without an instance id.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata service returned HTTP {0}")]
    Status(u16),

    #[error("metadata body is not a valid instance id: {0:?}")]
    Parse(String),
}

/// Failures from the hcloud API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("operation did not complete within {0:?}")]
    Timeout(Duration),

    #[error("action {id} failed: {message}")]
    ActionFailed { id: i64, message: String },
}

impl ProviderError {
    /// `true` if this failure was a deadline, either reqwest's per-request
    /// timeout or the bounded wait around an action watch.
    pub fn is_timeout(&self) -> bool {
        match self {
            ProviderError::Timeout(_) => true,
            ProviderError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// A reconciliation tick failure, tagged with the phase that failed.
///
/// The tick never retries internally; the driver loop logs this and
/// re-runs the whole tick after the retry interval.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to fetch floating IP state")]
    Lookup(#[source] ProviderError),

    #[error("failed to assign floating IP")]
    Assign(#[source] ProviderError),

    #[error("assignment action did not succeed")]
    Action(#[source] ProviderError),
}

impl ReconcileError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ReconcileError::Lookup(e) | ReconcileError::Assign(e) | ReconcileError::Action(e) => {
                e.is_timeout()
            }
        }
    }
}

/// Startup failures. Any of these terminates the process: without identity
/// and the initial resource handles the daemon has nothing to reconcile.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to resolve instance id from metadata service")]
    Identity(#[source] MetadataError),

    #[error("failed to fetch floating IP {id} from API")]
    FloatingIp {
        id: i64,
        #[source]
        source: ProviderError,
    },

    #[error("failed to fetch server {id} from API")]
    Server {
        id: i64,
        #[source]
        source: ProviderError,
    },
}
