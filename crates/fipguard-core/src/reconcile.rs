use tracing::info;

use crate::error::ReconcileError;
use crate::hcloud::HcloudClient;
use crate::types::Server;

/// One observe-and-correct cycle over a single floating IP.
///
/// Each tick re-fetches the floating IP from the provider, compares the
/// reported owner against the desired server, and issues an assignment only
/// on divergence. The tick is idempotent and carries no state between runs:
/// a stale in-memory handle can never drive a decision because the decision
/// input is always a fresh fetch.
#[derive(Debug)]
pub struct Reconciler {
    client: HcloudClient,
    desired: Server,
    floating_ip_id: i64,
}

/// Outcome of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The floating IP was already attached to the desired server.
    AlreadyAssigned,
    /// A divergence was found and corrected.
    Reassigned,
}

impl Reconciler {
    pub fn new(client: HcloudClient, desired: Server, floating_ip_id: i64) -> Self {
        Reconciler {
            client,
            desired,
            floating_ip_id,
        }
    }

    pub fn desired(&self) -> &Server {
        &self.desired
    }

    /// Run one reconciliation tick.
    ///
    /// Never retries internally; every phase failure is wrapped with the
    /// phase that failed and returned, leaving recovery to the caller.
    pub async fn tick(&self) -> Result<TickOutcome, ReconcileError> {
        let fip = self
            .client
            .floating_ip(self.floating_ip_id)
            .await
            .map_err(ReconcileError::Lookup)?;

        match fip.server {
            Some(owner) if owner == self.desired.id => return Ok(TickOutcome::AlreadyAssigned),
            Some(owner) => info!(
                "floating IP {} assigned to {}; reassigning to {}",
                fip.ip, owner, self.desired.id
            ),
            None => info!(
                "floating IP {} not assigned to any server; assigning to {}",
                fip.ip, self.desired.id
            ),
        }

        let action = self
            .client
            .assign(fip.id, self.desired.id)
            .await
            .map_err(ReconcileError::Assign)?;
        self.client
            .await_action(&action)
            .await
            .map_err(ReconcileError::Action)?;

        Ok(TickOutcome::Reassigned)
    }
}
