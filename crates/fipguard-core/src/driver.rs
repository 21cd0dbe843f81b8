use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{BootstrapError, ReconcileError};
use crate::hcloud::HcloudClient;
use crate::metadata::MetadataClient;
use crate::reconcile::{Reconciler, TickOutcome};
use crate::types::Server;

/// The running daemon: startup facts plus the steady reconciliation loop.
#[derive(Debug)]
pub struct Daemon {
    reconciler: Reconciler,
    config: Config,
}

impl Daemon {
    /// Startup sequencing: fetch the floating IP to validate the configured
    /// id, resolve this instance's identity from the metadata service, then
    /// fetch the server it names. Any failure here is fatal — the daemon
    /// cannot reconcile without these three facts.
    pub async fn bootstrap(
        config: Config,
        client: HcloudClient,
        metadata: &MetadataClient,
    ) -> Result<Self, BootstrapError> {
        let fip = client
            .floating_ip(config.floating_ip_id)
            .await
            .map_err(|source| BootstrapError::FloatingIp {
                id: config.floating_ip_id,
                source,
            })?;

        let instance_id = metadata
            .instance_id()
            .await
            .map_err(BootstrapError::Identity)?;

        let server = client
            .server(instance_id)
            .await
            .map_err(|source| BootstrapError::Server {
                id: instance_id,
                source,
            })?;

        info!(
            "guarding floating IP {} ({}) for server {} ({})",
            fip.id, fip.ip, server.id, server.name
        );

        let reconciler = Reconciler::new(client, server, config.floating_ip_id);
        Ok(Daemon { reconciler, config })
    }

    pub fn desired(&self) -> &Server {
        self.reconciler.desired()
    }

    /// The steady loop. Strictly sequential: one tick in flight, then a
    /// sleep whose length depends on the tick outcome. Failures never
    /// terminate the loop; the process runs until killed externally.
    pub async fn run(self) {
        loop {
            let outcome = self.reconciler.tick().await;
            match &outcome {
                Ok(TickOutcome::Reassigned) => {
                    info!("floating IP assigned to {}", self.desired().id);
                }
                Ok(TickOutcome::AlreadyAssigned) => {}
                Err(err) => {
                    warn!("reconciliation failed: {}", error_chain(err));
                    warn!("retrying in {:?}", self.config.retry_interval);
                }
            }
            sleep(next_delay(&outcome, &self.config)).await;
        }
    }
}

/// Pick the sleep before the next tick: the healthy check interval after a
/// clean tick, the shorter retry interval after a failure. The retry delay
/// is fixed, not an escalating backoff.
pub fn next_delay(outcome: &Result<TickOutcome, ReconcileError>, config: &Config) -> Duration {
    match outcome {
        Ok(_) => config.check_interval,
        Err(_) => config.retry_interval,
    }
}

/// Render an error with its full source chain on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
