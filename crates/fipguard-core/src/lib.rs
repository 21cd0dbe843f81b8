//! `fipguard-core` — keep a Hetzner Cloud floating IP attached to this server.
//!
//! The daemon runs on the server that should own the address. Each tick it
//! asks the provider who currently owns the floating IP and corrects any
//! divergence, so a failed-over or manually-moved address always drifts back.
//!
//! # Architecture
//!
//! ```text
//! MetadataClient  ← one GET at startup: "which server am I?"
//!     │
//!     ▼
//! Daemon::bootstrap   ← validates config against live API state
//!     │
//!     ▼
//! Daemon::run         ← sleep → tick → sleep …, forever
//!     │
//!     ▼
//! Reconciler::tick    ← fresh fetch, compare owner, assign on divergence
//!     │
//!     ▼
//! HcloudClient        ← floating_ip / server / assign / await_action
//! ```
//!
//! Exactly one tick is ever in flight; every network operation is bounded
//! by the configured per-operation timeout. Steady-state failures are
//! logged and answered with a shorter retry sleep — they never terminate
//! the process. Startup failures do.

pub mod config;
pub mod driver;
pub mod error;
pub mod hcloud;
pub mod metadata;
pub mod reconcile;
pub mod types;

pub use config::{Config, DEFAULT_API_URL, DEFAULT_METADATA_URL};
pub use driver::Daemon;
pub use error::{BootstrapError, MetadataError, ProviderError, ReconcileError};
pub use hcloud::HcloudClient;
pub use metadata::MetadataClient;
pub use reconcile::{Reconciler, TickOutcome};
pub use types::{Action, ActionStatus, FloatingIp, Server};
