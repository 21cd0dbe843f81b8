use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use fipguard_core::{Config, Daemon, HcloudClient, MetadataClient, DEFAULT_METADATA_URL};

#[derive(Parser)]
#[command(
    name = "fipguard",
    about = "Keep a Hetzner Cloud floating IP attached to the server this daemon runs on",
    version
)]
struct Cli {
    /// hcloud API token
    #[arg(long, env = "HCLOUD_TOKEN", hide_env_values = true)]
    token: String,

    /// Id of the floating IP to guard
    #[arg(long, env = "HCLOUD_FLOATING_IP_ID")]
    floating_ip_id: i64,

    /// Seconds between ticks after a clean reconciliation
    #[arg(long, default_value_t = 60)]
    check_interval: u64,

    /// Seconds before the next tick after a failed one
    #[arg(long, default_value_t = 10)]
    retry_interval: u64,

    /// Deadline in seconds for each API operation
    #[arg(long, default_value_t = 10)]
    api_timeout: u64,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.token, self.floating_ip_id);
        config.check_interval = Duration::from_secs(self.check_interval);
        config.retry_interval = Duration::from_secs(self.retry_interval);
        config.api_timeout = Duration::from_secs(self.api_timeout);
        config
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.token.is_empty() {
        bail!("no token specified in HCLOUD_TOKEN");
    }

    let config = cli.into_config();
    let client = HcloudClient::new(&config).context("failed to build API client")?;
    let metadata = MetadataClient::new(DEFAULT_METADATA_URL, config.api_timeout)
        .context("failed to build metadata client")?;

    let daemon = Daemon::bootstrap(config, client, &metadata)
        .await
        .context("startup failed")?;
    daemon.run().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_args() {
        let cli = Cli::try_parse_from([
            "fipguard",
            "--token",
            "secret",
            "--floating-ip-id",
            "4711",
        ])
        .unwrap();
        assert_eq!(cli.floating_ip_id, 4711);
        let config = cli.into_config();
        assert_eq!(config.token, "secret");
        assert_eq!(config.check_interval, Duration::from_secs(60));
        assert_eq!(config.retry_interval, Duration::from_secs(10));
    }

    #[test]
    fn interval_overrides_apply() {
        let cli = Cli::try_parse_from([
            "fipguard",
            "--token",
            "secret",
            "--floating-ip-id",
            "4711",
            "--check-interval",
            "30",
            "--retry-interval",
            "5",
            "--api-timeout",
            "3",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.check_interval, Duration::from_secs(30));
        assert_eq!(config.retry_interval, Duration::from_secs(5));
        assert_eq!(config.api_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_non_numeric_floating_ip_id() {
        let err = Cli::try_parse_from([
            "fipguard",
            "--token",
            "secret",
            "--floating-ip-id",
            "not-a-number",
        ]);
        assert!(err.is_err());
    }
}
