use std::time::Duration;

use crate::error::MetadataError;

/// Client for the instance metadata service.
///
/// One bounded GET against the link-local endpoint, consumed once at
/// startup to learn which server this process runs on. There is no retry
/// here: a dead metadata service means the daemon cannot identify itself
/// and startup must fail.
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    /// `base_url` is normally [`crate::config::DEFAULT_METADATA_URL`];
    /// injectable so tests can point at a local mock.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MetadataError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(MetadataClient {
            http,
            base_url: base_url.into(),
        })
    }

    /// Resolve this instance's provider-assigned server id.
    pub async fn instance_id(&self) -> Result<i64, MetadataError> {
        let url = format!("{}/meta-data/instance-id", self.base_url);
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetadataError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        body.trim()
            .parse::<i64>()
            .map_err(|_| MetadataError::Parse(body))
    }
}
