use crate::error::{Error, Result};
use crate::snapshot::RawSnapshot;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches one metrics snapshot from the aggregation endpoint.
///
/// One GET per call, no retries. A transport failure or non-success status
/// is a fetch error; a body that is not the expected JSON shape is a decode
/// error. Callers never see partial data.
pub struct SnapshotFetcher {
    client: Client,
    endpoint: Url,
}

impl SnapshotFetcher {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fastdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Fetch)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub async fn fetch(&self) -> Result<RawSnapshot> {
        log::info!("Fetching snapshot from {}", self.endpoint);

        let res = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(Error::Fetch)?;

        let body = res.text().await.map_err(Error::Fetch)?;
        log::debug!("Snapshot body: {} bytes", body.len());

        let snapshot: RawSnapshot = serde_json::from_str(&body)?;
        Ok(snapshot)
    }
}
