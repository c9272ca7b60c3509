// Upstream chain data over HTTP

use crate::models::RawSnapshot;
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned invalid JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

pub struct ChainRepo {
    client: reqwest::Client,
    chain_data_url: String,
}

impl ChainRepo {
    pub fn new(chain_data_url: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            chain_data_url: chain_data_url.into(),
        })
    }

    /// One GET to the configured endpoint, no retries. Any transport or
    /// decode failure is a FetchError; callers treat it as "no data".
    #[instrument(skip(self), fields(repo = "chain", operation = "fetch_chain_data"))]
    pub async fn fetch_chain_data(&self) -> Result<RawSnapshot, FetchError> {
        let response = self
            .client
            .get(&self.chain_data_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(FetchError::Transport)?;
        response
            .json::<RawSnapshot>()
            .await
            .map_err(FetchError::Decode)
    }
}
