// Dataset source trait for the server's table endpoint
use crate::domain::measurement::Dataset;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode dataset from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the current dataset in its JSON form
    async fn fetch_dataset(&self) -> Result<Dataset, FetchError>;

    /// Fetch the server-rendered table body
    async fn fetch_markup(&self) -> Result<String, FetchError>;
}
