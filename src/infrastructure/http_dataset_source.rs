// HTTP dataset source for the server's table endpoint
use crate::application::dataset_source::{DatasetSource, FetchError};
use crate::domain::measurement::Dataset;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    client: reqwest::Client,
    table_url: String,
}

impl HttpDatasetSource {
    pub fn new(table_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, table_url })
    }

    async fn get_text(&self, accept: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.table_url)
            .header("Accept", accept)
            .send()
            .await
            .map_err(|source| self.request_error(source))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: self.table_url.clone(),
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| self.request_error(source))
    }

    fn request_error(&self, source: reqwest::Error) -> FetchError {
        FetchError::Request {
            url: self.table_url.clone(),
            source,
        }
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch_dataset(&self) -> Result<Dataset, FetchError> {
        let body = self.get_text("application/json").await?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: self.table_url.clone(),
            source,
        })
    }

    async fn fetch_markup(&self) -> Result<String, FetchError> {
        self.get_text("text/html").await
    }
}
