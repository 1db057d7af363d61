//! Telemetry fetch collaborators.
//!
//! [`HttpClient`] abstracts the transport so auth decorators such as
//! [`auth::ApiKey`] can wrap it. [`TelemetrySource`] is what the pipeline
//! consumes: something that yields the four raw datasets for a query.

pub mod auth;
mod source;

pub use source::{DatasetPaths, FileTelemetrySource, HttpTelemetrySource, TelemetryQuery};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Request, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ReportError;
use crate::telemetry::RawDatasets;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain `reqwest` client with request and connect timeouts.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// Yields the raw datasets for a report request.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch(&self, query: &TelemetryQuery) -> Result<RawDatasets, ReportError>;
}

/// GETs `url` and decodes the JSON body, failing on non-success statuses.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(
    client: &C,
    url: reqwest::Url,
) -> Result<T> {
    let req = Request::new(reqwest::Method::GET, url);
    let response = client.execute(req).await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("API returned status {}: {}", status, body));
    }

    response
        .json()
        .await
        .map_err(|e| anyhow!("Failed to parse response: {}", e))
}
