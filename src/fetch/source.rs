use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{HttpClient, TelemetrySource, fetch_json};
use crate::error::ReportError;
use crate::telemetry::{
    AlertEventList, CoordinateTrace, DeviceId, DeviceMetadata, RawDatasets, SummaryMetrics,
};

/// Devices and period a report is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryQuery {
    pub devices: Vec<DeviceId>,
    pub from: String,
    pub to: String,
}

/// Backend paths, relative to the API base URL, of the four datasets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub coordinates: String,
    pub events: String,
    pub summary: String,
    pub devices: String,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self {
            coordinates: "reports/route".to_string(),
            events: "reports/events".to_string(),
            summary: "reports/summary".to_string(),
            devices: "devices".to_string(),
        }
    }
}

/// Fetches the datasets from the fleet-tracking HTTP API.
///
/// The four requests run concurrently; the first failure aborts the rest
/// and is reported as [`ReportError::UpstreamFetchFailed`]. No retries.
pub struct HttpTelemetrySource<C> {
    client: C,
    base_url: Url,
    paths: DatasetPaths,
}

impl<C: HttpClient> HttpTelemetrySource<C> {
    pub fn new(client: C, base_url: &str, paths: DatasetPaths) -> Result<Self, ReportError> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ReportError::upstream("base_url", e))?;

        Ok(Self {
            client,
            base_url,
            paths,
        })
    }

    /// Builds `<base>/<path>?deviceId=..[&from=..&to=..]`.
    pub fn dataset_url(
        &self,
        dataset: &'static str,
        path: &str,
        query: &TelemetryQuery,
        with_period: bool,
    ) -> Result<Url, ReportError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ReportError::upstream(dataset, e))?;

        {
            let mut pairs = url.query_pairs_mut();
            for device in &query.devices {
                pairs.append_pair("deviceId", device.as_str());
            }
            if with_period {
                pairs.append_pair("from", &query.from);
                pairs.append_pair("to", &query.to);
            }
        }

        Ok(url)
    }

    async fn fetch_dataset<T: serde::de::DeserializeOwned>(
        &self,
        dataset: &'static str,
        path: &str,
        query: &TelemetryQuery,
        with_period: bool,
    ) -> Result<Vec<T>, ReportError> {
        let url = self.dataset_url(dataset, path, query, with_period)?;
        debug!(dataset, %url, "Fetching dataset");

        let entries: Vec<T> = fetch_json(&self.client, url)
            .await
            .map_err(|e| ReportError::upstream(dataset, format!("{e:#}")))?;

        debug!(dataset, entries = entries.len(), "Dataset received");
        Ok(entries)
    }
}

#[async_trait]
impl<C: HttpClient> TelemetrySource for HttpTelemetrySource<C> {
    #[tracing::instrument(skip_all, fields(devices = query.devices.len(), from = %query.from, to = %query.to))]
    async fn fetch(&self, query: &TelemetryQuery) -> Result<RawDatasets, ReportError> {
        let (coordinates, events, summary, devices) = tokio::try_join!(
            self.fetch_dataset::<CoordinateTrace>("coordinates", &self.paths.coordinates, query, true),
            self.fetch_dataset::<AlertEventList>("events", &self.paths.events, query, true),
            self.fetch_dataset::<SummaryMetrics>("summary", &self.paths.summary, query, true),
            self.fetch_dataset::<DeviceMetadata>("devices", &self.paths.devices, query, false),
        )?;

        info!("Telemetry datasets fetched");
        Ok(RawDatasets {
            coordinates,
            events,
            summary,
            devices,
        })
    }
}

/// Reads a JSON bundle holding the four datasets from disk.
///
/// The bundle is returned as-is; devices outside the query are left for
/// the join step to ignore.
pub struct FileTelemetrySource {
    path: PathBuf,
}

impl FileTelemetrySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TelemetrySource for FileTelemetrySource {
    #[tracing::instrument(skip_all, fields(path = %self.path.display()))]
    async fn fetch(&self, _query: &TelemetryQuery) -> Result<RawDatasets, ReportError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ReportError::upstream("bundle", e))?;

        let raw: RawDatasets =
            serde_json::from_str(&content).map_err(|e| ReportError::upstream("bundle", e))?;

        debug!(
            coordinates = raw.coordinates.len(),
            events = raw.events.len(),
            summary = raw.summary.len(),
            devices = raw.devices.len(),
            "Bundle loaded"
        );
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use std::time::Duration;

    fn query() -> TelemetryQuery {
        TelemetryQuery {
            devices: vec![DeviceId::from(1), DeviceId::from("abc")],
            from: "2026-10-01T00:00:00Z".to_string(),
            to: "2026-10-02T00:00:00Z".to_string(),
        }
    }

    fn source(base: &str) -> HttpTelemetrySource<BasicClient> {
        let client = BasicClient::new(Duration::from_secs(5)).unwrap();
        HttpTelemetrySource::new(client, base, DatasetPaths::default()).unwrap()
    }

    #[test]
    fn test_dataset_url_with_period() {
        let source = source("https://fleet.example.com/api");
        let url = source
            .dataset_url("events", "reports/events", &query(), true)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://fleet.example.com/api/reports/events?deviceId=1&deviceId=abc&from=2026-10-01T00%3A00%3A00Z&to=2026-10-02T00%3A00%3A00Z"
        );
    }

    #[test]
    fn test_dataset_url_without_period() {
        let source = source("https://fleet.example.com/api/");
        let url = source
            .dataset_url("devices", "/devices", &query(), false)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://fleet.example.com/api/devices?deviceId=1&deviceId=abc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let client = BasicClient::new(Duration::from_secs(5)).unwrap();
        let result = HttpTelemetrySource::new(client, "not a url", DatasetPaths::default());
        assert!(matches!(
            result,
            Err(ReportError::UpstreamFetchFailed { dataset: "base_url", .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_bundle_is_upstream_failure() {
        let source = FileTelemetrySource::new("/nonexistent/fleet_bundle.json");
        let result = source.fetch(&query()).await;

        assert!(matches!(
            result,
            Err(ReportError::UpstreamFetchFailed { dataset: "bundle", .. })
        ));
    }
}
