//! Error type shared by the fetch collaborators and the report pipeline.

use thiserror::Error;

use crate::telemetry::DeviceId;

#[derive(Error, Debug)]
pub enum ReportError {
    /// The device-metadata dataset has no entry for a requested device.
    #[error("missing device metadata for device {0}")]
    MissingDeviceMetadata(DeviceId),

    /// A telemetry dataset could not be fetched or decoded upstream.
    #[error("upstream fetch of {dataset} failed: {cause}")]
    UpstreamFetchFailed { dataset: &'static str, cause: String },

    #[error("rank size must be at least 1, got {0}")]
    InvalidRankSize(usize),

    #[error("invalid report request: {0}")]
    InvalidRequest(&'static str),
}

impl ReportError {
    pub fn upstream(dataset: &'static str, cause: impl ToString) -> Self {
        ReportError::UpstreamFetchFailed {
            dataset,
            cause: cause.to_string(),
        }
    }

    /// Short machine-readable code for the HTTP-facing layer.
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::MissingDeviceMetadata(_) => "missing_device_metadata",
            ReportError::UpstreamFetchFailed { .. } => "upstream_fetch_failed",
            ReportError::InvalidRankSize(_) => "invalid_rank_size",
            ReportError::InvalidRequest(msg) => *msg,
        }
    }
}
