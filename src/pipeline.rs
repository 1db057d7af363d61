//! End-to-end report assembly: validate, fetch, join, classify, rank, build.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ReportSettings;
use crate::error::ReportError;
use crate::fetch::{TelemetryQuery, TelemetrySource};
use crate::report::aggregate::build_report;
use crate::report::catalog::AlertCatalog;
use crate::report::classify::{GroupDescriptor, classify};
use crate::report::join::join_devices;
use crate::report::rank::rank_alerts;
use crate::report::sheet::{DeviceSheet, build_sheets};
use crate::report::types::ReportStructure;
use crate::telemetry::{DeviceId, RawDatasets};

/// A report request as posted by the HTTP layer.
///
/// `from`/`to` bound the telemetry query; `real_from`/`real_to` are the
/// period as the user picked it, echoed on the rendered sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportRequest {
    pub devices: Vec<DeviceId>,
    pub from: String,
    pub to: String,
    pub real_from: String,
    pub real_to: String,
    pub token: String,
    #[serde(flatten)]
    pub group: GroupDescriptor,
}

impl ReportRequest {
    pub fn validate(&self) -> Result<(), ReportError> {
        let required = [
            &self.from,
            &self.to,
            &self.real_from,
            &self.real_to,
            &self.token,
        ];
        if self.devices.is_empty() || required.iter().any(|field| field.trim().is_empty()) {
            return Err(ReportError::InvalidRequest("missing_or_empty_fields"));
        }

        let from = parse_instant(&self.from).ok_or(ReportError::InvalidRequest("invalid_period"))?;
        let to = parse_instant(&self.to).ok_or(ReportError::InvalidRequest("invalid_period"))?;
        if from > to {
            return Err(ReportError::InvalidRequest("invalid_period"));
        }

        Ok(())
    }

    pub fn query(&self) -> TelemetryQuery {
        TelemetryQuery {
            devices: self.devices.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// Accepts RFC 3339 timestamps or `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Per-device sheets plus the period they cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetBundle {
    pub period_from: String,
    pub period_to: String,
    pub sheets: Vec<DeviceSheet>,
}

/// Builds the fleet report from datasets already in memory.
pub fn assemble_report(
    devices: &[DeviceId],
    raw: &RawDatasets,
    group: &GroupDescriptor,
    settings: &ReportSettings,
) -> Result<ReportStructure, ReportError> {
    let records = join_devices(devices, raw)?;
    let top_alerts = rank_alerts(&records, settings.top_alerts)?;
    let dependencies = classify(records, group, &settings.classifier());
    Ok(build_report(&dependencies, top_alerts))
}

#[tracing::instrument(
    skip_all,
    fields(devices = request.devices.len(), group_id = request.group.group_id)
)]
pub async fn build_fleet_report<S: TelemetrySource + ?Sized>(
    source: &S,
    request: &ReportRequest,
    settings: &ReportSettings,
) -> Result<ReportStructure, ReportError> {
    request.validate()?;
    let raw = source.fetch(&request.query()).await?;

    let report = assemble_report(&request.devices, &raw, &request.group, settings)?;

    info!(
        dependencies = report.dependencies.len(),
        vehicles = report.grand_totals.vehicles,
        top_alerts = report.top5_alerts.len(),
        "Fleet report built"
    );
    Ok(report)
}

#[tracing::instrument(skip_all, fields(devices = request.devices.len()))]
pub async fn build_device_sheets<S: TelemetrySource + ?Sized>(
    source: &S,
    request: &ReportRequest,
) -> Result<SheetBundle, ReportError> {
    request.validate()?;
    let raw = source.fetch(&request.query()).await?;

    let records = join_devices(&request.devices, &raw)?;
    let sheets = build_sheets(&records, &AlertCatalog::default());

    info!(sheets = sheets.len(), "Device sheets built");
    Ok(SheetBundle {
        period_from: request.real_from.clone(),
        period_to: request.real_to.clone(),
        sheets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ReportRequest {
        serde_json::from_str(
            r#"{
                "devices": [1, "2"],
                "from": "2026-10-01T06:00:00Z",
                "to": "2026-10-02T05:59:59Z",
                "realFrom": "2026-10-01 00:00:00",
                "realTo": "2026-10-01 23:59:59",
                "token": "abc",
                "groupId": 16,
                "groupName": "SSC"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_request_deserializes_flat_group() {
        let req = request();
        assert_eq!(req.devices, vec![DeviceId::from(1), DeviceId::from(2)]);
        assert_eq!(req.group.group_id, 16);
        assert_eq!(req.group.group_name, "SSC");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let mut req = request();
        req.token = "  ".to_string();
        assert!(matches!(
            req.validate(),
            Err(ReportError::InvalidRequest("missing_or_empty_fields"))
        ));

        let mut req = request();
        req.devices.clear();
        assert!(matches!(
            req.validate(),
            Err(ReportError::InvalidRequest("missing_or_empty_fields"))
        ));

        let empty: ReportRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_reversed_period_is_rejected() {
        let mut req = request();
        std::mem::swap(&mut req.from, &mut req.to);
        assert!(matches!(
            req.validate(),
            Err(ReportError::InvalidRequest("invalid_period"))
        ));
    }

    #[test]
    fn test_parse_instant_formats() {
        let rfc = parse_instant("2026-10-01T06:00:00-06:00").unwrap();
        let plain = parse_instant("2026-10-01 12:00:00").unwrap();
        assert_eq!(rfc, plain);
        assert!(parse_instant("yesterday").is_none());
    }
}
