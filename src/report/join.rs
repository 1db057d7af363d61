//! Joins the independently fetched datasets into one record per device.

use tracing::{debug, error, warn};

use crate::error::ReportError;
use crate::report::types::{DeviceSummary, UnifiedDeviceRecord};
use crate::telemetry::{DeviceId, RawDatasets, or_zero};

/// Builds the unified record for a single device.
///
/// Each dataset is searched on its own for the first entry matching `id`.
/// A missing coordinate, event or summary entry yields an empty or zeroed
/// field; missing metadata is an error since the name drives classification.
pub fn resolve_device(
    id: &DeviceId,
    raw: &RawDatasets,
) -> Result<UnifiedDeviceRecord, ReportError> {
    let metadata = raw
        .devices
        .iter()
        .find(|d| &d.id == id)
        .ok_or_else(|| ReportError::MissingDeviceMetadata(id.clone()))?;

    let coordinates = raw
        .coordinates
        .iter()
        .find(|c| &c.device_id == id)
        .map(|c| c.coordinates.clone())
        .unwrap_or_default();

    let alerts = raw
        .events
        .iter()
        .find(|e| &e.device_id == id)
        .map(|e| e.alerts.clone())
        .unwrap_or_default();

    let (summary, has_movement, mileage) = match raw.summary.iter().find(|s| &s.device_id == id) {
        Some(s) => (
            DeviceSummary {
                kilometers_traveled: or_zero(s.kilometers_traveled),
                km_per_liter: or_zero(s.km_per_liter),
                spent_gas: or_zero(s.spent_gas),
                name: s
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| metadata.name.clone()),
            },
            s.has_movement.unwrap_or(false),
            or_zero(s.mileage),
        ),
        None => {
            debug!(device_id = %id, "No summary entry, using zeroed summary");
            (
                DeviceSummary {
                    name: metadata.name.clone(),
                    ..Default::default()
                },
                false,
                0.0,
            )
        }
    };

    Ok(UnifiedDeviceRecord {
        device_id: id.clone(),
        name: metadata.name.clone(),
        coordinates,
        alerts,
        summary,
        has_movement,
        mileage,
    })
}

/// Resolves every requested device, one result per id in request order.
pub fn resolve_devices(
    ids: &[DeviceId],
    raw: &RawDatasets,
) -> Vec<Result<UnifiedDeviceRecord, ReportError>> {
    ids.iter().map(|id| resolve_device(id, raw)).collect()
}

/// Resolves all devices, then fails the batch if any of them failed.
///
/// Every device is evaluated before deciding so that all failures are
/// logged; the error returned is the first one in request order.
#[tracing::instrument(skip_all, fields(devices = ids.len()))]
pub fn join_devices(
    ids: &[DeviceId],
    raw: &RawDatasets,
) -> Result<Vec<UnifiedDeviceRecord>, ReportError> {
    let results = resolve_devices(ids, raw);

    let failures = results.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            warn!(error = %err, "Device could not be joined");
        }
        error!(failures, "Aborting report, devices failed to join");
    }

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{
        AlertEventList, AlertRecord, CoordinateTrace, DeviceMetadata, LatLng, SummaryMetrics,
    };

    fn metadata(id: i64, name: &str) -> DeviceMetadata {
        DeviceMetadata {
            id: DeviceId::from(id),
            name: name.to_string(),
        }
    }

    fn sample_datasets() -> RawDatasets {
        RawDatasets {
            coordinates: vec![CoordinateTrace {
                device_id: DeviceId::from(2),
                coordinates: vec![LatLng(20.91, -100.74), LatLng(20.92, -100.75)],
            }],
            events: vec![AlertEventList {
                device_id: DeviceId::from(1),
                alerts: vec![AlertRecord::new(3, "Alerta de cobertura de cámara", 5.0)],
            }],
            summary: vec![SummaryMetrics {
                device_id: DeviceId::from(1),
                name: Some("UNIT-PV1-001".to_string()),
                kilometers_traveled: Some(42.5),
                km_per_liter: None,
                spent_gas: Some(f64::NAN),
                has_movement: Some(true),
                mileage: Some(42.5),
            }],
            devices: vec![metadata(2, "UNIT-TM1-002"), metadata(1, "UNIT-PV1-001")],
        }
    }

    #[test]
    fn test_join_preserves_request_order() {
        let raw = sample_datasets();
        let ids = vec![DeviceId::from(2), DeviceId::from(1)];

        let records = join_devices(&ids, &raw).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_id, DeviceId::from(2));
        assert_eq!(records[1].device_id, DeviceId::from(1));
    }

    #[test]
    fn test_partial_coverage_yields_empty_fields() {
        let raw = sample_datasets();
        let record = resolve_device(&DeviceId::from(2), &raw).unwrap();

        assert_eq!(record.name, "UNIT-TM1-002");
        assert_eq!(record.coordinates.len(), 2);
        assert!(record.alerts.is_empty());
        assert!(!record.has_movement);
        assert_eq!(record.mileage, 0.0);
        assert_eq!(record.summary.kilometers_traveled, 0.0);
        assert_eq!(record.summary.name, "UNIT-TM1-002");
    }

    #[test]
    fn test_summary_numbers_are_zeroed() {
        let raw = sample_datasets();
        let record = resolve_device(&DeviceId::from(1), &raw).unwrap();

        assert!(record.has_movement);
        assert_eq!(record.mileage, 42.5);
        assert_eq!(record.summary.km_per_liter, 0.0);
        assert_eq!(record.summary.spent_gas, 0.0);
        assert_eq!(record.alerts.len(), 1);
        assert!(record.coordinates.is_empty());
    }

    #[test]
    fn test_missing_metadata_fails_batch() {
        let raw = sample_datasets();
        let ids = vec![DeviceId::from(1), DeviceId::from(9), DeviceId::from(2)];

        let results = resolve_devices(&ids, &raw);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[2].is_ok());

        match join_devices(&ids, &raw) {
            Err(ReportError::MissingDeviceMetadata(id)) => assert_eq!(id, DeviceId::from(9)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let mut raw = sample_datasets();
        raw.devices.push(metadata(1, "DUPLICATE"));

        let record = resolve_device(&DeviceId::from(1), &raw).unwrap();
        assert_eq!(record.name, "UNIT-PV1-001");
    }
}
