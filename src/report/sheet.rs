//! Per-device report sheets: route, alert chart, alert listing and fuel summary.

use serde::Serialize;

use crate::report::catalog::AlertCatalog;
use crate::report::types::{DeviceSummary, UnifiedDeviceRecord};
use crate::telemetry::{DeviceId, LatLng};

/// How the travelled route is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "camelCase")]
pub enum RouteView {
    Empty,
    /// A single fix is shown as a marker instead of a line.
    Marker(LatLng),
    Polyline(Vec<LatLng>),
}

impl RouteView {
    pub fn from_points(points: &[LatLng]) -> Self {
        match points {
            [] => RouteView::Empty,
            [single] => RouteView::Marker(*single),
            _ => RouteView::Polyline(points.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub category: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedAlert {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSheet {
    pub device_id: DeviceId,
    pub title: String,
    pub route: RouteView,
    pub has_alerts: bool,
    pub chart: Vec<ChartSlice>,
    pub listing: Vec<ListedAlert>,
    pub fuel: DeviceSummary,
}

pub fn build_sheet(record: &UnifiedDeviceRecord, catalog: &AlertCatalog) -> DeviceSheet {
    let chart = record
        .alerts
        .iter()
        .filter(|alert| alert.amount() > 0.0)
        .map(|alert| ChartSlice {
            category: alert.category.clone(),
            value: alert.amount(),
            color: catalog
                .color_for(&alert.category, alert.color.as_deref())
                .to_string(),
        })
        .collect();

    let listing = record
        .alerts
        .iter()
        .filter(|alert| catalog.is_listed(&alert.category))
        .map(|alert| ListedAlert {
            category: alert.category.clone(),
            value: alert.amount(),
        })
        .collect();

    let title = if record.summary.name.is_empty() {
        record.name.clone()
    } else {
        record.summary.name.clone()
    };

    DeviceSheet {
        device_id: record.device_id.clone(),
        title,
        route: RouteView::from_points(&record.coordinates),
        has_alerts: !record.alerts.is_empty(),
        chart,
        listing,
        fuel: record.summary.clone(),
    }
}

/// One sheet per device, in device order.
#[tracing::instrument(skip_all, fields(devices = records.len()))]
pub fn build_sheets(records: &[UnifiedDeviceRecord], catalog: &AlertCatalog) -> Vec<DeviceSheet> {
    records.iter().map(|r| build_sheet(r, catalog)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::AlertRecord;

    fn record(coordinates: Vec<LatLng>, alerts: Vec<AlertRecord>) -> UnifiedDeviceRecord {
        UnifiedDeviceRecord {
            device_id: DeviceId::from(5),
            name: "UNIT-PV1-005".to_string(),
            coordinates,
            alerts,
            summary: DeviceSummary {
                kilometers_traveled: 12.0,
                km_per_liter: 0.0,
                spent_gas: 1.5,
                name: "Patrulla 5".to_string(),
            },
            has_movement: true,
            mileage: 12.0,
        }
    }

    #[test]
    fn test_route_view() {
        assert_eq!(RouteView::from_points(&[]), RouteView::Empty);
        assert_eq!(
            RouteView::from_points(&[LatLng(1.0, 2.0)]),
            RouteView::Marker(LatLng(1.0, 2.0))
        );
        assert!(matches!(
            RouteView::from_points(&[LatLng(1.0, 2.0), LatLng(1.1, 2.1)]),
            RouteView::Polyline(points) if points.len() == 2
        ));
    }

    #[test]
    fn test_chart_skips_zero_values_and_colors_by_catalog() {
        let mut custom = AlertRecord::new(900, "Alerta personalizada", 2.0);
        custom.color = Some("#112233".to_string());
        let alerts = vec![
            AlertRecord::new(58, "Fatiga de conductor", 3.0),
            AlertRecord::new(3, "Alerta de cobertura de cámara", 0.0),
            custom,
        ];

        let sheet = build_sheet(&record(vec![], alerts), &AlertCatalog::default());

        assert!(sheet.has_alerts);
        assert_eq!(sheet.chart.len(), 2);
        assert_eq!(sheet.chart[0].color, "#9A00FF");
        assert_eq!(sheet.chart[1].color, "#112233");
        assert_eq!(sheet.listing.len(), 3);
    }

    #[test]
    fn test_listing_hides_recognition_events() {
        let alerts = vec![
            AlertRecord::new(500, "Reconocimiento de placa", 8.0),
            AlertRecord::new(392, "Zona ciega", 1.0),
        ];

        let sheet = build_sheet(&record(vec![], alerts), &AlertCatalog::default());

        assert_eq!(sheet.listing.len(), 1);
        assert_eq!(sheet.listing[0].category, "Zona ciega");
        assert_eq!(sheet.chart.len(), 2);
    }

    #[test]
    fn test_title_prefers_summary_name() {
        let mut rec = record(vec![LatLng(20.9, -100.7)], vec![]);
        let sheet = build_sheet(&rec, &AlertCatalog::default());
        assert_eq!(sheet.title, "Patrulla 5");
        assert!(!sheet.has_alerts);

        rec.summary.name.clear();
        let sheet = build_sheet(&rec, &AlertCatalog::default());
        assert_eq!(sheet.title, "UNIT-PV1-005");
    }
}
