use tracing::debug;

use crate::report::types::{
    AlertRankEntry, AlertSlot, DependencyBuckets, DependencyNode, GrandTotals, ReportStructure,
    UnifiedDeviceRecord, VehicleType, VehicleTypeAggregate,
};
use crate::report::utility::format_km;
use crate::telemetry::{add_amounts, finite_or_zero};

/// Aggregates one vehicle-type bucket of a dependency.
///
/// Moving devices contribute mileage. For regular vehicles, their alert
/// values are also summed into the slots of the fleet-wide ranking and
/// into `grand_total_alerts`; motorcycle rows always report zero alerts.
pub fn aggregate_bucket(
    kind: VehicleType,
    devices: &[UnifiedDeviceRecord],
    top_alerts: &[AlertRankEntry],
) -> VehicleTypeAggregate {
    let seed = VehicleTypeAggregate {
        kind,
        label: kind.label(),
        total: devices.len(),
        with_movement: 0,
        without_movement: 0,
        total_km: 0.0,
        total_km_display: String::new(),
        alert_totals: top_alerts.iter().map(AlertSlot::empty).collect(),
        grand_total_alerts: 0.0,
    };

    let mut aggregate = devices.iter().fold(seed, |mut acc, device| {
        if !device.has_movement {
            acc.without_movement += 1;
            return acc;
        }

        acc.with_movement += 1;
        acc.total_km += finite_or_zero(device.mileage);

        if kind == VehicleType::Vehicle {
            for alert in &device.alerts {
                let amount = alert.amount();
                acc.grand_total_alerts = add_amounts(acc.grand_total_alerts, amount);
                if let Some(slot) = acc.alert_totals.iter_mut().find(|s| s.id == alert.id) {
                    slot.total = add_amounts(slot.total, amount);
                }
            }
        }
        acc
    });

    aggregate.total_km_display = format_km(aggregate.total_km);
    aggregate
}

/// Fleet-wide totals as a flat fold over every aggregate in `nodes`.
pub fn grand_totals(nodes: &[DependencyNode], top_alerts: &[AlertRankEntry]) -> GrandTotals {
    let seed = GrandTotals {
        alert_totals: top_alerts.iter().map(AlertSlot::empty).collect(),
        ..Default::default()
    };

    let mut totals = nodes
        .iter()
        .flat_map(|node| node.vehicle_types.iter())
        .fold(seed, |mut acc, aggregate| {
            acc.vehicles += aggregate.total;
            acc.with_movement += aggregate.with_movement;
            acc.without_movement += aggregate.without_movement;
            acc.total_km += aggregate.total_km;
            acc.grand_total_alerts = add_amounts(acc.grand_total_alerts, aggregate.grand_total_alerts);
            for (total, slot) in acc.alert_totals.iter_mut().zip(&aggregate.alert_totals) {
                total.total = add_amounts(total.total, slot.total);
            }
            acc
        });

    totals.total_km_display = format_km(totals.total_km);
    totals
}

/// Folds classified devices and the alert ranking into the final report.
///
/// Buckets are emitted motorcycles first, and dependencies without any
/// device are left out.
#[tracing::instrument(skip_all, fields(dependencies = dependencies.len(), top_alerts = top_alerts.len()))]
pub fn build_report(
    dependencies: &[DependencyBuckets],
    top_alerts: Vec<AlertRankEntry>,
) -> ReportStructure {
    let nodes: Vec<DependencyNode> = dependencies
        .iter()
        .filter_map(|dependency| {
            let vehicle_types: Vec<VehicleTypeAggregate> = VehicleType::ORDER
                .iter()
                .map(|&kind| (kind, dependency.bucket(kind)))
                .filter(|(_, devices)| !devices.is_empty())
                .map(|(kind, devices)| aggregate_bucket(kind, devices, &top_alerts))
                .collect();

            if vehicle_types.is_empty() {
                debug!(dependency = %dependency.name, "Dropping dependency without devices");
                return None;
            }

            Some(DependencyNode {
                name: dependency.name.clone(),
                vehicle_types,
            })
        })
        .collect();

    let grand_totals = grand_totals(&nodes, &top_alerts);

    ReportStructure {
        dependencies: nodes,
        top5_alerts: top_alerts,
        grand_totals,
    }
}
