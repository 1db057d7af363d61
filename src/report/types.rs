//! Data types flowing through the report pipeline.

use serde::Serialize;

use crate::telemetry::{AlertRecord, DeviceId, LatLng};

/// Fuel and distance figures for one device, with absent values zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub kilometers_traveled: f64,
    pub km_per_liter: f64,
    pub spent_gas: f64,
    pub name: String,
}

/// The join of the four raw datasets for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedDeviceRecord {
    pub device_id: DeviceId,
    pub name: String,
    pub coordinates: Vec<LatLng>,
    pub alerts: Vec<AlertRecord>,
    pub summary: DeviceSummary,
    pub has_movement: bool,
    pub mileage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VehicleType {
    Motorcycle,
    Vehicle,
}

impl VehicleType {
    /// Report order: motorcycles first.
    pub const ORDER: [VehicleType; 2] = [VehicleType::Motorcycle, VehicleType::Vehicle];

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Motorcycle => "Motos",
            VehicleType::Vehicle => "Vehiculo",
        }
    }
}

/// Devices of one dependency split by vehicle type, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyBuckets {
    pub name: String,
    pub motorcycles: Vec<UnifiedDeviceRecord>,
    pub vehicles: Vec<UnifiedDeviceRecord>,
}

impl DependencyBuckets {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            motorcycles: Vec::new(),
            vehicles: Vec::new(),
        }
    }

    pub fn bucket(&self, kind: VehicleType) -> &[UnifiedDeviceRecord] {
        match kind {
            VehicleType::Motorcycle => &self.motorcycles,
            VehicleType::Vehicle => &self.vehicles,
        }
    }

    pub fn push(&mut self, kind: VehicleType, record: UnifiedDeviceRecord) {
        match kind {
            VehicleType::Motorcycle => self.motorcycles.push(record),
            VehicleType::Vehicle => self.vehicles.push(record),
        }
    }
}

/// Fleet-wide summed value for one alert id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRankEntry {
    pub id: i64,
    pub category: String,
    pub total: f64,
}

/// A value aligned to one slot of the fleet-wide alert ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSlot {
    pub id: i64,
    pub category: String,
    pub total: f64,
}

impl AlertSlot {
    pub fn empty(entry: &AlertRankEntry) -> Self {
        Self {
            id: entry.id,
            category: entry.category.clone(),
            total: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleTypeAggregate {
    #[serde(rename = "type")]
    pub kind: VehicleType,
    pub label: &'static str,
    pub total: usize,
    pub with_movement: usize,
    pub without_movement: usize,
    pub total_km: f64,
    pub total_km_display: String,
    pub alert_totals: Vec<AlertSlot>,
    pub grand_total_alerts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    pub name: String,
    pub vehicle_types: Vec<VehicleTypeAggregate>,
}

/// Fleet-wide sums over every [`VehicleTypeAggregate`] in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandTotals {
    pub vehicles: usize,
    pub with_movement: usize,
    pub without_movement: usize,
    pub total_km: f64,
    pub total_km_display: String,
    pub alert_totals: Vec<AlertSlot>,
    pub grand_total_alerts: f64,
}

/// Final report shape handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStructure {
    pub dependencies: Vec<DependencyNode>,
    pub top5_alerts: Vec<AlertRankEntry>,
    pub grand_totals: GrandTotals,
}
