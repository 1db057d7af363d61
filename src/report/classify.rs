//! Maps devices to dependencies and vehicle types from their names.
//!
//! Coded groups name their devices `<prefix>-<code><rest>`: the first
//! letter of the code selects the dependency and the second selects the
//! vehicle type (`M` for motorcycles). Anything that does not fit lands in
//! the default dependency as a regular vehicle.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::report::types::{DependencyBuckets, UnifiedDeviceRecord, VehicleType};

/// Group id whose devices carry dependency codes in their names.
pub const MULTI_DEPENDENCY_GROUP: i64 = 16;

pub const DEFAULT_DEPENDENCY: &str = "Other";

/// Dependency code letters and their display names.
static DEPENDENCY_CODES: &[(char, &str)] = &[
    ('P', "Policía Municipal"),
    ('T', "Tránsito"),
    ('F', "Fiscalización"),
    ('C', "Centro de Mando"),
    ('U', "Policía Turística"),
    ('I', "Inteligencia"),
    ('G', "Unidad de Género"),
    ('K', "Unidad Canina"),
    ('S', "Seguridad Ciudadana"),
    ('E', "Protección Civil"),
];

/// Immutable letter to dependency-name mapping with an explicit default.
#[derive(Debug, Clone)]
pub struct DependencyTable {
    codes: HashMap<char, &'static str>,
    default: &'static str,
}

impl Default for DependencyTable {
    fn default() -> Self {
        Self {
            codes: DEPENDENCY_CODES.iter().copied().collect(),
            default: DEFAULT_DEPENDENCY,
        }
    }
}

impl DependencyTable {
    /// Case-insensitive lookup, falling back to the default name.
    pub fn lookup(&self, letter: char) -> &'static str {
        self.codes
            .get(&letter.to_ascii_uppercase())
            .copied()
            .unwrap_or(self.default)
    }

    pub fn default_name(&self) -> &'static str {
        self.default
    }
}

/// Identifies the device group a report is requested for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupDescriptor {
    pub group_id: i64,
    pub group_name: String,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    pub table: DependencyTable,
    pub multi_dependency_group: i64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            table: DependencyTable::default(),
            multi_dependency_group: MULTI_DEPENDENCY_GROUP,
        }
    }
}

impl Classifier {
    pub fn with_group(multi_dependency_group: i64) -> Self {
        Self {
            multi_dependency_group,
            ..Default::default()
        }
    }

    pub fn is_coded(&self, group: &GroupDescriptor) -> bool {
        group.group_id == self.multi_dependency_group
    }
}

/// Assigns exactly one (dependency, vehicle type) pair to a device name.
pub fn classify_name(name: &str, table: &DependencyTable) -> (&'static str, VehicleType) {
    let fallback = (table.default_name(), VehicleType::Vehicle);

    let segments: Vec<&str> = name.split('-').collect();
    if segments.len() < 3 {
        return fallback;
    }

    let mut code = segments[1].chars();
    let (Some(letter), Some(kind)) = (code.next(), code.next()) else {
        return fallback;
    };

    let vehicle_type = if kind.eq_ignore_ascii_case(&'M') {
        VehicleType::Motorcycle
    } else {
        VehicleType::Vehicle
    };

    (table.lookup(letter), vehicle_type)
}

/// Groups devices by dependency, in first-seen order.
///
/// Groups other than the coded one are reported as a single dependency
/// named after the group, with every device counted as a vehicle.
#[tracing::instrument(skip(records, classifier), fields(devices = records.len()))]
pub fn classify(
    records: Vec<UnifiedDeviceRecord>,
    group: &GroupDescriptor,
    classifier: &Classifier,
) -> Vec<DependencyBuckets> {
    if !classifier.is_coded(group) {
        let mut single = DependencyBuckets::new(&group.group_name);
        single.vehicles = records;
        return vec![single];
    }

    let mut dependencies: Vec<DependencyBuckets> = Vec::new();
    let mut index: HashMap<&'static str, usize> = HashMap::new();

    for record in records {
        let (dependency, vehicle_type) = classify_name(&record.name, &classifier.table);
        if dependency == classifier.table.default_name() {
            debug!(device = %record.name, "Device name has no known dependency code");
        }

        let slot = *index.entry(dependency).or_insert_with(|| {
            dependencies.push(DependencyBuckets::new(dependency));
            dependencies.len() - 1
        });
        dependencies[slot].push(vehicle_type, record);
    }

    debug!(dependencies = dependencies.len(), "Devices classified");
    dependencies
}
