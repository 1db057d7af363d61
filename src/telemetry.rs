//! Raw per-device datasets as delivered by the fleet-tracking backend.
//!
//! Four collections arrive independently (coordinates, alert events,
//! summary metrics and device metadata), each keyed by device identifier.
//! Any of them may lack entries for a given device.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque device identifier.
///
/// The backend mixes numeric and string identifiers, so both forms are
/// normalized to text on the way in: `7`, `7.0` and `"7"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for DeviceId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Unsigned(u64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => DeviceId::from(n),
            Raw::Unsigned(n) => DeviceId(n.to_string()),
            // f64 Display never uses exponent notation and drops a zero fraction
            Raw::Float(n) => DeviceId(n.to_string()),
            Raw::Text(s) => DeviceId::new(s),
        })
    }
}

/// A GPS fix, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng(pub f64, pub f64);

/// One alert category tally for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl AlertRecord {
    pub fn new(id: i64, category: &str, value: f64) -> Self {
        Self {
            id,
            category: category.to_string(),
            value: Some(value),
            color: None,
        }
    }

    /// Summable magnitude; absent, non-finite and negative values count as zero.
    pub fn amount(&self) -> f64 {
        or_zero(self.value).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTrace {
    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,
    #[serde(default)]
    pub coordinates: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEventList {
    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
}

/// Fuel and mileage summary for one device over the report window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "kilometersTraveled")]
    pub kilometers_traveled: Option<f64>,
    #[serde(default, alias = "kmPerLiter")]
    pub km_per_liter: Option<f64>,
    #[serde(default, alias = "spentGas")]
    pub spent_gas: Option<f64>,
    #[serde(default, alias = "hasMovement")]
    pub has_movement: Option<bool>,
    #[serde(default)]
    pub mileage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub id: DeviceId,
    #[serde(default)]
    pub name: String,
}

/// The four collections returned by a fetch collaborator for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDatasets {
    #[serde(default)]
    pub coordinates: Vec<CoordinateTrace>,
    #[serde(default)]
    pub events: Vec<AlertEventList>,
    #[serde(default)]
    pub summary: Vec<SummaryMetrics>,
    #[serde(default)]
    pub devices: Vec<DeviceMetadata>,
}

/// Treats a missing or NaN number as zero.
pub fn or_zero(value: Option<f64>) -> f64 {
    value.map(finite_or_zero).unwrap_or(0.0)
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Adds two non-negative amounts, capping at `f64::MAX` instead of reaching infinity.
pub fn add_amounts(total: f64, amount: f64) -> f64 {
    (total + amount).min(f64::MAX)
}
