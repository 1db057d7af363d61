//! Fleet aggregation and classification engine.
//!
//! Raw datasets are joined into one record per device, devices are
//! classified into dependencies and vehicle types, alerts are ranked
//! fleet-wide, and everything is folded into a [`types::ReportStructure`]
//! with totals at every level. Nothing here performs I/O.

pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod join;
pub mod rank;
pub mod sheet;
pub mod types;
pub mod utility;
