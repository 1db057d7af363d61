//! Output formatting and persistence for built reports.
//!
//! Supports pretty-printing, JSON files, and a flat CSV table of the
//! fleet report (one row per dependency and vehicle type, plus totals).

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

use crate::report::types::{AlertSlot, ReportStructure};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    debug!(path, "Writing JSON output");
    let mut file = File::create(path)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Writes the report as a CSV table.
///
/// Alert columns follow the fleet-wide ranking order, so every row holds
/// the same alerts in the same columns.
pub fn write_report_csv(path: &str, report: &ReportStructure) -> Result<()> {
    debug!(path, rows = report.dependencies.len(), "Writing CSV report");

    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header = vec![
        "dependency".to_string(),
        "vehicle_type".to_string(),
        "total".to_string(),
        "with_movement".to_string(),
        "without_movement".to_string(),
        "total_km".to_string(),
    ];
    header.extend(report.top5_alerts.iter().map(|a| a.category.clone()));
    header.push("total_alerts".to_string());
    writer.write_record(&header)?;

    for node in &report.dependencies {
        for aggregate in &node.vehicle_types {
            writer.write_record(row(
                &node.name,
                aggregate.label,
                [aggregate.total, aggregate.with_movement, aggregate.without_movement],
                &aggregate.total_km_display,
                &aggregate.alert_totals,
                aggregate.grand_total_alerts,
            ))?;
        }
    }

    let totals = &report.grand_totals;
    writer.write_record(row(
        "Total",
        "",
        [totals.vehicles, totals.with_movement, totals.without_movement],
        &totals.total_km_display,
        &totals.alert_totals,
        totals.grand_total_alerts,
    ))?;

    writer.flush()?;
    Ok(())
}

fn row(
    dependency: &str,
    vehicle_type: &str,
    counts: [usize; 3],
    km: &str,
    alerts: &[AlertSlot],
    total_alerts: f64,
) -> Vec<String> {
    let mut fields = vec![dependency.to_string(), vehicle_type.to_string()];
    fields.extend(counts.iter().map(|c| c.to_string()));
    fields.push(km.to_string());
    fields.extend(alerts.iter().map(|slot| slot.total.to_string()));
    fields.push(total_alerts.to_string());
    fields
}
