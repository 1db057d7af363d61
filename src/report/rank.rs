//! Fleet-wide alert tally and top-K selection.

use std::collections::HashMap;
use tracing::debug;

use crate::error::ReportError;
use crate::report::types::{AlertRankEntry, UnifiedDeviceRecord};
use crate::telemetry::add_amounts;

/// Number of alert categories broken out as report columns.
pub const TOP_ALERTS: usize = 5;

/// Sums alert values per id across the fleet, in first-seen id order.
///
/// The category of an id is the one carried by its first record. Raw
/// amounts are summed as they are, without rounding each record first.
pub fn tally_alerts(records: &[UnifiedDeviceRecord]) -> Vec<AlertRankEntry> {
    let (entries, _) = records.iter().flat_map(|r| r.alerts.iter()).fold(
        (Vec::<AlertRankEntry>::new(), HashMap::<i64, usize>::new()),
        |(mut entries, mut index), alert| {
            match index.get(&alert.id) {
                Some(&slot) => {
                    entries[slot].total = add_amounts(entries[slot].total, alert.amount())
                }
                None => {
                    index.insert(alert.id, entries.len());
                    entries.push(AlertRankEntry {
                        id: alert.id,
                        category: alert.category.clone(),
                        total: alert.amount(),
                    });
                }
            }
            (entries, index)
        },
    );
    entries
}

/// Selects the `k` most frequent alert ids fleet-wide.
///
/// Ids whose total is not positive are dropped. Equal totals keep first-seen order
/// and fewer than `k` entries are returned when fewer qualify.
pub fn rank_alerts(
    records: &[UnifiedDeviceRecord],
    k: usize,
) -> Result<Vec<AlertRankEntry>, ReportError> {
    if k == 0 {
        return Err(ReportError::InvalidRankSize(k));
    }

    let mut ranked: Vec<AlertRankEntry> = tally_alerts(records)
        .into_iter()
        .filter(|entry| entry.total > 0.0)
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    ranked.truncate(k);

    debug!(ranked = ranked.len(), k, "Alert ranking computed");
    Ok(ranked)
}
