//! Per-day aggregation of conversion results for the trend view.
use crate::core::history::ConversionRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mean: f64,
    pub count: usize,
}

/// Groups records by calendar date and averages `result` for each day.
///
/// Points are returned in ascending date order.
pub fn aggregate(history: &[ConversionRecord]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in history {
        let entry = by_date.entry(record.date.date()).or_insert((0.0, 0));
        entry.0 += record.result;
        entry.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| TrendPoint {
            date,
            mean: sum / count as f64,
            count,
        })
        .collect()
}
