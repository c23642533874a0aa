//! Installation volume by calendar month.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use irve_core::models::ChargePointRecord;
use irve_core::time_utils::{month_label, month_start, same_month};
use serde::Serialize;

// ── MonthlyBucket ─────────────────────────────────────────────────────────────

/// Charge points commissioned during one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    /// First day of the month.
    pub month: NaiveDate,
    /// Number of charge points installed that month.
    pub point_count: usize,
    /// Number of distinct known station ids among those points.
    pub station_count: usize,
}

impl MonthlyBucket {
    /// `"%Y-%m"` label for display.
    pub fn label(&self) -> String {
        month_label(self.month)
    }

    /// Whether `date` falls in this bucket's month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        same_month(self.month, date)
    }
}

/// Running state for one month while records are scanned.
#[derive(Default)]
struct MonthAccumulator<'a> {
    points: usize,
    stations: HashSet<&'a str>,
}

impl<'a> MonthAccumulator<'a> {
    fn add(&mut self, record: &'a ChargePointRecord) {
        self.points += 1;
        // Points without a station id do not count as a station.
        if let Some(station) = record.station_id.as_deref() {
            self.stations.insert(station);
        }
    }
}

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that buckets charge points by commissioning month.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// Bucket `records` by the month of their install date.
    ///
    /// Records without an install date are left out. Buckets come back in
    /// ascending month order, only for months that have at least one record.
    pub fn aggregate_by_month(records: &[ChargePointRecord]) -> Vec<MonthlyBucket> {
        // BTreeMap keeps the months sorted and unique.
        let mut months: BTreeMap<NaiveDate, MonthAccumulator<'_>> = BTreeMap::new();

        for record in records {
            let Some(date) = record.install_date else {
                continue;
            };
            months.entry(month_start(date)).or_default().add(record);
        }

        months
            .into_iter()
            .map(|(month, acc)| MonthlyBucket {
                month,
                point_count: acc.points,
                station_count: acc.stations.len(),
            })
            .collect()
    }

    /// Total number of points across `buckets`.
    pub fn total_points(buckets: &[MonthlyBucket]) -> usize {
        buckets.iter().map(|b| b.point_count).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
