//! In-memory holder for the two validated record collections.

use irve_core::models::{ChargePointRecord, PredictionRecord};
use serde::Serialize;

/// A data row the loader had to skip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based line number in the source file (the header is line 1).
    pub line: usize,
    pub message: String,
}

/// Outcome of loading one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub row_errors: Vec<RowError>,
}

/// Records for one analysis run, owned for the lifetime of that run.
///
/// Every view builder borrows from the store; none of them mutates it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    charge_points: Vec<ChargePointRecord>,
    predictions: Vec<PredictionRecord>,
    charge_point_stats: LoadStats,
    prediction_stats: LoadStats,
}

impl RecordStore {
    /// Build a store from already-validated records.
    pub fn new(charge_points: Vec<ChargePointRecord>, predictions: Vec<PredictionRecord>) -> Self {
        let charge_point_stats = LoadStats {
            rows_read: charge_points.len(),
            rows_kept: charge_points.len(),
            row_errors: Vec::new(),
        };
        let prediction_stats = LoadStats {
            rows_read: predictions.len(),
            rows_kept: predictions.len(),
            row_errors: Vec::new(),
        };
        Self {
            charge_points,
            predictions,
            charge_point_stats,
            prediction_stats,
        }
    }

    /// Build a store carrying the loader's statistics.
    pub fn with_stats(
        charge_points: (Vec<ChargePointRecord>, LoadStats),
        predictions: (Vec<PredictionRecord>, LoadStats),
    ) -> Self {
        Self {
            charge_points: charge_points.0,
            charge_point_stats: charge_points.1,
            predictions: predictions.0,
            prediction_stats: predictions.1,
        }
    }

    pub fn charge_points(&self) -> &[ChargePointRecord] {
        &self.charge_points
    }

    pub fn predictions(&self) -> &[PredictionRecord] {
        &self.predictions
    }

    pub fn charge_point_stats(&self) -> &LoadStats {
        &self.charge_point_stats
    }

    pub fn prediction_stats(&self) -> &LoadStats {
        &self.prediction_stats
    }
}
