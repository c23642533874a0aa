//! Map overlay for model-predicted charge points.

use irve_core::formatting::prediction_label;
use irve_core::models::{Geolocated, PredictionRecord};

use crate::geo::{ClusterSeries, Marker};

/// Stateless helper building the prediction cluster.
pub struct PredictionOverlay;

impl PredictionOverlay {
    /// One marker per prediction with valid coordinates, in input order.
    ///
    /// The predicted label is copied into the popup as-is.
    pub fn build_prediction_cluster(records: &[PredictionRecord]) -> ClusterSeries {
        let mut series = ClusterSeries::default();

        for record in records {
            match record.coordinates() {
                Some(at) => series.markers.push(Marker::new(
                    &record.point_id,
                    at,
                    prediction_label(&record.point_id, at, &record.label),
                )),
                None => series.skipped += 1,
            }
        }

        series
    }
}
