//! Analysis pipeline over a loaded [`RecordStore`].
//!
//! Each view is an independent pure function of the store; this module runs
//! the selected ones in sequence and assembles an [`AnalysisReport`] for the
//! presentation layer.

use std::time::Instant;

use chrono::Utc;
use irve_core::models::{FieldSelector, MissingPolicy, ViewKind};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::{MonthlyAggregator, MonthlyBucket};
use crate::geo::{ClusterSeries, GeoClusterBuilder, GeoClusters};
use crate::prediction::PredictionOverlay;
use crate::profiler::{CategoricalProfiler, CategoryDistribution};
use crate::store::{LoadStats, RecordStore};

// ── Public types ──────────────────────────────────────────────────────────────

/// A public dataset the analysis draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSource {
    pub name: &'static str,
    pub documentation: &'static str,
}

/// Attributions shown alongside the views.
pub const DATASET_SOURCES: [DatasetSource; 2] = [
    DatasetSource {
        name: "Fichier consolidé des Bornes de Recharge pour Véhicules Électriques",
        documentation: "https://www.data.gouv.fr/fr/datasets/fichier-consolide-des-bornes-de-recharge-pour-vehicules-electriques/",
    },
    DatasetSource {
        name: "Voitures particulières immatriculées par commune et par type de recharge",
        documentation: "https://www.data.gouv.fr/fr/datasets/voitures-particulieres-immatriculees-par-commune-et-par-type-de-recharge-jeu-de-donnees-aaadata/",
    },
];

/// Which views to compute and how to profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub views: Vec<ViewKind>,
    pub field: FieldSelector,
    pub missing: MissingPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            views: ViewKind::ALL.to_vec(),
            field: FieldSelector::Implantation,
            missing: MissingPolicy::Keep,
        }
    }
}

impl AnalysisOptions {
    pub fn includes(&self, view: ViewKind) -> bool {
        self.views.contains(&view)
    }
}

/// The result of computing one view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    TimeSeries(Vec<MonthlyBucket>),
    Profile(CategoryDistribution),
    Map(GeoClusters),
    Predictions(ClusterSeries),
}

impl ViewOutput {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewOutput::TimeSeries(_) => ViewKind::TimeSeries,
            ViewOutput::Profile(_) => ViewKind::Profile,
            ViewOutput::Map(_) => ViewKind::Map,
            ViewOutput::Predictions(_) => ViewKind::Predictions,
        }
    }
}

/// Record counts for one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub rows_read: usize,
    pub records: usize,
    pub rows_skipped: usize,
}

impl From<&LoadStats> for DatasetSummary {
    fn from(stats: &LoadStats) -> Self {
        Self {
            rows_read: stats.rows_read,
            records: stats.rows_kept,
            rows_skipped: stats.row_errors.len(),
        }
    }
}

/// Wall-clock time spent on one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewTiming {
    pub view: ViewKind,
    pub seconds: f64,
}

/// Metadata produced alongside the views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    pub charge_points: DatasetSummary,
    pub predictions: DatasetSummary,
    pub timings: Vec<ViewTiming>,
}

/// Everything one analysis run hands to the presentation layer.
///
/// Views that were not selected are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub metadata: AnalysisMetadata,
    pub sources: Vec<DatasetSource>,
    pub monthly: Option<Vec<MonthlyBucket>>,
    pub distribution: Option<CategoryDistribution>,
    pub map: Option<GeoClusters>,
    pub predictions: Option<ClusterSeries>,
}

impl AnalysisReport {
    /// Assemble a report from computed views and their timings.
    pub fn assemble(store: &RecordStore, outputs: Vec<(ViewOutput, f64)>) -> Self {
        let mut report = AnalysisReport {
            metadata: AnalysisMetadata {
                generated_at: Utc::now().to_rfc3339(),
                charge_points: DatasetSummary::from(store.charge_point_stats()),
                predictions: DatasetSummary::from(store.prediction_stats()),
                timings: Vec::with_capacity(outputs.len()),
            },
            sources: DATASET_SOURCES.to_vec(),
            monthly: None,
            distribution: None,
            map: None,
            predictions: None,
        };

        for (output, seconds) in outputs {
            report.metadata.timings.push(ViewTiming {
                view: output.kind(),
                seconds,
            });
            match output {
                ViewOutput::TimeSeries(buckets) => report.monthly = Some(buckets),
                ViewOutput::Profile(dist) => report.distribution = Some(dist),
                ViewOutput::Map(geo) => report.map = Some(geo),
                ViewOutput::Predictions(series) => report.predictions = Some(series),
            }
        }

        report
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Compute a single view over `store`.
pub fn compute_view(store: &RecordStore, view: ViewKind, options: &AnalysisOptions) -> ViewOutput {
    match view {
        ViewKind::TimeSeries => {
            ViewOutput::TimeSeries(MonthlyAggregator::aggregate_by_month(store.charge_points()))
        }
        ViewKind::Profile => ViewOutput::Profile(CategoricalProfiler::profile_with(
            store.charge_points(),
            options.field,
            options.missing,
        )),
        ViewKind::Map => {
            let geo = GeoClusterBuilder::build_clusters(store.charge_points());
            debug!(
                "Map view: {} markers, {} regions, {} skipped for coordinates, {} without region",
                geo.point_clusters.len(),
                geo.region_clusters.len(),
                geo.point_clusters.skipped,
                geo.unassigned_region
            );
            ViewOutput::Map(geo)
        }
        ViewKind::Predictions => {
            let series = PredictionOverlay::build_prediction_cluster(store.predictions());
            debug!(
                "Prediction view: {} markers, {} skipped for coordinates",
                series.len(),
                series.skipped
            );
            ViewOutput::Predictions(series)
        }
    }
}

/// Compute `view` and measure how long it took.
pub fn timed_view(
    store: &RecordStore,
    view: ViewKind,
    options: &AnalysisOptions,
) -> (ViewOutput, f64) {
    let start = Instant::now();
    let output = compute_view(store, view, options);
    (output, start.elapsed().as_secs_f64())
}

/// Run every selected view in sequence.
pub fn analyze(store: &RecordStore, options: &AnalysisOptions) -> AnalysisReport {
    info!(
        "Analysing {} charge points and {} predictions",
        store.charge_points().len(),
        store.predictions().len()
    );

    let outputs = options
        .views
        .iter()
        .map(|&view| timed_view(store, view, options))
        .collect();

    AnalysisReport::assemble(store, outputs)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
