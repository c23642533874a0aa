//! Concurrent analysis orchestrator.
//!
//! The views share no state, so each selected view runs on its own blocking
//! worker over a shared, read-only [`RecordStore`]. The assembled report is
//! identical to the one [`irve_data::analysis::analyze`] produces.

use std::sync::Arc;

use irve_core::error::{AnalysisError, Result};
use irve_data::analysis::{timed_view, AnalysisOptions, AnalysisReport, ViewOutput};
use irve_data::store::RecordStore;
use tokio::task::JoinHandle;

// ── AnalysisOrchestrator ──────────────────────────────────────────────────────

/// Runs the selected views concurrently and assembles the report.
pub struct AnalysisOrchestrator {
    options: Arc<AnalysisOptions>,
}

impl AnalysisOrchestrator {
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Compute every selected view and assemble the report.
    ///
    /// Views are spawned up front and awaited in selection order, so the
    /// report lists them in the same order as the sequential pipeline. A
    /// panicking worker surfaces as [`AnalysisError::Task`].
    pub async fn run(&self, store: Arc<RecordStore>) -> Result<AnalysisReport> {
        tracing::info!(
            views = self.options.views.len(),
            charge_points = store.charge_points().len(),
            predictions = store.predictions().len(),
            "starting concurrent analysis"
        );

        let workers: Vec<JoinHandle<(ViewOutput, f64)>> = self
            .options
            .views
            .iter()
            .map(|&view| {
                let store = Arc::clone(&store);
                let options = Arc::clone(&self.options);
                tokio::task::spawn_blocking(move || timed_view(&store, view, &options))
            })
            .collect();

        let mut outputs = Vec::with_capacity(workers.len());
        for worker in workers {
            let output = worker
                .await
                .map_err(|e| AnalysisError::Task(e.to_string()))?;
            tracing::debug!(view = %output.0.kind(), seconds = output.1, "view finished");
            outputs.push(output);
        }

        Ok(AnalysisReport::assemble(&store, outputs))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
