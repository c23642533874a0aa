mod bootstrap;
mod render;

use std::sync::Arc;

use anyhow::Result;
use irve_core::settings::Settings;
use irve_data::analysis::{analyze, AnalysisOptions};
use irve_data::reader::load_store;
use irve_runtime::orchestrator::AnalysisOrchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    // Flushes the log file writer when main returns.
    let _log_guard = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("irve-viz v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Field: {}, Format: {}",
        settings.view,
        settings.field,
        settings.format
    );

    let charge_points = settings.charge_points_path()?;
    match settings.predictions.as_deref() {
        Some(path) => tracing::info!(
            "Datasets: {} (predictions: {})",
            charge_points.display(),
            path.display()
        ),
        None => tracing::info!("Datasets: {} (no predictions)", charge_points.display()),
    }

    let options = AnalysisOptions {
        views: settings.views()?,
        field: settings.field,
        missing: settings.missing_policy(),
    };

    let store = load_store(charge_points, settings.predictions.as_deref())?;
    for stats in [store.charge_point_stats(), store.prediction_stats()] {
        if !stats.row_errors.is_empty() {
            tracing::warn!(
                "{} of {} rows skipped while loading",
                stats.row_errors.len(),
                stats.rows_read
            );
        }
    }

    let report = if settings.concurrent {
        let orchestrator = AnalysisOrchestrator::new(options);
        tokio::select! {
            result = orchestrator.run(Arc::new(store)) => result?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received; discarding partial results");
                return Ok(());
            }
        }
    } else {
        analyze(&store, &options)
    };

    let rendered = render::render(&report, &settings.format)?;
    render::emit(&rendered, settings.output.as_deref())?;

    Ok(())
}
