//! Text renderings of an [`AnalysisReport`].

use std::fmt::Write as _;
use std::path::Path;

use irve_core::formatting::{format_count, percentage};
use irve_data::analysis::{AnalysisReport, DatasetSummary};

/// Profile rows shown before the remainder is folded into one line.
const TOP_VALUES: usize = 10;

/// Render `report` in the named format (`json` or `summary`).
pub fn render(report: &AnalysisReport, format: &str) -> anyhow::Result<String> {
    match format {
        "json" => render_json(report),
        "summary" => Ok(render_summary(report)),
        other => anyhow::bail!("unknown output format: {other}"),
    }
}

pub fn render_json(report: &AnalysisReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Plain-text overview of every computed view.
pub fn render_summary(report: &AnalysisReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, report);
    out
}

/// Write `rendered` to `output`, or to stdout when no path is given.
pub fn emit(rendered: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

// ── Summary sections ──────────────────────────────────────────────────────────

fn write_summary(out: &mut String, report: &AnalysisReport) -> std::fmt::Result {
    write_dataset(out, "Charge points", &report.metadata.charge_points)?;
    write_dataset(out, "Predictions", &report.metadata.predictions)?;

    if let Some(monthly) = &report.monthly {
        writeln!(out, "\nCommissioning by month")?;
        if monthly.is_empty() {
            writeln!(out, "  (no dated charge points)")?;
        }
        for bucket in monthly {
            writeln!(
                out,
                "  {}  {:>8} points  {:>8} stations",
                bucket.label(),
                format_count(bucket.point_count as u64),
                format_count(bucket.station_count as u64)
            )?;
        }
    }

    if let Some(dist) = &report.distribution {
        let total = dist.total() as u64;
        writeln!(
            out,
            "\nDistribution of {} ({} values)",
            dist.field,
            dist.entries.len()
        )?;
        for entry in dist.entries.iter().take(TOP_VALUES) {
            writeln!(
                out,
                "  {:<40} {:>8}  {:>5.1}%",
                entry.value.to_string(),
                format_count(entry.count as u64),
                percentage(entry.count as u64, total, 1)
            )?;
        }
        if dist.entries.len() > TOP_VALUES {
            writeln!(out, "  ... and {} more", dist.entries.len() - TOP_VALUES)?;
        }
    }

    if let Some(map) = &report.map {
        writeln!(
            out,
            "\nMap centred on {:.6}, {:.6} at zoom {}",
            map.view.center.latitude, map.view.center.longitude, map.view.zoom
        )?;
        writeln!(
            out,
            "  {} charge-point markers ({} without coordinates, {} without region)",
            format_count(map.point_clusters.len() as u64),
            format_count(map.point_clusters.skipped as u64),
            format_count(map.unassigned_region as u64)
        )?;
        for cluster in map.region_clusters.iter() {
            writeln!(
                out,
                "  {:<40} {:>8}",
                cluster.region,
                format_count(cluster.markers.len() as u64)
            )?;
        }
    }

    if let Some(predictions) = &report.predictions {
        writeln!(
            out,
            "\nPredicted charge points: {} markers ({} without coordinates)",
            format_count(predictions.len() as u64),
            format_count(predictions.skipped as u64)
        )?;
    }

    writeln!(out, "\nSources")?;
    for source in &report.sources {
        writeln!(out, "  {}\n    {}", source.name, source.documentation)?;
    }
    Ok(())
}

fn write_dataset(out: &mut String, name: &str, summary: &DatasetSummary) -> std::fmt::Result {
    writeln!(
        out,
        "{name}: {} records ({} rows read, {} skipped)",
        format_count(summary.records as u64),
        format_count(summary.rows_read as u64),
        format_count(summary.rows_skipped as u64)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use irve_core::models::{ChargePointRecord, FieldSelector, ViewKind};
    use irve_data::analysis::{analyze, AnalysisOptions};
    use irve_data::store::RecordStore;
    use tempfile::TempDir;

    fn sample_report(views: Vec<ViewKind>) -> AnalysisReport {
        let records: Vec<ChargePointRecord> = (0..12)
            .map(|i| {
                let mut r = ChargePointRecord::new(format!("P{i}"), "S1");
                r.install_date = NaiveDate::from_ymd_opt(2023, 3, 1);
                r.latitude = Some(48.0);
                r.longitude = Some(2.0);
                r.region = Some("Île-de-France".to_string());
                r.implantation = Some(format!("Type {i}"));
                r
            })
            .collect();
        let store = RecordStore::new(records, vec![]);
        let options = AnalysisOptions {
            views,
            field: FieldSelector::Implantation,
            ..AnalysisOptions::default()
        };
        analyze(&store, &options)
    }

    #[test]
    fn test_summary_lists_every_view() {
        let text = render_summary(&sample_report(ViewKind::ALL.to_vec()));

        assert!(text.starts_with("Charge points: 12 records (12 rows read, 0 skipped)"));
        assert!(text.contains("2023-03"));
        assert!(text.contains("Distribution of implantation_station (12 values)"));
        assert!(text.contains("... and 2 more"));
        assert!(text.contains("Map centred on 46.603354, 1.888334 at zoom 6"));
        assert!(text.contains("Île-de-France"));
        assert!(text.contains("Predicted charge points: 0 markers"));
        assert!(text.contains("data.gouv.fr"));
    }

    #[test]
    fn test_summary_omits_unselected_views() {
        let text = render_summary(&sample_report(vec![ViewKind::TimeSeries]));

        assert!(text.contains("Commissioning by month"));
        assert!(!text.contains("Distribution of"));
        assert!(!text.contains("Map centred"));
        assert!(!text.contains("Predicted charge points"));
    }

    #[test]
    fn test_render_json_is_valid() {
        let json = render(&sample_report(vec![ViewKind::Map]), "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["map"]["point_clusters"]["markers"].as_array().unwrap().len(), 12);
        assert!(value["monthly"].is_null());
    }

    #[test]
    fn test_render_unknown_format() {
        assert!(render(&sample_report(vec![]), "html").is_err());
    }

    #[test]
    fn test_emit_writes_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");

        emit("hello", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }
}
