use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::models::{FieldSelector, MissingPolicy, ViewKind};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Analyse electric-vehicle charge-point datasets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "irve-viz",
    about = "Monthly, categorical and map views over EV charge-point datasets",
    version
)]
pub struct Settings {
    /// Consolidated charge-point CSV
    #[arg(long, value_name = "PATH")]
    pub charge_points: Option<PathBuf>,

    /// Predicted charge-point CSV
    #[arg(long, value_name = "PATH")]
    pub predictions: Option<PathBuf>,

    /// Run without predictions and forget the saved prediction path
    #[arg(long, conflicts_with = "predictions")]
    pub no_predictions: bool,

    /// Which view to compute
    #[arg(long, default_value = "all", value_parser = ["all", "timeseries", "profile", "map", "predictions"])]
    pub view: String,

    /// Field for the frequency distribution
    #[arg(long, default_value = "implantation_station")]
    pub field: FieldSelector,

    /// Leave absent values out of the frequency distribution
    #[arg(long)]
    pub drop_missing: bool,

    /// Output format
    #[arg(long, default_value = "summary", value_parser = ["json", "summary"])]
    pub format: String,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Compute the views concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.irve-viz/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_points: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default path of the persisted file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// The config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".irve-viz").join("last_used.json")
    }

    /// Load persisted params; `Default` when absent or unparseable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, fill in unset values from the last run, and
    /// persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // Command-line values always win over persisted ones.
        if settings.charge_points.is_none() {
            settings.charge_points = last.charge_points;
        }
        if settings.predictions.is_none() && !settings.no_predictions {
            settings.predictions = last.predictions;
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "field") {
            if let Some(f) = last.field {
                settings.field = f;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(f) = last.format {
                settings.format = f;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Path of the primary dataset; required for every run.
    pub fn charge_points_path(&self) -> Result<&Path> {
        self.charge_points.as_deref().ok_or_else(|| {
            AnalysisError::Config(
                "no charge-point dataset given (use --charge-points)".to_string(),
            )
        })
    }

    /// Views selected by `--view`.
    pub fn views(&self) -> Result<Vec<ViewKind>> {
        ViewKind::selection(&self.view)
    }

    pub fn missing_policy(&self) -> MissingPolicy {
        if self.drop_missing {
            MissingPolicy::Drop
        } else {
            MissingPolicy::Keep
        }
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            charge_points: s.charge_points.clone(),
            predictions: s.predictions.clone(),
            view: Some(s.view.clone()),
            field: Some(s.field),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    // ── LastUsedParams ────────────────────────────────────────────────────────

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            charge_points: Some(PathBuf::from("/data/irve.csv")),
            predictions: Some(PathBuf::from("/data/pred.csv")),
            view: Some("map".to_string()),
            field: Some(FieldSelector::Department),
            format: Some("json".to_string()),
        };

        params.save_to(&path).expect("save");
        let loaded = LastUsedParams::load_from(&path);

        assert_eq!(loaded.charge_points, Some(PathBuf::from("/data/irve.csv")));
        assert_eq!(loaded.predictions, Some(PathBuf::from("/data/pred.csv")));
        assert_eq!(loaded.view, Some("map".to_string()));
        assert_eq!(loaded.field, Some(FieldSelector::Department));
        assert_eq!(loaded.format, Some("json".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.charge_points.is_none());
        assert!(loaded.field.is_none());
    }

    #[test]
    fn test_last_used_params_default_when_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let loaded = LastUsedParams::load_from(&path);
        assert!(loaded.view.is_none());
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    // ── Settings parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["irve-viz"]);

        assert!(settings.charge_points.is_none());
        assert!(settings.predictions.is_none());
        assert_eq!(settings.view, "all");
        assert_eq!(settings.field, FieldSelector::Implantation);
        assert!(!settings.drop_missing);
        assert_eq!(settings.format, "summary");
        assert!(settings.output.is_none());
        assert!(!settings.concurrent);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
        assert!(!settings.no_predictions);
    }

    #[test]
    fn test_settings_cli_field() {
        let settings = Settings::parse_from(["irve-viz", "--field", "puissance_nominale"]);
        assert_eq!(settings.field, FieldSelector::NominalPower);
    }

    #[test]
    fn test_settings_cli_unsupported_field_rejected() {
        let result = Settings::try_parse_from(["irve-viz", "--field", "nom_commune"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_missing_policy() {
        let keep = Settings::parse_from(["irve-viz"]);
        assert_eq!(keep.missing_policy(), MissingPolicy::Keep);

        let drop = Settings::parse_from(["irve-viz", "--drop-missing"]);
        assert_eq!(drop.missing_policy(), MissingPolicy::Drop);
    }

    #[test]
    fn test_settings_views() {
        let settings = Settings::parse_from(["irve-viz", "--view", "profile"]);
        assert_eq!(settings.views().unwrap(), vec![ViewKind::Profile]);
    }

    #[test]
    fn test_charge_points_path_required() {
        let settings = Settings::parse_from(["irve-viz"]);
        let err = settings.charge_points_path().unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));

        let settings = Settings::parse_from(["irve-viz", "--charge-points", "a.csv"]);
        assert_eq!(settings.charge_points_path().unwrap(), Path::new("a.csv"));
    }

    // ── load_with_last_used ───────────────────────────────────────────────────

    #[test]
    fn test_load_with_last_used_fills_unset_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            charge_points: Some(PathBuf::from("/data/irve.csv")),
            field: Some(FieldSelector::InstallDate),
            view: Some("timeseries".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(vec!["irve-viz".into()], &config_path);

        assert_eq!(settings.charge_points, Some(PathBuf::from("/data/irve.csv")));
        assert_eq!(settings.field, FieldSelector::InstallDate);
        assert_eq!(settings.view, "timeseries");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            charge_points: Some(PathBuf::from("/old.csv")),
            field: Some(FieldSelector::InstallDate),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec![
                "irve-viz".into(),
                "--charge-points".into(),
                "/new.csv".into(),
                "--field".into(),
                "nom_departement".into(),
            ],
            &config_path,
        );

        assert_eq!(settings.charge_points, Some(PathBuf::from("/new.csv")));
        assert_eq!(settings.field, FieldSelector::Department);
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["irve-viz".into(), "--format".into(), "json".into()],
            &config_path,
        );

        assert!(config_path.exists());
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.format, Some("json".to_string()));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        Settings::load_with_last_used_impl(
            vec!["irve-viz".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_reuses_saved_predictions() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            predictions: Some(PathBuf::from("/data/pred.csv")),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(vec!["irve-viz".into()], &config_path);
        assert_eq!(settings.predictions, Some(PathBuf::from("/data/pred.csv")));
    }

    #[test]
    fn test_load_with_last_used_no_predictions_forgets_saved_path() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            charge_points: Some(PathBuf::from("/data/irve.csv")),
            predictions: Some(PathBuf::from("/data/pred.csv")),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["irve-viz".into(), "--no-predictions".into()],
            &config_path,
        );
        assert!(settings.predictions.is_none());
        assert_eq!(settings.charge_points, Some(PathBuf::from("/data/irve.csv")));

        // The next plain run no longer picks the old path up.
        let next = Settings::load_with_last_used_impl(vec!["irve-viz".into()], &config_path);
        assert!(next.predictions.is_none());
    }

    #[test]
    fn test_settings_no_predictions_conflicts_with_path() {
        let result = Settings::try_parse_from([
            "irve-viz",
            "--predictions",
            "/data/pred.csv",
            "--no-predictions",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["irve-viz".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
