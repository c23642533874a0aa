//! CSV loading for the charge-point and prediction datasets.
//!
//! Reads the consolidated exports, coerces every cell to its typed field and
//! skips (but records) rows that cannot become a valid record.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use irve_core::data_processors::{CellParser, DateProcessor};
use irve_core::error::{AnalysisError, Result};
use irve_core::models::{ChargePointRecord, PredictionRecord};
use tracing::{debug, warn};

use crate::store::{LoadStats, RecordStore, RowError};

/// Source column names.
pub mod columns {
    pub const POINT_ID: &str = "id_pdc_itinerance";
    pub const STATION_ID: &str = "id_station_itinerance";
    pub const INSTALL_DATE: &str = "date_mise_en_service";
    pub const LATITUDE: &str = "consolidated_latitude";
    pub const LONGITUDE: &str = "consolidated_longitude";
    pub const DEPARTMENT: &str = "nom_departement";
    pub const REGION: &str = "nom_region";
    pub const VEHICLE_COUNT: &str = "nb_vp_rechargeables_el";
    pub const NOMINAL_POWER: &str = "puissance_nominale";
    pub const IMPLANTATION: &str = "implantation_station";
    pub const LON_LAT_CORRECT: &str = "consolidated_is_lon_lat_correct";
    pub const INSEE_VERIFIED: &str = "consolidated_is_code_insee_verified";
    pub const PREDICTION: &str = "prediction";
}

const CHARGE_POINT_DATASET: &str = "charge-point";
const PREDICTION_DATASET: &str = "prediction";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load both datasets into a [`RecordStore`].
///
/// Without a prediction file the store holds no predictions.
pub fn load_store(charge_points: &Path, predictions: Option<&Path>) -> Result<RecordStore> {
    let primary = load_charge_points(charge_points)?;
    let secondary = match predictions {
        Some(path) => load_predictions(path)?,
        None => (Vec::new(), LoadStats::default()),
    };
    Ok(RecordStore::with_stats(primary, secondary))
}

/// Load the consolidated charge-point CSV at `path`.
pub fn load_charge_points(path: &Path) -> Result<(Vec<ChargePointRecord>, LoadStats)> {
    let (records, stats) = read_charge_points(open(path)?)?;
    debug!(
        "Loaded {} charge points from {} ({} rows skipped)",
        stats.rows_kept,
        path.display(),
        stats.row_errors.len()
    );
    Ok((records, stats))
}

/// Load the predicted charge-point CSV at `path`.
pub fn load_predictions(path: &Path) -> Result<(Vec<PredictionRecord>, LoadStats)> {
    let (records, stats) = read_predictions(open(path)?)?;
    debug!(
        "Loaded {} predictions from {} ({} rows skipped)",
        stats.rows_kept,
        path.display(),
        stats.row_errors.len()
    );
    Ok((records, stats))
}

/// Parse charge-point rows from any reader.
pub fn read_charge_points<R: Read>(source: R) -> Result<(Vec<ChargePointRecord>, LoadStats)> {
    let mut reader = csv_reader(source, csv::Trim::All);
    let headers = HeaderMap::new(reader.headers()?);

    let point_id = headers.require(CHARGE_POINT_DATASET, columns::POINT_ID)?;
    let latitude = headers.require(CHARGE_POINT_DATASET, columns::LATITUDE)?;
    let longitude = headers.require(CHARGE_POINT_DATASET, columns::LONGITUDE)?;
    let station_id = headers.optional(columns::STATION_ID);
    let install_date = headers.optional(columns::INSTALL_DATE);
    let department = headers.optional(columns::DEPARTMENT);
    let region = headers.optional(columns::REGION);
    let vehicle_count = headers.optional(columns::VEHICLE_COUNT);
    let nominal_power = headers.optional(columns::NOMINAL_POWER);
    let implantation = headers.optional(columns::IMPLANTATION);
    let lon_lat_correct = headers.optional(columns::LON_LAT_CORRECT);
    let insee_verified = headers.optional(columns::INSEE_VERIFIED);

    read_rows(&mut reader, |row| {
        let id = CellParser::text(cell(row, Some(point_id)))?;
        Some(ChargePointRecord {
            point_id: id,
            station_id: CellParser::text(cell(row, station_id)),
            install_date: DateProcessor::parse(cell(row, install_date)),
            latitude: CellParser::float(cell(row, Some(latitude))),
            longitude: CellParser::float(cell(row, Some(longitude))),
            department: CellParser::text(cell(row, department)),
            region: CellParser::text(cell(row, region)),
            vehicle_count: CellParser::count(cell(row, vehicle_count)),
            nominal_power: CellParser::float(cell(row, nominal_power)),
            implantation: CellParser::text(cell(row, implantation)),
            lon_lat_correct: CellParser::flag(cell(row, lon_lat_correct)),
            insee_code_verified: CellParser::flag(cell(row, insee_verified)),
        })
    })
}

/// Parse prediction rows from any reader.
///
/// Only headers are trimmed here: the label cell is kept exactly as written,
/// and the other cells are trimmed by [`CellParser`].
pub fn read_predictions<R: Read>(source: R) -> Result<(Vec<PredictionRecord>, LoadStats)> {
    let mut reader = csv_reader(source, csv::Trim::Headers);
    let headers = HeaderMap::new(reader.headers()?);

    let point_id = headers.require(PREDICTION_DATASET, columns::POINT_ID)?;
    let latitude = headers.require(PREDICTION_DATASET, columns::LATITUDE)?;
    let longitude = headers.require(PREDICTION_DATASET, columns::LONGITUDE)?;
    let label = headers.optional(columns::PREDICTION);

    read_rows(&mut reader, |row| {
        let id = CellParser::text(cell(row, Some(point_id)))?;
        Some(PredictionRecord {
            point_id: id,
            latitude: CellParser::float(cell(row, Some(latitude))),
            longitude: CellParser::float(cell(row, Some(longitude))),
            label: cell(row, label).to_string(),
        })
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| AnalysisError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_reader<R: Read>(source: R, trim: csv::Trim) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(trim)
        .from_reader(source)
}

/// Drive `map_row` over every data row, collecting records and row errors.
///
/// `map_row` returns `None` when the row has no point id.
fn read_rows<R, T, F>(reader: &mut csv::Reader<R>, mut map_row: F) -> Result<(Vec<T>, LoadStats)>
where
    R: Read,
    F: FnMut(&csv::StringRecord) -> Option<T>,
{
    let mut records = Vec::new();
    let mut stats = LoadStats::default();

    for (idx, result) in reader.records().enumerate() {
        stats.rows_read += 1;
        // records() starts after the header line, and lines are 1-based.
        let fallback_line = idx + 2;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed CSV row at line {}: {}", fallback_line, e);
                stats.row_errors.push(RowError {
                    line: fallback_line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        match map_row(&row) {
            Some(record) => {
                records.push(record);
                stats.rows_kept += 1;
            }
            None => {
                warn!("Skipping row at line {}: empty point id", line);
                stats.row_errors.push(RowError {
                    line,
                    message: format!("empty {}", columns::POINT_ID),
                });
            }
        }
    }

    Ok((records, stats))
}

fn cell(row: &csv::StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

/// Case-insensitive header name → column index lookup.
struct HeaderMap {
    index: HashMap<String, usize>,
}

impl HeaderMap {
    fn new(headers: &csv::StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            // First occurrence wins on duplicate headers.
            index.entry(name.trim().to_lowercase()).or_insert(i);
        }
        Self { index }
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    fn require(&self, dataset: &'static str, column: &'static str) -> Result<usize> {
        self.optional(column)
            .ok_or(AnalysisError::MissingColumn { dataset, column })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
