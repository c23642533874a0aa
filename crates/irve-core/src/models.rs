use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// One charge point read from the consolidated charge-point dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargePointRecord {
    /// Identifier of the charging connector (`id_pdc_itinerance`). Never empty.
    pub point_id: String,
    /// Identifier of the station hosting the point (`id_station_itinerance`).
    #[serde(default)]
    pub station_id: Option<String>,
    /// Commissioning date; `None` when absent or unparseable.
    #[serde(default)]
    pub install_date: Option<NaiveDate>,
    /// Consolidated latitude. May be absent, NaN or infinite.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Consolidated longitude. May be absent, NaN or infinite.
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Rechargeable vehicles registered in the point's area.
    #[serde(default)]
    pub vehicle_count: u64,
    /// Nominal power in kW.
    #[serde(default)]
    pub nominal_power: Option<f64>,
    /// Installation-site type (`implantation_station`).
    #[serde(default)]
    pub implantation: Option<String>,
    /// Whether the consolidated coordinates were checked as correct.
    #[serde(default)]
    pub lon_lat_correct: Option<bool>,
    /// Whether the INSEE commune code was verified.
    #[serde(default)]
    pub insee_code_verified: Option<bool>,
}

impl ChargePointRecord {
    /// Build a record carrying only its identifiers; every other optional
    /// field is absent and the vehicle count is zero.
    pub fn new(point_id: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            point_id: point_id.into(),
            station_id: Some(station_id.into()),
            install_date: None,
            latitude: None,
            longitude: None,
            department: None,
            region: None,
            vehicle_count: 0,
            nominal_power: None,
            implantation: None,
            lon_lat_correct: None,
            insee_code_verified: None,
        }
    }
}

/// One model-predicted charge point from the secondary dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub point_id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Predicted label, consumed verbatim.
    #[serde(default)]
    pub label: String,
}

// ── Coordinates ───────────────────────────────────────────────────────────────

/// A latitude/longitude pair that passed the validity rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Apply the validity rule: both values present and finite.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(Self {
                latitude: lat,
                longitude: lon,
            }),
            _ => None,
        }
    }
}

/// Records that can be placed on a map.
pub trait Geolocated {
    fn point_id(&self) -> &str;

    /// Validated coordinates, or `None` when the record must stay off the map.
    fn coordinates(&self) -> Option<Coordinates>;
}

impl Geolocated for ChargePointRecord {
    fn point_id(&self) -> &str {
        &self.point_id
    }

    fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

impl Geolocated for PredictionRecord {
    fn point_id(&self) -> &str {
        &self.point_id
    }

    fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

// ── FieldSelector ─────────────────────────────────────────────────────────────

/// The closed set of fields the categorical profiler accepts.
///
/// Selectors parse from and display as their source column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSelector {
    #[serde(rename = "implantation_station")]
    Implantation,
    #[serde(rename = "date_mise_en_service")]
    InstallDate,
    #[serde(rename = "consolidated_is_lon_lat_correct")]
    LonLatCorrect,
    #[serde(rename = "consolidated_is_code_insee_verified")]
    InseeCodeVerified,
    #[serde(rename = "nom_departement")]
    Department,
    #[serde(rename = "puissance_nominale")]
    NominalPower,
}

impl FieldSelector {
    /// Every supported selector, in the order they are offered to users.
    pub const ALL: [FieldSelector; 6] = [
        FieldSelector::Implantation,
        FieldSelector::InstallDate,
        FieldSelector::LonLatCorrect,
        FieldSelector::InseeCodeVerified,
        FieldSelector::Department,
        FieldSelector::NominalPower,
    ];

    /// Source column name for this selector.
    pub fn column_name(self) -> &'static str {
        match self {
            FieldSelector::Implantation => "implantation_station",
            FieldSelector::InstallDate => "date_mise_en_service",
            FieldSelector::LonLatCorrect => "consolidated_is_lon_lat_correct",
            FieldSelector::InseeCodeVerified => "consolidated_is_code_insee_verified",
            FieldSelector::Department => "nom_departement",
            FieldSelector::NominalPower => "puissance_nominale",
        }
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for FieldSelector {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldSelector::ALL
            .into_iter()
            .find(|field| field.column_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalysisError::UnsupportedField(s.to_string()))
    }
}

/// What the profiler does with records whose field value is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Count absent values in their own `Missing` bucket.
    #[default]
    Keep,
    /// Leave absent values out of the distribution.
    Drop,
}

// ── ViewKind ──────────────────────────────────────────────────────────────────

/// The independent analytical views one run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    TimeSeries,
    Profile,
    Map,
    Predictions,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::TimeSeries,
        ViewKind::Profile,
        ViewKind::Map,
        ViewKind::Predictions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::TimeSeries => "timeseries",
            ViewKind::Profile => "profile",
            ViewKind::Map => "map",
            ViewKind::Predictions => "predictions",
        }
    }

    /// Resolve a `--view` value: a single view name, or `"all"`.
    pub fn selection(name: &str) -> Result<Vec<ViewKind>, AnalysisError> {
        if name.eq_ignore_ascii_case("all") {
            return Ok(ViewKind::ALL.to_vec());
        }
        ViewKind::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(name))
            .map(|v| vec![v])
            .ok_or_else(|| AnalysisError::Config(format!("unknown view '{}'", name)))
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
