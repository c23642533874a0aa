//! Text produced for the presentation layer: marker popup labels and the
//! number formatting used by the plain-text summary.

use crate::models::Coordinates;

/// Line separator inside marker popups (the map widget renders HTML).
pub const LABEL_SEPARATOR: &str = "<br>";

/// Placeholder shown for an absent department or region name.
const UNKNOWN: &str = "n/a";

// ── Marker labels ─────────────────────────────────────────────────────────────

/// Popup text for a charge-point marker.
///
/// ```
/// use irve_core::formatting::charge_point_label;
/// use irve_core::models::Coordinates;
///
/// let at = Coordinates { latitude: 48.85, longitude: 2.35 };
/// assert_eq!(
///     charge_point_label("FRA01P1", at, Some("Paris")),
///     "ID: FRA01P1<br>Latitude: 48.85<br>Longitude: 2.35<br>Département: Paris"
/// );
/// ```
pub fn charge_point_label(point_id: &str, at: Coordinates, department: Option<&str>) -> String {
    join_lines(&[
        location_lines(point_id, at),
        format!("Département: {}", department.unwrap_or(UNKNOWN)),
    ])
}

/// Popup text for a marker in a region's vehicle-count cluster.
pub fn region_label(point_id: &str, at: Coordinates, region: &str, vehicle_count: u64) -> String {
    join_lines(&[
        location_lines(point_id, at),
        format!("Région: {}", region),
        format!("Nombre de véhicules électriques: {}", vehicle_count),
    ])
}

/// Popup text for a predicted charge point. The label is shown verbatim.
pub fn prediction_label(point_id: &str, at: Coordinates, predicted: &str) -> String {
    join_lines(&[
        location_lines(point_id, at),
        format!("Prédiction: {}", predicted),
    ])
}

fn location_lines(point_id: &str, at: Coordinates) -> String {
    join_lines(&[
        format!("ID: {}", point_id),
        format!("Latitude: {}", at.latitude),
        format!("Longitude: {}", at.longitude),
    ])
}

fn join_lines(lines: &[String]) -> String {
    lines.join(LABEL_SEPARATOR)
}

// ── Numbers ───────────────────────────────────────────────────────────────────

/// Format a count with comma thousands separators.
///
/// ```
/// use irve_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// `(part / whole) * 100` rounded to `decimal_places`; `0.0` when `whole` is 0.
pub fn percentage(part: u64, whole: u64, decimal_places: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = (part as f64 / whole as f64) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
