use chrono::NaiveDate;
use tracing::warn;

/// Spellings the upstream exports use for an empty cell.
const NULL_SPELLINGS: &[&str] = &["nan", "null", "none", "na", "n/a"];

// ── DateProcessor ─────────────────────────────────────────────────────────────

/// Parses commissioning dates from the formats found in the consolidated export.
pub struct DateProcessor;

impl DateProcessor {
    /// Parse a cell into a calendar date.
    ///
    /// Accepts ISO dates, ISO date-times (the time part is discarded), and the
    /// day-first / slash-separated variants. Returns `None` for null cells and
    /// for anything unparseable.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let s = CellParser::text(raw)?;

        const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&s, fmt) {
                return Some(date);
            }
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(&s, fmt) {
                return Some(naive.date());
            }
        }

        // RFC 3339 with an explicit offset keeps the local calendar date.
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
            return Some(dt.date_naive());
        }

        warn!("DateProcessor: could not parse date \"{}\"", s);
        None
    }
}

// ── CellParser ────────────────────────────────────────────────────────────────

/// Type coercion for raw CSV cells.
pub struct CellParser;

impl CellParser {
    /// Trimmed text, or `None` for empty and null-spelled cells.
    pub fn text(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || Self::is_null(trimmed) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Parse a float, accepting a decimal comma.
    ///
    /// Null-spelled cells (including `nan`) are `None`. Explicit infinities
    /// parse through so the coordinate validity rule can reject them.
    pub fn float(raw: &str) -> Option<f64> {
        let s = Self::text(raw)?;
        let normalised = s.replace(',', ".");
        match normalised.parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("CellParser: could not parse number \"{}\"", s);
                None
            }
        }
    }

    /// Parse a boolean flag in any of the spellings the exports use.
    pub fn flag(raw: &str) -> Option<bool> {
        let s = Self::text(raw)?.to_lowercase();
        match s.as_str() {
            "true" | "1" | "yes" | "oui" | "vrai" => Some(true),
            "false" | "0" | "no" | "non" | "faux" => Some(false),
            _ => {
                warn!("CellParser: unrecognised flag value \"{}\"", s);
                None
            }
        }
    }

    /// Parse a non-negative count; integral floats such as `150.0` are
    /// accepted. Absent, fractional or negative values coerce to zero.
    pub fn count(raw: &str) -> u64 {
        match Self::float(raw) {
            Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => v as u64,
            Some(v) => {
                warn!("CellParser: invalid count {}, using 0", v);
                0
            }
            None => 0,
        }
    }

    fn is_null(s: &str) -> bool {
        NULL_SPELLINGS.iter().any(|n| n.eq_ignore_ascii_case(s))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    // ── DateProcessor ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_iso_date() {
        let d = DateProcessor::parse("2023-01-15").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2023, 1, 15));
    }

    #[test]
    fn test_parse_iso_datetime_drops_time() {
        let d = DateProcessor::parse("2022-11-30T23:59:59").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2022, 11, 30).unwrap());

        let d = DateProcessor::parse("2022-11-30 08:15:00.250").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2022, 11, 30).unwrap());
    }

    #[test]
    fn test_parse_day_first_date() {
        let d = DateProcessor::parse("05/03/2021").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_keeps_local_date() {
        let d = DateProcessor::parse("2021-06-01T00:30:00+02:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
    }

    #[test]
    fn test_parse_date_null_and_garbage() {
        assert!(DateProcessor::parse("").is_none());
        assert!(DateProcessor::parse("NaN").is_none());
        assert!(DateProcessor::parse("2023-13-45").is_none());
        assert!(DateProcessor::parse("bientôt").is_none());
    }

    // ── CellParser::text ─────────────────────────────────────────────────────

    #[test]
    fn test_text_trims_and_nulls() {
        assert_eq!(CellParser::text("  Voirie  "), Some("Voirie".to_string()));
        assert!(CellParser::text("   ").is_none());
        assert!(CellParser::text("None").is_none());
        assert!(CellParser::text("N/A").is_none());
    }

    // ── CellParser::float ────────────────────────────────────────────────────

    #[test]
    fn test_float_plain_and_decimal_comma() {
        assert_eq!(CellParser::float("48.8566"), Some(48.8566));
        assert_eq!(CellParser::float("2,3522"), Some(2.3522));
    }

    #[test]
    fn test_float_nan_is_absent() {
        assert!(CellParser::float("nan").is_none());
        assert!(CellParser::float("").is_none());
    }

    #[test]
    fn test_float_infinity_parses_through() {
        assert_eq!(CellParser::float("inf"), Some(f64::INFINITY));
    }

    #[test]
    fn test_float_garbage_is_absent() {
        assert!(CellParser::float("quarante-huit").is_none());
    }

    // ── CellParser::flag ─────────────────────────────────────────────────────

    #[test]
    fn test_flag_spellings() {
        assert_eq!(CellParser::flag("True"), Some(true));
        assert_eq!(CellParser::flag("false"), Some(false));
        assert_eq!(CellParser::flag("1"), Some(true));
        assert_eq!(CellParser::flag("non"), Some(false));
        assert_eq!(CellParser::flag("peut-être"), None);
        assert_eq!(CellParser::flag(""), None);
    }

    // ── CellParser::count ────────────────────────────────────────────────────

    #[test]
    fn test_count_integral_values() {
        assert_eq!(CellParser::count("150"), 150);
        assert_eq!(CellParser::count("150.0"), 150);
    }

    #[test]
    fn test_count_invalid_values_coerce_to_zero() {
        assert_eq!(CellParser::count(""), 0);
        assert_eq!(CellParser::count("nan"), 0);
        assert_eq!(CellParser::count("-3"), 0);
        assert_eq!(CellParser::count("2.5"), 0);
    }
}
