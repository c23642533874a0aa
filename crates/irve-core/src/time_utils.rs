use chrono::{Datelike, NaiveDate};

// ── Calendar months ───────────────────────────────────────────────────────────

/// First day of the calendar month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month, so `with_day(1)` cannot fail.
    date.with_day(1).unwrap_or(date)
}

/// `"%Y-%m"` label for the month containing `date`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Whether two dates fall in the same calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
