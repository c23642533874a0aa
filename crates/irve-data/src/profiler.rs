//! Value-frequency distributions over one charge-point field.

use std::collections::HashMap;
use std::fmt;

use irve_core::error::Result;
use irve_core::models::{ChargePointRecord, FieldSelector, MissingPolicy};
use serde::Serialize;

// ── Distribution types ────────────────────────────────────────────────────────

/// One distinct value of the profiled field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryValue {
    Value(String),
    /// The field was absent on the record.
    Missing,
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryValue::Value(v) => f.write_str(v),
            CategoryValue::Missing => f.write_str("(missing)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: CategoryValue,
    pub count: usize,
}

/// Occurrence counts for every observed value of `field`, most frequent
/// first; equal counts keep first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDistribution {
    pub field: FieldSelector,
    pub entries: Vec<CategoryCount>,
}

impl CategoryDistribution {
    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Count for `value`, or 0 when it was never observed.
    pub fn count_of(&self, value: &CategoryValue) -> usize {
        self.entries
            .iter()
            .find(|e| &e.value == value)
            .map_or(0, |e| e.count)
    }

    /// Count of the `Missing` bucket.
    pub fn missing(&self) -> usize {
        self.count_of(&CategoryValue::Missing)
    }
}

// ── CategoricalProfiler ───────────────────────────────────────────────────────

/// Stateless helper computing frequency tables.
pub struct CategoricalProfiler;

impl CategoricalProfiler {
    /// Profile `field`, counting absent values in the `Missing` bucket.
    pub fn profile(records: &[ChargePointRecord], field: FieldSelector) -> CategoryDistribution {
        Self::profile_with(records, field, MissingPolicy::Keep)
    }

    /// Profile a field given by column name.
    ///
    /// Fails with `UnsupportedField` for names outside [`FieldSelector::ALL`].
    pub fn profile_by_name(
        records: &[ChargePointRecord],
        field: &str,
        policy: MissingPolicy,
    ) -> Result<CategoryDistribution> {
        let field: FieldSelector = field.parse()?;
        Ok(Self::profile_with(records, field, policy))
    }

    /// Profile `field` under an explicit missing-value policy.
    pub fn profile_with(
        records: &[ChargePointRecord],
        field: FieldSelector,
        policy: MissingPolicy,
    ) -> CategoryDistribution {
        let mut positions: HashMap<CategoryValue, usize> = HashMap::new();
        let mut entries: Vec<CategoryCount> = Vec::new();

        for record in records {
            let value = match field_value(record, field) {
                Some(v) => CategoryValue::Value(v),
                None if policy == MissingPolicy::Drop => continue,
                None => CategoryValue::Missing,
            };

            match positions.get(&value) {
                Some(&idx) => entries[idx].count += 1,
                None => {
                    positions.insert(value.clone(), entries.len());
                    entries.push(CategoryCount { value, count: 1 });
                }
            }
        }

        // Stable sort: ties stay in first-seen order.
        entries.sort_by(|a, b| b.count.cmp(&a.count));

        CategoryDistribution { field, entries }
    }
}

/// String form of `field` on `record`, or `None` when absent.
fn field_value(record: &ChargePointRecord, field: FieldSelector) -> Option<String> {
    match field {
        FieldSelector::Implantation => record.implantation.clone(),
        FieldSelector::InstallDate => record.install_date.map(|d| d.format("%Y-%m-%d").to_string()),
        FieldSelector::LonLatCorrect => record.lon_lat_correct.map(|b| b.to_string()),
        FieldSelector::InseeCodeVerified => record.insee_code_verified.map(|b| b.to_string()),
        FieldSelector::Department => record.department.clone(),
        // NaN power readings count as missing.
        FieldSelector::NominalPower => record
            .nominal_power
            .filter(|p| !p.is_nan())
            .map(|p| p.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
