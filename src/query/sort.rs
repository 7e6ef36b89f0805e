//! Sorting for record lists.
//!
//! Values are compared by coercion: numbers numerically, timestamps and
//! dates chronologically, everything else as case-insensitive text. A
//! column mixing kinds groups numbers first, then dates, then text. The
//! sort is stable, so records with equal keys keep their relative order.

use std::cmp::Ordering;

use serde_json::Value;

use crate::error::AdminError;
use crate::types::{Record, value_text};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

enum_display_fromstr!(
    SortDirection,
    AdminError::invalid_sort_direction,
    {
        Ascending => "ascending" | "asc",
        Descending => "descending" | "desc",
    }
);

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Sort key (a dotted field path) and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Next sort state when the user clicks a column header: a new key
    /// starts ascending, the current ascending key flips to descending,
    /// and the current descending key flips back to ascending.
    pub fn toggle(current: Option<&SortSpec>, key: &str) -> SortSpec {
        match current {
            Some(spec) if spec.key == key => SortSpec {
                key: key.to_string(),
                direction: spec.direction.reversed(),
            },
            _ => SortSpec::ascending(key),
        }
    }
}

/// Coerced sort value.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Time(jiff::Timestamp),
    Text(String),
    Missing,
}

fn sort_value(record: &Record, key: &str) -> SortValue {
    if key == "status"
        && let Some(status) = record.status
    {
        return SortValue::Text(status.to_string());
    }
    match record.field(key) {
        Some(Value::Number(n)) => n.as_f64().map(SortValue::Number).unwrap_or(SortValue::Missing),
        Some(Value::String(s)) => coerce_text(s),
        Some(other) => value_text(other)
            .map(|s| SortValue::Text(s.to_lowercase()))
            .unwrap_or(SortValue::Missing),
        None => SortValue::Missing,
    }
}

fn coerce_text(s: &str) -> SortValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return SortValue::Missing;
    }
    if let Ok(n) = trimmed.parse::<f64>()
        && n.is_finite()
    {
        return SortValue::Number(n);
    }
    if let Ok(ts) = trimmed.parse::<jiff::Timestamp>() {
        return SortValue::Time(ts);
    }
    if let Ok(date) = trimmed.parse::<jiff::civil::Date>()
        && let Ok(zoned) = date.to_zoned(jiff::tz::TimeZone::UTC)
    {
        return SortValue::Time(zoned.timestamp());
    }
    SortValue::Text(trimmed.to_lowercase())
}

impl SortValue {
    /// Kind order for mixed columns: numbers, then times, then text, then missing.
    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Time(_) => 1,
            SortValue::Text(_) => 2,
            SortValue::Missing => 3,
        }
    }
}

/// Ascending comparison of two coerced values. Values of different kinds
/// order by kind rank, so the comparison stays a total order on mixed
/// columns; missing values sort after present ones.
fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Time(x), SortValue::Time(y)) => x.cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => x.cmp(y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

/// Directed comparison; missing values stay last whichever the direction.
fn compare_directed(a: &SortValue, b: &SortValue, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortValue::Missing, _) | (_, SortValue::Missing) => compare_values(a, b),
        _ => direction.apply(compare_values(a, b)),
    }
}

/// Compare two records under a sort spec.
pub fn compare_records(a: &Record, b: &Record, spec: &SortSpec) -> Ordering {
    compare_directed(
        &sort_value(a, &spec.key),
        &sort_value(b, &spec.key),
        spec.direction,
    )
}

/// Stable in-place sort of record references.
pub fn sort_records(records: &mut [&Record], spec: &SortSpec) {
    // Coerce once per record rather than once per comparison.
    let mut keyed: Vec<(SortValue, &Record)> = records
        .iter()
        .map(|r| (sort_value(r, &spec.key), *r))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_directed(a, b, spec.direction));
    for (slot, (_, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
}
