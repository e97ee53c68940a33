//! Stable, type-aware sorting of collections by a single field.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::record::{Collection, FieldValue, Record};

/// The direction of a [SortSpec].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// The arrow shown next to a sorted column header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

/// The active sort key and direction of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Ascending)
    }
}

/// Selecting the active key again flips the direction, selecting any other
/// key sorts by it in ascending order.
pub fn toggle_sort(current: &SortSpec, key: &str) -> SortSpec {
    if current.key == key {
        SortSpec::new(key, current.direction.flipped())
    } else {
        SortSpec::ascending(key)
    }
}

/// How the values under one key are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKind {
    Number,
    Instant,
    Boolean,
    Text,
}

/// Pick a comparison for `key` from the values present across the whole
/// collection, so every pair of records is compared the same way.
fn infer_sort_kind(collection: &[Record], key: &str) -> SortKind {
    let values: Vec<&FieldValue> = collection
        .iter()
        .filter_map(|record| record.get(key))
        .filter(|value| !value.is_null())
        .collect();

    if values.is_empty() {
        SortKind::Text
    } else if values.iter().all(|value| value.as_number().is_some()) {
        SortKind::Number
    } else if values.iter().all(|value| value.as_instant().is_some()) {
        SortKind::Instant
    } else if values.iter().all(|value| value.as_bool().is_some()) {
        SortKind::Boolean
    } else {
        SortKind::Text
    }
}

/// A precomputed comparison key. Missing values are `None` and sort first.
#[derive(Debug)]
enum SortKey {
    Number(Option<f64>),
    Instant(Option<OffsetDateTime>),
    Boolean(Option<u8>),
    Text(String),
}

impl SortKey {
    fn new(kind: SortKind, value: Option<&FieldValue>) -> Self {
        match kind {
            SortKind::Number => SortKey::Number(value.and_then(FieldValue::as_number)),
            SortKind::Instant => SortKey::Instant(value.and_then(FieldValue::as_instant)),
            SortKind::Boolean => {
                SortKey::Boolean(value.and_then(FieldValue::as_bool).map(u8::from))
            }
            SortKind::Text => SortKey::Text(
                value
                    .map(|value| value.to_string().to_lowercase())
                    .unwrap_or_default(),
            ),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(left), SortKey::Number(right)) => match (left, right) {
                (Some(left), Some(right)) => left.total_cmp(right),
                (left, right) => left.is_some().cmp(&right.is_some()),
            },
            (SortKey::Instant(left), SortKey::Instant(right)) => left.cmp(right),
            (SortKey::Boolean(left), SortKey::Boolean(right)) => left.cmp(right),
            (SortKey::Text(left), SortKey::Text(right)) => left.cmp(right),
            // Keys for one sort are always built with the same kind.
            _ => Ordering::Equal,
        }
    }
}

/// Stable sort of `collection` by `spec`.
///
/// Descending order reverses the comparator rather than the output, so
/// records that compare equal keep their input order in both directions.
pub fn apply_sort(collection: Collection, spec: &SortSpec) -> Collection {
    let kind = infer_sort_kind(&collection, &spec.key);

    let mut keyed: Vec<(SortKey, Record)> = collection
        .into_iter()
        .map(|record| (SortKey::new(kind, record.get(&spec.key)), record))
        .collect();

    keyed.sort_by(|(left, _), (right, _)| {
        let ordering = left.compare(right);

        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}
