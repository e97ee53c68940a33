//! Defines the loosely-typed records returned by the backend.
//!
//! The backend serves four collections with no shared schema, so a record is
//! kept as a map from field name to a scalar value rather than a struct per
//! collection.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize};
use time::{
    Date, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use url::form_urlencoded;

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A single scalar value in a [Record].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// A string that parsed as an RFC 3339 date-time or a plain ISO date.
    ///
    /// The original text is kept so that searching sees exactly what the
    /// backend sent.
    Timestamp {
        instant: OffsetDateTime,
        text: String,
    },
}

impl FieldValue {
    /// Build a text value, promoting it to a [FieldValue::Timestamp] if it
    /// looks like one.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();

        match parse_timestamp(&text) {
            Some(instant) => FieldValue::Timestamp { instant, text },
            None => FieldValue::Text(text),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The value as a number.
    ///
    /// Text that parses as a finite number counts, since the backend encodes
    /// decimal amounts as strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite()),
            _ => None,
        }
    }

    pub fn as_instant(&self) -> Option<OffsetDateTime> {
        match self {
            FieldValue::Timestamp { instant, .. } => Some(*instant),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) | FieldValue::Timestamp { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Text rendering used by the search filter. Null renders as an empty string.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Text(text) | FieldValue::Timestamp { text, .. } => f.write_str(text),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(value) => FieldValue::Bool(value),
            serde_json::Value::Number(number) => match number.as_f64() {
                Some(number) => FieldValue::Number(number),
                None => FieldValue::Text(number.to_string()),
            },
            serde_json::Value::String(text) => FieldValue::from_text(text),
            nested => FieldValue::Text(nested.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::from_text(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::from_text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| {
        Date::parse(text, DATE_FORMAT)
            .ok()
            .map(|date| date.midnight().assume_utc())
    })
}

/// The identifier of a record, stable for the lifetime of the record in a
/// browser session.
///
/// Numeric identifiers are stored in their text form so that identifiers
/// from any collection can be compared and used in URLs the same way.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier percent-encoded as a single URL path segment.
    pub fn path_segment(&self) -> String {
        // The form encoder writes spaces as '+', which a path would keep literally.
        form_urlencoded::byte_serialize(self.0.as_bytes())
            .collect::<String>()
            .replace('+', "%20")
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of one of the backend's collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Replace the value of a single field, adding it if it is missing.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Get the record's identifier from the field named `id_field`.
    ///
    /// Returns `None` if the field is missing, null or empty.
    pub fn id(&self, id_field: &str) -> Option<RecordId> {
        let id = self.get(id_field)?.to_string();

        (!id.is_empty()).then(|| RecordId::new(id))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;

        Ok(object.into_iter().collect())
    }
}

/// An ordered sequence of records of one kind.
pub type Collection = Vec<Record>;

#[cfg(test)]
mod record_tests {
    use time::macros::datetime;

    use super::{FieldValue, Record, RecordId};

    #[test]
    fn deserializes_scalars() {
        let record: Record = serde_json::from_str(
            r#"{
                "id": 3,
                "reportId": "REP003",
                "disputeAmount": 50.25,
                "created": "2024-11-22T00:49:00Z",
                "reviewed": true,
                "email": null
            }"#,
        )
        .unwrap();

        assert_eq!(record.get("id"), Some(&FieldValue::Number(3.0)));
        assert_eq!(
            record.get("reportId"),
            Some(&FieldValue::Text("REP003".to_owned()))
        );
        assert_eq!(record.get("disputeAmount"), Some(&FieldValue::Number(50.25)));
        assert_eq!(
            record.get("created").and_then(FieldValue::as_instant),
            Some(datetime!(2024-11-22 00:49:00 UTC))
        );
        assert_eq!(record.get("reviewed"), Some(&FieldValue::Bool(true)));
        assert_eq!(record.get("email"), Some(&FieldValue::Null));
    }

    #[test]
    fn nested_values_become_json_text() {
        let record: Record = serde_json::from_str(r#"{"tags": ["a", "b"]}"#).unwrap();

        assert_eq!(
            record.get("tags"),
            Some(&FieldValue::Text(r#"["a","b"]"#.to_owned()))
        );
    }

    #[test]
    fn timestamps_keep_original_text() {
        let value = FieldValue::from("2024-12-03T01:30:00Z");

        assert_eq!(value.to_string(), "2024-12-03T01:30:00Z");
        assert_eq!(value.as_instant(), Some(datetime!(2024-12-03 01:30:00 UTC)));
    }

    #[test]
    fn plain_dates_are_timestamps() {
        let value = FieldValue::from("2025-01-31");

        assert_eq!(value.as_instant(), Some(datetime!(2025-01-31 00:00:00 UTC)));
    }

    #[test]
    fn phone_numbers_are_not_timestamps_or_numbers() {
        let value = FieldValue::from("555-0101");

        assert_eq!(value, FieldValue::Text("555-0101".to_owned()));
        assert_eq!(value.as_number(), None);
    }

    #[test]
    fn decimal_strings_are_numbers() {
        assert_eq!(FieldValue::from("100.50").as_number(), Some(100.5));
    }

    #[test]
    fn numbers_render_without_trailing_zeros() {
        assert_eq!(FieldValue::Number(100.5).to_string(), "100.5");
        assert_eq!(FieldValue::Number(3.0).to_string(), "3");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn id_from_number_or_text() {
        let record = Record::from_iter([
            ("id", FieldValue::Number(7.0)),
            ("user_id", FieldValue::from("u-42")),
            ("empty", FieldValue::from("")),
        ]);

        assert_eq!(record.id("id"), Some(RecordId::new("7")));
        assert_eq!(record.id("user_id"), Some(RecordId::new("u-42")));
        assert_eq!(record.id("empty"), None);
        assert_eq!(record.id("missing"), None);
    }

    #[test]
    fn path_segment_escapes_separators() {
        assert_eq!(RecordId::new("42").path_segment(), "42");
        assert_eq!(RecordId::new("u-42_a.b").path_segment(), "u-42_a.b");
        assert_eq!(
            RecordId::new("a/b?c#d e+f").path_segment(),
            "a%2Fb%3Fc%23d%20e%2Bf"
        );
    }

    #[test]
    fn set_replaces_single_field() {
        let mut record = Record::from_iter([("id", 1_i64), ("amount", 2_i64)]);

        record.set("amount", 5.5);

        assert_eq!(record.get("amount"), Some(&FieldValue::Number(5.5)));
        assert_eq!(record.get("id"), Some(&FieldValue::Number(1.0)));
    }
}
