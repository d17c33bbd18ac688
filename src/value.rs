//! Dynamic field values and the keyed `Item` record.
//!
//! The engine has no schema beyond the column definitions: an item is a mapping from
//! field name to `Value`. Absent fields read as `Value::Null`, so an invalid field
//! reference never raises; it simply never matches a filter and sorts as the minimum.

use crate::{GridError, GridResult};
use chrono::{
    DateTime, NaiveDate, NaiveDateTime, Timelike,
    format::{Item as FormatItem, StrftimeItems},
};
use std::{cmp::Ordering, collections::BTreeMap, fmt::Write};

/// Minutes-since-midnight reported for values without a time of day.
pub const NO_TIME_OF_DAY: i64 = -1;

/// Layouts tried, in order, when a text value has to be read as a date-time.
const DATETIME_LAYOUTS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
];

static NULL_VALUE: Value = Value::Null;

/// A dynamic value held by one field of an `Item`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Missing or empty value.
    #[default]
    Null,
    Bool(bool),
    /// All numeric values are held as `f64`.
    Number(f64),
    Text(String),
    /// A date-time without time zone; dates carry midnight.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null and the empty string are both blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Plain display text of the value, `None` for null.
    ///
    /// Integral numbers render without a fractional part (`10`, not `10.0`) and
    /// date-times use the ISO layout. Column-specific formatting lives in `display.rs`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(flag) => Some(flag.to_string()),
            Value::Number(number) => Some(format_number(*number)),
            Value::Text(text) => Some(text.clone()),
            Value::DateTime(datetime) => Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Numeric view of the value. Text is parsed permissively (trimmed);
    /// anything unparseable yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) if number.is_finite() => Some(*number),
            Value::Text(text) => parse_number(text),
            _ => None,
        }
    }

    /// Date-time view of the value. Text is parsed with the common ISO layouts.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(datetime) => Some(*datetime),
            Value::Text(text) => parse_datetime(text),
            _ => None,
        }
    }

    /// `hour * 60 + minute` of the date-time value, or `NO_TIME_OF_DAY` (-1).
    pub fn minutes_since_midnight(&self) -> i64 {
        self.as_datetime()
            .map(|datetime| i64::from(datetime.hour()) * 60 + i64::from(datetime.minute()))
            .unwrap_or(NO_TIME_OF_DAY)
    }

    /// Formats the date-time view of the value with a chrono strftime pattern.
    pub fn format_datetime(&self, pattern: &str) -> Option<String> {
        self.as_datetime()
            .and_then(|datetime| format_with(&datetime, pattern))
    }

    /// Default ordering used by every non-Time sort.
    ///
    /// Null is the minimum. Values of the same kind compare naturally (numbers
    /// numerically, text case-sensitively by bytes, date-times chronologically).
    /// Mixed kinds are ordered by kind rank only; such columns are not valid input
    /// and the order among them carries no meaning beyond being total.
    pub fn default_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::DateTime(_) => 3,
            Value::Text(_) => 4,
        }
    }

    /// Owned identity of the raw value, used to de-duplicate option lists.
    pub(crate) fn raw_key(&self) -> RawKey {
        match self {
            Value::Null => RawKey::Null,
            Value::Bool(flag) => RawKey::Bool(*flag),
            // Normalize -0.0 so it collapses with 0.0.
            Value::Number(number) => RawKey::Number((*number + 0.0).to_bits()),
            Value::Text(text) => RawKey::Text(text.clone()),
            Value::DateTime(datetime) => RawKey::DateTime(*datetime),
        }
    }
}

/// Hashable identity of a `Value` (f64 is compared by bit pattern).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum RawKey {
    Null,
    Bool(bool),
    Number(u64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Number(number as f64)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Number(f64::from(number))
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(datetime: NaiveDateTime) -> Self {
        Value::DateTime(datetime)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Null, Into::into)
    }
}

/// One row of application data: a mapping from field name to value.
///
/// The engine never mutates items; it only derives projections of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    fields: BTreeMap<String, Value>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Value of `field`; missing fields read as `Value::Null`.
    pub fn get(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&NULL_VALUE)
    }

    /// Display text of `field`, `None` when null or missing.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).as_text()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Item {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut item = Item::new();
        for (field, value) in iter {
            item.insert(field, value);
        }
        item
    }
}

// --- Helpers ---

/// Renders integral numbers without a fractional part.
fn format_number(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// Permissive numeric conversion: trims, drops thousands separators and parses.
/// Returns `None` for blank or unparseable text instead of failing.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Reads a date-time from text. Accepts RFC 3339, the common ISO layouts and
/// bare `YYYY-MM-DD` dates (taken at midnight).
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.naive_local());
    }

    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Formats a date-time with a strftime pattern.
///
/// Writing through `fmt::Write` turns an invalid pattern into `None`
/// instead of the panic `to_string()` would raise.
pub fn format_with(datetime: &NaiveDateTime, pattern: &str) -> Option<String> {
    let mut output = String::new();
    write!(output, "{}", datetime.format(pattern)).ok()?;
    Some(output)
}

/// Fails with `GridError::InvalidFormat` if chrono cannot render `pattern`.
pub fn validate_format(pattern: &str) -> GridResult<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, FormatItem::Error)) {
        return Err(GridError::InvalidFormat(pattern.to_string()));
    }
    Ok(())
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_value`
#[cfg(test)]
mod tests_value {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid test date")
    }

    #[test]
    fn missing_field_reads_as_null() {
        let item = Item::new().with("title", "Alpha");
        assert_eq!(item.get("title"), &Value::from("Alpha"));
        assert!(item.get("absent").is_null());
        assert_eq!(item.text("absent"), None);
    }

    #[test]
    fn number_text_drops_integral_fraction() {
        assert_eq!(Value::from(10.0).as_text(), Some("10".to_string()));
        assert_eq!(Value::from(2.5).as_text(), Some("2.5".to_string()));
    }

    #[test]
    fn permissive_number_parsing() {
        assert_eq!(parse_number(" 1,250.5 "), Some(1250.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(Value::from("42").as_f64(), Some(42.0));
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn minutes_since_midnight_of_datetime_and_text() {
        assert_eq!(Value::from(at(9, 30)).minutes_since_midnight(), 570);
        assert_eq!(
            Value::from("2024-03-15 13:05:00").minutes_since_midnight(),
            13 * 60 + 5
        );
        assert_eq!(Value::Null.minutes_since_midnight(), NO_TIME_OF_DAY);
        assert_eq!(Value::from("not a time").minutes_since_midnight(), NO_TIME_OF_DAY);
    }

    #[test]
    fn parse_datetime_layouts() {
        assert_eq!(parse_datetime("2024-03-15T09:30:00"), Some(at(9, 30)));
        assert_eq!(parse_datetime("2024-03-15 09:30:00.000000"), Some(at(9, 30)));
        assert_eq!(parse_datetime("2024-03-15"), Some(at(0, 0)));
        assert_eq!(parse_datetime("2024-03-15T09:30:00+02:00"), Some(at(9, 30)));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn format_with_time_pattern() {
        assert_eq!(
            format_with(&at(14, 5), "%I:%M %p"),
            Some("02:05 PM".to_string())
        );
    }

    #[test]
    fn invalid_pattern_is_rejected_not_panicking() {
        assert!(validate_format("%I:%M %p").is_ok());
        assert!(matches!(
            validate_format("%Q"),
            Err(GridError::InvalidFormat(_))
        ));
        assert_eq!(format_with(&at(1, 0), "%Q"), None);
    }

    #[test]
    fn default_cmp_orders_null_first_and_same_kinds_naturally() {
        assert_eq!(Value::Null.default_cmp(&Value::from(-5.0)), Ordering::Less);
        assert_eq!(Value::from(2.0).default_cmp(&Value::from(10.0)), Ordering::Less);
        // Case-sensitive byte order: uppercase sorts before lowercase.
        assert_eq!(Value::from("Zeta").default_cmp(&Value::from("alpha")), Ordering::Less);
    }

    #[test]
    fn raw_key_collapses_negative_zero() {
        assert_eq!(Value::from(-0.0).raw_key(), Value::from(0.0).raw_key());
        assert_ne!(Value::from(1.0).raw_key(), Value::from("1").raw_key());
    }
}
