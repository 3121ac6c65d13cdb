use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Timestamp format used by [`JsonObject::decode_date`].
///
/// Bound to each `JsonObject` at construction and propagated into nested
/// objects, so two documents decoded with different formats never interfere.
/// The default is ISO-8601 with microseconds, parsed as UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
}

impl DateFormat {
    /// `chrono` pattern for ISO-8601 timestamps with a microsecond fraction
    /// and a literal `Z` suffix, e.g. `2019-03-21T09:30:00.000000Z`.
    pub const DEFAULT_PATTERN: &'static str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    /// Creates a format from a `chrono` strftime pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// The underlying strftime pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub(crate) fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(raw, &self.pattern)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub(crate) fn format(&self, date: &DateTime<Utc>) -> String {
        date.naive_utc().format(&self.pattern).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN)
    }
}

/// Name of a JSON value's type, used for the `actual` side of type-mismatch
/// errors.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An untyped JSON object plus the date format its values decode with.
///
/// Wraps a `serde_json` map; the decode/encode operations live in the
/// `decode` and `encode` modules.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    data: Map<String, Value>,
    date_format: DateFormat,
}

impl JsonObject {
    /// Creates an empty object with the default date format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object with an initial set of values.
    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            data: values,
            date_format: DateFormat::default(),
        }
    }

    /// Creates an object bound to a caller-supplied date format.
    pub fn with_date_format(values: Map<String, Value>, date_format: DateFormat) -> Self {
        Self {
            data: values,
            date_format,
        }
    }

    /// Wraps a parsed JSON value, or `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from_values(map)),
            _ => None,
        }
    }

    /// The date format bound to this object.
    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    /// Raw access to the value stored under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Whether no values have been stored or decoded.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the object, yielding the underlying JSON tree.
    pub fn into_value(self) -> Value {
        Value::Object(self.data)
    }

    /// A nested object inheriting this object's date format.
    pub(crate) fn child(&self, values: Map<String, Value>) -> JsonObject {
        JsonObject::with_date_format(values, self.date_format.clone())
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }
}
