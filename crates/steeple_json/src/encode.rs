use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::scalar::JsonScalar;
use crate::traits::JsonReadable;
use crate::value::JsonObject;

impl JsonObject {
    /// Encodes a JSON primitive under `key`. A `None` value writes nothing.
    pub fn encode<T: JsonScalar>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.insert(key, value.into_value());
        }
    }

    /// Encodes a JSON primitive, substituting `default` when `value` is
    /// `None`.
    pub fn encode_or<T: JsonScalar>(&mut self, key: &str, value: Option<T>, default: T) {
        self.insert(key, value.unwrap_or(default).into_value());
    }

    /// Encodes a timestamp with this object's bound date format.
    pub fn encode_date(&mut self, key: &str, value: Option<DateTime<Utc>>) {
        if let Some(value) = value {
            let formatted = self.date_format().format(&value);
            self.insert(key, Value::String(formatted));
        }
    }

    /// Encodes a timestamp, substituting `default` when `value` is `None`.
    pub fn encode_date_or(
        &mut self,
        key: &str,
        value: Option<DateTime<Utc>>,
        default: DateTime<Utc>,
    ) {
        self.encode_date(key, Some(value.unwrap_or(default)));
    }

    /// Encodes a nested domain object under `key` via its `write`
    /// implementation.
    pub fn encode_object<T: JsonReadable>(
        &mut self,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), DecodeError> {
        if let Some(value) = value {
            let mut nested = self.child(Map::new());
            value.write(&mut nested)?;
            self.insert(key, nested.into_value());
        }
        Ok(())
    }

    /// Encodes a list of domain objects under `key`, one JSON object per
    /// element.
    pub fn encode_object_list<T: JsonReadable>(
        &mut self,
        key: &str,
        values: Option<&[T]>,
    ) -> Result<(), DecodeError> {
        if let Some(values) = values {
            let mut encoded = Vec::with_capacity(values.len());
            for value in values {
                let mut nested = self.child(Map::new());
                value.write(&mut nested)?;
                encoded.push(nested.into_value());
            }
            self.insert(key, Value::Array(encoded));
        }
        Ok(())
    }
}
