use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::DecodeError;
use crate::scalar::JsonScalar;
use crate::traits::{JsonInstantiable, Matchable};
use crate::value::{json_type_name, JsonObject};

/// How a freshly decoded list is reconciled against a list the caller
/// already holds.
#[derive(Debug)]
pub enum CollectionOperation<T> {
    /// Discard the existing list; the result is the decoded list in payload
    /// order.
    Replace,
    /// Update existing items matched by identity, append new ones, and keep
    /// existing items absent from the payload.
    Combine(Option<Vec<T>>),
    /// Update existing items matched by identity, append new ones, and drop
    /// existing items absent from the payload.
    Merge(Option<Vec<T>>),
}

impl JsonObject {
    /// Decodes a JSON primitive under `key`.
    ///
    /// Absent key yields `None`; explicit null yields `None`; an
    /// incompatible shape is a [`DecodeError::TypeMismatch`].
    pub fn decode<T: JsonScalar>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        self.decode_scalar_inner(key, None)
    }

    /// Decodes a JSON primitive under `key`, substituting `default` when the
    /// key is absent. An explicit null still yields `None`.
    pub fn decode_or<T: JsonScalar>(&self, key: &str, default: T) -> Result<Option<T>, DecodeError> {
        self.decode_scalar_inner(key, Some(default))
    }

    fn decode_scalar_inner<T: JsonScalar>(
        &self,
        key: &str,
        default: Option<T>,
    ) -> Result<Option<T>, DecodeError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        if value.is_null() {
            return Ok(None);
        }
        match T::from_value(value) {
            Some(decoded) => Ok(Some(decoded)),
            None => Err(DecodeError::TypeMismatch {
                key: key.to_string(),
                expected: T::EXPECTED,
                actual: json_type_name(value),
            }),
        }
    }

    /// Decodes a timestamp string under `key` using this object's bound
    /// [`DateFormat`](crate::DateFormat).
    ///
    /// Absent key or an unparsable string yields `None`; a non-string value
    /// yields `None` as well (dates never fail the whole decode).
    pub fn decode_date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.decode_date_inner(key, None)
    }

    /// Decodes a timestamp, substituting `default` when the key is absent or
    /// the string does not parse.
    pub fn decode_date_or(&self, key: &str, default: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.decode_date_inner(key, Some(default))
    }

    fn decode_date_inner(
        &self,
        key: &str,
        default: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        let Some(value) = self.get(key) else {
            return default;
        };
        let Value::String(raw) = value else {
            return None;
        };
        self.date_format().parse(raw).or(default)
    }

    /// Decodes a nested domain object under `key`.
    pub fn decode_object<T: JsonInstantiable>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        self.decode_object_inner(key, None)
    }

    /// Decodes a nested domain object, substituting `default` when the key
    /// is absent.
    pub fn decode_object_or<T: JsonInstantiable>(
        &self,
        key: &str,
        default: T,
    ) -> Result<Option<T>, DecodeError> {
        self.decode_object_inner(key, Some(default))
    }

    fn decode_object_inner<T: JsonInstantiable>(
        &self,
        key: &str,
        default: Option<T>,
    ) -> Result<Option<T>, DecodeError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(transform(&self.child(map.clone()))?)),
            other => Err(DecodeError::TypeMismatch {
                key: key.to_string(),
                expected: "object",
                actual: json_type_name(other),
            }),
        }
    }

    /// Decodes a list of domain objects that carry no identity predicate.
    ///
    /// Supports [`CollectionOperation::Replace`] and
    /// [`CollectionOperation::Combine`]; requesting
    /// [`CollectionOperation::Merge`] is a [`DecodeError::NotMatchable`]
    /// because nothing can be matched.
    pub fn decode_list<T: JsonInstantiable>(
        &self,
        key: &str,
        default: Option<Vec<T>>,
        operation: CollectionOperation<T>,
    ) -> Result<Option<Vec<T>>, DecodeError> {
        let Some(fragments) = self.fragments(key)? else {
            return Ok(match self.get(key) {
                None => default,
                Some(_) => None,
            });
        };

        match operation {
            CollectionOperation::Replace => {
                let decoded = fragments
                    .iter()
                    .map(transform)
                    .collect::<Result<Vec<T>, _>>()?;
                Ok(Some(decoded))
            }
            CollectionOperation::Combine(existing) => {
                let mut combined = existing.unwrap_or_default();
                for fragment in &fragments {
                    combined.push(transform(fragment)?);
                }
                Ok(Some(combined))
            }
            CollectionOperation::Merge(_) => Err(DecodeError::NotMatchable {
                key: key.to_string(),
            }),
        }
    }

    /// Decodes a list of matchable domain objects, reconciling against any
    /// existing list carried by `operation`.
    ///
    /// Matched existing items are updated in place and keep their relative
    /// order; unmatched incoming fragments are appended afterwards in
    /// payload order. Each incoming fragment is consumed by at most one
    /// existing item.
    pub fn decode_matched_list<T>(
        &self,
        key: &str,
        default: Option<Vec<T>>,
        operation: CollectionOperation<T>,
    ) -> Result<Option<Vec<T>>, DecodeError>
    where
        T: JsonInstantiable + Matchable,
    {
        let Some(fragments) = self.fragments(key)? else {
            return Ok(match self.get(key) {
                None => default,
                Some(_) => None,
            });
        };

        match operation {
            CollectionOperation::Replace => {
                let decoded = fragments
                    .iter()
                    .map(transform)
                    .collect::<Result<Vec<T>, _>>()?;
                Ok(Some(decoded))
            }
            CollectionOperation::Combine(existing) => {
                let mut combined = existing.unwrap_or_default();
                let mut unmatched = Vec::new();
                for fragment in fragments {
                    // Duplicate fragments for one identity update the same
                    // item in sequence; the last one wins.
                    match combined.iter_mut().find(|item| item.is_match(&fragment)) {
                        Some(item) => item.read(&fragment)?,
                        None => unmatched.push(fragment),
                    }
                }
                for fragment in &unmatched {
                    combined.push(transform(fragment)?);
                }
                Ok(Some(combined))
            }
            CollectionOperation::Merge(existing) => {
                let mut remaining = fragments;
                let mut merged = Vec::new();
                for mut item in existing.unwrap_or_default() {
                    if let Some(position) =
                        remaining.iter().position(|fragment| item.is_match(fragment))
                    {
                        let fragment = remaining.remove(position);
                        item.read(&fragment)?;
                        merged.push(item);
                    }
                }
                for fragment in &remaining {
                    merged.push(transform(fragment)?);
                }
                Ok(Some(merged))
            }
        }
    }

    /// The value under `key` as a list of JSON objects.
    ///
    /// `Ok(None)` when the key is absent or explicitly null; a mismatch when
    /// the value is not an array of objects.
    fn fragments(&self, key: &str) -> Result<Option<Vec<JsonObject>>, DecodeError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let items = match value {
            Value::Null => return Ok(None),
            Value::Array(items) => items,
            other => {
                return Err(DecodeError::TypeMismatch {
                    key: key.to_string(),
                    expected: "array",
                    actual: json_type_name(other),
                })
            }
        };

        let mut fragments = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(map) => fragments.push(self.child(map.clone())),
                other => {
                    return Err(DecodeError::TypeMismatch {
                        key: key.to_string(),
                        expected: "array of objects",
                        actual: json_type_name(other),
                    })
                }
            }
        }
        Ok(Some(fragments))
    }
}

pub(crate) fn transform<T: JsonInstantiable>(fragment: &JsonObject) -> Result<T, DecodeError> {
    let mut instance = T::default();
    instance.read(fragment)?;
    Ok(instance)
}
