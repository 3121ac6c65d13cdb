use crate::error::DecodeError;
use crate::value::JsonObject;

/// A domain object that can be populated from, and written back to, a JSON
/// object.
pub trait JsonReadable {
    /// Assigns values to `self` from a JSON object. All-or-nothing: a field
    /// failure leaves the caller free to discard the partially written value.
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError>;

    /// Writes `self`'s fields into a JSON object. Defaults to a no-op for
    /// types the client never sends back.
    fn write(&self, object: &mut JsonObject) -> Result<(), DecodeError> {
        let _ = object;
        Ok(())
    }
}

/// A domain object the decoder can construct on its own before reading.
pub trait JsonInstantiable: JsonReadable + Default {}

impl<T: JsonReadable + Default> JsonInstantiable for T {}

/// A domain object that can be matched against a JSON fragment by identity,
/// enabling merge/combine reconciliation.
pub trait Matchable {
    /// Whether `fragment` describes this instance (typically by comparing an
    /// `id` field).
    fn is_match(&self, fragment: &JsonObject) -> bool;
}
