use thiserror::Error;

/// Failures surfaced while decoding JSON into domain objects.
///
/// Decoding one object is all-or-nothing: the first field failure aborts the
/// whole `read` and propagates to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The JSON shape does not match the field type being decoded.
    #[error("type mismatch at `{key}`: expected {expected}, got {actual}")]
    TypeMismatch {
        /// JSON key of the offending value.
        key: String,
        /// Type the caller asked for.
        expected: &'static str,
        /// JSON type actually present.
        actual: &'static str,
    },

    /// A merge reconciliation was requested for an element type that carries
    /// no identity predicate.
    #[error("merge requested at `{key}` but the element type is not matchable")]
    NotMatchable {
        /// JSON key of the list that cannot be merged.
        key: String,
    },

    /// A relationship was requested that the persistence context does not
    /// define.
    #[error("no such relationship `{name}`")]
    NoSuchRelationship {
        /// Name of the missing relationship.
        name: String,
    },

    /// The persistence context could not produce an instance it reported.
    #[error("persistence context could not supply the requested instance")]
    MissingContext,

    /// The persistence context failed to create a new instance.
    #[error("persistence context failed to instantiate a new object")]
    InstantiationFailed,
}
