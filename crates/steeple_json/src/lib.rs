//! JSON-to-model decoding and collection reconciliation.
//!
//! A thin layer over `serde_json::Value` that maps untyped JSON trees onto
//! typed domain objects and reconciles freshly decoded lists against lists a
//! caller already holds (replace / combine / merge).
mod decode;
mod encode;
mod error;
mod managed;
mod scalar;
mod traits;
mod value;

pub use decode::CollectionOperation;
pub use error::DecodeError;
pub use managed::{EntityContext, ManagedJsonInstantiable, MemoryContext};
pub use scalar::JsonScalar;
pub use traits::{JsonInstantiable, JsonReadable, Matchable};
pub use value::{json_type_name, DateFormat, JsonObject};

pub use serde_json::{Map, Value};
