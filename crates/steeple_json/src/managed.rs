use serde_json::Value;

use crate::error::DecodeError;
use crate::traits::JsonReadable;
use crate::value::{json_type_name, JsonObject};

/// A domain object that lives inside a persistence context rather than being
/// freely constructed by the decoder.
pub trait ManagedJsonInstantiable: JsonReadable {
    /// Entity name the context uses for lookups and inserts.
    fn entity_name() -> &'static str;

    /// The stored field and JSON key an incoming fragment is matched on, or
    /// `None` if instances of this type are never reused.
    fn match_keys() -> Option<(&'static str, &'static str)> {
        None
    }
}

/// Persistence collaborator for the managed decode variant: fetch by
/// identity, insert new instances, and hand out mutable access by handle.
pub trait EntityContext<T: ManagedJsonInstantiable> {
    /// Stable handle to an instance owned by the context.
    type Id: Copy;

    /// Finds an existing instance whose stored `key` field equals `value`.
    fn find_instance(&self, key: &str, value: &Value) -> Option<Self::Id>;

    /// Inserts a new, empty instance.
    fn insert_instance(&mut self) -> Result<Self::Id, DecodeError>;

    /// Mutable access to a previously found or inserted instance.
    fn instance_mut(&mut self, id: Self::Id) -> Option<&mut T>;

    /// Links `children` to `parent` through a named relationship.
    ///
    /// Contexts without relationship support keep this default, which
    /// reports the relationship as undefined.
    fn relate(
        &mut self,
        _parent: Self::Id,
        relationship: &str,
        _children: &[Self::Id],
    ) -> Result<(), DecodeError> {
        Err(DecodeError::NoSuchRelationship {
            name: relationship.to_string(),
        })
    }
}

impl JsonObject {
    /// Decodes a managed domain object under `key`, reusing a context
    /// instance matched by identity or inserting a new one.
    ///
    /// Returns the context handle of the populated instance.
    pub fn decode_managed<T, C>(
        &self,
        key: &str,
        context: &mut C,
    ) -> Result<Option<C::Id>, DecodeError>
    where
        T: ManagedJsonInstantiable,
        C: EntityContext<T>,
    {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::Object(map) => {
                let fragment = self.child(map.clone());
                Ok(Some(transform_managed(&fragment, context)?))
            }
            other => Err(DecodeError::TypeMismatch {
                key: key.to_string(),
                expected: "object",
                actual: json_type_name(other),
            }),
        }
    }

    /// Decodes a list of managed domain objects under `key`.
    ///
    /// Each fragment is matched against the context via the type's match
    /// keys; matched instances are updated in place, the rest are inserted.
    pub fn decode_managed_list<T, C>(
        &self,
        key: &str,
        context: &mut C,
        default: Option<Vec<C::Id>>,
    ) -> Result<Option<Vec<C::Id>>, DecodeError>
    where
        T: ManagedJsonInstantiable,
        C: EntityContext<T>,
    {
        let Some(value) = self.get(key) else {
            return Ok(default);
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

        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(map) = item else {
                return Err(DecodeError::TypeMismatch {
                    key: key.to_string(),
                    expected: "array of objects",
                    actual: json_type_name(item),
                });
            };
            let fragment = self.child(map.clone());
            ids.push(transform_managed(&fragment, context)?);
        }
        Ok(Some(ids))
    }
}

fn transform_managed<T, C>(fragment: &JsonObject, context: &mut C) -> Result<C::Id, DecodeError>
where
    T: ManagedJsonInstantiable,
    C: EntityContext<T>,
{
    let found = T::match_keys().and_then(|(stored_key, json_key)| {
        let value = fragment.get(json_key)?;
        if value.is_null() {
            return None;
        }
        context.find_instance(stored_key, value)
    });

    let id = match found {
        Some(id) => id,
        None => context.insert_instance()?,
    };

    let instance = context.instance_mut(id).ok_or(DecodeError::MissingContext)?;
    instance.read(fragment)?;
    Ok(id)
}

/// Simple in-memory [`EntityContext`] backed by a `Vec`.
///
/// Field lookup goes through a caller-supplied accessor because plain
/// structs carry no field-by-name reflection.
pub struct MemoryContext<T> {
    instances: Vec<T>,
    field: fn(&T, &str) -> Option<Value>,
}

impl<T: ManagedJsonInstantiable + Default> MemoryContext<T> {
    /// Creates an empty context with the given field accessor.
    pub fn new(field: fn(&T, &str) -> Option<Value>) -> Self {
        Self {
            instances: Vec::new(),
            field,
        }
    }

    /// All instances currently held, in insertion order.
    pub fn instances(&self) -> &[T] {
        &self.instances
    }
}

impl<T: ManagedJsonInstantiable + Default> EntityContext<T> for MemoryContext<T> {
    type Id = usize;

    fn find_instance(&self, key: &str, value: &Value) -> Option<usize> {
        self.instances
            .iter()
            .position(|instance| (self.field)(instance, key).as_ref() == Some(value))
    }

    fn insert_instance(&mut self) -> Result<usize, DecodeError> {
        self.instances.push(T::default());
        Ok(self.instances.len() - 1)
    }

    fn instance_mut(&mut self, id: usize) -> Option<&mut T> {
        self.instances.get_mut(id)
    }
}
