use serde_json::Value;

mod sealed {
    pub trait Sealed {}
}

/// Closed set of primitive types the decoder knows how to coerce a JSON
/// value into.
///
/// Coercion follows the number's own representation: integers widen or
/// narrow across the signed/unsigned/floating families, booleans are
/// accepted where a number is expected (0/1) and numbers where a boolean is
/// expected (non-zero is true). Anything else is a type mismatch.
pub trait JsonScalar: sealed::Sealed + Sized {
    /// Name used for the `expected` side of a `TypeMismatch`.
    const EXPECTED: &'static str;

    /// Coerces a JSON value into this type, or `None` if the value's shape
    /// is incompatible.
    fn from_value(value: &Value) -> Option<Self>;

    /// Converts this value back into its JSON representation.
    fn into_value(self) -> Value;
}

impl sealed::Sealed for String {}

impl JsonScalar for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl sealed::Sealed for bool {}

impl JsonScalar for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! impl_integer_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl JsonScalar for $ty {
            const EXPECTED: &'static str = stringify!($ty);

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            Some(i as $ty)
                        } else if let Some(u) = n.as_u64() {
                            Some(u as $ty)
                        } else {
                            n.as_f64().map(|f| f as $ty)
                        }
                    }
                    Value::Bool(b) => Some(if *b { 1 } else { 0 }),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::from(self)
            }
        }
    )*};
}

impl_integer_scalar!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_float_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl sealed::Sealed for $ty {}

        impl JsonScalar for $ty {
            const EXPECTED: &'static str = stringify!($ty);

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Number(n) => n.as_f64().map(|f| f as $ty),
                    Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::from(self as f64)
            }
        }
    )*};
}

impl_float_scalar!(f32, f64);
