use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::error::ValueError;
use crate::schema::{FieldType, FloatWidth, IntWidth, RecordType, Schema, UintWidth};
use crate::value::{Complex, Value};

/// A type the mapper can read from and write to.
///
/// `to_value` / `from_value` move between the concrete type and the canonical
/// [`Value`]; `field_type` describes it. `from_value` expects a value already
/// shaped for `Self` (the conversion engine guarantees that) and reports a
/// [`ValueError`] otherwise.
pub trait Mappable: Sized {
    fn field_type() -> FieldType;
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

/// A struct with named fields: the unit of conversion.
///
/// Normally generated by `#[derive(Record)]`; implement by hand to register a
/// type explicitly. `schema` lists fields in declaration order with their
/// tags and visibility; `set_field` assigns one field in place.
pub trait Record: Mappable + Default + 'static {
    const NAME: &'static str;

    fn schema() -> Schema;

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), ValueError>;

    fn record_type() -> RecordType {
        RecordType::of::<Self>()
    }
}

/// Rebuild a record from a `Value::Record` by assigning every carried field
/// onto `T::default()`. Shared by derived and hand-written `from_value`.
pub fn record_from_value<T: Record>(value: Value) -> Result<T, ValueError> {
    let record = match value {
        Value::Record(r) => r,
        other => {
            return Err(ValueError::TypeMismatch {
                expected: T::NAME.to_string(),
                found: other.kind_name().to_string(),
            });
        }
    };
    let mut out = T::default();
    for (name, v) in record.fields {
        out.set_field(name, v)?;
    }
    Ok(out)
}

fn mismatch(expected: &FieldType, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

macro_rules! impl_signed {
    ($($t:ty => $w:ident),* $(,)?) => {$(
        impl Mappable for $t {
            fn field_type() -> FieldType {
                FieldType::Int(IntWidth::$w)
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Int(v) => <$t>::try_from(v).map_err(|_| ValueError::OutOfRange {
                        value: v.to_string(),
                        ty: stringify!($t),
                    }),
                    other => Err(mismatch(&Self::field_type(), &other)),
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty => $w:ident),* $(,)?) => {$(
        impl Mappable for $t {
            fn field_type() -> FieldType {
                FieldType::Uint(UintWidth::$w)
            }

            fn to_value(&self) -> Value {
                Value::Uint(*self as u64)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::Uint(v) => <$t>::try_from(v).map_err(|_| ValueError::OutOfRange {
                        value: v.to_string(),
                        ty: stringify!($t),
                    }),
                    other => Err(mismatch(&Self::field_type(), &other)),
                }
            }
        }
    )*};
}

impl_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
impl_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl Mappable for f32 {
    fn field_type() -> FieldType {
        FieldType::Float(FloatWidth::F32)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v as f32),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl Mappable for f64 {
    fn field_type() -> FieldType {
        FieldType::Float(FloatWidth::F64)
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl Mappable for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl Mappable for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl Mappable for Complex {
    fn field_type() -> FieldType {
        FieldType::Complex
    }

    fn to_value(&self) -> Value {
        Value::Complex(self.re, self.im)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Complex(re, im) => Ok(Complex { re, im }),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: Mappable> Mappable for Option<T> {
    fn field_type() -> FieldType {
        FieldType::Optional(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

/// Transparent: `Box<T>` maps exactly like `T`.
impl<T: Mappable> Mappable for Box<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        self.as_ref().to_value()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Mappable> Mappable for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::Seq(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Mappable::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl<K, V> Mappable for HashMap<K, V>
where
    K: Mappable + Eq + Hash,
    V: Mappable,
{
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(K::field_type()), Box::new(V::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}

impl<K, V> Mappable for BTreeMap<K, V>
where
    K: Mappable + Ord,
    V: Mappable,
{
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(K::field_type()), Box::new(V::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            other => Err(mismatch(&Self::field_type(), &other)),
        }
    }
}
