use crate::error::ValueError;
use crate::record::Mappable;
use crate::schema::{FieldType, RecordType};

/// Canonical value representation.
///
/// Strategy by type:
/// - Integers widen to `Int(i64)` / `Uint(u64)`, floats to `Float(f64)`.
///   The width lives in the accompanying `FieldType`, not in the value.
/// - `Option::None` is `Null`; `Some(v)` is `v` itself.
/// - Seq, Map, Record: recursive, eagerly built.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex(f64, f64),
    String(String),
    Seq(Vec<Value>),
    /// Entry order is the source container's iteration order.
    Map(Vec<(Value, Value)>),
    Record(RecordValue),
}

impl Value {
    /// Whether this is the zero value of its kind.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Uint(u) => *u == 0,
            Value::Float(f) => *f == 0.0,
            Value::Complex(re, im) => *re == 0.0 && *im == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            Value::Record(r) => r.fields.iter().all(|(_, v)| v.is_zero()),
        }
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Complex(_, _) => "complex",
            Value::String(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }
}

/// Field values of one record, in declaration order.
///
/// Carries every field, exported or not, so that copying a record through
/// the identical-type path keeps its private state.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    pub name: &'static str,
    pub fields: Vec<(&'static str, Value)>,
}

impl RecordValue {
    pub fn new(name: &'static str, fields: Vec<(&'static str, Value)>) -> Self {
        Self { name, fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| *n == field).map(|(_, v)| v)
    }

    /// Replace the value of `field`. Returns `false` if the record has no such field.
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        match self.fields.iter_mut().find(|(n, _)| *n == field) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => false,
        }
    }
}

/// Complex number. Rust has no built-in one; this is the type the `eq`/`ne`
/// validators recognise as complex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A value together with its exact type: what a callback receives and returns.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyValue {
    pub value: Value,
    pub ty: FieldType,
}

impl AnyValue {
    pub fn new<T: Mappable>(v: T) -> Self {
        Self {
            value: v.to_value(),
            ty: T::field_type(),
        }
    }

    pub fn from_parts(value: Value, ty: FieldType) -> Self {
        Self { value, ty }
    }

    /// Exact-type extraction: fails unless the carried type is `T`'s type.
    pub fn downcast<T: Mappable>(self) -> Result<T, ValueError> {
        let expected = T::field_type();
        if self.ty != expected {
            return Err(ValueError::TypeMismatch {
                expected: expected.to_string(),
                found: self.ty.to_string(),
            });
        }
        T::from_value(self.value)
    }

    /// The record type, if this holds a record (or a present optional record).
    pub fn record_type(&self) -> Option<RecordType> {
        match (&self.ty, &self.value) {
            (FieldType::Record(rt), _) => Some(*rt),
            (FieldType::Optional(inner), v) if *v != Value::Null => match inner.as_ref() {
                FieldType::Record(rt) => Some(*rt),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A value in flight: the value, its type, and where it came from.
///
/// `record` and `field` exist only to build precise error messages.
#[derive(Debug, Clone)]
pub struct FieldValue {
    pub value: Value,
    pub ty: FieldType,
    pub record: &'static str,
    pub field: String,
}

impl FieldValue {
    pub fn new(value: Value, ty: FieldType, record: &'static str, field: impl Into<String>) -> Self {
        Self {
            value,
            ty,
            record,
            field: field.into(),
        }
    }

    /// Same origin, different value and type (element of a sequence, callback output).
    pub fn with(&self, value: Value, ty: FieldType) -> Self {
        Self {
            value,
            ty,
            record: self.record,
            field: self.field.clone(),
        }
    }
}
