use std::any::TypeId;
use std::fmt;

use crate::record::Record;
use crate::value::Value;

/// Width of a signed integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    Isize,
}

impl IntWidth {
    /// Narrow an `i64` to this width with two's-complement wrapping.
    pub fn wrap(self, v: i64) -> i64 {
        match self {
            IntWidth::I8 => v as i8 as i64,
            IntWidth::I16 => v as i16 as i64,
            IntWidth::I32 => v as i32 as i64,
            IntWidth::I64 => v,
            IntWidth::Isize => v as isize as i64,
        }
    }

    fn name(self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::Isize => "isize",
        }
    }
}

/// Width of an unsigned integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl UintWidth {
    /// Narrow a `u64` to this width with wrapping.
    pub fn wrap(self, v: u64) -> u64 {
        match self {
            UintWidth::U8 => v as u8 as u64,
            UintWidth::U16 => v as u16 as u64,
            UintWidth::U32 => v as u32 as u64,
            UintWidth::U64 => v,
            UintWidth::Usize => v as usize as u64,
        }
    }

    fn name(self) -> &'static str {
        match self {
            UintWidth::U8 => "u8",
            UintWidth::U16 => "u16",
            UintWidth::U32 => "u32",
            UintWidth::U64 => "u64",
            UintWidth::Usize => "usize",
        }
    }
}

/// Width of a floating-point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    F32,
    F64,
}

/// Handle to a record type: name, identity and lazily built schema.
///
/// The schema is produced on demand so that self-referential records
/// (`struct Tree { children: Vec<Tree> }`) have a finite descriptor.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    id: fn() -> TypeId,
    schema: fn() -> Schema,
    zero: fn() -> Value,
}

impl RecordType {
    pub fn of<T: Record + 'static>() -> Self {
        Self {
            name: T::NAME,
            id: TypeId::of::<T>,
            schema: T::schema,
            zero: zero_of::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> Schema {
        (self.schema)()
    }

    /// The record's `Default` value, as a `Value::Record`.
    pub fn zero(&self) -> Value {
        (self.zero)()
    }
}

fn zero_of<T: Record>() -> Value {
    T::default().to_value()
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        (self.id)() == (other.id)()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

/// Type descriptor of a field or value.
///
/// Closed: the conversion engine dispatches on it with one exhaustive `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    Int(IntWidth),
    Uint(UintWidth),
    Float(FloatWidth),
    /// `re + im·i`, compared against a single real by `eq`/`ne`.
    Complex,
    String,
    Optional(Box<FieldType>),
    Seq(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
    Record(RecordType),
}

impl FieldType {
    /// Strip one level of `Option`.
    pub fn indirect(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Int(_) | FieldType::Uint(_) | FieldType::Float(_)
        )
    }

    /// Whether a value of this type can carry a record anywhere inside it.
    /// Such values are never copied whole, so private fields stay unread.
    pub fn holds_record(&self) -> bool {
        match self {
            FieldType::Record(_) => true,
            FieldType::Optional(inner) | FieldType::Seq(inner) => inner.holds_record(),
            FieldType::Map(k, v) => k.holds_record() || v.holds_record(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::Int(w) => f.write_str(w.name()),
            FieldType::Uint(w) => f.write_str(w.name()),
            FieldType::Float(FloatWidth::F32) => f.write_str("f32"),
            FieldType::Float(FloatWidth::F64) => f.write_str("f64"),
            FieldType::Complex => f.write_str("Complex"),
            FieldType::String => f.write_str("String"),
            FieldType::Optional(inner) => write!(f, "Option<{inner}>"),
            FieldType::Seq(elem) => write!(f, "Vec<{elem}>"),
            FieldType::Map(k, v) => write!(f, "Map<{k}, {v}>"),
            FieldType::Record(r) => f.write_str(r.name()),
        }
    }
}

/// A single field in a record schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Raw tag string, e.g. `"username,required,len=8"`. Empty when untagged.
    pub tag: &'static str,
    /// `false` for non-`pub` fields: never read as a source, never written as a target.
    pub exported: bool,
}

impl Field {
    pub fn new(name: &'static str, field_type: FieldType, tag: &'static str, exported: bool) -> Self {
        Self {
            name,
            field_type,
            tag,
            exported,
        }
    }
}

/// Ordered field list of a record type, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(name: &'static str, fields: Vec<Field>) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
