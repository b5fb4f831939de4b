//! Struct-to-struct mapping driven by field tags.
//!
//! ```ignore
//! #[derive(Record, Default)]
//! pub struct Person {
//!     pub name: String,
//!     pub age: u8,
//! }
//!
//! #[derive(Record, Default)]
//! pub struct User {
//!     #[shapeshift("name,required")]
//!     pub username: String,
//!     pub age: i32,
//! }
//!
//! let user: User = shapeshift::map_to(&person)?;
//! ```

extern crate self as shapeshift;

pub mod callback;
pub mod config;
pub mod converter;
pub mod error;
pub mod mapper;
pub mod record;
pub mod schema;
pub mod tag;
pub mod validator;
pub mod value;

pub use callback::{Callback, CallbackFn, CallbackRegistry};
pub use config::Config;
pub use error::{BoxError, ConfigError, Fault, MapError, ValueError};
pub use mapper::{Mapper, MapperBuilder};
pub use record::{Mappable, Record, record_from_value};
pub use schema::{Field, FieldType, FloatWidth, IntWidth, RecordType, Schema, UintWidth};
pub use shapeshift_derive::Record;
pub use validator::{Validator, ValidatorFn, ValidatorRegistry, ValidatorTable};
pub use value::{AnyValue, Complex, FieldValue, RecordValue, Value};

/// Map `src` into `dst` with a default [`Mapper`].
pub fn map<S: Record, D: Record>(src: &S, dst: &mut D) -> Result<(), MapError> {
    Mapper::default().map(src, dst)
}

/// Map `src` into a fresh `D` with a default [`Mapper`].
pub fn map_to<S: Record, D: Record>(src: &S) -> Result<D, MapError> {
    Mapper::default().map_to(src)
}
