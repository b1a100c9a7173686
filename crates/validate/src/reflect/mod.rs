//! Type descriptors and dynamic values.
//!
//! Rust has no runtime reflection, so types that can be validated describe
//! themselves through [`Reflect`]: a static [`Type`] for the compiler and a
//! conversion to and from [`Value`] for validation.

mod impls;
mod types;
mod value;

pub use types::{FieldName, Kind, StructField, TextCheck, Type, TypeKind, ZeroCheck};
pub use value::{Value, ValueError};

/// A type the registry can compile validators for.
pub trait Reflect {
    fn type_info() -> Type;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>
    where
        Self: Sized;
}

/// Field-by-field reader used by generated `from_value` impls.
#[doc(hidden)]
pub struct StructFields {
    type_name: &'static str,
    fields: Vec<(String, Value)>,
}

impl StructFields {
    pub fn new(type_name: &'static str, value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Struct(fields) => Ok(Self { type_name, fields }),
            other => Err(ValueError::mismatch(type_name, &other)),
        }
    }

    /// Removes the named field; a missing field reads as null.
    pub fn take(&mut self, name: &str) -> Value {
        match self.fields.iter().position(|(n, _)| n == name) {
            Some(index) => self.fields.swap_remove(index).1,
            None => Value::Null,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}
