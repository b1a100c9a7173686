//! Dynamic values handed to validators.

use std::fmt;

use super::types::{Type, TypeKind};

/// Failure converting between text, JSON, [`Value`] and Rust types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValueError {
    #[error("cannot parse `{input}` as {type_name}: {message}")]
    Parse {
        type_name: String,
        input: String,
        message: String,
    },

    #[error("expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    #[error("{value} overflows {type_name}")]
    Overflow { type_name: String, value: String },

    #[error("expected {expected} elements, found {found}")]
    Length { expected: usize, found: usize },
}

impl ValueError {
    pub fn mismatch(expected: impl fmt::Display, found: &Value) -> Self {
        Self::Mismatch {
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }

    pub fn overflow(type_name: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::Overflow {
            type_name: type_name.into(),
            value: value.to_string(),
        }
    }

    fn parse(ty: &Type, input: &str, message: impl fmt::Display) -> Self {
        Self::Parse {
            type_name: ty.name().to_string(),
            input: input.to_string(),
            message: message.to_string(),
        }
    }
}

/// A value in the shape validators understand.
///
/// Struct values keep their fields in declaration order, keyed by the Rust
/// field name. `Null` stands for an absent `Option`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(Vec<(String, Value)>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Seq(_) => "seq",
            Self::Map(_) => "map",
            Self::Struct(_) => "struct",
        }
    }

    /// Generic zero check: null, `false`, `0`, and empty text or collections.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Uint(u) => *u == 0,
            Self::Float(f) => *f == 0.0,
            Self::String(s) => s.is_empty(),
            Self::Seq(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Struct(_) => false,
        }
    }

    /// Zero check honouring a type-specific hook when `ty` declares one.
    pub fn is_empty_as(&self, ty: &Type) -> bool {
        match ty.zero_check() {
            Some(check) => check(self),
            None => self.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Self::Struct(fields) => fields
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Zero value of `ty`; pointers are null so self-referential types end.
    pub fn zero(ty: &Type) -> Value {
        if ty.is_text() {
            return Self::String(String::new());
        }
        match ty.type_kind() {
            TypeKind::Bool => Self::Bool(false),
            TypeKind::Int { .. } => Self::Int(0),
            TypeKind::Uint { .. } => Self::Uint(0),
            TypeKind::Float { .. } => Self::Float(0.0),
            TypeKind::String => Self::String(String::new()),
            TypeKind::Slice(_) => Self::Seq(Vec::new()),
            TypeKind::Array(elem, len) => Self::Seq(vec![Self::zero(elem); *len]),
            TypeKind::Map(..) => Self::Map(Vec::new()),
            TypeKind::Struct(fields) => Self::Struct(
                fields
                    .iter()
                    .map(|field| (field.name().to_string(), Self::zero(&field.ty())))
                    .collect(),
            ),
            TypeKind::Pointer(_) => Self::Null,
        }
    }

    /// Decodes default-value text into a value of `ty`.
    ///
    /// Scalars and text types parse directly; composites are read as JSON,
    /// with struct fields keyed by their `name_tag` names.
    pub fn decode(ty: &Type, text: &str, name_tag: &str) -> Result<Value, ValueError> {
        if let Some(check) = ty.text_check() {
            check(text).map_err(|e| ValueError::parse(ty, text, e))?;
            return Ok(Self::String(text.to_string()));
        }

        match ty.type_kind() {
            TypeKind::Bool => parse_bool(text)
                .map(Self::Bool)
                .ok_or_else(|| ValueError::parse(ty, text, "invalid boolean")),
            TypeKind::Int { bits } => {
                let value = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| ValueError::parse(ty, text, e))?;
                check_int(ty, value, *bits).map(Self::Int)
            }
            TypeKind::Uint { bits } => {
                let value = text
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ValueError::parse(ty, text, e))?;
                check_uint(ty, value, *bits).map(Self::Uint)
            }
            TypeKind::Float { bits } => {
                let value = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| ValueError::parse(ty, text, e))?;
                check_float(ty, value, *bits).map(Self::Float)
            }
            TypeKind::String => Ok(Self::String(text.to_string())),
            TypeKind::Pointer(elem) => Self::decode(elem, text, name_tag),
            TypeKind::Slice(_) | TypeKind::Array(..) | TypeKind::Map(..) | TypeKind::Struct(_) => {
                let json: serde_json::Value =
                    serde_json::from_str(text).map_err(|e| ValueError::parse(ty, text, e))?;
                Self::from_json(ty, json, name_tag)
            }
        }
    }

    /// Reads a JSON document shaped like `ty`.
    ///
    /// Object keys match a field's `name_tag` name first, then its declared
    /// name.
    pub fn from_json(ty: &Type, json: serde_json::Value, name_tag: &str) -> Result<Value, ValueError> {
        use serde_json::Value as Json;

        if ty.is_text() {
            return match json {
                Json::String(text) => Self::decode(ty, &text, name_tag),
                other => Err(ValueError::Mismatch {
                    expected: ty.name().to_string(),
                    found: other.to_string(),
                }),
            };
        }

        let mismatch = |json: &Json| ValueError::Mismatch {
            expected: ty.name().to_string(),
            found: json.to_string(),
        };

        match (ty.type_kind(), json) {
            (TypeKind::Pointer(_), Json::Null) => Ok(Self::Null),
            (TypeKind::Pointer(elem), json) => Self::from_json(elem, json, name_tag),
            (TypeKind::Bool, Json::Bool(b)) => Ok(Self::Bool(b)),
            (TypeKind::Int { bits }, Json::Number(n)) => {
                let value = n.as_i64().ok_or_else(|| ValueError::overflow(ty.name(), &n))?;
                check_int(ty, value, *bits).map(Self::Int)
            }
            (TypeKind::Uint { bits }, Json::Number(n)) => {
                let value = n.as_u64().ok_or_else(|| ValueError::overflow(ty.name(), &n))?;
                check_uint(ty, value, *bits).map(Self::Uint)
            }
            (TypeKind::Float { bits }, Json::Number(n)) => {
                let value = n.as_f64().ok_or_else(|| ValueError::overflow(ty.name(), &n))?;
                check_float(ty, value, *bits).map(Self::Float)
            }
            (TypeKind::String, Json::String(s)) => Ok(Self::String(s)),
            (TypeKind::Slice(elem), Json::Array(items)) => items
                .into_iter()
                .map(|item| Self::from_json(elem, item, name_tag))
                .collect::<Result<_, _>>()
                .map(Self::Seq),
            (TypeKind::Array(elem, len), Json::Array(items)) => {
                if items.len() != *len {
                    return Err(ValueError::Length {
                        expected: *len,
                        found: items.len(),
                    });
                }
                items
                    .into_iter()
                    .map(|item| Self::from_json(elem, item, name_tag))
                    .collect::<Result<_, _>>()
                    .map(Self::Seq)
            }
            (TypeKind::Map(key, elem), Json::Object(entries)) => entries
                .into_iter()
                .map(|(k, v)| -> Result<_, ValueError> {
                    Ok((Self::decode(key, &k, name_tag)?, Self::from_json(elem, v, name_tag)?))
                })
                .collect::<Result<_, _>>()
                .map(Self::Map),
            (TypeKind::Struct(fields), Json::Object(mut object)) => fields
                .iter()
                .map(|field| -> Result<_, ValueError> {
                    let field_ty = field.ty();
                    let key = field.display_name(name_tag).name;
                    let value = match object.remove(&key).or_else(|| object.remove(field.name())) {
                        Some(json) => Self::from_json(&field_ty, json, name_tag)?,
                        None => Self::zero(&field_ty),
                    };
                    Ok((field.name().to_string(), value))
                })
                .collect::<Result<_, _>>()
                .map(Self::Struct),
            (_, json) => Err(mismatch(&json)),
        }
    }
}

/// Accepts the spellings `1 t T TRUE true True` and their false counterparts.
fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn check_int(ty: &Type, value: i64, bits: u32) -> Result<i64, ValueError> {
    let (min, max) = crate::validators::range::int_bounds(bits);
    if value < min || value > max {
        return Err(ValueError::overflow(ty.name(), value));
    }
    Ok(value)
}

fn check_uint(ty: &Type, value: u64, bits: u32) -> Result<u64, ValueError> {
    if value > crate::validators::range::uint_max(bits) {
        return Err(ValueError::overflow(ty.name(), value));
    }
    Ok(value)
}

fn check_float(ty: &Type, value: f64, bits: u32) -> Result<f64, ValueError> {
    if bits == 32 && value.is_finite() && value.abs() > f64::from(f32::MAX) {
        return Err(ValueError::overflow(ty.name(), value));
    }
    Ok(value)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
