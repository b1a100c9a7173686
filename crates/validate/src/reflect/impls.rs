//! [`Reflect`] for std types.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use super::{Reflect, Type, TypeKind, Value, ValueError};

impl Reflect for bool {
    fn type_info() -> Type {
        Type::new(type_name::<Self>(), TypeKind::Bool)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
        }
    }
}

macro_rules! impl_reflect_int {
    ($($ty:ty => $bits:expr),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> Type {
                    Type::new(type_name::<Self>(), TypeKind::Int { bits: $bits })
                }

                #[allow(trivial_numeric_casts)]
                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i)
                            .map_err(|_| ValueError::overflow(type_name::<Self>(), i)),
                        Value::Uint(u) => <$ty>::try_from(u)
                            .map_err(|_| ValueError::overflow(type_name::<Self>(), u)),
                        other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_reflect_uint {
    ($($ty:ty => $bits:expr),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> Type {
                    Type::new(type_name::<Self>(), TypeKind::Uint { bits: $bits })
                }

                #[allow(trivial_numeric_casts)]
                fn to_value(&self) -> Value {
                    Value::Uint(*self as u64)
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Uint(u) => <$ty>::try_from(u)
                            .map_err(|_| ValueError::overflow(type_name::<Self>(), u)),
                        Value::Int(i) => <$ty>::try_from(i)
                            .map_err(|_| ValueError::overflow(type_name::<Self>(), i)),
                        other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
                    }
                }
            }
        )*
    };
}

impl_reflect_int!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, isize => 64);
impl_reflect_uint!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, usize => 64);

impl Reflect for f32 {
    fn type_info() -> Type {
        Type::new(type_name::<Self>(), TypeKind::Float { bits: 32 })
    }

    // widened through the shortest decimal form so `1.1f32` stays `1.1`
    fn to_value(&self) -> Value {
        Value::Float(self.to_string().parse().unwrap_or(f64::from(*self)))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f as f32),
            Value::Int(i) => Ok(i as f32),
            Value::Uint(u) => Ok(u as f32),
            other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
        }
    }
}

impl Reflect for f64 {
    fn type_info() -> Type {
        Type::new(type_name::<Self>(), TypeKind::Float { bits: 64 })
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            Value::Uint(u) => Ok(u as f64),
            other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
        }
    }
}

impl Reflect for String {
    fn type_info() -> Type {
        Type::new("String", TypeKind::String)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ValueError::mismatch("String", &other)),
        }
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> Type {
        Type::new(type_name::<Self>(), TypeKind::Slice(T::type_info()))
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
        }
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> Type {
        Type::new(type_name::<Self>(), TypeKind::Array(T::type_info(), N))
    }

    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Reflect::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let items = match value {
            Value::Seq(items) => items,
            other => return Err(ValueError::mismatch(type_name::<Self>(), &other)),
        };
        let found = items.len();
        let items = items
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        items.try_into().map_err(|_| ValueError::Length { expected: N, found })
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
    S: BuildHasher + Default,
{
    fn type_info() -> Type {
        Type::new(
            type_name::<HashMap<K, V>>(),
            TypeKind::Map(K::type_info(), V::type_info()),
        )
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
            other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
        }
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    fn type_info() -> Type {
        Type::new(
            type_name::<Self>(),
            TypeKind::Map(K::type_info(), V::type_info()),
        )
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
            other => Err(ValueError::mismatch(type_name::<Self>(), &other)),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> Type {
        Type::new(type_name::<Self>(), TypeKind::Pointer(T::type_info()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> Type {
        T::type_info()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}
