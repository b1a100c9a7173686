//! Declarative helpers for implementing [`Reflect`](crate::reflect::Reflect).

/// Declares a struct together with its [`Reflect`](crate::reflect::Reflect)
/// impl.
///
/// Field metadata goes in a `#[tag(...)]` attribute: `key = "value"` pairs
/// become struct tags, bare keys call the matching [`StructField`] builder
/// (`embedded`, `unexported`). Fields without `pub` are unexported and never
/// validated.
///
/// [`StructField`]: crate::reflect::StructField
///
/// # Examples
///
/// ```rust
/// use nebula_validate::prelude::*;
/// use nebula_validate::reflect_struct;
///
/// reflect_struct! {
///     #[derive(Debug, Default)]
///     pub struct Signup {
///         #[tag(json = "email", validate = "@email")]
///         pub email: String,
///         #[tag(json = "plan,omitempty", validate = "@string{FREE,PRO}", default = "FREE")]
///         pub plan: String,
///     }
/// }
///
/// let registry = ValidatorRegistry::new();
/// let mut signup = Signup { email: "a@example.com".into(), ..Default::default() };
/// registry.validate_in_place(&mut signup).unwrap();
/// assert_eq!(signup.plan, "FREE");
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (@tag $field:ident, $key:ident = $value:literal) => {
        $field.tag(stringify!($key), $value)
    };
    (@tag $field:ident, $key:ident) => {
        $field.$key()
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[tag($($key:ident $(= $value:literal)?),* $(,)?)])?
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fvis $field: $fty,)*
        }

        impl $crate::reflect::Reflect for $name {
            fn type_info() -> $crate::reflect::Type {
                $crate::reflect::Type::new(
                    ::std::any::type_name::<Self>(),
                    $crate::reflect::TypeKind::Struct(vec![
                        $({
                            let field = $crate::reflect::StructField::new(
                                stringify!($field),
                                <$fty as $crate::reflect::Reflect>::type_info,
                            );
                            let field = if stringify!($fvis).is_empty() {
                                field.unexported()
                            } else {
                                field
                            };
                            $($(
                                let field = $crate::reflect_struct!(@tag field, $key $(= $value)?);
                            )*)?
                            field
                        },)*
                    ]),
                )
            }

            fn to_value(&self) -> $crate::reflect::Value {
                $crate::reflect::Value::Struct(vec![
                    $((
                        stringify!($field).to_string(),
                        $crate::reflect::Reflect::to_value(&self.$field),
                    ),)*
                ])
            }

            fn from_value(
                value: $crate::reflect::Value,
            ) -> ::std::result::Result<Self, $crate::reflect::ValueError> {
                #[allow(unused_mut)]
                let mut fields =
                    $crate::reflect::StructFields::new(::std::any::type_name::<Self>(), value)?;
                Ok(Self {
                    $($field: <$fty as $crate::reflect::Reflect>::from_value(
                        fields.take(stringify!($field)),
                    )?,)*
                })
            }
        }
    };
}

/// Implements [`Reflect`](crate::reflect::Reflect) for a type with a
/// canonical text form through its `Display` and `FromStr` impls.
///
/// Such types are validated as strings.
///
/// # Examples
///
/// ```rust
/// use std::fmt;
/// use std::str::FromStr;
///
/// use nebula_validate::prelude::*;
/// use nebula_validate::reflect_text;
///
/// #[derive(Debug)]
/// struct Port(u16);
///
/// impl fmt::Display for Port {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}", self.0)
///     }
/// }
///
/// impl FromStr for Port {
///     type Err = std::num::ParseIntError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Port)
///     }
/// }
///
/// reflect_text!(Port);
///
/// let ty = Type::of::<Port>();
/// assert!(ty.is_text());
/// assert!(Value::decode(&ty, "8080", "json").is_ok());
/// assert!(Value::decode(&ty, "http", "json").is_err());
/// ```
#[macro_export]
macro_rules! reflect_text {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::reflect::Reflect for $ty {
                fn type_info() -> $crate::reflect::Type {
                    $crate::reflect::Type::new(
                        ::std::any::type_name::<Self>(),
                        $crate::reflect::TypeKind::String,
                    )
                    .with_text(|text| {
                        text.parse::<$ty>()
                            .map(|_| ())
                            .map_err(|err| err.to_string())
                    })
                }

                fn to_value(&self) -> $crate::reflect::Value {
                    $crate::reflect::Value::String(self.to_string())
                }

                fn from_value(
                    value: $crate::reflect::Value,
                ) -> ::std::result::Result<Self, $crate::reflect::ValueError> {
                    match value {
                        $crate::reflect::Value::String(text) => {
                            text.parse::<$ty>().map_err(|err| $crate::reflect::ValueError::Parse {
                                type_name: ::std::any::type_name::<Self>().to_string(),
                                input: text.clone(),
                                message: err.to_string(),
                            })
                        }
                        other => Err($crate::reflect::ValueError::mismatch(
                            ::std::any::type_name::<Self>(),
                            &other,
                        )),
                    }
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::reflect::{Kind, Reflect, Type, Value};
    use pretty_assertions::assert_eq;

    reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Inner {
            #[tag(json = "id", validate = "@uint[1,]")]
            pub id: u64,
        }
    }

    reflect_struct! {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Outer {
            #[tag(json = "name,omitempty")]
            pub name: String,
            #[tag(embedded)]
            pub inner: Inner,
            hidden: i32,
        }
    }

    #[test]
    fn test_struct_type_info() {
        let ty = Outer::type_info();
        assert_eq!(ty.kind(), Kind::Struct);

        let fields = ty.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].tag_value("json"), Some("name,omitempty"));
        assert!(fields[1].is_embedded());
        assert_eq!(fields[1].ty(), Inner::type_info());
        assert!(!fields[2].is_exported());
    }

    #[test]
    fn test_struct_value_round_trip() {
        let outer = Outer {
            name: "x".into(),
            inner: Inner { id: 3 },
            hidden: 1,
        };
        let value = outer.to_value();
        assert_eq!(value.field("inner"), Some(&Value::Struct(vec![("id".into(), Value::Uint(3))])));
        assert_eq!(Outer::from_value(value).unwrap(), outer);
    }

    #[test]
    fn test_missing_fields_are_rejected_unless_nullable() {
        assert!(Inner::from_value(Value::Struct(vec![])).is_err());
    }

    #[derive(Debug, PartialEq)]
    struct Level(u8);

    impl std::fmt::Display for Level {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "L{}", self.0)
        }
    }

    impl std::str::FromStr for Level {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.strip_prefix('L')
                .and_then(|n| n.parse().ok())
                .map(Level)
                .ok_or_else(|| format!("`{s}` is not a level"))
        }
    }

    reflect_text!(Level);

    #[test]
    fn test_text_type() {
        let ty = Type::of::<Level>();
        assert!(ty.is_text());
        assert_eq!(Level(2).to_value(), Value::String("L2".into()));
        assert_eq!(Level::from_value(Value::String("L7".into())).unwrap(), Level(7));
        assert!(Level::from_value(Value::String("7".into())).is_err());
    }
}
