//! Static type descriptors consumed by the compiler.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::value::Value;

/// Structural category of a type, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Slice,
    Array,
    Map,
    Struct,
    Pointer,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Slice => "slice",
            Self::Array => "array",
            Self::Map => "map",
            Self::Struct => "struct",
            Self::Pointer => "pointer",
        };
        f.write_str(name)
    }
}

/// Shape of a type, with element types resolved.
#[derive(Clone)]
pub enum TypeKind {
    Bool,
    Int { bits: u32 },
    Uint { bits: u32 },
    Float { bits: u32 },
    String,
    Slice(Type),
    Array(Type, usize),
    Map(Type, Type),
    Struct(Vec<StructField>),
    /// Nullable reference; `Option<T>` in Rust.
    Pointer(Type),
}

/// Check that text parses as the owning type.
pub type TextCheck = fn(&str) -> Result<(), String>;

/// Type-specific emptiness test, overriding the generic zero check.
pub type ZeroCheck = fn(&Value) -> bool;

#[derive(Clone)]
struct TypeInner {
    name: Cow<'static, str>,
    kind: TypeKind,
    text: Option<TextCheck>,
    zero: Option<ZeroCheck>,
}

/// Description of a target type: name, shape and capabilities.
///
/// Cheap to clone. Two types are equal when their names are equal.
#[derive(Clone)]
pub struct Type(Arc<TypeInner>);

impl Type {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self(Arc::new(TypeInner {
            name: name.into(),
            kind,
            text: None,
            zero: None,
        }))
    }

    /// Descriptor of `T`.
    pub fn of<T: super::Reflect>() -> Self {
        T::type_info()
    }

    /// The synthetic type text-representable values are validated as.
    pub fn text() -> Self {
        Self::new("String", TypeKind::String)
    }

    /// Marks the type as having a canonical text form.
    pub fn with_text(mut self, check: TextCheck) -> Self {
        Arc::make_mut(&mut self.0).text = Some(check);
        self
    }

    pub fn with_zero_check(mut self, check: ZeroCheck) -> Self {
        Arc::make_mut(&mut self.0).zero = Some(check);
        self
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn type_kind(&self) -> &TypeKind {
        &self.0.kind
    }

    pub fn kind(&self) -> Kind {
        match self.0.kind {
            TypeKind::Bool => Kind::Bool,
            TypeKind::Int { .. } => Kind::Int,
            TypeKind::Uint { .. } => Kind::Uint,
            TypeKind::Float { .. } => Kind::Float,
            TypeKind::String => Kind::String,
            TypeKind::Slice(_) => Kind::Slice,
            TypeKind::Array(..) => Kind::Array,
            TypeKind::Map(..) => Kind::Map,
            TypeKind::Struct(_) => Kind::Struct,
            TypeKind::Pointer(_) => Kind::Pointer,
        }
    }

    pub fn is_text(&self) -> bool {
        self.0.text.is_some()
    }

    pub fn text_check(&self) -> Option<TextCheck> {
        self.0.text
    }

    pub fn zero_check(&self) -> Option<ZeroCheck> {
        self.0.zero
    }

    /// Width in bits of numeric kinds.
    pub fn bits(&self) -> Option<u32> {
        match self.0.kind {
            TypeKind::Int { bits } | TypeKind::Uint { bits } | TypeKind::Float { bits } => {
                Some(bits)
            }
            _ => None,
        }
    }

    /// Element type of slices, arrays, maps and pointers.
    pub fn elem(&self) -> Option<&Type> {
        match &self.0.kind {
            TypeKind::Slice(elem)
            | TypeKind::Array(elem, _)
            | TypeKind::Map(_, elem)
            | TypeKind::Pointer(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&Type> {
        match &self.0.kind {
            TypeKind::Map(key, _) => Some(key),
            _ => None,
        }
    }

    /// Declared length of an array type.
    pub fn len(&self) -> Option<usize> {
        match self.0.kind {
            TypeKind::Array(_, len) => Some(len),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[StructField] {
        match &self.0.kind {
            TypeKind::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Strips every level of pointer indirection.
    pub fn deref(&self) -> Type {
        let mut ty = self.clone();
        while let TypeKind::Pointer(elem) = ty.type_kind() {
            ty = elem.clone();
        }
        ty
    }

    /// `true` when `self` or a pointer chain ending in it is text-representable.
    pub fn is_text_through_pointers(&self) -> bool {
        self.is_text() || (self.kind() == Kind::Pointer && self.deref().is_text())
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("text", &self.is_text())
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// STRUCT FIELDS
// ============================================================================

/// Display name and flags resolved from a field's name tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldName {
    pub name: String,
    pub omit_empty: bool,
    /// The name tag was present on the field.
    pub tagged: bool,
}

/// One field of a struct type.
///
/// The field type is resolved on demand so a struct may refer to itself
/// through a pointer or a collection.
#[derive(Clone)]
pub struct StructField {
    name: Cow<'static, str>,
    ty: fn() -> Type,
    tags: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    embedded: bool,
    exported: bool,
}

impl StructField {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: fn() -> Type) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: Vec::new(),
            embedded: false,
            exported: true,
        }
    }

    pub fn tag(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Marks the field as an embedded struct whose fields belong to the parent.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Type {
        (self.ty)()
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Resolves `"name,omitempty"` style metadata under `tag_key`.
    pub fn display_name(&self, tag_key: &str) -> FieldName {
        let Some(tag) = self.tag_value(tag_key) else {
            return FieldName {
                name: self.name.to_string(),
                omit_empty: false,
                tagged: false,
            };
        };

        let mut parts = tag.split(',');
        let name = parts.next().unwrap_or_default().trim();
        let omit_empty = parts.any(|flag| flag.trim() == "omitempty");

        FieldName {
            name: if name.is_empty() {
                self.name.to_string()
            } else {
                name.to_string()
            },
            omit_empty,
            tagged: true,
        }
    }
}

impl fmt::Debug for StructField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructField")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("embedded", &self.embedded)
            .field("exported", &self.exported)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;
    use rstest::rstest;

    #[rstest]
    #[case("name,omitempty", "name", true)]
    #[case(",omitempty", "Field", true)]
    #[case("name", "name", false)]
    #[case("-", "-", false)]
    fn test_display_name(#[case] tag: &'static str, #[case] name: &str, #[case] omit_empty: bool) {
        let field = StructField::new("Field", String::type_info).tag("json", tag);
        let resolved = field.display_name("json");
        assert_eq!(resolved.name, name);
        assert_eq!(resolved.omit_empty, omit_empty);
        assert!(resolved.tagged);
    }

    #[test]
    fn test_untagged_field_uses_declared_name() {
        let field = StructField::new("Field", String::type_info);
        let resolved = field.display_name("json");
        assert_eq!(resolved.name, "Field");
        assert!(!resolved.tagged);
    }

    #[test]
    fn test_deref_strips_all_pointers() {
        let ty = Option::<Option<i32>>::type_info();
        assert_eq!(ty.kind(), Kind::Pointer);
        assert_eq!(ty.deref().kind(), Kind::Int);
    }
}
