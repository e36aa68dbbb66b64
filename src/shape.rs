//! Static type descriptors.
//!
//! Every type that takes part in mapping describes itself with a [`TypeInfo`]:
//! its identity plus a [`Shape`] telling the converter which strategy applies.
//! Nested descriptors are reached through function pointers so recursive
//! types (`struct Node { next: Option<Box<Node>> }`) stay finite.

use std::any::{type_name, TypeId};
use std::fmt;

/// The exact kind of a scalar leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Unit,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
}

/// Coarse classification used for dispatch and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Scalar(ScalarKind),
    Opaque,
    Struct,
    Seq,
    Map,
    Pointer,
    Interface,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Scalar(kind) => write!(f, "{kind:?}"),
            Kind::Opaque => write!(f, "opaque"),
            Kind::Struct => write!(f, "struct"),
            Kind::Seq => write!(f, "sequence"),
            Kind::Map => write!(f, "map"),
            Kind::Pointer => write!(f, "pointer"),
            Kind::Interface => write!(f, "interface"),
        }
    }
}

/// A declared struct field as seen by the profile builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    pub name: &'static str,
    /// Value of the `#[mapper(tag = "...")]` attribute
    pub tag: Option<&'static str>,
    /// Whether the field is declared `pub`
    pub exported: bool,
}

impl FieldMeta {
    pub const fn new(name: &'static str, tag: Option<&'static str>, exported: bool) -> Self {
        Self {
            name,
            tag,
            exported,
        }
    }
}

/// Field and method listing of a struct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructInfo {
    pub name: &'static str,
    pub fields: &'static [FieldMeta],
    /// Zero-argument methods the struct exposes to the mapper
    pub methods: &'static [&'static str],
}

impl StructInfo {
    pub const fn new(
        name: &'static str,
        fields: &'static [FieldMeta],
        methods: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            fields,
            methods,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(&name)
    }
}

/// How a type is laid out, from the converter's point of view.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Scalar(ScalarKind),
    /// A leaf copied as a whole when both sides have the same type
    Opaque,
    Struct(StructInfo),
    Seq {
        element: fn() -> TypeInfo,
    },
    Map {
        key: fn() -> TypeInfo,
        value: fn() -> TypeInfo,
    },
    /// `Option<T>` (nullable) or `Box<T>`
    Pointer {
        pointee: fn() -> TypeInfo,
        nullable: bool,
    },
    /// `Box<dyn Mappable>`
    Interface,
}

impl Shape {
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Scalar(kind) => Kind::Scalar(*kind),
            Shape::Opaque => Kind::Opaque,
            Shape::Struct(_) => Kind::Struct,
            Shape::Seq { .. } => Kind::Seq,
            Shape::Map { .. } => Kind::Map,
            Shape::Pointer { .. } => Kind::Pointer,
            Shape::Interface => Kind::Interface,
        }
    }
}

/// Identity and shape of a mappable type.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub shape: Shape,
}

impl TypeInfo {
    pub fn of<T: 'static + ?Sized>(shape: Shape) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            shape,
        }
    }

    pub fn kind(&self) -> Kind {
        self.shape.kind()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.shape, Shape::Pointer { .. })
    }

    /// Element type of a sequence, `None` for anything else.
    pub fn element(&self) -> Option<TypeInfo> {
        match self.shape {
            Shape::Seq { element } => Some(element()),
            _ => None,
        }
    }

    /// The type left after following every pointer.
    pub fn pointer_root(&self) -> TypeInfo {
        let mut current = *self;
        while let Shape::Pointer { pointee, .. } = current.shape {
            current = pointee();
        }
        current
    }

    /// Follows pointers down to a struct.
    ///
    /// Returns the descriptor of the struct type itself together with its
    /// field listing, or `None` when the chain ends in anything else.
    pub fn deref_struct(&self) -> Option<(TypeInfo, StructInfo)> {
        let mut current = *self;
        loop {
            match current.shape {
                Shape::Struct(info) => return Some((current, info)),
                Shape::Pointer { pointee, .. } => current = pointee(),
                _ => return None,
            }
        }
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeInfo {}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
