// Declaration IR shared by inference, lowering and codegen. No JSON values here.
use std::fmt;

/// Identifies one synthesized named declaration. Allocated from 1 upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub const ROOT: TypeId = TypeId(1);

    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn succ(self) -> TypeId {
        TypeId(self.0 + 1)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J2S{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Bool,
    Int,
    Float,
    String,
}

/// Type of a slot: field, array element or declaration body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(Scalar),
    /// dynamic fallback (`interface{}`)
    Any,
    Named(TypeId),
    Seq(Box<TypeRef>),
}

impl TypeRef {
    pub fn seq(item: TypeRef) -> Self {
        TypeRef::Seq(Box::new(item))
    }

    /// Equal types unify to themselves; anything else degrades to `Any`.
    pub fn unify(self, other: &TypeRef) -> TypeRef {
        if self == *other { self } else { TypeRef::Any }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// original JSON key, unmodified
    pub key: String,
    pub ty: TypeRef,
    /// absent from at least one merged object
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scalar(Scalar),
    Alias(TypeRef),
    Struct(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub id: TypeId,
    pub shape: Shape,
}
