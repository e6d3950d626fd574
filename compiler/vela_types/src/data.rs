//! Interned type shapes.

use vela_ast::Type;

/// Array size: fixed, decided at runtime, or unknown (`T[?]`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArraySize {
    Fixed(i64),
    Runtime,
    Unknown,
}

/// A named element of a tuple type.
///
/// Equal iff both the name and the type are equal. Synthesized tuples
/// (multi-return values) use empty names.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TupleElement {
    pub name: String,
    pub ty: Type,
}

impl TupleElement {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        TupleElement {
            name: name.into(),
            ty,
        }
    }

    /// An element without a name, as used in synthesized tuples.
    pub fn unnamed(ty: Type) -> Self {
        TupleElement {
            name: String::new(),
            ty,
        }
    }
}

/// The kind of a type shape, for dispatch.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Basic,
    Array,
    Tuple,
    Function,
    Pointer,
    Optional,
}

/// A structural type shape, the unit of interning.
///
/// Contained types are full handles, so the mutability of *contained*
/// types participates in the shape; only the outermost qualifier lives
/// outside the pool, on the handle.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    /// A named nominal or scalar type, optionally with generic arguments.
    Basic {
        name: String,
        generic_args: Vec<Type>,
    },
    Array {
        element: Type,
        size: ArraySize,
    },
    Tuple {
        elements: Vec<TupleElement>,
    },
    Function {
        return_type: Type,
        params: Vec<Type>,
    },
    Pointer {
        pointee: Type,
    },
    Optional {
        wrapped: Type,
    },
}

impl TypeData {
    /// The kind tag of this shape.
    pub fn kind(&self) -> TypeKind {
        match self {
            TypeData::Basic { .. } => TypeKind::Basic,
            TypeData::Array { .. } => TypeKind::Array,
            TypeData::Tuple { .. } => TypeKind::Tuple,
            TypeData::Function { .. } => TypeKind::Function,
            TypeData::Pointer { .. } => TypeKind::Pointer,
            TypeData::Optional { .. } => TypeKind::Optional,
        }
    }
}
