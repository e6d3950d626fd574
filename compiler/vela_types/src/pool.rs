//! The structural type interner.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use vela_ast::{BaseId, SourceLocation, Type};

use crate::data::{ArraySize, TupleElement, TypeData, TypeKind};

#[cfg(test)]
mod tests;

struct PoolInner {
    /// Map from shape to index, for deduplication.
    map: FxHashMap<TypeData, BaseId>,
    /// Shape storage, indexed by `BaseId`.
    shapes: Vec<TypeData>,
}

/// Structural type interner with an owned lifetime.
///
/// Construction methods intern the shape and return a [`Type`] handle
/// carrying the requested mutability and location. Shapes are never
/// evicted; the pool lives as long as the compilation context that owns
/// it.
///
/// # Thread safety
/// The pool may be shared read-mostly between compilation contexts; an
/// internal `RwLock` serializes inserts.
pub struct TypePool {
    inner: RwLock<PoolInner>,
}

impl TypePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        TypePool {
            inner: RwLock::new(PoolInner {
                map: FxHashMap::default(),
                shapes: Vec::with_capacity(64),
            }),
        }
    }

    /// Intern a shape, returning the index of the cached instance.
    fn intern(&self, data: TypeData) -> BaseId {
        // Fast path: already interned.
        {
            let guard = self.inner.read();
            if let Some(&id) = guard.map.get(&data) {
                return id;
            }
        }

        let mut guard = self.inner.write();

        // Double-check after acquiring the write lock.
        if let Some(&id) = guard.map.get(&data) {
            return id;
        }

        let raw = u32::try_from(guard.shapes.len());
        let id = match raw {
            Ok(raw) => BaseId::from_raw(raw),
            Err(_) => panic!("type pool exceeded u32::MAX shapes"),
        };
        guard.shapes.push(data.clone());
        guard.map.insert(data, id);
        id
    }

    /// Look up the shape behind a handle.
    pub fn data(&self, ty: Type) -> TypeData {
        let guard = self.inner.read();
        guard.shapes[ty.base().index()].clone()
    }

    /// The kind of a handle's shape.
    pub fn kind(&self, ty: Type) -> TypeKind {
        let guard = self.inner.read();
        guard.shapes[ty.base().index()].kind()
    }

    /// Number of interned shapes.
    pub fn len(&self) -> usize {
        self.inner.read().shapes.len()
    }

    /// Whether no shape has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Construction -----------------------------------------------------

    /// A named type, optionally with generic arguments.
    pub fn basic(
        &self,
        name: impl Into<String>,
        generic_args: Vec<Type>,
        mutable: bool,
        location: SourceLocation,
    ) -> Type {
        let id = self.intern(TypeData::Basic {
            name: name.into(),
            generic_args,
        });
        Type::new(id, mutable, location)
    }

    /// An array type.
    pub fn array(
        &self,
        element: Type,
        size: ArraySize,
        mutable: bool,
        location: SourceLocation,
    ) -> Type {
        let id = self.intern(TypeData::Array { element, size });
        Type::new(id, mutable, location)
    }

    /// A tuple type.
    ///
    /// A single-element tuple is never materialized: it collapses to its
    /// sole element type at construction.
    pub fn tuple(
        &self,
        mut elements: Vec<TupleElement>,
        mutable: bool,
        location: SourceLocation,
    ) -> Type {
        if elements.len() == 1 {
            // Collapse to the element, as written.
            return match elements.pop() {
                Some(element) => element.ty,
                None => unreachable!(),
            };
        }
        let id = self.intern(TypeData::Tuple { elements });
        Type::new(id, mutable, location)
    }

    /// A function type.
    pub fn function(
        &self,
        return_type: Type,
        params: Vec<Type>,
        mutable: bool,
        location: SourceLocation,
    ) -> Type {
        let id = self.intern(TypeData::Function {
            return_type,
            params,
        });
        Type::new(id, mutable, location)
    }

    /// A pointer type.
    pub fn pointer(&self, pointee: Type, mutable: bool, location: SourceLocation) -> Type {
        let id = self.intern(TypeData::Pointer { pointee });
        Type::new(id, mutable, location)
    }

    /// An optional type (`T?`).
    pub fn optional(&self, wrapped: Type, mutable: bool, location: SourceLocation) -> Type {
        let id = self.intern(TypeData::Optional { wrapped });
        Type::new(id, mutable, location)
    }

    // --- Accessors --------------------------------------------------------
    //
    // Kind-specific accessors panic on a mismatched kind: dispatch sites
    // match exhaustively on `kind`/`data`, so a mismatch is a caller bug.

    /// The name of a basic type.
    pub fn name(&self, ty: Type) -> String {
        match self.data(ty) {
            TypeData::Basic { name, .. } => name,
            other => panic!("name() on {:?} type", other.kind()),
        }
    }

    /// The generic arguments of a basic type.
    pub fn generic_args(&self, ty: Type) -> Vec<Type> {
        match self.data(ty) {
            TypeData::Basic { generic_args, .. } => generic_args,
            other => panic!("generic_args() on {:?} type", other.kind()),
        }
    }

    /// The element type of an array, inheriting the array handle's
    /// mutability and location.
    pub fn element_type(&self, ty: Type) -> Type {
        match self.data(ty) {
            TypeData::Array { element, .. } => element
                .as_mutable(ty.is_mutable())
                .with_location(ty.location()),
            other => panic!("element_type() on {:?} type", other.kind()),
        }
    }

    /// The size of an array type.
    pub fn array_size(&self, ty: Type) -> ArraySize {
        match self.data(ty) {
            TypeData::Array { size, .. } => size,
            other => panic!("array_size() on {:?} type", other.kind()),
        }
    }

    /// The elements of a tuple type.
    pub fn tuple_elements(&self, ty: Type) -> Vec<TupleElement> {
        match self.data(ty) {
            TypeData::Tuple { elements } => elements,
            other => panic!("tuple_elements() on {:?} type", other.kind()),
        }
    }

    /// The return type of a function type.
    pub fn return_type(&self, ty: Type) -> Type {
        match self.data(ty) {
            TypeData::Function { return_type, .. } => return_type.with_location(ty.location()),
            other => panic!("return_type() on {:?} type", other.kind()),
        }
    }

    /// The parameter types of a function type.
    pub fn param_types(&self, ty: Type) -> Vec<Type> {
        match self.data(ty) {
            TypeData::Function { params, .. } => params,
            other => panic!("param_types() on {:?} type", other.kind()),
        }
    }

    /// The pointee of a pointer type.
    pub fn pointee(&self, ty: Type) -> Type {
        match self.data(ty) {
            TypeData::Pointer { pointee } => pointee.with_location(ty.location()),
            other => panic!("pointee() on {:?} type", other.kind()),
        }
    }

    /// The wrapped type of an optional type.
    pub fn wrapped_type(&self, ty: Type) -> Type {
        match self.data(ty) {
            TypeData::Optional { wrapped } => wrapped.with_location(ty.location()),
            other => panic!("wrapped_type() on {:?} type", other.kind()),
        }
    }

    /// The pointee if `ty` is a pointer, `ty` itself otherwise.
    pub fn remove_pointer(&self, ty: Type) -> Type {
        if self.is_pointer(ty) {
            self.pointee(ty)
        } else {
            ty
        }
    }

    // --- Kind predicates --------------------------------------------------

    pub fn is_basic(&self, ty: Type) -> bool {
        self.kind(ty) == TypeKind::Basic
    }

    pub fn is_array(&self, ty: Type) -> bool {
        self.kind(ty) == TypeKind::Array
    }

    pub fn is_tuple(&self, ty: Type) -> bool {
        self.kind(ty) == TypeKind::Tuple
    }

    pub fn is_function(&self, ty: Type) -> bool {
        self.kind(ty) == TypeKind::Function
    }

    pub fn is_pointer(&self, ty: Type) -> bool {
        self.kind(ty) == TypeKind::Pointer
    }

    pub fn is_optional(&self, ty: Type) -> bool {
        self.kind(ty) == TypeKind::Optional
    }

    pub fn is_array_with_constant_size(&self, ty: Type) -> bool {
        self.is_array(ty) && matches!(self.array_size(ty), ArraySize::Fixed(_))
    }

    pub fn is_array_with_runtime_size(&self, ty: Type) -> bool {
        self.is_array(ty) && self.array_size(ty) == ArraySize::Runtime
    }

    pub fn is_array_with_unknown_size(&self, ty: Type) -> bool {
        self.is_array(ty) && self.array_size(ty) == ArraySize::Unknown
    }

    /// Whether `ty` is a basic type with the given name.
    pub fn is_basic_named(&self, ty: Type, name: &str) -> bool {
        match self.data(ty) {
            TypeData::Basic {
                name: basic_name, ..
            } => basic_name == name,
            _ => false,
        }
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! builtin_types {
    ($(($ctor:ident, $pred:ident, $name:literal)),* $(,)?) => {
        impl TypePool {
            $(
                #[doc = concat!("The builtin `", $name, "` type.")]
                pub fn $ctor(&self) -> Type {
                    self.basic($name, Vec::new(), false, SourceLocation::DUMMY)
                }

                #[doc = concat!("Whether `ty` is the builtin `", $name, "` type.")]
                pub fn $pred(&self, ty: Type) -> bool {
                    self.is_basic_named(ty, $name)
                }
            )*
        }
    };
}

builtin_types! {
    (void, is_void, "void"),
    (bool, is_bool, "bool"),
    (int, is_int, "int"),
    (int8, is_int8, "int8"),
    (int16, is_int16, "int16"),
    (int32, is_int32, "int32"),
    (int64, is_int64, "int64"),
    (uint, is_uint, "uint"),
    (uint8, is_uint8, "uint8"),
    (uint16, is_uint16, "uint16"),
    (uint32, is_uint32, "uint32"),
    (uint64, is_uint64, "uint64"),
    (float, is_float, "float"),
    (float32, is_float32, "float32"),
    (float64, is_float64, "float64"),
    (float80, is_float80, "float80"),
    (char, is_char, "char"),
}
