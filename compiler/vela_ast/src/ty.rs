//! The `Type` handle.
//!
//! A type is a small `Copy` value wrapping an interned base shape
//! ([`BaseId`], an index into the `TypePool` in `vela_types`) together
//! with a mutability qualifier and an optional source location. The same
//! cached base shape can be wrapped as mutable and non-mutable; only the
//! shape is interned.
//!
//! Equality and hashing compare the base shape and mutability. The
//! location is carried for diagnostics only and never participates.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::location::SourceLocation;

/// Index of an interned type shape in the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BaseId(u32);

impl BaseId {
    /// Create from a raw pool index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        BaseId(raw)
    }

    /// The raw pool index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A handle to an interned type shape, qualified with mutability.
///
/// Two structurally equal shapes constructed with equal mutability compare
/// equal and share the same [`BaseId`]; base-id equality implies structural
/// equality of the shape.
#[derive(Copy, Clone)]
pub struct Type {
    base: BaseId,
    mutable: bool,
    location: SourceLocation,
}

impl Type {
    /// Wrap an interned base shape. Called by the pool's constructors.
    #[inline]
    pub const fn new(base: BaseId, mutable: bool, location: SourceLocation) -> Self {
        Type {
            base,
            mutable,
            location,
        }
    }

    /// The interned base shape this handle refers to.
    #[inline]
    pub const fn base(self) -> BaseId {
        self.base
    }

    /// Whether the value this type describes may be mutated.
    #[inline]
    pub const fn is_mutable(self) -> bool {
        self.mutable
    }

    /// The source location this occurrence was written at, if any.
    #[inline]
    pub const fn location(self) -> SourceLocation {
        self.location
    }

    /// The same shape with the given outer mutability.
    ///
    /// Flips only the outer flag; use `TypePool::set_mutable` for the
    /// structural propagation that arrays and tuples require.
    #[inline]
    #[must_use]
    pub const fn as_mutable(self, mutable: bool) -> Self {
        Type { mutable, ..self }
    }

    /// The same type carrying a different source location.
    #[inline]
    #[must_use]
    pub const fn with_location(self, location: SourceLocation) -> Self {
        Type { location, ..self }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.mutable == other.mutable
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.hash(state);
        self.mutable.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mutable {
            write!(f, "Type(mutable #{})", self.base.0)
        } else {
            write!(f, "Type(#{})", self.base.0)
        }
    }
}
