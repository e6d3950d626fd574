//! Type system for Vela.
//!
//! # Type interning
//!
//! Type shapes ([`TypeData`]) are structurally interned in an explicit
//! [`TypePool`]: constructing the same shape twice yields the same
//! [`vela_ast::BaseId`], so shape equality is an index comparison. The
//! mutability qualifier and source location are *not* part of the interned
//! shape; they live on the [`vela_ast::Type`] handle wrapping the cached
//! base, so the same shape can circulate as both mutable and non-mutable.
//!
//! The pool is an owned object scoped to one compilation context, never a
//! process-wide singleton; several compilations in one process each own
//! their pool, or share one read-mostly (inserts are serialized by the
//! internal lock).
//!
//! # Accessors
//!
//! All shape accessors hang off the pool (`pool.element_type(ty)`,
//! `pool.param_types(ty)`, …) since only the pool can look a handle's
//! shape back up.

mod classify;
mod data;
mod format;
mod pool;
mod resolve;

pub use data::{ArraySize, TupleElement, TypeData, TypeKind};
pub use format::TypeDisplay;
pub use pool::TypePool;

// The handle itself lives in the base crate so the tree can carry it.
pub use vela_ast::{BaseId, Type};
