//! Canonical surface-syntax printing of types.
//!
//! Arrays render as `Elem[3]` (`?` for unknown size, empty brackets for
//! runtime size), tuples as `(name: type, ...)`, function types as
//! `(int, char) -> bool`, pointers and optionals append `*`/`?` to a
//! (parenthesized, if a function) inner type. A `mutable` keyword
//! precedes the base name or pointee unless top-level mutability is
//! omitted, as it is for function return types.

use std::fmt;

use vela_ast::Type;

use crate::data::{ArraySize, TypeData};
use crate::pool::TypePool;


/// Display adapter tying a handle to its pool.
pub struct TypeDisplay<'a> {
    pool: &'a TypePool,
    ty: Type,
    omit_top_level_mutable: bool,
}

impl TypePool {
    /// Display a type with top-level mutability omitted, the form used in
    /// diagnostics and for function return types.
    pub fn display(&self, ty: Type) -> TypeDisplay<'_> {
        TypeDisplay {
            pool: self,
            ty,
            omit_top_level_mutable: true,
        }
    }

    /// Display a type including its top-level `mutable` qualifier.
    pub fn display_qualified(&self, ty: Type) -> TypeDisplay<'_> {
        TypeDisplay {
            pool: self,
            ty,
            omit_top_level_mutable: false,
        }
    }
}

impl TypeDisplay<'_> {
    fn print(&self, f: &mut fmt::Formatter<'_>, ty: Type, omit_mutable: bool) -> fmt::Result {
        let pool = self.pool;
        match pool.data(ty) {
            TypeData::Basic { name, generic_args } => {
                if ty.is_mutable() && !omit_mutable {
                    f.write_str("mutable ")?;
                }
                f.write_str(&name)?;
                if !generic_args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in generic_args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        self.print(f, *arg, false)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeData::Array { size, .. } => {
                self.print(f, pool.element_type(ty), omit_mutable)?;
                f.write_str("[")?;
                match size {
                    ArraySize::Fixed(n) => write!(f, "{n}")?,
                    ArraySize::Runtime => {}
                    ArraySize::Unknown => f.write_str("?")?,
                }
                f.write_str("]")
            }
            TypeData::Tuple { elements } => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if !element.name.is_empty() {
                        write!(f, "{}: ", element.name)?;
                    }
                    self.print(f, element.ty, omit_mutable)?;
                }
                f.write_str(")")
            }
            TypeData::Function { params, .. } => {
                f.write_str("(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    self.print(f, *param, true)?;
                }
                f.write_str(") -> ")?;
                self.print(f, pool.return_type(ty), true)
            }
            TypeData::Pointer { .. } => {
                self.print_wrapping(f, ty, pool.pointee(ty), omit_mutable, '*')
            }
            TypeData::Optional { .. } => {
                self.print_wrapping(f, ty, pool.wrapped_type(ty), omit_mutable, '?')
            }
        }
    }

    /// Pointers and optionals share everything except the suffix.
    fn print_wrapping(
        &self,
        f: &mut fmt::Formatter<'_>,
        ty: Type,
        inner: Type,
        omit_mutable: bool,
        suffix: char,
    ) -> fmt::Result {
        let parenthesize = self.pool.is_function(inner);
        if parenthesize {
            f.write_str("(")?;
        }
        self.print(f, inner, false)?;
        if ty.is_mutable() && !omit_mutable {
            f.write_str(" mutable")?;
        }
        if parenthesize {
            f.write_str(")")?;
        }
        write!(f, "{suffix}")
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f, self.ty, self.omit_top_level_mutable)
    }
}
