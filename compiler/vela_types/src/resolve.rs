//! Generic-parameter substitution and mutability propagation.

use rustc_hash::FxHashMap;
use vela_ast::Type;

use crate::data::{TupleElement, TypeData};
use crate::pool::TypePool;

#[cfg(test)]
mod tests;

impl TypePool {
    /// Substitute placeholder names, rebuilding through the interning
    /// constructors.
    ///
    /// A basic type whose name matches a replacement key becomes the
    /// replacement, re-qualified with the *occurrence's* mutability and
    /// location. All other shapes recurse into their contained types.
    /// With no matching placeholder anywhere this is a no-op (an equal
    /// type comes back).
    pub fn resolve(&self, ty: Type, replacements: &FxHashMap<String, Type>) -> Type {
        match self.data(ty) {
            TypeData::Basic { name, generic_args } => {
                if let Some(&replacement) = replacements.get(&name) {
                    return replacement
                        .as_mutable(ty.is_mutable())
                        .with_location(ty.location());
                }
                let generic_args = generic_args
                    .into_iter()
                    .map(|arg| self.resolve(arg, replacements))
                    .collect();
                self.basic(name, generic_args, ty.is_mutable(), ty.location())
            }
            TypeData::Array { element, size } => self.array(
                self.resolve(element, replacements),
                size,
                ty.is_mutable(),
                ty.location(),
            ),
            TypeData::Tuple { elements } => {
                let elements = elements
                    .into_iter()
                    .map(|element| TupleElement {
                        name: element.name,
                        ty: self.resolve(element.ty, replacements),
                    })
                    .collect();
                self.tuple(elements, ty.is_mutable(), ty.location())
            }
            TypeData::Function {
                return_type,
                params,
            } => {
                let params = params
                    .into_iter()
                    .map(|param| self.resolve(param, replacements))
                    .collect();
                self.function(
                    self.resolve(return_type, replacements),
                    params,
                    ty.is_mutable(),
                    ty.location(),
                )
            }
            TypeData::Pointer { pointee } => self.pointer(
                self.resolve(pointee, replacements),
                ty.is_mutable(),
                ty.location(),
            ),
            TypeData::Optional { wrapped } => self.optional(
                self.resolve(wrapped, replacements),
                ty.is_mutable(),
                ty.location(),
            ),
        }
    }

    /// Erase mutability everywhere in a type, rebuilding through the
    /// interning constructors.
    ///
    /// IR generation compares types in this form: storage and calling
    /// decisions depend on shape alone, the way a backend's type system
    /// has no mutability.
    pub fn strip_mutable(&self, ty: Type) -> Type {
        match self.data(ty) {
            TypeData::Basic { name, generic_args } => {
                let generic_args = generic_args
                    .into_iter()
                    .map(|arg| self.strip_mutable(arg))
                    .collect();
                self.basic(name, generic_args, false, ty.location())
            }
            TypeData::Array { element, size } => {
                self.array(self.strip_mutable(element), size, false, ty.location())
            }
            TypeData::Tuple { elements } => {
                let elements = elements
                    .into_iter()
                    .map(|element| TupleElement {
                        name: element.name,
                        ty: self.strip_mutable(element.ty),
                    })
                    .collect();
                self.tuple(elements, false, ty.location())
            }
            TypeData::Function {
                return_type,
                params,
            } => {
                let params = params
                    .into_iter()
                    .map(|param| self.strip_mutable(param))
                    .collect();
                self.function(self.strip_mutable(return_type), params, false, ty.location())
            }
            TypeData::Pointer { pointee } => {
                self.pointer(self.strip_mutable(pointee), false, ty.location())
            }
            TypeData::Optional { wrapped } => {
                self.optional(self.strip_mutable(wrapped), false, ty.location())
            }
        }
    }

    /// Set the mutability of a type.
    ///
    /// Arrays and tuples propagate the flag onto each contained element
    /// type's copy as well as the outer handle; every other kind flips
    /// only the outer flag.
    pub fn set_mutable(&self, ty: Type, mutable: bool) -> Type {
        match self.data(ty) {
            TypeData::Array { element, size } => self.array(
                element.as_mutable(mutable),
                size,
                mutable,
                ty.location(),
            ),
            TypeData::Tuple { elements } => {
                let elements = elements
                    .into_iter()
                    .map(|element| TupleElement {
                        name: element.name,
                        ty: element.ty.as_mutable(mutable),
                    })
                    .collect();
                self.tuple(elements, mutable, ty.location())
            }
            _ => ty.as_mutable(mutable),
        }
    }
}
