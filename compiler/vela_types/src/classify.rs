//! Scalar family classification.
//!
//! Signedness and floating-point-ness are decided purely by name, not by
//! a separate tag. Non-basic types belong to no scalar family.

use vela_ast::Type;

use crate::data::TypeData;
use crate::pool::TypePool;

const SIGNED_NAMES: [&str; 5] = ["int", "int8", "int16", "int32", "int64"];
const UNSIGNED_NAMES: [&str; 5] = ["uint", "uint8", "uint16", "uint32", "uint64"];
const FLOAT_NAMES: [&str; 4] = ["float", "float32", "float64", "float80"];

impl TypePool {
    /// Whether `name` names a builtin scalar type.
    pub fn is_builtin_scalar(name: &str) -> bool {
        SIGNED_NAMES.contains(&name)
            || UNSIGNED_NAMES.contains(&name)
            || FLOAT_NAMES.contains(&name)
            || name == "bool"
            || name == "char"
    }

    /// Whether `ty` is a signed integer type.
    pub fn is_signed(&self, ty: Type) -> bool {
        match self.data(ty) {
            TypeData::Basic { name, .. } => SIGNED_NAMES.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Whether `ty` is an unsigned integer type.
    pub fn is_unsigned(&self, ty: Type) -> bool {
        match self.data(ty) {
            TypeData::Basic { name, .. } => UNSIGNED_NAMES.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Whether `ty` is an integer type of either signedness.
    pub fn is_integer(&self, ty: Type) -> bool {
        self.is_signed(ty) || self.is_unsigned(ty)
    }

    /// Whether `ty` is a floating-point type.
    pub fn is_floating_point(&self, ty: Type) -> bool {
        match self.data(ty) {
            TypeData::Basic { name, .. } => FLOAT_NAMES.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Whether a value of type `from` is implicitly convertible to `to`.
    ///
    /// Equal types always convert; beyond that, the default-width scalars
    /// convert to the explicit widths of their own family. The checker's
    /// judgments require exact equality, so this is classification API
    /// for callers that want to widen.
    pub fn is_implicitly_convertible_to(&self, from: Type, to: Type) -> bool {
        if from == to {
            return true;
        }
        if self.is_basic_named(from, "int") {
            return self.is_signed(to);
        }
        if self.is_basic_named(from, "uint") {
            return self.is_unsigned(to);
        }
        if self.is_basic_named(from, "float") {
            return self.is_floating_point(to);
        }
        false
    }
}
