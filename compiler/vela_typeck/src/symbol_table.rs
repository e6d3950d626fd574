//! Scoped symbol table.
//!
//! A genuine stack of scopes: lookup walks innermost to outermost, and a
//! redefinition is only an error within the current scope; inner
//! bindings shadow outer ones. Function bodies push a scope seeded with
//! parameter bindings; block statements push child scopes whose bindings
//! are discarded on exit. The global scope persists for the whole
//! compilation.
//!
//! Symbols are owned records synthesized from declarations, so the table
//! never holds references into the tree.

use std::cell::Cell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use vela_ast::{FunctionDecl, SourceLocation, Type, TypeDeclKind};
use vela_types::TypePool;

use crate::error::CheckError;


/// The callable surface of a function declaration.
#[derive(Clone, Debug)]
pub struct FunctionSig {
    pub name: String,
    pub param_types: Vec<Type>,
    pub return_types: Vec<Type>,
    pub is_extern: bool,
}

impl FunctionSig {
    /// Extract the signature of a declaration. Receiver parameters are
    /// implicit and not part of the signature.
    pub fn of(decl: &FunctionDecl) -> Self {
        FunctionSig {
            name: decl.name.clone(),
            param_types: decl.params.iter().map(|p| p.ty).collect(),
            return_types: decl.return_types.clone(),
            is_extern: decl.is_extern,
        }
    }

    /// The combined return type: `void` for none, the type itself for
    /// one, a tuple of all declared return types otherwise.
    pub fn combined_return_type(&self, pool: &TypePool) -> Type {
        combined_return_type(pool, &self.return_types)
    }

    /// The function's type as referenced by an identifier expression.
    pub fn function_type(&self, pool: &TypePool) -> Type {
        pool.function(
            self.combined_return_type(pool),
            self.param_types.clone(),
            false,
            SourceLocation::DUMMY,
        )
    }
}

/// Combine declared return types into a single type.
pub(crate) fn combined_return_type(pool: &TypePool, return_types: &[Type]) -> Type {
    match return_types {
        [] => pool.void(),
        [single] => *single,
        multiple => pool.tuple(
            multiple
                .iter()
                .map(|ty| vela_types::TupleElement::unnamed(*ty))
                .collect(),
            false,
            SourceLocation::DUMMY,
        ),
    }
}

/// What the checker knows about a struct or union declaration.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeDeclKind,
    /// Fields in declaration order.
    pub fields: Vec<(String, Type)>,
    pub methods: Vec<FunctionSig>,
    pub constructors: Vec<FunctionSig>,
    pub has_destructor: bool,
}

impl TypeInfo {
    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&FunctionSig> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Look up a field's type by name.
    pub fn field(&self, name: &str) -> Option<Type> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|&(_, ty)| ty)
    }
}

/// What the checker knows about an enum declaration.
#[derive(Clone, Debug)]
pub struct EnumInfo {
    pub name: String,
    /// Case name → associated value types, in declaration order.
    pub cases: Vec<(String, Vec<Type>)>,
}

impl EnumInfo {
    /// The associated value types of a case, if the case exists.
    pub fn case(&self, name: &str) -> Option<&[Type]> {
        self.cases
            .iter()
            .find(|(case_name, _)| case_name == name)
            .map(|(_, types)| types.as_slice())
    }
}

/// A resolved symbol: an owned record, not a reference into the tree.
#[derive(Clone, Debug)]
pub enum Symbol {
    Variable {
        ty: Type,
        /// Shared with the declaration's moved flag so move
        /// initialization can mark the origin.
        moved: Rc<Cell<bool>>,
    },
    Parameter {
        ty: Type,
    },
    Function(FunctionSig),
    Template {
        generic_params: Vec<String>,
        sig: FunctionSig,
    },
    Type(TypeInfo),
    Enum(EnumInfo),
}

/// The scoped name → symbol mapping shared by type checking and IR
/// generation.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, Symbol>>,
}

impl SymbolTable {
    /// A table holding only the persistent global scope.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Enter a child scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leave the current scope, discarding its bindings.
    ///
    /// # Panics
    /// Panics when called on the global scope.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Number of live scopes, the global scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether `name` is already bound in the *current* scope.
    pub fn defined_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }

    /// Bind `name` in the current scope.
    ///
    /// Fails with `Redefinition` on a clash within the current scope;
    /// shadowing an outer binding is permitted.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        symbol: Symbol,
        location: SourceLocation,
    ) -> Result<(), CheckError> {
        let name = name.into();
        if self.defined_in_current_scope(&name) {
            return Err(CheckError::Redefinition { name, location });
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, symbol);
        }
        Ok(())
    }

    /// Look up `name`, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Names bound in the global scope, for inspection in tests.
    pub fn global_names(&self) -> Vec<&str> {
        self.scopes
            .first()
            .map(|scope| scope.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
