//! Declaration nodes.

use std::cell::Cell;
use std::rc::Rc;

use crate::expr::Expr;
use crate::location::SourceLocation;
use crate::stmt::Stmt;
use crate::ty::Type;

/// A function parameter.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Type,
    pub location: SourceLocation,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: Type, location: SourceLocation) -> Self {
        ParamDecl {
            name: name.into(),
            ty,
            location,
        }
    }
}

/// A variable declaration, local or global.
///
/// `declared_ty` is `None` when the type is inferred from the initializer;
/// the checker records the final type in the `ty` slot either way. The
/// `moved` flag is shared (`Rc`) with pending destructor records in the IR
/// generator, which consult it at scope exit to skip cleanup of values
/// that have been moved out of.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: String,
    pub declared_ty: Option<Type>,
    pub mutable: bool,
    pub initializer: Expr,
    pub location: SourceLocation,
    ty: Cell<Option<Type>>,
    moved: Rc<Cell<bool>>,
}

impl VarDecl {
    pub fn new(
        name: impl Into<String>,
        declared_ty: Option<Type>,
        mutable: bool,
        initializer: Expr,
        location: SourceLocation,
    ) -> Self {
        VarDecl {
            name: name.into(),
            declared_ty,
            mutable,
            initializer,
            location,
            ty: Cell::new(None),
            moved: Rc::new(Cell::new(false)),
        }
    }

    /// The resolved type recorded by the type checker.
    ///
    /// # Panics
    /// Panics if the declaration has not been type-checked.
    pub fn ty(&self) -> Type {
        match self.ty.get() {
            Some(ty) => ty,
            None => panic!("variable declaration has not been type-checked"),
        }
    }

    /// The resolved type, if the checker has run over this declaration.
    pub fn try_ty(&self) -> Option<Type> {
        self.ty.get()
    }

    /// Record the resolved type. Idempotent.
    pub fn set_ty(&self, ty: Type) {
        self.ty.set(Some(ty));
    }

    /// Whether the declared value has been moved out of.
    pub fn has_been_moved(&self) -> bool {
        self.moved.get()
    }

    /// Mark the declared value as moved out of.
    pub fn mark_moved(&self) {
        self.moved.set(true);
    }

    /// Shared handle to the moved flag, observed by pending destructor
    /// records at scope exit.
    pub fn moved_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.moved)
    }
}

/// What a function declaration is attached to.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FunctionKind {
    /// A free function.
    Free,
    /// An instance method of the named type.
    Method { type_name: String },
    /// A constructor of the named type.
    Constructor { type_name: String },
    /// The destructor of the named type.
    Destructor { type_name: String },
}

impl FunctionKind {
    /// The owning type's name, for methods/constructors/destructors.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            FunctionKind::Free => None,
            FunctionKind::Method { type_name }
            | FunctionKind::Constructor { type_name }
            | FunctionKind::Destructor { type_name } => Some(type_name),
        }
    }

    /// Whether calls to this function take an implicit receiver argument.
    pub fn takes_receiver(&self) -> bool {
        !matches!(self, FunctionKind::Free)
    }
}

/// A function, method, constructor, or destructor declaration.
///
/// `body` is `None` for extern declarations, which are trusted as-is.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub return_types: Vec<Type>,
    pub body: Option<Vec<Stmt>>,
    pub is_extern: bool,
    pub kind: FunctionKind,
    pub location: SourceLocation,
}

/// A field of a struct or union.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub location: SourceLocation,
}

/// Struct or union.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TypeDeclKind {
    Struct,
    Union,
}

/// A struct or union declaration with its members.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    pub constructors: Vec<FunctionDecl>,
    pub destructor: Option<FunctionDecl>,
    pub location: SourceLocation,
}

impl TypeDecl {
    /// Positional index of a field, in declaration order.
    pub fn field_index(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| u32::try_from(i).ok())
    }
}

/// One case of an enum, with its tag value and optional associated types.
#[derive(Clone, Debug)]
pub struct EnumCase {
    pub name: String,
    pub tag: i64,
    pub associated_types: Vec<Type>,
    pub location: SourceLocation,
}

/// An enum declaration.
#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: String,
    pub cases: Vec<EnumCase>,
    pub location: SourceLocation,
}

impl EnumDecl {
    /// Look up a case by name.
    pub fn case(&self, name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Whether any case carries associated values.
    pub fn has_associated_values(&self) -> bool {
        self.cases.iter().any(|c| !c.associated_types.is_empty())
    }
}

/// A generic function template, instantiated on demand by IR generation.
///
/// Generic parameter names occur as placeholder `Basic` types inside the
/// template function's parameter and return types.
#[derive(Clone, Debug)]
pub struct FunctionTemplate {
    pub generic_params: Vec<String>,
    pub function: FunctionDecl,
}

/// Top-level declaration kinds.
#[derive(Clone, Debug)]
pub enum Decl {
    Function(FunctionDecl),
    Var(VarDecl),
    Type(TypeDecl),
    Enum(EnumDecl),
    FunctionTemplate(FunctionTemplate),
}

impl Decl {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Decl::Function(f) => &f.name,
            Decl::Var(v) => &v.name,
            Decl::Type(t) => &t.name,
            Decl::Enum(e) => &e.name,
            Decl::FunctionTemplate(t) => &t.function.name,
        }
    }
}

/// A source module: the compilation unit that owns the tree.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: String,
    pub source_file: String,
    pub decls: Vec<Decl>,
}

impl Module {
    pub fn new(name: impl Into<String>, source_file: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            source_file: source_file.into(),
            decls: Vec::new(),
        }
    }

    /// Base name of the source file, as used in assertion messages.
    pub fn source_file_basename(&self) -> &str {
        self.source_file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.source_file)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::expr::ExprKind;
    use crate::location::SourceLocation;

    #[test]
    fn source_file_basename_strips_directories() {
        assert_eq!(Module::new("m", "src/lib/main.vela").source_file_basename(), "main.vela");
        assert_eq!(Module::new("m", "main.vela").source_file_basename(), "main.vela");
        assert_eq!(Module::new("m", r"src\main.vela").source_file_basename(), "main.vela");
    }

    #[test]
    fn moved_flag_is_shared() {
        let initializer = Expr::new(ExprKind::IntLiteral(1), SourceLocation::DUMMY);
        let decl = VarDecl::new("x", None, false, initializer, SourceLocation::DUMMY);

        let flag = decl.moved_flag();
        assert!(!decl.has_been_moved());
        flag.set(true);
        assert!(decl.has_been_moved());
    }
}
