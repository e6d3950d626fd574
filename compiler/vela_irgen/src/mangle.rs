//! Function name mangling.
//!
//! Member functions carry their owning type (`Point.init`,
//! `Point.deinit`, `Point.norm`); generic instantiations append their
//! type arguments in surface syntax (`identity<int>`).

use vela_ast::{FunctionDecl, FunctionKind, Type};
use vela_types::TypePool;

/// The emitted name of a function declaration.
pub(crate) fn function_name(decl: &FunctionDecl) -> String {
    match &decl.kind {
        FunctionKind::Free => decl.name.clone(),
        FunctionKind::Method { type_name } => format!("{type_name}.{}", decl.name),
        FunctionKind::Constructor { type_name } => format!("{type_name}.init"),
        FunctionKind::Destructor { type_name } => format!("{type_name}.deinit"),
    }
}

/// The emitted name of a template instantiation.
pub(crate) fn instantiation_name(name: &str, pool: &TypePool, generic_args: &[Type]) -> String {
    let mut mangled = String::from(name);
    mangled.push('<');
    for (i, arg) in generic_args.iter().enumerate() {
        if i > 0 {
            mangled.push_str(", ");
        }
        mangled.push_str(&pool.display(*arg).to_string());
    }
    mangled.push('>');
    mangled
}
