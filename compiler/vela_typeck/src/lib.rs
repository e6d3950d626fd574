//! Type checker for the Vela compiler.
//!
//! Assigns exactly one type to every expression, validates every
//! statement and declaration, and records the resolved type on the tree
//! node in place. The judgments are mutually recursive functions keyed on
//! node kind; the first error observed aborts the whole pass and is
//! propagated to the caller as a [`CheckError`]; checking never attempts
//! recovery and never exits the process.
//!
//! # Main entry points
//!
//! - [`TypeChecker`]: the checker state (pool reference, symbol table,
//!   ambient expected return type), one instance per compilation context
//! - [`TypeChecker::check_module`]: check a whole module
//!
//! # Module organization
//!
//! - `symbol_table`: scoped name → symbol mapping
//! - `checker`: the judgments
//! - `error`: the error taxonomy

mod checker;
mod error;
mod symbol_table;

pub use checker::TypeChecker;
pub use error::CheckError;
pub use symbol_table::{EnumInfo, FunctionSig, Symbol, SymbolTable, TypeInfo};
