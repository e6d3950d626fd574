//! Declaration tree and source locations for the Vela compiler.
//!
//! This crate is the shared base of the pipeline: it defines source
//! locations, the [`Type`] handle (the structural data behind a handle
//! lives in `vela_types`), and the declaration/statement/expression tree
//! that the parser produces, the type checker annotates in place, and the
//! IR generator consumes.
//!
//! # Ownership
//!
//! The tree is built once and owned by the compilation unit ([`Module`]).
//! Later passes only borrow it; type annotations are written through
//! `Cell` slots so the checker can record a resolved type on a node
//! exactly once without requiring `&mut` access during IR generation.

mod decl;
mod expr;
mod location;
mod stmt;
mod ty;

pub use decl::{
    Decl, EnumCase, EnumDecl, FieldDecl, FunctionDecl, FunctionKind, FunctionTemplate, Module,
    ParamDecl, TypeDecl, TypeDeclKind, VarDecl,
};
pub use expr::{BinaryOp, CallExpr, Expr, ExprKind, LambdaExpr, TupleLiteralElement, UnaryOp};
pub use location::SourceLocation;
pub use stmt::{Stmt, StmtKind};
pub use ty::{BaseId, Type};
