//! Statement nodes.

use crate::decl::VarDecl;
use crate::expr::Expr;
use crate::location::SourceLocation;

/// Statement kinds.
#[derive(Clone, Debug)]
pub enum StmtKind {
    /// `return` with zero or more values; multiple values return a tuple.
    Return(Vec<Expr>),
    /// Local variable introduction.
    Var(VarDecl),
    Increment(Expr),
    Decrement(Expr),
    /// An expression evaluated for its side effects (typically a call).
    Expr(Expr),
    /// Evaluation deferred to scope exit, in reverse registration order.
    Defer(Expr),
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Assign {
        target: Expr,
        value: Expr,
    },
}

/// A statement node.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: SourceLocation) -> Self {
        Stmt { kind, location }
    }
}
