//! Expression nodes.

use std::cell::Cell;

use crate::decl::ParamDecl;
use crate::location::SourceLocation;
use crate::stmt::Stmt;
use crate::ty::Type;

/// Prefix operators.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Binary operators, `&&`/`||` included.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Comparison operators produce `bool` regardless of operand type.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Surface spelling, used in IR dumps.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A named element of a tuple literal.
#[derive(Clone, Debug)]
pub struct TupleLiteralElement {
    pub name: String,
    pub value: Expr,
}

/// A call expression.
///
/// `callee` may name a free function, a function template, a type (a
/// constructor call), an enum case (when `receiver` names an enum), a
/// method of the receiver's type, or a function-typed local (an indirect
/// call).
#[derive(Clone, Debug)]
pub struct CallExpr {
    pub callee: String,
    pub receiver: Option<Box<Expr>>,
    pub args: Vec<Expr>,
    pub generic_args: Vec<Type>,
    /// Move-initialization: the single argument is stored into the
    /// receiver's storage instead of calling a constructor.
    pub is_move_init: bool,
}

/// A lambda expression, lowered to an ordinary function by IR generation.
#[derive(Clone, Debug)]
pub struct LambdaExpr {
    pub params: Vec<ParamDecl>,
    pub return_type: Type,
    pub body: Vec<Stmt>,
}

/// Expression kinds.
#[derive(Clone, Debug)]
pub enum ExprKind {
    Var(String),
    IntLiteral(i128),
    BoolLiteral(bool),
    StringLiteral(String),
    NullLiteral,
    ArrayLiteral(Vec<Expr>),
    TupleLiteral(Vec<TupleLiteralElement>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call(CallExpr),
    /// Field access, tuple element access, or enum case reference.
    Member {
        base: Box<Expr>,
        member: String,
    },
    /// If-expression: both arms produce a value, joined by a phi.
    If {
        condition: Box<Expr>,
        then_value: Box<Expr>,
        else_value: Box<Expr>,
    },
    Lambda(LambdaExpr),
}

/// An expression node.
///
/// The checker records the resolved type in the `ty` slot; IR generation
/// reads it back and treats a missing annotation as an internal invariant
/// violation.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: SourceLocation,
    ty: Cell<Option<Type>>,
}

impl Expr {
    /// Create an unannotated expression node.
    pub fn new(kind: ExprKind, location: SourceLocation) -> Self {
        Expr {
            kind,
            location,
            ty: Cell::new(None),
        }
    }

    /// The resolved type recorded by the type checker.
    ///
    /// # Panics
    /// Panics if the node has not been type-checked; IR generation relies
    /// on checked input, so a missing type is a checker bug.
    pub fn ty(&self) -> Type {
        match self.ty.get() {
            Some(ty) => ty,
            None => panic!("expression has not been type-checked"),
        }
    }

    /// The resolved type, if the checker has run over this node.
    pub fn try_ty(&self) -> Option<Type> {
        self.ty.get()
    }

    /// Record the resolved type. Idempotent.
    pub fn set_ty(&self, ty: Type) {
        self.ty.set(Some(ty));
    }
}
