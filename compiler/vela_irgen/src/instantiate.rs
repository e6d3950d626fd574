//! Template instantiation: clone a function with every contained and
//! annotated type substituted.
//!
//! The template body was checked against its placeholder types, so every
//! expression node carries an annotation; the clone rewrites those
//! annotations through `resolve` so the instantiated body is as checked
//! as a hand-written one.

use rustc_hash::FxHashMap;
use vela_ast::{
    CallExpr, Expr, ExprKind, FunctionDecl, FunctionTemplate, LambdaExpr, ParamDecl, Stmt,
    StmtKind, TupleLiteralElement, Type, VarDecl,
};
use vela_types::TypePool;

type Replacements = FxHashMap<String, Type>;

/// Instantiate a template for the given type arguments under the given
/// emitted name.
pub(crate) fn instantiate_function(
    pool: &TypePool,
    template: &FunctionTemplate,
    generic_args: &[Type],
    name: String,
) -> FunctionDecl {
    assert_eq!(
        template.generic_params.len(),
        generic_args.len(),
        "instantiation arity checked before IR generation"
    );
    let replacements: Replacements = template
        .generic_params
        .iter()
        .cloned()
        .zip(generic_args.iter().copied())
        .collect();

    let function = &template.function;
    FunctionDecl {
        name,
        params: function
            .params
            .iter()
            .map(|param| ParamDecl {
                name: param.name.clone(),
                ty: pool.resolve(param.ty, &replacements),
                location: param.location,
            })
            .collect(),
        return_types: function
            .return_types
            .iter()
            .map(|ty| pool.resolve(*ty, &replacements))
            .collect(),
        body: function
            .body
            .as_ref()
            .map(|body| body.iter().map(|stmt| resolve_stmt(pool, stmt, &replacements)).collect()),
        is_extern: function.is_extern,
        kind: function.kind.clone(),
        location: function.location,
    }
}

fn resolve_stmt(pool: &TypePool, stmt: &Stmt, replacements: &Replacements) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::Return(values) => StmtKind::Return(
            values
                .iter()
                .map(|value| resolve_expr(pool, value, replacements))
                .collect(),
        ),
        StmtKind::Var(decl) => StmtKind::Var(resolve_var_decl(pool, decl, replacements)),
        StmtKind::Increment(operand) => {
            StmtKind::Increment(resolve_expr(pool, operand, replacements))
        }
        StmtKind::Decrement(operand) => {
            StmtKind::Decrement(resolve_expr(pool, operand, replacements))
        }
        StmtKind::Expr(expr) => StmtKind::Expr(resolve_expr(pool, expr, replacements)),
        StmtKind::Defer(expr) => StmtKind::Defer(resolve_expr(pool, expr, replacements)),
        StmtKind::If {
            condition,
            then_body,
            else_body,
        } => StmtKind::If {
            condition: resolve_expr(pool, condition, replacements),
            then_body: resolve_stmts(pool, then_body, replacements),
            else_body: resolve_stmts(pool, else_body, replacements),
        },
        StmtKind::While { condition, body } => StmtKind::While {
            condition: resolve_expr(pool, condition, replacements),
            body: resolve_stmts(pool, body, replacements),
        },
        StmtKind::Break => StmtKind::Break,
        StmtKind::Continue => StmtKind::Continue,
        StmtKind::Assign { target, value } => StmtKind::Assign {
            target: resolve_expr(pool, target, replacements),
            value: resolve_expr(pool, value, replacements),
        },
    };
    Stmt::new(kind, stmt.location)
}

fn resolve_stmts(pool: &TypePool, stmts: &[Stmt], replacements: &Replacements) -> Vec<Stmt> {
    stmts
        .iter()
        .map(|stmt| resolve_stmt(pool, stmt, replacements))
        .collect()
}

fn resolve_var_decl(pool: &TypePool, decl: &VarDecl, replacements: &Replacements) -> VarDecl {
    // A fresh declaration, fresh moved flag included.
    let resolved = VarDecl::new(
        decl.name.clone(),
        decl.declared_ty.map(|ty| pool.resolve(ty, replacements)),
        decl.mutable,
        resolve_expr(pool, &decl.initializer, replacements),
        decl.location,
    );
    if let Some(ty) = decl.try_ty() {
        resolved.set_ty(pool.resolve(ty, replacements));
    }
    resolved
}

fn resolve_exprs(pool: &TypePool, exprs: &[Expr], replacements: &Replacements) -> Vec<Expr> {
    exprs
        .iter()
        .map(|expr| resolve_expr(pool, expr, replacements))
        .collect()
}

fn resolve_expr(pool: &TypePool, expr: &Expr, replacements: &Replacements) -> Expr {
    let kind = match &expr.kind {
        ExprKind::Var(name) => ExprKind::Var(name.clone()),
        ExprKind::IntLiteral(value) => ExprKind::IntLiteral(*value),
        ExprKind::BoolLiteral(value) => ExprKind::BoolLiteral(*value),
        ExprKind::StringLiteral(value) => ExprKind::StringLiteral(value.clone()),
        ExprKind::NullLiteral => ExprKind::NullLiteral,
        ExprKind::ArrayLiteral(elements) => {
            ExprKind::ArrayLiteral(resolve_exprs(pool, elements, replacements))
        }
        ExprKind::TupleLiteral(elements) => ExprKind::TupleLiteral(
            elements
                .iter()
                .map(|element| TupleLiteralElement {
                    name: element.name.clone(),
                    value: resolve_expr(pool, &element.value, replacements),
                })
                .collect(),
        ),
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op: *op,
            operand: Box::new(resolve_expr(pool, operand, replacements)),
        },
        ExprKind::Binary { op, lhs, rhs } => ExprKind::Binary {
            op: *op,
            lhs: Box::new(resolve_expr(pool, lhs, replacements)),
            rhs: Box::new(resolve_expr(pool, rhs, replacements)),
        },
        ExprKind::Call(call) => ExprKind::Call(CallExpr {
            callee: call.callee.clone(),
            receiver: call
                .receiver
                .as_ref()
                .map(|receiver| Box::new(resolve_expr(pool, receiver, replacements))),
            args: resolve_exprs(pool, &call.args, replacements),
            generic_args: call
                .generic_args
                .iter()
                .map(|ty| pool.resolve(*ty, replacements))
                .collect(),
            is_move_init: call.is_move_init,
        }),
        ExprKind::Member { base, member } => ExprKind::Member {
            base: Box::new(resolve_expr(pool, base, replacements)),
            member: member.clone(),
        },
        ExprKind::If {
            condition,
            then_value,
            else_value,
        } => ExprKind::If {
            condition: Box::new(resolve_expr(pool, condition, replacements)),
            then_value: Box::new(resolve_expr(pool, then_value, replacements)),
            else_value: Box::new(resolve_expr(pool, else_value, replacements)),
        },
        ExprKind::Lambda(lambda) => ExprKind::Lambda(LambdaExpr {
            params: lambda
                .params
                .iter()
                .map(|param| ParamDecl {
                    name: param.name.clone(),
                    ty: pool.resolve(param.ty, replacements),
                    location: param.location,
                })
                .collect(),
            return_type: pool.resolve(lambda.return_type, replacements),
            body: resolve_stmts(pool, &lambda.body, replacements),
        }),
    };

    let resolved = Expr::new(kind, expr.location);
    if let Some(ty) = expr.try_ty() {
        resolved.set_ty(pool.resolve(ty, replacements));
    }
    resolved
}
