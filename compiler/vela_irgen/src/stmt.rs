//! Statement emission.

use vela_ast::{Expr, ExprKind, Stmt, StmtKind, VarDecl};
use vela_ir::Inst;

use crate::generator::IrGenerator;

impl IrGenerator<'_> {
    /// Emit a statement list, stopping after a terminator (statements
    /// after a `return`/`break`/`continue` are unreachable).
    pub(crate) fn emit_block_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.emit_stmt(stmt);
            if self.current_block_terminated() {
                break;
            }
        }
    }

    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Return(values) => self.emit_return_stmt(values),
            StmtKind::Var(decl) => self.emit_local_var_decl(decl),
            StmtKind::Increment(operand) => self.emit_constant_increment(operand, 1),
            StmtKind::Decrement(operand) => self.emit_constant_increment(operand, -1),
            StmtKind::Expr(expr) => self.emit_expr_discard(expr),
            StmtKind::Defer(expr) => self.defer_evaluation_of(expr),
            StmtKind::If {
                condition,
                then_body,
                else_body,
            } => self.emit_if_stmt(condition, then_body, else_body),
            StmtKind::While { condition, body } => self.emit_while_stmt(condition, body),
            StmtKind::Break => self.emit_break_stmt(),
            StmtKind::Continue => self.emit_continue_stmt(),
            StmtKind::Assign { target, value } => self.emit_assign_stmt(target, value),
        }
    }

    /// Return values are evaluated first; then every live scope unwinds,
    /// innermost first, before the terminator.
    fn emit_return_stmt(&mut self, values: &[Expr]) {
        let mut emitted = Vec::with_capacity(values.len());
        for value in values {
            emitted.push(self.emit_expr_value(value));
        }
        self.emit_cleanup_for_return();
        let void = self.pool.void();
        self.push_inst(Inst::Return { values: emitted }, void, "");
    }

    fn emit_local_var_decl(&mut self, decl: &VarDecl) {
        let alloca = self.create_entry_block_alloca(decl.ty(), &decl.name);

        // Constructor-call initializers build directly into the
        // variable's slot.
        if let ExprKind::Call(call) = &decl.initializer.kind {
            if call.receiver.is_none() && self.type_decls.contains_key(&call.callee) {
                self.emit_call_expr(&decl.initializer, call, Some(alloca));
                self.set_local_value(&decl.name, alloca, Some(decl));
                return;
            }
        }

        let value = self.emit_expr_value(&decl.initializer);
        self.create_store(value, alloca);
        self.set_local_value(&decl.name, alloca, Some(decl));
    }

    /// Increment/decrement: load, add the constant, store back.
    fn emit_constant_increment(&mut self, operand: &Expr, increment: i64) {
        let ptr = self.emit_lvalue_expr_required(operand);
        let value = self.create_load(ptr);
        let ty = self.value_ty(value);
        let constant = self.const_int(ty, increment);
        let result = self.push_inst(
            Inst::Binary {
                op: vela_ast::BinaryOp::Add,
                lhs: value,
                rhs: constant,
            },
            ty,
            "",
        );
        self.create_store(result, ptr);
    }

    fn defer_evaluation_of(&mut self, expr: &Expr) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.deferred_exprs.push(expr.clone());
        }
    }

    fn emit_if_stmt(&mut self, condition: &Expr, then_body: &[Stmt], else_body: &[Stmt]) {
        let condition = self.emit_expr_value(condition);
        let then_block = self.create_attached_block("if.then");
        let else_block = self.create_detached_block("if.else");
        let end_block = self.create_detached_block("if.end");
        self.create_cond_br(condition, then_block, else_block);

        self.set_insert_point(then_block);
        self.begin_scope();
        self.emit_block_stmts(then_body);
        self.end_scope();
        if !self.current_block_terminated() {
            self.create_br(end_block);
        }

        self.attach_block(else_block);
        self.set_insert_point(else_block);
        self.begin_scope();
        self.emit_block_stmts(else_body);
        self.end_scope();
        if !self.current_block_terminated() {
            self.create_br(end_block);
        }

        self.attach_block(end_block);
        self.set_insert_point(end_block);
    }

    fn emit_while_stmt(&mut self, condition: &Expr, body: &[Stmt]) {
        let condition_block = self.create_attached_block("while.cond");
        self.create_br(condition_block);
        self.set_insert_point(condition_block);
        let condition = self.emit_expr_value(condition);

        let body_block = self.create_detached_block("while.body");
        let end_block = self.create_detached_block("while.end");
        self.create_cond_br(condition, body_block, end_block);

        self.attach_block(body_block);
        self.set_insert_point(body_block);
        let outer_depth = self.scopes.len();
        self.break_targets.push((end_block, outer_depth));
        self.continue_targets.push((condition_block, outer_depth));
        self.begin_scope();
        self.emit_block_stmts(body);
        self.end_scope();
        self.break_targets.pop();
        self.continue_targets.pop();
        if !self.current_block_terminated() {
            self.create_br(condition_block);
        }

        self.attach_block(end_block);
        self.set_insert_point(end_block);
    }

    /// Break unwinds every scope inside the loop body before branching.
    fn emit_break_stmt(&mut self) {
        let Some(&(target, depth)) = self.break_targets.last() else {
            panic!("'break' outside a loop reached IR generation");
        };
        for index in (depth..self.scopes.len()).rev() {
            self.run_scope_cleanup(index);
        }
        self.create_br(target);
    }

    fn emit_continue_stmt(&mut self) {
        let Some(&(target, depth)) = self.continue_targets.last() else {
            panic!("'continue' outside a loop reached IR generation");
        };
        for index in (depth..self.scopes.len()).rev() {
            self.run_scope_cleanup(index);
        }
        self.create_br(target);
    }

    fn emit_assign_stmt(&mut self, target: &Expr, value: &Expr) {
        let lhs = self.emit_assignment_lhs(target);
        let target_pointee = self.pool.pointee(self.value_ty(lhs));
        let rhs = self.emit_expr_for_passing(value, Some(target_pointee));
        self.create_store(rhs, lhs);
    }

    /// The assignment target's address, destroying the overwritten value
    /// first. Fields assigned inside their own type's constructor are
    /// being initialized, not overwritten, and keep their value.
    fn emit_assignment_lhs(&mut self, target: &Expr) -> vela_ir::ValueId {
        let value = self.emit_lvalue_expr_required(target);

        if let vela_ast::FunctionKind::Constructor { type_name } = &self.current_kind {
            if let ExprKind::Member { base, .. } = &target.kind {
                let base_ty = self.pool.remove_pointer(base.ty());
                if self.pool.is_basic(base_ty) && self.pool.name(base_ty) == *type_name {
                    return value;
                }
            }
        }

        let target_ty = self.pool.remove_pointer(target.ty());
        if self.declared_destructor_exists(target_ty) {
            let name = self.pool.name(target_ty);
            if let Some(type_decl) = self.type_decls.get(&name).cloned() {
                if let Some(destructor) = &type_decl.destructor {
                    let decl = std::rc::Rc::new(destructor.clone());
                    let proto = self.function_proto(&decl);
                    self.create_destructor_call(proto, value);
                }
            }
        }

        value
    }
}
