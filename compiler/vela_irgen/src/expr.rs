//! Expression emission.
//!
//! Two modes per addressable expression: value mode ([`emit_expr`]) loads
//! through pointer indirection down to the expression's nominal type;
//! address mode ([`emit_lvalue_expr`]) stops at the address and never
//! loads. Callers pick the mode their context needs: the left side of an
//! assignment uses address mode, call arguments use value mode unless the
//! parameter expects a pointer.
//!
//! [`emit_expr`]: IrGenerator::emit_expr
//! [`emit_lvalue_expr`]: IrGenerator::emit_lvalue_expr

use std::rc::Rc;

use vela_ast::{
    CallExpr, EnumCase, EnumDecl, Expr, ExprKind, FunctionDecl, FunctionKind, LambdaExpr,
    SourceLocation, Type, UnaryOp,
};
use vela_ir::{FunctionId, Inst, ValueId};

use crate::generator::IrGenerator;
use crate::{instantiate, mangle};

/// A resolved callee: a known function, or a function-typed value.
enum Callee {
    Direct {
        decl: Rc<FunctionDecl>,
        function: FunctionId,
    },
    Indirect(ValueId),
}

impl IrGenerator<'_> {
    // --- Modes ------------------------------------------------------------

    /// Emit and load: value mode. `None` for pure side-effecting forms
    /// (assignment, move initialization, `assert`).
    pub(crate) fn emit_expr(&mut self, expr: &Expr) -> Option<ValueId> {
        let value = self.emit_lvalue_expr(expr)?;
        let ty = self.value_ty(value);
        if self.pool.is_pointer(ty) && self.types_equal_erased(self.pool.pointee(ty), expr.ty()) {
            return Some(self.create_load(value));
        }
        Some(value)
    }

    /// Value mode for contexts where a value is guaranteed by checking.
    pub(crate) fn emit_expr_value(&mut self, expr: &Expr) -> ValueId {
        match self.emit_expr(expr) {
            Some(value) => value,
            None => panic!("expression produced no value"),
        }
    }

    pub(crate) fn emit_expr_discard(&mut self, expr: &Expr) {
        let _ = self.emit_expr(expr);
    }

    /// Address mode: stop at the address, never load.
    pub(crate) fn emit_lvalue_expr(&mut self, expr: &Expr) -> Option<ValueId> {
        match &expr.kind {
            ExprKind::Var(name) => Some(self.get_value(name)),
            ExprKind::IntLiteral(value) => {
                Some(self.const_int(expr.ty(), i64::try_from(*value).unwrap_or(i64::MAX)))
            }
            ExprKind::BoolLiteral(value) => Some(self.const_bool(*value)),
            ExprKind::StringLiteral(contents) => Some(self.create_global_string(contents.clone())),
            ExprKind::NullLiteral => {
                let wrapped = self.pool.wrapped_type(expr.ty());
                Some(self.emit_optional_construction(wrapped, None))
            }
            ExprKind::ArrayLiteral(elements) => Some(self.emit_array_literal(expr, elements)),
            ExprKind::TupleLiteral(elements) => {
                let mut aggregate = self.undef(expr.ty());
                for (index, element) in elements.iter().enumerate() {
                    let value = self.emit_expr_value(&element.value);
                    aggregate = self.insert_value(aggregate, value, index, expr.ty());
                }
                Some(aggregate)
            }
            ExprKind::Unary { op, operand } => self.emit_unary_expr(*op, operand),
            ExprKind::Binary { op, lhs, rhs } => match op {
                vela_ast::BinaryOp::And => Some(self.emit_logical_and(lhs, rhs)),
                vela_ast::BinaryOp::Or => Some(self.emit_logical_or(lhs, rhs)),
                _ => {
                    let lhs_value = self.emit_expr_or_enum_tag(lhs);
                    let rhs_value = self.emit_expr_or_enum_tag(rhs);
                    Some(self.push_inst(
                        Inst::Binary {
                            op: *op,
                            lhs: lhs_value,
                            rhs: rhs_value,
                        },
                        expr.ty(),
                        "",
                    ))
                }
            },
            ExprKind::Call(call) => self.emit_call_expr(expr, call, None),
            ExprKind::Member { base, member } => Some(self.emit_member_expr(expr, base, member)),
            ExprKind::If {
                condition,
                then_value,
                else_value,
            } => Some(self.emit_if_expr(condition, then_value, else_value)),
            ExprKind::Lambda(lambda) => Some(self.emit_lambda_expr(expr, lambda)),
        }
    }

    pub(crate) fn emit_lvalue_expr_required(&mut self, expr: &Expr) -> ValueId {
        match self.emit_lvalue_expr(expr) {
            Some(value) => value,
            None => panic!("expression has no address"),
        }
    }

    /// Emit as a pointer, spilling into a temp alloca when the value is
    /// not already addressable.
    pub(crate) fn emit_expr_as_pointer(&mut self, expr: &Expr) -> ValueId {
        let value = self.emit_lvalue_expr_required(expr);
        if self.pool.is_pointer(self.value_ty(value)) {
            value
        } else {
            self.create_temp_alloca(value, "")
        }
    }

    /// Emit an argument coerced to the target parameter type: an address
    /// is materialized for pointer parameters, loads are inserted down to
    /// a value otherwise.
    pub(crate) fn emit_expr_for_passing(&mut self, expr: &Expr, target: Option<Type>) -> ValueId {
        let Some(target) = target else {
            return self.emit_expr_value(expr);
        };

        let value = self.emit_lvalue_expr_required(expr);
        let ty = self.value_ty(value);

        if self.pool.is_pointer(target)
            && self.types_equal_erased(ty, self.pool.pointee(target))
        {
            return self.create_temp_alloca(value, "");
        }

        if self.pool.is_pointer(ty) && !self.types_equal_erased(ty, target) {
            let loaded = self.create_load(value);
            let loaded_ty = self.value_ty(loaded);
            if self.pool.is_pointer(loaded_ty) && !self.types_equal_erased(loaded_ty, target) {
                return self.create_load(loaded);
            }
            return loaded;
        }

        value
    }

    // --- Aggregates -------------------------------------------------------

    fn insert_value(
        &mut self,
        aggregate: ValueId,
        element: ValueId,
        index: usize,
        ty: Type,
    ) -> ValueId {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.push_inst(
            Inst::InsertValue {
                aggregate,
                element,
                index,
            },
            ty,
            "",
        )
    }

    fn emit_array_literal(&mut self, expr: &Expr, elements: &[Expr]) -> ValueId {
        let mut aggregate = self.undef(expr.ty());
        for (index, element) in elements.iter().enumerate() {
            let value = self.emit_expr_value(element);
            aggregate = self.insert_value(aggregate, value, index, expr.ty());
        }
        aggregate
    }

    /// Optional construction: has-value flag at index 0, payload at
    /// index 1.
    pub(crate) fn emit_optional_construction(
        &mut self,
        wrapped: Type,
        value: Option<ValueId>,
    ) -> ValueId {
        let optional = self
            .pool
            .optional(wrapped, false, SourceLocation::DUMMY);
        let mut aggregate = self.undef(optional);
        let has_value = self.const_bool(value.is_some());
        aggregate = self.insert_value(aggregate, has_value, 0, optional);
        if let Some(value) = value {
            aggregate = self.insert_value(aggregate, value, 1, optional);
        }
        aggregate
    }

    /// Enum case construction: the bare tag for payload-free enums, or a
    /// stack slot with the tag at member 0 and the associated values at
    /// member 1, inserted in declaration order.
    pub(crate) fn emit_enum_case(
        &mut self,
        enum_decl: &EnumDecl,
        case: &EnumCase,
        args: &[Expr],
    ) -> ValueId {
        let int = self.pool.int();
        let tag = self.const_int(int, case.tag);
        if !enum_decl.has_associated_values() {
            return tag;
        }

        let enum_ty = self
            .pool
            .basic(enum_decl.name.clone(), Vec::new(), false, SourceLocation::DUMMY);
        let slot = self.create_entry_block_alloca(enum_ty, "enum");

        let tag_ptr_ty = self.pool.pointer(int, false, SourceLocation::DUMMY);
        let tag_addr = self.push_inst(
            Inst::FieldAddr {
                base: slot,
                index: 0,
            },
            tag_ptr_ty,
            "tag",
        );
        self.create_store(tag, tag_addr);

        if !args.is_empty() {
            let payload_ty = self.combined_return_type(&case.associated_types);
            let payload = if args.len() == 1 {
                self.emit_expr_value(&args[0])
            } else {
                let mut aggregate = self.undef(payload_ty);
                for (index, arg) in args.iter().enumerate() {
                    let value = self.emit_expr_value(arg);
                    aggregate = self.insert_value(aggregate, value, index, payload_ty);
                }
                aggregate
            };
            let payload_ptr_ty = self.pool.pointer(payload_ty, false, SourceLocation::DUMMY);
            let payload_addr = self.push_inst(
                Inst::FieldAddr {
                    base: slot,
                    index: 1,
                },
                payload_ptr_ty,
                "associated",
            );
            self.create_store(payload, payload_addr);
        }

        slot
    }

    // --- Operators --------------------------------------------------------

    fn emit_unary_expr(&mut self, op: UnaryOp, operand: &Expr) -> Option<ValueId> {
        match op {
            UnaryOp::Plus => self.emit_expr(operand),
            UnaryOp::Minus | UnaryOp::Not => {
                let value = self.emit_expr_value(operand);
                let ty = self.value_ty(value);
                Some(self.push_inst(Inst::Unary { op, operand: value }, ty, ""))
            }
        }
    }

    /// `&&`: the right operand only evaluates when the left was true.
    fn emit_logical_and(&mut self, left: &Expr, right: &Expr) -> ValueId {
        let rhs_block = self.create_attached_block("and.rhs");
        let end_block = self.create_attached_block("and.end");

        let lhs = self.emit_expr_value(left);
        self.create_cond_br(lhs, rhs_block, end_block);
        let lhs_block = self.current_block();

        self.set_insert_point(rhs_block);
        let rhs = self.emit_expr_value(right);
        self.create_br(end_block);
        let rhs_end_block = self.current_block();

        self.set_insert_point(end_block);
        self.create_phi(vec![(lhs, lhs_block), (rhs, rhs_end_block)], "and")
    }

    /// `||`: the right operand only evaluates when the left was false.
    fn emit_logical_or(&mut self, left: &Expr, right: &Expr) -> ValueId {
        let rhs_block = self.create_attached_block("or.rhs");
        let end_block = self.create_attached_block("or.end");

        let lhs = self.emit_expr_value(left);
        self.create_cond_br(lhs, end_block, rhs_block);
        let lhs_block = self.current_block();

        self.set_insert_point(rhs_block);
        let rhs = self.emit_expr_value(right);
        self.create_br(end_block);
        let rhs_end_block = self.current_block();

        self.set_insert_point(end_block);
        self.create_phi(vec![(lhs, lhs_block), (rhs, rhs_end_block)], "or")
    }

    fn current_block(&self) -> vela_ir::BlockId {
        match self.insert_block {
            Some(block) => block,
            None => panic!("no insertion point set"),
        }
    }

    /// Comparing enums compares tags: a case reference becomes its tag
    /// constant; an enum value with associated values loads member 0.
    fn emit_expr_or_enum_tag(&mut self, expr: &Expr) -> ValueId {
        if let ExprKind::Member { base, member } = &expr.kind {
            if let ExprKind::Var(name) = &base.kind {
                if let Some(enum_decl) = self.enum_decls.get(name).cloned() {
                    let Some(case) = enum_decl.case(member) else {
                        panic!("unknown enum case '{member}' reached IR generation");
                    };
                    let int = self.pool.int();
                    return self.const_int(int, case.tag);
                }
            }
        }

        let ty = expr.ty();
        if self.pool.is_basic(ty) {
            let name = self.pool.name(ty);
            if let Some(enum_decl) = self.enum_decls.get(&name).cloned() {
                if enum_decl.has_associated_values() {
                    let value = self.emit_lvalue_expr_required(expr);
                    let int = self.pool.int();
                    let tag_ptr_ty = self.pool.pointer(int, false, SourceLocation::DUMMY);
                    let tag_addr = self.push_inst(
                        Inst::FieldAddr {
                            base: value,
                            index: 0,
                        },
                        tag_ptr_ty,
                        "tag",
                    );
                    return self.create_load(tag_addr);
                }
            }
        }

        self.emit_expr_value(expr)
    }

    // --- Control-flow expressions -----------------------------------------

    /// If-expression: each arm emits into its own block, the merge phi is
    /// keyed by the block each arm *ended* in (an arm's emission may open
    /// further blocks).
    fn emit_if_expr(&mut self, condition: &Expr, then_value: &Expr, else_value: &Expr) -> ValueId {
        let condition = self.emit_expr_value(condition);
        let then_block = self.create_attached_block("if.then");
        let else_block = self.create_detached_block("if.else");
        let end_block = self.create_detached_block("if.end");
        self.create_cond_br(condition, then_block, else_block);

        self.set_insert_point(then_block);
        let then_result = self.emit_expr_value(then_value);
        self.create_br(end_block);
        let then_end = self.current_block();

        self.attach_block(else_block);
        self.set_insert_point(else_block);
        let else_result = self.emit_expr_value(else_value);
        self.create_br(end_block);
        let else_end = self.current_block();

        self.attach_block(end_block);
        self.set_insert_point(end_block);
        self.create_phi(
            vec![(then_result, then_end), (else_result, else_end)],
            "phi",
        )
    }

    // --- Member access ----------------------------------------------------

    fn emit_member_expr(&mut self, expr: &Expr, base: &Expr, member: &str) -> ValueId {
        // Enum case reference.
        if let ExprKind::Var(name) = &base.kind {
            if let Some(enum_decl) = self.enum_decls.get(name).cloned() {
                let Some(case) = enum_decl.case(member) else {
                    panic!("unknown enum case '{member}' reached IR generation");
                };
                return self.emit_enum_case(&enum_decl, case, &[]);
            }
        }

        let base_ty = self.pool.remove_pointer(base.ty());

        let index = if self.pool.is_tuple(base_ty) {
            let elements = self.pool.tuple_elements(base_ty);
            match elements.iter().position(|e| e.name == member) {
                Some(index) => u32::try_from(index).unwrap_or(u32::MAX),
                None => panic!("unknown tuple element '{member}' reached IR generation"),
            }
        } else {
            let name = self.pool.name(base_ty);
            let Some(type_decl) = self.type_decls.get(&name).cloned() else {
                panic!("member access on unknown type '{name}'");
            };
            if type_decl.kind == vela_ast::TypeDeclKind::Union {
                0
            } else {
                match type_decl.field_index(member) {
                    Some(index) => index,
                    None => panic!("unknown field '{member}' reached IR generation"),
                }
            }
        };

        let mut base_value = self.emit_lvalue_expr_required(base);
        let mut value_ty = self.value_ty(base_value);
        if self.pool.is_pointer(value_ty) && self.pool.is_pointer(self.pool.pointee(value_ty)) {
            base_value = self.create_load(base_value);
            value_ty = self.value_ty(base_value);
        }

        if self.pool.is_pointer(value_ty) {
            let member_ptr = self
                .pool
                .pointer(expr.ty(), false, SourceLocation::DUMMY);
            self.push_inst(
                Inst::FieldAddr {
                    base: base_value,
                    index,
                },
                member_ptr,
                member,
            )
        } else {
            self.push_inst(
                Inst::ExtractValue {
                    aggregate: base_value,
                    index,
                },
                expr.ty(),
                member,
            )
        }
    }

    // --- Lambdas ----------------------------------------------------------

    /// Lower a lambda by synthesizing an ordinary function and emitting
    /// it with a clean scope stack; the expression's value is a reference
    /// to the synthesized function.
    fn emit_lambda_expr(&mut self, expr: &Expr, lambda: &LambdaExpr) -> ValueId {
        let name = format!("__lambda{}", self.lambda_count);
        self.lambda_count += 1;
        let decl = Rc::new(FunctionDecl {
            name,
            params: lambda.params.clone(),
            return_types: vec![lambda.return_type],
            body: Some(lambda.body.clone()),
            is_extern: false,
            kind: FunctionKind::Free,
            location: expr.location,
        });

        let saved_block = self.insert_block.take();
        let saved_scopes = std::mem::take(&mut self.scopes);

        self.emit_function_decl(&decl);

        self.scopes = saved_scopes;
        self.insert_block = saved_block;

        let function = self.function_proto(&decl);
        self.function_ref_value(function)
    }

    // --- Assertions -------------------------------------------------------

    /// Lower `assert`: branch on the condition's falsity into a fail
    /// block that calls the external assertion-failure routine with the
    /// source position, then never returns.
    pub(crate) fn emit_assert(
        &mut self,
        condition: ValueId,
        location: SourceLocation,
        message: &str,
    ) {
        let bool_ty = self.pool.bool();
        let failed = self.push_inst(
            Inst::Unary {
                op: UnaryOp::Not,
                operand: condition,
            },
            bool_ty,
            "assert.condition",
        );

        let fail_block = self.create_attached_block("assert.fail");
        let success_block = self.create_attached_block("assert.success");
        self.create_cond_br(failed, fail_block, success_block);

        self.set_insert_point(fail_block);
        let text = format!(
            "{message} at {}:{}:{}\n",
            self.source_file, location.line, location.column
        );
        let message_value = self.create_global_string(text);
        let proto = self.assert_fail_proto();
        let callee = self.function_ref_value(proto);
        self.create_call(callee, vec![message_value]);
        let void = self.pool.void();
        self.push_inst(Inst::Unreachable, void, "");

        self.set_insert_point(success_block);
    }

    fn assert_fail_proto(&mut self) -> FunctionId {
        let message_ty = self
            .pool
            .pointer(self.pool.char(), false, SourceLocation::DUMMY);
        let decl = Rc::new(FunctionDecl {
            name: "assert_fail".to_owned(),
            params: vec![vela_ast::ParamDecl::new(
                "message",
                message_ty,
                SourceLocation::DUMMY,
            )],
            return_types: Vec::new(),
            body: None,
            is_extern: true,
            kind: FunctionKind::Free,
            location: SourceLocation::DUMMY,
        });
        self.function_proto(&decl)
    }

    // --- Calls ------------------------------------------------------------

    /// Emit a call. `this_slot_for_init` supplies a pre-allocated
    /// receiver slot for constructor calls (variable initialization).
    pub(crate) fn emit_call_expr(
        &mut self,
        expr: &Expr,
        call: &CallExpr,
        this_slot_for_init: Option<ValueId>,
    ) -> Option<ValueId> {
        // The assert builtin.
        if call.receiver.is_none() && call.callee == "assert" {
            let condition = self.emit_expr_value(&call.args[0]);
            self.emit_assert(condition, expr.location, "Assertion failed");
            return None;
        }

        // Move initialization: store into the receiver, no call.
        if call.is_move_init {
            let Some(receiver) = &call.receiver else {
                panic!("move initialization without a receiver");
            };
            let receiver_addr = self.emit_lvalue_expr_required(receiver);
            let value = self.emit_expr_value(&call.args[0]);
            self.create_store(value, receiver_addr);
            return None;
        }

        // Enum case construction with associated values.
        if let Some(receiver) = &call.receiver {
            if let ExprKind::Var(name) = &receiver.kind {
                if let Some(enum_decl) = self.enum_decls.get(name).cloned() {
                    let Some(case) = enum_decl.case(&call.callee) else {
                        panic!("unknown enum case '{}' reached IR generation", call.callee);
                    };
                    return Some(self.emit_enum_case(&enum_decl, case, &call.args));
                }
            }
        }

        let callee = self.resolve_callee(call);

        let (callee_value, param_types) = match &callee {
            Callee::Direct { function, .. } => {
                let params: Vec<Type> = self
                    .module()
                    .function(*function)
                    .params
                    .iter()
                    .map(|p| p.ty)
                    .collect();
                (self.function_ref_value(*function), params)
            }
            Callee::Indirect(value) => {
                // Load until the callee is a (pointer to) function type.
                let mut callee_value = *value;
                let mut ty = self.value_ty(callee_value);
                if self.pool.is_pointer(ty) && !self.pool.is_function(self.pool.pointee(ty)) {
                    callee_value = self.create_load(callee_value);
                    ty = self.value_ty(callee_value);
                }
                let function_ty = self.pool.remove_pointer(ty);
                (callee_value, self.pool.param_types(function_ty))
            }
        };

        let mut args = Vec::with_capacity(call.args.len() + 1);
        let mut params = param_types.iter().copied();

        let is_constructor_call = if let Callee::Direct { decl, .. } = &callee {
            match &decl.kind {
                FunctionKind::Constructor { type_name } => {
                    // Consume the receiver parameter slot.
                    let _ = params.next();
                    let slot = if let Some(slot) = this_slot_for_init {
                        slot
                    } else if matches!(self.current_kind, FunctionKind::Constructor { .. })
                        && call.callee == "init"
                        && call.receiver.is_none()
                    {
                        // Delegation from within another constructor.
                        self.get_value("this")
                    } else {
                        let ty = self.pool.basic(
                            type_name.clone(),
                            Vec::new(),
                            false,
                            SourceLocation::DUMMY,
                        );
                        self.create_entry_block_alloca(ty, "")
                    };
                    args.push(slot);
                    true
                }
                FunctionKind::Method { .. } | FunctionKind::Destructor { .. } => {
                    let receiver_param = params.next();
                    let receiver = if let Some(receiver) = &call.receiver {
                        self.emit_expr_for_passing(receiver, receiver_param)
                    } else {
                        self.get_value("this")
                    };
                    args.push(receiver);
                    false
                }
                FunctionKind::Free => false,
            }
        } else {
            false
        };

        for arg in &call.args {
            let target = params.next();
            args.push(self.emit_expr_for_passing(arg, target));
        }

        let result = self.create_call(callee_value, args.clone());

        if is_constructor_call {
            // The call initializes the receiver; the expression's value
            // is the (now-initialized) receiver address.
            Some(args[0])
        } else {
            Some(result)
        }
    }

    fn resolve_callee(&mut self, call: &CallExpr) -> Callee {
        // Method or constructor through an explicit receiver.
        if let Some(receiver) = &call.receiver {
            let receiver_ty = self.pool.remove_pointer(receiver.ty());
            let type_name = self.pool.name(receiver_ty);
            let Some(type_decl) = self.type_decls.get(&type_name).cloned() else {
                panic!("method call on unknown type '{type_name}'");
            };
            let member = type_decl
                .methods
                .iter()
                .find(|m| m.name == call.callee)
                .or_else(|| {
                    type_decl
                        .constructors
                        .iter()
                        .find(|c| c.params.len() == call.args.len() && call.callee == "init")
                });
            let Some(member) = member else {
                panic!(
                    "unknown member function '{}.{}' reached IR generation",
                    type_name, call.callee
                );
            };
            let decl = Rc::new(member.clone());
            let function = self.function_proto(&decl);
            return Callee::Direct { decl, function };
        }

        // Delegating constructor call.
        if call.callee == "init" {
            if let FunctionKind::Constructor { type_name } = self.current_kind.clone() {
                return self.constructor_callee(&type_name, call);
            }
        }

        // Constructor call by type name.
        if self.type_decls.contains_key(&call.callee) {
            let type_name = call.callee.clone();
            return self.constructor_callee(&type_name, call);
        }

        // Generic instantiation.
        if let Some(template) = self.templates.get(&call.callee).cloned() {
            let name = mangle::instantiation_name(&call.callee, self.pool, &call.generic_args);
            let decl = Rc::new(instantiate::instantiate_function(
                self.pool,
                &template,
                &call.generic_args,
                name,
            ));
            let function = self.function_proto(&decl);
            return Callee::Direct { decl, function };
        }

        // Free function.
        if let Some(decl) = self.source_functions.get(&call.callee).cloned() {
            let function = self.function_proto(&decl);
            return Callee::Direct { decl, function };
        }

        // Function-typed local value: an indirect call.
        Callee::Indirect(self.get_value(&call.callee))
    }

    fn constructor_callee(&mut self, type_name: &str, call: &CallExpr) -> Callee {
        let Some(type_decl) = self.type_decls.get(type_name).cloned() else {
            panic!("constructor call on unknown type '{type_name}'");
        };
        let Some(constructor) = type_decl
            .constructors
            .iter()
            .find(|c| c.params.len() == call.args.len())
        else {
            panic!("no matching constructor for '{type_name}' reached IR generation");
        };
        let decl = Rc::new(constructor.clone());
        let function = self.function_proto(&decl);
        Callee::Direct { decl, function }
    }
}
