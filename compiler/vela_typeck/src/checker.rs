//! The type-checking judgments.

use tracing::{debug, trace};
use vela_ast::{
    CallExpr, Decl, Expr, ExprKind, FunctionDecl, FunctionKind, LambdaExpr, Module,
    SourceLocation, Stmt, StmtKind, Type, TypeDecl, VarDecl,
};
use vela_types::{TupleElement, TypePool};

use crate::error::CheckError;
use crate::symbol_table::{
    combined_return_type, EnumInfo, FunctionSig, Symbol, SymbolTable, TypeInfo,
};


/// The checker state: pool reference, symbol table, and the ambient
/// expected return type of the function body being checked.
///
/// One instance per compilation context; parallel compilation of
/// independent modules uses independently owned checkers (the pool may be
/// shared).
pub struct TypeChecker<'a> {
    pool: &'a TypePool,
    symbols: SymbolTable,
    expected_return_type: Option<Type>,
    /// The type whose method/constructor body is being checked, for
    /// delegating `init(...)` calls.
    current_type_name: Option<String>,
}

impl<'a> TypeChecker<'a> {
    /// Create a checker over the given pool.
    pub fn new(pool: &'a TypePool) -> Self {
        TypeChecker {
            pool,
            symbols: SymbolTable::new(),
            expected_return_type: None,
            current_type_name: None,
        }
    }

    /// The symbol table, populated as declarations are checked.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Consume the checker, yielding the populated symbol table for IR
    /// generation.
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    /// Judgment-level type equality: structural, modulo mutability.
    ///
    /// Handle equality is strict about mutability; the judgments are not,
    /// or reading a `mutable` variable could never satisfy an immutable
    /// context.
    fn types_match(&self, a: Type, b: Type) -> bool {
        self.pool.strip_mutable(a) == self.pool.strip_mutable(b)
    }

    /// Check a whole module: register all top-level declarations, then
    /// check each in order. Stops at the first error.
    pub fn check_module(&mut self, module: &Module) -> Result<(), CheckError> {
        debug!(module = %module.name, "type checking module");
        for decl in &module.decls {
            self.register_decl(decl)?;
        }
        for decl in &module.decls {
            self.check_decl(decl)?;
        }
        Ok(())
    }

    // --- Registration -----------------------------------------------------

    /// Bind a top-level declaration before any body is checked, so
    /// forward references resolve.
    fn register_decl(&mut self, decl: &Decl) -> Result<(), CheckError> {
        match decl {
            Decl::Function(f) => {
                self.symbols
                    .insert(f.name.clone(), Symbol::Function(FunctionSig::of(f)), f.location)
            }
            // Global variables bind when checked, in order.
            Decl::Var(_) => Ok(()),
            Decl::Type(t) => {
                let info = TypeInfo {
                    name: t.name.clone(),
                    kind: t.kind,
                    fields: t.fields.iter().map(|f| (f.name.clone(), f.ty)).collect(),
                    methods: t.methods.iter().map(FunctionSig::of).collect(),
                    constructors: t.constructors.iter().map(FunctionSig::of).collect(),
                    has_destructor: t.destructor.is_some(),
                };
                self.symbols
                    .insert(t.name.clone(), Symbol::Type(info), t.location)
            }
            Decl::Enum(e) => {
                let info = EnumInfo {
                    name: e.name.clone(),
                    cases: e
                        .cases
                        .iter()
                        .map(|c| (c.name.clone(), c.associated_types.clone()))
                        .collect(),
                };
                self.symbols
                    .insert(e.name.clone(), Symbol::Enum(info), e.location)
            }
            Decl::FunctionTemplate(t) => self.symbols.insert(
                t.function.name.clone(),
                Symbol::Template {
                    generic_params: t.generic_params.clone(),
                    sig: FunctionSig::of(&t.function),
                },
                t.function.location,
            ),
        }
    }

    // --- Declarations -----------------------------------------------------

    fn check_decl(&mut self, decl: &Decl) -> Result<(), CheckError> {
        match decl {
            Decl::Function(f) => self.check_function(f),
            Decl::Var(v) => self.check_var_decl(v),
            Decl::Type(t) => self.check_type_decl(t),
            Decl::Enum(_) => Ok(()),
            // Template bodies check against their placeholder types;
            // instantiation substitutes concrete types later.
            Decl::FunctionTemplate(t) => self.check_function(&t.function),
        }
    }

    /// Check a function body in a fresh scope seeded with its parameters.
    ///
    /// Extern declarations are trusted as-is. Parameters and locals are
    /// discarded with the scope, so nothing leaks to sibling declarations.
    fn check_function(&mut self, decl: &FunctionDecl) -> Result<(), CheckError> {
        if decl.is_extern {
            return Ok(());
        }
        let Some(body) = &decl.body else {
            return Ok(());
        };
        trace!(function = %decl.name, "checking function body");

        self.symbols.push_scope();

        let saved_type_name = self.current_type_name.clone();
        if let Some(type_name) = decl.kind.type_name() {
            // Methods see the receiver as `this`.
            let receiver_ty = self.pool.pointer(
                self.pool
                    .basic(type_name, Vec::new(), true, SourceLocation::DUMMY),
                false,
                SourceLocation::DUMMY,
            );
            self.symbols
                .insert("this", Symbol::Parameter { ty: receiver_ty }, decl.location)?;
            self.current_type_name = Some(type_name.to_owned());
        }

        for param in &decl.params {
            self.symbols.insert(
                param.name.clone(),
                Symbol::Parameter { ty: param.ty },
                param.location,
            )?;
        }

        let expected = match decl.kind {
            FunctionKind::Constructor { .. } | FunctionKind::Destructor { .. } => self.pool.void(),
            _ => combined_return_type(self.pool, &decl.return_types),
        };
        let saved_return = self.expected_return_type.replace(expected);

        for stmt in body {
            self.check_stmt(stmt)?;
        }

        self.expected_return_type = saved_return;
        self.current_type_name = saved_type_name;
        self.symbols.pop_scope();
        Ok(())
    }

    fn check_type_decl(&mut self, decl: &TypeDecl) -> Result<(), CheckError> {
        for constructor in &decl.constructors {
            self.check_function(constructor)?;
        }
        for method in &decl.methods {
            self.check_function(method)?;
        }
        if let Some(destructor) = &decl.destructor {
            self.check_function(destructor)?;
        }
        Ok(())
    }

    /// Check a variable declaration, local or global.
    ///
    /// Without a declared type the initializer's type becomes the
    /// variable's type, re-qualified with the declared mutability. With a
    /// declared type the initializer must match exactly, with no implicit
    /// widening or narrowing.
    fn check_var_decl(&mut self, decl: &VarDecl) -> Result<(), CheckError> {
        if self.symbols.defined_in_current_scope(&decl.name) {
            return Err(CheckError::Redefinition {
                name: decl.name.clone(),
                location: decl.location,
            });
        }

        // `null` initializers take their type from the declared optional.
        let init_ty = match (&decl.declared_ty, &decl.initializer.kind) {
            (Some(declared), ExprKind::NullLiteral) if self.pool.is_optional(*declared) => {
                decl.initializer.set_ty(*declared);
                *declared
            }
            _ => self.check_expr(&decl.initializer)?,
        };

        let ty = if let Some(declared) = decl.declared_ty {
            if !self.types_match(declared, init_ty) {
                return Err(CheckError::InitializerTypeMismatch {
                    declared,
                    found: init_ty,
                    location: decl.location,
                });
            }
            self.pool.set_mutable(declared, decl.mutable)
        } else {
            if self.pool.is_function(init_ty) {
                return Err(CheckError::NotYetSupported {
                    message: "function pointers not implemented yet".to_owned(),
                    location: decl.location,
                });
            }
            self.pool.set_mutable(init_ty, decl.mutable)
        };

        decl.set_ty(ty);
        self.symbols.insert(
            decl.name.clone(),
            Symbol::Variable {
                ty,
                moved: decl.moved_flag(),
            },
            decl.location,
        )
    }

    // --- Statements -------------------------------------------------------

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), CheckError> {
        match &stmt.kind {
            StmtKind::Return(values) => self.check_return(values, stmt.location),
            StmtKind::Var(decl) => self.check_var_decl(decl),
            StmtKind::Increment(operand) => self.check_modification(operand, "increment"),
            StmtKind::Decrement(operand) => self.check_modification(operand, "decrement"),
            StmtKind::Expr(expr) | StmtKind::Defer(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }
            StmtKind::If {
                condition,
                then_body,
                else_body,
            } => {
                self.check_condition(condition, "if")?;
                self.check_block(then_body)?;
                self.check_block(else_body)
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while")?;
                self.check_block(body)
            }
            StmtKind::Break | StmtKind::Continue => Ok(()),
            StmtKind::Assign { target, value } => self.check_assign(target, value, stmt.location),
        }
    }

    /// Check a block's statements in a child scope.
    fn check_block(&mut self, body: &[Stmt]) -> Result<(), CheckError> {
        self.symbols.push_scope();
        for stmt in body {
            self.check_stmt(stmt)?;
        }
        self.symbols.pop_scope();
        Ok(())
    }

    fn check_return(
        &mut self,
        values: &[Expr],
        location: SourceLocation,
    ) -> Result<(), CheckError> {
        let mut value_types = Vec::with_capacity(values.len());
        for value in values {
            value_types.push(self.check_expr(value)?);
        }
        let returned = combined_return_type(self.pool, &value_types);

        if let Some(expected) = self.expected_return_type {
            if !self.types_match(returned, expected) {
                return Err(CheckError::ReturnTypeMismatch {
                    expected,
                    found: returned,
                    location,
                });
            }
        }
        Ok(())
    }

    fn check_modification(
        &mut self,
        operand: &Expr,
        operation: &'static str,
    ) -> Result<(), CheckError> {
        let ty = self.check_expr(operand)?;
        if !ty.is_mutable() {
            return Err(CheckError::ImmutableModification {
                operation,
                location: operand.location,
            });
        }
        // TODO: Check that the operand supports the increment/decrement operation.
        Ok(())
    }

    fn check_condition(
        &mut self,
        condition: &Expr,
        keyword: &'static str,
    ) -> Result<(), CheckError> {
        let ty = self.check_expr(condition)?;
        if !self.types_match(ty, self.pool.bool()) {
            return Err(CheckError::NonBooleanCondition {
                keyword,
                location: condition.location,
            });
        }
        Ok(())
    }

    fn check_assign(
        &mut self,
        target: &Expr,
        value: &Expr,
        location: SourceLocation,
    ) -> Result<(), CheckError> {
        let target_ty = self.check_expr(target)?;
        if self.pool.is_function(target_ty) {
            return Err(CheckError::CannotAssignToFunction { location });
        }
        let value_ty = self.check_expr(value)?;
        if !self.types_match(value_ty, target_ty) {
            return Err(CheckError::AssignmentTypeMismatch {
                target: target_ty,
                found: value_ty,
                location,
            });
        }
        if !target_ty.is_mutable() {
            let name = match &target.kind {
                ExprKind::Var(name) => name.clone(),
                ExprKind::Member { member, .. } => member.clone(),
                _ => "value".to_owned(),
            };
            return Err(CheckError::ImmutableAssignment { name, location });
        }
        Ok(())
    }

    // --- Expressions ------------------------------------------------------

    /// Compute and record the type of an expression.
    pub fn check_expr(&mut self, expr: &Expr) -> Result<Type, CheckError> {
        let ty = match &expr.kind {
            ExprKind::Var(name) => self.check_var_expr(name, expr.location)?,
            ExprKind::IntLiteral(value) => self.check_int_literal(*value, expr.location)?,
            ExprKind::BoolLiteral(_) => self.pool.bool(),
            ExprKind::StringLiteral(_) => {
                self.pool
                    .pointer(self.pool.char(), false, SourceLocation::DUMMY)
            }
            ExprKind::NullLiteral => {
                return Err(CheckError::NotYetSupported {
                    message: "cannot infer the type of 'null' here".to_owned(),
                    location: expr.location,
                });
            }
            ExprKind::ArrayLiteral(elements) => self.check_array_literal(elements, expr.location)?,
            ExprKind::TupleLiteral(elements) => {
                let mut tuple_elements = Vec::with_capacity(elements.len());
                for element in elements {
                    let element_ty = self.check_expr(&element.value)?;
                    tuple_elements.push(TupleElement::new(element.name.clone(), element_ty));
                }
                self.pool.tuple(tuple_elements, false, expr.location)
            }
            ExprKind::Unary { operand, .. } => self.check_expr(operand)?,
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_ty = self.check_expr(lhs)?;
                let rhs_ty = self.check_expr(rhs)?;
                if !self.types_match(lhs_ty, rhs_ty) {
                    return Err(CheckError::BinaryOperandMismatch {
                        location: expr.location,
                    });
                }
                if op.is_comparison() {
                    self.pool.bool()
                } else {
                    lhs_ty
                }
            }
            ExprKind::Call(call) => self.check_call(call, expr.location)?,
            ExprKind::Member { base, member } => self.check_member(base, member, expr.location)?,
            ExprKind::If {
                condition,
                then_value,
                else_value,
            } => {
                self.check_condition(condition, "if")?;
                let then_ty = self.check_expr(then_value)?;
                let else_ty = self.check_expr(else_value)?;
                if !self.types_match(then_ty, else_ty) {
                    return Err(CheckError::TypeMismatch {
                        expected: then_ty,
                        found: else_ty,
                        location: else_value.location,
                    });
                }
                then_ty
            }
            ExprKind::Lambda(lambda) => self.check_lambda(lambda, expr.location)?,
        };

        expr.set_ty(ty);
        Ok(ty)
    }

    fn check_var_expr(&self, name: &str, location: SourceLocation) -> Result<Type, CheckError> {
        match self.symbols.lookup(name) {
            Some(Symbol::Variable { ty, .. }) | Some(Symbol::Parameter { ty }) => Ok(*ty),
            Some(Symbol::Function(sig)) => Ok(sig.function_type(self.pool)),
            Some(Symbol::Template { .. }) => Err(CheckError::NotYetSupported {
                message: format!("generic function '{name}' must be called with type arguments"),
                location,
            }),
            Some(Symbol::Type(_)) | Some(Symbol::Enum(_)) => Err(CheckError::NotYetSupported {
                message: format!("type '{name}' cannot be used as a value"),
                location,
            }),
            None => Err(CheckError::UnknownIdentifier {
                name: name.to_owned(),
                location,
            }),
        }
    }

    fn check_int_literal(&self, value: i128, location: SourceLocation) -> Result<Type, CheckError> {
        if value >= i128::from(i32::MIN) && value <= i128::from(i32::MAX) {
            Ok(self.pool.int())
        } else if value >= i128::from(i64::MIN) && value <= i128::from(i64::MAX) {
            Ok(self.pool.int64())
        } else {
            Err(CheckError::LiteralTooLarge { location })
        }
    }

    fn check_array_literal(
        &mut self,
        elements: &[Expr],
        location: SourceLocation,
    ) -> Result<Type, CheckError> {
        let Some((first, rest)) = elements.split_first() else {
            return Err(CheckError::NotYetSupported {
                message: "cannot infer the element type of an empty array literal".to_owned(),
                location,
            });
        };
        let element_ty = self.check_expr(first)?;
        for element in rest {
            let ty = self.check_expr(element)?;
            if !self.types_match(ty, element_ty) {
                return Err(CheckError::TypeMismatch {
                    expected: element_ty,
                    found: ty,
                    location: element.location,
                });
            }
        }
        let size = i64::try_from(elements.len()).unwrap_or(i64::MAX);
        Ok(self
            .pool
            .array(element_ty, vela_types::ArraySize::Fixed(size), false, location))
    }

    fn check_lambda(
        &mut self,
        lambda: &LambdaExpr,
        location: SourceLocation,
    ) -> Result<Type, CheckError> {
        self.symbols.push_scope();
        for param in &lambda.params {
            self.symbols.insert(
                param.name.clone(),
                Symbol::Parameter { ty: param.ty },
                param.location,
            )?;
        }
        let saved_return = self.expected_return_type.replace(lambda.return_type);
        for stmt in &lambda.body {
            self.check_stmt(stmt)?;
        }
        self.expected_return_type = saved_return;
        self.symbols.pop_scope();

        let param_types = lambda.params.iter().map(|p| p.ty).collect();
        Ok(self
            .pool
            .function(lambda.return_type, param_types, false, location))
    }

    // --- Calls ------------------------------------------------------------

    /// Validate a call's arity and argument types against parameter types.
    fn check_args(
        &mut self,
        name: &str,
        args: &[Expr],
        params: &[Type],
        location: SourceLocation,
    ) -> Result<(), CheckError> {
        if args.len() < params.len() {
            return Err(CheckError::TooFewArguments {
                name: name.to_owned(),
                expected: params.len(),
                location,
            });
        }
        if args.len() > params.len() {
            return Err(CheckError::TooManyArguments {
                name: name.to_owned(),
                expected: params.len(),
                location,
            });
        }
        for (position, (arg, param)) in args.iter().zip(params).enumerate() {
            let arg_ty = self.check_expr(arg)?;
            if !self.types_match(arg_ty, *param) {
                return Err(CheckError::ArgumentTypeMismatch {
                    name: name.to_owned(),
                    position: position + 1,
                    expected: *param,
                    found: arg_ty,
                    location: arg.location,
                });
            }
        }
        Ok(())
    }

    fn check_call(&mut self, call: &CallExpr, location: SourceLocation) -> Result<Type, CheckError> {
        // The assert builtin: one bool argument, no value.
        if call.receiver.is_none() && call.callee == "assert" {
            let expected = [self.pool.bool()];
            self.check_args("assert", &call.args, &expected, location)?;
            return Ok(self.pool.void());
        }

        if let Some(receiver) = &call.receiver {
            return self.check_receiver_call(call, receiver, location);
        }

        // Delegating constructor call inside a constructor body.
        if call.callee == "init" {
            if let Some(type_name) = self.current_type_name.clone() {
                return self.check_constructor_call(&type_name, call, location);
            }
        }

        let Some(symbol) = self.symbols.lookup(&call.callee) else {
            return Err(CheckError::UnknownFunction {
                name: call.callee.clone(),
                location,
            });
        };

        match symbol.clone() {
            Symbol::Function(sig) => {
                self.check_args(&call.callee, &call.args, &sig.param_types, location)?;
                Ok(sig.combined_return_type(self.pool))
            }
            Symbol::Template {
                generic_params,
                sig,
            } => self.check_template_call(call, &generic_params, &sig, location),
            Symbol::Variable { ty, .. } | Symbol::Parameter { ty } => {
                // Indirect call through a function-typed value, possibly
                // behind a pointer.
                let callee_ty = if self.pool.is_pointer(ty) && self.pool.is_function(self.pool.pointee(ty)) {
                    self.pool.pointee(ty)
                } else {
                    ty
                };
                if !self.pool.is_function(callee_ty) {
                    return Err(CheckError::NotCallable {
                        name: call.callee.clone(),
                        location,
                    });
                }
                let params = self.pool.param_types(callee_ty);
                self.check_args(&call.callee, &call.args, &params, location)?;
                Ok(self.pool.return_type(callee_ty))
            }
            Symbol::Type(info) => {
                let type_name = info.name;
                self.check_constructor_call(&type_name, call, location)
            }
            Symbol::Enum(_) => Err(CheckError::NotCallable {
                name: call.callee.clone(),
                location,
            }),
        }
    }

    /// Method call, enum-case construction, or move initialization.
    fn check_receiver_call(
        &mut self,
        call: &CallExpr,
        receiver: &Expr,
        location: SourceLocation,
    ) -> Result<Type, CheckError> {
        // Enum-case construction: the receiver names an enum.
        if let ExprKind::Var(name) = &receiver.kind {
            if let Some(Symbol::Enum(info)) = self.symbols.lookup(name) {
                let info = info.clone();
                let enum_ty = self
                    .pool
                    .basic(info.name.clone(), Vec::new(), false, receiver.location);
                receiver.set_ty(enum_ty);
                let Some(associated) = info.case(&call.callee) else {
                    return Err(CheckError::UnknownIdentifier {
                        name: call.callee.clone(),
                        location,
                    });
                };
                let associated = associated.to_vec();
                self.check_args(&call.callee, &call.args, &associated, location)?;
                return Ok(enum_ty);
            }
        }

        let receiver_ty = self.check_expr(receiver)?;

        // Move initialization stores the argument into the receiver.
        if call.is_move_init {
            let expected = [self.pool.remove_pointer(receiver_ty)];
            self.check_args(&call.callee, &call.args, &expected, location)?;
            self.mark_moved(&call.args[0]);
            return Ok(self.pool.void());
        }

        let base = self.pool.remove_pointer(receiver_ty);
        if !self.pool.is_basic(base) {
            return Err(CheckError::NotCallable {
                name: call.callee.clone(),
                location,
            });
        }
        let type_name = self.pool.name(base);
        let Some(Symbol::Type(info)) = self.symbols.lookup(&type_name) else {
            return Err(CheckError::UnknownFunction {
                name: format!("{type_name}.{}", call.callee),
                location,
            });
        };
        let Some(sig) = info.method(&call.callee).cloned() else {
            return Err(CheckError::UnknownFunction {
                name: format!("{type_name}.{}", call.callee),
                location,
            });
        };
        self.check_args(&call.callee, &call.args, &sig.param_types, location)?;
        Ok(sig.combined_return_type(self.pool))
    }

    fn check_constructor_call(
        &mut self,
        type_name: &str,
        call: &CallExpr,
        location: SourceLocation,
    ) -> Result<Type, CheckError> {
        let Some(Symbol::Type(info)) = self.symbols.lookup(type_name) else {
            return Err(CheckError::UnknownFunction {
                name: type_name.to_owned(),
                location,
            });
        };
        let info = info.clone();

        if info.constructors.is_empty() {
            return Err(CheckError::UnknownFunction {
                name: format!("{type_name}.init"),
                location,
            });
        }
        let Some(constructor) = info
            .constructors
            .iter()
            .find(|c| c.param_types.len() == call.args.len())
        else {
            let expected = info.constructors[0].param_types.len();
            return Err(if call.args.len() < expected {
                CheckError::TooFewArguments {
                    name: type_name.to_owned(),
                    expected,
                    location,
                }
            } else {
                CheckError::TooManyArguments {
                    name: type_name.to_owned(),
                    expected,
                    location,
                }
            });
        };
        self.check_args(type_name, &call.args, &constructor.param_types, location)?;
        Ok(self
            .pool
            .basic(type_name, Vec::new(), false, location))
    }

    fn check_template_call(
        &mut self,
        call: &CallExpr,
        generic_params: &[String],
        sig: &FunctionSig,
        location: SourceLocation,
    ) -> Result<Type, CheckError> {
        if call.generic_args.len() != generic_params.len() {
            return Err(CheckError::NotYetSupported {
                message: format!(
                    "'{}' expects {} generic arguments, got {}",
                    call.callee,
                    generic_params.len(),
                    call.generic_args.len()
                ),
                location,
            });
        }
        let replacements = generic_params
            .iter()
            .cloned()
            .zip(call.generic_args.iter().copied())
            .collect();

        let params: Vec<Type> = sig
            .param_types
            .iter()
            .map(|ty| self.pool.resolve(*ty, &replacements))
            .collect();
        self.check_args(&call.callee, &call.args, &params, location)?;

        let returns: Vec<Type> = sig
            .return_types
            .iter()
            .map(|ty| self.pool.resolve(*ty, &replacements))
            .collect();
        Ok(combined_return_type(self.pool, &returns))
    }

    // --- Member access ----------------------------------------------------

    fn check_member(
        &mut self,
        base: &Expr,
        member: &str,
        location: SourceLocation,
    ) -> Result<Type, CheckError> {
        // Enum case reference: the base names an enum.
        if let ExprKind::Var(name) = &base.kind {
            if let Some(Symbol::Enum(info)) = self.symbols.lookup(name) {
                let info = info.clone();
                let enum_ty = self
                    .pool
                    .basic(info.name.clone(), Vec::new(), false, base.location);
                base.set_ty(enum_ty);
                if info.case(member).is_none() {
                    return Err(CheckError::UnknownIdentifier {
                        name: member.to_owned(),
                        location,
                    });
                }
                return Ok(enum_ty);
            }
        }

        let base_ty = self.check_expr(base)?;
        let bare = self.pool.remove_pointer(base_ty);

        if self.pool.is_tuple(bare) {
            let elements = self.pool.tuple_elements(bare);
            let Some(element) = elements.iter().find(|e| e.name == member) else {
                return Err(CheckError::UnknownIdentifier {
                    name: member.to_owned(),
                    location,
                });
            };
            return Ok(element.ty.as_mutable(bare.is_mutable()));
        }

        if self.pool.is_basic(bare) {
            let type_name = self.pool.name(bare);
            if let Some(Symbol::Type(info)) = self.symbols.lookup(&type_name) {
                if let Some(field_ty) = info.field(member) {
                    return Ok(field_ty.as_mutable(bare.is_mutable()));
                }
            }
        }

        Err(CheckError::UnknownIdentifier {
            name: member.to_owned(),
            location,
        })
    }

    /// Mark a moved-from declaration so pending destructor calls skip it.
    fn mark_moved(&self, arg: &Expr) {
        if let ExprKind::Var(name) = &arg.kind {
            if let Some(Symbol::Variable { moved, .. }) = self.symbols.lookup(name) {
                moved.set(true);
            }
        }
    }
}
