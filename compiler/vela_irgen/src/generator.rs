//! The IR generator's state machine and instruction builders.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use vela_ast::{
    Decl, EnumDecl, ExprKind, FunctionDecl, FunctionKind, FunctionTemplate, SourceLocation, Type,
    TypeDecl, VarDecl,
};
use vela_ir::{
    BlockId, Function, FunctionId, GlobalId, GlobalInit, GlobalVariable, Inst, Module, Param,
    Value, ValueId, ValueKind,
};
use vela_types::{TupleElement, TypePool};

use crate::mangle;
use crate::scope::{DeferredDestructor, Scope};

/// A function awaiting body emission: processed after the initial
/// top-level pass, and idempotent against repeated enqueue (the body is
/// only emitted while still empty).
#[derive(Clone)]
pub(crate) struct Instantiation {
    pub decl: Rc<FunctionDecl>,
    pub function: FunctionId,
}

/// The IR generator.
///
/// Owns the module under construction, the current insertion point, the
/// scope stack, and the pending-instantiation queue. One module is
/// emitted at a time; starting another while one is active is a
/// programming-contract violation.
pub struct IrGenerator<'a> {
    pub(crate) pool: &'a TypePool,

    // Source-module lookup tables, rebuilt per emitted module.
    pub(crate) source_functions: FxHashMap<String, Rc<FunctionDecl>>,
    pub(crate) templates: FxHashMap<String, Rc<FunctionTemplate>>,
    pub(crate) type_decls: FxHashMap<String, Rc<TypeDecl>>,
    pub(crate) enum_decls: FxHashMap<String, Rc<EnumDecl>>,
    pub(crate) global_vars: FxHashMap<String, (GlobalId, Type)>,
    pub(crate) source_file: String,

    module: Option<Module>,
    current_function: Option<FunctionId>,
    pub(crate) insert_block: Option<BlockId>,
    pub(crate) scopes: Vec<Scope>,
    instantiations: Vec<Instantiation>,
    protos: FxHashMap<String, FunctionId>,

    /// Blocks to branch to on `break`/`continue`, with the scope depth
    /// outside the loop body.
    pub(crate) break_targets: Vec<(BlockId, usize)>,
    pub(crate) continue_targets: Vec<(BlockId, usize)>,

    /// Kind of the function currently being emitted, for constructor
    /// delegation and field-assignment handling.
    pub(crate) current_kind: FunctionKind,

    pub(crate) lambda_count: u32,
    string_count: u32,
}

impl<'a> IrGenerator<'a> {
    /// Create a generator over the given pool.
    pub fn new(pool: &'a TypePool) -> Self {
        IrGenerator {
            pool,
            source_functions: FxHashMap::default(),
            templates: FxHashMap::default(),
            type_decls: FxHashMap::default(),
            enum_decls: FxHashMap::default(),
            global_vars: FxHashMap::default(),
            source_file: String::new(),
            module: None,
            current_function: None,
            insert_block: None,
            scopes: Vec::new(),
            instantiations: Vec::new(),
            protos: FxHashMap::default(),
            break_targets: Vec::new(),
            continue_targets: Vec::new(),
            current_kind: FunctionKind::Free,
            lambda_count: 0,
            string_count: 0,
        }
    }

    /// Emit a complete IR module for a type-checked source module.
    ///
    /// # Panics
    /// Panics if a module emission is already in progress, or on any
    /// internal shape violation (input that did not pass type checking).
    pub fn emit_module(&mut self, source: &vela_ast::Module) -> Module {
        assert!(
            self.module.is_none(),
            "module emission already in progress"
        );
        debug!(module = %source.name, "emitting IR module");

        self.module = Some(Module::new(source.name.clone()));
        self.source_file = source.source_file_basename().to_owned();
        for decl in &source.decls {
            match decl {
                Decl::Function(f) => {
                    self.source_functions
                        .insert(f.name.clone(), Rc::new(f.clone()));
                }
                Decl::FunctionTemplate(t) => {
                    self.templates
                        .insert(t.function.name.clone(), Rc::new(t.clone()));
                }
                Decl::Type(t) => {
                    self.type_decls.insert(t.name.clone(), Rc::new(t.clone()));
                }
                Decl::Enum(e) => {
                    self.enum_decls.insert(e.name.clone(), Rc::new(e.clone()));
                }
                Decl::Var(_) => {}
            }
        }

        // The global scope persists across the whole module.
        self.scopes.push(Scope::default());

        for decl in &source.decls {
            self.emit_decl(decl);
        }

        // Process pending instantiations; emission may enqueue more.
        let mut next = 0;
        while next < self.instantiations.len() {
            let instantiation = self.instantiations[next].clone();
            next += 1;

            let body_pending = !instantiation.decl.is_extern
                && instantiation.decl.body.is_some()
                && self
                    .module()
                    .function(instantiation.function)
                    .body_is_empty();
            if body_pending {
                self.emit_function_body(&instantiation.decl, instantiation.function);
            }
        }

        // Reset per-module state.
        self.scopes.clear();
        self.instantiations.clear();
        self.protos.clear();
        self.source_functions.clear();
        self.templates.clear();
        self.type_decls.clear();
        self.enum_decls.clear();
        self.global_vars.clear();

        match self.module.take() {
            Some(module) => module,
            None => unreachable!("module set at entry"),
        }
    }

    // --- Declarations -----------------------------------------------------

    fn emit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Function(f) => {
                let decl = match self.source_functions.get(&f.name) {
                    Some(decl) => Rc::clone(decl),
                    None => Rc::new(f.clone()),
                };
                self.emit_function_decl(&decl);
            }
            Decl::Var(v) => self.emit_global_var(v),
            // Member functions are emitted on demand, when referenced;
            // templates only at instantiation.
            Decl::Type(_) | Decl::Enum(_) | Decl::FunctionTemplate(_) => {}
        }
    }

    pub(crate) fn emit_function_decl(&mut self, decl: &Rc<FunctionDecl>) {
        let function = self.function_proto(decl);
        if !decl.is_extern
            && decl.body.is_some()
            && self.module().function(function).body_is_empty()
        {
            self.emit_function_body(decl, function);
        }
    }

    fn emit_global_var(&mut self, decl: &VarDecl) {
        let init = match &decl.initializer.kind {
            ExprKind::IntLiteral(value) => GlobalInit::Int(*value as i64),
            ExprKind::BoolLiteral(value) => GlobalInit::Bool(*value),
            ExprKind::StringLiteral(value) => GlobalInit::String(value.clone()),
            other => panic!("unsupported global variable initializer: {other:?}"),
        };
        let ty = decl.ty();
        let id = self.module_mut().add_global(GlobalVariable {
            name: decl.name.clone(),
            ty,
            init,
        });
        self.global_vars.insert(decl.name.clone(), (id, ty));
    }

    /// Get or create a function's prototype, enqueueing it for body
    /// emission.
    pub(crate) fn function_proto(&mut self, decl: &Rc<FunctionDecl>) -> FunctionId {
        let mangled = mangle::function_name(decl);
        if let Some(&id) = self.protos.get(&mangled) {
            return id;
        }

        let mut params = Vec::with_capacity(decl.params.len() + 1);
        if let Some(type_name) = decl.kind.type_name() {
            params.push(Param {
                name: "this".to_owned(),
                ty: self.receiver_type(type_name),
            });
        }
        params.extend(decl.params.iter().map(|p| Param {
            name: p.name.clone(),
            ty: p.ty,
        }));

        let return_type = match decl.kind {
            FunctionKind::Constructor { .. } | FunctionKind::Destructor { .. } => self.pool.void(),
            _ => self.combined_return_type(&decl.return_types),
        };

        let function = Function::new(mangled.clone(), params, return_type, decl.is_extern);
        let id = self.module_mut().add_function(function);
        self.protos.insert(mangled, id);
        self.instantiations.push(Instantiation {
            decl: Rc::clone(decl),
            function: id,
        });
        id
    }

    pub(crate) fn receiver_type(&self, type_name: &str) -> Type {
        self.pool.pointer(
            self.pool
                .basic(type_name, Vec::new(), true, SourceLocation::DUMMY),
            false,
            SourceLocation::DUMMY,
        )
    }

    pub(crate) fn combined_return_type(&self, return_types: &[Type]) -> Type {
        match return_types {
            [] => self.pool.void(),
            [single] => *single,
            multiple => self.pool.tuple(
                multiple.iter().map(|ty| TupleElement::unnamed(*ty)).collect(),
                false,
                SourceLocation::DUMMY,
            ),
        }
    }

    pub(crate) fn emit_function_body(&mut self, decl: &FunctionDecl, function: FunctionId) {
        trace!(function = %decl.name, "emitting function body");

        let saved_function = self.current_function.replace(function);
        let saved_block = self.insert_block.take();
        let saved_kind = std::mem::replace(&mut self.current_kind, decl.kind.clone());

        let entry = self.module_mut().function_mut(function).add_block("entry");
        self.insert_block = Some(entry);
        self.begin_scope();

        let mut argument_index = 0;
        if let Some(type_name) = decl.kind.type_name() {
            let ty = self.receiver_type(type_name);
            let this = self.add_value(ValueKind::Argument { index: 0 }, ty, "this");
            self.set_local_value("this", this, None);
            argument_index = 1;
        }
        for (i, param) in decl.params.iter().enumerate() {
            let index = argument_index + u32::try_from(i).unwrap_or(u32::MAX);
            let value = self.add_value(ValueKind::Argument { index }, param.ty, &param.name);
            self.set_local_value(&param.name, value, None);
        }

        let Some(body) = &decl.body else {
            unreachable!("bodyless function enqueued for emission");
        };
        self.emit_block_stmts(body);
        self.end_scope();

        if !self.current_block_terminated() {
            let void = self.pool.void();
            self.push_inst(Inst::Return { values: Vec::new() }, void, "");
        }

        self.current_function = saved_function;
        self.insert_block = saved_block;
        self.current_kind = saved_kind;
    }

    // --- Scopes -----------------------------------------------------------

    pub(crate) fn begin_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Run the current scope's cleanup and discard it.
    pub(crate) fn end_scope(&mut self) {
        let index = self.scopes.len() - 1;
        self.run_scope_cleanup(index);
        self.scopes.pop();
    }

    /// Emit a scope's cleanup without discarding the scope: deferred
    /// expressions in reverse registration order, then pending destructor
    /// calls in reverse registration order, skipping moved-from
    /// declarations. A no-op when the current block is already
    /// terminated (a return already unwound this path).
    pub(crate) fn run_scope_cleanup(&mut self, index: usize) {
        if self.current_block_terminated() {
            return;
        }

        let deferred: Vec<_> = self.scopes[index]
            .deferred_exprs
            .iter()
            .rev()
            .cloned()
            .collect();
        for expr in &deferred {
            self.emit_expr_discard(expr);
        }

        let destructors: Vec<DeferredDestructor> = self.scopes[index]
            .destructors
            .iter()
            .rev()
            .cloned()
            .collect();
        for destructor in destructors {
            if destructor.moved.as_ref().is_some_and(|flag| flag.get()) {
                continue;
            }
            self.create_destructor_call(destructor.function, destructor.receiver);
        }
    }

    /// Unwind every scope for an early return, innermost first.
    pub(crate) fn emit_cleanup_for_return(&mut self) {
        for index in (0..self.scopes.len()).rev() {
            self.run_scope_cleanup(index);
        }
    }

    /// Bind a declaration's value in the current scope and, when the
    /// declaration owns a destructible value, defer its destructor call.
    pub(crate) fn set_local_value(&mut self, name: &str, value: ValueId, decl: Option<&VarDecl>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.values.insert(name.to_owned(), value);
        }
        if let Some(decl) = decl {
            self.defer_destructor_call(value, decl);
        }
    }

    fn defer_destructor_call(&mut self, receiver: ValueId, decl: &VarDecl) {
        let Some(proto) = self.destructor_proto_for(decl.ty()) else {
            return;
        };
        if let Some(scope) = self.scopes.last_mut() {
            scope.destructors.push(DeferredDestructor {
                function: proto,
                receiver,
                moved: Some(decl.moved_flag()),
            });
        }
    }

    /// The destructor to run for values of `ty`: the type's declared
    /// destructor, or a synthesized default destructor when any field's
    /// type declares one. `None` when no cleanup is needed.
    pub(crate) fn destructor_proto_for(&mut self, ty: Type) -> Option<FunctionId> {
        if !self.pool.is_basic(ty) {
            return None;
        }
        let name = self.pool.name(ty);
        let type_decl = self.type_decls.get(&name)?.clone();

        if let Some(destructor) = &type_decl.destructor {
            let decl = Rc::new(destructor.clone());
            return Some(self.function_proto(&decl));
        }

        let field_needs_cleanup = type_decl
            .fields
            .iter()
            .any(|field| self.declared_destructor_exists(field.ty));
        if field_needs_cleanup {
            let synthesized = Rc::new(FunctionDecl {
                name: "deinit".to_owned(),
                params: Vec::new(),
                return_types: Vec::new(),
                body: Some(Vec::new()),
                is_extern: false,
                kind: FunctionKind::Destructor {
                    type_name: type_decl.name.clone(),
                },
                location: type_decl.location,
            });
            return Some(self.function_proto(&synthesized));
        }
        None
    }

    /// Whether `ty` names a type with a *declared* destructor.
    pub(crate) fn declared_destructor_exists(&self, ty: Type) -> bool {
        if !self.pool.is_basic(ty) {
            return false;
        }
        let name = self.pool.name(ty);
        self.type_decls
            .get(&name)
            .is_some_and(|decl| decl.destructor.is_some())
    }

    /// Look up a declaration's value, innermost scope first; free
    /// functions and globals resolve when no local binding exists.
    pub(crate) fn get_value(&mut self, name: &str) -> ValueId {
        for scope in self.scopes.iter().rev() {
            if let Some(&value) = scope.values.get(name) {
                return value;
            }
        }
        if let Some(decl) = self.source_functions.get(name).cloned() {
            let id = self.function_proto(&decl);
            return self.function_ref_value(id);
        }
        if let Some(&(global, ty)) = self.global_vars.get(name) {
            let pointer = self.pool.pointer(ty, false, SourceLocation::DUMMY);
            return self.add_value(ValueKind::GlobalRef { global }, pointer, name);
        }
        panic!("unresolved identifier '{name}' reached IR generation");
    }

    // --- Module and value plumbing ----------------------------------------

    pub(crate) fn module(&self) -> &Module {
        match &self.module {
            Some(module) => module,
            None => panic!("no module emission in progress"),
        }
    }

    pub(crate) fn module_mut(&mut self) -> &mut Module {
        match &mut self.module {
            Some(module) => module,
            None => panic!("no module emission in progress"),
        }
    }

    pub(crate) fn cur_fn(&self) -> FunctionId {
        match self.current_function {
            Some(function) => function,
            None => panic!("no function emission in progress"),
        }
    }

    pub(crate) fn value_ty(&self, id: ValueId) -> Type {
        self.module().function(self.cur_fn()).value(id).ty
    }

    /// Mutability-erased type equality, the form every storage and call
    /// decision uses.
    pub(crate) fn types_equal_erased(&self, a: Type, b: Type) -> bool {
        self.pool.strip_mutable(a) == self.pool.strip_mutable(b)
    }

    pub(crate) fn add_value(&mut self, kind: ValueKind, ty: Type, name: &str) -> ValueId {
        let function = self.cur_fn();
        self.module_mut()
            .function_mut(function)
            .add_value(Value::new(kind, ty, name))
    }

    pub(crate) fn const_int(&mut self, ty: Type, value: i64) -> ValueId {
        self.add_value(ValueKind::ConstInt { value }, ty, "")
    }

    pub(crate) fn const_bool(&mut self, value: bool) -> ValueId {
        let ty = self.pool.bool();
        self.add_value(ValueKind::ConstBool { value }, ty, "")
    }

    pub(crate) fn undef(&mut self, ty: Type) -> ValueId {
        self.add_value(ValueKind::Undef, ty, "")
    }

    /// A direct reference to a function.
    pub(crate) fn function_ref_value(&mut self, function: FunctionId) -> ValueId {
        let (name, ty) = {
            let f = self.module().function(function);
            let params = f.params.iter().map(|p| p.ty).collect();
            (
                f.name.clone(),
                self.pool
                    .function(f.return_type, params, false, SourceLocation::DUMMY),
            )
        };
        self.add_value(ValueKind::FunctionRef { function }, ty, &name)
    }

    /// Append an instruction at the insertion point.
    pub(crate) fn push_inst(&mut self, inst: Inst, ty: Type, name: &str) -> ValueId {
        let function = self.cur_fn();
        let block = match self.insert_block {
            Some(block) => block,
            None => panic!("no insertion point set"),
        };
        let f = self.module_mut().function_mut(function);
        let id = f.add_value(Value::new(ValueKind::Inst(inst), ty, name));
        f.push_to_block(block, id);
        id
    }

    pub(crate) fn set_insert_point(&mut self, block: BlockId) {
        self.insert_block = Some(block);
    }

    pub(crate) fn current_block_terminated(&self) -> bool {
        match self.insert_block {
            Some(block) => self
                .module()
                .function(self.cur_fn())
                .block_is_terminated(block),
            None => true,
        }
    }

    /// Create a block attached at the current end of the block order.
    pub(crate) fn create_attached_block(&mut self, label: &str) -> BlockId {
        let function = self.cur_fn();
        self.module_mut().function_mut(function).add_block(label)
    }

    /// Create a detached block, to be attached at its control-flow
    /// position.
    pub(crate) fn create_detached_block(&mut self, label: &str) -> BlockId {
        let function = self.cur_fn();
        self.module_mut().function_mut(function).create_block(label)
    }

    pub(crate) fn attach_block(&mut self, block: BlockId) {
        let function = self.cur_fn();
        self.module_mut().function_mut(function).append_block(block);
    }

    // --- Instruction builders ---------------------------------------------

    /// Stack slot in the entry block.
    pub(crate) fn create_entry_block_alloca(&mut self, ty: Type, name: &str) -> ValueId {
        let function = self.cur_fn();
        let entry = match self.module().function(function).entry_block() {
            Some(entry) => entry,
            None => panic!("alloca requires an entry block"),
        };
        let pointer = self.pool.pointer(ty, false, SourceLocation::DUMMY);
        let f = self.module_mut().function_mut(function);
        let id = f.add_value(Value::new(ValueKind::Inst(Inst::Alloca), pointer, name));
        f.push_to_block(entry, id);
        id
    }

    /// Spill a value into a fresh stack slot, yielding its address.
    pub(crate) fn create_temp_alloca(&mut self, value: ValueId, name: &str) -> ValueId {
        let ty = self.value_ty(value);
        let alloca = self.create_entry_block_alloca(ty, name);
        self.create_store(value, alloca);
        alloca
    }

    pub(crate) fn create_load(&mut self, ptr: ValueId) -> ValueId {
        let pointee = self.pool.pointee(self.value_ty(ptr));
        self.push_inst(Inst::Load { ptr }, pointee, "")
    }

    pub(crate) fn create_store(&mut self, value: ValueId, ptr: ValueId) {
        let ptr_ty = self.value_ty(ptr);
        debug_assert!(self.pool.is_pointer(ptr_ty), "store target must be a pointer");
        debug_assert!(
            self.types_equal_erased(self.pool.pointee(ptr_ty), self.value_ty(value)),
            "store of mismatched type"
        );
        let void = self.pool.void();
        self.push_inst(Inst::Store { value, ptr }, void, "");
    }

    pub(crate) fn create_call(&mut self, callee: ValueId, args: Vec<ValueId>) -> ValueId {
        let return_type = match &self.module().function(self.cur_fn()).value(callee).kind {
            ValueKind::FunctionRef { function } => self.module().function(*function).return_type,
            _ => {
                let ty = self.pool.remove_pointer(self.value_ty(callee));
                self.pool.return_type(ty)
            }
        };
        self.push_inst(Inst::Call { callee, args }, return_type, "")
    }

    /// Call a destructor, spilling a non-addressable receiver first.
    pub(crate) fn create_destructor_call(&mut self, destructor: FunctionId, receiver: ValueId) {
        let receiver = if self.pool.is_pointer(self.value_ty(receiver)) {
            receiver
        } else {
            self.create_temp_alloca(receiver, "")
        };
        let callee = self.function_ref_value(destructor);
        self.create_call(callee, vec![receiver]);
    }

    pub(crate) fn create_br(&mut self, target: BlockId) {
        let void = self.pool.void();
        self.push_inst(Inst::Branch { target }, void, "");
    }

    pub(crate) fn create_cond_br(
        &mut self,
        condition: ValueId,
        true_target: BlockId,
        false_target: BlockId,
    ) {
        let void = self.pool.void();
        self.push_inst(
            Inst::CondBranch {
                condition,
                true_target,
                false_target,
            },
            void,
            "",
        );
    }

    pub(crate) fn create_phi(
        &mut self,
        incoming: Vec<(ValueId, BlockId)>,
        name: &str,
    ) -> ValueId {
        let ty = match incoming.first() {
            Some(&(value, _)) => self.value_ty(value),
            None => panic!("phi requires at least one incoming value"),
        };
        self.push_inst(Inst::Phi { incoming }, ty, name)
    }

    /// Intern a string literal as a module global.
    pub(crate) fn create_global_string(&mut self, contents: String) -> ValueId {
        let name = format!("str.{}", self.string_count);
        self.string_count += 1;
        let ty = self
            .pool
            .pointer(self.pool.char(), false, SourceLocation::DUMMY);
        let global = self.module_mut().add_global(GlobalVariable {
            name,
            ty,
            init: GlobalInit::String(contents),
        });
        self.add_value(ValueKind::ConstString { global }, ty, "")
    }
}
