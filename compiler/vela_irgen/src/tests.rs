use pretty_assertions::assert_eq;
use vela_ast::{
    CallExpr, Decl, Expr, ExprKind, FieldDecl, FunctionDecl, FunctionKind, FunctionTemplate,
    LambdaExpr, Module as AstModule, ParamDecl, SourceLocation, Stmt, StmtKind, Type, TypeDecl,
    TypeDeclKind, VarDecl,
};
use vela_ir::{Function, Inst, Module, ValueId, ValueKind};
use vela_typeck::TypeChecker;
use vela_types::TypePool;

use super::generator::IrGenerator;

fn loc() -> SourceLocation {
    SourceLocation::DUMMY
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, loc())
}

fn int(value: i128) -> Expr {
    expr(ExprKind::IntLiteral(value))
}

fn boolean(value: bool) -> Expr {
    expr(ExprKind::BoolLiteral(value))
}

fn var(name: &str) -> Expr {
    expr(ExprKind::Var(name.to_owned()))
}

fn call(callee: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call(CallExpr {
        callee: callee.to_owned(),
        receiver: None,
        args,
        generic_args: Vec::new(),
        is_move_init: false,
    }))
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, loc())
}

fn let_stmt(name: &str, initializer: Expr) -> Stmt {
    stmt(StmtKind::Var(VarDecl::new(
        name, None, false, initializer, loc(),
    )))
}

fn function(name: &str, params: Vec<ParamDecl>, return_types: Vec<Type>, body: Vec<Stmt>) -> Decl {
    Decl::Function(FunctionDecl {
        name: name.to_owned(),
        params,
        return_types,
        body: Some(body),
        is_extern: false,
        kind: FunctionKind::Free,
        location: loc(),
    })
}

fn extern_function(name: &str, params: Vec<ParamDecl>, return_types: Vec<Type>) -> Decl {
    Decl::Function(FunctionDecl {
        name: name.to_owned(),
        params,
        return_types,
        body: None,
        is_extern: true,
        kind: FunctionKind::Free,
        location: loc(),
    })
}

/// A `Res` struct with a no-argument constructor and a destructor.
fn resource_type() -> Decl {
    Decl::Type(TypeDecl {
        name: "Res".to_owned(),
        kind: TypeDeclKind::Struct,
        fields: Vec::new(),
        methods: Vec::new(),
        constructors: vec![FunctionDecl {
            name: "init".to_owned(),
            params: Vec::new(),
            return_types: Vec::new(),
            body: Some(Vec::new()),
            is_extern: false,
            kind: FunctionKind::Constructor {
                type_name: "Res".to_owned(),
            },
            location: loc(),
        }],
        destructor: Some(FunctionDecl {
            name: "deinit".to_owned(),
            params: Vec::new(),
            return_types: Vec::new(),
            body: Some(Vec::new()),
            is_extern: false,
            kind: FunctionKind::Destructor {
                type_name: "Res".to_owned(),
            },
            location: loc(),
        }),
        location: loc(),
    })
}

fn ast_module(decls: Vec<Decl>) -> AstModule {
    let mut module = AstModule::new("test", "src/test.vela");
    module.decls = decls;
    module
}

/// Type-check and emit.
fn emit(pool: &TypePool, decls: Vec<Decl>) -> Module {
    let source = ast_module(decls);
    TypeChecker::new(pool).check_module(&source).unwrap();
    IrGenerator::new(pool).emit_module(&source)
}

fn find_function<'m>(module: &'m Module, name: &str) -> &'m Function {
    match module.functions().find(|(_, f)| f.name == name) {
        Some((_, f)) => f,
        None => panic!("no function named '{name}' in module"),
    }
}

/// All calls in a function, in block order: (callee name, arguments).
fn calls_in(module: &Module, function: &Function) -> Vec<(String, Vec<ValueId>)> {
    let mut calls = Vec::new();
    for (_, block) in function.blocks() {
        for &id in &block.instructions {
            if let ValueKind::Inst(Inst::Call { callee, args }) = &function.value(id).kind {
                if let ValueKind::FunctionRef { function: target } = &function.value(*callee).kind
                {
                    calls.push((module.function(*target).name.clone(), args.clone()));
                }
            }
        }
    }
    calls
}

#[test]
fn destructors_run_in_reverse_declaration_order() {
    let pool = TypePool::new();
    let module = emit(
        &pool,
        vec![
            resource_type(),
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![
                    let_stmt("a", call("Res", Vec::new())),
                    let_stmt("b", call("Res", Vec::new())),
                    let_stmt("c", call("Res", Vec::new())),
                ],
            ),
        ],
    );

    let main = find_function(&module, "main");
    let receivers: Vec<String> = calls_in(&module, main)
        .into_iter()
        .filter(|(name, _)| name == "Res.deinit")
        .map(|(_, args)| main.value(args[0]).name.clone())
        .collect();
    assert_eq!(receivers, vec!["c", "b", "a"]);
}

#[test]
fn moved_from_declarations_are_skipped_in_order() {
    let pool = TypePool::new();

    let b_decl = VarDecl::new("b", None, false, call("Res", Vec::new()), loc());
    let b_moved = b_decl.moved_flag();
    let source = ast_module(vec![
        resource_type(),
        function(
            "main",
            Vec::new(),
            Vec::new(),
            vec![
                let_stmt("a", call("Res", Vec::new())),
                stmt(StmtKind::Var(b_decl)),
                let_stmt("c", call("Res", Vec::new())),
            ],
        ),
    ]);

    TypeChecker::new(&pool).check_module(&source).unwrap();
    // The checker's move analysis would set this; mark it directly.
    b_moved.set(true);
    let module = IrGenerator::new(&pool).emit_module(&source);

    let main = find_function(&module, "main");
    let receivers: Vec<String> = calls_in(&module, main)
        .into_iter()
        .filter(|(name, _)| name == "Res.deinit")
        .map(|(_, args)| main.value(args[0]).name.clone())
        .collect();
    assert_eq!(receivers, vec!["c", "a"]);
}

#[test]
fn logical_and_short_circuits() {
    let pool = TypePool::new();
    let and_expr = expr(ExprKind::Binary {
        op: vela_ast::BinaryOp::And,
        lhs: Box::new(var("a")),
        rhs: Box::new(call("g", Vec::new())),
    });
    let module = emit(
        &pool,
        vec![
            function(
                "g",
                Vec::new(),
                vec![pool.bool()],
                vec![stmt(StmtKind::Return(vec![boolean(true)]))],
            ),
            function(
                "f",
                vec![ParamDecl::new("a", pool.bool(), loc())],
                vec![pool.bool()],
                vec![stmt(StmtKind::Return(vec![and_expr]))],
            ),
        ],
    );

    let f = find_function(&module, "f");
    let labels: Vec<&str> = f.blocks().map(|(_, b)| b.label.as_str()).collect();
    assert_eq!(labels, vec!["entry", "and.rhs", "and.end"]);

    // No call on the entry path: `g` only evaluates in the rhs block.
    let mut blocks = f.blocks();
    let (entry_id, entry) = blocks.next().unwrap();
    let (rhs_id, rhs) = blocks.next().unwrap();
    let (_, end) = blocks.next().unwrap();

    let is_call = |block: &vela_ir::BasicBlock| {
        block
            .instructions
            .iter()
            .any(|&id| matches!(f.value(id).kind, ValueKind::Inst(Inst::Call { .. })))
    };
    assert!(!is_call(entry));
    assert!(is_call(rhs));

    // The join selects by originating block.
    let phi = end.instructions.first().copied().unwrap();
    let ValueKind::Inst(Inst::Phi { incoming }) = &f.value(phi).kind else {
        panic!("end block must start with the join phi");
    };
    assert_eq!(incoming[0].1, entry_id);
    assert_eq!(incoming[1].1, rhs_id);
}

#[test]
fn aggregate_literals_insert_in_declaration_order() {
    let pool = TypePool::new();
    let tuple = expr(ExprKind::TupleLiteral(vec![
        vela_ast::TupleLiteralElement {
            name: "x".to_owned(),
            value: int(1),
        },
        vela_ast::TupleLiteralElement {
            name: "y".to_owned(),
            value: int(2),
        },
        vela_ast::TupleLiteralElement {
            name: "z".to_owned(),
            value: int(3),
        },
    ]));
    let module = emit(
        &pool,
        vec![function(
            "main",
            Vec::new(),
            Vec::new(),
            vec![let_stmt("t", tuple)],
        )],
    );

    let main = find_function(&module, "main");
    let mut indices = Vec::new();
    for (_, block) in main.blocks() {
        for &id in &block.instructions {
            if let ValueKind::Inst(Inst::InsertValue { index, .. }) = &main.value(id).kind {
                indices.push(*index);
            }
        }
    }
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn deferred_exprs_run_reversed_before_destructors() {
    let pool = TypePool::new();
    let module = emit(
        &pool,
        vec![
            resource_type(),
            extern_function("g", vec![ParamDecl::new("x", pool.int(), loc())], Vec::new()),
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![
                    stmt(StmtKind::Defer(call("g", vec![int(1)]))),
                    stmt(StmtKind::Defer(call("g", vec![int(2)]))),
                    let_stmt("a", call("Res", Vec::new())),
                ],
            ),
        ],
    );

    let main = find_function(&module, "main");
    let calls = calls_in(&module, main);
    let names: Vec<&str> = calls.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Res.init", "g", "g", "Res.deinit"]);

    // Reverse registration order: g(2) before g(1).
    let first_arg = |index: usize| match main.value(calls[index].1[0]).kind {
        ValueKind::ConstInt { value } => value,
        ref other => panic!("expected a constant argument, got {other:?}"),
    };
    assert_eq!(first_arg(1), 2);
    assert_eq!(first_arg(2), 1);
}

#[test]
fn assert_lowers_to_fail_and_success_blocks() {
    let pool = TypePool::new();
    let assert_call = Expr::new(
        ExprKind::Call(CallExpr {
            callee: "assert".to_owned(),
            receiver: None,
            args: vec![boolean(true)],
            generic_args: Vec::new(),
            is_move_init: false,
        }),
        SourceLocation::new(3, 5),
    );
    let module = emit(
        &pool,
        vec![function(
            "main",
            Vec::new(),
            Vec::new(),
            vec![stmt(StmtKind::Expr(assert_call))],
        )],
    );

    let main = find_function(&module, "main");
    let labels: Vec<&str> = main.blocks().map(|(_, b)| b.label.as_str()).collect();
    assert_eq!(labels, vec!["entry", "assert.fail", "assert.success"]);

    let (_, fail) = main.blocks().nth(1).unwrap();
    let last = fail.instructions.last().copied().unwrap();
    assert!(matches!(
        main.value(last).kind,
        ValueKind::Inst(Inst::Unreachable)
    ));
    let fail_calls: Vec<String> = calls_in(&module, main)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(fail_calls, vec!["assert_fail"]);

    // The message carries file basename, line, and column.
    let message = module
        .globals()
        .find_map(|(_, g)| match &g.init {
            vela_ir::GlobalInit::String(text) => Some(text.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(message, "Assertion failed at test.vela:3:5\n");
}

#[test]
fn if_expression_joins_on_post_emission_blocks() {
    let pool = TypePool::new();
    let inner = expr(ExprKind::If {
        condition: Box::new(var("d")),
        then_value: Box::new(int(1)),
        else_value: Box::new(int(2)),
    });
    let outer = expr(ExprKind::If {
        condition: Box::new(var("c")),
        then_value: Box::new(inner),
        else_value: Box::new(int(3)),
    });
    let module = emit(
        &pool,
        vec![function(
            "f",
            vec![
                ParamDecl::new("c", pool.bool(), loc()),
                ParamDecl::new("d", pool.bool(), loc()),
            ],
            vec![pool.int()],
            vec![stmt(StmtKind::Return(vec![outer]))],
        )],
    );

    let f = find_function(&module, "f");
    // The outer end block is the last attached block; its phi's then-arm
    // incoming block is the *inner* join block, where the arm's emission
    // ended, not the outer then block where it started.
    let (_, outer_end) = f.blocks().last().unwrap();
    let phi = outer_end.instructions.first().copied().unwrap();
    let ValueKind::Inst(Inst::Phi { incoming }) = &f.value(phi).kind else {
        panic!("outer end block must start with the join phi");
    };
    let then_incoming_label = &f.block(incoming[0].1).label;
    assert_eq!(then_incoming_label, "if.end");
}

#[test]
fn early_return_unwinds_scopes_once() {
    let pool = TypePool::new();
    let module = emit(
        &pool,
        vec![
            resource_type(),
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![
                    let_stmt("a", call("Res", Vec::new())),
                    stmt(StmtKind::Return(Vec::new())),
                ],
            ),
        ],
    );

    let main = find_function(&module, "main");
    let deinit_count = calls_in(&module, main)
        .iter()
        .filter(|(name, _)| name == "Res.deinit")
        .count();
    assert_eq!(deinit_count, 1);

    // The cleanup precedes the terminator.
    let (_, entry) = main.blocks().next().unwrap();
    let last = entry.instructions.last().copied().unwrap();
    assert!(matches!(
        main.value(last).kind,
        ValueKind::Inst(Inst::Return { .. })
    ));
}

#[test]
fn break_unwinds_loop_scopes() {
    let pool = TypePool::new();
    let module = emit(
        &pool,
        vec![
            resource_type(),
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![stmt(StmtKind::While {
                    condition: boolean(true),
                    body: vec![
                        let_stmt("a", call("Res", Vec::new())),
                        stmt(StmtKind::Break),
                    ],
                })],
            ),
        ],
    );

    let main = find_function(&module, "main");
    let labels: Vec<&str> = main.blocks().map(|(_, b)| b.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["entry", "while.cond", "while.body", "while.end"]
    );

    // The loop body destroys its resource before branching out.
    let (_, body) = main.blocks().nth(2).unwrap();
    let kinds: Vec<String> = body
        .instructions
        .iter()
        .filter_map(|&id| match &main.value(id).kind {
            ValueKind::Inst(Inst::Call { callee, .. }) => {
                match &main.value(*callee).kind {
                    ValueKind::FunctionRef { function } => {
                        Some(module.function(*function).name.clone())
                    }
                    _ => None,
                }
            }
            ValueKind::Inst(Inst::Branch { .. }) => Some("br".to_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec!["Res.init", "Res.deinit", "br"]);
}

#[test]
fn template_instantiation_is_mangled_and_deduplicated() {
    let pool = TypePool::new();
    let placeholder = pool.basic("T", Vec::new(), false, loc());
    let template = Decl::FunctionTemplate(FunctionTemplate {
        generic_params: vec!["T".to_owned()],
        function: FunctionDecl {
            name: "identity".to_owned(),
            params: vec![ParamDecl::new("value", placeholder, loc())],
            return_types: vec![placeholder],
            body: Some(vec![stmt(StmtKind::Return(vec![var("value")]))]),
            is_extern: false,
            kind: FunctionKind::Free,
            location: loc(),
        },
    });
    let generic_call = |value: i128| {
        expr(ExprKind::Call(CallExpr {
            callee: "identity".to_owned(),
            receiver: None,
            args: vec![int(value)],
            generic_args: vec![pool.int()],
            is_move_init: false,
        }))
    };
    let module = emit(
        &pool,
        vec![
            template,
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![
                    let_stmt("a", generic_call(3)),
                    let_stmt("b", generic_call(4)),
                ],
            ),
        ],
    );

    let instances: Vec<&Function> = module
        .functions()
        .filter(|(_, f)| f.name == "identity<int>")
        .map(|(_, f)| f)
        .collect();
    assert_eq!(instances.len(), 1);

    let instance = instances[0];
    assert_eq!(instance.params[0].ty, pool.int());
    assert_eq!(instance.return_type, pool.int());
    assert!(!instance.body_is_empty());
}

#[test]
fn lambdas_lower_to_synthesized_functions() {
    let pool = TypePool::new();
    let callback_ty = pool.function(pool.int(), vec![pool.int()], false, loc());
    let lambda = expr(ExprKind::Lambda(LambdaExpr {
        params: vec![ParamDecl::new("x", pool.int(), loc())],
        return_type: pool.int(),
        body: vec![stmt(StmtKind::Return(vec![var("x")]))],
    }));
    let module = emit(
        &pool,
        vec![
            extern_function(
                "apply",
                vec![ParamDecl::new("cb", callback_ty, loc())],
                Vec::new(),
            ),
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![stmt(StmtKind::Expr(call("apply", vec![lambda])))],
            ),
        ],
    );

    let synthesized = find_function(&module, "__lambda0");
    assert!(!synthesized.body_is_empty());

    let main = find_function(&module, "main");
    let calls = calls_in(&module, main);
    assert_eq!(calls.len(), 1);
    let (name, args) = &calls[0];
    assert_eq!(name, "apply");
    assert!(matches!(
        main.value(args[0]).kind,
        ValueKind::FunctionRef { .. }
    ));
}

#[test]
fn constructor_calls_reuse_the_variable_slot() {
    let pool = TypePool::new();
    let point = Decl::Type(TypeDecl {
        name: "Point".to_owned(),
        kind: TypeDeclKind::Struct,
        fields: vec![FieldDecl {
            name: "x".to_owned(),
            ty: pool.int(),
            location: loc(),
        }],
        methods: Vec::new(),
        constructors: vec![FunctionDecl {
            name: "init".to_owned(),
            params: vec![ParamDecl::new("x", pool.int(), loc())],
            return_types: Vec::new(),
            body: Some(vec![stmt(StmtKind::Assign {
                target: expr(ExprKind::Member {
                    base: Box::new(var("this")),
                    member: "x".to_owned(),
                }),
                value: var("x"),
            })]),
            is_extern: false,
            kind: FunctionKind::Constructor {
                type_name: "Point".to_owned(),
            },
            location: loc(),
        }],
        destructor: None,
        location: loc(),
    });
    let module = emit(
        &pool,
        vec![
            point,
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![let_stmt("p", call("Point", vec![int(5)]))],
            ),
        ],
    );

    let main = find_function(&module, "main");
    let calls = calls_in(&module, main);
    assert_eq!(calls.len(), 1);
    let (name, args) = &calls[0];
    assert_eq!(name, "Point.init");
    // The receiver is the variable's own slot, not a fresh temporary.
    assert_eq!(main.value(args[0]).name, "p");

    // The constructor body initializes the field through the receiver.
    let init = find_function(&module, "Point.init");
    let has_field_store = init.blocks().any(|(_, block)| {
        block
            .instructions
            .iter()
            .any(|&id| matches!(init.value(id).kind, ValueKind::Inst(Inst::FieldAddr { .. })))
    });
    assert!(has_field_store);
}

#[test]
fn multi_value_return_emits_all_values() {
    let pool = TypePool::new();
    let module = emit(
        &pool,
        vec![function(
            "pair",
            Vec::new(),
            vec![pool.int(), pool.bool()],
            vec![stmt(StmtKind::Return(vec![int(1), boolean(true)]))],
        )],
    );

    let pair = find_function(&module, "pair");
    assert!(pool.is_tuple(pair.return_type));
    let (_, entry) = pair.blocks().next().unwrap();
    let last = entry.instructions.last().copied().unwrap();
    let ValueKind::Inst(Inst::Return { values }) = &pair.value(last).kind else {
        panic!("entry must end in a return");
    };
    assert_eq!(values.len(), 2);
}

#[test]
fn global_variables_are_emitted_and_addressable() {
    let pool = TypePool::new();
    let module = emit(
        &pool,
        vec![
            Decl::Var(VarDecl::new("answer", None, false, int(42), loc())),
            function(
                "main",
                Vec::new(),
                Vec::new(),
                vec![let_stmt("x", var("answer"))],
            ),
        ],
    );

    assert!(module.globals().any(|(_, g)| g.name == "answer"));
    let main = find_function(&module, "main");
    let has_load = main.blocks().any(|(_, block)| {
        block
            .instructions
            .iter()
            .any(|&id| matches!(main.value(id).kind, ValueKind::Inst(Inst::Load { .. })))
    });
    assert!(has_load);
}

#[test]
fn starting_a_second_module_mid_emission_panics() {
    let pool = TypePool::new();
    let source = ast_module(vec![function("main", Vec::new(), Vec::new(), Vec::new())]);
    TypeChecker::new(&pool).check_module(&source).unwrap();

    let mut generator = IrGenerator::new(&pool);
    let first = generator.emit_module(&source);
    assert!(first.functions().any(|(_, f)| f.name == "main"));

    // Emission finished, so a second module is fine.
    let second = generator.emit_module(&source);
    assert!(second.functions().any(|(_, f)| f.name == "main"));
}
