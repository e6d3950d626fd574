use pretty_assertions::assert_eq;
use vela_types::TypePool;

use super::*;
use crate::value::{Inst, Value, ValueKind};

#[test]
fn block_attachment_order_is_control_flow_order() {
    let pool = TypePool::new();
    let mut function = Function::new("f", Vec::new(), pool.void(), false);

    let entry = function.add_block("entry");
    // Created early, attached later, as the if-expression emitter does.
    let else_block = function.create_block("if.else");
    let end_block = function.create_block("if.end");
    let then_block = function.add_block("if.then");
    function.append_block(else_block);
    function.append_block(end_block);

    let order: Vec<BlockId> = function.blocks().map(|(id, _)| id).collect();
    assert_eq!(order, vec![entry, then_block, else_block, end_block]);
    assert_eq!(function.entry_block(), Some(entry));
}

#[test]
fn prototypes_have_empty_bodies() {
    let pool = TypePool::new();
    let mut function = Function::new("f", Vec::new(), pool.void(), false);
    assert!(function.body_is_empty());

    function.add_block("entry");
    assert!(!function.body_is_empty());
}

#[test]
fn terminated_blocks_are_detected() {
    let pool = TypePool::new();
    let mut function = Function::new("f", Vec::new(), pool.void(), false);
    let entry = function.add_block("entry");
    assert!(!function.block_is_terminated(entry));

    let ret = function.add_value(Value::new(
        ValueKind::Inst(Inst::Return { values: Vec::new() }),
        pool.void(),
        "",
    ));
    function.push_to_block(entry, ret);
    assert!(function.block_is_terminated(entry));
}

#[test]
fn module_preserves_insertion_order() {
    let pool = TypePool::new();
    let mut module = Module::new("m");

    module.add_function(Function::new("first", Vec::new(), pool.void(), false));
    module.add_function(Function::new("second", Vec::new(), pool.void(), false));
    module.add_global(GlobalVariable {
        name: "str.0".to_owned(),
        ty: pool.pointer(pool.char(), false, vela_ast::SourceLocation::DUMMY),
        init: GlobalInit::String("hi".to_owned()),
    });

    let names: Vec<&str> = module.functions().map(|(_, f)| f.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
    assert_eq!(module.globals().count(), 1);
}

#[test]
fn values_are_referenced_by_identity() {
    let pool = TypePool::new();
    let mut function = Function::new("f", Vec::new(), pool.void(), false);

    let a = function.add_value(Value::new(
        ValueKind::ConstInt { value: 1 },
        pool.int(),
        "",
    ));
    let b = function.add_value(Value::new(
        ValueKind::ConstInt { value: 1 },
        pool.int(),
        "",
    ));

    // Two productions are two values; identity is the handle.
    assert_ne!(a, b);
}
