use pretty_assertions::assert_eq;
use vela_ast::{BinaryOp, SourceLocation};
use vela_types::TypePool;

use super::*;
use crate::module::{GlobalVariable, Param};
use crate::value::ValueKind;

#[test]
fn renders_a_small_module() {
    let pool = TypePool::new();
    let mut module = Module::new("demo");

    let mut function = Function::new(
        "add_one",
        vec![Param {
            name: "x".to_owned(),
            ty: pool.int(),
        }],
        pool.int(),
        false,
    );
    let entry = function.add_block("entry");
    let arg = function.add_value(Value::new(
        ValueKind::Argument { index: 0 },
        pool.int(),
        "x",
    ));
    let one = function.add_value(Value::new(ValueKind::ConstInt { value: 1 }, pool.int(), ""));
    let sum = function.add_value(Value::new(
        ValueKind::Inst(Inst::Binary {
            op: BinaryOp::Add,
            lhs: arg,
            rhs: one,
        }),
        pool.int(),
        "",
    ));
    function.push_to_block(entry, sum);
    let ret = function.add_value(Value::new(
        ValueKind::Inst(Inst::Return { values: vec![sum] }),
        pool.void(),
        "",
    ));
    function.push_to_block(entry, ret);
    module.add_function(function);

    let text = module.display(&pool).to_string();
    let expected = "\
module demo {
  define @add_one(int %x) -> int {
  b0: ; entry
    %2 = %x + 1
    ret %2
  }
}";
    assert_eq!(text, expected);
}

#[test]
fn rendering_is_deterministic() {
    let pool = TypePool::new();
    let mut module = Module::new("demo");
    module.add_global(GlobalVariable {
        name: "str.0".to_owned(),
        ty: pool.pointer(pool.char(), false, SourceLocation::DUMMY),
        init: GlobalInit::String("hello".to_owned()),
    });
    module.add_function(Function::new("f", Vec::new(), pool.void(), true));

    let first = module.display(&pool).to_string();
    let second = module.display(&pool).to_string();
    assert_eq!(first, second);
    assert!(first.contains("global @str.0 = \"hello\""));
    assert!(first.contains("declare @f() -> void"));
}
