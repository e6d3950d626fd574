//! Intermediate representation for the Vela compiler.
//!
//! A basic-block IR: a [`Module`] owns functions and global variables in
//! insertion order; a [`Function`] owns its values and basic blocks, with
//! the block *attachment* order equal to control-flow order (the first
//! attached block is the entry block and receives all allocas); a
//! [`BasicBlock`] owns its ordered instructions.
//!
//! Everything is addressed by arena-indexed handles ([`ValueId`],
//! [`BlockId`], [`FunctionId`], [`GlobalId`]) rather than pointers.
//! Values are produced once and referenced by id thereafter.
//!
//! Blocks may exist detached from the block order: control-flow emission
//! creates the `else`/`end` blocks of an if-expression up front and
//! appends each at its control-flow position.
//!
//! The module printer renders a deterministic textual form for tests and
//! debugging; an external backend consumes the module for native code
//! emission.

mod module;
mod print;
mod value;

pub use module::{
    BasicBlock, BlockId, Function, FunctionId, GlobalId, GlobalInit, GlobalVariable, Module, Param,
};
pub use print::ModuleDisplay;
pub use value::{Inst, Value, ValueId, ValueKind};
