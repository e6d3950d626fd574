//! Module, function, and basic-block containers.

use vela_ast::Type;

use crate::value::{Value, ValueId};

#[cfg(test)]
mod tests;

/// Handle to a function in a module.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionId(u32);

impl FunctionId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a global variable in a module.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GlobalId(u32);

impl GlobalId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a basic block in a function's block arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BlockId(u32);

impl BlockId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A basic block: a label and its ordered instructions.
#[derive(Clone, Debug)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<ValueId>,
}

/// A function parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// A function: a value arena, a block arena, and the block attachment
/// order.
///
/// Blocks are created detached and appended at their control-flow
/// position; the attachment order is the linearization order for the
/// backend. The first attached block is the entry block.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub is_extern: bool,
    values: Vec<Value>,
    blocks: Vec<BasicBlock>,
    block_order: Vec<BlockId>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: Type,
        is_extern: bool,
    ) -> Self {
        Function {
            name: name.into(),
            params,
            return_type,
            is_extern,
            values: Vec::new(),
            blocks: Vec::new(),
            block_order: Vec::new(),
        }
    }

    /// Add a value to the arena.
    pub fn add_value(&mut self, value: Value) -> ValueId {
        let id = match u32::try_from(self.values.len()) {
            Ok(raw) => ValueId::from_raw(raw),
            Err(_) => panic!("function exceeded u32::MAX values"),
        };
        self.values.push(value);
        id
    }

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    /// Create a detached block. Attach it with [`Function::append_block`]
    /// at its control-flow position.
    pub fn create_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = match u32::try_from(self.blocks.len()) {
            Ok(raw) => BlockId(raw),
            Err(_) => panic!("function exceeded u32::MAX blocks"),
        };
        self.blocks.push(BasicBlock {
            label: label.into(),
            instructions: Vec::new(),
        });
        id
    }

    /// Attach a block at the end of the block order.
    pub fn append_block(&mut self, id: BlockId) {
        debug_assert!(
            !self.block_order.contains(&id),
            "block attached twice: {id:?}"
        );
        self.block_order.push(id);
    }

    /// Create a block and attach it immediately.
    pub fn add_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = self.create_block(label);
        self.append_block(id);
        id
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.index()]
    }

    /// The entry block: the first attached block.
    pub fn entry_block(&self) -> Option<BlockId> {
        self.block_order.first().copied()
    }

    /// Attached blocks in control-flow order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BasicBlock)> {
        self.block_order.iter().map(|&id| (id, self.block(id)))
    }

    /// Whether no block has been attached yet; prototypes awaiting their
    /// body satisfy this.
    pub fn body_is_empty(&self) -> bool {
        self.block_order.is_empty()
    }

    /// Append an instruction value to a block.
    pub fn push_to_block(&mut self, block: BlockId, value: ValueId) {
        self.blocks[block.index()].instructions.push(value);
    }

    /// Whether a block already ends in a terminator.
    pub fn block_is_terminated(&self, block: BlockId) -> bool {
        self.blocks[block.index()]
            .instructions
            .last()
            .is_some_and(|&id| self.value(id).is_terminator())
    }
}

/// A global variable's initializer.
#[derive(Clone, Debug)]
pub enum GlobalInit {
    Int(i64),
    Bool(bool),
    String(String),
}

/// A module-level global.
#[derive(Clone, Debug)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: Type,
    pub init: GlobalInit,
}

/// An IR module: named, ordered functions and globals, handed off to an
/// external backend.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: String,
    functions: Vec<Function>,
    globals: Vec<GlobalVariable>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            functions: Vec::new(),
            globals: Vec::new(),
        }
    }

    /// Add a function; insertion order is preserved.
    pub fn add_function(&mut self, function: Function) -> FunctionId {
        let id = match u32::try_from(self.functions.len()) {
            Ok(raw) => FunctionId(raw),
            Err(_) => panic!("module exceeded u32::MAX functions"),
        };
        self.functions.push(function);
        id
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Functions in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    /// Add a global; insertion order is preserved.
    pub fn add_global(&mut self, global: GlobalVariable) -> GlobalId {
        let id = match u32::try_from(self.globals.len()) {
            Ok(raw) => GlobalId(raw),
            Err(_) => panic!("module exceeded u32::MAX globals"),
        };
        self.globals.push(global);
        id
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVariable {
        &self.globals[id.index()]
    }

    /// Globals in insertion order.
    pub fn globals(&self) -> impl Iterator<Item = (GlobalId, &GlobalVariable)> {
        self.globals
            .iter()
            .enumerate()
            .map(|(i, g)| (GlobalId(i as u32), g))
    }
}
