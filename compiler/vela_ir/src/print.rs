//! Deterministic textual rendering of a module.
//!
//! The format is for tests and debugging; the backend consumes the module
//! structurally. Values print as `%N` (their arena index), constants
//! print inline, blocks print as `bN` with their label as a trailing
//! comment.

use std::fmt;

use vela_types::TypePool;

use crate::module::{Function, GlobalInit, Module};
use crate::value::{Inst, Value, ValueId, ValueKind};

#[cfg(test)]
mod tests;

/// Display adapter tying a module to the pool its types live in.
pub struct ModuleDisplay<'a> {
    module: &'a Module,
    pool: &'a TypePool,
}

impl Module {
    /// Render the module. Needs the pool to print types.
    pub fn display<'a>(&'a self, pool: &'a TypePool) -> ModuleDisplay<'a> {
        ModuleDisplay { module: self, pool }
    }
}

impl fmt::Display for ModuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {} {{", self.module.name)?;

        for (_, global) in self.module.globals() {
            match &global.init {
                GlobalInit::Int(value) => {
                    writeln!(
                        f,
                        "  global @{}: {} = {value}",
                        global.name,
                        self.pool.display(global.ty)
                    )?;
                }
                GlobalInit::Bool(value) => {
                    writeln!(
                        f,
                        "  global @{}: {} = {value}",
                        global.name,
                        self.pool.display(global.ty)
                    )?;
                }
                GlobalInit::String(value) => {
                    writeln!(f, "  global @{} = {value:?}", global.name)?;
                }
            }
        }

        for (_, function) in self.module.functions() {
            self.print_function(f, function)?;
        }

        write!(f, "}}")
    }
}

impl ModuleDisplay<'_> {
    fn print_function(&self, f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
        let keyword = if function.is_extern || function.body_is_empty() {
            "declare"
        } else {
            "define"
        };
        write!(f, "  {keyword} @{}(", function.name)?;
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} %{}", self.pool.display(param.ty), param.name)?;
        }
        write!(f, ") -> {}", self.pool.display(function.return_type))?;

        if function.body_is_empty() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for (block_id, block) in function.blocks() {
            write!(f, "  b{}:", block_id.index())?;
            if block.label.is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, " ; {}", block.label)?;
            }
            for &inst_id in &block.instructions {
                f.write_str("    ")?;
                self.print_instruction(f, function, inst_id)?;
                writeln!(f)?;
            }
        }
        writeln!(f, "  }}")
    }

    fn operand(&self, function: &Function, id: ValueId) -> String {
        let value = function.value(id);
        match &value.kind {
            ValueKind::Argument { .. } => format!("%{}", value.name),
            ValueKind::ConstInt { value } => format!("{value}"),
            ValueKind::ConstBool { value } => format!("{value}"),
            ValueKind::ConstString { global } | ValueKind::GlobalRef { global } => {
                format!("@{}", self.module.global(*global).name)
            }
            ValueKind::Undef => "undef".to_owned(),
            ValueKind::FunctionRef { function: callee } => {
                format!("@{}", self.module.function(*callee).name)
            }
            ValueKind::Inst(_) => format!("%{}", id.index()),
        }
    }

    fn print_instruction(
        &self,
        f: &mut fmt::Formatter<'_>,
        function: &Function,
        id: ValueId,
    ) -> fmt::Result {
        let value: &Value = function.value(id);
        let ValueKind::Inst(inst) = &value.kind else {
            // Non-instruction values never appear in block instruction
            // lists.
            return write!(f, "{}", self.operand(function, id));
        };

        match inst {
            Inst::Alloca => {
                write!(
                    f,
                    "%{} = alloca {}",
                    id.index(),
                    self.pool.display(self.pool.pointee(value.ty))
                )?;
                if !value.name.is_empty() {
                    write!(f, " ; {}", value.name)?;
                }
                Ok(())
            }
            Inst::Load { ptr } => {
                write!(f, "%{} = load {}", id.index(), self.operand(function, *ptr))
            }
            Inst::Store { value: v, ptr } => {
                write!(
                    f,
                    "store {}, {}",
                    self.operand(function, *v),
                    self.operand(function, *ptr)
                )
            }
            Inst::Call { callee, args } => {
                write!(f, "%{} = call {}(", id.index(), self.operand(function, *callee))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&self.operand(function, *arg))?;
                }
                f.write_str(")")
            }
            Inst::Unary { op, operand } => {
                let symbol = match op {
                    vela_ast::UnaryOp::Plus => "+",
                    vela_ast::UnaryOp::Minus => "-",
                    vela_ast::UnaryOp::Not => "!",
                };
                write!(
                    f,
                    "%{} = {symbol}{}",
                    id.index(),
                    self.operand(function, *operand)
                )
            }
            Inst::Binary { op, lhs, rhs } => {
                write!(
                    f,
                    "%{} = {} {} {}",
                    id.index(),
                    self.operand(function, *lhs),
                    op.symbol(),
                    self.operand(function, *rhs)
                )
            }
            Inst::Phi { incoming } => {
                write!(f, "%{} = phi", id.index())?;
                for (i, (value, block)) in incoming.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " [{}, b{}]", self.operand(function, *value), block.index())?;
                }
                Ok(())
            }
            Inst::InsertValue {
                aggregate,
                element,
                index,
            } => {
                write!(
                    f,
                    "%{} = insertvalue {}, {}, {index}",
                    id.index(),
                    self.operand(function, *aggregate),
                    self.operand(function, *element)
                )
            }
            Inst::ExtractValue { aggregate, index } => {
                write!(
                    f,
                    "%{} = extractvalue {}, {index}",
                    id.index(),
                    self.operand(function, *aggregate)
                )
            }
            Inst::FieldAddr { base, index } => {
                write!(
                    f,
                    "%{} = fieldaddr {}, {index}",
                    id.index(),
                    self.operand(function, *base)
                )
            }
            Inst::Branch { target } => write!(f, "br b{}", target.index()),
            Inst::CondBranch {
                condition,
                true_target,
                false_target,
            } => {
                write!(
                    f,
                    "condbr {}, b{}, b{}",
                    self.operand(function, *condition),
                    true_target.index(),
                    false_target.index()
                )
            }
            Inst::Return { values } => {
                f.write_str("ret")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}", self.operand(function, *value))?;
                }
                Ok(())
            }
            Inst::Unreachable => f.write_str("unreachable"),
        }
    }
}
