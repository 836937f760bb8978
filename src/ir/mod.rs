// src/ir/mod.rs
//! Minimal linear basic-block IR ("BB-IR").
//!
//! This is the low-level shape the vectorizer core wraps: a function made
//! of basic blocks holding instructions in an arena, plus natural-loop
//! information in [`loops`]. The core trees reference IR objects through
//! arena IDs and never own them.
//!
//! Directive intrinsics are ordinary instructions with
//! [`InstKind::Directive`]; the work-region builder gives their strings
//! meaning, this module only transports them.

pub mod loops;

pub use loops::{Loop, LoopInfo};

use std::fmt;

use smallvec::SmallVec;

use crate::identity::{ArgId, BlockId, ConstId, InstId};

/// Suffix appended to the name of a cloned value during AVR code
/// generation. Skipped when the original produces no value.
pub const CLONE_SUFFIX: &str = ".VPOClone";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    I1,
    I32,
    I64,
    F32,
    F64,
    Ptr,
}

impl Type {
    pub fn is_void(self) -> bool {
        self == Type::Void
    }

    pub fn is_int(self) -> bool {
        matches!(self, Type::I1 | Type::I32 | Type::I64)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Type::Void => "void",
            Type::I1 => "i1",
            Type::I32 => "i32",
            Type::I64 => "i64",
            Type::F32 => "f32",
            Type::F64 => "f64",
            Type::Ptr => "ptr",
        };
        f.write_str(s)
    }
}

/// A function argument.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub ty: Type,
}

/// An integer constant. Constants live in their own arena so other layers
/// can hold a stable back-reference to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant {
    pub value: i64,
    pub ty: Type,
}

/// A reference to anything that can be used as an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRef {
    Inst(InstId),
    Const(ConstId),
    Arg(ArgId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpPred {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    Binary {
        op: BinOp,
        lhs: ValueRef,
        rhs: ValueRef,
    },
    ICmp {
        pred: CmpPred,
        lhs: ValueRef,
        rhs: ValueRef,
    },
    Phi {
        incoming: SmallVec<[(ValueRef, BlockId); 2]>,
    },
    Call {
        callee: String,
        args: SmallVec<[ValueRef; 2]>,
    },
    Br {
        target: BlockId,
    },
    CondBr {
        cond: ValueRef,
        then_dest: BlockId,
        else_dest: BlockId,
    },
    Ret {
        value: Option<ValueRef>,
    },
    /// A directive intrinsic: a pseudo-instruction carrying a directive
    /// string and its operand payload.
    Directive {
        name: String,
        args: SmallVec<[ValueRef; 4]>,
    },
}

/// One IR instruction. `block` is the containing block; it is kept here so
/// in-place replacement can find the instruction's slot.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub name: String,
    pub ty: Type,
    pub block: BlockId,
    pub kind: InstKind,
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.kind,
            InstKind::Br { .. } | InstKind::CondBr { .. } | InstKind::Ret { .. }
        )
    }

    pub fn is_directive(&self) -> bool {
        matches!(self.kind, InstKind::Directive { .. })
    }

    pub fn produces_value(&self) -> bool {
        !self.ty.is_void()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BasicBlock {
    pub name: String,
    pub insts: Vec<InstId>,
}

/// A BB-IR function: argument list, blocks in layout order, and the
/// instruction and constant arenas.
#[derive(Debug, Clone, Default)]
pub struct Function {
    pub name: String,
    args: Vec<Argument>,
    blocks: Vec<BasicBlock>,
    insts: Vec<Instruction>,
    consts: Vec<Constant>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_arg(&mut self, name: impl Into<String>, ty: Type) -> ArgId {
        let id = ArgId::new(self.args.len() as u32);
        self.args.push(Argument {
            name: name.into(),
            ty,
        });
        id
    }

    pub fn add_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            name: name.into(),
            insts: Vec::new(),
        });
        id
    }

    pub fn add_inst(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
        ty: Type,
        kind: InstKind,
    ) -> InstId {
        let id = InstId::new(self.insts.len() as u32);
        self.insts.push(Instruction {
            name: name.into(),
            ty,
            block,
            kind,
        });
        self.blocks[block.index() as usize].insts.push(id);
        id
    }

    pub fn add_const(&mut self, value: i64, ty: Type) -> ConstId {
        let id = ConstId::new(self.consts.len() as u32);
        self.consts.push(Constant { value, ty });
        id
    }

    pub fn arg(&self, id: ArgId) -> &Argument {
        &self.args[id.index() as usize]
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index() as usize]
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len() as u32).map(BlockId::new)
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn inst(&self, id: InstId) -> &Instruction {
        &self.insts[id.index() as usize]
    }

    pub fn inst_mut(&mut self, id: InstId) -> &mut Instruction {
        &mut self.insts[id.index() as usize]
    }

    pub fn constant(&self, id: ConstId) -> &Constant {
        &self.consts[id.index() as usize]
    }

    /// The terminator of a block, if the block is non-empty and ends in one.
    pub fn terminator(&self, block: BlockId) -> Option<InstId> {
        let last = *self.block(block).insts.last()?;
        self.inst(last).is_terminator().then_some(last)
    }

    pub fn value_name(&self, value: ValueRef) -> String {
        match value {
            ValueRef::Inst(id) => self.inst(id).name.clone(),
            ValueRef::Arg(id) => self.arg(id).name.clone(),
            ValueRef::Const(id) => self.constant(id).value.to_string(),
        }
    }

    pub fn value_ty(&self, value: ValueRef) -> Type {
        match value {
            ValueRef::Inst(id) => self.inst(id).ty,
            ValueRef::Arg(id) => self.arg(id).ty,
            ValueRef::Const(id) => self.constant(id).ty,
        }
    }

    /// Clones `id`, renames the clone by appending [`CLONE_SUFFIX`] when it
    /// produces a value (void results keep an empty name), and replaces the
    /// original in place in its block. Returns the clone's ID.
    ///
    /// The original instruction stays in the arena but is no longer reachable
    /// from any block.
    pub fn clone_and_replace(&mut self, id: InstId) -> InstId {
        let orig = self.inst(id);
        let name = if orig.ty.is_void() {
            String::new()
        } else {
            format!("{}{}", orig.name, CLONE_SUFFIX)
        };
        let clone = Instruction {
            name,
            ty: orig.ty,
            block: orig.block,
            kind: orig.kind.clone(),
        };
        let block = orig.block;
        let new_id = InstId::new(self.insts.len() as u32);
        self.insts.push(clone);

        let slot = self.blocks[block.index() as usize]
            .insts
            .iter()
            .position(|&i| i == id)
            .expect("instruction not found in its own block");
        self.blocks[block.index() as usize].insts[slot] = new_id;
        new_id
    }
}
