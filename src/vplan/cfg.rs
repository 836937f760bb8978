// src/vplan/cfg.rs
//! Plan blocks and the assembly API.
//!
//! Blocks live in one arena regardless of kind. Regions reference their
//! entry and exit blocks by ID and declare their size; containment is the
//! parent back-pointer on each member block. The mutation API is the
//! minimum the vectorizer needs to assemble and rewire a plan; the
//! verifier checks what assembly cannot enforce.

use smallvec::SmallVec;

use crate::identity::{ConstId, VpBlockId, VpLoopId, VpValueId};

use super::{VpInstruction, VpValue};

/// Payload of a region block. `vp_loop` is meaningful for loop regions
/// only; a loop region without its descriptor is a verifier finding, not a
/// construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpRegion {
    pub entry: VpBlockId,
    pub exit: VpBlockId,
    /// Declared number of contained blocks.
    pub size: u32,
    pub is_loop: bool,
    pub vp_loop: Option<VpLoopId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VpBlockKind {
    Basic { insts: Vec<VpValueId> },
    Region(VpRegion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpBlock {
    pub name: String,
    pub parent: Option<VpBlockId>,
    pub successors: SmallVec<[VpBlockId; 2]>,
    pub predecessors: SmallVec<[VpBlockId; 2]>,
    pub condition_bit: Option<VpValueId>,
    pub kind: VpBlockKind,
}

impl VpBlock {
    pub fn is_region(&self) -> bool {
        matches!(self.kind, VpBlockKind::Region(_))
    }

    pub fn region(&self) -> Option<&VpRegion> {
        match &self.kind {
            VpBlockKind::Region(r) => Some(r),
            VpBlockKind::Basic { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct VPlan {
    blocks: Vec<VpBlock>,
    values: Vec<VpValue>,
    entry: Option<VpBlockId>,
}

impl VPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_block(&mut self, name: impl Into<String>) -> VpBlockId {
        self.push_block(name.into(), VpBlockKind::Basic { insts: Vec::new() })
    }

    pub fn create_region(
        &mut self,
        name: impl Into<String>,
        entry: VpBlockId,
        exit: VpBlockId,
        size: u32,
    ) -> VpBlockId {
        self.push_block(
            name.into(),
            VpBlockKind::Region(VpRegion {
                entry,
                exit,
                size,
                is_loop: false,
                vp_loop: None,
            }),
        )
    }

    pub fn create_loop_region(
        &mut self,
        name: impl Into<String>,
        entry: VpBlockId,
        exit: VpBlockId,
        size: u32,
        vp_loop: Option<VpLoopId>,
    ) -> VpBlockId {
        self.push_block(
            name.into(),
            VpBlockKind::Region(VpRegion {
                entry,
                exit,
                size,
                is_loop: true,
                vp_loop,
            }),
        )
    }

    fn push_block(&mut self, name: String, kind: VpBlockKind) -> VpBlockId {
        let id = VpBlockId::new(self.blocks.len() as u32);
        self.blocks.push(VpBlock {
            name,
            parent: None,
            successors: SmallVec::new(),
            predecessors: SmallVec::new(),
            condition_bit: None,
            kind,
        });
        id
    }

    /// The root region the plan hangs off.
    pub fn entry(&self) -> Option<VpBlockId> {
        self.entry
    }

    pub fn set_entry(&mut self, root: VpBlockId) {
        self.entry = Some(root);
    }

    pub fn block(&self, id: VpBlockId) -> &VpBlock {
        &self.blocks[id.index() as usize]
    }

    pub fn block_mut(&mut self, id: VpBlockId) -> &mut VpBlock {
        &mut self.blocks[id.index() as usize]
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_ids(&self) -> impl Iterator<Item = VpBlockId> {
        (0..self.blocks.len() as u32).map(VpBlockId::new)
    }

    /// Adds a directed edge, updating both endpoint lists.
    pub fn connect(&mut self, from: VpBlockId, to: VpBlockId) {
        self.block_mut(from).successors.push(to);
        self.block_mut(to).predecessors.push(from);
    }

    /// Removes one directed edge, if present, from both endpoint lists.
    pub fn disconnect(&mut self, from: VpBlockId, to: VpBlockId) {
        let succs = &mut self.block_mut(from).successors;
        if let Some(at) = succs.iter().position(|&s| s == to) {
            succs.remove(at);
        }
        let preds = &mut self.block_mut(to).predecessors;
        if let Some(at) = preds.iter().position(|&p| p == from) {
            preds.remove(at);
        }
    }

    pub fn set_condition_bit(&mut self, block: VpBlockId, value: VpValueId) {
        self.block_mut(block).condition_bit = Some(value);
    }

    pub fn set_parent(&mut self, block: VpBlockId, region: VpBlockId) {
        self.block_mut(block).parent = Some(region);
    }

    /// Appends an instruction to a basic block's ordered list.
    pub fn add_instruction(&mut self, block: VpBlockId, inst: VpInstruction) -> VpValueId {
        let id = VpValueId::new(self.values.len() as u32);
        self.values.push(VpValue::Instruction(inst));
        match &mut self.block_mut(block).kind {
            VpBlockKind::Basic { insts } => insts.push(id),
            VpBlockKind::Region(_) => panic!("instructions belong to basic blocks, not regions"),
        }
        id
    }

    pub fn create_constant(&mut self, konst: ConstId) -> VpValueId {
        let id = VpValueId::new(self.values.len() as u32);
        self.values.push(VpValue::Constant(konst));
        id
    }

    pub fn value(&self, id: VpValueId) -> &VpValue {
        &self.values[id.index() as usize]
    }
}
