// src/vplan/loop_info.rs
//! The VPLoop side table.
//!
//! Mirrors [`crate::ir::loops`] over plan blocks: the loop structure the
//! vectorizer believes the plan has, kept next to the plan rather than
//! inside it so the verifier can cross-check the two.

use rustc_hash::FxHashMap;

use crate::identity::{VpBlockId, VpLoopId};

#[derive(Debug, Clone)]
pub struct VpLoop {
    pub preheader: VpBlockId,
    pub header: VpBlockId,
    /// All blocks of the loop body, including nested loops, plus the
    /// preheader.
    pub blocks: Vec<VpBlockId>,
    pub exits: Vec<VpBlockId>,
    pub parent: Option<VpLoopId>,
}

#[derive(Debug, Clone, Default)]
pub struct VpLoopInfo {
    loops: Vec<VpLoop>,
    loop_of_block: FxHashMap<VpBlockId, VpLoopId>,
}

impl VpLoopInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loop. As with the underlying IR, register outermost
    /// loops first so the block map answers with the innermost loop.
    pub fn add_loop(&mut self, lp: VpLoop) -> VpLoopId {
        let id = VpLoopId::new(self.loops.len() as u32);
        for &b in &lp.blocks {
            self.loop_of_block.insert(b, id);
        }
        self.loops.push(lp);
        id
    }

    pub fn get(&self, id: VpLoopId) -> &VpLoop {
        &self.loops[id.index() as usize]
    }

    pub fn loop_of(&self, block: VpBlockId) -> Option<VpLoopId> {
        self.loop_of_block.get(&block).copied()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn loop_ids(&self) -> impl Iterator<Item = VpLoopId> {
        (0..self.loops.len() as u32).map(VpLoopId::new)
    }
}
