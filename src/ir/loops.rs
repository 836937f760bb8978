// src/ir/loops.rs
//! Natural-loop information for BB-IR functions.
//!
//! `LoopInfo` is populated by whatever analysis discovered the loops; the
//! core only reads it. Loops are registered outermost-first so the
//! block-to-loop map always answers with the innermost containing loop.

use rustc_hash::FxHashMap;

use crate::identity::{BlockId, LoopId};

#[derive(Debug, Clone)]
pub struct Loop {
    pub header: BlockId,
    pub preheader: Option<BlockId>,
    pub latch: Option<BlockId>,
    /// All blocks of the loop, including those of nested loops.
    pub blocks: Vec<BlockId>,
    pub subloops: Vec<LoopId>,
    pub parent: Option<LoopId>,
    /// Upper bound on the trip count; 0 means unknown.
    pub max_trip_count: u64,
}

impl Loop {
    pub fn new(header: BlockId) -> Self {
        Self {
            header,
            preheader: None,
            latch: None,
            blocks: vec![header],
            subloops: Vec::new(),
            parent: None,
            max_trip_count: 0,
        }
    }

    pub fn is_innermost(&self) -> bool {
        self.subloops.is_empty()
    }

    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoopInfo {
    loops: Vec<Loop>,
    top_level: Vec<LoopId>,
    loop_of_block: FxHashMap<BlockId, LoopId>,
}

impl LoopInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a loop under `parent` (or as top-level). Blocks of the new
    /// loop override the map entries of any enclosing loop, so `loop_of`
    /// answers with the innermost loop when registration is outermost-first.
    pub fn add_loop(&mut self, mut lp: Loop, parent: Option<LoopId>) -> LoopId {
        let id = LoopId::new(self.loops.len() as u32);
        lp.parent = parent;
        for &b in &lp.blocks {
            self.loop_of_block.insert(b, id);
        }
        self.loops.push(lp);
        match parent {
            Some(p) => self.loops[p.index() as usize].subloops.push(id),
            None => self.top_level.push(id),
        }
        id
    }

    pub fn get(&self, id: LoopId) -> &Loop {
        &self.loops[id.index() as usize]
    }

    pub fn get_mut(&mut self, id: LoopId) -> &mut Loop {
        &mut self.loops[id.index() as usize]
    }

    /// The innermost loop containing `block`, if any.
    pub fn loop_of(&self, block: BlockId) -> Option<LoopId> {
        self.loop_of_block.get(&block).copied()
    }

    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    pub fn top_level(&self) -> &[LoopId] {
        &self.top_level
    }

    pub fn loop_ids(&self) -> impl Iterator<Item = LoopId> {
        (0..self.loops.len() as u32).map(LoopId::new)
    }

    /// True when `outer` is `inner` or an ancestor of `inner`.
    pub fn encloses(&self, outer: LoopId, inner: LoopId) -> bool {
        let mut cur = Some(inner);
        while let Some(l) = cur {
            if l == outer {
                return true;
            }
            cur = self.get(l).parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_of_answers_innermost() {
        let mut li = LoopInfo::new();
        let h0 = BlockId::new(0);
        let h1 = BlockId::new(1);

        let mut outer = Loop::new(h0);
        outer.blocks = vec![h0, h1];
        let outer = li.add_loop(outer, None);
        let inner = li.add_loop(Loop::new(h1), Some(outer));

        assert_eq!(li.loop_of(h0), Some(outer));
        assert_eq!(li.loop_of(h1), Some(inner));
        assert!(li.encloses(outer, inner));
        assert!(!li.encloses(inner, outer));
        assert!(!li.get(outer).is_innermost());
        assert!(li.get(inner).is_innermost());
    }
}
