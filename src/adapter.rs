// src/adapter.rs
//! Uniform view over the two underlying loop shapes.
//!
//! Upper layers ask structural questions about a loop without caring
//! whether it is a BB-IR natural loop or an HL-IR nest node. The trait is
//! deliberately minimal; it grows only when an upper layer needs more.
//! Unsupported loop shapes simply have no implementation, so misuse fails
//! at compile time.

use crate::avr::{AvrData, AvrTree};
use crate::hir::HlFunction;
use crate::identity::{AvrId, HlLoopId, LoopId};
use crate::ir::LoopInfo;

pub trait VectorLoop {
    /// True when the loop contains no sub-loops.
    fn is_innermost(&self) -> bool;

    /// Upper bound on the trip count; 0 means unknown.
    fn max_trip_count_estimate(&self) -> u64;
}

/// A BB-IR natural loop viewed through its `LoopInfo`.
#[derive(Clone, Copy)]
pub struct BbLoopRef<'a> {
    li: &'a LoopInfo,
    id: LoopId,
}

impl<'a> BbLoopRef<'a> {
    pub fn new(li: &'a LoopInfo, id: LoopId) -> Self {
        Self { li, id }
    }
}

impl VectorLoop for BbLoopRef<'_> {
    fn is_innermost(&self) -> bool {
        self.li.get(self.id).is_innermost()
    }

    fn max_trip_count_estimate(&self) -> u64 {
        self.li.get(self.id).max_trip_count
    }
}

/// An HL-IR nest loop.
#[derive(Clone, Copy)]
pub struct HlLoopRef<'a> {
    func: &'a HlFunction,
    id: HlLoopId,
}

impl<'a> HlLoopRef<'a> {
    pub fn new(func: &'a HlFunction, id: HlLoopId) -> Self {
        Self { func, id }
    }
}

impl VectorLoop for HlLoopRef<'_> {
    fn is_innermost(&self) -> bool {
        self.func.hl_loop(self.id).innermost
    }

    fn max_trip_count_estimate(&self) -> u64 {
        self.func.hl_loop(self.id).max_trip_count
    }
}

/// Either shape, resolved from an AVR loop node.
pub enum LoopRef<'a> {
    Bb(BbLoopRef<'a>),
    Hl(HlLoopRef<'a>),
}

impl<'a> LoopRef<'a> {
    /// Adapts the loop node `id`. Returns `None` when the node is not a
    /// loop or the matching underlying context was not supplied.
    pub fn from_avr(
        tree: &AvrTree,
        id: AvrId,
        li: Option<&'a LoopInfo>,
        hl: Option<&'a HlFunction>,
    ) -> Option<Self> {
        match tree.node(id).data() {
            AvrData::Loop(lp) => Some(LoopRef::Bb(BbLoopRef::new(li?, lp))),
            AvrData::HlLoop(lp) => Some(LoopRef::Hl(HlLoopRef::new(hl?, lp))),
            _ => None,
        }
    }
}

impl VectorLoop for LoopRef<'_> {
    fn is_innermost(&self) -> bool {
        match self {
            LoopRef::Bb(l) => l.is_innermost(),
            LoopRef::Hl(l) => l.is_innermost(),
        }
    }

    fn max_trip_count_estimate(&self) -> u64 {
        match self {
            LoopRef::Bb(l) => l.max_trip_count_estimate(),
            LoopRef::Hl(l) => l.max_trip_count_estimate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::HlLoop;
    use crate::identity::BlockId;
    use crate::ir::Loop;

    #[test]
    fn both_shapes_answer_the_same_questions() {
        let mut li = LoopInfo::new();
        let h0 = BlockId::new(0);
        let h1 = BlockId::new(1);
        let mut outer = Loop::new(h0);
        outer.blocks = vec![h0, h1];
        outer.max_trip_count = 100;
        let outer = li.add_loop(outer, None);
        let mut inner = Loop::new(h1);
        inner.max_trip_count = 16;
        let inner = li.add_loop(inner, Some(outer));

        let outer_ref = BbLoopRef::new(&li, outer);
        let inner_ref = BbLoopRef::new(&li, inner);
        assert!(!outer_ref.is_innermost());
        assert!(inner_ref.is_innermost());
        assert_eq!(inner_ref.max_trip_count_estimate(), 16);

        let mut hl = HlFunction::new("h");
        let lp = hl.add_loop(HlLoop {
            children: Vec::new(),
            innermost: true,
            max_trip_count: 0,
        });
        let hl_ref = HlLoopRef::new(&hl, lp);
        assert!(hl_ref.is_innermost());
        // 0 is the "unknown" answer, not a zero-trip loop.
        assert_eq!(hl_ref.max_trip_count_estimate(), 0);
    }

    #[test]
    fn avr_loop_nodes_adapt_to_their_own_shape() {
        use crate::avr::{AvrTree, AvrUtils};

        let mut li = LoopInfo::new();
        let bb_loop = li.add_loop(Loop::new(BlockId::new(0)), None);
        let mut hl = HlFunction::new("h");
        let hl_loop = hl.add_loop(HlLoop {
            children: Vec::new(),
            innermost: true,
            max_trip_count: 8,
        });

        let mut tree = AvrTree::new();
        let root = AvrUtils::create_avr_function(&mut tree);
        let a = AvrUtils::create_avr_loop(&mut tree, bb_loop);
        let b = AvrUtils::create_avr_loop_hl(&mut tree, hl_loop);
        AvrUtils::insert_last_child(&mut tree, root, a);
        AvrUtils::insert_last_child(&mut tree, root, b);

        let bb_ref = LoopRef::from_avr(&tree, a, Some(&li), Some(&hl)).unwrap();
        assert!(matches!(bb_ref, LoopRef::Bb(_)));
        assert!(bb_ref.is_innermost());

        let hl_ref = LoopRef::from_avr(&tree, b, Some(&li), Some(&hl)).unwrap();
        assert_eq!(hl_ref.max_trip_count_estimate(), 8);

        // A non-loop node has no loop view.
        assert!(LoopRef::from_avr(&tree, root, Some(&li), Some(&hl)).is_none());
    }
}
