// src/hir/mod.rs
//! Minimal high-level loop-nest IR ("HL-IR").
//!
//! The second underlying shape the vectorizer core wraps: a structured tree
//! of loops, ifs, labels, gotos and straight-line instructions, with
//! data-dependence references attached to instruction operands. Unlike
//! BB-IR there is no CFG here; nesting is explicit.

use crate::identity::{DdRefId, HlGotoId, HlIfId, HlInstId, HlLabelId, HlLoopId};
use crate::ir::Type;

/// A reference to one node of the structured tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HlNode {
    Inst(HlInstId),
    Loop(HlLoopId),
    If(HlIfId),
    Label(HlLabelId),
    Goto(HlGotoId),
}

/// A straight-line HL instruction. Operands are expressed as
/// data-dependence references.
#[derive(Debug, Clone)]
pub struct HlInst {
    pub name: String,
    pub ty: Type,
    pub operands: Vec<DdRefId>,
}

/// A data-dependence reference: the symbolic memory or scalar access an HL
/// operand denotes.
#[derive(Debug, Clone)]
pub struct DdRef {
    pub base: String,
    pub is_write: bool,
}

#[derive(Debug, Clone)]
pub struct HlLabel {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct HlGoto {
    pub target: HlLabelId,
}

/// A structured if with explicit then/else child lists.
#[derive(Debug, Clone)]
pub struct HlIf {
    pub cond: HlInstId,
    pub then_children: Vec<HlNode>,
    pub else_children: Vec<HlNode>,
}

/// A loop in the nest. `innermost` is the loop's own predicate, maintained
/// by whoever built the nest; it is not recomputed here.
#[derive(Debug, Clone)]
pub struct HlLoop {
    pub children: Vec<HlNode>,
    pub innermost: bool,
    /// Upper bound on the trip count; 0 means unknown.
    pub max_trip_count: u64,
}

/// An HL function: the arenas plus the top-level statement list.
#[derive(Debug, Clone, Default)]
pub struct HlFunction {
    pub name: String,
    insts: Vec<HlInst>,
    loops: Vec<HlLoop>,
    ifs: Vec<HlIf>,
    labels: Vec<HlLabel>,
    gotos: Vec<HlGoto>,
    ddrefs: Vec<DdRef>,
    pub top: Vec<HlNode>,
}

impl HlFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_inst(&mut self, name: impl Into<String>, ty: Type, operands: Vec<DdRefId>) -> HlInstId {
        let id = HlInstId::new(self.insts.len() as u32);
        self.insts.push(HlInst {
            name: name.into(),
            ty,
            operands,
        });
        id
    }

    pub fn add_loop(&mut self, lp: HlLoop) -> HlLoopId {
        let id = HlLoopId::new(self.loops.len() as u32);
        self.loops.push(lp);
        id
    }

    pub fn add_if(&mut self, hl_if: HlIf) -> HlIfId {
        let id = HlIfId::new(self.ifs.len() as u32);
        self.ifs.push(hl_if);
        id
    }

    pub fn add_label(&mut self, name: impl Into<String>) -> HlLabelId {
        let id = HlLabelId::new(self.labels.len() as u32);
        self.labels.push(HlLabel { name: name.into() });
        id
    }

    pub fn add_goto(&mut self, target: HlLabelId) -> HlGotoId {
        let id = HlGotoId::new(self.gotos.len() as u32);
        self.gotos.push(HlGoto { target });
        id
    }

    pub fn add_ddref(&mut self, base: impl Into<String>, is_write: bool) -> DdRefId {
        let id = DdRefId::new(self.ddrefs.len() as u32);
        self.ddrefs.push(DdRef {
            base: base.into(),
            is_write,
        });
        id
    }

    pub fn inst(&self, id: HlInstId) -> &HlInst {
        &self.insts[id.index() as usize]
    }

    pub fn hl_loop(&self, id: HlLoopId) -> &HlLoop {
        &self.loops[id.index() as usize]
    }

    pub fn hl_if(&self, id: HlIfId) -> &HlIf {
        &self.ifs[id.index() as usize]
    }

    pub fn label(&self, id: HlLabelId) -> &HlLabel {
        &self.labels[id.index() as usize]
    }

    pub fn goto(&self, id: HlGotoId) -> &HlGoto {
        &self.gotos[id.index() as usize]
    }

    pub fn ddref(&self, id: DdRefId) -> &DdRef {
        &self.ddrefs[id.index() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_is_the_loops_own_predicate() {
        let mut f = HlFunction::new("h");
        let inner = f.add_loop(HlLoop {
            children: Vec::new(),
            innermost: true,
            max_trip_count: 16,
        });
        let outer = f.add_loop(HlLoop {
            children: vec![HlNode::Loop(inner)],
            innermost: false,
            max_trip_count: 0,
        });

        assert!(f.hl_loop(inner).innermost);
        assert!(!f.hl_loop(outer).innermost);
    }
}
