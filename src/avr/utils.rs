// src/avr/utils.rs
//! The AVR factory.
//!
//! `AvrUtils` is the only way to create, insert, clone, or destroy AVR
//! nodes. Centralizing construction keeps numbering, parenting and the
//! kind/data pairing in one place. Every insertion sets the child's parent
//! pointer and places it exactly once in the parent's child list.

use crate::errors::AvrError;
use crate::identity::{
    AvrId, BlockId, DdRefId, HlGotoId, HlIfId, HlInstId, HlLabelId, HlLoopId, InstId, LoopId,
};

use super::{AvrData, AvrKind, AvrTree};

/// Where to place a node relative to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPos {
    FirstChild,
    LastChild,
    After,
    Before,
}

pub struct AvrUtils;

impl AvrUtils {
    // Creation. One factory function per concrete kind; the kind/data
    // pairing is fixed here and nowhere else.

    /// Creates the function root. A tree has exactly one.
    pub fn create_avr_function(tree: &mut AvrTree) -> AvrId {
        let id = tree.alloc(AvrKind::Function, AvrData::Function);
        tree.set_root(id);
        id
    }

    pub fn create_avr_loop(tree: &mut AvrTree, lp: LoopId) -> AvrId {
        tree.alloc(AvrKind::LoopBb, AvrData::Loop(lp))
    }

    pub fn create_avr_loop_hl(tree: &mut AvrTree, lp: HlLoopId) -> AvrId {
        tree.alloc(AvrKind::LoopHl, AvrData::HlLoop(lp))
    }

    /// `cond` is the condition-producing instruction the if shadows.
    pub fn create_avr_if(tree: &mut AvrTree, cond: InstId) -> AvrId {
        tree.alloc(AvrKind::IfBb, AvrData::Inst(cond))
    }

    pub fn create_avr_if_hl(tree: &mut AvrTree, hl_if: HlIfId) -> AvrId {
        tree.alloc(AvrKind::IfHl, AvrData::HlIf(hl_if))
    }

    pub fn create_avr_assign(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::AssignBb, AvrData::Inst(inst))
    }

    pub fn create_avr_branch(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::BranchBb, AvrData::Inst(inst))
    }

    pub fn create_avr_phi(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::Phi, AvrData::Inst(inst))
    }

    pub fn create_avr_call(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::Call, AvrData::Inst(inst))
    }

    pub fn create_avr_fbranch(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::FBranch, AvrData::Inst(inst))
    }

    pub fn create_avr_backedge(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::BackEdge, AvrData::Inst(inst))
    }

    pub fn create_avr_entry(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::Entry, AvrData::Inst(inst))
    }

    pub fn create_avr_return(tree: &mut AvrTree, inst: InstId) -> AvrId {
        tree.alloc(AvrKind::Return, AvrData::Inst(inst))
    }

    pub fn create_avr_label(tree: &mut AvrTree, block: BlockId) -> AvrId {
        tree.alloc(AvrKind::LabelBb, AvrData::Block(block))
    }

    pub fn create_avr_assign_hl(tree: &mut AvrTree, inst: HlInstId) -> AvrId {
        tree.alloc(AvrKind::AssignHl, AvrData::HlInst(inst))
    }

    pub fn create_avr_label_hl(tree: &mut AvrTree, label: HlLabelId) -> AvrId {
        tree.alloc(AvrKind::LabelHl, AvrData::HlLabel(label))
    }

    pub fn create_avr_branch_hl(tree: &mut AvrTree, goto: HlGotoId) -> AvrId {
        tree.alloc(AvrKind::BranchHl, AvrData::HlGoto(goto))
    }

    pub fn create_avr_expression_hl(tree: &mut AvrTree, inst: HlInstId) -> AvrId {
        tree.alloc(AvrKind::ExpressionHl, AvrData::HlInst(inst))
    }

    pub fn create_avr_value_hl(tree: &mut AvrTree, ddref: DdRefId) -> AvrId {
        tree.alloc(AvrKind::ValueHl, AvrData::DdRef(ddref))
    }

    // Insertion.

    /// Places `node` relative to `anchor`. For child positions `anchor` is
    /// the parent; for sibling positions it is the neighbor.
    pub fn insert(tree: &mut AvrTree, pos: InsertPos, anchor: AvrId, node: AvrId) {
        match pos {
            InsertPos::FirstChild => Self::insert_first_child(tree, anchor, node),
            InsertPos::LastChild => Self::insert_last_child(tree, anchor, node),
            InsertPos::After => Self::insert_after(tree, anchor, node),
            InsertPos::Before => Self::insert_before(tree, anchor, node),
        }
    }

    pub fn insert_first_child(tree: &mut AvrTree, parent: AvrId, node: AvrId) {
        Self::attach(tree, parent, 0, node);
    }

    pub fn insert_last_child(tree: &mut AvrTree, parent: AvrId, node: AvrId) {
        let at = tree.node(parent).children.len();
        Self::attach_no_split(tree, parent, at, node);
    }

    pub fn insert_after(tree: &mut AvrTree, sibling: AvrId, node: AvrId) {
        let (parent, at) = Self::sibling_slot(tree, sibling);
        Self::attach(tree, parent, at + 1, node);
    }

    pub fn insert_before(tree: &mut AvrTree, sibling: AvrId, node: AvrId) {
        let (parent, at) = Self::sibling_slot(tree, sibling);
        Self::attach(tree, parent, at, node);
    }

    /// Appends `node` at the end of an if node's then-side.
    pub fn insert_last_then_child(tree: &mut AvrTree, if_node: AvrId, node: AvrId) {
        assert!(tree.node(if_node).kind.is_if(), "then-child on a non-if node");
        let at = tree.node(if_node).then_split;
        Self::attach(tree, if_node, at, node);
    }

    /// Appends `node` at the end of an if node's else-side.
    pub fn insert_last_else_child(tree: &mut AvrTree, if_node: AvrId, node: AvrId) {
        assert!(tree.node(if_node).kind.is_if(), "else-child on a non-if node");
        let at = tree.node(if_node).children.len();
        Self::attach_no_split(tree, if_node, at, node);
    }

    // Removal and cloning.

    /// Detaches `node` from its parent and destroys it together with all
    /// of its descendants.
    pub fn remove(tree: &mut AvrTree, node: AvrId) {
        Self::detach(tree, node);
        for id in tree.preorder(node) {
            tree.free(id);
        }
    }

    /// Detaches `node` from its parent, keeping the subtree alive.
    pub fn detach(tree: &mut AvrTree, node: AvrId) {
        let Some(parent) = tree.node(node).parent else {
            return;
        };
        let at = tree
            .node(parent)
            .children
            .iter()
            .position(|&c| c == node)
            .expect("node missing from its parent's child list");
        let p = tree.node_mut(parent);
        p.children.remove(at);
        if p.kind.is_if() && at < p.then_split {
            p.then_split -= 1;
        }
        tree.node_mut(node).parent = None;
    }

    /// Produces a structurally equivalent copy of the subtree at `node`
    /// with fresh numbers. The copy is detached; insert it where needed.
    ///
    /// Function roots do not clone: a tree has exactly one root, so the
    /// operation returns `Unsupported` and the caller must abort the
    /// enclosing transformation.
    pub fn clone_subtree(tree: &mut AvrTree, node: AvrId) -> Result<AvrId, AvrError> {
        let n = tree.node(node);
        if n.kind == AvrKind::Function {
            return Err(AvrError::Unsupported {
                op: "clone",
                kind: n.kind,
                number: n.number,
            });
        }
        Ok(Self::clone_rec(tree, node))
    }

    fn clone_rec(tree: &mut AvrTree, node: AvrId) -> AvrId {
        let (kind, data, split, children) = {
            let n = tree.node(node);
            (n.kind, n.data, n.then_split, n.children.clone())
        };
        let copy = tree.alloc(kind, data);
        tree.node_mut(copy).then_split = split;
        for child in children {
            let child_copy = Self::clone_rec(tree, child);
            let at = tree.node(copy).children.len();
            Self::attach_no_split(tree, copy, at, child_copy);
        }
        copy
    }

    // Internals.

    fn sibling_slot(tree: &AvrTree, sibling: AvrId) -> (AvrId, usize) {
        let parent = tree
            .node(sibling)
            .parent
            .expect("sibling insertion next to a detached node");
        let at = tree
            .node(parent)
            .children
            .iter()
            .position(|&c| c == sibling)
            .expect("node missing from its parent's child list");
        (parent, at)
    }

    fn attach(tree: &mut AvrTree, parent: AvrId, at: usize, node: AvrId) {
        Self::attach_no_split(tree, parent, at, node);
        let p = tree.node_mut(parent);
        if p.kind.is_if() && at <= p.then_split {
            p.then_split += 1;
        }
    }

    fn attach_no_split(tree: &mut AvrTree, parent: AvrId, at: usize, node: AvrId) {
        assert!(
            tree.node(node).parent.is_none(),
            "node is already attached; detach it first"
        );
        tree.node_mut(parent).children.insert(at, node);
        tree.node_mut(node).parent = Some(parent);
    }
}
