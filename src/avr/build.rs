// src/avr/build.rs
//! Building AVR trees from the underlying IRs.
//!
//! The BB builder walks a function's blocks in layout order, nesting
//! `LoopBb` nodes by `LoopInfo` containment. By default the tree stays
//! lean: plain branch terminators, back-edges, directive intrinsics and
//! empty-block labels produce no nodes. The *stress* option builds the
//! full tree (labels, forward branches, back-edges) for exercising the
//! representation itself.
//!
//! A separate if-formation pass turns conditional-branch diamonds and
//! triangles whose arms stay in the same loop into `IfBb` nodes.
//!
//! The HL builder maps the structured loop-nest tree one-to-one onto the
//! HL node family, with expression/value sub-nodes over an instruction's
//! data-dependence operands.

use rustc_hash::FxHashMap;

use crate::hir::{HlFunction, HlNode};
use crate::identity::{AvrId, BlockId, LoopId};
use crate::ir::{self, InstKind, ValueRef};

use super::{AvrData, AvrKind, AvrTree, AvrUtils};

#[derive(Debug, Clone, Copy, Default)]
pub struct AvrBuildOptions {
    /// Build the full tree: labels for every block, forward branches and
    /// back-edges included.
    pub stress: bool,
}

pub struct AvrBuilder<'a> {
    func: &'a ir::Function,
    li: &'a ir::LoopInfo,
    opts: AvrBuildOptions,
}

impl<'a> AvrBuilder<'a> {
    pub fn new(func: &'a ir::Function, li: &'a ir::LoopInfo) -> Self {
        Self {
            func,
            li,
            opts: AvrBuildOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: AvrBuildOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Builds the base tree and returns the function root.
    pub fn build(&self, tree: &mut AvrTree) -> AvrId {
        let root = AvrUtils::create_avr_function(tree);
        let mut open_loops: Vec<(LoopId, AvrId)> = Vec::new();
        // One AVR node per loop for the whole walk, so a loop whose blocks
        // are split across the layout reopens its existing node.
        let mut loop_nodes: FxHashMap<LoopId, AvrId> = FxHashMap::default();

        for block in self.func.block_ids() {
            let innermost = self.li.loop_of(block);

            // Close loops the current block is no longer part of.
            while let Some(&(open, _)) = open_loops.last() {
                let still_inside =
                    innermost.is_some_and(|inner| self.li.encloses(open, inner));
                if still_inside {
                    break;
                }
                open_loops.pop();
            }

            // Open every loop on the chain from the deepest open one down
            // to the block's innermost loop, outermost first.
            if let Some(inner) = innermost {
                let mut chain = Vec::new();
                let mut cur = Some(inner);
                while let Some(l) = cur {
                    if open_loops.iter().any(|&(open, _)| open == l) {
                        break;
                    }
                    chain.push(l);
                    cur = self.li.get(l).parent;
                }
                for &l in chain.iter().rev() {
                    let parent = open_loops.last().map_or(root, |&(_, a)| a);
                    let avr_loop = match loop_nodes.get(&l) {
                        Some(&existing) => existing,
                        None => {
                            let node = AvrUtils::create_avr_loop(tree, l);
                            AvrUtils::insert_last_child(tree, parent, node);
                            loop_nodes.insert(l, node);
                            node
                        }
                    };
                    open_loops.push((l, avr_loop));
                }
            }

            let parent = open_loops.last().map_or(root, |&(_, a)| a);
            self.emit_block(tree, parent, block);
        }

        tracing::debug!(
            function = %self.func.name,
            nodes = tree.len(),
            "built abstract layer"
        );
        root
    }

    fn emit_block(&self, tree: &mut AvrTree, parent: AvrId, block: BlockId) {
        let insts = self.func.block(block).insts.clone();

        if self.opts.stress {
            let label = AvrUtils::create_avr_label(tree, block);
            AvrUtils::insert_last_child(tree, parent, label);
        }

        for inst_id in insts {
            let inst = self.func.inst(inst_id);
            let node = match &inst.kind {
                InstKind::Directive { .. } => None,
                InstKind::Phi { .. } => Some(AvrUtils::create_avr_phi(tree, inst_id)),
                InstKind::Call { .. } => Some(AvrUtils::create_avr_call(tree, inst_id)),
                InstKind::Binary { .. } | InstKind::ICmp { .. } => {
                    Some(AvrUtils::create_avr_assign(tree, inst_id))
                }
                InstKind::CondBr { .. } => Some(AvrUtils::create_avr_branch(tree, inst_id)),
                InstKind::Br { target } => {
                    if !self.opts.stress {
                        None
                    } else if self.is_backedge(block, *target) {
                        Some(AvrUtils::create_avr_backedge(tree, inst_id))
                    } else {
                        Some(AvrUtils::create_avr_fbranch(tree, inst_id))
                    }
                }
                InstKind::Ret { .. } => Some(AvrUtils::create_avr_return(tree, inst_id)),
            };
            if let Some(node) = node {
                AvrUtils::insert_last_child(tree, parent, node);
            }
        }
    }

    fn is_backedge(&self, from: BlockId, target: BlockId) -> bool {
        self.li
            .loop_of(from)
            .is_some_and(|l| self.li.get(l).header == target && self.li.get(l).contains(from))
    }

    /// If-formation: rewrites conditional-branch diamonds and triangles
    /// into `IfBb` nodes with then/else children. Only branches whose arm
    /// blocks sit in the same loop as the branch are candidates.
    pub fn form_ifs(&self, tree: &mut AvrTree) {
        let Some(root) = tree.root() else {
            return;
        };
        let candidates: Vec<AvrId> = tree
            .preorder(root)
            .into_iter()
            .filter(|&id| tree.node(id).kind() == AvrKind::BranchBb)
            .collect();

        for branch in candidates {
            if !tree.is_live(branch) {
                continue;
            }
            self.try_form_if(tree, branch);
        }
    }

    fn try_form_if(&self, tree: &mut AvrTree, branch: AvrId) {
        let AvrData::Inst(br_inst) = tree.node(branch).data() else {
            return;
        };
        let InstKind::CondBr {
            cond,
            then_dest,
            else_dest,
        } = self.func.inst(br_inst).kind
        else {
            return;
        };
        let ValueRef::Inst(cond_inst) = cond else {
            return;
        };

        let branch_block = self.func.inst(br_inst).block;
        let shape = self.if_shape(then_dest, else_dest);
        let Some(shape) = shape else {
            return;
        };

        // All arm blocks must share the branch's loop.
        let home = self.li.loop_of(branch_block);
        let same_loop = |b: BlockId| self.li.loop_of(b) == home;
        let arms_ok = match shape {
            IfShape::Triangle => same_loop(then_dest),
            IfShape::Diamond => same_loop(then_dest) && same_loop(else_dest),
        };
        if !arms_ok {
            return;
        }

        let Some(parent) = tree.node(branch).parent() else {
            return;
        };

        let if_node = AvrUtils::create_avr_if(tree, cond_inst);
        AvrUtils::insert_before(tree, branch, if_node);

        for node in self.sibling_nodes_of_block(tree, parent, then_dest) {
            AvrUtils::detach(tree, node);
            AvrUtils::insert_last_then_child(tree, if_node, node);
        }
        if shape == IfShape::Diamond {
            for node in self.sibling_nodes_of_block(tree, parent, else_dest) {
                AvrUtils::detach(tree, node);
                AvrUtils::insert_last_else_child(tree, if_node, node);
            }
        }

        AvrUtils::remove(tree, branch);
        tracing::trace!(
            number = tree.node(if_node).number(),
            "formed AVR if from conditional branch"
        );
    }

    fn if_shape(&self, then_dest: BlockId, else_dest: BlockId) -> Option<IfShape> {
        let then_target = self.plain_branch_target(then_dest)?;
        if then_target == else_dest {
            return Some(IfShape::Triangle);
        }
        let else_target = self.plain_branch_target(else_dest)?;
        (then_target == else_target).then_some(IfShape::Diamond)
    }

    fn plain_branch_target(&self, block: BlockId) -> Option<BlockId> {
        let term = self.func.terminator(block)?;
        match self.func.inst(term).kind {
            InstKind::Br { target } => Some(target),
            _ => None,
        }
    }

    /// Children of `parent` whose underlying object lives in `block`, in
    /// child order.
    fn sibling_nodes_of_block(
        &self,
        tree: &AvrTree,
        parent: AvrId,
        block: BlockId,
    ) -> Vec<AvrId> {
        tree.node(parent)
            .children()
            .iter()
            .copied()
            .filter(|&c| self.node_block(tree, c) == Some(block))
            .collect()
    }

    fn node_block(&self, tree: &AvrTree, id: AvrId) -> Option<BlockId> {
        match tree.node(id).data() {
            AvrData::Inst(i) => Some(self.func.inst(i).block),
            AvrData::Block(b) => Some(b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IfShape {
    Triangle,
    Diamond,
}

pub struct HlAvrBuilder<'a> {
    func: &'a HlFunction,
}

impl<'a> HlAvrBuilder<'a> {
    pub fn new(func: &'a HlFunction) -> Self {
        Self { func }
    }

    pub fn build(&self, tree: &mut AvrTree) -> AvrId {
        let root = AvrUtils::create_avr_function(tree);
        for &node in &self.func.top {
            let child = self.visit(tree, node);
            AvrUtils::insert_last_child(tree, root, child);
        }
        tracing::debug!(
            function = %self.func.name,
            nodes = tree.len(),
            "built abstract layer from HL-IR"
        );
        root
    }

    fn visit(&self, tree: &mut AvrTree, node: HlNode) -> AvrId {
        match node {
            HlNode::Inst(i) => {
                let assign = AvrUtils::create_avr_assign_hl(tree, i);
                let operands = self.func.inst(i).operands.clone();
                if !operands.is_empty() {
                    let expr = AvrUtils::create_avr_expression_hl(tree, i);
                    AvrUtils::insert_last_child(tree, assign, expr);
                    for ddref in operands {
                        let value = AvrUtils::create_avr_value_hl(tree, ddref);
                        AvrUtils::insert_last_child(tree, expr, value);
                    }
                }
                assign
            }
            HlNode::Loop(l) => {
                let avr_loop = AvrUtils::create_avr_loop_hl(tree, l);
                for &child in &self.func.hl_loop(l).children.clone() {
                    let c = self.visit(tree, child);
                    AvrUtils::insert_last_child(tree, avr_loop, c);
                }
                avr_loop
            }
            HlNode::If(f) => {
                let avr_if = AvrUtils::create_avr_if_hl(tree, f);
                let hl_if = self.func.hl_if(f).clone();
                for &child in &hl_if.then_children {
                    let c = self.visit(tree, child);
                    AvrUtils::insert_last_then_child(tree, avr_if, c);
                }
                for &child in &hl_if.else_children {
                    let c = self.visit(tree, child);
                    AvrUtils::insert_last_else_child(tree, avr_if, c);
                }
                avr_if
            }
            HlNode::Label(l) => AvrUtils::create_avr_label_hl(tree, l),
            HlNode::Goto(g) => AvrUtils::create_avr_branch_hl(tree, g),
        }
    }
}
