// src/avr/codegen.rs
//! AVR code generation.
//!
//! Walks the tree in pre-order. Every BB-family statement node clones its
//! underlying instruction, renames the clone with the fixed suffix when it
//! produces a value, and replaces the original in place; the node is then
//! re-pointed at the replacement. An if node shares its condition
//! instruction with the statement node that computes it, so the statement
//! does the clone and the if is re-pointed at the same replacement
//! afterwards. Labels and loops generate nothing.
//!
//! HL-family nodes are not code-generated here; hitting one aborts the walk
//! with `Unsupported` and the caller gives up on the transformation.

use rustc_hash::FxHashMap;

use crate::errors::AvrError;
use crate::identity::{AvrId, InstId};
use crate::ir;

use super::{AvrData, AvrKind, AvrTree};

pub fn run(tree: &mut AvrTree, root: AvrId, func: &mut ir::Function) -> Result<(), AvrError> {
    let order = tree.preorder(root);
    let mut replaced: FxHashMap<InstId, InstId> = FxHashMap::default();

    for &id in &order {
        let node = tree.node(id);
        let kind = node.kind();

        if kind.is_hl_family() {
            return Err(AvrError::Unsupported {
                op: "code generation",
                kind,
                number: node.number(),
            });
        }
        if !kind.is_bb_stmt() {
            continue;
        }

        let AvrData::Inst(inst) = node.data() else {
            unreachable!("BB statement node without an instruction back-reference");
        };
        let replacement = func.clone_and_replace(inst);
        replaced.insert(inst, replacement);
        tree.node_mut(id).data = AvrData::Inst(replacement);
        tracing::trace!(
            number = tree.node(id).number(),
            old = inst.index(),
            new = replacement.index(),
            "code-generated AVR statement"
        );
    }

    // Condition instructions are shared between an if node and the
    // statement that computed them; follow the statement's replacement.
    for &id in &order {
        if tree.node(id).kind() != AvrKind::IfBb {
            continue;
        }
        let AvrData::Inst(cond) = tree.node(id).data() else {
            continue;
        };
        if let Some(&clone) = replaced.get(&cond) {
            tree.node_mut(id).data = AvrData::Inst(clone);
        }
    }
    Ok(())
}
