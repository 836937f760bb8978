// src/vplan/mod.rs
//! The VPlan hierarchical CFG.
//!
//! A plan models candidate vector control flow as a graph of blocks, where
//! a block is either a basic block of plan instructions or a region
//! wrapping a single-entry single-exit subgraph. Loop regions carry a loop
//! descriptor from the [`loop_info`] side table. The [`verifier`] audits a
//! plan against the structural contract without mutating it.

pub mod cfg;
pub mod loop_info;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use cfg::{VPlan, VpBlock, VpBlockKind, VpRegion};
pub use loop_info::{VpLoop, VpLoopInfo};
pub use verifier::VPlanVerifier;

use smallvec::SmallVec;

use crate::identity::{ConstId, InstId, VpValueId};

/// A value in the plan: a constant or a plan instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VpValue {
    Constant(ConstId),
    Instruction(VpInstruction),
}

/// Instruction sub-kind. Today every instruction is IR-backed (possibly
/// detached from its origin); the tag leaves room for synthetic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpInstKind {
    Ir(Option<InstId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpOpcode {
    Add,
    Sub,
    Mul,
    ICmp,
    Phi,
    Call,
    Branch,
    Load,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpInstruction {
    pub kind: VpInstKind,
    pub opcode: VpOpcode,
    pub operands: SmallVec<[VpValueId; 2]>,
}
