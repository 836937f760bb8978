// src/errors/verifier.rs
//! VPlan verifier invariant violations (E4xxx).
//!
//! Each variant names one invariant of the hierarchical CFG contract and
//! identifies the offending block or region by name. The verifier collects
//! these without mutating the plan; an empty list means the plan verified.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error(
        "loop count mismatch: {regions} loop regions, {vp_loops} VPLoops, \
         {ir_loops} underlying loops"
    )]
    #[diagnostic(code(E4001))]
    LoopCountMismatch {
        regions: usize,
        vp_loops: usize,
        ir_loops: usize,
    },

    #[error("loop region '{region}' has no VPLoop attached")]
    #[diagnostic(code(E4002))]
    MissingVpLoop { region: String },

    #[error("loop region '{region}' entry is not the loop preheader")]
    #[diagnostic(code(E4003))]
    EntryNotPreheader { region: String },

    #[error("preheader of loop region '{region}' has {count} successors, expected 1 (the header)")]
    #[diagnostic(code(E4004))]
    PreheaderSuccessors { region: String, count: usize },

    #[error("VPLoopInfo does not map preheader/header of loop region '{region}' to its VPLoop")]
    #[diagnostic(code(E4005))]
    LoopInfoMismatch { region: String },

    #[error("block '{block}' of loop region '{region}' is not contained in the parent loop")]
    #[diagnostic(code(E4006))]
    UncontainedLoopBlock { region: String, block: String },

    #[error("block '{block}' belongs to the loop of region '{region}' but lies outside it")]
    #[diagnostic(code(E4007))]
    LoopBlockOutsideRegion { region: String, block: String },

    #[error("entry of region '{region}' is itself a region")]
    #[diagnostic(code(E4008))]
    EntryIsRegion { region: String },

    #[error("exit of region '{region}' is itself a region")]
    #[diagnostic(code(E4009))]
    ExitIsRegion { region: String },

    #[error("entry of region '{region}' has predecessors")]
    #[diagnostic(code(E4010))]
    EntryHasPredecessors { region: String },

    #[error("exit of region '{region}' has successors")]
    #[diagnostic(code(E4011))]
    ExitHasSuccessors { region: String },

    #[error(
        "non-loop region '{region}' is degenerate: entry has fewer than two \
         successors and exit has fewer than two predecessors"
    )]
    #[diagnostic(code(E4012))]
    DegenerateRegion { region: String },

    #[error("region '{region}' declares size {declared} but contains {actual} blocks")]
    #[diagnostic(code(E4013))]
    SizeMismatch {
        region: String,
        declared: u32,
        actual: u32,
    },

    #[error("block '{block}' has the wrong parent, expected region '{region}'")]
    #[diagnostic(code(E4014))]
    WrongParent { region: String, block: String },

    #[error("block '{block}' has multiple successors but no condition bit")]
    #[diagnostic(code(E4015))]
    MissingConditionBit { block: String },

    #[error("link between '{from}' and '{to}' is not bi-directional")]
    #[diagnostic(code(E4016))]
    AsymmetricLink { from: String, to: String },

    #[error("block '{block}' lists '{other}' more than once as successor or predecessor")]
    #[diagnostic(code(E4017))]
    DuplicateLink { block: String, other: String },

    #[error("block '{block}' links to '{other}' outside its region")]
    #[diagnostic(code(E4018))]
    EscapingLink { block: String, other: String },
}
