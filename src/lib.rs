// src/lib.rs
//! Vectorizer middle-end core.
//!
//! Four cooperating layers, built leaves-first:
//!
//! - [`avr`]: the Abstract Vector Representation, a tree-shaped IR wrapping
//!   an underlying function for vector analyses.
//! - [`wregion`]: the work-region tree built from `BEGIN`/`END` directive
//!   intrinsics bracketing parallel and SIMD constructs.
//! - [`vplan`]: the vectorizer's plan, a hierarchical CFG of blocks and
//!   regions with its verifier.
//! - [`adapter`]: one small loop interface over both underlying loop shapes.
//!
//! The two underlying IRs ([`ir`] for the linear basic-block form, [`hir`]
//! for the high-level loop-nest form) are referenced by the core trees via
//! arena IDs and are never owned by them.

pub mod adapter;
pub mod avr;
pub mod errors;
pub mod hir;
pub mod identity;
pub mod ir;
pub mod vplan;
pub mod wregion;
