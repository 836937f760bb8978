// src/errors/wregion.rs
//! WRegion builder errors (E3xxx).
//!
//! These report violations of the `BEGIN`/`END` bracketing grammar. The
//! builder rejects the offending intrinsic, records the error, and keeps
//! going; the produced forest contains everything that was well-bracketed.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum WRegionError {
    #[error("END directive '{found}' does not match open {open} region <{number}>")]
    #[diagnostic(code(E3001))]
    MismatchedRegion {
        /// Name of the region kind currently on top of the stack.
        open: String,
        /// The END directive string that was encountered.
        found: String,
        /// Unique number of the open region.
        number: u32,
    },

    #[error("END directive '{name}' with no open region")]
    #[diagnostic(code(E3002))]
    StrayEnd { name: String },

    #[error("qualifier '{name}' outside any region")]
    #[diagnostic(code(E3003))]
    StrayQualifier { name: String },
}
