// src/errors/avr.rs
//! AVR operation errors (E5xxx).

use miette::Diagnostic;
use thiserror::Error;

use crate::avr::AvrKind;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum AvrError {
    /// The requested operation (clone, code generation) is not implemented
    /// for this node kind. Callers abort the enclosing transformation; there
    /// is no silent fallback.
    #[error("{op} is not supported for {kind:?} node <{number}>")]
    #[diagnostic(code(E5001))]
    Unsupported {
        op: &'static str,
        kind: AvrKind,
        number: u32,
    },
}
