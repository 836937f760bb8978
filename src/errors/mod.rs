// src/errors/mod.rs
//! Structured error reporting for the vectorizer core.
//!
//! Error codes are grouped by area:
//! - E3xxx: WRegion bracket grammar errors
//! - E4xxx: VPlan verifier invariant violations
//! - E5xxx: AVR operation errors
//!
//! Everything here is surfaced as a value; nothing in this module aborts.
//! The only fatal class in the core is a programmer error (an unreachable
//! case), which panics at the site that detects it.

pub mod avr;
pub mod verifier;
pub mod wregion;

pub use avr::AvrError;
pub use verifier::Violation;
pub use wregion::WRegionError;
