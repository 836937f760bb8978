// src/identity.rs
//! First-class identity types for the arenas in this crate.
//!
//! Every arena hands out a u32 newtype handle. The handles are type-safe:
//! an `InstId` cannot be confused with a `BlockId` even though both index a
//! `Vec`. Back-references between the core trees and the underlying IRs are
//! always expressed through these handles, never through owning pointers.

macro_rules! define_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_id! {
    /// Identity for a BB-IR instruction.
    pub struct InstId;
}

define_id! {
    /// Identity for a BB-IR basic block.
    pub struct BlockId;
}

define_id! {
    /// Identity for a BB-IR function argument.
    pub struct ArgId;
}

define_id! {
    /// Identity for a BB-IR constant.
    pub struct ConstId;
}

define_id! {
    /// Identity for a BB-IR natural loop in `LoopInfo`.
    pub struct LoopId;
}

define_id! {
    /// Identity for a high-level IR instruction.
    pub struct HlInstId;
}

define_id! {
    /// Identity for a high-level IR loop.
    pub struct HlLoopId;
}

define_id! {
    /// Identity for a high-level IR structured if.
    pub struct HlIfId;
}

define_id! {
    /// Identity for a high-level IR label.
    pub struct HlLabelId;
}

define_id! {
    /// Identity for a high-level IR goto.
    pub struct HlGotoId;
}

define_id! {
    /// Identity for a data-dependence reference.
    pub struct DdRefId;
}

define_id! {
    /// Identity for an AVR node in an `AvrTree`.
    pub struct AvrId;
}

define_id! {
    /// Identity for a work-region node in a `WRegionForest`.
    pub struct WrId;
}

define_id! {
    /// Identity for a VPlan block (basic block or region).
    pub struct VpBlockId;
}

define_id! {
    /// Identity for a VPlan value (constant or instruction).
    pub struct VpValueId;
}

define_id! {
    /// Identity for a VPlan loop descriptor in `VpLoopInfo`.
    pub struct VpLoopId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_index() {
        let id = InstId::new(42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn ids_are_ordered_by_index() {
        assert!(BlockId::new(1) < BlockId::new(2));
    }
}
