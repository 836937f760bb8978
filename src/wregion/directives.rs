// src/wregion/directives.rs
//! The closed directive vocabulary.
//!
//! Directive intrinsics carry one of these strings. The vocabulary is flat
//! and closed; dispatch is string lookup, and anything outside the table is
//! ignored by the builder for forward compatibility.

use super::WRegionKind;

/// A recognized directive string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Begin(WRegionKind),
    End(WRegionKind),
    Qualifier(QualName),
}

/// The three qualifier payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualShape {
    /// Name only; presence is the information.
    Bare,
    /// Name plus exactly one value.
    Operand,
    /// Name plus a list of values, possibly with a trailing payload.
    OperandList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualName {
    Private,
    NumThreads,
    If,
    ProcBindMaster,
    ProcBindClose,
    ProcBindSpread,
    DefaultNone,
    DefaultShared,
    Safelen,
    Simdlen,
    Collapse,
    Aligned,
    Lastprivate,
    LastprivateNonPod,
}

impl QualName {
    pub fn shape(self) -> QualShape {
        match self {
            QualName::ProcBindMaster
            | QualName::ProcBindClose
            | QualName::ProcBindSpread
            | QualName::DefaultNone
            | QualName::DefaultShared => QualShape::Bare,
            QualName::NumThreads
            | QualName::If
            | QualName::Safelen
            | QualName::Simdlen
            | QualName::Collapse => QualShape::Operand,
            QualName::Private
            | QualName::Aligned
            | QualName::Lastprivate
            | QualName::LastprivateNonPod => QualShape::OperandList,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualName::Private => "QUAL.OMP.PRIVATE",
            QualName::NumThreads => "QUAL.OMP.NUM_THREADS",
            QualName::If => "QUAL.OMP.IF",
            QualName::ProcBindMaster => "QUAL.OMP.PROCBIND.MASTER",
            QualName::ProcBindClose => "QUAL.OMP.PROCBIND.CLOSE",
            QualName::ProcBindSpread => "QUAL.OMP.PROCBIND.SPREAD",
            QualName::DefaultNone => "QUAL.OMP.DEFAULT.NONE",
            QualName::DefaultShared => "QUAL.OMP.DEFAULT.SHARED",
            QualName::Safelen => "QUAL.OMP.SAFELEN",
            QualName::Simdlen => "QUAL.OMP.SIMDLEN",
            QualName::Collapse => "QUAL.OMP.COLLAPSE",
            QualName::Aligned => "QUAL.OMP.ALIGNED",
            QualName::Lastprivate => "QUAL.OMP.LASTPRIVATE",
            QualName::LastprivateNonPod => "QUAL.OMP.LASTPRIVATE:NONPOD",
        }
    }
}

/// Looks up a directive string. `None` means the string is outside the
/// vocabulary and must be ignored.
pub fn parse_directive(name: &str) -> Option<Directive> {
    let dir = match name {
        "DIR.OMP.PARALLEL" => Directive::Begin(WRegionKind::Parallel),
        "DIR.OMP.END.PARALLEL" => Directive::End(WRegionKind::Parallel),
        "DIR.OMP.SIMD" => Directive::Begin(WRegionKind::VecLoop),
        "DIR.OMP.END.SIMD" => Directive::End(WRegionKind::VecLoop),
        "QUAL.OMP.PRIVATE" => Directive::Qualifier(QualName::Private),
        "QUAL.OMP.NUM_THREADS" => Directive::Qualifier(QualName::NumThreads),
        "QUAL.OMP.IF" => Directive::Qualifier(QualName::If),
        "QUAL.OMP.PROCBIND.MASTER" => Directive::Qualifier(QualName::ProcBindMaster),
        "QUAL.OMP.PROCBIND.CLOSE" => Directive::Qualifier(QualName::ProcBindClose),
        "QUAL.OMP.PROCBIND.SPREAD" => Directive::Qualifier(QualName::ProcBindSpread),
        "QUAL.OMP.DEFAULT.NONE" => Directive::Qualifier(QualName::DefaultNone),
        "QUAL.OMP.DEFAULT.SHARED" => Directive::Qualifier(QualName::DefaultShared),
        "QUAL.OMP.SAFELEN" => Directive::Qualifier(QualName::Safelen),
        "QUAL.OMP.SIMDLEN" => Directive::Qualifier(QualName::Simdlen),
        "QUAL.OMP.COLLAPSE" => Directive::Qualifier(QualName::Collapse),
        "QUAL.OMP.ALIGNED" => Directive::Qualifier(QualName::Aligned),
        "QUAL.OMP.LASTPRIVATE" => Directive::Qualifier(QualName::Lastprivate),
        "QUAL.OMP.LASTPRIVATE:NONPOD" => Directive::Qualifier(QualName::LastprivateNonPod),
        _ => return None,
    };
    Some(dir)
}
