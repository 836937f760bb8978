// src/wregion/mod.rs
//! The work-region (WRegion) tree.
//!
//! A second hierarchy layered over directive intrinsics: matching
//! `BEGIN`/`END` brackets delimit structured regions (parallel regions,
//! SIMD loops) and qualifier intrinsics attach clause payloads to the
//! innermost open region. The tree is a forest; a function can carry any
//! number of top-level regions.
//!
//! Region numbers come from their own process-wide counter, independent of
//! AVR numbering.

pub mod builder;
pub mod directives;


pub use builder::WRegionBuilder;
pub use directives::{parse_directive, Directive, QualName, QualShape};

use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::identity::{BlockId, WrId};
use crate::ir::ValueRef;

static NEXT_NUMBER: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WRegionKind {
    Parallel,
    VecLoop,
}

impl WRegionKind {
    pub fn name(self) -> &'static str {
        match self {
            WRegionKind::Parallel => "PARALLEL",
            WRegionKind::VecLoop => "SIMD",
        }
    }
}

/// Lifecycle of one region. `Constructed` regions have no entry block yet;
/// qualifiers only attach to `Open` regions; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    Constructed,
    Open,
    Closed,
}

/// Copy/assign/destroy hooks carried by `LASTPRIVATE:NONPOD` for items
/// whose type needs user-defined lifetime management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonPodHooks {
    pub ctor: ValueRef,
    pub assign: ValueRef,
    pub dtor: ValueRef,
}

/// One operand-list qualifier instance. Instances are kept in encounter
/// order; the same qualifier name may appear more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpndListQual {
    pub qual: QualName,
    pub items: Vec<ValueRef>,
    /// `ALIGNED` only: alignment in bytes, 0 when unspecified.
    pub align: u64,
    /// `LASTPRIVATE:NONPOD` only.
    pub hooks: Option<NonPodHooks>,
}

#[derive(Debug)]
pub struct WRegionNode {
    number: u32,
    kind: WRegionKind,
    entry: Option<BlockId>,
    exit: Option<BlockId>,
    parent: Option<WrId>,
    children: Vec<WrId>,
    bare: FxHashSet<QualName>,
    opnd: FxHashMap<QualName, ValueRef>,
    lists: Vec<OpndListQual>,
    state: RegionState,
}

impl WRegionNode {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> WRegionKind {
        self.kind
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.entry
    }

    pub fn exit(&self) -> Option<BlockId> {
        self.exit
    }

    pub fn parent(&self) -> Option<WrId> {
        self.parent
    }

    pub fn children(&self) -> &[WrId] {
        &self.children
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    pub fn has_bare(&self, qual: QualName) -> bool {
        self.bare.contains(&qual)
    }

    /// The value of a single-operand qualifier. Re-attachment overwrites.
    pub fn operand(&self, qual: QualName) -> Option<ValueRef> {
        self.opnd.get(&qual).copied()
    }

    /// Operand-list qualifier instances in encounter order.
    pub fn operand_lists(&self) -> &[OpndListQual] {
        &self.lists
    }

    pub(crate) fn set_entry(&mut self, block: BlockId) {
        debug_assert_eq!(self.state, RegionState::Constructed);
        self.entry = Some(block);
        self.state = RegionState::Open;
    }

    pub(crate) fn set_exit(&mut self, block: BlockId) {
        debug_assert_eq!(self.state, RegionState::Open);
        self.exit = Some(block);
        self.state = RegionState::Closed;
    }

    pub(crate) fn add_bare(&mut self, qual: QualName) {
        debug_assert_eq!(self.state, RegionState::Open);
        self.bare.insert(qual);
    }

    pub(crate) fn set_operand(&mut self, qual: QualName, value: ValueRef) {
        debug_assert_eq!(self.state, RegionState::Open);
        self.opnd.insert(qual, value);
    }

    pub(crate) fn add_list(&mut self, list: OpndListQual) {
        debug_assert_eq!(self.state, RegionState::Open);
        self.lists.push(list);
    }
}

/// All regions of one function, plus the top-level roots in source order.
#[derive(Debug, Default)]
pub struct WRegionForest {
    nodes: Vec<WRegionNode>,
    roots: Vec<WrId>,
}

impl WRegionForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&mut self, kind: WRegionKind, parent: Option<WrId>) -> WrId {
        let id = WrId::new(self.nodes.len() as u32);
        let number = NEXT_NUMBER.fetch_add(1, Ordering::Relaxed) + 1;
        self.nodes.push(WRegionNode {
            number,
            kind,
            entry: None,
            exit: None,
            parent,
            children: Vec::new(),
            bare: FxHashSet::default(),
            opnd: FxHashMap::default(),
            lists: Vec::new(),
            state: RegionState::Constructed,
        });
        match parent {
            Some(p) => self.nodes[p.index() as usize].children.push(id),
            None => self.roots.push(id),
        }
        tracing::trace!(number, ?kind, "created work region");
        id
    }

    pub fn node(&self, id: WrId) -> &WRegionNode {
        &self.nodes[id.index() as usize]
    }

    pub(crate) fn node_mut(&mut self, id: WrId) -> &mut WRegionNode {
        &mut self.nodes[id.index() as usize]
    }

    pub fn roots(&self) -> &[WrId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WrId> {
        (0..self.nodes.len() as u32).map(WrId::new)
    }
}
