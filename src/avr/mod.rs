// src/avr/mod.rs
//! The Abstract Vector Representation (AVR).
//!
//! An AVR tree mirrors one underlying function as a hierarchy of typed
//! nodes: the function root, loops, ifs, and straight-line statements, with
//! expression and value sub-nodes on the HL side. Nodes carry a stable
//! subclass tag for cheap down-casting, a process-unique number, a parent
//! back-reference and an ordered child list.
//!
//! Nodes are created and destroyed exclusively through [`utils::AvrUtils`];
//! the tree arena itself only stores them. Underlying IR objects are
//! referenced by arena ID and never owned.

pub mod build;
pub mod codegen;
pub mod print;
pub mod utils;


pub use build::{AvrBuildOptions, AvrBuilder, HlAvrBuilder};
pub use print::AvrPrinter;
pub use utils::{AvrUtils, InsertPos};

use std::sync::atomic::{AtomicU32, Ordering};

use crate::identity::{
    AvrId, BlockId, DdRefId, HlGotoId, HlIfId, HlInstId, HlLabelId, HlLoopId, InstId, LoopId,
};

/// Indentation per tree depth when printing.
pub const TAB_WIDTH: usize = 2;

/// Print verbosity. Levels are cumulative: each level includes the
/// information of the levels below it, so the `(<n>) ` number prefix of
/// [`Verbosity::Number`] appears at every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Number,
    AvrType,
    DataType,
    Base,
}

/// Subclass tag of an AVR node. The set is closed; type inquiry is tag
/// comparison, never dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvrKind {
    Function,
    LoopBb,
    LoopHl,
    IfBb,
    IfHl,
    AssignBb,
    AssignHl,
    LabelBb,
    LabelHl,
    BranchBb,
    BranchHl,
    Phi,
    Call,
    FBranch,
    BackEdge,
    Entry,
    Return,
    ExpressionHl,
    ValueHl,
}

impl AvrKind {
    /// The name printed at `Verbosity::AvrType` and above.
    pub fn type_name(self) -> &'static str {
        match self {
            AvrKind::Function => "FUNCTION",
            AvrKind::LoopBb | AvrKind::LoopHl => "LOOP",
            AvrKind::IfBb | AvrKind::IfHl => "IF",
            AvrKind::AssignBb | AvrKind::AssignHl => "ASSIGN",
            AvrKind::LabelBb | AvrKind::LabelHl => "LABEL",
            AvrKind::BranchBb | AvrKind::BranchHl => "BRANCH",
            AvrKind::Phi => "PHI",
            AvrKind::Call => "CALL",
            AvrKind::FBranch => "FBRANCH",
            AvrKind::BackEdge => "BACKEDGE",
            AvrKind::Entry => "ENTRY",
            AvrKind::Return => "RETURN",
            AvrKind::ExpressionHl => "EXPR",
            AvrKind::ValueHl => "VALUE",
        }
    }

    pub fn is_loop(self) -> bool {
        matches!(self, AvrKind::LoopBb | AvrKind::LoopHl)
    }

    pub fn is_if(self) -> bool {
        matches!(self, AvrKind::IfBb | AvrKind::IfHl)
    }

    pub fn is_label(self) -> bool {
        matches!(self, AvrKind::LabelBb | AvrKind::LabelHl)
    }

    /// Statement-like nodes wrapping exactly one BB-IR instruction.
    pub fn is_bb_stmt(self) -> bool {
        matches!(
            self,
            AvrKind::AssignBb
                | AvrKind::BranchBb
                | AvrKind::Phi
                | AvrKind::Call
                | AvrKind::FBranch
                | AvrKind::BackEdge
                | AvrKind::Entry
                | AvrKind::Return
        )
    }

    pub fn is_bb_family(self) -> bool {
        self.is_bb_stmt() || matches!(self, AvrKind::LoopBb | AvrKind::IfBb | AvrKind::LabelBb)
    }

    pub fn is_hl_family(self) -> bool {
        matches!(
            self,
            AvrKind::LoopHl
                | AvrKind::IfHl
                | AvrKind::AssignHl
                | AvrKind::LabelHl
                | AvrKind::BranchHl
                | AvrKind::ExpressionHl
                | AvrKind::ValueHl
        )
    }
}

/// The underlying IR object an AVR node shadows. Which variant is legal is
/// dictated by the node's kind; the factory enforces the pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvrData {
    /// Function roots carry no single underlying object; the function is
    /// supplied at print/codegen time.
    Function,
    Block(BlockId),
    Inst(InstId),
    Loop(LoopId),
    HlInst(HlInstId),
    HlLoop(HlLoopId),
    HlIf(HlIfId),
    HlLabel(HlLabelId),
    HlGoto(HlGotoId),
    DdRef(DdRefId),
}

#[derive(Debug)]
pub struct AvrNode {
    number: u32,
    kind: AvrKind,
    data: AvrData,
    parent: Option<AvrId>,
    children: Vec<AvrId>,
    /// For if nodes: children `[0, then_split)` are the then-side,
    /// `[then_split, len)` the else-side. Unused otherwise.
    then_split: usize,
}

impl AvrNode {
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> AvrKind {
        self.kind
    }

    pub fn data(&self) -> AvrData {
        self.data
    }

    pub fn parent(&self) -> Option<AvrId> {
        self.parent
    }

    pub fn children(&self) -> &[AvrId] {
        &self.children
    }

    pub fn then_children(&self) -> &[AvrId] {
        &self.children[..self.then_split]
    }

    pub fn else_children(&self) -> &[AvrId] {
        &self.children[self.then_split..]
    }
}

/// Process-wide counter behind the default [`NumberSource`].
static NEXT_NUMBER: AtomicU32 = AtomicU32::new(0);

/// Source of unique, non-zero AVR node numbers.
///
/// The default instance draws from one process-wide atomic counter, which
/// keeps numbers unique across trees even when functions are processed on
/// different threads. Tests can substitute a local source for deterministic
/// numbering.
#[derive(Debug)]
pub enum NumberSource {
    Process,
    Local(AtomicU32),
}

impl NumberSource {
    pub fn process() -> Self {
        NumberSource::Process
    }

    pub fn local() -> Self {
        NumberSource::Local(AtomicU32::new(0))
    }

    pub fn next(&self) -> u32 {
        match self {
            NumberSource::Process => NEXT_NUMBER.fetch_add(1, Ordering::Relaxed) + 1,
            NumberSource::Local(counter) => counter.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }
}

impl Default for NumberSource {
    fn default() -> Self {
        NumberSource::Process
    }
}

/// Arena of AVR nodes for one function. Slots of destroyed nodes are
/// vacated, never reused; accessing a vacated slot is a programmer error.
#[derive(Debug, Default)]
pub struct AvrTree {
    slots: Vec<Option<AvrNode>>,
    root: Option<AvrId>,
    numbers: NumberSource,
}

impl AvrTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numbering(numbers: NumberSource) -> Self {
        Self {
            numbers,
            ..Self::default()
        }
    }

    /// The unique function root, once created.
    pub fn root(&self) -> Option<AvrId> {
        self.root
    }

    pub fn node(&self, id: AvrId) -> &AvrNode {
        self.slots[id.index() as usize]
            .as_ref()
            .expect("access to destroyed AVR node")
    }

    pub(crate) fn node_mut(&mut self, id: AvrId) -> &mut AvrNode {
        self.slots[id.index() as usize]
            .as_mut()
            .expect("access to destroyed AVR node")
    }

    pub(crate) fn alloc(&mut self, kind: AvrKind, data: AvrData) -> AvrId {
        let id = AvrId::new(self.slots.len() as u32);
        let number = self.numbers.next();
        self.slots.push(Some(AvrNode {
            number,
            kind,
            data,
            parent: None,
            children: Vec::new(),
            then_split: 0,
        }));
        tracing::trace!(number, ?kind, "created AVR node");
        id
    }

    pub(crate) fn free(&mut self, id: AvrId) {
        if self.root == Some(id) {
            self.root = None;
        }
        self.slots[id.index() as usize] = None;
    }

    pub(crate) fn set_root(&mut self, id: AvrId) {
        assert!(
            self.root.is_none(),
            "AVR tree already has a function root"
        );
        self.root = Some(id);
    }

    /// Whether `id` still refers to a live node.
    pub fn is_live(&self, id: AvrId) -> bool {
        self.slots[id.index() as usize].is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = AvrId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| AvrId::new(i as u32)))
    }

    /// Distance to the root following parent links.
    pub fn depth(&self, id: AvrId) -> usize {
        let mut depth = 0;
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.node(p).parent;
        }
        depth
    }

    /// Parent-before-children, left-to-right traversal from `id`.
    pub fn preorder(&self, id: AvrId) -> Vec<AvrId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            order.push(n);
            for &child in self.node(n).children().iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}
