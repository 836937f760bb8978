// src/vplan/verifier.rs
//! The plan verifier.
//!
//! Proves or refutes the structural contract of a plan: the loop audit
//! cross-checks loop regions against the VPLoop side table and the
//! underlying IR loops, then the region audit checks every region's
//! entry/exit shape, size, parenthood, condition bits and link symmetry.
//! Findings are collected as [`Violation`]s; the verifier never mutates
//! the plan. An empty report means the plan verified.

use rustc_hash::FxHashSet;

use crate::errors::Violation;
use crate::identity::{VpBlockId, VpLoopId};
use crate::ir;

use super::{VPlan, VpLoopInfo, VpRegion};

pub struct VPlanVerifier<'a> {
    plan: &'a VPlan,
    vpli: Option<&'a VpLoopInfo>,
    li: Option<&'a ir::LoopInfo>,
}

impl<'a> VPlanVerifier<'a> {
    pub fn new(plan: &'a VPlan) -> Self {
        Self {
            plan,
            vpli: None,
            li: None,
        }
    }

    pub fn with_loop_info(mut self, vpli: &'a VpLoopInfo) -> Self {
        self.vpli = Some(vpli);
        self
    }

    pub fn with_underlying_loops(mut self, li: &'a ir::LoopInfo) -> Self {
        self.li = Some(li);
        self
    }

    /// Audits the plan from `root`, which must be the outermost region.
    pub fn verify(&self, root: VpBlockId) -> Vec<Violation> {
        let mut violations = Vec::new();
        let regions = self.regions_under(root);

        self.verify_loops(&regions, &mut violations);
        for &region in &regions {
            self.verify_region(region, &mut violations);
        }

        tracing::debug!(
            regions = regions.len(),
            violations = violations.len(),
            "verified plan"
        );
        violations
    }

    // Pass 1: loop audit.

    fn verify_loops(&self, regions: &[VpBlockId], out: &mut Vec<Violation>) {
        let Some(vpli) = self.vpli else {
            return;
        };

        let loop_regions: Vec<VpBlockId> = regions
            .iter()
            .copied()
            .filter(|&r| self.region_of(r).is_loop)
            .collect();

        if let Some(li) = self.li {
            if loop_regions.len() != vpli.loop_count() || vpli.loop_count() != li.loop_count() {
                out.push(Violation::LoopCountMismatch {
                    regions: loop_regions.len(),
                    vp_loops: vpli.loop_count(),
                    ir_loops: li.loop_count(),
                });
            }
        }

        for region in loop_regions {
            self.verify_loop_region(region, vpli, out);
        }
    }

    fn verify_loop_region(&self, region: VpBlockId, vpli: &VpLoopInfo, out: &mut Vec<Violation>) {
        let r = self.region_of(region);
        let Some(lp_id) = r.vp_loop else {
            out.push(Violation::MissingVpLoop {
                region: self.name(region),
            });
            return;
        };
        let lp = vpli.get(lp_id);

        if r.entry != lp.preheader {
            out.push(Violation::EntryNotPreheader {
                region: self.name(region),
            });
        }

        let preheader_succs = &self.plan.block(lp.preheader).successors;
        if preheader_succs.len() != 1 || preheader_succs[0] != lp.header {
            out.push(Violation::PreheaderSuccessors {
                region: self.name(region),
                count: preheader_succs.len(),
            });
        }

        if vpli.loop_of(lp.preheader) != Some(lp_id) || vpli.loop_of(lp.header) != Some(lp_id) {
            out.push(Violation::LoopInfoMismatch {
                region: self.name(region),
            });
        }

        if let Some(parent) = lp.parent {
            self.check_parent_containment(region, lp_id, parent, vpli, out);
        }

        // Every block the side table claims for the loop must sit inside
        // this region.
        for &block in &lp.blocks {
            if block != region && !self.is_inside(block, region) {
                out.push(Violation::LoopBlockOutsideRegion {
                    region: self.name(region),
                    block: self.name(block),
                });
            }
        }
    }

    fn check_parent_containment(
        &self,
        region: VpBlockId,
        lp_id: VpLoopId,
        parent: VpLoopId,
        vpli: &VpLoopInfo,
        out: &mut Vec<Violation>,
    ) {
        let lp = vpli.get(lp_id);
        let parent_blocks = &vpli.get(parent).blocks;
        for block in std::iter::once(lp.preheader).chain(lp.exits.iter().copied()) {
            if !parent_blocks.contains(&block) {
                out.push(Violation::UncontainedLoopBlock {
                    region: self.name(region),
                    block: self.name(block),
                });
            }
        }
    }

    // Pass 2: region audit.

    fn verify_region(&self, region: VpBlockId, out: &mut Vec<Violation>) {
        let r = self.region_of(region).clone();
        let name = self.name(region);

        if self.plan.block(r.entry).is_region() {
            out.push(Violation::EntryIsRegion {
                region: name.clone(),
            });
        }
        if self.plan.block(r.exit).is_region() {
            out.push(Violation::ExitIsRegion {
                region: name.clone(),
            });
        }
        if !self.plan.block(r.entry).predecessors.is_empty() {
            out.push(Violation::EntryHasPredecessors {
                region: name.clone(),
            });
        }
        if !self.plan.block(r.exit).successors.is_empty() {
            out.push(Violation::ExitHasSuccessors {
                region: name.clone(),
            });
        }

        if !r.is_loop
            && self.plan.block(r.entry).successors.len() < 2
            && self.plan.block(r.exit).predecessors.len() < 2
        {
            out.push(Violation::DegenerateRegion {
                region: name.clone(),
            });
        }

        let contained = self.contained_blocks(&r);
        if r.size != contained.len() as u32 {
            out.push(Violation::SizeMismatch {
                region: name.clone(),
                declared: r.size,
                actual: contained.len() as u32,
            });
        }

        let member_set: FxHashSet<VpBlockId> = contained.iter().copied().collect();
        for &block in &contained {
            self.verify_member(block, region, &name, &member_set, out);
        }
    }

    fn verify_member(
        &self,
        block: VpBlockId,
        region: VpBlockId,
        region_name: &str,
        members: &FxHashSet<VpBlockId>,
        out: &mut Vec<Violation>,
    ) {
        let b = self.plan.block(block);

        if b.parent != Some(region) {
            out.push(Violation::WrongParent {
                region: region_name.to_string(),
                block: self.name(block),
            });
        }

        if b.successors.len() >= 2 && b.condition_bit.is_none() {
            out.push(Violation::MissingConditionBit {
                block: self.name(block),
            });
        }

        for list in [&b.successors, &b.predecessors] {
            for (i, &other) in list.iter().enumerate() {
                if list[..i].contains(&other) {
                    out.push(Violation::DuplicateLink {
                        block: self.name(block),
                        other: self.name(other),
                    });
                }
            }
        }

        for &succ in &b.successors {
            if !self.plan.block(succ).predecessors.contains(&block) {
                out.push(Violation::AsymmetricLink {
                    from: self.name(block),
                    to: self.name(succ),
                });
            }
            if !members.contains(&succ) {
                out.push(Violation::EscapingLink {
                    block: self.name(block),
                    other: self.name(succ),
                });
            }
        }
        for &pred in &b.predecessors {
            if !self.plan.block(pred).successors.contains(&block) {
                out.push(Violation::AsymmetricLink {
                    from: self.name(pred),
                    to: self.name(block),
                });
            }
            if !members.contains(&pred) {
                out.push(Violation::EscapingLink {
                    block: self.name(block),
                    other: self.name(pred),
                });
            }
        }
    }

    // Shared plumbing.

    /// `root` plus every region reachable through nested containment.
    fn regions_under(&self, root: VpBlockId) -> Vec<VpBlockId> {
        let mut regions = Vec::new();
        let mut work = vec![root];
        while let Some(block) = work.pop() {
            let Some(r) = self.plan.block(block).region() else {
                continue;
            };
            regions.push(block);
            work.extend(self.contained_blocks(r));
        }
        regions
    }

    /// Blocks reachable from the region's entry without walking past its
    /// exit. This is the region's extent; parent pointers are checked
    /// against it, not trusted to define it.
    fn contained_blocks(&self, r: &VpRegion) -> Vec<VpBlockId> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut work = vec![r.entry];
        while let Some(block) = work.pop() {
            if !seen.insert(block) {
                continue;
            }
            order.push(block);
            if block == r.exit {
                continue;
            }
            work.extend(self.plan.block(block).successors.iter().copied());
        }
        order
    }

    fn is_inside(&self, block: VpBlockId, region: VpBlockId) -> bool {
        let mut cur = self.plan.block(block).parent;
        while let Some(p) = cur {
            if p == region {
                return true;
            }
            cur = self.plan.block(p).parent;
        }
        false
    }

    fn region_of(&self, block: VpBlockId) -> &VpRegion {
        self.plan
            .block(block)
            .region()
            .expect("region audit reached a non-region block")
    }

    fn name(&self, block: VpBlockId) -> String {
        self.plan.block(block).name.clone()
    }
}
