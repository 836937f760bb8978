// src/vplan/tests.rs

use smallvec::smallvec;

use super::*;
use crate::errors::Violation;
use crate::identity::{BlockId, ConstId, VpBlockId};
use crate::ir;

struct LoopPlan {
    plan: VPlan,
    region: VpBlockId,
    ph: VpBlockId,
    h: VpBlockId,
    latch: VpBlockId,
    ex: VpBlockId,
    vpli: VpLoopInfo,
    li: ir::LoopInfo,
}

/// One well-formed loop region: preheader -> header -> latch, with the
/// latch either looping back or leaving through the exit block.
fn single_loop_plan() -> LoopPlan {
    let mut plan = VPlan::new();
    let ph = plan.create_block("ph");
    let h = plan.create_block("h");
    let latch = plan.create_block("latch");
    let ex = plan.create_block("ex");

    plan.connect(ph, h);
    plan.connect(h, latch);
    plan.connect(latch, h);
    plan.connect(latch, ex);

    let cond = plan.add_instruction(
        latch,
        VpInstruction {
            kind: VpInstKind::Ir(None),
            opcode: VpOpcode::ICmp,
            operands: smallvec![],
        },
    );
    plan.set_condition_bit(latch, cond);

    let mut vpli = VpLoopInfo::new();
    let lp = vpli.add_loop(VpLoop {
        preheader: ph,
        header: h,
        blocks: vec![ph, h, latch],
        exits: vec![ex],
        parent: None,
    });

    let region = plan.create_loop_region("loop.region", ph, ex, 4, Some(lp));
    for b in [ph, h, latch, ex] {
        plan.set_parent(b, region);
    }
    plan.set_entry(region);

    let mut li = ir::LoopInfo::new();
    li.add_loop(ir::Loop::new(BlockId::new(0)), None);

    LoopPlan {
        plan,
        region,
        ph,
        h,
        latch,
        ex,
        vpli,
        li,
    }
}

fn verify(p: &LoopPlan) -> Vec<Violation> {
    VPlanVerifier::new(&p.plan)
        .with_loop_info(&p.vpli)
        .with_underlying_loops(&p.li)
        .verify(p.region)
}

#[test]
fn well_formed_loop_plan_verifies() {
    let p = single_loop_plan();
    assert_eq!(verify(&p), vec![]);
}

#[test]
fn branching_block_without_condition_bit_is_flagged() {
    let mut p = single_loop_plan();
    p.plan.block_mut(p.latch).condition_bit = None;

    let violations = verify(&p);
    assert_eq!(
        violations,
        vec![Violation::MissingConditionBit {
            block: "latch".to_string()
        }]
    );
}

#[test]
fn loop_region_without_descriptor_is_flagged() {
    let mut p = single_loop_plan();
    if let VpBlockKind::Region(r) = &mut p.plan.block_mut(p.region).kind {
        r.vp_loop = None;
    }

    let violations = verify(&p);
    assert!(violations.contains(&Violation::MissingVpLoop {
        region: "loop.region".to_string()
    }));
}

#[test]
fn entry_must_be_the_loop_preheader() {
    let mut p = single_loop_plan();
    // Claim the header is the preheader; the region entry no longer agrees.
    let header = p.h;
    let lp = p.vpli.loop_of(p.ph).unwrap();
    let mut vpli = VpLoopInfo::new();
    let moved = p.vpli.get(lp).clone();
    vpli.add_loop(VpLoop {
        preheader: header,
        ..moved
    });
    p.vpli = vpli;

    let violations = verify(&p);
    assert!(violations.contains(&Violation::EntryNotPreheader {
        region: "loop.region".to_string()
    }));
}

#[test]
fn declared_size_must_match_extent() {
    let mut p = single_loop_plan();
    if let VpBlockKind::Region(r) = &mut p.plan.block_mut(p.region).kind {
        r.size = 7;
    }

    let violations = verify(&p);
    assert!(violations.contains(&Violation::SizeMismatch {
        region: "loop.region".to_string(),
        declared: 7,
        actual: 4,
    }));
}

#[test]
fn contained_block_with_foreign_parent_is_flagged() {
    let mut p = single_loop_plan();
    p.plan.block_mut(p.latch).parent = None;

    let violations = verify(&p);
    assert!(violations.contains(&Violation::WrongParent {
        region: "loop.region".to_string(),
        block: "latch".to_string(),
    }));
}

#[test]
fn one_sided_edges_are_asymmetric() {
    let mut p = single_loop_plan();
    // Successor entry without the matching predecessor entry.
    p.plan.block_mut(p.h).successors.push(p.ex);

    let violations = verify(&p);
    assert!(violations.contains(&Violation::AsymmetricLink {
        from: "h".to_string(),
        to: "ex".to_string(),
    }));
}

#[test]
fn duplicate_edges_are_flagged_on_both_ends() {
    let mut p = single_loop_plan();
    p.plan.connect(p.ph, p.h);

    let violations = verify(&p);
    assert!(violations.contains(&Violation::DuplicateLink {
        block: "ph".to_string(),
        other: "h".to_string(),
    }));
    assert!(violations.contains(&Violation::DuplicateLink {
        block: "h".to_string(),
        other: "ph".to_string(),
    }));
}

#[test]
fn links_may_not_escape_the_region() {
    let mut p = single_loop_plan();
    let outside = p.plan.create_block("outside");
    p.plan.connect(outside, p.h);

    let violations = verify(&p);
    assert!(violations.contains(&Violation::EscapingLink {
        block: "h".to_string(),
        other: "outside".to_string(),
    }));
}

#[test]
fn loop_counts_must_agree_across_all_three_views() {
    let mut p = single_loop_plan();
    p.li.add_loop(ir::Loop::new(BlockId::new(1)), None);

    let violations = verify(&p);
    assert!(violations.contains(&Violation::LoopCountMismatch {
        regions: 1,
        vp_loops: 1,
        ir_loops: 2,
    }));
}

#[test]
fn straight_line_non_loop_region_is_degenerate() {
    let mut plan = VPlan::new();
    let a = plan.create_block("a");
    let b = plan.create_block("b");
    plan.connect(a, b);
    let region = plan.create_region("seq", a, b, 2);
    plan.set_parent(a, region);
    plan.set_parent(b, region);

    let violations = VPlanVerifier::new(&plan).verify(region);
    assert_eq!(
        violations,
        vec![Violation::DegenerateRegion {
            region: "seq".to_string()
        }]
    );
}

#[test]
fn disconnect_removes_both_directions() {
    let mut plan = VPlan::new();
    let a = plan.create_block("a");
    let b = plan.create_block("b");
    plan.connect(a, b);
    plan.disconnect(a, b);

    assert!(plan.block(a).successors.is_empty());
    assert!(plan.block(b).predecessors.is_empty());
}

#[test]
fn constants_and_instructions_share_the_value_arena() {
    let mut plan = VPlan::new();
    let bb = plan.create_block("bb");
    let k = plan.create_constant(ConstId::new(0));
    let inst = plan.add_instruction(
        bb,
        VpInstruction {
            kind: VpInstKind::Ir(None),
            opcode: VpOpcode::Add,
            operands: smallvec![k],
        },
    );

    assert_eq!(plan.value(k), &VpValue::Constant(ConstId::new(0)));
    match plan.value(inst) {
        VpValue::Instruction(i) => assert_eq!(i.operands.as_slice(), [k]),
        other => panic!("expected instruction, got {other:?}"),
    }
}
