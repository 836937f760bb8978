// tests/scenarios.rs
//! End-to-end walks of the public API: IR in, trees and reports out.

use std::collections::HashSet;

use vecplan::avr::{codegen, AvrBuilder, AvrKind, AvrPrinter, AvrTree, AvrUtils, Verbosity};
use vecplan::identity::{BlockId, InstId};
use vecplan::ir::{self, BinOp, CmpPred, InstKind, Type, ValueRef};
use vecplan::wregion::{QualName, RegionState, WRegionBuilder, WRegionKind};

fn directive(f: &mut ir::Function, block: BlockId, name: &str, args: Vec<ValueRef>) {
    f.add_inst(
        block,
        "",
        Type::Void,
        InstKind::Directive {
            name: name.to_string(),
            args: args.into_iter().collect(),
        },
    );
}

/// A SIMD-annotated counted loop with one real statement in its body.
fn annotated_loop() -> (ir::Function, ir::LoopInfo) {
    let mut f = ir::Function::new("saxpy_ish");
    let a = f.add_arg("a", Type::I32);
    let entry = f.add_block("entry");
    let body = f.add_block("body");
    let exit = f.add_block("exit");

    let eight = f.add_const(8, Type::I32);
    directive(&mut f, entry, "DIR.OMP.SIMD", vec![]);
    directive(&mut f, entry, "QUAL.OMP.SAFELEN", vec![ValueRef::Const(eight)]);
    f.add_inst(entry, "", Type::Void, InstKind::Br { target: body });

    let x = f.add_inst(
        body,
        "x",
        Type::I32,
        InstKind::Binary {
            op: BinOp::Add,
            lhs: ValueRef::Arg(a),
            rhs: ValueRef::Const(eight),
        },
    );
    let c = f.add_inst(
        body,
        "c",
        Type::I1,
        InstKind::ICmp {
            pred: CmpPred::Slt,
            lhs: ValueRef::Inst(x),
            rhs: ValueRef::Arg(a),
        },
    );
    f.add_inst(
        body,
        "",
        Type::Void,
        InstKind::CondBr {
            cond: ValueRef::Inst(c),
            then_dest: body,
            else_dest: exit,
        },
    );

    directive(&mut f, exit, "DIR.OMP.END.SIMD", vec![]);
    f.add_inst(exit, "", Type::Void, InstKind::Ret { value: None });

    let mut li = ir::LoopInfo::new();
    let mut lp = ir::Loop::new(body);
    lp.preheader = Some(entry);
    lp.latch = Some(body);
    li.add_loop(lp, None);
    (f, li)
}

#[test]
fn annotated_loop_flows_through_both_trees_and_codegen() {
    let (mut f, li) = annotated_loop();

    // The same directive stream feeds the work-region forest.
    let (forest, errors) = WRegionBuilder::new(&f).build();
    assert!(errors.is_empty());
    assert_eq!(forest.roots().len(), 1);
    let simd = forest.node(forest.roots()[0]);
    assert_eq!(simd.kind(), WRegionKind::VecLoop);
    assert_eq!(simd.state(), RegionState::Closed);
    assert!(simd.operand(QualName::Safelen).is_some());

    // The abstract layer wraps the loop and its statements; directives and
    // plain branches leave no nodes behind.
    let mut tree = AvrTree::new();
    let builder = AvrBuilder::new(&f, &li);
    let root = builder.build(&mut tree);
    builder.form_ifs(&mut tree);

    let kinds: Vec<AvrKind> = tree
        .preorder(root)
        .into_iter()
        .map(|id| tree.node(id).kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            AvrKind::Function,
            AvrKind::LoopBb,
            AvrKind::AssignBb,
            AvrKind::AssignBb,
            AvrKind::BranchBb,
            AvrKind::Return,
        ]
    );

    codegen::run(&mut tree, root, &mut f).unwrap();
    let dump = AvrPrinter::for_bb(&tree, &f)
        .with_loop_info(&li)
        .to_string(Verbosity::Base);
    assert!(dump.contains("FUNCTION saxpy_ish(i32 a)"));
    assert!(dump.contains("%x.VPOClone"));
    assert!(dump.contains("header=body"));
}

#[test]
fn parallel_region_nests_its_simd_loop() {
    let mut f = ir::Function::new("nested");
    let b0 = f.add_block("par");
    let b1 = f.add_block("vec");
    let b2 = f.add_block("done");

    let p = f.add_arg("p", Type::Ptr);
    let q = f.add_arg("q", Type::Ptr);
    let four = f.add_const(4, Type::I32);

    directive(&mut f, b0, "DIR.OMP.PARALLEL", vec![]);
    directive(&mut f, b0, "QUAL.OMP.NUM_THREADS", vec![ValueRef::Const(four)]);
    directive(&mut f, b0, "QUAL.OMP.PROCBIND.CLOSE", vec![]);
    directive(&mut f, b1, "DIR.OMP.SIMD", vec![]);
    directive(&mut f, b1, "QUAL.OMP.PRIVATE", vec![ValueRef::Arg(p)]);
    directive(
        &mut f,
        b1,
        "QUAL.OMP.ALIGNED",
        vec![ValueRef::Arg(q), ValueRef::Const(four)],
    );
    directive(&mut f, b2, "DIR.OMP.END.SIMD", vec![]);
    directive(&mut f, b2, "DIR.OMP.END.PARALLEL", vec![]);

    let (forest, errors) = WRegionBuilder::new(&f).build();
    assert!(errors.is_empty());

    let par = forest.node(forest.roots()[0]);
    assert_eq!(par.kind(), WRegionKind::Parallel);
    assert!(par.has_bare(QualName::ProcBindClose));
    assert_eq!(par.children().len(), 1);

    let simd = forest.node(par.children()[0]);
    assert_eq!(simd.kind(), WRegionKind::VecLoop);
    let lists = simd.operand_lists();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0].qual, QualName::Private);
    assert_eq!(lists[1].qual, QualName::Aligned);
    assert_eq!(lists[1].align, 4);
}

#[test]
fn node_numbers_stay_unique_across_eight_threads() {
    const THREADS: usize = 8;
    const NODES_PER_THREAD: usize = 1_250;

    let mut all = Vec::with_capacity(THREADS * NODES_PER_THREAD);
    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            handles.push(scope.spawn(|| {
                let mut tree = AvrTree::new();
                AvrUtils::create_avr_function(&mut tree);
                for i in 0..NODES_PER_THREAD - 1 {
                    AvrUtils::create_avr_entry(&mut tree, InstId::new(i as u32));
                }
                tree.iter()
                    .map(|id| tree.node(id).number())
                    .collect::<Vec<u32>>()
            }));
        }
        for handle in handles {
            all.extend(handle.join().unwrap());
        }
    });

    assert_eq!(all.len(), THREADS * NODES_PER_THREAD);
    let distinct: HashSet<u32> = all.iter().copied().collect();
    assert_eq!(distinct.len(), all.len());
    assert!(all.iter().all(|&n| n != 0));
}
