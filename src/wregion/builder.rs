// src/wregion/builder.rs
//! The stack automaton that turns directive intrinsics into a WRegion
//! forest.
//!
//! Directive instructions are consumed in block order. `BEGIN` pushes a new
//! region under the current top of stack; qualifiers attach to the top by
//! shape; `END` must match the top's kind and pops. Bracketing violations
//! reject the offending intrinsic and are collected, never fatal; the
//! resulting forest contains everything that was well-bracketed.

use crate::errors::WRegionError;
use crate::identity::WrId;
use crate::ir::{self, InstKind, ValueRef};

use super::directives::{parse_directive, Directive, QualName, QualShape};
use super::{NonPodHooks, OpndListQual, WRegionForest};

pub struct WRegionBuilder<'a> {
    func: &'a ir::Function,
}

impl<'a> WRegionBuilder<'a> {
    pub fn new(func: &'a ir::Function) -> Self {
        Self { func }
    }

    pub fn build(&self) -> (WRegionForest, Vec<WRegionError>) {
        let mut forest = WRegionForest::new();
        let mut errors = Vec::new();
        let mut stack: Vec<WrId> = Vec::new();

        for block in self.func.block_ids() {
            for &inst_id in &self.func.block(block).insts {
                let InstKind::Directive { name, args } = &self.func.inst(inst_id).kind else {
                    continue;
                };
                let Some(directive) = parse_directive(name) else {
                    tracing::debug!(directive = %name, "ignoring unrecognized directive");
                    continue;
                };

                match directive {
                    Directive::Begin(kind) => {
                        let id = forest.create(kind, stack.last().copied());
                        forest.node_mut(id).set_entry(block);
                        stack.push(id);
                    }
                    Directive::End(kind) => match stack.last().copied() {
                        None => errors.push(WRegionError::StrayEnd { name: name.clone() }),
                        Some(top) if forest.node(top).kind() != kind => {
                            errors.push(WRegionError::MismatchedRegion {
                                open: forest.node(top).kind().name().to_string(),
                                found: name.clone(),
                                number: forest.node(top).number(),
                            });
                        }
                        Some(top) => {
                            forest.node_mut(top).set_exit(block);
                            stack.pop();
                        }
                    },
                    Directive::Qualifier(qual) => match stack.last().copied() {
                        None => {
                            errors.push(WRegionError::StrayQualifier { name: name.clone() })
                        }
                        Some(top) => self.attach_qualifier(&mut forest, top, qual, args),
                    },
                }
            }
        }

        for &open in &stack {
            tracing::debug!(
                number = forest.node(open).number(),
                kind = forest.node(open).kind().name(),
                "region still open at end of function"
            );
        }
        tracing::debug!(
            function = %self.func.name,
            regions = forest.len(),
            errors = errors.len(),
            "built work-region forest"
        );
        (forest, errors)
    }

    fn attach_qualifier(
        &self,
        forest: &mut WRegionForest,
        top: WrId,
        qual: QualName,
        args: &[ValueRef],
    ) {
        match qual.shape() {
            QualShape::Bare => forest.node_mut(top).add_bare(qual),
            QualShape::Operand => {
                let Some(&value) = args.first() else {
                    tracing::debug!(qualifier = qual.as_str(), "operand qualifier without value");
                    return;
                };
                forest.node_mut(top).set_operand(qual, value);
            }
            QualShape::OperandList => {
                let list = self.decode_list(qual, args);
                forest.node_mut(top).add_list(list);
            }
        }
    }

    /// Splits an operand-list payload into its items and, depending on the
    /// qualifier, a trailing alignment constant or non-POD hook triple.
    fn decode_list(&self, qual: QualName, args: &[ValueRef]) -> OpndListQual {
        let mut items = args.to_vec();
        let mut align = 0;
        let mut hooks = None;

        match qual {
            QualName::Aligned => {
                // A trailing integer constant is the alignment request.
                if let Some(&ValueRef::Const(c)) = items.last() {
                    let k = *self.func.constant(c);
                    if k.ty.is_int() {
                        items.pop();
                        if k.value >= 0 {
                            align = k.value as u64;
                        } else {
                            tracing::debug!(
                                value = k.value,
                                "ignoring negative alignment request"
                            );
                        }
                    }
                }
            }
            QualName::LastprivateNonPod => {
                if items.len() >= 3 {
                    let tail = items.split_off(items.len() - 3);
                    hooks = Some(NonPodHooks {
                        ctor: tail[0],
                        assign: tail[1],
                        dtor: tail[2],
                    });
                } else {
                    tracing::debug!(
                        qualifier = qual.as_str(),
                        "non-POD qualifier without hook triple"
                    );
                }
            }
            _ => {}
        }

        OpndListQual {
            qual,
            items,
            align,
            hooks,
        }
    }
}
