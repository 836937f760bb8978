// src/avr/print.rs
//! Textual dump of an AVR tree.
//!
//! Each node line is indented by `depth * TAB_WIDTH` spaces and prefixed
//! with `(<n>) `. Higher verbosity levels add the node type name, the data
//! type, and finally the underlying-IR detail. The format is a debugging
//! contract, not a stable output.

use std::fmt::{self, Write};

use crate::hir::HlFunction;
use crate::identity::AvrId;
use crate::ir;

use super::{AvrData, AvrKind, AvrTree, Verbosity, TAB_WIDTH};

pub struct AvrPrinter<'a> {
    tree: &'a AvrTree,
    bb: Option<&'a ir::Function>,
    li: Option<&'a ir::LoopInfo>,
    hl: Option<&'a HlFunction>,
}

impl<'a> AvrPrinter<'a> {
    pub fn for_bb(tree: &'a AvrTree, func: &'a ir::Function) -> Self {
        Self {
            tree,
            bb: Some(func),
            li: None,
            hl: None,
        }
    }

    pub fn for_hl(tree: &'a AvrTree, func: &'a HlFunction) -> Self {
        Self {
            tree,
            bb: None,
            li: None,
            hl: Some(func),
        }
    }

    /// Attach loop information so loop nodes can print their header block.
    pub fn with_loop_info(mut self, li: &'a ir::LoopInfo) -> Self {
        self.li = Some(li);
        self
    }

    /// Prints the whole tree from its function root.
    pub fn print(&self, out: &mut impl Write, verbosity: Verbosity) -> fmt::Result {
        match self.tree.root() {
            Some(root) => self.print_node(out, root, 0, verbosity),
            None => Ok(()),
        }
    }

    pub fn to_string(&self, verbosity: Verbosity) -> String {
        let mut s = String::new();
        self.print(&mut s, verbosity)
            .expect("formatting into a String cannot fail");
        s
    }

    pub fn print_node(
        &self,
        out: &mut impl Write,
        id: AvrId,
        depth: usize,
        verbosity: Verbosity,
    ) -> fmt::Result {
        let node = self.tree.node(id);
        let indent = " ".repeat(depth * TAB_WIDTH);

        write!(out, "{indent}({}) ", node.number())?;
        if verbosity >= Verbosity::AvrType {
            write!(out, "{}", node.kind().type_name())?;
            if node.kind() == AvrKind::Function {
                write!(out, " {}", self.function_header())?;
            } else {
                if verbosity >= Verbosity::DataType {
                    if let Some(ty) = self.data_type(node.data()) {
                        write!(out, " {ty}")?;
                    }
                }
                if verbosity >= Verbosity::Base {
                    if let Some(detail) = self.base_detail(node.data()) {
                        write!(out, " {detail}")?;
                    }
                }
            }
        }
        writeln!(out)?;

        if node.children().is_empty() {
            return Ok(());
        }

        // Container nodes print a brace-enclosed body.
        writeln!(out, "{indent}{{")?;
        for &child in node.children() {
            self.print_node(out, child, depth + 1, verbosity)?;
        }
        writeln!(out, "{indent}}}")
    }

    fn function_header(&self) -> String {
        if let Some(f) = self.bb {
            let args: Vec<String> = f
                .args()
                .iter()
                .map(|a| format!("{} {}", a.ty, a.name))
                .collect();
            format!("{}({})", f.name, args.join(", "))
        } else if let Some(f) = self.hl {
            format!("{}()", f.name)
        } else {
            "ANON()".to_string()
        }
    }

    fn data_type(&self, data: AvrData) -> Option<String> {
        match data {
            AvrData::Inst(id) => {
                let ty = self.bb?.inst(id).ty;
                (!ty.is_void()).then(|| ty.to_string())
            }
            AvrData::HlInst(id) => {
                let ty = self.hl?.inst(id).ty;
                (!ty.is_void()).then(|| ty.to_string())
            }
            _ => None,
        }
    }

    fn base_detail(&self, data: AvrData) -> Option<String> {
        match data {
            AvrData::Inst(id) => {
                let inst = self.bb?.inst(id);
                if inst.name.is_empty() {
                    None
                } else {
                    Some(format!("%{}", inst.name))
                }
            }
            AvrData::Block(id) => Some(format!("{}:", self.bb?.block(id).name)),
            AvrData::Loop(id) => {
                let header = self.li?.get(id).header;
                Some(format!("header={}", self.bb?.block(header).name))
            }
            AvrData::HlInst(id) => Some(format!("%{}", self.hl?.inst(id).name)),
            AvrData::HlLabel(id) => Some(format!("{}:", self.hl?.label(id).name)),
            AvrData::DdRef(id) => Some(self.hl?.ddref(id).base.clone()),
            _ => None,
        }
    }
}
