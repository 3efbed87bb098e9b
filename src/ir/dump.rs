//! Debug dumps: plain-text IR listing and DOT export of the CFG.
//!
//! Informational only: nothing in the analyses consumes this output.

use std::fmt::Write as FmtWrite;
use std::io::{self, Write};
use std::path::Path;

use super::function::Function;
use super::instr::{InstrKind, ValueId};
use crate::graph::dfs;

fn value_name(func: &Function, id: ValueId) -> String {
    match func.value(id).param_name() {
        Some(name) => name.to_string(),
        None => format!("v{}", id.index()),
    }
}

fn write_instr(func: &Function, id: ValueId, out: &mut String) {
    let instr = func.instr(id);
    let ty = func.value(id).ty();
    match instr.kind() {
        InstrKind::Const(value) => {
            let _ = write!(out, "{} = const.{} {}", value_name(func, id), ty, value);
        }
        InstrKind::Bin { op } => {
            let _ = write!(
                out,
                "{} = {}.{} {}, {}",
                value_name(func, id),
                op,
                ty,
                value_name(func, instr.input(0)),
                value_name(func, instr.input(1)),
            );
        }
        InstrKind::Unary { op } => {
            let _ = write!(
                out,
                "{} = {}.{} {}",
                value_name(func, id),
                op,
                ty,
                value_name(func, instr.input(0)),
            );
        }
        InstrKind::Cast => {
            let _ = write!(
                out,
                "{} = cast.{} {}",
                value_name(func, id),
                ty,
                value_name(func, instr.input(0)),
            );
        }
        InstrKind::Phi { .. } => {
            let _ = write!(out, "{} = phi.{} ", value_name(func, id), ty);
            for (i, (value, block)) in instr.incoming().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(
                    out,
                    "[{}, bb{}]",
                    value_name(func, value),
                    func.block(block).id()
                );
            }
        }
        InstrKind::Call { callee } => {
            let _ = write!(out, "{} = call.{} f{}(", value_name(func, id), ty, callee.index());
            for (i, &arg) in instr.inputs().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&value_name(func, arg));
            }
            out.push(')');
        }
        InstrKind::If { true_blk, false_blk } => {
            let _ = write!(
                out,
                "if {}, bb{}, bb{}",
                value_name(func, instr.input(0)),
                func.block(*true_blk).id(),
                func.block(*false_blk).id(),
            );
        }
        InstrKind::Branch { target } => {
            let _ = write!(out, "br bb{}", func.block(*target).id());
        }
        InstrKind::Ret => {
            let _ = write!(out, "ret {}", value_name(func, instr.input(0)));
        }
    }
}

/// Render the function as a plain-text listing.
pub fn function_to_string(func: &Function) -> String {
    let mut out = String::new();
    let _ = write!(out, "fn {}(", func.name());
    for (i, &p) in func.params().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}: {}", value_name(func, p), func.value(p).ty());
    }
    let _ = writeln!(out, ") -> {} {{", func.ret_ty());
    for block in func.block_ids() {
        let _ = writeln!(out, "bb{}:", func.block(block).id());
        for id in func.instrs(block) {
            out.push_str("  ");
            write_instr(func, id, &mut out);
            out.push('\n');
        }
    }
    out.push_str("}\n");
    out
}

/// Write the CFG as a DOT digraph: one node per block, one edge per
/// predecessor link, emitted in DFS preorder.
pub fn dot_dump<W: Write>(func: &Function, out: &mut W, graph_name: &str) -> io::Result<()> {
    writeln!(out, "digraph {graph_name} {{")?;
    for node in dfs::preorder(func) {
        let id = func.block(node).id();
        writeln!(out, "bb{id} [label=\"{id}\"];")?;
        for &pred in func.block(node).preds() {
            writeln!(out, "bb{} -> bb{};", func.block(pred).id(), id)?;
        }
    }
    writeln!(out, "}}")
}

/// Write the DOT digraph to a file.
pub fn dot_dump_path(func: &Function, path: &Path, graph_name: &str) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    dot_dump(func, &mut file, graph_name)
}

// =============================================================================
// Tests
// =============================================================================
