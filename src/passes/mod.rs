//! The contract optimization passes implement against the IR.
//!
//! The passes themselves (folding, peephole, check elimination, inlining)
//! live outside this crate; here is only the plumbing they plug into: a
//! [`Pass`] is run by a [`PassManager`] in registration order, and
//! [`PassVisitor`] offers the usual collect-then-mutate traversal: visit
//! the CFG in reverse postorder, gather candidate instructions, then edit.

use crate::graph::dfs;
use crate::ir::block::BlockId;
use crate::ir::function::Function;
use crate::ir::instr::ValueId;

/// A transformation over one function.
pub trait Pass {
    /// Apply the pass.
    fn run(&mut self, func: &mut Function);
}

/// Runs registered passes in order against one function.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        PassManager::default()
    }

    /// Append a pass to the pipeline.
    pub fn register_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    /// Run every registered pass, in registration order.
    pub fn run(&mut self, func: &mut Function) {
        for pass in &mut self.passes {
            pass.run(func);
        }
    }
}

/// Read-only traversal helper for passes that collect before mutating.
///
/// The default `visit_func` walks blocks in reverse postorder and
/// instructions front to back; override any level.
pub trait PassVisitor {
    /// Visit every reachable block of `func` in reverse postorder.
    fn visit_func(&mut self, func: &Function) {
        for block in dfs::reverse_postorder(func) {
            self.visit_block(func, block);
        }
    }

    /// Visit every instruction of `block`.
    fn visit_block(&mut self, func: &Function, block: BlockId) {
        for instr in func.instrs(block) {
            self.visit_instr(func, instr);
        }
    }

    /// Visit one instruction. The default does nothing.
    fn visit_instr(&mut self, _func: &Function, _instr: ValueId) {}
}

// =============================================================================
// Tests
// =============================================================================
