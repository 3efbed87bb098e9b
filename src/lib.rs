//! SSA middle-end for the Lumen VM.
//!
//! This crate is the analysis core that sits between bytecode translation and
//! code generation:
//!
//! - **IR** (`ir`): arena-allocated CFG of basic blocks and instructions with
//!   def-use chains, plus the construction/mutation surface (`IrBuilder`,
//!   block linking, splitting, erasure) and debug dumps
//! - **Graph algorithms** (`graph`): generic depth-first search and the
//!   semi-dominator based dominator tree
//! - **Analyses** (`analysis`): natural-loop tree, loop-aware linear block
//!   order, liveness intervals, linear-scan register allocation
//! - **Pass plumbing** (`passes`): the contract optimization passes implement
//!   against the IR
//!
//! Everything is single-threaded batch computation: each builder consumes a
//! CFG snapshot and returns an immutable result. Structural mutation of the
//! IR invalidates previously computed analyses; re-running the builders is
//! the caller's responsibility.

pub mod analysis;
pub mod graph;
pub mod ir;
pub mod passes;

pub use analysis::linear_order::LinearOrderBuilder;
pub use analysis::liveness::{Liveness, LivenessBuilder};
pub use analysis::loops::{Loop, LoopId, LoopTree, LoopTreeBuilder};
pub use analysis::regalloc::{Location, RegAllocBuilder, RegAllocation};
pub use graph::dfs::{self, DfsVisitor};
pub use graph::domtree::{DomTree, DomTreeBuilder};
pub use graph::GraphView;
pub use ir::block::{BasicBlock, BlockId, LiveInterval};
pub use ir::builder::IrBuilder;
pub use ir::function::{FuncId, Function, Module};
pub use ir::instr::{Instr, InstrKind, Opcode, Value, ValueId, ValueKind};
pub use ir::types::{ConstValue, Type};
pub use passes::{Pass, PassManager, PassVisitor};
