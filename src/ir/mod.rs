//! The IR data model: arena-allocated values, instructions, basic blocks and
//! functions, plus the construction API and debug dumps.

pub mod arena;
pub mod block;
pub mod builder;
pub mod dump;
pub mod function;
pub mod instr;
pub mod types;

pub use arena::{Arena, BitSet, Id, SecondaryMap};
pub use block::{BasicBlock, BlockId, LiveInterval};
pub use builder::IrBuilder;
pub use function::{FuncId, Function, Module};
pub use instr::{Instr, InstrKind, Opcode, Value, ValueId, ValueKind};
pub use types::{ConstValue, Type};
