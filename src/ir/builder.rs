//! IR construction.
//!
//! [`IrBuilder`] owns an insertion cursor (block + optional position) and a
//! constructor per instruction kind. Every constructor wires the operand/user
//! edge pair; `branch`/`cond_br` also wire block adjacency, true target
//! first, which fixes the successor order every downstream analysis sees.

use super::function::{FuncId, Function};
use super::instr::{InstrKind, Opcode, ValueId};
use super::block::BlockId;
use super::types::{ConstValue, Type};
use smallvec::SmallVec;

/// Cursor-based instruction factory for one function.
pub struct IrBuilder<'f> {
    func: &'f mut Function,
    block: BlockId,
    /// Insert before this instruction; `INVALID` appends at the block end.
    before: ValueId,
}

impl<'f> IrBuilder<'f> {
    /// Create a builder with no insertion point.
    pub fn new(func: &'f mut Function) -> Self {
        IrBuilder {
            func,
            block: BlockId::INVALID,
            before: ValueId::INVALID,
        }
    }

    /// Append new instructions at the end of `block`.
    pub fn set_insert_point_block(&mut self, block: BlockId) {
        self.block = block;
        self.before = ValueId::INVALID;
    }

    /// Insert new instructions before `instr`.
    pub fn set_insert_point(&mut self, instr: ValueId) {
        self.block = self.func.instr(instr).parent();
        debug_assert!(self.block.is_valid(), "insert point is a detached instruction");
        self.before = instr;
    }

    /// The function being built.
    pub fn func(&self) -> &Function {
        self.func
    }

    fn insert(&mut self, ty: Type, kind: InstrKind, inputs: &[ValueId]) -> ValueId {
        debug_assert!(self.block.is_valid(), "builder has no insertion point");
        let id = self.func.alloc_instr(ty, kind);
        for &op in inputs {
            self.func.add_input(id, op);
        }
        self.func.insert_instr(self.block, id, self.before);
        id
    }

    // =========================================================================
    // Constants
    // =========================================================================

    /// A constant of any width.
    pub fn iconst(&mut self, value: ConstValue) -> ValueId {
        self.insert(value.ty(), InstrKind::Const(value), &[])
    }

    pub fn iconst_i1(&mut self, value: bool) -> ValueId {
        self.iconst(ConstValue::I1(value))
    }

    pub fn iconst_i8(&mut self, value: i8) -> ValueId {
        self.iconst(ConstValue::I8(value))
    }

    pub fn iconst_i16(&mut self, value: i16) -> ValueId {
        self.iconst(ConstValue::I16(value))
    }

    pub fn iconst_i32(&mut self, value: i32) -> ValueId {
        self.iconst(ConstValue::I32(value))
    }

    pub fn iconst_i64(&mut self, value: i64) -> ValueId {
        self.iconst(ConstValue::I64(value))
    }

    // =========================================================================
    // Data flow
    // =========================================================================

    /// A binary operation. Both operands must have the same type; the result
    /// takes the left operand's type.
    pub fn binop(&mut self, op: Opcode, lhs: ValueId, rhs: ValueId) -> ValueId {
        debug_assert!(op.is_binary(), "binop with non-binary opcode {op}");
        debug_assert_eq!(
            self.func.value(lhs).ty(),
            self.func.value(rhs).ty(),
            "binop operand types differ"
        );
        let ty = self.func.value(lhs).ty();
        self.insert(ty, InstrKind::Bin { op }, &[lhs, rhs])
    }

    /// A unary operation; the result takes the operand's type.
    pub fn unary(&mut self, op: Opcode, value: ValueId) -> ValueId {
        debug_assert!(op.is_unary(), "unary with non-unary opcode {op}");
        let ty = self.func.value(value).ty();
        self.insert(ty, InstrKind::Unary { op }, &[value])
    }

    /// A width conversion to `ty`.
    pub fn cast(&mut self, ty: Type, value: ValueId) -> ValueId {
        self.insert(ty, InstrKind::Cast, &[value])
    }

    /// An empty phi of type `ty`; wire incoming values with
    /// [`Function::phi_add_incoming`].
    pub fn phi(&mut self, ty: Type) -> ValueId {
        self.insert(
            ty,
            InstrKind::Phi {
                blocks: SmallVec::new(),
            },
            &[],
        )
    }

    /// A call returning `ty`.
    pub fn call(&mut self, ty: Type, callee: FuncId, args: &[ValueId]) -> ValueId {
        self.insert(ty, InstrKind::Call { callee }, args)
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    /// An unconditional branch; links `current -> target`.
    pub fn branch(&mut self, target: BlockId) -> ValueId {
        let id = self.insert(Type::None, InstrKind::Branch { target }, &[]);
        self.func.link_blocks(self.block, target);
        id
    }

    /// A conditional branch; links the true target first, then the false one.
    pub fn cond_br(&mut self, cond: ValueId, true_blk: BlockId, false_blk: BlockId) -> ValueId {
        let id = self.insert(
            Type::None,
            InstrKind::If { true_blk, false_blk },
            &[cond],
        );
        self.func.link_blocks(self.block, true_blk);
        self.func.link_blocks(self.block, false_blk);
        id
    }

    /// A return of `value`.
    pub fn ret(&mut self, value: ValueId) -> ValueId {
        self.insert(Type::None, InstrKind::Ret, &[value])
    }
}

// =============================================================================
// Tests
// =============================================================================
