//! Functions and modules.
//!
//! A [`Function`] exclusively owns its basic blocks and values (parameters
//! and instructions) in two arenas. Blocks form an intrusive doubly-linked
//! list through the block arena; each block's instructions form one through
//! the value arena. Everything else (`preds`/`succs`, operand edges, user
//! sets) is a non-owning id into those arenas.
//!
//! Mutation discipline: block adjacency is only edited through
//! [`Function::link_blocks`]/[`Function::remove_link`]/
//! [`Function::update_terminator`]; operand/user edge pairs are only edited
//! through the builder and the mutation API here. Erasing an instruction
//! clears its operand edges first: dropping one without doing so leaves
//! dangling user entries.

use super::arena::{Arena, Id};
use super::block::{BasicBlock, BlockId};
use super::instr::{Instr, InstrKind, Value, ValueId, ValueKind};
use super::types::Type;
use crate::graph::GraphView;

/// Id of a [`Function`] within its [`Module`].
pub type FuncId = Id<Function>;

// =============================================================================
// Function
// =============================================================================

/// A single function: name, return type, parameters, and the CFG.
pub struct Function {
    name: String,
    ret_ty: Type,
    pub(crate) values: Arena<Value>,
    pub(crate) blocks: Arena<BasicBlock>,
    params: Vec<ValueId>,
    first_block: BlockId,
    last_block: BlockId,
    num_blocks: usize,
}

impl Function {
    /// Create an empty function.
    pub fn new(name: impl Into<String>, ret_ty: Type) -> Self {
        Function {
            name: name.into(),
            ret_ty,
            values: Arena::new(),
            blocks: Arena::new(),
            params: Vec::new(),
            first_block: BlockId::INVALID,
            last_block: BlockId::INVALID,
            num_blocks: 0,
        }
    }

    /// The function name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The return type.
    #[inline]
    pub fn ret_ty(&self) -> Type {
        self.ret_ty
    }

    /// The entry block. Panics if the function has no blocks yet.
    pub fn entry(&self) -> BlockId {
        debug_assert!(
            self.first_block.is_valid(),
            "function `{}` has no basic blocks",
            self.name
        );
        self.first_block
    }

    /// Number of basic blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Whether the function has no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_blocks == 0
    }

    /// Parameters in declaration order.
    #[inline]
    pub fn params(&self) -> &[ValueId] {
        &self.params
    }

    // =========================================================================
    // Entity access
    // =========================================================================

    /// A block by id.
    #[inline]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    /// A block by id, mutably.
    #[inline]
    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id]
    }

    /// A value by id.
    #[inline]
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id]
    }

    /// An instruction by id. Panics if `id` names a parameter.
    #[inline]
    pub fn instr(&self, id: ValueId) -> &Instr {
        self.values[id]
            .as_instr()
            .expect("value id does not name an instruction")
    }

    pub(crate) fn instr_mut(&mut self, id: ValueId) -> &mut Instr {
        self.values[id]
            .as_instr_mut()
            .expect("value id does not name an instruction")
    }

    /// Blocks in list order (creation order, minus removals).
    pub fn block_ids(&self) -> BlockIter<'_> {
        BlockIter {
            func: self,
            cur: self.first_block,
        }
    }

    /// Instructions of `block`, first to last.
    pub fn instrs(&self, block: BlockId) -> InstrIter<'_> {
        InstrIter {
            func: self,
            cur: self.blocks[block].first,
        }
    }

    /// Instructions of `block`, last to first.
    pub fn instrs_rev(&self, block: BlockId) -> InstrRevIter<'_> {
        InstrRevIter {
            func: self,
            cur: self.blocks[block].last,
        }
    }

    /// The leading phi instructions of `block`.
    pub fn phis(&self, block: BlockId) -> impl Iterator<Item = ValueId> + '_ {
        self.instrs(block).take_while(|&id| self.instr(id).is_phi())
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Append a new block, assigning the next display id.
    pub fn create_block(&mut self) -> BlockId {
        let display_id = if self.last_block.is_valid() {
            self.blocks[self.last_block].id + 1
        } else {
            0
        };
        let id = self.blocks.alloc(BasicBlock::new(display_id));
        if self.last_block.is_valid() {
            self.blocks[self.last_block].next = id;
            self.blocks[id].prev = self.last_block;
        } else {
            self.first_block = id;
        }
        self.last_block = id;
        self.num_blocks += 1;
        id
    }

    /// Append a new parameter value.
    pub fn create_param(&mut self, name: impl Into<String>, ty: Type) -> ValueId {
        let id = self
            .values
            .alloc(Value::new(ty, ValueKind::Param { name: name.into() }));
        self.params.push(id);
        id
    }

    /// Allocate a detached instruction value. The builder wires operands and
    /// inserts it into a block.
    pub(crate) fn alloc_instr(&mut self, ty: Type, kind: InstrKind) -> ValueId {
        self.values
            .alloc(Value::new(ty, ValueKind::Instr(Instr::new(kind))))
    }

    /// Record `operand` as an input of `instr`, maintaining the user edge.
    pub(crate) fn add_input(&mut self, instr: ValueId, operand: ValueId) {
        self.instr_mut(instr).inputs.push(operand);
        self.values[operand].users.insert(instr);
    }

    /// Append an incoming `(value, pred)` pair to a phi.
    pub fn phi_add_incoming(&mut self, phi: ValueId, value: ValueId, pred: BlockId) {
        self.add_input(phi, value);
        match &mut self.instr_mut(phi).kind {
            InstrKind::Phi { blocks } => blocks.push(pred),
            _ => panic!("phi_add_incoming on a non-phi instruction"),
        }
    }

    /// Insert a detached instruction into `block`, before `before` if valid,
    /// else at the end.
    pub(crate) fn insert_instr(&mut self, block: BlockId, id: ValueId, before: ValueId) {
        self.instr_mut(id).block = block;
        if before.is_valid() {
            debug_assert_eq!(
                self.instr(before).block,
                block,
                "insertion cursor belongs to another block"
            );
            let prev = self.instr(before).prev;
            {
                let instr = self.instr_mut(id);
                instr.prev = prev;
                instr.next = before;
            }
            self.instr_mut(before).prev = id;
            if prev.is_valid() {
                self.instr_mut(prev).next = id;
            } else {
                self.blocks[block].first = id;
            }
        } else {
            let last = self.blocks[block].last;
            {
                let instr = self.instr_mut(id);
                instr.prev = last;
                instr.next = ValueId::INVALID;
            }
            if last.is_valid() {
                self.instr_mut(last).next = id;
            } else {
                self.blocks[block].first = id;
            }
            self.blocks[block].last = id;
        }
        self.blocks[block].num_instrs += 1;
    }

    // =========================================================================
    // CFG edges
    // =========================================================================

    /// Add the edge `from -> to`, updating both adjacency vectors.
    pub fn link_blocks(&mut self, from: BlockId, to: BlockId) {
        debug_assert!(from.is_valid() && to.is_valid(), "link of an invalid block");
        self.blocks[from].succs.push(to);
        self.blocks[to].preds.push(from);
    }

    /// Remove one occurrence of the edge `from -> to`, preserving order.
    pub fn remove_link(&mut self, from: BlockId, to: BlockId) {
        let succs = &mut self.blocks[from].succs;
        if let Some(pos) = succs.iter().position(|&s| s == to) {
            succs.remove(pos);
        }
        let preds = &mut self.blocks[to].preds;
        if let Some(pos) = preds.iter().position(|&p| p == from) {
            preds.remove(pos);
        }
    }

    /// Recompute `block`'s terminator-derived successor edges.
    ///
    /// Must be called after a structural edit changes the block's last
    /// instruction: `Branch` yields one successor, `If` two (true target
    /// first), anything else none.
    pub fn update_terminator(&mut self, block: BlockId) {
        let old_succs = std::mem::take(&mut self.blocks[block].succs);
        for s in old_succs {
            let preds = &mut self.blocks[s].preds;
            if let Some(pos) = preds.iter().position(|&p| p == block) {
                preds.remove(pos);
            }
        }
        let targets = match self.blocks[block].last_instr().map(|id| self.instr(id).kind()) {
            Some(InstrKind::Branch { target }) => vec![*target],
            Some(InstrKind::If { true_blk, false_blk }) => vec![*true_blk, *false_blk],
            _ => vec![],
        };
        for t in targets {
            self.link_blocks(block, t);
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Drop all operand edges of `instr`, removing it from each operand's
    /// user set.
    pub fn clear_inputs(&mut self, instr: ValueId) {
        let inputs = std::mem::take(&mut self.instr_mut(instr).inputs);
        for op in inputs {
            self.values[op].users.remove(&instr);
        }
        if let InstrKind::Phi { blocks } = &mut self.instr_mut(instr).kind {
            blocks.clear();
        }
    }

    /// Erase an instruction: clear its operand edges, unlink it from its
    /// block, free its slot.
    ///
    /// The instruction's own users are untouched; rewrite them first (see
    /// [`Function::replace_uses`]) or they are left dangling.
    pub fn erase_instr(&mut self, id: ValueId) {
        self.clear_inputs(id);
        self.unlink_instr(id);
        self.values.remove(id);
    }

    fn unlink_instr(&mut self, id: ValueId) {
        let (block, prev, next) = {
            let instr = self.instr(id);
            (instr.block, instr.prev, instr.next)
        };
        debug_assert!(block.is_valid(), "unlink of a detached instruction");
        if prev.is_valid() {
            self.instr_mut(prev).next = next;
        } else {
            self.blocks[block].first = next;
        }
        if next.is_valid() {
            self.instr_mut(next).prev = prev;
        } else {
            self.blocks[block].last = prev;
        }
        self.blocks[block].num_instrs -= 1;
        let instr = self.instr_mut(id);
        instr.block = BlockId::INVALID;
        instr.prev = ValueId::INVALID;
        instr.next = ValueId::INVALID;
    }

    /// Rewrite every use of `old` to read `new` instead.
    pub fn replace_uses(&mut self, old: ValueId, new: ValueId) {
        let users: Vec<ValueId> = self.values[old].users.drain().collect();
        for user in &users {
            for input in &mut self.instr_mut(*user).inputs {
                if *input == old {
                    *input = new;
                }
            }
        }
        self.values[new].users.extend(users);
    }

    /// Split `block` after `instr`: a fresh block is appended and the
    /// instructions following `instr` are spliced into it in O(range).
    ///
    /// CFG edges are not rewired; the caller decides the new terminators and
    /// runs [`Function::update_terminator`].
    pub fn split_block_after(&mut self, block: BlockId, instr: ValueId) -> BlockId {
        debug_assert_eq!(self.instr(instr).block, block, "split point not in block");
        let new_block = self.create_block();
        let first_moved = self.instr(instr).next;
        if !first_moved.is_valid() {
            return new_block;
        }
        let old_last = self.blocks[block].last;

        self.instr_mut(instr).next = ValueId::INVALID;
        self.blocks[block].last = instr;
        self.instr_mut(first_moved).prev = ValueId::INVALID;

        {
            let nb = &mut self.blocks[new_block];
            nb.first = first_moved;
            nb.last = old_last;
        }

        let mut moved = 0usize;
        let mut cur = first_moved;
        while cur.is_valid() {
            let i = self.instr_mut(cur);
            i.block = new_block;
            cur = i.next;
            moved += 1;
        }
        self.blocks[new_block].num_instrs = moved;
        self.blocks[block].num_instrs -= moved;
        new_block
    }

    /// Remove a block and erase the instructions it owns.
    ///
    /// The block must already be unlinked from the CFG
    /// (`preds`/`succs` empty).
    pub fn remove_block(&mut self, block: BlockId) {
        debug_assert!(
            self.blocks[block].preds.is_empty() && self.blocks[block].succs.is_empty(),
            "remove_link the block's edges before removing it"
        );
        let ids: Vec<ValueId> = self.instrs(block).collect();
        for id in ids {
            self.erase_instr(id);
        }
        let (prev, next) = {
            let b = &self.blocks[block];
            (b.prev, b.next)
        };
        if prev.is_valid() {
            self.blocks[prev].next = next;
        } else {
            self.first_block = next;
        }
        if next.is_valid() {
            self.blocks[next].prev = prev;
        } else {
            self.last_block = prev;
        }
        self.num_blocks -= 1;
        self.blocks.remove(block);
    }
}

impl GraphView for Function {
    fn head(&self) -> BlockId {
        self.first_block
    }

    fn num_nodes(&self) -> usize {
        self.num_blocks
    }

    fn succs(&self, node: BlockId) -> &[BlockId] {
        &self.blocks[node].succs
    }

    fn preds(&self, node: BlockId) -> &[BlockId] {
        &self.blocks[node].preds
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over a function's blocks in list order.
pub struct BlockIter<'a> {
    func: &'a Function,
    cur: BlockId,
}

impl Iterator for BlockIter<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        if !self.cur.is_valid() {
            return None;
        }
        let id = self.cur;
        self.cur = self.func.blocks[id].next;
        Some(id)
    }
}

/// Forward iterator over a block's instructions.
pub struct InstrIter<'a> {
    func: &'a Function,
    cur: ValueId,
}

impl Iterator for InstrIter<'_> {
    type Item = ValueId;

    fn next(&mut self) -> Option<ValueId> {
        if !self.cur.is_valid() {
            return None;
        }
        let id = self.cur;
        self.cur = self.func.instr(id).next;
        Some(id)
    }
}

/// Backward iterator over a block's instructions.
pub struct InstrRevIter<'a> {
    func: &'a Function,
    cur: ValueId,
}

impl Iterator for InstrRevIter<'_> {
    type Item = ValueId;

    fn next(&mut self) -> Option<ValueId> {
        if !self.cur.is_valid() {
            return None;
        }
        let id = self.cur;
        self.cur = self.func.instr(id).prev;
        Some(id)
    }
}

// =============================================================================
// Module
// =============================================================================

/// A collection of functions, so `Call` instructions can name their callee
/// by id. No whole-program analysis is built on top of this.
#[derive(Default)]
pub struct Module {
    funcs: Arena<Function>,
}

impl Module {
    /// Create an empty module.
    pub fn new() -> Self {
        Module::default()
    }

    /// Add a function.
    pub fn create_function(&mut self, name: impl Into<String>, ret_ty: Type) -> FuncId {
        self.funcs.alloc(Function::new(name, ret_ty))
    }

    /// A function by id.
    #[inline]
    pub fn func(&self, id: FuncId) -> &Function {
        &self.funcs[id]
    }

    /// A function by id, mutably.
    #[inline]
    pub fn func_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.funcs[id]
    }

    /// Iterate over all functions.
    pub fn iter(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.funcs.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
