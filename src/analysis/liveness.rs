//! Liveness analysis: position numbering and live-interval construction.
//!
//! Two passes over the loop-aware linear order:
//!
//! **Numbering** (forward). Each instruction gets a dense `lin` number
//! (step 1) and a `live` position (step 2). Phis share their block's entry
//! position: they are simultaneous at block start; any other instruction
//! takes the next position. A block records `[entry, after-last + 2]` as its
//! interval, the trailing bump keeping a gap between adjacent blocks.
//!
//! **Intervals** (backward). Per block, the live set starts as the union of
//! the successors' live sets plus, for each successor phi, the operand that
//! phi selects for this block; that operand's interval is stretched from the
//! block entry to the phi position (transiently inverted when the operand is
//! defined later in this very block; the def pin below straightens it out).
//! Instructions are then walked in reverse, stopping at the leading phis:
//! a definition widens its interval by one position slot and pins its start
//! to the definition, then leaves the set; every operand stretches from
//! block entry to its use and enters the set. The block's own phis are
//! dropped from the set afterwards, and a reducible loop header widens
//! everything still live across the whole loop body. Control-flow
//! instructions (`Branch`/`Ret`/`If`) produce no allocatable result and are
//! collapsed to zero-width intervals at the end.

use rustc_hash::{FxHashMap, FxHashSet};

use super::linear_order::LinearOrderBuilder;
use super::loops::{LoopTree, LoopTreeBuilder};
use crate::ir::block::{BlockId, LiveInterval};
use crate::ir::function::Function;
use crate::ir::instr::{Opcode, ValueId};

/// Distance between two adjacent live positions.
const LIVE_STEP: usize = 2;

// =============================================================================
// Result
// =============================================================================

/// Result of liveness analysis for one function snapshot.
pub struct Liveness {
    intervals: FxHashMap<ValueId, LiveInterval>,
    live_sets: FxHashMap<BlockId, FxHashSet<ValueId>>,
    linear_order: Vec<BlockId>,
}

impl Liveness {
    /// The interval of `value`, if it has one (a value with no uses and no
    /// numbered definition has none).
    pub fn interval(&self, value: ValueId) -> Option<&LiveInterval> {
        self.intervals.get(&value)
    }

    /// All computed intervals.
    pub fn intervals(&self) -> &FxHashMap<ValueId, LiveInterval> {
        &self.intervals
    }

    /// Values live on entry to `block`.
    pub fn live_set(&self, block: BlockId) -> Option<&FxHashSet<ValueId>> {
        self.live_sets.get(&block)
    }

    /// The linear order the numbering used.
    pub fn linear_order(&self) -> &[BlockId] {
        &self.linear_order
    }

    #[cfg(test)]
    pub(crate) fn for_tests(intervals: FxHashMap<ValueId, LiveInterval>) -> Liveness {
        Liveness {
            intervals,
            live_sets: FxHashMap::default(),
            linear_order: Vec::new(),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds [`Liveness`] for a function.
pub struct LivenessBuilder;

impl LivenessBuilder {
    /// Number the instructions and compute live intervals.
    ///
    /// Writes `lin`/`live` into the instructions and the covered interval
    /// into each block; everything else lands in the returned result.
    pub fn build(func: &mut Function) -> Liveness {
        let loop_tree = LoopTreeBuilder::build(&*func);
        let linear_order = LinearOrderBuilder::build(&*func, &loop_tree);

        Self::number(func, &linear_order);
        let (intervals, live_sets) = Self::build_intervals(func, &loop_tree, &linear_order);

        Liveness {
            intervals,
            live_sets,
            linear_order,
        }
    }

    fn number(func: &mut Function, order: &[BlockId]) {
        let mut lin: u32 = 0;
        let mut live: usize = 0;
        for &block in order {
            let entry = live;
            let ids: Vec<ValueId> = func.instrs(block).collect();
            for id in ids {
                let is_phi = func.instr(id).is_phi();
                let pos = if is_phi {
                    entry
                } else {
                    live += LIVE_STEP;
                    live
                };
                let instr = func.instr_mut(id);
                instr.live = pos;
                instr.lin = lin;
                lin += 1;
            }
            live += LIVE_STEP;
            func.block_mut(block)
                .set_interval(LiveInterval::new(entry, live));
        }
    }

    fn build_intervals(
        func: &Function,
        loop_tree: &LoopTree,
        order: &[BlockId],
    ) -> (
        FxHashMap<ValueId, LiveInterval>,
        FxHashMap<BlockId, FxHashSet<ValueId>>,
    ) {
        let mut intervals: FxHashMap<ValueId, LiveInterval> = FxHashMap::default();
        let mut live_sets: FxHashMap<BlockId, FxHashSet<ValueId>> = FxHashMap::default();

        let mut extend = |intervals: &mut FxHashMap<ValueId, LiveInterval>,
                          value: ValueId,
                          range: LiveInterval| {
            intervals
                .entry(value)
                .and_modify(|iv| iv.update(&range))
                .or_insert(range);
        };

        for &block in order.iter().rev() {
            let entry = func.block(block).interval().begin();
            let mut live: FxHashSet<ValueId> = FxHashSet::default();

            // seed: successor live sets, plus the phi inputs they select
            // for this predecessor
            for &succ in func.block(block).succs() {
                if let Some(set) = live_sets.get(&succ) {
                    live.extend(set.iter().copied());
                }
                for phi in func.phis(succ) {
                    let phi_pos = func.instr(phi).live();
                    for (value, pred) in func.instr(phi).incoming() {
                        if pred == block {
                            extend(&mut intervals, value, LiveInterval::new(entry, phi_pos));
                            live.insert(value);
                        }
                    }
                }
            }

            // reverse walk; the leading phis contribute nothing here
            for id in func.instrs_rev(block) {
                let instr = func.instr(id);
                if instr.is_phi() {
                    break;
                }
                let pos = instr.live();

                extend(&mut intervals, id, LiveInterval::new(pos, pos + LIVE_STEP));
                intervals
                    .get_mut(&id)
                    .expect("definition interval just created")
                    .set_begin(pos);
                live.remove(&id);

                for &operand in instr.inputs() {
                    extend(&mut intervals, operand, LiveInterval::new(entry, pos));
                    live.insert(operand);
                }
            }

            // phi results are defined at block entry; they stop being live
            // above their block
            for phi in func.phis(block) {
                live.remove(&phi);
                if let Some(iv) = intervals.get_mut(&phi) {
                    iv.set_begin(entry);
                }
            }

            // loop-carried values stay live across the whole loop
            let loop_id = loop_tree.loop_of(block);
            let lp = loop_tree.get(loop_id);
            if lp.is_reducible() && lp.header() == Some(block) {
                let mut loop_end = func.block(block).interval().end();
                for &n in lp.body() {
                    loop_end = loop_end.max(func.block(n).interval().end());
                }
                for &value in &live {
                    extend(&mut intervals, value, LiveInterval::new(entry, loop_end));
                }
            }

            live_sets.insert(block, live);
        }

        // control flow never appears as an operand; collapse its intervals
        for (&value, interval) in intervals.iter_mut() {
            if let Some(instr) = func.value(value).as_instr() {
                if matches!(instr.opcode(), Opcode::Branch | Opcode::Ret | Opcode::If) {
                    interval.set_end(interval.begin());
                }
            }
        }

        (intervals, live_sets)
    }
}

// =============================================================================
// Tests
// =============================================================================
