//! Linear-scan register allocation.
//!
//! Intervals are processed in `(begin, end, value)` order against a fixed
//! pool of `K` registers:
//!
//! - **expire**: active intervals ending at or before the current begin
//!   return their register to the pool
//! - **allocate**: with a free register available, take the lowest one
//! - **spill**: with the pool exhausted, compare against the
//!   furthest-ending active interval: if the current one ends sooner it
//!   steals that register and the evicted value moves to a fresh stack
//!   slot, otherwise the current value takes the stack slot itself. Slot
//!   ids grow monotonically and are never reused within a run.
//!
//! The active set is keyed by interval end with set semantics: an insert
//! whose end collides with a resident member is dropped, so that interval
//! keeps its register but is never expired. Determinism comes from the
//! stable `(begin, end, value id)` sort.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;

use super::liveness::{Liveness, LivenessBuilder};
use crate::ir::function::Function;
use crate::ir::instr::ValueId;

// =============================================================================
// Location
// =============================================================================

/// Where a value lives after allocation: register `id` or stack slot `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub id: usize,
    pub on_stack: bool,
}

impl Location {
    /// A register location.
    pub fn reg(id: usize) -> Self {
        Location { id, on_stack: false }
    }

    /// A stack-slot location.
    pub fn stack(id: usize) -> Self {
        Location { id, on_stack: true }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.on_stack { "s" } else { "r" }, self.id)
    }
}

// =============================================================================
// Result
// =============================================================================

/// Result of one allocation run.
pub struct RegAllocation {
    locations: FxHashMap<ValueId, Location>,
    stack_slots: usize,
}

impl RegAllocation {
    /// The location of `value`, if its interval was allocatable.
    pub fn location(&self, value: ValueId) -> Option<Location> {
        self.locations.get(&value).copied()
    }

    /// All assigned locations.
    pub fn locations(&self) -> &FxHashMap<ValueId, Location> {
        &self.locations
    }

    /// Number of stack slots the run consumed.
    pub fn stack_slots(&self) -> usize {
        self.stack_slots
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Runs linear scan over liveness intervals.
pub struct RegAllocBuilder;

impl RegAllocBuilder {
    /// Run liveness and allocate `num_regs` registers for `func`.
    pub fn build(func: &mut Function, num_regs: usize) -> RegAllocation {
        let liveness = LivenessBuilder::build(func);
        Self::run(&liveness, num_regs)
    }

    /// Allocate registers for an existing liveness result.
    pub fn run(liveness: &Liveness, num_regs: usize) -> RegAllocation {
        let mut data: Vec<(ValueId, usize, usize)> = liveness
            .intervals()
            .iter()
            .filter(|(_, iv)| iv.begin() != iv.end())
            .map(|(&v, iv)| (v, iv.begin(), iv.end()))
            .collect();
        data.sort_by_key(|&(v, begin, end)| (begin, end, v.index()));

        // register 0 leaves the pool first
        let mut pool: Vec<usize> = (0..num_regs).rev().collect();
        let mut active: BTreeMap<usize, ValueId> = BTreeMap::new();
        let mut locations: FxHashMap<ValueId, Location> = FxHashMap::default();
        let mut next_slot: usize = 0;

        for (value, begin, end) in data {
            // expire
            loop {
                let Some((&active_end, &active_val)) = active.first_key_value() else {
                    break;
                };
                if begin < active_end {
                    break;
                }
                pool.push(locations[&active_val].id);
                active.remove(&active_end);
            }

            if active.len() == num_regs {
                // spill
                let (&furthest_end, &furthest_val) =
                    active.last_key_value().expect("active set is full");
                if end < furthest_end {
                    let reg = locations[&furthest_val].id;
                    locations.insert(value, Location::reg(reg));
                    locations.insert(furthest_val, Location::stack(next_slot));
                    active.remove(&furthest_end);
                    active.entry(end).or_insert(value);
                } else {
                    locations.insert(value, Location::stack(next_slot));
                }
                next_slot += 1;
            } else {
                let reg = pool.pop().expect("free pool empty with active set not full");
                locations.insert(value, Location::reg(reg));
                active.entry(end).or_insert(value);
            }
        }

        RegAllocation {
            locations,
            stack_slots: next_slot,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
