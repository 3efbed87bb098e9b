//! Analyses over the CFG: loop structure, linear order, liveness, register
//! allocation. Each builder consumes a read-only snapshot (liveness also
//! writes position numbers into the IR) and returns an independent result;
//! none survives a structural mutation of the blocks it was computed from.

pub mod linear_order;
pub mod liveness;
pub mod loops;
pub mod regalloc;
