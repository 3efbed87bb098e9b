//! Loop-aware linear block order.
//!
//! Emission order for the blocks that keeps every reducible loop's body in
//! one contiguous run, with nested loops fully inside their outer loop's
//! run: liveness and register allocation assume contiguous position
//! numbering per loop.
//!
//! The walk follows reverse postorder; on a reducible loop header the loop
//! body is flushed immediately, iterated in reverse insertion order, with
//! nested reducible headers recursed into first. Irreducible headers keep
//! their plain RPO position and get no contiguity promise.

use super::loops::{LoopId, LoopTree};
use crate::graph::dfs;
use crate::graph::GraphView;
use crate::ir::arena::BitSet;
use crate::ir::block::BlockId;

/// Builds the linear emission order for a CFG snapshot.
pub struct LinearOrderBuilder;

impl LinearOrderBuilder {
    /// Compute the block order for `graph` under `loop_tree`.
    pub fn build<G: GraphView>(graph: &G, loop_tree: &LoopTree) -> Vec<BlockId> {
        let rpo = dfs::reverse_postorder(graph);
        let mut visited = BitSet::with_capacity(graph.num_nodes());
        let mut order = Vec::with_capacity(rpo.len());

        for &node in &rpo {
            if visited.contains(node.as_usize()) {
                continue;
            }
            visited.insert(node.as_usize());
            order.push(node);

            let id = loop_tree.loop_of(node);
            let lp = loop_tree.get(id);
            if lp.header() == Some(node) && lp.is_reducible() {
                Self::linearize_loop(loop_tree, id, &mut visited, &mut order);
            }
        }
        order
    }

    fn linearize_loop(
        loop_tree: &LoopTree,
        cur: LoopId,
        visited: &mut BitSet,
        order: &mut Vec<BlockId>,
    ) {
        for &node in loop_tree.get(cur).body().iter().rev() {
            if visited.contains(node.as_usize()) {
                continue;
            }
            let id = loop_tree.loop_of(node);
            if id != cur && loop_tree.get(id).header() == Some(node) {
                Self::linearize_loop(loop_tree, id, visited, order);
                continue;
            }
            visited.insert(node.as_usize());
            order.push(node);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
