//! Depth-first search over a [`GraphView`].
//!
//! One explicit-stack implementation drives every traversal in the crate
//! through the [`DfsVisitor`] callbacks:
//!
//! - `discover_node`: preorder, fired when a node is first reached
//! - `finish_node`: postorder, fired when all successors are done
//! - `back_edge(src, dst)`: fired when a successor is found grey, i.e.
//!   still on the DFS path; this is what loop detection keys off
//!
//! Successors are scanned in `succs` vector order, so which edge counts as
//! "the" back edge into a node with several is fixed by edge insertion order.

use super::GraphView;
use crate::ir::arena::BitSet;
use crate::ir::block::BlockId;

/// Traversal callbacks. All default to no-ops.
pub trait DfsVisitor {
    /// Preorder: `node` was just discovered.
    fn discover_node(&mut self, _node: BlockId) {}

    /// Postorder: every successor of `node` is finished.
    fn finish_node(&mut self, _node: BlockId) {}

    /// The edge `src -> dst` closes a cycle on the current DFS path.
    fn back_edge(&mut self, _src: BlockId, _dst: BlockId) {}
}

/// Run a depth-first search from `graph.head()`.
///
/// Unreachable nodes are never visited.
pub fn depth_first_search<G: GraphView, V: DfsVisitor>(graph: &G, visitor: &mut V) {
    let head = graph.head();
    if !head.is_valid() {
        return;
    }

    let mut discovered = BitSet::with_capacity(graph.num_nodes());
    let mut finished = BitSet::with_capacity(graph.num_nodes());
    let mut stack: Vec<(BlockId, usize)> = Vec::new();

    discovered.insert(head.as_usize());
    visitor.discover_node(head);
    stack.push((head, 0));

    while let Some((node, mut next_succ)) = stack.pop() {
        let succs = graph.succs(node);
        let mut descended = false;
        while next_succ < succs.len() {
            let succ = succs[next_succ];
            next_succ += 1;
            if !discovered.contains(succ.as_usize()) {
                stack.push((node, next_succ));
                discovered.insert(succ.as_usize());
                visitor.discover_node(succ);
                stack.push((succ, 0));
                descended = true;
                break;
            }
            if !finished.contains(succ.as_usize()) {
                // grey: succ is on the current DFS path
                visitor.back_edge(node, succ);
            }
        }
        if !descended {
            finished.insert(node.as_usize());
            visitor.finish_node(node);
        }
    }
}

struct OrderCollector<const PRE: bool> {
    order: Vec<BlockId>,
}

impl<const PRE: bool> DfsVisitor for OrderCollector<PRE> {
    fn discover_node(&mut self, node: BlockId) {
        if PRE {
            self.order.push(node);
        }
    }

    fn finish_node(&mut self, node: BlockId) {
        if !PRE {
            self.order.push(node);
        }
    }
}

/// Nodes in DFS preorder.
pub fn preorder<G: GraphView>(graph: &G) -> Vec<BlockId> {
    let mut collector = OrderCollector::<true> { order: Vec::new() };
    depth_first_search(graph, &mut collector);
    collector.order
}

/// Nodes in DFS postorder.
pub fn postorder<G: GraphView>(graph: &G) -> Vec<BlockId> {
    let mut collector = OrderCollector::<false> { order: Vec::new() };
    depth_first_search(graph, &mut collector);
    collector.order
}

/// Nodes in reverse postorder.
pub fn reverse_postorder<G: GraphView>(graph: &G) -> Vec<BlockId> {
    let mut order = postorder(graph);
    order.reverse();
    order
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Function;
    use crate::ir::types::Type;

    fn diamond() -> (Function, Vec<BlockId>) {
        // 0 -> 1, 0 -> 2, 1 -> 3, 2 -> 3
        let mut func = Function::new("g", Type::None);
        let blocks: Vec<BlockId> = (0..4).map(|_| func.create_block()).collect();
        func.link_blocks(blocks[0], blocks[1]);
        func.link_blocks(blocks[0], blocks[2]);
        func.link_blocks(blocks[1], blocks[3]);
        func.link_blocks(blocks[2], blocks[3]);
        (func, blocks)
    }

    #[test]
    fn diamond_orders() {
        let (func, b) = diamond();
        assert_eq!(preorder(&func), vec![b[0], b[1], b[3], b[2]]);
        assert_eq!(postorder(&func), vec![b[3], b[1], b[2], b[0]]);
        assert_eq!(reverse_postorder(&func), vec![b[0], b[2], b[1], b[3]]);
    }

    #[test]
    fn back_edge_fires_on_cycle() {
        // 0 -> 1 -> 2 -> 1
        let mut func = Function::new("g", Type::None);
        let b: Vec<BlockId> = (0..3).map(|_| func.create_block()).collect();
        func.link_blocks(b[0], b[1]);
        func.link_blocks(b[1], b[2]);
        func.link_blocks(b[2], b[1]);

        struct BackEdges(Vec<(BlockId, BlockId)>);
        impl DfsVisitor for BackEdges {
            fn back_edge(&mut self, src: BlockId, dst: BlockId) {
                self.0.push((src, dst));
            }
        }
        let mut vis = BackEdges(Vec::new());
        depth_first_search(&func, &mut vis);
        assert_eq!(vis.0, vec![(b[2], b[1])]);
    }

    #[test]
    fn cross_edge_is_not_a_back_edge() {
        let (func, _) = diamond();
        struct BackEdges(usize);
        impl DfsVisitor for BackEdges {
            fn back_edge(&mut self, _src: BlockId, _dst: BlockId) {
                self.0 += 1;
            }
        }
        let mut vis = BackEdges(0);
        depth_first_search(&func, &mut vis);
        assert_eq!(vis.0, 0);
    }

    #[test]
    fn unreachable_nodes_are_skipped() {
        let mut func = Function::new("g", Type::None);
        let a = func.create_block();
        let b = func.create_block();
        let _orphan = func.create_block();
        func.link_blocks(a, b);

        assert_eq!(preorder(&func).len(), 2);
    }

    #[test]
    fn empty_graph() {
        let func = Function::new("g", Type::None);
        assert!(preorder(&func).is_empty());
        assert!(postorder(&func).is_empty());
    }
}
