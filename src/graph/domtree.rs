//! Dominator tree construction.
//!
//! Semi-dominator method with union-find path compression, O((V+E)·log V):
//!
//! 1. DFS-preorder the graph; give each node a dense arrival index and
//!    record its DFS-tree parent.
//! 2. In reverse arrival order, compute each node's semi-dominator as the
//!    minimum of `sdom(find(pred))` over its predecessors, where `find`
//!    returns the min-sdom vertex on the node's path to its DSU root and
//!    compresses the path as it goes.
//! 3. Bucket each non-root node under its semi-dominator; when that node is
//!    processed, resolve the bucket: the immediate dominator is the
//!    semi-dominator when the compressed representative agrees, otherwise
//!    the representative itself, to be patched by the final pass.
//! 4. Union each processed node into its DFS parent's set.
//! 5. A forward pass over arrival order rewrites any still-relative
//!    immediate dominator through its already-resolved ancestor.
//!
//! Unreachable nodes never get an entry; asking about them is a caller bug.

use rustc_hash::FxHashMap;

use super::dfs::{self, DfsVisitor};
use super::GraphView;
use crate::ir::arena::SecondaryMap;
use crate::ir::block::{BasicBlock, BlockId};

// =============================================================================
// Dominator tree
// =============================================================================

#[derive(Default)]
struct DomNode {
    idom: Option<BlockId>,
    children: Vec<BlockId>,
}

/// Immediate-dominator relation for one CFG snapshot.
pub struct DomTree {
    nodes: FxHashMap<BlockId, DomNode>,
}

impl DomTree {
    /// Immediate dominator of `block`; `None` for the entry or an
    /// unreachable block.
    pub fn idom(&self, block: BlockId) -> Option<BlockId> {
        self.nodes.get(&block).and_then(|n| n.idom)
    }

    /// Blocks immediately dominated by `block`.
    pub fn children(&self, block: BlockId) -> &[BlockId] {
        self.nodes
            .get(&block)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `block` was reachable when the tree was built.
    pub fn contains(&self, block: BlockId) -> bool {
        self.nodes.contains_key(&block)
    }

    /// Number of reachable blocks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `a` dominates `b`: true for `a == b`, else when `b` is
    /// reachable from `a` through the idom-children relation.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        if a == b {
            return true;
        }
        let mut stack = vec![a];
        while let Some(node) = stack.pop() {
            for &child in self.children(node) {
                if child == b {
                    return true;
                }
                stack.push(child);
            }
        }
        false
    }
}

// =============================================================================
// DSU with min-sdom labels
// =============================================================================

/// Union-find over arrival indices. `label[v]` tracks the vertex with the
/// smallest semi-dominator on the path from `v` to its DSU root; `find`
/// compresses the path and refreshes labels top-down.
struct Dsu {
    parent: Vec<usize>,
    label: Vec<usize>,
}

impl Dsu {
    fn new(n: usize) -> Self {
        Dsu {
            parent: (0..n).collect(),
            label: (0..n).collect(),
        }
    }

    fn find(&mut self, v: usize, sdom: &[usize]) -> usize {
        if self.parent[v] == v {
            return self.label[v];
        }
        let mut path = Vec::new();
        let mut x = v;
        while self.parent[x] != x {
            path.push(x);
            x = self.parent[x];
        }
        let root = x;
        while let Some(n) = path.pop() {
            let p = self.parent[n];
            if sdom[self.label[p]] < sdom[self.label[n]] {
                self.label[n] = self.label[p];
            }
            self.parent[n] = root;
        }
        self.label[v]
    }

    fn merge(&mut self, node: usize, parent: usize) {
        self.parent[node] = parent;
    }
}

// =============================================================================
// Builder
// =============================================================================

struct PreorderWithParents {
    order: Vec<BlockId>,
    /// DFS-tree parent, by arrival index. Entry maps to itself.
    parents: Vec<usize>,
    arrival: SecondaryMap<BasicBlock, Option<usize>>,
    path: Vec<usize>,
}

impl DfsVisitor for PreorderWithParents {
    fn discover_node(&mut self, node: BlockId) {
        let idx = self.order.len();
        let parent = self.path.last().copied().unwrap_or(idx);
        self.order.push(node);
        self.parents.push(parent);
        self.arrival.set(node, Some(idx));
        self.path.push(idx);
    }

    fn finish_node(&mut self, _node: BlockId) {
        self.path.pop();
    }
}

/// Builds a [`DomTree`] from a CFG snapshot.
pub struct DomTreeBuilder;

impl DomTreeBuilder {
    /// Compute the dominator tree of `graph`.
    pub fn build<G: GraphView>(graph: &G) -> DomTree {
        let mut pre = PreorderWithParents {
            order: Vec::with_capacity(graph.num_nodes()),
            parents: Vec::with_capacity(graph.num_nodes()),
            arrival: SecondaryMap::new(),
            path: Vec::new(),
        };
        dfs::depth_first_search(graph, &mut pre);

        let order = pre.order;
        let parents = pre.parents;
        let arrival = pre.arrival;
        let n = order.len();

        let mut tree = DomTree {
            nodes: FxHashMap::default(),
        };
        for &b in &order {
            tree.nodes.insert(b, DomNode::default());
        }
        if n == 0 {
            return tree;
        }

        let mut sdom: Vec<usize> = (0..n).collect();
        let mut idom: Vec<usize> = (0..n).collect();
        let mut bucket: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut dsu = Dsu::new(n);

        for i in (0..n).rev() {
            let node = order[i];
            let mut s = sdom[i];
            for &pred in graph.preds(node) {
                // a predecessor outside the DFS forest is unreachable; skip it
                let Some(p) = arrival.get(pred).copied().flatten() else {
                    continue;
                };
                let u = dsu.find(p, &sdom);
                s = s.min(sdom[u]);
            }
            sdom[i] = s;
            if i != 0 {
                bucket[s].push(i);
            }
            for v in std::mem::take(&mut bucket[i]) {
                let u = dsu.find(v, &sdom);
                idom[v] = if sdom[u] == sdom[v] { sdom[v] } else { u };
            }
            if i != 0 {
                dsu.merge(i, parents[i]);
            }
        }

        for i in 1..n {
            if idom[i] != sdom[i] {
                idom[i] = idom[idom[i]];
            }
            let block = order[i];
            let dominator = order[idom[i]];
            tree.nodes.get_mut(&block).expect("reachable block").idom = Some(dominator);
            tree.nodes
                .get_mut(&dominator)
                .expect("reachable block")
                .children
                .push(block);
        }

        tree
    }
}

// =============================================================================
// Tests
// =============================================================================
