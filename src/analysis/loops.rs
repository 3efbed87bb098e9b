//! Natural-loop detection and nesting.
//!
//! Back edges come from the DFS (`back_edge(src, dst)` marks `dst` as a
//! header); a loop is *reducible* when its header dominates the back-edge
//! source. Reducible loops get a precise body through a reverse-CFG walk
//! from each back-edge source; irreducible loops only record their sources -
//! their body is knowingly incomplete, and every downstream consumer
//! (linear order, liveness loop extension) special-cases reducible loops
//! only, so the imprecision stays inert.
//!
//! Loops are populated body-outward (header postorder-finish order), which
//! nests inner loops before any outer loop walks across them. A synthetic
//! root loop collects the blocks claimed by no loop and adopts every loop
//! without an outer one.

use rustc_hash::FxHashMap;

use crate::graph::dfs::{self, DfsVisitor};
use crate::graph::domtree::DomTreeBuilder;
use crate::graph::GraphView;
use crate::ir::arena::{Arena, BitSet, Id};
use crate::ir::block::BlockId;

/// Id of a [`Loop`] inside its [`LoopTree`].
pub type LoopId = Id<Loop>;

// =============================================================================
// Loop
// =============================================================================

/// One natural loop (or the synthetic root).
pub struct Loop {
    header: Option<BlockId>,
    reducible: bool,
    root: bool,
    body: Vec<BlockId>,
    back_edges: Vec<BlockId>,
    inners: Vec<LoopId>,
    outer: Option<LoopId>,
}

impl Loop {
    fn new(header: Option<BlockId>, reducible: bool, root: bool) -> Self {
        Loop {
            header,
            reducible,
            root,
            body: Vec::new(),
            back_edges: Vec::new(),
            inners: Vec::new(),
            outer: None,
        }
    }

    /// The header block; `None` for the root loop.
    #[inline]
    pub fn header(&self) -> Option<BlockId> {
        self.header
    }

    /// Whether the header dominates every back-edge source.
    ///
    /// Only reducible loops promise `dominates(header, n)` for all body
    /// nodes; an irreducible loop's body holds just its back-edge sources.
    #[inline]
    pub fn is_reducible(&self) -> bool {
        self.reducible
    }

    /// Whether this is the synthetic root loop.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Body blocks in insertion order: back-edge sources first, then the
    /// nodes found by the reverse-CFG walk. The header is not part of the
    /// body vector.
    #[inline]
    pub fn body(&self) -> &[BlockId] {
        &self.body
    }

    /// Back-edge source blocks.
    #[inline]
    pub fn back_edges(&self) -> &[BlockId] {
        &self.back_edges
    }

    /// Directly nested loops.
    #[inline]
    pub fn inners(&self) -> &[LoopId] {
        &self.inners
    }

    /// The enclosing loop, if any.
    #[inline]
    pub fn outer(&self) -> Option<LoopId> {
        self.outer
    }

    fn add_back_edge(&mut self, src: BlockId) {
        if !self.back_edges.contains(&src) {
            self.back_edges.push(src);
            self.body.push(src);
        }
    }
}

// =============================================================================
// Loop tree
// =============================================================================

/// The loop forest of one CFG snapshot.
pub struct LoopTree {
    loops: Arena<Loop>,
    block_loop: FxHashMap<BlockId, LoopId>,
    root: LoopId,
}

impl LoopTree {
    /// The synthetic root loop.
    #[inline]
    pub fn root(&self) -> LoopId {
        self.root
    }

    /// A loop by id.
    #[inline]
    pub fn get(&self, id: LoopId) -> &Loop {
        &self.loops[id]
    }

    /// The innermost loop owning `block`. Every reachable block has one
    /// (the root loop at minimum); a missing entry is an internal
    /// inconsistency, not a user-facing condition.
    pub fn loop_of(&self, block: BlockId) -> LoopId {
        *self
            .block_loop
            .get(&block)
            .expect("block missing from the loop tree")
    }

    /// Number of loops, the root included.
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Whether the tree holds no loops at all.
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Iterate over all loops.
    pub fn iter(&self) -> impl Iterator<Item = (LoopId, &Loop)> {
        self.loops.iter()
    }
}

// =============================================================================
// Builder
// =============================================================================

struct BackEdgeCollector {
    postorder: Vec<BlockId>,
    back_edges: Vec<(BlockId, BlockId)>,
}

impl DfsVisitor for BackEdgeCollector {
    fn finish_node(&mut self, node: BlockId) {
        self.postorder.push(node);
    }

    fn back_edge(&mut self, src: BlockId, dst: BlockId) {
        self.back_edges.push((src, dst));
    }
}

/// Builds the [`LoopTree`] of a CFG snapshot.
pub struct LoopTreeBuilder;

impl LoopTreeBuilder {
    /// Detect loops, classify reducibility, and nest them.
    pub fn build<G: GraphView>(graph: &G) -> LoopTree {
        let domtree = DomTreeBuilder::build(graph);

        let mut collector = BackEdgeCollector {
            postorder: Vec::with_capacity(graph.num_nodes()),
            back_edges: Vec::new(),
        };
        dfs::depth_first_search(graph, &mut collector);

        let mut loops: Arena<Loop> = Arena::new();
        let mut block_loop: FxHashMap<BlockId, LoopId> = FxHashMap::default();
        let mut headers: FxHashMap<BlockId, LoopId> = FxHashMap::default();

        // collect back edges into per-header loop records
        for &(src, dst) in &collector.back_edges {
            let id = *headers.entry(dst).or_insert_with(|| {
                let reducible = domtree.dominates(dst, src);
                let id = loops.alloc(Loop::new(Some(dst), reducible, false));
                // the header belongs to its own loop, even if an enclosing
                // loop's back edge claimed it first
                block_loop.insert(dst, id);
                id
            });
            loops[id].add_back_edge(src);
            block_loop.entry(src).or_insert(id);
        }

        // populate bodies inner-out: headers finish in postorder before the
        // headers of their enclosing loops
        for &node in &collector.postorder {
            if let Some(&id) = headers.get(&node) {
                if loops[id].is_reducible() {
                    Self::populate(graph, &mut loops, &mut block_loop, id);
                }
            }
        }

        // the root loop adopts unclaimed blocks and parentless loops
        let root = loops.alloc(Loop::new(None, false, true));
        for &node in &collector.postorder {
            block_loop.entry(node).or_insert_with(|| {
                loops[root].body.push(node);
                root
            });
        }
        let ids: Vec<LoopId> = loops.iter().map(|(id, _)| id).collect();
        for id in ids {
            if id != root && loops[id].outer.is_none() {
                loops[id].outer = Some(root);
                loops[root].inners.push(id);
            }
        }

        LoopTree {
            loops,
            block_loop,
            root,
        }
    }

    /// Reverse-CFG search from each back-edge source, stopping at the
    /// pre-visited header. Unclaimed nodes join the loop; a node claimed by
    /// another loop that has no outer yet nests that loop here, and the walk
    /// continues through it to reach blocks behind it.
    fn populate<G: GraphView>(
        graph: &G,
        loops: &mut Arena<Loop>,
        block_loop: &mut FxHashMap<BlockId, LoopId>,
        cur: LoopId,
    ) {
        let header = loops[cur].header().expect("reducible loop has a header");
        let mut visited = BitSet::new();
        visited.insert(header.as_usize());

        let mut stack: Vec<BlockId> = loops[cur].back_edges.clone();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if visited.contains(node.as_usize()) {
                continue;
            }
            visited.insert(node.as_usize());

            match block_loop.get(&node).copied() {
                None => {
                    block_loop.insert(node, cur);
                    loops[cur].body.push(node);
                }
                Some(claimed) if claimed != cur => {
                    if loops[claimed].outer.is_none() {
                        loops[claimed].outer = Some(cur);
                        loops[cur].inners.push(claimed);
                    }
                }
                Some(_) => {}
            }

            for &pred in graph.preds(node) {
                if !visited.contains(pred.as_usize()) {
                    stack.push(pred);
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
