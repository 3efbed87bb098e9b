//! Shared fixture builder: a function with `n` empty blocks wired by
//! letter-named edges, matching the pen-and-paper graphs the analysis
//! expectations were worked out on ('A' is block 0 and the entry).
//!
//! Each integration test binary compiles its own copy and uses a subset.
#![allow(dead_code)]

use lumen_ir::{BlockId, Function, Type};

pub struct TestCfg {
    pub func: Function,
    pub blocks: Vec<BlockId>,
}

impl TestCfg {
    pub fn new(num_blocks: usize) -> Self {
        let mut func = Function::new("fixture", Type::None);
        let blocks = (0..num_blocks).map(|_| func.create_block()).collect();
        TestCfg { func, blocks }
    }

    /// Build a graph in one call: `TestCfg::with_edges(7, &[('A', 'B'), ...])`.
    pub fn with_edges(num_blocks: usize, edges: &[(char, char)]) -> Self {
        let mut cfg = Self::new(num_blocks);
        for &(from, to) in edges {
            cfg.edge(from, to);
        }
        cfg
    }

    pub fn block(&self, letter: char) -> BlockId {
        self.blocks[(letter as u8 - b'A') as usize]
    }

    /// Add the edge `from -> to`.
    pub fn edge(&mut self, from: char, to: char) {
        let f = self.block(from);
        let t = self.block(to);
        self.func.link_blocks(f, t);
    }

    /// Map block handles to their display ids.
    pub fn ids(&self, blocks: &[BlockId]) -> Vec<u32> {
        blocks.iter().map(|&b| self.func.block(b).id()).collect()
    }
}

/// The canonical 7-node graph: a diamond over `B..D` with a side split at
/// `F`. No back edges.
///
/// ```text
/// A -> B -> {C, F}; F -> {E, G}; {C via D, E, G} -> D
/// ```
pub fn example1() -> TestCfg {
    TestCfg::with_edges(
        7,
        &[
            ('A', 'B'),
            ('B', 'C'),
            ('B', 'F'),
            ('F', 'E'),
            ('F', 'G'),
            ('G', 'D'),
            ('E', 'D'),
            ('C', 'D'),
        ],
    )
}

/// Eleven nodes, three nested reducible loops: `{C,D}` and `{E,F}` inside
/// `{B..J}` (back edge `H -> B`).
pub fn example2() -> TestCfg {
    TestCfg::with_edges(
        11,
        &[
            ('A', 'B'),
            ('B', 'C'),
            ('B', 'J'),
            ('C', 'D'),
            ('D', 'C'),
            ('D', 'E'),
            ('E', 'F'),
            ('F', 'E'),
            ('F', 'G'),
            ('G', 'H'),
            ('G', 'I'),
            ('H', 'B'),
            ('I', 'K'),
            ('J', 'C'),
        ],
    )
}

/// Nine nodes with one reducible loop (`F -> B`) and one irreducible loop
/// (`G -> C`, whose header does not dominate its source).
pub fn example3() -> TestCfg {
    TestCfg::with_edges(
        9,
        &[
            ('A', 'B'),
            ('B', 'C'),
            ('B', 'E'),
            ('C', 'D'),
            ('D', 'G'),
            ('E', 'D'),
            ('E', 'F'),
            ('F', 'B'),
            ('F', 'H'),
            ('G', 'C'),
            ('G', 'I'),
            ('H', 'G'),
            ('H', 'I'),
        ],
    )
}

/// Five nodes, a single loop `{B, D, E}` with exit `C`.
pub fn example4() -> TestCfg {
    TestCfg::with_edges(
        5,
        &[('A', 'B'), ('B', 'C'), ('B', 'D'), ('D', 'E'), ('E', 'B')],
    )
}

/// Six nodes, a single loop `{B, C, E, F}` with exit `D`.
pub fn example5() -> TestCfg {
    TestCfg::with_edges(
        6,
        &[
            ('A', 'B'),
            ('B', 'C'),
            ('C', 'D'),
            ('C', 'E'),
            ('E', 'D'),
            ('E', 'F'),
            ('F', 'B'),
        ],
    )
}
