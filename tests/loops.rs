//! Loop-tree expectations on the canonical fixture graphs.

mod common;

use common::{example1, example2, example3, example4, example5, TestCfg};
use lumen_ir::{LoopId, LoopTree, LoopTreeBuilder};

fn loop_of(cfg: &TestCfg, tree: &LoopTree, letter: char) -> LoopId {
    tree.loop_of(cfg.block(letter))
}

fn back_edge_ids(cfg: &TestCfg, tree: &LoopTree, id: LoopId) -> Vec<u32> {
    let mut ids = cfg.ids(tree.get(id).back_edges());
    ids.sort_unstable();
    ids
}

#[test]
fn example1_has_only_the_root_loop() {
    let cfg = example1();
    let tree = LoopTreeBuilder::build(&cfg.func);

    let root = tree.root();
    assert!(tree.get(root).is_root());
    assert!(tree.get(root).header().is_none());
    assert!(tree.get(root).back_edges().is_empty());
    assert!(tree.get(root).outer().is_none());
    assert!(tree.get(root).inners().is_empty());
    for letter in "ABCDEFG".chars() {
        assert_eq!(loop_of(&cfg, &tree, letter), root);
    }
}

#[test]
fn example2_three_nested_loops() {
    let cfg = example2();
    let tree = LoopTreeBuilder::build(&cfg.func);

    let root = tree.root();
    let outer = loop_of(&cfg, &tree, 'B');
    let cd = loop_of(&cfg, &tree, 'C');
    let ef = loop_of(&cfg, &tree, 'E');

    // root collects the acyclic fringe and adopts the outer loop
    assert!(tree.get(root).is_root());
    assert_eq!(loop_of(&cfg, &tree, 'A'), root);
    assert_eq!(loop_of(&cfg, &tree, 'I'), root);
    assert_eq!(loop_of(&cfg, &tree, 'K'), root);
    assert!(tree.get(root).inners().contains(&outer));

    // outer loop: header B, latch H, members G and J
    assert!(!tree.get(outer).is_root());
    assert!(tree.get(outer).is_reducible());
    assert_eq!(tree.get(outer).header(), Some(cfg.block('B')));
    assert_eq!(back_edge_ids(&cfg, &tree, outer), vec![7]);
    assert_eq!(loop_of(&cfg, &tree, 'G'), outer);
    assert_eq!(loop_of(&cfg, &tree, 'H'), outer);
    assert_eq!(loop_of(&cfg, &tree, 'J'), outer);
    assert_eq!(tree.get(outer).outer(), Some(root));
    assert!(tree.get(outer).inners().contains(&cd));
    assert!(tree.get(outer).inners().contains(&ef));

    // inner loop C/D
    assert!(tree.get(cd).is_reducible());
    assert_eq!(tree.get(cd).header(), Some(cfg.block('C')));
    assert_eq!(back_edge_ids(&cfg, &tree, cd), vec![3]);
    assert_eq!(loop_of(&cfg, &tree, 'D'), cd);
    assert_eq!(tree.get(cd).outer(), Some(outer));
    assert!(tree.get(cd).inners().is_empty());

    // inner loop E/F
    assert!(tree.get(ef).is_reducible());
    assert_eq!(tree.get(ef).header(), Some(cfg.block('E')));
    assert_eq!(back_edge_ids(&cfg, &tree, ef), vec![5]);
    assert_eq!(loop_of(&cfg, &tree, 'F'), ef);
    assert_eq!(tree.get(ef).outer(), Some(outer));
    assert!(tree.get(ef).inners().is_empty());
}

#[test]
fn example3_reducible_and_irreducible() {
    let cfg = example3();
    let tree = LoopTreeBuilder::build(&cfg.func);

    let root = tree.root();
    let bf = loop_of(&cfg, &tree, 'B');
    let cg = loop_of(&cfg, &tree, 'C');

    for letter in "ADHI".chars() {
        assert_eq!(loop_of(&cfg, &tree, letter), root);
    }
    assert!(tree.get(root).inners().contains(&bf));
    assert!(tree.get(root).inners().contains(&cg));

    // F -> B closes a reducible loop through E
    assert!(tree.get(bf).is_reducible());
    assert_eq!(tree.get(bf).header(), Some(cfg.block('B')));
    assert_eq!(back_edge_ids(&cfg, &tree, bf), vec![5]);
    assert_eq!(loop_of(&cfg, &tree, 'E'), bf);
    assert_eq!(loop_of(&cfg, &tree, 'F'), bf);
    assert_eq!(tree.get(bf).outer(), Some(root));
    assert!(tree.get(bf).inners().is_empty());

    // G -> C is irreducible: C does not dominate G, and only the back-edge
    // source is recorded as a member
    assert!(!tree.get(cg).is_reducible());
    assert_eq!(tree.get(cg).header(), Some(cfg.block('C')));
    assert_eq!(back_edge_ids(&cfg, &tree, cg), vec![6]);
    assert_eq!(loop_of(&cfg, &tree, 'G'), cg);
    assert_eq!(tree.get(cg).outer(), Some(root));
    assert!(tree.get(cg).inners().is_empty());
}

#[test]
fn example4_single_loop() {
    let cfg = example4();
    let tree = LoopTreeBuilder::build(&cfg.func);

    let root = tree.root();
    let lp = loop_of(&cfg, &tree, 'B');
    assert_ne!(root, lp);

    assert_eq!(loop_of(&cfg, &tree, 'A'), root);
    assert_eq!(loop_of(&cfg, &tree, 'C'), root);
    assert!(tree.get(root).inners().contains(&lp));

    assert!(tree.get(lp).is_reducible());
    assert_eq!(tree.get(lp).header(), Some(cfg.block('B')));
    assert_eq!(back_edge_ids(&cfg, &tree, lp), vec![4]);
    assert_eq!(loop_of(&cfg, &tree, 'D'), lp);
    assert_eq!(loop_of(&cfg, &tree, 'E'), lp);
    assert_eq!(tree.get(lp).outer(), Some(root));
    assert!(tree.get(lp).inners().is_empty());
}

#[test]
fn example5_single_loop() {
    let cfg = example5();
    let tree = LoopTreeBuilder::build(&cfg.func);

    let root = tree.root();
    let lp = loop_of(&cfg, &tree, 'B');
    assert_ne!(root, lp);

    assert_eq!(loop_of(&cfg, &tree, 'A'), root);
    assert_eq!(loop_of(&cfg, &tree, 'D'), root);
    assert!(tree.get(root).inners().contains(&lp));

    assert!(tree.get(lp).is_reducible());
    assert_eq!(tree.get(lp).header(), Some(cfg.block('B')));
    assert_eq!(back_edge_ids(&cfg, &tree, lp), vec![5]);
    assert_eq!(loop_of(&cfg, &tree, 'C'), lp);
    assert_eq!(loop_of(&cfg, &tree, 'E'), lp);
    assert_eq!(loop_of(&cfg, &tree, 'F'), lp);
    assert_eq!(tree.get(lp).outer(), Some(root));
    assert!(tree.get(lp).inners().is_empty());
}

#[test]
fn reducible_headers_dominate_their_bodies() {
    for cfg in [example2(), example3(), example4(), example5()] {
        let tree = LoopTreeBuilder::build(&cfg.func);
        let domtree = lumen_ir::DomTreeBuilder::build(&cfg.func);
        for (_, lp) in tree.iter() {
            if !lp.is_reducible() {
                continue;
            }
            let Some(header) = lp.header() else { continue };
            for &node in lp.body() {
                assert!(domtree.dominates(header, node));
            }
        }
    }
}
