//! Flattening over larger and deeply shared expression DAGs

use stick_ir::{flatten, OpKind, Scalar};

#[test]
fn deep_left_leaning_chain_does_not_recurse() {
    // Thousands of chained additions: an explicit-worklist traversal
    // handles this without exhausting the stack.
    let mut expr = Scalar::new(0.0);
    for _ in 0..4_000 {
        expr = expr + Scalar::new(1.0);
    }
    let g = flatten(&expr).expect("flatten");
    assert_eq!(g.len(), 2 * 4_000 + 1);
    assert_eq!(g.nodes[g.root()].kind, OpKind::Add);
}

#[test]
fn diamond_sharing_counts_each_node_once() {
    let leaf = Scalar::new(1.5);
    let left = &leaf + &Scalar::new(2.0);
    let right = &leaf * &Scalar::new(3.0);
    let top = &left + &right;

    let g = flatten(&top).expect("flatten");
    // leaf, 2.0, 3.0, left, right, top
    assert_eq!(g.len(), 6);

    let loads = g.nodes.iter().filter(|n| n.kind == OpKind::Load).count();
    assert_eq!(loads, 3);
}

#[test]
fn flattening_is_reproducible() {
    let build = || {
        let shared = Scalar::new(2.0) - Scalar::new(3.0);
        let expr = &shared * &(&shared + &Scalar::new(1.0));
        flatten(&expr).expect("flatten")
    };
    assert_eq!(build(), build());
}
