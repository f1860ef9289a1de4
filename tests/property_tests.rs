//! Property tests for junction-tree invariants and construction determinism.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

use baytree::inference::symbolic::SymbolicFactor;
use baytree::noise::NoiseModel;
use baytree::{build_junction_tree, Clique, EliminationTree, EliminationTreeNode, Key};

/// Builds a random single-root elimination tree over keys `0..n` from raw
/// seed words, `n = seeds.len() + 1`.
///
/// Key `i` is attached below a uniformly seeded parent among `i+1..n`, and
/// carries a binary factor with that parent, occasionally widened with the
/// grandparent key. The deepest node involving each factor's keys is the
/// node it is attached to, so the tree is well formed by construction.
fn build_random_tree(seeds: &[(u64, u64)]) -> EliminationTree<SymbolicFactor> {
    let n = seeds.len() + 1;
    let parent_of = |i: usize| -> usize {
        let span = (n - 1 - i) as u64;
        i + 1 + (seeds[i].0 % span) as usize
    };

    let mut pending: Vec<Vec<EliminationTreeNode<SymbolicFactor>>> =
        (0..n).map(|_| Vec::new()).collect();
    for i in 0..n - 1 {
        let parent = parent_of(i);
        let mut keys = vec![Key(i as u64), Key(parent as u64)];
        if seeds[i].1 % 2 == 1 && parent < n - 1 {
            keys.push(Key(parent_of(parent) as u64));
        }
        let factors = vec![Arc::new(SymbolicFactor::new(keys))];
        let node = EliminationTreeNode::with_children(
            Key(i as u64),
            factors,
            std::mem::take(&mut pending[i]),
        );
        pending[parent].push(node);
    }

    let root_key = Key((n - 1) as u64);
    let root = EliminationTreeNode::with_children(
        root_key,
        vec![Arc::new(SymbolicFactor::new([root_key]))],
        std::mem::take(&mut pending[n - 1]),
    );
    EliminationTree::new(vec![root], vec![])
}

/// Flattens a clique forest into a comparable structural signature.
fn forest_signature(roots: &[Clique<SymbolicFactor>]) -> Vec<String> {
    fn walk(clique: &Clique<SymbolicFactor>, depth: usize, out: &mut Vec<String>) {
        let frontals: Vec<u64> = clique.ordered_frontal_keys.iter().map(|k| k.0).collect();
        let factors: Vec<String> = clique
            .factors
            .iter()
            .map(|f| format!("{:?}", f.keys()))
            .collect();
        out.push(format!(
            "{depth}|{frontals:?}|{}|{}",
            factors.join(";"),
            clique.problem_size
        ));
        for child in &clique.children {
            walk(child, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    for root in roots {
        walk(root, 0, &mut out);
    }
    out
}

/// Recomputes each clique's separator from its factor group and asserts
/// it is covered by the frontals of its ancestors. Returns the separator.
fn assert_running_intersection(
    clique: &Clique<SymbolicFactor>,
    ancestors: &HashSet<u64>,
) -> HashSet<u64> {
    let own: HashSet<u64> = clique.ordered_frontal_keys.iter().map(|k| k.0).collect();

    let mut involved: HashSet<u64> = HashSet::new();
    for f in &clique.factors {
        involved.extend(f.keys().iter().map(|k| k.0));
    }

    let mut below: HashSet<u64> = ancestors.clone();
    below.extend(own.iter().copied());
    for child in &clique.children {
        involved.extend(assert_running_intersection(child, &below));
    }

    let separator: HashSet<u64> = involved.difference(&own).copied().collect();
    assert!(
        separator.is_subset(ancestors),
        "separator {separator:?} not covered by ancestor frontals {ancestors:?}"
    );
    separator
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_key_is_frontal_in_exactly_one_clique(
        seeds in prop::collection::vec((any::<u64>(), any::<u64>()), 1..24)
    ) {
        let tree = build_random_tree(&seeds);
        let jt = build_junction_tree(&tree).unwrap();

        let mut frontals: Vec<u64> = jt
            .cliques()
            .flat_map(|c| c.ordered_frontal_keys.iter().map(|k| k.0))
            .collect();
        frontals.sort_unstable();

        let expected: Vec<u64> = (0..=seeds.len() as u64).collect();
        prop_assert_eq!(frontals, expected);
    }

    #[test]
    fn every_factor_is_assigned_to_exactly_one_clique(
        seeds in prop::collection::vec((any::<u64>(), any::<u64>()), 1..24)
    ) {
        let tree = build_random_tree(&seeds);
        let jt = build_junction_tree(&tree).unwrap();

        let assigned: Vec<_> = jt
            .cliques()
            .flat_map(|c| c.factors.iter().map(Arc::as_ptr))
            .collect();
        let unique: HashSet<_> = assigned.iter().copied().collect();

        // One factor per non-root node plus the root's unary factor.
        prop_assert_eq!(assigned.len(), seeds.len() + 1);
        prop_assert_eq!(unique.len(), assigned.len());
    }

    #[test]
    fn construction_is_deterministic(
        seeds in prop::collection::vec((any::<u64>(), any::<u64>()), 1..24)
    ) {
        let tree = build_random_tree(&seeds);
        let first = build_junction_tree(&tree).unwrap();
        let second = build_junction_tree(&tree).unwrap();

        prop_assert_eq!(
            forest_signature(first.roots()),
            forest_signature(second.roots())
        );
    }

    #[test]
    fn separators_satisfy_running_intersection(
        seeds in prop::collection::vec((any::<u64>(), any::<u64>()), 1..24)
    ) {
        let tree = build_random_tree(&seeds);
        let jt = build_junction_tree(&tree).unwrap();

        for root in jt.roots() {
            let leftover = assert_running_intersection(root, &HashSet::new());
            prop_assert!(leftover.is_empty(), "root separator {:?} is nonempty", leftover);
        }
    }

    #[test]
    fn diagonal_noise_whiten_unwhiten_round_trips(
        sigmas in prop::collection::vec(0.05f64..50.0, 1..8),
        scale in -10.0f64..10.0
    ) {
        let dim = sigmas.len();
        let model = NoiseModel::diagonal_sigmas(sigmas).unwrap();
        let v: Vec<f64> = (0..dim).map(|i| scale * (i as f64 + 1.0)).collect();

        let back = model.unwhiten(&model.whiten(&v).unwrap()).unwrap();
        for (x, y) in v.iter().zip(&back) {
            prop_assert!((x - y).abs() < 1e-9);
        }
    }
}
