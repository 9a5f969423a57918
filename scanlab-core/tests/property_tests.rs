//! Property tests for strategy equivalence

use proptest::prelude::*;

use scanlab_core::predicate::{
    select_less_than_branching, select_less_than_branchless, ConjunctionStrategy,
};
use scanlab_core::scan::{sum_prefetching_bounce, sum_sequence};
use scanlab_core::transform::{copy, subtract, TransformStrategy, UnrollFactor};
use scanlab_core::{random_permutation_like, SelectionVector};

proptest! {
    #[test]
    fn prop_duff_matches_scalar(
        values in prop::collection::vec(any::<i32>(), 0..200),
        eight in any::<bool>(),
    ) {
        let factor = if eight { UnrollFactor::Eight } else { UnrollFactor::Four };
        let mut scalar = vec![0; values.len()];
        let mut duff = vec![0; values.len()];
        copy(&values, &mut scalar, TransformStrategy::Scalar);
        copy(&values, &mut duff, TransformStrategy::Duff(factor));
        prop_assert_eq!(duff, scalar);
    }

    #[test]
    fn prop_subtract_duff_matches_scalar(pairs in prop::collection::vec(any::<(i64, i64)>(), 0..100)) {
        let (left, right): (Vec<i64>, Vec<i64>) = pairs.into_iter().unzip();
        let mut scalar = vec![0; left.len()];
        let mut duff = vec![0; left.len()];
        subtract(&left, &right, &mut scalar, TransformStrategy::Scalar);
        subtract(&left, &right, &mut duff, TransformStrategy::Duff(UnrollFactor::Eight));
        prop_assert_eq!(duff, scalar);
    }

    #[test]
    fn prop_unrolled_matches_scalar_on_multiples(blocks in 0usize..20, seed in any::<i32>()) {
        let values: Vec<i32> = (0..blocks * 8).map(|i| seed.wrapping_add(i as i32)).collect();
        let mut scalar = vec![0; values.len()];
        let mut unrolled = vec![0; values.len()];
        copy(&values, &mut scalar, TransformStrategy::Scalar);
        copy(&values, &mut unrolled, TransformStrategy::Unrolled(UnrollFactor::Eight));
        prop_assert_eq!(unrolled, scalar);
    }

    #[test]
    fn prop_random_sequence_is_deterministic(n in 0usize..500, seed in any::<u64>()) {
        let a: Vec<usize> = random_permutation_like(n, seed).collect();
        let b: Vec<usize> = random_permutation_like(n, seed).collect();
        prop_assert_eq!(a.len(), n);
        prop_assert!(a.iter().all(|&i| i < n));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_branching_and_branchless_agree(
        column in prop::collection::vec(any::<i32>(), 0..300),
        v in any::<i32>(),
    ) {
        let mut branching = SelectionVector::with_capacity(column.len());
        let mut branchless = SelectionVector::with_capacity(column.len());
        let a = select_less_than_branching(&column, v, &mut branching);
        let b = select_less_than_branchless(&column, v, &mut branchless);
        prop_assert_eq!(a, b);
        prop_assert_eq!(branching.selected(), branchless.selected());
        prop_assert_eq!(a.count, column.iter().filter(|&&x| x < v).count());
    }

    #[test]
    fn prop_selectivity_monotone_in_threshold(
        column in prop::collection::vec(0i32..1000, 1..300),
        mut thresholds in prop::collection::vec(0i32..1100, 2..10),
    ) {
        thresholds.sort_unstable();
        let mut out = SelectionVector::with_capacity(column.len());
        let selectivities: Vec<f64> = thresholds
            .iter()
            .map(|&v| select_less_than_branchless(&column, v, &mut out).selectivity())
            .collect();
        prop_assert!(selectivities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_conjunction_orderings_agree(
        column in prop::collection::vec(any::<i32>(), 0..300),
        v in any::<i32>(),
    ) {
        let mut outer_range = SelectionVector::with_capacity(column.len());
        let mut outer_parity = SelectionVector::with_capacity(column.len());
        let a = ConjunctionStrategy::OuterRange.select(&column, v, &mut outer_range);
        let b = ConjunctionStrategy::OuterParity.select(&column, v, &mut outer_parity);
        prop_assert_eq!(a.count, b.count);
        prop_assert_eq!(outer_range.selected(), outer_parity.selected());
    }

    #[test]
    fn prop_prefetch_never_changes_the_sum(
        values in prop::collection::vec(any::<i64>(), 0..400),
        lookahead in 1usize..300,
        seed in any::<u64>(),
    ) {
        let plain = sum_sequence(&values, random_permutation_like(values.len(), seed));
        prop_assert_eq!(sum_prefetching_bounce(&values, lookahead, seed), plain);
    }
}
