use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use approx::assert_abs_diff_eq;
use quickcheck::quickcheck;
use rand::Rng;

use super::*;
use crate::config::CONFIG_TEST_LOCK;

///////////////////////////////////////////////////////////////////////////
// Terminal operations on ranges

#[test]
fn sums_a_large_range() {
    let total: i64 = from_range(0, 1_000_000, 1).sum();
    assert_eq!(total, 499_999_500_000);
}

#[test]
fn maps_and_collects_in_order() {
    let squares: Vec<i64> = from_range(0, 10, 1).map(|x| x * x).collect();
    assert_eq!(squares, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
}

#[test]
fn filters_and_collects_in_order() {
    let evens: Vec<i64> = from_range(0, 20, 1).filter(|x| x % 2 == 0).collect();
    assert_eq!(evens, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18]);
}

#[test]
fn reduces_with_identity_and_op() {
    let factorial = from_range(1, 11, 1).reduce(|| 1, |a, b| a * b);
    assert_eq!(factorial, 3_628_800);
}

#[test]
fn filter_map_combines_both_steps() {
    let roots: Vec<i64> = from_range(0, 100, 1)
        .filter_map(|x| {
            let root = (x as f64).sqrt() as i64;
            (root * root == x).then_some(root)
        })
        .collect();
    assert_eq!(roots, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn collects_a_large_range_in_order() {
    let expected: Vec<i64> = (0..100_000).map(|x| x * 3).collect();
    let collected: Vec<i64> = from_range(0, 100_000, 1).map(|x| x * 3).collect();
    assert_eq!(collected, expected);
}

#[test]
fn negative_step_ranges_work() {
    let countdown: Vec<i64> = from_range(10, 0, -3).collect();
    assert_eq!(countdown, vec![10, 7, 4, 1]);
    assert_eq!(from_range(100, 0, -1).count(), 100);
}

#[test]
fn std_range_converts() {
    let total: i64 = (0i64..1000).into_par_iter().sum();
    assert_eq!(total, 499_500);
}

///////////////////////////////////////////////////////////////////////////
// Sequences

#[test]
fn max_by_key_picks_longest_string() {
    let words = ["a", "abc", "ab", "abcdef"];
    let longest = from_sequence(&words).max_by_key(|w| w.len());
    assert_eq!(longest, Some(&"abcdef"));
}

#[test]
fn min_max_tie_goes_to_the_earlier_element() {
    let _guard = CONFIG_TEST_LOCK.lock();
    let words = ["aa", "bb", "cc"];
    assert_eq!(from_sequence(&words).min_by_key(|w| w.len()), Some(&"aa"));
    assert_eq!(from_sequence(&words).max_by_key(|w| w.len()), Some(&"aa"));
}

#[test]
fn sequence_collect_round_trips() {
    let xs: Vec<i32> = (0..50_000).collect();
    let copied: Vec<i32> = from_sequence(&xs).map(|&x| x).collect();
    assert_eq!(copied, xs);
}

#[test]
fn sums_element_references() {
    let xs = vec![1i64, 2, 3, 4];
    let total: i64 = from_sequence(&xs).sum();
    assert_eq!(total, 10);
    let total: i64 = (&xs).into_par_iter().sum();
    assert_eq!(total, 10);
}

#[test]
fn min_by_key_matches_sequential_on_random_data() {
    let mut rng = rand::thread_rng();
    let data: Vec<u32> = (0..50_000).map(|_| rng.gen_range(0..1_000_000)).collect();
    let expected = data.iter().min_by_key(|x| **x % 1013);
    let found = from_sequence(&data).min_by_key(|x| **x % 1013);
    assert_eq!(found, expected);
}

///////////////////////////////////////////////////////////////////////////
// Short-circuiting

#[test]
fn any_finds_a_witness_and_stops_early() {
    let _guard = CONFIG_TEST_LOCK.lock();
    let examined = AtomicUsize::new(0);
    let found = from_range(0, 100, 1).any(|x| {
        examined.fetch_add(1, Ordering::Relaxed);
        x == 73
    });
    assert!(found);
    assert!(examined.load(Ordering::Relaxed) < 100);
}

#[test]
fn any_without_witness_is_false() {
    assert!(!from_range(0, 100, 1).any(|x| x == 1000));
}

#[test]
fn all_spots_a_counterexample() {
    assert!(!from_range(0, 100, 1).all(|x| x < 50));
    assert!(from_range(0, 100, 1).all(|x| x < 100));
}

#[test]
fn any_short_circuits_across_parallel_branches() {
    let _guard = CONFIG_TEST_LOCK.lock();
    crate::set_min_split_size(1000).unwrap();
    let examined = AtomicUsize::new(0);
    let found = from_range(0, 1_000_000, 1).any(|x| {
        examined.fetch_add(1, Ordering::Relaxed);
        x == 500
    });
    crate::set_min_split_size(10_000).unwrap();
    assert!(found);
    assert!(examined.load(Ordering::Relaxed) < 1_000_000);
}

///////////////////////////////////////////////////////////////////////////
// Empty inputs

#[test]
fn empty_inputs_have_documented_answers() {
    let empty: [i64; 0] = [];
    assert_eq!(from_sequence(&empty).sum::<i64>(), 0);
    assert_eq!(from_sequence(&empty).count(), 0);
    assert!(!from_sequence(&empty).any(|_| true));
    assert!(from_sequence(&empty).all(|_| false));
    assert_eq!(from_sequence(&empty).min(), None);
    assert_eq!(from_sequence(&empty).max(), None);
    assert_eq!(from_sequence(&empty).map(|&x| x).collect(), Vec::<i64>::new());
    assert_eq!(from_range(5, 5, 1).sum::<i64>(), 0);
}

///////////////////////////////////////////////////////////////////////////
// Unindexed sources

#[test]
fn iterable_sum_matches_sequential() {
    let expected: i64 = (0i64..25_000).filter(|x| x % 3 == 0).sum();
    let total: i64 = from_iterable((0i64..25_000).filter(|x| x % 3 == 0)).sum();
    assert_eq!(total, expected);
}

#[test]
fn iterable_count_and_min() {
    assert_eq!(from_iterable(0i64..25_000).count(), 25_000);
    assert_eq!(from_iterable(10i64..25_000).min(), Some(10));
    assert_eq!(from_iterable(std::iter::empty::<i64>()).max(), None);
}

#[test]
fn iterable_any_finds_late_witness() {
    assert!(from_iterable(0i64..100_000).any(|x| x == 99_999));
    assert!(!from_iterable(0i64..100_000).any(|x| x < 0));
}

#[test]
fn iterable_pipeline_composes() {
    let expected: i64 = (0i64..30_000).map(|x| x * 2).filter(|x| x % 5 == 0).sum();
    let total: i64 = from_iterable(0i64..30_000)
        .map(|x| x * 2)
        .filter(|x| x % 5 == 0)
        .sum();
    assert_eq!(total, expected);
}

///////////////////////////////////////////////////////////////////////////
// Side-effecting terminals

#[test]
fn for_each_visits_every_element() {
    let total = AtomicI64::new(0);
    from_range(0, 1000, 1).for_each(|x| {
        total.fetch_add(x, Ordering::Relaxed);
    });
    assert_eq!(total.load(Ordering::Relaxed), 499_500);
}

#[test]
fn for_each_ordered_runs_in_source_order() {
    let mut seen = Vec::new();
    from_range(0, 100, 1).map(|x| x * 2).for_each_ordered(|x| seen.push(x));
    let expected: Vec<i64> = (0..100).map(|x| x * 2).collect();
    assert_eq!(seen, expected);
}

///////////////////////////////////////////////////////////////////////////
// Errors and configuration

#[test]
#[should_panic(expected = "boom")]
fn user_panic_propagates_to_the_caller() {
    from_range(0, 100_000, 1)
        .map(|x| if x == 50_000 { panic!("boom") } else { x })
        .sum::<i64>();
}

#[test]
fn completes_for_every_pool_size() {
    let _guard = CONFIG_TEST_LOCK.lock();
    let original = crate::current_num_threads();
    for &threads in &[1usize, 2, 4, 8, 32] {
        crate::set_num_threads(threads).unwrap();
        let total: i64 = from_range(0, 100_000, 1).sum();
        assert_eq!(total, 4_999_950_000, "num_threads={}", threads);
    }
    crate::set_num_threads(original).unwrap();
}

#[test]
fn tiny_split_sizes_preserve_order() {
    let _guard = CONFIG_TEST_LOCK.lock();
    crate::set_min_split_size(16).unwrap();
    let expected: Vec<i64> = (0..10_000).collect();
    let collected: Vec<i64> = from_range(0, 10_000, 1).collect();
    crate::set_min_split_size(10_000).unwrap();
    assert_eq!(collected, expected);
}

#[test]
fn explicit_split_depth_is_respected() {
    let _guard = CONFIG_TEST_LOCK.lock();
    crate::set_max_split_depth(2).unwrap();
    let total: i64 = from_range(0, 200_000, 1).sum();
    assert_eq!(total, 19_999_900_000);
}

///////////////////////////////////////////////////////////////////////////
// Floats

#[test]
fn upper_bound_survives_adapters() {
    let pipeline = from_range(0, 1000, 1).map(|x| x * 2).filter(|x| x % 3 == 0);
    assert_eq!(pipeline.upper_bound(), 1000);
    assert_eq!(from_sequence(&[1, 2, 3]).upper_bound(), 3);
}

#[test]
fn float_sum_is_close_to_sequential() {
    let total: f64 = from_range(0, 10_000, 1).map(|_| 0.1f64).sum();
    assert_abs_diff_eq!(total, 1000.0, epsilon = 1e-6);
}

///////////////////////////////////////////////////////////////////////////
// Properties

quickcheck! {
    fn prop_sum_matches_sequential(xs: Vec<i32>) -> bool {
        let expected: i64 = xs.iter().map(|&x| x as i64).sum();
        let total: i64 = from_sequence(&xs).map(|&x| x as i64).sum();
        total == expected
    }

    fn prop_collect_round_trips(xs: Vec<i32>) -> bool {
        let collected: Vec<i32> = from_sequence(&xs).map(|&x| x).collect();
        collected == xs
    }

    fn prop_filter_matches_sequential(xs: Vec<i32>) -> bool {
        let expected: Vec<i32> = xs.iter().copied().filter(|x| x % 2 == 0).collect();
        let got: Vec<i32> = from_sequence(&xs).map(|&x| x).filter(|x| x % 2 == 0).collect();
        got == expected
    }

    fn prop_min_matches_sequential(xs: Vec<i32>) -> bool {
        from_sequence(&xs).map(|&x| x).min() == xs.iter().copied().min()
    }

    fn prop_count_matches_len(xs: Vec<i32>) -> bool {
        from_sequence(&xs).count() == xs.len()
    }
}
