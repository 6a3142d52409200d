//! Stream operations agree with the corresponding `Vec`/iterator operations
//! on random finite inputs.

use lazy_stream::Stream;
use proptest::prelude::*;

fn stream_of(items: &[i32]) -> Stream<i32> {
    items.iter().copied().collect()
}

fn small_vec() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(-1_000..1_000i32, 0..64)
}

proptest! {
    #[test]
    fn to_vec_preserves_order(items in small_vec()) {
        prop_assert_eq!(stream_of(&items).to_vec(), items);
    }

    #[test]
    fn map_matches_iterator(items in small_vec()) {
        let expected: Vec<i64> = items.iter().map(|x| i64::from(*x) * 3).collect();
        prop_assert_eq!(stream_of(&items).map(|x| i64::from(*x) * 3).to_vec(), expected);
    }

    #[test]
    fn filter_matches_iterator(items in small_vec(), modulus in 1..7i32) {
        let expected: Vec<i32> = items.iter().copied().filter(|x| x % modulus == 0).collect();
        prop_assert_eq!(stream_of(&items).filter(move |x| x % modulus == 0).to_vec(), expected);
    }

    #[test]
    fn take_and_skip_match_iterator(items in small_vec(), n in 0..80usize) {
        let taken: Vec<i32> = items.iter().copied().take(n).collect();
        let skipped: Vec<i32> = items.iter().copied().skip(n).collect();
        prop_assert_eq!(stream_of(&items).take(n).to_vec(), taken);
        prop_assert_eq!(stream_of(&items).skip(n).to_vec(), skipped);
    }

    #[test]
    fn take_while_and_skip_while_match_iterator(items in small_vec(), bound in -1_000..1_000i32) {
        let kept: Vec<i32> = items.iter().copied().take_while(|x| *x < bound).collect();
        let rest: Vec<i32> = items.iter().copied().skip_while(|x| *x < bound).collect();
        prop_assert_eq!(stream_of(&items).take_while(move |x| *x < bound).to_vec(), kept);
        prop_assert_eq!(stream_of(&items).skip_while(|x| *x < bound).to_vec(), rest);
    }

    #[test]
    fn zip_matches_iterator(left in small_vec(), right in small_vec()) {
        let expected: Vec<(i32, i32)> = left.iter().copied().zip(right.iter().copied()).collect();
        prop_assert_eq!(stream_of(&left).zip(stream_of(&right)).to_vec(), expected);
    }

    #[test]
    fn append_matches_chain(left in small_vec(), right in small_vec()) {
        let expected: Vec<i32> = left.iter().chain(right.iter()).copied().collect();
        prop_assert_eq!(stream_of(&left).append(stream_of(&right)).to_vec(), expected);
    }

    #[test]
    fn folds_match_iterator(items in small_vec()) {
        let sum: i64 = items.iter().map(|x| i64::from(*x)).sum();
        prop_assert_eq!(stream_of(&items).fold_left(0i64, |acc, x| acc + i64::from(*x)), sum);

        let reversed: Vec<i32> = items.iter().rev().copied().collect();
        let folded = stream_of(&items).fold_right(Vec::new(), |x, rest| {
            let mut acc = rest.force().clone();
            acc.push(*x.force());
            acc
        });
        prop_assert_eq!(folded, reversed);
        prop_assert_eq!(stream_of(&items).count(), items.len());
    }

    #[test]
    fn scan_matches_running_sum(items in small_vec()) {
        let expected: Vec<i32> = items
            .iter()
            .scan(0, |acc, x| {
                *acc += x;
                Some(*acc)
            })
            .collect();
        prop_assert_eq!(stream_of(&items).scan(0, |acc, x| acc + x).to_vec(), expected);
    }

    #[test]
    fn flat_map_matches_iterator(items in small_vec()) {
        let expected: Vec<i32> = items
            .iter()
            .flat_map(|x| std::iter::repeat_n(*x, x.rem_euclid(3) as usize))
            .collect();
        let flattened = stream_of(&items).flat_map(|x| {
            let copies = vec![*x; x.rem_euclid(3) as usize];
            stream_of(&copies)
        });
        prop_assert_eq!(flattened.to_vec(), expected);
    }

    #[test]
    fn nth_matches_indexing(items in small_vec(), index in 0..80usize) {
        prop_assert_eq!(stream_of(&items).nth(index), items.get(index).copied());
    }

    #[test]
    fn any_and_all_match_iterator(items in small_vec(), bound in -1_000..1_000i32) {
        prop_assert_eq!(stream_of(&items).any(|x| *x > bound), items.iter().any(|x| *x > bound));
        prop_assert_eq!(stream_of(&items).all(|x| *x > bound), items.iter().all(|x| *x > bound));
    }
}
