//! Property-based tests: both stores against a `Vec` model.

use proptest::prelude::*;
use seqlist::{GapSeq, List, Region, TreeSeq};

// =============================================================================
// Test helpers
// =============================================================================

/// A random edit, positions given as fractions of the current length.
#[derive(Clone, Debug)]
enum EditOp {
    Insert { pos_pct: f64, values: Vec<i32> },
    Remove { pos_pct: f64, len_pct: f64 },
    Set { pos_pct: f64, value: i32 },
    Rotate { distance: isize },
    Reverse,
}

fn arbitrary_edit_op() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        4 => (0.0..=1.0f64, prop::collection::vec(-50..50i32, 1..40))
            .prop_map(|(pos_pct, values)| EditOp::Insert { pos_pct, values }),
        3 => (0.0..=1.0f64, 0.0..=0.5f64).prop_map(|(pos_pct, len_pct)| EditOp::Remove { pos_pct, len_pct }),
        2 => (0.0..=1.0f64, any::<i32>()).prop_map(|(pos_pct, value)| EditOp::Set { pos_pct, value }),
        1 => (-20..20isize).prop_map(|distance| EditOp::Rotate { distance }),
        1 => Just(EditOp::Reverse),
    ]
}

fn position(pct: f64, len: usize) -> usize {
    return ((pct * len as f64) as usize).min(len);
}

fn apply_model(model: &mut Vec<i32>, op: &EditOp) {
    let len = model.len();
    match op {
        EditOp::Insert { pos_pct, values } => {
            let at = position(*pos_pct, len);
            model.splice(at..at, values.iter().copied());
        }
        EditOp::Remove { pos_pct, len_pct } => {
            if len == 0 {
                return;
            }
            let start = position(*pos_pct, len - 1);
            let count = ((*len_pct * (len - start) as f64) as usize).max(1);
            model.drain(start..start + count);
        }
        EditOp::Set { pos_pct, value } => {
            if len == 0 {
                return;
            }
            model[position(*pos_pct, len - 1)] = *value;
        }
        EditOp::Rotate { distance } => {
            if len > 0 {
                model.rotate_right(distance.rem_euclid(len as isize) as usize);
            }
        }
        EditOp::Reverse => model.reverse(),
    }
}

fn apply_seq<L: List<Elem = i32>>(seq: &mut L, op: &EditOp) {
    let len = seq.len();
    match op {
        EditOp::Insert { pos_pct, values } => {
            seq.insert_all(position(*pos_pct, len), values).expect("insert in range");
        }
        EditOp::Remove { pos_pct, len_pct } => {
            if len == 0 {
                return;
            }
            let start = position(*pos_pct, len - 1);
            let count = ((*len_pct * (len - start) as f64) as usize).max(1);
            seq.remove_range(start, count).expect("remove in range");
        }
        EditOp::Set { pos_pct, value } => {
            if len == 0 {
                return;
            }
            seq.set(position(*pos_pct, len - 1), *value).expect("set in range");
        }
        EditOp::Rotate { distance } => seq.rotate(*distance).expect("rotate"),
        EditOp::Reverse => seq.reverse().expect("reverse"),
    }
}

// =============================================================================
// Store equivalence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn stores_match_vec_model(ops in prop::collection::vec(arbitrary_edit_op(), 1..60)) {
        let mut model = Vec::new();
        let mut gap = GapSeq::<i32>::with_capacity(0);
        let mut tree = TreeSeq::<i32>::with_block_size(4).expect("valid block size");

        for op in &ops {
            apply_model(&mut model, op);
            apply_seq(&mut gap, op);
            apply_seq(&mut tree, op);
            tree.check_invariants();
        }

        prop_assert_eq!(gap.to_vec(), model.clone());
        prop_assert_eq!(tree.to_vec(), model.clone());
        prop_assert_eq!(tree.iter().collect::<Vec<_>>(), model.clone());
        for (i, &expected) in model.iter().enumerate() {
            prop_assert_eq!(tree.get(i), Ok(expected));
        }
        prop_assert!(gap == tree);
    }

    #[test]
    fn set_then_get(values in prop::collection::vec(any::<i64>(), 1..300), picks in prop::collection::vec((any::<prop::sample::Index>(), any::<i64>()), 1..50)) {
        let mut tree = TreeSeq::<i64>::with_block_size(8).expect("valid block size");
        tree.add_all(&values).expect("append");
        for (index, value) in picks {
            let i = index.index(values.len());
            tree.set(i, value).expect("in range");
            prop_assert_eq!(tree.get(i), Ok(value));
        }
    }

    #[test]
    fn resize_pads_with_element(start in prop::collection::vec(any::<i16>(), 0..100), len in 0usize..200, elem in any::<i16>()) {
        let mut seq = TreeSeq::<i16>::with_block_size(16).expect("valid block size");
        seq.add_all(&start).expect("append");
        seq.resize(len, elem).expect("resize");
        prop_assert_eq!(seq.len(), len);
        for i in start.len().min(len)..len {
            prop_assert_eq!(seq.get(i), Ok(elem));
        }
    }

    #[test]
    fn sorted_search_finds_members(mut values in prop::collection::vec(-1000..1000i32, 0..300), probe in -1100..1100i32) {
        let mut seq = TreeSeq::<i32>::with_block_size(8).expect("valid block size");
        seq.add_all(&values).expect("append");
        seq.sort().expect("sort");
        values.sort();
        prop_assert_eq!(seq.to_vec(), values.clone());

        for &v in &values {
            let found = seq.binary_search(v).expect("present");
            prop_assert_eq!(seq.get(found), Ok(v));
        }
        match seq.binary_search(probe) {
            Ok(found) => prop_assert_eq!(seq.get(found), Ok(probe)),
            Err(at) => {
                prop_assert!(!values.contains(&probe));
                prop_assert_eq!(at, values.partition_point(|&v| v < probe));
            }
        }
    }

    #[test]
    fn permutations_preserve_size_and_multiset(values in prop::collection::vec(0..20u8, 2..80), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>(), distance in -100..100isize) {
        let values: Vec<i32> = values.into_iter().map(i32::from).collect();
        let n = values.len();
        let len = (n / 2).max(1);
        let src = a.index(n - len + 1);
        let dst = b.index(n - len + 1);

        let mut seq = GapSeq::from_slice(&values);
        seq.reverse_range(src, len).expect("reverse");
        seq.rotate_range(dst, len, distance).expect("rotate");
        seq.copy_region(src, dst, len).expect("copy");
        prop_assert_eq!(seq.len(), n);

        let mut permuted = GapSeq::from_slice(&values);
        permuted.reverse().expect("reverse");
        permuted.rotate(distance).expect("rotate");
        let mut sorted = permuted.to_vec();
        sorted.sort();
        let mut expected = values.clone();
        expected.sort();
        prop_assert_eq!(sorted, expected);

        let mut moved = TreeSeq::<i32>::with_block_size(4).expect("valid block size");
        moved.add_all(&values).expect("append");
        moved.move_region(src, dst, len).expect("move");
        prop_assert_eq!(moved.len(), n);
        for i in 0..len {
            prop_assert_eq!(moved.get(dst + i), Ok(values[src + i]));
        }
        for i in src..src + len {
            if i < dst || i >= dst + len {
                prop_assert_eq!(moved.get(i), Ok(0));
            }
        }
    }

    #[test]
    fn disjoint_swaps_and_drags_preserve_multiset(values in prop::collection::vec(0..20u8, 2..80), l in any::<prop::sample::Index>(), x in any::<prop::sample::Index>(), y in any::<prop::sample::Index>()) {
        let values: Vec<i32> = values.into_iter().map(i32::from).collect();
        let n = values.len();
        let len = l.index(n / 2) + 1;
        let room = n - 2 * len;
        let a = x.index(room + 1);
        let b = a + len + y.index(room - a + 1);

        let mut seq = TreeSeq::<i32>::with_block_size(4).expect("valid block size");
        seq.add_all(&values).expect("append");
        seq.swap_region(b, a, len).expect("swap");
        prop_assert_eq!(seq.len(), n);
        prop_assert_eq!(seq.to_vec_range(a, len).expect("in range"), values[b..b + len].to_vec());
        prop_assert_eq!(seq.to_vec_range(b, len).expect("in range"), values[a..a + len].to_vec());

        seq.drag(a, b, len).expect("drag");
        seq.check_invariants();
        let mut sorted = seq.to_vec();
        sorted.sort();
        let mut expected = values.clone();
        expected.sort();
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn clone_is_independent(values in prop::collection::vec(any::<i32>(), 1..200)) {
        let mut tree = TreeSeq::<i32>::with_block_size(8).expect("valid block size");
        tree.add_all(&values).expect("append");
        let copy = tree.clone();
        tree.remove_range(0, values.len() / 2).expect("remove");
        tree.add(7).expect("append");
        prop_assert_eq!(copy.to_vec(), values);
    }
}
