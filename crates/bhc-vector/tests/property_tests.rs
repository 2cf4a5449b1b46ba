//! Property tests for bhc-vector
//!
//! These tests verify the view, reinterpretation and transformation laws of
//! `Vector`.

use bhc_vector::{read_binary, write_binary, Vector, VectorError};
use proptest::prelude::*;
use tempfile::TempDir;

fn non_empty_f64() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(any::<f64>(), 1..64)
}

fn non_empty_i64() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(any::<i64>(), 1..64)
}

/// A vector together with a valid `(start, count)` window into it.
fn vec_and_window() -> impl Strategy<Value = (Vec<i64>, usize, usize)> {
    non_empty_i64().prop_flat_map(|data| {
        let len = data.len();
        (Just(data), 0..len).prop_flat_map(move |(data, start)| {
            (Just(data), Just(start), 1..=len - start)
        })
    })
}

/// A vector together with sizes that partition a prefix of it.
fn vec_and_sizes() -> impl Strategy<Value = (Vec<i64>, Vec<usize>)> {
    (prop::collection::vec(1usize..8, 1..6), 0usize..8).prop_flat_map(|(sizes, slack)| {
        let total: usize = sizes.iter().sum::<usize>() + slack;
        (prop::collection::vec(any::<i64>(), total), Just(sizes))
    })
}

fn bits(v: &Vector<f64>) -> Vec<u64> {
    v.iter().map(|x| x.to_bits()).collect()
}

// ============================================================
// Construction and view properties
// ============================================================

proptest! {
    #[test]
    fn from_slice_roundtrip(data in non_empty_i64()) {
        let v = Vector::from_slice(&data).unwrap();
        prop_assert_eq!(v.len(), data.len());
        prop_assert_eq!(v.to_vec(), data);
    }

    #[test]
    fn slice_matches_parent((data, start, count) in vec_and_window()) {
        let v = Vector::from_slice(&data).unwrap();
        let s = v.slice(start, count).unwrap();

        prop_assert_eq!(s.len(), count);
        prop_assert!(s.shares_storage(&v));
        for i in 0..count {
            prop_assert_eq!(s.at(i).unwrap(), v.at(start + i).unwrap());
        }
        prop_assert!(s.at(count).is_err());

        let copy = s.deep_clone();
        prop_assert!(!copy.shares_storage(&v));
        prop_assert_eq!(copy.as_slice(), &data[start..start + count]);
    }

    #[test]
    fn slice_past_end_rejected(data in non_empty_i64(), extra in 1usize..8) {
        let v = Vector::from_slice(&data).unwrap();
        let is_shape_mismatch = matches!(
            v.slice(0, data.len() + extra),
            Err(VectorError::ShapeMismatch { .. })
        );
        prop_assert!(is_shape_mismatch);
    }

    #[test]
    fn split_matches_consecutive_ranges((data, sizes) in vec_and_sizes()) {
        let v = Vector::from_slice(&data).unwrap();
        let parts = v.split(&sizes).unwrap();
        prop_assert_eq!(parts.len(), sizes.len());

        let mut start = 0;
        for (part, &size) in parts.iter().zip(&sizes) {
            prop_assert_eq!(part.as_slice(), &data[start..start + size]);
            prop_assert_eq!(part.offset(), start);
            start += size;
        }
    }

    #[test]
    fn concat_of_split_restores((data, sizes) in vec_and_sizes()) {
        let v = Vector::from_slice(&data).unwrap();
        let parts = v.split(&sizes).unwrap();
        let joined = Vector::concat(&parts).unwrap();

        let used: usize = sizes.iter().sum();
        prop_assert_eq!(joined.len(), used);
        prop_assert_eq!(joined.as_slice(), &data[..used]);
    }

    #[test]
    fn at_len_out_of_range(data in non_empty_i64()) {
        let v = Vector::from_slice(&data).unwrap();
        let is_out_of_range = matches!(
            v.at(data.len()),
            Err(VectorError::IndexOutOfRange { .. })
        );
        prop_assert!(is_out_of_range);
    }
}

// ============================================================
// Reinterpretation properties
// ============================================================

proptest! {
    #[test]
    fn paired_then_flattened_is_identity(data in non_empty_f64(), half_start in 0usize..4) {
        let v = Vector::from_slice(&data).unwrap();
        let start = (half_start * 2).min(data.len() - 1) & !1;
        let count = (data.len() - start) & !1;
        prop_assume!(count > 0);

        let s = v.slice(start, count).unwrap();
        let z = s.as_paired().unwrap();
        prop_assert_eq!(z.len(), count / 2);
        prop_assert!(z.shares_storage(&v));

        let back = z.as_flattened();
        prop_assert_eq!(back.offset(), s.offset());
        prop_assert_eq!(bits(&back), bits(&s));
    }
}

// ============================================================
// Transformation properties
// ============================================================

proptest! {
    #[test]
    fn map_identity(data in non_empty_i64()) {
        let v = Vector::from_slice(&data).unwrap();
        prop_assert_eq!(v.map(|x| x), v);
    }

    #[test]
    fn map_composition(data in non_empty_i64()) {
        let v = Vector::from_slice(&data).unwrap();
        let f = |a: i64| a.wrapping_add(1);
        let g = |a: i64| a.wrapping_mul(3);

        let left = v.map(|a| f(g(a)));
        let right = v.map(g).map(f);
        prop_assert_eq!(left, right);
    }

    #[test]
    fn zip_with_length_is_min(a in non_empty_i64(), b in non_empty_i64()) {
        let va = Vector::from_slice(&a).unwrap();
        let vb = Vector::from_slice(&b).unwrap();
        let zipped = va.zip_with(&vb, i64::wrapping_sub);

        prop_assert_eq!(zipped.len(), a.len().min(b.len()));
        for (i, &z) in zipped.iter().enumerate() {
            prop_assert_eq!(z, a[i].wrapping_sub(b[i]));
        }
    }

    #[test]
    fn fold_is_right_to_left(data in non_empty_i64()) {
        let v = Vector::from_slice(&data).unwrap();
        let seen = v.fold(Vec::new(), |x, mut acc| {
            acc.push(x);
            acc
        });
        let mut expected = data.clone();
        expected.reverse();
        prop_assert_eq!(seen, expected);

        let folded = v.fold(0i64, |x, acc| x.wrapping_sub(acc));
        let manual = data.iter().rev().fold(0i64, |acc, &x| x.wrapping_sub(acc));
        prop_assert_eq!(folded, manual);
    }

    #[test]
    fn try_map_all_ok_equals_map(data in non_empty_i64()) {
        let v = Vector::from_slice(&data).unwrap();
        let mapped: Result<Vector<i64>, ()> = v.try_map(|x| Ok(x.wrapping_neg()));
        prop_assert_eq!(mapped.unwrap(), v.map(i64::wrapping_neg));
    }
}

// ============================================================
// I/O properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn binary_roundtrip(data in non_empty_f64()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.bin");
        let v = Vector::from_slice(&data).unwrap();

        write_binary(&path, &v).unwrap();
        let back = read_binary(&path, data.len()).unwrap();
        prop_assert_eq!(bits(&back), bits(&v));
    }
}
