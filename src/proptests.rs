use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

use crate::avl::validate_tree as validate_balanced;
use crate::threaded::validate_threads;

/// Reference model: normalized key -> (frequency, selections).
type Model = BTreeMap<String, (u32, u32)>;

#[derive(Clone, Debug)]
enum Op {
    Insert(String, u32),
    Delete(String),
    Search(String),
    Select(String),
    Rank(String, usize),
}

fn key_strategy() -> impl Strategy<Value = String> + Clone {
    // A small alphabet with mixed case keeps collisions and shared prefixes
    // frequent enough to matter.
    "[a-dA-D]{0,5}"
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => (key.clone(), 0u32..200).prop_map(|(k, f)| Op::Insert(k, f)),
        20 => key.clone().prop_map(Op::Delete),
        15 => key.clone().prop_map(Op::Search),
        15 => key.clone().prop_map(Op::Select),
        10 => (key.clone(), 0usize..8).prop_map(|(k, n)| Op::Rank(k, n)),
    ];
    prop::collection::vec(op, 0..=400)
}

fn model_rank(m: &Model, prefix: &str, top_k: usize) -> Vec<String> {
    let prefix = normalize_key(prefix);
    if prefix.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<(&String, u64)> = m
        .iter()
        .filter(|(k, _)| k.starts_with(&prefix))
        .map(|(k, &(f, s))| (k, u64::from(f) + 10 * u64::from(s)))
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits.into_iter().take(top_k).map(|(k, _)| k.clone()).collect()
}

fn snapshot(t: &dyn OrderedDictionary) -> Vec<(String, u32, u32)> {
    let mut out = Vec::with_capacity(t.len());
    t.traverse_in_order(&mut |r| {
        out.push((r.key().to_string(), r.frequency_score, r.selection_count))
    });
    out
}

fn ranked_keys(t: &dyn OrderedDictionary, prefix: &str, top_k: usize) -> Vec<String> {
    rank_prefix(t, prefix, top_k)
        .into_iter()
        .map(|r| r.key().to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut u = UnbalancedTree::new();
        let mut b = BalancedTree::new();
        let mut th = ThreadedTree::new();
        let mut m = Model::new();

        for op in ops {
            match op {
                Op::Insert(key, freq) => {
                    let norm = normalize_key(&key);
                    let expected = !norm.is_empty() && !m.contains_key(&norm);
                    if expected {
                        m.insert(norm, (freq, 0));
                    }
                    prop_assert_eq!(u.insert(Record::new(&key).with_frequency(freq)), expected);
                    prop_assert_eq!(b.insert(Record::new(&key).with_frequency(freq)), expected);
                    prop_assert_eq!(th.insert(Record::new(&key).with_frequency(freq)), expected);
                }
                Op::Delete(key) => {
                    let expected = m.remove(&normalize_key(&key)).map(|(f, _)| f);
                    prop_assert_eq!(u.delete(&key).map(|r| r.frequency_score), expected);
                    prop_assert_eq!(b.delete(&key).map(|r| r.frequency_score), expected);
                    prop_assert_eq!(th.delete(&key).map(|r| r.frequency_score), expected);
                }
                Op::Search(key) => {
                    let expected = m.get(&normalize_key(&key)).copied();
                    let pick = |r: &Record| (r.frequency_score, r.selection_count);
                    prop_assert_eq!(u.search(&key).map(pick), expected);
                    prop_assert_eq!(b.search(&key).map(pick), expected);
                    prop_assert_eq!(th.search(&key).map(pick), expected);
                }
                Op::Select(key) => {
                    let expected = match m.get_mut(&normalize_key(&key)) {
                        Some((_, s)) => {
                            *s += 1;
                            3
                        }
                        None => 0,
                    };
                    let updated = record_selection(&key, &mut [&mut u, &mut b, &mut th]);
                    prop_assert_eq!(updated, expected);
                }
                Op::Rank(prefix, top_k) => {
                    let expected = model_rank(&m, &prefix, top_k);
                    prop_assert_eq!(ranked_keys(&u, &prefix, top_k), expected.clone());
                    prop_assert_eq!(ranked_keys(&b, &prefix, top_k), expected.clone());
                    prop_assert_eq!(ranked_keys(&th, &prefix, top_k), expected);
                }
            }

            prop_assert_eq!(u.len(), m.len());
            prop_assert_eq!(b.len(), m.len());
            prop_assert_eq!(th.len(), m.len());
            validate_balanced(&b);
        }

        validate_threads(&th);
        let expected: Vec<(String, u32, u32)> =
            m.iter().map(|(k, &(f, s))| (k.clone(), f, s)).collect();
        prop_assert_eq!(snapshot(&u), expected.clone());
        prop_assert_eq!(snapshot(&b), expected.clone());
        prop_assert_eq!(snapshot(&th), expected);
    }

    #[test]
    fn prop_balanced_height_bound(keys in prop::collection::vec("[a-z]{1,6}", 0..=600)) {
        let mut b = BalancedTree::new();
        for k in &keys {
            b.insert(Record::new(k));
        }
        validate_balanced(&b);
        for k in keys.iter().step_by(2) {
            b.delete(k);
        }
        validate_balanced(&b);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

const SMALL_SET: [&str; 6] = ["a", "b", "c", "aa", "ab", "ba"];

#[test]
fn exhaustive_insert_order_small_set() {
    let mut sorted = SMALL_SET.to_vec();
    sorted.sort_unstable();

    for_each_permutation(&SMALL_SET, |perm| {
        let mut u = UnbalancedTree::new();
        let mut b = BalancedTree::new();
        let mut th = ThreadedTree::new();
        for k in &perm {
            assert!(u.insert(Record::new(k)));
            assert!(b.insert(Record::new(k)));
            assert!(th.insert(Record::new(k)));
        }

        validate_balanced(&b);
        validate_threads(&th);
        for t in [&u as &dyn OrderedDictionary, &b, &th] {
            let got: Vec<String> = snapshot(t).into_iter().map(|(k, _, _)| k).collect();
            assert_eq!(got, sorted);
            assert_eq!(ranked_keys(t, "a", 10), ["a", "aa", "ab"]);
        }
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let mut base_u = UnbalancedTree::new();
    let mut base_b = BalancedTree::new();
    let mut base_th = ThreadedTree::new();
    for k in SMALL_SET {
        base_u.insert(Record::new(k));
        base_b.insert(Record::new(k));
        base_th.insert(Record::new(k));
    }

    for_each_permutation(&SMALL_SET, |perm| {
        let mut u = base_u.clone();
        let mut b = BalancedTree::new();
        let mut th = ThreadedTree::new();
        for r in base_b.iter() {
            b.insert(r.clone());
        }
        for r in base_th.iter() {
            th.insert(r.clone());
        }

        for (i, k) in perm.iter().enumerate() {
            assert!(u.delete(k).is_some());
            assert!(b.delete(k).is_some());
            assert!(th.delete(k).is_some());
            let left = SMALL_SET.len() - i - 1;
            assert_eq!((u.len(), b.len(), th.len()), (left, left, left));
            validate_balanced(&b);
            validate_threads(&th);
        }
        assert!(u.is_empty() && b.is_empty() && th.is_empty());
        assert_eq!(th.first(), NodeId::HEADER);
    });
}
