#![cfg(test)]

// Property tests for FrequencyTable kept inside the crate so they can drive
// the digest-forcing insert hook.

use crate::config::TableConfig;
use crate::digest::digest;
use crate::frequency_table::FrequencyTable;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Dump(Option<usize>),
    Get(usize),
}

fn arb_config() -> impl Strategy<Value = TableConfig> {
    // threshold * (growth_factor - 1) >= 1 keeps one growth step enough to
    // restore the load-factor bound.
    (1usize..=8, prop::sample::select(vec![0.5, 0.75, 1.0, 2.0]), 3usize..=4).prop_map(
        |(initial, threshold, factor)| {
            TableConfig::new()
                .with_initial_bucket_count(initial)
                .with_load_factor_threshold(threshold)
                .with_growth_factor(factor)
        },
    )
}

fn arb_scenario() -> impl Strategy<Value = (TableConfig, Vec<String>, Vec<Op>)> {
    (arb_config(), proptest::collection::vec("[a-z]{0,4}( [a-z]{1,4})?", 1..=24)).prop_flat_map(
        |(config, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                6 => idx.clone().prop_map(Op::Insert),
                1 => proptest::option::of(0usize..40).prop_map(Op::Dump),
                1 => idx.prop_map(Op::Get),
            ];
            proptest::collection::vec(op, 1..150)
                .prop_map(move |ops| (config, pool.clone(), ops))
        },
    )
}

// Property: state-machine equivalence against a HashMap keyed by digest.
// Invariants exercised after every operation:
// - unique_entries equals the number of distinct digests seen, never decreases.
// - total_insertions counts every insert, merges included.
// - every entry sits in bucket digest % bucket_count (check_invariants).
// - load factor stays at or below the threshold.
// - ranked_dump is non-increasing, clamps its limit, and agrees with the model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((config, pool, ops) in arb_scenario()) {
        let mut sut = FrequencyTable::with_config(config).unwrap();
        let mut model: HashMap<u64, (String, u64)> = HashMap::new();
        let mut inserts = 0u64;
        let mut prev_unique = 0usize;

        for op in ops {
            match op {
                Op::Insert(i) => {
                    let k = pool[i].clone();
                    let slot = model.entry(digest(k.as_bytes())).or_insert((k.clone(), 0));
                    slot.0 = k.clone();
                    slot.1 += 1;
                    inserts += 1;
                    sut.insert(k).unwrap();
                }
                Op::Dump(limit) => {
                    let dump = sut.ranked_dump(limit);
                    let expect_len = limit.map_or(model.len(), |l| l.min(model.len()));
                    prop_assert_eq!(dump.len(), expect_len);
                    for w in dump.windows(2) {
                        prop_assert!(w[0].count() >= w[1].count());
                    }
                    for e in &dump {
                        let (k, c) = &model[&e.digest()];
                        prop_assert_eq!(e.key(), k.as_bytes());
                        prop_assert_eq!(e.count(), *c);
                    }
                }
                Op::Get(i) => {
                    let k = &pool[i];
                    let got = sut.get(k).map(|e| e.count());
                    let want = model.get(&digest(k.as_bytes())).map(|(_, c)| *c);
                    prop_assert_eq!(got, want);
                }
            }

            prop_assert_eq!(sut.unique_entries(), model.len());
            prop_assert!(sut.unique_entries() >= prev_unique);
            prev_unique = sut.unique_entries();
            prop_assert_eq!(sut.total_insertions(), inserts);
            prop_assert!(sut.load_factor() <= config.load_factor_threshold);
            prop_assert!(sut.check_invariants().is_ok());
        }

        let total: u64 = sut.iter().map(|e| e.count()).sum();
        prop_assert_eq!(total, inserts);
    }
}

// Property: under forced digest collisions (digests drawn from a tiny range)
// entries still merge purely by digest, the latest key wins, and chains stay
// consistent through growth.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_forced_digests(ops in proptest::collection::vec((0u64..12, "[a-z]{1,3}"), 1..120)) {
        let config = TableConfig::new().with_initial_bucket_count(1);
        let mut sut = FrequencyTable::with_config(config).unwrap();
        let mut model: HashMap<u64, (String, u64)> = HashMap::new();

        for (d, key) in ops {
            let slot = model.entry(d).or_insert((key.clone(), 0));
            slot.0 = key.clone();
            slot.1 += 1;
            sut.insert_with_digest(key.into_bytes().into_boxed_slice(), d).unwrap();
            prop_assert!(sut.check_invariants().is_ok());
        }

        prop_assert_eq!(sut.unique_entries(), model.len());
        for e in sut.iter() {
            let (k, c) = &model[&e.digest()];
            prop_assert_eq!(e.key(), k.as_bytes());
            prop_assert_eq!(e.count(), *c);
        }
    }
}
