#![cfg(test)]

// Property tests for OrderedHashMap kept inside the crate so they can call
// the structural invariant checker.

use crate::ordered_map::{Handle, InsertError, OrderedHashMap};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Upsert(usize, i32),
    Remove(usize),
    RemoveHandle(usize),
    RemoveStale,
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            8 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Upsert(i, d)),
            4 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::RemoveHandle),
            1 => Just(OpI::RemoveStale),
            4 => idx.clone().prop_map(OpI::Find),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            2 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn model_pos(model: &[(Key, i32)], k: &Key) -> Option<usize> {
    model.iter().position(|(mk, _)| mk == k)
}

// Shared state-machine driver. The model is an insertion-ordered
// Vec<(Key, i32)>, so iteration is compared order-exactly, not as a set.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected and never overwrite the stored value.
// - Upsert inserts a default exactly when the key is absent and appends
//   at the end of the order.
// - Removal (by key and by handle) erases exactly the targeted entry and
//   preserves the relative order of the rest; stale handles never resolve.
// - Iteration equals the model in content and order after every op.
// - The structural checker (bijection, displacement exactness, Robin Hood
//   balance) passes after every op, including across growth and clear.
fn run_scenario<S>(sut: &mut OrderedHashMap<Key, i32, S>, pool: &[String], ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: Vec<(Key, i32)> = Vec::new();
    let mut live: HashMap<Key, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model_pos(&model, &k).is_some();
                match sut.insert(k.clone(), v) {
                    Ok(h) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        live.insert(k.clone(), h);
                        model.push((k, v));
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                }
            }
            OpI::Upsert(i, d) => {
                let k = key_from(pool, i);
                let vr = sut.get_or_insert_default(k.clone());
                *vr = vr.saturating_add(d);
                match model_pos(&model, &k) {
                    Some(p) => model[p].1 = model[p].1.saturating_add(d),
                    None => model.push((k.clone(), d)),
                }
                let h = sut.find(k.0.as_str()).expect("upserted key present");
                live.insert(k, h);
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let removed = sut.remove_entry(k.0.as_str());
                match model_pos(&model, &k) {
                    Some(p) => {
                        let (mk, mv) = model.remove(p);
                        let (rk, rv) = removed.expect("model says present");
                        prop_assert_eq!(rk, mk);
                        prop_assert_eq!(rv, mv);
                        if let Some(h) = live.remove(&k) {
                            stale.push(h);
                        }
                    }
                    None => prop_assert!(removed.is_none(), "absent key must be a no-op"),
                }
            }
            OpI::RemoveHandle(i) => {
                let k = key_from(pool, i);
                if let Some(&h) = live.get(&k) {
                    let (rk, rv) = sut.remove_handle(h).expect("live handle removes");
                    let p = model_pos(&model, &rk).expect("present in model");
                    let (mk, mv) = model.remove(p);
                    prop_assert_eq!(rk, mk);
                    prop_assert_eq!(rv, mv);
                    live.remove(&k);
                    stale.push(h);
                }
            }
            OpI::RemoveStale => {
                if let Some(h) = stale.last() {
                    prop_assert!(sut.remove_handle(*h).is_none(), "stale handle is a no-op");
                }
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let found = sut.find(&k);
                let present = model_pos(&model, &k).is_some();
                prop_assert_eq!(found.is_some(), present);
                if let Some(h) = found {
                    let &lh = live.get(&k).expect("tracked live handle present");
                    prop_assert_eq!(h, lh, "find must return the stable handle");
                    prop_assert_eq!(h.key(sut), Some(&k));
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.iter().any(|(k, _)| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(p) = model_pos(&model, &k) {
                    let vr = sut.get_mut(k.0.as_str()).expect("present in model");
                    *vr = vr.saturating_add(d);
                    model[p].1 = model[p].1.saturating_add(d);
                } else {
                    prop_assert!(sut.get_mut(k.0.as_str()).is_none());
                }
            }
            OpI::Iterate => {
                let got: Vec<(Key, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(&got, &model, "iteration must match model order");
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                prop_assert!(sut.is_empty());
                prop_assert_eq!(sut.capacity(), cap, "clear must not shrink");
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
            }
        }

        // Post-conditions after each op
        for &h in &stale {
            prop_assert!(h.value(sut).is_none(), "stale handle must not resolve");
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let got: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&got, &model);
        sut.check_invariants();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: OrderedHashMap<Key, i32> = OrderedHashMap::new();
        run_scenario(&mut sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher, putting every key on one
// probe sequence. This stresses Robin Hood swaps, backward shifts, and
// wraparound far harder than a real hasher would.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut: OrderedHashMap<Key, i32, ConstBuildHasher> =
            OrderedHashMap::with_hasher(ConstBuildHasher);
        run_scenario(&mut sut, &pool, ops)?;
    }
}
