// OrderedHashMap public-API test suite (consolidated).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Order: iteration yields entries in insertion order; erasing one
//   entry never reorders the rest; growth preserves order end-to-end.
// - Uniqueness: duplicate insert rejects without touching the stored
//   value; upsert is only reachable via get_or_insert_default.
// - Miss handling: find/get/remove treat absence as a normal miss; only
//   `at` errors and only `Index` panics.
// - Independence: clones share nothing observable with their source.
use ordered_hashmap::{InsertError, LookupError, OrderedHashMap};

// Test: a full lifecycle walk-through on a small map.
// Verifies: size, ordered iteration, erase of a middle entry, sentinel
// miss, `at` on present and absent keys.
#[test]
fn basic_scenario_end_to_end() {
    let mut m: OrderedHashMap<i32, String> = OrderedHashMap::new();
    m.insert(1, "a".to_string()).unwrap();
    m.insert(2, "b".to_string()).unwrap();
    m.insert(3, "c".to_string()).unwrap();
    assert_eq!(m.len(), 3);

    let pairs: Vec<(i32, String)> = m.iter().map(|(k, v)| (*k, v.clone())).collect();
    assert_eq!(
        pairs,
        [
            (1, "a".to_string()),
            (2, "b".to_string()),
            (3, "c".to_string())
        ]
    );

    assert_eq!(m.remove(&2), Some("b".to_string()));
    let pairs: Vec<(i32, String)> = m.iter().map(|(k, v)| (*k, v.clone())).collect();
    assert_eq!(pairs, [(1, "a".to_string()), (3, "c".to_string())]);

    assert!(m.find(&2).is_none());
    assert_eq!(m.at(&1).map(String::as_str), Ok("a"));
    assert_eq!(m.at(&5), Err(LookupError::KeyNotFound));
}

// Test: the no-overwrite insert contract.
// Verifies: insert(k, v2) after insert(k, v1) leaves v1 in place.
#[test]
fn insert_never_overwrites() {
    let mut m: OrderedHashMap<&str, i32> = OrderedHashMap::new();
    m.insert("k", 1).unwrap();
    match m.insert("k", 2) {
        Err(InsertError::DuplicateKey) => {}
        Ok(_) => panic!("expected duplicate insert to error"),
    }
    assert_eq!(m.at(&"k"), Ok(&1));
}

// Test: upsert-on-read.
// Verifies: absent key gets a default value whose mutation is visible
// through subsequent lookups; the new entry iterates last.
#[test]
fn get_or_insert_default_roundtrip() {
    let mut m: OrderedHashMap<String, i32> = OrderedHashMap::new();
    m.insert("a".to_string(), 1).unwrap();
    *m.get_or_insert_default("b".to_string()) = 7;
    assert_eq!(m.get("b"), Some(&7));
    assert_eq!(m.len(), 2);
    let keys: Vec<_> = m.keys().cloned().collect();
    assert_eq!(keys, ["a".to_string(), "b".to_string()]);
}

// Test: remove/reinsert round trip.
// Verifies: after erase, find misses and size drops by one; reinserting
// the same key succeeds as if new and appends to the order.
#[test]
fn remove_and_reinsert() {
    let mut m: OrderedHashMap<i32, i32> = OrderedHashMap::new();
    for i in 0..5 {
        m.insert(i, i).unwrap();
    }
    assert_eq!(m.remove(&2), Some(2));
    assert_eq!(m.len(), 4);
    assert!(m.find(&2).is_none());

    m.insert(2, 22).unwrap();
    let keys: Vec<_> = m.keys().copied().collect();
    assert_eq!(keys, [0, 1, 3, 4, 2]);
    assert_eq!(m[&2], 22);
}

// Test: growth across the 0.6 load factor.
// Verifies: all previously inserted keys stay findable with unchanged
// values and the insertion order is preserved through several rehashes.
#[test]
fn growth_keeps_everything() {
    let mut m: OrderedHashMap<u32, String> = OrderedHashMap::new();
    for i in 0..200 {
        m.insert(i, format!("v{i}")).unwrap();
    }
    assert_eq!(m.len(), 200);
    for i in 0..200 {
        assert_eq!(m.get(&i), Some(&format!("v{i}")));
    }
    let keys: Vec<_> = m.keys().copied().collect();
    assert_eq!(keys, (0..200).collect::<Vec<_>>());
}

// Test: erase everything, in an order unrelated to insertion.
// Verifies: the map ends empty and iterable; handles obtained before
// removal of OTHER entries stay valid throughout.
#[test]
fn erase_all_keeps_unrelated_handles_valid() {
    let mut m: OrderedHashMap<u32, u32> = OrderedHashMap::new();
    let handles: Vec<_> = (0..50).map(|i| m.insert(i, i * 2).unwrap()).collect();

    for i in (0..50).filter(|i| i % 3 != 0) {
        assert_eq!(m.remove(&i), Some(i * 2));
        // A surviving entry's handle still resolves mid-teardown.
        let survivor = (i / 3) * 3;
        assert_eq!(handles[survivor as usize].value(&m), Some(&(survivor * 2)));
    }
    for i in (0..50).filter(|i| i % 3 == 0) {
        assert_eq!(m.remove_handle(handles[i as usize]), Some((i, i * 2)));
    }
    assert!(m.is_empty());
    assert!(m.iter().next().is_none());
}

// Test: clone independence.
// Verifies: same pairs and order; mutating the copy's value does not
// affect the original, and vice versa.
#[test]
fn clone_mutates_independently() {
    let mut m: OrderedHashMap<String, Vec<i32>> = OrderedHashMap::new();
    m.insert("a".to_string(), vec![1]).unwrap();
    m.insert("b".to_string(), vec![2]).unwrap();

    let mut c = m.clone();
    c.get_mut("a").unwrap().push(99);
    m.get_mut("b").unwrap().push(-1);

    assert_eq!(m.get("a"), Some(&vec![1]));
    assert_eq!(c.get("a"), Some(&vec![1, 99]));
    assert_eq!(m.get("b"), Some(&vec![2, -1]));
    assert_eq!(c.get("b"), Some(&vec![2]));

    let a: Vec<_> = m.keys().cloned().collect();
    let b: Vec<_> = c.keys().cloned().collect();
    assert_eq!(a, b);
}

// Test: bulk construction paths.
// Verifies: FromIterator, Extend, and From<[_; N]> all insert
// sequentially with first-occurrence-wins duplicate handling.
#[test]
fn bulk_construction() {
    let m = OrderedHashMap::from([(1, "one"), (2, "two"), (1, "uno")]);
    assert_eq!(m.len(), 2);
    assert_eq!(m[&1], "one");

    let mut e: OrderedHashMap<i32, &str> = OrderedHashMap::new();
    e.extend([(5, "five"), (6, "six"), (5, "cinq")]);
    assert_eq!(e.len(), 2);
    assert_eq!(e[&5], "five");

    let f: OrderedHashMap<i32, i32> = vec![(1, 10), (2, 20)].into_iter().collect();
    let pairs: Vec<_> = f.into_iter().collect();
    assert_eq!(pairs, [(1, 10), (2, 20)]);
}

// Test: clear keeps capacity and the map stays usable.
#[test]
fn clear_then_reuse() {
    let mut m: OrderedHashMap<u32, u32> = OrderedHashMap::new();
    for i in 0..100 {
        m.insert(i, i).unwrap();
    }
    let cap = m.capacity();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(m.capacity(), cap);

    for i in 0..100 {
        m.insert(i, i + 1).unwrap();
    }
    assert_eq!(m.capacity(), cap, "refill below load factor must not grow");
    assert_eq!(m.get(&99), Some(&100));
}

// Test: mutable iteration writes through, in order.
#[test]
fn iter_mut_order_and_writeback() {
    let mut m: OrderedHashMap<i32, i32> = OrderedHashMap::new();
    for i in [3, 1, 2] {
        m.insert(i, 0).unwrap();
    }
    for (pos, (_k, v)) in m.iter_mut().enumerate() {
        *v = pos as i32;
    }
    let pairs: Vec<_> = m.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(pairs, [(3, 0), (1, 1), (2, 2)]);
}

// Test: the hasher accessor returns the hashing capability the map was
// built with.
#[test]
fn hasher_accessor() {
    use std::collections::hash_map::RandomState;
    let s = RandomState::new();
    let m: OrderedHashMap<i32, i32> = OrderedHashMap::with_hasher(s);
    let _: &RandomState = m.hasher();
}

// Test: Debug formats like a map, in insertion order.
#[test]
fn debug_format() {
    let mut m: OrderedHashMap<i32, &str> = OrderedHashMap::new();
    m.insert(2, "b").unwrap();
    m.insert(1, "a").unwrap();
    assert_eq!(format!("{m:?}"), r#"{2: "b", 1: "a"}"#);
}
