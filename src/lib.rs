//! ordered-hashmap: A single-threaded hash map that iterates in insertion
//! order, built on Robin Hood open addressing with backward-shift deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: fuse a probe table and an order-preserving sequence under one
//!   consistent invariant, in safe, verifiable layers.
//! - Layers:
//!   - OrderList<K, V>: slotmap arena of entries threaded into a
//!     doubly-linked list. Owns every entry; defines iteration order;
//!     append and unlink are O(1) and never move an entry in memory.
//!   - ProbeTable: open-addressed slot array holding arena handles.
//!     Robin Hood placement on insert, backward-shift on delete (no
//!     tombstones), prime-doubling growth. Stores no entry data itself.
//!   - OrderedHashMap<K, V, S>: public facade that keeps the two layers
//!     in bijection, drives growth, and exposes `Handle`s for O(1)
//!     re-access without re-hashing; includes a debug-only reentrancy
//!     guard to keep internals consistent while mutating.
//!
//! Constraints
//! - Single-threaded semantics; no internal locking or atomics.
//! - Duplicate inserts are rejected and never overwrite the stored value;
//!   upsert is spelled `get_or_insert_default`.
//! - Load factor stays below 0.6 immediately after every insertion; slot
//!   counts are prime (37, then the smallest prime >= double).
//! - Stable, generational handles: a handle to a removed entry resolves to
//!   `None` and can never alias a later entry that reuses its arena slot.
//!
//! Why this split?
//! - Localize invariants: the probe table owns slot arithmetic, the order
//!   list owns links and storage, and only the facade sees both.
//! - The probe table never touches keys or values directly; it reads and
//!   rewrites per-entry displacement/slot metadata through the arena, so
//!   entries are relocated logically without ever being moved or copied.
//!
//! Hasher and rehashing invariants
//! - Each entry stores a precomputed `u64` hash and the table always
//!   indexes with the stored hash; `K: Hash` is never invoked after
//!   insertion. Growth re-places surviving entries in insertion order with
//!   displacement reset to zero, so iteration order and outstanding
//!   handles survive every rehash.
//!
//! Reentrancy policy
//! - Facade methods enter a debug-only guard before mutating. The only
//!   user code that can run while the guard is held is `K: Hash`/`K: Eq`
//!   during probing; nested entry into the same map there panics in debug
//!   builds and is a no-op check in release builds.
//!
//! Notes and non-goals
//! - No thread-safety, no persistence, no shrinking on deletion: `clear`
//!   removes entries one at a time and keeps the slot array's size.
//! - `at` is the only erroring lookup; `find`/`get`/`remove` treat an
//!   absent key as a normal miss.

mod order_list;
mod ordered_map;
mod ordered_map_proptest;
mod probe_table;
mod reentrancy;

// Public surface
pub use ordered_map::{
    Handle, InsertError, IntoIter, Iter, IterMut, Keys, LookupError, OrderedHashMap, Values,
    ValuesMut,
};
