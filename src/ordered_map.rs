//! OrderedHashMap: the public facade that keeps the order list and the
//! probe table in bijection.

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use core::ops::Index;
use core::ptr::NonNull;
use std::collections::hash_map::RandomState;

use slotmap::DefaultKey;

use crate::order_list::{Node, OrderList};
use crate::probe_table::ProbeTable;
use crate::reentrancy::DebugReentrancy;

/// Stable identifier for one entry of an [`OrderedHashMap`].
///
/// Handles survive every mutation that does not remove their entry,
/// including growth; after removal they resolve to `None` and can never
/// alias a later entry (generational arena keys).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub(crate) fn new(k: DefaultKey) -> Self {
        Handle(k)
    }

    pub(crate) fn raw(&self) -> DefaultKey {
        self.0
    }

    pub fn key<'a, K, V, S>(&self, map: &'a OrderedHashMap<K, V, S>) -> Option<&'a K> {
        let _g = map.reentrancy.enter();
        map.list.get(self.0).map(|n| &n.key)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a OrderedHashMap<K, V, S>) -> Option<&'a V> {
        let _g = map.reentrancy.enter();
        map.list.get(self.0).map(|n| &n.value)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut OrderedHashMap<K, V, S>) -> Option<&'a mut V> {
        let _g = map.reentrancy.enter();
        map.list.get_mut(self.0).map(|n| &mut n.value)
    }
}

/// Returned by [`OrderedHashMap::insert`] when the key is already present.
/// The stored value is left untouched; this map deliberately has no
/// insert-or-assign path.
#[derive(Debug)]
pub enum InsertError {
    DuplicateKey,
}

/// Returned by [`OrderedHashMap::at`] when the key is absent.
#[derive(Debug, PartialEq, Eq)]
pub enum LookupError {
    KeyNotFound,
}

/// A hash map that iterates in insertion order.
///
/// Lookup goes through a Robin Hood probe table; iteration walks a
/// doubly-linked sequence of entries, so erasing one entry never reorders
/// the rest and growth preserves order end-to-end.
pub struct OrderedHashMap<K, V, S = RandomState> {
    hasher: S,
    list: OrderList<K, V>,
    table: ProbeTable,
    reentrancy: DebugReentrancy,
}

impl<K, V> OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            list: OrderList::new(),
            table: ProbeTable::new(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Look a key up and return its handle, or `None` on a miss.
    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.table.lookup(hash, q, &self.list).map(Handle::new)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let h = self.table.lookup(hash, q, &self.list)?;
        Some(&self.list.node(h).value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let h = self.table.lookup(hash, q, &self.list)?;
        Some(&mut self.list.node_mut(h).value)
    }

    /// Like [`get`](Self::get), but an absent key is an error rather than
    /// a miss.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, LookupError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(LookupError::KeyNotFound)
    }

    /// Insert a fresh entry at the end of the iteration order.
    ///
    /// If the key is already present the map is left untouched, including
    /// the stored value, and `Err(InsertError::DuplicateKey)` is returned.
    pub fn insert(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        if self.table.lookup(hash, &key, &self.list).is_some() {
            return Err(InsertError::DuplicateKey);
        }
        let h = Self::insert_new(&mut self.list, &mut self.table, key, value, hash);
        Ok(Handle::new(h))
    }

    /// Upsert-on-read: return the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let h = match self.table.lookup(hash, &key, &self.list) {
            Some(h) => h,
            None => Self::insert_new(&mut self.list, &mut self.table, key, V::default(), hash),
        };
        &mut self.list.node_mut(h).value
    }

    /// Remove a key, returning its value. Absent keys are a `None` no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_k, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let h = self.table.lookup(hash, q, &self.list)?;
        Self::detach(&mut self.list, &mut self.table, h)
    }
}

impl<K, V, S> OrderedHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Current slot count of the probe table. Starts at 37 and only ever
    /// grows; `clear` does not shrink it.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// The hashing capability this map was built with.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Remove the entry a handle refers to, returning the owned pair.
    /// Stale handles (entry already removed) return `None`.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let _g = self.reentrancy.enter();
        Self::detach(&mut self.list, &mut self.table, handle.raw())
    }

    /// Remove every entry, one at a time through the erase path. The
    /// probe table keeps its allocated size.
    pub fn clear(&mut self) {
        while let Some(h) = self.list.head() {
            let pair;
            {
                let _g = self.reentrancy.enter();
                pair = Self::detach(&mut self.list, &mut self.table, h);
            }
            // The removed pair drops here, after the guard releases and
            // the two structures are back in bijection, so user `Drop`
            // code may observe the map.
            drop(pair);
        }
    }

    /// Unlink one entry from both structures, returning the owned pair.
    /// Associated fn over the two fields so callers can hold the
    /// reentrancy guard while mutating.
    fn detach(list: &mut OrderList<K, V>, table: &mut ProbeTable, h: DefaultKey) -> Option<(K, V)> {
        let slot = list.get(h)?.slot;
        let node = list.remove(h)?;
        table.remove(slot, list);
        Some((node.key, node.value))
    }

    /// Grow check plus Robin Hood placement of a fresh tail entry. The
    /// caller has already verified the key is absent.
    fn insert_new(
        list: &mut OrderList<K, V>,
        table: &mut ProbeTable,
        key: K,
        value: V,
        hash: u64,
    ) -> DefaultKey {
        if table.growth_due(list.len()) {
            Self::grow(list, table);
        }
        let h = list.push_back(key, value, hash);
        table.place(h, list);
        h
    }

    /// Rebuild the probe table at the next prime-doubled size. Surviving
    /// entries are re-placed in insertion order from their stored hashes;
    /// nothing is re-created, so handles and iteration order survive.
    fn grow(list: &mut OrderList<K, V>, table: &mut ProbeTable) {
        let mut grown = ProbeTable::with_slots(table.grown_capacity());
        let mut cursor = list.head();
        while let Some(h) = cursor {
            cursor = list.next_of(h);
            list.node_mut(h).displacement = 0;
            grown.place(h, list);
        }
        *table = grown;
    }

    /// Iterate `(&K, &V)` in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cursor: self.list.head(),
            remaining: self.list.len(),
            nodes: &self.list,
        }
    }

    /// Iterate `(&K, &mut V)` in insertion order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            cursors: self.list.cursors().into_iter(),
            _marker: PhantomData,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }
}

impl<K, V, S> Clone for OrderedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep copy preserving iteration order and probe-table capacity.
    /// Copies stored hashes along with the entries, so no user hashing
    /// code runs.
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            list: self.list.clone(),
            table: self.table.clone(),
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for OrderedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, Q> Index<&Q> for OrderedHashMap<K, V, S>
where
    K: Borrow<Q> + Eq + Hash,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Read-only access to a present key. Panics if the key is absent;
    /// use [`OrderedHashMap::at`] for a recoverable miss.
    fn index(&self, q: &Q) -> &V {
        self.get(q).expect("no entry found for key")
    }
}

impl<K, V, S> Extend<(K, V)> for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Duplicate keys are silently ignored; the first occurrence wins,
    /// per the insert contract.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            let _ = self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for OrderedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for OrderedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter(pairs)
    }
}

/// Iterator over `(&K, &V)` in insertion order.
pub struct Iter<'a, K, V> {
    cursor: Option<DefaultKey>,
    remaining: usize,
    nodes: &'a OrderList<K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let h = self.cursor?;
        self.cursor = self.nodes.next_of(h);
        self.remaining -= 1;
        let node = self.nodes.node(h);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in insertion order.
///
/// Built from per-node cursors, so every yielded `&mut V` borrows only
/// its own node; references yielded by earlier calls stay valid while
/// the iterator advances.
pub struct IterMut<'a, K, V> {
    cursors: std::vec::IntoIter<NonNull<Node<K, V>>>,
    _marker: PhantomData<&'a mut OrderList<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let p = self.cursors.next()?;
        // SAFETY: the iterator holds the map's unique borrow for 'a, the
        // cursor's provenance covers exactly one live node, and each
        // cursor is yielded once, so the reference neither aliases any
        // other yielded reference nor is invalidated by later calls.
        let node = unsafe { &mut *p.as_ptr() };
        Some((&node.key, &mut node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursors.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator, draining entries in insertion order.
pub struct IntoIter<K, V> {
    list: OrderList<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let h = self.list.head()?;
        let node = self.list.remove(h)?;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

pub struct ValuesMut<'a, K, V>(IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a OrderedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut OrderedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for OrderedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self.list }
    }
}

#[cfg(test)]
impl<K, V, S> OrderedHashMap<K, V, S> {
    /// Structural check used by unit and property tests: the order list
    /// and probe table are in bijection, displacement metadata is exact,
    /// and the Robin Hood balance property holds along every probe run.
    pub(crate) fn check_invariants(&self) {
        let cap = self.table.capacity();

        let mut occupied = 0usize;
        for idx in 0..cap {
            if let Some(h) = self.table.slot(idx) {
                occupied += 1;
                let node = self.list.get(h).expect("slot references a live entry");
                assert_eq!(node.slot, idx, "slot index metadata out of sync");
                let ideal = node.hash as usize % cap;
                assert_eq!(
                    (idx + cap - ideal) % cap,
                    node.displacement,
                    "displacement does not match actual distance from ideal slot"
                );
            }
        }
        assert_eq!(occupied, self.list.len(), "table and list disagree on size");

        // Along any probe sequence displacements may grow by at most one
        // per step, and an entry right after an empty slot must be home.
        for idx in 0..cap {
            let next = (idx + 1) % cap;
            if let Some(h) = self.table.slot(next) {
                let d = self.list.node(h).displacement;
                match self.table.slot(idx) {
                    Some(p) => assert!(
                        d <= self.list.node(p).displacement + 1,
                        "Robin Hood balance violated at slot {next}"
                    ),
                    None => assert_eq!(d, 0, "entry after an empty slot must be home"),
                }
            }
        }

        let mut walked = 0usize;
        let mut cursor = self.list.head();
        while let Some(h) = cursor {
            walked += 1;
            assert!(walked <= self.list.len(), "order list links form a cycle");
            cursor = self.list.next_of(h);
        }
        assert_eq!(walked, self.list.len(), "order list traversal is short");
    }
}
