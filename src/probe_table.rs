//! ProbeTable: open-addressed slot array with Robin Hood placement and
//! backward-shift deletion.
//!
//! Slots hold arena handles, never entry data. Displacement and slot-index
//! metadata live on the nodes themselves, so every operation here takes
//! the `OrderList` as an explicit collaborator and rewrites that metadata
//! in place. The table is kept below load factor 0.6 at all times, which
//! guarantees an empty slot on every probe sequence and bounds every loop
//! below by one wrap of the table.

use core::borrow::Borrow;

use slotmap::DefaultKey;

use crate::order_list::OrderList;

/// Slot count of a fresh table. Prime, like every grown size after it.
pub(crate) const INITIAL_SLOTS: usize = 37;

#[derive(Debug, Clone)]
pub(crate) struct ProbeTable {
    slots: Vec<Option<DefaultKey>>,
}

impl ProbeTable {
    pub(crate) fn new() -> Self {
        Self::with_slots(INITIAL_SLOTS)
    }

    pub(crate) fn with_slots(n: usize) -> Self {
        Self {
            slots: vec![None; n],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn slot(&self, idx: usize) -> Option<DefaultKey> {
        self.slots[idx]
    }

    /// True when placing one more entry would push the load factor to 0.6
    /// or above. 0.6 is 3/5, kept in integer arithmetic.
    pub(crate) fn growth_due(&self, len: usize) -> bool {
        (len + 1) * 5 >= self.capacity() * 3
    }

    /// Slot count for the next table: smallest prime at least double the
    /// current size.
    pub(crate) fn grown_capacity(&self) -> usize {
        next_prime(self.capacity() * 2)
    }

    /// Scan forward from the key's ideal slot until the key matches or an
    /// empty slot proves absence.
    pub(crate) fn lookup<K, V, Q>(
        &self,
        hash: u64,
        q: &Q,
        nodes: &OrderList<K, V>,
    ) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let cap = self.capacity();
        let mut idx = hash as usize % cap;
        let mut steps = 0usize;
        while let Some(h) = self.slots[idx] {
            if nodes.node(h).key.borrow() == q {
                return Some(h);
            }
            idx = (idx + 1) % cap;
            steps += 1;
            debug_assert!(steps <= cap, "lookup probe wrapped the whole table");
        }
        None
    }

    /// Robin Hood placement. Walk forward from the entry's ideal slot; any
    /// probed occupant sitting closer to its own ideal slot than the
    /// prober is displaced and resumes probing with its accumulated
    /// displacement. The prober's displacement grows by one per step, and
    /// whichever entry reaches the first empty slot settles there.
    pub(crate) fn place<K, V>(&mut self, handle: DefaultKey, nodes: &mut OrderList<K, V>) {
        let cap = self.capacity();
        let mut probing = handle;
        let mut idx = nodes.node(probing).hash as usize % cap;
        let mut steps = 0usize;
        while let Some(occupant) = self.slots[idx] {
            if nodes.node(occupant).displacement < nodes.node(probing).displacement {
                self.slots[idx] = Some(probing);
                nodes.node_mut(probing).slot = idx;
                probing = occupant;
            }
            nodes.node_mut(probing).displacement += 1;
            idx = (idx + 1) % cap;
            steps += 1;
            debug_assert!(steps <= cap, "placement probe wrapped the whole table");
        }
        self.slots[idx] = Some(probing);
        nodes.node_mut(probing).slot = idx;
    }

    /// Backward-shift deletion. Empty the vacated slot, then shift each
    /// successor with a non-zero displacement back one slot (decrementing
    /// it), stopping at an empty slot or an entry already sitting at its
    /// ideal slot. Leaves no tombstones behind.
    pub(crate) fn remove<K, V>(&mut self, slot: usize, nodes: &mut OrderList<K, V>) {
        let cap = self.capacity();
        self.slots[slot] = None;
        let mut hole = slot;
        let mut next = (hole + 1) % cap;
        let mut steps = 0usize;
        while let Some(h) = self.slots[next] {
            if nodes.node(h).displacement == 0 {
                break;
            }
            self.slots[next] = None;
            self.slots[hole] = Some(h);
            let n = nodes.node_mut(h);
            n.slot = hole;
            n.displacement -= 1;
            hole = next;
            next = (hole + 1) % cap;
            steps += 1;
            debug_assert!(steps <= cap, "backward shift wrapped the whole table");
        }
    }
}

pub(crate) fn next_prime(min: usize) -> usize {
    let mut n = min.max(2);
    loop {
        if is_prime(n) {
            return n;
        }
        n += 1;
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
