//! OrderList: arena-backed doubly-linked sequence that records insertion
//! order and owns every entry of the map.
//!
//! The probe table references entries only through `DefaultKey` handles
//! handed out here. Unlinking an entry never moves any other entry, which
//! is what makes handles (and therefore iterator positions) stable across
//! arbitrary mutation of the map.

use core::ptr::NonNull;

use slotmap::{DefaultKey, SecondaryMap, SlotMap};

/// One owned entry plus its probe metadata.
///
/// `displacement` is how many probe steps past its ideal slot the entry
/// currently sits; `slot` is the probe-table index that references it.
/// Both are rewritten in place during placement, backward shift, and
/// growth; the node itself never moves.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) displacement: usize,
    pub(crate) slot: usize,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Debug, Clone)]
pub(crate) struct OrderList<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<K, V> OrderList<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn head(&self) -> Option<DefaultKey> {
        self.head
    }

    pub(crate) fn get(&self, h: DefaultKey) -> Option<&Node<K, V>> {
        self.nodes.get(h)
    }

    pub(crate) fn get_mut(&mut self, h: DefaultKey) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(h)
    }

    /// Panics on a stale handle. Internal callers only pass handles the
    /// probe table currently references.
    pub(crate) fn node(&self, h: DefaultKey) -> &Node<K, V> {
        &self.nodes[h]
    }

    pub(crate) fn node_mut(&mut self, h: DefaultKey) -> &mut Node<K, V> {
        &mut self.nodes[h]
    }

    pub(crate) fn next_of(&self, h: DefaultKey) -> Option<DefaultKey> {
        self.nodes[h].next
    }

    /// Append a fresh entry at the tail of the sequence. Displacement and
    /// slot are placeholders until the probe table places the entry.
    pub(crate) fn push_back(&mut self, key: K, value: V, hash: u64) -> DefaultKey {
        let prev_tail = self.tail;
        let h = self.nodes.insert(Node {
            key,
            value,
            hash,
            displacement: 0,
            slot: usize::MAX,
            prev: prev_tail,
            next: None,
        });
        match prev_tail {
            Some(t) => self.nodes[t].next = Some(h),
            None => self.head = Some(h),
        }
        self.tail = Some(h);
        h
    }

    /// Per-node mutable cursors, in traversal order.
    ///
    /// Each pointer is taken from a distinct `&mut` of its own node, so
    /// its provenance covers that node and nothing else; a caller may
    /// hold mutable references resolved through several cursors at once.
    pub(crate) fn cursors(&mut self) -> Vec<NonNull<Node<K, V>>> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(h) = cursor {
            order.push(h);
            cursor = self.nodes[h].next;
        }
        let mut ptrs = SecondaryMap::with_capacity(self.nodes.len());
        for (h, node) in self.nodes.iter_mut() {
            ptrs.insert(h, NonNull::from(node));
        }
        order.into_iter().map(|h| ptrs[h]).collect()
    }

    /// Unlink an entry and release its arena slot, returning the owned
    /// node. `None` if the handle is stale.
    pub(crate) fn remove(&mut self, h: DefaultKey) -> Option<Node<K, V>> {
        let node = self.nodes.remove(h)?;
        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_in_order(list: &OrderList<&'static str, i32>) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut cursor = list.head();
        while let Some(h) = cursor {
            out.push(list.node(h).key);
            cursor = list.next_of(h);
        }
        out
    }

    /// Invariant: traversal from head visits entries in append order.
    #[test]
    fn append_order_is_traversal_order() {
        let mut list = OrderList::new();
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            list.push_back(k, i as i32, 0);
        }
        assert_eq!(keys_in_order(&list), ["a", "b", "c", "d"]);
        assert_eq!(list.len(), 4);
    }

    /// Invariant: unlinking an interior entry relinks its neighbors and
    /// leaves the relative order of the rest intact.
    #[test]
    fn remove_middle_relinks() {
        let mut list = OrderList::new();
        let _a = list.push_back("a", 1, 0);
        let b = list.push_back("b", 2, 0);
        let _c = list.push_back("c", 3, 0);

        let node = list.remove(b).unwrap();
        assert_eq!(node.key, "b");
        assert_eq!(node.value, 2);
        assert_eq!(keys_in_order(&list), ["a", "c"]);
    }

    /// Invariant: removing head and tail updates the endpoints; draining
    /// everything leaves an empty list that can be reused.
    #[test]
    fn remove_endpoints_and_drain() {
        let mut list = OrderList::new();
        let a = list.push_back("a", 1, 0);
        let b = list.push_back("b", 2, 0);
        let c = list.push_back("c", 3, 0);

        list.remove(a).unwrap();
        assert_eq!(keys_in_order(&list), ["b", "c"]);
        list.remove(c).unwrap();
        assert_eq!(keys_in_order(&list), ["b"]);
        list.remove(b).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.head(), None);

        list.push_back("z", 9, 0);
        assert_eq!(keys_in_order(&list), ["z"]);
    }

    /// Invariant: cursors come out in traversal order and each resolves
    /// to its own node, independently of the others.
    #[test]
    fn cursors_follow_order() {
        let mut list = OrderList::new();
        list.push_back("a", 1, 0);
        let b = list.push_back("b", 2, 0);
        list.push_back("c", 3, 0);
        list.remove(b).unwrap();

        let cursors = list.cursors();
        assert_eq!(cursors.len(), 2);
        let keys: Vec<&'static str> = cursors
            .into_iter()
            .map(|p| unsafe { (*p.as_ptr()).key })
            .collect();
        assert_eq!(keys, ["a", "c"]);
    }

    /// Invariant: a stale handle is rejected and does not alias an entry
    /// that later reuses the arena slot.
    #[test]
    fn stale_handle_rejected() {
        let mut list = OrderList::new();
        let a = list.push_back("a", 1, 0);
        list.remove(a).unwrap();
        assert!(list.remove(a).is_none());

        let b = list.push_back("b", 2, 0);
        assert!(list.get(a).is_none());
        assert_ne!(a, b);
    }
}
