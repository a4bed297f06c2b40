//! Fixed-capacity recency list linked through an array of nodes.
//!
//! Nodes live in a `[Node<T>; N]` array and link to each other by
//! [`NodeId`] index, giving O(1) promotion and O(1) capacity eviction with no
//! allocation and no raw pointers.
//!
//! ## Architecture
//!
//! ```text
//!   nodes ([Node<T>; N], N = 4, all claimed)
//!   ┌──────┬──────────────────────────────────────────────┐
//!   │ id 0 │ { value: A, prev: Some(2), next: Some(3) }   │
//!   │ id 1 │ { value: B, prev: Some(3), next: None }      │ ◄── tail (LRU)
//!   │ id 2 │ { value: C, prev: None,    next: Some(0) }   │ ◄── head (MRU)
//!   │ id 3 │ { value: D, prev: Some(0), next: Some(1) }   │
//!   └──────┴──────────────────────────────────────────────┘
//!
//!   head ─► [2] ◄──► [0] ◄──► [3] ◄──► [1] ◄── tail
//! ```
//!
//! ## Node lifecycle
//!
//! ```text
//!   Unclaimed ──add()──► Live ──touch()/add() at capacity──► Live
//!       ▲                  │
//!       └─────clear()──────┘
//! ```
//!
//! Nodes are claimed in array order while the list is below capacity. Once
//! every node is live, `add` recycles the tail node: the evictor observes the
//! outgoing payload, the new payload is assigned over it, and the node moves
//! to the head. Nodes are never freed individually.
//!
//! ## Performance
//! - `add` / `touch`: O(1)
//! - `iter`: O(n)
//!
//! In debug builds every mutation re-validates the chain, which costs O(n).
//!
//! A zero-capacity list does not compile:
//!
//! ```compile_fail
//! use slotlru::ds::RecencyList;
//!
//! let list: RecencyList<u32, 0> = RecencyList::new();
//! ```
use std::iter::FusedIterator;

use crate::error::InvariantError;

/// Index of a node inside a [`RecencyList`].
///
/// Identifies storage, not content: after an eviction the same id holds the
/// new payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the array index of the node.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl<T> Node<T> {
    fn unclaimed() -> Self {
        Self {
            value: None,
            prev: None,
            next: None,
        }
    }
}

/// Most-recently-used ordering over at most `N` payloads.
#[derive(Debug)]
pub struct RecencyList<T, const N: usize> {
    nodes: [Node<T>; N],
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<T, const N: usize> RecencyList<T, N> {
    const CAPACITY_IS_NONZERO: () = assert!(N > 0, "RecencyList capacity must be non-zero");

    /// Creates an empty list.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_NONZERO;
        Self {
            nodes: std::array::from_fn(|_| Node::unclaimed()),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no node is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once every node has been claimed.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Returns the number of nodes, `N`.
    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Returns the payload at the front (MRU) of the list.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Returns the id at the front (MRU) of the list.
    pub fn front_id(&self) -> Option<NodeId> {
        self.head
    }

    /// Returns the payload at the back (LRU) of the list.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Returns the id at the back (LRU) of the list.
    pub fn back_id(&self) -> Option<NodeId> {
        self.tail
    }

    /// Returns the payload of a live node.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0)?.value.as_ref()
    }

    /// Returns a mutable reference to the payload of a live node.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)?.value.as_mut()
    }

    /// Returns an iterator from MRU to LRU. Use `.rev()` for LRU to MRU.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Inserts `payload` at the head and returns its node.
    ///
    /// Below capacity the next unclaimed node is used. At capacity the tail
    /// node is recycled: `evictor` sees the outgoing payload first, then
    /// `payload` is assigned over it (dropping the old one) and the node is
    /// relinked at the head.
    pub fn add<F>(&mut self, payload: T, evictor: F) -> NodeId
    where
        F: FnOnce(&T),
    {
        let id = match self.tail {
            Some(tail) if self.len == N => {
                let node = &mut self.nodes[tail.0];
                if let Some(outgoing) = node.value.as_ref() {
                    evictor(outgoing);
                }
                node.value = Some(payload);
                self.detach(tail);
                tail
            },
            _ => {
                let id = NodeId(self.len);
                self.nodes[id.0].value = Some(payload);
                self.len += 1;
                id
            },
        };
        self.attach_front(id);

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();
        id
    }

    /// Inserts `payload` at the head, silently recycling the tail at capacity.
    pub fn push(&mut self, payload: T) -> NodeId {
        self.add(payload, |_| {})
    }

    /// Promotes a live node to the head.
    ///
    /// `id` must name a live node of this list; anything else is a caller
    /// error caught by a debug assertion.
    pub fn touch(&mut self, id: NodeId) {
        debug_assert!(id.0 < self.len, "touch on a node that is not live");
        if self.head == Some(id) || id.0 >= self.len {
            return;
        }
        self.detach(id);
        self.attach_front(id);

        #[cfg(debug_assertions)]
        self.debug_validate_invariants();
    }

    /// Drops every payload and returns all nodes to the unclaimed state.
    pub fn clear(&mut self) {
        for node in &mut self.nodes[..self.len] {
            *node = Node::unclaimed();
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Validates head/tail/length bookkeeping and prev/next consistency.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.head.is_none() != (self.len == 0) {
            return Err(InvariantError::new(
                "head must be empty if and only if the list is empty",
            ));
        }
        if (self.head == self.tail) != (self.len < 2) {
            return Err(InvariantError::new(
                "head and tail must coincide exactly when fewer than two nodes are live",
            ));
        }
        if let Some(head) = self.head {
            if self.nodes[head.0].prev.is_some() {
                return Err(InvariantError::new("head node has a prev link"));
            }
        }
        if let Some(tail) = self.tail {
            if self.nodes[tail.0].next.is_some() {
                return Err(InvariantError::new("tail node has a next link"));
            }
        }

        let mut prev = None;
        let mut current = self.head;
        let mut count = 0usize;
        while let Some(id) = current {
            count += 1;
            if count > self.len {
                return Err(InvariantError::new("chain is longer than the live count"));
            }
            let node = self
                .nodes
                .get(id.0)
                .ok_or_else(|| InvariantError::new(format!("link to missing node {}", id.0)))?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "node {} has inconsistent prev/next links",
                    id.0
                )));
            }
            prev = Some(id);
            current = node.next;
        }
        if count != self.len {
            return Err(InvariantError::new(format!(
                "chain holds {} nodes but live count is {}",
                count, self.len
            )));
        }
        if self.tail != prev {
            return Err(InvariantError::new("tail does not end the chain"));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.value.is_some() != (index < self.len) {
                return Err(InvariantError::new(format!(
                    "node {} payload does not match its claimed state",
                    index
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("recency list invariant violated: {}", err);
        }
    }

    fn detach(&mut self, id: NodeId) {
        let (prev, next) = {
            let node = &self.nodes[id.0];
            (node.prev, node.next)
        };

        match prev {
            Some(prev_id) => self.nodes[prev_id.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => self.nodes[next_id.0].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[id.0];
        node.prev = None;
        node.next = None;
    }

    fn attach_front(&mut self, id: NodeId) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[id.0];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old_head) => self.nodes[old_head.0].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}

impl<T, const N: usize> Default for RecencyList<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a RecencyList<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over payloads from MRU to LRU.
pub struct Iter<'a, T, const N: usize> {
    list: &'a RecencyList<T, N>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let node = &self.list.nodes[id.0];
        self.front = node.next;
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for Iter<'_, T, N> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let node = &self.list.nodes[id.0];
        self.back = node.prev;
        self.remaining -= 1;
        node.value.as_ref()
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}
impl<T, const N: usize> FusedIterator for Iter<'_, T, N> {}
