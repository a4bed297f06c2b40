//! Open-addressing hash table over a fixed array of slots.
//!
//! Every entry lives directly in a `[Slot<K, V>; N]` array owned by the table.
//! Nothing is allocated after construction and the table never resizes.
//!
//! ## Architecture
//!
//! ```text
//!   slots ([Slot<K, V>; N], N = 8)
//!   ┌─────┬──────────────────────┐
//!   │  0  │ Empty                │
//!   │  1  │ Occupied(k1, v1)     │ ◄── home slot of k1, k9, k17
//!   │  2  │ Tombstone            │ ◄── k9 was erased; probing walks past it
//!   │  3  │ Empty                │
//!   │  4  │ Occupied(k17, v17)   │ ◄── 1 + 1 + 2
//!   │  5  │ Empty                │
//!   │  6  │ Empty                │
//!   │  7  │ Empty                │
//!   └─────┴──────────────────────┘
//!   len = 2, tombstones = 1
//! ```
//!
//! ## Probing
//!
//! A key starts at `hash(key) & (N - 1)` and on the `i`-th step (1-based)
//! moves `i` slots further, wrapping around. With a power-of-two `N` these
//! triangular offsets visit every slot exactly once in `N` steps.
//!
//! - Lookup stops at the first `Empty` slot (the key was never inserted past
//!   it) or at an `Occupied` slot holding an equal key. Tombstones are skipped.
//! - Insertion additionally remembers the first tombstone on the path and
//!   prefers it over the terminating `Empty` slot, keeping that key's future
//!   probe chain short. If all `N` slots are probed without finding the key,
//!   an `Empty` slot or a tombstone, the table is full.
//!
//! ## Tombstones and compaction
//!
//! Erasing marks the slot `Tombstone` so that keys further along the same
//! probe chain stay reachable. When the last live entry is erased the whole
//! array is reset to `Empty`, so repeated fill/drain cycles cannot silt the
//! table up with tombstones.
//!
//! ## Handles
//!
//! [`SlotHandle`] is a slot index; `N` is the end marker returned by
//! [`SlotTable::end`]. A handle is only meaningful until the next mutating
//! call on the table.
//!
//! ## Example Usage
//!
//! ```
//! use slotlru::ds::SlotTable;
//!
//! let mut table: SlotTable<u32, &str, 8> = SlotTable::new();
//! let (handle, inserted) = table.try_emplace(7, "seven");
//! assert!(inserted);
//! assert_eq!(table.entry_at(handle), Some((&7, &"seven")));
//!
//! let (_, inserted) = table.try_emplace(7, "SEVEN");
//! assert!(!inserted);
//! assert_eq!(table.get(&7), Some(&"seven"));
//!
//! let (_, inserted) = table.insert_or_assign(7, "SEVEN");
//! assert!(!inserted);
//! assert_eq!(table.get(&7), Some(&"SEVEN"));
//!
//! let handle = table.find(&7).unwrap();
//! table.erase(handle);
//! assert!(table.is_empty());
//! assert_eq!(table.tombstones(), 0);
//! ```
//!
//! A capacity that is not a power of two is rejected at compile time:
//!
//! ```compile_fail
//! use slotlru::ds::SlotTable;
//!
//! let table: SlotTable<u32, u32, 12> = SlotTable::new();
//! ```
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::mem;

use rustc_hash::FxBuildHasher;

use crate::error::{InvariantError, TableFull};

/// Observable state of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Occupied,
    Tombstone,
    Empty,
}

/// Position of a slot inside a [`SlotTable`].
///
/// Valid until the next mutating call on the table that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle(usize);

impl SlotHandle {
    /// Returns the slot index (`N` for the end marker).
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

impl<K, V> Slot<K, V> {
    #[inline]
    fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Tombstone => SlotState::Tombstone,
            Slot::Occupied(..) => SlotState::Occupied,
        }
    }

    #[inline]
    fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(..))
    }
}

/// Outcome of searching for the slot a key belongs in.
enum Probe {
    Found(usize),
    Vacant(usize),
    Full,
}

/// Fixed-capacity open-addressing hash map with tombstone deletion.
///
/// `N` must be a non-zero power of two; other values fail to compile as soon
/// as the table is constructed.
#[derive(Debug)]
pub struct SlotTable<K, V, const N: usize, S = FxBuildHasher> {
    slots: [Slot<K, V>; N],
    len: usize,
    tombstones: usize,
    hash_builder: S,
}

impl<K, V, const N: usize> SlotTable<K, V, N, FxBuildHasher> {
    /// Creates an empty table using the default Fx hasher.
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }
}

impl<K, V, const N: usize, S> SlotTable<K, V, N, S> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "SlotTable capacity must be a non-zero power of two"
    );

    /// Creates an empty table that hashes keys with `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        Self {
            slots: std::array::from_fn(|_| Slot::Empty),
            len: 0,
            tombstones: 0,
            hash_builder,
        }
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no live entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots, `N`.
    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Returns the number of tombstoned slots.
    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the table's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the state of the slot at `index`, or `None` if out of range.
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(Slot::state)
    }

    /// Returns the handle of the first occupied slot, or [`end`](Self::end).
    pub fn begin(&self) -> SlotHandle {
        self.seek_forward(0)
    }

    /// Returns the end marker.
    #[inline]
    pub fn end(&self) -> SlotHandle {
        SlotHandle(N)
    }

    /// Returns the next occupied slot after `handle` in array order.
    ///
    /// Stepping from the last occupied slot, or from the end marker, yields
    /// the end marker.
    pub fn next_handle(&self, handle: SlotHandle) -> SlotHandle {
        if handle.0 >= N {
            return self.end();
        }
        self.seek_forward(handle.0 + 1)
    }

    /// Returns the closest occupied slot before `handle` in array order.
    ///
    /// Returns `None` when no occupied slot precedes `handle`.
    pub fn prev_handle(&self, handle: SlotHandle) -> Option<SlotHandle> {
        (0..handle.0.min(N))
            .rev()
            .find(|&pos| self.slots[pos].is_occupied())
            .map(SlotHandle)
    }

    /// Moves `handle` by `n` occupied slots (backwards when `n` is negative).
    ///
    /// Each step is a single [`next_handle`](Self::next_handle) or
    /// [`prev_handle`](Self::prev_handle), so the cost grows with the number
    /// of slots skipped. Moving forward saturates at the end marker; moving
    /// backward past the first occupied slot returns `None`.
    pub fn advance(&self, handle: SlotHandle, n: isize) -> Option<SlotHandle> {
        let mut current = handle;
        if n >= 0 {
            for _ in 0..n {
                current = self.next_handle(current);
            }
        } else {
            for _ in 0..n.unsigned_abs() {
                current = self.prev_handle(current)?;
            }
        }
        Some(current)
    }

    /// Returns the entry stored at `handle`, if that slot is occupied.
    pub fn entry_at(&self, handle: SlotHandle) -> Option<(&K, &V)> {
        match self.slots.get(handle.0)? {
            Slot::Occupied(key, value) => Some((key, value)),
            _ => None,
        }
    }

    /// Returns the entry stored at `handle` with a mutable value.
    pub fn entry_at_mut(&mut self, handle: SlotHandle) -> Option<(&K, &mut V)> {
        match self.slots.get_mut(handle.0)? {
            Slot::Occupied(key, value) => Some((&*key, value)),
            _ => None,
        }
    }

    /// Erases the entry at `handle` and returns the handle of the next
    /// occupied slot.
    ///
    /// The slot becomes a tombstone. If this empties the table, every slot is
    /// reset to `Empty` and the tombstone count drops to zero. Erasing a slot
    /// that is not occupied only computes the next handle.
    pub fn erase(&mut self, handle: SlotHandle) -> SlotHandle {
        let next = self.next_handle(handle);
        self.take_at(handle.0);
        next
    }

    /// Drops every entry and resets all slots to `Empty`.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.len = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over live entries in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.len,
        }
    }

    /// Returns an iterator over live entries in slot order with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.len,
        }
    }

    fn seek_forward(&self, mut pos: usize) -> SlotHandle {
        while pos < N && !self.slots[pos].is_occupied() {
            pos += 1;
        }
        SlotHandle(pos)
    }

    fn take_at(&mut self, pos: usize) -> Option<(K, V)> {
        let slot = self.slots.get_mut(pos)?;
        if !slot.is_occupied() {
            return None;
        }
        let Slot::Occupied(key, value) = mem::replace(slot, Slot::Tombstone) else {
            return None;
        };
        self.len -= 1;
        self.tombstones += 1;
        if self.len == 0 {
            tracing::trace!(
                capacity = N,
                tombstones = self.tombstones,
                "slot table drained; resetting slots"
            );
            self.clear();
        }
        Some((key, value))
    }

    fn occupy(&mut self, pos: usize, key: K, value: V) {
        if matches!(self.slots[pos], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots[pos] = Slot::Occupied(key, value);
        self.len += 1;
    }

    fn reject_full(&self) {
        tracing::debug!(
            capacity = N,
            len = self.len,
            "slot table full; insertion rejected"
        );
    }

    fn recount(&mut self) {
        self.len = 0;
        self.tombstones = 0;
        for slot in &self.slots {
            match slot.state() {
                SlotState::Occupied => self.len += 1,
                SlotState::Tombstone => self.tombstones += 1,
                SlotState::Empty => {},
            }
        }
    }
}

impl<K, V, const N: usize, S> SlotTable<K, V, N, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns the handle of the slot holding `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<SlotHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup_slot(key).map(SlotHandle)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup_slot(key).is_some()
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.lookup_slot(key)?;
        self.entry_at(SlotHandle(pos)).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.lookup_slot(key)?;
        self.entry_at_mut(SlotHandle(pos)).map(|(_, value)| value)
    }

    /// Inserts `key → value` if `key` is absent.
    ///
    /// Returns the entry's handle and whether it was inserted. An existing
    /// entry is left untouched and `value` is dropped. When the table is full
    /// and `key` is absent, returns `(self.end(), false)`.
    pub fn try_emplace(&mut self, key: K, value: V) -> (SlotHandle, bool) {
        match self.find_insert_slot(&key) {
            Probe::Found(pos) => (SlotHandle(pos), false),
            Probe::Vacant(pos) => {
                self.occupy(pos, key, value);
                (SlotHandle(pos), true)
            },
            Probe::Full => {
                self.reject_full();
                (self.end(), false)
            },
        }
    }

    /// Inserts `key → value`, overwriting the value if `key` is present.
    ///
    /// Returns the entry's handle and whether a new entry was created. When
    /// the table is full and `key` is absent, returns `(self.end(), false)`.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (SlotHandle, bool) {
        match self.find_insert_slot(&key) {
            Probe::Found(pos) => {
                let Slot::Occupied(_, stored) = &mut self.slots[pos] else {
                    unreachable!("probe matched slot {} which is not occupied", pos);
                };
                *stored = value;
                (SlotHandle(pos), false)
            },
            Probe::Vacant(pos) => {
                self.occupy(pos, key, value);
                (SlotHandle(pos), true)
            },
            Probe::Full => {
                self.reject_full();
                (self.end(), false)
            },
        }
    }

    /// Inserts or overwrites `key → value`, returning the displaced value.
    ///
    /// Fails with [`TableFull`] when `key` is absent and no slot is free.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableFull> {
        match self.find_insert_slot(&key) {
            Probe::Found(pos) => {
                let Slot::Occupied(_, stored) = &mut self.slots[pos] else {
                    unreachable!("probe matched slot {} which is not occupied", pos);
                };
                Ok(Some(mem::replace(stored, value)))
            },
            Probe::Vacant(pos) => {
                self.occupy(pos, key, value);
                Ok(None)
            },
            Probe::Full => {
                self.reject_full();
                Err(TableFull)
            },
        }
    }

    /// Removes `key` and returns its value, with the same tombstone and
    /// compaction behavior as [`erase`](Self::erase).
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.lookup_slot(key)?;
        self.take_at(pos).map(|(_, value)| value)
    }

    /// Validates the slot accounting and that every key is reachable along
    /// its own probe sequence.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let occupied = self.slots.iter().filter(|slot| slot.is_occupied()).count();
        let tombstones = self
            .slots
            .iter()
            .filter(|slot| slot.state() == SlotState::Tombstone)
            .count();

        if occupied != self.len {
            return Err(InvariantError::new(format!(
                "live count {} does not match {} occupied slots",
                self.len, occupied
            )));
        }
        if tombstones != self.tombstones {
            return Err(InvariantError::new(format!(
                "tombstone count {} does not match {} tombstoned slots",
                self.tombstones, tombstones
            )));
        }
        if self.len + self.tombstones > N {
            return Err(InvariantError::new(format!(
                "{} live + {} tombstones exceeds {} slots",
                self.len, self.tombstones, N
            )));
        }
        if self.len == 0 && self.tombstones != 0 {
            return Err(InvariantError::new(
                "empty table still carries tombstones",
            ));
        }
        for (pos, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied(key, _) = slot {
                if self.lookup_slot(key) != Some(pos) {
                    return Err(InvariantError::new(format!(
                        "key in slot {} is not reachable along its probe sequence",
                        pos
                    )));
                }
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("slot table invariant violated: {}", err);
        }
    }

    #[inline]
    fn home_slot<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        (self.hash_builder.hash_one(key) as usize) & (N - 1)
    }

    fn lookup_slot<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut pos = self.home_slot(key);
        for step in 1..=N {
            match &self.slots[pos] {
                Slot::Empty => return None,
                Slot::Occupied(stored, _) if <K as Borrow<Q>>::borrow(stored) == key => {
                    return Some(pos);
                },
                Slot::Occupied(..) | Slot::Tombstone => {},
            }
            pos = (pos + step) & (N - 1);
        }
        None
    }

    fn find_insert_slot(&self, key: &K) -> Probe {
        let mut pos = self.home_slot(key);
        let mut first_tombstone = None;
        for step in 1..=N {
            match &self.slots[pos] {
                Slot::Empty => return Probe::Vacant(first_tombstone.unwrap_or(pos)),
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(pos);
                    }
                },
                Slot::Occupied(stored, _) if stored == key => return Probe::Found(pos),
                Slot::Occupied(..) => {},
            }
            pos = (pos + step) & (N - 1);
        }
        match first_tombstone {
            Some(pos) => Probe::Vacant(pos),
            None => Probe::Full,
        }
    }
}

impl<K, V, const N: usize, S: Default> Default for SlotTable<K, V, N, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, const N: usize, S> Clone for SlotTable<K, V, N, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        let mut table = Self {
            slots: self.slots.clone(),
            len: 0,
            tombstones: 0,
            hash_builder: self.hash_builder.clone(),
        };
        table.recount();
        table
    }

    /// Rebuilds `self` slot by slot from `source`.
    fn clone_from(&mut self, source: &Self) {
        for (dst, src) in self.slots.iter_mut().zip(source.slots.iter()) {
            dst.clone_from(src);
        }
        self.hash_builder.clone_from(&source.hash_builder);
        self.recount();
    }
}

impl<'a, K, V, const N: usize, S> IntoIterator for &'a SlotTable<K, V, N, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, const N: usize, S> IntoIterator for &'a mut SlotTable<K, V, N, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over live entries in slot order.
pub struct Iter<'a, K, V> {
    slots: std::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(key, value) = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Slot::Occupied(key, value) = slot {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over live entries in slot order with mutable values.
pub struct IterMut<'a, K, V> {
    slots: std::slice::IterMut<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Slot::Occupied(key, value) = slot {
                self.remaining -= 1;
                return Some((&*key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Slot::Occupied(key, value) = slot {
                self.remaining -= 1;
                return Some((&*key, value));
            }
        }
        None
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}
