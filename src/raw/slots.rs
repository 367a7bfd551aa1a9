use alloc::vec::Vec;

use smallvec::SmallVec;

/// Keys are opaque byte strings ordered lexicographically.
pub(crate) type Key = Vec<u8>;

/// Inline capacity of a node's key array. Orders up to 9 never spill to the heap.
pub(crate) const INLINE_KEYS: usize = 8;
pub(crate) const INLINE_SLOTS: usize = INLINE_KEYS + 1;

/// The ordered keys of a node together with their positional slots.
///
/// `S` is the slot payload: a stored value in a leaf, a child id in an internal node.
/// Leaves keep one slot per key; internal nodes keep one slot more than keys. Every
/// shift, split and splice is written here once for both node kinds, so callers pass a
/// key position and a slot position separately.
pub(crate) struct Slots<S> {
    keys: SmallVec<[Key; INLINE_KEYS]>,
    slots: SmallVec<[S; INLINE_SLOTS]>,
}

impl<S> Slots<S> {
    pub(crate) fn new() -> Self {
        Self {
            keys: SmallVec::new(),
            slots: SmallVec::new(),
        }
    }

    /// Internal-node shape: a lone child with no separators yet.
    pub(crate) fn with_slot(slot: S) -> Self {
        let mut slots = SmallVec::new();
        slots.push(slot);
        Self {
            keys: SmallVec::new(),
            slots,
        }
    }

    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &[u8] {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> &S {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut S {
        &mut self.slots[index]
    }

    pub(crate) fn slots(&self) -> &[S] {
        &self.slots
    }

    pub(crate) fn set_key(&mut self, index: usize, key: Key) {
        self.keys[index] = key;
    }

    /// Looks `key` up among the stored keys.
    ///
    /// `Ok(i)` is an exact match; `Err(i)` is the position of the first key greater
    /// than `key`, i.e. where it would be inserted.
    #[inline]
    pub(crate) fn search(&self, key: &[u8]) -> Result<usize, usize> {
        self.keys.binary_search_by(|probe| probe.as_slice().cmp(key))
    }

    /// Index of the first key strictly greater than `key`.
    #[inline]
    pub(crate) fn upper_bound(&self, key: &[u8]) -> usize {
        self.keys.partition_point(|probe| probe.as_slice() <= key)
    }

    /// Shifts everything at or after the given positions right by one and places the
    /// new key and slot.
    pub(crate) fn insert(&mut self, key_at: usize, slot_at: usize, key: Key, slot: S) {
        self.keys.insert(key_at, key);
        self.slots.insert(slot_at, slot);
    }

    /// Shifts everything after the given positions left by one.
    pub(crate) fn remove(&mut self, key_at: usize, slot_at: usize) -> (Key, S) {
        let key = self.keys.remove(key_at);
        let slot = self.slots.remove(slot_at);
        (key, slot)
    }

    /// Removes only a key, leaving the slots untouched.
    pub(crate) fn remove_key(&mut self, key_at: usize) -> Key {
        self.keys.remove(key_at)
    }

    pub(crate) fn push(&mut self, key: Key, slot: S) {
        self.keys.push(key);
        self.slots.push(slot);
    }

    pub(crate) fn pop(&mut self) -> Option<(Key, S)> {
        let key = self.keys.pop()?;
        let slot = self.slots.pop()?;
        Some((key, slot))
    }

    pub(crate) fn pop_front(&mut self) -> Option<(Key, S)> {
        if self.keys.is_empty() || self.slots.is_empty() {
            return None;
        }
        Some(self.remove(0, 0))
    }

    /// Moves keys from `key_at` and slots from `slot_at` onwards into a new `Slots`.
    pub(crate) fn split_off(&mut self, key_at: usize, slot_at: usize) -> Self {
        Self {
            keys: self.keys.drain(key_at..).collect(),
            slots: self.slots.drain(slot_at..).collect(),
        }
    }

    /// Appends every key and slot of `other`, leaving it empty.
    pub(crate) fn append(&mut self, other: &mut Self) {
        self.keys.extend(other.keys.drain(..));
        self.slots.extend(other.slots.drain(..));
    }

    /// Appends `other` behind `separator`: used to fold internal nodes, whose slot
    /// count runs one ahead of the key count.
    pub(crate) fn append_joined(&mut self, separator: Key, other: &mut Self) {
        self.keys.push(separator);
        self.append(other);
    }
}
