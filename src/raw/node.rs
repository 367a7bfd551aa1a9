use alloc::vec::Vec;

use smallvec::SmallVec;

use super::handle::NodeId;
use super::slots::{INLINE_SLOTS, Key, Slots};

/// Stored values are opaque byte strings.
pub(crate) type Value = Vec<u8>;

pub(crate) enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

// B+Tree: internal nodes hold separator keys and child ids.
// `keys[i]` is the smallest key reachable through `children[i + 1]`.
pub(crate) struct InternalNode {
    parent: Option<NodeId>,
    entries: Slots<NodeId>,
}

// B+Tree: leaves hold the entries themselves, plus the link to the next leaf.
pub(crate) struct LeafNode {
    parent: Option<NodeId>,
    next: Option<NodeId>,
    entries: Slots<Value>,
}

impl Node {
    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn into_leaf(self) -> LeafNode {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn into_internal(self) -> InternalNode {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }
}

impl InternalNode {
    /// A fresh root with exactly one separator and two children.
    pub(crate) fn new_root(separator: Key, left: NodeId, right: NodeId) -> Self {
        let mut entries = Slots::with_slot(left);
        entries.push(separator, right);
        Self { parent: None, entries }
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn key_count(&self) -> usize {
        self.entries.key_count()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.entries.slot_count()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &[u8] {
        self.entries.key(index)
    }

    pub(crate) fn keys(&self) -> &[Key] {
        self.entries.keys()
    }

    pub(crate) fn set_key(&mut self, index: usize, key: Key) {
        self.entries.set_key(index, key);
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> NodeId {
        *self.entries.slot(index)
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        self.entries.slots()
    }

    /// Index of the child whose subtree may hold `key`: the first child `i` with
    /// `key < keys[i]`, or the last child when no separator exceeds `key`.
    #[inline]
    pub(crate) fn search_child(&self, key: &[u8]) -> usize {
        self.entries.upper_bound(key)
    }

    /// Slot position of `child` in this node.
    pub(crate) fn child_position(&self, child: NodeId) -> Option<usize> {
        self.children().iter().position(|&id| id == child)
    }

    /// Places `key` at `index` and `child` directly to its right.
    pub(crate) fn insert_child(&mut self, index: usize, key: Key, child: NodeId) {
        self.entries.insert(index, index + 1, key, child);
    }

    /// Removes the separator at `key_at` and the child at `child_at`.
    pub(crate) fn remove_at(&mut self, key_at: usize, child_at: usize) -> (Key, NodeId) {
        self.entries.remove(key_at, child_at)
    }

    /// Prepends a child, with `key` becoming the separator after it.
    pub(crate) fn push_front(&mut self, key: Key, child: NodeId) {
        self.entries.insert(0, 0, key, child);
    }

    /// Appends a child, with `key` becoming the separator before it.
    pub(crate) fn push(&mut self, key: Key, child: NodeId) {
        self.entries.push(key, child);
    }

    /// Removes the last separator and the last child.
    pub(crate) fn pop(&mut self) -> Option<(Key, NodeId)> {
        self.entries.pop()
    }

    /// Removes the first separator and the first child.
    pub(crate) fn pop_front(&mut self) -> Option<(Key, NodeId)> {
        self.entries.pop_front()
    }

    /// Inserts `key` at separator position `index` (with `child` to its right) into a
    /// full node, splitting it in the same step.
    ///
    /// Returns the promoted separator and the new right sibling. The promoted key is
    /// moved up, not copied: neither half keeps it. The sibling's children still name
    /// this node as their parent; the caller re-points them once the sibling has an id.
    pub(crate) fn split_insert(&mut self, index: usize, key: Key, child: NodeId) -> (Key, InternalNode) {
        let middle = self.key_count().div_ceil(2);

        // The right half is cut with as many children as keys: child `j` is the right
        // child of key `j`. Dropping its first key afterwards restores the usual shape.
        let mut right = if index < middle {
            let split_at = middle - 1;
            let right = self.entries.split_off(split_at, split_at + 1);
            self.insert_child(index, key, child);
            right
        } else {
            let mut right = self.entries.split_off(middle, middle + 1);
            let at = index - middle;
            right.insert(at, at, key, child);
            right
        };
        let promoted = right.remove_key(0);

        (
            promoted,
            InternalNode {
                parent: self.parent,
                entries: right,
            },
        )
    }

    /// Folds `right` into this node, pulling `separator` down between them.
    /// Returns the ids of the adopted children.
    pub(crate) fn merge_with_right(&mut self, separator: Key, mut right: InternalNode) -> SmallVec<[NodeId; INLINE_SLOTS]> {
        let adopted = right.children().iter().copied().collect();
        self.entries.append_joined(separator, &mut right.entries);
        adopted
    }
}

impl LeafNode {
    /// The first leaf of a tree, holding a single entry.
    pub(crate) fn with_entry(key: Key, value: Value) -> Self {
        let mut entries = Slots::new();
        entries.push(key, value);
        Self {
            parent: None,
            next: None,
            entries,
        }
    }

    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn key_count(&self) -> usize {
        self.entries.key_count()
    }

    pub(crate) fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &[u8] {
        self.entries.key(index)
    }

    pub(crate) fn keys(&self) -> &[Key] {
        self.entries.keys()
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &[u8] {
        self.entries.slot(index)
    }

    #[inline]
    pub(crate) fn search(&self, key: &[u8]) -> Result<usize, usize> {
        self.entries.search(key)
    }

    /// Overrides the value at `index` in place, returning the previous one.
    pub(crate) fn replace_value(&mut self, index: usize, value: Value) -> Value {
        core::mem::replace(self.entries.slot_mut(index), value)
    }

    pub(crate) fn insert(&mut self, index: usize, key: Key, value: Value) {
        self.entries.insert(index, index, key, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (Key, Value) {
        self.entries.remove(index, index)
    }

    pub(crate) fn push(&mut self, key: Key, value: Value) {
        self.entries.push(key, value);
    }

    pub(crate) fn push_front(&mut self, key: Key, value: Value) {
        self.entries.insert(0, 0, key, value);
    }

    pub(crate) fn pop(&mut self) -> Option<(Key, Value)> {
        self.entries.pop()
    }

    pub(crate) fn pop_front(&mut self) -> Option<(Key, Value)> {
        self.entries.pop_front()
    }

    /// Inserts an entry at `index` into a full leaf, splitting it in the same step.
    ///
    /// The split point is `ceil(len / 2)`, moved one slot left when the new entry lands
    /// in the left half, so the result is the same as inserting into an over-full leaf
    /// and cutting it at `ceil(len / 2)`. The new right leaf inherits this leaf's chain
    /// link; the caller points this leaf at the right one once it has an id. Returns the
    /// separator to promote (a copy of the right leaf's first key) and the right leaf.
    pub(crate) fn split_insert(&mut self, index: usize, key: Key, value: Value) -> (Key, LeafNode) {
        let middle = self.key_count().div_ceil(2);
        let split_at = if index < middle { middle - 1 } else { middle };

        let mut right = LeafNode {
            parent: self.parent,
            next: self.next,
            entries: self.entries.split_off(split_at, split_at),
        };
        if index < middle {
            self.insert(index, key, value);
        } else {
            right.insert(index - split_at, key, value);
        }

        let separator = right.key(0).to_vec();
        (separator, right)
    }

    /// Appends every entry of `right` and takes over its chain link.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode) {
        self.entries.append(&mut right.entries);
        self.next = right.next;
    }
}
