use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::NodeId;
use super::node::{InternalNode, LeafNode, Node, Value};
use super::slots::{INLINE_SLOTS, Key};
use crate::options::Fanout;
use crate::tracing_helpers::{debug_log, trace_log};

/// The B+Tree engine backing `BPlusTree`.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]: children downwards,
/// parents upwards, and leaves sideways along the leaf chain. Only the arena owns nodes,
/// so splits, merges and reparenting are plain id rewrites.
pub(crate) struct RawBPlusTree {
    /// Arena storing all tree nodes.
    nodes: Arena<Node>,
    /// Root node, if the tree is non-empty.
    root: Option<NodeId>,
    /// Leftmost leaf, where ordered iteration starts. Set when the first entry is
    /// inserted; merges always fold into the left node, so it never moves afterwards.
    first_leaf: Option<NodeId>,
    /// Occupancy bounds derived from the branching order.
    fanout: Fanout,
    /// Number of key-value pairs in the tree.
    len: usize,
}

/// Where an underflowing node sits inside its parent.
struct Siblings {
    parent: NodeId,
    /// Slot position of the node in the parent.
    position: usize,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Siblings {
    /// Index of the parent separator between the node and the sibling it would merge with.
    fn separator(&self) -> usize {
        self.position.saturating_sub(1)
    }

    /// The surviving node, the absorbed node, and the parent separator/slot positions to
    /// drop when `node` and a sibling are folded together. The left sibling is preferred.
    fn merge_plan(&self, node: NodeId) -> (NodeId, usize, usize) {
        match (self.left, self.right) {
            (Some(left), _) => (left, self.separator(), self.position),
            (None, Some(_)) => (node, self.separator(), self.position + 1),
            (None, None) => unreachable!("non-root node without siblings"),
        }
    }
}

impl RawBPlusTree {
    /// Creates a new, empty tree.
    pub(crate) const fn new(fanout: Fanout) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            first_leaf: None,
            fanout,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn fanout(&self) -> Fanout {
        self.fanout
    }

    pub(crate) fn first_leaf(&self) -> Option<NodeId> {
        self.first_leaf
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    /// Drops every node. The next insert starts a fresh root leaf.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.first_leaf = None;
        self.len = 0;
    }

    /// Number of levels from the root down to the leaves; 0 for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let Some(mut current) = self.root else {
            return 0;
        };
        let mut height = 1;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
            height += 1;
        }
        height
    }

    /// Descends from the root to the leaf whose key range covers `key`.
    fn find_leaf(&self, key: &[u8]) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.search_child(key)),
                Node::Leaf(_) => return Some(current),
            }
        }
    }

    /// Rightmost leaf, found by always taking the last child.
    fn last_leaf(&self) -> Option<NodeId> {
        let mut current = self.root?;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.child_count() - 1);
        }
        Some(current)
    }

    /// Smallest key stored under `id`.
    fn leftmost_key(&self, id: NodeId) -> &[u8] {
        let mut current = id;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(0),
                Node::Leaf(leaf) => return leaf.key(0),
            }
        }
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let leaf = self.nodes.get(self.find_leaf(key)?).as_leaf();
        let index = leaf.search(key).ok()?;
        Some(leaf.value(index))
    }

    pub(crate) fn first_key_value(&self) -> Option<(&[u8], &[u8])> {
        let leaf = self.nodes.get(self.first_leaf?).as_leaf();
        (leaf.key_count() > 0).then(|| (leaf.key(0), leaf.value(0)))
    }

    pub(crate) fn last_key_value(&self) -> Option<(&[u8], &[u8])> {
        let leaf = self.nodes.get(self.last_leaf()?).as_leaf();
        let last = leaf.key_count().checked_sub(1)?;
        Some((leaf.key(last), leaf.value(last)))
    }

    /// Inserts or overrides an entry. Returns the previous value if the key was present.
    pub(crate) fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        let Some(leaf_id) = self.find_leaf(&key) else {
            self.init(key, value);
            return None;
        };

        let max_keys = self.fanout.max_keys();
        let leaf = self.nodes.get_mut(leaf_id).as_leaf_mut();
        let index = match leaf.search(&key) {
            Ok(index) => {
                trace_log!(leaf = ?leaf_id, index, "value overridden");
                return Some(leaf.replace_value(index, value));
            }
            Err(index) => index,
        };
        self.len += 1;

        if leaf.key_count() < max_keys {
            leaf.insert(index, key, value);
            return None;
        }

        let parent = leaf.parent();
        let (separator, right) = leaf.split_insert(index, key, value);
        let right_id = self.nodes.alloc(Node::Leaf(right));
        self.nodes.get_mut(leaf_id).as_leaf_mut().set_next(Some(right_id));
        debug_log!(left = ?leaf_id, right = ?right_id, "leaf split");

        self.propagate_split(parent, separator, leaf_id, right_id);
        None
    }

    /// Creates the first leaf of an empty tree; it is both the root and the leftmost leaf.
    fn init(&mut self, key: Key, value: Value) {
        let id = self.nodes.alloc(Node::Leaf(LeafNode::with_entry(key, value)));
        self.root = Some(id);
        self.first_leaf = Some(id);
        self.len = 1;
        debug_log!(root = ?id, "tree initialized");
    }

    /// Hooks a freshly split `right` node in next to `left`, splitting ancestors for as
    /// long as they are full and growing a new root if the split reaches the top.
    fn propagate_split(&mut self, mut parent: Option<NodeId>, mut separator: Key, mut left: NodeId, mut right: NodeId) {
        let max_keys = self.fanout.max_keys();

        while let Some(parent_id) = parent {
            let node = self.nodes.get_mut(parent_id).as_internal_mut();
            let index = node
                .child_position(left)
                .expect("`RawBPlusTree::propagate_split()` - split node is missing from its parent!");

            if node.key_count() < max_keys {
                node.insert_child(index, separator, right);
                self.nodes.get_mut(right).set_parent(Some(parent_id));
                return;
            }

            let grandparent = node.parent();
            let (promoted, sibling) = node.split_insert(index, separator, right);
            let sibling_id = self.nodes.alloc(Node::Internal(sibling));
            self.adopt_children(parent_id);
            self.adopt_children(sibling_id);
            debug_log!(left = ?parent_id, right = ?sibling_id, "internal node split");

            parent = grandparent;
            separator = promoted;
            left = parent_id;
            right = sibling_id;
        }

        let root_id = self.nodes.alloc(Node::Internal(InternalNode::new_root(separator, left, right)));
        self.nodes.get_mut(left).set_parent(Some(root_id));
        self.nodes.get_mut(right).set_parent(Some(root_id));
        self.root = Some(root_id);
        debug_log!(root = ?root_id, "tree grew a level");
    }

    /// Points every child of `parent_id` back at it.
    fn adopt_children(&mut self, parent_id: NodeId) {
        let children: SmallVec<[NodeId; INLINE_SLOTS]> =
            self.nodes.get(parent_id).as_internal().children().iter().copied().collect();
        for child in children {
            self.nodes.get_mut(child).set_parent(Some(parent_id));
        }
    }

    /// Removes a key and returns its value, or `None` if the key is absent.
    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<Value> {
        let leaf_id = self.find_leaf(key)?;
        let leaf = self.nodes.get_mut(leaf_id).as_leaf_mut();
        let index = leaf.search(key).ok()?;
        let (_, value) = leaf.remove(index);
        let parent = leaf.parent();
        let remaining = leaf.key_count();
        self.len -= 1;
        trace_log!(leaf = ?leaf_id, index, remaining, "entry removed");

        if parent.is_none() {
            if remaining == 0 {
                self.clear();
                debug_log!("tree emptied");
            }
            return Some(value);
        }

        if remaining < self.fanout.min_keys() {
            self.rebalance_leaf(leaf_id);
        }
        // Structural changes above may already have dropped or moved the separator that
        // copied `key`; whatever copy is left is replaced here.
        self.repair_separators(key);

        Some(value)
    }

    fn siblings(&self, id: NodeId, parent: NodeId) -> Siblings {
        let node = self.nodes.get(parent).as_internal();
        let position = node
            .child_position(id)
            .expect("`RawBPlusTree::siblings()` - node is missing from its parent!");
        Siblings {
            parent,
            position,
            left: position.checked_sub(1).map(|i| node.child(i)),
            right: (position + 1 < node.child_count()).then(|| node.child(position + 1)),
        }
    }

    fn can_lend(&self, id: NodeId) -> bool {
        self.nodes.get(id).key_count() > self.fanout.min_keys()
    }

    /// Restores minimum occupancy of an underflowing leaf by borrowing from a sibling or,
    /// failing that, merging with one.
    fn rebalance_leaf(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(id).parent() else {
            return;
        };
        let siblings = self.siblings(id, parent);

        if let Some(left) = siblings.left
            && self.can_lend(left)
        {
            let (key, value) = self.nodes.get_mut(left).as_leaf_mut().pop().expect("lending leaf is empty");
            let leaf = self.nodes.get_mut(id).as_leaf_mut();
            leaf.push_front(key, value);
            let separator = leaf.key(0).to_vec();
            self.nodes.get_mut(parent).as_internal_mut().set_key(siblings.separator(), separator);
            debug_log!(leaf = ?id, from = ?left, "leaf borrowed from left sibling");
            return;
        }

        if let Some(right) = siblings.right
            && self.can_lend(right)
        {
            let lender = self.nodes.get_mut(right).as_leaf_mut();
            let (key, value) = lender.pop_front().expect("lending leaf is empty");
            let separator = lender.key(0).to_vec();
            self.nodes.get_mut(id).as_leaf_mut().push(key, value);
            self.nodes.get_mut(parent).as_internal_mut().set_key(siblings.position, separator);
            debug_log!(leaf = ?id, from = ?right, "leaf borrowed from right sibling");
            return;
        }

        let (survivor, key_at, slot_at) = siblings.merge_plan(id);
        let (_, absorbed) = self.nodes.get_mut(parent).as_internal_mut().remove_at(key_at, slot_at);
        let absorbed_leaf = self.nodes.take(absorbed).into_leaf();
        self.nodes.get_mut(survivor).as_leaf_mut().merge_with_right(absorbed_leaf);
        debug_log!(into = ?survivor, absorbed = ?absorbed, "leaves merged");

        self.rebalance_internal(siblings.parent);
    }

    /// Walks up from an internal node that just lost a separator, borrowing or merging
    /// at each level until a node meets the minimum or the root is reached. A root left
    /// without separators is replaced by its only child.
    fn rebalance_internal(&mut self, mut id: NodeId) {
        loop {
            let node = self.nodes.get(id).as_internal();
            let Some(parent) = node.parent() else {
                if node.key_count() == 0 {
                    let child = node.child(0);
                    self.nodes.free(id);
                    self.nodes.get_mut(child).set_parent(None);
                    self.root = Some(child);
                    debug_log!(root = ?child, "tree lost a level");
                }
                return;
            };
            if node.key_count() >= self.fanout.min_keys() {
                return;
            }

            let siblings = self.siblings(id, parent);

            if let Some(left) = siblings.left
                && self.can_lend(left)
            {
                let separator = self.nodes.get(parent).as_internal().key(siblings.separator()).to_vec();
                let (key, child) = self.nodes.get_mut(left).as_internal_mut().pop().expect("lending node is empty");
                self.nodes.get_mut(id).as_internal_mut().push_front(separator, child);
                self.nodes.get_mut(child).set_parent(Some(id));
                self.nodes.get_mut(parent).as_internal_mut().set_key(siblings.separator(), key);
                debug_log!(node = ?id, from = ?left, "internal node borrowed from left sibling");
                return;
            }

            if let Some(right) = siblings.right
                && self.can_lend(right)
            {
                let separator = self.nodes.get(parent).as_internal().key(siblings.position).to_vec();
                let (key, child) = self.nodes.get_mut(right).as_internal_mut().pop_front().expect("lending node is empty");
                self.nodes.get_mut(id).as_internal_mut().push(separator, child);
                self.nodes.get_mut(child).set_parent(Some(id));
                self.nodes.get_mut(parent).as_internal_mut().set_key(siblings.position, key);
                debug_log!(node = ?id, from = ?right, "internal node borrowed from right sibling");
                return;
            }

            let (survivor, key_at, slot_at) = siblings.merge_plan(id);
            let (separator, absorbed) = self.nodes.get_mut(parent).as_internal_mut().remove_at(key_at, slot_at);
            let absorbed_node = self.nodes.take(absorbed).into_internal();
            let adopted = self.nodes.get_mut(survivor).as_internal_mut().merge_with_right(separator, absorbed_node);
            for child in adopted {
                self.nodes.get_mut(child).set_parent(Some(survivor));
            }
            debug_log!(into = ?survivor, absorbed = ?absorbed, "internal nodes merged");

            id = parent;
        }
    }

    /// Replaces a separator equal to the just-deleted `key` with the smallest key of the
    /// subtree to its right. Separators are unique, so at most one is rewritten.
    fn repair_separators(&mut self, key: &[u8]) {
        let mut current = self.root;
        while let Some(id) = current {
            let Node::Internal(internal) = self.nodes.get(id) else {
                return;
            };
            let index = internal.search_child(key);
            if index > 0 && internal.key(index - 1) == key {
                let (left, right) = (internal.child(index - 1), internal.child(index));
                let replacement = self.leftmost_key(right).to_vec();
                self.nodes.get_mut(id).as_internal_mut().set_key(index - 1, replacement);
                debug_log!(node = ?id, index = index - 1, "stale separator replaced");
                current = Some(left);
            } else {
                current = Some(internal.child(index));
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::options::Options;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl RawBPlusTree {
        /// Checks every structural invariant and panics with all violations found.
        pub(crate) fn validate_invariants(&self) {
            let Some(root) = self.root else {
                assert_eq!(self.len, 0, "Empty tree should have len 0");
                assert!(self.first_leaf.is_none(), "Empty tree should have no first_leaf");
                assert!(self.nodes.is_empty(), "Empty tree should hold no nodes");
                return;
            };

            let mut errors: Vec<String> = Vec::new();
            if self.nodes.get(root).parent().is_some() {
                errors.push(alloc::format!("Root {root:?} has a parent"));
            }

            let mut walk = Walk::default();
            self.validate_node(root, 0, &mut walk, &mut errors);
            self.validate_leaf_chain(&walk.leaves, &mut errors);

            let count: usize = walk.leaves.iter().map(|&id| self.nodes.get(id).key_count()).sum();
            if count != self.len {
                errors.push(alloc::format!("len mismatch: self.len={}, actual count={count}", self.len));
            }
            if walk.visited != self.nodes.len() {
                errors.push(alloc::format!(
                    "Arena holds {} nodes but only {} are reachable",
                    self.nodes.len(),
                    walk.visited
                ));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns the smallest and largest key of the subtree.
        fn validate_node(
            &self,
            id: NodeId,
            depth: usize,
            walk: &mut Walk,
            errors: &mut Vec<String>,
        ) -> (Option<Key>, Option<Key>) {
            walk.visited += 1;
            let node = self.nodes.get(id);
            let is_root = self.root == Some(id);
            let count = node.key_count();

            if count > self.fanout.max_keys() {
                errors.push(alloc::format!("Node {id:?} overfull: {count} keys"));
            }
            if !is_root && count < self.fanout.min_keys() {
                errors.push(alloc::format!("Node {id:?} underfull: {count} keys"));
            }

            match node {
                Node::Leaf(leaf) => {
                    match walk.leaf_depth {
                        None => walk.leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            errors.push(alloc::format!("Leaf depth mismatch: expected {expected}, got {depth} at {id:?}"));
                        }
                        Some(_) => {}
                    }
                    if leaf.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
                        errors.push(alloc::format!("Leaf keys not strictly ascending at {id:?}"));
                    }
                    walk.leaves.push(id);
                    (leaf.keys().first().cloned(), leaf.keys().last().cloned())
                }
                Node::Internal(internal) => {
                    if internal.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
                        errors.push(alloc::format!("Internal keys not strictly ascending at {id:?}"));
                    }
                    if internal.child_count() != count + 1 {
                        errors.push(alloc::format!(
                            "Internal node {id:?} has {count} keys but {} children",
                            internal.child_count()
                        ));
                    }
                    if is_root && count == 0 {
                        errors.push(alloc::format!("Root {id:?} has no separators left"));
                    }

                    let mut bounds = (None, None);
                    for (i, &child) in internal.children().iter().enumerate() {
                        if self.nodes.get(child).parent() != Some(id) {
                            errors.push(alloc::format!("Child {child:?} of {id:?} names another parent"));
                        }
                        let (child_min, child_max) = self.validate_node(child, depth + 1, walk, errors);
                        if i > 0 && child_min.as_deref() != Some(internal.key(i - 1)) {
                            errors.push(alloc::format!(
                                "Separator {} of {id:?} is not the smallest key of the subtree to its right",
                                i - 1
                            ));
                        }
                        if i < count && child_max.as_deref().is_some_and(|max| max >= internal.key(i)) {
                            errors.push(alloc::format!("Child {i} of {id:?} holds keys past its separator"));
                        }
                        if i == 0 {
                            bounds.0 = child_min;
                        }
                        bounds.1 = child_max;
                    }
                    bounds
                }
            }
        }

        fn validate_leaf_chain(&self, leaves: &[NodeId], errors: &mut Vec<String>) {
            if self.first_leaf != leaves.first().copied() {
                errors.push(alloc::format!(
                    "first_leaf mismatch: expected {:?}, got {:?}",
                    leaves.first(),
                    self.first_leaf
                ));
            }
            for (i, &id) in leaves.iter().enumerate() {
                let expected = leaves.get(i + 1).copied();
                let actual = self.nodes.get(id).as_leaf().next();
                if actual != expected {
                    errors.push(alloc::format!("Leaf chain mismatch at {i}: expected {expected:?}, got {actual:?}"));
                }
            }
        }

        fn keys_in_chain_order(&self) -> Vec<Key> {
            let mut keys = Vec::new();
            let mut current = self.first_leaf;
            while let Some(id) = current {
                let leaf = self.nodes.get(id).as_leaf();
                keys.extend(leaf.keys().iter().cloned());
                current = leaf.next();
            }
            keys
        }
    }

    #[derive(Default)]
    struct Walk {
        leaves: Vec<NodeId>,
        leaf_depth: Option<usize>,
        visited: usize,
    }

    fn tree(order: usize) -> RawBPlusTree {
        RawBPlusTree::new(Options::new().order(order).validate().unwrap())
    }

    fn bytes(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    fn insert_all(tree: &mut RawBPlusTree, keys: &[&str]) {
        for key in keys {
            tree.insert(bytes(key), bytes(key));
            tree.validate_invariants();
        }
    }

    fn root_keys(tree: &RawBPlusTree) -> Vec<Key> {
        tree.node(tree.root.unwrap()).as_internal().keys().to_vec()
    }

    #[test]
    fn empty_tree() {
        let tree = tree(3);
        tree.validate_invariants();
        assert_eq!(tree.get(b"a"), None);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.first_key_value(), None);
        assert_eq!(tree.last_key_value(), None);
    }

    #[test]
    fn full_leaf_splits_and_grows_a_root() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["a", "b"]);
        assert_eq!(tree.height(), 1);

        insert_all(&mut tree, &["c"]);
        assert_eq!(tree.height(), 2);
        assert_eq!(root_keys(&tree), alloc::vec![bytes("b")]);
        assert_eq!(tree.keys_in_chain_order(), alloc::vec![bytes("a"), bytes("b"), bytes("c")]);
    }

    #[test]
    fn internal_split_cascades_to_a_new_root() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["a", "b", "c", "d", "e"]);
        assert_eq!(tree.height(), 3);
        assert_eq!(root_keys(&tree), alloc::vec![bytes("c")]);
    }

    #[test]
    fn overriding_keeps_the_structure() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["a", "b", "c"]);
        assert_eq!(tree.insert(bytes("b"), bytes("B")), Some(bytes("b")));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(b"b"), Some(&b"B"[..]));
        tree.validate_invariants();
    }

    #[test]
    fn underflow_borrows_from_the_right_sibling() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["a", "b", "c"]);
        // Leaves: [a] [b c]
        assert_eq!(tree.remove(b"a"), Some(bytes("a")));
        tree.validate_invariants();
        assert_eq!(root_keys(&tree), alloc::vec![bytes("c")]);
        assert_eq!(tree.keys_in_chain_order(), alloc::vec![bytes("b"), bytes("c")]);
    }

    #[test]
    fn underflow_borrows_from_the_left_sibling() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["a", "b", "c", "aa"]);
        // Leaves: [a aa] [b c]
        tree.remove(b"c");
        tree.validate_invariants();
        assert_eq!(tree.remove(b"b"), Some(bytes("b")));
        tree.validate_invariants();
        assert_eq!(root_keys(&tree), alloc::vec![bytes("aa")]);
        assert_eq!(tree.get(b"aa"), Some(&b"aa"[..]));
    }

    #[test]
    fn merge_collapses_the_root() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["a", "b", "c"]);
        let first_leaf = tree.first_leaf;
        tree.remove(b"a");
        tree.remove(b"b");
        tree.validate_invariants();
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.first_leaf, first_leaf);
        assert_eq!(tree.root, first_leaf);
        assert_eq!(tree.keys_in_chain_order(), alloc::vec![bytes("c")]);
    }

    #[test]
    fn deleting_the_last_key_empties_the_tree() {
        let mut tree = tree(4);
        insert_all(&mut tree, &["x"]);
        assert_eq!(tree.remove(b"y"), None);
        assert_eq!(tree.remove(b"x"), Some(bytes("x")));
        tree.validate_invariants();
        assert!(tree.is_empty());
        assert_eq!(tree.root, None);

        insert_all(&mut tree, &["y"]);
        assert_eq!(tree.get(b"y"), Some(&b"y"[..]));
    }

    #[test]
    fn deleting_a_separator_key_repairs_it() {
        let mut tree = tree(4);
        insert_all(&mut tree, &["a", "b", "c", "d", "e", "f"]);
        for key in ["c", "d", "b", "e"] {
            tree.remove(key.as_bytes());
            tree.validate_invariants();
            assert!(tree.get(key.as_bytes()).is_none());
        }
        assert_eq!(tree.keys_in_chain_order(), alloc::vec![bytes("a"), bytes("f")]);
    }

    #[test]
    fn empty_key_is_an_ordinary_key() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["b", "", "a"]);
        assert_eq!(tree.get(b""), Some(&b""[..]));
        assert_eq!(tree.first_key_value(), Some((&b""[..], &b""[..])));
        assert_eq!(tree.remove(b""), Some(Vec::new()));
        tree.validate_invariants();
        assert_eq!(tree.get(b""), None);
    }

    #[test]
    fn leftmost_leaf_survives_heavy_churn() {
        let mut tree = tree(3);
        tree.insert(alloc::vec![0], alloc::vec![0]);
        let first_leaf = tree.first_leaf;
        for i in 1..=200u8 {
            tree.insert(alloc::vec![i], alloc::vec![i]);
        }
        for i in (1..=200u8).rev().step_by(2).chain((1..=200u8).step_by(2)) {
            tree.remove(&[i]);
            tree.validate_invariants();
            assert_eq!(tree.first_leaf, first_leaf);
        }
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn first_and_last_entries() {
        let mut tree = tree(3);
        insert_all(&mut tree, &["m", "c", "x", "a", "q"]);
        assert_eq!(tree.first_key_value(), Some((&b"a"[..], &b"a"[..])));
        assert_eq!(tree.last_key_value(), Some((&b"x"[..], &b"x"[..])));
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(u16),
        Remove(u16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u16..600).prop_map(Op::Insert),
            2 => (0u16..600).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(
            order in 3usize..=7,
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree = tree(order);
            let mut model: BTreeMap<Key, Value> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let key = key.to_be_bytes().to_vec();
                        let value = alloc::vec![key[0] ^ key[1]];
                        prop_assert_eq!(tree.insert(key.clone(), value.clone()), model.insert(key, value));
                    }
                    Op::Remove(key) => {
                        let key = key.to_be_bytes();
                        prop_assert_eq!(tree.remove(&key), model.remove(&key[..]));
                    }
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
            }

            let expected: Vec<Key> = model.keys().cloned().collect();
            prop_assert_eq!(tree.keys_in_chain_order(), expected);
        }

        #[test]
        fn variable_length_keys_follow_byte_order(
            order in 3usize..=7,
            keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..200),
        ) {
            let mut tree = tree(order);
            let mut model: BTreeMap<Key, Value> = BTreeMap::new();

            for (i, key) in keys.iter().enumerate() {
                let value = i.to_le_bytes().to_vec();
                prop_assert_eq!(tree.insert(key.clone(), value.clone()), model.insert(key.clone(), value));
            }
            tree.validate_invariants();
            for key in keys.iter().step_by(2) {
                prop_assert_eq!(tree.remove(key), model.remove(key));
                tree.validate_invariants();
            }

            let expected: Vec<Key> = model.keys().cloned().collect();
            prop_assert_eq!(tree.keys_in_chain_order(), expected);
            for (key, value) in &model {
                prop_assert_eq!(tree.get(key), Some(value.as_slice()));
            }
        }
    }
}
