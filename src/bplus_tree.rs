use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::options::{Fanout, Options};
use crate::raw::{NodeId, RawBPlusTree};
use crate::tracing_helpers::{debug_log, trace_log};

/// An in-memory ordered index from byte-string keys to byte-string values, stored in a
/// [B+Tree].
///
/// Keys are ordered lexicographically by their bytes, so `"7"` sorts after `"18"` and a
/// shorter key sorts before any key it is a prefix of. The empty key is an ordinary key.
/// Every entry lives in a leaf and the leaves are chained left to right, which makes a
/// full ordered scan a walk along that chain without revisiting internal nodes.
///
/// The branching order `m` (default [`DEFAULT_ORDER`](crate::DEFAULT_ORDER)) bounds every
/// node to at most `m - 1` keys. Non-root nodes keep at least `ceil(m / 2) - 1` keys,
/// borrowing from or merging with a sibling when a delete would leave fewer.
///
/// The tree is a plain single-threaded value. Iterators and cursors borrow it, so it
/// cannot be modified while one of them is alive.
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut index = BPlusTree::with_order(3).unwrap();
/// for key in ["11", "18", "7", "15", "0", "16", "14"] {
///     index.put(key.as_bytes(), key.as_bytes());
/// }
///
/// assert_eq!(index.get(b"7"), Some(&b"7"[..]));
/// assert_eq!(index.len(), 7);
///
/// // Byte order, not numeric order.
/// let keys: Vec<&[u8]> = index.iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, [&b"0"[..], b"11", b"14", b"15", b"16", b"18", b"7"]);
///
/// assert_eq!(index.delete(b"15"), Some(b"15".to_vec()));
/// assert_eq!(index.delete(b"15"), None);
/// ```
///
/// [B+Tree]: https://en.wikipedia.org/wiki/B%2B_tree
pub struct BPlusTree {
    raw: RawBPlusTree,
}

impl BPlusTree {
    /// Makes a new, empty tree with the default branching order.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, DEFAULT_ORDER};
    ///
    /// let tree = BPlusTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.order(), DEFAULT_ORDER);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: RawBPlusTree::new(Fanout::default()),
        }
    }

    /// Makes a new, empty tree whose nodes have at most `order` children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`](crate::Error::InvalidOrder) if `order` is below
    /// [`MIN_ORDER`](crate::MIN_ORDER).
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, Error};
    ///
    /// assert_eq!(BPlusTree::with_order(5).unwrap().order(), 5);
    /// assert_eq!(BPlusTree::with_order(2).unwrap_err(), Error::InvalidOrder { order: 2, min: 3 });
    /// ```
    pub fn with_order(order: usize) -> Result<Self> {
        Self::with_options(Options::new().order(order))
    }

    /// Makes a new, empty tree configured by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`](crate::Error::InvalidOrder) if the configured order is
    /// below [`MIN_ORDER`](crate::MIN_ORDER).
    pub fn with_options(options: Options) -> Result<Self> {
        let fanout = options.validate()?;
        debug_log!(
            order = fanout.order(),
            max_keys = fanout.max_keys(),
            min_keys = fanout.min_keys(),
            "tree configured"
        );
        Ok(Self {
            raw: RawBPlusTree::new(fanout),
        })
    }

    /// The branching order: the maximum number of children of an internal node.
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.fanout().order()
    }

    /// Returns the number of entries in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of levels between the root and the leaves, counting both; 0 when empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_order(3).unwrap();
    /// assert_eq!(tree.height(), 0);
    /// tree.put(b"a", b"1");
    /// tree.put(b"b", b"2");
    /// assert_eq!(tree.height(), 1);
    /// tree.put(b"c", b"3");
    /// assert_eq!(tree.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every entry.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
        debug_log!("tree cleared");
    }

    /// Returns the value stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new();
    /// tree.put(b"k", b"v");
    /// assert_eq!(tree.get(b"k"), Some(&b"v"[..]));
    /// assert_eq!(tree.get(b"missing"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.raw.get(key)
    }

    /// Returns `true` if the tree holds an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.raw.get(key).is_some()
    }

    /// Stores a copy of `key` and `value`, replacing the value of an existing entry.
    ///
    /// Returns the previous value if the key was already present; the key itself is
    /// never replaced.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new();
    /// assert_eq!(tree.put(b"k", b"old"), None);
    /// assert_eq!(tree.put(b"k", b"new"), Some(b"old".to_vec()));
    /// assert_eq!(tree.get(b"k"), Some(&b"new"[..]));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Option<Vec<u8>> {
        self.insert(key.to_vec(), value.to_vec())
    }

    /// Like [`put`](Self::put), but takes ownership of the buffers instead of copying them.
    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> Option<Vec<u8>> {
        trace_log!(key_len = key.len(), value_len = value.len(), "insert");
        self.raw.insert(key, value)
    }

    /// Removes `key` and returns its value, or `None` if the key was absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new();
    /// tree.put(b"k", b"v");
    /// assert_eq!(tree.delete(b"k"), Some(b"v".to_vec()));
    /// assert_eq!(tree.delete(b"k"), None);
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        trace_log!(key_len = key.len(), "delete");
        self.raw.remove(key)
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&[u8], &[u8])> {
        self.raw.first_key_value()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&[u8], &[u8])> {
        self.raw.last_key_value()
    }

    /// Calls `visit` on every entry in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let tree: BPlusTree = [(b"b".to_vec(), b"2".to_vec()), (b"a".to_vec(), b"1".to_vec())]
    ///     .into_iter()
    ///     .collect();
    ///
    /// let mut seen = Vec::new();
    /// tree.for_each(|key, value| seen.push((key.to_vec(), value.to_vec())));
    /// assert_eq!(seen, [(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), b"2".to_vec())]);
    /// ```
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&[u8], &[u8]),
    {
        for (key, value) in self {
            visit(key, value);
        }
    }

    /// Returns a cursor positioned before the smallest entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new();
    /// tree.put(b"a", b"1");
    ///
    /// let mut cursor = tree.cursor();
    /// assert!(cursor.has_next());
    /// assert_eq!(cursor.next_entry(), (&b"a"[..], &b"1"[..]));
    /// assert!(!cursor.has_next());
    /// ```
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            tree: &self.raw,
            leaf: self.raw.first_leaf(),
            index: 0,
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; O(1) per step along the leaf chain.
    pub fn iter(&self) -> Iter<'_> {
        Iter { cursor: self.cursor() }
    }
}

impl Default for BPlusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BPlusTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Extend<(Vec<u8>, Vec<u8>)> for BPlusTree {
    fn extend<T: IntoIterator<Item = (Vec<u8>, Vec<u8>)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(Vec<u8>, Vec<u8>)> for BPlusTree {
    fn from_iter<T: IntoIterator<Item = (Vec<u8>, Vec<u8>)>>(iter: T) -> Self {
        let mut tree = BPlusTree::new();
        tree.extend(iter);
        tree
    }
}

impl<'a> IntoIterator for &'a BPlusTree {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// A forward-only position in the leaf chain of a [`BPlusTree`].
///
/// Created by [`BPlusTree::cursor`]. Unlike [`Iter`], stepping past the last entry is a
/// programmer error and panics.
#[derive(Clone)]
pub struct Cursor<'a> {
    tree: &'a RawBPlusTree,
    leaf: Option<NodeId>,
    index: usize,
    remaining: usize,
}

impl<'a> Cursor<'a> {
    /// Returns `true` if [`next_entry`](Self::next_entry) has an entry to yield.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.remaining > 0
    }

    /// Yields the current entry and advances, following the leaf chain when the
    /// current leaf is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if [`has_next`](Self::has_next) is `false`.
    pub fn next_entry(&mut self) -> (&'a [u8], &'a [u8]) {
        let Some(id) = self.leaf.filter(|_| self.remaining > 0) else {
            panic!("cursor advanced past the last entry");
        };

        let tree = self.tree;
        let leaf = tree.node(id).as_leaf();
        let entry = (leaf.key(self.index), leaf.value(self.index));

        self.remaining -= 1;
        self.index += 1;
        if self.index >= leaf.key_count() {
            self.leaf = leaf.next();
            self.index = 0;
        }

        entry
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("remaining", &self.remaining).finish()
    }
}

/// An iterator over the entries of a [`BPlusTree`], in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`].
///
/// # Examples
///
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut tree = BPlusTree::new();
/// tree.put(b"b", b"2");
/// tree.put(b"a", b"1");
///
/// let mut iter = tree.iter();
/// assert_eq!(iter.len(), 2);
/// assert_eq!(iter.next(), Some((&b"a"[..], &b"1"[..])));
/// assert_eq!(iter.next(), Some((&b"b"[..], &b"2"[..])));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: BPlusTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone)]
pub struct Iter<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.has_next().then(|| self.cursor.next_entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {
    fn len(&self) -> usize {
        self.cursor.remaining
    }
}

impl FusedIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.cursor.remaining).finish()
    }
}
