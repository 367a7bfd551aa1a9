use crate::error::{Error, Result};

/// Branching order used when none is configured.
pub const DEFAULT_ORDER: usize = 4;

/// Smallest branching order that still allows splits and merges.
pub const MIN_ORDER: usize = 3;

/// Construction-time settings for a [`BPlusTree`](crate::BPlusTree).
///
/// The only knob is the branching order: the maximum number of children of an internal
/// node. Every node then holds at most `order - 1` keys and, unless it is the root, at
/// least `ceil(order / 2) - 1`.
///
/// # Examples
///
/// ```
/// use bplus_index::{BPlusTree, Options};
///
/// let tree = BPlusTree::with_options(Options::new().order(16)).unwrap();
/// assert_eq!(tree.order(), 16);
///
/// assert!(BPlusTree::with_options(Options::new().order(2)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Options {
    order: usize,
}

impl Options {
    /// Options with the [`DEFAULT_ORDER`].
    #[must_use]
    pub const fn new() -> Self {
        Self { order: DEFAULT_ORDER }
    }

    /// Sets the branching order. It is checked when the tree is built.
    #[must_use]
    pub const fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// The configured branching order.
    #[must_use]
    pub const fn get_order(&self) -> usize {
        self.order
    }

    /// Checks the options and derives the node occupancy bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if the order is below [`MIN_ORDER`].
    pub(crate) const fn validate(self) -> Result<Fanout> {
        if self.order < MIN_ORDER {
            return Err(Error::invalid_order(self.order));
        }
        Ok(Fanout {
            order: self.order,
            max_keys: self.order - 1,
            min_keys: self.order.div_ceil(2) - 1,
        })
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

/// Occupancy bounds derived from a validated order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Fanout {
    order: usize,
    max_keys: usize,
    min_keys: usize,
}

impl Fanout {
    pub(crate) const fn order(self) -> usize {
        self.order
    }

    /// Capacity of every node, leaf or internal.
    pub(crate) const fn max_keys(self) -> usize {
        self.max_keys
    }

    /// Fewest keys a non-root node may hold.
    pub(crate) const fn min_keys(self) -> usize {
        self.min_keys
    }
}

impl Default for Fanout {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            max_keys: DEFAULT_ORDER - 1,
            min_keys: DEFAULT_ORDER.div_ceil(2) - 1,
        }
    }
}
