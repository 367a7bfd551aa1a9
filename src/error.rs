use crate::options::MIN_ORDER;

/// Errors reported while configuring a [`BPlusTree`](crate::BPlusTree).
///
/// Looking up or deleting an absent key is not an error; those operations return
/// `None` instead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The branching order is too small to keep the tree balanced.
    #[error("branching order {order} is below the minimum of {min}")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
        /// The smallest accepted order.
        min: usize,
    },
}

impl Error {
    pub(crate) const fn invalid_order(order: usize) -> Self {
        Self::InvalidOrder { order, min: MIN_ORDER }
    }
}

/// Result alias used by the configuration entry points.
pub type Result<T, E = Error> = core::result::Result<T, E>;
