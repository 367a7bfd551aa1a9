use core::num::NonZero;

type RawNodeId = u32;

/// Non-owning reference to a node stored in the tree's [`Arena`](super::arena::Arena).
///
/// Parent back-references, child slots and leaf-chain links are all `NodeId`s, so the
/// only owner of a node is the arena itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(NonZero<RawNodeId>);

impl NodeId {
    pub(crate) const MAX: usize = (RawNodeId::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`NodeId::from_index()` - `index` > `NodeId::MAX`!");
        // `index + 1` is never zero and fits after the bound check above.
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new((index + 1) as RawNodeId) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
