use alloc::vec::Vec;

use super::handle::NodeId;

/// Slab of tree nodes addressed by [`NodeId`].
///
/// Freed slots are recycled before the backing vector grows, so ids stay small and
/// stable for the lifetime of the node they name.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Number of live elements.
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.vacant.len())
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            let slot = &mut self.slots[id.index()];
            debug_assert!(slot.is_none(), "`Arena::alloc()` - vacant slot is occupied!");
            *slot = Some(element);
            return id;
        }

        assert!(
            self.slots.len() <= NodeId::MAX,
            "`Arena::alloc()` - arena is full ({} nodes)",
            NodeId::MAX + 1
        );
        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Some(element));
        id
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        match self.slots.get(id.index()) {
            Some(Some(element)) => element,
            _ => panic!("`Arena::get()` - `{id:?}` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        match self.slots.get_mut(id.index()) {
            Some(Some(element)) => element,
            _ => panic!("`Arena::get_mut()` - `{id:?}` is invalid!"),
        }
    }

    /// Moves an element out of the arena and recycles its id.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let Some(element) = self.slots.get_mut(id.index()).and_then(Option::take) else {
            panic!("`Arena::take()` - `{id:?}` is invalid!");
        };
        self.vacant.push(id);
        element
    }

    pub(crate) fn free(&mut self, id: NodeId) {
        drop(self.take(id));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}
