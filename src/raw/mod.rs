mod arena;
mod handle;
mod node;
mod raw_tree;
mod slots;

pub(crate) use handle::NodeId;
pub(crate) use raw_tree::RawBPlusTree;
