//! An in-memory ordered key-value index over byte strings, built on a B+Tree.
//!
//! [`BPlusTree`] maps byte-string keys to byte-string values, ordered lexicographically by
//! key bytes. All entries live in leaves that are linked left to right, so ordered scans
//! follow the leaf chain instead of re-descending the tree:
//!
//! - [`put`](BPlusTree::put) / [`insert`](BPlusTree::insert) - Insert or override an entry
//! - [`get`](BPlusTree::get) - Point lookup
//! - [`delete`](BPlusTree::delete) - Remove an entry, rebalancing by borrow or merge
//! - [`for_each`](BPlusTree::for_each), [`iter`](BPlusTree::iter) and
//!   [`cursor`](BPlusTree::cursor) - Ascending traversal along the leaf chain
//!
//! # Example
//!
//! ```
//! use bplus_index::BPlusTree;
//!
//! let mut index = BPlusTree::with_order(3)?;
//! index.put(b"banana", b"yellow");
//! index.put(b"apple", b"red");
//! index.put(b"cherry", b"dark red");
//!
//! assert_eq!(index.get(b"apple"), Some(&b"red"[..]));
//! assert_eq!(index.len(), 3);
//!
//! let mut cursor = index.cursor();
//! while cursor.has_next() {
//!     let (key, value) = cursor.next_entry();
//!     assert!(!key.is_empty() && !value.is_empty());
//! }
//!
//! assert_eq!(index.delete(b"banana"), Some(b"yellow".to_vec()));
//! assert!(!index.contains_key(b"banana"));
//! # Ok::<(), bplus_index::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable fan-out** - Any branching order from [`MIN_ORDER`] up, see [`Options`]
//! - **Arena storage** - Nodes refer to parents, children and leaf siblings by index, so
//!   the tree needs no reference counting and no `unsafe`
//! - **`tracing`** (cargo feature) - Structural events such as splits, merges and root
//!   changes are emitted through the `tracing` crate; without the feature logging compiles
//!   away
//!
//! # Implementation
//!
//! Every node holds at most `order - 1` keys, and every node except the root at least
//! `ceil(order / 2) - 1`. Inserting into a full leaf splits it and pushes a separator
//! into the parent, which may split in turn up to a new root. Deleting below the minimum
//! borrows an entry from a sibling that can spare one, or else merges with a sibling and
//! removes their separator from the parent, which may underflow in turn up to the root.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod bplus_tree;
mod error;
mod options;
mod raw;
mod tracing_helpers;

pub use bplus_tree::{BPlusTree, Cursor, Iter};
pub use error::{Error, Result};
pub use options::{DEFAULT_ORDER, MIN_ORDER, Options};
