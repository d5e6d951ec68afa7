//! Binary Merkle trie keyed by raw key bits
//!
//! - Each node branches on one key bit, most significant bit of each byte
//!   first, so a leaf's path spells the leading bits of its key
//! - A leaf's digest is the hash of its value; a branch with two children
//!   hashes their digests, a branch with one child passes its digest up
//! - The root digest changes whenever any stored value changes

mod iter;
mod node;
mod tree;

pub use iter::{Entry, Iter};
pub use node::{Node, NodeKind};
pub use tree::MerkleTrie;
