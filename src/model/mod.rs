//! Digest types shared by the trie and its callers

mod hash;

pub use hash::{Hash, HashAlgorithm};
