//! # bitmerkle
//!
//! A binary prefix tree over the raw bits of fixed-length keys, with a
//! bottom-up Merkle digest of every stored value.
//!
//! Any change to a stored value changes the root hash, and the root hash
//! can be recomputed deterministically from the tree shape and the values.
//!
//! ## Example
//!
//! ```
//! use bitmerkle::MerkleTrie;
//!
//! let mut trie = MerkleTrie::new();
//! trie.insert(&[0x00, 0x01], b"one")?;
//! trie.insert(&[0x80, 0x00], b"two")?;
//!
//! assert_eq!(trie.max_depth(), 1);
//! println!("root: {}", trie.root_hash());
//! # Ok::<(), bitmerkle::Error>(())
//! ```

pub mod config;
pub mod model;
pub mod shared;
pub mod trie;

mod error;

pub use config::TrieConfig;
pub use error::{Error, Result};
pub use model::{Hash, HashAlgorithm};
pub use shared::SharedTrie;
pub use trie::{Entry, MerkleTrie, Node, NodeKind};
