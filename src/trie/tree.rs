//! Merkle bit trie facade

use super::iter::{Entry, Iter};
use super::Node;
use crate::config::TrieConfig;
use crate::model::{Hash, HashAlgorithm};
use crate::{Error, Result};
use log::{debug, trace};
use std::fmt;
use std::io::{self, Write};

/// A binary trie over key bits with a Merkle root over its values
///
/// Keys are expected to share one length per trie. Re-inserting a key
/// replaces its value; nothing is ever removed.
#[derive(Clone, Debug)]
pub struct MerkleTrie {
    root: Node,
    empty: bool,
    len: usize,
    config: TrieConfig,
}

impl MerkleTrie {
    /// Create a new empty trie hashing with SHA-256
    pub fn new() -> Self {
        Self::with_config(TrieConfig::default())
    }

    /// Create a new empty trie with the given settings
    pub fn with_config(config: TrieConfig) -> Self {
        MerkleTrie {
            root: Node::placeholder(),
            empty: true,
            len: 0,
            config,
        }
    }

    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.config.algorithm
    }

    /// Insert a key-value pair, replacing the value if the key exists
    ///
    /// Fails without modifying the trie when the key is empty, differs from
    /// the configured key length, or is too short to be placed among the
    /// keys already stored.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        if let Some(expected) = self.config.key_len {
            if key.len() != expected {
                return Err(Error::KeyLengthMismatch {
                    expected,
                    actual: key.len(),
                });
            }
        }
        trace!("insert key {}", hex::encode(key));

        if self.empty {
            self.root.set_leaf(key.to_vec(), value.to_vec());
            self.empty = false;
            self.len = 1;
            return Ok(());
        }

        match self.root.insert(key.to_vec(), value.to_vec()) {
            Ok(added) => {
                if added {
                    self.len += 1;
                }
                Ok(())
            }
            Err(e) => {
                debug!("rejected insert: {}", e);
                Err(e)
            }
        }
    }

    /// Get the value stored under a key
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.root().and_then(|root| root.get(key))
    }

    /// Get the root hash
    ///
    /// An empty trie hashes to the digest of the empty input.
    pub fn root_hash(&self) -> Hash {
        match self.root() {
            Some(root) => root.hash(self.config.algorithm),
            None => self.config.algorithm.empty(),
        }
    }

    /// Deepest leaf level in bits; 0 for an empty or single-key trie
    pub fn max_depth(&self) -> usize {
        self.root().map_or(0, Node::max_depth)
    }

    /// Number of distinct keys stored
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Total number of nodes, branches included
    pub fn node_count(&self) -> usize {
        self.root().map_or(0, Node::count)
    }

    /// The root node, or `None` while the trie is empty
    pub fn root(&self) -> Option<&Node> {
        (!self.empty).then_some(&self.root)
    }

    /// Iterate over stored entries in ascending key bit order
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root())
    }

    /// Write one line per entry: branch path, key bits and hex value
    pub fn write_listing<W: Write>(&self, mut out: W) -> io::Result<()> {
        for entry in self.iter() {
            writeln!(out, "{}", entry)?;
        }
        Ok(())
    }

    /// Print the listing to stdout
    pub fn print(&self) -> io::Result<()> {
        self.write_listing(io::stdout().lock())
    }
}

impl Default for MerkleTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MerkleTrie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.iter() {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MerkleTrie {
    type Item = Entry<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
