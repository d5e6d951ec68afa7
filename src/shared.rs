//! Thread-safe handle to a trie
//!
//! [`MerkleTrie`] itself has no locking. `SharedTrie` puts one behind a
//! single-writer/multi-reader lock and hands out owned snapshots, so a
//! digest over a large trie can run without holding the lock.

use crate::config::TrieConfig;
use crate::model::Hash;
use crate::trie::MerkleTrie;
use crate::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// A cloneable, lock-protected [`MerkleTrie`]
#[derive(Clone, Default)]
pub struct SharedTrie {
    inner: Arc<RwLock<MerkleTrie>>,
}

impl SharedTrie {
    pub fn new(trie: MerkleTrie) -> Self {
        SharedTrie {
            inner: Arc::new(RwLock::new(trie)),
        }
    }

    pub fn with_config(config: TrieConfig) -> Self {
        Self::new(MerkleTrie::with_config(config))
    }

    /// Insert under the write lock
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.write().insert(key, value)
    }

    /// Insert several pairs under one write lock, stopping at the first error
    ///
    /// Pairs before the failing one stay inserted.
    pub fn insert_many<'a, I>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
    {
        let mut trie = self.inner.write();
        for (key, value) in pairs {
            trie.insert(key, value)?;
        }
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().get(key).map(<[u8]>::to_vec)
    }

    pub fn root_hash(&self) -> Hash {
        self.inner.read().root_hash()
    }

    pub fn max_depth(&self) -> usize {
        self.inner.read().max_depth()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copy of the current trie, unaffected by later writes
    pub fn snapshot(&self) -> MerkleTrie {
        self.inner.read().clone()
    }

    /// Run `f` against the trie under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&MerkleTrie) -> R) -> R {
        f(&*self.inner.read())
    }
}

impl From<MerkleTrie> for SharedTrie {
    fn from(trie: MerkleTrie) -> Self {
        SharedTrie::new(trie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_snapshot_isolated_from_writes() {
        let shared = SharedTrie::default();
        shared.insert(&[0x00], b"a").unwrap();

        let snapshot = shared.snapshot();
        shared.insert(&[0x80], b"b").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(shared.len(), 2);
        assert_ne!(snapshot.root_hash(), shared.root_hash());
    }

    #[test]
    fn test_concurrent_writers_converge() {
        let shared = SharedTrie::default();
        let handles: Vec<_> = (0u8..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0u8..16 {
                        shared.insert(&[t, i], &[t, i]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut expected = MerkleTrie::new();
        for t in 0u8..4 {
            for i in 0u8..16 {
                expected.insert(&[t, i], &[t, i]).unwrap();
            }
        }
        assert_eq!(shared.len(), 64);
        assert_eq!(shared.root_hash(), expected.root_hash());
        assert_eq!(shared.max_depth(), expected.max_depth());
    }

    #[test]
    fn test_insert_many_stops_at_error() {
        let shared = SharedTrie::default();
        let pairs: [(&[u8], &[u8]); 3] = [(&[0, 0], b"a"), (&[0], b"b"), (&[1, 0], b"c")];

        assert!(shared.insert_many(pairs).is_err());
        assert_eq!(shared.len(), 1);
        assert_eq!(shared.get(&[0, 0]), Some(b"a".to_vec()));
        assert!(shared.read(|trie| trie.get(&[1, 0]).is_none()));
    }
}
