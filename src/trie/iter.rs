//! Ordered traversal of stored entries

use super::node::{format_bits, Node, NodeKind};
use std::fmt;

/// A stored key/value pair and the level of the leaf holding it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    pub level: usize,
    pub key: &'a [u8],
    pub value: &'a [u8],
}

impl Entry<'_> {
    /// Branch bits taken from the root to reach this leaf
    ///
    /// A leaf's path spells the leading bits of its key.
    pub fn path(&self) -> String {
        let mut bits = format_bits(self.key);
        bits.truncate(self.level);
        bits
    }
}

/// One listing line: `<path bits> <key bits> <value hex>`, values as lowercase hex
impl fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.path(),
            format_bits(self.key),
            hex::encode(self.value)
        )
    }
}

/// Depth-first iterator over leaves, left before right
///
/// Yields keys in ascending bit order.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: Option<&'a Node>) -> Self {
        Iter {
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.kind() {
                NodeKind::Leaf { key, value } => {
                    return Some(Entry {
                        level: node.level(),
                        key,
                        value,
                    })
                }
                NodeKind::Internal { left, right } => {
                    self.stack.extend(right.as_deref());
                    self.stack.extend(left.as_deref());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_path_is_key_prefix() {
        let entry = Entry {
            level: 3,
            key: &[0b1010_0000],
            value: b"v",
        };
        assert_eq!(entry.path(), "101");
        assert_eq!(entry.to_string(), "101 10100000 76");
    }

    #[test]
    fn test_root_leaf_has_empty_path() {
        let entry = Entry {
            level: 0,
            key: &[0xff],
            value: &[],
        };
        assert_eq!(entry.to_string(), " 11111111 ");
    }

    #[test]
    fn test_iter_empty() {
        assert_eq!(Iter::new(None).count(), 0);
    }
}
