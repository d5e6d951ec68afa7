//! Trie node types
//!
//! Nodes are addressed by bit position: a node at `level` branches on bit
//! `level % 8` (most significant first) of key byte `level / 8`. All walks
//! below are iterative, so their stack use does not grow with key length.

use crate::model::{Hash, HashAlgorithm};
use crate::{Error, Result};
use log::debug;
use std::fmt;

/// What a node holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A stored key and its value
    Leaf { key: Vec<u8>, value: Vec<u8> },
    /// A branch on one key bit: clear goes left, set goes right
    Internal {
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
}

impl NodeKind {
    fn branch() -> Self {
        NodeKind::Internal {
            left: None,
            right: None,
        }
    }

    /// Build the subtree that replaces a leaf at `level` once a second key
    /// lands on it: single-child branches along the shared bits, then a
    /// branch at `split_at` holding both leaves.
    fn split(
        level: usize,
        split_at: usize,
        (old_key, old_value): (Vec<u8>, Vec<u8>),
        (new_key, new_value): (Vec<u8>, Vec<u8>),
    ) -> Self {
        let shared: Vec<bool> = (level..split_at)
            .map(|l| branch_bit(&new_key, l) == Some(true))
            .collect();
        let new_goes_right = branch_bit(&new_key, split_at) == Some(true);

        let old_leaf = Box::new(Node::leaf(split_at + 1, old_key, old_value));
        let new_leaf = Box::new(Node::leaf(split_at + 1, new_key, new_value));
        let (left, right) = if new_goes_right {
            (old_leaf, new_leaf)
        } else {
            (new_leaf, old_leaf)
        };

        let mut kind = NodeKind::Internal {
            left: Some(left),
            right: Some(right),
        };
        for (l, goes_right) in (level..split_at).zip(shared).rev() {
            let child = Some(Box::new(Node {
                level: l + 1,
                kind,
            }));
            kind = if goes_right {
                NodeKind::Internal { left: None, right: child }
            } else {
                NodeKind::Internal { left: child, right: None }
            };
        }
        kind
    }
}

/// A node in the bit trie
pub struct Node {
    level: usize,
    kind: NodeKind,
}

impl Node {
    /// The childless root of an empty trie
    pub(crate) fn placeholder() -> Self {
        Node {
            level: 0,
            kind: NodeKind::branch(),
        }
    }

    pub(crate) fn leaf(level: usize, key: Vec<u8>, value: Vec<u8>) -> Self {
        Node {
            level,
            kind: NodeKind::Leaf { key, value },
        }
    }

    /// Bit depth from the root
    pub fn level(&self) -> usize {
        self.level
    }

    /// Key byte this node branches on
    pub fn byte_index(&self) -> usize {
        self.level / 8
    }

    /// Bit within [`byte_index`](Self::byte_index) this node branches on
    pub fn bit_mask(&self) -> u8 {
        1 << (7 - (self.level % 8))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn key(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::Leaf { key, .. } => Some(key),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::Leaf { value, .. } => Some(value),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn left(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Internal { left, .. } => left.as_deref(),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Internal { right, .. } => right.as_deref(),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Turn this node into a leaf holding `key`, dropping whatever it held
    pub(crate) fn set_leaf(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.kind = NodeKind::Leaf { key, value };
    }

    /// Insert below this node, returning whether the key is new
    ///
    /// Every length check happens before the first mutation, so on error
    /// the subtree is untouched.
    pub(crate) fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<bool> {
        let mut node = self;
        loop {
            let level = node.level;
            let kind = &mut node.kind;
            let slot = match kind {
                NodeKind::Leaf {
                    key: stored_key,
                    value: stored_value,
                } => {
                    if *stored_key == key {
                        *stored_value = value;
                        return Ok(false);
                    }
                    let split_at = divergence(stored_key, &key, level)?;
                    debug!(
                        "demoting leaf at level {} to a branch splitting at level {}",
                        level, split_at
                    );
                    let old = (std::mem::take(stored_key), std::mem::take(stored_value));
                    *kind = NodeKind::split(level, split_at, old, (key, value));
                    return Ok(true);
                }
                NodeKind::Internal { left, right } => {
                    let goes_right =
                        branch_bit(&key, level).ok_or(Error::InvalidKeyLength {
                            byte_index: level / 8,
                            len: key.len(),
                        })?;
                    if goes_right {
                        right
                    } else {
                        left
                    }
                }
            };
            match slot {
                Some(child) => node = &mut **child,
                None => {
                    *slot = Some(Box::new(Node::leaf(level + 1, key, value)));
                    return Ok(true);
                }
            }
        }
    }

    /// Value stored under `key` in this subtree
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let mut node = self;
        loop {
            match &node.kind {
                NodeKind::Leaf {
                    key: stored_key,
                    value,
                } => return (stored_key.as_slice() == key).then_some(value.as_slice()),
                NodeKind::Internal { left, right } => {
                    let child = if branch_bit(key, node.level)? {
                        right
                    } else {
                        left
                    };
                    node = child.as_deref()?;
                }
            }
        }
    }

    /// Merkle digest of this subtree
    ///
    /// Leaves hash their value only. A branch with two children hashes the
    /// concatenation of their digests, left first; a branch with one child
    /// passes that child's digest through unchanged.
    pub fn hash(&self, algorithm: HashAlgorithm) -> Hash {
        enum Step<'a> {
            Visit(&'a Node),
            Join,
        }

        let mut steps = vec![Step::Visit(self)];
        let mut digests: Vec<Hash> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(node) => match &node.kind {
                    NodeKind::Leaf { value, .. } => digests.push(algorithm.digest(value)),
                    NodeKind::Internal {
                        left: Some(left),
                        right: Some(right),
                    } => {
                        steps.push(Step::Join);
                        steps.push(Step::Visit(right));
                        steps.push(Step::Visit(left));
                    }
                    NodeKind::Internal {
                        left: Some(only),
                        right: None,
                    }
                    | NodeKind::Internal {
                        left: None,
                        right: Some(only),
                    } => steps.push(Step::Visit(only)),
                    NodeKind::Internal {
                        left: None,
                        right: None,
                    } => digests.push(algorithm.empty()),
                },
                Step::Join => {
                    let right = digests.pop();
                    let left = digests.pop();
                    debug_assert!(
                        left.is_some() && right.is_some(),
                        "branch joined with fewer than two child digests"
                    );
                    if let (Some(left), Some(right)) = (left, right) {
                        digests.push(algorithm.digest_pair(&left, &right));
                    }
                }
            }
        }
        digests.pop().unwrap_or_else(|| algorithm.empty())
    }

    /// Deepest leaf level in this subtree; branches contribute nothing
    pub fn max_depth(&self) -> usize {
        let mut max = 0usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf { .. } => max = max.max(node.level),
                NodeKind::Internal { left, right } => {
                    stack.extend(left.as_deref());
                    stack.extend(right.as_deref());
                }
            }
        }
        max
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let NodeKind::Internal { left, right } = &node.kind {
                stack.extend(left.as_deref());
                stack.extend(right.as_deref());
            }
        }
        count
    }
}

// Clone, Drop and PartialEq walk the tree with explicit stacks; the derived
// versions recurse once per level and overflow on long shared prefixes.
// Debug prints a single node and reports children by presence only.
impl Clone for Node {
    fn clone(&self) -> Self {
        enum Step<'a> {
            Visit(&'a Node),
            Build {
                level: usize,
                left: bool,
                right: bool,
            },
        }

        let mut steps = vec![Step::Visit(self)];
        let mut built: Vec<Node> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(node) => match &node.kind {
                    NodeKind::Leaf { key, value } => {
                        built.push(Node::leaf(node.level, key.clone(), value.clone()))
                    }
                    NodeKind::Internal { left, right } => {
                        steps.push(Step::Build {
                            level: node.level,
                            left: left.is_some(),
                            right: right.is_some(),
                        });
                        steps.extend(right.as_deref().map(Step::Visit));
                        steps.extend(left.as_deref().map(Step::Visit));
                    }
                },
                Step::Build { level, left, right } => {
                    let right = if right { built.pop().map(Box::new) } else { None };
                    let left = if left { built.pop().map(Box::new) } else { None };
                    built.push(Node {
                        level,
                        kind: NodeKind::Internal { left, right },
                    });
                }
            }
        }
        built.pop().unwrap_or_else(Node::placeholder)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = Vec::new();
        if let NodeKind::Internal { left, right } = &mut self.kind {
            stack.extend(left.take());
            stack.extend(right.take());
        }
        while let Some(mut node) = stack.pop() {
            if let NodeKind::Internal { left, right } = &mut node.kind {
                stack.extend(left.take());
                stack.extend(right.take());
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];
        while let Some((a, b)) = pairs.pop() {
            if a.level != b.level {
                return false;
            }
            match (&a.kind, &b.kind) {
                (
                    NodeKind::Leaf { key, value },
                    NodeKind::Leaf {
                        key: other_key,
                        value: other_value,
                    },
                ) => {
                    if key != other_key || value != other_value {
                        return false;
                    }
                }
                (
                    NodeKind::Internal { left, right },
                    NodeKind::Internal {
                        left: other_left,
                        right: other_right,
                    },
                ) => {
                    for (x, y) in [(left, other_left), (right, other_right)] {
                        match (x.as_deref(), y.as_deref()) {
                            (Some(x), Some(y)) => pairs.push((x, y)),
                            (None, None) => {}
                            _ => return false,
                        }
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("level", &self.level);
        match &self.kind {
            NodeKind::Leaf { key, value } => s
                .field("key", &hex::encode(key))
                .field("value", &hex::encode(value)),
            NodeKind::Internal { left, right } => s
                .field("left", &left.is_some())
                .field("right", &right.is_some()),
        };
        s.finish()
    }
}

/// Direction `key` takes at `level`: `Some(true)` is right, `None` means
/// the key has no byte at that level
pub(crate) fn branch_bit(key: &[u8], level: usize) -> Option<bool> {
    key.get(level / 8)
        .map(|byte| byte & (1 << (7 - (level % 8))) != 0)
}

/// First bit at or after `from` where `stored` and `key` differ
fn divergence(stored: &[u8], key: &[u8], from: usize) -> Result<usize> {
    let start = from / 8;
    let shared = stored.len().min(key.len());
    for i in start..shared {
        let mut diff = stored[i] ^ key[i];
        if i == start {
            diff &= 0xff >> (from % 8);
        }
        if diff != 0 {
            return Ok(i * 8 + diff.leading_zeros() as usize);
        }
    }

    if key.len() < stored.len() {
        Err(Error::InvalidKeyLength {
            byte_index: key.len().max(start),
            len: key.len(),
        })
    } else {
        Err(Error::KeyLengthMismatch {
            expected: stored.len(),
            actual: key.len(),
        })
    }
}

/// Render bytes as a string of `0`/`1`, most significant bit first
pub(crate) fn format_bits(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:08b}", b)).collect()
}
