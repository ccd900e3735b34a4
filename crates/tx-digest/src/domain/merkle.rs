//! # Merkle Tree
//!
//! Binary hash tree shared by the group trees and the top-level transaction
//! tree.
//!
//! ALGORITHM: leaves are paired left-to-right and each parent is
//! `H(left || right)`. When a level has an odd number of nodes, the last node
//! is paired with itself. This happens at every level of the reduction, not
//! only at the leaves, and proof generation and verification follow the same
//! rule: a duplicated node is its own right-hand sibling.
//!
//! ```text
//!            root
//!          /      \
//!      H(ab)      H(cc)        <- c duplicated at level 1
//!      /  \       /  \
//!     a    b     c   (c)       <- 3 leaves
//! ```
//!
//! A tree with no leaves has root [`ZERO_HASH`]. A tree with one leaf has
//! that leaf as its root and a proof path of length zero.

use serde::{Deserialize, Serialize};
use shared_crypto::{Hash, HashAlgorithm};

use super::errors::ProofError;
use super::value_objects::ZERO_HASH;

/// Position of a sibling relative to the node being folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPosition {
    Left,
    Right,
}

impl SiblingPosition {
    /// Side of the sibling of the node at `index` within its level.
    fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// A single node in an authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// The sibling hash at this level.
    pub hash: Hash,
    /// Position of sibling (left or right).
    pub position: SiblingPosition,
}

/// Immutable binary Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// Levels bottom-up: `levels[0]` are the leaves, the last level is the root.
    levels: Vec<Vec<Hash>>,
    root: Hash,
    algorithm: HashAlgorithm,
}

impl MerkleTree {
    /// Build a tree over `leaves`.
    ///
    /// ## Algorithm
    ///
    /// 1. Empty input: root is `ZERO_HASH`
    /// 2. Pair adjacent nodes, duplicating the last node of an odd level
    /// 3. Repeat until one node remains
    pub fn build(leaves: Vec<Hash>, algorithm: HashAlgorithm) -> Self {
        if leaves.is_empty() {
            return Self {
                levels: Vec::new(),
                root: ZERO_HASH,
                algorithm,
            };
        }

        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Hash> = level
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    algorithm.hash_pair(left, right)
                })
                .collect();
            levels.push(next);
        }

        let root = levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(ZERO_HASH);

        Self {
            levels,
            root,
            algorithm,
        }
    }

    /// Root hash.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Leaf hashes in order.
    pub fn leaves(&self) -> &[Hash] {
        self.levels.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of hashing levels above the leaves (proof path length).
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Hash algorithm the tree was built with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Authentication path for the leaf at `index`, leaf to root.
    pub fn generate_path(&self, index: usize) -> Result<Vec<ProofNode>, ProofError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(ProofError::LeafIndexOutOfRange { index, leaf_count });
        }

        let mut path = Vec::with_capacity(self.depth());
        let mut current = index;

        for level in &self.levels[..self.depth()] {
            let own = &level[current];
            let sibling = level.get(current ^ 1).unwrap_or(own);
            path.push(ProofNode {
                hash: *sibling,
                position: SiblingPosition::for_index(current),
            });
            current /= 2;
        }

        Ok(path)
    }
}

/// Expected path length for a tree of `leaf_count` leaves:
/// `ceil(log2(leaf_count))`, and zero for zero or one leaf.
pub fn expected_depth(leaf_count: usize) -> usize {
    if leaf_count <= 1 {
        0
    } else {
        (usize::BITS - (leaf_count - 1).leading_zeros()) as usize
    }
}

/// Fold `leaf` upward through `path` and return the reconstructed root.
///
/// Rejects an index outside the tree, a path whose length is not the depth
/// of a `leaf_count`-leaf tree, and side markers that contradict the bits of
/// `leaf_index` (which would let a prover move a leaf to another position).
pub fn fold_path(
    algorithm: HashAlgorithm,
    leaf: Hash,
    leaf_index: usize,
    leaf_count: usize,
    path: &[ProofNode],
) -> Result<Hash, ProofError> {
    fold(algorithm, leaf, leaf_index, leaf_count, path, false)
}

/// [`fold_path`] for trees whose leaves are pairwise distinct.
///
/// A left-hand sibling equal to the running node is rejected. Such a node
/// only arises from the duplicated last node, which is always a right-hand
/// sibling, so it marks a leaf count inflated past the real tree.
pub fn fold_distinct_path(
    algorithm: HashAlgorithm,
    leaf: Hash,
    leaf_index: usize,
    leaf_count: usize,
    path: &[ProofNode],
) -> Result<Hash, ProofError> {
    fold(algorithm, leaf, leaf_index, leaf_count, path, true)
}

fn fold(
    algorithm: HashAlgorithm,
    leaf: Hash,
    leaf_index: usize,
    leaf_count: usize,
    path: &[ProofNode],
    distinct: bool,
) -> Result<Hash, ProofError> {
    if leaf_index >= leaf_count {
        return Err(ProofError::LeafIndexOutOfRange {
            index: leaf_index,
            leaf_count,
        });
    }

    let expected = expected_depth(leaf_count);
    if path.len() != expected {
        return Err(ProofError::PathLengthMismatch {
            expected,
            actual: path.len(),
        });
    }

    let mut current = leaf;
    let mut index = leaf_index;

    for (level, node) in path.iter().enumerate() {
        if node.position != SiblingPosition::for_index(index) {
            return Err(ProofError::SideMismatch { level });
        }
        current = match node.position {
            SiblingPosition::Left if distinct && node.hash == current => {
                return Err(ProofError::DuplicatedSibling { level });
            }
            SiblingPosition::Left => algorithm.hash_pair(&node.hash, &current),
            SiblingPosition::Right => algorithm.hash_pair(&current, &node.hash),
        };
        index /= 2;
    }

    Ok(current)
}
