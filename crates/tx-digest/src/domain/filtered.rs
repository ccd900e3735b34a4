//! # Filtered Transactions
//!
//! Selective disclosure of a finished digest: a subset of components, each
//! with a tear-off proof against its group root, and each touched group root
//! with a proof against the transaction id.
//!
//! ```text
//!                 TransactionId
//!                 /     |      \
//!        [H(salt)]   root(g0)   root(g1)     <- GroupRootProof / SaltCommitmentProof
//!                    /    \
//!                 leaf0  leaf1               <- TearOffProof
//! ```
//!
//! ## Salt Mode
//!
//! Whether a transaction is salted shifts every group root by one top-level
//! slot. A salted filtered transaction must open the salt commitment at leaf
//! 0, and every revealed component must carry a nonce. The verifier supplies
//! the salt mode it expects alongside the id: a prover that drops the salt
//! opening can otherwise shift every group down one slot and fold each nonce
//! into the revealed bytes.
//!
//! Salted leaves are pairwise distinct, so component paths in a salted group
//! are folded with [`fold_distinct_path`](super::merkle::fold_distinct_path).
//! That keeps a prover from presenting the duplicated last leaf as an extra
//! component.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use shared_crypto::{Hash, HashAlgorithm};

use super::entities::{TransactionDigest, TransactionId};
use super::errors::{DigestError, ProofError};
use super::merkle::MerkleTree;
use super::proofs::{GroupRootProof, SaltCommitmentProof, TearOffProof};
use super::value_objects::DigestConfig;

/// One disclosed group: its root, the root's proof, and revealed components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredComponentGroup {
    pub root_proof: GroupRootProof,
    /// Revealed components in ascending index order.
    pub components: Vec<TearOffProof>,
}

impl FilteredComponentGroup {
    pub fn group_index(&self) -> u32 {
        self.root_proof.group_index
    }

    pub fn group_root(&self) -> Hash {
        self.root_proof.group_root
    }
}

/// A transaction with only some components revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredTransaction {
    pub id: TransactionId,
    /// Leaves in the top-level tree.
    pub top_leaf_count: usize,
    /// Present exactly when the transaction is salted.
    pub salt_commitment: Option<SaltCommitmentProof>,
    /// Disclosed groups in ascending index order.
    pub groups: Vec<FilteredComponentGroup>,
}

impl FilteredTransaction {
    /// Reveal every component for which `predicate(group, index, bytes)`
    /// holds. Groups without a selected component are left out.
    pub fn build<P>(digest: &TransactionDigest, predicate: P) -> Result<Self, DigestError>
    where
        P: Fn(u32, usize, &[u8]) -> bool,
    {
        let mut selection: BTreeMap<u32, BTreeSet<usize>> = BTreeMap::new();
        for group in digest.groups() {
            for (index, bytes) in group.group().components().iter().enumerate() {
                if predicate(group.group_index(), index, bytes) {
                    selection.entry(group.group_index()).or_default().insert(index);
                }
            }
        }
        Self::from_selection(digest, selection)
    }

    /// Reveal an explicit list of `(group_index, component_index)`
    /// coordinates. Repeated coordinates are revealed once.
    pub fn build_for(
        digest: &TransactionDigest,
        coordinates: &[(u32, usize)],
    ) -> Result<Self, DigestError> {
        let mut selection: BTreeMap<u32, BTreeSet<usize>> = BTreeMap::new();
        for &(group_index, component_index) in coordinates {
            selection.entry(group_index).or_default().insert(component_index);
        }
        Self::from_selection(digest, selection)
    }

    /// Reveal whole groups, including empty ones, so that the receiver can
    /// run [`check_all_components_visible`](Self::check_all_components_visible).
    pub fn build_with_groups(
        digest: &TransactionDigest,
        group_indices: &[u32],
    ) -> Result<Self, DigestError> {
        let mut selection: BTreeMap<u32, BTreeSet<usize>> = BTreeMap::new();
        for &group_index in group_indices {
            let group = digest
                .group(group_index)
                .ok_or(ProofError::UnknownGroup { group_index })?;
            selection
                .entry(group_index)
                .or_default()
                .extend(0..group.group().len());
        }
        Self::from_selection(digest, selection)
    }

    fn from_selection(
        digest: &TransactionDigest,
        selection: BTreeMap<u32, BTreeSet<usize>>,
    ) -> Result<Self, DigestError> {
        let mut groups = Vec::with_capacity(selection.len());
        for (group_index, indices) in selection {
            let root_proof = digest.prove_group_root(group_index)?;
            let components = indices
                .into_iter()
                .map(|index| digest.tear_off(group_index, index))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(FilteredComponentGroup {
                root_proof,
                components,
            });
        }

        Ok(Self {
            id: digest.id(),
            top_leaf_count: digest.top_tree().leaf_count(),
            salt_commitment: digest.prove_salt_commitment()?,
            groups,
        })
    }

    pub fn is_salted(&self) -> bool {
        self.salt_commitment.is_some()
    }

    pub fn group(&self, group_index: u32) -> Option<&FilteredComponentGroup> {
        self.groups.iter().find(|g| g.group_index() == group_index)
    }

    /// Revealed components as `(group_index, component_index, bytes)`.
    pub fn revealed_components(&self) -> impl Iterator<Item = (u32, usize, &[u8])> + '_ {
        self.groups.iter().flat_map(|group| {
            group
                .components
                .iter()
                .map(|proof| (proof.group_index, proof.leaf_index, proof.leaf_content.as_slice()))
        })
    }

    /// Check every proof against `expected_id`.
    ///
    /// ## Checks
    ///
    /// 1. The carried id is `expected_id`
    /// 2. The salt opening is present exactly when `expected_salted`, salt
    ///    mode is allowed by `config` and, if salted, the commitment opens at
    ///    top-level leaf 0
    /// 3. Each group appears once, sits at its own top-level slot and its
    ///    root proves against the id
    /// 4. Each component belongs to its group, appears once, carries a nonce
    ///    exactly when salted and proves against the group root
    pub fn verify(
        &self,
        expected_id: &TransactionId,
        expected_salted: bool,
        config: &DigestConfig,
    ) -> Result<(), ProofError> {
        let algorithm = config.hash_algorithm;

        if self.id != *expected_id {
            return Err(ProofError::RootMismatch {
                expected: *expected_id.as_bytes(),
                actual: *self.id.as_bytes(),
            });
        }

        let salted = self.is_salted();
        if salted != expected_salted || (config.require_privacy_salt && !salted) {
            return Err(ProofError::SaltCommitmentMismatch);
        }
        if let Some(opening) = &self.salt_commitment {
            self.check_leaf_count(opening.leaf_count)?;
            opening.ensure_valid(algorithm, expected_id)?;
        }

        let offset = usize::from(salted);
        let mut seen = HashSet::with_capacity(self.groups.len());

        for group in &self.groups {
            let group_index = group.group_index();
            if !seen.insert(group_index) {
                return Err(ProofError::DuplicateGroup { group_index });
            }

            let root_proof = &group.root_proof;
            self.check_leaf_count(root_proof.leaf_count)?;
            if root_proof.leaf_index != group_index as usize + offset {
                return Err(ProofError::GroupPositionMismatch {
                    group_index,
                    leaf_index: root_proof.leaf_index,
                });
            }
            root_proof.ensure_valid(algorithm, expected_id)?;

            verify_components(group, salted, algorithm)?;
        }

        Ok(())
    }

    /// True only if the revealed components of `group_index` are exactly
    /// indices `0..n` and their leaves rebuild the proven group root.
    ///
    /// Call after [`verify`](Self::verify); this does not re-check the group
    /// root against the id. In an unsalted group two equal trailing
    /// components are indistinguishable from one, so `n` is only pinned down
    /// for salted groups.
    pub fn check_all_components_visible(
        &self,
        group_index: u32,
        algorithm: HashAlgorithm,
    ) -> Result<bool, ProofError> {
        let group = self
            .group(group_index)
            .ok_or(ProofError::UnknownGroup { group_index })?;

        let count = group.components.len();
        let contiguous = group
            .components
            .iter()
            .enumerate()
            .all(|(position, proof)| proof.leaf_index == position && proof.leaf_count == count);
        if !contiguous {
            return Ok(false);
        }
        for proof in &group.components {
            if !proof.verify(algorithm, &group.group_root())? {
                return Ok(false);
            }
        }

        let leaves = group
            .components
            .iter()
            .map(|proof| proof.leaf_hash(algorithm))
            .collect();
        let rebuilt = MerkleTree::build(leaves, algorithm);
        Ok(rebuilt.root() == group.group_root())
    }

    fn check_leaf_count(&self, actual: usize) -> Result<(), ProofError> {
        if actual != self.top_leaf_count {
            return Err(ProofError::LeafCountMismatch {
                expected: self.top_leaf_count,
                actual,
            });
        }
        Ok(())
    }
}

fn verify_components(
    group: &FilteredComponentGroup,
    salted: bool,
    algorithm: HashAlgorithm,
) -> Result<(), ProofError> {
    let group_index = group.group_index();
    let group_root = group.group_root();
    let leaf_count = group.components.first().map(|proof| proof.leaf_count);
    let mut seen = HashSet::with_capacity(group.components.len());

    for proof in &group.components {
        if proof.group_index != group_index {
            return Err(ProofError::ComponentGroupMismatch {
                expected: group_index,
                found: proof.group_index,
            });
        }
        if !seen.insert(proof.leaf_index) {
            return Err(ProofError::DuplicateComponent {
                group_index,
                component_index: proof.leaf_index,
            });
        }
        if let Some(expected) = leaf_count.filter(|count| *count != proof.leaf_count) {
            return Err(ProofError::LeafCountMismatch {
                expected,
                actual: proof.leaf_count,
            });
        }
        if proof.nonce.is_some() != salted {
            return Err(ProofError::NoncePresenceMismatch { group_index });
        }
        proof.ensure_valid(algorithm, &group_root)?;
    }

    Ok(())
}
