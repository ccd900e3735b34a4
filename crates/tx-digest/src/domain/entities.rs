//! # Domain Entities
//!
//! Component groups, per-group digests and the transaction digest.
//!
//! ```text
//! components ──leaf/nonce──→ GroupDigest (one per group, independent)
//!                                 │ group roots, ordered by group index
//!                                 ↓
//!            [H(salt)] ++ roots ──→ top-level tree ──→ TransactionId
//! ```
//!
//! Every entity is computed once from an immutable snapshot of its inputs.
//! There are no setters; a changed component means a new digest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared_crypto::{hash_from_hex, CryptoError, Hash, HashAlgorithm};
use tracing::debug;

use super::errors::{DigestError, ProofError, ValidationError};
use super::merkle::MerkleTree;
use super::parallel::build_group_digests;
use super::proofs::{GroupRootProof, SaltCommitmentProof, TearOffProof};
use super::salt::{component_leaf, PrivacySalt};
use super::value_objects::DigestConfig;

/// Well-known semantic roles of component groups and their stable indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ComponentGroupKind {
    Inputs = 0,
    Outputs = 1,
    Commands = 2,
    Attachments = 3,
    Notary = 4,
    TimeWindow = 5,
    Signers = 6,
    References = 7,
    Parameters = 8,
}

impl ComponentGroupKind {
    /// All well-known kinds in index order.
    pub const ALL: [ComponentGroupKind; 9] = [
        Self::Inputs,
        Self::Outputs,
        Self::Commands,
        Self::Attachments,
        Self::Notary,
        Self::TimeWindow,
        Self::Signers,
        Self::References,
        Self::Parameters,
    ];

    /// Stable group index.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Kind for a well-known index.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Ordered opaque components sharing one semantic role.
///
/// Position within the group is meaningful ("input #2").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentGroup {
    group_index: u32,
    components: Vec<Vec<u8>>,
}

impl ComponentGroup {
    /// Group at an explicit index.
    pub fn new(group_index: u32, components: Vec<Vec<u8>>) -> Self {
        Self {
            group_index,
            components,
        }
    }

    /// Group for a well-known role.
    pub fn of_kind(kind: ComponentGroupKind, components: Vec<Vec<u8>>) -> Self {
        Self::new(kind.index(), components)
    }

    /// Group with no components. It still occupies its index slot.
    pub fn empty(group_index: u32) -> Self {
        Self::new(group_index, Vec::new())
    }

    pub fn group_index(&self) -> u32 {
        self.group_index
    }

    pub fn kind(&self) -> Option<ComponentGroupKind> {
        ComponentGroupKind::from_index(self.group_index)
    }

    pub fn components(&self) -> &[Vec<u8>] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Transaction identifier: the top-level Merkle root.
///
/// Raw bytes internally; upper-case hex only at boundaries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(Hash);

impl TransactionId {
    pub const fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

impl FromStr for TransactionId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hash_from_hex(s).map(Self)
    }
}

impl From<Hash> for TransactionId {
    fn from(bytes: Hash) -> Self {
        Self(bytes)
    }
}

/// Merkle tree over one group's component leaves.
#[derive(Debug, Clone)]
pub struct GroupDigest {
    group: ComponentGroup,
    tree: MerkleTree,
}

impl GroupDigest {
    /// Hash every component of `group` and reduce the leaves to a root.
    ///
    /// Zero components give root [`ZERO_HASH`](super::ZERO_HASH).
    ///
    /// ## Errors
    ///
    /// - `TooManyComponents` above `max_components_per_group`
    /// - `EmptyComponent` for zero-length bytes unless `allow_empty_components`
    pub fn build(
        group: ComponentGroup,
        salt: Option<&PrivacySalt>,
        config: &DigestConfig,
    ) -> Result<Self, ValidationError> {
        let group_index = group.group_index;
        let count = group.components.len();

        if count > config.max_components_per_group {
            return Err(ValidationError::TooManyComponents {
                group_index,
                count,
                max: config.max_components_per_group,
            });
        }

        let mut leaves = Vec::with_capacity(count);
        for (component_index, bytes) in group.components.iter().enumerate() {
            if bytes.is_empty() && !config.allow_empty_components {
                return Err(ValidationError::EmptyComponent {
                    group_index,
                    component_index,
                });
            }
            let position = to_u32(component_index)?;
            leaves.push(component_leaf(
                config.hash_algorithm,
                salt,
                group_index,
                position,
                bytes,
            ));
        }

        let tree = MerkleTree::build(leaves, config.hash_algorithm);
        Ok(Self { group, tree })
    }

    pub fn group_index(&self) -> u32 {
        self.group.group_index
    }

    pub fn group(&self) -> &ComponentGroup {
        &self.group
    }

    /// Group root, or `ZERO_HASH` for an empty group.
    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn leaf_hashes(&self) -> &[Hash] {
        self.tree.leaves()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Tear-off proof for one component against this group's root.
    ///
    /// The proof carries the component bytes and, for a salted transaction,
    /// its nonce, but never the salt itself.
    pub fn tear_off(
        &self,
        component_index: usize,
        salt: Option<&PrivacySalt>,
    ) -> Result<TearOffProof, DigestError> {
        let path = self.tree.generate_path(component_index)?;
        let position = to_u32(component_index)?;
        let algorithm = self.tree.algorithm();

        Ok(TearOffProof {
            group_index: self.group.group_index,
            leaf_index: component_index,
            leaf_count: self.tree.leaf_count(),
            leaf_content: self.group.components[component_index].clone(),
            nonce: salt.map(|s| s.nonce(algorithm, self.group.group_index, position)),
            path,
        })
    }
}

/// Finished digest of a whole transaction.
///
/// Holds the component snapshot, the salt, every group tree and the
/// top-level tree, so that any tear-off can be produced later without
/// recomputation.
#[derive(Debug, Clone)]
pub struct TransactionDigest {
    id: TransactionId,
    salt: Option<PrivacySalt>,
    groups: Vec<GroupDigest>,
    top: MerkleTree,
}

impl TransactionDigest {
    /// Compute the digest of `groups` under `salt`.
    ///
    /// Groups may be supplied in any order; they are positioned by their
    /// group index, which must be unique and contiguous from zero.
    ///
    /// ## Algorithm
    ///
    /// 1. Validate configuration, salt policy and group indices
    /// 2. Build each group tree (in parallel above `parallel_threshold`)
    /// 3. Leaves = `[H(salt)] ++ group roots`, reduce to the transaction id
    pub fn build(
        groups: Vec<ComponentGroup>,
        salt: Option<PrivacySalt>,
        config: &DigestConfig,
    ) -> Result<Self, DigestError> {
        config.validate()?;
        if salt.is_none() && config.require_privacy_salt {
            return Err(ValidationError::MissingSalt.into());
        }

        let ordered = order_groups(groups, config.max_groups)?;
        let group_digests = build_group_digests(ordered, salt.as_ref(), config)?;

        let salt_commitment = salt.as_ref().map(|s| s.commitment(config.hash_algorithm));
        let roots: Vec<Hash> = group_digests.iter().map(GroupDigest::root).collect();
        let top = top_level_tree(config.hash_algorithm, salt_commitment, &roots);
        let id = TransactionId(top.root());

        debug!(
            id = %id,
            groups = group_digests.len(),
            salted = salt.is_some(),
            algorithm = %config.hash_algorithm,
            "computed transaction digest"
        );

        Ok(Self {
            id,
            salt,
            groups: group_digests,
            top,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.top.algorithm()
    }

    pub fn is_salted(&self) -> bool {
        self.salt.is_some()
    }

    /// `H(salt)`, the first top-level leaf of a salted transaction.
    pub fn salt_commitment(&self) -> Option<Hash> {
        self.salt.as_ref().map(|s| s.commitment(self.algorithm()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[GroupDigest] {
        &self.groups
    }

    pub fn group(&self, group_index: u32) -> Option<&GroupDigest> {
        self.groups.get(group_index as usize)
    }

    /// Group roots ordered by group index.
    pub fn group_roots(&self) -> Vec<Hash> {
        self.groups.iter().map(GroupDigest::root).collect()
    }

    /// The top-level tree whose root is the id.
    pub fn top_tree(&self) -> &MerkleTree {
        &self.top
    }

    /// Tear-off proof for one component against its group root.
    pub fn tear_off(
        &self,
        group_index: u32,
        component_index: usize,
    ) -> Result<TearOffProof, DigestError> {
        let group = self
            .group(group_index)
            .ok_or(ProofError::UnknownGroup { group_index })?;
        group.tear_off(component_index, self.salt.as_ref())
    }

    /// Proof that a group root is part of the transaction id.
    pub fn prove_group_root(&self, group_index: u32) -> Result<GroupRootProof, ProofError> {
        let roots = self.group_roots();
        group_root_proof(&self.top, self.salt.is_some(), &roots, group_index)
    }

    /// Opening of the salt commitment leaf, if the transaction is salted.
    pub fn prove_salt_commitment(&self) -> Result<Option<SaltCommitmentProof>, ProofError> {
        salt_commitment_proof(&self.top, self.salt_commitment())
    }

    /// Storable digest state without component bytes or the salt.
    pub fn to_persisted(&self) -> PersistedDigest {
        PersistedDigest {
            id: self.id,
            algorithm: self.algorithm(),
            salt_commitment: self.salt_commitment(),
            group_roots: self.group_roots(),
        }
    }
}

/// Digest state that can be stored independently of component bytes.
///
/// Enough to re-derive the transaction id and to prove any group root,
/// but not to produce component tear-offs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDigest {
    pub id: TransactionId,
    pub algorithm: HashAlgorithm,
    pub salt_commitment: Option<Hash>,
    pub group_roots: Vec<Hash>,
}

impl PersistedDigest {
    /// Rebuild from group roots and an optional salt commitment.
    pub fn from_parts(
        algorithm: HashAlgorithm,
        salt_commitment: Option<Hash>,
        group_roots: Vec<Hash>,
    ) -> Self {
        let top = top_level_tree(algorithm, salt_commitment, &group_roots);
        Self {
            id: TransactionId(top.root()),
            algorithm,
            salt_commitment,
            group_roots,
        }
    }

    /// Recompute the id from the stored parts.
    pub fn recompute_id(&self) -> TransactionId {
        TransactionId(self.top_tree().root())
    }

    /// Proof that a stored group root is part of the transaction id.
    pub fn prove_group_root(&self, group_index: u32) -> Result<GroupRootProof, ProofError> {
        group_root_proof(
            &self.top_tree(),
            self.salt_commitment.is_some(),
            &self.group_roots,
            group_index,
        )
    }

    /// Opening of the salt commitment leaf, if the transaction is salted.
    pub fn prove_salt_commitment(&self) -> Result<Option<SaltCommitmentProof>, ProofError> {
        salt_commitment_proof(&self.top_tree(), self.salt_commitment)
    }

    fn top_tree(&self) -> MerkleTree {
        top_level_tree(self.algorithm, self.salt_commitment, &self.group_roots)
    }
}

/// Sort groups by index and check indices are unique and contiguous from 0.
fn order_groups(
    mut groups: Vec<ComponentGroup>,
    max_groups: usize,
) -> Result<Vec<ComponentGroup>, ValidationError> {
    if groups.len() > max_groups {
        return Err(ValidationError::TooManyGroups {
            count: groups.len(),
            max: max_groups,
        });
    }

    groups.sort_by_key(ComponentGroup::group_index);

    for (position, group) in groups.iter().enumerate() {
        let expected = to_u32(position)?;
        match group.group_index.cmp(&expected) {
            std::cmp::Ordering::Equal => {}
            // sorted, so a smaller index means the previous slot repeats it
            std::cmp::Ordering::Less => {
                return Err(ValidationError::DuplicateGroupIndex {
                    group_index: group.group_index,
                })
            }
            std::cmp::Ordering::Greater => {
                return Err(ValidationError::GroupIndexGap {
                    expected,
                    found: group.group_index,
                })
            }
        }
    }

    Ok(groups)
}

fn top_level_tree(
    algorithm: HashAlgorithm,
    salt_commitment: Option<Hash>,
    group_roots: &[Hash],
) -> MerkleTree {
    let mut leaves = Vec::with_capacity(group_roots.len() + 1);
    leaves.extend(salt_commitment);
    leaves.extend_from_slice(group_roots);
    MerkleTree::build(leaves, algorithm)
}

fn group_root_proof(
    top: &MerkleTree,
    salted: bool,
    group_roots: &[Hash],
    group_index: u32,
) -> Result<GroupRootProof, ProofError> {
    let group_root = *group_roots
        .get(group_index as usize)
        .ok_or(ProofError::UnknownGroup { group_index })?;
    let leaf_index = group_index as usize + usize::from(salted);

    Ok(GroupRootProof {
        group_index,
        group_root,
        leaf_index,
        leaf_count: top.leaf_count(),
        path: top.generate_path(leaf_index)?,
    })
}

fn salt_commitment_proof(
    top: &MerkleTree,
    salt_commitment: Option<Hash>,
) -> Result<Option<SaltCommitmentProof>, ProofError> {
    salt_commitment
        .map(|commitment| {
            Ok(SaltCommitmentProof {
                commitment,
                leaf_count: top.leaf_count(),
                path: top.generate_path(0)?,
            })
        })
        .transpose()
}

fn to_u32(index: usize) -> Result<u32, ValidationError> {
    u32::try_from(index).map_err(|_| ValidationError::IndexOverflow { index })
}
