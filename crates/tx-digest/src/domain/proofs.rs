//! # Proofs
//!
//! Self-contained disclosure proofs.
//!
//! - [`TearOffProof`]: one component against its group root
//! - [`GroupRootProof`]: one group root against the transaction id
//! - [`SaltCommitmentProof`]: the `H(salt)` leaf against the transaction id
//!
//! Every proof carries the leaf count of the tree it was cut from, so the
//! verifier can check the path length against `ceil(log2(leaf_count))`
//! before folding.

use serde::{Deserialize, Serialize};
use shared_crypto::{Hash, HashAlgorithm};

use super::entities::TransactionId;
use super::errors::ProofError;
use super::merkle::{fold_distinct_path, fold_path, ProofNode};
use super::salt::{leaf_hash, PrivacySalt};

/// Disclosure of one component, provable against its group root.
///
/// Carries the revealed nonce but never the salt, so other components of
/// the transaction stay hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TearOffProof {
    pub group_index: u32,
    pub leaf_index: usize,
    /// Components in the group the proof was cut from.
    pub leaf_count: usize,
    pub leaf_content: Vec<u8>,
    /// Per-component nonce; absent for an unsalted transaction.
    pub nonce: Option<Hash>,
    /// Siblings from leaf to root.
    pub path: Vec<ProofNode>,
}

impl TearOffProof {
    /// Leaf hash of the revealed component.
    pub fn leaf_hash(&self, algorithm: HashAlgorithm) -> Hash {
        leaf_hash(algorithm, &self.leaf_content, self.nonce.as_ref())
    }

    /// Group root reconstructed from the revealed component.
    ///
    /// A proof carrying a nonce comes from a salted group, whose leaves are
    /// pairwise distinct, and is folded with [`fold_distinct_path`].
    pub fn compute_root(&self, algorithm: HashAlgorithm) -> Result<Hash, ProofError> {
        fold_component(
            algorithm,
            self.leaf_hash(algorithm),
            self.leaf_index,
            self.leaf_count,
            &self.path,
            self.nonce.is_some(),
        )
    }

    /// Check the proof against a group root.
    ///
    /// A well-formed proof for another root is `Ok(false)`.
    pub fn verify(&self, algorithm: HashAlgorithm, expected_root: &Hash) -> Result<bool, ProofError> {
        Ok(self.compute_root(algorithm)? == *expected_root)
    }

    /// Like [`verify`](Self::verify) but a mismatch is `RootMismatch`.
    pub fn ensure_valid(&self, algorithm: HashAlgorithm, expected_root: &Hash) -> Result<(), ProofError> {
        let actual = self.compute_root(algorithm)?;
        if actual != *expected_root {
            return Err(ProofError::RootMismatch {
                expected: *expected_root,
                actual,
            });
        }
        Ok(())
    }

    /// Verify as the salt holder: the revealed nonce must be the one the
    /// salt derives for this position.
    pub fn verify_with_salt(
        &self,
        algorithm: HashAlgorithm,
        salt: &PrivacySalt,
        expected_root: &Hash,
    ) -> Result<bool, ProofError> {
        let nonce = self.nonce.ok_or(ProofError::NoncePresenceMismatch {
            group_index: self.group_index,
        })?;
        let component_index =
            u32::try_from(self.leaf_index).map_err(|_| ProofError::LeafIndexOutOfRange {
                index: self.leaf_index,
                leaf_count: self.leaf_count,
            })?;
        if salt.nonce(algorithm, self.group_index, component_index) != nonce {
            return Err(ProofError::NonceMismatch {
                group_index: self.group_index,
                component_index: self.leaf_index,
            });
        }
        self.verify(algorithm, expected_root)
    }
}

/// Verify a disclosed component without building a [`TearOffProof`].
///
/// Recomputes the leaf from `leaf_content` and `nonce`, folds it through
/// `path`, and compares the result with `expected_root` bit for bit.
pub fn verify_tear_off(
    algorithm: HashAlgorithm,
    leaf_content: &[u8],
    leaf_index: usize,
    leaf_count: usize,
    path: &[ProofNode],
    expected_root: &Hash,
    nonce: Option<&Hash>,
) -> Result<bool, ProofError> {
    let leaf = leaf_hash(algorithm, leaf_content, nonce);
    let root = fold_component(algorithm, leaf, leaf_index, leaf_count, path, nonce.is_some())?;
    Ok(root == *expected_root)
}

fn fold_component(
    algorithm: HashAlgorithm,
    leaf: Hash,
    leaf_index: usize,
    leaf_count: usize,
    path: &[ProofNode],
    salted: bool,
) -> Result<Hash, ProofError> {
    if salted {
        fold_distinct_path(algorithm, leaf, leaf_index, leaf_count, path)
    } else {
        fold_path(algorithm, leaf, leaf_index, leaf_count, path)
    }
}

/// Membership of one group root in the top-level tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRootProof {
    pub group_index: u32,
    pub group_root: Hash,
    /// Top-level leaf position: `group_index`, plus one when salted.
    pub leaf_index: usize,
    /// Top-level leaf count.
    pub leaf_count: usize,
    pub path: Vec<ProofNode>,
}

impl GroupRootProof {
    /// Transaction id reconstructed from the group root.
    pub fn compute_id(&self, algorithm: HashAlgorithm) -> Result<TransactionId, ProofError> {
        fold_path(
            algorithm,
            self.group_root,
            self.leaf_index,
            self.leaf_count,
            &self.path,
        )
        .map(TransactionId::from)
    }

    pub fn verify(&self, algorithm: HashAlgorithm, id: &TransactionId) -> Result<bool, ProofError> {
        Ok(self.compute_id(algorithm)? == *id)
    }

    pub fn ensure_valid(&self, algorithm: HashAlgorithm, id: &TransactionId) -> Result<(), ProofError> {
        let actual = self.compute_id(algorithm)?;
        if actual != *id {
            return Err(ProofError::RootMismatch {
                expected: *id.as_bytes(),
                actual: *actual.as_bytes(),
            });
        }
        Ok(())
    }
}

/// Opening of the salt commitment, always top-level leaf 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltCommitmentProof {
    pub commitment: Hash,
    pub leaf_count: usize,
    pub path: Vec<ProofNode>,
}

impl SaltCommitmentProof {
    pub fn ensure_valid(&self, algorithm: HashAlgorithm, id: &TransactionId) -> Result<(), ProofError> {
        let actual = fold_path(algorithm, self.commitment, 0, self.leaf_count, &self.path)?;
        if actual != *id.as_bytes() {
            return Err(ProofError::RootMismatch {
                expected: *id.as_bytes(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ComponentGroup, TransactionDigest};
    use crate::domain::merkle::SiblingPosition;
    use crate::domain::value_objects::{DigestConfig, SALT_LENGTH};

    const ALGO: HashAlgorithm = HashAlgorithm::Sha256;

    fn salt() -> PrivacySalt {
        PrivacySalt::new([0x21; SALT_LENGTH]).unwrap()
    }

    fn digest_with_sizes(sizes: &[usize], salt: Option<PrivacySalt>) -> TransactionDigest {
        let groups = sizes
            .iter()
            .enumerate()
            .map(|(g, &n)| {
                let components = (0..n).map(|i| format!("g{g}-c{i}").into_bytes()).collect();
                ComponentGroup::new(g as u32, components)
            })
            .collect();
        TransactionDigest::build(groups, salt, &DigestConfig::default()).unwrap()
    }

    #[test]
    fn test_every_leaf_verifies_for_canonical_sizes() {
        let sizes = [1, 2, 3, 5, 8];
        for salt in [Some(salt()), None] {
            let digest = digest_with_sizes(&sizes, salt);
            for (g, &n) in sizes.iter().enumerate() {
                let root = digest.group(g as u32).unwrap().root();
                for i in 0..n {
                    let proof = digest.tear_off(g as u32, i).unwrap();
                    assert!(proof.verify(ALGO, &root).unwrap(), "group {g} leaf {i}");
                    proof.ensure_valid(ALGO, &root).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_corrupted_content_fails() {
        let digest = digest_with_sizes(&[5], Some(salt()));
        let root = digest.group(0).unwrap().root();
        let mut proof = digest.tear_off(0, 4).unwrap();
        proof.leaf_content[0] ^= 0x01;

        assert!(!proof.verify(ALGO, &root).unwrap());
        assert!(matches!(
            proof.ensure_valid(ALGO, &root),
            Err(ProofError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_corrupted_sibling_fails() {
        let digest = digest_with_sizes(&[8], None);
        let root = digest.group(0).unwrap().root();
        for level in 0..3 {
            let mut proof = digest.tear_off(0, 3).unwrap();
            proof.path[level].hash[31] ^= 0x80;
            assert!(!proof.verify(ALGO, &root).unwrap(), "level {level}");
        }
    }

    #[test]
    fn test_free_function_matches_method() {
        let digest = digest_with_sizes(&[3], Some(salt()));
        let root = digest.group(0).unwrap().root();
        let proof = digest.tear_off(0, 2).unwrap();

        assert!(verify_tear_off(
            ALGO,
            &proof.leaf_content,
            proof.leaf_index,
            proof.leaf_count,
            &proof.path,
            &root,
            proof.nonce.as_ref(),
        )
        .unwrap());

        // dropping the nonce changes the leaf
        assert!(!verify_tear_off(
            ALGO,
            &proof.leaf_content,
            proof.leaf_index,
            proof.leaf_count,
            &proof.path,
            &root,
            None,
        )
        .unwrap());
    }

    #[test]
    fn test_out_of_range_index() {
        let digest = digest_with_sizes(&[3], None);
        let mut proof = digest.tear_off(0, 0).unwrap();
        proof.leaf_index = 3;
        assert_eq!(
            proof.compute_root(ALGO),
            Err(ProofError::LeafIndexOutOfRange {
                index: 3,
                leaf_count: 3
            })
        );
    }

    #[test]
    fn test_path_length_checked_against_leaf_count() {
        let digest = digest_with_sizes(&[5], None);
        let mut proof = digest.tear_off(0, 1).unwrap();
        proof.path.pop();
        assert_eq!(
            proof.compute_root(ALGO),
            Err(ProofError::PathLengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_flipped_side_rejected() {
        let digest = digest_with_sizes(&[4], None);
        let mut proof = digest.tear_off(0, 1).unwrap();
        proof.path[1].position = SiblingPosition::Left;
        assert_eq!(
            proof.compute_root(ALGO),
            Err(ProofError::SideMismatch { level: 1 })
        );
    }

    #[test]
    fn test_single_leaf_proof_is_empty() {
        let digest = digest_with_sizes(&[1], Some(salt()));
        let proof = digest.tear_off(0, 0).unwrap();
        assert!(proof.path.is_empty());
        assert_eq!(proof.compute_root(ALGO).unwrap(), digest.group(0).unwrap().root());
    }

    #[test]
    fn test_salted_proof_cannot_claim_duplicated_leaf() {
        // Leaf 2 of a 3-leaf group re-presented as leaf 3 of a 4-leaf group.
        for salt in [Some(salt()), None] {
            let salted = salt.is_some();
            let digest = digest_with_sizes(&[3], salt);
            let root = digest.group(0).unwrap().root();
            let honest = digest.tear_off(0, 2).unwrap();

            let mut copy = honest.clone();
            copy.leaf_index = 3;
            copy.leaf_count = 4;
            copy.path[0].position = SiblingPosition::Left;

            if salted {
                assert_eq!(
                    copy.verify(ALGO, &root),
                    Err(ProofError::DuplicatedSibling { level: 0 })
                );
            } else {
                assert!(copy.verify(ALGO, &root).unwrap());
            }
        }
    }

    #[test]
    fn test_verify_with_salt() {
        let digest = digest_with_sizes(&[3, 2], Some(salt()));
        let root = digest.group(1).unwrap().root();
        let proof = digest.tear_off(1, 1).unwrap();
        assert!(proof.verify_with_salt(ALGO, &salt(), &root).unwrap());

        let other = PrivacySalt::new([0x22; SALT_LENGTH]).unwrap();
        assert_eq!(
            proof.verify_with_salt(ALGO, &other, &root),
            Err(ProofError::NonceMismatch {
                group_index: 1,
                component_index: 1
            })
        );

        let mut stripped = proof.clone();
        stripped.nonce = None;
        assert_eq!(
            stripped.verify_with_salt(ALGO, &salt(), &root),
            Err(ProofError::NoncePresenceMismatch { group_index: 1 })
        );
    }

    #[test]
    fn test_group_root_proofs() {
        for salt in [Some(salt()), None] {
            let offset = usize::from(salt.is_some());
            let digest = digest_with_sizes(&[2, 0, 3], salt);
            for g in 0..3u32 {
                let proof = digest.prove_group_root(g).unwrap();
                assert_eq!(proof.leaf_index, g as usize + offset);
                assert!(proof.verify(ALGO, &digest.id()).unwrap());
            }
        }
    }

    #[test]
    fn test_group_root_proof_rejects_wrong_root() {
        let digest = digest_with_sizes(&[2, 2], None);
        let mut proof = digest.prove_group_root(0).unwrap();
        proof.group_root = digest.group(1).unwrap().root();
        assert!(matches!(
            proof.ensure_valid(ALGO, &digest.id()),
            Err(ProofError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_salt_commitment_proof() {
        let digest = digest_with_sizes(&[1, 1], Some(salt()));
        let proof = digest.prove_salt_commitment().unwrap().unwrap();
        assert_eq!(proof.commitment, salt().commitment(ALGO));
        proof.ensure_valid(ALGO, &digest.id()).unwrap();

        let unsalted = digest_with_sizes(&[1, 1], None);
        assert!(unsalted.prove_salt_commitment().unwrap().is_none());
    }
}
