//! # Brutal Security Tests for the Transaction Digest
//!
//! These tests attempt to forge, relocate or smuggle components past the
//! proof verifiers.
//!
//! ## Test Categories
//!
//! 1. **Tear-Off Attacks** - Tampered content, siblings, sides, indices
//! 2. **Filtered Transaction Attacks** - Relabelled groups, salt mode games
//! 3. **Resource Exhaustion** - Oversized groups and group counts
//! 4. **Privacy** - What a tear-off does and does not reveal

use tx_digest::{
    ComponentGroup, DigestConfig, DigestError, FilteredTransaction, HashAlgorithm, PrivacySalt,
    ProofError, SiblingPosition, TransactionDigest, ValidationError, SALT_LENGTH,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

fn make_salt(byte: u8) -> PrivacySalt {
    PrivacySalt::new([byte; SALT_LENGTH]).expect("non-zero salt")
}

fn make_groups(sizes: &[usize]) -> Vec<ComponentGroup> {
    sizes
        .iter()
        .enumerate()
        .map(|(g, &n)| {
            let components = (0..n)
                .map(|i| format!("group-{g}/component-{i}").into_bytes())
                .collect();
            ComponentGroup::new(g as u32, components)
        })
        .collect()
}

fn make_digest(sizes: &[usize], salt: Option<PrivacySalt>) -> TransactionDigest {
    TransactionDigest::build(make_groups(sizes), salt, &DigestConfig::default())
        .expect("digest should build")
}

const ALGO: HashAlgorithm = HashAlgorithm::Sha256;

// =============================================================================
// TEAR-OFF ATTACKS
// =============================================================================

/// Every leaf of every odd-sized group proves, including duplicated nodes
#[test]
fn brutal_every_leaf_of_odd_groups_verifies() {
    let sizes = [1, 3, 5, 6, 7, 9, 11, 13];
    let digest = make_digest(&sizes, Some(make_salt(1)));

    for (g, &n) in sizes.iter().enumerate() {
        let root = digest.group(g as u32).expect("group").root();
        for i in 0..n {
            let proof = digest.tear_off(g as u32, i).expect("proof should generate");
            assert!(
                proof.verify(ALGO, &root).expect("well-formed"),
                "group {g} component {i} must verify"
            );
        }
    }
}

/// ATTACK: flip every bit of the revealed content
#[test]
fn brutal_any_content_bit_flip_fails() {
    let digest = make_digest(&[3], Some(make_salt(2)));
    let root = digest.group(0).expect("group").root();
    let proof = digest.tear_off(0, 2).expect("proof");

    for byte in 0..proof.leaf_content.len() {
        for bit in 0..8 {
            let mut forged = proof.clone();
            forged.leaf_content[byte] ^= 1 << bit;
            assert!(
                !forged.verify(ALGO, &root).expect("well-formed"),
                "bit {bit} of byte {byte} flipped but still verified"
            );
        }
    }
}

/// ATTACK: appended or truncated content
#[test]
fn brutal_content_length_extension_fails() {
    let digest = make_digest(&[4], None);
    let root = digest.group(0).expect("group").root();
    let proof = digest.tear_off(0, 1).expect("proof");

    let mut extended = proof.clone();
    extended.leaf_content.push(0);
    assert!(!extended.verify(ALGO, &root).expect("well-formed"));

    let mut truncated = proof;
    truncated.leaf_content.pop();
    assert!(!truncated.verify(ALGO, &root).expect("well-formed"));
}

/// ATTACK: corrupt any sibling on the path
#[test]
fn brutal_any_sibling_corruption_fails() {
    let digest = make_digest(&[13], Some(make_salt(3)));
    let root = digest.group(0).expect("group").root();

    for i in 0..13 {
        let proof = digest.tear_off(0, i).expect("proof");
        for level in 0..proof.path.len() {
            let mut forged = proof.clone();
            forged.path[level].hash[0] ^= 0xFF;
            assert!(
                !forged.verify(ALGO, &root).expect("well-formed"),
                "component {i}: corrupted level {level} still verified"
            );
        }
    }
}

/// ATTACK: move a revealed component to another position by rewriting the
/// index while keeping the path
#[test]
fn brutal_relocated_component_rejected() {
    let digest = make_digest(&[4], None);
    let root = digest.group(0).expect("group").root();

    let mut proof = digest.tear_off(0, 0).expect("proof");
    proof.leaf_index = 1;
    assert_eq!(
        proof.verify(ALGO, &root),
        Err(ProofError::SideMismatch { level: 0 })
    );
}

/// ATTACK: flip a side marker
#[test]
fn brutal_flipped_side_rejected() {
    let digest = make_digest(&[8], None);
    let root = digest.group(0).expect("group").root();

    let mut proof = digest.tear_off(0, 5).expect("proof");
    proof.path[2].position = match proof.path[2].position {
        SiblingPosition::Left => SiblingPosition::Right,
        SiblingPosition::Right => SiblingPosition::Left,
    };
    assert_eq!(
        proof.verify(ALGO, &root),
        Err(ProofError::SideMismatch { level: 2 })
    );
}

/// ATTACK: pad the path with an extra level
#[test]
fn brutal_padded_path_rejected() {
    let digest = make_digest(&[4], None);
    let root = digest.group(0).expect("group").root();

    let mut proof = digest.tear_off(0, 3).expect("proof");
    let extra = proof.path[0].clone();
    proof.path.push(extra);
    assert_eq!(
        proof.verify(ALGO, &root),
        Err(ProofError::PathLengthMismatch {
            expected: 2,
            actual: 3
        })
    );
}

/// ATTACK: out-of-range index
#[test]
fn brutal_proof_index_out_of_bounds() {
    let digest = make_digest(&[4], None);
    assert!(matches!(
        digest.tear_off(0, 100),
        Err(DigestError::Proof(ProofError::LeafIndexOutOfRange { .. }))
    ));

    let mut proof = digest.tear_off(0, 0).expect("proof");
    proof.leaf_index = usize::MAX;
    assert!(matches!(
        proof.compute_root(ALGO),
        Err(ProofError::LeafIndexOutOfRange { .. })
    ));
}

/// ATTACK: present a proof from one group against another group's root
#[test]
fn brutal_cross_group_proof_fails() {
    let digest = make_digest(&[2, 2], Some(make_salt(4)));
    let proof = digest.tear_off(0, 0).expect("proof");
    let other_root = digest.group(1).expect("group").root();
    assert!(!proof.verify(ALGO, &other_root).expect("well-formed"));
}

/// ATTACK: verify under a different hash algorithm
#[test]
fn brutal_algorithm_confusion_fails() {
    let digest = make_digest(&[5], None);
    let root = digest.group(0).expect("group").root();
    let proof = digest.tear_off(0, 4).expect("proof");

    for algorithm in [HashAlgorithm::Sha3_256, HashAlgorithm::Blake3] {
        assert!(!proof.verify(algorithm, &root).expect("well-formed"));
    }
}

// =============================================================================
// FILTERED TRANSACTION ATTACKS
// =============================================================================

/// ATTACK: claim group 1's components belong to group 2
#[test]
fn brutal_filtered_group_relabel_rejected() {
    let digest = make_digest(&[1, 2, 2], Some(make_salt(5)));
    let mut filtered = FilteredTransaction::build_for(&digest, &[(1, 0)]).expect("filter");

    filtered.groups[0].root_proof.group_index = 2;
    for proof in &mut filtered.groups[0].components {
        proof.group_index = 2;
    }

    assert!(matches!(
        filtered.verify(&digest.id(), true, &DigestConfig::default()),
        Err(ProofError::GroupPositionMismatch { group_index: 2, .. })
    ));
}

/// ATTACK: drop the salt opening and strip nonces to pass a salted
/// transaction off as unsalted
#[test]
fn brutal_salt_mode_downgrade_rejected() {
    let digest = make_digest(&[2, 2], Some(make_salt(6)));
    let mut filtered = FilteredTransaction::build_for(&digest, &[(0, 0)]).expect("filter");

    filtered.salt_commitment = None;
    for proof in &mut filtered.groups[0].components {
        proof.nonce = None;
    }

    assert_eq!(
        filtered.verify(&digest.id(), true, &DigestConfig::default()),
        Err(ProofError::SaltCommitmentMismatch)
    );

    let strict = DigestConfig {
        require_privacy_salt: true,
        ..DigestConfig::default()
    };
    assert_eq!(
        filtered.verify(&digest.id(), false, &strict),
        Err(ProofError::SaltCommitmentMismatch)
    );
}

/// ATTACK: drop the salt opening, shift an input down to the output slot
/// and fold its nonce into the revealed bytes so the leaf hash is unchanged
#[test]
fn brutal_nonce_folding_relabel_rejected() {
    let salted = TransactionDigest::build(
        vec![
            ComponentGroup::new(0, vec![b"input-secret".to_vec(), b"input-b".to_vec()]),
            ComponentGroup::new(1, vec![b"out-a".to_vec(), b"out-b".to_vec()]),
        ],
        Some(make_salt(12)),
        &DigestConfig::default(),
    )
    .expect("digest should build");
    let mut filtered = FilteredTransaction::build_for(&salted, &[(0, 0)]).expect("filter");

    filtered.salt_commitment = None;
    let group = &mut filtered.groups[0];
    group.root_proof.group_index = 1;
    for proof in &mut group.components {
        proof.group_index = 1;
        let nonce = proof.nonce.take().expect("salted proof carries a nonce");
        proof.leaf_content.extend_from_slice(&nonce);
    }

    assert_eq!(
        filtered.verify(&salted.id(), true, &DigestConfig::default()),
        Err(ProofError::SaltCommitmentMismatch)
    );
    let revealed: Vec<_> = filtered.revealed_components().map(|(g, i, _)| (g, i)).collect();
    assert_eq!(revealed, vec![(1, 0)]);
}

/// ATTACK: present the duplicated last leaf of an odd salted group as an
/// extra component so the group looks larger and fully visible
#[test]
fn brutal_inflated_group_size_rejected() {
    let digest = make_digest(&[3], Some(make_salt(13)));
    let mut filtered = FilteredTransaction::build_with_groups(&digest, &[0]).expect("filter");

    let components = &mut filtered.groups[0].components;
    for proof in components.iter_mut() {
        proof.leaf_count = 4;
    }
    let mut copy = components[2].clone();
    copy.leaf_index = 3;
    copy.path[0].position = SiblingPosition::Left;
    components.push(copy);

    assert_eq!(
        filtered.verify(&digest.id(), true, &DigestConfig::default()),
        Err(ProofError::DuplicatedSibling { level: 0 })
    );
    assert_eq!(
        filtered.check_all_components_visible(0, ALGO),
        Err(ProofError::DuplicatedSibling { level: 0 })
    );
}

/// ATTACK: hide a component by claiming a whole group is visible
#[test]
fn brutal_partial_group_not_fully_visible() {
    let digest = make_digest(&[5], Some(make_salt(7)));
    let mut filtered =
        FilteredTransaction::build_for(&digest, &[(0, 0), (0, 1), (0, 2), (0, 3)]).expect("filter");
    filtered.verify(&digest.id(), true, &DigestConfig::default()).expect("valid");

    assert!(!filtered
        .check_all_components_visible(0, ALGO)
        .expect("group present"));

    // lying about the group size makes the remaining proofs inconsistent
    for proof in &mut filtered.groups[0].components {
        proof.leaf_count = 4;
    }
    assert!(filtered
        .verify(&digest.id(), true, &DigestConfig::default())
        .is_err());
}

/// ATTACK: splice a group from another transaction
#[test]
fn brutal_spliced_group_rejected() {
    let honest = make_digest(&[2, 2], Some(make_salt(8)));
    let other = make_digest(&[2, 3], Some(make_salt(8)));

    let mut filtered = FilteredTransaction::build_for(&honest, &[(1, 0)]).expect("filter");
    let foreign = FilteredTransaction::build_for(&other, &[(1, 0)]).expect("filter");
    filtered.groups[0] = foreign.groups[0].clone();

    assert!(matches!(
        filtered.verify(&honest.id(), true, &DigestConfig::default()),
        Err(ProofError::RootMismatch { .. })
    ));
}

// =============================================================================
// RESOURCE EXHAUSTION
// =============================================================================

/// Oversized groups are rejected before hashing
#[test]
fn brutal_component_flood_rejected() {
    let config = DigestConfig {
        max_components_per_group: 1_000,
        ..DigestConfig::default()
    };
    let flood = vec![ComponentGroup::new(0, vec![vec![0xAA]; 1_001])];

    assert!(matches!(
        TransactionDigest::build(flood, None, &config),
        Err(DigestError::Validation(ValidationError::TooManyComponents { .. }))
    ));
}

/// Group count is bounded
#[test]
fn brutal_group_flood_rejected() {
    let groups: Vec<_> = (0..65).map(ComponentGroup::empty).collect();
    assert!(matches!(
        TransactionDigest::build(groups, None, &DigestConfig::default()),
        Err(DigestError::Validation(ValidationError::TooManyGroups {
            count: 65,
            max: 64
        }))
    ));
}

// =============================================================================
// PRIVACY
// =============================================================================

/// A tear-off never carries the salt, and its nonce is useless elsewhere
#[test]
fn brutal_nonce_does_not_unlock_neighbours() {
    let salt = make_salt(9);
    let digest = make_digest(&[3], Some(salt.clone()));
    let proof = digest.tear_off(0, 0).expect("proof");
    let neighbour = digest.tear_off(0, 1).expect("proof");

    assert_ne!(proof.nonce, neighbour.nonce);
    assert_ne!(proof.nonce, Some(*salt.as_bytes()));
    assert_ne!(proof.nonce, Some(salt.commitment(ALGO)));
}

/// Salted leaves for equal content differ by position; unsalted do not
#[test]
fn brutal_salt_blinds_repeated_content() {
    let groups = || vec![ComponentGroup::new(0, vec![b"yes".to_vec(), b"yes".to_vec()])];

    let salted = TransactionDigest::build(groups(), Some(make_salt(10)), &DigestConfig::default())
        .expect("digest");
    let leaves = salted.group(0).expect("group").leaf_hashes();
    assert_ne!(leaves[0], leaves[1]);

    let plain = TransactionDigest::build(groups(), None, &DigestConfig::default()).expect("digest");
    let leaves = plain.group(0).expect("group").leaf_hashes();
    assert_eq!(leaves[0], leaves[1]);
}
