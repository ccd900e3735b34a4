//! # Tear-Off Transaction Digest
//!
//! Content-addressable transaction identifiers built from a two-level Merkle
//! tree, with proofs that reveal individual components while the rest of
//! the transaction stays hidden.
//!
//! ```text
//! group 0: [c0, c1, c2]   group 1: []   group 2: [c0]
//!     │ leaf = H(c || nonce(g, i))   │          │
//!     ↓                              ↓          ↓
//!  root(g0)                      ZERO_HASH   root(g2)
//!      └──────────────┬──────────────┴──────────┘
//!                     ↓
//!      top leaves = [H(salt), root(g0), ZERO_HASH, root(g2)]
//!                     ↓
//!               TransactionId
//! ```
//!
//! ## Tree Shape
//!
//! Both levels pair nodes left-to-right and duplicate the last node of any
//! odd-sized level, at every level. A one-leaf tree's root is the leaf; an
//! empty tree's root is [`ZERO_HASH`].
//!
//! ## Privacy
//!
//! With a [`PrivacySalt`], every leaf is blinded by a positional nonce
//! `H(salt || BE32(group) || BE32(index))`. A [`TearOffProof`] reveals one
//! component and its nonce; the salt itself is never disclosed. Without a
//! salt, identical components hash identically wherever they sit.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): Pure hashing and tree logic, no I/O
//! - **Ports Layer** (`ports/`): [`TransactionDigestApi`] and [`GroupRootStore`]
//! - **Adapters Layer** (`adapters/`): [`InMemoryGroupRootStore`]
//! - **Service** (`service`): [`DigestService`], the API over a store
//!
//! ## Example
//!
//! ```
//! use tx_digest::{ComponentGroup, DigestConfig, PrivacySalt, TransactionDigest};
//!
//! let groups = vec![
//!     ComponentGroup::new(0, vec![b"input".to_vec()]),
//!     ComponentGroup::new(1, vec![b"output-a".to_vec(), b"output-b".to_vec()]),
//! ];
//! let digest = TransactionDigest::build(groups, Some(PrivacySalt::random()), &DigestConfig::default())?;
//!
//! let proof = digest.tear_off(1, 0)?;
//! let group_root = digest.group(1).map(|g| g.root()).unwrap_or_default();
//! assert!(proof.verify(digest.algorithm(), &group_root)?);
//! # Ok::<(), tx_digest::DigestError>(())
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    component_leaf,
    expected_depth,
    leaf_hash,
    verify_tear_off,
    ComponentGroup,
    ComponentGroupKind,
    ConfigurationError,
    DigestConfig,
    DigestError,
    FilteredComponentGroup,
    FilteredTransaction,
    GroupDigest,
    GroupRootProof,
    MerkleTree,
    PersistedDigest,
    PrivacySalt,
    ProofError,
    ProofNode,
    SaltCommitmentProof,
    SiblingPosition,
    TearOffProof,
    TransactionDigest,
    TransactionId,
    ValidationError,
    PARALLEL_THRESHOLD,
    SALT_LENGTH,
    ZERO_HASH,
};

pub use ports::{DigestStats, GroupRootStore, ServiceError, StoreError, TransactionDigestApi};

pub use adapters::InMemoryGroupRootStore;
pub use service::DigestService;

pub use shared_crypto::{Hash, HashAlgorithm};
