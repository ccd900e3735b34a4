//! # Domain Errors
//!
//! Error families of the digest engine.
//!
//! | Family | Meaning |
//! |--------|---------|
//! | [`ValidationError`] | Malformed input handed to a builder |
//! | [`ProofError`] | Proof that is out of range, malformed, or does not reconstruct its root |
//! | [`ConfigurationError`] | Unusable [`DigestConfig`](super::DigestConfig) |
//!
//! None of these are transient. A caller on the verification path must treat
//! any of them as grounds to reject the transaction or proof outright.

use shared_crypto::{CryptoError, Hash};
use thiserror::Error;

use super::entities::TransactionId;

/// Malformed builder input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Duplicate group index {group_index}")]
    DuplicateGroupIndex { group_index: u32 },

    #[error("Group index gap: expected {expected}, found {found}")]
    GroupIndexGap { expected: u32, found: u32 },

    #[error("Too many groups: {count} (max: {max})")]
    TooManyGroups { count: usize, max: usize },

    #[error("Too many components in group {group_index}: {count} (max: {max})")]
    TooManyComponents {
        group_index: u32,
        count: usize,
        max: usize,
    },

    #[error("Empty component at group {group_index}, index {component_index}")]
    EmptyComponent {
        group_index: u32,
        component_index: usize,
    },

    #[error("Invalid privacy salt length: expected {expected}, got {actual}")]
    InvalidSaltLength { expected: usize, actual: usize },

    #[error("Privacy salt must not be all zeros")]
    ZeroSalt,

    #[error("Privacy salt required by policy")]
    MissingSalt,

    #[error("Component index {index} does not fit in 32 bits")]
    IndexOverflow { index: usize },
}

/// Proof generation or verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    #[error("Leaf index {index} out of range (leaf count: {leaf_count})")]
    LeafIndexOutOfRange { index: usize, leaf_count: usize },

    #[error("Authentication path length {actual} does not match tree depth {expected}")]
    PathLengthMismatch { expected: usize, actual: usize },

    #[error("Sibling side at level {level} contradicts the leaf index")]
    SideMismatch { level: usize },

    #[error("Left sibling at level {level} repeats the node being folded")]
    DuplicatedSibling { level: usize },

    #[error("Root mismatch: expected {expected:?}, got {actual:?}")]
    RootMismatch { expected: Hash, actual: Hash },

    #[error("Nonce for group {group_index}, component {component_index} does not match the salt")]
    NonceMismatch {
        group_index: u32,
        component_index: usize,
    },

    #[error("Nonce presence for group {group_index} contradicts the salt mode")]
    NoncePresenceMismatch { group_index: u32 },

    #[error("Group {group_index} not present")]
    UnknownGroup { group_index: u32 },

    #[error("Group {group_index} disclosed more than once")]
    DuplicateGroup { group_index: u32 },

    #[error("Component {component_index} disclosed more than once in group {group_index}")]
    DuplicateComponent {
        group_index: u32,
        component_index: usize,
    },

    #[error("Component proof for group {found} filed under group {expected}")]
    ComponentGroupMismatch { expected: u32, found: u32 },

    #[error("Group {group_index} claimed at top-level leaf {leaf_index}")]
    GroupPositionMismatch { group_index: u32, leaf_index: usize },

    #[error("Leaf count mismatch: expected {expected}, got {actual}")]
    LeafCountMismatch { expected: usize, actual: usize },

    #[error("Salt commitment opening missing or unexpected")]
    SaltCommitmentMismatch,

    #[error("Transaction {id} not found")]
    UnknownTransaction { id: TransactionId },
}

/// Unusable engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Hash algorithm not set")]
    MissingHashAlgorithm,

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    #[error("{name} must be greater than zero")]
    ZeroLimit { name: &'static str },

    #[error("{name} = {value} exceeds the 32-bit index space")]
    LimitTooLarge { name: &'static str, value: usize },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<CryptoError> for ConfigurationError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::MissingHashAlgorithm => Self::MissingHashAlgorithm,
            CryptoError::UnsupportedHashAlgorithm(name) => Self::UnsupportedHashAlgorithm(name),
            other => Self::InvalidValue {
                key: "hash_algorithm".to_string(),
                value: other.to_string(),
            },
        }
    }
}

/// Any failure of the pure digest engine.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
