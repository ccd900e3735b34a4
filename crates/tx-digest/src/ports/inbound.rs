//! # Inbound Ports (Driving Ports)
//!
//! Public API of the digest engine.

use shared_crypto::Hash;
use thiserror::Error;

use super::outbound::StoreError;
use crate::domain::{
    ComponentGroup, DigestError, FilteredTransaction, GroupRootProof, PrivacySalt, ProofError,
    TearOffProof, TransactionDigest, TransactionId,
};

/// Failure of a [`TransactionDigestApi`] call: the engine or the store.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProofError> for ServiceError {
    fn from(err: ProofError) -> Self {
        Self::Digest(err.into())
    }
}

/// Counters exposed by [`TransactionDigestApi::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestStats {
    pub digests_computed: u64,
    pub proofs_generated: u64,
    pub proofs_verified: u64,
    pub verification_failures: u64,
}

/// Primary API of the digest engine.
pub trait TransactionDigestApi {
    /// Compute the digest of a transaction and persist its group roots.
    fn compute_digest(
        &self,
        groups: Vec<ComponentGroup>,
        salt: Option<PrivacySalt>,
    ) -> Result<TransactionDigest, ServiceError>;

    /// Tear-off proof for one component.
    fn generate_tear_off(
        &self,
        digest: &TransactionDigest,
        group_index: u32,
        component_index: usize,
    ) -> Result<TearOffProof, ServiceError>;

    /// Check a tear-off proof against a group root.
    ///
    /// - `Ok(true)`: the component is at its position under `group_root`
    /// - `Ok(false)`: well-formed proof for a different root
    /// - `Err(_)`: malformed proof
    fn verify_tear_off(&self, proof: &TearOffProof, group_root: &Hash) -> Result<bool, ServiceError>;

    /// Reveal the components selected by `predicate`.
    fn filter(
        &self,
        digest: &TransactionDigest,
        predicate: &dyn Fn(u32, usize, &[u8]) -> bool,
    ) -> Result<FilteredTransaction, ServiceError>;

    /// Check all proofs of a filtered transaction against `expected_id`.
    ///
    /// `expected_salted` is the salt mode the caller knows the transaction
    /// was built with; a disclosure claiming the other mode is rejected.
    fn verify_filtered(
        &self,
        filtered: &FilteredTransaction,
        expected_id: &TransactionId,
        expected_salted: bool,
    ) -> Result<(), ServiceError>;

    /// Prove a group root from persisted roots only.
    ///
    /// - `Err(UnknownTransaction)`: nothing stored under `id`
    fn prove_group_root(
        &self,
        id: &TransactionId,
        group_index: u32,
    ) -> Result<GroupRootProof, ServiceError>;

    /// Get service counters.
    fn stats(&self) -> DigestStats;
}
