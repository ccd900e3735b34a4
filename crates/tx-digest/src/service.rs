//! # Digest Service
//!
//! Wires the domain builders to a [`GroupRootStore`] and keeps counters.
//!
//! Every computed digest has its group roots persisted, so group-root proofs
//! remain available by transaction id after the component bytes are gone.
//! Nothing removes stored roots; with [`InMemoryGroupRootStore`] memory grows
//! with the number of distinct transactions digested.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared_crypto::Hash;
use tracing::{debug, instrument, warn};

use crate::adapters::InMemoryGroupRootStore;
use crate::domain::{
    ComponentGroup, ConfigurationError, DigestConfig, FilteredTransaction, GroupRootProof,
    PrivacySalt, ProofError, TearOffProof, TransactionDigest, TransactionId,
};
use crate::ports::{DigestStats, GroupRootStore, ServiceError, TransactionDigestApi};

#[derive(Debug, Default)]
struct Counters {
    digests_computed: AtomicU64,
    proofs_generated: AtomicU64,
    proofs_verified: AtomicU64,
    verification_failures: AtomicU64,
}

/// Digest engine with persistence of group roots.
pub struct DigestService<S: GroupRootStore> {
    config: DigestConfig,
    store: Arc<S>,
    counters: Counters,
}

impl DigestService<InMemoryGroupRootStore> {
    /// Service backed by an in-memory store.
    pub fn in_memory(config: DigestConfig) -> Result<Self, ConfigurationError> {
        Self::new(config, Arc::new(InMemoryGroupRootStore::new()))
    }
}

impl<S: GroupRootStore> DigestService<S> {
    /// Create a service. Fails if `config` does not validate.
    pub fn new(config: DigestConfig, store: Arc<S>) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            counters: Counters::default(),
        })
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn record_verification(&self, ok: bool) {
        self.counters.proofs_verified.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.counters
                .verification_failures
                .fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl<S: GroupRootStore> TransactionDigestApi for DigestService<S> {
    #[instrument(skip(self, groups, salt), fields(groups = groups.len(), salted = salt.is_some()))]
    fn compute_digest(
        &self,
        groups: Vec<ComponentGroup>,
        salt: Option<PrivacySalt>,
    ) -> Result<TransactionDigest, ServiceError> {
        let digest = TransactionDigest::build(groups, salt, &self.config)?;
        self.store.put(digest.to_persisted())?;
        self.counters.digests_computed.fetch_add(1, Ordering::Relaxed);
        Ok(digest)
    }

    fn generate_tear_off(
        &self,
        digest: &TransactionDigest,
        group_index: u32,
        component_index: usize,
    ) -> Result<TearOffProof, ServiceError> {
        let proof = digest.tear_off(group_index, component_index)?;
        self.counters.proofs_generated.fetch_add(1, Ordering::Relaxed);
        Ok(proof)
    }

    #[instrument(skip(self, proof, group_root), fields(group = proof.group_index, leaf = proof.leaf_index))]
    fn verify_tear_off(&self, proof: &TearOffProof, group_root: &Hash) -> Result<bool, ServiceError> {
        let result = proof.verify(self.config.hash_algorithm, group_root);
        self.record_verification(matches!(result, Ok(true)));
        match result {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!("tear-off proof does not reconstruct the group root");
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, "malformed tear-off proof");
                Err(err.into())
            }
        }
    }

    #[instrument(skip_all, fields(id = %digest.id()))]
    fn filter(
        &self,
        digest: &TransactionDigest,
        predicate: &dyn Fn(u32, usize, &[u8]) -> bool,
    ) -> Result<FilteredTransaction, ServiceError> {
        let filtered = FilteredTransaction::build(digest, predicate)?;
        let revealed = filtered.revealed_components().count();
        self.counters
            .proofs_generated
            .fetch_add(revealed as u64, Ordering::Relaxed);
        debug!(groups = filtered.groups.len(), revealed, "built filtered transaction");
        Ok(filtered)
    }

    #[instrument(skip_all, fields(id = %expected_id))]
    fn verify_filtered(
        &self,
        filtered: &FilteredTransaction,
        expected_id: &TransactionId,
        expected_salted: bool,
    ) -> Result<(), ServiceError> {
        let result = filtered.verify(expected_id, expected_salted, &self.config);
        self.record_verification(result.is_ok());
        if let Err(err) = &result {
            warn!(error = %err, "filtered transaction rejected");
        }
        result.map_err(ServiceError::from)
    }

    #[instrument(skip(self, id), fields(id = %id))]
    fn prove_group_root(
        &self,
        id: &TransactionId,
        group_index: u32,
    ) -> Result<GroupRootProof, ServiceError> {
        let persisted = self
            .store
            .get(id)?
            .ok_or(ProofError::UnknownTransaction { id: *id })?;
        let proof = persisted.prove_group_root(group_index)?;
        self.counters.proofs_generated.fetch_add(1, Ordering::Relaxed);
        Ok(proof)
    }

    fn stats(&self) -> DigestStats {
        DigestStats {
            digests_computed: self.counters.digests_computed.load(Ordering::Relaxed),
            proofs_generated: self.counters.proofs_generated.load(Ordering::Relaxed),
            proofs_verified: self.counters.proofs_verified.load(Ordering::Relaxed),
            verification_failures: self.counters.verification_failures.load(Ordering::Relaxed),
        }
    }
}
