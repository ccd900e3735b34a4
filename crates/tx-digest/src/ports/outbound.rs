//! # Outbound Ports (Driven Ports)
//!
//! SPIs required by the digest service.

use thiserror::Error;

use crate::domain::{PersistedDigest, TransactionId};

/// Storage for group roots, keyed by transaction id.
///
/// Lets group-root proofs be produced after the component bytes are gone.
pub trait GroupRootStore: Send + Sync {
    /// Store a digest. Re-storing an id keeps the first entry.
    ///
    /// - `Err(Corrupted)`: the roots do not reproduce the id
    fn put(&self, digest: PersistedDigest) -> Result<(), StoreError>;

    /// Get a digest by id.
    fn get(&self, id: &TransactionId) -> Result<Option<PersistedDigest>, StoreError>;

    /// Check if a digest exists.
    fn contains(&self, id: &TransactionId) -> Result<bool, StoreError> {
        Ok(self.get(id)?.is_some())
    }
}

/// Storage operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Stored digest for {0} does not reproduce its id")]
    Corrupted(TransactionId),
}
