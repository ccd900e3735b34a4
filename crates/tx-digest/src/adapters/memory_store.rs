//! In-memory [`GroupRootStore`].

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::{PersistedDigest, TransactionId};
use crate::ports::{GroupRootStore, StoreError};

/// Group roots held in a `HashMap` behind a read-write lock.
///
/// Entries are never evicted: the map grows by one entry per distinct
/// transaction id for the life of the store.
#[derive(Debug, Default)]
pub struct InMemoryGroupRootStore {
    digests: RwLock<HashMap<TransactionId, PersistedDigest>>,
}

impl InMemoryGroupRootStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.digests.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.read().is_empty()
    }
}

impl GroupRootStore for InMemoryGroupRootStore {
    fn put(&self, digest: PersistedDigest) -> Result<(), StoreError> {
        if digest.recompute_id() != digest.id {
            return Err(StoreError::Corrupted(digest.id));
        }

        self.digests.write().entry(digest.id).or_insert(digest);
        Ok(())
    }

    fn get(&self, id: &TransactionId) -> Result<Option<PersistedDigest>, StoreError> {
        Ok(self.digests.read().get(id).cloned())
    }
}
