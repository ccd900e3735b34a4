//! # Parallel Group Root Computation
//!
//! Group trees are independent of each other, so their roots can be computed
//! concurrently with rayon.
//!
//! ## Solution: Map-Reduce Digest
//!
//! 1. Map (Parallel): build every group tree, one slot per group index
//! 2. Reduce (Sequential): feed the ordered roots into the top-level tree
//!
//! The top-level reduction only starts once every slot is filled, and the
//! result does not depend on which path was taken.

use rayon::prelude::*;

use super::entities::{ComponentGroup, GroupDigest};
use super::errors::ValidationError;
use super::salt::PrivacySalt;
use super::value_objects::DigestConfig;

/// Build group digests for groups already ordered by index.
///
/// Falls back to sequential for batches below `config.parallel_threshold`.
/// Output order always matches input order.
pub fn build_group_digests(
    groups: Vec<ComponentGroup>,
    salt: Option<&PrivacySalt>,
    config: &DigestConfig,
) -> Result<Vec<GroupDigest>, ValidationError> {
    if groups.len() < config.parallel_threshold {
        groups
            .into_iter()
            .map(|group| GroupDigest::build(group, salt, config))
            .collect()
    } else {
        groups
            .into_par_iter()
            .map(|group| GroupDigest::build(group, salt, config))
            .collect()
    }
}
