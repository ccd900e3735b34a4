//! # Privacy Salt, Nonces and Leaves
//!
//! The salt raises the entropy of every component before it is hashed, so a
//! revealed root cannot be used to confirm guesses about undisclosed
//! low-entropy components (amounts, booleans, well-known parties).
//!
//! ```text
//! nonce(g, i)   = H(salt || BE32(g) || BE32(i))
//! leaf(g, i)    = H(component || nonce(g, i))     salted
//! leaf(g, i)    = H(component)                    unsalted
//! commitment    = H(salt)                         top-level leaf 0
//! ```

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use shared_crypto::{Hash, HashAlgorithm};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::ValidationError;
use super::value_objects::SALT_LENGTH;

/// Per-transaction random salt.
///
/// Fixed at transaction-build time and immutable afterwards. The bytes are
/// wiped when the value is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PrivacySalt([u8; SALT_LENGTH]);

impl PrivacySalt {
    /// Wrap salt bytes. An all-zero salt carries no entropy and is rejected.
    pub fn new(bytes: [u8; SALT_LENGTH]) -> Result<Self, ValidationError> {
        if bytes.iter().all(|b| *b == 0) {
            return Err(ValidationError::ZeroSalt);
        }
        Ok(Self(bytes))
    }

    /// Wrap salt bytes of unchecked length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let array: [u8; SALT_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| ValidationError::InvalidSaltLength {
                    expected: SALT_LENGTH,
                    actual: bytes.len(),
                })?;
        Self::new(array)
    }

    /// Generate a fresh salt from the thread-local CSPRNG.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; SALT_LENGTH];
            rng.fill_bytes(&mut bytes);
            if let Ok(salt) = Self::new(bytes) {
                return salt;
            }
        }
    }

    /// Raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }

    /// Top-level commitment leaf `H(salt)`, hashed without a nonce.
    pub fn commitment(&self, algorithm: HashAlgorithm) -> Hash {
        algorithm.hash(&self.0)
    }

    /// Positional nonce for component `component_index` of group `group_index`.
    pub fn nonce(&self, algorithm: HashAlgorithm, group_index: u32, component_index: u32) -> Hash {
        algorithm.hash_many(&[
            self.0.as_slice(),
            &group_index.to_be_bytes(),
            &component_index.to_be_bytes(),
        ])
    }
}

impl fmt::Debug for PrivacySalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivacySalt(..)")
    }
}

impl TryFrom<Vec<u8>> for PrivacySalt {
    type Error = ValidationError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_slice(&bytes)
    }
}

impl From<PrivacySalt> for Vec<u8> {
    fn from(salt: PrivacySalt) -> Self {
        salt.0.to_vec()
    }
}

/// Leaf hash of one component: `H(component || nonce)`, or `H(component)`
/// when no nonce is in play.
pub fn leaf_hash(algorithm: HashAlgorithm, component: &[u8], nonce: Option<&Hash>) -> Hash {
    match nonce {
        Some(nonce) => algorithm.hash_many(&[component, nonce.as_slice()]),
        None => algorithm.hash(component),
    }
}

/// Leaf hash at `(group_index, component_index)`, deriving the nonce from
/// `salt` when one is present.
pub fn component_leaf(
    algorithm: HashAlgorithm,
    salt: Option<&PrivacySalt>,
    group_index: u32,
    component_index: u32,
    component: &[u8],
) -> Hash {
    let nonce = salt.map(|s| s.nonce(algorithm, group_index, component_index));
    leaf_hash(algorithm, component, nonce.as_ref())
}
