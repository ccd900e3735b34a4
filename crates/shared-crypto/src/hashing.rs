//! # Hashing
//!
//! Collision-resistant 256-bit hash functions used by the ledger.
//!
//! ## Algorithms
//!
//! | Variant | Function | Notes |
//! |---------|----------|-------|
//! | `Sha256` | SHA-256 (FIPS 180-4) | Ledger default |
//! | `Sha3_256` | SHA3-256 (FIPS 202) | Sponge construction |
//! | `Blake3` | BLAKE3 | SIMD-accelerated, 5-10x faster than SHA-256 |
//!
//! The algorithm is always an explicit value handed to the caller; there is
//! no process-wide default that can change underneath a running computation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

use crate::CryptoError;

/// 256-bit hash output.
pub type Hash = [u8; 32];

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-256.
    #[default]
    #[serde(rename = "sha-256")]
    Sha256,
    /// SHA3-256.
    #[serde(rename = "sha3-256")]
    Sha3_256,
    /// BLAKE3 with 256-bit output.
    #[serde(rename = "blake3")]
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [HashAlgorithm; 3] = [Self::Sha256, Self::Sha3_256, Self::Blake3];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha-256",
            Self::Sha3_256 => "sha3-256",
            Self::Blake3 => "blake3",
        }
    }

    /// Start a streaming hasher for this algorithm.
    pub fn hasher(&self) -> StreamingHasher {
        let inner = match self {
            Self::Sha256 => Inner::Sha256(Sha256::new()),
            Self::Sha3_256 => Inner::Sha3_256(Sha3_256::new()),
            Self::Blake3 => Inner::Blake3(Box::new(blake3::Hasher::new())),
        };
        StreamingHasher { inner }
    }

    /// Hash data (one-shot).
    pub fn hash(&self, data: &[u8]) -> Hash {
        match self {
            Self::Sha256 => Sha256::digest(data).into(),
            Self::Sha3_256 => Sha3_256::digest(data).into(),
            Self::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }

    /// Hash the concatenation of several inputs without allocating it.
    pub fn hash_many(&self, inputs: &[&[u8]]) -> Hash {
        let mut hasher = self.hasher();
        for input in inputs {
            hasher.update(input);
        }
        hasher.finalize()
    }

    /// Interior Merkle node: `H(left || right)`.
    pub fn hash_pair(&self, left: &Hash, right: &Hash) -> Hash {
        self.hash_many(&[left.as_slice(), right.as_slice()])
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "" => Err(CryptoError::MissingHashAlgorithm),
            "sha-256" | "sha256" | "sha2-256" => Ok(Self::Sha256),
            "sha3-256" | "sha3" => Ok(Self::Sha3_256),
            "blake3" | "blake3-256" => Ok(Self::Blake3),
            _ => Err(CryptoError::UnsupportedHashAlgorithm(s.trim().to_string())),
        }
    }
}

enum Inner {
    Sha256(Sha256),
    Sha3_256(Sha3_256),
    // boxed: blake3's hasher state is much larger than the SHA states
    Blake3(Box<blake3::Hasher>),
}

/// Stateful hasher over any [`HashAlgorithm`].
pub struct StreamingHasher {
    inner: Inner,
}

impl StreamingHasher {
    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        match &mut self.inner {
            Inner::Sha256(h) => h.update(data),
            Inner::Sha3_256(h) => h.update(data),
            Inner::Blake3(h) => {
                h.update(data);
            }
        }
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        match self.inner {
            Inner::Sha256(h) => h.finalize().into(),
            Inner::Sha3_256(h) => h.finalize().into(),
            Inner::Blake3(h) => *h.finalize().as_bytes(),
        }
    }
}

/// Parse a 32-byte hash from hex (either case, optional `0x` prefix).
pub fn hash_from_hex(s: &str) -> Result<Hash, CryptoError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    <Hash>::try_from(bytes.as_slice()).map_err(|_| CryptoError::InvalidLength {
        expected: 32,
        actual: bytes.len(),
    })
}
