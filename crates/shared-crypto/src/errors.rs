//! Crypto error types.

use thiserror::Error;

/// Cryptographic primitive errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// No hash algorithm was named
    #[error("Hash algorithm not set")]
    MissingHashAlgorithm,

    /// Hash algorithm name not recognised
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(String),

    /// Invalid input length for a fixed-size value
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Hex decoding failed
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
