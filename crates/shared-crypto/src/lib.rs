//! # Shared Crypto - Hashing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256, SHA3-256, BLAKE3 | Leaf, nonce and Merkle node hashing |
//! | `errors` | - | Algorithm selection and decoding failures |
//!
//! ## Security Properties
//!
//! - Every algorithm produces a 256-bit digest
//! - Selection is an explicit [`HashAlgorithm`] value, never global state

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{hash_from_hex, Hash, HashAlgorithm, StreamingHasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
