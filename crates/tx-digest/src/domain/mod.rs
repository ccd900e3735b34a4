//! # Domain Layer
//!
//! Pure digest logic: leaf hashing, nonce derivation, group and top-level
//! Merkle trees, and disclosure proofs.
//!
//! ## Hexagonal Architecture
//!
//! This module contains NO I/O dependencies. Persistence of group roots is
//! abstracted through ports in the `ports` module.

pub mod entities;
pub mod errors;
pub mod filtered;
pub mod merkle;
pub mod parallel;
pub mod proofs;
pub mod salt;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use filtered::*;
pub use merkle::*;
pub use parallel::*;
pub use proofs::*;
pub use salt::*;
pub use value_objects::*;
