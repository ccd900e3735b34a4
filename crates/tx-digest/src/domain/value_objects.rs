//! # Value Objects
//!
//! Constants and configuration for the digest engine.

use std::env;

use serde::{Deserialize, Serialize};
use shared_crypto::{Hash, HashAlgorithm};

use super::errors::ConfigurationError;

/// Root of a group with zero components (all zeros).
///
/// It takes part in the top-level reduction exactly like a real group root,
/// so an empty group still occupies its index slot.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Length of a privacy salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// Group count from which group roots are computed on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 4;

/// Default cap on components in a single group.
pub const DEFAULT_MAX_COMPONENTS_PER_GROUP: usize = 65_536;

/// Default cap on component groups per transaction.
pub const DEFAULT_MAX_GROUPS: usize = 64;

/// Engine configuration.
///
/// Passed explicitly into every builder call. There is no global algorithm
/// selection, so differently configured digests can be computed side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Hash used for leaves, nonces, the salt commitment and interior nodes.
    pub hash_algorithm: HashAlgorithm,
    /// Maximum components in one group.
    ///
    /// ## SECURITY
    ///
    /// Bounds tree growth from adversarial or malformed input.
    pub max_components_per_group: usize,
    /// Maximum number of component groups.
    pub max_groups: usize,
    /// Whether zero-length component bytes are accepted.
    pub allow_empty_components: bool,
    /// Reject unsalted transactions, both when building and when verifying
    /// filtered transactions.
    pub require_privacy_salt: bool,
    /// Group count from which group roots are built in parallel.
    pub parallel_threshold: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            max_components_per_group: DEFAULT_MAX_COMPONENTS_PER_GROUP,
            max_groups: DEFAULT_MAX_GROUPS,
            allow_empty_components: false,
            require_privacy_salt: false,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

impl DigestConfig {
    /// Default configuration with a different hash algorithm.
    pub fn with_algorithm(hash_algorithm: HashAlgorithm) -> Self {
        Self {
            hash_algorithm,
            ..Self::default()
        }
    }

    /// Check limits are usable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_limit("max_components_per_group", self.max_components_per_group)?;
        check_limit("max_groups", self.max_groups)?;
        if self.parallel_threshold == 0 {
            return Err(ConfigurationError::ZeroLimit {
                name: "parallel_threshold",
            });
        }
        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TXD_HASH_ALGORITHM`: `sha-256`, `sha3-256` or `blake3` (default: sha-256)
    /// - `TXD_MAX_COMPONENTS_PER_GROUP`: component cap per group (default: 65536)
    /// - `TXD_MAX_GROUPS`: group cap per transaction (default: 64)
    /// - `TXD_ALLOW_EMPTY_COMPONENTS`: accept zero-length components (default: false)
    /// - `TXD_REQUIRE_PRIVACY_SALT`: reject unsalted transactions (default: false)
    /// - `TXD_PARALLEL_THRESHOLD`: groups before going parallel (default: 4)
    ///
    /// A variable that is set but empty or unparsable is an error rather than
    /// a silent fallback to the default.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let hash_algorithm = match lookup("TXD_HASH_ALGORITHM") {
            Some(name) => name.parse::<HashAlgorithm>()?,
            None => defaults.hash_algorithm,
        };

        let config = Self {
            hash_algorithm,
            max_components_per_group: parse_var(
                &lookup,
                "TXD_MAX_COMPONENTS_PER_GROUP",
                defaults.max_components_per_group,
            )?,
            max_groups: parse_var(&lookup, "TXD_MAX_GROUPS", defaults.max_groups)?,
            allow_empty_components: parse_flag(
                &lookup,
                "TXD_ALLOW_EMPTY_COMPONENTS",
                defaults.allow_empty_components,
            )?,
            require_privacy_salt: parse_flag(
                &lookup,
                "TXD_REQUIRE_PRIVACY_SALT",
                defaults.require_privacy_salt,
            )?,
            parallel_threshold: parse_var(
                &lookup,
                "TXD_PARALLEL_THRESHOLD",
                defaults.parallel_threshold,
            )?,
        };

        config.validate()?;
        Ok(config)
    }
}

fn check_limit(name: &'static str, value: usize) -> Result<(), ConfigurationError> {
    if value == 0 {
        return Err(ConfigurationError::ZeroLimit { name });
    }
    // indices are hashed as big-endian u32
    if u32::try_from(value - 1).is_err() {
        return Err(ConfigurationError::LimitTooLarge { name, value });
    }
    Ok(())
}

fn parse_var<F>(lookup: &F, key: &str, default: usize) -> Result<usize, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigurationError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigurationError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        },
        None => Ok(default),
    }
}
