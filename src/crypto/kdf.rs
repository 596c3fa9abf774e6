//! Passphrase-based key derivation.
//!
//! Two derivations live here:
//! - `derive_key`: the legacy 16-byte key, a single MD5 of the raw
//!   passphrase.  No salt and no stretching; kept so old databases
//!   stay readable.
//! - `derive_master_key_with_params`: Argon2id with a random salt,
//!   used by the sealed format.

use argon2::{Algorithm, Argon2, Params, Version};
use md5::{Digest, Md5};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::{ObviousError, Result};

/// Length of the legacy key in bytes (128 bits, for AES-128).
pub const LEGACY_KEY_LEN: usize = 16;

/// Length of the salt in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the Argon2id master key in bytes (256 bits, for AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Upper bounds.  Parameters are read from an unauthenticated header,
/// so they must not be able to exhaust memory or stall the process.
pub const MAX_MEMORY_KIB: u32 = 1_048_576; // 1 GiB
pub const MAX_ITERATIONS: u32 = 64;
pub const MAX_PARALLELISM: u32 = 64;

/// Derive the legacy 16-byte key from a passphrase.
///
/// Deterministic: the same passphrase always yields the same key.
pub fn derive_key(passphrase: &[u8]) -> [u8; LEGACY_KEY_LEN] {
    let digest = Md5::digest(passphrase);
    let mut key = [0u8; LEGACY_KEY_LEN];
    key.copy_from_slice(&digest);
    key
}

/// Argon2id cost parameters.
///
/// Stored verbatim in the sealed header so a database is always
/// reopened with the exact settings it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Ensure every parameter lies within the accepted range.
    pub fn check(&self) -> std::result::Result<(), String> {
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.memory_kib) {
            return Err(format!(
                "Argon2 memory_kib must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} (got {})",
                self.memory_kib
            ));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(format!(
                "Argon2 iterations must be between 1 and {MAX_ITERATIONS} (got {})",
                self.iterations
            ));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(format!(
                "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.parallelism
            ));
        }
        Ok(())
    }
}

/// Derive a 32-byte master key with the default Argon2id parameters.
pub fn derive_master_key(passphrase: &[u8], salt: &[u8]) -> Result<[u8; MASTER_KEY_LEN]> {
    derive_master_key_with_params(passphrase, salt, &Argon2Params::default())
}

/// Derive a 32-byte master key with explicit Argon2id parameters.
///
/// Rejects parameters outside `Argon2Params::check` so a hand-edited
/// header or config can neither weaken nor stall the derivation.
pub fn derive_master_key_with_params(
    passphrase: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<[u8; MASTER_KEY_LEN]> {
    argon2_params.check().map_err(ObviousError::KeyDerivation)?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(MASTER_KEY_LEN),
    )
    .map_err(|e| ObviousError::KeyDerivation(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; MASTER_KEY_LEN];
    argon2
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|e| ObviousError::KeyDerivation(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
