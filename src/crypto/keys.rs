//! Sub-key derivation using HKDF-SHA256.
//!
//! From a single Argon2id master key we derive:
//! - the **container key** that seals the whole secrets map,
//! - a **per-entry** key for each secret name,
//! - a **key-check** value stored in the header so a wrong password
//!   can be told apart from a damaged file.

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::kdf::MASTER_KEY_LEN;
use crate::errors::{ObviousError, Result};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    // The master key already came out of Argon2id, so no extract salt.
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| ObviousError::KeyDerivation(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; MASTER_KEY_LEN],
}

impl MasterKey {
    pub fn new(bytes: [u8; MASTER_KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Key that seals the serialized container.
    pub fn container_key(&self) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        hkdf_derive(&self.bytes, b"obvious-container")
    }

    /// Key for one secret, bound to its name.
    pub fn entry_key(&self, name: &str) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        let info = format!("obvious-entry:{name}");
        hkdf_derive(&self.bytes, info.as_bytes())
    }

    /// Public verifier written to the header.
    pub fn key_check(&self) -> Result<Vec<u8>> {
        Ok(hkdf_derive(&self.bytes, b"obvious-key-check")?.to_vec())
    }

    /// Constant-time comparison against a stored verifier.
    pub fn matches_key_check(&self, stored: &[u8]) -> Result<bool> {
        let expected = self.key_check()?;
        Ok(expected.as_slice().ct_eq(stored).into())
    }
}

/// A legacy 16-byte key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct LegacyKey {
    bytes: [u8; super::kdf::LEGACY_KEY_LEN],
}

impl LegacyKey {
    pub fn from_passphrase(passphrase: &[u8]) -> Self {
        Self {
            bytes: super::kdf::derive_key(passphrase),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
