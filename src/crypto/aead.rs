//! AES-256-GCM authenticated encryption for the sealed format.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `open` splits the nonce back out
//! before decrypting.  Callers may bind extra context (the file
//! header, a secret name) as associated data.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{ObviousError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt and authenticate `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext || tag).
pub fn seal(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if plaintext.is_empty() {
        return Err(ObviousError::InvalidInput("plaintext must not be empty".into()));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| ObviousError::InvalidInput(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| ObviousError::InvalidInput(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `seal` with the same `aad`.
///
/// A bad tag means the key is wrong or the bytes were altered; this
/// layer cannot tell which, so it reports `Tampered`.
pub fn open(key: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(ObviousError::Malformed(format!(
            "sealed blob is {} bytes, need at least {}",
            sealed.len(),
            NONCE_LEN + TAG_LEN
        )));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| ObviousError::InvalidInput(format!("invalid key length: {e}")))?;

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| ObviousError::Tampered)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x5A; 32];

    #[test]
    fn seal_open_roundtrip_with_aad() {
        let sealed = seal(&KEY, b"s3cr3t", b"email").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 6 + TAG_LEN);
        assert_eq!(open(&KEY, &sealed, b"email").unwrap(), b"s3cr3t");
    }

    #[test]
    fn open_with_other_aad_fails() {
        let sealed = seal(&KEY, b"s3cr3t", b"email").unwrap();
        assert!(matches!(
            open(&KEY, &sealed, b"bank"),
            Err(ObviousError::Tampered)
        ));
    }

    #[test]
    fn flipped_byte_is_detected() {
        let mut sealed = seal(&KEY, b"value", b"").unwrap();
        sealed[NONCE_LEN] ^= 0x01;
        assert!(matches!(open(&KEY, &sealed, b""), Err(ObviousError::Tampered)));
    }

    #[test]
    fn short_blob_is_malformed() {
        assert!(matches!(
            open(&KEY, &[0u8; NONCE_LEN + TAG_LEN - 1], b""),
            Err(ObviousError::Malformed(_))
        ));
    }

    #[test]
    fn empty_plaintext_rejected() {
        assert!(matches!(
            seal(&KEY, b"", b""),
            Err(ObviousError::InvalidInput(_))
        ));
    }
}
