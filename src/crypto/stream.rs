//! Legacy stream encryption: AES-128 in CFB mode.
//!
//! Every call to `encrypt` draws a fresh random 16-byte IV and
//! prepends it to the output.  CFB turns the block cipher into a
//! keystream, so the ciphertext is exactly as long as the plaintext.
//!
//! Layout of the returned byte buffer:
//!   [ 16-byte IV | ciphertext (same length as plaintext) ]
//!
//! There is no authentication tag.  Decrypting with the wrong key
//! "succeeds" and yields garbage; callers have to detect that one
//! layer up.

use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::RngCore;

use crate::errors::{ObviousError, Result};

type Aes128CfbEnc = cfb_mode::Encryptor<aes::Aes128>;
type Aes128CfbDec = cfb_mode::Decryptor<aes::Aes128>;

/// AES block size, which is also the IV length.
pub const IV_LEN: usize = 16;

/// Encrypt `plaintext` with a 16-byte `key`.
///
/// Fails with `InvalidInput` when the key or the plaintext is empty.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() || plaintext.is_empty() {
        return Err(ObviousError::InvalidInput(
            "key and plaintext must not be empty".into(),
        ));
    }

    let mut output = vec![0u8; IV_LEN + plaintext.len()];
    let (iv, body) = output.split_at_mut(IV_LEN);
    rand::rng().fill_bytes(iv);
    body.copy_from_slice(plaintext);

    Aes128CfbEnc::new_from_slices(key, iv)
        .map_err(|e| ObviousError::InvalidInput(format!("invalid key length: {e}")))?
        .encrypt(body);

    Ok(output)
}

/// Decrypt a blob produced by `encrypt`.
///
/// Fails with `InvalidInput` when the key or blob is empty and with
/// `Malformed` when the blob cannot even hold an IV.
pub fn decrypt(key: &[u8], blob: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() || blob.is_empty() {
        return Err(ObviousError::InvalidInput(
            "key and ciphertext must not be empty".into(),
        ));
    }
    if blob.len() < IV_LEN {
        return Err(ObviousError::Malformed(format!(
            "ciphertext is {} bytes, shorter than the {IV_LEN}-byte IV",
            blob.len()
        )));
    }

    let (iv, ciphertext) = blob.split_at(IV_LEN);
    let mut plaintext = ciphertext.to_vec();

    Aes128CfbDec::new_from_slices(key, iv)
        .map_err(|e| ObviousError::InvalidInput(format!("invalid key length: {e}")))?
        .decrypt(&mut plaintext);

    Ok(plaintext)
}
