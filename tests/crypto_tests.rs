//! Integration tests for the obvious crypto module.

use obvious::crypto::aead::{open, seal, NONCE_LEN, TAG_LEN};
use obvious::crypto::stream::IV_LEN;
use obvious::crypto::{decrypt, derive_key, encrypt};
use obvious::errors::ObviousError;

// ---------------------------------------------------------------------------
// Legacy stream cipher round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = derive_key(b"my secret");
    let plaintext = b"my super sensitive data";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // IV prefix plus a body exactly as long as the plaintext.
    assert_eq!(ciphertext.len(), IV_LEN + plaintext.len());

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = derive_key(b"my secret");
    let plaintext = b"hello world";

    let ct1 = encrypt(&key, plaintext).expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext).expect("encrypt 2");

    // Each call draws a new random IV, so the output must differ.
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
    assert_ne!(ct1[..IV_LEN], ct2[..IV_LEN]);

    assert_eq!(decrypt(&key, &ct1).unwrap(), plaintext);
    assert_eq!(decrypt(&key, &ct2).unwrap(), plaintext);
}

#[test]
fn roundtrip_of_various_lengths() {
    let key = derive_key(b"k");
    for len in [1usize, 15, 16, 17, 31, 32, 33, 1000] {
        let plaintext: Vec<u8> = (0..len).map(|i| (i * 7 % 251) as u8).collect();
        let ct = encrypt(&key, &plaintext).unwrap();
        assert_eq!(decrypt(&key, &ct).unwrap(), plaintext, "length {len}");
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn encrypt_rejects_empty_key_or_data() {
    let key = derive_key(b"test key");
    assert!(matches!(
        encrypt(b"", b"test data"),
        Err(ObviousError::InvalidInput(_))
    ));
    assert!(matches!(
        encrypt(&key, b""),
        Err(ObviousError::InvalidInput(_))
    ));
}

#[test]
fn decrypt_rejects_empty_key_or_data() {
    let key = derive_key(b"my super secret key");
    let ciphertext = encrypt(&key, b"hello world").unwrap();

    assert!(matches!(
        decrypt(b"", &ciphertext),
        Err(ObviousError::InvalidInput(_))
    ));
    assert!(matches!(
        decrypt(&key, b""),
        Err(ObviousError::InvalidInput(_))
    ));
}

#[test]
fn decrypt_with_truncated_data_is_malformed() {
    let key = derive_key(b"pw");
    for len in 1..IV_LEN {
        assert!(
            matches!(decrypt(&key, &vec![0u8; len]), Err(ObviousError::Malformed(_))),
            "{len}-byte blob must be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// Authenticated sealing
// ---------------------------------------------------------------------------

#[test]
fn seal_detects_any_flipped_byte() {
    let key = [0x33u8; 32];
    let sealed = seal(&key, b"VALUE=abc", b"header").unwrap();
    assert_eq!(sealed.len(), NONCE_LEN + 9 + TAG_LEN);

    for i in 0..sealed.len() {
        let mut corrupted = sealed.clone();
        corrupted[i] ^= 0x80;
        assert!(
            open(&key, &corrupted, b"header").is_err(),
            "flip at byte {i} went unnoticed"
        );
    }
}

#[test]
fn seal_with_wrong_key_fails() {
    let sealed = seal(&[0x11u8; 32], b"TOP_SECRET=42", b"").unwrap();
    assert!(matches!(
        open(&[0x22u8; 32], &sealed, b""),
        Err(ObviousError::Tampered)
    ));
}

// ---------------------------------------------------------------------------
// Known-answer vector (NIST SP 800-38A, F.3.13 CFB128-AES128)
// ---------------------------------------------------------------------------

#[test]
fn decrypt_matches_nist_cfb128_vector() {
    let key: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ];
    let iv: [u8; 16] = core::array::from_fn(|i| i as u8);
    let ciphertext: [u8; 16] = [
        0x3b, 0x3f, 0xd9, 0x2e, 0xb7, 0x2d, 0xad, 0x20, 0x33, 0x34, 0x49, 0xf8, 0xe8, 0x3c, 0xfb,
        0x4a,
    ];
    let expected: [u8; 16] = [
        0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17,
        0x2a,
    ];

    let mut blob = iv.to_vec();
    blob.extend_from_slice(&ciphertext);
    assert_eq!(decrypt(&key, &blob).unwrap(), expected);
}
