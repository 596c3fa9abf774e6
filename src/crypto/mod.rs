//! Cryptographic primitives for obvious.
//!
//! This module provides:
//! - AES-128-CFB stream encryption for legacy databases (`stream`)
//! - AES-256-GCM authenticated encryption for sealed databases (`aead`)
//! - MD5 legacy keys and Argon2id password-based key derivation (`kdf`)
//! - Zeroizing key wrappers and HKDF sub-keys (`keys`)

pub mod aead;
pub mod kdf;
pub mod keys;
pub mod stream;

pub use kdf::{
    derive_key, derive_master_key, derive_master_key_with_params, generate_salt, Argon2Params,
};
pub use keys::{LegacyKey, MasterKey};
pub use stream::{decrypt, encrypt};
