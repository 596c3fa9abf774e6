//! Vault module: the encrypted secret database.
//!
//! This module provides:
//! - The decrypted `Container` map and its JSON encoding (`container`)
//! - Legacy and sealed on-disk layouts plus atomic writes (`format`)
//! - Advisory locking of the read-modify-write cycle (`lock`)
//! - The `Vault` handle for an unlocked database (`store`)
//! - One-shot create/list/put/get/delete/migrate/rekey cycles (`ops`)

pub mod container;
pub mod format;
pub mod lock;
pub mod ops;
pub mod store;

// Re-export the most commonly used items.
pub use container::Container;
pub use format::{Format, SealedHeader};
pub use ops::{create, delete, get, list, migrate, put, rekey};
pub use store::{CreateOptions, Vault};
