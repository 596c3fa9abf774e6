//! One-shot database operations.
//!
//! Each function is a complete cycle: lock, read, decrypt, (mutate,
//! re-encrypt, write), unlock.  Nothing is cached between calls.

use std::path::Path;

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::Argon2Params;
use crate::errors::{ObviousError, Result};

use super::format::Format;
use super::lock::DatabaseLock;
use super::store::{CreateOptions, Vault};

/// Create an empty database.  Fails with `AlreadyExists` if `path` exists.
pub fn create(passphrase: &[u8], path: &Path, options: &CreateOptions) -> Result<()> {
    let _lock = DatabaseLock::exclusive(path)?;
    Vault::create(path, passphrase, options)?;
    info!(path = %path.display(), format = %options.format, "database created");
    Ok(())
}

/// Names of all secrets, in ascending order.
pub fn list(passphrase: &[u8], path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let _lock = DatabaseLock::shared(path)?;
    Ok(Vault::open(path, passphrase)?.names())
}

/// Insert or overwrite the secret `name`.
pub fn put(passphrase: &[u8], path: &Path, name: &str, secret: &[u8]) -> Result<()> {
    ensure_exists(path)?;
    let _lock = DatabaseLock::exclusive(path)?;
    let mut vault = Vault::open(path, passphrase)?;
    let replaced = vault.contains(name);
    vault.put(name, secret)?;
    vault.save()?;
    debug!(replaced, "stored secret");
    Ok(())
}

/// Decrypt the secret `name`.  Fails with `SecretNotFound` if absent.
pub fn get(passphrase: &[u8], path: &Path, name: &str) -> Result<Zeroizing<Vec<u8>>> {
    ensure_exists(path)?;
    let _lock = DatabaseLock::shared(path)?;
    Vault::open(path, passphrase)?.get(name)
}

/// Remove the secret `name`.
///
/// Removing a name that does not exist is a no-op: returns `false` and
/// leaves the file untouched.  The passphrase is still verified.
pub fn delete(passphrase: &[u8], path: &Path, name: &str) -> Result<bool> {
    ensure_exists(path)?;
    let _lock = DatabaseLock::exclusive(path)?;
    let mut vault = Vault::open(path, passphrase)?;
    if !vault.remove(name) {
        debug!("secret absent, nothing to delete");
        return Ok(false);
    }
    vault.save()?;
    Ok(true)
}

/// Rewrite a legacy database in the sealed format, keeping the passphrase.
pub fn migrate(passphrase: &[u8], path: &Path, argon2_params: &Argon2Params) -> Result<()> {
    ensure_exists(path)?;
    let _lock = DatabaseLock::exclusive(path)?;
    let mut vault = Vault::open(path, passphrase)?;
    if vault.format() == Format::Sealed {
        return Err(ObviousError::InvalidInput(format!(
            "{} already uses the sealed format",
            path.display()
        )));
    }

    let options = CreateOptions {
        format: Format::Sealed,
        argon2_params: *argon2_params,
    };
    vault.rekey(passphrase, &options)?;
    vault.save()?;
    info!(path = %path.display(), secrets = vault.len(), "database migrated to sealed format");
    Ok(())
}

/// Re-encrypt everything under `new_passphrase`, keeping the format.
///
/// Sealed databases get a fresh salt and keep their Argon2 parameters
/// unless `argon2_params` overrides them.
pub fn rekey(
    old_passphrase: &[u8],
    new_passphrase: &[u8],
    path: &Path,
    argon2_params: Option<&Argon2Params>,
) -> Result<()> {
    ensure_exists(path)?;
    let _lock = DatabaseLock::exclusive(path)?;
    let mut vault = Vault::open(path, old_passphrase)?;

    let options = CreateOptions {
        format: vault.format(),
        argon2_params: argon2_params
            .copied()
            .or_else(|| vault.kdf_params())
            .unwrap_or_default(),
    };
    vault.rekey(new_passphrase, &options)?;
    vault.save()?;
    info!(path = %path.display(), "database re-keyed");
    Ok(())
}

/// Fail with `NotFound` before any lock file is created next to a
/// database that does not exist.
fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ObviousError::NotFound(path.to_path_buf()));
    }
    Ok(())
}
