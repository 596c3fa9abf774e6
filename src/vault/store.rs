//! The open-database handle.
//!
//! `Vault` ties the container, the format layer and the crypto layer
//! together.  A handle is built by `Vault::create` or `Vault::open`,
//! mutated in memory, and written back whole with `save`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{
    aead, derive_master_key_with_params, generate_salt, stream, Argon2Params, LegacyKey, MasterKey,
};
use crate::errors::{ObviousError, Result};

use super::container::Container;
use super::format::{self, Format, RawDatabase, SealedHeader};

/// Longest secret name accepted by `put`, in bytes.
const MAX_NAME_LEN: usize = 256;

/// How a new database (or a re-keyed one) should be protected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    pub format: Format,
    /// Ignored for the legacy format.
    pub argon2_params: Argon2Params,
}

/// Key material for one database, in whichever scheme it uses.
enum Keys {
    /// The same 16-byte key protects the container and every entry.
    Legacy(LegacyKey),
    Sealed {
        master: MasterKey,
        header: SealedHeader,
        /// Serialized once; written to disk and used as AAD verbatim.
        header_bytes: Vec<u8>,
    },
}

impl Keys {
    fn generate(passphrase: &[u8], options: &CreateOptions) -> Result<Self> {
        match options.format {
            Format::Legacy => Ok(Keys::Legacy(LegacyKey::from_passphrase(passphrase))),
            Format::Sealed => {
                let salt = generate_salt();
                let master = derive_master(passphrase, &salt, &options.argon2_params)?;
                let header = SealedHeader {
                    salt: salt.to_vec(),
                    kdf: options.argon2_params,
                    key_check: master.key_check()?,
                    created_at: Utc::now(),
                };
                let header_bytes = format::encode_header(&header)?;
                Ok(Keys::Sealed {
                    master,
                    header,
                    header_bytes,
                })
            }
        }
    }

    /// Re-derive the master key from a stored header and verify it.
    fn unlock_sealed(
        passphrase: &[u8],
        header: SealedHeader,
        header_bytes: Vec<u8>,
    ) -> Result<Self> {
        let master = derive_master(passphrase, &header.salt, &header.kdf)?;
        if !master.matches_key_check(&header.key_check)? {
            return Err(ObviousError::WrongPassword);
        }
        Ok(Keys::Sealed {
            master,
            header,
            header_bytes,
        })
    }

    fn format(&self) -> Format {
        match self {
            Keys::Legacy(_) => Format::Legacy,
            Keys::Sealed { .. } => Format::Sealed,
        }
    }

    fn encrypt_entry(&self, name: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Keys::Legacy(key) => stream::encrypt(key.as_bytes(), plaintext),
            Keys::Sealed { master, .. } => {
                let key = master.entry_key(name)?;
                aead::seal(&key[..], plaintext, name.as_bytes())
            }
        }
    }

    fn decrypt_entry(&self, name: &str, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Keys::Legacy(key) => stream::decrypt(key.as_bytes(), blob)
                .map(Zeroizing::new)
                .map_err(|e| match e {
                    ObviousError::InvalidInput(_) | ObviousError::Malformed(_) => {
                        ObviousError::Malformed(format!("entry '{name}' is damaged"))
                    }
                    other => other,
                }),
            Keys::Sealed { master, .. } => {
                let key = master.entry_key(name)?;
                aead::open(&key[..], blob, name.as_bytes()).map(Zeroizing::new)
            }
        }
    }

    /// Encrypt a serialized container into complete file bytes.
    fn seal_file(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Keys::Legacy(key) => stream::encrypt(key.as_bytes(), plaintext),
            Keys::Sealed {
                master,
                header_bytes,
                ..
            } => {
                let key = master.container_key()?;
                let body = aead::seal(&key[..], plaintext, header_bytes)?;
                format::encode_sealed(header_bytes, &body)
            }
        }
    }

    /// Decrypt the container part of a file.  For legacy files this
    /// cannot fail on a wrong key; it just yields garbage.
    fn open_file_body(&self, body: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Keys::Legacy(key) => stream::decrypt(key.as_bytes(), body).map(Zeroizing::new),
            Keys::Sealed {
                master,
                header_bytes,
                ..
            } => {
                let key = master.container_key()?;
                aead::open(&key[..], body, header_bytes).map(Zeroizing::new)
            }
        }
    }
}

fn derive_master(passphrase: &[u8], salt: &[u8], params: &Argon2Params) -> Result<MasterKey> {
    let mut bytes = derive_master_key_with_params(passphrase, salt, params)?;
    let master = MasterKey::new(bytes);
    bytes.zeroize();
    Ok(master)
}

fn check_passphrase(passphrase: &[u8]) -> Result<()> {
    if passphrase.is_empty() {
        return Err(ObviousError::InvalidInput(
            "passphrase must not be empty".into(),
        ));
    }
    Ok(())
}

/// An unlocked database.
pub struct Vault {
    path: PathBuf,
    keys: Keys,
    container: Container,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new, empty database at `path` and write it.
    pub fn create(path: &Path, passphrase: &[u8], options: &CreateOptions) -> Result<Self> {
        check_passphrase(passphrase)?;
        if path.exists() {
            return Err(ObviousError::AlreadyExists(path.to_path_buf()));
        }

        let vault = Self {
            path: path.to_path_buf(),
            keys: Keys::generate(passphrase, options)?,
            container: Container::new(),
        };
        vault.save()?;

        debug!(path = %path.display(), format = %options.format, "created database");
        Ok(vault)
    }

    /// Open and decrypt an existing database.
    ///
    /// A wrong passphrase surfaces as `WrongPassword` for both formats:
    /// the sealed format checks the stored verifier, the legacy format
    /// infers it from a container that does not parse.
    pub fn open(path: &Path, passphrase: &[u8]) -> Result<Self> {
        check_passphrase(passphrase)?;

        let (keys, container) = match format::read_database(path)? {
            RawDatabase::Legacy { blob } => {
                let keys = Keys::Legacy(LegacyKey::from_passphrase(passphrase));
                let plaintext = keys.open_file_body(&blob)?;
                let container =
                    Container::from_json(&plaintext).map_err(|_| ObviousError::WrongPassword)?;
                warn!(
                    path = %path.display(),
                    "database uses the legacy format; run `obvious migrate` to upgrade"
                );
                (keys, container)
            }
            RawDatabase::Sealed {
                header,
                header_bytes,
                body,
            } => {
                let keys = Keys::unlock_sealed(passphrase, header, header_bytes)?;
                let plaintext = keys.open_file_body(&body)?;
                (keys, Container::from_json(&plaintext)?)
            }
        };

        debug!(
            path = %path.display(),
            format = %keys.format(),
            secrets = container.secrets.len(),
            "opened database"
        );

        Ok(Self {
            path: path.to_path_buf(),
            keys,
            container,
        })
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Secret names in ascending order.
    pub fn names(&self) -> Vec<String> {
        self.container.secrets.keys().cloned().collect()
    }

    /// Encrypt `secret` and store it under `name`, replacing any
    /// previous value.
    pub fn put(&mut self, name: &str, secret: &[u8]) -> Result<()> {
        validate_secret_name(name)?;
        if secret.is_empty() {
            return Err(ObviousError::InvalidInput("secret must not be empty".into()));
        }

        let blob = self.keys.encrypt_entry(name, secret)?;
        self.container.secrets.insert(name.to_string(), blob);
        Ok(())
    }

    /// Decrypt and return the secret stored under `name`.
    pub fn get(&self, name: &str) -> Result<Zeroizing<Vec<u8>>> {
        let blob = self
            .container
            .secrets
            .get(name)
            .ok_or_else(|| ObviousError::SecretNotFound(name.to_string()))?;
        self.keys.decrypt_entry(name, blob)
    }

    /// Remove `name`.  Returns `false` if it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        self.container.secrets.remove(name).is_some()
    }

    /// Re-encrypt the container and every entry under a new passphrase,
    /// optionally switching format.  Nothing is written until `save`.
    pub fn rekey(&mut self, new_passphrase: &[u8], options: &CreateOptions) -> Result<()> {
        check_passphrase(new_passphrase)?;
        let new_keys = Keys::generate(new_passphrase, options)?;

        let mut container = Container::new();
        for (name, blob) in &self.container.secrets {
            let plaintext = self.keys.decrypt_entry(name, blob)?;
            let reencrypted = new_keys.encrypt_entry(name, &plaintext)?;
            container.secrets.insert(name.clone(), reencrypted);
        }

        debug!(
            path = %self.path.display(),
            from = %self.keys.format(),
            to = %new_keys.format(),
            secrets = container.secrets.len(),
            "re-encrypted database"
        );
        self.keys = new_keys;
        self.container = container;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize, encrypt and atomically replace the file on disk.
    pub fn save(&self) -> Result<()> {
        let plaintext = self.container.to_json()?;
        let bytes = self.keys.seal_file(&plaintext)?;
        format::write_atomic(&self.path, &bytes)?;

        debug!(
            path = %self.path.display(),
            secrets = self.container.secrets.len(),
            "saved database"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.keys.format()
    }

    /// Number of secrets stored.
    pub fn len(&self) -> usize {
        self.container.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.container.secrets.is_empty()
    }

    /// Metadata-only check; nothing is decrypted.
    pub fn contains(&self, name: &str) -> bool {
        self.container.secrets.contains_key(name)
    }

    /// Argon2id parameters of a sealed database.
    pub fn kdf_params(&self) -> Option<Argon2Params> {
        match &self.keys {
            Keys::Sealed { header, .. } => Some(header.kdf),
            Keys::Legacy(_) => None,
        }
    }

    /// When the current key of a sealed database was generated.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match &self.keys {
            Keys::Sealed { header, .. } => Some(header.created_at),
            Keys::Legacy(_) => None,
        }
    }
}

/// Validate that a secret name is storable.
///
/// Must be non-empty, at most 256 bytes, and free of control
/// characters.  Only enforced on write so that databases written by
/// older, laxer versions stay fully readable.
fn validate_secret_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ObviousError::InvalidInput(
            "secret name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ObviousError::InvalidInput(format!(
            "secret name cannot exceed {MAX_NAME_LEN} bytes"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(ObviousError::InvalidInput(format!(
            "secret name {name:?} contains control characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(validate_secret_name("email").is_ok());
        assert!(validate_secret_name("bank / savings").is_ok());
        assert!(validate_secret_name("wi-fi.home").is_ok());
        assert!(validate_secret_name("пароль").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_secret_name("").is_err());
    }

    #[test]
    fn rejects_control_chars() {
        assert!(validate_secret_name("line\nbreak").is_err());
        assert!(validate_secret_name("tab\there").is_err());
    }

    #[test]
    fn rejects_too_long_name() {
        assert!(validate_secret_name(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_secret_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
