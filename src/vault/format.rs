//! On-disk database formats and atomic persistence.
//!
//! Two layouts exist.  The **legacy** layout is just the stream-cipher
//! output, with no framing at all:
//!
//! ```text
//! [IV: 16 bytes][AES-128-CFB(container JSON)]
//! ```
//!
//! The **sealed** layout carries everything needed to re-derive the key:
//!
//! ```text
//! [OBVS: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][nonce: 12][AES-256-GCM(container JSON) + tag: 16]
//! ```
//!
//! - **Magic** (`OBVS`) plus version `2` identifies a sealed file;
//!   anything else is read as legacy.
//! - **Header JSON**: serialized `SealedHeader` (salt, Argon2 params,
//!   key-check value).  Its exact bytes are the associated data of the
//!   container seal, so any header edit fails authentication.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::SALT_LEN;
use crate::crypto::Argon2Params;
use crate::errors::{ObviousError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every sealed database.
const MAGIC: &[u8; 4] = b"OBVS";

/// Version byte of the sealed layout.  Legacy files have no version.
pub const SEALED_VERSION: u8 = 2;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

/// Upper bound on the header so a corrupt length cannot ask for gigabytes.
const MAX_HEADER_LEN: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Format selection
// ---------------------------------------------------------------------------

/// Which layout a database uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// MD5-derived key, AES-128-CFB, no integrity protection.
    Legacy,
    /// Argon2id-derived key, AES-256-GCM.
    #[default]
    Sealed,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Legacy => f.write_str("legacy"),
            Format::Sealed => f.write_str("sealed"),
        }
    }
}

// ---------------------------------------------------------------------------
// SealedHeader
// ---------------------------------------------------------------------------

/// Plaintext metadata at the front of a sealed database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedHeader {
    /// Argon2id salt (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Argon2id parameters the master key was derived with.
    pub kdf: Argon2Params,

    /// HKDF verifier of the master key (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub key_check: Vec<u8>,

    /// When this key (salt) was generated.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A database file split into its parts, before any decryption.
pub enum RawDatabase {
    Legacy {
        blob: Vec<u8>,
    },
    Sealed {
        header: SealedHeader,
        /// Header JSON exactly as stored; authenticated as associated data.
        header_bytes: Vec<u8>,
        body: Vec<u8>,
    },
}

impl RawDatabase {
    pub fn format(&self) -> Format {
        match self {
            RawDatabase::Legacy { .. } => Format::Legacy,
            RawDatabase::Sealed { .. } => Format::Sealed,
        }
    }
}

/// Read a database file from disk and split it into its parts.
pub fn read_database(path: &Path) -> Result<RawDatabase> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ObviousError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    parse_database(data)
}

/// Split raw file bytes into their parts.
pub fn parse_database(data: Vec<u8>) -> Result<RawDatabase> {
    if data.is_empty() {
        return Err(ObviousError::Malformed("database file is empty".into()));
    }

    if data.len() < PREFIX_LEN || &data[0..4] != MAGIC || data[4] != SEALED_VERSION {
        return Ok(RawDatabase::Legacy { blob: data });
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| ObviousError::Malformed("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32)
        .ok()
        .filter(|len| *len <= MAX_HEADER_LEN)
        .ok_or_else(|| {
            ObviousError::Malformed(format!("header length {header_len_u32} is implausible"))
        })?;

    let header_end = PREFIX_LEN + header_len;
    if header_end > data.len() {
        return Err(ObviousError::Malformed(
            "header length exceeds file size".into(),
        ));
    }

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let body = data[header_end..].to_vec();

    let header: SealedHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| ObviousError::Malformed(format!("header JSON: {e}")))?;
    header.kdf.check().map_err(ObviousError::Malformed)?;
    if header.salt.len() != SALT_LEN {
        return Err(ObviousError::Malformed(format!(
            "header salt is {} bytes, expected {SALT_LEN}",
            header.salt.len()
        )));
    }

    Ok(RawDatabase::Sealed {
        header,
        header_bytes,
        body,
    })
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serialize a header once; the same bytes must be reused as AAD and
/// written to disk.
pub fn encode_header(header: &SealedHeader) -> Result<Vec<u8>> {
    serde_json::to_vec(header).map_err(|e| ObviousError::Serialization(format!("header: {e}")))
}

/// Frame a sealed database: prefix, header, sealed body.
pub fn encode_sealed(header_bytes: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        ObviousError::Serialization(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + body.len());
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(SEALED_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(header_bytes);
    buf.extend_from_slice(body);
    Ok(buf)
}

/// Path of the scratch file used by `write_atomic` for `path`.
pub fn temp_path(path: &Path) -> Result<PathBuf> {
    sidecar_path(path, "tmp")
}

/// `<dir>/.<file name>.<suffix>`, next to the database itself.
pub(crate) fn sidecar_path(path: &Path, suffix: &str) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        ObviousError::InvalidInput(format!("{} is not a file path", path.display()))
    })?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(parent.join(format!(".{}.{suffix}", file_name.to_string_lossy())))
}

/// Write `bytes` to `path` **atomically** with owner-only permissions.
///
/// 1. Write to a temp file in the same directory.
/// 2. Flush it to stable storage.
/// 3. Rename the temp file over the target path.
///
/// Readers (and a crash) see either the old file or the new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path)?;

    let result = (|| -> Result<()> {
        let mut file = open_private(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Create (or truncate) a file readable and writable by the owner only.
pub(crate) fn open_private(path: &Path) -> Result<fs::File> {
    #[cfg(unix)]
    let file = {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // `mode` only applies on creation; a stale file keeps its old bits.
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
        file
    };

    #[cfg(not(unix))]
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    Ok(file)
}

/// Open (creating if needed) a lock file without touching its contents.
pub(crate) fn open_lock_file(path: &Path) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    Ok(options.open(path)?)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn header() -> SealedHeader {
        SealedHeader {
            salt: vec![1; 16],
            kdf: Argon2Params::default(),
            key_check: vec![2; 32],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sealed_frame_roundtrip() {
        let header_bytes = encode_header(&header()).unwrap();
        let data = encode_sealed(&header_bytes, b"body-bytes").unwrap();

        match parse_database(data).unwrap() {
            RawDatabase::Sealed {
                header: parsed,
                header_bytes: parsed_bytes,
                body,
            } => {
                assert_eq!(parsed_bytes, header_bytes);
                assert_eq!(body, b"body-bytes");
                assert_eq!(parsed.salt, vec![1; 16]);
                assert_eq!(parsed.kdf, Argon2Params::default());
            }
            RawDatabase::Legacy { .. } => panic!("expected sealed"),
        }
    }

    #[test]
    fn unframed_bytes_are_legacy() {
        let raw = parse_database(vec![0xAB; 40]).unwrap();
        assert_eq!(raw.format(), Format::Legacy);
    }

    #[test]
    fn magic_with_other_version_is_legacy() {
        let mut data = b"OBVS".to_vec();
        data.push(9);
        data.extend_from_slice(&[0u8; 30]);
        assert_eq!(parse_database(data).unwrap().format(), Format::Legacy);
    }

    #[test]
    fn empty_file_is_malformed() {
        assert!(matches!(
            parse_database(Vec::new()),
            Err(ObviousError::Malformed(_))
        ));
    }

    #[test]
    fn oversized_header_length_is_malformed() {
        let mut data = b"OBVS".to_vec();
        data.push(SEALED_VERSION);
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(b"{}");
        assert!(matches!(
            parse_database(data),
            Err(ObviousError::Malformed(_))
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent");
        assert!(matches!(
            read_database(&path),
            Err(ObviousError::NotFound(_))
        ));
    }

    #[test]
    fn write_atomic_replaces_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_path(&path).unwrap().exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_sets_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db");
        write_atomic(&path, b"data").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn sidecar_of_bare_file_name_is_in_cwd() {
        let p = sidecar_path(Path::new("secrets"), "lock").unwrap();
        assert_eq!(p, PathBuf::from("./.secrets.lock"));
    }
}
