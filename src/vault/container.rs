//! The decrypted container: secret name -> encrypted entry blob.
//!
//! Serialized as JSON `{"secrets": {"<name>": "<base64 blob>"}}`.  The
//! base64 encoding of byte arrays matches what the first generation of
//! this tool wrote, so legacy databases decode with the same type.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{ObviousError, Result};

/// In-memory view of one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Entry blobs keyed by secret name.  Each blob is itself an
    /// independently encrypted secret.
    #[serde(serialize_with = "encode_secrets", deserialize_with = "decode_secrets")]
    pub secrets: BTreeMap<String, Vec<u8>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON.  The buffer is wiped on drop.
    pub fn to_json(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| ObviousError::Serialization(format!("container: {e}")))
    }

    /// Parse the JSON produced by `to_json`.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ObviousError::Malformed(format!("container JSON: {e}")))
    }
}

fn encode_secrets<S>(
    secrets: &BTreeMap<String, Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(secrets.len()))?;
    for (name, blob) in secrets {
        map.serialize_entry(name, &BASE64.encode(blob))?;
    }
    map.end()
}

fn decode_secrets<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Vec<u8>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // Older writers emitted `null` for a database that never held a secret.
    let encoded: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
    encoded
        .unwrap_or_default()
        .into_iter()
        .map(|(name, b64)| {
            BASE64
                .decode(&b64)
                .map(|blob| (name, blob))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}
