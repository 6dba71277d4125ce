use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, PubeError};

/// Serializes a payload to JSON with object keys in sorted order.
///
/// Going through [`serde_json::Value`] sorts map keys, so two equal payloads
/// always produce the same bytes regardless of field declaration order.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, PubeError> {
    let value = serde_json::to_value(value)
        .map_err(|err| PubeError::Serde(ErrorInfo::new("json-encode", err.to_string())))?;
    serde_json::to_vec_pretty(&value)
        .map_err(|err| PubeError::Serde(ErrorInfo::new("json-encode", err.to_string())))
}

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, PubeError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
