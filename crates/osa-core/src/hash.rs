//! Deterministic identifiers derived from canonical JSON.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::OsaError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, OsaError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}

/// Formats the leading 128 bits of a stable hash as a hyphenated UUID string.
///
/// Analysis definitions carry `uuid`/`version_uuid` fields; deriving them from
/// content keeps saved files reproducible between runs.
pub fn stable_uuid<T: Serialize>(value: &T) -> Result<String, OsaError> {
    let hex = stable_hash_string(value)?;
    Ok(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
