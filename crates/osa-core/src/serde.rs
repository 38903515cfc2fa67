//! JSON and YAML helpers with consistent error mapping.

use std::collections::BTreeMap;
use std::fs;
use std::iter::FromIterator;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, OsaError};

fn serde_error(code: &str, err: impl ToString) -> OsaError {
    OsaError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic key ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, OsaError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json_write", err))?;
    Ok(bytes)
}

/// Serializes a value into pretty printed JSON, preserving field order.
pub fn to_pretty_json_string<T: Serialize>(value: &T) -> Result<String, OsaError> {
    serde_json::to_string_pretty(value).map_err(|err| serde_error("json_pretty", err))
}

/// Reads and deserializes a JSON document from disk.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, OsaError> {
    let bytes = fs::read(path).map_err(|err| OsaError::io("json_read", path, err))?;
    serde_json::from_slice(&bytes).map_err(|err| {
        OsaError::Serde(ErrorInfo::new("json_deserialize", err.to_string()).with_path(path))
    })
}

/// Writes a value to disk as pretty printed JSON.
pub fn write_pretty_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), OsaError> {
    let rendered = to_pretty_json_string(value)?;
    fs::write(path, rendered).map_err(|err| OsaError::io("json_write", path, err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, OsaError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}
