#![deny(missing_docs)]
#![doc = "Shared error, serialization, and hashing helpers for the OSA calibration workspace."]

pub mod errors;
pub mod hash;
pub mod serde;

pub use errors::{ErrorInfo, OsaError};
pub use hash::{stable_hash_string, stable_uuid};
pub use self::serde::{
    from_yaml_slice, read_json_file, to_canonical_json_bytes, to_pretty_json_string,
    write_pretty_json_file,
};
