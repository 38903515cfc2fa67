use osa_core::{
    from_yaml_slice, read_json_file, stable_hash_string, stable_uuid, to_canonical_json_bytes,
    write_pretty_json_file, OsaError,
};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn canonical_json_sorts_nested_keys() {
    let value = json!({"b": 1, "a": {"z": true, "m": [ {"y": 1, "x": 2} ]}});
    let bytes = to_canonical_json_bytes(&value).expect("canonical");
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"a":{"m":[{"x":2,"y":1}],"z":true},"b":1}"#
    );
}

#[test]
fn stable_ids_are_deterministic() {
    let first = stable_hash_string(&("Building 7", "set_run_period")).unwrap();
    let second = stable_hash_string(&("Building 7", "set_run_period")).unwrap();
    assert_eq!(first, second);
    let uuid = stable_uuid(&("Building 7", "set_run_period")).unwrap();
    assert_eq!(uuid.len(), 36);
    assert_eq!(uuid.matches('-').count(), 4);
    assert!(first.starts_with(&uuid[0..8]));
}

#[test]
fn pretty_json_file_roundtrip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("doc.json");
    let value = json!({"steps": [{"measure_dir_name": "a", "arguments": {}}]});
    write_pretty_json_file(&path, &value).expect("write");
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));
    let restored: serde_json::Value = read_json_file(&path).expect("read");
    assert_eq!(restored, value);
}

#[test]
fn missing_json_file_is_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = read_json_file::<serde_json::Value>(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, OsaError::Io(_)));
}

#[test]
fn invalid_yaml_is_serde_error() {
    let err = from_yaml_slice::<Vec<u32>>(b"{not: [valid").unwrap_err();
    assert!(matches!(err, OsaError::Serde(_)));
}
