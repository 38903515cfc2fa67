use std::path::Path;

use osa_core::{read_json_file, write_pretty_json_file, ErrorInfo, OsaError};
use serde_json::{json, Value};

use crate::sanitize::{DEFAULT_FEATURE_REPORTS, FEATURE_LOCATION};

/// Outcome of the reinsertion pass over a saved analysis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchReport {
    /// Names of all workflow steps, in order.
    pub steps: Vec<String>,
    /// Number of steps that received the argument.
    pub patched: usize,
}

/// Argument record appended to `default_feature_reports`.
pub fn feature_location_record(value: &Value) -> Value {
    json!({
        "display_name": "URBANopt Feature Location",
        "display_name_short": "URBANopt Feature Location",
        "name": FEATURE_LOCATION,
        "value_type": "string",
        "default_value": "0",
        "value": value,
    })
}

/// Appends the `feature_location` record to every `default_feature_reports`
/// step of an `analysis.json` value. No matching step means nothing is patched.
pub fn reinsert_feature_location(document: &mut Value, value: &Value) -> Result<PatchReport, OsaError> {
    let workflow = document
        .pointer_mut("/analysis/problem/workflow")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            OsaError::Serde(ErrorInfo::new(
                "analysis_workflow_missing",
                "analysis.problem.workflow is not an array",
            ))
        })?;
    let mut report = PatchReport::default();
    for step in workflow.iter_mut() {
        let name = step
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if name == DEFAULT_FEATURE_REPORTS {
            let arguments = step
                .get_mut("arguments")
                .and_then(Value::as_array_mut)
                .ok_or_else(|| {
                    OsaError::Serde(
                        ErrorInfo::new("analysis_arguments_missing", "workflow step has no arguments array")
                            .with_context("step", name.clone()),
                    )
                })?;
            arguments.push(feature_location_record(value));
            report.patched += 1;
        }
        report.steps.push(name);
    }
    Ok(report)
}

/// Reads `analysis.json`, reinserts `feature_location`, and rewrites it pretty printed.
pub fn patch_analysis_file(path: &Path, value: &Value) -> Result<PatchReport, OsaError> {
    let mut document: Value = read_json_file(path)?;
    let report = reinsert_feature_location(&mut document, value)?;
    write_pretty_json_file(path, &document)?;
    Ok(report)
}
