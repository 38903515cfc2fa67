use osa_analysis::OswDocument;
use serde_json::Value;
use tracing::debug;

/// Step whose `feature_location` argument is not declared in its measure XML.
pub const DEFAULT_FEATURE_REPORTS: &str = "default_feature_reports";
/// Argument stripped before conversion and reinserted after saving.
pub const FEATURE_LOCATION: &str = "feature_location";

/// Removes every step whose measure directory name is in `names`.
/// Returns the number of removed steps.
pub fn remove_measures<S: AsRef<str>>(doc: &mut OswDocument, names: &[S]) -> usize {
    let before = doc.steps.len();
    doc.steps.retain(|step| {
        !names
            .iter()
            .any(|name| name.as_ref() == step.measure_dir_name)
    });
    before - doc.steps.len()
}

/// Removes `feature_location` from every `default_feature_reports` step and
/// returns the value taken from the last such step (`null` when absent).
pub fn strip_feature_location(doc: &mut OswDocument) -> Value {
    let mut captured = Value::Null;
    for step in doc
        .steps
        .iter_mut()
        .filter(|step| step.measure_dir_name == DEFAULT_FEATURE_REPORTS)
    {
        captured = step
            .arguments
            .shift_remove(FEATURE_LOCATION)
            .unwrap_or(Value::Null);
    }
    captured
}

/// Drops the listed measures, then strips `feature_location`.
pub fn sanitize<S: AsRef<str>>(doc: &mut OswDocument, names: &[S]) -> Value {
    let removed = remove_measures(doc, names);
    let captured = strip_feature_location(doc);
    debug!(removed, remaining = doc.steps.len(), feature_location = %captured, "sanitized OSW");
    captured
}
