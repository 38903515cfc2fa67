use std::path::{Path, PathBuf};

use osa_core::{stable_uuid, ErrorInfo, OsaError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Argument every workflow measure carries to toggle it off during a run.
pub const SKIP_ARGUMENT: &str = "__SKIP__";

/// Measure argument record as stored in the analysis definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub display_name: String,
    pub display_name_short: String,
    pub name: String,
    pub value_type: String,
    pub default_value: Value,
    pub value: Value,
}

impl Argument {
    /// Builds an argument whose declared type is inferred from `value`.
    pub fn from_value(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            display_name_short: name.clone(),
            value_type: infer_value_type(&value).to_string(),
            default_value: value.clone(),
            value,
            name,
        }
    }

    fn skip() -> Self {
        let mut argument = Self::from_value(SKIP_ARGUMENT, Value::Bool(false));
        argument.display_name = "Skip Entire Measure".to_string();
        argument.display_name_short = argument.display_name.clone();
        argument
    }
}

fn infer_value_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "double",
        Value::Number(_) => "integer",
        _ => "string",
    }
}

/// Probability distribution family for a perturbation variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Uniform,
}

/// Distribution descriptor shared by value across variable registrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(rename = "type")]
    pub kind: DistributionKind,
    pub minimum: f64,
    pub maximum: f64,
    pub mean: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Distribution {
    pub fn uniform(minimum: f64, maximum: f64, mean: f64) -> Self {
        Self {
            kind: DistributionKind::Uniform,
            minimum,
            maximum,
            mean,
            stddev: None,
            delta_x: None,
            units: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyAttribute {
    pub name: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyDescription {
    #[serde(rename = "type")]
    pub kind: DistributionKind,
    pub attributes: Vec<UncertaintyAttribute>,
}

impl From<&Distribution> for UncertaintyDescription {
    fn from(distribution: &Distribution) -> Self {
        let attribute = |name: &str, value: Option<f64>| UncertaintyAttribute {
            name: name.to_string(),
            value,
        };
        Self {
            kind: distribution.kind,
            attributes: vec![
                attribute("lower_bounds", Some(distribution.minimum)),
                attribute("upper_bounds", Some(distribution.maximum)),
                attribute("modes", Some(distribution.mean)),
                attribute("delta_x", distribution.delta_x),
                attribute("stddev", distribution.stddev),
            ],
        }
    }
}

/// Perturbation variable attached to a measure argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub argument: Argument,
    pub display_name: String,
    pub display_name_short: String,
    pub variable_type: String,
    pub units: Option<String>,
    pub minimum: f64,
    pub maximum: f64,
    pub relation_to_output: Option<String>,
    pub mode: f64,
    pub static_value: Value,
    pub uncertainty_description: UncertaintyDescription,
    pub workflow_index: usize,
    pub uuid: String,
    pub version_uuid: String,
}

/// Workflow measure inside an analysis definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub name: String,
    pub display_name: String,
    pub measure_type: String,
    pub description: String,
    /// Directory name used inside the bundle (`./measures/<dir>`).
    pub definition_dir: String,
    /// Source directory on disk, when known.
    pub local_dir: Option<PathBuf>,
    pub arguments: Vec<Argument>,
    pub variables: Vec<Variable>,
    pub workflow_index: usize,
    pub uuid: String,
    pub version_uuid: String,
}

impl Measure {
    pub(crate) fn new(
        name: &str,
        display_name: &str,
        definition_dir: &str,
        local_dir: Option<PathBuf>,
    ) -> Result<Self, OsaError> {
        Ok(Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            measure_type: "RubyMeasure".to_string(),
            description: String::new(),
            definition_dir: definition_dir.to_string(),
            local_dir,
            arguments: vec![Argument::skip()],
            variables: Vec::new(),
            workflow_index: 0,
            uuid: stable_uuid(&("measure", name))?,
            version_uuid: stable_uuid(&("measure-version", name, definition_dir))?,
        })
    }

    pub(crate) fn from_path(name: &str, display_name: &str, path: &Path) -> Result<Self, OsaError> {
        let definition_dir = path
            .file_name()
            .and_then(|dir| dir.to_str())
            .ok_or_else(|| {
                OsaError::Analysis(
                    ErrorInfo::new("measure-path", "measure path has no directory name")
                        .with_path(path),
                )
            })?;
        Self::new(name, display_name, definition_dir, Some(path.to_path_buf()))
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    /// Sets an argument value, declaring the argument when the measure does
    /// not carry it yet.
    pub fn argument_value(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.arguments.iter_mut().find(|argument| argument.name == name) {
            Some(argument) => argument.value = value,
            None => self.arguments.push(Argument::from_value(name, value)),
        }
        self
    }

    /// Returns true when the `__SKIP__` argument is set.
    pub fn skipped(&self) -> bool {
        self.argument(SKIP_ARGUMENT)
            .and_then(|argument| argument.value.as_bool())
            .unwrap_or(false)
    }

    /// Turns `argument_name` into a perturbation variable sampled from `distribution`.
    pub fn make_variable(
        &mut self,
        argument_name: &str,
        display_name: &str,
        distribution: &Distribution,
    ) -> Result<&Variable, OsaError> {
        if distribution.minimum > distribution.maximum {
            return Err(OsaError::Analysis(
                ErrorInfo::new("variable-bounds", "distribution minimum exceeds maximum")
                    .with_context("measure", self.name.clone())
                    .with_context("argument", argument_name),
            ));
        }
        if self
            .variables
            .iter()
            .any(|variable| variable.argument.name == argument_name)
        {
            return Err(OsaError::Analysis(
                ErrorInfo::new("variable-duplicate", "argument is already a variable")
                    .with_context("measure", self.name.clone())
                    .with_context("argument", argument_name),
            ));
        }
        let argument = match self.argument(argument_name) {
            Some(argument) => argument.clone(),
            None => {
                let argument = Argument::from_value(argument_name, Value::from(distribution.mean));
                self.arguments.push(argument.clone());
                argument
            }
        };
        let static_value = argument.default_value.clone();
        self.variables.push(Variable {
            display_name: display_name.to_string(),
            display_name_short: display_name.to_string(),
            variable_type: "variable".to_string(),
            units: distribution.units.clone(),
            minimum: distribution.minimum,
            maximum: distribution.maximum,
            relation_to_output: None,
            mode: distribution.mean,
            static_value,
            uncertainty_description: UncertaintyDescription::from(distribution),
            workflow_index: self.workflow_index,
            uuid: stable_uuid(&("variable", &self.name, argument_name))?,
            version_uuid: stable_uuid(&("variable-version", &self.name, argument_name, display_name))?,
            argument,
        });
        let index = self.variables.len() - 1;
        Ok(&self.variables[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn measure() -> Measure {
        Measure::new("general_calibration_measure", "General", "General", None).unwrap()
    }

    #[test]
    fn value_types_follow_json_kinds() {
        assert_eq!(Argument::from_value("a", json!(true)).value_type, "boolean");
        assert_eq!(Argument::from_value("a", json!(3)).value_type, "integer");
        assert_eq!(Argument::from_value("a", json!(0.5)).value_type, "double");
        assert_eq!(Argument::from_value("a", json!("x")).value_type, "string");
        assert_eq!(Argument::from_value("a", Value::Null).value_type, "string");
    }

    #[test]
    fn argument_value_sets_or_declares() {
        let mut m = measure();
        assert!(!m.skipped());
        m.argument_value(SKIP_ARGUMENT, true);
        assert!(m.skipped());
        assert_eq!(m.arguments.len(), 1);
        m.argument_value("space", "*All Spaces*");
        assert_eq!(m.arguments.len(), 2);
        assert_eq!(m.argument("space").unwrap().value, json!("*All Spaces*"));
    }

    #[test]
    fn make_variable_records_uniform_bounds() {
        let mut m = measure();
        m.workflow_index = 4;
        let d = Distribution::uniform(-40.0, 40.0, 0.0);
        let variable = m.make_variable("infil_perc_change", "Infiltration", &d).unwrap();
        assert_eq!(variable.minimum, -40.0);
        assert_eq!(variable.workflow_index, 4);
        assert_eq!(variable.argument.value_type, "double");
        let attrs: Vec<_> = variable
            .uncertainty_description
            .attributes
            .iter()
            .map(|attr| (attr.name.as_str(), attr.value))
            .collect();
        assert_eq!(
            attrs,
            vec![
                ("lower_bounds", Some(-40.0)),
                ("upper_bounds", Some(40.0)),
                ("modes", Some(0.0)),
                ("delta_x", None),
                ("stddev", None),
            ]
        );
        assert!(m.argument("infil_perc_change").is_some());
    }

    #[test]
    fn make_variable_rejects_duplicates() {
        let mut m = measure();
        let d = Distribution::uniform(-1.0, 1.0, 0.0);
        m.make_variable("x", "X", &d).unwrap();
        let err = m.make_variable("x", "X again", &d).unwrap_err();
        assert_eq!(err.info().code, "variable-duplicate");
    }
}
