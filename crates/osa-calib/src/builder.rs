use osa_analysis::Analysis;
use osa_core::OsaError;
use tracing::debug;

use crate::plan::Transform;

/// Applies an explicit, ordered list of [`Transform`]s to an analysis.
///
/// The analysis is taken by value and only handed back once every step has
/// succeeded, so a failed plan never leaves a half-configured definition behind.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBuilder {
    transforms: Vec<Transform>,
}

impl AnalysisBuilder {
    /// Creates a builder from a prepared plan.
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    /// Appends one more transformation.
    pub fn then(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Planned transformations in application order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Applies every transformation in order.
    pub fn apply(&self, mut analysis: Analysis) -> Result<Analysis, OsaError> {
        for (index, transform) in self.transforms.iter().enumerate() {
            debug!(step = index, ?transform, "applying transform");
            apply_one(&mut analysis, transform)?;
        }
        Ok(analysis)
    }
}

fn apply_one(analysis: &mut Analysis, transform: &Transform) -> Result<(), OsaError> {
    match transform {
        Transform::SetAnalysisType(analysis_type) => {
            analysis.set_analysis_type(analysis_type.clone())
        }
        Transform::SetAlgorithmAttribute { name, value } => {
            analysis.algorithm.set_attribute(name, value.clone());
        }
        Transform::SetDisplayName(display_name) => analysis.display_name = display_name.clone(),
        Transform::SetArgument {
            measure,
            argument,
            value,
        } => {
            analysis
                .workflow
                .require_measure_mut(measure)?
                .argument_value(argument, value.clone());
        }
        Transform::AddMeasure {
            name,
            display_name,
            path,
        } => {
            analysis
                .workflow
                .add_measure_from_path(name, display_name, path)?;
        }
        Transform::MoveMeasureAfter { measure, after } => {
            analysis.workflow.move_measure_after(measure, after)?
        }
        Transform::MakeVariable {
            measure,
            argument,
            display_name,
            distribution,
        } => {
            analysis
                .workflow
                .require_measure_mut(measure)?
                .make_variable(argument, display_name, distribution)?;
        }
        Transform::AddOutput(output) => {
            analysis.add_output(output.clone());
        }
        Transform::SetWeatherFile(path) => analysis.weather_file = Some(path.clone()),
        Transform::SetSeedModel(path) => analysis.seed_model = Some(path.clone()),
        Transform::AddGemFile(path) => analysis.add_gem_file(path.clone()),
        Transform::AddLibrary { path, name } => analysis.add_library(path.clone(), name.clone()),
        Transform::SetRunFlags {
            download_zip,
            cli_verbose,
            cli_debug,
        } => {
            analysis.flags.download_zip = *download_zip;
            analysis.flags.cli_verbose = cli_verbose.clone();
            analysis.flags.cli_debug = cli_debug.clone();
        }
    }
    Ok(())
}
