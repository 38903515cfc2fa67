use std::fs;
use std::path::{Path, PathBuf};

use osa_core::OsaError;
use tracing::debug;

use crate::algorithm::Algorithm;
use crate::bundle;
use crate::document::analysis_document;
use crate::measure::{Argument, Measure};
use crate::osw::{resolve_in, OswDocument};
use crate::output::Output;
use crate::workflow::Workflow;

/// Supporting data directory shipped with the analysis under `lib/<name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    pub path: PathBuf,
    pub name: String,
}

/// Global run and download flags of an analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFlags {
    pub download_zip: bool,
    pub download_reports: bool,
    pub download_osw: bool,
    pub download_osm: bool,
    pub cli_verbose: String,
    pub cli_debug: String,
    pub run_workflow_timeout: u64,
    pub upload_results_timeout: u64,
    pub initialize_worker_timeout: u64,
}

impl Default for RunFlags {
    fn default() -> Self {
        Self {
            download_zip: true,
            download_reports: true,
            download_osw: true,
            download_osm: true,
            cli_verbose: "--verbose".to_string(),
            cli_debug: "--debug".to_string(),
            run_workflow_timeout: 28_800,
            upload_results_timeout: 28_800,
            initialize_worker_timeout: 28_800,
        }
    }
}

/// In-memory OSA analysis definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub name: String,
    pub display_name: String,
    pub workflow: Workflow,
    pub algorithm: Algorithm,
    outputs: Vec<Output>,
    pub seed_model: Option<PathBuf>,
    pub weather_file: Option<PathBuf>,
    pub libraries: Vec<Library>,
    pub gem_files: Vec<PathBuf>,
    pub flags: RunFlags,
}

impl Analysis {
    pub fn create(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            name: snake_case(&display_name),
            display_name,
            workflow: Workflow::new(),
            algorithm: Algorithm::default(),
            outputs: Vec::new(),
            seed_model: None,
            weather_file: None,
            libraries: Vec::new(),
            gem_files: Vec::new(),
            flags: RunFlags::default(),
        }
    }

    /// Creates an analysis whose workflow mirrors the steps of the OSW at `path`.
    pub fn from_osw(display_name: impl Into<String>, path: &Path) -> Result<Self, OsaError> {
        let mut analysis = Self::create(display_name);
        analysis.convert_osw(path)?;
        Ok(analysis)
    }

    /// Appends one measure per OSW step and picks up the seed and weather files.
    ///
    /// A step whose directory name is already taken becomes `<dir>_2`,
    /// `<dir>_3`, ... while still pointing at the same definition directory.
    pub fn convert_osw(&mut self, path: &Path) -> Result<(), OsaError> {
        let osw = OswDocument::load(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let measure_paths = osw.measure_paths();
        for step in &osw.steps {
            let local_dir = resolve_in(base, &measure_paths, &step.measure_dir_name);
            if local_dir.is_none() {
                debug!(measure = %step.measure_dir_name, "measure directory not found on disk");
            }
            let name = self.workflow.instance_name(&step.measure_dir_name);
            let mut measure = Measure::new(
                &name,
                step.display_name(),
                &step.measure_dir_name,
                local_dir,
            )?;
            if let Some(description) = step.description() {
                measure.description = description.to_string();
            }
            for (name, value) in &step.arguments {
                match measure.arguments.iter_mut().find(|arg| &arg.name == name) {
                    Some(argument) => argument.value = value.clone(),
                    None => measure
                        .arguments
                        .push(Argument::from_value(name.clone(), value.clone())),
                }
            }
            self.workflow.push(measure)?;
        }
        let file_paths = osw.file_paths();
        if let Some(seed) = osw.seed_file() {
            self.seed_model = resolve_in(base, &file_paths, seed);
        }
        if let Some(weather) = osw.weather_file() {
            self.weather_file = resolve_in(base, &file_paths, weather);
        }
        debug!(measures = self.workflow.len(), osw = %path.display(), "converted OSW");
        Ok(())
    }

    pub fn analysis_type(&self) -> &str {
        &self.algorithm.analysis_type
    }

    pub fn set_analysis_type(&mut self, analysis_type: impl Into<String>) {
        self.algorithm.analysis_type = analysis_type.into();
    }

    /// Registers an output, replacing any output with the same name.
    ///
    /// Objective outputs take the next objective index; when no group was set
    /// the group defaults to `index + 1`.
    pub fn add_output(&mut self, mut output: Output) -> &Output {
        self.outputs.retain(|existing| existing.name != output.name);
        if output.objective_function {
            let index = self
                .outputs
                .iter()
                .filter(|existing| existing.objective_function)
                .count();
            output.objective_function_index = Some(index);
            if output.objective_function_group.is_none() {
                output.objective_function_group = Some(index as u32 + 1);
            }
        }
        self.outputs.push(output);
        let index = self.outputs.len() - 1;
        &self.outputs[index]
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn objective_functions(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|output| output.objective_function)
            .map(|output| output.name.as_str())
            .collect()
    }

    pub fn add_gem_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.gem_files.contains(&path) {
            self.gem_files.push(path);
        }
    }

    pub fn add_library(&mut self, path: impl Into<PathBuf>, name: impl Into<String>) {
        let name = name.into();
        self.libraries.retain(|library| library.name != name);
        self.libraries.push(Library {
            path: path.into(),
            name,
        });
    }

    /// Writes `analysis.json` pretty printed.
    pub fn save(&self, path: &Path) -> Result<(), OsaError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| OsaError::io("analysis_dir", parent, err))?;
        }
        osa_core::write_pretty_json_file(path, &analysis_document(self))
    }

    /// Writes the `analysis.zip` bundle with measures, seed, weather, and libraries.
    pub fn save_osa_zip(&self, path: &Path) -> Result<(), OsaError> {
        bundle::save_osa_zip(self, path)
    }
}

fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_snake_cased_display_name() {
        let analysis = Analysis::create("Building 12: rgenoud");
        assert_eq!(analysis.name, "building_12_rgenoud");
    }

    #[test]
    fn objective_groups_default_to_index_plus_one() {
        let mut analysis = Analysis::create("Building 1");
        analysis.add_output(Output::new("r.cvrmse", "cvrmse").objective(None));
        analysis.add_output(Output::new("r.nmbe", "nmbe").objective(Some(2)));
        analysis.add_output(Output::new("r.eui", "eui"));
        analysis.add_output(Output::new("r.gas", "gas").objective(Some(7)));
        let summary: Vec<_> = analysis
            .outputs()
            .iter()
            .map(|o| (o.objective_function_index, o.objective_function_group))
            .collect();
        assert_eq!(
            summary,
            vec![(Some(0), Some(1)), (Some(1), Some(2)), (None, None), (Some(2), Some(7))]
        );
        assert_eq!(analysis.objective_functions(), vec!["r.cvrmse", "r.nmbe", "r.gas"]);
    }

    #[test]
    fn outputs_with_same_name_are_replaced() {
        let mut analysis = Analysis::create("Building 1");
        analysis.add_output(Output::new("r.eui", "eui"));
        analysis.add_output(Output::new("r.eui", "EUI").units("kBtu/ft^2"));
        assert_eq!(analysis.outputs().len(), 1);
        assert_eq!(analysis.outputs()[0].units, "kBtu/ft^2");
    }
}
