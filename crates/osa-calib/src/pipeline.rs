use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use osa_analysis::{Analysis, OswDocument};
use osa_core::OsaError;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::builder::AnalysisBuilder;
use crate::config::CalibrationConfig;
use crate::patch::patch_analysis_file;
use crate::paths::SimPaths;
use crate::plan::{calibration_plan, PlanContext};
use crate::sanitize::sanitize;

/// Failures of a calibration run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Simulation directory or workflow file is absent.
    #[error("Could not find {}", .0.display())]
    MissingInput(PathBuf),
    /// The sanitized workflow was not written.
    #[error("Could not find updated {}", .0.display())]
    MissingUpdatedWorkflow(PathBuf),
    /// Any other failure.
    #[error(transparent)]
    Osa(#[from] OsaError),
    /// Writing operator messages failed.
    #[error("failed to write progress output: {0}")]
    Output(#[from] io::Error),
}

impl PipelineError {
    /// True for the precondition failures that end the run with exit code 1.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingInput(_) | PipelineError::MissingUpdatedWorkflow(_)
        )
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Directories used by the run.
    pub paths: SimPaths,
    /// Value stripped from `default_feature_reports` and reinserted afterwards.
    pub feature_location: Value,
    /// Whether natural-gas targets were configured.
    pub gas_data: bool,
    /// Final measure order of the analysis.
    pub measures: Vec<String>,
    /// Number of workflow steps that received `feature_location`.
    pub patched_steps: usize,
}

/// Converts the building's OSW into a calibration analysis, saves
/// `analysis.json`/`analysis.zip`, and patches `feature_location` back in.
///
/// Operator messages are written to `out`.
pub fn run<W: Write>(
    config: &CalibrationConfig,
    building_id: &str,
    out: &mut W,
) -> Result<PipelineReport, PipelineError> {
    writeln!(out, "ARG:building_id is {building_id}")?;
    let paths = SimPaths::resolve(config, building_id);
    writeln!(out, "Analysis dir: {}", paths.analysis_dir.display())?;
    writeln!(out, "Sim dir: {}", paths.sim_dir.display())?;
    if !paths.sim_dir.exists() {
        return Err(PipelineError::MissingInput(paths.sim_dir));
    }
    if !paths.osw_file.exists() {
        return Err(PipelineError::MissingInput(paths.osw_file));
    }

    // Some measures ship outdated measure.xml files and fail conversion, and
    // feature_location is undeclared in default_feature_reports.
    let mut osw = OswDocument::load(&paths.osw_file)?;
    let feature_location = sanitize(&mut osw, &config.measures_to_remove);
    osw.save(&paths.updated_osw_file)?;
    if !paths.updated_osw_file.exists() {
        return Err(PipelineError::MissingUpdatedWorkflow(paths.updated_osw_file));
    }

    writeln!(out, "Converting OSW to OSA")?;
    let analysis = Analysis::from_osw(format!("Building {building_id}"), &paths.updated_osw_file)?;
    let context = PlanContext::new(building_id, config, &paths);
    let gas_data = context.gas_data;
    let builder = AnalysisBuilder::new(calibration_plan(&context));
    info!(
        building = building_id,
        transforms = builder.transforms().len(),
        gas_data,
        "applying calibration plan"
    );
    let analysis = builder.apply(analysis)?;

    fs::create_dir_all(&paths.sim_dir_save)
        .map_err(|err| OsaError::io("save_dir", &paths.sim_dir_save, err))?;
    let json_path = paths.analysis_json();
    analysis.save(&json_path)?;
    analysis.save_osa_zip(&paths.analysis_zip())?;
    info!(json = %json_path.display(), "analysis saved");

    let patch = patch_analysis_file(&json_path, &feature_location)?;
    for step in &patch.steps {
        writeln!(out, "Step: {step}")?;
    }

    Ok(PipelineReport {
        measures: analysis
            .workflow
            .measure_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        patched_steps: patch.patched,
        paths,
        feature_location,
        gas_data,
    })
}
