use std::fs;
use std::path::{Path, PathBuf};

use osa_core::{from_yaml_slice, ErrorInfo, OsaError};
use serde::{Deserialize, Serialize};

/// Measures dropped from the OSW before conversion. They generate the model,
/// which already exists when calibrating.
pub const DEFAULT_MEASURES_TO_REMOVE: [&str; 14] = [
    "add_chilled_water_storage_tank",
    "create_bar_from_building_type_ratios",
    "create_typical_building_from_model",
    "blended_space_type_from_model",
    "add_ev_load",
    "add_ems_to_control_ev_charging",
    "ReduceElectricEquipmentLoadsByPercentage",
    "ReduceLightingLoadsByPercentage",
    "PredictedMeanVote",
    "urban_geometry_creation_zoning",
    "create_typical_building_from_model_2",
    "add_central_ice_storage",
    "add_hpwh",
    "add_packaged_ice_storage",
];

/// Algorithm used by the analysis-execution system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlgorithmSpec {
    /// Genetic optimisation used for calibration.
    Rgenoud {
        /// Population size; must be even.
        popsize: u32,
        /// Number of generations.
        generations: u32,
        /// BFGS refinement switch (0 disables it).
        bfgs: u32,
        /// Convergence tolerance.
        solution_tolerance: f64,
        /// Maximum simulations queued at once.
        max_queued_jobs: u32,
    },
    /// Latin hypercube sampling of the variables.
    Lhs {
        /// Number of samples drawn.
        number_of_samples: u32,
        /// Sampling mode (`all_variables` or `individual_variables`).
        sample_method: String,
        /// Sampler seed.
        seed: u64,
    },
}

impl AlgorithmSpec {
    /// Analysis type string written to the definition.
    pub fn analysis_type(&self) -> &'static str {
        match self {
            AlgorithmSpec::Rgenoud { .. } => "rgenoud",
            AlgorithmSpec::Lhs { .. } => "lhs",
        }
    }

    /// Default LHS settings.
    pub fn default_lhs() -> Self {
        AlgorithmSpec::Lhs {
            number_of_samples: 10,
            sample_method: "all_variables".to_string(),
            seed: 1973,
        }
    }
}

impl Default for AlgorithmSpec {
    fn default() -> Self {
        AlgorithmSpec::Rgenoud {
            popsize: 20,
            generations: 10,
            bfgs: 0,
            solution_tolerance: 0.0001,
            max_queued_jobs: 40,
        }
    }
}

/// Filesystem layout and fixed inputs of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Root of the URBANopt analysis (contains `run/`).
    pub analysis_dir: PathBuf,
    /// Scenario directory holding the baseline simulations.
    pub baseline_scenario: String,
    /// Scenario directory receiving the calibrated analysis.
    pub calibrated_scenario: String,
    /// Workflow file name inside each building directory.
    pub osw_filename: String,
    /// EPW file name expected in the calibrated building directory.
    pub weather_file_name: String,
    /// Directory holding `measures/`, `Gemfile` and `openstudio-gems.gemspec`.
    pub resources_dir: PathBuf,
    /// Measures removed from the OSW before conversion.
    pub measures_to_remove: Vec<String>,
    /// Algorithm settings.
    pub algorithm: AlgorithmSpec,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            analysis_dir: PathBuf::from("."),
            baseline_scenario: "dc_block_1_baseline_scenario".to_string(),
            calibrated_scenario: "dc_block_1_baseline_scenario_calibrated".to_string(),
            osw_filename: "in.osw".to_string(),
            weather_file_name: "VA_WASHINGTON-DC-REAGAN-AP_724050S_21.epw".to_string(),
            resources_dir: PathBuf::from("."),
            measures_to_remove: DEFAULT_MEASURES_TO_REMOVE
                .iter()
                .map(|name| name.to_string())
                .collect(),
            algorithm: AlgorithmSpec::default(),
        }
    }
}

impl CalibrationConfig {
    /// Directory of the measures added by the calibration plan.
    pub fn measures_dir(&self) -> PathBuf {
        self.resources_dir.join("measures")
    }

    fn anchor(&mut self, base: &Path) {
        if self.analysis_dir.is_relative() {
            self.analysis_dir = base.join(&self.analysis_dir);
        }
        if self.resources_dir.is_relative() {
            self.resources_dir = base.join(&self.resources_dir);
        }
    }
}

/// Loads a YAML configuration; relative directories are anchored at the file's directory.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CalibrationConfig, OsaError> {
    let config_path = path.as_ref();
    let bytes = fs::read(config_path).map_err(|err| {
        OsaError::Config(ErrorInfo::new("config_read", err.to_string()).with_path(config_path))
    })?;
    let mut config: CalibrationConfig = from_yaml_slice(&bytes).map_err(|err| {
        OsaError::Config(err.info().clone().with_path(config_path))
    })?;
    if let AlgorithmSpec::Rgenoud { popsize, .. } = &config.algorithm {
        if popsize % 2 != 0 {
            return Err(OsaError::Config(
                ErrorInfo::new("config_popsize", "rgenoud popsize must be even")
                    .with_context("popsize", popsize.to_string()),
            ));
        }
    }
    let base = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    config.anchor(&base);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_baseline_layout() {
        let config = CalibrationConfig::default();
        assert_eq!(config.measures_to_remove.len(), 14);
        assert!(config.measures_to_remove.iter().any(|m| m == "add_ev_load"));
        assert_eq!(config.algorithm.analysis_type(), "rgenoud");
        assert_eq!(config.measures_dir(), PathBuf::from("./measures"));
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: CalibrationConfig = from_yaml_slice(
            b"analysis_dir: /data/analysis\nalgorithm:\n  type: lhs\n  number_of_samples: 4\n  sample_method: all_variables\n  seed: 7\n",
        )
        .unwrap();
        assert_eq!(config.analysis_dir, PathBuf::from("/data/analysis"));
        assert_eq!(config.osw_filename, "in.osw");
        assert_eq!(config.algorithm.analysis_type(), "lhs");
    }
}
