use std::path::PathBuf;

use crate::config::CalibrationConfig;

/// Input and output locations for one building.
#[derive(Debug, Clone, PartialEq)]
pub struct SimPaths {
    /// Root of the analysis.
    pub analysis_dir: PathBuf,
    /// Baseline simulation directory holding the OSW.
    pub sim_dir: PathBuf,
    /// Calibrated directory receiving `analysis.json`/`analysis.zip`.
    pub sim_dir_save: PathBuf,
    /// Input workflow file.
    pub osw_file: PathBuf,
    /// Sanitized workflow written next to the input.
    pub updated_osw_file: PathBuf,
}

impl SimPaths {
    /// Builds the paths for `building_id` from the configured layout.
    pub fn resolve(config: &CalibrationConfig, building_id: &str) -> Self {
        let run_dir = config.analysis_dir.join("run");
        let sim_dir = run_dir.join(&config.baseline_scenario).join(building_id);
        let sim_dir_save = run_dir.join(&config.calibrated_scenario).join(building_id);
        Self {
            analysis_dir: config.analysis_dir.clone(),
            osw_file: sim_dir.join(&config.osw_filename),
            updated_osw_file: sim_dir.join("in.updated.osw"),
            sim_dir,
            sim_dir_save,
        }
    }

    /// Measured utility data directory, shipped as the `calibration_data` library.
    pub fn calibration_data_dir(&self) -> PathBuf {
        self.sim_dir_save.join("calibration_data")
    }

    /// Natural-gas data file; its existence switches on the gas calibration targets.
    pub fn gas_data_file(&self) -> PathBuf {
        self.calibration_data_dir().join("natural_gas_data.json")
    }

    /// Saved analysis definition.
    pub fn analysis_json(&self) -> PathBuf {
        self.sim_dir_save.join("analysis.json")
    }

    /// Saved analysis bundle.
    pub fn analysis_zip(&self) -> PathBuf {
        self.sim_dir_save.join("analysis.zip")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_follows_scenarios() {
        let config = CalibrationConfig {
            analysis_dir: PathBuf::from("/work/baseline"),
            ..CalibrationConfig::default()
        };
        let paths = SimPaths::resolve(&config, "12");
        assert_eq!(
            paths.osw_file,
            PathBuf::from("/work/baseline/run/dc_block_1_baseline_scenario/12/in.osw")
        );
        assert_eq!(
            paths.updated_osw_file,
            PathBuf::from("/work/baseline/run/dc_block_1_baseline_scenario/12/in.updated.osw")
        );
        assert_eq!(
            paths.gas_data_file(),
            PathBuf::from(
                "/work/baseline/run/dc_block_1_baseline_scenario_calibrated/12/calibration_data/natural_gas_data.json"
            )
        );
        assert_eq!(
            paths.analysis_zip(),
            PathBuf::from("/work/baseline/run/dc_block_1_baseline_scenario_calibrated/12/analysis.zip")
        );
    }
}
