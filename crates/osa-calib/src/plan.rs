use std::path::PathBuf;

use osa_analysis::{Distribution, Output, SKIP_ARGUMENT};
use serde_json::Value;

use crate::config::{AlgorithmSpec, CalibrationConfig};
use crate::paths::SimPaths;
use crate::sanitize::DEFAULT_FEATURE_REPORTS;

const GENERAL_CALIBRATION: &str = "general_calibration_measure";
const ELECTRICITY_LOADER: &str = "add_monthly_json_utility_data_electricity";
const GAS_LOADER: &str = "add_monthly_json_utility_data_natural_gas";
const CALIBRATION_REPORTS: &str = "calibration_reports_enhanced";
const UTILITY_START_DATE: &str = "2021-01-01";

/// One mutation of an analysis definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Selects the algorithm.
    SetAnalysisType(String),
    /// Sets an algorithm attribute.
    SetAlgorithmAttribute {
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: Value,
    },
    /// Replaces the display name.
    SetDisplayName(String),
    /// Sets a measure argument; the measure must exist.
    SetArgument {
        /// Measure name.
        measure: String,
        /// Argument name.
        argument: String,
        /// New value.
        value: Value,
    },
    /// Appends a measure defined in `path`.
    AddMeasure {
        /// Measure name.
        name: String,
        /// Display name.
        display_name: String,
        /// Measure directory.
        path: PathBuf,
    },
    /// Moves `measure` directly after `after`.
    MoveMeasureAfter {
        /// Measure to move.
        measure: String,
        /// Anchor measure.
        after: String,
    },
    /// Turns a measure argument into a perturbation variable.
    MakeVariable {
        /// Measure name.
        measure: String,
        /// Argument name.
        argument: String,
        /// Variable display name.
        display_name: String,
        /// Sampling distribution.
        distribution: Distribution,
    },
    /// Registers an output metric.
    AddOutput(Output),
    /// Sets the weather file.
    SetWeatherFile(PathBuf),
    /// Sets the seed model.
    SetSeedModel(PathBuf),
    /// Adds a dependency manifest.
    AddGemFile(PathBuf),
    /// Attaches a data library directory.
    AddLibrary {
        /// Library directory.
        path: PathBuf,
        /// Library name inside the bundle.
        name: String,
    },
    /// Sets global download and CLI flags.
    SetRunFlags {
        /// Whether the execution system downloads the run zip.
        download_zip: bool,
        /// Verbosity flag passed to the OpenStudio CLI.
        cli_verbose: String,
        /// Debug flag passed to the OpenStudio CLI.
        cli_debug: String,
    },
}

impl Transform {
    fn set(measure: &str, argument: &str, value: impl Into<Value>) -> Self {
        Transform::SetArgument {
            measure: measure.to_string(),
            argument: argument.to_string(),
            value: value.into(),
        }
    }

    fn add(name: &str, display_name: &str, path: PathBuf) -> Self {
        Transform::AddMeasure {
            name: name.to_string(),
            display_name: display_name.to_string(),
            path,
        }
    }

    fn move_after(measure: &str, after: &str) -> Self {
        Transform::MoveMeasureAfter {
            measure: measure.to_string(),
            after: after.to_string(),
        }
    }
}

/// Inputs the calibration plan depends on.
#[derive(Debug, Clone)]
pub struct PlanContext<'a> {
    /// Building identifier from the command line.
    pub building_id: &'a str,
    /// Run configuration.
    pub config: &'a CalibrationConfig,
    /// Resolved directories for the building.
    pub paths: &'a SimPaths,
    /// Whether natural-gas utility data is available.
    pub gas_data: bool,
}

impl<'a> PlanContext<'a> {
    /// Builds the context, probing the filesystem for natural-gas data.
    pub fn new(building_id: &'a str, config: &'a CalibrationConfig, paths: &'a SimPaths) -> Self {
        Self {
            building_id,
            config,
            paths,
            gas_data: paths.gas_data_file().exists(),
        }
    }
}

/// Last day of measured utility data; building 3 only has data through July.
pub fn utility_end_date(building_id: &str) -> &'static str {
    if building_id == "3" {
        "2021-07-31"
    } else {
        "2021-12-31"
    }
}

/// Builds the ordered transformations turning a converted OSW into a calibration analysis.
pub fn calibration_plan(ctx: &PlanContext<'_>) -> Vec<Transform> {
    let config = ctx.config;
    let measures_dir = config.measures_dir();
    let end_date = utility_end_date(ctx.building_id);
    let mut plan = algorithm_transforms(&config.algorithm);
    plan.push(Transform::SetDisplayName(format!(
        "Building {}: {}",
        ctx.building_id,
        config.algorithm.analysis_type()
    )));

    // Reporting measures produce too much data per calibration run.
    plan.push(Transform::set("set_run_period", SKIP_ARGUMENT, true));
    plan.push(Transform::set(
        "change_building_location",
        "weather_file_name",
        config.weather_file_name.as_str(),
    ));
    for measure in [
        DEFAULT_FEATURE_REPORTS,
        "export_modelica_loads",
        "export_time_series_loads_csv",
    ] {
        plan.push(Transform::set(measure, SKIP_ARGUMENT, true));
    }
    plan.push(Transform::set("openstudio_results", SKIP_ARGUMENT, false));

    plan.push(Transform::add(
        GENERAL_CALIBRATION,
        "General Calibration Measure",
        measures_dir.join("GeneralCalibrationMeasurePercentChange"),
    ));
    plan.push(Transform::set(GENERAL_CALIBRATION, "space_type", "*All SpaceTypes*"));
    plan.push(Transform::set(GENERAL_CALIBRATION, "space", "*All Spaces*"));
    plan.push(Transform::move_after(
        GENERAL_CALIBRATION,
        "increase_insulation_r_value_for_exterior_walls",
    ));

    let utility_measure = measures_dir.join("AddMonthlyJSONUtilityData");
    plan.push(Transform::add(
        ELECTRICITY_LOADER,
        "Add Monthly JSON Utility Data Electricity",
        utility_measure.clone(),
    ));
    plan.extend([
        Transform::set(
            ELECTRICITY_LOADER,
            "json",
            "../../../lib/calibration_data/electricity_data.json",
        ),
        Transform::set(ELECTRICITY_LOADER, "start_date", UTILITY_START_DATE),
        Transform::set(ELECTRICITY_LOADER, "end_date", end_date),
        // Clears previously loaded bills and resets the run period; only
        // valid on a model that has not been calibrated yet.
        Transform::set(ELECTRICITY_LOADER, "remove_existing_data", true),
        Transform::set(ELECTRICITY_LOADER, "set_runperiod", true),
        Transform::move_after(ELECTRICITY_LOADER, GENERAL_CALIBRATION),
    ]);

    if ctx.gas_data {
        plan.push(Transform::add(
            GAS_LOADER,
            "Add Monthly JSON Utility Data Natural Gas",
            utility_measure,
        ));
        plan.extend([
            Transform::set(
                GAS_LOADER,
                "json",
                "../../../lib/calibration_data/natural_gas_data.json",
            ),
            Transform::set(GAS_LOADER, "start_date", UTILITY_START_DATE),
            Transform::set(GAS_LOADER, "end_date", end_date),
            Transform::set(GAS_LOADER, "fuel_type", "Gas"),
            Transform::set(GAS_LOADER, "consumption_unit", "therms"),
            Transform::set(GAS_LOADER, "data_key_name", "tot_therms"),
            Transform::set(GAS_LOADER, "variable_name", "Gas Bill"),
            Transform::set(GAS_LOADER, "remove_existing_data", false),
            Transform::move_after(GAS_LOADER, ELECTRICITY_LOADER),
        ]);
    }

    plan.push(Transform::add(
        CALIBRATION_REPORTS,
        "Calibration Reports Enhanced",
        measures_dir.join("CalibrationReportsEnhanced"),
    ));

    plan.push(Transform::SetWeatherFile(
        ctx.paths.sim_dir_save.join(&config.weather_file_name),
    ));
    plan.push(Transform::SetSeedModel(ctx.paths.sim_dir_save.join("in.osm")));
    plan.push(Transform::AddGemFile(config.resources_dir.join("Gemfile")));
    plan.push(Transform::AddGemFile(
        config.resources_dir.join("openstudio-gems.gemspec"),
    ));

    plan.push(Transform::set(GENERAL_CALIBRATION, SKIP_ARGUMENT, false));
    let distribution = Distribution::uniform(-40.0, 40.0, 0.0);
    for (argument, display_name) in [
        ("ElectricEquipment_perc_change", "Electric Equipment Percent Change"),
        ("infil_perc_change", "Infiltration Percent Change"),
        ("vent_perc_change", "Ventilation Percent Change"),
        ("mass_perc_change", "Mass Percent Change"),
        ("lights_perc_change", "Lights Percent Change"),
    ] {
        plan.push(Transform::MakeVariable {
            measure: GENERAL_CALIBRATION.to_string(),
            argument: argument.to_string(),
            display_name: display_name.to_string(),
            distribution: distribution.clone(),
        });
    }

    for output in calibration_outputs(ctx.gas_data) {
        plan.push(Transform::AddOutput(output));
    }

    plan.push(Transform::AddLibrary {
        path: ctx.paths.calibration_data_dir(),
        name: "calibration_data".to_string(),
    });
    plan.push(Transform::SetRunFlags {
        download_zip: false,
        cli_verbose: String::new(),
        cli_debug: String::new(),
    });
    plan
}

fn algorithm_transforms(spec: &AlgorithmSpec) -> Vec<Transform> {
    let attribute = |name: &str, value: Value| Transform::SetAlgorithmAttribute {
        name: name.to_string(),
        value,
    };
    let mut transforms = vec![Transform::SetAnalysisType(spec.analysis_type().to_string())];
    match spec {
        AlgorithmSpec::Rgenoud {
            popsize,
            generations,
            bfgs,
            solution_tolerance,
            max_queued_jobs,
        } => transforms.extend([
            attribute("popsize", Value::from(*popsize)),
            attribute("generations", Value::from(*generations)),
            attribute("bfgs", Value::from(*bfgs)),
            attribute("solution_tolerance", Value::from(*solution_tolerance)),
            attribute("max_queued_jobs", Value::from(*max_queued_jobs)),
        ]),
        AlgorithmSpec::Lhs {
            number_of_samples,
            sample_method,
            seed,
        } => transforms.extend([
            attribute("number_of_samples", Value::from(*number_of_samples)),
            attribute("sample_method", Value::from(sample_method.as_str())),
            attribute("seed", Value::from(*seed)),
        ]),
    }
    transforms
}

fn calibration_outputs(gas_data: bool) -> Vec<Output> {
    let metric = |name: &str| {
        Output::new(format!("{CALIBRATION_REPORTS}.{name}"), name).units("%")
    };
    let mut outputs = vec![
        metric("electricity_consumption_cvrmse").objective(None),
        metric("electricity_consumption_nmbe").objective(Some(2)),
    ];
    if gas_data {
        outputs.push(metric("natural_gas_consumption_cvrmse").objective(Some(3)));
        outputs.push(metric("natural_gas_consumption_nmbe").objective(Some(4)));
    }
    outputs.push(
        Output::new("openstudio_results.total_site_eui", "total_site_eui")
            .units("kBtu/ft^2")
            .visualize(true),
    );
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(config: &'a CalibrationConfig, paths: &'a SimPaths, id: &'a str, gas: bool) -> PlanContext<'a> {
        PlanContext {
            building_id: id,
            config,
            paths,
            gas_data: gas,
        }
    }

    fn end_dates(plan: &[Transform]) -> Vec<(String, Value)> {
        plan.iter()
            .filter_map(|transform| match transform {
                Transform::SetArgument {
                    measure,
                    argument,
                    value,
                } if argument == "end_date" => Some((measure.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn building_three_gets_short_data_window() {
        assert_eq!(utility_end_date("3"), "2021-07-31");
        assert_eq!(utility_end_date("30"), "2021-12-31");
        let config = CalibrationConfig::default();
        let paths = SimPaths::resolve(&config, "3");
        let plan = calibration_plan(&context(&config, &paths, "3", true));
        assert_eq!(
            end_dates(&plan),
            vec![
                (ELECTRICITY_LOADER.to_string(), Value::from("2021-07-31")),
                (GAS_LOADER.to_string(), Value::from("2021-07-31")),
            ]
        );
    }

    #[test]
    fn gas_loader_and_targets_follow_data_presence() {
        let config = CalibrationConfig::default();
        let paths = SimPaths::resolve(&config, "5");
        for gas in [false, true] {
            let plan = calibration_plan(&context(&config, &paths, "5", gas));
            let adds_gas = plan.iter().any(|t| {
                matches!(t, Transform::AddMeasure { name, .. } if name == GAS_LOADER)
            });
            let objectives = plan
                .iter()
                .filter(|t| matches!(t, Transform::AddOutput(o) if o.objective_function))
                .count();
            let outputs = plan
                .iter()
                .filter(|t| matches!(t, Transform::AddOutput(_)))
                .count();
            assert_eq!(adds_gas, gas);
            assert_eq!(objectives, if gas { 4 } else { 2 });
            assert_eq!(outputs, objectives + 1);
        }
    }

    #[test]
    fn lhs_replaces_rgenoud_attributes() {
        let config = CalibrationConfig {
            algorithm: AlgorithmSpec::default_lhs(),
            ..CalibrationConfig::default()
        };
        let transforms = algorithm_transforms(&config.algorithm);
        assert_eq!(transforms[0], Transform::SetAnalysisType("lhs".to_string()));
        assert!(transforms.contains(&Transform::SetAlgorithmAttribute {
            name: "seed".to_string(),
            value: Value::from(1973u64),
        }));
    }
}
