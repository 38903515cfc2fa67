#![deny(missing_docs)]
#![doc = "Calibration analysis generation: OSW sanitizing, OSA plan construction, and post-save patching."]

/// Builder applying an ordered list of transformations to an analysis.
pub mod builder;
/// Configuration file loading.
pub mod config;
/// Reinsertion of arguments stripped before conversion.
pub mod patch;
/// Simulation directory layout and preconditions.
pub mod paths;
/// End-to-end conversion pipeline.
pub mod pipeline;
/// Calibration plan construction.
pub mod plan;
/// OSW step filtering and argument stripping.
pub mod sanitize;

pub use builder::AnalysisBuilder;
pub use config::{load_config, AlgorithmSpec, CalibrationConfig};
pub use patch::{feature_location_record, patch_analysis_file, reinsert_feature_location, PatchReport};
pub use paths::SimPaths;
pub use pipeline::{run, PipelineError, PipelineReport};
pub use plan::{calibration_plan, utility_end_date, PlanContext, Transform};
pub use sanitize::{remove_measures, sanitize, strip_feature_location};
