//! Serialized layout of `analysis.json`.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analysis::Analysis;
use crate::measure::{Argument, Measure, Variable};
use crate::output::Output;

#[derive(Debug, Serialize)]
pub struct AnalysisDocument<'a> {
    pub analysis: AnalysisBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisBody<'a> {
    display_name: &'a str,
    name: &'a str,
    output_variables: &'a [Output],
    problem: Problem<'a>,
    seed: Option<FileRef>,
    weather_file: Option<FileRef>,
    file_format_version: u32,
    cli_debug: &'a str,
    cli_verbose: &'a str,
    run_workflow_timeout: u64,
    upload_results_timeout: u64,
    initialize_worker_timeout: u64,
    download_zip: bool,
    download_reports: bool,
    download_osw: bool,
    download_osm: bool,
    server_scripts: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct Problem<'a> {
    workflow: Vec<WorkflowStep<'a>>,
    algorithm: Map<String, Value>,
    analysis_type: &'a str,
}

#[derive(Debug, Serialize)]
struct WorkflowStep<'a> {
    name: &'a str,
    display_name: &'a str,
    measure_type: &'a str,
    measure_definition_class_name: &'a str,
    measure_definition_directory: String,
    measure_definition_directory_local: Option<String>,
    measure_definition_display_name: &'a str,
    measure_definition_name: &'a str,
    measure_definition_uuid: &'a str,
    measure_definition_version_uuid: &'a str,
    uuid: &'a str,
    version_uuid: &'a str,
    description: &'a str,
    arguments: &'a [Argument],
    variables: &'a [Variable],
    workflow_index: usize,
}

#[derive(Debug, Serialize)]
struct FileRef {
    file_type: &'static str,
    path: String,
}

impl FileRef {
    fn new(file_type: &'static str, folder: &str, path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy();
        Some(Self {
            file_type,
            path: format!("./{folder}/{file_name}"),
        })
    }
}

impl<'a> From<&'a Measure> for WorkflowStep<'a> {
    fn from(measure: &'a Measure) -> Self {
        Self {
            name: &measure.name,
            display_name: &measure.display_name,
            measure_type: &measure.measure_type,
            measure_definition_class_name: &measure.definition_dir,
            measure_definition_directory: format!("./measures/{}", measure.definition_dir),
            measure_definition_directory_local: measure
                .local_dir
                .as_ref()
                .map(|dir| dir.display().to_string()),
            measure_definition_display_name: &measure.display_name,
            measure_definition_name: &measure.name,
            measure_definition_uuid: &measure.uuid,
            measure_definition_version_uuid: &measure.version_uuid,
            uuid: &measure.uuid,
            version_uuid: &measure.version_uuid,
            description: &measure.description,
            arguments: &measure.arguments,
            variables: &measure.variables,
            workflow_index: measure.workflow_index,
        }
    }
}

/// Builds the serializable `analysis.json` view of `analysis`.
pub fn analysis_document(analysis: &Analysis) -> AnalysisDocument<'_> {
    let mut algorithm = analysis.algorithm.attributes().clone();
    algorithm.insert(
        "objective_functions".to_string(),
        Value::from(analysis.objective_functions()),
    );
    let flags = &analysis.flags;
    AnalysisDocument {
        analysis: AnalysisBody {
            display_name: &analysis.display_name,
            name: &analysis.name,
            output_variables: analysis.outputs(),
            problem: Problem {
                workflow: analysis.workflow.iter().map(WorkflowStep::from).collect(),
                algorithm,
                analysis_type: analysis.analysis_type(),
            },
            seed: analysis
                .seed_model
                .as_deref()
                .and_then(|path| FileRef::new("OSM", "seeds", path)),
            weather_file: analysis
                .weather_file
                .as_deref()
                .and_then(|path| FileRef::new("EPW", "weather", path)),
            file_format_version: 1,
            cli_debug: &flags.cli_debug,
            cli_verbose: &flags.cli_verbose,
            run_workflow_timeout: flags.run_workflow_timeout,
            upload_results_timeout: flags.upload_results_timeout,
            initialize_worker_timeout: flags.initialize_worker_timeout,
            download_zip: flags.download_zip,
            download_reports: flags.download_reports,
            download_osw: flags.download_osw,
            download_osm: flags.download_osm,
            server_scripts: Map::new(),
        },
    }
}
