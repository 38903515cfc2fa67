use std::fs;
use std::process::Command;

use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_uo-building-to-osa");

#[test]
fn missing_simulation_directory_exits_with_one() {
    let root = tempdir().expect("tempdir");
    let config = root.path().join("calibration.yaml");
    fs::write(&config, "analysis_dir: baseline\n").unwrap();

    let output = Command::new(BIN)
        .args(["42", "--config"])
        .arg(&config)
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ARG:building_id is 42"));
    assert!(stdout.contains("Could not find"));
    assert!(stdout.contains("dc_block_1_baseline_scenario/42"));
}

#[test]
fn missing_workflow_file_exits_with_one() {
    let root = tempdir().expect("tempdir");
    fs::create_dir_all(root.path().join("run/dc_block_1_baseline_scenario/5")).unwrap();
    let config = root.path().join("calibration.yaml");
    fs::write(&config, "osw_filename: in.osw\n").unwrap();

    let output = Command::new(BIN)
        .arg("5")
        .arg("--config")
        .arg(&config)
        .output()
        .expect("run binary");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("in.osw"));
}

#[test]
fn full_run_writes_patched_analysis() {
    let root = tempdir().expect("tempdir");
    let sim_dir = root.path().join("run/dc_block_1_baseline_scenario/1");
    fs::create_dir_all(&sim_dir).unwrap();
    let osw = serde_json::json!({
        "steps": [
            {"measure_dir_name": "set_run_period", "arguments": {}},
            {"measure_dir_name": "change_building_location", "arguments": {}},
            {"measure_dir_name": "increase_insulation_r_value_for_exterior_walls", "arguments": {}},
            {"measure_dir_name": "default_feature_reports", "arguments": {"feature_location": "loc"}},
            {"measure_dir_name": "export_modelica_loads", "arguments": {}},
            {"measure_dir_name": "export_time_series_loads_csv", "arguments": {}},
            {"measure_dir_name": "openstudio_results", "arguments": {}}
        ]
    });
    fs::write(sim_dir.join("in.osw"), osw.to_string()).unwrap();
    let config = root.path().join("calibration.yaml");
    fs::write(&config, "analysis_dir: .\nresources_dir: resources\n").unwrap();

    let output = Command::new(BIN)
        .args(["1", "--config"])
        .arg(&config)
        .output()
        .expect("run binary");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));
    let saved = root
        .path()
        .join("run/dc_block_1_baseline_scenario_calibrated/1/analysis.json");
    let analysis: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(saved).unwrap()).unwrap();
    let workflow = analysis["analysis"]["problem"]["workflow"].as_array().unwrap();
    let reports = workflow
        .iter()
        .find(|step| step["name"] == "default_feature_reports")
        .unwrap();
    let last = reports["arguments"].as_array().unwrap().last().unwrap();
    assert_eq!(last["value"], "loc");
    assert!(root
        .path()
        .join("run/dc_block_1_baseline_scenario_calibrated/1/analysis.zip")
        .exists());
}
