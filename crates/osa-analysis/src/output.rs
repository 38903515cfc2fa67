use serde::{Deserialize, Serialize};

/// Output metric extracted from simulation results, optionally an objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub display_name: String,
    pub display_name_short: String,
    pub metadata_id: Option<String>,
    pub name: String,
    pub units: String,
    pub visualize: bool,
    pub export: bool,
    pub variable_type: String,
    pub objective_function: bool,
    pub objective_function_index: Option<usize>,
    pub objective_function_target: Option<f64>,
    pub objective_function_group: Option<u32>,
    pub scaling_factor: Option<f64>,
}

impl Output {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            display_name_short: display_name.clone(),
            display_name,
            metadata_id: None,
            name: name.into(),
            units: String::new(),
            visualize: true,
            export: true,
            variable_type: "double".to_string(),
            objective_function: false,
            objective_function_index: None,
            objective_function_target: None,
            objective_function_group: None,
            scaling_factor: None,
        }
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn visualize(mut self, visualize: bool) -> Self {
        self.visualize = visualize;
        self
    }

    /// Marks the output as an objective function, with an explicit group when given.
    pub fn objective(mut self, group: Option<u32>) -> Self {
        self.objective_function = true;
        self.objective_function_group = group;
        self
    }
}
