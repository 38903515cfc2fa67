use serde_json::{Map, Value};

/// Algorithm selection plus its ordered attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct Algorithm {
    pub analysis_type: String,
    attributes: Map<String, Value>,
}

impl Default for Algorithm {
    fn default() -> Self {
        let mut algorithm = Self {
            analysis_type: "single_run".to_string(),
            attributes: Map::new(),
        };
        algorithm.set_attribute("seed", Value::Null);
        algorithm.set_attribute("failed_f_value", 1e18);
        algorithm.set_attribute("debug_messages", 0);
        algorithm
    }
}

impl Algorithm {
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}
