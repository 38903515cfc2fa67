use std::path::{Path, PathBuf};

use osa_core::{read_json_file, write_pretty_json_file, OsaError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Single measure step of an OSW workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OswStep {
    pub measure_dir_name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Remaining step keys (`name`, `description`, ...) kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OswStep {
    pub fn new(measure_dir_name: impl Into<String>) -> Self {
        Self {
            measure_dir_name: measure_dir_name.into(),
            arguments: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Display name recorded on the step, falling back to the directory name.
    pub fn display_name(&self) -> &str {
        self.extra
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&self.measure_dir_name)
    }

    pub fn description(&self) -> Option<&str> {
        self.extra.get("description").and_then(Value::as_str)
    }
}

/// OSW workflow document. Top-level keys other than `steps` round-trip
/// untouched, and `steps` is written back at the position it was read from.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct OswDocument {
    pub steps: Vec<OswStep>,
    pub extra: Map<String, Value>,
    steps_position: usize,
}

impl TryFrom<Map<String, Value>> for OswDocument {
    type Error = serde_json::Error;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let steps_position = map.keys().position(|key| key == "steps").unwrap_or(0);
        let steps = match map.shift_remove("steps") {
            Some(steps) => serde_json::from_value(steps)?,
            None => Vec::new(),
        };
        Ok(Self {
            steps,
            extra: map,
            steps_position,
        })
    }
}

impl Serialize for OswDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let position = self.steps_position.min(self.extra.len());
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        for (index, (key, value)) in self.extra.iter().enumerate() {
            if index == position {
                map.serialize_entry("steps", &self.steps)?;
            }
            map.serialize_entry(key, value)?;
        }
        if position == self.extra.len() {
            map.serialize_entry("steps", &self.steps)?;
        }
        map.end()
    }
}

impl OswDocument {
    /// Document holding only `steps`.
    pub fn with_steps(steps: Vec<OswStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, OsaError> {
        read_json_file(path)
    }

    /// Writes the document pretty printed.
    pub fn save(&self, path: &Path) -> Result<(), OsaError> {
        write_pretty_json_file(path, self)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .map(|step| step.measure_dir_name.as_str())
            .collect()
    }

    pub fn measure_paths(&self) -> Vec<String> {
        self.string_list("measure_paths")
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.string_list("file_paths")
    }

    pub fn seed_file(&self) -> Option<&str> {
        self.extra.get("seed_file").and_then(Value::as_str)
    }

    pub fn weather_file(&self) -> Option<&str> {
        self.extra.get("weather_file").and_then(Value::as_str)
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        self.extra
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Resolves `name` against the search directories (relative entries are
/// anchored at `base`) and returns the first existing candidate.
pub(crate) fn resolve_in(base: &Path, search: &[String], name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_absolute() {
        return direct.exists().then(|| direct.to_path_buf());
    }
    search
        .iter()
        .map(|dir| {
            let dir = Path::new(dir);
            if dir.is_absolute() {
                dir.join(name)
            } else {
                base.join(dir).join(name)
            }
        })
        .chain(std::iter::once(base.join(name)))
        .find(|candidate| candidate.exists())
}
