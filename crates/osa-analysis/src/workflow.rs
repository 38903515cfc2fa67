use std::path::Path;

use osa_core::{ErrorInfo, OsaError};

use crate::measure::Measure;

fn unknown_measure(name: &str) -> OsaError {
    OsaError::Analysis(
        ErrorInfo::new("measure-not-found", "measure is not part of the workflow")
            .with_context("measure", name),
    )
}

/// Ordered list of measures. Indices are kept in sync with positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workflow {
    items: Vec<Measure>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measure> {
        self.items.iter()
    }

    pub fn measure_names(&self) -> Vec<&str> {
        self.items.iter().map(|measure| measure.name.as_str()).collect()
    }

    pub fn find_measure(&self, name: &str) -> Option<&Measure> {
        self.items.iter().find(|measure| measure.name == name)
    }

    pub fn find_measure_mut(&mut self, name: &str) -> Option<&mut Measure> {
        self.items.iter_mut().find(|measure| measure.name == name)
    }

    /// Like [`Workflow::find_measure_mut`] but treats a missing measure as an error.
    pub fn require_measure_mut(&mut self, name: &str) -> Result<&mut Measure, OsaError> {
        self.find_measure_mut(name)
            .ok_or_else(|| unknown_measure(name))
    }

    /// Appends a measure whose definition lives in `path`.
    pub fn add_measure_from_path(
        &mut self,
        name: &str,
        display_name: &str,
        path: &Path,
    ) -> Result<&mut Measure, OsaError> {
        let measure = Measure::from_path(name, display_name, path)?;
        self.push(measure)
    }

    /// First free measure name derived from `base`.
    pub(crate) fn instance_name(&self, base: &str) -> String {
        if self.find_measure(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|suffix| format!("{base}_{suffix}"))
            .find(|candidate| self.find_measure(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    pub(crate) fn push(&mut self, mut measure: Measure) -> Result<&mut Measure, OsaError> {
        if self.find_measure(&measure.name).is_some() {
            return Err(OsaError::Analysis(
                ErrorInfo::new("measure-duplicate", "measure name already used in workflow")
                    .with_context("measure", measure.name.clone()),
            ));
        }
        measure.workflow_index = self.items.len();
        self.items.push(measure);
        let index = self.items.len() - 1;
        Ok(&mut self.items[index])
    }

    /// Moves `name` so that it directly follows `after`.
    pub fn move_measure_after(&mut self, name: &str, after: &str) -> Result<(), OsaError> {
        let from = self.position(name)?;
        self.position(after)?;
        let measure = self.items.remove(from);
        let target = self.position(after)? + 1;
        self.items.insert(target, measure);
        self.reindex();
        Ok(())
    }

    fn position(&self, name: &str) -> Result<usize, OsaError> {
        self.items
            .iter()
            .position(|measure| measure.name == name)
            .ok_or_else(|| unknown_measure(name))
    }

    fn reindex(&mut self) {
        for (index, measure) in self.items.iter_mut().enumerate() {
            measure.workflow_index = index;
            for variable in &mut measure.variables {
                variable.workflow_index = index;
            }
        }
    }
}
