//! Workflow configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CurationError, Result};

use super::{StageKind, StageSchema};

/// An ordered list of stage schemas, applied one after another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSchema {
    /// The stages to apply, in order.
    #[serde(default)]
    pub component_schemas: Vec<StageSchema>,
}

impl WorkflowSchema {
    /// Create an empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn with_stage(mut self, schema: impl Into<StageSchema>) -> Self {
        self.component_schemas.push(schema.into());
        self
    }

    /// Parse a workflow from JSON. Every stage schema is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a workflow from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| CurationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Serialize the workflow as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every stage schema.
    pub fn validate(&self) -> Result<()> {
        self.component_schemas.iter().try_for_each(StageSchema::validate)
    }

    /// The kinds of the configured stages, in order.
    pub fn kinds(&self) -> Vec<StageKind> {
        self.component_schemas.iter().map(StageSchema::kind).collect()
    }

    /// Number of configured stages.
    pub fn len(&self) -> usize {
        self.component_schemas.len()
    }

    /// Whether no stage is configured.
    pub fn is_empty(&self) -> bool {
        self.component_schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FilterByPressureSchema, FilterByTemperatureSchema, FilterDuplicatesSchema};

    #[test]
    fn test_workflow_json_round_trip() {
        let workflow = WorkflowSchema::new()
            .with_stage(FilterByTemperatureSchema::new(Some(290.0), Some(300.0)).unwrap())
            .with_stage(FilterByPressureSchema::new(Some(101.3), Some(101.4)).unwrap())
            .with_stage(FilterDuplicatesSchema::new());

        let json = workflow.to_json().unwrap();
        let parsed = WorkflowSchema::from_json(&json).unwrap();

        assert_eq!(parsed, workflow);
        assert_eq!(
            parsed.kinds(),
            vec![
                StageKind::FilterByTemperature,
                StageKind::FilterByPressure,
                StageKind::FilterDuplicates
            ]
        );
    }

    #[test]
    fn test_invalid_stage_fails_whole_workflow() {
        let json = r#"{
            "component_schemas": [
                {"type": "FilterDuplicates"},
                {"type": "FilterByPressure", "minimum_pressure": 2.0, "maximum_pressure": 1.0}
            ]
        }"#;

        assert!(WorkflowSchema::from_json(json).is_err());
    }

    #[test]
    fn test_empty_workflow() {
        let workflow = WorkflowSchema::from_json("{}").unwrap();
        assert!(workflow.is_empty());
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = WorkflowSchema::from_file("/nonexistent/workflow.json");
        assert!(matches!(result, Err(CurationError::Io { .. })));
    }
}
