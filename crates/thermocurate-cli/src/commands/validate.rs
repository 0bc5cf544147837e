//! Validate command - check a workflow schema without running it.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use thermocurate::{AnnotatedToolkit, StageRegistry, Workflow, WorkflowSchema};

pub fn run(workflow: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schema = WorkflowSchema::from_file(&workflow)?;

    // Resolving against the built-in registry also checks every stage exists.
    let registry = StageRegistry::with_toolkit(Arc::new(AnnotatedToolkit::new()));
    let workflow_stages = Workflow::new(&schema, &registry)?;

    if json_output {
        let status = serde_json::json!({
            "file": workflow.display().to_string(),
            "valid": true,
            "stages": workflow_stages.kinds(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Valid workflow:".green().bold(),
        workflow.display().to_string().white()
    );
    if workflow_stages.is_empty() {
        println!("  {}", "(no stages)".dimmed());
    }
    for (index, kind) in workflow_stages.kinds().iter().enumerate() {
        println!("  {:>2}. {}", index + 1, kind);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_valid_and_invalid_workflows() {
        let dir = tempfile::tempdir().unwrap();
        let valid = dir.path().join("valid.json");
        let invalid = dir.path().join("invalid.json");

        fs::write(&valid, r#"{"component_schemas": [{"type": "FilterByIonicLiquid"}]}"#).unwrap();
        fs::write(
            &invalid,
            r#"{"component_schemas": [{"type": "FilterByTemperature",
                "minimum_temperature": 310.0, "maximum_temperature": 300.0}]}"#,
        )
        .unwrap();

        assert!(run(valid, true).is_ok());
        assert!(run(invalid, false).is_err());
    }
}
