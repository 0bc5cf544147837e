//! Apply command - run a workflow and write the curated table.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use thermocurate::{
    AnnotatedToolkit, StageRegistry, TableParser, TableWriter, Workflow, WorkflowSchema,
};
use tracing::info;

fn default_output(file: &Path) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}_curated.csv", stem))
}

pub fn run(
    file: PathBuf,
    workflow: PathBuf,
    annotations: Option<PathBuf>,
    output: Option<PathBuf>,
    processes: usize,
    report: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Table not found: {}", file.display()).into());
    }

    let schema = WorkflowSchema::from_file(&workflow)?;
    let toolkit = match &annotations {
        Some(path) => AnnotatedToolkit::from_file(path)?,
        None => AnnotatedToolkit::new(),
    };
    let registry = StageRegistry::with_toolkit(Arc::new(toolkit));
    let workflow = Workflow::new(&schema, &registry)?;

    let (table, metadata) = TableParser::new().parse_file(&file)?;
    info!(
        file = %metadata.file,
        rows = metadata.row_count,
        properties = metadata.property_count,
        "Loaded measurement table."
    );

    println!(
        "{} {} ({} rows) through {} stages",
        "Curating".cyan().bold(),
        metadata.file.white(),
        table.len().to_string().white().bold(),
        workflow.len()
    );
    println!();

    let (curated, curation_report) = workflow.apply_with_report(&table, processes.max(1))?;

    for (index, stage) in curation_report.stages.iter().enumerate() {
        let removed = stage.rows_removed();
        let removed = if removed > 0 {
            format!("-{}", removed).red()
        } else {
            "0".dimmed()
        };
        println!(
            "  {:>2}. {:<24} {:>8} -> {:<8} {}",
            index + 1,
            stage.kind.to_string(),
            stage.rows_in,
            stage.rows_out,
            removed
        );
    }
    println!();

    let output_path = output.unwrap_or_else(|| default_output(&file));
    TableWriter::new().write_file(&curated, &output_path)?;

    println!(
        "{} {} of {} rows to {}",
        "Saved".green().bold(),
        curated.len().to_string().white().bold(),
        table.len(),
        output_path.display().to_string().cyan()
    );

    if let Some(report_path) = report {
        fs::write(&report_path, serde_json::to_string_pretty(&curation_report)?)?;
        println!(
            "{} {}",
            "Report:".yellow().bold(),
            report_path.display().to_string().cyan()
        );
    }

    Ok(())
}
