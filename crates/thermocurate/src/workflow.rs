//! The workflow engine: an ordered pipeline of curation stages.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::schema::{StageKind, StageSchema, WorkflowSchema};
use crate::stages::{Stage, StageRegistry};
use crate::table::MeasurementTable;

/// What one stage did to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage that ran.
    pub kind: StageKind,
    /// Rows handed to the stage.
    pub rows_in: usize,
    /// Rows the stage returned.
    pub rows_out: usize,
}

impl StageReport {
    /// Number of rows the stage removed.
    pub fn rows_removed(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Summary of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationReport {
    /// Per-stage row counts, in execution order.
    pub stages: Vec<StageReport>,
    /// Rows in the initial table.
    pub rows_in: usize,
    /// Rows in the curated table.
    pub rows_out: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// A validated workflow with every stage resolved to its implementation.
pub struct Workflow {
    stages: Vec<(Arc<dyn Stage>, StageSchema)>,
}

impl Workflow {
    /// Validate a workflow schema and resolve each of its stages.
    ///
    /// Fails if any schema is invalid or names a stage the registry lacks.
    /// Schemas are re-validated here even if they were built through their
    /// checked constructors, since their fields may have been edited since.
    /// The workflow keeps copies, so later edits do not reach it.
    pub fn new(schema: &WorkflowSchema, registry: &StageRegistry) -> Result<Self> {
        schema.validate()?;

        let stages = schema
            .component_schemas
            .iter()
            .map(|stage_schema| Ok((registry.get(stage_schema.kind())?, stage_schema.clone())))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { stages })
    }

    /// Validate, resolve and apply a workflow schema in one go.
    pub fn apply_schema(
        table: &MeasurementTable,
        schema: &WorkflowSchema,
        registry: &StageRegistry,
        n_processes: usize,
    ) -> Result<MeasurementTable> {
        Self::new(schema, registry)?.apply(table, n_processes)
    }

    /// The kinds of the stages, in execution order.
    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|(_, schema)| schema.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage in order, returning the curated table.
    ///
    /// Missing values are normalized before the first stage and after each
    /// stage. The first stage error aborts the run.
    pub fn apply(&self, table: &MeasurementTable, n_processes: usize) -> Result<MeasurementTable> {
        self.apply_with_report(table, n_processes)
            .map(|(table, _)| table)
    }

    /// Apply every stage in order, also reporting what each stage did.
    pub fn apply_with_report(
        &self,
        table: &MeasurementTable,
        n_processes: usize,
    ) -> Result<(MeasurementTable, CurationReport)> {
        let started_at = Utc::now();
        let mut current = table.normalize_missing();
        let mut reports = Vec::with_capacity(self.stages.len());

        for (index, (stage, schema)) in self.stages.iter().enumerate() {
            let rows_in = current.len();
            current = stage.apply(&current, schema, n_processes)?.normalize_missing();
            let rows_out = current.len();

            info!(
                stage = %schema.kind(),
                index,
                rows_in,
                rows_out,
                "{} data points were removed after applying {}.",
                rows_in.saturating_sub(rows_out),
                schema.kind()
            );

            reports.push(StageReport {
                kind: schema.kind(),
                rows_in,
                rows_out,
            });
        }

        let report = CurationReport {
            stages: reports,
            rows_in: table.len(),
            rows_out: current.len(),
            started_at,
            finished_at: Utc::now(),
        };

        Ok((current, report))
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("stages", &self.kinds())
            .finish()
    }
}
