//! thermocurate: declarative curation pipelines for physical-property data.
//!
//! A [`MeasurementTable`] of experimentally measured physical properties is
//! passed through an ordered list of stages, each configured by a
//! [`StageSchema`]. Filter stages drop rows (by state, chemistry, property
//! type, duplicates, ...) and the selection stage picks the data points closest
//! to a set of target states.
//!
//! # Core Principles
//!
//! - **Declarative**: a workflow is plain data, loadable from JSON
//! - **Non-destructive**: every stage returns a new table
//! - **Explicit dispatch**: stages are resolved once through a [`StageRegistry`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use thermocurate::{AnnotatedToolkit, StageRegistry, TableParser, Workflow, WorkflowSchema};
//!
//! let (table, _) = TableParser::new().parse_file("measurements.csv").unwrap();
//! let schema = WorkflowSchema::from_file("workflow.json").unwrap();
//! let registry = StageRegistry::with_toolkit(Arc::new(AnnotatedToolkit::new()));
//!
//! let curated = Workflow::new(&schema, &registry).unwrap().apply(&table, 4).unwrap();
//! println!("Kept {} of {} measurements", curated.len(), table.len());
//! ```

pub mod error;
pub mod input;
pub mod schema;
pub mod stages;
pub mod table;
pub mod toolkit;

mod workflow;

pub use error::{CurationError, Result};
pub use input::{ParserConfig, SourceMetadata, TableParser, TableWriter};
pub use schema::{StageKind, StageSchema, WorkflowSchema};
pub use stages::{Stage, StageRegistry};
pub use table::{Component, Measurement, MeasurementTable, PropertyValue, Role, Substance};
pub use toolkit::{AnnotatedToolkit, ChemicalEnvironment, Toolkit, ToolkitError};
pub use workflow::{CurationReport, StageReport, Workflow};
